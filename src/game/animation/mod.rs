//! Minimal keyframe playback standing in for a skeletal animation engine.
//!
//! The aim code only talks to it through [`CuePlayer`] and [`JointPoseProvider`].

pub mod cue;
pub mod rig;

pub use cue::{AnimationState, CueMode, CuePhase, CuePlayer, CueRequest, CueTrack};
pub use rig::{ClipLibrary, CueClip, JointId, JointPoseProvider, NoRig, Rig};
