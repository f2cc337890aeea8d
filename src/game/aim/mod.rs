//! Pull-and-release aiming: drag vector, launch velocity, arc preview and
//! the procedural bow pose.

pub mod controller;
pub mod overlay;
pub mod preview;
pub mod pull;
pub mod systems;
pub mod trajectory;

pub use controller::{AimContext, AimController, AimOutcome, AimSettings, AimState, LaunchRequest};
pub use overlay::BoneOverlay;
pub use preview::{MarkerRenderer, TrajectoryPreview};
pub use pull::{LaunchVelocity, PullVector};
pub use trajectory::{Trajectory, predict_trajectory};
