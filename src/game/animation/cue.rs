use bevy::prelude::*;

/// How a cue behaves when it reaches its last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueMode {
    /// Play once, then clear the track.
    Once,
    Loop,
    /// Play once, then keep the last frame until another cue is requested.
    HoldFinalPose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuePhase {
    Playing,
    Held,
}

/// Result of a cue request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueRequest {
    Started,
    /// The requested cue was already current; nothing was restarted.
    AlreadyCurrent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCue {
    pub name: String,
    pub mode: CueMode,
    pub phase: CuePhase,
    pub elapsed: f32,
}

/// A single playback track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueTrack {
    current: Option<ActiveCue>,
}

impl CueTrack {
    pub fn current(&self) -> Option<&ActiveCue> {
        self.current.as_ref()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.name.as_str())
    }

    pub fn set(&mut self, name: &str, mode: CueMode) -> CueRequest {
        if self.current_name() == Some(name) {
            return CueRequest::AlreadyCurrent;
        }
        self.current = Some(ActiveCue {
            name: name.to_string(),
            mode,
            phase: CuePhase::Playing,
            elapsed: 0.0,
        });
        CueRequest::Started
    }

    /// Advance playback. Returns `true` when the cue reached its end this call.
    pub fn advance(&mut self, dt: f32, duration: f32) -> bool {
        let Some(cue) = self.current.as_mut() else {
            return false;
        };
        if cue.phase == CuePhase::Held {
            return false;
        }
        cue.elapsed += dt.max(0.0);
        if cue.elapsed < duration {
            return false;
        }
        match cue.mode {
            CueMode::Loop => {
                cue.elapsed = if duration > 0.0 {
                    cue.elapsed % duration
                } else {
                    0.0
                };
            }
            CueMode::HoldFinalPose => {
                cue.elapsed = duration;
                cue.phase = CuePhase::Held;
            }
            CueMode::Once => {
                self.current = None;
            }
        }
        true
    }
}

/// Animation collaborator: the cue half.
pub trait CuePlayer {
    fn set_cue(&mut self, track: usize, name: &str, mode: CueMode) -> CueRequest;
    fn current_cue(&self, track: usize) -> Option<&str>;
}

/// Playback tracks of one rig.
#[derive(Component, Debug, Clone, Default)]
pub struct AnimationState {
    pub tracks: Vec<CueTrack>,
}

impl AnimationState {
    pub fn track(&self, index: usize) -> Option<&CueTrack> {
        self.tracks.get(index)
    }
}

impl CuePlayer for AnimationState {
    fn set_cue(&mut self, track: usize, name: &str, mode: CueMode) -> CueRequest {
        if self.tracks.len() <= track {
            self.tracks.resize_with(track + 1, CueTrack::default);
        }
        let request = self.tracks[track].set(name, mode);
        if request == CueRequest::Started {
            debug!("cue '{name}' started on track {track} ({mode:?})");
        }
        request
    }

    fn current_cue(&self, track: usize) -> Option<&str> {
        self.tracks.get(track).and_then(CueTrack::current_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requesting_current_cue_does_not_restart_it() {
        let mut state = AnimationState::default();
        assert_eq!(state.set_cue(0, "attack_start", CueMode::HoldFinalPose), CueRequest::Started);
        state.tracks[0].advance(0.2, 1.0);

        assert_eq!(
            state.set_cue(0, "attack_start", CueMode::HoldFinalPose),
            CueRequest::AlreadyCurrent
        );
        assert_eq!(state.current_cue(0), Some("attack_start"));
        let elapsed = state.track(0).and_then(CueTrack::current).map(|c| c.elapsed);
        assert_eq!(elapsed, Some(0.2));
    }

    #[test]
    fn hold_final_pose_freezes_on_last_frame() {
        let mut track = CueTrack::default();
        track.set("attack_finish", CueMode::HoldFinalPose);
        assert!(!track.advance(0.3, 0.5));
        assert!(track.advance(0.3, 0.5));

        let cue = track.current().unwrap();
        assert_eq!(cue.phase, CuePhase::Held);
        assert_eq!(cue.elapsed, 0.5);

        assert!(!track.advance(10.0, 0.5));
        assert_eq!(track.current().unwrap().elapsed, 0.5);
    }

    #[test]
    fn new_cue_replaces_held_one() {
        let mut track = CueTrack::default();
        track.set("attack_finish", CueMode::HoldFinalPose);
        track.advance(1.0, 0.5);
        assert_eq!(track.set("attack_start", CueMode::HoldFinalPose), CueRequest::Started);
        let cue = track.current().unwrap();
        assert_eq!(cue.phase, CuePhase::Playing);
        assert_eq!(cue.elapsed, 0.0);
    }

    #[test]
    fn once_clears_and_loop_wraps() {
        let mut once = CueTrack::default();
        once.set("attack", CueMode::Once);
        assert!(once.advance(0.4, 0.3));
        assert_eq!(once.current_name(), None);

        let mut looping = CueTrack::default();
        looping.set("idle", CueMode::Loop);
        assert!(looping.advance(0.5, 0.4));
        let elapsed = looping.current().unwrap().elapsed;
        assert!((elapsed - 0.1).abs() < 1e-5);
    }

    #[test]
    fn tracks_grow_on_demand() {
        let mut state = AnimationState::default();
        state.set_cue(2, "wave", CueMode::Loop);
        assert_eq!(state.tracks.len(), 3);
        assert_eq!(state.current_cue(0), None);
        assert_eq!(state.current_cue(2), Some("wave"));
    }
}
