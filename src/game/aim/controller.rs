use bevy::prelude::*;

use super::overlay::BoneOverlay;
use super::preview::{MarkerRenderer, TrajectoryPreview};
use super::pull::{LaunchVelocity, PullVector};
use super::trajectory::predict_trajectory;
use crate::config::tuning::Tuning;
use crate::game::animation::{CueMode, CuePlayer};
use crate::game::events::AimInput;

/// Animation track used for the draw/release cues.
pub const AIM_TRACK: usize = 0;
pub const DRAW_CUE: &str = "attack_start";
pub const RELEASE_CUE: &str = "attack_finish";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AimState {
    #[default]
    Idle,
    Aiming,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AimSettings {
    pub max_pull_distance: f32,
    pub force_multiplier: f32,
    pub dot_spacing: f32,
    pub dot_count: usize,
}

impl From<&Tuning> for AimSettings {
    fn from(tuning: &Tuning) -> Self {
        Self {
            max_pull_distance: tuning.max_pull_distance,
            force_multiplier: tuning.force_multiplier,
            dot_spacing: tuning.dot_spacing,
            dot_count: tuning.dot_count,
        }
    }
}

impl Default for AimSettings {
    fn default() -> Self {
        Self::from(&Tuning::default())
    }
}

/// Everything the controller drives during one transition.
///
/// `cues` and `overlay` are optional: an archer without a rig still aims and
/// shoots, it just doesn't animate.
pub struct AimContext<'a, R, C: ?Sized> {
    pub markers: &'a mut R,
    pub cues: Option<&'a mut C>,
    pub overlay: Option<&'a mut BoneOverlay>,
    pub launch_point: Vec2,
    pub gravity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchRequest {
    pub position: Vec2,
    pub velocity: LaunchVelocity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimOutcome {
    Ignored,
    Started,
    Updated,
    Released(LaunchRequest),
}

/// Idle/Aiming state machine for one bow.
#[derive(Component, Debug)]
pub struct AimController<H: Copy + Send + Sync + 'static = Entity> {
    settings: AimSettings,
    /// Settings received mid-cycle, swapped in on the next press.
    queued_settings: Option<AimSettings>,
    state: AimState,
    origin: Vec2,
    pull: PullVector,
    preview: TrajectoryPreview<H>,
}

impl<H: Copy + Send + Sync + 'static> AimController<H> {
    pub fn new(settings: AimSettings) -> Self {
        Self {
            settings,
            queued_settings: None,
            state: AimState::Idle,
            origin: Vec2::ZERO,
            pull: PullVector::ZERO,
            preview: TrajectoryPreview::default(),
        }
    }

    pub fn state(&self) -> AimState {
        self.state
    }

    pub fn is_aiming(&self) -> bool {
        self.state == AimState::Aiming
    }

    pub fn pull(&self) -> PullVector {
        self.pull
    }

    pub fn settings(&self) -> &AimSettings {
        &self.settings
    }

    /// New settings take effect from the next press.
    pub fn set_settings(&mut self, settings: AimSettings) {
        if self.is_aiming() {
            self.queued_settings = Some(settings);
        } else {
            self.settings = settings;
        }
    }

    pub fn visible_markers(&self) -> usize {
        self.preview.len()
    }

    pub fn handle<R, C>(&mut self, input: AimInput, ctx: &mut AimContext<'_, R, C>) -> AimOutcome
    where
        R: MarkerRenderer<Handle = H>,
        C: CuePlayer + ?Sized,
    {
        match (self.state, input) {
            (AimState::Idle, AimInput::Press(point)) => self.start(point, ctx),
            (AimState::Aiming, AimInput::Drag(point)) => self.track(point, ctx),
            (AimState::Aiming, AimInput::Release(point)) => self.release(point, ctx),
            (state, input) => {
                debug!("aim: ignoring {input:?} while {state:?}");
                AimOutcome::Ignored
            }
        }
    }

    fn start<R, C>(&mut self, point: Vec2, ctx: &mut AimContext<'_, R, C>) -> AimOutcome
    where
        R: MarkerRenderer<Handle = H>,
        C: CuePlayer + ?Sized,
    {
        if let Some(settings) = self.queued_settings.take() {
            self.settings = settings;
        }
        self.state = AimState::Aiming;
        self.origin = point;
        self.pull = PullVector::ZERO;

        if let Some(cues) = ctx.cues.as_deref_mut() {
            if cues.current_cue(AIM_TRACK) != Some(DRAW_CUE) {
                cues.set_cue(AIM_TRACK, DRAW_CUE, CueMode::HoldFinalPose);
            }
        }

        self.preview.show(&mut *ctx.markers, self.settings.dot_count);
        self.refresh_preview(ctx);

        if let Some(overlay) = ctx.overlay.as_deref_mut() {
            overlay.set_state(AimState::Aiming);
            overlay.set_aim_angle(self.pull.angle());
        }

        debug!("aim: press at ({:.2}, {:.2})", point.x, point.y);
        AimOutcome::Started
    }

    fn track<R, C>(&mut self, point: Vec2, ctx: &mut AimContext<'_, R, C>) -> AimOutcome
    where
        R: MarkerRenderer<Handle = H>,
        C: CuePlayer + ?Sized,
    {
        self.pull = PullVector::from_drag(self.origin, point, self.settings.max_pull_distance);
        self.refresh_preview(ctx);

        if let Some(overlay) = ctx.overlay.as_deref_mut() {
            overlay.set_aim_angle(self.pull.angle());
        }
        AimOutcome::Updated
    }

    fn release<R, C>(&mut self, point: Vec2, ctx: &mut AimContext<'_, R, C>) -> AimOutcome
    where
        R: MarkerRenderer<Handle = H>,
        C: CuePlayer + ?Sized,
    {
        self.pull = PullVector::from_drag(self.origin, point, self.settings.max_pull_distance);
        let velocity = self.pull.launch_velocity(self.settings.force_multiplier);
        self.state = AimState::Idle;

        if let Some(cues) = ctx.cues.as_deref_mut() {
            cues.set_cue(AIM_TRACK, RELEASE_CUE, CueMode::HoldFinalPose);
        }
        self.preview.hide(&mut *ctx.markers);
        if let Some(overlay) = ctx.overlay.as_deref_mut() {
            overlay.set_state(AimState::Idle);
        }

        info!(
            "aim: release, pull={:.2} velocity=({:.2}, {:.2})",
            self.pull.length(),
            velocity.0.x,
            velocity.0.y
        );
        AimOutcome::Released(LaunchRequest {
            position: ctx.launch_point,
            velocity,
        })
    }

    /// Recompute the whole arc from t = 0 for the current pull.
    fn refresh_preview<R, C>(&mut self, ctx: &mut AimContext<'_, R, C>)
    where
        R: MarkerRenderer<Handle = H>,
        C: ?Sized,
    {
        let velocity = self.pull.launch_velocity(self.settings.force_multiplier);
        let arc = predict_trajectory(
            ctx.launch_point,
            velocity.0,
            ctx.gravity,
            self.settings.dot_spacing,
            self.preview.len(),
        );
        self.preview.update(&mut *ctx.markers, arc);
    }
}
