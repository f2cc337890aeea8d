use bevy::prelude::*;

/// `origin - current`, clamped to the pull ceiling. Always in [0, max].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PullVector(pub Vec2);

impl PullVector {
    pub const ZERO: Self = Self(Vec2::ZERO);

    /// Pull from the press origin towards the current pointer, bow-style:
    /// the result points away from where the pointer was dragged.
    pub fn from_drag(origin: Vec2, current: Vec2, max_pull_distance: f32) -> Self {
        let max = if max_pull_distance.is_finite() {
            max_pull_distance.max(0.0)
        } else {
            0.0
        };
        let raw = origin - current;
        if !raw.is_finite() {
            return Self::ZERO;
        }
        Self(raw.clamp_length_max(max))
    }

    pub fn length(self) -> f32 {
        self.0.length()
    }

    /// Aim angle in radians, `atan2(y, x)`. Zero for a zero pull.
    pub fn angle(self) -> f32 {
        self.0.y.atan2(self.0.x)
    }

    pub fn launch_velocity(self, force_multiplier: f32) -> LaunchVelocity {
        LaunchVelocity(self.0 * force_multiplier)
    }
}

/// Initial projectile velocity, fixed at release.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LaunchVelocity(pub Vec2);
