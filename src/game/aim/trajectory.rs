use bevy::prelude::*;

/// Closed-form ballistic arc under constant gravity, no drag.
///
/// Always evaluated from `t = 0`: the preview answers "where would the
/// arrow go if it were released right now", so nothing is carried between
/// frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub launch: Vec2,
    pub velocity: Vec2,
    pub gravity: Vec2,
}

impl Trajectory {
    pub fn new(launch: Vec2, velocity: Vec2, gravity: Vec2) -> Self {
        Self {
            launch,
            velocity,
            gravity,
        }
    }

    /// `L + v*t + 0.5*g*t^2`
    pub fn position_at(&self, t: f32) -> Vec2 {
        self.launch + self.velocity * t + 0.5 * self.gravity * t * t
    }

    /// `count` samples spaced `spacing` seconds apart, starting at the launch point.
    pub fn samples(&self, spacing: f32, count: usize) -> impl Iterator<Item = Vec2> + '_ {
        (0..count).map(move |i| self.position_at(i as f32 * spacing))
    }
}

/// Predict `count` positions, `spacing` seconds apart.
pub fn predict_trajectory(
    launch: Vec2,
    velocity: Vec2,
    gravity: Vec2,
    spacing: f32,
    count: usize,
) -> Vec<Vec2> {
    Trajectory::new(launch, velocity, gravity)
        .samples(spacing, count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn first_sample_is_launch_point() {
        let launch = Vec2::new(-2.0, 1.5);
        let points = predict_trajectory(launch, Vec2::new(10.0, 3.0), Vec2::new(0.0, -9.8), 0.1, 20);
        assert_eq!(points.len(), 20);
        assert_eq!(points[0], launch);
    }

    #[test]
    fn matches_closed_form() {
        let launch = Vec2::new(1.0, 2.0);
        let velocity = Vec2::new(10.0, 0.0);
        let gravity = Vec2::new(0.0, -9.8);
        let points = predict_trajectory(launch, velocity, gravity, 0.25, 5);

        // i = 4 -> t = 1.0
        assert!(close(points[4], launch + Vec2::new(10.0, -4.9)));
        // i = 2 -> t = 0.5
        assert!(close(points[2], launch + Vec2::new(5.0, -1.225)));
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let a = predict_trajectory(Vec2::ZERO, Vec2::new(7.0, 4.0), Vec2::new(0.0, -9.81), 0.1, 32);
        let b = predict_trajectory(Vec2::ZERO, Vec2::new(7.0, 4.0), Vec2::new(0.0, -9.81), 0.1, 32);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(predict_trajectory(Vec2::ZERO, Vec2::X, Vec2::NEG_Y, 0.1, 0).is_empty());
    }

    #[test]
    fn zero_spacing_collapses_to_launch() {
        let points = predict_trajectory(Vec2::ONE, Vec2::X, Vec2::NEG_Y, 0.0, 4);
        assert!(points.iter().all(|p| *p == Vec2::ONE));
    }
}
