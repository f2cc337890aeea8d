use bevy::prelude::*;

use super::controller::AimState;
use crate::game::animation::{JointId, JointPoseProvider, Rig};

#[derive(Debug, Clone, PartialEq)]
struct JointBinding {
    name: String,
    joint: JointId,
    rest: f32,
}

/// Procedural aim pose layered over keyframe animation.
///
/// Rest rotations are captured once, in [`BoneOverlay::bind`], and never
/// re-read from the rig afterwards.
///
/// While idle every bound joint gets its rest rotation back; while aiming
/// every bound joint gets the same aim angle.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BoneOverlay {
    bindings: Vec<JointBinding>,
    state: AimState,
    aim_angle: f32,
}

impl BoneOverlay {
    /// Resolve `names` on `provider` and snapshot their current rotations.
    /// Unknown names are skipped.
    pub fn bind<P, S>(provider: &P, names: &[S]) -> Self
    where
        P: JointPoseProvider + ?Sized,
        S: AsRef<str>,
    {
        let mut bindings = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let Some((joint, rest)) = provider
                .find_joint(name)
                .and_then(|j| provider.joint_rotation(j).map(|r| (j, r)))
            else {
                warn!("aim overlay: joint '{name}' not found, skipping");
                continue;
            };
            bindings.push(JointBinding {
                name: name.to_string(),
                joint,
                rest,
            });
        }
        Self {
            bindings,
            state: AimState::Idle,
            aim_angle: 0.0,
        }
    }

    /// Bind a new joint list. Joints already bound keep their captured rest;
    /// new ones are snapshotted from `provider`. State and aim angle carry over.
    pub fn rebind<P, S>(&mut self, provider: &P, names: &[S])
    where
        P: JointPoseProvider + ?Sized,
        S: AsRef<str>,
    {
        let mut next = Self::bind(provider, names);
        for binding in &mut next.bindings {
            if let Some(rest) = self.rest_rotation(&binding.name) {
                binding.rest = rest;
            }
        }
        self.bindings = next.bindings;
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.name.as_str())
    }

    pub fn rest_rotation(&self, name: &str) -> Option<f32> {
        self.bindings.iter().find(|b| b.name == name).map(|b| b.rest)
    }

    pub fn state(&self) -> AimState {
        self.state
    }

    pub fn set_state(&mut self, state: AimState) {
        self.state = state;
    }

    pub fn aim_angle(&self) -> f32 {
        self.aim_angle
    }

    pub fn set_aim_angle(&mut self, radians: f32) {
        self.aim_angle = radians;
    }

    /// Overwrite the bound joints. Call after keyframes, before commit.
    pub fn apply<P: JointPoseProvider + ?Sized>(&self, provider: &mut P) {
        for binding in &self.bindings {
            let rotation = match self.state {
                AimState::Idle => binding.rest,
                AimState::Aiming => self.aim_angle,
            };
            provider.set_joint_rotation(binding.joint, rotation);
        }
    }
}

/// PoseOverlay step: runs between keyframe evaluation and pose commit.
pub fn apply_bone_overlays(mut query: Query<(&BoneOverlay, &mut Rig)>) {
    for (overlay, mut rig) in &mut query {
        overlay.apply(&mut *rig);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::animation::NoRig;

    fn archer_rig() -> Rig {
        Rig::default()
            .with_joint("body", 0.2, None)
            .with_joint("bow_arm", -0.1, None)
            .with_joint("draw_arm", 0.0, None)
    }

    fn rotation(rig: &Rig, name: &str) -> f32 {
        rig.find_joint(name).and_then(|j| rig.joint_rotation(j)).unwrap()
    }

    #[test]
    fn aiming_writes_shared_angle_to_every_bound_joint() {
        let mut rig = archer_rig();
        let mut overlay = BoneOverlay::bind(&rig, &["body", "bow_arm"]);
        overlay.set_state(AimState::Aiming);
        overlay.set_aim_angle(0.75);
        overlay.apply(&mut rig);

        assert_eq!(rotation(&rig, "body"), 0.75);
        assert_eq!(rotation(&rig, "bow_arm"), 0.75);
        assert_eq!(rotation(&rig, "draw_arm"), 0.0);
    }

    #[test]
    fn idle_restores_rest_rotation_exactly_after_many_cycles() {
        let mut rig = archer_rig();
        let mut overlay = BoneOverlay::bind(&rig, &["body"]);

        for cycle in 0..5 {
            overlay.set_state(AimState::Aiming);
            overlay.set_aim_angle(cycle as f32 * 0.3 - 0.6);
            overlay.apply(&mut rig);
            // Keyframes move the joint in between.
            let body = rig.find_joint("body").unwrap();
            rig.set_joint_rotation(body, 1.5);

            overlay.set_state(AimState::Idle);
            overlay.apply(&mut rig);
            assert_eq!(rotation(&rig, "body"), 0.2);
        }
        assert_eq!(overlay.rest_rotation("body"), Some(0.2));
    }

    #[test]
    fn missing_joints_are_skipped() {
        let rig = archer_rig();
        let overlay = BoneOverlay::bind(&rig, &["body", "tail"]);
        assert_eq!(overlay.joint_names().collect::<Vec<_>>(), vec!["body"]);
    }

    #[test]
    fn rebind_keeps_captured_rest_and_snapshots_new_joints() {
        let mut rig = archer_rig();
        let mut overlay = BoneOverlay::bind(&rig, &["body"]);
        overlay.set_state(AimState::Aiming);
        overlay.set_aim_angle(0.9);
        overlay.apply(&mut rig);

        overlay.rebind(&rig, &["bow_arm", "body"]);
        assert_eq!(overlay.joint_names().collect::<Vec<_>>(), vec!["bow_arm", "body"]);
        assert_eq!(overlay.rest_rotation("body"), Some(0.2));
        assert_eq!(overlay.rest_rotation("bow_arm"), Some(-0.1));
        assert_eq!(overlay.state(), AimState::Aiming);
        assert_eq!(overlay.aim_angle(), 0.9);

        overlay.rebind(&rig, &["bow_arm"]);
        overlay.set_state(AimState::Idle);
        overlay.apply(&mut rig);
        assert_eq!(rotation(&rig, "bow_arm"), -0.1);
        // Dropped joints are left where the last write put them.
        assert_eq!(rotation(&rig, "body"), 0.9);
    }

    #[test]
    fn binding_without_a_rig_is_empty_and_harmless() {
        let mut no_rig = NoRig;
        let mut overlay = BoneOverlay::bind(&no_rig, &["body"]);
        assert!(overlay.is_empty());
        overlay.set_state(AimState::Aiming);
        overlay.apply(&mut no_rig);
    }
}
