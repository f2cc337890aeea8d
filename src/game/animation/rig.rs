use bevy::prelude::*;

use super::cue::AnimationState;

/// Index of a joint inside a rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointId(pub usize);

/// Animation collaborator: the skeleton half.
pub trait JointPoseProvider {
    fn find_joint(&self, name: &str) -> Option<JointId>;
    fn joint_rotation(&self, joint: JointId) -> Option<f32>;
    fn set_joint_rotation(&mut self, joint: JointId, radians: f32);
}

/// Stand-in for entities without a skeleton. Resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRig;

impl JointPoseProvider for NoRig {
    fn find_joint(&self, _name: &str) -> Option<JointId> {
        None
    }

    fn joint_rotation(&self, _joint: JointId) -> Option<f32> {
        None
    }

    fn set_joint_rotation(&mut self, _joint: JointId, _radians: f32) {}
}

#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    /// Local z rotation in radians.
    pub rotation: f32,
    /// Entity whose `Transform` shows this joint, if any.
    pub entity: Option<Entity>,
}

/// Flat 2D skeleton: named joints with one rotation each.
#[derive(Component, Debug, Clone, Default)]
pub struct Rig {
    joints: Vec<Joint>,
}

impl Rig {
    pub fn with_joint(mut self, name: impl Into<String>, rotation: f32, entity: Option<Entity>) -> Self {
        self.joints.push(Joint {
            name: name.into(),
            rotation,
            entity,
        });
        self
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    fn set_named(&mut self, name: &str, radians: f32) {
        if let Some(joint) = self.joints.iter_mut().find(|j| j.name == name) {
            joint.rotation = radians;
        }
    }
}

impl JointPoseProvider for Rig {
    fn find_joint(&self, name: &str) -> Option<JointId> {
        self.joints.iter().position(|j| j.name == name).map(JointId)
    }

    fn joint_rotation(&self, joint: JointId) -> Option<f32> {
        self.joints.get(joint.0).map(|j| j.rotation)
    }

    fn set_joint_rotation(&mut self, joint: JointId, radians: f32) {
        if let Some(j) = self.joints.get_mut(joint.0) {
            j.rotation = radians;
        }
    }
}

// ── Clips ───────────────────────────────────────────────────────────

/// Linear key for one joint over the whole clip.
#[derive(Debug, Clone)]
pub struct JointKey {
    pub joint: String,
    pub from: f32,
    pub to: f32,
}

#[derive(Debug, Clone)]
pub struct CueClip {
    pub name: String,
    pub duration: f32,
    pub keys: Vec<JointKey>,
}

impl CueClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration: duration.max(0.0),
            keys: Vec::new(),
        }
    }

    pub fn key(mut self, joint: impl Into<String>, from: f32, to: f32) -> Self {
        self.keys.push(JointKey {
            joint: joint.into(),
            from,
            to,
        });
        self
    }

    /// Pose at `elapsed` seconds into the clip.
    pub fn sample(&self, elapsed: f32) -> impl Iterator<Item = (&str, f32)> + '_ {
        let s = if self.duration > 0.0 {
            (elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.keys
            .iter()
            .map(move |k| (k.joint.as_str(), k.from + (k.to - k.from) * s))
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: Vec<CueClip>,
}

impl ClipLibrary {
    pub fn with_clip(mut self, clip: CueClip) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CueClip> {
        self.clips.iter().find(|c| c.name == name)
    }
}

// ── Systems ─────────────────────────────────────────────────────────

/// Advance every track and write the keyframed pose into the rig.
pub fn evaluate_animations(
    time: Res<Time>,
    mut rigs: Query<(&mut AnimationState, &ClipLibrary, &mut Rig)>,
) {
    let dt = time.delta_secs();
    for (mut state, clips, mut rig) in &mut rigs {
        for (index, track) in state.tracks.iter_mut().enumerate() {
            let clip = track.current_name().and_then(|name| clips.get(name));
            let duration = clip.map_or(0.0, |c| c.duration);
            let finished = track.advance(dt, duration);

            let Some(clip) = clip else {
                continue;
            };
            if finished {
                debug!("cue '{}' reached its end on track {index}", clip.name);
            }
            let elapsed = match track.current() {
                Some(cue) => cue.elapsed,
                None if finished => clip.duration,
                None => continue,
            };
            for (joint, angle) in clip.sample(elapsed) {
                rig.set_named(joint, angle);
            }
        }
    }
}

/// Copy joint rotations onto the joint entities' transforms.
pub fn commit_rig_pose(rigs: Query<&Rig>, mut transforms: Query<&mut Transform>) {
    for rig in &rigs {
        for joint in rig.joints() {
            let Some(entity) = joint.entity else {
                continue;
            };
            if let Ok(mut tf) = transforms.get_mut(entity) {
                let rotation = Quat::from_rotation_z(joint.rotation);
                if tf.rotation != rotation {
                    tf.rotation = rotation;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_resolves_joints_by_name() {
        let mut rig = Rig::default()
            .with_joint("body", 0.1, None)
            .with_joint("draw_arm", 0.0, None);
        let id = rig.find_joint("draw_arm").unwrap();
        assert_eq!(id, JointId(1));
        rig.set_joint_rotation(id, -0.5);
        assert_eq!(rig.joint_rotation(id), Some(-0.5));
        assert_eq!(rig.find_joint("tail"), None);
    }

    #[test]
    fn no_rig_resolves_nothing() {
        let mut rig = NoRig;
        assert_eq!(rig.find_joint("body"), None);
        rig.set_joint_rotation(JointId(0), 1.0);
        assert_eq!(rig.joint_rotation(JointId(0)), None);
    }

    #[test]
    fn clip_sample_lerps_and_clamps() {
        let clip = CueClip::new("attack_start", 0.5).key("draw_arm", 0.0, -1.0);
        let mid: Vec<_> = clip.sample(0.25).collect();
        assert_eq!(mid, vec![("draw_arm", -0.5)]);
        let past: Vec<_> = clip.sample(3.0).collect();
        assert_eq!(past, vec![("draw_arm", -1.0)]);
    }
}
