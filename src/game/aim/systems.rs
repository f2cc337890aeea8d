use bevy::prelude::*;

use super::controller::{AimContext, AimController, AimOutcome, AimSettings};
use super::overlay::BoneOverlay;
use super::preview::MarkerRenderer;
use crate::config::tuning::Tuning;
use crate::game::animation::{AnimationState, Rig};
use crate::game::components::{Archer, ArrowSpawnPoint, DotAssets, TrajectoryDot, TrajectoryDotParent};
use crate::game::events::{AimInput, GameEvent};
use crate::game::input::PointerInput;
use crate::game::physics::Gravity;

const DOT_Z: f32 = 0.2;

/// Preview dots as child entities of the dot parent, which sits at the world origin.
pub struct DotRenderer<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub parent: Entity,
    pub assets: &'a DotAssets,
}

impl MarkerRenderer for DotRenderer<'_, '_, '_> {
    type Handle = Entity;

    fn create_marker(&mut self) -> Entity {
        self.commands
            .spawn((
                TrajectoryDot,
                Mesh2d(self.assets.mesh.clone()),
                MeshMaterial2d(self.assets.material.clone()),
                Transform::from_xyz(0.0, 0.0, DOT_Z),
                ChildOf(self.parent),
            ))
            .id()
    }

    fn set_position(&mut self, marker: Entity, position: Vec2) {
        self.commands
            .entity(marker)
            .try_insert(Transform::from_translation(position.extend(DOT_Z)));
    }

    fn destroy(&mut self, marker: Entity) {
        self.commands.entity(marker).try_despawn();
    }
}

/// AimSet: feed this frame's pointer events to the archer's controller.
pub fn drive_aim_controller(
    mut commands: Commands,
    mut aim_events: MessageReader<AimInput>,
    dot_assets: Res<DotAssets>,
    gravity: Res<Gravity>,
    dot_parents: Query<Entity, With<TrajectoryDotParent>>,
    spawn_points: Query<&GlobalTransform, With<ArrowSpawnPoint>>,
    mut archers: Query<
        (
            &mut AimController,
            Option<&mut AnimationState>,
            Option<&mut BoneOverlay>,
            &GlobalTransform,
        ),
        With<Archer>,
    >,
    mut game_events: MessageWriter<GameEvent>,
) {
    let inputs: Vec<AimInput> = aim_events.read().copied().collect();
    if inputs.is_empty() {
        return;
    }
    let Ok(parent) = dot_parents.single() else {
        warn!("aim: no trajectory dot parent, dropping {} input(s)", inputs.len());
        return;
    };
    let Ok((mut controller, cues, overlay, archer_tf)) = archers.single_mut() else {
        return;
    };

    // Fall back to the archer itself when the bow has no spawn point.
    let launch_point = spawn_points
        .single()
        .map_or(archer_tf.translation(), |tf| tf.translation())
        .truncate();

    let mut markers = DotRenderer {
        commands: &mut commands,
        parent,
        assets: &dot_assets,
    };
    let mut ctx = AimContext {
        markers: &mut markers,
        cues: cues.map(Mut::into_inner),
        overlay: overlay.map(Mut::into_inner),
        launch_point,
        gravity: gravity.0,
    };

    for input in inputs {
        if let AimOutcome::Released(launch) = controller.handle(input, &mut ctx) {
            game_events.write(GameEvent::SpawnProjectile {
                position: launch.position,
                velocity: launch.velocity.0,
            });
        }
    }
}

/// Push reloaded tuning into the live resources and controllers.
pub fn apply_tuning_changes(
    tuning: Res<Tuning>,
    mut gravity: ResMut<Gravity>,
    mut pointer: ResMut<PointerInput>,
    mut controllers: Query<&mut AimController>,
    mut overlays: Query<(&mut BoneOverlay, &Rig)>,
    mut aim_events: MessageWriter<AimInput>,
) {
    let new_gravity = tuning.gravity_vec();
    if gravity.0 != new_gravity {
        gravity.0 = new_gravity;
    }
    let settings = AimSettings::from(&*tuning);
    for mut controller in &mut controllers {
        if *controller.settings() != settings {
            controller.set_settings(settings.clone());
        }
    }
    for (mut overlay, rig) in &mut overlays {
        if !overlay.joint_names().eq(tuning.aim_joints.iter().map(String::as_str)) {
            info!("aim overlay: rebinding to {:?}", tuning.aim_joints);
            overlay.rebind(rig, &tuning.aim_joints);
        }
    }
    if pointer.mode() != tuning.input_mode {
        info!("input mode: {:?} -> {:?}", pointer.mode(), tuning.input_mode);
        // Ignored by an idle controller.
        if let Some(point) = pointer.switch_mode(tuning.input_mode) {
            aim_events.write(AimInput::Release(point));
        }
    }
}
