use bevy::camera::ScalingMode;
use bevy::prelude::*;
use std::f32::consts::PI;

use crate::config::tuning::Tuning;
use crate::game::{
    aim::{self, AimController, AimSettings, BoneOverlay},
    animation::{self, AnimationState, ClipLibrary, CueClip, Rig},
    collision::{self, Collider},
    components::*,
    events::{AimInput, CollisionMessage, GameEvent},
    input::{self, PointerInput},
    physics::{self, Gravity},
    projectile,
};

// ── SystemSets ──────────────────────────────────────────────────────

/// Per-frame order: input, aim logic, keyframes, aim overlay, then the pose
/// is written to transforms before PostUpdate propagates them.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    InputSet,
    AimSet,
    AnimationEvaluateSet,
    PoseOverlaySet,
    PoseCommitSet,
}

/// Strict FixedUpdate ordering for arrow flight.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FixedGameSet {
    PhysicsSet,
    CollisionDetectSet,
    EventApplySet,
    CleanupSet,
}

/// Bow arm hangs down while idle.
const BOW_ARM_REST: f32 = -0.6;
/// Draw hand pulled back to the cheek.
const DRAW_ARM_DRAWN: f32 = PI;

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<AimInput>();
        app.add_message::<GameEvent>();
        app.add_message::<CollisionMessage>();

        app.init_resource::<Gravity>();
        app.insert_resource(PointerInput::new(default()));

        add_frame_pipeline(app);

        app.configure_sets(
            FixedUpdate,
            (
                FixedGameSet::PhysicsSet,
                FixedGameSet::CollisionDetectSet,
                FixedGameSet::EventApplySet,
                FixedGameSet::CleanupSet,
            )
                .chain(),
        );

        // ── Startup ─────────────────────────────────────────────────────
        app.add_systems(Startup, setup_game);

        // ── Per frame (Update) ──────────────────────────────────────────
        app.add_systems(
            Update,
            (
                tuning_reload_input,
                (aim::systems::apply_tuning_changes, sync_fixed_timestep)
                    .run_if(resource_changed::<Tuning>),
            )
                .chain()
                .before(FrameSet::InputSet),
        );
        app.add_systems(Update, input::read_pointer_input.in_set(FrameSet::InputSet));
        app.add_systems(
            Update,
            (aim::systems::drive_aim_controller, projectile::spawn_arrows)
                .chain()
                .in_set(FrameSet::AimSet),
        );

        // ── Arrow flight (FixedUpdate) ──────────────────────────────────
        // PhysicsSet: chained, both write Transform
        app.add_systems(
            FixedUpdate,
            (physics::integrate_bodies, projectile::orient_projectiles)
                .chain()
                .in_set(FixedGameSet::PhysicsSet),
        );
        app.add_systems(
            FixedUpdate,
            collision::detect_collisions.in_set(FixedGameSet::CollisionDetectSet),
        );
        app.add_systems(
            FixedUpdate,
            projectile::resolve_projectile_impacts.in_set(FixedGameSet::EventApplySet),
        );
        app.add_systems(
            FixedUpdate,
            (projectile::cleanup_expired, projectile::despawn_lost_arrows)
                .chain()
                .in_set(FixedGameSet::CleanupSet),
        );
    }
}

/// Update set chain plus the pose systems: keyframes, then the aim overlay,
/// then the commit to joint transforms.
pub fn add_frame_pipeline(app: &mut App) {
    app.configure_sets(
        Update,
        (
            FrameSet::InputSet,
            FrameSet::AimSet,
            FrameSet::AnimationEvaluateSet,
            FrameSet::PoseOverlaySet,
            FrameSet::PoseCommitSet,
        )
            .chain(),
    );
    app.add_systems(
        Update,
        (
            animation::rig::evaluate_animations.in_set(FrameSet::AnimationEvaluateSet),
            aim::overlay::apply_bone_overlays.in_set(FrameSet::PoseOverlaySet),
            animation::rig::commit_rig_pose.in_set(FrameSet::PoseCommitSet),
        ),
    );
}

// ── Startup ─────────────────────────────────────────────────────────

fn setup_game(
    mut commands: Commands,
    tuning: Res<Tuning>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let ppu = tuning.pixels_per_unit.max(1.0);

    // Camera (Bevy 0.18): Camera2d + Projection::Orthographic, 1 world unit = ppu px
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::WindowSize,
            scale: 1.0 / ppu,
            ..OrthographicProjection::default_2d()
        }),
    ));

    // Preview dot assets
    commands.insert_resource(DotAssets {
        mesh: meshes.add(Circle::new(tuning.dot_radius)),
        material: materials.add(Color::srgba(1.0, 1.0, 1.0, 0.8)),
    });
    commands.spawn((TrajectoryDotParent, Transform::default(), Visibility::default()));

    // Arrow assets: origin at the tip, shaft extends backwards.
    let arrow_length = 0.9;
    commands.insert_resource(ArrowAssets {
        shaft_mesh: meshes.add(Rectangle::new(arrow_length, 0.05)),
        head_mesh: meshes.add(Triangle2d::new(
            Vec2::ZERO,
            Vec2::new(-0.18, 0.08),
            Vec2::new(-0.18, -0.08),
        )),
        material: materials.add(Color::srgb(0.75, 0.6, 0.4)),
        head_material: materials.add(Color::srgb(0.8, 0.8, 0.85)),
        length: arrow_length,
    });

    spawn_archer(&mut commands, &tuning, &mut meshes, &mut materials);
    spawn_scenery(&mut commands, &mut meshes, &mut materials);

    info!("scene ready, ppu={ppu}");
}

fn spawn_archer(
    commands: &mut Commands,
    tuning: &Tuning,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
) {
    let body_mesh = meshes.add(Capsule2d::new(0.25, 0.9));
    let limb_mesh = meshes.add(Rectangle::new(0.9, 0.12));
    let bow_mesh = meshes.add(Rectangle::new(0.08, 1.3));
    let body_mat = materials.add(Color::srgb(0.2, 0.45, 0.3));
    let limb_mat = materials.add(Color::srgb(0.85, 0.7, 0.55));
    let bow_mat = materials.add(Color::srgb(0.45, 0.3, 0.15));

    let archer = commands
        .spawn((
            Archer,
            Transform::from_xyz(-10.0, -4.6, 0.0),
            Visibility::default(),
        ))
        .id();

    let body = commands
        .spawn((
            Mesh2d(body_mesh),
            MeshMaterial2d(body_mat),
            Transform::from_xyz(0.0, 0.0, 0.1),
            ChildOf(archer),
        ))
        .id();

    let bow_arm = commands
        .spawn((
            Transform::from_xyz(0.0, 0.4, 0.2).with_rotation(Quat::from_rotation_z(BOW_ARM_REST)),
            Visibility::default(),
            ChildOf(body),
        ))
        .with_children(|arm| {
            arm.spawn((
                Mesh2d(limb_mesh.clone()),
                MeshMaterial2d(limb_mat.clone()),
                Transform::from_xyz(0.45, 0.0, 0.0),
            ));
            arm.spawn((
                Mesh2d(bow_mesh),
                MeshMaterial2d(bow_mat),
                Transform::from_xyz(0.9, 0.0, 0.05),
            ));
            arm.spawn((ArrowSpawnPoint, Transform::from_xyz(1.0, 0.0, 0.0)));
        })
        .id();

    let draw_arm = commands
        .spawn((
            Transform::from_xyz(0.0, 0.4, 0.15),
            Visibility::default(),
            ChildOf(body),
        ))
        .with_children(|arm| {
            arm.spawn((
                Mesh2d(limb_mesh),
                MeshMaterial2d(limb_mat),
                Transform::from_xyz(0.35, 0.0, 0.0).with_scale(Vec3::new(0.8, 1.0, 1.0)),
            ));
        })
        .id();

    let rig = Rig::default()
        .with_joint("body", 0.0, Some(body))
        .with_joint("bow_arm", BOW_ARM_REST, Some(bow_arm))
        .with_joint("draw_arm", 0.0, Some(draw_arm));
    let overlay = BoneOverlay::bind(&rig, &tuning.aim_joints);
    if overlay.is_empty() {
        warn!("archer: none of {:?} are rig joints, bow will not follow the aim", tuning.aim_joints);
    }

    let clips = ClipLibrary::default()
        .with_clip(
            CueClip::new(aim::controller::DRAW_CUE, 0.25)
                .key("bow_arm", BOW_ARM_REST, 0.0)
                .key("draw_arm", 0.0, DRAW_ARM_DRAWN),
        )
        .with_clip(
            CueClip::new(aim::controller::RELEASE_CUE, 0.2)
                .key("bow_arm", 0.0, BOW_ARM_REST)
                .key("draw_arm", DRAW_ARM_DRAWN, 0.0),
        );

    commands.entity(archer).insert((
        rig,
        overlay,
        clips,
        AnimationState::default(),
        AimController::<Entity>::new(AimSettings::from(tuning)),
    ));
}

fn spawn_scenery(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
) {
    let blocks = [
        // (name, position, size, colour)
        ("ground", Vec2::new(0.0, -7.0), Vec2::new(48.0, 2.0), Color::srgb(0.3, 0.25, 0.2)),
        ("wall", Vec2::new(14.0, -2.0), Vec2::new(1.0, 8.0), Color::srgb(0.4, 0.4, 0.45)),
    ];
    for (name, position, size, color) in blocks {
        commands.spawn((
            Name::new(name),
            Classification::Obstacle,
            Collider::rect(size),
            Mesh2d(meshes.add(Rectangle::from_size(size))),
            MeshMaterial2d(materials.add(color)),
            Transform::from_translation(position.extend(-0.5)),
        ));
    }

    // Target disc
    let target_radius = 0.9;
    commands.spawn((
        Name::new("target"),
        Classification::Obstacle,
        Collider::circle(target_radius),
        Mesh2d(meshes.add(Circle::new(target_radius))),
        MeshMaterial2d(materials.add(Color::srgb(0.85, 0.2, 0.2))),
        Transform::from_xyz(8.0, 1.0, -0.4),
    ));

    // Banner: arrows fly straight through it
    let banner_size = Vec2::new(0.5, 3.0);
    commands.spawn((
        Name::new("banner"),
        Classification::Prop,
        Collider::rect(banner_size),
        Mesh2d(meshes.add(Rectangle::from_size(banner_size))),
        MeshMaterial2d(materials.add(Color::srgba(0.9, 0.8, 0.2, 0.6))),
        Transform::from_xyz(0.0, -4.5, -0.3),
    ));
}

// ── Tuning ──────────────────────────────────────────────────────────

fn tuning_reload_input(keyboard: Res<ButtonInput<KeyCode>>, mut tuning: ResMut<Tuning>) {
    if keyboard.just_pressed(KeyCode::F5) {
        tuning.reload();
    }
}

fn sync_fixed_timestep(tuning: Res<Tuning>, mut fixed: ResMut<Time<Fixed>>) {
    fixed.set_timestep_seconds(tuning.dt as f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::aim::AimState;
    use crate::game::aim::controller::{AIM_TRACK, DRAW_CUE, RELEASE_CUE};
    use crate::game::animation::{CueMode, CuePlayer};
    use std::time::Duration;

    const BODY_REST: f32 = 0.2;
    const AIM_ANGLE: f32 = 0.7;

    fn joint_rotation(app: &App, joint: Entity) -> Quat {
        app.world().get::<Transform>(joint).unwrap().rotation
    }

    #[test]
    fn overlay_wins_over_keyframes_and_restores_rest_pose() {
        let mut app = App::new();
        app.init_resource::<Time>();
        add_frame_pipeline(&mut app);

        let body = app.world_mut().spawn(Transform::default()).id();
        let draw_arm = app.world_mut().spawn(Transform::default()).id();
        let rig = Rig::default()
            .with_joint("body", BODY_REST, Some(body))
            .with_joint("draw_arm", 0.0, Some(draw_arm));
        let overlay = BoneOverlay::bind(&rig, &["body"]);
        // Both clips key "body", which the overlay also drives.
        let clips = ClipLibrary::default()
            .with_clip(CueClip::new(DRAW_CUE, 0.5).key("body", 1.0, 1.5).key("draw_arm", 0.0, 2.0))
            .with_clip(CueClip::new(RELEASE_CUE, 0.5).key("body", 1.5, -1.0).key("draw_arm", 2.0, 0.0));
        let archer = app
            .world_mut()
            .spawn((rig, overlay, clips, AnimationState::default()))
            .id();

        {
            let mut entity = app.world_mut().entity_mut(archer);
            entity
                .get_mut::<AnimationState>()
                .unwrap()
                .set_cue(AIM_TRACK, DRAW_CUE, CueMode::HoldFinalPose);
            let mut overlay = entity.get_mut::<BoneOverlay>().unwrap();
            overlay.set_state(AimState::Aiming);
            overlay.set_aim_angle(AIM_ANGLE);
        }

        for _ in 0..4 {
            app.world_mut().resource_mut::<Time>().advance_by(Duration::from_millis(100));
            app.update();
            assert_eq!(joint_rotation(&app, body), Quat::from_rotation_z(AIM_ANGLE));
        }
        // Keyframes still reach joints the overlay leaves alone.
        assert_ne!(joint_rotation(&app, draw_arm), Quat::IDENTITY);

        {
            let mut entity = app.world_mut().entity_mut(archer);
            entity
                .get_mut::<AnimationState>()
                .unwrap()
                .set_cue(AIM_TRACK, RELEASE_CUE, CueMode::HoldFinalPose);
            entity.get_mut::<BoneOverlay>().unwrap().set_state(AimState::Idle);
        }

        for _ in 0..8 {
            app.world_mut().resource_mut::<Time>().advance_by(Duration::from_millis(100));
            app.update();
            assert_eq!(joint_rotation(&app, body), Quat::from_rotation_z(BODY_REST));
        }
        assert_eq!(joint_rotation(&app, draw_arm), Quat::from_rotation_z(0.0));
    }
}
