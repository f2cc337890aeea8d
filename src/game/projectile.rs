use bevy::prelude::*;

use super::animation::{AnimationState, ClipLibrary, CueClip, CueMode, CuePlayer, Rig};
use super::collision::{Collider, Contacts};
use super::components::*;
use super::events::{CollisionMessage, GameEvent};
use super::physics::RigidBody;
use crate::config::tuning::Tuning;

/// Seconds an arrow stays stuck in an obstacle before it is removed.
pub const IMPACT_DESPAWN_DELAY: f32 = 2.0;
/// Cue played on the arrow's own rig when it sticks.
pub const IMPACT_CUE: &str = "attack";
/// Below this squared speed the heading is left alone.
pub const HEADING_MIN_SPEED_SQ: f32 = 0.01;
pub const ARROW_TIP_RADIUS: f32 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlightState {
    #[default]
    Flying,
    Impacted,
}

/// Heading for a velocity, or `None` when too slow to have a direction.
pub fn heading_for(velocity: Vec2) -> Option<f32> {
    (velocity.length_squared() > HEADING_MIN_SPEED_SQ).then(|| velocity.y.atan2(velocity.x))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub despawn_after: f32,
}

/// Flying → Impacted. The transition happens at most once.
#[derive(Component, Debug, Default)]
pub struct Projectile {
    state: FlightState,
}

impl Projectile {
    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn heading(&self, velocity: Vec2) -> Option<f32> {
        match self.state {
            FlightState::Flying => heading_for(velocity),
            FlightState::Impacted => None,
        }
    }

    /// React to a contact. Only the first obstacle contact lands the arrow:
    /// it plays the impact cue, freezes the body and turns its collider off.
    pub fn on_collision<C: CuePlayer + ?Sized>(
        &mut self,
        other: Option<Classification>,
        body: Option<&mut RigidBody>,
        collider: Option<&mut Collider>,
        cues: Option<&mut C>,
    ) -> Option<Impact> {
        if self.state != FlightState::Flying || other != Some(Classification::Obstacle) {
            return None;
        }
        self.state = FlightState::Impacted;

        if let Some(cues) = cues {
            cues.set_cue(0, IMPACT_CUE, CueMode::Once);
        }
        if let Some(body) = body {
            body.freeze();
        }
        if let Some(collider) = collider {
            collider.enabled = false;
        }
        Some(Impact {
            despawn_after: IMPACT_DESPAWN_DELAY,
        })
    }
}

/// Simulation parts of an arrow, without visuals.
pub fn arrow_body(position: Vec2, velocity: Vec2) -> impl Bundle {
    let rotation = Quat::from_rotation_z(heading_for(velocity).unwrap_or(0.0));
    (
        Projectile::default(),
        RigidBody::dynamic(velocity),
        Collider::circle(ARROW_TIP_RADIUS),
        Contacts::default(),
        Transform::from_translation(position.extend(0.5)).with_rotation(rotation),
    )
}

fn arrow_clips() -> ClipLibrary {
    ClipLibrary::default().with_clip(CueClip::new(IMPACT_CUE, 0.3).key("head", 0.35, 0.0))
}

/// Spawn arrows from SpawnProjectile events. The entity origin is the tip.
pub fn spawn_arrows(
    mut commands: Commands,
    mut events: MessageReader<GameEvent>,
    assets: Res<ArrowAssets>,
) {
    for event in events.read() {
        let GameEvent::SpawnProjectile { position, velocity } = event else {
            continue;
        };

        let head = commands
            .spawn((
                ArrowHead,
                Mesh2d(assets.head_mesh.clone()),
                MeshMaterial2d(assets.head_material.clone()),
                Transform::from_xyz(0.0, 0.0, 0.1),
            ))
            .id();
        let shaft = commands
            .spawn((
                Mesh2d(assets.shaft_mesh.clone()),
                MeshMaterial2d(assets.material.clone()),
                Transform::from_xyz(-assets.length * 0.5, 0.0, 0.0),
            ))
            .id();

        let arrow = commands
            .spawn((
                arrow_body(*position, *velocity),
                Rig::default().with_joint("head", 0.0, Some(head)),
                AnimationState::default(),
                arrow_clips(),
                Visibility::default(),
            ))
            .add_children(&[shaft, head])
            .id();
        debug!("spawned arrow {arrow:?} at {position:?} with velocity {velocity:?}");
    }
}

/// PhysicsSet: point flying arrows along their velocity.
pub fn orient_projectiles(mut query: Query<(&Projectile, &RigidBody, &mut Transform)>) {
    for (projectile, body, mut transform) in &mut query {
        if let Some(angle) = projectile.heading(body.velocity) {
            transform.rotation = Quat::from_rotation_z(angle);
        }
    }
}

/// EventApplySet: land arrows on their first obstacle contact.
pub fn resolve_projectile_impacts(
    mut commands: Commands,
    time: Res<Time>,
    mut collisions: MessageReader<CollisionMessage>,
    mut projectiles: Query<(
        &mut Projectile,
        &Transform,
        Option<&mut RigidBody>,
        Option<&mut Collider>,
        Option<&mut AnimationState>,
    )>,
    mut events: MessageWriter<GameEvent>,
) {
    for collision in collisions.read() {
        let Ok((mut projectile, transform, body, collider, cues)) = projectiles.get_mut(collision.body)
        else {
            continue;
        };
        let impact = projectile.on_collision(
            collision.other_class,
            body.map(Mut::into_inner),
            collider.map(Mut::into_inner),
            cues.map(Mut::into_inner),
        );
        let Some(impact) = impact else {
            continue;
        };

        let position = transform.translation.truncate();
        info!(
            "arrow {:?} hit obstacle {:?} at ({:.2}, {:.2})",
            collision.body, collision.other, position.x, position.y
        );
        commands
            .entity(collision.body)
            .insert(ExpiresAt(time.elapsed_secs_f64() + impact.despawn_after as f64));
        events.write(GameEvent::ProjectileImpacted {
            obstacle: collision.other,
            position,
        });
    }
}

/// CleanupSet: despawn everything whose time is up.
pub fn cleanup_expired(mut commands: Commands, time: Res<Time>, query: Query<(Entity, &ExpiresAt)>) {
    let now = time.elapsed_secs_f64();
    for (entity, expires) in &query {
        if now >= expires.0 {
            commands.entity(entity).try_despawn();
        }
    }
}

/// CleanupSet: despawn arrows that missed everything and fell out of the world.
pub fn despawn_lost_arrows(
    mut commands: Commands,
    tuning: Res<Tuning>,
    query: Query<(Entity, &Transform, &Projectile)>,
) {
    for (entity, transform, projectile) in &query {
        if projectile.state() == FlightState::Flying && transform.translation.y < tuning.kill_plane_y {
            debug!("arrow {entity:?} fell below the kill plane");
            commands.entity(entity).try_despawn();
        }
    }
}
