use bevy::prelude::*;

use super::components::Classification;

/// Normalized pointer event in world space. One pointer is tracked.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum AimInput {
    Press(Vec2),
    Drag(Vec2),
    Release(Vec2),
}

/// Contact-enter between a moving body and another collider.
#[derive(Message, Debug, Clone)]
pub struct CollisionMessage {
    pub body: Entity,
    pub other: Entity,
    /// `None` when the other collider carries no classification.
    pub other_class: Option<Classification>,
}

/// Gameplay events processed through the event pipeline.
#[derive(Message, Debug, Clone)]
pub enum GameEvent {
    SpawnProjectile {
        position: Vec2,
        velocity: Vec2,
    },
    ProjectileImpacted {
        obstacle: Entity,
        position: Vec2,
    },
}
