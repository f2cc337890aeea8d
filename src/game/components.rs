use bevy::prelude::*;

// ── Marker components ───────────────────────────────────────────────

/// The player-controlled bow wielder.
#[derive(Component)]
pub struct Archer;

/// Where arrows leave the bow. Child of the archer.
#[derive(Component)]
pub struct ArrowSpawnPoint;

/// Parent of all trajectory preview dots.
#[derive(Component)]
pub struct TrajectoryDotParent;

#[derive(Component)]
pub struct TrajectoryDot;

/// Visual tip of an arrow, driven by the arrow's own rig.
#[derive(Component)]
pub struct ArrowHead;

// ── Collision classification ────────────────────────────────────────

/// What a collider is, as seen by the things that hit it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Arrows stick into it.
    Obstacle,
    /// Arrows fly through it.
    Prop,
}

// ── Lifetime ────────────────────────────────────────────────────────

/// Despawn once `Time::elapsed_secs_f64` reaches this value.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ExpiresAt(pub f64);

// ── Assets ──────────────────────────────────────────────────────────

/// Pre-built mesh/material handles for preview dots.
#[derive(Resource)]
pub struct DotAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<ColorMaterial>,
}

/// Pre-built mesh/material handles for arrow rendering.
#[derive(Resource)]
pub struct ArrowAssets {
    pub shaft_mesh: Handle<Mesh>,
    pub head_mesh: Handle<Mesh>,
    pub material: Handle<ColorMaterial>,
    pub head_material: Handle<ColorMaterial>,
    pub length: f32,
}
