pub mod aim;
pub mod animation;
pub mod collision;
pub mod components;
pub mod events;
pub mod input;
pub mod physics;
pub mod projectile;
