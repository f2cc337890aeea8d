use bevy::prelude::*;

use crate::config::tuning::Tuning;

/// Constant ambient gravity, shared by the integrator and the aim preview.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Gravity(pub Vec2);

impl Default for Gravity {
    fn default() -> Self {
        Self(Tuning::default().gravity_vec())
    }
}

/// Point-mass body integrated by [`integrate_bodies`].
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub velocity: Vec2,
    /// Non-simulated bodies keep their position and ignore gravity.
    pub simulated: bool,
}

impl RigidBody {
    pub fn dynamic(velocity: Vec2) -> Self {
        Self {
            velocity,
            simulated: true,
        }
    }

    /// Zero the velocity and stop integrating.
    pub fn freeze(&mut self) {
        self.velocity = Vec2::ZERO;
        self.simulated = false;
    }
}

/// PhysicsSet: semi-implicit Euler, gravity then position.
pub fn integrate_bodies(
    tuning: Res<Tuning>,
    gravity: Res<Gravity>,
    mut query: Query<(&mut Transform, &mut RigidBody)>,
) {
    let dt = tuning.dt;
    for (mut transform, mut body) in &mut query {
        if !body.simulated {
            continue;
        }
        body.velocity += gravity.0 * dt;
        transform.translation.x += body.velocity.x * dt;
        transform.translation.y += body.velocity.y * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_stops_the_body() {
        let mut body = RigidBody::dynamic(Vec2::new(3.0, 4.0));
        body.freeze();
        assert_eq!(body.velocity, Vec2::ZERO);
        assert!(!body.simulated);
    }

    #[test]
    fn integration_follows_gravity_and_skips_frozen_bodies() {
        let mut app = App::new();
        app.insert_resource(Tuning {
            dt: 0.5,
            ..Tuning::default()
        })
        .insert_resource(Gravity(Vec2::new(0.0, -10.0)))
        .add_systems(Update, integrate_bodies);

        let moving = app
            .world_mut()
            .spawn((Transform::default(), RigidBody::dynamic(Vec2::new(2.0, 0.0))))
            .id();
        let frozen = app
            .world_mut()
            .spawn((
                Transform::from_xyz(1.0, 1.0, 0.0),
                RigidBody {
                    velocity: Vec2::ZERO,
                    simulated: false,
                },
            ))
            .id();

        app.update();

        let body = app.world().get::<RigidBody>(moving).unwrap();
        assert_eq!(body.velocity, Vec2::new(2.0, -5.0));
        let tf = app.world().get::<Transform>(moving).unwrap();
        assert_eq!(tf.translation.truncate(), Vec2::new(1.0, -2.5));

        let tf = app.world().get::<Transform>(frozen).unwrap();
        assert_eq!(tf.translation.truncate(), Vec2::ONE);
    }
}
