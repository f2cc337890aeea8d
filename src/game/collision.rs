use bevy::prelude::*;

use super::components::Classification;
use super::events::CollisionMessage;
use super::physics::RigidBody;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Circle { radius: f32 },
    /// Axis-aligned box; rotation is ignored.
    Rect { half_extents: Vec2 },
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    /// Disabled colliders neither report nor receive contacts.
    pub enabled: bool,
}

impl Collider {
    pub fn circle(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Circle { radius },
            enabled: true,
        }
    }

    pub fn rect(size: Vec2) -> Self {
        Self {
            shape: ColliderShape::Rect {
                half_extents: size * 0.5,
            },
            enabled: true,
        }
    }
}

/// Colliders a moving body currently overlaps, so only new contacts are reported.
#[derive(Component, Debug, Default)]
pub struct Contacts(pub Vec<Entity>);

/// Overlap test between two shapes centred at `a_pos` and `b_pos`.
pub fn shapes_overlap(a: ColliderShape, a_pos: Vec2, b: ColliderShape, b_pos: Vec2) -> bool {
    use ColliderShape::*;
    match (a, b) {
        (Circle { radius: ra }, Circle { radius: rb }) => {
            a_pos.distance_squared(b_pos) <= (ra + rb) * (ra + rb)
        }
        (Circle { radius }, Rect { half_extents }) => circle_rect(a_pos, radius, b_pos, half_extents),
        (Rect { half_extents }, Circle { radius }) => circle_rect(b_pos, radius, a_pos, half_extents),
        (Rect { half_extents: ha }, Rect { half_extents: hb }) => {
            let d = (a_pos - b_pos).abs();
            d.x <= ha.x + hb.x && d.y <= ha.y + hb.y
        }
    }
}

fn circle_rect(center: Vec2, radius: f32, rect_pos: Vec2, half_extents: Vec2) -> bool {
    let closest = center.clamp(rect_pos - half_extents, rect_pos + half_extents);
    center.distance_squared(closest) <= radius * radius
}

/// CollisionDetectSet: moving bodies against every other enabled collider.
/// Reports contact-enter only.
pub fn detect_collisions(
    mut bodies: Query<(Entity, &Transform, &Collider, &mut Contacts), With<RigidBody>>,
    colliders: Query<(Entity, &Transform, &Collider, Option<&Classification>)>,
    mut collision_events: MessageWriter<CollisionMessage>,
) {
    for (body, body_tf, body_collider, mut contacts) in &mut bodies {
        if !body_collider.enabled {
            contacts.0.clear();
            continue;
        }
        let body_pos = body_tf.translation.truncate();

        let mut touching = Vec::new();
        for (other, other_tf, other_collider, class) in &colliders {
            if other == body || !other_collider.enabled {
                continue;
            }
            let other_pos = other_tf.translation.truncate();
            if !shapes_overlap(body_collider.shape, body_pos, other_collider.shape, other_pos) {
                continue;
            }
            touching.push(other);
            if !contacts.0.contains(&other) {
                collision_events.write(CollisionMessage {
                    body,
                    other,
                    other_class: class.copied(),
                });
            }
        }
        contacts.0 = touching;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_against_box_edges() {
        let ground = ColliderShape::Rect {
            half_extents: Vec2::new(5.0, 0.5),
        };
        let tip = ColliderShape::Circle { radius: 0.1 };
        assert!(shapes_overlap(tip, Vec2::new(2.0, 0.55), ground, Vec2::ZERO));
        assert!(!shapes_overlap(tip, Vec2::new(2.0, 0.7), ground, Vec2::ZERO));
        assert!(shapes_overlap(ground, Vec2::ZERO, tip, Vec2::new(5.05, 0.0)));
    }

    #[test]
    fn circles_and_boxes() {
        let c = ColliderShape::Circle { radius: 1.0 };
        assert!(shapes_overlap(c, Vec2::ZERO, c, Vec2::new(1.9, 0.0)));
        assert!(!shapes_overlap(c, Vec2::ZERO, c, Vec2::new(2.1, 0.0)));

        let b = ColliderShape::Rect {
            half_extents: Vec2::ONE,
        };
        assert!(shapes_overlap(b, Vec2::ZERO, b, Vec2::new(1.5, 1.5)));
        assert!(!shapes_overlap(b, Vec2::ZERO, b, Vec2::new(2.5, 0.0)));
    }
}
