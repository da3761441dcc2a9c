//! Built-in planar physics world.
//!
//! Semi-implicit velocity integration under constant gravity, overlap-based
//! contacts between circle and axis-aligned box fixtures, and deferred body
//! destruction. Rect fixtures ignore body rotation; the engine only uses them
//! for debug-drawn colliders where that is acceptable.

use glam::Vec2;
use slotmap::SlotMap;

use super::{BodyDef, BodyKey, ColliderShape, PhysicsWorld};

struct Body {
    position: Vec2,
    rotation: f32,
    linear_velocity: Vec2,
    fixtures: Vec<ColliderShape>,
    dynamic: bool,
    /// Marked by `destroy_body`; excluded from stepping and contacts until
    /// `process_changes` reclaims the slot.
    dead: bool,
}

/// The reference [`PhysicsWorld`] implementation.
pub struct PlanarWorld {
    bodies: SlotMap<BodyKey, Body>,
    pending_destroy: Vec<BodyKey>,
    gravity: Vec2,
}

impl Default for PlanarWorld {
    fn default() -> Self {
        // Y grows downward in display space, so gravity is positive.
        Self::with_gravity(Vec2::new(0.0, 9.8))
    }
}

impl PlanarWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            pending_destroy: Vec::new(),
            gravity,
        }
    }

    /// Live (not destruction-marked) body count.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.values().filter(|b| !b.dead).count()
    }
}

impl PhysicsWorld for PlanarWorld {
    fn create_body(&mut self, def: BodyDef) -> BodyKey {
        self.bodies.insert(Body {
            position: def.position,
            rotation: def.rotation,
            linear_velocity: def.linear_velocity,
            fixtures: Vec::new(),
            dynamic: def.dynamic,
            dead: false,
        })
    }

    fn destroy_body(&mut self, body: BodyKey) {
        if let Some(b) = self.bodies.get_mut(body)
            && !b.dead
        {
            b.dead = true;
            self.pending_destroy.push(body);
        }
    }

    fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if body.dead || !body.dynamic {
                continue;
            }
            body.linear_velocity += self.gravity * dt;
            body.position += body.linear_velocity * dt;
        }
    }

    fn process_changes(&mut self) {
        for key in self.pending_destroy.drain(..) {
            self.bodies.remove(key);
        }
    }

    fn position(&self, body: BodyKey) -> Vec2 {
        self.bodies.get(body).map_or(Vec2::ZERO, |b| b.position)
    }

    fn set_position(&mut self, body: BodyKey, position: Vec2) {
        if let Some(b) = self.bodies.get_mut(body) {
            b.position = position;
        }
    }

    fn rotation(&self, body: BodyKey) -> f32 {
        self.bodies.get(body).map_or(0.0, |b| b.rotation)
    }

    fn set_rotation(&mut self, body: BodyKey, rotation: f32) {
        if let Some(b) = self.bodies.get_mut(body) {
            b.rotation = rotation;
        }
    }

    fn linear_velocity(&self, body: BodyKey) -> Vec2 {
        self.bodies
            .get(body)
            .map_or(Vec2::ZERO, |b| b.linear_velocity)
    }

    fn set_linear_velocity(&mut self, body: BodyKey, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(body) {
            b.linear_velocity = velocity;
        }
    }

    fn set_fixtures(&mut self, body: BodyKey, fixtures: &[ColliderShape]) {
        if let Some(b) = self.bodies.get_mut(body) {
            b.fixtures = fixtures.to_vec();
        }
    }

    fn fixtures(&self, body: BodyKey) -> &[ColliderShape] {
        self.bodies.get(body).map_or(&[], |b| b.fixtures.as_slice())
    }

    fn touching(&self, body: BodyKey) -> Vec<BodyKey> {
        let Some(subject) = self.bodies.get(body).filter(|b| !b.dead) else {
            return Vec::new();
        };

        let mut contacts = Vec::new();
        for (other_key, other) in &self.bodies {
            if other_key == body || other.dead {
                continue;
            }
            let overlapping = subject.fixtures.iter().any(|a| {
                other
                    .fixtures
                    .iter()
                    .any(|b| shapes_overlap(subject.position, *a, other.position, *b))
            });
            if overlapping {
                contacts.push(other_key);
            }
        }
        contacts
    }
}

// ============================================================================
// Overlap tests
// ============================================================================

fn shapes_overlap(pos_a: Vec2, a: ColliderShape, pos_b: Vec2, b: ColliderShape) -> bool {
    match (a, b) {
        (
            ColliderShape::Circle {
                center: ca,
                radius: ra,
            },
            ColliderShape::Circle {
                center: cb,
                radius: rb,
            },
        ) => circles_overlap(pos_a + ca, ra, pos_b + cb, rb),
        (
            ColliderShape::Rect {
                center: ca,
                half_extents: ha,
            },
            ColliderShape::Rect {
                center: cb,
                half_extents: hb,
            },
        ) => rects_overlap(pos_a + ca, ha, pos_b + cb, hb),
        (
            ColliderShape::Circle { center: cc, radius },
            ColliderShape::Rect {
                center: rc,
                half_extents,
            },
        ) => circle_rect_overlap(pos_a + cc, radius, pos_b + rc, half_extents),
        (
            ColliderShape::Rect {
                center: rc,
                half_extents,
            },
            ColliderShape::Circle { center: cc, radius },
        ) => circle_rect_overlap(pos_b + cc, radius, pos_a + rc, half_extents),
    }
}

fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

fn rects_overlap(a: Vec2, ha: Vec2, b: Vec2, hb: Vec2) -> bool {
    (a.x - b.x).abs() < ha.x + hb.x && (a.y - b.y).abs() < ha.y + hb.y
}

fn circle_rect_overlap(center: Vec2, radius: f32, rect: Vec2, half: Vec2) -> bool {
    let closest = center.clamp(rect - half, rect + half);
    center.distance_squared(closest) < radius * radius
}
