//! Physics collaborator.
//!
//! The scene layer drives an opaque 2D world through [`PhysicsWorld`]; sprites
//! hold [`BodyKey`] handles and never touch world internals. The built-in
//! [`PlanarWorld`](planar::PlanarWorld) covers the engine's own needs;
//! wrapping a full physics library behind the same trait is the intended
//! extension point.
//!
//! Display coordinates are pixels, simulation coordinates are meters, scaled
//! by [`PIXELS_PER_METER`]. The scene converts at the boundary; everything
//! inside a world implementation stays in meters.

pub mod planar;

pub use planar::PlanarWorld;

use glam::Vec2;
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle to a body inside a [`PhysicsWorld`].
    pub struct BodyKey;
}

/// Display pixels per simulation meter.
pub const PIXELS_PER_METER: f32 = 64.0;

/// Converts a display-space (pixel) vector to simulation meters.
#[inline]
#[must_use]
pub fn to_simulation(display: Vec2) -> Vec2 {
    display / PIXELS_PER_METER
}

/// Converts a simulation-space (meter) vector to display pixels.
#[inline]
#[must_use]
pub fn to_display(simulation: Vec2) -> Vec2 {
    simulation * PIXELS_PER_METER
}

/// Converts a display-space (pixel) scalar to simulation meters.
#[inline]
#[must_use]
pub fn scalar_to_simulation(display: f32) -> f32 {
    display / PIXELS_PER_METER
}

/// Converts a simulation-space (meter) scalar to display pixels.
#[inline]
#[must_use]
pub fn scalar_to_display(simulation: f32) -> f32 {
    simulation * PIXELS_PER_METER
}

/// Collision fixture shape, in simulation units, relative to the body origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Circle { center: Vec2, radius: f32 },
    /// Axis-aligned box given by half extents around `center`.
    Rect { center: Vec2, half_extents: Vec2 },
}

/// Initial state for a new body, in simulation units.
#[derive(Debug, Clone, Copy)]
pub struct BodyDef {
    pub position: Vec2,
    pub rotation: f32,
    pub linear_velocity: Vec2,
    /// Static bodies ignore gravity and never move during `step`.
    pub dynamic: bool,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            linear_velocity: Vec2::ZERO,
            dynamic: true,
        }
    }
}

/// Capability surface of a 2D physics world.
///
/// Destruction is deferred: [`destroy_body`](Self::destroy_body) only marks
/// the body, which stops participating in stepping and contacts immediately
/// but keeps its key alive until [`process_changes`](Self::process_changes)
/// reclaims it. The scene calls `process_changes` once per update tick, and
/// only on ticks that actually destroyed something.
///
/// Accessors taking a key that is dead or unknown return zero values; keys
/// are managed by the sprites that own them, so that path is a logic error
/// upstream, not something worth threading `Result` through every read.
pub trait PhysicsWorld {
    fn create_body(&mut self, def: BodyDef) -> BodyKey;

    /// Marks a body for destruction at the next `process_changes`.
    fn destroy_body(&mut self, body: BodyKey);

    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Reclaims bodies marked by `destroy_body`.
    fn process_changes(&mut self);

    fn position(&self, body: BodyKey) -> Vec2;
    fn set_position(&mut self, body: BodyKey, position: Vec2);

    /// Rotation in radians.
    fn rotation(&self, body: BodyKey) -> f32;
    fn set_rotation(&mut self, body: BodyKey, rotation: f32);

    fn linear_velocity(&self, body: BodyKey) -> Vec2;
    fn set_linear_velocity(&mut self, body: BodyKey, velocity: Vec2);

    /// Replaces the body's collision fixtures.
    fn set_fixtures(&mut self, body: BodyKey, fixtures: &[ColliderShape]);
    fn fixtures(&self, body: BodyKey) -> &[ColliderShape];

    /// Keys of live bodies whose fixtures currently overlap this body's.
    fn touching(&self, body: BodyKey) -> Vec<BodyKey>;
}
