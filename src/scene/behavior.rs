//! Sprite behaviors.

use std::any::Any;

use crate::clock::FrameClock;
use crate::device::{DeviceResources, Frame};
use crate::graphics::GraphicsBackend;
use crate::physics::PhysicsWorld;
use crate::scene::sprite::SpriteState;

/// Composable per-sprite logic.
///
/// A sprite carries at most one behavior per concrete type, invoked in
/// attachment order. Every method has an empty default. Behaviors receive the
/// owning sprite's state and the physics world rather than the sprite itself,
/// so they can move, flag, or inspect the sprite while the behavior list is
/// being iterated.
///
/// The `Any` supertrait enables typed lookup through
/// [`Sprite::query_behavior`](crate::scene::Sprite::query_behavior).
#[allow(unused_variables)]
pub trait Behavior<B: GraphicsBackend, P: PhysicsWorld>: Any {
    /// Runs exactly once, when the behavior is attached to its sprite.
    fn on_attach(&mut self, sprite: &mut SpriteState) {}

    /// Per-frame logic. Runs before the physics step of the same tick.
    fn update(&mut self, sprite: &mut SpriteState, world: &mut P, dt: f32) {}

    /// Per-frame drawing, with the sprite's composed transform already
    /// applied to the frame.
    fn draw(&mut self, sprite: &SpriteState, frame: &mut Frame<'_, B>, clock: &FrameClock) {}

    fn create_device_resources(&mut self, resources: &mut DeviceResources<B>) {}

    fn create_device_size_resources(&mut self, resources: &mut DeviceResources<B>) {}

    fn release_device_size_resources(&mut self, resources: &mut DeviceResources<B>) {}

    fn release_device_resources(&mut self, resources: &mut DeviceResources<B>) {}
}
