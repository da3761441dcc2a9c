//! Scene orchestration.
//!
//! [`SpriteScene`] owns the physics world and an insertion-ordered sprite
//! collection, and wires both into the frame cycle: the owning
//! [`RenderHandler`](crate::window::RenderHandler) forwards its update, draw,
//! and device-lifecycle hooks here, and the scene fans them out to every
//! sprite.

pub mod behavior;
pub mod sprite;

pub use behavior::Behavior;
pub use sprite::{Sprite, SpriteState};

use glam::{Affine2, Vec2};
use slotmap::{new_key_type, SlotMap};

use crate::clock::FrameClock;
use crate::device::{DeviceResources, Frame};
use crate::graphics::{Color, GraphicsBackend};
use crate::physics::PhysicsWorld;

new_key_type! {
    /// Stable handle to a sprite inside a [`SpriteScene`].
    pub struct SpriteKey;
}

/// An insertion-ordered collection of sprites over a physics world.
///
/// Sprites added mid-tick are stored immediately (their key is valid right
/// away) but join the update/draw order only at the start of the next tick,
/// so a tick never runs logic for a sprite it did not start with.
pub struct SpriteScene<B: GraphicsBackend, P: PhysicsWorld> {
    pub world: P,
    /// Backdrop fill at the top of every draw.
    pub clear_color: Color,
    /// Applied to the whole scene before any sprite transform (camera).
    pub global_transform: Affine2,
    /// Draws a frames-per-second readout after the sprites.
    pub show_fps: bool,

    sprites: SlotMap<SpriteKey, Sprite<B, P>>,
    order: Vec<SpriteKey>,
    pending_order: Vec<SpriteKey>,
}

impl<B: GraphicsBackend + 'static, P: PhysicsWorld + 'static> SpriteScene<B, P> {
    pub fn new(world: P) -> Self {
        Self {
            world,
            clear_color: Color::CORNFLOWER_BLUE,
            global_transform: Affine2::IDENTITY,
            show_fps: false,
            sprites: SlotMap::with_key(),
            order: Vec::new(),
            pending_order: Vec::new(),
        }
    }

    /// Adds a sprite; it joins the update/draw order at the next tick.
    pub fn add_sprite(&mut self, sprite: Sprite<B, P>) -> SpriteKey {
        let key = self.sprites.insert(sprite);
        self.pending_order.push(key);
        key
    }

    #[must_use]
    pub fn sprite(&self, key: SpriteKey) -> Option<&Sprite<B, P>> {
        self.sprites.get(key)
    }

    pub fn sprite_mut(&mut self, key: SpriteKey) -> Option<&mut Sprite<B, P>> {
        self.sprites.get_mut(key)
    }

    /// Sprites currently participating in the tick order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Runs one scene tick.
    ///
    /// Order: admit pending sprites; update each sprite over a snapshot of
    /// the tick order; step the world; dispose every removal-flagged sprite
    /// (release hooks, then body destruction); finally `process_changes` on
    /// the world, only if something was actually destroyed.
    pub fn update(&mut self, resources: &mut DeviceResources<B>, dt: f32) {
        self.order.append(&mut self.pending_order);

        let tick_order = self.order.clone();
        for &key in &tick_order {
            if let Some(sprite) = self.sprites.get_mut(key) {
                sprite.update(&mut self.world, dt);
            }
        }

        self.world.step(dt);

        let doomed: Vec<SpriteKey> = tick_order
            .iter()
            .copied()
            .filter(|&key| {
                self.sprites
                    .get(key)
                    .is_some_and(|s| s.state.removal_requested)
            })
            .collect();
        if doomed.is_empty() {
            return;
        }

        for key in &doomed {
            if let Some(mut sprite) = self.sprites.remove(*key) {
                log::debug!("disposing sprite '{}'", sprite.state.name);
                sprite.release_device_size_resources(resources);
                sprite.release_device_resources(resources);
                sprite.destroy_bodies(&mut self.world);
            }
        }
        self.order.retain(|key| !doomed.contains(key));
        self.world.process_changes();
    }

    /// Draws the scene: backdrop, global transform, sprites in order,
    /// identity restore, then the optional FPS readout in screen space.
    pub fn draw(&mut self, frame: &mut Frame<'_, B>, clock: &FrameClock) {
        frame.clear(self.clear_color);
        frame.set_transform(self.global_transform);
        for &key in &self.order {
            if let Some(sprite) = self.sprites.get_mut(key) {
                sprite.draw(&self.world, frame, clock);
            }
        }
        frame.set_transform(Affine2::IDENTITY);

        if self.show_fps {
            frame.draw_text(
                &format!("FPS: {:.1}", clock.frames_per_second()),
                14.0,
                Vec2::new(8.0, 8.0),
                Color::DIM_GRAY,
            );
        }
    }

    pub fn create_device_resources(&mut self, resources: &mut DeviceResources<B>) {
        for sprite in self.sprites.values_mut() {
            sprite.create_device_resources(resources);
        }
    }

    pub fn create_device_size_resources(&mut self, resources: &mut DeviceResources<B>) {
        for sprite in self.sprites.values_mut() {
            sprite.create_device_size_resources(resources);
        }
    }

    pub fn release_device_size_resources(&mut self, resources: &mut DeviceResources<B>) {
        for sprite in self.sprites.values_mut() {
            sprite.release_device_size_resources(resources);
        }
    }

    pub fn release_device_resources(&mut self, resources: &mut DeviceResources<B>) {
        for sprite in self.sprites.values_mut() {
            sprite.release_device_resources(resources);
        }
    }
}
