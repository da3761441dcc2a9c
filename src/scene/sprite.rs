//! Sprites: physics-backed scene entities with composable behaviors.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Affine2, Vec2};

use crate::clock::FrameClock;
use crate::device::{DeviceResources, Frame};
use crate::graphics::{Color, GraphicsBackend, Rect};
use crate::physics::{
    to_display, scalar_to_display, BodyDef, BodyKey, ColliderShape, PhysicsWorld,
};
use crate::scene::behavior::Behavior;

static NEXT_SPRITE_ID: AtomicU64 = AtomicU64::new(1);

/// Plain data of a sprite, separated from its behavior list so behaviors can
/// mutate it while the list is iterated.
pub struct SpriteState {
    /// Process-unique id, assigned at construction.
    pub id: u64,
    pub name: String,
    /// Handle of the physics body backing position and rotation.
    pub body: BodyKey,
    /// Rotation pivot in display pixels, relative to the sprite origin.
    pub center: Vec2,
    /// Marks the sprite for disposal at the end of the current update tick.
    pub removal_requested: bool,
    /// When set, the body's fixtures are drawn in this color.
    pub debug_color: Option<Color>,
    /// Enables per-tick contact enumeration into [`touching`](Self::touching).
    pub hit_interest: bool,
    /// Bodies overlapping this sprite's body, refreshed once per update tick
    /// while [`hit_interest`](Self::hit_interest) is set; stale otherwise.
    pub touching: Vec<BodyKey>,
}

impl SpriteState {
    /// Position in display pixels, read from the physics body.
    #[must_use]
    pub fn position<P: PhysicsWorld>(&self, world: &P) -> Vec2 {
        to_display(world.position(self.body))
    }

    /// Moves the physics body to a display-pixel position.
    pub fn set_position<P: PhysicsWorld>(&self, world: &mut P, position: Vec2) {
        world.set_position(self.body, crate::physics::to_simulation(position));
    }

    /// Body rotation in radians.
    #[must_use]
    pub fn rotation<P: PhysicsWorld>(&self, world: &P) -> f32 {
        world.rotation(self.body)
    }

    pub fn set_rotation<P: PhysicsWorld>(&self, world: &mut P, rotation: f32) {
        world.set_rotation(self.body, rotation);
    }
}

/// A scene entity: a physics body, an ordered behavior list, and child
/// sprites drawn under the parent's composed transform.
pub struct Sprite<B: GraphicsBackend, P: PhysicsWorld> {
    pub state: SpriteState,
    behaviors: Vec<(TypeId, Box<dyn Behavior<B, P>>)>,
    children: Vec<Sprite<B, P>>,
}

impl<B: GraphicsBackend + 'static, P: PhysicsWorld + 'static> Sprite<B, P> {
    /// Creates a sprite with a fresh dynamic body at the origin.
    pub fn new(world: &mut P, name: impl Into<String>) -> Self {
        Self::with_body_def(world, name, BodyDef::default())
    }

    pub fn with_body_def(world: &mut P, name: impl Into<String>, def: BodyDef) -> Self {
        let body = world.create_body(def);
        Self {
            state: SpriteState {
                id: NEXT_SPRITE_ID.fetch_add(1, Ordering::Relaxed),
                name: name.into(),
                body,
                center: Vec2::ZERO,
                removal_requested: false,
                debug_color: None,
                hit_interest: false,
                touching: Vec::new(),
            },
            behaviors: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Attaches a behavior, firing its `on_attach` hook.
    ///
    /// At most one behavior per concrete type: attaching a duplicate type is
    /// ignored.
    pub fn add_behavior<T: Behavior<B, P>>(&mut self, behavior: T) {
        let type_id = TypeId::of::<T>();
        if self.behaviors.iter().any(|(id, _)| *id == type_id) {
            log::debug!(
                "sprite '{}': duplicate behavior {:?} ignored",
                self.state.name,
                type_id
            );
            return;
        }
        let mut behavior = Box::new(behavior);
        behavior.on_attach(&mut self.state);
        self.behaviors.push((type_id, behavior));
    }

    /// Looks up an attached behavior by concrete type.
    #[must_use]
    pub fn query_behavior<T: Behavior<B, P>>(&self) -> Option<&T> {
        let type_id = TypeId::of::<T>();
        self.behaviors
            .iter()
            .find(|(id, _)| *id == type_id)
            .and_then(|(_, b)| (b.as_ref() as &dyn Any).downcast_ref::<T>())
    }

    #[must_use]
    pub fn query_behavior_mut<T: Behavior<B, P>>(&mut self) -> Option<&mut T> {
        let type_id = TypeId::of::<T>();
        self.behaviors
            .iter_mut()
            .find(|(id, _)| *id == type_id)
            .and_then(|(_, b)| (b.as_mut() as &mut dyn Any).downcast_mut::<T>())
    }

    pub fn add_child(&mut self, child: Sprite<B, P>) {
        self.children.push(child);
    }

    #[must_use]
    pub fn children(&self) -> &[Sprite<B, P>] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Sprite<B, P>] {
        &mut self.children
    }

    /// Runs one update tick: behaviors in attachment order, then contact
    /// enumeration if this sprite registered hit interest, then children.
    pub fn update(&mut self, world: &mut P, dt: f32) {
        for (_, behavior) in &mut self.behaviors {
            behavior.update(&mut self.state, world, dt);
        }
        if self.state.hit_interest {
            self.state.touching = world.touching(self.state.body);
        }
        for child in &mut self.children {
            child.update(world, dt);
        }
    }

    /// Draws this sprite and its children.
    ///
    /// The sprite transform — body translation composed with rotation about
    /// [`SpriteState::center`] — is pushed onto the frame's current transform
    /// for behaviors, debug shapes, and children alike; the caller's
    /// transform is restored afterwards.
    pub fn draw(&mut self, world: &P, frame: &mut Frame<'_, B>, clock: &FrameClock) {
        let parent = frame.transform();
        let position = self.state.position(world);
        let rotation = self.state.rotation(world);
        let center = self.state.center;

        let local = Affine2::from_translation(position)
            * Affine2::from_translation(center)
            * Affine2::from_angle(rotation)
            * Affine2::from_translation(-center);
        let composed = parent * local;

        frame.set_transform(composed);
        for (_, behavior) in &mut self.behaviors {
            behavior.draw(&self.state, frame, clock);
        }
        if let Some(color) = self.state.debug_color {
            draw_fixtures(world, self.state.body, color, frame);
        }

        for child in &mut self.children {
            frame.set_transform(composed);
            child.draw(world, frame, clock);
        }
        frame.set_transform(parent);
    }

    /// Flags this sprite for disposal at the end of the current update tick.
    /// Children are owned and go with it.
    pub fn request_removal(&mut self) {
        self.state.removal_requested = true;
    }

    pub fn create_device_resources(&mut self, resources: &mut DeviceResources<B>) {
        for (_, behavior) in &mut self.behaviors {
            behavior.create_device_resources(resources);
        }
        for child in &mut self.children {
            child.create_device_resources(resources);
        }
    }

    pub fn create_device_size_resources(&mut self, resources: &mut DeviceResources<B>) {
        for (_, behavior) in &mut self.behaviors {
            behavior.create_device_size_resources(resources);
        }
        for child in &mut self.children {
            child.create_device_size_resources(resources);
        }
    }

    pub fn release_device_size_resources(&mut self, resources: &mut DeviceResources<B>) {
        for (_, behavior) in &mut self.behaviors {
            behavior.release_device_size_resources(resources);
        }
        for child in &mut self.children {
            child.release_device_size_resources(resources);
        }
    }

    pub fn release_device_resources(&mut self, resources: &mut DeviceResources<B>) {
        for (_, behavior) in &mut self.behaviors {
            behavior.release_device_resources(resources);
        }
        for child in &mut self.children {
            child.release_device_resources(resources);
        }
    }

    /// Destroys this sprite's body and every child body. Destruction is
    /// deferred inside the world until its next `process_changes`.
    pub fn destroy_bodies(&self, world: &mut P) {
        world.destroy_body(self.state.body);
        for child in &self.children {
            child.destroy_bodies(world);
        }
    }
}

fn draw_fixtures<B: GraphicsBackend, P: PhysicsWorld>(
    world: &P,
    body: BodyKey,
    color: Color,
    frame: &mut Frame<'_, B>,
) {
    // Fixtures are stored in simulation units; debug drawing happens in the
    // sprite's local display space. Circles fill, boxes outline.
    for fixture in world.fixtures(body) {
        match *fixture {
            ColliderShape::Circle { center, radius } => {
                frame.fill_circle(to_display(center), scalar_to_display(radius), color);
            }
            ColliderShape::Rect {
                center,
                half_extents,
            } => {
                let center = to_display(center);
                let half = to_display(half_extents);
                frame.stroke_rect(
                    Rect::new(
                        center.x - half.x,
                        center.y - half.y,
                        half.x * 2.0,
                        half.y * 2.0,
                    ),
                    1.0,
                    color,
                );
            }
        }
    }
}
