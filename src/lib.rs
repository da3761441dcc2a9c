//! Glint: a small 2D sprite engine with explicit device-lifecycle management.
//!
//! The core is a three-level resource state machine ([`DeviceResources`]):
//! nothing, size-independent resources, size-dependent resources — advanced
//! lazily by the frame scheduler ([`RenderWindow`]) and torn down wholesale on
//! device loss. On top sit an insertion-ordered sprite scene driven by an
//! opaque physics world, and a winit application layer feeding events into
//! the scheduler.
//!
//! Graphics and physics are both trait seams: production code runs on the
//! bundled wgpu backend and planar world, and the entire lifecycle is
//! testable against mocks.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

#[cfg(feature = "winit")]
pub mod app;
pub mod clock;
pub mod device;
pub mod errors;
pub mod graphics;
pub mod physics;
pub mod scene;
pub mod text;
pub mod window;

#[cfg(feature = "winit")]
pub use app::App;
pub use clock::FrameClock;
pub use device::{DeviceResources, Frame};
pub use errors::{GlintError, Result};
pub use graphics::wgpu_backend::{WgpuBackend, WgpuSettings};
pub use graphics::{Color, DriverKind, GraphicsBackend, GraphicsError, PresentFlags, Rect};
pub use physics::planar::PlanarWorld;
pub use physics::{BodyDef, BodyKey, ColliderShape, PhysicsWorld};
pub use scene::{Behavior, Sprite, SpriteKey, SpriteScene, SpriteState};
pub use window::{MouseButton, RenderHandler, RenderListeners, RenderWindow};
