//! Graphics backend abstraction.
//!
//! The engine core never talks to a concrete graphics API. Everything
//! device-shaped goes through [`GraphicsBackend`], whose associated types keep
//! the device, swap chain, render target, and brush opaque. The production
//! implementation lives in [`wgpu_backend`]; tests drive the lifecycle state
//! machine with recording mocks.
//!
//! # Error model
//!
//! Drawing follows a deferred error model: [`begin_draw`] never fails, and
//! failures that occur while a frame is open (surface acquisition, device
//! loss) surface at [`end_draw`] or [`present`]. The scheduler inspects the
//! error's classification to decide between local recovery and propagation.
//!
//! [`begin_draw`]: GraphicsBackend::begin_draw
//! [`end_draw`]: GraphicsBackend::end_draw
//! [`present`]: GraphicsBackend::present

pub mod wgpu_backend;

use glam::{Affine2, Vec2};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;
use thiserror::Error;

/// Combined windowing-handle trait required by graphics backends.
///
/// Implemented automatically for any type carrying both raw handles, so any
/// windowing library (winit, sdl2, ...) can plug in.
pub trait WindowHandle: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle> WindowHandle for T {}

/// Shared, thread-safe handle to a native window, suitable for binding a
/// swap chain.
pub type NativeWindow = Arc<dyn WindowHandle + Send + Sync>;

// ============================================================================
// Value types
// ============================================================================

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const CORNFLOWER_BLUE: Self = Self::rgb(0.392, 0.584, 0.929);
    pub const DIM_GRAY: Self = Self::rgb(0.412, 0.412, 0.412);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }
}

/// An axis-aligned rectangle in target coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.x + self.width, self.y),
            Vec2::new(self.x + self.width, self.y + self.height),
            Vec2::new(self.x, self.y + self.height),
        ]
    }
}

/// Driver kinds tried when creating a device, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    /// A real GPU adapter.
    Hardware,
    /// A software / fallback adapter.
    Fallback,
}

impl DriverKind {
    /// Prioritized creation order: first success wins, exhausting the list is
    /// fatal for the initialization call.
    pub const PRIORITY: [DriverKind; 2] = [DriverKind::Hardware, DriverKind::Fallback];
}

bitflags::bitflags! {
    /// Flags carried through to the backend's present call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PresentFlags: u32 {
        /// Do not block waiting for the presentation surface.
        const DO_NOT_WAIT = 1;
    }
}

impl PresentFlags {
    pub const NONE: Self = Self::empty();
}

// ============================================================================
// Errors
// ============================================================================

/// Errors reported by a graphics backend.
///
/// [`DeviceRemoved`](Self::DeviceRemoved) and [`DeviceReset`](Self::DeviceReset)
/// are the distinguished recoverable pair: the frame scheduler responds to
/// either by tearing down and lazily rebuilding the device generation. Every
/// other variant propagates.
#[derive(Error, Debug)]
pub enum GraphicsError {
    /// The device was removed (driver crash, GPU unplugged).
    #[error("graphics device removed")]
    DeviceRemoved,

    /// The device was reset and its resources invalidated.
    #[error("graphics device reset")]
    DeviceReset,

    /// The requested driver kind cannot produce a device on this machine.
    #[error("no usable {0:?} driver")]
    DriverUnavailable(DriverKind),

    /// Any other backend failure; fatal by convention.
    #[error("graphics backend error: {0}")]
    Backend(String),
}

impl GraphicsError {
    /// True for the recoverable device-loss pair.
    #[must_use]
    pub fn is_device_loss(&self) -> bool {
        matches!(self, Self::DeviceRemoved | Self::DeviceReset)
    }
}

// ============================================================================
// Backend trait
// ============================================================================

/// Capability surface of a 2D graphics backend.
///
/// Resource handles are associated types so the engine core stays agnostic of
/// the implementation. Ownership of the handles lives in
/// [`DeviceResources`](crate::device::DeviceResources); the backend is stateless
/// apart from whatever a concrete implementation needs to service these calls.
pub trait GraphicsBackend {
    /// GPU device handle.
    type Device;
    /// Presentation surface bound to a window.
    type SwapChain;
    /// Drawing context; "surface-valid" only while a drawable is attached.
    type Target;
    /// Solid-color paint object.
    type Brush;
    /// Window representation a swap chain binds to.
    type Window;

    // --- resource creation ---------------------------------------------------

    /// Creates a device using the given driver kind.
    fn create_device(&mut self, driver: DriverKind) -> Result<Self::Device, GraphicsError>;

    /// Creates a drawing context for the device. The target starts without a
    /// drawable surface and is not valid until one is attached.
    fn create_target(&mut self, device: &Self::Device) -> Result<Self::Target, GraphicsError>;

    /// Creates a swap chain presenting into the given window.
    fn create_swap_chain(
        &mut self,
        device: &Self::Device,
        window: &Self::Window,
    ) -> Result<Self::SwapChain, GraphicsError>;

    /// Creates a solid-color brush usable with the given target.
    fn create_solid_brush(
        &mut self,
        target: &Self::Target,
        color: Color,
    ) -> Result<Self::Brush, GraphicsError>;

    /// Changes the color of an existing brush.
    fn set_brush_color(&mut self, brush: &mut Self::Brush, color: Color);

    // --- surface binding -----------------------------------------------------

    /// Binds the swap chain's current backbuffer as the target's drawable
    /// surface.
    fn attach_swap_chain_surface(
        &mut self,
        swap_chain: &mut Self::SwapChain,
        target: &mut Self::Target,
    ) -> Result<(), GraphicsError>;

    /// Binds a CPU-addressable bitmap of explicit dimensions as the target's
    /// drawable surface.
    fn attach_cpu_surface(
        &mut self,
        device: &Self::Device,
        target: &mut Self::Target,
        width: u32,
        height: u32,
    ) -> Result<(), GraphicsError>;

    /// Detaches the target's drawable surface. The target reports invalid
    /// until a surface is attached again.
    fn detach_surface(&mut self, target: &mut Self::Target);

    /// Whether the target currently has a valid drawable surface.
    fn target_is_valid(&self, target: &Self::Target) -> bool;

    /// Resizes the swap chain's buffers. A zero width or height means "keep
    /// the current dimension". Must only be called while no surface is
    /// attached to the target.
    fn resize_buffers(
        &mut self,
        swap_chain: &mut Self::SwapChain,
        width: u32,
        height: u32,
    ) -> Result<(), GraphicsError>;

    // --- frame lifecycle -----------------------------------------------------

    /// Opens a frame on the target. Never fails; errors are deferred to
    /// [`end_draw`](Self::end_draw).
    fn begin_draw(&mut self, target: &mut Self::Target);

    /// Closes the frame, flushing recorded drawing. Reports errors deferred
    /// since `begin_draw`, including device loss.
    fn end_draw(&mut self, target: &mut Self::Target) -> Result<(), GraphicsError>;

    /// Presents the swap chain's backbuffer. `sync_interval > 0` requests
    /// vsync pacing.
    fn present(
        &mut self,
        swap_chain: &mut Self::SwapChain,
        sync_interval: u32,
        flags: PresentFlags,
    ) -> Result<(), GraphicsError>;

    // --- drawing -------------------------------------------------------------

    /// Fills the whole target with a color.
    fn clear(&mut self, target: &mut Self::Target, color: Color);

    /// Sets the transform applied to subsequent drawing.
    fn set_transform(&mut self, target: &mut Self::Target, transform: Affine2);

    /// Returns the transform currently applied to drawing.
    fn transform(&self, target: &Self::Target) -> Affine2;

    /// Fills a rectangle with the brush color.
    fn fill_rect(&mut self, target: &mut Self::Target, rect: Rect, brush: &Self::Brush);

    /// Strokes a rectangle outline with the given line width.
    fn stroke_rect(
        &mut self,
        target: &mut Self::Target,
        rect: Rect,
        line_width: f32,
        brush: &Self::Brush,
    );

    /// Draws a line segment with the given width.
    fn draw_line(
        &mut self,
        target: &mut Self::Target,
        from: Vec2,
        to: Vec2,
        line_width: f32,
        brush: &Self::Brush,
    );

    /// Fills a circle with the brush color.
    fn fill_circle(
        &mut self,
        target: &mut Self::Target,
        center: Vec2,
        radius: f32,
        brush: &Self::Brush,
    );

    /// Current drawable surface dimensions in pixels.
    fn target_size(&self, target: &Self::Target) -> (f32, f32);
}
