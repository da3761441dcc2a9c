//! Device resource ownership and lifecycle.
//!
//! [`DeviceResources`] owns the graphics device, swap chain, render target,
//! and cached solid brush for one window, and moves them through their
//! lifecycle: created lazily on the first frame (or explicitly), swap-chain
//! buffers rebuilt on every resize, everything torn down and rebuilt wholesale
//! on device loss.
//!
//! # Invariants
//!
//! - `device_available()` ⇔ a render target exists and the backend reports its
//!   surface valid. Resize is a no-op and drawing is illegal while this is
//!   false.
//! - Exactly one target exists per device generation. After loss + recovery a
//!   strictly new generation is created and every size-dependent resource
//!   cached against the old one is invalid.

use glam::{Affine2, Vec2};

use crate::errors::{GlintError, Result};
use crate::graphics::{Color, DriverKind, GraphicsBackend, Rect};
use crate::graphics::{GraphicsError, PresentFlags};
use crate::text::{TextFormatCache, TextLayoutCache};

/// Graphics device, swap chain, render target, and brush for one window.
///
/// Owned exclusively by a [`RenderWindow`](crate::window::RenderWindow); all
/// mutation happens on the single render thread.
pub struct DeviceResources<B: GraphicsBackend> {
    /// The backend servicing every device operation.
    pub backend: B,
    /// Text formats cached by size (device-independent).
    pub text_formats: TextFormatCache,
    /// Text layouts cached by `(text, family, size)` (device-independent).
    pub text_layouts: TextLayoutCache,

    device: Option<B::Device>,
    swap_chain: Option<B::SwapChain>,
    target: Option<B::Target>,
    solid_brush: Option<B::Brush>,
    cpu_target: bool,
    generation: u64,
}

impl<B: GraphicsBackend> DeviceResources<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            text_formats: TextFormatCache::new(),
            text_layouts: TextLayoutCache::new(),
            device: None,
            swap_chain: None,
            target: None,
            solid_brush: None,
            cpu_target: false,
            generation: 0,
        }
    }

    /// Whether the device is usable: a target exists and its drawable surface
    /// is valid.
    #[must_use]
    pub fn device_available(&self) -> bool {
        self.target
            .as_ref()
            .is_some_and(|t| self.backend.target_is_valid(t))
    }

    /// One create-to-release lifetime counter; bumped by every successful
    /// initialize call.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Creates the device, render target, solid brush, and a swap chain bound
    /// to `window`, then binds the swap-chain backbuffer as the target's
    /// drawable surface.
    ///
    /// Driver kinds are tried in [`DriverKind::PRIORITY`] order; exhausting
    /// the list fails the call with
    /// [`NoSupportedDriver`](GlintError::NoSupportedDriver).
    pub fn initialize_device(&mut self, window: &B::Window) -> Result<()> {
        let device = self.create_device_any_driver()?;
        let mut target = self.backend.create_target(&device)?;
        let brush = self.backend.create_solid_brush(&target, Color::BLACK)?;
        let mut swap_chain = self.backend.create_swap_chain(&device, window)?;
        self.backend
            .attach_swap_chain_surface(&mut swap_chain, &mut target)?;

        self.device = Some(device);
        self.swap_chain = Some(swap_chain);
        self.target = Some(target);
        self.solid_brush = Some(brush);
        self.cpu_target = false;
        self.generation += 1;
        log::info!("device resources initialized (generation {})", self.generation);
        Ok(())
    }

    /// Like [`initialize_device`](Self::initialize_device) but binds a
    /// CPU-addressable bitmap of explicit dimensions as the drawable surface
    /// instead of the swap-chain backbuffer.
    ///
    /// Targets created this way require explicit dimensions on every
    /// [`resize`](Self::resize).
    pub fn initialize_device_cpu(
        &mut self,
        window: &B::Window,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let device = self.create_device_any_driver()?;
        let mut target = self.backend.create_target(&device)?;
        let brush = self.backend.create_solid_brush(&target, Color::BLACK)?;
        let swap_chain = self.backend.create_swap_chain(&device, window)?;
        self.backend
            .attach_cpu_surface(&device, &mut target, width, height)?;

        self.device = Some(device);
        self.swap_chain = Some(swap_chain);
        self.target = Some(target);
        self.solid_brush = Some(brush);
        self.cpu_target = true;
        self.generation += 1;
        log::info!(
            "device resources initialized with cpu target {width}x{height} (generation {})",
            self.generation
        );
        Ok(())
    }

    /// Rebuilds the swap-chain buffers for a new window size.
    ///
    /// No-op when `!device_available()`. Width or height of `0` keeps the
    /// current dimension (desktop swap chains infer the client size); the
    /// CPU-target path requires both dimensions explicitly.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if !self.device_available() {
            return Ok(());
        }
        let (Some(target), Some(swap_chain)) = (self.target.as_mut(), self.swap_chain.as_mut())
        else {
            return Ok(());
        };

        // Validate before touching the surface: a rejected resize must leave
        // the device available, attached, and on its current generation.
        if self.cpu_target && (width == 0 || height == 0) {
            return Err(GraphicsError::Backend(
                "cpu-backed target resize requires explicit dimensions".into(),
            )
            .into());
        }

        self.backend.detach_surface(target);
        if self.cpu_target {
            let Some(device) = self.device.as_ref() else {
                return Ok(());
            };
            self.backend.resize_buffers(swap_chain, width, height)?;
            self.backend
                .attach_cpu_surface(device, target, width, height)?;
        } else {
            self.backend.resize_buffers(swap_chain, width, height)?;
            self.backend.attach_swap_chain_surface(swap_chain, target)?;
        }
        Ok(())
    }

    /// Disposes solid brush, swap chain, render target, and device, in that
    /// order; dependent resources must die before the device. Resets
    /// `device_available()` to false.
    pub fn release_device_resources(&mut self) {
        self.solid_brush = None;
        self.swap_chain = None;
        if let Some(target) = self.target.as_mut() {
            self.backend.detach_surface(target);
        }
        self.target = None;
        self.device = None;
        log::info!("device resources released (generation {})", self.generation);
    }

    /// Sets the cached solid brush to `color` and returns it.
    ///
    /// The same brush object is mutated and returned on every call. Fails
    /// with [`NotInitialized`](GlintError::NotInitialized) before the first
    /// initialize call.
    pub fn get_color(&mut self, color: Color) -> Result<&B::Brush> {
        let brush = self
            .solid_brush
            .as_mut()
            .ok_or(GlintError::NotInitialized {
                required_call: "initialize_device",
            })?;
        self.backend.set_brush_color(brush, color);
        Ok(&*brush)
    }

    /// Opens a frame on the render target.
    pub fn begin_draw(&mut self) -> Result<()> {
        let target = self.target.as_mut().ok_or(GlintError::NotInitialized {
            required_call: "initialize_device",
        })?;
        self.backend.begin_draw(target);
        Ok(())
    }

    /// Closes the frame, surfacing any error deferred since `begin_draw`.
    pub fn end_draw(&mut self) -> Result<()> {
        let target = self.target.as_mut().ok_or(GlintError::NotInitialized {
            required_call: "initialize_device",
        })?;
        self.backend.end_draw(target)?;
        Ok(())
    }

    /// Presents the swap chain's backbuffer.
    pub fn present(&mut self, sync_interval: u32, flags: PresentFlags) -> Result<()> {
        let swap_chain = self.swap_chain.as_mut().ok_or(GlintError::NotInitialized {
            required_call: "initialize_device",
        })?;
        self.backend.present(swap_chain, sync_interval, flags)?;
        Ok(())
    }

    /// Borrows the drawing context for the open frame.
    pub fn frame(&mut self) -> Result<Frame<'_, B>> {
        let Self {
            backend,
            text_formats,
            text_layouts,
            target,
            solid_brush,
            ..
        } = self;
        let target = target.as_mut().ok_or(GlintError::NotInitialized {
            required_call: "initialize_device",
        })?;
        let brush = solid_brush.as_mut().ok_or(GlintError::NotInitialized {
            required_call: "initialize_device",
        })?;
        Ok(Frame {
            backend,
            target,
            brush,
            text_formats,
            text_layouts,
        })
    }

    fn create_device_any_driver(&mut self) -> Result<B::Device> {
        let [primary, fallback] = DriverKind::PRIORITY;
        match self.backend.create_device(primary) {
            Ok(device) => Ok(device),
            Err(primary_err) => {
                log::warn!("{primary:?} driver unavailable ({primary_err}), trying {fallback:?}");
                self.backend
                    .create_device(fallback)
                    .map_err(|source| GlintError::NoSupportedDriver {
                        last_tried: fallback,
                        source,
                    })
            }
        }
    }
}

// ============================================================================
// Frame
// ============================================================================

/// Borrowed drawing context for one open frame.
///
/// Bundles the backend, target, cached brush, and text caches so draw hooks
/// get a single capability object instead of raw handles. Brush color
/// management is internal: every fill/stroke takes a [`Color`] directly.
pub struct Frame<'a, B: GraphicsBackend> {
    backend: &'a mut B,
    target: &'a mut B::Target,
    brush: &'a mut B::Brush,
    text_formats: &'a mut TextFormatCache,
    text_layouts: &'a mut TextLayoutCache,
}

impl<B: GraphicsBackend> Frame<'_, B> {
    /// Fills the whole target with `color`.
    pub fn clear(&mut self, color: Color) {
        self.backend.clear(self.target, color);
    }

    /// Sets the transform applied to subsequent drawing.
    pub fn set_transform(&mut self, transform: Affine2) {
        self.backend.set_transform(self.target, transform);
    }

    /// Returns the transform currently applied to drawing.
    #[must_use]
    pub fn transform(&self) -> Affine2 {
        self.backend.transform(self.target)
    }

    /// Current drawable surface dimensions in pixels.
    #[must_use]
    pub fn size(&self) -> (f32, f32) {
        self.backend.target_size(self.target)
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.backend.set_brush_color(self.brush, color);
        self.backend.fill_rect(self.target, rect, self.brush);
    }

    pub fn stroke_rect(&mut self, rect: Rect, line_width: f32, color: Color) {
        self.backend.set_brush_color(self.brush, color);
        self.backend
            .stroke_rect(self.target, rect, line_width, self.brush);
    }

    pub fn draw_line(&mut self, from: Vec2, to: Vec2, line_width: f32, color: Color) {
        self.backend.set_brush_color(self.brush, color);
        self.backend
            .draw_line(self.target, from, to, line_width, self.brush);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.backend.set_brush_color(self.brush, color);
        self.backend
            .fill_circle(self.target, center, radius, self.brush);
    }

    /// Draws `text` at `origin` (top-left) with the cached format for `size`,
    /// building and caching the layout on first use.
    pub fn draw_text(&mut self, text: &str, size: f32, origin: Vec2, color: Color) {
        let format = self.text_formats.get(size).clone();
        let layout = self.text_layouts.get(text, &format);
        self.backend.set_brush_color(self.brush, color);
        for quad in &layout.quads {
            let rect = Rect::new(
                origin.x + quad.rect.x,
                origin.y + quad.rect.y,
                quad.rect.width,
                quad.rect.height,
            );
            self.backend.fill_rect(self.target, rect, self.brush);
        }
    }
}
