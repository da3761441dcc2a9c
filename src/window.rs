//! Frame scheduler.
//!
//! [`RenderWindow`] composes [`DeviceResources`] and a [`FrameClock`] into the
//! per-frame cycle: lazy device initialization, update phase, draw phase, and
//! device-loss recovery. Window state (minimized, resizes, input) is fed in by
//! the platform layer; the scheduler never talks to the windowing system
//! directly.
//!
//! # Hooks
//!
//! Lifecycle extension uses explicit two-phase dispatch instead of inheritance
//! chains: the [`RenderHandler`] implementation provides the core behavior for
//! each hook, and [`RenderListeners`] holds ordered lists of external
//! callbacks invoked after it. The scheduler composes the two at every
//! broadcast point.

use std::time::Duration;

use crate::clock::FrameClock;
use crate::device::{DeviceResources, Frame};
use crate::errors::{GlintError, Result};
use crate::graphics::{GraphicsBackend, PresentFlags};

/// Update deltas at or above this many seconds freeze logic for the frame:
/// the frame is still drawn, but neither the update hooks nor physics run.
/// Prevents a debugger pause or window-drag stall from feeding a huge
/// timestep into the simulation.
pub const MAX_LOGIC_DELTA: f32 = 0.2;

/// Mouse buttons reported to [`RenderHandler::on_mouse_button`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Core per-window behavior: lifecycle hooks, update, and draw.
///
/// Every method has an empty default so implementations override only what
/// they need. For each hook the scheduler runs the handler's method first,
/// then the external listeners registered for that hook.
#[allow(unused_variables)]
pub trait RenderHandler<B: GraphicsBackend> {
    /// Device-generation resources were created; build size-independent
    /// resources here.
    fn create_device_resources(&mut self, resources: &mut DeviceResources<B>) {}

    /// The drawable surface exists at its current dimensions; build
    /// size-dependent resources here. Also runs after every resize.
    fn create_device_size_resources(&mut self, resources: &mut DeviceResources<B>) {}

    /// Size-dependent resources are about to become invalid (resize or device
    /// loss); drop them here.
    fn release_device_size_resources(&mut self, resources: &mut DeviceResources<B>) {}

    /// The device generation is ending; drop size-independent resources here.
    fn release_device_resources(&mut self, resources: &mut DeviceResources<B>) {}

    /// Per-frame logic with the inter-frame delta in seconds. Skipped for
    /// frames hitting the slow-frame guard.
    fn update(&mut self, resources: &mut DeviceResources<B>, dt: f32) {}

    /// Per-frame drawing into the open frame.
    fn draw(&mut self, frame: &mut Frame<'_, B>, clock: &FrameClock) {}

    /// Runs after [`draw`](Self::draw) and all draw listeners, still inside
    /// the open frame. Overlays go here.
    fn post_draw(&mut self, frame: &mut Frame<'_, B>, clock: &FrameClock) {}

    /// Pointer moved to window-relative coordinates.
    fn on_mouse_move(&mut self, x: f32, y: f32) {}

    /// Mouse button state change.
    fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {}

    /// The window moved to new screen coordinates.
    fn on_move(&mut self, x: i32, y: i32) {}
}

/// External observer callback for a device-lifecycle hook.
pub type ResourceListener<B> = Box<dyn FnMut(&mut DeviceResources<B>)>;
/// External observer callback for the update phase.
pub type UpdateListener<B> = Box<dyn FnMut(&mut DeviceResources<B>, f32)>;
/// External observer callback for the draw phase.
pub type DrawListener<B> = Box<dyn FnMut(&mut Frame<'_, B>, &FrameClock)>;

/// Ordered listener lists for each broadcast point, invoked in registration
/// order after the handler's own hook.
pub struct RenderListeners<B: GraphicsBackend> {
    pub create_device_resources: Vec<ResourceListener<B>>,
    pub create_device_size_resources: Vec<ResourceListener<B>>,
    pub release_device_size_resources: Vec<ResourceListener<B>>,
    pub release_device_resources: Vec<ResourceListener<B>>,
    pub update: Vec<UpdateListener<B>>,
    pub draw: Vec<DrawListener<B>>,
}

impl<B: GraphicsBackend> Default for RenderListeners<B> {
    fn default() -> Self {
        Self {
            create_device_resources: Vec::new(),
            create_device_size_resources: Vec::new(),
            release_device_size_resources: Vec::new(),
            release_device_resources: Vec::new(),
            update: Vec::new(),
            draw: Vec::new(),
        }
    }
}

/// The frame scheduler for one window.
///
/// State machine over three resource levels — uninitialized,
/// size-independent ready, size-dependent ready — advanced lazily by
/// [`render`](Self::render) and dropped back to uninitialized on device loss.
pub struct RenderWindow<B: GraphicsBackend, H: RenderHandler<B>> {
    pub resources: DeviceResources<B>,
    pub clock: FrameClock,
    pub handler: H,
    pub listeners: RenderListeners<B>,
    window: B::Window,
    minimized: bool,
}

impl<B: GraphicsBackend, H: RenderHandler<B>> RenderWindow<B, H> {
    pub fn new(backend: B, window: B::Window, handler: H) -> Self {
        Self {
            resources: DeviceResources::new(backend),
            clock: FrameClock::new(),
            handler,
            listeners: RenderListeners::default(),
            window,
            minimized: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn minimized(&self) -> bool {
        self.minimized
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> &B::Window {
        &self.window
    }

    /// Renders one frame.
    ///
    /// Minimized windows sleep briefly and return without touching the clock
    /// or device. An unavailable device is (re)initialized first, firing the
    /// create hooks. Device loss during the frame is recovered internally;
    /// any other backend error propagates.
    pub fn render(&mut self, sync_interval: u32, flags: PresentFlags) -> Result<()> {
        if self.minimized {
            std::thread::sleep(Duration::from_millis(1));
            return Ok(());
        }

        if !self.resources.device_available() {
            self.initialize_resources()?;
        }

        let dt = self.clock.begin_frame();
        let result = self.render_core(dt, sync_interval, flags);
        self.clock.end_frame();
        result
    }

    /// Creates device resources and size-dependent resources, firing the
    /// create hooks in that order.
    pub fn initialize_resources(&mut self) -> Result<()> {
        self.resources.initialize_device(&self.window)?;
        self.dispatch_create_device_resources();
        self.dispatch_create_device_size_resources();
        Ok(())
    }

    /// Handles a resize notification from the platform layer.
    ///
    /// When not minimized and the device is available: release-size hooks,
    /// swap-chain buffer resize, create-size hooks, strictly in that order —
    /// size-dependent resources must be dead before the buffers move and
    /// rebuilt only after.
    pub fn on_resize(&mut self, minimized: bool, width: u32, height: u32) -> Result<()> {
        self.minimized = minimized;
        if minimized || !self.resources.device_available() {
            return Ok(());
        }

        self.dispatch_release_device_size_resources();
        self.resources.resize(width, height)?;
        self.dispatch_create_device_size_resources();
        Ok(())
    }

    /// Forwards a pointer move to the handler. X and Y are independent
    /// window-relative coordinates.
    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        self.handler.on_mouse_move(x, y);
    }

    /// Forwards a mouse button change to the handler.
    pub fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.handler.on_mouse_button(button, pressed);
    }

    /// Forwards a window move to the handler.
    pub fn on_move(&mut self, x: i32, y: i32) {
        self.handler.on_move(x, y);
    }

    /// Tears down the device generation, firing the release hooks. Called by
    /// the platform layer at shutdown.
    pub fn shutdown(&mut self) {
        if self.resources.device_available() {
            self.dispatch_release_device_size_resources();
            self.dispatch_release_device_resources();
        }
        self.resources.release_device_resources();
    }

    fn render_core(&mut self, dt: f32, sync_interval: u32, flags: PresentFlags) -> Result<()> {
        if dt < MAX_LOGIC_DELTA {
            self.handler.update(&mut self.resources, dt);
            for listener in &mut self.listeners.update {
                listener(&mut self.resources, dt);
            }
        }

        match self.draw_frame(sync_interval, flags) {
            Ok(()) => Ok(()),
            Err(GlintError::Graphics(e)) if e.is_device_loss() => {
                log::warn!("device lost during frame ({e}); rebuilding on next render");
                self.dispatch_release_device_size_resources();
                self.dispatch_release_device_resources();
                self.resources.release_device_resources();
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    fn draw_frame(&mut self, sync_interval: u32, flags: PresentFlags) -> Result<()> {
        self.resources.begin_draw()?;
        {
            let mut frame = self.resources.frame()?;
            self.handler.draw(&mut frame, &self.clock);
            for listener in &mut self.listeners.draw {
                listener(&mut frame, &self.clock);
            }
            self.handler.post_draw(&mut frame, &self.clock);
        }
        self.resources.end_draw()?;
        self.resources.present(sync_interval, flags)?;
        Ok(())
    }

    fn dispatch_create_device_resources(&mut self) {
        self.handler.create_device_resources(&mut self.resources);
        for listener in &mut self.listeners.create_device_resources {
            listener(&mut self.resources);
        }
    }

    fn dispatch_create_device_size_resources(&mut self) {
        self.handler.create_device_size_resources(&mut self.resources);
        for listener in &mut self.listeners.create_device_size_resources {
            listener(&mut self.resources);
        }
    }

    fn dispatch_release_device_size_resources(&mut self) {
        self.handler.release_device_size_resources(&mut self.resources);
        for listener in &mut self.listeners.release_device_size_resources {
            listener(&mut self.resources);
        }
    }

    fn dispatch_release_device_resources(&mut self) {
        self.handler.release_device_resources(&mut self.resources);
        for listener in &mut self.listeners.release_device_resources {
            listener(&mut self.resources);
        }
    }
}
