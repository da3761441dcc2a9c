//! Winit application layer.
//!
//! [`App`] is a small builder that owns window creation and the event loop,
//! pumping redraw events into a [`RenderWindow`] over the production
//! [`WgpuBackend`]. Everything engine-shaped stays in the scheduler; this
//! module only translates winit events.
//!
//! ```rust,ignore
//! use glint::app::App;
//! use glint::graphics::wgpu_backend::WgpuSettings;
//!
//! struct Game { /* scene, state */ }
//!
//! impl glint::RenderHandler<glint::graphics::wgpu_backend::WgpuBackend> for Game {
//!     // override update / draw / lifecycle hooks as needed
//! }
//!
//! fn main() -> glint::Result<()> {
//!     App::new()
//!         .with_title("My Game")
//!         .run(Game { /* ... */ })
//! }
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::errors::Result;
use crate::graphics::wgpu_backend::{WgpuBackend, WgpuSettings};
use crate::graphics::{NativeWindow, PresentFlags};
use crate::window::{MouseButton, RenderHandler, RenderWindow};

/// Application builder: window title, backend settings, run loop.
pub struct App {
    title: String,
    settings: WgpuSettings,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Glint".into(),
            settings: WgpuSettings::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: WgpuSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Runs the event loop with the given handler. Blocks until the window
    /// closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the event loop cannot be created or fails while
    /// running, or if a frame fails with a non-recoverable graphics error.
    pub fn run<H>(self, handler: H) -> Result<()>
    where
        H: RenderHandler<WgpuBackend> + 'static,
    {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner {
            title: self.title,
            settings: self.settings,
            window: None,
            render_window: None,
            handler: Some(handler),
            error: None,
        };
        event_loop.run_app(&mut runner)?;

        match runner.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct AppRunner<H: RenderHandler<WgpuBackend>> {
    title: String,
    settings: WgpuSettings,
    window: Option<Arc<Window>>,
    render_window: Option<RenderWindow<WgpuBackend, H>>,
    handler: Option<H>,
    /// First fatal error; stops the loop and is returned from `App::run`.
    error: Option<crate::errors::GlintError>,
}

impl<H: RenderHandler<WgpuBackend>> AppRunner<H> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: crate::errors::GlintError) {
        log::error!("fatal error, exiting: {error}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl<H: RenderHandler<WgpuBackend>> ApplicationHandler for AppRunner<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(handler) = self.handler.take() else {
            return;
        };

        let attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                f64::from(self.settings.width),
                f64::from(self.settings.height),
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .expect("Failed to create window"),
        );

        let size = window.inner_size();
        let mut settings = self.settings.clone();
        settings.width = size.width.max(1);
        settings.height = size.height.max(1);

        let native: NativeWindow = window.clone();
        self.render_window = Some(RenderWindow::new(
            WgpuBackend::new(settings),
            native,
            handler,
        ));
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(render_window) = self.render_window.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                render_window.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let minimized = size.width == 0 || size.height == 0;
                if let Err(e) = render_window.on_resize(minimized, size.width, size.height) {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::Moved(position) => {
                render_window.on_move(position.x, position.y);
            }
            WindowEvent::CursorMoved { position, .. } => {
                render_window.on_mouse_move(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => Some(MouseButton::Left),
                    winit::event::MouseButton::Right => Some(MouseButton::Right),
                    winit::event::MouseButton::Middle => Some(MouseButton::Middle),
                    _ => None,
                };
                if let Some(button) = button {
                    render_window.on_mouse_button(button, state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = render_window.render(1, PresentFlags::NONE) {
                    self.fail(event_loop, e);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
