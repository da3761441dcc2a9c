//! Error Types
//!
//! The main error type [`GlintError`] covers all failure modes of the engine core:
//! device construction, backend errors during draw/present, and misuse of
//! uninitialized resources.
//!
//! All public APIs return [`Result<T>`], an alias for `std::result::Result<T, GlintError>`.

use thiserror::Error;

use crate::graphics::{DriverKind, GraphicsError};

/// The main error type for the glint engine.
#[derive(Error, Debug)]
pub enum GlintError {
    // ========================================================================
    // Device construction
    // ========================================================================
    /// Every driver kind in the priority list failed to produce a device.
    ///
    /// This is fatal for the initialization call; the embedding application
    /// decides whether to retry or exit.
    #[error("no supported graphics driver could be created (last attempt: {last_tried:?})")]
    NoSupportedDriver {
        /// The driver kind that failed last.
        last_tried: DriverKind,
        /// The error reported for the final attempt.
        #[source]
        source: GraphicsError,
    },

    // ========================================================================
    // Backend failures
    // ========================================================================
    /// A graphics backend operation failed.
    ///
    /// Device-loss errors never reach callers of [`RenderWindow::render`]
    /// (they are recovered internally); anything surfacing here is fatal by
    /// convention.
    ///
    /// [`RenderWindow::render`]: crate::window::RenderWindow::render
    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    // ========================================================================
    // Misuse
    // ========================================================================
    /// An operation requiring live device resources was called before
    /// initialization (or after release).
    #[error("device resources not initialized: call {required_call} first")]
    NotInitialized {
        /// The call that must precede the failing operation.
        required_call: &'static str,
    },

    // ========================================================================
    // Platform
    // ========================================================================
    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Alias for `Result<T, GlintError>`.
pub type Result<T> = std::result::Result<T, GlintError>;
