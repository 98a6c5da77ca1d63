//! Backend-agnostic window management traits
//!
//! The application only talks to these traits, so the startup sequence can
//! run against GLFW in production and against recording mocks in tests.

use crate::core::config::WindowConfig;
use crate::render::vulkan::WindowResult;

/// Process-wide windowing state
///
/// Dropping the implementor releases the windowing library. Windows created
/// by it must be dropped first.
pub trait WindowSystem {
    /// Window type produced by this system
    type Window: WindowBackend;

    /// Create a window with no client API attached
    ///
    /// Fails instead of handing back a null window.
    fn create_window(&mut self, config: &WindowConfig) -> WindowResult<Self::Window>;

    /// Instance extensions the driver needs to present to this window system
    fn required_instance_extensions(&self) -> WindowResult<Vec<String>>;

    /// Process pending window system events
    fn poll_events(&mut self);
}

/// A single window
///
/// Dropping the implementor destroys the window.
pub trait WindowBackend {
    /// Check if the window should close
    ///
    /// True once the user has asked to close the window or the application
    /// has set the flag itself.
    fn should_close(&self) -> bool;

    /// Set whether the window should close
    fn set_should_close(&mut self, should_close: bool);

    /// Discard the events queued since the last poll, returning how many there were
    fn drain_events(&mut self) -> usize;

    /// Current client area size in pixels
    fn get_size(&self) -> (u32, u32);

    /// Current window title
    fn get_title(&self) -> String;
}
