//! Application lifecycle
//!
//! window → graphics context → event loop → teardown. Teardown releases, in
//! order: debug messenger, instance, window, windowing library. The same order
//! holds when initialization fails part-way, because each resource is owned
//! by a value that is dropped before the one it depends on.

use thiserror::Error;

use crate::config::ConfigError;
use crate::core::config::ApplicationConfig;
use crate::render::vulkan::{GraphicsContext, GraphicsDriver, VulkanError, WindowError};
use crate::render::window::{WindowBackend, WindowSystem};

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration is unusable
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Windowing system failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Vulkan failure
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] VulkanError),
}

/// Result type for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Owns the windowing system, the graphics driver and the configuration
pub struct Application<S: WindowSystem, D: GraphicsDriver> {
    config: ApplicationConfig,
    driver: D,
    // Dropped last: every window must be gone before the library is released
    window_system: S,
}

impl<S: WindowSystem, D: GraphicsDriver> Application<S, D> {
    /// Create an application; nothing is initialized until [`Application::run`]
    pub fn new(config: ApplicationConfig, window_system: S, driver: D) -> Self {
        Self {
            config,
            driver,
            window_system,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Run the whole lifecycle
    ///
    /// Returns once the window has been closed and everything torn down, or
    /// with the first initialization error after releasing whatever had been
    /// acquired.
    pub fn run(mut self) -> AppResult<()> {
        self.config.validate()?;
        log::info!(
            "Starting {} {}",
            self.config.instance.application_name,
            self.config.instance.application_version
        );

        let mut window = self.init_window()?;
        let context = self.init_graphics()?;

        let polls = self.main_loop(&mut window);
        log::debug!("Event loop finished after {} polls", polls);

        self.teardown(context, window);
        Ok(())
    }

    /// Create the window described by the configuration
    pub fn init_window(&mut self) -> AppResult<S::Window> {
        let window = self.window_system.create_window(&self.config.window)?;
        let (width, height) = window.get_size();
        log::info!("Created window \"{}\" ({}x{})", window.get_title(), width, height);
        Ok(window)
    }

    /// Bring up the Vulkan instance, debug messenger and physical device
    pub fn init_graphics(&mut self) -> AppResult<GraphicsContext<D::Instance>> {
        let window_extensions = self.window_system.required_instance_extensions()?;
        log::debug!("Window system requires: {}", window_extensions.join(", "));

        let context = GraphicsContext::new(&self.driver, &self.config, &window_extensions)?;
        Ok(context)
    }

    /// Poll events until the window's close flag is set
    ///
    /// Returns how many times events were polled.
    pub fn main_loop(&mut self, window: &mut S::Window) -> u64 {
        let mut polls = 0;
        while !window.should_close() {
            self.window_system.poll_events();
            let drained = window.drain_events();
            if drained > 0 {
                log::trace!("Discarded {} window events", drained);
            }
            polls += 1;
        }
        polls
    }

    fn teardown(self, context: GraphicsContext<D::Instance>, window: S::Window) {
        drop(context);
        drop(window);
        log::debug!("Destroyed window");
        drop(self);
        log::info!("Shutdown complete");
    }
}
