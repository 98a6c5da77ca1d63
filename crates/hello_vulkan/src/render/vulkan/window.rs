//! Window management using GLFW
//!
//! Provides window creation and event polling for a Vulkan-only window (no
//! OpenGL context is ever created).

use thiserror::Error;

use crate::core::config::WindowConfig;
use crate::render::window::{WindowBackend, WindowSystem};

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// GLFW returned no window
    #[error("Window creation failed")]
    CreationFailed,

    /// GLFW found no Vulkan loader, so it cannot name the surface extensions
    #[error("Vulkan is not supported by the windowing system")]
    VulkanUnsupported,
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

fn log_glfw_error(error: glfw::Error, description: String) {
    log::error!("GLFW error {:?}: {}", error, description);
}

/// GLFW library state
///
/// GLFW is terminated once this value and every window it created are gone.
pub struct GlfwWindowSystem {
    glfw: glfw::Glfw,
}

impl GlfwWindowSystem {
    /// Initialize GLFW
    pub fn init() -> WindowResult<Self> {
        let glfw = glfw::init(log_glfw_error)
            .map_err(|e| WindowError::InitializationFailed(format!("{:?}", e)))?;

        log::debug!("GLFW {} initialized", glfw::get_version_string());
        Ok(Self { glfw })
    }
}

impl WindowSystem for GlfwWindowSystem {
    type Window = GlfwWindow;

    fn create_window(&mut self, config: &WindowConfig) -> WindowResult<GlfwWindow> {
        // Configure for Vulkan (no OpenGL context)
        self.glfw
            .window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        self.glfw
            .window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (window, events) = self
            .glfw
            .create_window(
                config.width,
                config.height,
                &config.title,
                glfw::WindowMode::Windowed,
            )
            .ok_or(WindowError::CreationFailed)?;

        Ok(GlfwWindow {
            window,
            events,
            title: config.title.clone(),
        })
    }

    fn required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        if !self.glfw.vulkan_supported() {
            return Err(WindowError::VulkanUnsupported);
        }

        self.glfw
            .get_required_instance_extensions()
            .ok_or(WindowError::VulkanUnsupported)
    }

    fn poll_events(&mut self) {
        self.glfw.poll_events();
    }
}

/// GLFW window wrapper, destroyed on drop
pub struct GlfwWindow {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    title: String,
}

impl WindowBackend for GlfwWindow {
    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    fn drain_events(&mut self) -> usize {
        glfw::flush_messages(&self.events).count()
    }

    fn get_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    fn get_title(&self) -> String {
        self.title.clone()
    }
}
