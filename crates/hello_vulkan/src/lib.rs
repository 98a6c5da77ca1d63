//! # Hello Vulkan
//!
//! The first steps of a Vulkan program: open a window, create an instance,
//! optionally hook up validation layers and a debug messenger, pick a GPU,
//! then pump window events until the user closes the window.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hello_vulkan::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = ApplicationConfig::default();
//!     hello_vulkan::foundation::logging::init(&config.log_level);
//!
//!     let window_system = GlfwWindowSystem::init()?;
//!     let driver = AshDriver::load()?;
//!     Application::new(config, window_system, driver).run()
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod render;

mod application;

#[cfg(test)]
mod tests;

pub use application::{AppError, AppResult, Application};

/// Common imports for users of the crate
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::config::{
            ApplicationConfig, DeviceSelection, InstanceConfig, MessageSeverity, MessageType,
            ValidationConfig, Version, WindowConfig,
        },
        render::vulkan::{
            AshDriver, GraphicsContext, GlfwWindow, GlfwWindowSystem, PhysicalDeviceInfo,
            VulkanError, VulkanResult, WindowError, WindowResult,
        },
        AppError, AppResult, Application,
    };
}
