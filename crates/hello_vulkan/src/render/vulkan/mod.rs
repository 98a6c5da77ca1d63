//! Vulkan backend
//!
//! - `driver`: traits for the driver boundary and the instance request
//! - `instance`: the `ash` implementation of those traits
//! - `context`: the startup sequence and its error type
//! - `physical_device`: device queries and selection
//! - `window`: the GLFW window system

pub mod context;
pub mod driver;
pub mod instance;
pub mod physical_device;
pub mod window;

// Re-export commonly used types
pub use context::{
    check_validation_layers, required_extensions, GraphicsContext, VulkanError, VulkanResult,
};
pub use driver::{
    DebugMessengerConfig, ExtensionInfo, GraphicsDriver, GraphicsInstance, InstanceRequest,
    LayerInfo, DEBUG_UTILS_EXTENSION,
};
pub use instance::{AshDebugMessenger, AshDriver, AshInstance};
pub use physical_device::{select_physical_device, PhysicalDeviceInfo};
pub use window::{GlfwWindow, GlfwWindowSystem, WindowError, WindowResult};
