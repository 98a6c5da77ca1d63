//! Graphics driver boundary
//!
//! [`GraphicsDriver`] covers what can be done before an instance exists
//! (enumerating layers and extensions, creating the instance).
//! [`GraphicsInstance`] covers what needs one. The production implementation
//! lives in `instance.rs`.

use ash::vk;

use super::context::VulkanResult;
use super::physical_device::PhysicalDeviceInfo;
use crate::core::config::{InstanceConfig, ValidationConfig, Version};

/// Name of the debug-utils instance extension
pub const DEBUG_UTILS_EXTENSION: &str = "VK_EXT_debug_utils";

/// Instance layer reported by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    /// Layer name, e.g. `VK_LAYER_KHRONOS_validation`
    pub name: String,
    /// Human readable description
    pub description: String,
    /// Vulkan version the layer was written against
    pub spec_version: Version,
}

impl LayerInfo {
    /// Layer with only a name, as used by tests and diagnostics
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            spec_version: Version::new(1, 0, 0),
        }
    }
}

/// Instance extension reported by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionInfo {
    /// Extension name, e.g. `VK_KHR_surface`
    pub name: String,
    /// Extension revision
    pub spec_version: u32,
}

/// Filters for a debug messenger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessengerConfig {
    /// Severities that reach the callback
    pub severities: vk::DebugUtilsMessageSeverityFlagsEXT,
    /// Message types that reach the callback
    pub message_types: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl From<&ValidationConfig> for DebugMessengerConfig {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            severities: config.severity_flags(),
            message_types: config.type_flags(),
        }
    }
}

/// Everything the driver needs to create an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRequest {
    /// Application name
    pub application_name: String,
    /// Packed application version
    pub application_version: u32,
    /// Engine name
    pub engine_name: String,
    /// Packed engine version
    pub engine_version: u32,
    /// Packed API version
    pub api_version: u32,
    /// Layers to enable
    pub layers: Vec<String>,
    /// Extensions to enable
    pub extensions: Vec<String>,
    /// Messenger chained onto instance creation so creation and destruction
    /// of the instance itself are reported too
    pub debug_messenger: Option<DebugMessengerConfig>,
}

impl InstanceRequest {
    /// Request built from the application-info part of the configuration
    pub fn new(config: &InstanceConfig) -> Self {
        Self {
            application_name: config.application_name.clone(),
            application_version: config.application_version.to_vk(),
            engine_name: config.engine_name.clone(),
            engine_version: config.engine_version.to_vk(),
            api_version: config.api_version.to_vk(),
            layers: Vec::new(),
            extensions: Vec::new(),
            debug_messenger: None,
        }
    }

    /// Set the enabled layers
    pub fn with_layers(mut self, layers: Vec<String>) -> Self {
        self.layers = layers;
        self
    }

    /// Set the enabled extensions
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Chain a debug messenger onto instance creation
    pub fn with_debug_messenger(mut self, messenger: Option<DebugMessengerConfig>) -> Self {
        self.debug_messenger = messenger;
        self
    }

    /// Whether `name` is among the enabled extensions
    pub fn requests_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext == name)
    }
}

/// Entry-level driver operations
pub trait GraphicsDriver {
    /// Instance type created by this driver
    type Instance: GraphicsInstance;

    /// Layers the loader can enable
    fn instance_layers(&self) -> VulkanResult<Vec<LayerInfo>>;

    /// Extensions the loader and implicit layers provide
    fn instance_extensions(&self) -> VulkanResult<Vec<ExtensionInfo>>;

    /// Create an instance, destroyed when the returned value is dropped
    fn create_instance(&self, request: &InstanceRequest) -> VulkanResult<Self::Instance>;
}

/// Operations on a live instance
pub trait GraphicsInstance {
    /// Debug messenger handle, destroyed when dropped
    ///
    /// Shares ownership of the instance that created it: the instance is
    /// destroyed only after both it and all of its messengers are dropped.
    type DebugMessenger;

    /// Attach a debug messenger to this instance
    fn create_debug_messenger(
        &self,
        config: &DebugMessengerConfig,
    ) -> VulkanResult<Self::DebugMessenger>;

    /// Every physical device visible to the instance, in driver order
    fn physical_devices(&self) -> VulkanResult<Vec<PhysicalDeviceInfo>>;
}
