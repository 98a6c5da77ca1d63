//! # Application Configuration
//!
//! Everything that used to be a hard-coded constant (window size and title,
//! the requested validation layers, the debug-build toggle) lives here so the
//! startup sequence can be parameterised and tested.
//!
//! ## Configuration Categories
//!
//! - **Window Config**: size, title, resizability of the window
//! - **Instance Config**: the application-info record handed to the driver
//! - **Validation Config**: layers and debug-messenger filters
//! - **Device Selection**: how a physical device is picked

use ash::vk;
use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// Layer requested when validation is on and nothing else is configured
pub const KHRONOS_VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Semantic version triple, packed with `vk::make_api_version` for the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Patch version
    pub patch: u32,
}

impl Version {
    /// Create a version triple
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Largest major version that fits the packed format (7 bits)
    pub const MAX_MAJOR: u32 = 0x7f;
    /// Largest minor version that fits the packed format (10 bits)
    pub const MAX_MINOR: u32 = 0x3ff;
    /// Largest patch version that fits the packed format (12 bits)
    pub const MAX_PATCH: u32 = 0xfff;

    /// Check that every component fits its field in the packed format
    pub fn validate(&self) -> Result<(), String> {
        if self.major > Self::MAX_MAJOR
            || self.minor > Self::MAX_MINOR
            || self.patch > Self::MAX_PATCH
        {
            return Err(format!(
                "Version {} does not fit Vulkan packing (max {}.{}.{})",
                self, Self::MAX_MAJOR, Self::MAX_MINOR, Self::MAX_PATCH
            ));
        }
        Ok(())
    }

    /// Packed Vulkan representation (variant 0)
    ///
    /// Components past their bit width corrupt neighbouring fields; call
    /// [`Version::validate`] on anything read from outside.
    pub fn to_vk(self) -> u32 {
        vk::make_api_version(0, self.major, self.minor, self.patch)
    }

    /// Unpack a driver-reported version number
    pub fn from_vk(packed: u32) -> Self {
        Self::new(
            vk::api_version_major(packed),
            vk::api_version_minor(packed),
            vk::api_version_patch(packed),
        )
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// # Window Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Client area width in pixels
    pub width: u32,
    /// Client area height in pixels
    pub height: u32,
    /// Title bar text
    pub title: String,
    /// Whether the user may resize the window
    pub resizable: bool,
}

impl WindowConfig {
    /// Create a window configuration
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            resizable: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Window size must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        if self.title.is_empty() {
            return Err("Window title cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new(800, 600, "Vulkan test")
    }
}

/// # Instance Configuration
///
/// Contents of the `VkApplicationInfo` record passed at instance creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Application name reported to the driver
    pub application_name: String,
    /// Application version
    pub application_version: Version,
    /// Engine name reported to the driver
    pub engine_name: String,
    /// Engine version
    pub engine_version: Version,
    /// Highest Vulkan API version the application uses
    pub api_version: Version,
}

impl InstanceConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.application_name.is_empty() {
            return Err("Application name cannot be empty".to_string());
        }
        for (label, version) in [
            ("Application", &self.application_version),
            ("Engine", &self.engine_version),
            ("API", &self.api_version),
        ] {
            version.validate().map_err(|e| format!("{} version: {}", label, e))?;
        }
        if self.api_version.major == 0 {
            return Err(format!("API version {} is not a Vulkan version", self.api_version));
        }
        Ok(())
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            application_name: "Triangle Test".to_string(),
            application_version: Version::new(1, 0, 0),
            engine_name: "Engineless :)".to_string(),
            engine_version: Version::new(1, 0, 0),
            api_version: Version::new(1, 0, 0),
        }
    }
}

/// Debug messenger severity filter entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSeverity {
    /// Diagnostic chatter from the loader and layers
    Verbose,
    /// Informational messages such as resource creation
    Info,
    /// Likely bugs
    Warning,
    /// Invalid API usage
    Error,
}

impl MessageSeverity {
    /// Matching driver flag
    pub const fn to_vk(self) -> vk::DebugUtilsMessageSeverityFlagsEXT {
        match self {
            Self::Verbose => vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            Self::Info => vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
            Self::Warning => vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
            Self::Error => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        }
    }
}

/// Debug messenger type filter entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Events unrelated to the specification or performance
    General,
    /// Specification violations
    Validation,
    /// Non-optimal API usage
    Performance,
}

impl MessageType {
    /// Matching driver flag
    pub const fn to_vk(self) -> vk::DebugUtilsMessageTypeFlagsEXT {
        match self {
            Self::General => vk::DebugUtilsMessageTypeFlagsEXT::GENERAL,
            Self::Validation => vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
            Self::Performance => vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        }
    }
}

/// # Validation Configuration
///
/// Controls the validation layers and the debug messenger. Both are only
/// requested when [`ValidationConfig::is_enabled`] returns true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Explicit on/off switch; `None` follows the build profile
    pub enabled: Option<bool>,
    /// Layers that must all be available when validation is on
    pub layers: Vec<String>,
    /// Severities the debug messenger reports
    ///
    /// Messages are logged at error, warn, info and debug level respectively,
    /// so verbose ones only show up with `RUST_LOG=debug` or a `log_level`
    /// of `debug`.
    pub severities: Vec<MessageSeverity>,
    /// Message types the debug messenger reports
    pub message_types: Vec<MessageType>,
}

impl ValidationConfig {
    /// Validation on, default layer and filters
    pub fn enabled() -> Self {
        Self {
            enabled: Some(true),
            ..Self::default()
        }
    }

    /// Validation off regardless of build profile
    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            ..Self::default()
        }
    }

    /// Replace the requested layer list
    pub fn with_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }

    /// Whether layers and the debug messenger should be requested
    ///
    /// Debug builds validate unless told otherwise, release builds don't.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(cfg!(debug_assertions))
    }

    /// Combined severity filter
    pub fn severity_flags(&self) -> vk::DebugUtilsMessageSeverityFlagsEXT {
        self.severities
            .iter()
            .fold(vk::DebugUtilsMessageSeverityFlagsEXT::empty(), |acc, s| acc | s.to_vk())
    }

    /// Combined message type filter
    pub fn type_flags(&self) -> vk::DebugUtilsMessageTypeFlagsEXT {
        self.message_types
            .iter()
            .fold(vk::DebugUtilsMessageTypeFlagsEXT::empty(), |acc, t| acc | t.to_vk())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.is_enabled() {
            return Ok(());
        }
        if self.layers.is_empty() {
            return Err("Validation is enabled but no layers are requested".to_string());
        }
        if self.severities.is_empty() || self.message_types.is_empty() {
            return Err("Debug messenger filters cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            layers: vec![KHRONOS_VALIDATION_LAYER.to_string()],
            severities: vec![
                MessageSeverity::Verbose,
                MessageSeverity::Warning,
                MessageSeverity::Error,
            ],
            message_types: vec![
                MessageType::General,
                MessageType::Validation,
                MessageType::Performance,
            ],
        }
    }
}

/// Physical device suitability policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceSelection {
    /// Every device is suitable, the first enumerated one wins
    #[default]
    Any,
    /// Only discrete GPUs that support geometry shaders
    DiscreteWithGeometryShader,
}

/// # Complete Application Configuration
///
/// Top-level configuration handed to [`crate::Application`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Window settings
    pub window: WindowConfig,
    /// Application-info record
    pub instance: InstanceConfig,
    /// Validation layers and debug messenger
    pub validation: ValidationConfig,
    /// Physical device policy
    pub device: DeviceSelection,
}

impl ApplicationConfig {
    /// Replace the window configuration
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Replace the validation configuration
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Replace the device selection policy
    pub fn with_device_selection(mut self, device: DeviceSelection) -> Self {
        self.device = device;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate().map_err(ConfigError::Invalid)?;
        self.instance.validate().map_err(ConfigError::Invalid)?;
        self.validation.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            instance: InstanceConfig::default(),
            validation: ValidationConfig::default(),
            device: DeviceSelection::default(),
        }
    }
}

impl Config for ApplicationConfig {}
