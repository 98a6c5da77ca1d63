//! Vulkan context management
//!
//! Runs the graphics half of startup: validation layer check, extension
//! listing, instance creation, debug messenger, physical device selection.
//! Whatever was acquired is released on every exit path, including failures
//! part-way through.

use ash::vk;
use thiserror::Error;

use super::driver::{
    DebugMessengerConfig, GraphicsDriver, GraphicsInstance, InstanceRequest,
    DEBUG_UTILS_EXTENSION,
};
use super::instance::hidden_severities;
use super::physical_device::{select_physical_device, PhysicalDeviceInfo};
use crate::core::config::ApplicationConfig;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// The Vulkan loader library could not be found or loaded
    #[error("Vulkan loader unavailable: {0}")]
    LoaderUnavailable(String),

    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Requested validation layers are missing
    #[error("validation layers requested, but not available: {}", missing.join(", "))]
    LayersUnavailable {
        /// Layers the loader does not know about
        missing: Vec<String>,
    },

    /// `vkCreateInstance` did not succeed
    #[error("failed to create instance: {0:?}")]
    InstanceCreationFailed(vk::Result),

    /// The debug messenger could not be created
    #[error("failed to set up debug messenger: {0}")]
    DebugMessengerSetupFailed(String),

    /// The instance sees no physical devices at all
    #[error("failed to find GPUs with Vulkan support")]
    NoGpuFound,

    /// No physical device passed the suitability check
    #[error("failed to find a suitable GPU")]
    NoSuitableGpu,

    /// A name handed to the driver contains an interior NUL byte
    #[error("invalid name passed to Vulkan: {0:?}")]
    InvalidName(String),
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

/// Extensions to enable at instance creation
///
/// The window system's extensions in their original order, followed by
/// debug-utils when validation is on. Duplicates are dropped.
pub fn required_extensions(window_extensions: &[String], validation: bool) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::with_capacity(window_extensions.len() + 1);
    for name in window_extensions {
        if !extensions.contains(name) {
            extensions.push(name.clone());
        }
    }

    if validation && !extensions.iter().any(|ext| ext == DEBUG_UTILS_EXTENSION) {
        extensions.push(DEBUG_UTILS_EXTENSION.to_string());
    }

    extensions
}

/// Fail unless every requested layer is available
pub fn check_validation_layers<D: GraphicsDriver>(
    driver: &D,
    requested: &[String],
) -> VulkanResult<()> {
    let available = driver.instance_layers()?;

    let missing: Vec<String> = requested
        .iter()
        .filter(|name| !available.iter().any(|layer| &layer.name == *name))
        .cloned()
        .collect();

    if missing.is_empty() {
        log::debug!("Validation layers available: {}", requested.join(", "));
        Ok(())
    } else {
        Err(VulkanError::LayersUnavailable { missing })
    }
}

fn log_available_extensions<D: GraphicsDriver>(driver: &D) {
    match driver.instance_extensions() {
        Ok(extensions) => {
            log::info!("available extensions:");
            for ext in &extensions {
                log::info!("\t{} (rev {})", ext.name, ext.spec_version);
            }
        }
        Err(e) => log::warn!("Could not enumerate instance extensions: {}", e),
    }
}

/// Instance, optional debug messenger and the selected GPU
pub struct GraphicsContext<I: GraphicsInstance> {
    debug_messenger: Option<I::DebugMessenger>,
    physical_device: PhysicalDeviceInfo,
    instance: I,
}

impl<I: GraphicsInstance> GraphicsContext<I> {
    /// Bring up the graphics context
    ///
    /// `window_extensions` are the instance extensions the window system
    /// needs for presentation.
    pub fn new<D>(
        driver: &D,
        config: &ApplicationConfig,
        window_extensions: &[String],
    ) -> VulkanResult<Self>
    where
        D: GraphicsDriver<Instance = I>,
    {
        let validation = config.validation.is_enabled();

        if validation {
            check_validation_layers(driver, &config.validation.layers)?;
        }

        log_available_extensions(driver);

        let messenger_config =
            validation.then(|| DebugMessengerConfig::from(&config.validation));
        let layers = if validation {
            config.validation.layers.clone()
        } else {
            Vec::new()
        };

        let request = InstanceRequest::new(&config.instance)
            .with_layers(layers)
            .with_extensions(required_extensions(window_extensions, validation))
            .with_debug_messenger(messenger_config);

        let instance = driver.create_instance(&request)?;

        let debug_messenger = match &messenger_config {
            Some(messenger) => {
                let hidden = hidden_severities(messenger.severities, log::max_level());
                if !hidden.is_empty() {
                    log::info!(
                        "Validation messages with severity {:?} are filtered by the current log level; set RUST_LOG=debug to see them",
                        hidden
                    );
                }
                Some(instance.create_debug_messenger(messenger)?)
            }
            None => None,
        };

        let policy = config.device;
        let physical_device =
            select_physical_device(instance.physical_devices()?, |device| policy.is_suitable(device))?;

        Ok(Self {
            debug_messenger,
            physical_device,
            instance,
        })
    }

    /// The live instance
    pub fn instance(&self) -> &I {
        &self.instance
    }

    /// The selected physical device
    pub fn physical_device(&self) -> &PhysicalDeviceInfo {
        &self.physical_device
    }

    /// Whether a debug messenger is attached
    pub fn has_debug_messenger(&self) -> bool {
        self.debug_messenger.is_some()
    }
}

impl<I: GraphicsInstance> Drop for GraphicsContext<I> {
    fn drop(&mut self) {
        // The messenger must go before the instance it was created from
        if self.debug_messenger.take().is_some() {
            log::debug!("Destroyed debug messenger");
        }
        log::debug!("Destroying Vulkan instance");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::vulkan::driver::LayerInfo;
    use crate::tests::mock::{new_log, Event, MockDriver};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_required_extensions_without_validation() {
        let window = names(&["VK_KHR_surface", "VK_KHR_xcb_surface"]);
        assert_eq!(required_extensions(&window, false), window);
    }

    #[test]
    fn test_required_extensions_with_validation() {
        let window = names(&["VK_KHR_surface", "VK_KHR_xcb_surface"]);
        assert_eq!(
            required_extensions(&window, true),
            names(&["VK_KHR_surface", "VK_KHR_xcb_surface", DEBUG_UTILS_EXTENSION])
        );
    }

    #[test]
    fn test_required_extensions_are_deduplicated() {
        let window = names(&["VK_KHR_surface", DEBUG_UTILS_EXTENSION, "VK_KHR_surface"]);
        assert_eq!(
            required_extensions(&window, true),
            names(&["VK_KHR_surface", DEBUG_UTILS_EXTENSION])
        );
    }

    #[test]
    fn test_layer_check_reports_every_missing_layer() {
        let log = new_log();
        let driver = MockDriver::new(log.clone())
            .with_layers(vec![LayerInfo::named("VK_LAYER_KHRONOS_validation")]);

        assert!(check_validation_layers(&driver, &names(&["VK_LAYER_KHRONOS_validation"])).is_ok());

        let err = check_validation_layers(
            &driver,
            &names(&["VK_LAYER_KHRONOS_validation", "VK_LAYER_A", "VK_LAYER_B"]),
        )
        .unwrap_err();
        match err {
            VulkanError::LayersUnavailable { missing } => {
                assert_eq!(missing, names(&["VK_LAYER_A", "VK_LAYER_B"]));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(log.borrow().iter().all(|e| *e == Event::EnumerateLayers));
    }

    #[test]
    fn test_error_messages() {
        let err = VulkanError::LayersUnavailable {
            missing: names(&["VK_LAYER_KHRONOS_validation"]),
        };
        assert_eq!(
            err.to_string(),
            "validation layers requested, but not available: VK_LAYER_KHRONOS_validation"
        );
        assert_eq!(
            VulkanError::InstanceCreationFailed(vk::Result::ERROR_INCOMPATIBLE_DRIVER).to_string(),
            "failed to create instance: ERROR_INCOMPATIBLE_DRIVER"
        );
        assert_eq!(VulkanError::NoGpuFound.to_string(), "failed to find GPUs with Vulkan support");
    }
}
