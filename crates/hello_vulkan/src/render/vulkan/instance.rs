//! Vulkan instance and debug messenger, backed by `ash`
//!
//! The debug-utils entry points are not exported by the loader. They are
//! looked up by name through `vkGetInstanceProcAddr` once, right after the
//! instance is created, and kept as optional function pointers.

use ash::vk;
use ash::{Entry, Instance};
use std::borrow::Cow;
use std::ffi::{c_char, c_void, CStr, CString};
use std::rc::Rc;

use super::context::{VulkanError, VulkanResult};
use super::driver::{
    DebugMessengerConfig, ExtensionInfo, GraphicsDriver, GraphicsInstance, InstanceRequest,
    LayerInfo,
};
use super::physical_device::PhysicalDeviceInfo;
use crate::core::config::Version;

const CREATE_DEBUG_MESSENGER: &[u8] = b"vkCreateDebugUtilsMessengerEXT\0";
const DESTROY_DEBUG_MESSENGER: &[u8] = b"vkDestroyDebugUtilsMessengerEXT\0";

fn to_cstring(value: &str) -> VulkanResult<CString> {
    CString::new(value).map_err(|_| VulkanError::InvalidName(value.to_string()))
}

fn fixed_array_to_string(raw: &[c_char]) -> String {
    unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

/// Vulkan loader, loaded at runtime
pub struct AshDriver {
    entry: Entry,
}

impl AshDriver {
    /// Load the system Vulkan loader
    pub fn load() -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::LoaderUnavailable(e.to_string()))?;
        Ok(Self { entry })
    }

    /// Underlying loader entry points
    pub fn entry(&self) -> &Entry {
        &self.entry
    }
}

impl GraphicsDriver for AshDriver {
    type Instance = AshInstance;

    fn instance_layers(&self) -> VulkanResult<Vec<LayerInfo>> {
        let layers = self
            .entry
            .enumerate_instance_layer_properties()
            .map_err(VulkanError::Api)?;

        Ok(layers
            .iter()
            .map(|layer| LayerInfo {
                name: fixed_array_to_string(&layer.layer_name),
                description: fixed_array_to_string(&layer.description),
                spec_version: Version::from_vk(layer.spec_version),
            })
            .collect())
    }

    fn instance_extensions(&self) -> VulkanResult<Vec<ExtensionInfo>> {
        let extensions = self
            .entry
            .enumerate_instance_extension_properties(None)
            .map_err(VulkanError::Api)?;

        Ok(extensions
            .iter()
            .map(|ext| ExtensionInfo {
                name: fixed_array_to_string(&ext.extension_name),
                spec_version: ext.spec_version,
            })
            .collect())
    }

    fn create_instance(&self, request: &InstanceRequest) -> VulkanResult<AshInstance> {
        let app_name = to_cstring(&request.application_name)?;
        let engine_name = to_cstring(&request.engine_name)?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(request.application_version)
            .engine_name(&engine_name)
            .engine_version(request.engine_version)
            .api_version(request.api_version);

        let layers = request
            .layers
            .iter()
            .map(|name| to_cstring(name))
            .collect::<VulkanResult<Vec<_>>>()?;
        let layer_ptrs: Vec<*const c_char> = layers.iter().map(|name| name.as_ptr()).collect();

        let extensions = request
            .extensions
            .iter()
            .map(|name| to_cstring(name))
            .collect::<VulkanResult<Vec<_>>>()?;
        let extension_ptrs: Vec<*const c_char> =
            extensions.iter().map(|name| name.as_ptr()).collect();

        let mut chained_messenger = request.debug_messenger.as_ref().map(messenger_create_info);

        let mut create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_layer_names(&layer_ptrs)
            .enabled_extension_names(&extension_ptrs);

        if let Some(messenger) = chained_messenger.as_mut() {
            create_info = create_info.push_next(messenger);
        }

        let instance = unsafe { self.entry.create_instance(&create_info, None) }
            .map_err(VulkanError::InstanceCreationFailed)?;

        let debug_utils = DebugUtilsFns::resolve(&self.entry, instance.handle());

        log::info!(
            "Created Vulkan instance for {} ({} layers, {} extensions)",
            request.application_name,
            request.layers.len(),
            request.extensions.len()
        );

        Ok(AshInstance {
            handle: Rc::new(InstanceHandle {
                instance,
                _entry: self.entry.clone(),
            }),
            debug_utils,
        })
    }
}

/// Debug-utils entry points resolved by name
#[derive(Clone, Copy)]
struct DebugUtilsFns {
    create: Option<vk::PFN_vkCreateDebugUtilsMessengerEXT>,
    destroy: Option<vk::PFN_vkDestroyDebugUtilsMessengerEXT>,
}

impl DebugUtilsFns {
    fn resolve(entry: &Entry, instance: vk::Instance) -> Self {
        unsafe {
            let create = entry
                .get_instance_proc_addr(instance, CREATE_DEBUG_MESSENGER.as_ptr().cast())
                .map(|f| {
                    std::mem::transmute::<unsafe extern "system" fn(), vk::PFN_vkCreateDebugUtilsMessengerEXT>(f)
                });
            let destroy = entry
                .get_instance_proc_addr(instance, DESTROY_DEBUG_MESSENGER.as_ptr().cast())
                .map(|f| {
                    std::mem::transmute::<unsafe extern "system" fn(), vk::PFN_vkDestroyDebugUtilsMessengerEXT>(f)
                });

            Self { create, destroy }
        }
    }
}

/// Owned instance handle, destroyed when the last owner lets go
struct InstanceHandle {
    instance: Instance,
    // Keeps the loader library mapped until the instance is destroyed
    _entry: Entry,
}

impl Drop for InstanceHandle {
    fn drop(&mut self) {
        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}

/// Vulkan instance wrapper with RAII cleanup
///
/// Debug messengers share ownership of the underlying instance, so
/// `vkDestroyInstance` runs only once this value and every messenger created
/// from it are gone.
pub struct AshInstance {
    handle: Rc<InstanceHandle>,
    debug_utils: DebugUtilsFns,
}

impl AshInstance {
    /// Underlying `ash` instance
    pub fn raw(&self) -> &Instance {
        &self.handle.instance
    }
}

impl GraphicsInstance for AshInstance {
    type DebugMessenger = AshDebugMessenger;

    fn create_debug_messenger(
        &self,
        config: &DebugMessengerConfig,
    ) -> VulkanResult<AshDebugMessenger> {
        let create = self.debug_utils.create.ok_or_else(|| {
            VulkanError::DebugMessengerSetupFailed(
                "vkCreateDebugUtilsMessengerEXT is not available".to_string(),
            )
        })?;
        let destroy = self.debug_utils.destroy.ok_or_else(|| {
            VulkanError::DebugMessengerSetupFailed(
                "vkDestroyDebugUtilsMessengerEXT is not available".to_string(),
            )
        })?;

        let create_info = messenger_create_info(config);
        let mut handle = vk::DebugUtilsMessengerEXT::null();
        let result = unsafe {
            create(
                self.handle.instance.handle(),
                &create_info,
                std::ptr::null(),
                &mut handle,
            )
        };

        if result != vk::Result::SUCCESS {
            return Err(VulkanError::DebugMessengerSetupFailed(format!(
                "vkCreateDebugUtilsMessengerEXT returned {:?}",
                result
            )));
        }

        log::debug!("Debug messenger attached");
        Ok(AshDebugMessenger {
            instance: Rc::clone(&self.handle),
            handle,
            destroy,
        })
    }

    fn physical_devices(&self) -> VulkanResult<Vec<PhysicalDeviceInfo>> {
        let instance = &self.handle.instance;
        let devices = unsafe { instance.enumerate_physical_devices() }
            .map_err(VulkanError::Api)?;

        Ok(devices
            .into_iter()
            .map(|device| unsafe { PhysicalDeviceInfo::query(instance, device) })
            .collect())
    }
}

/// Debug messenger handle, destroyed on drop
///
/// Keeps the instance it was created from alive, so the instance is always
/// destroyed after the messenger whatever order the owners are dropped in.
pub struct AshDebugMessenger {
    instance: Rc<InstanceHandle>,
    handle: vk::DebugUtilsMessengerEXT,
    destroy: vk::PFN_vkDestroyDebugUtilsMessengerEXT,
}

impl Drop for AshDebugMessenger {
    fn drop(&mut self) {
        unsafe {
            (self.destroy)(self.instance.instance.handle(), self.handle, std::ptr::null());
        }
    }
}

fn messenger_create_info(config: &DebugMessengerConfig) -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(config.severities)
        .message_type(config.message_types)
        .pfn_user_callback(Some(debug_callback))
        .build()
}

/// Log level for a driver-reported severity
pub(crate) fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Debug
    }
}

/// Severities in `requested` whose messages `max_level` filters out
pub(crate) fn hidden_severities(
    requested: vk::DebugUtilsMessageSeverityFlagsEXT,
    max_level: log::LevelFilter,
) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    use vk::DebugUtilsMessageSeverityFlagsEXT as Severity;

    [Severity::VERBOSE, Severity::INFO, Severity::WARNING, Severity::ERROR]
        .into_iter()
        .filter(|severity| requested.contains(*severity) && severity_level(*severity) > max_level)
        .fold(Severity::empty(), |hidden, severity| hidden | severity)
}

/// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let message = if callback_data.is_null() || (*callback_data).p_message.is_null() {
        Cow::from("")
    } else {
        CStr::from_ptr((*callback_data).p_message).to_string_lossy()
    };

    log::log!(
        severity_level(message_severity),
        "[Vulkan] {:?} - {}",
        message_type,
        message
    );

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::vulkan::driver::DEBUG_UTILS_EXTENSION;
    use ash::extensions::ext::DebugUtils;

    #[test]
    fn test_debug_utils_extension_name_matches_ash() {
        assert_eq!(DebugUtils::name().to_str().unwrap(), DEBUG_UTILS_EXTENSION);
    }

    #[test]
    fn test_entry_point_names_are_nul_terminated() {
        let create = CStr::from_bytes_with_nul(CREATE_DEBUG_MESSENGER).unwrap();
        let destroy = CStr::from_bytes_with_nul(DESTROY_DEBUG_MESSENGER).unwrap();
        assert_eq!(create.to_str().unwrap(), "vkCreateDebugUtilsMessengerEXT");
        assert_eq!(destroy.to_str().unwrap(), "vkDestroyDebugUtilsMessengerEXT");
    }

    #[test]
    fn test_severity_mapping() {
        use vk::DebugUtilsMessageSeverityFlagsEXT as Severity;

        assert_eq!(severity_level(Severity::ERROR), log::Level::Error);
        assert_eq!(severity_level(Severity::WARNING), log::Level::Warn);
        assert_eq!(severity_level(Severity::INFO), log::Level::Info);
        assert_eq!(severity_level(Severity::VERBOSE), log::Level::Debug);
    }

    #[test]
    fn test_hidden_severities_follow_log_level() {
        use vk::DebugUtilsMessageSeverityFlagsEXT as Severity;

        let requested = Severity::VERBOSE | Severity::WARNING | Severity::ERROR;
        assert_eq!(hidden_severities(requested, log::LevelFilter::Info), Severity::VERBOSE);
        assert_eq!(hidden_severities(requested, log::LevelFilter::Debug), Severity::empty());
        assert_eq!(
            hidden_severities(requested, log::LevelFilter::Error),
            Severity::VERBOSE | Severity::WARNING
        );
        assert_eq!(
            hidden_severities(Severity::ERROR, log::LevelFilter::Off),
            Severity::ERROR
        );
        assert_eq!(
            hidden_severities(Severity::INFO, log::LevelFilter::Info),
            Severity::empty()
        );
    }

    #[test]
    fn test_names_with_nul_are_rejected() {
        assert!(matches!(
            to_cstring("bad\0name"),
            Err(VulkanError::InvalidName(name)) if name == "bad\0name"
        ));
        assert_eq!(to_cstring("VK_KHR_surface").unwrap().as_bytes(), b"VK_KHR_surface");
    }

    #[test]
    fn test_messenger_create_info_carries_filters() {
        let config = DebugMessengerConfig {
            severities: vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            message_types: vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
        };
        let info = messenger_create_info(&config);
        assert_eq!(info.message_severity, config.severities);
        assert_eq!(info.message_type, config.message_types);
        assert!(info.pfn_user_callback.is_some());
    }

    #[test]
    fn test_callback_tolerates_null_data() {
        let result = unsafe {
            debug_callback(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL,
                std::ptr::null(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(result, vk::FALSE);
    }
}
