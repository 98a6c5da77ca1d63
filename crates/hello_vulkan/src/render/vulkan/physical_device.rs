//! Physical device queries and selection

use ash::vk;
use ash::Instance;
use std::ffi::CStr;

use super::context::{VulkanError, VulkanResult};
use crate::core::config::{DeviceSelection, Version};

/// Physical device handle plus the properties selection looks at
///
/// The handle is borrowed from the instance: it is never created or destroyed
/// by the application and is only valid while the instance is alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDeviceInfo {
    /// Vulkan physical device handle
    pub handle: vk::PhysicalDevice,
    /// Marketing name reported by the driver
    pub name: String,
    /// Discrete, integrated, virtual, CPU or other
    pub device_type: vk::PhysicalDeviceType,
    /// PCI vendor id
    pub vendor_id: u32,
    /// Vendor-specific device id
    pub device_id: u32,
    /// Highest Vulkan version the device supports
    pub api_version: Version,
    /// Vendor-specific driver version
    pub driver_version: u32,
    /// Whether geometry shaders are supported
    pub geometry_shader: bool,
}

impl PhysicalDeviceInfo {
    /// Query properties and features of `handle`
    ///
    /// # Safety
    ///
    /// `handle` must have been enumerated from `instance`, and `instance` must
    /// not have been destroyed.
    pub(crate) unsafe fn query(instance: &Instance, handle: vk::PhysicalDevice) -> Self {
        let properties = unsafe { instance.get_physical_device_properties(handle) };
        let features = unsafe { instance.get_physical_device_features(handle) };

        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        Self {
            handle,
            name,
            device_type: properties.device_type,
            vendor_id: properties.vendor_id,
            device_id: properties.device_id,
            api_version: Version::from_vk(properties.api_version),
            driver_version: properties.driver_version,
            geometry_shader: features.geometry_shader == vk::TRUE,
        }
    }

    /// Whether this is a dedicated GPU
    pub fn is_discrete(&self) -> bool {
        self.device_type == vk::PhysicalDeviceType::DISCRETE_GPU
    }

    /// Short label for the device type
    pub fn device_type_name(&self) -> &'static str {
        match self.device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => "discrete",
            vk::PhysicalDeviceType::INTEGRATED_GPU => "integrated",
            vk::PhysicalDeviceType::VIRTUAL_GPU => "virtual",
            vk::PhysicalDeviceType::CPU => "cpu",
            _ => "other",
        }
    }
}

impl DeviceSelection {
    /// Suitability predicate for this policy
    pub fn is_suitable(self, device: &PhysicalDeviceInfo) -> bool {
        match self {
            Self::Any => true,
            Self::DiscreteWithGeometryShader => device.is_discrete() && device.geometry_shader,
        }
    }
}

/// Pick the first device accepted by `is_suitable`
///
/// The predicate is not called again after the first match.
pub fn select_physical_device<P>(
    devices: Vec<PhysicalDeviceInfo>,
    mut is_suitable: P,
) -> VulkanResult<PhysicalDeviceInfo>
where
    P: FnMut(&PhysicalDeviceInfo) -> bool,
{
    if devices.is_empty() {
        return Err(VulkanError::NoGpuFound);
    }

    for device in &devices {
        log::debug!(
            "Found GPU: {} ({}, Vulkan {})",
            device.name,
            device.device_type_name(),
            device.api_version
        );
    }

    let selected = devices
        .into_iter()
        .find(|device| is_suitable(device))
        .ok_or(VulkanError::NoSuitableGpu)?;

    log::info!(
        "Selected GPU: {} ({}, Vulkan {})",
        selected.name,
        selected.device_type_name(),
        selected.api_version
    );
    Ok(selected)
}

#[cfg(test)]
pub(crate) fn test_device(
    raw: u64,
    name: &str,
    device_type: vk::PhysicalDeviceType,
    geometry_shader: bool,
) -> PhysicalDeviceInfo {
    use ash::vk::Handle;

    PhysicalDeviceInfo {
        handle: vk::PhysicalDevice::from_raw(raw),
        name: name.to_string(),
        device_type,
        vendor_id: 0x10de,
        device_id: raw as u32,
        api_version: Version::new(1, 3, 0),
        driver_version: 1,
        geometry_shader,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn devices() -> Vec<PhysicalDeviceInfo> {
        vec![
            test_device(1, "Integrated", vk::PhysicalDeviceType::INTEGRATED_GPU, true),
            test_device(2, "Discrete no GS", vk::PhysicalDeviceType::DISCRETE_GPU, false),
            test_device(3, "Discrete", vk::PhysicalDeviceType::DISCRETE_GPU, true),
        ]
    }

    #[test]
    fn test_accept_all_picks_first_device() {
        let selected = select_physical_device(devices(), |d| DeviceSelection::Any.is_suitable(d))
            .unwrap();
        assert_eq!(selected.name, "Integrated");
        assert_eq!(selected, devices()[0]);
    }

    #[test]
    fn test_single_device_is_selected() {
        let only = vec![test_device(7, "Only", vk::PhysicalDeviceType::CPU, false)];
        let selected = select_physical_device(only.clone(), |_| true).unwrap();
        assert_eq!(selected, only[0]);
    }

    #[test]
    fn test_empty_list_is_no_gpu_found() {
        let result = select_physical_device(Vec::new(), |_| true);
        assert!(matches!(result, Err(VulkanError::NoGpuFound)));
    }

    #[test]
    fn test_nothing_suitable_is_no_suitable_gpu() {
        let result = select_physical_device(devices(), |_| false);
        assert!(matches!(result, Err(VulkanError::NoSuitableGpu)));
    }

    #[test]
    fn test_selection_stops_at_first_match() {
        let calls = Cell::new(0);
        let selected = select_physical_device(devices(), |d| {
            calls.set(calls.get() + 1);
            d.is_discrete()
        })
        .unwrap();

        assert_eq!(selected.name, "Discrete no GS");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_discrete_with_geometry_shader_policy() {
        let policy = DeviceSelection::DiscreteWithGeometryShader;
        let selected = select_physical_device(devices(), |d| policy.is_suitable(d)).unwrap();
        assert_eq!(selected.name, "Discrete");

        let integrated_only = vec![devices().remove(0)];
        let result = select_physical_device(integrated_only, |d| policy.is_suitable(d));
        assert!(matches!(result, Err(VulkanError::NoSuitableGpu)));
    }

    #[test]
    fn test_device_type_names() {
        let mut device = devices().remove(0);
        assert_eq!(device.device_type_name(), "integrated");
        device.device_type = vk::PhysicalDeviceType::VIRTUAL_GPU;
        assert_eq!(device.device_type_name(), "virtual");
        device.device_type = vk::PhysicalDeviceType::OTHER;
        assert_eq!(device.device_type_name(), "other");
    }
}
