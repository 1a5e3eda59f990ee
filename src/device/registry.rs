//! Device registry - enumeration and lookup of attached receivers

use tracing::info;

use crate::api::ApiVersion;

use super::{DeviceDescriptor, DeviceFamily};

/// Registry of devices reported by the driver enumeration pass.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceDescriptor>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a discovered device and returns its registry index. When no
    /// serial is reported a stable hash-based identifier is generated.
    pub fn register(
        &mut self,
        family: DeviceFamily,
        serial: Option<String>,
        api_version: ApiVersion,
    ) -> usize {
        let index = self.devices.len();
        let serial = serial
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| generate_device_serial(family, index));

        info!(
            "  {}: {} SN: {} (api {})",
            index,
            family.label(),
            serial,
            api_version.label()
        );

        self.devices
            .push(DeviceDescriptor::new(serial, family, api_version));
        index
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn device(&mut self, index: usize) -> Option<&mut DeviceDescriptor> {
        self.devices.get_mut(index)
    }

    pub fn find_by_serial(&mut self, serial: &str) -> Option<&mut DeviceDescriptor> {
        self.devices.iter_mut().find(|d| d.serial() == serial)
    }

    /// First device still in the Discovered state, if any.
    pub fn first_available(&mut self) -> Option<&mut DeviceDescriptor> {
        self.devices
            .iter_mut()
            .find(|d| d.state() == super::SelectionState::Discovered)
    }
}

/// Generate a hash-based serial from the family tag and registry position,
/// used when the hardware reports an empty or default serial.
fn generate_device_serial(family: DeviceFamily, index: usize) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    family.label().hash(&mut hasher);
    index.hash(&mut hasher);
    let hash = hasher.finish();
    format!("{:08X}", hash as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = DeviceRegistry::new();
        let index = registry.register(
            DeviceFamily::Rsp2,
            Some("2DUO0042".to_string()),
            ApiVersion::V3_08,
        );

        assert_eq!(registry.len(), 1);
        let device = registry.device(index).unwrap();
        assert_eq!(device.serial(), "2DUO0042");
        assert_eq!(device.family(), DeviceFamily::Rsp2);

        assert!(registry.find_by_serial("2DUO0042").is_some());
        assert!(registry.find_by_serial("MISSING").is_none());
    }

    #[test]
    fn test_generated_serial_for_blank_report() {
        let mut registry = DeviceRegistry::new();
        let index = registry.register(DeviceFamily::Rsp1a, Some("  ".to_string()), ApiVersion::V3_07);

        let device = registry.device(index).unwrap();
        assert_eq!(device.serial().len(), 8);
        assert!(device.serial().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_first_available_skips_selected() {
        let mut registry = DeviceRegistry::new();
        registry.register(DeviceFamily::Rsp1, None, ApiVersion::V3_07);
        registry.register(DeviceFamily::RspDx, None, ApiVersion::V3_08);

        registry.device(0).unwrap().select().unwrap();
        let next = registry.first_available().unwrap();
        assert_eq!(next.family(), DeviceFamily::RspDx);
    }
}
