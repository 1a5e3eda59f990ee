//! Device descriptors, selection state machine and tuner access
//!
//! A physical unit is represented by a descriptor that walks
//! Discovered -> Selected -> Released. Selecting a device attaches its
//! composite parameter allocation; tuners are built lazily on first access
//! after selection, memoized for the device's lifetime and invalidated on
//! release.

mod registry;
pub mod state;
mod tuner;

pub use registry::DeviceRegistry;
pub use state::{DeviceStats, SelectionState};
pub use tuner::Tuner;

use tracing::{debug, info};

use crate::api::{ApiVersion, CompositeParameters, TunerSelect, UpdateReason};
use crate::error::HardwareError;

/// Closed set of supported RF front-end families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFamily {
    Rsp1,
    Rsp1a,
    Rsp2,
    RspDuo,
    RspDx,
}

impl DeviceFamily {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rsp1 => "RSP1",
            Self::Rsp1a => "RSP1A",
            Self::Rsp2 => "RSP2",
            Self::RspDuo => "RSPduo",
            Self::RspDx => "RSPdx",
        }
    }

    /// Number of independent hardware tuners the family exposes.
    pub fn tuner_count(&self) -> usize {
        match self {
            Self::RspDuo => 2,
            _ => 1,
        }
    }

    pub const ALL: [DeviceFamily; 5] = [
        Self::Rsp1,
        Self::Rsp1a,
        Self::Rsp2,
        Self::RspDuo,
        Self::RspDx,
    ];
}

impl std::str::FromStr for DeviceFamily {
    type Err = HardwareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rsp1" => Ok(Self::Rsp1),
            "rsp1a" => Ok(Self::Rsp1a),
            "rsp2" => Ok(Self::Rsp2),
            "rspduo" => Ok(Self::RspDuo),
            "rspdx" => Ok(Self::RspDx),
            _ => Err(HardwareError::UnknownFamily(value.trim().to_string())),
        }
    }
}

/// One physical device known to the registry.
pub struct DeviceDescriptor {
    serial: String,
    family: DeviceFamily,
    api_version: ApiVersion,
    state: SelectionState,
    stats: DeviceStats,
    params: Option<CompositeParameters>,
    tuner_a: Option<Tuner>,
    tuner_b: Option<Tuner>,
}

impl DeviceDescriptor {
    pub fn new(serial: String, family: DeviceFamily, api_version: ApiVersion) -> Self {
        Self {
            serial,
            family,
            api_version,
            state: SelectionState::Discovered,
            stats: DeviceStats::new(),
            params: None,
            tuner_a: None,
            tuner_b: None,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn family(&self) -> DeviceFamily {
        self.family
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn stats(&self) -> &DeviceStats {
        &self.stats
    }

    pub fn is_selected(&self) -> bool {
        self.state == SelectionState::Selected
    }

    /// Composite parameter block, present only while the device is selected.
    pub fn parameters(&self) -> Option<&CompositeParameters> {
        self.params.as_ref()
    }

    /// Transitions Discovered -> Selected and attaches the composite
    /// parameter allocation for this family and API revision.
    pub fn select(&mut self) -> Result<(), HardwareError> {
        match self.state {
            SelectionState::Discovered => {
                self.params = Some(CompositeParameters::new(
                    self.api_version,
                    self.family.tuner_count(),
                ));
                self.state = SelectionState::Selected;
                info!(
                    "selected {} {} (api {})",
                    self.family.label(),
                    self.serial,
                    self.api_version.label()
                );
                Ok(())
            }
            SelectionState::Selected => Err(HardwareError::AlreadySelected),
            SelectionState::Released => Err(HardwareError::Released),
        }
    }

    /// Transitions Selected -> Released, dropping the parameter allocation
    /// and invalidating any cached tuners. Released is terminal.
    pub fn release(&mut self) -> Result<(), HardwareError> {
        match self.state {
            SelectionState::Selected => {
                self.tuner_a = None;
                self.tuner_b = None;
                self.params = None;
                self.state = SelectionState::Released;
                info!("released {} {}", self.family.label(), self.serial);
                Ok(())
            }
            SelectionState::Discovered => Err(HardwareError::NotSelected),
            SelectionState::Released => Err(HardwareError::Released),
        }
    }

    /// Tuner A, lazily built on first access after selection and memoized.
    pub fn tuner_a(&mut self) -> Result<Tuner, HardwareError> {
        self.require_selected()?;

        match &self.tuner_a {
            Some(tuner) => Ok(tuner.clone()),
            None => {
                let tuner = self.build_tuner(TunerSelect::A)?;
                self.tuner_a = Some(tuner.clone());
                Ok(tuner)
            }
        }
    }

    /// Tuner B on dual-tuner hardware; fails on single-tuner families.
    pub fn tuner_b(&mut self) -> Result<Tuner, HardwareError> {
        self.require_selected()?;

        if self.family.tuner_count() < 2 {
            return Err(HardwareError::NoSuchTuner {
                family: self.family.label(),
                tuner: TunerSelect::B.label(),
            });
        }

        match &self.tuner_b {
            Some(tuner) => Ok(tuner.clone()),
            None => {
                let tuner = self.build_tuner(TunerSelect::B)?;
                self.tuner_b = Some(tuner.clone());
                Ok(tuner)
            }
        }
    }

    /// Applies a parameter update to hardware for the given tuner. The
    /// update-reason word names the changed region of the composite block.
    pub fn update(
        &mut self,
        tuner: TunerSelect,
        reason: UpdateReason,
    ) -> Result<(), HardwareError> {
        self.require_selected()?;
        self.stats.record_parameter_update();
        debug!(
            "update {} {} tuner {} reason {:?}",
            self.family.label(),
            self.serial,
            tuner.label(),
            reason
        );
        Ok(())
    }

    fn require_selected(&self) -> Result<(), HardwareError> {
        match self.state {
            SelectionState::Selected => Ok(()),
            SelectionState::Discovered => Err(HardwareError::NotSelected),
            SelectionState::Released => Err(HardwareError::Released),
        }
    }

    fn build_tuner(&self, select: TunerSelect) -> Result<Tuner, HardwareError> {
        let params = self.params.as_ref().ok_or(HardwareError::NotSelected)?;

        let (tuner_params, control_params) = match select {
            TunerSelect::A => (params.tuner_a(), params.control_a()),
            TunerSelect::B => {
                let tuner = params.tuner_b().ok_or(HardwareError::NoSuchTuner {
                    family: self.family.label(),
                    tuner: select.label(),
                })?;
                let control = params.control_b().ok_or(HardwareError::NoSuchTuner {
                    family: self.family.label(),
                    tuner: select.label(),
                })?;
                (tuner, control)
            }
        };

        self.stats.record_tuner_built();
        debug!(
            "built tuner {} for {} {}",
            select.label(),
            self.family.label(),
            self.serial
        );

        Ok(Tuner::new(
            select,
            &self.serial,
            params.device_params(),
            tuner_params,
            control_params,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(family: DeviceFamily) -> DeviceDescriptor {
        DeviceDescriptor::new("TEST0001".to_string(), family, ApiVersion::V3_08)
    }

    #[test]
    fn test_tuner_before_select_fails_for_all_families() {
        for family in DeviceFamily::ALL {
            let mut dev = device(family);
            assert_eq!(dev.tuner_a().unwrap_err(), HardwareError::NotSelected);
        }
    }

    #[test]
    fn test_tuner_is_memoized_after_select() {
        let mut dev = device(DeviceFamily::Rsp2);
        dev.select().unwrap();

        let first = dev.tuner_a().unwrap();
        let second = dev.tuner_a().unwrap();

        assert!(first.same_instance(&second));
        assert_eq!(dev.stats().get_tuners_built(), 1);
    }

    #[test]
    fn test_dual_tuner_family_exposes_independent_tuners() {
        let mut dev = device(DeviceFamily::RspDuo);
        dev.select().unwrap();

        let a = dev.tuner_a().unwrap();
        let b = dev.tuner_b().unwrap();

        a.set_frequency(100_000_000.0);
        b.set_frequency(450_000_000.0);

        assert_eq!(a.frequency(), 100_000_000.0);
        assert_eq!(b.frequency(), 450_000_000.0);
        assert!(!a.same_instance(&b));
    }

    #[test]
    fn test_single_tuner_family_has_no_tuner_b() {
        let mut dev = device(DeviceFamily::Rsp1a);
        dev.select().unwrap();

        assert_eq!(
            dev.tuner_b().unwrap_err(),
            HardwareError::NoSuchTuner {
                family: "RSP1A",
                tuner: "B"
            }
        );
    }

    #[test]
    fn test_release_invalidates_and_is_terminal() {
        let mut dev = device(DeviceFamily::Rsp2);
        dev.select().unwrap();
        dev.tuner_a().unwrap();

        dev.release().unwrap();
        assert_eq!(dev.state(), SelectionState::Released);
        assert_eq!(dev.tuner_a().unwrap_err(), HardwareError::Released);
        assert_eq!(dev.select().unwrap_err(), HardwareError::Released);
        assert!(dev.parameters().is_none());
    }

    #[test]
    fn test_double_select_fails() {
        let mut dev = device(DeviceFamily::Rsp1);
        dev.select().unwrap();
        assert_eq!(dev.select().unwrap_err(), HardwareError::AlreadySelected);
    }

    #[test]
    fn test_update_requires_selection() {
        let mut dev = device(DeviceFamily::Rsp2);
        assert_eq!(
            dev.update(TunerSelect::A, UpdateReason::TunerFrf).unwrap_err(),
            HardwareError::NotSelected
        );

        dev.select().unwrap();
        dev.update(TunerSelect::A, UpdateReason::TunerFrf).unwrap();
        assert_eq!(dev.stats().get_parameter_updates(), 1);
    }
}
