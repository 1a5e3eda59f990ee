//! Hardware fault types

use thiserror::Error;

/// Faults raised by the device/tuner control path.
///
/// These are fail-fast: the hosting application treats them as unrecoverable
/// device faults and never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HardwareError {
    #[error("device must be selected before accessing the tuner")]
    NotSelected,

    #[error("device is already selected")]
    AlreadySelected,

    #[error("device has been released")]
    Released,

    #[error("device family {family} does not expose tuner {tuner}")]
    NoSuchTuner {
        family: &'static str,
        tuner: &'static str,
    },

    #[error("unrecognized device family '{0}'")]
    UnknownFamily(String),

    #[error("unsupported API version '{0}'")]
    UnsupportedApiVersion(String),
}
