//! Per-device selection state and statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Selection lifecycle for a physical device.
///
/// Discovered -> Selected -> Released, with Released terminal: a released
/// device cannot be selected again and its cached tuners are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Discovered,
    Selected,
    Released,
}

/// Statistics for a single device
#[derive(Debug, Default)]
pub struct DeviceStats {
    pub tuners_built: AtomicU64,
    pub parameter_updates: AtomicU64,
}

impl DeviceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tuner_built(&self) {
        self.tuners_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parameter_update(&self) {
        self.parameter_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_tuners_built(&self) -> u64 {
        self.tuners_built.load(Ordering::Relaxed)
    }

    pub fn get_parameter_updates(&self) -> u64 {
        self.parameter_updates.load(Ordering::Relaxed)
    }
}
