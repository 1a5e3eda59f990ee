//! Logical RF front-end channel within a device
//!
//! A tuner never owns its device; it drives the parameter sub-blocks the
//! device's composite allocation handed it at construction. Handles are
//! cheap clones over the same underlying blocks, so the device can memoize
//! one instance per hardware tuner and return it for every access.

use tracing::debug;

use crate::api::{
    AgcMode, Bandwidth, ControlParams, DevParams, IfMode, LoMode, TunerParams, TunerSelect,
};

/// Control surface for one hardware tuner.
#[derive(Debug, Clone)]
pub struct Tuner {
    select: TunerSelect,
    device_serial: String,
    dev_params: DevParams,
    tuner_params: TunerParams,
    control_params: ControlParams,
}

impl Tuner {
    pub(crate) fn new(
        select: TunerSelect,
        device_serial: &str,
        dev_params: DevParams,
        tuner_params: TunerParams,
        control_params: ControlParams,
    ) -> Self {
        Self {
            select,
            device_serial: device_serial.to_string(),
            dev_params,
            tuner_params,
            control_params,
        }
    }

    pub fn select(&self) -> TunerSelect {
        self.select
    }

    /// Center frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.tuner_params.rf_freq().rf_hz()
    }

    pub fn set_frequency(&self, hz: f64) {
        self.tuner_params.rf_freq().set_rf_hz(hz);
        debug!(
            "tuner {}/{}: rf frequency set to {:.0} Hz",
            self.device_serial,
            self.select.label(),
            hz
        );
    }

    /// IF gain reduction in dB, clamped to the block's reported minimum.
    pub fn gain_reduction(&self) -> u32 {
        self.tuner_params.gain().gr_db()
    }

    pub fn set_gain_reduction(&self, gr_db: u32) {
        let gain = self.tuner_params.gain();
        let clamped = gr_db.max(gain.min_gr()).min(59);
        gain.set_gr_db(clamped);
        debug!(
            "tuner {}/{}: gain reduction set to {} dB",
            self.device_serial,
            self.select.label(),
            clamped
        );
    }

    pub fn lna_state(&self) -> u8 {
        self.tuner_params.gain().lna_state()
    }

    pub fn set_lna_state(&self, state: u8) {
        self.tuner_params.gain().set_lna_state(state);
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.tuner_params.bandwidth()
    }

    pub fn set_bandwidth(&self, bandwidth: Bandwidth) {
        self.tuner_params.set_bandwidth(bandwidth);
    }

    pub fn if_mode(&self) -> IfMode {
        self.tuner_params.if_mode()
    }

    pub fn set_if_mode(&self, mode: IfMode) {
        self.tuner_params.set_if_mode(mode);
    }

    pub fn lo_mode(&self) -> LoMode {
        self.tuner_params.lo_mode()
    }

    pub fn set_lo_mode(&self, mode: LoMode) {
        self.tuner_params.set_lo_mode(mode);
    }

    /// Enables or disables DC offset tracking on this tuner.
    pub fn set_dc_tracking(&self, enabled: bool, speed_up: bool) {
        let dc = self.tuner_params.dc_offset();
        dc.set_dc_cal(if enabled { 3 } else { 0 });
        dc.set_speed_up(speed_up);
        self.control_params.set_dc_enabled(enabled);
    }

    pub fn agc_mode(&self) -> AgcMode {
        self.control_params.agc().mode()
    }

    pub fn set_agc_mode(&self, mode: AgcMode) {
        self.control_params.agc().set_mode(mode);
    }

    /// Sample rate of the owning device in Hz; device-wide, shared by both
    /// tuners on dual-tuner hardware.
    pub fn sample_rate(&self) -> f64 {
        self.dev_params.fs_hz()
    }

    pub fn set_sample_rate(&self, hz: f64) {
        self.dev_params.set_fs_hz(hz);
    }

    /// True when this handle drives the same parameter blocks as `other`,
    /// i.e. both came from the same memoized device slot.
    pub fn same_instance(&self, other: &Tuner) -> bool {
        self.select == other.select
            && self
                .tuner_params
                .segment()
                .shares_block(other.tuner_params.segment())
    }
}
