//! Native mirror of the vendor RF receiver API
//!
//! In-memory, byte-exact images of the driver's parameter structures:
//! 1. Allocate one composite block per selected device
//! 2. Slice device-wide, per-tuner and per-control sub-blocks out of it
//! 3. Read and write fields through typed accessors only
//! 4. Push changed regions to hardware via an update-reason word
//!
//! Layouts are versioned per supported API revision; blocks from different
//! revisions must never be mixed, which is enforced by fixing every offset
//! at construction time from the revision chosen for the device.

pub mod segment;
pub mod v3_07;
pub mod v3_08;

pub use segment::Segment;

use crate::error::HardwareError;

/// Supported vendor API revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V3_07,
    V3_08,
}

impl ApiVersion {
    pub fn label(&self) -> &'static str {
        match self {
            Self::V3_07 => "3.07",
            Self::V3_08 => "3.08",
        }
    }
}

impl std::str::FromStr for ApiVersion {
    type Err = HardwareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "3.07" | "v3.07" | "3_07" => Ok(Self::V3_07),
            "3.08" | "v3.08" | "3_08" => Ok(Self::V3_08),
            other => Err(HardwareError::UnsupportedApiVersion(other.to_string())),
        }
    }
}

/// Logical tuner within a device; RSPduo hardware exposes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunerSelect {
    A,
    B,
}

impl TunerSelect {
    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

/// sdrplay_api_Bw_MHzT - IF bandwidth in kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Bandwidth {
    Undefined = 0,
    Bw200 = 200,
    Bw300 = 300,
    Bw600 = 600,
    Bw1536 = 1536,
    Bw5000 = 5000,
    Bw6000 = 6000,
    Bw7000 = 7000,
    Bw8000 = 8000,
}

impl Bandwidth {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            200 => Self::Bw200,
            300 => Self::Bw300,
            600 => Self::Bw600,
            1536 => Self::Bw1536,
            5000 => Self::Bw5000,
            6000 => Self::Bw6000,
            7000 => Self::Bw7000,
            8000 => Self::Bw8000,
            _ => Self::Undefined,
        }
    }

    /// Known bandwidth for a kHz value; `None` when unsupported.
    pub fn from_khz(khz: u32) -> Option<Self> {
        match Self::from_raw(khz) {
            Self::Undefined => None,
            bandwidth => Some(bandwidth),
        }
    }
}

/// sdrplay_api_If_kHzT - IF mode in kHz, zero-IF by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum IfMode {
    Undefined = -1,
    Zero = 0,
    If450 = 450,
    If1620 = 1620,
    If2048 = 2048,
}

impl IfMode {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Zero,
            450 => Self::If450,
            1620 => Self::If1620,
            2048 => Self::If2048,
            _ => Self::Undefined,
        }
    }
}

/// sdrplay_api_LoModeT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LoMode {
    Undefined = 0,
    Auto = 1,
    Lo120MHz = 2,
    Lo144MHz = 3,
    Lo168MHz = 4,
}

impl LoMode {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Auto,
            2 => Self::Lo120MHz,
            3 => Self::Lo144MHz,
            4 => Self::Lo168MHz,
            _ => Self::Undefined,
        }
    }
}

/// sdrplay_api_AgcControlT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AgcMode {
    Disable = 0,
    Agc100Hz = 1,
    Agc50Hz = 2,
    Agc5Hz = 3,
    CtrlEn = 4,
}

impl AgcMode {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Agc100Hz,
            2 => Self::Agc50Hz,
            3 => Self::Agc5Hz,
            4 => Self::CtrlEn,
            _ => Self::Disable,
        }
    }
}

/// sdrplay_api_ReasonForUpdateT - which block of a composite allocation
/// changed and must be pushed to hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum UpdateReason {
    DevFs = 0x01,
    DevPpm = 0x02,
    DevSyncUpdate = 0x04,
    DevResetFlags = 0x08,
    TunerGr = 0x10,
    TunerGrLimits = 0x20,
    TunerFrf = 0x40,
    TunerBwType = 0x80,
    TunerIfType = 0x100,
    TunerDcOffset = 0x200,
    TunerLoMode = 0x400,
    CtrlDcOffsetIq = 0x800,
    CtrlDecimation = 0x1000,
    CtrlAgc = 0x2000,
    CtrlAdsbMode = 0x4000,
}

/// Gain sub-block of the tuner parameters.
#[derive(Debug, Clone)]
pub struct GainParams {
    seg: Segment,
}

impl GainParams {
    fn new(seg: Segment) -> Self {
        Self { seg }
    }

    pub fn gr_db(&self) -> u32 {
        self.seg.get_u32(v3_07::tuner::gain::GR_DB)
    }

    pub fn set_gr_db(&self, value: u32) {
        self.seg.set_u32(v3_07::tuner::gain::GR_DB, value);
    }

    pub fn lna_state(&self) -> u8 {
        self.seg.get_u8(v3_07::tuner::gain::LNA_STATE)
    }

    pub fn set_lna_state(&self, value: u8) {
        self.seg.set_u8(v3_07::tuner::gain::LNA_STATE, value);
    }

    pub fn sync_update(&self) -> bool {
        self.seg.get_flag(v3_07::tuner::gain::SYNC_UPDATE)
    }

    pub fn set_sync_update(&self, value: bool) {
        self.seg.set_flag(v3_07::tuner::gain::SYNC_UPDATE, value);
    }

    pub fn min_gr(&self) -> u32 {
        self.seg.get_u32(v3_07::tuner::gain::MIN_GR)
    }

    pub fn set_min_gr(&self, value: u32) {
        self.seg.set_u32(v3_07::tuner::gain::MIN_GR, value);
    }

    pub fn current_gain(&self) -> f32 {
        self.seg.get_f32(v3_07::tuner::gain::GAIN_VALS_CURR)
    }

    pub fn set_current_gain(&self, value: f32) {
        self.seg.set_f32(v3_07::tuner::gain::GAIN_VALS_CURR, value);
    }

    pub fn max_gain(&self) -> f32 {
        self.seg.get_f32(v3_07::tuner::gain::GAIN_VALS_MAX)
    }

    pub fn min_gain(&self) -> f32 {
        self.seg.get_f32(v3_07::tuner::gain::GAIN_VALS_MIN)
    }

    pub(crate) fn segment(&self) -> &Segment {
        &self.seg
    }
}

/// RF frequency sub-block of the tuner parameters.
#[derive(Debug, Clone)]
pub struct RfFreqParams {
    seg: Segment,
}

impl RfFreqParams {
    fn new(seg: Segment) -> Self {
        Self { seg }
    }

    pub fn rf_hz(&self) -> f64 {
        self.seg.get_f64(v3_07::tuner::rf_freq::RF_HZ)
    }

    pub fn set_rf_hz(&self, value: f64) {
        self.seg.set_f64(v3_07::tuner::rf_freq::RF_HZ, value);
    }

    pub fn sync_update(&self) -> bool {
        self.seg.get_flag(v3_07::tuner::rf_freq::SYNC_UPDATE)
    }

    pub fn set_sync_update(&self, value: bool) {
        self.seg.set_flag(v3_07::tuner::rf_freq::SYNC_UPDATE, value);
    }
}

/// DC offset tracking sub-block of the tuner parameters.
#[derive(Debug, Clone)]
pub struct DcOffsetParams {
    seg: Segment,
}

impl DcOffsetParams {
    fn new(seg: Segment) -> Self {
        Self { seg }
    }

    pub fn dc_cal(&self) -> u8 {
        self.seg.get_u8(v3_07::tuner::dc_offset::DC_CAL)
    }

    pub fn set_dc_cal(&self, value: u8) {
        self.seg.set_u8(v3_07::tuner::dc_offset::DC_CAL, value);
    }

    pub fn speed_up(&self) -> bool {
        self.seg.get_flag(v3_07::tuner::dc_offset::SPEED_UP)
    }

    pub fn set_speed_up(&self, value: bool) {
        self.seg.set_flag(v3_07::tuner::dc_offset::SPEED_UP, value);
    }

    pub fn track_time(&self) -> u32 {
        self.seg.get_u32(v3_07::tuner::dc_offset::TRACK_TIME)
    }

    pub fn set_track_time(&self, value: u32) {
        self.seg.set_u32(v3_07::tuner::dc_offset::TRACK_TIME, value);
    }

    pub fn refresh_rate_time(&self) -> u32 {
        self.seg.get_u32(v3_07::tuner::dc_offset::REFRESH_RATE_TIME)
    }

    pub fn set_refresh_rate_time(&self, value: u32) {
        self.seg.set_u32(v3_07::tuner::dc_offset::REFRESH_RATE_TIME, value);
    }
}

/// Tuner parameter block (sdrplay_api_TunerParamsT).
#[derive(Debug, Clone)]
pub struct TunerParams {
    seg: Segment,
}

impl TunerParams {
    pub fn new(seg: Segment) -> Self {
        assert_eq!(
            seg.len(),
            v3_07::tuner::SIZE,
            "tuner parameter block size mismatch"
        );
        Self { seg }
    }

    pub fn bandwidth(&self) -> Bandwidth {
        Bandwidth::from_raw(self.seg.get_u32(v3_07::tuner::BW_TYPE))
    }

    pub fn set_bandwidth(&self, value: Bandwidth) {
        self.seg.set_u32(v3_07::tuner::BW_TYPE, value as u32);
    }

    pub fn if_mode(&self) -> IfMode {
        IfMode::from_raw(self.seg.get_i32(v3_07::tuner::IF_TYPE))
    }

    pub fn set_if_mode(&self, value: IfMode) {
        self.seg.set_i32(v3_07::tuner::IF_TYPE, value as i32);
    }

    pub fn lo_mode(&self) -> LoMode {
        LoMode::from_raw(self.seg.get_u32(v3_07::tuner::LO_MODE))
    }

    pub fn set_lo_mode(&self, value: LoMode) {
        self.seg.set_u32(v3_07::tuner::LO_MODE, value as u32);
    }

    pub fn gain(&self) -> GainParams {
        GainParams::new(
            self.seg
                .slice(v3_07::tuner::gain::OFFSET, v3_07::tuner::gain::SIZE),
        )
    }

    pub fn rf_freq(&self) -> RfFreqParams {
        RfFreqParams::new(
            self.seg
                .slice(v3_07::tuner::rf_freq::OFFSET, v3_07::tuner::rf_freq::SIZE),
        )
    }

    pub fn dc_offset(&self) -> DcOffsetParams {
        DcOffsetParams::new(self.seg.slice(
            v3_07::tuner::dc_offset::OFFSET,
            v3_07::tuner::dc_offset::SIZE,
        ))
    }

    pub(crate) fn segment(&self) -> &Segment {
        &self.seg
    }
}

/// AGC sub-block of the control parameters.
#[derive(Debug, Clone)]
pub struct AgcParams {
    seg: Segment,
}

impl AgcParams {
    fn new(seg: Segment) -> Self {
        Self { seg }
    }

    pub fn mode(&self) -> AgcMode {
        AgcMode::from_raw(self.seg.get_u32(v3_07::control::agc::ENABLE))
    }

    pub fn set_mode(&self, value: AgcMode) {
        self.seg.set_u32(v3_07::control::agc::ENABLE, value as u32);
    }

    pub fn set_point_dbfs(&self) -> i32 {
        self.seg.get_i32(v3_07::control::agc::SET_POINT_DBFS)
    }

    pub fn set_set_point_dbfs(&self, value: i32) {
        self.seg.set_i32(v3_07::control::agc::SET_POINT_DBFS, value);
    }

    pub fn attack_ms(&self) -> u16 {
        self.seg.get_u16(v3_07::control::agc::ATTACK_MS)
    }

    pub fn set_attack_ms(&self, value: u16) {
        self.seg.set_u16(v3_07::control::agc::ATTACK_MS, value);
    }

    pub fn decay_ms(&self) -> u16 {
        self.seg.get_u16(v3_07::control::agc::DECAY_MS)
    }

    pub fn set_decay_ms(&self, value: u16) {
        self.seg.set_u16(v3_07::control::agc::DECAY_MS, value);
    }

    pub fn decay_delay_ms(&self) -> u16 {
        self.seg.get_u16(v3_07::control::agc::DECAY_DELAY_MS)
    }

    pub fn decay_threshold_db(&self) -> u16 {
        self.seg.get_u16(v3_07::control::agc::DECAY_THRESHOLD_DB)
    }
}

/// Control parameter block (sdrplay_api_ControlParamsT).
#[derive(Debug, Clone)]
pub struct ControlParams {
    seg: Segment,
}

impl ControlParams {
    pub fn new(seg: Segment) -> Self {
        assert_eq!(
            seg.len(),
            v3_07::control::SIZE,
            "control parameter block size mismatch"
        );
        Self { seg }
    }

    pub fn dc_enabled(&self) -> bool {
        self.seg.get_flag(v3_07::control::DC_ENABLE)
    }

    pub fn set_dc_enabled(&self, value: bool) {
        self.seg.set_flag(v3_07::control::DC_ENABLE, value);
    }

    pub fn iq_enabled(&self) -> bool {
        self.seg.get_flag(v3_07::control::IQ_ENABLE)
    }

    pub fn set_iq_enabled(&self, value: bool) {
        self.seg.set_flag(v3_07::control::IQ_ENABLE, value);
    }

    pub fn decimation_enabled(&self) -> bool {
        self.seg.get_flag(v3_07::control::DECIMATION_ENABLE)
    }

    pub fn set_decimation_enabled(&self, value: bool) {
        self.seg.set_flag(v3_07::control::DECIMATION_ENABLE, value);
    }

    pub fn decimation_factor(&self) -> u8 {
        self.seg.get_u8(v3_07::control::DECIMATION_FACTOR)
    }

    pub fn set_decimation_factor(&self, value: u8) {
        self.seg.set_u8(v3_07::control::DECIMATION_FACTOR, value);
    }

    pub fn agc(&self) -> AgcParams {
        AgcParams::new(
            self.seg
                .slice(v3_07::control::agc::OFFSET, v3_07::control::agc::SIZE),
        )
    }

    pub fn adsb_mode(&self) -> u32 {
        self.seg.get_u32(v3_07::control::ADSB_MODE)
    }

    pub fn set_adsb_mode(&self, value: u32) {
        self.seg.set_u32(v3_07::control::ADSB_MODE, value);
    }
}

/// Device-wide parameter block (sdrplay_api_DevParamsT).
///
/// The common fields sit at the same offsets in both supported revisions;
/// the RSPduo tail region is revision-dependent.
#[derive(Debug, Clone)]
pub struct DevParams {
    seg: Segment,
    version: ApiVersion,
}

impl DevParams {
    pub fn new(seg: Segment, version: ApiVersion) -> Self {
        assert_eq!(
            seg.len(),
            v3_07::dev::SIZE,
            "device parameter block size mismatch"
        );
        Self { seg, version }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn ppm(&self) -> f64 {
        self.seg.get_f64(v3_07::dev::PPM)
    }

    pub fn set_ppm(&self, value: f64) {
        self.seg.set_f64(v3_07::dev::PPM, value);
    }

    pub fn fs_hz(&self) -> f64 {
        self.seg
            .get_f64(v3_07::dev::fs_freq::OFFSET + v3_07::dev::fs_freq::FS_HZ)
    }

    pub fn set_fs_hz(&self, value: f64) {
        self.seg
            .set_f64(v3_07::dev::fs_freq::OFFSET + v3_07::dev::fs_freq::FS_HZ, value);
    }

    pub fn samples_per_pkt(&self) -> u32 {
        self.seg.get_u32(v3_07::dev::SAMPLES_PER_PKT)
    }

    pub fn set_samples_per_pkt(&self, value: u32) {
        self.seg.set_u32(v3_07::dev::SAMPLES_PER_PKT, value);
    }

    pub fn transfer_mode(&self) -> u32 {
        self.seg.get_u32(v3_07::dev::MODE)
    }

    pub fn set_transfer_mode(&self, value: u32) {
        self.seg.set_u32(v3_07::dev::MODE, value);
    }

    pub fn rsp2_antenna_sel(&self) -> u32 {
        self.seg
            .get_u32(v3_07::dev::rsp2::OFFSET + v3_07::dev::rsp2::ANTENNA_SEL)
    }

    pub fn set_rsp2_antenna_sel(&self, value: u32) {
        self.seg
            .set_u32(v3_07::dev::rsp2::OFFSET + v3_07::dev::rsp2::ANTENNA_SEL, value);
    }

    pub fn rsp2_rf_notch_enabled(&self) -> bool {
        self.seg
            .get_flag(v3_07::dev::rsp2::OFFSET + v3_07::dev::rsp2::RF_NOTCH_ENABLE)
    }

    pub fn set_rsp2_rf_notch_enabled(&self, value: bool) {
        self.seg
            .set_flag(v3_07::dev::rsp2::OFFSET + v3_07::dev::rsp2::RF_NOTCH_ENABLE, value);
    }

    pub fn rsp_duo_ext_ref_enabled(&self) -> bool {
        self.seg
            .get_u32(v3_07::dev::rsp_duo::OFFSET + v3_07::dev::rsp_duo::EXT_REF_OUTPUT_EN)
            != 0
    }

    pub fn set_rsp_duo_ext_ref_enabled(&self, value: bool) {
        self.seg.set_u32(
            v3_07::dev::rsp_duo::OFFSET + v3_07::dev::rsp_duo::EXT_REF_OUTPUT_EN,
            u32::from(value),
        );
    }

    /// Slave-tuner reset flags: mapped only from revision 3.08 onward.
    /// Touching them on a 3.07 block addresses unmapped padding, which is a
    /// contract violation and faults.
    pub fn set_rsp_duo_reset_slave_flags(&self, gain: bool, rf: bool, fs: bool) {
        match self.version {
            ApiVersion::V3_07 => {
                panic!("RSPduo slave reset flags are not mapped in API 3.07")
            }
            ApiVersion::V3_08 => {
                let base = v3_08::dev::rsp_duo::OFFSET;
                self.seg
                    .set_flag(base + v3_08::dev::rsp_duo::RESET_SLAVE_GAIN, gain);
                self.seg
                    .set_flag(base + v3_08::dev::rsp_duo::RESET_SLAVE_RF, rf);
                self.seg
                    .set_flag(base + v3_08::dev::rsp_duo::RESET_SLAVE_FS, fs);
            }
        }
    }
}

/// Full configuration-register image for one device: device-wide parameters
/// plus one rx-channel block (tuner + control) per hardware tuner.
#[derive(Debug, Clone)]
pub struct CompositeParameters {
    version: ApiVersion,
    dev: Segment,
    rx_a: Segment,
    rx_b: Option<Segment>,
}

impl CompositeParameters {
    /// Allocates and seeds the blocks for a device with `tuner_count`
    /// hardware tuners (1 or 2).
    pub fn new(version: ApiVersion, tuner_count: usize) -> Self {
        assert!(
            (1..=2).contains(&tuner_count),
            "devices expose one or two tuners, not {tuner_count}"
        );

        let params = Self {
            version,
            dev: Segment::allocate(v3_07::dev::SIZE),
            rx_a: Segment::allocate(v3_07::rx_channel::SIZE),
            rx_b: (tuner_count == 2).then(|| Segment::allocate(v3_07::rx_channel::SIZE)),
        };
        params.seed_defaults();
        params
    }

    /// Driver power-on defaults, written once at allocation.
    fn seed_defaults(&self) {
        let dev = self.device_params();
        dev.set_fs_hz(2_000_000.0);
        dev.set_samples_per_pkt(504);

        for tuner in [Some(self.tuner_a()), self.tuner_b()].into_iter().flatten() {
            tuner.set_bandwidth(Bandwidth::Bw200);
            tuner.set_if_mode(IfMode::Zero);
            tuner.set_lo_mode(LoMode::Auto);
            tuner.rf_freq().set_rf_hz(200_000_000.0);

            let gain = tuner.gain();
            gain.set_gr_db(50);
            gain.set_min_gr(20);

            let dc = tuner.dc_offset();
            dc.set_dc_cal(3);
            dc.set_track_time(1);
            dc.set_refresh_rate_time(2048);
        }

        for control in [Some(self.control_a()), self.control_b()]
            .into_iter()
            .flatten()
        {
            control.set_dc_enabled(true);
            control.set_iq_enabled(true);
            control.set_decimation_factor(1);
            let agc = control.agc();
            agc.set_mode(AgcMode::Agc50Hz);
            agc.set_set_point_dbfs(-60);
        }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn device_params(&self) -> DevParams {
        DevParams::new(self.dev.clone(), self.version)
    }

    pub fn tuner_a(&self) -> TunerParams {
        TunerParams::new(
            self.rx_a
                .slice(v3_07::rx_channel::TUNER_OFFSET, v3_07::tuner::SIZE),
        )
    }

    pub fn control_a(&self) -> ControlParams {
        ControlParams::new(
            self.rx_a
                .slice(v3_07::rx_channel::CONTROL_OFFSET, v3_07::control::SIZE),
        )
    }

    pub fn tuner_b(&self) -> Option<TunerParams> {
        self.rx_b.as_ref().map(|rx| {
            TunerParams::new(rx.slice(v3_07::rx_channel::TUNER_OFFSET, v3_07::tuner::SIZE))
        })
    }

    pub fn control_b(&self) -> Option<ControlParams> {
        self.rx_b.as_ref().map(|rx| {
            ControlParams::new(rx.slice(v3_07::rx_channel::CONTROL_OFFSET, v3_07::control::SIZE))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuner_params_round_trip() {
        let params = CompositeParameters::new(ApiVersion::V3_07, 1);
        let tuner = params.tuner_a();

        tuner.set_bandwidth(Bandwidth::Bw1536);
        tuner.set_if_mode(IfMode::If450);
        tuner.set_lo_mode(LoMode::Lo120MHz);
        tuner.rf_freq().set_rf_hz(162_400_000.0);
        tuner.gain().set_gr_db(38);
        tuner.gain().set_lna_state(2);
        tuner.dc_offset().set_speed_up(true);

        assert_eq!(tuner.bandwidth(), Bandwidth::Bw1536);
        assert_eq!(tuner.if_mode(), IfMode::If450);
        assert_eq!(tuner.lo_mode(), LoMode::Lo120MHz);
        assert_eq!(tuner.rf_freq().rf_hz(), 162_400_000.0);
        assert_eq!(tuner.gain().gr_db(), 38);
        assert_eq!(tuner.gain().lna_state(), 2);
        assert!(tuner.dc_offset().speed_up());
    }

    #[test]
    fn test_gain_slice_aliases_composite_block() {
        let params = CompositeParameters::new(ApiVersion::V3_08, 1);
        let tuner = params.tuner_a();
        let gain = tuner.gain();

        gain.set_gr_db(42);

        // The slice addresses the same bytes as the composite view.
        assert_eq!(params.tuner_a().gain().gr_db(), 42);
        assert!(params
            .tuner_a()
            .segment()
            .shares_block(gain.segment()));
    }

    #[test]
    fn test_dual_tuner_blocks_are_independent() {
        let params = CompositeParameters::new(ApiVersion::V3_08, 2);

        params.tuner_a().rf_freq().set_rf_hz(100_000_000.0);
        let tuner_b = params.tuner_b().expect("dual tuner allocation");
        tuner_b.rf_freq().set_rf_hz(450_000_000.0);

        assert_eq!(params.tuner_a().rf_freq().rf_hz(), 100_000_000.0);
        assert_eq!(
            params.tuner_b().expect("dual tuner allocation").rf_freq().rf_hz(),
            450_000_000.0
        );
    }

    #[test]
    fn test_single_tuner_has_no_b_block() {
        let params = CompositeParameters::new(ApiVersion::V3_07, 1);
        assert!(params.tuner_b().is_none());
        assert!(params.control_b().is_none());
    }

    #[test]
    fn test_seeded_defaults() {
        let params = CompositeParameters::new(ApiVersion::V3_07, 1);

        assert_eq!(params.device_params().fs_hz(), 2_000_000.0);
        assert_eq!(params.device_params().samples_per_pkt(), 504);
        assert_eq!(params.tuner_a().bandwidth(), Bandwidth::Bw200);
        assert_eq!(params.tuner_a().gain().gr_db(), 50);
        assert_eq!(params.control_a().agc().mode(), AgcMode::Agc50Hz);
    }

    #[test]
    fn test_reset_slave_flags_on_v3_08() {
        let params = CompositeParameters::new(ApiVersion::V3_08, 2);
        // Mapped region in 3.08; simply must not fault.
        params
            .device_params()
            .set_rsp_duo_reset_slave_flags(true, false, true);
    }

    #[test]
    #[should_panic(expected = "not mapped in API 3.07")]
    fn test_reset_slave_flags_fault_on_v3_07() {
        let params = CompositeParameters::new(ApiVersion::V3_07, 2);
        params
            .device_params()
            .set_rsp_duo_reset_slave_flags(true, true, true);
    }
}
