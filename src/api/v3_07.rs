//! Field layout for vendor API revision 3.07
//!
//! Offsets and sizes mirror the sdrplay_api 3.07 structures byte for byte.
//! Reordering a field or inserting padding here corrupts every value the
//! driver reads out of the block, so the totals are pinned with const
//! assertions.

/// sdrplay_api_TunerParamsT
pub mod tuner {
    pub const SIZE: usize = 72;

    pub const BW_TYPE: usize = 0; // u32
    pub const IF_TYPE: usize = 4; // i32
    pub const LO_MODE: usize = 8; // u32

    /// sdrplay_api_GainT
    pub mod gain {
        pub const OFFSET: usize = 12;
        pub const SIZE: usize = 24;

        pub const GR_DB: usize = 0; // u32
        pub const LNA_STATE: usize = 4; // u8
        pub const SYNC_UPDATE: usize = 5; // u8 flag
        pub const MIN_GR: usize = 8; // u32
        pub const GAIN_VALS_CURR: usize = 12; // f32
        pub const GAIN_VALS_MAX: usize = 16; // f32
        pub const GAIN_VALS_MIN: usize = 20; // f32
    }

    /// sdrplay_api_RfFreqT
    pub mod rf_freq {
        pub const OFFSET: usize = 40;
        pub const SIZE: usize = 16;

        pub const RF_HZ: usize = 0; // f64
        pub const SYNC_UPDATE: usize = 8; // u8 flag
    }

    /// sdrplay_api_DcOffsetTunerT
    pub mod dc_offset {
        pub const OFFSET: usize = 56;
        pub const SIZE: usize = 12;

        pub const DC_CAL: usize = 0; // u8
        pub const SPEED_UP: usize = 1; // u8 flag
        pub const TRACK_TIME: usize = 4; // u32
        pub const REFRESH_RATE_TIME: usize = 8; // u32
    }
}

// Sub-structure placement within TunerParamsT, with 4 bytes of trailing
// padding after the gain block and again at the end of the struct.
const _: () = assert!(tuner::gain::OFFSET + tuner::gain::SIZE + 4 == tuner::rf_freq::OFFSET);
const _: () = assert!(tuner::rf_freq::OFFSET + tuner::rf_freq::SIZE == tuner::dc_offset::OFFSET);
const _: () = assert!(tuner::dc_offset::OFFSET + tuner::dc_offset::SIZE + 4 == tuner::SIZE);

/// sdrplay_api_ControlParamsT
pub mod control {
    pub const SIZE: usize = 32;

    pub const DC_ENABLE: usize = 0; // u8 flag
    pub const IQ_ENABLE: usize = 1; // u8 flag
    pub const DECIMATION_ENABLE: usize = 2; // u8 flag
    pub const DECIMATION_FACTOR: usize = 3; // u8
    pub const DECIMATION_WIDE_BAND: usize = 4; // u8 flag

    /// sdrplay_api_AgcT
    pub mod agc {
        pub const OFFSET: usize = 8;
        pub const SIZE: usize = 20;

        pub const ENABLE: usize = 0; // u32
        pub const SET_POINT_DBFS: usize = 4; // i32
        pub const ATTACK_MS: usize = 8; // u16
        pub const DECAY_MS: usize = 10; // u16
        pub const DECAY_DELAY_MS: usize = 12; // u16
        pub const DECAY_THRESHOLD_DB: usize = 14; // u16
        pub const SYNC_UPDATE: usize = 16; // i32
    }

    pub const ADSB_MODE: usize = 28; // u32
}

const _: () = assert!(control::agc::OFFSET + control::agc::SIZE == control::ADSB_MODE);
const _: () = assert!(control::ADSB_MODE + 4 == control::SIZE);

/// sdrplay_api_DevParamsT
pub mod dev {
    pub const SIZE: usize = 64;

    pub const PPM: usize = 0; // f64

    /// sdrplay_api_FsFreqT
    pub mod fs_freq {
        pub const OFFSET: usize = 8;
        pub const SIZE: usize = 16;

        pub const FS_HZ: usize = 0; // f64
        pub const SYNC_UPDATE: usize = 8; // u8 flag
        pub const RE_CAL: usize = 9; // u8 flag
    }

    /// sdrplay_api_SyncUpdateT
    pub mod sync_update {
        pub const OFFSET: usize = 24;
        pub const SIZE: usize = 8;

        pub const SAMPLE_NUM: usize = 0; // u32
        pub const PERIOD: usize = 4; // u32
    }

    /// sdrplay_api_ResetFlagsT
    pub mod reset_flags {
        pub const OFFSET: usize = 32;
        pub const SIZE: usize = 4;

        pub const RESET_GAIN_UPDATE: usize = 0; // u8 flag
        pub const RESET_RF_UPDATE: usize = 1; // u8 flag
        pub const RESET_FS_UPDATE: usize = 2; // u8 flag
    }

    pub const MODE: usize = 36; // u32, USB transfer mode
    pub const SAMPLES_PER_PKT: usize = 40; // u32

    /// sdrplay_api_Rsp2ParamsT (trimmed to the fields this core drives)
    pub mod rsp2 {
        pub const OFFSET: usize = 44;
        pub const SIZE: usize = 12;

        pub const ANTENNA_SEL: usize = 0; // u32
        pub const AM_PORT_SEL: usize = 4; // u32
        pub const RF_NOTCH_ENABLE: usize = 8; // u8 flag
        pub const BIAS_T_ENABLE: usize = 9; // u8 flag
    }

    /// sdrplay_api_RspDuoParamsT - in 3.07 only the external reference
    /// output word is mapped; the remaining 4 bytes are tail padding.
    pub mod rsp_duo {
        pub const OFFSET: usize = 56;
        pub const SIZE: usize = 4;

        pub const EXT_REF_OUTPUT_EN: usize = 0; // u32
    }
}

const _: () = assert!(dev::rsp2::OFFSET + dev::rsp2::SIZE == dev::rsp_duo::OFFSET);
const _: () = assert!(dev::rsp_duo::OFFSET + dev::rsp_duo::SIZE + 4 == dev::SIZE);

/// sdrplay_api_RxChannelParamsT: tuner parameters followed by control
/// parameters, one block per tuner.
pub mod rx_channel {
    pub const TUNER_OFFSET: usize = 0;
    pub const CONTROL_OFFSET: usize = super::tuner::SIZE;
    pub const SIZE: usize = super::tuner::SIZE + super::control::SIZE;
}
