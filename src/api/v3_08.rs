//! Field layout for vendor API revision 3.08
//!
//! The tuner, control and rx-channel structures are byte-identical to 3.07
//! and are re-exported from that mirror. Revision 3.08 extends
//! sdrplay_api_RspDuoParamsT with the slave-tuner reset flags, mapping what
//! was tail padding in 3.07.

pub use super::v3_07::{control, rx_channel, tuner};

/// sdrplay_api_DevParamsT
pub mod dev {
    pub use crate::api::v3_07::dev::{
        fs_freq, reset_flags, rsp2, sync_update, MODE, PPM, SAMPLES_PER_PKT, SIZE,
    };

    /// sdrplay_api_RspDuoParamsT with the 3.08 slave reset flags.
    pub mod rsp_duo {
        pub const OFFSET: usize = 56;
        pub const SIZE: usize = 8;

        pub const EXT_REF_OUTPUT_EN: usize = 0; // u32
        pub const RESET_SLAVE_GAIN: usize = 4; // u8 flag
        pub const RESET_SLAVE_RF: usize = 5; // u8 flag
        pub const RESET_SLAVE_FS: usize = 6; // u8 flag
    }
}

const _: () = assert!(dev::rsp_duo::OFFSET == super::v3_07::dev::rsp_duo::OFFSET);
const _: () = assert!(dev::rsp_duo::OFFSET + dev::rsp_duo::SIZE == dev::SIZE);
