//! Configuration loaded from environment variables

use crate::api::{ApiVersion, Bandwidth};
use crate::device::DeviceFamily;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Device family to register (rsp1, rsp1a, rsp2, rspduo, rspdx)
    pub device_family: DeviceFamily,

    /// Device serial; generated from the family when unset
    pub device_serial: Option<String>,

    /// API version the parameter layout follows
    pub api_version: ApiVersion,

    /// Tuner center frequency in Hz
    pub center_frequency_hz: f64,

    /// Device sample rate in Hz
    pub sample_rate_hz: f64,

    /// Tuner gain reduction in dB
    pub gain_reduction_db: i32,

    /// LNA state index
    pub lna_state: u8,

    /// IF bandwidth
    pub bandwidth: Bandwidth,

    /// Transform size for spectral processing (power of two)
    pub fft_size: usize,

    /// Spectral frames per second
    pub frame_rate: u32,

    /// Initial squelch threshold in dB for the monitored channel
    pub squelch_threshold_db: i32,

    /// Power floor in dB for the peak monitor and squelch clamp
    pub power_floor_db: f64,

    /// Minimum interval between channel power notifications, in milliseconds
    pub power_report_interval_ms: u64,

    /// Display name of the monitored channel
    pub channel_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            device_family: std::env::var("DEVICE_FAMILY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DeviceFamily::Rsp2),

            device_serial: std::env::var("DEVICE_SERIAL").ok(),

            api_version: std::env::var("API_VERSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(ApiVersion::V3_08),

            center_frequency_hz: std::env::var("CENTER_FREQUENCY_HZ")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(154_250_000.0),

            sample_rate_hz: std::env::var("SAMPLE_RATE_HZ")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2_000_000.0),

            gain_reduction_db: std::env::var("GAIN_REDUCTION_DB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50),

            lna_state: std::env::var("LNA_STATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),

            bandwidth: std::env::var("BANDWIDTH_KHZ")
                .ok()
                .and_then(|s| s.parse().ok())
                .and_then(Bandwidth::from_khz)
                .unwrap_or(Bandwidth::Bw1536),

            fft_size: std::env::var("FFT_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2048),

            frame_rate: std::env::var("FRAME_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),

            squelch_threshold_db: std::env::var("SQUELCH_THRESHOLD_DB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(-70),

            power_floor_db: std::env::var("POWER_FLOOR_DB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(-80.0),

            power_report_interval_ms: std::env::var("POWER_REPORT_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),

            channel_name: std::env::var("CHANNEL_NAME")
                .unwrap_or_else(|_| "VHF Monitor".to_string()),
        }
    }
}
