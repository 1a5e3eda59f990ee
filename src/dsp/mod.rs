//! Sample stream pipeline
//!
//! Fixed three-stage chain, assembled on chain attach and torn down on
//! detach:
//! 1. Tap the complex sample stream (replaceable listener)
//! 2. Sliding-window forward DFT at a fixed frame cadence
//! 3. Convert bins to decibel magnitudes and fan out to display sinks

pub mod convert;
pub mod dft;
pub mod source;
pub mod tap;

pub use convert::{DecibelConverter, SinkId, SpectrumSink};
pub use dft::DftProcessor;
pub use source::{SampleSource, SourceConfig};
pub use tap::SampleTap;

use rustfft::num_complex::Complex;

/// One buffer of complex baseband samples.
pub type ComplexBuffer = Vec<Complex<f32>>;

/// Mean power of a sample buffer in dB relative to full scale.
pub fn buffer_power_db(samples: &[Complex<f32>]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }

    let sum: f64 = samples.iter().map(|s| s.norm_sqr() as f64).sum();
    let mean = sum / samples.len() as f64;
    10.0 * (mean + f64::MIN_POSITIVE).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_power_db_full_scale() {
        let samples = vec![Complex::new(1.0f32, 0.0); 64];
        let power = buffer_power_db(&samples);
        assert!(power.abs() < 1e-6, "full scale tone should be 0 dB, got {power}");
    }

    #[test]
    fn test_buffer_power_db_half_amplitude() {
        let samples = vec![Complex::new(0.5f32, 0.0); 64];
        let power = buffer_power_db(&samples);
        assert!((power + 6.02).abs() < 0.1, "expected about -6 dB, got {power}");
    }
}
