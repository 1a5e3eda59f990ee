//! Baseband sample source
//!
//! Stand-in for the vendor driver's streaming callback: a dedicated thread
//! that produces complex baseband buffers at the configured sample rate and
//! hands them to the active processing chain. The generated signal is a
//! slowly amplitude-modulated tone over a noise floor, which exercises the
//! power, peak and squelch paths with realistic level movement.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rustfft::num_complex::Complex;
use tracing::{debug, info};

use super::ComplexBuffer;

/// Sample source configuration
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub sample_rate_hz: f64,
    pub buffer_len: usize,
    /// Baseband offset of the generated tone from center, in Hz.
    pub tone_offset_hz: f64,
    /// Peak tone amplitude relative to full scale.
    pub tone_amplitude: f32,
    /// Period of the amplitude modulation cycle.
    pub fade_period: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 2_000_000.0,
            buffer_len: 8192,
            tone_offset_hz: 250_000.0,
            tone_amplitude: 0.5,
            fade_period: Duration::from_secs(8),
        }
    }
}

/// Statistics for the sampling thread (atomic for cross-thread reads)
#[derive(Debug, Default)]
pub struct SourceStats {
    pub buffers_produced: AtomicU64,
    pub samples_produced: AtomicU64,
}

/// Sample stream controller.
pub struct SampleSource {
    config: SourceConfig,
    running: Arc<AtomicBool>,
    stats: Arc<SourceStats>,
}

impl SampleSource {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(SourceStats::default()),
        }
    }

    /// Starts the sampling thread; every produced buffer is handed to
    /// `consumer` in stream order.
    pub fn start(&self, consumer: impl Fn(ComplexBuffer) + Send + 'static) -> Result<()> {
        info!(
            "starting sample source: {:.1} MSPS, {} samples/buffer",
            self.config.sample_rate_hz / 1_000_000.0,
            self.config.buffer_len
        );

        let config = self.config.clone();
        let running = self.running.clone();
        let stats = self.stats.clone();

        running.store(true, Ordering::SeqCst);

        thread::Builder::new()
            .name("sample-source".to_string())
            .spawn(move || {
                run_source(config, &running, &stats, consumer);
            })
            .context("failed to spawn sample source thread")?;

        Ok(())
    }

    pub fn stop(&self) {
        info!("stopping sample source");
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> &Arc<SourceStats> {
        &self.stats
    }
}

impl Drop for SampleSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Main production loop (runs on the sample-source thread).
fn run_source(
    config: SourceConfig,
    running: &AtomicBool,
    stats: &SourceStats,
    consumer: impl Fn(ComplexBuffer),
) {
    let buffer_period = Duration::from_secs_f64(config.buffer_len as f64 / config.sample_rate_hz);
    let phase_step = 2.0 * std::f64::consts::PI * config.tone_offset_hz / config.sample_rate_hz;
    let started = Instant::now();

    let mut phase: f64 = 0.0;
    let mut noise_state: u32 = 0x2545_F491;
    let mut last_stats = Instant::now();
    let mut next_buffer = Instant::now();

    while running.load(Ordering::SeqCst) {
        // Amplitude fade makes the measured channel power sweep through the
        // squelch threshold over each fade period.
        let fade_phase =
            started.elapsed().as_secs_f64() / config.fade_period.as_secs_f64() * 2.0 * std::f64::consts::PI;
        let envelope = config.tone_amplitude * (0.55 + 0.45 * fade_phase.sin() as f32).max(0.0);

        let mut buffer = ComplexBuffer::with_capacity(config.buffer_len);
        for _ in 0..config.buffer_len {
            phase += phase_step;
            if phase > 2.0 * std::f64::consts::PI {
                phase -= 2.0 * std::f64::consts::PI;
            }

            // xorshift noise, scaled to a low floor
            noise_state ^= noise_state << 13;
            noise_state ^= noise_state >> 17;
            noise_state ^= noise_state << 5;
            let noise_i = (noise_state as i32 as f32 / i32::MAX as f32) * 0.01;
            noise_state ^= noise_state << 13;
            noise_state ^= noise_state >> 17;
            noise_state ^= noise_state << 5;
            let noise_q = (noise_state as i32 as f32 / i32::MAX as f32) * 0.01;

            buffer.push(Complex::new(
                envelope * phase.cos() as f32 + noise_i,
                envelope * phase.sin() as f32 + noise_q,
            ));
        }

        stats.buffers_produced.fetch_add(1, Ordering::Relaxed);
        stats
            .samples_produced
            .fetch_add(config.buffer_len as u64, Ordering::Relaxed);

        consumer(buffer);

        if last_stats.elapsed() >= Duration::from_secs(5) {
            let samples = stats.samples_produced.load(Ordering::Relaxed);
            debug!(
                "[Source Stats] buffers: {} | samples: {} | rate: {:.2} MSPS",
                stats.buffers_produced.load(Ordering::Relaxed),
                samples,
                samples as f64 / started.elapsed().as_secs_f64() / 1_000_000.0
            );
            last_stats = Instant::now();
        }

        next_buffer += buffer_period;
        if let Some(wait) = next_buffer.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
    }

    debug!(
        "sample source stopped after {} buffers",
        stats.buffers_produced.load(Ordering::Relaxed)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_source_produces_buffers_until_stopped() {
        let config = SourceConfig {
            sample_rate_hz: 1_000_000.0,
            buffer_len: 1024,
            ..SourceConfig::default()
        };
        let source = SampleSource::new(config);
        let received = Arc::new(Mutex::new(0usize));

        let counter = received.clone();
        source
            .start(move |buffer| {
                assert_eq!(buffer.len(), 1024);
                *counter.lock().unwrap() += 1;
            })
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while *received.lock().unwrap() < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        source.stop();

        assert!(*received.lock().unwrap() >= 3, "source produced too few buffers");
        assert!(source.stats().buffers_produced.load(Ordering::Relaxed) >= 3);
    }
}
