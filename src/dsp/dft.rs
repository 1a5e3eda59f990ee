//! Complex DFT processor
//!
//! Second pipeline stage: consumes tapped sample buffers on a dedicated
//! thread, keeps a sliding window of the most recent samples and computes a
//! windowed forward FFT at a fixed frame cadence. Start and stop are
//! idempotent; frames are only computed while a downstream consumer is
//! attached.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use tracing::{debug, error};

use super::{ComplexBuffer, DecibelConverter};

/// Sliding-window spectral transform over the tapped sample stream.
pub struct DftProcessor {
    fft_size: usize,
    cadence: Duration,
    running: Arc<AtomicBool>,
    converter: Arc<DecibelConverter>,
}

impl DftProcessor {
    /// `frame_rate` is frames per second; `fft_size` must be a power of two
    /// for the planner to pick the fast path, but any size works.
    pub fn new(fft_size: usize, frame_rate: u32, converter: Arc<DecibelConverter>) -> Self {
        Self {
            fft_size,
            cadence: Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64),
            running: Arc::new(AtomicBool::new(false)),
            converter,
        }
    }

    pub fn converter(&self) -> &Arc<DecibelConverter> {
        &self.converter
    }

    /// Starts the transform thread. Re-starting a running processor is a
    /// no-op.
    pub fn start(&self, samples: Receiver<ComplexBuffer>) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("dft processor already running");
            return;
        }

        let fft_size = self.fft_size;
        let cadence = self.cadence;
        let running = self.running.clone();
        let converter = self.converter.clone();

        let spawned = thread::Builder::new()
            .name("dft-processor".to_string())
            .spawn(move || {
                run_transform(fft_size, cadence, &running, samples, &converter);
            });

        if let Err(e) = spawned {
            error!("failed to spawn dft processor thread: {}", e);
            self.running.store(false, Ordering::SeqCst);
        }
    }

    /// Signals the transform thread to stop. Re-stopping a stopped
    /// processor is a no-op; no completion acknowledgment is awaited.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        debug!("dft processor stop requested");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Transform loop (runs on the dft-processor thread).
fn run_transform(
    fft_size: usize,
    cadence: Duration,
    running: &AtomicBool,
    samples: Receiver<ComplexBuffer>,
    converter: &DecibelConverter,
) {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);

    // Hann window to limit spectral leakage across frames.
    let window: Vec<f32> = (0..fft_size)
        .map(|n| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * n as f32 / (fft_size - 1) as f32).cos())
        })
        .collect();

    let mut history: VecDeque<Complex<f32>> = VecDeque::with_capacity(fft_size * 2);
    let mut next_frame = Instant::now() + cadence;

    debug!("dft processor started, fft size {}", fft_size);

    while running.load(Ordering::SeqCst) {
        match samples.recv_deadline(next_frame) {
            Ok(buffer) => {
                history.extend(buffer);
                let excess = history.len().saturating_sub(fft_size);
                if excess > 0 {
                    history.drain(..excess);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                next_frame += cadence;
                if history.len() == fft_size && converter.has_sinks() {
                    let mut bins: Vec<Complex<f32>> = history
                        .iter()
                        .zip(window.iter())
                        .map(|(s, w)| *s * *w)
                        .collect();
                    fft.process(&mut bins);
                    converter.receive(&bins);
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!("dft processor stopped");
}
