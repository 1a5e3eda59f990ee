//! DFT result conversion
//!
//! Maps raw complex bins to decibel-scaled display magnitudes and fans the
//! result out to registered sinks. A sink is anything with a single-value
//! receive callback - a spectrum display, a recorder, a test probe.

use std::sync::Mutex;

use rustfft::num_complex::Complex;

/// Magnitudes below this are reported as the floor.
const DB_FLOOR: f32 = -120.0;

/// Consumer of decibel-scaled magnitude arrays.
pub trait SpectrumSink: Send {
    fn receive(&self, magnitudes_db: &[f32]);
}

/// Handle for detaching a registered sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkId(usize);

/// Converts complex DFT bins to dB magnitudes and broadcasts to sinks.
pub struct DecibelConverter {
    sinks: Mutex<Vec<(SinkId, Box<dyn SpectrumSink>)>>,
    next_id: Mutex<usize>,
}

impl DecibelConverter {
    pub fn new() -> Self {
        Self {
            sinks: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        }
    }

    pub fn add_sink(&self, sink: Box<dyn SpectrumSink>) -> SinkId {
        let mut next_id = self.next_id.lock().expect("sink id lock poisoned");
        let id = SinkId(*next_id);
        *next_id += 1;

        self.sinks
            .lock()
            .expect("sink table lock poisoned")
            .push((id, sink));
        id
    }

    pub fn remove_sink(&self, id: SinkId) {
        self.sinks
            .lock()
            .expect("sink table lock poisoned")
            .retain(|(sink_id, _)| *sink_id != id);
    }

    /// True when at least one sink is attached; the transform stage polls
    /// this to avoid computing frames nobody consumes.
    pub fn has_sinks(&self) -> bool {
        !self.sinks.lock().expect("sink table lock poisoned").is_empty()
    }

    /// Converts one frame of bins and delivers it to every sink.
    pub fn receive(&self, bins: &[Complex<f32>]) {
        let scale = 1.0 / bins.len().max(1) as f32;
        let magnitudes: Vec<f32> = bins
            .iter()
            .map(|bin| {
                let magnitude = bin.norm() * scale;
                if magnitude > 0.0 {
                    (20.0 * magnitude.log10()).max(DB_FLOOR)
                } else {
                    DB_FLOOR
                }
            })
            .collect();

        let sinks = self.sinks.lock().expect("sink table lock poisoned");
        for (_, sink) in sinks.iter() {
            sink.receive(&magnitudes);
        }
    }
}

impl Default for DecibelConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct CaptureSink {
        frames: Arc<Mutex<Vec<Vec<f32>>>>,
    }

    impl SpectrumSink for CaptureSink {
        fn receive(&self, magnitudes_db: &[f32]) {
            self.frames.lock().unwrap().push(magnitudes_db.to_vec());
        }
    }

    #[test]
    fn test_full_scale_bin_converts_to_zero_db() {
        let converter = DecibelConverter::new();
        let frames = Arc::new(Mutex::new(Vec::new()));
        converter.add_sink(Box::new(CaptureSink {
            frames: frames.clone(),
        }));

        // A DFT of a full-scale tone puts N into one bin.
        let n = 8;
        let mut bins = vec![Complex::new(0.0f32, 0.0); n];
        bins[2] = Complex::new(n as f32, 0.0);
        converter.receive(&bins);

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0][2].abs() < 1e-4);
        assert_eq!(frames[0][0], DB_FLOOR);
    }

    #[test]
    fn test_removed_sink_receives_nothing() {
        let converter = DecibelConverter::new();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let id = converter.add_sink(Box::new(CaptureSink {
            frames: frames.clone(),
        }));

        converter.remove_sink(id);
        assert!(!converter.has_sinks());

        converter.receive(&[Complex::new(1.0, 0.0)]);
        assert!(frames.lock().unwrap().is_empty());
    }
}
