//! Processing chain - the live module pipeline for one decode channel
//!
//! A chain owns the sample pipeline (tap -> dft -> converter -> sinks), the
//! squelch control state for its channel and the outward notification
//! broadcast. Exactly one chain is attached to a monitoring surface at a
//! time; swapping channels tears the old chain's registrations down before
//! the new chain attaches.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dsp::{
    buffer_power_db, DecibelConverter, DftProcessor, SampleTap, SinkId, SpectrumSink,
};
use crate::event::{Broadcaster, ListenerId, SourceEvent, SourceRequest};

/// Capability of a decode configuration to persist a squelch threshold.
pub trait SquelchConfig {
    fn squelch_threshold(&self) -> i32;
    fn set_squelch_threshold(&mut self, threshold_db: i32);
}

/// Narrowband FM decode settings; squelch-capable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NbfmConfig {
    pub squelch_threshold_db: i32,
}

impl SquelchConfig for NbfmConfig {
    fn squelch_threshold(&self) -> i32 {
        self.squelch_threshold_db
    }

    fn set_squelch_threshold(&mut self, threshold_db: i32) {
        self.squelch_threshold_db = threshold_db;
    }
}

/// Decode configuration of the owning channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecodeConfig {
    Nbfm(NbfmConfig),
    /// Raw sample pass-through; no squelch capability.
    Passthrough,
}

impl DecodeConfig {
    pub fn as_squelch(&self) -> Option<&dyn SquelchConfig> {
        match self {
            Self::Nbfm(config) => Some(config),
            Self::Passthrough => None,
        }
    }

    pub fn as_squelch_mut(&mut self) -> Option<&mut dyn SquelchConfig> {
        match self {
            Self::Nbfm(config) => Some(config),
            Self::Passthrough => None,
        }
    }
}

struct SquelchState {
    threshold_db: f64,
    floor_db: f64,
}

struct PowerReport {
    last: Option<Instant>,
    interval: Duration,
}

/// The module pipeline and event routing for one active channel.
pub struct ProcessingChain {
    name: String,
    tap: SampleTap,
    dft: DftProcessor,
    event_broadcaster: Broadcaster<SourceEvent>,
    squelch: Mutex<SquelchState>,
    decode_config: Mutex<DecodeConfig>,
    power_report: Mutex<PowerReport>,
}

impl ProcessingChain {
    pub fn new(
        name: &str,
        fft_size: usize,
        frame_rate: u32,
        decode_config: DecodeConfig,
        squelch_floor_db: f64,
        power_report_interval: Duration,
    ) -> Arc<Self> {
        let converter = Arc::new(DecibelConverter::new());
        let threshold_db = decode_config
            .as_squelch()
            .map(|squelch| f64::from(squelch.squelch_threshold()))
            .unwrap_or(squelch_floor_db);

        Arc::new(Self {
            name: name.to_string(),
            tap: SampleTap::new(),
            dft: DftProcessor::new(fft_size, frame_rate, converter),
            event_broadcaster: Broadcaster::new(),
            squelch: Mutex::new(SquelchState {
                threshold_db,
                floor_db: squelch_floor_db,
            }),
            decode_config: Mutex::new(decode_config),
            power_report: Mutex::new(PowerReport {
                last: None,
                interval: power_report_interval,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decode_config(&self) -> &Mutex<DecodeConfig> {
        &self.decode_config
    }

    pub fn squelch_threshold(&self) -> f64 {
        self.squelch
            .lock()
            .expect("squelch state lock poisoned")
            .threshold_db
    }

    pub fn add_source_event_listener(
        &self,
        listener: impl Fn(&SourceEvent) + Send + 'static,
    ) -> ListenerId {
        self.event_broadcaster.add_listener(listener)
    }

    pub fn remove_source_event_listener(&self, id: ListenerId) {
        self.event_broadcaster.remove_listener(id);
    }

    pub fn listener_count(&self) -> usize {
        self.event_broadcaster.listener_count()
    }

    pub fn add_spectrum_sink(&self, sink: Box<dyn SpectrumSink>) -> SinkId {
        self.dft.converter().add_sink(sink)
    }

    pub fn remove_spectrum_sink(&self, id: SinkId) {
        self.dft.converter().remove_sink(id);
    }

    /// Wires tap -> dft and starts the transform. Idempotent.
    pub fn start_spectral_processing(&self) {
        if self.dft.is_running() {
            return;
        }
        let (tx, rx) = bounded(16);
        self.tap.set_listener(tx);
        self.dft.start(rx);
        debug!("chain {}: spectral processing started", self.name);
    }

    /// Detaches the tap listener and stops the transform. Idempotent.
    pub fn stop_spectral_processing(&self) {
        self.tap.remove_listener();
        self.dft.stop();
    }

    pub fn is_spectral_processing(&self) -> bool {
        self.dft.is_running()
    }

    /// Entry point for bus events. Requests are routed into the control
    /// path; notifications are broadcast outward to registered listeners.
    pub fn broadcast(&self, event: SourceEvent) {
        match event {
            SourceEvent::Request { request, .. } => self.process_request(request),
            SourceEvent::Notification { .. } => self.event_broadcaster.broadcast(&event),
        }
    }

    fn process_request(&self, request: SourceRequest) {
        match request {
            SourceRequest::SetSquelchThreshold(threshold_db) => {
                let clamped = {
                    let mut squelch = self.squelch.lock().expect("squelch state lock poisoned");
                    squelch.threshold_db = threshold_db.max(squelch.floor_db);
                    squelch.threshold_db
                };
                debug!("chain {}: squelch threshold set to {:.1} dB", self.name, clamped);
                self.broadcast(SourceEvent::squelch_threshold(clamped));
            }
            SourceRequest::CurrentSquelchThreshold => {
                let threshold_db = self.squelch_threshold();
                self.broadcast(SourceEvent::squelch_threshold(threshold_db));
            }
        }
    }

    /// Called on the sampling thread for every produced buffer: feeds the
    /// tap and publishes a throttled channel power notification.
    pub fn receive_samples(&self, samples: &[Complex<f32>]) {
        self.tap.receive(samples.to_vec());

        let due = {
            let mut report = self.power_report.lock().expect("power report lock poisoned");
            let due = report
                .last
                .map_or(true, |last| last.elapsed() >= report.interval);
            if due {
                report.last = Some(Instant::now());
            }
            due
        };

        if due {
            self.broadcast(SourceEvent::channel_power(buffer_power_db(samples)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SourceNotification;

    fn chain(floor_db: f64, config: DecodeConfig) -> Arc<ProcessingChain> {
        ProcessingChain::new("test channel", 64, 20, config, floor_db, Duration::ZERO)
    }

    fn notifications(chain: &ProcessingChain) -> Arc<Mutex<Vec<SourceEvent>>> {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();
        chain.add_source_event_listener(move |event| {
            sink.lock().unwrap().push(*event);
        });
        captured
    }

    #[test]
    fn test_squelch_request_produces_notification() {
        let chain = chain(-80.0, DecodeConfig::Nbfm(NbfmConfig { squelch_threshold_db: -70 }));
        let captured = notifications(&chain);

        chain.broadcast(SourceEvent::set_squelch_threshold(-65.0));

        let events = captured.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            &[SourceEvent::squelch_threshold(-65.0)]
        );
        assert_eq!(chain.squelch_threshold(), -65.0);
    }

    #[test]
    fn test_squelch_threshold_clamps_to_floor() {
        let chain = chain(-80.0, DecodeConfig::Nbfm(NbfmConfig { squelch_threshold_db: -70 }));
        chain.broadcast(SourceEvent::set_squelch_threshold(-120.0));
        assert_eq!(chain.squelch_threshold(), -80.0);
    }

    #[test]
    fn test_current_threshold_request_reports_state() {
        let chain = chain(-80.0, DecodeConfig::Nbfm(NbfmConfig { squelch_threshold_db: -72 }));
        let captured = notifications(&chain);

        chain.broadcast(SourceEvent::request_current_squelch_threshold());

        let events = captured.lock().unwrap();
        assert_eq!(events.as_slice(), &[SourceEvent::squelch_threshold(-72.0)]);
    }

    #[test]
    fn test_passthrough_config_defaults_threshold_to_floor() {
        let chain = chain(-80.0, DecodeConfig::Passthrough);
        assert_eq!(chain.squelch_threshold(), -80.0);
        assert!(chain.decode_config().lock().unwrap().as_squelch().is_none());
    }

    #[test]
    fn test_samples_publish_channel_power() {
        let chain = chain(-80.0, DecodeConfig::Passthrough);
        let captured = notifications(&chain);

        let samples = vec![Complex::new(0.5f32, 0.0); 256];
        chain.receive_samples(&samples);

        let events = captured.lock().unwrap();
        assert_eq!(events.len(), 1);
        match events[0] {
            SourceEvent::Notification {
                notification: SourceNotification::ChannelPower(power),
                ..
            } => assert!((power + 6.02).abs() < 0.1, "expected about -6 dB, got {power}"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_spectral_processing_start_stop_idempotent() {
        let chain = chain(-80.0, DecodeConfig::Passthrough);

        chain.start_spectral_processing();
        chain.start_spectral_processing();
        assert!(chain.is_spectral_processing());

        chain.stop_spectral_processing();
        chain.stop_spectral_processing();
        assert!(!chain.is_spectral_processing());
    }
}
