//! Channel power monitoring surface
//!
//! Control-thread side of the event bus: tracks power and decaying peak,
//! mirrors the squelch threshold readout, and drives the spectral transform
//! lifecycle from the two flags it owns (chain attached, surface visible).
//! All mutable state here belongs to the control thread; the sampling thread
//! only ever hands events across via the notification channel.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::chain::ProcessingChain;
use crate::dsp::{SinkId, SpectrumSink};
use crate::event::{ListenerId, SourceEvent, SourceNotification};

/// Decaying-peak tracker over a power sample stream.
///
/// Values below the floor are treated as the floor; the returned peak is
/// monotone non-decreasing between resets.
#[derive(Debug, Clone)]
pub struct PeakMonitor {
    peak_db: f64,
    floor_db: f64,
}

impl PeakMonitor {
    pub fn new(floor_db: f64) -> Self {
        Self {
            peak_db: floor_db,
            floor_db,
        }
    }

    /// Folds one power sample into the peak and returns the updated peak.
    pub fn process(&mut self, power_db: f64) -> f64 {
        let clamped = power_db.max(self.floor_db);
        if clamped > self.peak_db {
            self.peak_db = clamped;
        }
        self.peak_db
    }

    pub fn peak(&self) -> f64 {
        self.peak_db
    }

    pub fn reset(&mut self) {
        self.peak_db = self.floor_db;
    }
}

/// Latest decibel-scaled spectrum frame for display.
///
/// Shared with the converter fan-out as a display sink; cleared when
/// spectral processing stops so no stale frame lingers.
#[derive(Debug, Default)]
pub struct SpectrumDisplay {
    magnitudes_db: Mutex<Vec<f32>>,
}

impl SpectrumDisplay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn latest(&self) -> Vec<f32> {
        self.magnitudes_db
            .lock()
            .expect("spectrum display lock poisoned")
            .clone()
    }

    pub fn is_cleared(&self) -> bool {
        self.magnitudes_db
            .lock()
            .expect("spectrum display lock poisoned")
            .is_empty()
    }

    pub fn clear(&self) {
        self.magnitudes_db
            .lock()
            .expect("spectrum display lock poisoned")
            .clear();
    }
}

impl SpectrumSink for Arc<SpectrumDisplay> {
    fn receive(&self, magnitudes_db: &[f32]) {
        let mut latest = self
            .magnitudes_db
            .lock()
            .expect("spectrum display lock poisoned");
        latest.clear();
        latest.extend_from_slice(magnitudes_db);
    }
}

/// Fire-and-forget persistence signal; the consumer batches and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRequest {
    ChannelConfiguration,
}

/// Snapshot of the monitoring surface for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub timestamp_ms: u64,
    pub channel: Option<String>,
    pub power_db: f64,
    pub peak_db: f64,
    pub squelch_db: Option<f64>,
    pub processing: bool,
    /// Strongest bin of the latest spectrum frame, if one is displayed.
    pub spectrum_peak_db: Option<f32>,
}

/// Display for channel power and squelch details.
pub struct ChannelPowerMonitor {
    chain: Option<Arc<ProcessingChain>>,
    listener_id: Option<ListenerId>,
    sink_id: Option<SinkId>,
    peak_monitor: PeakMonitor,
    spectrum: Arc<SpectrumDisplay>,
    power_db: f64,
    peak_db: f64,
    squelch_db: Option<f64>,
    visible: bool,
    processing: bool,
    event_tx: mpsc::Sender<SourceEvent>,
    save_tx: mpsc::Sender<SaveRequest>,
}

impl ChannelPowerMonitor {
    pub fn new(
        floor_db: f64,
        event_tx: mpsc::Sender<SourceEvent>,
        save_tx: mpsc::Sender<SaveRequest>,
    ) -> Self {
        Self {
            chain: None,
            listener_id: None,
            sink_id: None,
            peak_monitor: PeakMonitor::new(floor_db),
            spectrum: SpectrumDisplay::new(),
            power_db: floor_db,
            peak_db: floor_db,
            squelch_db: None,
            visible: false,
            processing: false,
            event_tx,
            save_tx,
        }
    }

    pub fn power_db(&self) -> f64 {
        self.power_db
    }

    pub fn peak_db(&self) -> f64 {
        self.peak_db
    }

    pub fn squelch_db(&self) -> Option<f64> {
        self.squelch_db
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn spectrum(&self) -> &Arc<SpectrumDisplay> {
        &self.spectrum
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            timestamp_ms: chrono::Utc::now().timestamp_millis() as u64,
            channel: self.chain.as_ref().map(|chain| chain.name().to_string()),
            power_db: self.power_db,
            peak_db: self.peak_db,
            squelch_db: self.squelch_db,
            processing: self.processing,
            spectrum_peak_db: self
                .spectrum
                .latest()
                .into_iter()
                .reduce(f32::max),
        }
    }

    /// Marks the surface visible or hidden and recomputes the processing
    /// state. Called only from the control thread.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.update_processing();
    }

    /// Attaches a new processing chain (or `None` to detach). The old
    /// chain's listener and sink registrations are removed before the new
    /// chain attaches; notifications broadcast during the gap are dropped.
    /// Attachment immediately re-requests the current squelch threshold to
    /// resynchronize the readout.
    pub fn attach_chain(&mut self, chain: Option<Arc<ProcessingChain>>) {
        // Stop while the old chain is still attached so teardown also
        // clears the displayed spectrum; a stale frame must not survive
        // into the new channel.
        self.stop_processing();
        if let Some(old) = self.chain.take() {
            if let Some(id) = self.listener_id.take() {
                old.remove_source_event_listener(id);
            }
            if let Some(id) = self.sink_id.take() {
                old.remove_spectrum_sink(id);
            }
        }

        self.reset();
        self.chain = chain;

        if let Some(chain) = &self.chain {
            let forward = self.event_tx.clone();
            self.listener_id = Some(chain.add_source_event_listener(move |event| {
                // Hand off to the control thread; a full queue drops the
                // notification rather than blocking the sampling thread.
                let _ = forward.try_send(*event);
            }));
            self.sink_id = Some(chain.add_spectrum_sink(Box::new(self.spectrum.clone())));
            debug!("monitor attached to chain {}", chain.name());
        }

        self.update_processing();

        if let Some(chain) = &self.chain {
            chain.broadcast(SourceEvent::request_current_squelch_threshold());
        }
    }

    /// Recomputes desired processing state: active iff a chain is attached
    /// and the surface is visible. Start and stop are idempotent; stopping
    /// clears the displayed spectrum.
    pub fn update_processing(&mut self) {
        if self.visible && self.chain.is_some() {
            self.start_processing();
        } else {
            self.stop_processing();
        }
    }

    fn start_processing(&mut self) {
        if self.processing {
            return;
        }
        if let Some(chain) = &self.chain {
            chain.start_spectral_processing();
            self.processing = true;
        }
    }

    fn stop_processing(&mut self) {
        if !self.processing {
            return;
        }
        if let Some(chain) = &self.chain {
            chain.stop_spectral_processing();
        }
        self.spectrum.clear();
        self.processing = false;
    }

    /// Consumes one event handed off from the sampling thread. Runs on the
    /// control thread after chain state has settled.
    pub fn receive(&mut self, event: &SourceEvent) {
        match event {
            SourceEvent::Notification {
                notification: SourceNotification::ChannelPower(power_db),
                ..
            } => {
                self.power_db = *power_db;
                self.peak_db = self.peak_monitor.process(*power_db);
            }
            SourceEvent::Notification {
                notification: SourceNotification::SquelchThreshold(threshold_db),
                ..
            } => {
                self.squelch_db = Some(*threshold_db);
                self.persist_squelch_threshold(*threshold_db as i32);
            }
            // Requests flow the other way; nothing for the surface to do.
            SourceEvent::Request { .. } => {}
        }
    }

    /// Adjusts the squelch threshold by `delta_db` relative to the current
    /// readout. No-op until the threshold readout has synchronized.
    pub fn nudge_squelch(&self, delta_db: f64) {
        if let (Some(chain), Some(threshold_db)) = (&self.chain, self.squelch_db) {
            chain.broadcast(SourceEvent::set_squelch_threshold(threshold_db + delta_db));
        }
    }

    /// Updates the channel's decode configuration with the new threshold
    /// and schedules a save. Configurations without squelch support are
    /// silently ignored.
    fn persist_squelch_threshold(&self, threshold_db: i32) {
        if let Some(chain) = &self.chain {
            let mut config = chain
                .decode_config()
                .lock()
                .expect("decode config lock poisoned");
            if let Some(squelch) = config.as_squelch_mut() {
                squelch.set_squelch_threshold(threshold_db);
                let _ = self.save_tx.try_send(SaveRequest::ChannelConfiguration);
            }
        }
    }

    /// Resets readouts when changing chains.
    fn reset(&mut self) {
        self.peak_monitor.reset();
        self.power_db = self.peak_monitor.peak();
        self.peak_db = self.peak_monitor.peak();
        self.squelch_db = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{DecodeConfig, NbfmConfig};
    use std::time::Duration;

    fn test_chain(name: &str, config: DecodeConfig) -> Arc<ProcessingChain> {
        ProcessingChain::new(name, 64, 20, config, -80.0, Duration::ZERO)
    }

    fn test_monitor() -> (
        ChannelPowerMonitor,
        mpsc::Receiver<SourceEvent>,
        mpsc::Receiver<SaveRequest>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (save_tx, save_rx) = mpsc::channel(16);
        (
            ChannelPowerMonitor::new(-80.0, event_tx, save_tx),
            event_rx,
            save_rx,
        )
    }

    fn drain(rx: &mut mpsc::Receiver<SourceEvent>) -> Vec<SourceEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_peak_monitor_tracks_running_peak() {
        let mut peak = PeakMonitor::new(-60.0);
        let samples = [-40.0, -55.0, -30.0, -60.0];
        let expected = [-40.0, -40.0, -30.0, -30.0];

        for (sample, want) in samples.iter().zip(expected.iter()) {
            assert_eq!(peak.process(*sample), *want);
        }

        peak.reset();
        assert_eq!(peak.peak(), -60.0);
    }

    #[test]
    fn test_peak_monitor_clamps_below_floor() {
        let mut peak = PeakMonitor::new(-60.0);
        assert_eq!(peak.process(-90.0), -60.0);
        assert_eq!(peak.process(-61.0), -60.0);
        assert_eq!(peak.process(-59.5), -59.5);
    }

    #[test]
    fn test_lifecycle_truth_table() {
        let (mut monitor, _event_rx, _save_rx) = test_monitor();
        let chain = test_chain("ch1", DecodeConfig::Passthrough);

        // attached=true, visible=false -> inactive
        monitor.attach_chain(Some(chain.clone()));
        assert!(!monitor.is_processing());
        assert!(!chain.is_spectral_processing());

        // visible -> true -> active
        monitor.set_visible(true);
        assert!(monitor.is_processing());
        assert!(chain.is_spectral_processing());

        // double update is a no-op
        monitor.update_processing();
        assert!(monitor.is_processing());

        // a displayed frame must not survive the detach
        monitor.spectrum().receive(&[-30.0, -40.0]);
        assert!(!monitor.spectrum().is_cleared());

        // attached -> false -> inactive and spectrum cleared
        monitor.attach_chain(None);
        assert!(!monitor.is_processing());
        assert!(!chain.is_spectral_processing());
        assert!(monitor.spectrum().is_cleared());
    }

    #[test]
    fn test_hiding_surface_clears_spectrum() {
        let (mut monitor, _event_rx, _save_rx) = test_monitor();
        let chain = test_chain("ch1", DecodeConfig::Passthrough);

        monitor.attach_chain(Some(chain));
        monitor.set_visible(true);
        monitor.spectrum().receive(&[-25.0, -50.0]);

        monitor.set_visible(false);
        assert!(!monitor.is_processing());
        assert!(monitor.spectrum().is_cleared());
    }

    #[test]
    fn test_status_reports_spectrum_peak() {
        let (mut monitor, _event_rx, _save_rx) = test_monitor();
        let chain = test_chain("ch1", DecodeConfig::Passthrough);
        monitor.attach_chain(Some(chain));
        monitor.set_visible(true);

        assert_eq!(monitor.status().spectrum_peak_db, None);

        monitor.spectrum().receive(&[-42.0, -30.5, -61.0]);
        assert_eq!(monitor.status().spectrum_peak_db, Some(-30.5));
    }

    #[test]
    fn test_attach_resynchronizes_squelch_threshold() {
        let (mut monitor, mut event_rx, _save_rx) = test_monitor();
        let chain = test_chain(
            "ch1",
            DecodeConfig::Nbfm(NbfmConfig {
                squelch_threshold_db: -72,
            }),
        );

        monitor.attach_chain(Some(chain));

        let events = drain(&mut event_rx);
        assert_eq!(events, vec![SourceEvent::squelch_threshold(-72.0)]);
    }

    #[test]
    fn test_chain_swap_silences_old_chain() {
        let (mut monitor, mut event_rx, _save_rx) = test_monitor();
        let first = test_chain(
            "ch1",
            DecodeConfig::Nbfm(NbfmConfig {
                squelch_threshold_db: -70,
            }),
        );
        let second = test_chain(
            "ch2",
            DecodeConfig::Nbfm(NbfmConfig {
                squelch_threshold_db: -75,
            }),
        );

        monitor.attach_chain(Some(first.clone()));
        drain(&mut event_rx);

        monitor.attach_chain(Some(second));
        assert_eq!(first.listener_count(), 0);

        // Old chain broadcasts reach nobody on the surface.
        first.broadcast(SourceEvent::channel_power(-10.0));

        // Only the new chain's resync notification arrives.
        let events = drain(&mut event_rx);
        assert_eq!(events, vec![SourceEvent::squelch_threshold(-75.0)]);
    }

    #[test]
    fn test_squelch_notification_persists_and_schedules_save() {
        let (mut monitor, _event_rx, mut save_rx) = test_monitor();
        let chain = test_chain(
            "ch1",
            DecodeConfig::Nbfm(NbfmConfig {
                squelch_threshold_db: -70,
            }),
        );
        monitor.attach_chain(Some(chain.clone()));

        monitor.receive(&SourceEvent::squelch_threshold(-66.0));

        assert_eq!(monitor.squelch_db(), Some(-66.0));
        assert_eq!(
            *chain.decode_config().lock().unwrap(),
            DecodeConfig::Nbfm(NbfmConfig {
                squelch_threshold_db: -66,
            })
        );
        assert_eq!(save_rx.try_recv(), Ok(SaveRequest::ChannelConfiguration));
    }

    #[test]
    fn test_squelch_ignored_without_capability() {
        let (mut monitor, _event_rx, mut save_rx) = test_monitor();
        let chain = test_chain("ch1", DecodeConfig::Passthrough);
        monitor.attach_chain(Some(chain));

        monitor.receive(&SourceEvent::squelch_threshold(-66.0));

        // Readout updates, but nothing is persisted or scheduled.
        assert_eq!(monitor.squelch_db(), Some(-66.0));
        assert!(save_rx.try_recv().is_err());
    }

    #[test]
    fn test_power_notifications_drive_peak() {
        let (mut monitor, _event_rx, _save_rx) = test_monitor();

        monitor.receive(&SourceEvent::channel_power(-40.0));
        monitor.receive(&SourceEvent::channel_power(-55.0));

        assert_eq!(monitor.power_db(), -55.0);
        assert_eq!(monitor.peak_db(), -40.0);
    }

    #[test]
    fn test_nudge_squelch_broadcasts_request() {
        let (mut monitor, mut event_rx, _save_rx) = test_monitor();
        let chain = test_chain(
            "ch1",
            DecodeConfig::Nbfm(NbfmConfig {
                squelch_threshold_db: -70,
            }),
        );
        monitor.attach_chain(Some(chain));
        for event in drain(&mut event_rx) {
            monitor.receive(&event);
        }

        monitor.nudge_squelch(1.0);

        let events = drain(&mut event_rx);
        assert_eq!(events, vec![SourceEvent::squelch_threshold(-69.0)]);
    }
}
