//! SDRplay Capture - RSP device control with channel power monitoring
//!
//! Registers an RSP device, mirrors its API parameter block, runs a sample
//! source through a processing chain, and monitors channel power and squelch
//! on a control loop.

mod api;
mod chain;
mod config;
mod device;
mod dsp;
mod error;
mod event;
mod monitor;

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::{AgcMode, IfMode, LoMode, TunerSelect, UpdateReason};
use chain::{DecodeConfig, NbfmConfig, ProcessingChain};
use config::Config;
use device::DeviceRegistry;
use dsp::{SampleSource, SourceConfig};
use event::SourceEvent;
use monitor::{ChannelPowerMonitor, SaveRequest};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("===========================================");
    info!("   SDRplay Capture - RSP channel monitor");
    info!("===========================================");

    // Load configuration
    let config = Config::from_env();

    info!("Configuration:");
    info!("  Device family: {}", config.device_family.label());
    info!("  API version: {}", config.api_version.label());
    info!("  Center frequency: {} Hz", config.center_frequency_hz);
    info!("  Sample rate: {} Hz", config.sample_rate_hz);
    info!("  Gain reduction: {} dB", config.gain_reduction_db);
    info!("  LNA state: {}", config.lna_state);
    info!("  Channel: {}", config.channel_name);

    // Register and select the device
    let mut registry = DeviceRegistry::new();
    info!("Discovered devices:");
    let index = registry.register(
        config.device_family,
        config.device_serial.clone(),
        config.api_version,
    );
    let device = registry
        .device(index)
        .context("registered device missing from registry")?;
    device.select().context("device selection failed")?;
    info!(
        "Selected {} SN: {}",
        device.family().label(),
        device.serial()
    );

    // Configure tuner A and push the updates to hardware
    let tuner = device.tuner_a().context("tuner A unavailable")?;
    tuner.set_sample_rate(config.sample_rate_hz);
    device.update(TunerSelect::A, UpdateReason::DevFs)?;
    tuner.set_frequency(config.center_frequency_hz);
    device.update(TunerSelect::A, UpdateReason::TunerFrf)?;
    tuner.set_gain_reduction(config.gain_reduction_db as u32);
    tuner.set_lna_state(config.lna_state);
    device.update(TunerSelect::A, UpdateReason::TunerGr)?;
    tuner.set_bandwidth(config.bandwidth);
    device.update(TunerSelect::A, UpdateReason::TunerBwType)?;
    tuner.set_if_mode(IfMode::Zero);
    device.update(TunerSelect::A, UpdateReason::TunerIfType)?;
    tuner.set_lo_mode(LoMode::Auto);
    device.update(TunerSelect::A, UpdateReason::TunerLoMode)?;
    tuner.set_dc_tracking(true, true);
    device.update(TunerSelect::A, UpdateReason::TunerDcOffset)?;
    tuner.set_agc_mode(AgcMode::Agc50Hz);
    device.update(TunerSelect::A, UpdateReason::CtrlAgc)?;

    // Build the processing chain for the monitored channel
    let chain = ProcessingChain::new(
        &config.channel_name,
        config.fft_size,
        config.frame_rate,
        DecodeConfig::Nbfm(NbfmConfig {
            squelch_threshold_db: config.squelch_threshold_db,
        }),
        config.power_floor_db,
        Duration::from_millis(config.power_report_interval_ms),
    );

    // Channels for handing events off the sampling thread to this loop
    let (event_tx, mut event_rx) = mpsc::channel::<SourceEvent>(256);
    let (save_tx, mut save_rx) = mpsc::channel::<SaveRequest>(16);

    // Attach the monitoring surface; visible from the start so spectral
    // processing runs while the process is up.
    let mut power_monitor = ChannelPowerMonitor::new(config.power_floor_db, event_tx, save_tx);
    power_monitor.attach_chain(Some(chain.clone()));
    power_monitor.set_visible(true);

    // Start sample production feeding the chain
    let source = SampleSource::new(SourceConfig {
        sample_rate_hz: config.sample_rate_hz,
        ..SourceConfig::default()
    });
    let feed = chain.clone();
    source
        .start(move |buffer| feed.receive_samples(&buffer))
        .context("failed to start sample source")?;

    info!("===========================================");
    info!("  Monitoring channel power...");
    info!("  Press Ctrl+C to stop.");
    info!("===========================================");

    let mut heartbeat = tokio::time::interval(Duration::from_secs(5));
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    // Control loop - drain events from the sampling thread, surface status
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                match event {
                    Some(event) => power_monitor.receive(&event),
                    None => {
                        warn!("event channel closed");
                        break;
                    }
                }
            }
            request = save_rx.recv() => {
                if let Some(SaveRequest::ChannelConfiguration) = request {
                    let threshold = chain.squelch_threshold();
                    debug!("scheduling channel configuration save (squelch {:.1} dB)", threshold);
                }
            }
            _ = heartbeat.tick() => {
                let status = power_monitor.status();
                match serde_json::to_string(&status) {
                    Ok(json) => info!("[Monitor] {}", json),
                    Err(e) => warn!("status serialization failed: {}", e),
                }

                if !source.is_running() {
                    warn!("sample source stopped unexpectedly");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    // Cleanup
    source.stop();
    power_monitor.attach_chain(None);
    device.release().context("device release failed")?;

    info!(
        "Shutdown complete. Tuners built: {}, parameter updates: {}",
        device.stats().get_tuners_built(),
        device.stats().get_parameter_updates()
    );
    Ok(())
}
