// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Detached pipeline demo.
//!
//! Wires the full tracking pipeline (acquisition -> vision -> control)
//! against the simulated camera and stage, enables tracking, and reports the
//! stage pose while the controller chases the drifting synthetic target.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stagetrack::config::{load_config, TrackerConfig};
use stagetrack::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "track_sim",
    about = "Run the stagetrack pipeline against simulated hardware"
)]
struct Args {
    /// Path to stagetrack_configuration.toml (defaults apply if omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to run the pipeline before shutting down
    #[arg(long, default_value_t = 10.0)]
    duration_secs: f64,

    /// Simulated target drift in pixels per frame, x axis
    #[arg(long, default_value_t = 2.0)]
    drift_x: f64,

    /// Simulated target drift in pixels per frame, y axis
    #[arg(long, default_value_t = 1.0)]
    drift_y: f64,

    /// Simulated camera readout time per frame
    #[arg(long, default_value_t = 50)]
    capture_delay_ms: u64,

    /// Track the left panel instead of the right one
    #[arg(long)]
    track_left: bool,

    /// Use inverted thresholding (dark object, bright background)
    #[arg(long)]
    inverted: bool,

    /// Log per-frame capture latency
    #[arg(long)]
    show_capture_time: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("track_sim failed: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => load_config(Some(path))?,
        None => TrackerConfig::default(),
    };

    // Operator flags, applied once before the services start.
    let flags = Arc::new(OperatorFlags::new());
    if args.track_left {
        flags.toggle_panel();
    }
    if args.inverted {
        flags.toggle_inverted_thresholding();
    }
    if args.show_capture_time {
        flags.toggle_capture_timing();
    }

    // Simulated hardware. The ROI dance mirrors real startup: live mode off,
    // readout window applied, live mode back on.
    let mut source = SimulatedFrameSource::new(config.camera.roi_width, config.camera.roi_height)
        .with_capture_delay(Duration::from_millis(args.capture_delay_ms))
        .with_target_velocity(args.drift_x, args.drift_y);
    source.set_live_mode_on(false);
    source.set_roi(
        config.camera.roi_x,
        config.camera.roi_y,
        config.camera.roi_width,
        config.camera.roi_height,
    )?;
    source.set_live_mode_on(true);

    let stage = SimulatedStage::new();

    let diagnostics = DiagnosticCells::new();
    let frames = LatestValueCell::new();
    let targets = LatestValueCell::new();

    let mut acquisition = AcquisitionLoop::new(
        Box::new(source),
        Arc::clone(&flags),
        frames.clone(),
        diagnostics.clone(),
    );
    let mut vision = VisionLoop::new(
        Box::new(stage.clone()),
        Arc::clone(&flags),
        frames,
        targets.clone(),
        diagnostics.clone(),
        VisionSettings {
            crop_size: config.optics.crop_size,
            interval: Duration::from_millis(config.vision.segmentation_interval_ms),
            mapper: PixelToStageMapper::new_uniform(config.optics.pixel_to_stage_scale),
        },
    );
    let mut control = StageControlLoop::new(
        Box::new(stage.clone()),
        Box::new(stage),
        Arc::clone(&flags),
        targets,
        diagnostics.clone(),
        ControlSettings {
            gain: config.control.gain,
            poll_interval: Duration::from_millis(config.control.poll_interval_ms),
            settle_delay: Duration::from_millis(config.control.settle_delay_ms),
        },
    )?;

    acquisition.start()?;
    info!("Acquisition service started");
    vision.start()?;
    info!("Vision service started");
    control.start()?;
    info!("Control service started");

    control.set_tracking_enabled(true)?;

    let deadline = Duration::from_secs_f64(args.duration_secs);
    let started = Instant::now();
    while started.elapsed() < deadline {
        thread::sleep(Duration::from_millis(500));
        let pose = diagnostics.stage_pose.read_latest();
        info!(
            "State {:?}, stage pose {}",
            control.get_state(),
            pose.map_or_else(|| "(unknown)".to_string(), |p| p.to_string())
        );
        if let Some(fault) = control.take_last_fault() {
            return Err(Box::new(fault));
        }
    }

    control.set_tracking_enabled(false)?;
    control.stop();
    vision.stop();
    acquisition.stop();
    info!("Pipeline shut down cleanly");
    Ok(())
}
