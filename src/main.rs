//! LED Indicator CLI
//!
//! Runs the detector over a synthetic blinking-LED scene and prints one
//! detection per frame.

use chrono::{DateTime, Utc};
use clap::Parser;
use led_indicator::{
    capture::{FileConfig, FrameSource, Roi, SyntheticLedSource},
    metrics::{MetricsRegistry, MetricsSnapshot},
    LedDetector, LedState,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Frame pacing in continuous mode (about 30 fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Parser, Debug)]
#[command(name = "led-indicator", version, about = "Detect an indicator light's state and colour")]
struct Args {
    /// TOML configuration file with [detector], [scene] and [output] sections.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to process.
    #[arg(short = 'n', long)]
    frames: Option<u32>,

    /// Process frames until interrupted.
    #[arg(long)]
    continuous: bool,

    /// Region of interest as x,y,w,h.
    #[arg(long)]
    roi: Option<Roi>,

    /// Print Prometheus metrics when done.
    #[arg(long)]
    print_metrics: bool,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("LED Indicator v{}", led_indicator::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(frames) = args.frames {
        config.output.frame_count = frames;
    }
    if let Some(roi) = args.roi {
        config.scene.roi = roi;
    }
    config.output.continuous |= args.continuous;
    config.output.print_metrics |= args.print_metrics;

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let mut source = SyntheticLedSource::new();
    if let Err(e) = source.open(&config.scene) {
        eprintln!("Failed to open frame source: {}", e);
        std::process::exit(1);
    }

    let metrics = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut detector = LedDetector::new(config.detector.clone());
    let roi = config.scene.roi;
    let mut rejected = 0u64;
    let mut phase: Option<(LedState, DateTime<Utc>)> = None;

    info!(roi = %roi, continuous = config.output.continuous, "Processing frames...");

    let mut captured = 0u32;
    while running.load(Ordering::SeqCst)
        && (config.output.continuous || captured < config.output.frame_count)
    {
        captured = captured.saturating_add(1);
        let frame = match source.capture() {
            Ok(f) => f,
            Err(e) => {
                warn!("Frame capture failed: {}", e);
                break;
            }
        };

        let view = match frame.view() {
            Ok(v) => v,
            Err(e) => {
                warn!("Frame {} is malformed: {}", frame.sequence(), e);
                continue;
            }
        };

        let detection = match detector.process_frame(&view, &roi) {
            Ok(d) => d,
            Err(e) => {
                rejected += 1;
                metrics.record_rejection(&e);
                warn!("Frame {} rejected: {}", frame.sequence(), e);
                continue;
            }
        };

        let now = Utc::now();
        match phase {
            Some((state, since)) if state != detection.led => {
                info!(
                    from = %state,
                    to = %detection.led,
                    lasted_ms = (now - since).num_milliseconds(),
                    at = %now.to_rfc3339(),
                    "LED phase ended"
                );
                phase = Some((detection.led, now));
            }
            None => phase = Some((detection.led, now)),
            _ => {}
        }

        metrics.update(&MetricsSnapshot::from_detection(
            &detection,
            detector.frames_processed(),
            rejected,
        ));

        println!(
            "frame {:>4}: Y={:>6.1} min={:>6.1} max={:>6.1} hue={:>5.1} sat={:.2} color={:<7} code={} led={}",
            frame.sequence(),
            detection.brightness,
            detection.dyn_min,
            detection.dyn_max,
            detection.hue,
            detection.saturation,
            detection.color,
            detection.history_code,
            detection.led,
        );

        if config.output.continuous {
            std::thread::sleep(FRAME_INTERVAL);
        }
    }

    source.close();
    info!(
        "Processed {} frames, {} rejected, LED is {}",
        detector.frames_processed(),
        rejected,
        detector.led_state()
    );

    if config.output.print_metrics {
        match metrics.encode() {
            Ok(text) => print!("{}", text),
            Err(e) => warn!("Failed to encode metrics: {}", e),
        }
    }
}
