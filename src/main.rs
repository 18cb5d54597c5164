// SPDX-License-Identifier: GPL-3.0-only

use astrocam::app::{App, FeatureSet, Message};
use astrocam::config::Config;
use astrocam::constants::{capture, hardware as hw};
use astrocam::hardware::{self, MemoryBudget};
use astrocam::pipeline::rpicam::RpicamPipeline;
use astrocam::pipeline::session::CaptureSession;
use astrocam::pipeline::PipelineEvent;
use astrocam::{storage, updater};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::warn;

#[derive(Parser)]
#[command(name = "astrocam")]
#[command(about = "Touchscreen astrophotography camera for the Raspberry Pi")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory captured photos are stored in (default: ~/Pictures/astrocam)
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Disable hardware shutter-button monitoring
    #[arg(long)]
    no_hardware_button: bool,

    /// Show frame size and pipeline state on the overlay
    #[arg(long)]
    debug_overlay: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll for application updates and offer to upgrade
    CheckUpdate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=astrocam=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::CheckUpdate) => {
            updater::run()?;
            Ok(())
        }
        None => run_camera(cli),
    }
}

fn run_camera(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let media_dir = cli.media_dir.unwrap_or_else(storage::default_media_dir);
    let temp_path = std::env::temp_dir().join(capture::TEMP_FILE_NAME);

    let (tx, rx) = mpsc::channel::<Message>();

    // Bus notifications arrive on the streaming thread and are forwarded
    // into the single UI channel; the sender sits behind a mutex because
    // the bus handler must be Sync
    let events = {
        let tx = std::sync::Mutex::new(tx.clone());
        Box::new(move |event: PipelineEvent| match event {
            PipelineEvent::FileWritten(path) => {
                if let Ok(tx) = tx.lock() {
                    let _ = tx.send(Message::FileWritten(path));
                }
            }
        })
    };

    let backend = RpicamPipeline::new(&config, &temp_path, events, None)?;
    let session = CaptureSession::setup(Box::new(backend), media_dir)?;
    let budget = MemoryBudget::probe();

    let features = FeatureSet {
        hardware_button: !cli.no_hardware_button,
        debug_overlay: cli.debug_overlay,
        gallery: true,
    };

    {
        let tx = tx.clone();
        ctrlc::set_handler(move || {
            let _ = tx.send(Message::Quit);
        })?;
    }

    if features.hardware_button {
        let tx = tx.clone();
        let monitor = hardware::spawn_button_monitor(Path::new(hw::SHUTTER_BUTTON_GPIO), move || {
            let _ = tx.send(Message::ShutterPressed);
        });
        if monitor.is_none() {
            warn!("Hardware shutter button unavailable");
        }
    }

    let mut app = App::new(config, session, budget, features);
    app.run(rx)?;
    Ok(())
}
