//! NexStar Mount Driver CLI
//!
//! One-shot GOTO: point the mount at an RA/Dec pair and report the
//! terminal outcome. Ctrl-C aborts an in-flight slew through the
//! cancellation hook.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::Level;

use nexstar_mount::{load_config, Config, GotoOutcome, MountDriver};

#[derive(Parser)]
#[command(name = "nexstar-mount")]
#[command(about = "Serial GOTO driver for NexStar-compatible telescope mounts")]
#[command(version)]
struct Args {
    /// Target right ascension in hours, [0, 24)
    #[arg(long)]
    ra: f64,

    /// Target declination in degrees, [-90, 90]
    #[arg(long, allow_hyphen_values = true)]
    dec: f64,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port path (overrides config file and enumeration)
    #[arg(long)]
    port: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info", value_parser = parse_log_level)]
    log_level: Level,
}

fn parse_log_level(s: &str) -> Result<Level, String> {
    s.parse().map_err(|_| {
        format!(
            "Invalid log level: {}. Use: trace, debug, info, warn, error",
            s
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(port) = args.port {
        config.serial.port = Some(port);
    }

    tracing::info!("Starting {}", config.mount.name);
    #[cfg(feature = "mock")]
    tracing::info!("Running in MOCK MODE - no real hardware");
    tracing::info!("Baud rate: {}", config.serial.baud_rate);

    #[cfg(feature = "mock")]
    let driver = Arc::new(MountDriver::with_factory(
        config,
        Arc::new(nexstar_mount::MockHandControlFactory::default()),
    ));
    #[cfg(not(feature = "mock"))]
    let driver = Arc::new(MountDriver::new(config));

    // Ctrl-C aborts the in-flight slew through the cancellation hook
    let cancel_driver = Arc::clone(&driver);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, cancelling GOTO");
            cancel_driver.cancel();
        }
    });

    let report = driver.goto_ra_dec(args.ra, args.dec).await?;

    match &report.outcome {
        GotoOutcome::Completed => {
            println!(
                "GOTO completed (mount response: {:?}, session {})",
                report.raw_response.as_deref().unwrap_or(""),
                if report.session_closed {
                    "closed cleanly"
                } else {
                    "close failed"
                }
            );
        }
        GotoOutcome::TimedOut => {
            println!("GOTO timed out: the mount may be busy or unresponsive");
        }
        GotoOutcome::Failed(reason) => {
            println!("GOTO failed: {}", reason);
        }
        GotoOutcome::Cancelled => {
            println!("GOTO cancelled");
        }
    }

    if !report.session_closed {
        tracing::warn!("Serial port did not close cleanly");
    }

    Ok(())
}
