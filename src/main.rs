//! # MOVR Teleop
//!
//! Drive an Ackermann vehicle from a gamepad.
//!
//! Reads joystick snapshots, translates each one into a steering/speed
//! command and writes the commands to stdout as JSON Lines.

use anyhow::{Context, Result};
use std::future::Future;
use tokio::io::BufReader;
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use movr_teleop::config::{Config, InputSource, LoggingConfig};
use movr_teleop::gamepad::Gamepad;
use movr_teleop::telemetry::CommandLog;
use movr_teleop::teleop::{NodeStats, TeleopNode};
use movr_teleop::transport::jsonl::{JsonLinesSink, JsonLinesSource};
use movr_teleop::transport::{CommandSink, JoystickSource};

/// Log file name prefix when file logging is enabled
const LOG_FILE_PREFIX: &str = "movr-teleop.log";

/// How long runtime shutdown waits for blocking tasks
///
/// A stdin read sits on a blocking thread and cannot be cancelled, so
/// shutdown must not wait for it.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

/// Main entry point for MOVR Teleop
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, defaults otherwise)
///    - Set up logging to stderr (and optionally a daily log file)
///    - Open the joystick input and the stdout command stream
///
/// 2. **Main Loop**
///    - Translate each joystick snapshot and publish the command
///    - Drop malformed snapshots and keep going
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Shutdown**
///    - Log event counters
///    - Stop the runtime without waiting on a pending stdin read
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be loaded
/// - The joystick input cannot be opened
/// - The input or output stream fails
///
/// # Examples
///
/// ```bash
/// echo '{"buttons":[0,1],"axes":[0.0,0.0]}' | cargo run --release
/// cargo run --release -- config/gamepad.toml
/// ```
fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(teleop(config));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    result
}

/// Opens the configured input and output and runs the node
async fn teleop(config: Config) -> Result<()> {
    info!("MOVR Teleop v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Node name: {}", config.node.name);

    let sink = JsonLinesSink::new(tokio::io::stdout());
    let mut node = TeleopNode::new(sink).with_status_interval(config.node.status_interval);

    if config.telemetry.enabled {
        let log = CommandLog::open(&config.telemetry)
            .context("Failed to open command log")?;
        node = node.with_command_log(log);
    }

    match config.input.source {
        InputSource::Stdin => {
            info!("Reading joystick states from stdin (JSON Lines)");
            let mut source = JsonLinesSource::new(BufReader::new(tokio::io::stdin()));
            run(&mut node, &mut source, ctrl_c()).await
        }
        InputSource::Gamepad => {
            let gamepad = Gamepad::open_configured(&config.input.device_path)
                .context("Failed to open joystick")?;
            let mut source = gamepad.into_source(config.input.invert_axes)?;
            info!("Reading joystick states from {}", source.device_path());
            run(&mut node, &mut source, ctrl_c()).await
        }
    }
}

/// Spins the node until input ends or `shutdown` completes
async fn run<K, S, F>(node: &mut TeleopNode<K>, source: &mut S, shutdown: F) -> Result<()>
where
    K: CommandSink,
    S: JoystickSource,
    F: Future<Output = ()>,
{
    info!("Press Ctrl+C to exit");

    tokio::select! {
        result = node.spin(source) => {
            result.context("Teleop node stopped")?;
        }

        _ = shutdown => {
            info!("Shutting down...");
        }
    }

    let NodeStats { received, published, dropped } = node.stats();
    info!(
        "Total: {} received, {} published, {} dropped",
        received, published, dropped
    );
    Ok(())
}

/// Completes on Ctrl+C
///
/// Never completes if the signal handler cannot be installed, so the node
/// keeps running until its input ends.
async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Initializes tracing
///
/// `RUST_LOG` overrides the configured level. Logs go to stderr because stdout
/// carries the command stream. The returned guard flushes the file writer on
/// drop and must be held for the life of the program.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_ascii_lowercase()))
        .context("Invalid log level")?;

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if config.file_dir.is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    }

    let appender = tracing_appender::rolling::daily(&config.file_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(Some(guard))
}
