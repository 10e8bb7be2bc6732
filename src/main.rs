//! # PS4 Controller
//!
//! Translate gamepad input reports into drive, actuator and autonomy commands.
//!
//! Input reports are read as JSON Lines from stdin and the resulting commands
//! are written as JSON Lines to stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::BufReader;
use tracing::info;

use ps4_controller::config::load_param_file;
use ps4_controller::node;

/// Environment variable naming the parameter file
const PARAMS_ENV_VAR: &str = "PS4_CONTROLLER_PARAMS";

/// Parameter file used when the environment variable is unset
const DEFAULT_PARAMS_PATH: &str = "config/params.toml";

/// Resolve the parameter file location.
fn params_path() -> PathBuf {
    std::env::var_os(PARAMS_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PARAMS_PATH))
}

/// Main entry point for the PS4 controller node
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging to stderr
///    - Load parameters (missing keys take their defaults)
///    - Register topics and construct the mapper
///    - Start the stdin reader and stdout writer
///
/// 2. **Main Loop**
///    - Map every input report as it arrives
///    - Keep running after stdin closes
///    - Handle Ctrl+C for shutdown
///
/// # Errors
///
/// Returns error if:
/// - The parameter file exists but is unreadable or invalid
/// - An index parameter is negative
/// - Writing to stdout fails
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout carries data, so logs go to stderr
    let (log_writer, _log_guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_writer(log_writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("PS4 controller v{} starting...", env!("CARGO_PKG_VERSION"));

    let params = load_param_file(params_path())?;

    let stdin = BufReader::new(tokio::io::stdin());

    info!("Press Ctrl+C to exit");
    node::run(&params, stdin, tokio::io::stdout(), tokio::signal::ctrl_c()).await?;

    Ok(())
}
