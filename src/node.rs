//! # Node Module
//!
//! Wires the whole process together: JSONL input reader, bus, mapper and
//! JSONL output writer.
//!
//! ## Control Flow
//!
//! 1. Resolve parameters and register topics
//! 2. Start the output writer, then the input reader
//! 3. Map reports until `shutdown` resolves or the writer stops
//!
//! When the input reaches EOF the node stays up, idle, until shutdown.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::task::JoinError;
use tracing::{error, info};

use crate::bus::{jsonl, Bus};
use crate::controller::{topics, InputMapper};
use crate::error::{Ps4ControllerError, Result};
use crate::params::ParamStore;

/// Run the node until `shutdown` resolves.
///
/// # Returns
///
/// The number of input reports handled.
///
/// # Errors
///
/// Returns error if:
/// - A parameter is invalid
/// - The output writer stops (e.g. a write fails because the consumer went away)
pub async fn run<P, R, W, S>(params: &P, input: R, output: W, shutdown: S) -> Result<u64>
where
    P: ParamStore + ?Sized,
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    S: Future,
{
    let bus = Bus::new();
    let (mapper, joy) = InputMapper::init(params, &bus)?;

    let mut writer = jsonl::spawn_writer(&bus, &topics::OUTPUTS, output)?;

    let reader_bus = bus.clone();
    let reader = tokio::spawn(async move {
        match jsonl::read_reports(input, topics::JOY, &reader_bus).await {
            Ok(count) => info!("Input ended after {} reports, idle until shutdown", count),
            Err(e) => error!("Input reader failed: {}", e),
        }
    });

    let outcome = tokio::select! {
        count = mapper.spin(joy, &bus, shutdown) => Ok(count),
        finished = &mut writer => Err(writer_stopped(finished)),
    };

    reader.abort();
    outcome
}

/// Turn the writer task's exit into an error; it only exits early on failure.
fn writer_stopped<W>(finished: std::result::Result<Result<W>, JoinError>) -> Ps4ControllerError {
    let err = match finished {
        Ok(Ok(_)) => Ps4ControllerError::Transport("output writer stopped".to_string()),
        Ok(Err(e)) => e,
        Err(e) => Ps4ControllerError::Transport(format!("output writer task failed: {}", e)),
    };
    error!("Output writer stopped: {}", err);
    err
}
