//! JSON Lines bridge between the bus and the process's byte streams.
//!
//! Inbound: one input report per line, e.g. `{"axes":[0.0,0.5],"buttons":[0,1]}`.
//!
//! Outbound: one message per line,
//! `{"stamp":"2026-01-01T00:00:00+00:00","topic":"/cmd_vel","type":"velocity","data":{...}}`.

use chrono::Utc;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Bus, Node, Publish};
use crate::error::Result;
use crate::msg::{Joy, Message};

/// Capacity of the tap feeding the writer task.
const WRITE_QUEUE_DEPTH: usize = 64;

#[derive(Serialize)]
struct Envelope<'a> {
    stamp: String,
    topic: &'a str,
    #[serde(flatten)]
    message: &'a Message,
}

/// Encode one message as a newline-terminated JSON line.
pub fn encode_line(topic: &str, message: &Message) -> Result<String> {
    let envelope = Envelope {
        stamp: Utc::now().to_rfc3339(),
        topic,
        message,
    };
    let mut line = serde_json::to_string(&envelope)?;
    line.push('\n');
    Ok(line)
}

/// Forward input reports from `reader` onto `topic` until EOF.
///
/// Blank lines are skipped. Lines that do not parse as a report are logged
/// and skipped.
///
/// # Returns
///
/// The number of reports published.
///
/// # Errors
///
/// Returns `Io` if reading from `reader` fails.
pub async fn read_reports<R, P>(reader: R, topic: &str, out: &P) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    P: Publish + ?Sized,
{
    let mut lines = reader.lines();
    let mut count: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Joy>(line) {
            Ok(joy) => {
                out.publish(topic, Message::Joy(joy));
                count += 1;
            }
            Err(e) => warn!("Skipping malformed input report: {}", e),
        }
    }

    debug!("Input stream closed after {} reports", count);
    Ok(count)
}

/// Advertise `topics` and write everything published on them to `writer`,
/// one line per message in publish order.
///
/// The returned task finishes once every clone of `bus` is gone, handing the
/// writer back.
///
/// # Errors
///
/// Returns error if a topic or the tap cannot be registered. The task itself
/// fails on the first write error.
pub fn spawn_writer<W>(
    bus: &Bus,
    topics: &[(&str, usize)],
    mut writer: W,
) -> Result<JoinHandle<Result<W>>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    for &(topic, queue_size) in topics {
        bus.advertise(topic, queue_size)?;
    }
    let names: Vec<&str> = topics.iter().map(|&(topic, _)| topic).collect();
    let mut tap = bus.tap(&names, WRITE_QUEUE_DEPTH)?;

    Ok(tokio::spawn(async move {
        while let Some((topic, message)) = tap.recv().await {
            let line = encode_line(&topic, &message)?;
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;
        }
        debug!("Output tap closed");
        Ok(writer)
    }))
}
