//! Replay loop
//!
//! Reads JSON-lines input, drives one session through the hub and writes
//! every cycle outcome or command result as a JSON line. The session opens
//! at the first frame's capture time, so recorded streams replay with their
//! own clock. Undecodable or malformed lines are skipped; a failing reader
//! or writer ends the loop, and the session is closed either way.

use std::future::Future;

use chrono::{DateTime, Utc};
use focus_engine::{FocusConfig, SessionView};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::hub::SessionHub;
use crate::input::{parse_line, MonitorInput};
use crate::runner::SessionCommand;
use crate::MonitorError;

/// What a replay consumed and produced
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplayReport {
    /// Lines read, including skipped ones
    pub lines: usize,
    /// JSON lines written
    pub outputs: usize,
    /// Lines that could not be decoded, parsed or processed
    pub skipped: usize,
    /// Final view of the session, if one was opened
    pub view: Option<SessionView>,
}

/// Run one session over `reader` until end of input, a read or write
/// failure, or `shutdown` resolving.
pub async fn replay<R, W, S>(
    hub: &SessionHub,
    config: &FocusConfig,
    sound_enabled: bool,
    mut reader: R,
    mut out: W,
    shutdown: S,
) -> Result<ReplayReport, MonitorError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut report = ReplayReport::default();
    let mut session: Option<Uuid> = None;
    let mut buf = Vec::new();
    tokio::pin!(shutdown);

    loop {
        buf.clear();
        let read = tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => read,
            () = &mut shutdown => {
                info!("Interrupted, closing session");
                break;
            }
        };
        match read {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Input read failed, stopping: {}", e);
                break;
            }
        }
        report.lines += 1;
        let line_no = report.lines;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!("Line {}: not valid UTF-8 ({}), skipping", line_no, e);
                report.skipped += 1;
                continue;
            }
        };
        let input = match parse_line(line, line_no) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}", e);
                report.skipped += 1;
                continue;
            }
        };

        let payload = match input {
            MonitorInput::Frame(frame) => {
                let obs = match frame.into_observation(config, Utc::now()) {
                    Ok(obs) => obs,
                    Err(e) => {
                        warn!("Line {}: {}", line_no, e);
                        report.skipped += 1;
                        continue;
                    }
                };
                let id = open_once(hub, &mut session, obs.timestamp, sound_enabled).await?;
                match hub.submit(id, &obs).await {
                    Ok(Some(outcome)) => serde_json::to_string(&outcome),
                    Ok(None) => {
                        report.skipped += 1;
                        continue;
                    }
                    Err(e) => {
                        warn!("{}", e);
                        break;
                    }
                }
            }
            other => {
                let Some(command) = other.command() else { continue };
                let id = open_once(hub, &mut session, Utc::now(), sound_enabled).await?;
                match hub.command(id, command).await {
                    Ok(view) => serde_json::to_string(&view),
                    Err(e) => {
                        warn!("{}", e);
                        break;
                    }
                }
            }
        };

        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Line {}: could not encode output: {}", line_no, e);
                continue;
            }
        };
        if let Err(e) = write_line(&mut out, &payload).await {
            warn!("Output closed, stopping: {}", e);
            break;
        }
        report.outputs += 1;
    }

    if let Err(e) = out.flush().await {
        warn!("Flushing output failed: {}", e);
    }
    if let Some(id) = session {
        report.view = Some(hub.close(id).await?);
    }
    Ok(report)
}

/// Open the session on first use, muted if sound starts off
async fn open_once(
    hub: &SessionHub,
    session: &mut Option<Uuid>,
    at: DateTime<Utc>,
    sound_enabled: bool,
) -> Result<Uuid, MonitorError> {
    if let Some(id) = *session {
        return Ok(id);
    }
    let id = hub.open(at).await?;
    *session = Some(id);
    if !sound_enabled {
        hub.command(id, SessionCommand::SetSound(false)).await?;
    }
    Ok(id)
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, payload: &str) -> std::io::Result<()> {
    out.write_all(payload.as_bytes()).await?;
    out.write_all(b"\n").await
}
