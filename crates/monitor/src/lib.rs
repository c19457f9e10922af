//! Focus Monitor
//!
//! Drives focus sessions: feeds observations through each session's
//! pipeline and hands alerts and snapshots to background effect workers.
//! Notifier and sink failures are logged and never reach scoring state.

pub mod cli;
pub mod effects;
pub mod hub;
pub mod input;
pub mod replay;
pub mod runner;
pub mod settings;

pub use effects::{EffectCounts, EffectQueue, EffectStats, EffectWorkers};
pub use hub::SessionHub;
pub use input::{parse_line, FrameInput, MonitorInput};
pub use replay::{replay, ReplayReport};
pub use runner::{to_record, SessionCommand, SessionRunner};
pub use settings::{LogSettings, MonitorSettings, SoundSettings};

use focus_engine::FocusError;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Bad input on line {line}: {source}")]
    Input {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown session {0}")]
    UnknownSession(Uuid),

    #[error(transparent)]
    Focus(#[from] FocusError),
}

/// Initialize logging. Logs go to stderr; stdout carries cycle output.
pub fn init_logging(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {e}");
    }
}
