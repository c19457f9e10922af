//! Monitor settings
//!
//! Loaded from an optional TOML/JSON/YAML file, then overridden by
//! `FOCUS__*` environment variables (`FOCUS__FOCUS__AWAY_THRESHOLD_MS=5000`,
//! `FOCUS__SOUND__ENABLED=false`, ...).

use std::path::Path;
use std::sync::Arc;

use alerting::{Notifier, NotifierChain, SpeechNotifier, TerminalBell};
use config::{Config, Environment, File};
use focus_engine::FocusConfig;
use serde::{Deserialize, Serialize};
use storage::{DailyCsvLog, FanoutSink, Repository, SnapshotSink, StorageConfig};
use tracing::{debug, info};

use crate::MonitorError;

/// Default settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "focus-monitor";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub focus: FocusConfig,
    pub storage: StorageConfig,
    pub sound: SoundSettings,
    pub logging: LogSettings,
}

/// Alert sound backends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    /// Sound state when a session opens
    pub enabled: bool,
    /// Try the text-to-speech program first
    pub speech: bool,
    pub program: String,
    pub phrase: String,
    /// Fall back to the terminal bell
    pub bell: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            speech: true,
            program: "say".to_string(),
            phrase: "Stay Focused".to_string(),
            bell: true,
        }
    }
}

impl SoundSettings {
    /// Probe the enabled backends in rank order
    pub fn notifier_chain(&self) -> NotifierChain {
        let mut candidates: Vec<Arc<dyn Notifier>> = Vec::new();
        if self.speech {
            candidates.push(Arc::new(SpeechNotifier::new(&self.program, &self.phrase)));
        }
        if self.bell {
            candidates.push(Arc::new(TerminalBell));
        }
        NotifierChain::detect(candidates)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl MonitorSettings {
    /// Load settings. An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let file = match path {
            Some(p) => {
                info!("Loading settings from {}", p.display());
                File::from(p).required(true)
            }
            None => File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        let settings: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("FOCUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!("Settings: {:?}", settings);
        Ok(settings)
    }

    /// Snapshot sinks from the storage settings. The repository is returned
    /// separately so the caller can summarize the session.
    pub fn open_storage(&self) -> (Arc<Repository>, Arc<dyn SnapshotSink>) {
        let repo = Arc::new(Repository::new(self.storage.max_records));
        let memory: Arc<dyn SnapshotSink> = repo.clone();

        let mut sinks = vec![memory];
        match &self.storage.log_dir {
            Some(dir) => {
                let csv: Arc<dyn SnapshotSink> = Arc::new(DailyCsvLog::new(dir));
                sinks.push(csv);
            }
            None => info!("File logging disabled"),
        }

        (repo, Arc::new(FanoutSink::new(sinks)))
    }
}
