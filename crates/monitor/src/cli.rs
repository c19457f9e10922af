//! CLI argument parsing for the focus monitor

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use focus_engine::FocusConfig;

use crate::settings::MonitorSettings;

/// Scoring preset applied on top of the loaded settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Short look-away allowance, tighter frontal band
    Strict,
    /// Longer look-away allowance, slower alerts
    Lenient,
}

#[derive(Parser, Debug)]
#[command(name = "focus-monitor")]
#[command(version)]
#[command(about = "Study focus monitor: scores JSON-lines perception frames", long_about = None)]
pub struct Cli {
    /// JSON-lines input file (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the daily CSV logs
    #[arg(long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Do not write CSV logs
    #[arg(long = "no-log-file", conflicts_with = "log_dir")]
    pub no_log_file: bool,

    /// Start with sound alerts off
    #[arg(short, long)]
    pub mute: bool,

    /// Scoring preset
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Emit logs as JSON
    #[arg(long = "json-logs")]
    pub json_logs: bool,
}

impl Cli {
    /// Apply command-line overrides; flags win over file and environment
    pub fn apply(&self, settings: &mut MonitorSettings) {
        match self.preset {
            Some(Preset::Strict) => settings.focus.apply_preset(&FocusConfig::strict()),
            Some(Preset::Lenient) => settings.focus.apply_preset(&FocusConfig::lenient()),
            None => {}
        }
        if let Some(dir) = &self.log_dir {
            settings.storage.log_dir = Some(dir.display().to_string());
        }
        if self.no_log_file {
            settings.storage.log_dir = None;
        }
        if self.mute {
            settings.sound.enabled = false;
        }
        if self.json_logs {
            settings.logging.json = true;
        }
    }
}
