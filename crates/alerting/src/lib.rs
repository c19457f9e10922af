//! Alerting System
//!
//! Rate-limits focus alerts and delivers them through the best notifier
//! backend available on the host.

mod manager;
mod notifier;

pub use manager::{AlertConfig, AlertDecision, AlertGate};
pub use notifier::{Notifier, NotifierChain, NullNotifier, SpeechNotifier, TerminalBell};

use thiserror::Error;

/// Alert delivery errors
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("No notifier backend available")]
    NoBackend,

    #[error("Notifier {backend} failed: {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },
}
