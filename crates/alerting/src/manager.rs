//! Alert cooldown gate

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum time between two fired alerts (milliseconds, default: 3000)
    pub cooldown_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { cooldown_ms: 3000 }
    }
}

impl AlertConfig {
    fn cooldown(&self) -> TimeDelta {
        TimeDelta::milliseconds(i64::try_from(self.cooldown_ms).unwrap_or(i64::MAX))
    }
}

/// Outcome of one gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    /// Alert fired, `last_fired` moved to now
    Fired,
    /// Nothing to alert about this cycle
    NotTriggered,
    /// Triggered, but sound is switched off
    Muted,
    /// Triggered, but the previous alert is too recent
    Cooldown,
}

impl AlertDecision {
    pub fn fired(self) -> bool {
        self == AlertDecision::Fired
    }
}

/// Cooldown gate for a single session.
///
/// The gate is the only writer of the session's last-fired instant and
/// moves it exclusively when an alert fires.
#[derive(Debug, Clone)]
pub struct AlertGate {
    cooldown: TimeDelta,
    fire_count: usize,
}

impl AlertGate {
    /// Create a new gate
    pub fn new(config: AlertConfig) -> Self {
        Self {
            cooldown: config.cooldown(),
            fire_count: 0,
        }
    }

    /// Decide whether to fire for this cycle.
    ///
    /// `triggered` is true when the cycle is not focused or a phone is in
    /// view. A `None` last-fired instant means no alert has fired yet.
    pub fn evaluate(
        &mut self,
        last_fired: &mut Option<DateTime<Utc>>,
        triggered: bool,
        sound_enabled: bool,
        now: DateTime<Utc>,
    ) -> AlertDecision {
        if !triggered {
            return AlertDecision::NotTriggered;
        }
        if !sound_enabled {
            return AlertDecision::Muted;
        }

        if let Some(last) = *last_fired {
            let since = now.signed_duration_since(last);
            if since < self.cooldown {
                debug!("Alert suppressed: {}ms since last fire", since.num_milliseconds());
                return AlertDecision::Cooldown;
            }
        }

        *last_fired = Some(now);
        self.fire_count += 1;
        info!("Alert fired (count: {})", self.fire_count);
        AlertDecision::Fired
    }

    /// Number of alerts fired through this gate
    pub fn fire_count(&self) -> usize {
        self.fire_count
    }
}

impl Default for AlertGate {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
