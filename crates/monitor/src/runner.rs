//! Session runner: one focus session plus its side effects

use chrono::{DateTime, Local, Utc};
use focus_engine::{CycleOutcome, FocusConfig, FocusSession, FrameObservation, SessionView, StatusSnapshot};
use serde::{Deserialize, Serialize};
use storage::SnapshotRecord;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::effects::EffectQueue;
use crate::MonitorError;

/// User commands accepted between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum SessionCommand {
    SetSound(bool),
    ToggleSound,
    ResetScore,
}

/// Convert a snapshot into a log row stamped with local wall-clock time
pub fn to_record(snapshot: &StatusSnapshot) -> SnapshotRecord {
    SnapshotRecord {
        timestamp: snapshot.timestamp.with_timezone(&Local).naive_local(),
        status: snapshot.status.label().to_string(),
        gaze_status: snapshot.gaze.as_str().to_string(),
        faces_detected: u32::try_from(snapshot.faces_detected).unwrap_or(u32::MAX),
        phone_detected: u8::from(snapshot.phone_detected),
        focus_score: snapshot.focus_score,
    }
}

pub struct SessionRunner {
    id: Uuid,
    session: FocusSession,
    effects: EffectQueue,
    cycles: u64,
    skipped: u64,
}

impl SessionRunner {
    pub fn new(
        id: Uuid,
        config: FocusConfig,
        effects: EffectQueue,
        started_at: DateTime<Utc>,
    ) -> Result<Self, MonitorError> {
        let session = FocusSession::new(config, started_at)?;
        info!("Session {} started at {}", id, started_at);
        Ok(Self {
            id,
            session,
            effects,
            cycles: 0,
            skipped: 0,
        })
    }

    /// Run one cycle and hand its side effects to the effect workers.
    ///
    /// Returns `None` when the observation could not be processed; the
    /// session state is untouched in that case.
    pub fn handle(&mut self, obs: &FrameObservation) -> Option<CycleOutcome> {
        let outcome = match self.session.process(obs) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(session = %self.id, "Skipping cycle: {}", e);
                self.skipped += 1;
                metrics::counter!("focus_cycles_skipped_total").increment(1);
                return None;
            }
        };

        self.cycles += 1;
        metrics::counter!("focus_cycles_total").increment(1);
        metrics::gauge!("focus_score").set(f64::from(outcome.focus_score));

        if outcome.alert {
            debug!(session = %self.id, "Alert requested: {}", outcome.status);
            self.effects.alert(self.id);
        }
        if let Some(snapshot) = &outcome.snapshot {
            self.effects.snapshot(self.id, to_record(snapshot));
        }

        Some(outcome)
    }

    /// Apply a user command and return the updated view
    pub fn apply(&mut self, command: SessionCommand) -> SessionView {
        match command {
            SessionCommand::SetSound(enabled) => self.session.set_sound_enabled(enabled),
            SessionCommand::ToggleSound => {
                let enabled = self.session.toggle_sound();
                info!(session = %self.id, "Sound {}", if enabled { "on" } else { "off" });
            }
            SessionCommand::ResetScore => {
                self.session.reset_score();
                info!(session = %self.id, "Focus score reset");
            }
        }
        self.session.view()
    }

    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    pub fn alerts_fired(&self) -> usize {
        self.session.alerts_fired()
    }

    /// Cycles processed and cycles skipped
    pub fn cycle_counts(&self) -> (u64, u64) {
        (self.cycles, self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectCounts, EffectWorkers};
    use alerting::{AlertError, Notifier};
    use chrono::TimeDelta;
    use focus_engine::{GazeClass, SnapshotThrottle, Status};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use storage::{Repository, SnapshotSink, StorageError};

    #[derive(Default)]
    struct CountingNotifier {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Notifier for CountingNotifier {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn notify(&self) -> Result<(), AlertError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AlertError::Backend {
                    backend: "counting",
                    reason: "speaker unplugged".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    struct BrokenSink;

    impl SnapshotSink for BrokenSink {
        fn append(&self, _record: &SnapshotRecord) -> Result<(), StorageError> {
            Err(StorageError::Lock("poisoned".to_string()))
        }
    }

    /// Sink stuck on a slow disk
    struct SlowSink {
        delay: Duration,
        inner: Repository,
    }

    impl SnapshotSink for SlowSink {
        fn append(&self, record: &SnapshotRecord) -> Result<(), StorageError> {
            std::thread::sleep(self.delay);
            self.inner.insert(record.clone())
        }
    }

    fn at(secs: f64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds((secs * 1000.0).round() as i64)
    }

    fn every_cycle() -> FocusConfig {
        FocusConfig {
            snapshot: SnapshotThrottle::EveryCycles { cycles: 1 },
            ..FocusConfig::default()
        }
    }

    fn empty_frame(secs: f64) -> FrameObservation {
        FrameObservation::new(vec![], false, at(secs), 640, 480).unwrap()
    }

    fn workers(notifier: Arc<CountingNotifier>, sink: Arc<dyn SnapshotSink>) -> EffectWorkers {
        let notifier: Arc<dyn Notifier> = notifier;
        EffectWorkers::spawn(notifier, sink, 64)
    }

    fn runner(workers: &EffectWorkers) -> SessionRunner {
        SessionRunner::new(Uuid::new_v4(), every_cycle(), workers.queue(), at(0.0)).unwrap()
    }

    #[tokio::test]
    async fn test_alert_and_snapshot_side_effects() {
        let notifier = Arc::new(CountingNotifier::default());
        let repo = Arc::new(Repository::new(100));
        let workers = workers(notifier.clone(), repo.clone());
        let mut runner = runner(&workers);

        let first = runner.handle(&empty_frame(0.0)).unwrap();
        assert!(first.alert);
        runner.handle(&empty_frame(1.0)).unwrap();
        drop(runner);

        let stats = workers.finish().await;
        assert_eq!(stats.alerts, EffectCounts { delivered: 1, failed: 0 });
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(repo.len(), 2);
        let latest = &repo.recent(1).unwrap()[0];
        assert_eq!(latest.status, Status::NoOrMultipleFace.label());
        assert_eq!(latest.gaze_status, "away");
        assert_eq!(latest.faces_detected, 0);
    }

    #[tokio::test]
    async fn test_side_effect_failures_do_not_stop_cycles() {
        let notifier = Arc::new(CountingNotifier {
            fail: true,
            ..CountingNotifier::default()
        });
        let workers = workers(notifier.clone(), Arc::new(BrokenSink));
        let mut runner = runner(&workers);

        let outcome = runner.handle(&empty_frame(2.0)).unwrap();
        assert!(outcome.alert);
        assert_eq!(outcome.focus_score, 70);

        // The failed alert still counts for the cooldown
        let next = runner.handle(&empty_frame(3.0)).unwrap();
        assert!(!next.alert);
        assert_eq!(runner.alerts_fired(), 1);
        assert_eq!(runner.cycle_counts(), (2, 0));
        drop(runner);

        let stats = workers.finish().await;
        assert_eq!(stats.alerts.failed, 1);
        assert_eq!(stats.snapshots, EffectCounts { delivered: 0, failed: 2 });
    }

    #[tokio::test]
    async fn test_slow_sink_does_not_block_the_cycle() {
        let slow = Arc::new(SlowSink {
            delay: Duration::from_millis(300),
            inner: Repository::new(10),
        });
        let workers = workers(Arc::new(CountingNotifier::default()), slow.clone());
        let mut runner = runner(&workers);

        let started = Instant::now();
        for t in [0.0, 0.1, 0.2] {
            runner.handle(&empty_frame(t)).unwrap();
        }
        assert!(started.elapsed() < Duration::from_millis(200));
        drop(runner);

        // Everything queued is still written on shutdown
        assert_eq!(workers.finish().await.snapshots.delivered, 3);
        assert_eq!(slow.inner.len(), 3);
    }

    #[tokio::test]
    async fn test_bad_observation_is_skipped() {
        let notifier = Arc::new(CountingNotifier::default());
        let workers = workers(notifier.clone(), Arc::new(Repository::new(10)));
        let mut runner = runner(&workers);

        let short_face = FrameObservation::new(vec![vec![(0.5, 0.5)]], false, at(0.0), 640, 480).unwrap();
        assert!(runner.handle(&short_face).is_none());
        assert_eq!(runner.cycle_counts(), (0, 1));
        assert_eq!(runner.view().status, None);
        drop(runner);

        workers.finish().await;
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_commands() {
        let notifier = Arc::new(CountingNotifier::default());
        let workers = workers(notifier.clone(), Arc::new(Repository::new(10)));
        let mut runner = runner(&workers);

        assert!(!runner.apply(SessionCommand::ToggleSound).sound_enabled);
        assert!(runner.apply(SessionCommand::SetSound(true)).sound_enabled);

        // Muted sessions still score but never ring
        runner.apply(SessionCommand::SetSound(false));
        let outcome = runner.handle(&empty_frame(0.0)).unwrap();
        assert!(!outcome.alert);

        assert_eq!(runner.apply(SessionCommand::ResetScore).focus_score, 100);
        drop(runner);

        workers.finish().await;
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_to_record_uses_labels() {
        let snapshot = StatusSnapshot {
            timestamp: at(0.0),
            status: Status::PhoneDetected,
            gaze: GazeClass::Notebook,
            faces_detected: 1,
            phone_detected: true,
            focus_score: 42,
        };
        let record = to_record(&snapshot);
        assert_eq!(record.status, "Not Focused (Phone Detected)");
        assert_eq!(record.gaze_status, "notebook");
        assert_eq!(record.phone_detected, 1);
        assert_eq!(record.focus_score, 42);
        assert_eq!(record.timestamp, at(0.0).with_timezone(&Local).naive_local());
    }

    #[test]
    fn test_command_wire_format() {
        let json = serde_json::to_string(&SessionCommand::SetSound(false)).unwrap();
        assert_eq!(json, r#"{"command":"set_sound","value":false}"#);
    }
}
