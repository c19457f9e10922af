//! Side-effect workers
//!
//! Alert delivery and snapshot persistence run on their own tasks, fed by
//! bounded queues. A cycle only enqueues; notifier and sink calls happen on
//! the blocking pool, so a slow disk or speech backend never holds up a
//! session. When a queue is full the effect is dropped and counted.

use std::sync::Arc;

use alerting::Notifier;
use storage::{SnapshotRecord, SnapshotSink};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Queue depth per effect kind
pub const DEFAULT_EFFECT_CAPACITY: usize = 256;

/// Outcomes of one worker
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EffectCounts {
    pub delivered: u64,
    pub failed: u64,
}

/// Totals reported when the workers shut down
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EffectStats {
    pub alerts: EffectCounts,
    pub snapshots: EffectCounts,
}

/// Cheap handle sessions use to hand off their side effects
#[derive(Debug, Clone)]
pub struct EffectQueue {
    alerts: mpsc::Sender<Uuid>,
    snapshots: mpsc::Sender<(Uuid, SnapshotRecord)>,
}

impl EffectQueue {
    /// Request an alert for `session`. Never waits.
    pub fn alert(&self, session: Uuid) -> bool {
        offer(&self.alerts, session, "alert")
    }

    /// Request persistence of one snapshot. Never waits.
    pub fn snapshot(&self, session: Uuid, record: SnapshotRecord) -> bool {
        offer(&self.snapshots, (session, record), "snapshot")
    }
}

fn offer<T>(tx: &mpsc::Sender<T>, item: T, kind: &'static str) -> bool {
    match tx.try_send(item) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!("{} queue full, dropping effect", kind);
            metrics::counter!("focus_effects_dropped_total").increment(1);
            false
        }
        Err(TrySendError::Closed(_)) => {
            warn!("{} worker stopped, dropping effect", kind);
            metrics::counter!("focus_effects_dropped_total").increment(1);
            false
        }
    }
}

/// Owns the alert and snapshot worker tasks
pub struct EffectWorkers {
    queue: EffectQueue,
    alerts: JoinHandle<EffectCounts>,
    snapshots: JoinHandle<EffectCounts>,
}

impl EffectWorkers {
    /// Spawn both workers on the current runtime
    pub fn spawn(notifier: Arc<dyn Notifier>, sink: Arc<dyn SnapshotSink>, capacity: usize) -> Self {
        let (alert_tx, alert_rx) = mpsc::channel(capacity.max(1));
        let (snapshot_tx, snapshot_rx) = mpsc::channel(capacity.max(1));

        let alerts = drain(alert_rx, "alert", move |session: Uuid| {
            notifier.notify().map(|()| {
                debug!(session = %session, "Alert delivered via {}", notifier.name());
                metrics::counter!("focus_alerts_fired_total").increment(1);
            }).map_err(|e| {
                metrics::counter!("focus_alert_failures_total").increment(1);
                format!("session {session}: {e}")
            })
        });

        let snapshots = drain(snapshot_rx, "snapshot", move |(session, record): (Uuid, SnapshotRecord)| {
            sink.append(&record).map(|()| {
                metrics::counter!("focus_snapshots_written_total").increment(1);
            }).map_err(|e| {
                metrics::counter!("focus_snapshot_failures_total").increment(1);
                format!("session {session}: {e}")
            })
        });

        Self {
            queue: EffectQueue {
                alerts: alert_tx,
                snapshots: snapshot_tx,
            },
            alerts,
            snapshots,
        }
    }

    pub fn queue(&self) -> EffectQueue {
        self.queue.clone()
    }

    /// Stop accepting effects and wait until everything queued is handled.
    ///
    /// Queues cloned into sessions keep the workers alive until those
    /// sessions are dropped.
    pub async fn finish(self) -> EffectStats {
        let Self {
            queue,
            alerts,
            snapshots,
        } = self;
        drop(queue);

        EffectStats {
            alerts: join(alerts, "alert").await,
            snapshots: join(snapshots, "snapshot").await,
        }
    }
}

fn drain<T, F>(mut rx: mpsc::Receiver<T>, kind: &'static str, apply: F) -> JoinHandle<EffectCounts>
where
    T: Send + 'static,
    F: Fn(T) -> Result<(), String> + Send + Sync + 'static,
{
    let apply = Arc::new(apply);
    tokio::spawn(async move {
        let mut counts = EffectCounts::default();
        while let Some(item) = rx.recv().await {
            let apply = Arc::clone(&apply);
            match tokio::task::spawn_blocking(move || apply(item)).await {
                Ok(Ok(())) => counts.delivered += 1,
                Ok(Err(reason)) => {
                    warn!("{} failed: {}", kind, reason);
                    counts.failed += 1;
                }
                Err(e) => {
                    warn!("{} worker task failed: {}", kind, e);
                    counts.failed += 1;
                }
            }
        }
        counts
    })
}

async fn join(handle: JoinHandle<EffectCounts>, kind: &'static str) -> EffectCounts {
    handle.await.unwrap_or_else(|e| {
        warn!("{} worker ended abnormally: {}", kind, e);
        EffectCounts::default()
    })
}
