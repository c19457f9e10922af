//! Session hub
//!
//! Owns every open session. Sessions share the effect workers (notifier
//! and snapshot sinks) but never each other's state; each one sits behind
//! its own lock so cycles of different sessions run independently.

use std::collections::HashMap;
use std::sync::Arc;

use alerting::Notifier;
use chrono::{DateTime, Utc};
use focus_engine::{CycleOutcome, FocusConfig, FrameObservation, SessionView};
use storage::SnapshotSink;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::effects::{EffectStats, EffectWorkers, DEFAULT_EFFECT_CAPACITY};
use crate::runner::{SessionCommand, SessionRunner};
use crate::MonitorError;

pub struct SessionHub {
    config: FocusConfig,
    effects: EffectWorkers,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionRunner>>>>,
}

impl SessionHub {
    /// Create the hub and spawn its effect workers on the current runtime
    pub fn new(config: FocusConfig, notifier: Arc<dyn Notifier>, sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            config,
            effects: EffectWorkers::spawn(notifier, sink, DEFAULT_EFFECT_CAPACITY),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a new session with fresh state
    pub async fn open(&self, started_at: DateTime<Utc>) -> Result<Uuid, MonitorError> {
        let id = Uuid::new_v4();
        let runner = SessionRunner::new(id, self.config.clone(), self.effects.queue(), started_at)?;

        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::new(Mutex::new(runner)));
        metrics::gauge!("focus_sessions_active").set(sessions.len() as f64);
        Ok(id)
    }

    async fn session(&self, id: Uuid) -> Result<Arc<Mutex<SessionRunner>>, MonitorError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(MonitorError::UnknownSession(id))
    }

    /// Run one cycle on a session. `Ok(None)` means the observation was skipped.
    pub async fn submit(&self, id: Uuid, obs: &FrameObservation) -> Result<Option<CycleOutcome>, MonitorError> {
        let session = self.session(id).await?;
        let mut runner = session.lock().await;
        Ok(runner.handle(obs))
    }

    pub async fn command(&self, id: Uuid, command: SessionCommand) -> Result<SessionView, MonitorError> {
        let session = self.session(id).await?;
        let mut runner = session.lock().await;
        Ok(runner.apply(command))
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, MonitorError> {
        let session = self.session(id).await?;
        let runner = session.lock().await;
        Ok(runner.view())
    }

    /// Close a session, returning its final view
    pub async fn close(&self, id: Uuid) -> Result<SessionView, MonitorError> {
        let session = {
            let mut sessions = self.sessions.write().await;
            let session = sessions.remove(&id).ok_or(MonitorError::UnknownSession(id))?;
            metrics::gauge!("focus_sessions_active").set(sessions.len() as f64);
            session
        };

        let runner = session.lock().await;
        let (cycles, skipped) = runner.cycle_counts();
        info!(
            "Session {} closed: {} cycles ({} skipped), {} alerts, score {}",
            id,
            cycles,
            skipped,
            runner.alerts_fired(),
            runner.view().focus_score
        );
        Ok(runner.view())
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop any sessions still open and wait for queued alerts and
    /// snapshots to be handled
    pub async fn shutdown(self) -> EffectStats {
        let Self { sessions, effects, .. } = self;
        let open = sessions.into_inner();
        if !open.is_empty() {
            info!("Shutting down with {} open sessions", open.len());
        }
        drop(open);
        effects.finish().await
    }
}
