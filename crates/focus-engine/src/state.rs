//! Per-session state and the look-away timer

use chrono::{DateTime, Utc};

use crate::pose::GazeClass;

pub const FOCUS_MAX: i32 = 100;
pub const FOCUS_MIN: i32 = 0;

/// Seconds from `from` to `to`, clamped to zero if the clock went backwards
pub fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    to.signed_duration_since(from)
        .to_std()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Mutable state of one monitoring session.
///
/// Owned by the session's processing loop and only touched by sequential
/// cycles; never shared between sessions.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Bounded attentiveness score, always within [0, 100]
    pub focus_score: i32,

    /// Start of the current unbroken run of away gaze
    pub look_away_start: Option<DateTime<Utc>>,

    /// Last time an alert fired, `None` until the first one
    pub last_alert_time: Option<DateTime<Utc>>,

    pub sound_enabled: bool,

    /// Cycles since the last snapshot
    pub frame_counter: u32,

    /// Timestamp of the previous cycle
    pub last_tick: DateTime<Utc>,

    /// Time of the last emitted snapshot (session start before the first)
    pub last_snapshot: DateTime<Utc>,
}

impl SessionState {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            focus_score: FOCUS_MAX,
            look_away_start: None,
            last_alert_time: None,
            sound_enabled: true,
            frame_counter: 0,
            last_tick: started_at,
            last_snapshot: started_at,
        }
    }

    pub fn reset_score(&mut self) {
        self.focus_score = FOCUS_MAX;
    }
}

/// Tracks how long the user has been continuously looking away
#[derive(Debug, Clone)]
pub struct AwayTimer {
    threshold_secs: f64,
}

impl AwayTimer {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_secs: threshold_ms as f64 / 1000.0,
        }
    }

    /// Start the run on the first away cycle, clear it on any other gaze
    pub fn update(&self, look_away_start: &mut Option<DateTime<Utc>>, gaze: GazeClass, now: DateTime<Utc>) {
        if gaze == GazeClass::Away {
            look_away_start.get_or_insert(now);
        } else {
            *look_away_start = None;
        }
    }

    /// Whether the current away run has reached the threshold
    pub fn exceeded(&self, look_away_start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        look_away_start.is_some_and(|start| elapsed_secs(start, now) >= self.threshold_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(secs)
    }

    #[test]
    fn test_new_session_defaults() {
        let state = SessionState::new(at(0));
        assert_eq!(state.focus_score, 100);
        assert!(state.sound_enabled);
        assert!(state.look_away_start.is_none());
        assert!(state.last_alert_time.is_none());
        assert_eq!(state.last_tick, at(0));
    }

    #[test]
    fn test_away_run_resets_on_screen() {
        let timer = AwayTimer::new(10_000);
        let mut start = None;
        let mut exceeded = Vec::new();

        for (t, gaze) in [(0, GazeClass::Away), (4, GazeClass::Away), (8, GazeClass::Away)] {
            timer.update(&mut start, gaze, at(t));
            exceeded.push(timer.exceeded(start, at(t)));
        }
        assert_eq!(exceeded, vec![false, false, false]);
        assert_eq!(start, Some(at(0)));

        timer.update(&mut start, GazeClass::Screen, at(12));
        assert_eq!(start, None);
        assert!(!timer.exceeded(start, at(12)));
    }

    #[test]
    fn test_exceeded_once_threshold_reached() {
        let timer = AwayTimer::new(10_000);
        let mut start = None;

        for t in [0, 4, 8] {
            timer.update(&mut start, GazeClass::Away, at(t));
            assert!(!timer.exceeded(start, at(t)));
        }
        timer.update(&mut start, GazeClass::Away, at(10));
        assert!(timer.exceeded(start, at(10)));
        assert_eq!(start, Some(at(0)));
    }

    #[test]
    fn test_notebook_also_resets() {
        let timer = AwayTimer::new(10_000);
        let mut start = Some(at(0));
        timer.update(&mut start, GazeClass::Notebook, at(3));
        assert!(start.is_none());
    }

    #[test]
    fn test_exceeded_query_does_not_mutate() {
        let timer = AwayTimer::new(1_000);
        let start = Some(at(0));
        assert!(timer.exceeded(start, at(5)));
        assert_eq!(start, Some(at(0)));
    }

    #[test]
    fn test_elapsed_clamps_negative() {
        assert_eq!(elapsed_secs(at(10), at(5)), 0.0);
        assert_eq!(elapsed_secs(at(5), at(10)), 5.0);
    }
}
