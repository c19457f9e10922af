//! Focus score integration

use crate::config::{ScoreRates, ScoringModel};
use crate::state::{FOCUS_MAX, FOCUS_MIN};
use crate::status::Status;

/// Advances the bounded focus score once per cycle
#[derive(Debug, Clone)]
pub struct ScoreIntegrator {
    model: ScoringModel,
    rates: ScoreRates,
}

impl ScoreIntegrator {
    pub fn new(model: ScoringModel, rates: ScoreRates) -> Self {
        Self { model, rates }
    }

    /// Points per second for a status
    pub fn rate(&self, status: Status) -> f64 {
        match status {
            Status::FocusedScreen | Status::FocusedNotebook => self.rates.focused,
            Status::TemporaryGlanceAway => self.rates.glance,
            Status::PhoneDetected => self.rates.phone,
            Status::NoOrMultipleFace | Status::AwayTooLong => self.rates.not_focused,
        }
    }

    /// Next score after `dt_secs` in `status`, clamped to [0, 100].
    ///
    /// Time-weighted steps are truncated toward zero, so sub-point changes
    /// are dropped rather than carried into the next cycle.
    pub fn advance(&self, score: i32, status: Status, phone_detected: bool, dt_secs: f64) -> i32 {
        let delta = match self.model {
            ScoringModel::TimeWeighted => {
                let dt = dt_secs.max(0.0);
                // `as` saturates on overflow and maps NaN to 0
                (self.rate(status) * dt).trunc() as i32
            }
            ScoringModel::PerCycle => {
                if !status.is_focused() || phone_detected {
                    -2
                } else {
                    1
                }
            }
        };
        score.saturating_add(delta).clamp(FOCUS_MIN, FOCUS_MAX)
    }
}

impl Default for ScoreIntegrator {
    fn default() -> Self {
        Self::new(ScoringModel::default(), ScoreRates::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [Status; 6] = [
        Status::NoOrMultipleFace,
        Status::PhoneDetected,
        Status::FocusedScreen,
        Status::FocusedNotebook,
        Status::AwayTooLong,
        Status::TemporaryGlanceAway,
    ];

    #[test]
    fn test_focused_second_adds_twenty() {
        let scorer = ScoreIntegrator::default();
        assert_eq!(scorer.advance(50, Status::FocusedScreen, false, 1.0), 70);
        assert_eq!(scorer.advance(95, Status::FocusedNotebook, false, 1.0), 100);
    }

    #[test]
    fn test_phone_second_floors_at_zero() {
        let scorer = ScoreIntegrator::default();
        assert_eq!(scorer.advance(10, Status::PhoneDetected, true, 1.0), 0);
    }

    #[test]
    fn test_rates_per_status() {
        let scorer = ScoreIntegrator::default();
        assert_eq!(scorer.advance(50, Status::TemporaryGlanceAway, false, 2.0), 60);
        assert_eq!(scorer.advance(50, Status::AwayTooLong, false, 2.0), 20);
        assert_eq!(scorer.advance(50, Status::NoOrMultipleFace, false, 1.0), 35);
    }

    #[test]
    fn test_sub_point_steps_are_dropped() {
        let scorer = ScoreIntegrator::default();
        // 20 * 0.033 = 0.66 and 5 * 0.1 = 0.5 both truncate to 0
        assert_eq!(scorer.advance(50, Status::FocusedScreen, false, 0.033), 50);
        assert_eq!(scorer.advance(50, Status::TemporaryGlanceAway, false, 0.1), 50);
        // -25 * 0.5 = -12.5 truncates toward zero
        assert_eq!(scorer.advance(50, Status::PhoneDetected, true, 0.5), 38);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let scorer = ScoreIntegrator::default();
        assert_eq!(scorer.advance(40, Status::PhoneDetected, true, -3.0), 40);
    }

    #[test]
    fn test_per_cycle_model() {
        let scorer = ScoreIntegrator::new(ScoringModel::PerCycle, ScoreRates::default());
        assert_eq!(scorer.advance(50, Status::FocusedScreen, false, 10.0), 51);
        assert_eq!(scorer.advance(50, Status::AwayTooLong, false, 0.0), 48);
        assert_eq!(scorer.advance(1, Status::PhoneDetected, true, 0.0), 0);
        assert_eq!(scorer.advance(100, Status::TemporaryGlanceAway, false, 0.0), 100);
        // Phone in view with no face still counts as distracted
        assert_eq!(scorer.advance(50, Status::NoOrMultipleFace, true, 0.0), 48);
    }

    proptest! {
        #[test]
        fn prop_score_stays_bounded(
            steps in proptest::collection::vec((0usize..6, 0.0f64..10_000.0), 1..100),
            per_cycle in any::<bool>(),
        ) {
            let model = if per_cycle { ScoringModel::PerCycle } else { ScoringModel::TimeWeighted };
            let scorer = ScoreIntegrator::new(model, ScoreRates::default());
            let mut score = FOCUS_MAX;
            for (idx, dt) in steps {
                let status = ALL[idx];
                score = scorer.advance(score, status, status == Status::PhoneDetected, dt);
                prop_assert!((FOCUS_MIN..=FOCUS_MAX).contains(&score));
            }
        }
    }
}
