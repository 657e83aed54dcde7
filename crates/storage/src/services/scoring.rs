use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::GulagStatus;

/// Point weights configured on an event, one per scored action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub kill: i32,
    pub revive: i32,
    pub gulag_win: i32,
    pub execution: i32,
    pub humiliation: i32,
    pub redeploy: i32,
    pub rage_quit: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            kill: 1,
            revive: 1,
            gulag_win: 1,
            execution: 1,
            humiliation: -1,
            redeploy: -1,
            rage_quit: -5,
        }
    }
}

/// Counters of one player in one game that feed the score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatLine {
    pub kills: i32,
    pub revives_done: i32,
    pub gulag_status: GulagStatus,
    pub executions_done: i32,
    pub executions_suffered: i32,
    pub redeploys_received: i32,
    pub rage_quit: bool,
}

/// Largest score the `NUMERIC(10, 2)` stats column can hold, 99_999_999.99
pub const MAX_STORED_SCORE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Score of a stat line under the given weights.
///
/// Only the kill term is scaled by `kill_multiplier`. Every term is a `Decimal`,
/// so no combination of `i32` counters and weights can overflow.
pub fn compute_score(line: &StatLine, weights: &ScoreWeights, kill_multiplier: Decimal) -> Decimal {
    let term = |count: i32, weight: i32| Decimal::from(count) * Decimal::from(weight);

    let mut score = term(line.kills, weights.kill) * kill_multiplier
        + term(line.revives_done, weights.revive)
        + term(line.redeploys_received, weights.redeploy)
        + term(line.executions_done, weights.execution)
        + term(line.executions_suffered, weights.humiliation);

    if line.gulag_status == GulagStatus::Won {
        score += Decimal::from(weights.gulag_win);
    }
    if line.rage_quit {
        score += Decimal::from(weights.rage_quit);
    }

    score.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line() -> StatLine {
        StatLine {
            kills: 4,
            revives_done: 2,
            gulag_status: GulagStatus::Won,
            executions_done: 1,
            executions_suffered: 1,
            redeploys_received: 1,
            rage_quit: false,
        }
    }

    #[test]
    fn zero_counters_score_zero() {
        let score = compute_score(&StatLine::default(), &ScoreWeights::default(), Decimal::ONE);
        assert_eq!(score, Decimal::ZERO);
    }

    #[test]
    fn default_weights_sum_every_term() {
        // 4 kills + 2 revives + 1 gulag - 1 redeploy + 1 execution - 1 humiliation
        let score = compute_score(&line(), &ScoreWeights::default(), Decimal::ONE);
        assert_eq!(score, dec!(6));
    }

    #[test]
    fn rage_quit_applies_penalty_once() {
        let mut quitter = line();
        quitter.rage_quit = true;
        let score = compute_score(&quitter, &ScoreWeights::default(), Decimal::ONE);
        assert_eq!(score, dec!(1));
    }

    #[test]
    fn lost_or_skipped_gulag_scores_nothing() {
        let weights = ScoreWeights::default();
        let mut lost = line();
        lost.gulag_status = GulagStatus::Lost;
        let mut skipped = line();
        skipped.gulag_status = GulagStatus::NotPlayed;

        assert_eq!(compute_score(&lost, &weights, Decimal::ONE), dec!(5));
        assert_eq!(compute_score(&skipped, &weights, Decimal::ONE), dec!(5));
    }

    #[test]
    fn multiplier_scales_only_kills() {
        let weights = ScoreWeights {
            kill: 2,
            ..ScoreWeights::default()
        };
        let base = compute_score(&line(), &weights, Decimal::ONE);
        let boosted = compute_score(&line(), &weights, dec!(1.5));

        // 4 kills * 2 points * 0.5 extra
        assert_eq!(boosted - base, dec!(4));
    }

    #[test]
    fn score_is_monotonic_in_positive_weights() {
        let weights = ScoreWeights::default();
        let base = compute_score(&StatLine::default(), &weights, Decimal::ONE);

        let bumps = [
            StatLine { kills: 1, ..StatLine::default() },
            StatLine { revives_done: 1, ..StatLine::default() },
            StatLine { gulag_status: GulagStatus::Won, ..StatLine::default() },
            StatLine { executions_done: 1, ..StatLine::default() },
        ];

        for bumped in bumps {
            assert!(compute_score(&bumped, &weights, Decimal::ONE) > base, "{bumped:?}");
        }

        let more_kills = StatLine { kills: 10, ..StatLine::default() };
        let fewer_kills = StatLine { kills: 9, ..StatLine::default() };
        assert!(
            compute_score(&more_kills, &weights, dec!(2.5))
                > compute_score(&fewer_kills, &weights, dec!(2.5))
        );
    }

    #[test]
    fn custom_negative_weights_are_respected() {
        let weights = ScoreWeights {
            kill: 0,
            revive: 0,
            gulag_win: 0,
            execution: 0,
            humiliation: -3,
            redeploy: -2,
            rage_quit: -10,
        };
        let mut sad = line();
        sad.rage_quit = true;
        sad.executions_suffered = 2;
        sad.redeploys_received = 3;

        assert_eq!(compute_score(&sad, &weights, Decimal::ONE), dec!(-22));
    }

    #[test]
    fn extreme_counters_and_weights_do_not_overflow() {
        let line = StatLine {
            kills: i32::MAX,
            revives_done: i32::MAX,
            gulag_status: GulagStatus::Won,
            executions_done: i32::MAX,
            executions_suffered: 0,
            redeploys_received: i32::MAX,
            rage_quit: true,
        };
        let weights = ScoreWeights {
            kill: i32::MAX,
            revive: i32::MAX,
            gulag_win: i32::MAX,
            execution: i32::MAX,
            humiliation: i32::MIN,
            redeploy: i32::MAX,
            rage_quit: i32::MAX,
        };

        let score = compute_score(&line, &weights, dec!(10));
        assert!(score > Decimal::ZERO);
    }

    #[test]
    fn largest_accepted_input_fits_the_stats_column() {
        // 1000 per counter, +/-1000 per weight, kill multiplier up to 10
        let line = StatLine {
            kills: 1_000,
            revives_done: 1_000,
            gulag_status: GulagStatus::Won,
            executions_done: 1_000,
            executions_suffered: 1_000,
            redeploys_received: 1_000,
            rage_quit: true,
        };
        let best = ScoreWeights {
            kill: 1_000,
            revive: 1_000,
            gulag_win: 1_000,
            execution: 1_000,
            humiliation: 1_000,
            redeploy: 1_000,
            rage_quit: 1_000,
        };
        let worst = ScoreWeights {
            kill: -1_000,
            revive: -1_000,
            gulag_win: -1_000,
            execution: -1_000,
            humiliation: -1_000,
            redeploy: -1_000,
            rage_quit: -1_000,
        };

        assert_eq!(MAX_STORED_SCORE, dec!(99999999.99));
        assert!(compute_score(&line, &best, dec!(10)) <= MAX_STORED_SCORE);
        assert!(compute_score(&line, &worst, dec!(10)) >= -MAX_STORED_SCORE);
    }
}
