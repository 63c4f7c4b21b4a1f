use serde::{Deserialize, Serialize};

use super::GameRecord;

/// Aggregate statistics across every round ever played.
///
/// Accuracy is always derived from the cumulative sums, never from an
/// average of per-round percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "StatisticsJson")]
pub struct Statistics {
    games_count: u32,
    best_game: Option<GameRecord>,
    total_correct: u64,
    total_questions: u64,
}

/// Serialized form; carries the derived accuracy next to the counters.
#[derive(Serialize)]
struct StatisticsJson {
    games_count: u32,
    best_game: Option<GameRecord>,
    total_accuracy: f64,
    total_correct: u64,
    total_questions: u64,
}

impl From<Statistics> for StatisticsJson {
    fn from(stats: Statistics) -> Self {
        Self {
            total_accuracy: stats.total_accuracy(),
            games_count: stats.games_count,
            best_game: stats.best_game,
            total_correct: stats.total_correct,
            total_questions: stats.total_questions,
        }
    }
}

impl Statistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate statistics from persisted counters.
    #[must_use]
    pub fn from_persisted(
        games_count: u32,
        best_game: Option<GameRecord>,
        total_correct: u64,
        total_questions: u64,
    ) -> Self {
        Self {
            games_count,
            best_game,
            total_correct,
            total_questions,
        }
    }

    /// Fold a finished game into the aggregate.
    ///
    /// The best game is replaced only when the new one has strictly more
    /// correct answers.
    pub fn record(&mut self, game: GameRecord) {
        self.games_count = self.games_count.saturating_add(1);
        self.total_correct = self.total_correct.saturating_add(u64::from(game.correct()));
        self.total_questions = self
            .total_questions
            .saturating_add(u64::from(game.total()));

        let replace = match &self.best_game {
            Some(best) => game.is_better_than(best),
            None => true,
        };
        if replace {
            self.best_game = Some(game);
        }
    }

    #[must_use]
    pub fn games_count(&self) -> u32 {
        self.games_count
    }

    #[must_use]
    pub fn best_game(&self) -> Option<&GameRecord> {
        self.best_game.as_ref()
    }

    #[must_use]
    pub fn total_correct(&self) -> u64 {
        self.total_correct
    }

    #[must_use]
    pub fn total_questions(&self) -> u64 {
        self.total_questions
    }

    /// Percentage of correct answers over all questions ever answered.
    ///
    /// Returns `0.0` before the first game.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.total_correct as f64 / self.total_questions as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn game(correct: u32, total: u32, minutes: i64) -> GameRecord {
        GameRecord::new(correct, total, fixed_now() + Duration::minutes(minutes)).unwrap()
    }

    #[test]
    fn empty_statistics_have_zero_accuracy() {
        let stats = Statistics::new();
        assert_eq!(stats.games_count(), 0);
        assert!(stats.best_game().is_none());
        assert!(stats.total_accuracy().abs() < f64::EPSILON);
    }

    #[test]
    fn best_game_keeps_earlier_record_on_lower_or_equal_score() {
        let mut stats = Statistics::new();
        stats.record(game(5, 10, 0));
        stats.record(game(3, 10, 1));
        stats.record(game(5, 10, 2));

        let best = stats.best_game().unwrap();
        assert_eq!(best.correct(), 5);
        assert_eq!(best.total(), 10);
        assert_eq!(best.date(), fixed_now());
        assert_eq!(stats.games_count(), 3);
    }

    #[test]
    fn best_game_moves_on_strictly_greater_score() {
        let mut stats = Statistics::new();
        stats.record(game(5, 10, 0));
        stats.record(game(8, 10, 1));
        assert_eq!(stats.best_game().unwrap().correct(), 8);
        assert_eq!(
            stats.best_game().unwrap().date(),
            fixed_now() + Duration::minutes(1)
        );
    }

    #[test]
    fn accuracy_uses_cumulative_sums() {
        let rounds = [(7, 10), (1, 3), (0, 10), (9, 9), (2, 7)];
        let mut stats = Statistics::new();
        for (i, (c, t)) in rounds.iter().enumerate() {
            stats.record(game(*c, *t, i64::try_from(i).unwrap()));
        }

        let sum_correct: u32 = rounds.iter().map(|(c, _)| c).sum();
        let sum_total: u32 = rounds.iter().map(|(_, t)| t).sum();
        let expected = f64::from(sum_correct) / f64::from(sum_total) * 100.0;

        assert_eq!(stats.total_correct(), u64::from(sum_correct));
        assert_eq!(stats.total_questions(), u64::from(sum_total));
        assert!((stats.total_accuracy() - expected).abs() < 1e-12);
    }

    #[test]
    fn serializes_to_json() {
        let mut stats = Statistics::new();
        stats.record(game(7, 10, 0));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["games_count"], 1);
        assert_eq!(json["best_game"]["correct"], 7);
        assert!((json["total_accuracy"].as_f64().unwrap() - 70.0).abs() < 1e-9);

        let back: Statistics = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
    }
}
