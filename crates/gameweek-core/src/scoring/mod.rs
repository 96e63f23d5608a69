// Scoring engine: expected points per player for the target round.

pub mod heuristic;
pub mod regression;

pub use heuristic::{HeuristicStrategy, PointWeights, ScoringTables};
pub use regression::{FitReport, RegressionError, RegressionStrategy};

use crate::difficulty::DifficultyMap;
use crate::model::{Player, ScoredPlayer};

/// A way of turning a player snapshot and the round's difficulty map into
/// an expected-points value. Implementations must be pure.
pub trait ScoringStrategy {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    fn score(&self, player: &Player, difficulty: &DifficultyMap) -> f64;
}

/// Score every player, preserving input order.
pub fn score_players<S>(strategy: &S, players: &[Player], difficulty: &DifficultyMap) -> Vec<ScoredPlayer>
where
    S: ScoringStrategy + ?Sized,
{
    players
        .iter()
        .map(|p| ScoredPlayer {
            player: p.clone(),
            expected_points: strategy.score(p, difficulty),
        })
        .collect()
}
