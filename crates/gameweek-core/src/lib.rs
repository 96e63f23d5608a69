// Expected-points scoring engine: fixture difficulty, player scoring, and
// squad selection. Everything here is pure and synchronous; fetching and
// reporting live in the other workspace crates.

pub mod difficulty;
pub mod model;
pub mod scoring;
pub mod selection;

pub use difficulty::{DifficultyError, DifficultyMap, DuplicatePolicy, FixtureDifficultyIndex};
pub use model::{Availability, Fixture, Player, PlayerId, Position, ScoredPlayer, Team, TeamId};
pub use scoring::{score_players, HeuristicStrategy, RegressionStrategy, ScoringStrategy, ScoringTables};
pub use selection::{BudgetPolicy, Quotas, SelectionError, Squad};
