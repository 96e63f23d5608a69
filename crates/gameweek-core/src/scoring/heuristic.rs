// Lookup-table heuristic for expected points.
//
// Per-match rates of goals, assists and clean sheets are weighted by
// position, a small playing-time term is added, the sum is scaled by the
// fixture difficulty factor, and players with 60+ minutes get a flat bonus.

use crate::difficulty::DifficultyMap;
use crate::model::{Player, Position};
use crate::scoring::ScoringStrategy;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Points awarded per goal, assist and clean sheet for one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointWeights {
    pub goal: f64,
    pub assist: f64,
    pub clean_sheet: f64,
}

impl PointWeights {
    pub const ZERO: PointWeights = PointWeights {
        goal: 0.0,
        assist: 0.0,
        clean_sheet: 0.0,
    };
}

/// Immutable scoring configuration passed into [`HeuristicStrategy`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringTables {
    pub goalkeeper: PointWeights,
    pub defender: PointWeights,
    pub midfielder: PointWeights,
    pub forward: PointWeights,
    /// Multipliers for difficulty ratings 1..=5, index 0 is rating 1.
    pub difficulty_factors: [f64; 5],
    /// Minutes that count as one full match.
    pub minutes_per_match: f64,
    /// Points per minute-per-match.
    pub playing_time_rate: f64,
    /// Minutes needed for the durability bonus.
    pub bonus_minutes: u32,
    pub bonus_points: f64,
}

impl Default for ScoringTables {
    fn default() -> Self {
        Self {
            goalkeeper: PointWeights {
                goal: 10.0,
                assist: 3.0,
                clean_sheet: 4.0,
            },
            defender: PointWeights {
                goal: 6.0,
                assist: 3.0,
                clean_sheet: 4.0,
            },
            midfielder: PointWeights {
                goal: 5.0,
                assist: 3.0,
                clean_sheet: 1.0,
            },
            forward: PointWeights {
                goal: 4.0,
                assist: 3.0,
                clean_sheet: 0.0,
            },
            difficulty_factors: [1.2, 1.1, 1.0, 0.9, 0.8],
            minutes_per_match: 90.0,
            playing_time_rate: 0.01,
            bonus_minutes: 60,
            bonus_points: 1.0,
        }
    }
}

impl ScoringTables {
    pub fn weights(&self, position: Position) -> PointWeights {
        match position {
            Position::Goalkeeper => self.goalkeeper,
            Position::Defender => self.defender,
            Position::Midfielder => self.midfielder,
            Position::Forward => self.forward,
            Position::Unknown => PointWeights::ZERO,
        }
    }

    /// Multiplier for a difficulty rating; ratings outside 1..=5 are neutral.
    pub fn difficulty_factor(&self, rating: u8) -> f64 {
        match rating {
            1..=5 => self.difficulty_factors[(rating - 1) as usize],
            _ => 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct HeuristicStrategy {
    tables: ScoringTables,
}

impl HeuristicStrategy {
    pub fn new(tables: ScoringTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ScoringTables {
        &self.tables
    }

    /// Approximate matches played, floored at one so low-minute players
    /// neither divide by zero nor get inflated rates.
    pub fn games_played(&self, minutes: u32) -> f64 {
        (minutes as f64 / self.tables.minutes_per_match).max(1.0)
    }

    /// Score before the difficulty factor and bonus.
    pub fn raw_score(&self, player: &Player) -> f64 {
        let w = self.tables.weights(player.position);
        let games = self.games_played(player.minutes);

        (player.goals as f64 / games) * w.goal
            + (player.assists as f64 / games) * w.assist
            + (player.clean_sheets as f64 / games) * w.clean_sheet
            + (player.minutes as f64 / games) * self.tables.playing_time_rate
    }

    /// Raw score scaled by the team's difficulty factor.
    pub fn adjusted_score(&self, player: &Player, difficulty: &DifficultyMap) -> f64 {
        let rating = difficulty.difficulty_for(player.team);
        self.raw_score(player) * self.tables.difficulty_factor(rating)
    }
}

impl ScoringStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn score(&self, player: &Player, difficulty: &DifficultyMap) -> f64 {
        let mut points = self.adjusted_score(player, difficulty);
        if player.minutes >= self.tables.bonus_minutes {
            points += self.tables.bonus_points;
        }
        points
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
