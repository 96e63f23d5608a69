// Core records: fixtures, players, teams, and the scored/selected outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TeamId = u32;
pub type PlayerId = u32;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Playing position. `Unknown` covers element types the scorer has no
/// weights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    Unknown,
}

impl Position {
    /// Squad positions in display order.
    pub const SQUAD_ORDER: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Map an FPL `element_type` (1 = GK, 2 = DEF, 3 = MID, 4 = FWD).
    pub fn from_element_type(element_type: u8) -> Self {
        match element_type {
            1 => Position::Goalkeeper,
            2 => Position::Defender,
            3 => Position::Midfielder,
            4 => Position::Forward,
            _ => Position::Unknown,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
            Position::Unknown => "UNK",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    Active,
    Doubtful,
    Unavailable,
}

impl Availability {
    /// Map an FPL status code. `a` is active, `d` doubtful; injured,
    /// suspended, unavailable and not-in-squad all collapse to `Unavailable`.
    pub fn from_status(status: &str) -> Self {
        match status.trim() {
            "a" => Availability::Active,
            "d" => Availability::Doubtful,
            _ => Availability::Unavailable,
        }
    }
}

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// One scheduled match. Difficulty ratings are 1 (easiest) to 5 (hardest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub round: u32,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_difficulty: u8,
    pub away_difficulty: u8,
    pub finished: bool,
    pub kickoff_time: Option<DateTime<Utc>>,
}

/// Cumulative season snapshot for a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamId,
    pub position: Position,
    pub minutes: u32,
    pub goals: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    /// Price in tenths of a million (FPL `now_cost`).
    pub cost_tenths: u32,
    pub availability: Availability,
    /// Percent chance of playing this round; `None` when the source has no flag.
    pub chance_of_playing: Option<u8>,
    pub form: f64,
}

impl Player {
    /// Price in millions.
    pub fn cost(&self) -> f64 {
        self.cost_tenths as f64 / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub short_name: String,
}

// ---------------------------------------------------------------------------
// Derived records
// ---------------------------------------------------------------------------

/// A player with the expected points computed for the target round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPlayer {
    pub player: Player,
    pub expected_points: f64,
}
