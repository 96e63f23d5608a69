// FPL JSON decoding.
//
// Turns the `bootstrap-static` and `fixtures` payloads into core records.
// Individual records that fail to decode or carry impossible values are
// skipped with a warning; only a payload of the wrong overall shape is an
// error.

use chrono::{DateTime, Utc};
use gameweek_core::{Availability, Fixture, Player, Position, Team};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::source::PlayerFeed;

// ---------------------------------------------------------------------------
// Raw serde structs (private)
// ---------------------------------------------------------------------------

/// Top-level `bootstrap-static` payload. Records are kept as raw values so a
/// single bad element does not sink the whole payload.
#[derive(Debug, Deserialize)]
struct RawBootstrap {
    elements: Vec<serde_json::Value>,
    #[serde(default)]
    teams: Vec<serde_json::Value>,
}

/// One entry of `elements`. Unused columns are ignored.
#[derive(Debug, Deserialize)]
struct RawElement {
    id: u32,
    #[serde(default)]
    web_name: String,
    team: u32,
    element_type: u8,
    minutes: u32,
    goals_scored: u32,
    assists: u32,
    clean_sheets: u32,
    now_cost: u32,
    #[serde(default)]
    status: String,
    #[serde(default)]
    chance_of_playing_this_round: Option<u8>,
    /// FPL serves form as a decimal string ("5.2").
    #[serde(default)]
    form: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: u32,
    name: String,
    #[serde(default)]
    short_name: String,
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    /// Null for fixtures that have not been scheduled into a round.
    event: Option<u32>,
    team_h: u32,
    team_a: u32,
    team_h_difficulty: u8,
    team_a_difficulty: u8,
    #[serde(default)]
    finished: bool,
    #[serde(default)]
    kickoff_time: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_form(raw: Option<&str>) -> f64 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!("unparseable form value '{}', using 0.0", s);
                0.0
            }
        },
        None => 0.0,
    }
}

fn valid_difficulty(d: u8) -> bool {
    (1..=5).contains(&d)
}

fn decode_element(raw: RawElement) -> Player {
    let position = Position::from_element_type(raw.element_type);
    if position == Position::Unknown {
        debug!(
            "player {} '{}' has unknown element_type {}",
            raw.id, raw.web_name, raw.element_type
        );
    }
    Player {
        id: raw.id,
        name: raw.web_name.trim().to_string(),
        team: raw.team,
        position,
        minutes: raw.minutes,
        goals: raw.goals_scored,
        assists: raw.assists,
        clean_sheets: raw.clean_sheets,
        cost_tenths: raw.now_cost,
        availability: Availability::from_status(&raw.status),
        chance_of_playing: raw.chance_of_playing_this_round.map(|c| c.min(100)),
        form: parse_form(raw.form.as_deref()),
    }
}

// ---------------------------------------------------------------------------
// Public decoders
// ---------------------------------------------------------------------------

/// Decode a `bootstrap-static` payload into players and teams.
pub fn decode_bootstrap(json: &str) -> Result<PlayerFeed, serde_json::Error> {
    let raw: RawBootstrap = serde_json::from_str(json)?;

    let mut players = Vec::with_capacity(raw.elements.len());
    for value in raw.elements {
        match serde_json::from_value::<RawElement>(value) {
            Ok(el) => players.push(decode_element(el)),
            Err(e) => warn!("skipping malformed player record: {}", e),
        }
    }

    let mut teams = Vec::with_capacity(raw.teams.len());
    for value in raw.teams {
        match serde_json::from_value::<RawTeam>(value) {
            Ok(t) => teams.push(Team {
                id: t.id,
                name: t.name.trim().to_string(),
                short_name: t.short_name.trim().to_string(),
            }),
            Err(e) => warn!("skipping malformed team record: {}", e),
        }
    }

    Ok(PlayerFeed { players, teams })
}

/// Decode a `fixtures` payload. Fixtures without a round are skipped, as are
/// fixtures whose difficulty ratings fall outside 1..=5.
pub fn decode_fixtures(json: &str) -> Result<Vec<Fixture>, serde_json::Error> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;

    let mut fixtures = Vec::with_capacity(raw.len());
    let mut unscheduled = 0usize;
    for value in raw {
        let fx = match serde_json::from_value::<RawFixture>(value) {
            Ok(fx) => fx,
            Err(e) => {
                warn!("skipping malformed fixture record: {}", e);
                continue;
            }
        };

        let Some(round) = fx.event else {
            unscheduled += 1;
            continue;
        };

        if !valid_difficulty(fx.team_h_difficulty) || !valid_difficulty(fx.team_a_difficulty) {
            warn!(
                "skipping fixture {} v {} in round {}: difficulty out of range ({}, {})",
                fx.team_h, fx.team_a, round, fx.team_h_difficulty, fx.team_a_difficulty
            );
            continue;
        }

        fixtures.push(Fixture {
            round,
            home_team: fx.team_h,
            away_team: fx.team_a,
            home_difficulty: fx.team_h_difficulty,
            away_difficulty: fx.team_a_difficulty,
            finished: fx.finished,
            kickoff_time: fx.kickoff_time,
        });
    }

    if unscheduled > 0 {
        warn!("ignored {} fixtures with no round assigned", unscheduled);
    }

    Ok(fixtures)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
