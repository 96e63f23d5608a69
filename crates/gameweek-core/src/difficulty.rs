// Fixture difficulty index for the next unplayed round.
//
// Picks the earliest round that still has an unfinished fixture and records,
// for every team playing in it, the difficulty rating of that fixture.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Fixture, TeamId};

/// Rating assumed for a team with no fixture in the target round.
pub const NEUTRAL_DIFFICULTY: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DifficultyError {
    #[error("no upcoming round: every fixture is finished")]
    NoUpcomingRound,
}

/// How to resolve a team that appears in more than one fixture of the
/// target round (double gameweeks, data glitches).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The fixture seen last overwrites earlier ones.
    #[default]
    LastWriteWins,
    /// The first fixture seen is kept; later ones are ignored.
    FirstSeenWins,
}

// ---------------------------------------------------------------------------
// DifficultyMap
// ---------------------------------------------------------------------------

/// Per-team difficulty for exactly one round.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyMap {
    round: u32,
    first_kickoff: Option<DateTime<Utc>>,
    ratings: HashMap<TeamId, u8>,
}

impl DifficultyMap {
    /// Build a map directly from ratings. Mostly useful for tests and for
    /// callers that already know the schedule.
    pub fn from_ratings(round: u32, ratings: HashMap<TeamId, u8>) -> Self {
        Self {
            round,
            first_kickoff: None,
            ratings,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Earliest kickoff among the round's fixtures, when the source carries times.
    pub fn first_kickoff(&self) -> Option<DateTime<Utc>> {
        self.first_kickoff
    }

    /// Difficulty rating for `team`, or [`NEUTRAL_DIFFICULTY`] if the team
    /// has no fixture in the round.
    pub fn difficulty_for(&self, team: TeamId) -> u8 {
        self.ratings
            .get(&team)
            .copied()
            .unwrap_or(NEUTRAL_DIFFICULTY)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FixtureDifficultyIndex
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureDifficultyIndex {
    policy: DuplicatePolicy,
}

impl FixtureDifficultyIndex {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Build the difficulty map for the next unplayed round.
    ///
    /// The target round is the minimum `round` among unfinished fixtures.
    /// All fixtures of that round contribute, including any that already
    /// finished (early kickoffs of a round in progress).
    pub fn build(&self, fixtures: &[Fixture]) -> Result<DifficultyMap, DifficultyError> {
        let round = next_round(fixtures).ok_or(DifficultyError::NoUpcomingRound)?;

        let mut ratings: HashMap<TeamId, u8> = HashMap::new();
        let mut first_kickoff: Option<DateTime<Utc>> = None;

        for fixture in fixtures.iter().filter(|f| f.round == round) {
            self.record(&mut ratings, fixture.home_team, fixture.home_difficulty);
            self.record(&mut ratings, fixture.away_team, fixture.away_difficulty);

            if let Some(kickoff) = fixture.kickoff_time {
                first_kickoff = Some(match first_kickoff {
                    Some(current) => current.min(kickoff),
                    None => kickoff,
                });
            }
        }

        Ok(DifficultyMap {
            round,
            first_kickoff,
            ratings,
        })
    }

    fn record(&self, ratings: &mut HashMap<TeamId, u8>, team: TeamId, difficulty: u8) {
        match self.policy {
            DuplicatePolicy::LastWriteWins => {
                ratings.insert(team, difficulty);
            }
            DuplicatePolicy::FirstSeenWins => {
                ratings.entry(team).or_insert(difficulty);
            }
        }
    }
}

/// The earliest round with at least one unfinished fixture.
pub fn next_round(fixtures: &[Fixture]) -> Option<u32> {
    fixtures
        .iter()
        .filter(|f| !f.finished)
        .map(|f| f.round)
        .min()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture(round: u32, home: TeamId, away: TeamId, hd: u8, ad: u8, finished: bool) -> Fixture {
        Fixture {
            round,
            home_team: home,
            away_team: away,
            home_difficulty: hd,
            away_difficulty: ad,
            finished,
            kickoff_time: None,
        }
    }

    #[test]
    fn target_round_is_earliest_unfinished() {
        let fixtures = vec![
            fixture(1, 1, 2, 2, 4, true),
            fixture(3, 1, 3, 5, 1, false),
            fixture(2, 1, 4, 3, 3, false),
            fixture(2, 2, 3, 4, 2, false),
        ];

        let map = FixtureDifficultyIndex::default().build(&fixtures).unwrap();
        assert_eq!(map.round(), 2);
        assert_eq!(map.len(), 4);
        assert_eq!(map.difficulty_for(1), 3);
        assert_eq!(map.difficulty_for(4), 3);
        assert_eq!(map.difficulty_for(2), 4);
        assert_eq!(map.difficulty_for(3), 2);
    }

    #[test]
    fn all_finished_is_an_error() {
        let fixtures = vec![fixture(1, 1, 2, 2, 4, true), fixture(2, 3, 4, 2, 4, true)];
        let err = FixtureDifficultyIndex::default().build(&fixtures).unwrap_err();
        assert_eq!(err, DifficultyError::NoUpcomingRound);
    }

    #[test]
    fn empty_fixture_list_is_an_error() {
        let err = FixtureDifficultyIndex::default().build(&[]).unwrap_err();
        assert_eq!(err, DifficultyError::NoUpcomingRound);
    }

    #[test]
    fn absent_team_defaults_to_neutral() {
        let fixtures = vec![fixture(5, 1, 2, 1, 5, false)];
        let map = FixtureDifficultyIndex::default().build(&fixtures).unwrap();
        assert_eq!(map.difficulty_for(99), NEUTRAL_DIFFICULTY);
    }

    #[test]
    fn finished_fixtures_of_the_target_round_still_count() {
        // Round 4 is in progress: one match played, one still to come.
        let fixtures = vec![fixture(4, 1, 2, 2, 4, true), fixture(4, 3, 4, 5, 1, false)];
        let map = FixtureDifficultyIndex::default().build(&fixtures).unwrap();
        assert_eq!(map.round(), 4);
        assert_eq!(map.difficulty_for(1), 2);
        assert_eq!(map.difficulty_for(4), 1);
    }

    #[test]
    fn duplicate_team_last_write_wins() {
        let fixtures = vec![fixture(7, 1, 2, 2, 4, false), fixture(7, 3, 1, 3, 5, false)];
        let map = FixtureDifficultyIndex::new(DuplicatePolicy::LastWriteWins)
            .build(&fixtures)
            .unwrap();
        assert_eq!(map.difficulty_for(1), 5);
    }

    #[test]
    fn duplicate_team_first_seen_wins() {
        let fixtures = vec![fixture(7, 1, 2, 2, 4, false), fixture(7, 3, 1, 3, 5, false)];
        let map = FixtureDifficultyIndex::new(DuplicatePolicy::FirstSeenWins)
            .build(&fixtures)
            .unwrap();
        assert_eq!(map.difficulty_for(1), 2);
        assert_eq!(map.difficulty_for(3), 3);
    }

    #[test]
    fn first_kickoff_is_earliest_in_round() {
        let early = Utc.with_ymd_and_hms(2024, 9, 14, 11, 30, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 9, 15, 15, 0, 0).unwrap();
        let other_round = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();

        let mut a = fixture(4, 1, 2, 2, 4, false);
        a.kickoff_time = Some(late);
        let mut b = fixture(4, 3, 4, 3, 3, false);
        b.kickoff_time = Some(early);
        let mut c = fixture(3, 5, 6, 3, 3, true);
        c.kickoff_time = Some(other_round);

        let map = FixtureDifficultyIndex::default().build(&[a, b, c]).unwrap();
        assert_eq!(map.first_kickoff(), Some(early));
    }

    #[test]
    fn next_round_ignores_finished() {
        let fixtures = vec![fixture(1, 1, 2, 2, 4, true), fixture(9, 1, 2, 2, 4, false)];
        assert_eq!(next_round(&fixtures), Some(9));
    }
}
