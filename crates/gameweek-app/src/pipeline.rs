// One report cycle: fetch, index difficulty, score, filter, rank, select.
//
// Fetching is async and goes through a `DataSource`; everything after the
// fetch is the synchronous core, run by `evaluate` so tests can drive it with
// in-memory records.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use gameweek_core::scoring::FitReport;
use gameweek_core::selection::{
    default_minutes_threshold, exclude_unavailable, likely_to_play, rank_by_expected_points,
    select_squad_with_policy,
};
use gameweek_core::{
    score_players, Fixture, FixtureDifficultyIndex, HeuristicStrategy, RegressionStrategy, ScoredPlayer,
    ScoringStrategy, SelectionError, Squad, Team, TeamId,
};
use gameweek_fpl::{DataSource, FplClient, PlayerFeed, SnapshotSource};
use tracing::{info, warn};

use crate::config::{Config, SourceKind, StrategyKind};

/// Everything a cycle produced, ready for rendering.
#[derive(Debug)]
pub struct CycleReport {
    pub round: u32,
    pub first_kickoff: Option<DateTime<Utc>>,
    /// Name of the scoring strategy used.
    pub strategy: &'static str,
    /// Present when the regression strategy was fit this cycle.
    pub fit: Option<FitReport>,
    pub minutes_threshold: u32,
    /// Every eligible player above the threshold, best first.
    pub ranked: Vec<ScoredPlayer>,
    /// `None` when squad selection is disabled.
    pub squad: Option<Result<Squad, SelectionError>>,
    pub teams: HashMap<TeamId, Team>,
}

impl CycleReport {
    pub fn team_short_name(&self, team: TeamId) -> &str {
        self.teams.get(&team).map(|t| t.short_name.as_str()).unwrap_or("???")
    }
}

/// Construct the configured data source.
pub fn build_source(config: &Config) -> anyhow::Result<Box<dyn DataSource>> {
    let source = &config.source;
    match source.kind {
        SourceKind::Api => {
            let client = FplClient::new(source.base_url.clone(), Duration::from_secs(source.timeout_secs))
                .context("failed to build HTTP client")?;
            Ok(Box::new(client))
        }
        SourceKind::Files => Ok(Box::new(SnapshotSource::new(
            source.bootstrap_path.clone(),
            source.fixtures_path.clone(),
        ))),
    }
}

/// Fetch players then fixtures from `source` and evaluate them.
pub async fn run_cycle(config: &Config, source: &dyn DataSource) -> anyhow::Result<CycleReport> {
    info!("Fetching data from {}", source.describe());

    let feed = source.fetch_players().await.context("failed to fetch players")?;
    info!("Loaded {} players across {} teams", feed.players.len(), feed.teams.len());

    let fixtures = source.fetch_fixtures().await.context("failed to fetch fixtures")?;
    info!("Loaded {} fixtures", fixtures.len());

    evaluate(config, feed, &fixtures)
}

/// The synchronous part of a cycle.
pub fn evaluate(config: &Config, feed: PlayerFeed, fixtures: &[Fixture]) -> anyhow::Result<CycleReport> {
    let index = FixtureDifficultyIndex::new(config.scoring.duplicate_policy);
    let difficulty = index
        .build(fixtures)
        .context("cannot determine the round to score")?;
    info!(
        "Target round {} ({} teams rated, first kickoff {:?})",
        difficulty.round(),
        difficulty.len(),
        difficulty.first_kickoff()
    );

    let heuristic = HeuristicStrategy::default();
    let (scored, strategy_name, fit) = match config.scoring.strategy {
        StrategyKind::Heuristic => {
            let scored = score_players(&heuristic, &feed.players, &difficulty);
            (scored, heuristic.name(), None)
        }
        StrategyKind::Regression => {
            let model = RegressionStrategy::fit_to(&feed.players, &heuristic, &difficulty)
                .context("failed to fit regression model")?;
            let report = model.report();
            match report.test_mse {
                Some(mse) => info!(
                    "Regression fit on {} rows, held-out MSE {:.4} over {} rows",
                    report.train_rows, mse, report.test_rows
                ),
                None => info!("Regression fit on {} rows, nothing held out", report.train_rows),
            }
            let scored = score_players(&model, &feed.players, &difficulty);
            (scored, model.name(), Some(report))
        }
    };

    let ranking = &config.ranking;
    let before = scored.len();
    let pool = if ranking.exclude_unavailable {
        exclude_unavailable(&scored)
    } else {
        scored
    };
    let pool = likely_to_play(&pool, ranking.min_chance_of_playing);
    if pool.len() < before {
        info!(
            "Availability filters removed {} of {} players",
            before - pool.len(),
            before
        );
    }

    let minutes_threshold = ranking
        .min_minutes_threshold
        .unwrap_or_else(|| default_minutes_threshold(difficulty.round()));
    let ranked = rank_by_expected_points(&pool, minutes_threshold);
    info!("{} players ranked above {} minutes", ranked.len(), minutes_threshold);

    let squad = if config.squad.enabled {
        let result = select_squad_with_policy(
            &pool,
            config.squad.budget,
            &config.squad.quotas,
            config.squad.budget_policy,
        );
        match &result {
            Ok(squad) => info!(
                "Selected {} players for {:.1}m, {:.2} expected points",
                squad.len(),
                squad.total_cost(),
                squad.expected_points()
            ),
            Err(e) => warn!("Squad selection failed: {}", e),
        }
        Some(result)
    } else {
        None
    };

    let teams = feed.teams.into_iter().map(|t| (t.id, t)).collect();

    Ok(CycleReport {
        round: difficulty.round(),
        first_kickoff: difficulty.first_kickoff(),
        strategy: strategy_name,
        fit,
        minutes_threshold,
        ranked,
        squad,
        teams,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputConfig, RankingConfig, ScoringConfig, SourceConfig, SquadConfig};
    use gameweek_core::{Availability, BudgetPolicy, DuplicatePolicy, Player, Position, Quotas};

    fn make_config() -> Config {
        Config {
            source: SourceConfig {
                kind: SourceKind::Files,
                base_url: String::new(),
                timeout_secs: 30,
                bootstrap_path: "b.json".into(),
                fixtures_path: "f.json".into(),
            },
            scoring: ScoringConfig {
                strategy: StrategyKind::Heuristic,
                duplicate_policy: DuplicatePolicy::LastWriteWins,
            },
            ranking: RankingConfig {
                min_minutes_threshold: Some(0),
                top_n: 10,
                min_chance_of_playing: 75,
                exclude_unavailable: true,
            },
            squad: SquadConfig {
                enabled: true,
                budget: 100.0,
                quotas: Quotas {
                    goalkeepers: 1,
                    defenders: 1,
                    midfielders: 1,
                    forwards: 1,
                },
                budget_policy: BudgetPolicy::Reject,
            },
            output: OutputConfig::default(),
        }
    }

    fn make_player(id: u32, team: u32, position: Position, minutes: u32, goals: u32, cost_tenths: u32) -> Player {
        Player {
            id,
            name: format!("P{id}"),
            team,
            position,
            minutes,
            goals,
            assists: 0,
            clean_sheets: 0,
            cost_tenths,
            availability: Availability::Active,
            chance_of_playing: None,
            form: 0.0,
        }
    }

    fn make_fixture(round: u32, home: u32, away: u32, hd: u8, ad: u8, finished: bool) -> Fixture {
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

    fn make_feed() -> PlayerFeed {
        PlayerFeed {
            players: vec![
                make_player(1, 1, Position::Goalkeeper, 900, 0, 45),
                make_player(2, 1, Position::Defender, 900, 1, 50),
                make_player(3, 2, Position::Midfielder, 900, 4, 80),
                make_player(4, 2, Position::Forward, 900, 6, 90),
                make_player(5, 2, Position::Forward, 90, 0, 45),
            ],
            teams: vec![
                Team {
                    id: 1,
                    name: "Arsenal".into(),
                    short_name: "ARS".into(),
                },
                Team {
                    id: 2,
                    name: "Brentford".into(),
                    short_name: "BRE".into(),
                },
            ],
        }
    }

    fn fixtures() -> Vec<Fixture> {
        vec![make_fixture(1, 1, 2, 3, 3, true), make_fixture(2, 1, 2, 2, 4, false)]
    }

    #[test]
    fn evaluates_round_ranking_and_squad() {
        let report = evaluate(&make_config(), make_feed(), &fixtures()).unwrap();

        assert_eq!(report.round, 2);
        assert_eq!(report.strategy, "heuristic");
        assert!(report.fit.is_none());
        assert_eq!(report.ranked.len(), 5);
        for pair in report.ranked.windows(2) {
            assert!(pair[0].expected_points >= pair[1].expected_points);
        }

        let squad = report.squad.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(squad.len(), 4);
        assert_eq!(squad.players_at(Position::Forward)[0].player.id, 4);
        assert_eq!(report.team_short_name(2), "BRE");
        assert_eq!(report.team_short_name(99), "???");
    }

    #[test]
    fn derives_threshold_from_round_when_unset() {
        let mut config = make_config();
        config.ranking.min_minutes_threshold = None;
        let report = evaluate(&config, make_feed(), &fixtures()).unwrap();

        // Round 2: one completed round, half a match.
        assert_eq!(report.minutes_threshold, 45);
        assert_eq!(report.ranked.len(), 5);
    }

    #[test]
    fn unavailable_players_are_filtered_out() {
        let mut feed = make_feed();
        feed.players[3].availability = Availability::Unavailable;
        feed.players[2].chance_of_playing = Some(25);

        let report = evaluate(&make_config(), feed, &fixtures()).unwrap();
        assert!(report.ranked.iter().all(|sp| sp.player.id != 4 && sp.player.id != 3));

        // Only one forward and no midfielder left.
        assert!(matches!(
            report.squad,
            Some(Err(SelectionError::InsufficientPlayers { .. }))
        ));
    }

    #[test]
    fn squad_can_be_disabled() {
        let mut config = make_config();
        config.squad.enabled = false;
        let report = evaluate(&config, make_feed(), &fixtures()).unwrap();
        assert!(report.squad.is_none());
    }

    #[test]
    fn over_budget_is_reported_not_fatal() {
        let mut config = make_config();
        config.squad.budget = 20.0;
        let report = evaluate(&config, make_feed(), &fixtures()).unwrap();
        assert!(matches!(
            report.squad,
            Some(Err(SelectionError::BudgetExceeded { .. }))
        ));
    }

    #[test]
    fn finished_season_is_an_error() {
        let done = vec![make_fixture(38, 1, 2, 3, 3, true)];
        let err = evaluate(&make_config(), make_feed(), &done).unwrap_err();
        assert!(err.to_string().contains("cannot determine the round"));
    }

    #[test]
    fn regression_needs_enough_players() {
        let mut config = make_config();
        config.scoring.strategy = StrategyKind::Regression;
        let err = evaluate(&config, make_feed(), &fixtures()).unwrap_err();
        assert!(err.to_string().contains("regression"));
    }

    #[test]
    fn build_source_picks_snapshot_for_files() {
        let source = build_source(&make_config()).unwrap();
        assert_eq!(source.describe(), "b.json + f.json");
    }
}
