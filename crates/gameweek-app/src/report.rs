// Plain-text report rendering and CSV export of the ranking.

use std::io;
use std::path::Path;

use anyhow::Context;
use gameweek_core::{Position, ScoredPlayer, SelectionError, Squad};
use serde::Serialize;

use crate::pipeline::CycleReport;

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn player_line(rank: Option<usize>, sp: &ScoredPlayer, team: &str) -> String {
    let p = &sp.player;
    let rank = rank.map(|r| format!("{r:>3}.")).unwrap_or_else(|| "    ".into());
    format!(
        "{rank} {:<20} {:<4} {:<3} {:>5.1}m {:>5} min {:>7.2}\n",
        p.name,
        team,
        p.position.display_str(),
        p.cost(),
        p.minutes,
        sp.expected_points
    )
}

/// Header, top `top_n` ranked players, and the squad section.
pub fn render(report: &CycleReport, top_n: usize) -> String {
    let mut out = format!("Gameweek {}", report.round);
    if let Some(kickoff) = report.first_kickoff {
        out.push_str(&format!(" (first kickoff {})", kickoff.format("%a %d %b %H:%M UTC")));
    }
    out.push('\n');
    out.push_str(&format!("Scoring: {}\n", report.strategy));
    if let Some(fit) = &report.fit {
        let line = match fit.test_mse {
            Some(mse) => format!(
                "Regression: {} train rows, {} held out, MSE {:.4}\n",
                fit.train_rows, fit.test_rows, mse
            ),
            None => format!("Regression: {} train rows\n", fit.train_rows),
        };
        out.push_str(&line);
    }

    out.push_str(&format!(
        "\nTop {} of {} players (more than {} minutes):\n",
        top_n.min(report.ranked.len()),
        report.ranked.len(),
        report.minutes_threshold
    ));
    for (i, sp) in report.ranked.iter().take(top_n).enumerate() {
        out.push_str(&player_line(Some(i + 1), sp, report.team_short_name(sp.player.team)));
    }

    match &report.squad {
        None => {}
        Some(Ok(squad)) => {
            out.push('\n');
            out.push_str(&render_squad(squad, report));
        }
        Some(Err(e)) => {
            out.push_str(&format!("\nNo squad: {}\n", squad_error_hint(e)));
        }
    }

    out
}

fn render_squad(squad: &Squad, report: &CycleReport) -> String {
    let mut out = format!(
        "Squad: {} players, {:.1}m, {:.2} expected points\n",
        squad.len(),
        squad.total_cost(),
        squad.expected_points()
    );
    for position in Position::SQUAD_ORDER {
        out.push_str(&format!("  {}\n", position.display_str()));
        for sp in squad.players_at(position) {
            out.push_str(&player_line(None, sp, report.team_short_name(sp.player.team)));
        }
    }
    out
}

fn squad_error_hint(err: &SelectionError) -> String {
    match err {
        SelectionError::BudgetExceeded { .. } => {
            format!("{err} (set squad.budget_policy = \"downgrade\" to trade down)")
        }
        SelectionError::InsufficientPlayers { .. } => err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    rank: usize,
    id: u32,
    name: &'a str,
    team: &'a str,
    position: &'static str,
    cost: f64,
    minutes: u32,
    goals: u32,
    assists: u32,
    clean_sheets: u32,
    expected_points: f64,
}

/// Write the full ranking as CSV to any writer.
pub fn write_csv_to<W: io::Write>(writer: W, report: &CycleReport) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (i, sp) in report.ranked.iter().enumerate() {
        let p = &sp.player;
        csv.serialize(CsvRow {
            rank: i + 1,
            id: p.id,
            name: &p.name,
            team: report.team_short_name(p.team),
            position: p.position.display_str(),
            cost: p.cost(),
            minutes: p.minutes,
            goals: p.goals,
            assists: p.assists,
            clean_sheets: p.clean_sheets,
            expected_points: (sp.expected_points * 100.0).round() / 100.0,
        })
        .context("failed to serialize ranking row")?;
    }
    csv.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Write the full ranking as CSV to `path`, creating parent directories.
pub fn write_csv(path: &Path, report: &CycleReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv_to(file, report)
}
