// Gameweek report entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config (seeding config/ from defaults/ on first run)
// 3. Build the data source (live API or saved files)
// 4. Run one cycle: fetch, score, rank, select
// 5. Print the report, export CSV if configured

use gameweek::config;
use gameweek::pipeline;
use gameweek::report;

use anyhow::Context;
use std::path::Path;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Gameweek report starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: source={:?}, strategy={:?}, budget={:.1}m",
        config.source.kind, config.scoring.strategy, config.squad.budget
    );

    // 3. Data source
    let source = pipeline::build_source(&config)?;

    // 4. One cycle
    let cycle = pipeline::run_cycle(&config, source.as_ref()).await?;

    // 5. Output
    print!("{}", report::render(&cycle, config.ranking.top_n));

    if let Some(csv_path) = &config.output.csv_path {
        report::write_csv(Path::new(csv_path), &cycle)?;
        info!("Wrote {} ranked players to {}", cycle.ranked.len(), csv_path);
        println!("\nRanking written to {csv_path}");
    }

    info!("Gameweek report finished");
    Ok(())
}

/// Log to `logs/gameweek.log`; stdout carries the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("gameweek.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gameweek=info,gameweek_fpl=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    Ok(())
}
