// Configuration loading and validation (config/gameweek.toml).

use gameweek_core::{BudgetPolicy, DuplicatePolicy, Quotas};
use gameweek_fpl::client::DEFAULT_BASE_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "gameweek.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: SourceConfig,
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
    pub squad: SquadConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Live FPL API.
    Api,
    /// Saved JSON payloads on disk.
    Files,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub bootstrap_path: String,
    #[serde(default)]
    pub fixtures_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Heuristic,
    /// Linear model fit to the heuristic's scores.
    Regression,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoringConfig {
    pub strategy: StrategyKind,
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankingConfig {
    /// Players need strictly more minutes than this to be ranked. Derived
    /// from the target round when absent.
    #[serde(default)]
    pub min_minutes_threshold: Option<u32>,
    pub top_n: usize,
    pub min_chance_of_playing: u8,
    pub exclude_unavailable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SquadConfig {
    pub enabled: bool,
    /// Budget in millions.
    pub budget: f64,
    pub quotas: Quotas,
    pub budget_policy: BudgetPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub csv_path: Option<String>,
}

// ---------------------------------------------------------------------------
// gameweek.toml raw structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ConfigFile {
    source: SourceConfig,
    scoring: ScoringConfig,
    ranking: RankingConfig,
    squad: SquadSection,
    #[serde(default)]
    output: OutputConfig,
}

#[derive(Debug, Deserialize)]
struct SquadSection {
    #[serde(default = "default_true")]
    enabled: bool,
    budget: f64,
    goalkeepers: usize,
    defenders: usize,
    midfielders: usize,
    forwards: usize,
    #[serde(default)]
    budget_policy: BudgetPolicy,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse configuration text. `path` is only used in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        source: file.source,
        scoring: file.scoring,
        ranking: file.ranking,
        squad: SquadConfig {
            enabled: file.squad.enabled,
            budget: file.squad.budget,
            quotas: Quotas {
                goalkeepers: file.squad.goalkeepers,
                defenders: file.squad.defenders,
                midfielders: file.squad.midfielders,
                forwards: file.squad.forwards,
            },
            budget_policy: file.squad.budget_policy,
        },
        output: file.output,
    };

    validate(&config)?;
    Ok(config)
}

/// Load and validate `config/gameweek.toml` under `base_dir`. Does not seed
/// defaults; see [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound { path: path.clone() })?;
    parse_config(&text, &path)
}

/// Seed `config/` from `defaults/` under `base_dir`, copying only files that
/// are missing. Existing files are never overwritten and `.example` templates
/// are skipped. Returns the paths written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(vec![]);
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/ nor config/ found in {}; run from the project root",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read {}: {e}", defaults_dir.display()),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ConfigError::DefaultsCopyError {
                message: format!("failed to read defaults entry: {e}"),
            })?
            .path();

        let Some(file_name) = path.file_name() else {
            continue;
        };
        if !path.is_file() || file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if copy_if_missing(&path, &target)? {
            copied.push(target);
        }
    }

    copied.sort();
    Ok(copied)
}

/// Copy `from` to `to` unless `to` exists. `create_new` makes the existence
/// check and the create a single step.
fn copy_if_missing(from: &Path, to: &Path) -> Result<bool, ConfigError> {
    use std::io::Write;

    let mut dest = match std::fs::OpenOptions::new().write(true).create_new(true).open(to) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!("failed to create {}: {e}", to.display()),
            })
        }
    };

    let content = std::fs::read(from).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read {}: {e}", from.display()),
    })?;
    dest.write_all(&content).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", to.display()),
    })?;
    Ok(true)
}

/// Load config relative to the current directory, seeding defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let source = &config.source;
    match source.kind {
        SourceKind::Api => {
            if source.base_url.trim().is_empty() {
                return Err(invalid("source.base_url", "must not be empty"));
            }
            if source.timeout_secs == 0 {
                return Err(invalid("source.timeout_secs", "must be > 0"));
            }
        }
        SourceKind::Files => {
            if source.bootstrap_path.trim().is_empty() {
                return Err(invalid("source.bootstrap_path", "required when kind = \"files\""));
            }
            if source.fixtures_path.trim().is_empty() {
                return Err(invalid("source.fixtures_path", "required when kind = \"files\""));
            }
        }
    }

    if config.ranking.top_n == 0 {
        return Err(invalid("ranking.top_n", "must be > 0"));
    }
    if config.ranking.min_chance_of_playing > 100 {
        return Err(invalid(
            "ranking.min_chance_of_playing",
            format!("must be a percentage, got {}", config.ranking.min_chance_of_playing),
        ));
    }

    let squad = &config.squad;
    if !squad.budget.is_finite() || squad.budget <= 0.0 {
        return Err(invalid("squad.budget", format!("must be > 0, got {}", squad.budget)));
    }
    let quota_fields: &[(&str, usize)] = &[
        ("squad.goalkeepers", squad.quotas.goalkeepers),
        ("squad.defenders", squad.quotas.defenders),
        ("squad.midfielders", squad.quotas.midfielders),
        ("squad.forwards", squad.quotas.forwards),
    ];
    for (name, val) in quota_fields {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }

    if let Some(path) = &config.output.csv_path {
        if path.trim().is_empty() {
            return Err(invalid("output.csv_path", "must not be empty when set"));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
