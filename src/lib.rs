//! Premier League match outcome prediction
//!
//! Cleans per-season match data, resolves referee name aliases, and evaluates
//! prediction accuracy across sliding windows of training seasons.

pub mod data;
pub mod eval;
pub mod features;
pub mod resolve;
pub mod train;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier for a league season
///
/// Season 1 is 1993-94; data files are labelled by this number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeasonId(pub u16);

impl SeasonId {
    /// Season offset by `n` later seasons
    pub fn plus(self, n: u16) -> SeasonId {
        SeasonId(self.0 + n)
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Half-time result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HalfTimeResult {
    HomeLead,
    Draw,
    AwayLead,
}

impl HalfTimeResult {
    pub fn code(&self) -> &'static str {
        match self {
            HalfTimeResult::HomeLead => "H",
            HalfTimeResult::Draw => "D",
            HalfTimeResult::AwayLead => "A",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "H" => Some(HalfTimeResult::HomeLead),
            "D" => Some(HalfTimeResult::Draw),
            "A" => Some(HalfTimeResult::AwayLead),
            _ => None,
        }
    }
}

/// A single cleaned match record
///
/// Referee names have already been translated to canonical form and the match
/// date reduced to its month; both happen when a season file is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub season: SeasonId,
    /// Month of the match date (1-12)
    pub month: u32,
    pub home_team: String,
    pub away_team: String,
    pub ht_home_goals: u8,
    pub ht_away_goals: u8,
    pub ht_result: HalfTimeResult,
    pub referee: String,
    pub home_shots: u8,
    pub away_shots: u8,
    pub home_shots_on_target: u8,
    pub away_shots_on_target: u8,
    pub home_corners: u8,
    pub away_corners: u8,
    pub home_fouls: u8,
    pub away_fouls: u8,
    pub home_yellows: u8,
    pub away_yellows: u8,
    pub home_reds: u8,
    pub away_reds: u8,
    pub home_goals: u8,
    pub away_goals: u8,
}

impl MatchRecord {
    /// Full-time goal difference (positive = home win)
    pub fn margin(&self) -> i16 {
        self.home_goals as i16 - self.away_goals as i16
    }
}

/// Prediction target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    /// Predict the goal difference itself
    Regression,
    /// Predict only the sign of the goal difference
    Classification,
}

impl Goal {
    /// Name of the quantity the score measures for this goal
    pub fn measured_value(&self) -> &'static str {
        match self {
            Goal::Regression => "Score",
            Goal::Classification => "Accuracy",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Regression => write!(f, "regression"),
            Goal::Classification => write!(f, "classification"),
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum FootyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Season {season} file is missing column '{column}'")]
    MissingColumn { season: SeasonId, column: String },

    #[error("Merged dataset has {missing} missing entries. You should look into this.")]
    IncompleteData { missing: usize },

    #[error("No alias table at {0} - run `footy resolve` first")]
    NoAliasTable(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Training failed: {0}")]
    Training(String),
}

pub type Result<T> = std::result::Result<T, FootyError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub seasons: SeasonsConfig,
    pub eval: EvalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the per-season csv files
    pub data_dir: String,
    /// Persisted referee alias table
    pub alias_table: String,
    /// Per-season evaluation output
    pub results_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonsConfig {
    /// Earliest season with usable data; older files are much sparser
    pub first: u16,
    pub last: u16,
}

impl SeasonsConfig {
    pub fn first_season(&self) -> SeasonId {
        SeasonId(self.first)
    }

    pub fn last_season(&self) -> SeasonId {
        SeasonId(self.last)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Number of preceding seasons used to train for one evaluation season
    pub history_length: u16,
    pub goal: Goal,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                data_dir: "plData".to_string(),
                alias_table: "referees.csv".to_string(),
                results_file: "results.csv".to_string(),
            },
            seasons: SeasonsConfig { first: 8, last: 28 },
            eval: EvalConfig {
                history_length: 5,
                goal: Goal::Regression,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FootyError::Config(format!("Failed to read config file {}: {}", path, e)))?;
        toml::from_str(&content)
            .map_err(|e| FootyError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FootyError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
