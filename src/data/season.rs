//! Per-season match data loading
//!
//! Each season lives in its own csv file named by season number. Column names
//! overlap across eras but older files are much sparser, so every usable field
//! is read as optional and completeness is enforced when a corpus is
//! assembled. Bookmaker columns are ignored entirely.

use crate::resolve::CanonicalMap;
use crate::{FootyError, HalfTimeResult, MatchRecord, Result, SeasonId};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Inclusive list of season identifiers
pub fn season_range(first: SeasonId, last: SeasonId) -> Vec<SeasonId> {
    (first.0..=last.0).map(SeasonId).collect()
}

/// One row of a season file, as it appears on disk
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "HomeTeam")]
    home_team: Option<String>,
    #[serde(rename = "AwayTeam")]
    away_team: Option<String>,
    #[serde(rename = "HTHG")]
    ht_home_goals: Option<u8>,
    #[serde(rename = "HTAG")]
    ht_away_goals: Option<u8>,
    #[serde(rename = "HTR")]
    ht_result: Option<String>,
    #[serde(rename = "Referee")]
    referee: Option<String>,
    #[serde(rename = "HS")]
    home_shots: Option<u8>,
    #[serde(rename = "AS")]
    away_shots: Option<u8>,
    #[serde(rename = "HST")]
    home_shots_on_target: Option<u8>,
    #[serde(rename = "AST")]
    away_shots_on_target: Option<u8>,
    #[serde(rename = "HC")]
    home_corners: Option<u8>,
    #[serde(rename = "AC")]
    away_corners: Option<u8>,
    #[serde(rename = "HF")]
    home_fouls: Option<u8>,
    #[serde(rename = "AF")]
    away_fouls: Option<u8>,
    #[serde(rename = "HY")]
    home_yellows: Option<u8>,
    #[serde(rename = "AY")]
    away_yellows: Option<u8>,
    #[serde(rename = "HR")]
    home_reds: Option<u8>,
    #[serde(rename = "AR")]
    away_reds: Option<u8>,
    #[serde(rename = "FTHG")]
    home_goals: Option<u8>,
    #[serde(rename = "FTAG")]
    away_goals: Option<u8>,
}

impl RawRow {
    /// Number of absent fields in this row
    fn missing(&self) -> usize {
        let present = [
            self.date.is_some(),
            self.home_team.is_some(),
            self.away_team.is_some(),
            self.ht_home_goals.is_some(),
            self.ht_away_goals.is_some(),
            self.ht_result.is_some(),
            self.referee.is_some(),
            self.home_shots.is_some(),
            self.away_shots.is_some(),
            self.home_shots_on_target.is_some(),
            self.away_shots_on_target.is_some(),
            self.home_corners.is_some(),
            self.away_corners.is_some(),
            self.home_fouls.is_some(),
            self.away_fouls.is_some(),
            self.home_yellows.is_some(),
            self.away_yellows.is_some(),
            self.home_reds.is_some(),
            self.away_reds.is_some(),
            self.home_goals.is_some(),
            self.away_goals.is_some(),
        ];
        present.iter().filter(|p| !**p).count()
    }

    /// Build the cleaned record; call only after `missing() == 0`
    fn finish(self, season: SeasonId, aliases: &CanonicalMap) -> Result<MatchRecord> {
        let date = parse_date(&need(self.date)?)?;
        let ht_code = need(self.ht_result)?;
        let ht_result = HalfTimeResult::from_code(&ht_code)
            .ok_or_else(|| FootyError::Parse(format!("Unknown half-time result '{}'", ht_code)))?;

        let raw_referee = need(self.referee)?;
        let trimmed = raw_referee.trim();
        let referee = aliases
            .get(trimmed)
            .cloned()
            .unwrap_or_else(|| trimmed.to_string());

        Ok(MatchRecord {
            season,
            month: date.month(),
            home_team: need(self.home_team)?.trim().to_string(),
            away_team: need(self.away_team)?.trim().to_string(),
            ht_home_goals: need(self.ht_home_goals)?,
            ht_away_goals: need(self.ht_away_goals)?,
            ht_result,
            referee,
            home_shots: need(self.home_shots)?,
            away_shots: need(self.away_shots)?,
            home_shots_on_target: need(self.home_shots_on_target)?,
            away_shots_on_target: need(self.away_shots_on_target)?,
            home_corners: need(self.home_corners)?,
            away_corners: need(self.away_corners)?,
            home_fouls: need(self.home_fouls)?,
            away_fouls: need(self.away_fouls)?,
            home_yellows: need(self.home_yellows)?,
            away_yellows: need(self.away_yellows)?,
            home_reds: need(self.home_reds)?,
            away_reds: need(self.away_reds)?,
            home_goals: need(self.home_goals)?,
            away_goals: need(self.away_goals)?,
        })
    }
}

fn need<T>(value: Option<T>) -> Result<T> {
    value.ok_or_else(|| FootyError::Parse("Incomplete row slipped past the gap check".to_string()))
}

/// Dates appear day-first, with two- and four-digit years across eras
fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%d/%m/%y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .map_err(|e| FootyError::Parse(format!("Bad date '{}': {}", text, e)))
}

/// Access to the per-season csv files
///
/// Holds the referee alias mapping so every loaded record comes out with
/// canonical referee names. The mapping is the resolver's output; an empty
/// mapping passes raw names through untouched.
pub struct SeasonStore {
    data_dir: PathBuf,
    aliases: CanonicalMap,
}

impl SeasonStore {
    /// Store over `data_dir` translating referees through `aliases`
    pub fn new<P: AsRef<Path>>(data_dir: P, aliases: CanonicalMap) -> Self {
        SeasonStore {
            data_dir: data_dir.as_ref().to_path_buf(),
            aliases,
        }
    }

    /// Store with the alias table loaded from `alias_table_path`
    pub fn open<P: AsRef<Path>>(data_dir: P, alias_table_path: &str) -> Result<Self> {
        if !Path::new(alias_table_path).exists() {
            return Err(FootyError::NoAliasTable(alias_table_path.to_string()));
        }
        let aliases = super::alias_table::read(alias_table_path)?;
        Ok(Self::new(data_dir, aliases))
    }

    /// Path of the csv file for one season
    pub fn season_path(&self, season: SeasonId) -> PathBuf {
        self.data_dir.join(format!("pl{}.csv", season))
    }

    /// Load one season's cleaned records
    ///
    /// Any absent field aborts with a diagnostic count; a model cannot be fit
    /// on rows with holes in them.
    pub fn load_season(&self, season: SeasonId) -> Result<Vec<MatchRecord>> {
        let (records, missing) = self.read_season(season)?;
        if missing > 0 {
            return Err(FootyError::IncompleteData { missing });
        }
        Ok(records)
    }

    /// Load and concatenate several seasons, checking completeness across the
    /// whole corpus
    pub fn load_seasons(&self, seasons: &[SeasonId]) -> Result<Vec<MatchRecord>> {
        let mut all = Vec::new();
        let mut missing = 0;
        for &season in seasons {
            let (records, gaps) = self.read_season(season)?;
            all.extend(records);
            missing += gaps;
        }
        if missing > 0 {
            return Err(FootyError::IncompleteData { missing });
        }
        log::info!("Read {} matches across {} seasons", all.len(), seasons.len());
        Ok(all)
    }

    fn read_season(&self, season: SeasonId) -> Result<(Vec<MatchRecord>, usize)> {
        let path = self.season_path(season);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_path(&path)?;

        let mut records = Vec::new();
        let mut missing = 0;
        for row in reader.deserialize::<RawRow>() {
            let row = row?;
            let gaps = row.missing();
            if gaps > 0 {
                missing += gaps;
                continue;
            }
            records.push(row.finish(season, &self.aliases)?);
        }
        Ok((records, missing))
    }

    // ==================== Corpus scans ====================

    /// Union of raw (trimmed, untranslated) referee names across seasons
    ///
    /// A season without a referee column is a hard stop; the resolver cannot
    /// build a sound mapping from a partial corpus.
    pub fn referee_names(&self, first: SeasonId, last: SeasonId) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for season in season_range(first, last) {
            let path = self.season_path(season);
            let mut reader = csv::ReaderBuilder::new()
                .flexible(true)
                .has_headers(true)
                .from_path(&path)?;

            let headers = reader.headers()?.clone();
            let referee_idx = headers
                .iter()
                .position(|h| h == "Referee")
                .ok_or_else(|| FootyError::MissingColumn {
                    season,
                    column: "Referee".to_string(),
                })?;

            for record in reader.records() {
                let record = record?;
                if let Some(name) = record.get(referee_idx) {
                    let name = name.trim();
                    if !name.is_empty() {
                        names.insert(name.to_string());
                    }
                }
            }
        }
        Ok(names)
    }

    /// Team name -> seasons in which it appears as the home side
    pub fn team_roster(
        &self,
        first: SeasonId,
        last: SeasonId,
    ) -> Result<BTreeMap<String, BTreeSet<SeasonId>>> {
        let mut teams: BTreeMap<String, BTreeSet<SeasonId>> = BTreeMap::new();
        for season in season_range(first, last) {
            let path = self.season_path(season);
            let mut reader = csv::ReaderBuilder::new()
                .flexible(true)
                .has_headers(true)
                .from_path(&path)?;

            let headers = reader.headers()?.clone();
            let Some(team_idx) = headers.iter().position(|h| h == "HomeTeam") else {
                log::warn!("No home team column in file for season {}", season);
                continue;
            };

            for record in reader.records() {
                let record = record?;
                if let Some(name) = record.get(team_idx) {
                    let name = name.trim();
                    if !name.is_empty() {
                        teams.entry(name.to_string()).or_default().insert(season);
                    }
                }
            }
        }
        Ok(teams)
    }
}
