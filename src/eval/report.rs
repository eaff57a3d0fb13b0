//! Per-season results file
//!
//! One block per evaluated season: a header line, the mean squared error,
//! then one `feature,coefficient` row per fitted coefficient, then a blank
//! line. The reader groups coefficients by the entity they belong to.

use crate::train::Evaluation;
use crate::{FootyError, Result, SeasonId};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const SEASON_PREFIX: &str = "Predictions for season ";
const ERROR_PREFIX: &str = "Mean squared error: ";

/// Append one evaluated season to the results file
pub fn append_result<P: AsRef<Path>>(
    path: P,
    eval_season: SeasonId,
    evaluation: &Evaluation,
) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;

    writeln!(file, "{}{}", SEASON_PREFIX, eval_season.0)?;
    writeln!(file, "{}{:.6}", ERROR_PREFIX, evaluation.mse)?;
    for (feature, coefficient) in &evaluation.coefficients {
        writeln!(file, "{},{}", feature, coefficient)?;
    }
    writeln!(file)?;
    Ok(())
}

/// Coefficient series grouped by the entity a feature belongs to
#[derive(Debug, Default)]
pub struct GroupedCoefficients {
    pub home_teams: BTreeMap<String, Vec<f64>>,
    pub away_teams: BTreeMap<String, Vec<f64>>,
    pub referees: BTreeMap<String, Vec<f64>>,
    pub stats: BTreeMap<String, Vec<f64>>,
}

impl GroupedCoefficients {
    fn add(&mut self, feature: &str, coefficient: f64) {
        if let Some(name) = feature.strip_prefix("HomeTeam_") {
            push_to(&mut self.home_teams, name, coefficient);
        } else if let Some(name) = feature.strip_prefix("AwayTeam_") {
            push_to(&mut self.away_teams, name, coefficient);
        } else if let Some(name) = feature.strip_prefix("Referee_") {
            push_to(&mut self.referees, name, coefficient);
        } else {
            push_to(&mut self.stats, feature, coefficient);
        }
    }
}

fn push_to(map: &mut BTreeMap<String, Vec<f64>>, key: &str, value: f64) {
    map.entry(key.to_string()).or_default().push(value);
}

/// Everything read back from a results file
#[derive(Debug, Default)]
pub struct ResultsSummary {
    /// (evaluated season, mean squared error) in file order
    pub errors: Vec<(SeasonId, f64)>,
    pub coefficients: GroupedCoefficients,
}

/// Parse a results file written by [`append_result`]
pub fn read_results<P: AsRef<Path>>(path: P) -> Result<ResultsSummary> {
    let content = std::fs::read_to_string(path.as_ref())?;

    let mut summary = ResultsSummary::default();
    let mut current_season = 0u16;

    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(SEASON_PREFIX) {
            current_season = rest
                .trim()
                .parse()
                .map_err(|_| FootyError::Parse(format!("Bad season header '{}'", line)))?;
        } else if let Some(rest) = line.strip_prefix(ERROR_PREFIX) {
            let mse = rest
                .trim()
                .parse()
                .map_err(|_| FootyError::Parse(format!("Bad error line '{}'", line)))?;
            summary.errors.push((SeasonId(current_season), mse));
        } else {
            // Split on the last comma; feature names may contain commas
            let (feature, coefficient) = line
                .rsplit_once(',')
                .ok_or_else(|| FootyError::Parse(format!("Bad coefficient row '{}'", line)))?;
            let coefficient = coefficient
                .trim()
                .parse()
                .map_err(|_| FootyError::Parse(format!("Bad coefficient in '{}'", line)))?;
            summary.coefficients.add(feature, coefficient);
        }
    }
    Ok(summary)
}

/// Mean coefficient per entity, strongest influence first
pub fn ranked_means(series: &BTreeMap<String, Vec<f64>>) -> Vec<(String, f64)> {
    let mut means: Vec<(String, f64)> = series
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(name, values)| {
            (
                name.clone(),
                values.iter().sum::<f64>() / values.len() as f64,
            )
        })
        .collect();
    means.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    means
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_evaluation() -> Evaluation {
        Evaluation {
            score: 0.4,
            mse: 1.25,
            coefficients: vec![
                ("HomeTeam_Arsenal".to_string(), 0.5),
                ("AwayTeam_Leeds".to_string(), -0.25),
                ("Referee_Wilkie, A".to_string(), 0.125),
                ("HS".to_string(), 0.0625),
            ],
        }
    }

    #[test]
    fn test_round_trip_and_grouping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        append_result(&path, SeasonId(13), &sample_evaluation()).unwrap();
        let mut second = sample_evaluation();
        second.mse = 2.5;
        append_result(&path, SeasonId(14), &second).unwrap();

        let summary = read_results(&path).unwrap();

        assert_eq!(
            summary.errors,
            vec![(SeasonId(13), 1.25), (SeasonId(14), 2.5)]
        );
        assert_eq!(
            summary.coefficients.home_teams.get("Arsenal"),
            Some(&vec![0.5, 0.5])
        );
        assert_eq!(
            summary.coefficients.away_teams.get("Leeds"),
            Some(&vec![-0.25, -0.25])
        );
        // The comma inside the referee name survives
        assert_eq!(
            summary.coefficients.referees.get("Wilkie, A"),
            Some(&vec![0.125, 0.125])
        );
        assert_eq!(summary.coefficients.stats.get("HS"), Some(&vec![0.0625, 0.0625]));
    }

    #[test]
    fn test_ranked_means_orders_by_magnitude() {
        let mut series = BTreeMap::new();
        series.insert("Arsenal".to_string(), vec![0.1, 0.3]);
        series.insert("Leeds".to_string(), vec![-0.8]);
        series.insert("Derby".to_string(), vec![0.05]);

        let ranked = ranked_means(&series);

        assert_eq!(ranked[0].0, "Leeds");
        assert_eq!(ranked[1].0, "Arsenal");
        assert!((ranked[1].1 - 0.2).abs() < 1e-12);
        assert_eq!(ranked[2].0, "Derby");
    }

    #[test]
    fn test_malformed_row_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        std::fs::write(&path, "no commas here\n").unwrap();

        assert!(matches!(read_results(&path), Err(FootyError::Parse(_))));
    }
}
