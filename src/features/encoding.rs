//! One-hot encoding of the categorical match columns

use crate::MatchRecord;
use std::collections::BTreeSet;

/// Fitted vocabularies for the four categorical columns
///
/// Vocabularies must be fitted over the union of every split that will be
/// encoded, so train and test share one column space.
pub struct CategoricalEncoder {
    home_teams: Vec<String>,
    away_teams: Vec<String>,
    ht_results: Vec<String>,
    referees: Vec<String>,
}

impl CategoricalEncoder {
    /// Collect sorted vocabularies from the given records
    pub fn fit<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut home_teams = BTreeSet::new();
        let mut away_teams = BTreeSet::new();
        let mut ht_results = BTreeSet::new();
        let mut referees = BTreeSet::new();

        for record in records {
            home_teams.insert(record.home_team.clone());
            away_teams.insert(record.away_team.clone());
            ht_results.insert(record.ht_result.code().to_string());
            referees.insert(record.referee.clone());
        }

        CategoricalEncoder {
            home_teams: home_teams.into_iter().collect(),
            away_teams: away_teams.into_iter().collect(),
            ht_results: ht_results.into_iter().collect(),
            referees: referees.into_iter().collect(),
        }
    }

    /// Total number of one-hot columns
    pub fn width(&self) -> usize {
        self.home_teams.len() + self.away_teams.len() + self.ht_results.len() + self.referees.len()
    }

    /// Column names in encoding order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        names.extend(self.home_teams.iter().map(|t| format!("HomeTeam_{}", t)));
        names.extend(self.away_teams.iter().map(|t| format!("AwayTeam_{}", t)));
        names.extend(self.ht_results.iter().map(|r| format!("HTR_{}", r)));
        names.extend(self.referees.iter().map(|r| format!("Referee_{}", r)));
        names
    }

    /// Append the one-hot columns for one record
    ///
    /// A value outside the fitted vocabulary encodes as all zeros.
    pub fn encode_into(&self, record: &MatchRecord, out: &mut Vec<f64>) {
        one_hot_into(&self.home_teams, &record.home_team, out);
        one_hot_into(&self.away_teams, &record.away_team, out);
        one_hot_into(&self.ht_results, record.ht_result.code(), out);
        one_hot_into(&self.referees, &record.referee, out);
    }
}

fn one_hot_into(vocabulary: &[String], value: &str, out: &mut Vec<f64>) {
    for entry in vocabulary {
        out.push(if entry == value { 1.0 } else { 0.0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HalfTimeResult, MatchRecord, SeasonId};

    fn make_match(home: &str, away: &str, referee: &str, ht: HalfTimeResult) -> MatchRecord {
        MatchRecord {
            season: SeasonId(8),
            month: 9,
            home_team: home.to_string(),
            away_team: away.to_string(),
            ht_home_goals: 1,
            ht_away_goals: 0,
            ht_result: ht,
            referee: referee.to_string(),
            home_shots: 10,
            away_shots: 8,
            home_shots_on_target: 5,
            away_shots_on_target: 3,
            home_corners: 6,
            away_corners: 4,
            home_fouls: 12,
            away_fouls: 14,
            home_yellows: 1,
            away_yellows: 2,
            home_reds: 0,
            away_reds: 0,
            home_goals: 2,
            away_goals: 1,
        }
    }

    #[test]
    fn test_vocabularies_are_sorted_and_deduplicated() {
        let records = vec![
            make_match("Leeds", "Arsenal", "P Durkin", HalfTimeResult::HomeLead),
            make_match("Arsenal", "Leeds", "P Durkin", HalfTimeResult::Draw),
        ];
        let encoder = CategoricalEncoder::fit(&records);

        let names = encoder.feature_names();
        assert_eq!(
            names,
            vec![
                "HomeTeam_Arsenal",
                "HomeTeam_Leeds",
                "AwayTeam_Arsenal",
                "AwayTeam_Leeds",
                "HTR_D",
                "HTR_H",
                "Referee_P Durkin",
            ]
        );
        assert_eq!(encoder.width(), 7);
    }

    #[test]
    fn test_encoding_marks_one_column_per_block() {
        let records = vec![
            make_match("Leeds", "Arsenal", "P Durkin", HalfTimeResult::HomeLead),
            make_match("Arsenal", "Leeds", "M Riley", HalfTimeResult::Draw),
        ];
        let encoder = CategoricalEncoder::fit(&records);

        let mut row = Vec::new();
        encoder.encode_into(&records[0], &mut row);

        // HomeTeam: [Arsenal, Leeds], AwayTeam: [Arsenal, Leeds],
        // HTR: [D, H], Referee: [M Riley, P Durkin]
        assert_eq!(row, vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_value_encodes_as_zeros() {
        let fitted = vec![make_match("Leeds", "Arsenal", "P Durkin", HalfTimeResult::HomeLead)];
        let encoder = CategoricalEncoder::fit(&fitted);

        let stranger = make_match("Derby", "Arsenal", "P Durkin", HalfTimeResult::HomeLead);
        let mut row = Vec::new();
        encoder.encode_into(&stranger, &mut row);

        // Home team block is all zeros
        assert_eq!(row[0], 0.0);
        assert_eq!(row.iter().filter(|&&v| v == 1.0).count(), 3);
    }
}
