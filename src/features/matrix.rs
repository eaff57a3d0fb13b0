//! Design matrix assembly
//!
//! One-hot columns first, numeric passthrough columns after, matching the
//! column order the results file has always used. The label is the full-time
//! goal difference, reduced to its sign when classifying.

use crate::features::encoding::CategoricalEncoder;
use crate::{Goal, MatchRecord};
use ndarray::{Array1, Array2};

const NUMERIC_NAMES: [&str; 16] = [
    "Month", "Season", "HTHG", "HTAG", "HS", "AS", "HST", "AST", "HC", "AC", "HF", "AF", "HY",
    "AY", "HR", "AR",
];

/// Numeric features and labels for one data split
pub struct DesignMatrix {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
    pub feature_names: Vec<String>,
}

impl DesignMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Encode train and test splits into one shared column space
pub fn design_matrices(
    train: &[MatchRecord],
    test: &[MatchRecord],
    goal: Goal,
) -> (DesignMatrix, DesignMatrix) {
    let encoder = CategoricalEncoder::fit(train.iter().chain(test.iter()));
    (
        encode_split(&encoder, train, goal),
        encode_split(&encoder, test, goal),
    )
}

fn encode_split(encoder: &CategoricalEncoder, records: &[MatchRecord], goal: Goal) -> DesignMatrix {
    let width = encoder.width() + NUMERIC_NAMES.len();
    let mut features = Array2::zeros((records.len(), width));
    let mut labels = Vec::with_capacity(records.len());

    let mut row = Vec::with_capacity(width);
    for (i, record) in records.iter().enumerate() {
        row.clear();
        encoder.encode_into(record, &mut row);
        push_numerics(record, &mut row);
        for (j, &value) in row.iter().enumerate() {
            features[(i, j)] = value;
        }
        labels.push(label(record, goal));
    }

    let mut feature_names = encoder.feature_names();
    feature_names.extend(NUMERIC_NAMES.iter().map(|n| n.to_string()));

    DesignMatrix {
        features,
        labels: Array1::from_vec(labels),
        feature_names,
    }
}

fn push_numerics(record: &MatchRecord, out: &mut Vec<f64>) {
    out.push(record.month as f64);
    out.push(record.season.0 as f64);
    out.push(record.ht_home_goals as f64);
    out.push(record.ht_away_goals as f64);
    out.push(record.home_shots as f64);
    out.push(record.away_shots as f64);
    out.push(record.home_shots_on_target as f64);
    out.push(record.away_shots_on_target as f64);
    out.push(record.home_corners as f64);
    out.push(record.away_corners as f64);
    out.push(record.home_fouls as f64);
    out.push(record.away_fouls as f64);
    out.push(record.home_yellows as f64);
    out.push(record.away_yellows as f64);
    out.push(record.home_reds as f64);
    out.push(record.away_reds as f64);
}

/// Goal difference, or its sign when classifying
pub fn label(record: &MatchRecord, goal: Goal) -> f64 {
    let diff = record.margin() as f64;
    match goal {
        Goal::Regression => diff,
        Goal::Classification => {
            if diff == 0.0 {
                0.0
            } else {
                diff.signum()
            }
        }
    }
}
