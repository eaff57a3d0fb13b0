//! Least-squares baseline trainer
//!
//! Ordinary least squares over the encoded features, predicting full-time
//! goal difference. Stands in for the original grid-searched models so the
//! window sweep has a real collaborator to drive.

use crate::data::SeasonStore;
use crate::features::{design_matrices, DesignMatrix};
use crate::train::{Evaluation, Trainer};
use crate::{FootyError, Goal, Result, SeasonId};
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::Array1;

/// Trainer fitting one linear model per (training window, eval season) pair
pub struct LinearTrainer<'a> {
    store: &'a SeasonStore,
    goal: Goal,
}

impl<'a> LinearTrainer<'a> {
    pub fn new(store: &'a SeasonStore, goal: Goal) -> Self {
        LinearTrainer { store, goal }
    }
}

impl Trainer for LinearTrainer<'_> {
    fn evaluate(&mut self, training: &[SeasonId], eval_season: SeasonId) -> Result<Evaluation> {
        let train_records = self.store.load_seasons(training)?;
        let eval_records = self.store.load_seasons(&[eval_season])?;
        let (train, eval) = design_matrices(&train_records, &eval_records, self.goal);
        fit_and_score(&train, &eval, self.goal)
    }
}

/// Fit on `train`, score on `eval`
fn fit_and_score(train: &DesignMatrix, eval: &DesignMatrix, goal: Goal) -> Result<Evaluation> {
    if train.is_empty() || eval.is_empty() {
        return Err(FootyError::Training(
            "Empty training or evaluation split".to_string(),
        ));
    }

    let dataset = Dataset::new(train.features.clone(), train.labels.clone());
    let model = LinearRegression::new()
        .fit(&dataset)
        .map_err(|e| FootyError::Training(e.to_string()))?;

    let predicted = model.predict(&eval.features);
    let mse = mean_squared_error(&predicted, &eval.labels);
    let score = match goal {
        Goal::Regression => r_squared(&predicted, &eval.labels),
        Goal::Classification => sign_accuracy(&predicted, &eval.labels),
    };

    let coefficients = train
        .feature_names
        .iter()
        .cloned()
        .zip(model.params().iter().copied())
        .collect();

    Ok(Evaluation {
        score,
        mse,
        coefficients,
    })
}

fn mean_squared_error(predicted: &Array1<f64>, actual: &Array1<f64>) -> f64 {
    let n = actual.len();
    if n == 0 {
        return 0.0;
    }
    predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a) * (p - a))
        .sum::<f64>()
        / n as f64
}

/// Coefficient of determination on the evaluation split
fn r_squared(predicted: &Array1<f64>, actual: &Array1<f64>) -> f64 {
    let n = actual.len();
    if n == 0 {
        return 0.0;
    }
    let mean = actual.sum() / n as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    let ss_res: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (a - p) * (a - p))
        .sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Fraction of evaluation rows whose predicted sign matches the label
fn sign_accuracy(predicted: &Array1<f64>, actual: &Array1<f64>) -> f64 {
    let n = actual.len();
    if n == 0 {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| sign_of(**p) == sign_of(**a))
        .count();
    correct as f64 / n as f64
}

fn sign_of(value: f64) -> i8 {
    if value > 0.5 {
        1
    } else if value < -0.5 {
        -1
    } else {
        0
    }
}
