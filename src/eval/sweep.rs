//! Window enumeration and the cross-season sweep

use crate::train::{Evaluation, Trainer};
use crate::{FootyError, Result, SeasonId};
use std::collections::BTreeMap;

/// Scores per window length, each sequence in increasing-offset order
pub type SweepResults = BTreeMap<u16, Vec<f64>>;

/// Number of valid offsets for a window of length `window` over
/// `[first, last]`
fn case_count(first: SeasonId, last: SeasonId, window: u16) -> u16 {
    (last.0 as i32 + 1 - window as i32 - first.0 as i32).max(0) as u16
}

/// Training span and evaluation season for one (length, offset) pair
fn window_span(first: SeasonId, window: u16, offset: u16) -> (Vec<SeasonId>, SeasonId) {
    let start = first.plus(offset);
    let training = (0..window).map(|i| start.plus(i)).collect();
    (training, start.plus(window))
}

/// Train and score every valid (window length, offset) combination
///
/// Window lengths run `1..=last-first`. For length `k` and offset `j` the
/// training span is `[first+j, first+j+k-1]` and the evaluation season
/// `first+j+k`; both must lie within `[first, last]`. Every pair fits afresh
/// even though larger windows retrain on overlapping season subsets; nothing
/// is cached. The first trainer failure aborts the whole sweep, and nothing
/// partial is returned.
pub fn sweep(first: SeasonId, last: SeasonId, trainer: &mut dyn Trainer) -> Result<SweepResults> {
    if last.0 <= first.0 {
        return Err(FootyError::Config(format!(
            "Season range {}..{} leaves nothing to evaluate",
            first, last
        )));
    }

    let mut results = SweepResults::new();
    for window in 1..=(last.0 - first.0) {
        let cases = case_count(first, last, window);
        let mut scores = Vec::with_capacity(cases as usize);
        for offset in 0..cases {
            let (training, eval_season) = window_span(first, window, offset);
            log::info!(
                "Window {}: case {} of {} (eval season {})",
                window,
                offset + 1,
                cases,
                eval_season
            );
            let evaluation = trainer.evaluate(&training, eval_season)?;
            scores.push(evaluation.score);
        }
        results.insert(window, scores);
    }
    Ok(results)
}

/// Offset enumeration restricted to one window length
///
/// Returns the full evaluation per held-out season so callers can record
/// diagnostics, not just the comparison score.
pub fn evaluate_fixed_window(
    first: SeasonId,
    last: SeasonId,
    window: u16,
    trainer: &mut dyn Trainer,
) -> Result<Vec<(SeasonId, Evaluation)>> {
    let cases = case_count(first, last, window);
    if cases == 0 {
        log::warn!(
            "Window length {} leaves no evaluation seasons in {}..{}",
            window,
            first,
            last
        );
    }

    let mut out = Vec::with_capacity(cases as usize);
    for offset in 0..cases {
        let (training, eval_season) = window_span(first, window, offset);
        log::info!("Started case {} of {}.", offset + 1, cases);
        let evaluation = trainer.evaluate(&training, eval_season)?;
        out.push((eval_season, evaluation));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::Evaluation;

    #[test]
    fn test_fixed_window_enumeration() {
        let mut calls: Vec<(Vec<u16>, u16)> = Vec::new();
        let mut trainer = |training: &[SeasonId], eval_season: SeasonId| -> crate::Result<Evaluation> {
            calls.push((training.iter().map(|s| s.0).collect(), eval_season.0));
            Ok(Evaluation::from_score(0.5))
        };

        let results =
            evaluate_fixed_window(SeasonId(8), SeasonId(12), 3, &mut trainer).unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (vec![8, 9, 10], 11));
        assert_eq!(calls[1], (vec![9, 10, 11], 12));
        assert_eq!(results[0].0, SeasonId(11));
        assert_eq!(results[1].0, SeasonId(12));
    }

    #[test]
    fn test_sweep_coverage() {
        let mut trainer = |training: &[SeasonId], eval_season: SeasonId| -> crate::Result<Evaluation> {
            Ok(Evaluation::from_score(
                training.len() as f64 * 100.0 + eval_season.0 as f64,
            ))
        };

        let results = sweep(SeasonId(8), SeasonId(12), &mut trainer).unwrap();

        assert_eq!(results.keys().copied().collect::<Vec<u16>>(), vec![1, 2, 3, 4]);
        for (window, scores) in &results {
            assert_eq!(scores.len(), (5 - window) as usize);
        }
        // Scores arrive in increasing-offset order
        assert_eq!(results[&1], vec![109.0, 110.0, 111.0, 112.0]);
        assert_eq!(results[&3], vec![311.0, 312.0]);
        assert_eq!(results[&4], vec![412.0]);
    }

    #[test]
    fn test_sweep_invokes_trainer_once_per_pair() {
        let mut invocations = 0;
        let mut trainer = |_: &[SeasonId], _: SeasonId| -> crate::Result<Evaluation> {
            invocations += 1;
            Ok(Evaluation::from_score(0.0))
        };

        sweep(SeasonId(8), SeasonId(12), &mut trainer).unwrap();
        // 4 + 3 + 2 + 1 pairs
        assert_eq!(invocations, 10);
    }

    #[test]
    fn test_trainer_failure_aborts_sweep() {
        let mut invocations = 0;
        let mut trainer = |_: &[SeasonId], _: SeasonId| {
            invocations += 1;
            if invocations == 2 {
                Err(crate::FootyError::Training("did not converge".to_string()))
            } else {
                Ok(Evaluation::from_score(0.0))
            }
        };

        assert!(sweep(SeasonId(8), SeasonId(12), &mut trainer).is_err());
        assert_eq!(invocations, 2);
    }

    #[test]
    fn test_empty_range_is_an_error() {
        let mut trainer =
            |_: &[SeasonId], _: SeasonId| -> crate::Result<Evaluation> { Ok(Evaluation::from_score(0.0)) };
        assert!(sweep(SeasonId(12), SeasonId(12), &mut trainer).is_err());
    }

    #[test]
    fn test_oversized_fixed_window_yields_nothing() {
        let mut invocations = 0;
        let mut trainer = |_: &[SeasonId], _: SeasonId| -> crate::Result<Evaluation> {
            invocations += 1;
            Ok(Evaluation::from_score(0.0))
        };

        let results =
            evaluate_fixed_window(SeasonId(8), SeasonId(12), 10, &mut trainer).unwrap();
        assert!(results.is_empty());
        assert_eq!(invocations, 0);
    }
}
