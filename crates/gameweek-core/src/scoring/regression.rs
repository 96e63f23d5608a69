// Linear regression scoring strategy.
//
// Fits ordinary least squares coefficients over a fixed feature vector
// (price, form, goals, assists, clean sheets, minutes, plus an intercept)
// against labels produced by another strategy, usually the heuristic. The
// fitted model then scores players on the same interface.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::difficulty::DifficultyMap;
use crate::model::Player;
use crate::scoring::ScoringStrategy;

/// Number of coefficients, intercept included.
pub const NUM_COEFFICIENTS: usize = 7;

/// Every n-th row is held out for evaluation.
const HOLDOUT_STRIDE: usize = 5;

/// Diagonal regularization keeping the normal equations positive definite
/// when a feature is constant across the pool.
const RIDGE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    #[error("label count {labels} does not match player count {players}")]
    LengthMismatch { players: usize, labels: usize },

    #[error("need at least {required} training rows, got {available}")]
    NotEnoughSamples { required: usize, available: usize },

    #[error("normal equations are singular or produced non-finite coefficients")]
    Singular,
}

/// Summary of a fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Mean squared error on the held-out rows; `None` if nothing was held out.
    pub test_mse: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RegressionStrategy {
    coefficients: [f64; NUM_COEFFICIENTS],
    report: FitReport,
}

fn features(player: &Player) -> [f64; NUM_COEFFICIENTS] {
    [
        1.0,
        player.cost(),
        player.form,
        player.goals as f64,
        player.assists as f64,
        player.clean_sheets as f64,
        player.minutes as f64,
    ]
}

fn is_holdout(index: usize) -> bool {
    index % HOLDOUT_STRIDE == HOLDOUT_STRIDE - 1
}

impl RegressionStrategy {
    /// Fit against `labels[i]` for `players[i]`.
    pub fn fit(players: &[Player], labels: &[f64]) -> Result<Self, RegressionError> {
        if players.len() != labels.len() {
            return Err(RegressionError::LengthMismatch {
                players: players.len(),
                labels: labels.len(),
            });
        }

        let train: Vec<usize> = (0..players.len()).filter(|&i| !is_holdout(i)).collect();
        let test: Vec<usize> = (0..players.len()).filter(|&i| is_holdout(i)).collect();

        if train.len() <= NUM_COEFFICIENTS {
            return Err(RegressionError::NotEnoughSamples {
                required: NUM_COEFFICIENTS + 1,
                available: train.len(),
            });
        }

        let x = DMatrix::from_fn(train.len(), NUM_COEFFICIENTS, |r, c| features(&players[train[r]])[c]);
        let y = DVector::from_iterator(train.len(), train.iter().map(|&i| labels[i]));

        let xt = x.transpose();
        let mut xtx = &xt * &x;
        for i in 0..NUM_COEFFICIENTS {
            xtx[(i, i)] += RIDGE;
        }
        let xty = &xt * &y;

        let beta = xtx
            .cholesky()
            .ok_or(RegressionError::Singular)?
            .solve(&xty);
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(RegressionError::Singular);
        }

        let mut coefficients = [0.0; NUM_COEFFICIENTS];
        for (slot, value) in coefficients.iter_mut().zip(beta.iter()) {
            *slot = *value;
        }

        let mut model = Self {
            coefficients,
            report: FitReport {
                train_rows: train.len(),
                test_rows: test.len(),
                test_mse: None,
            },
        };

        if !test.is_empty() {
            let sse: f64 = test
                .iter()
                .map(|&i| (model.predict(&players[i]) - labels[i]).powi(2))
                .sum();
            model.report.test_mse = Some(sse / test.len() as f64);
        }

        Ok(model)
    }

    /// Fit using another strategy's scores as labels.
    pub fn fit_to<S>(players: &[Player], labeler: &S, difficulty: &DifficultyMap) -> Result<Self, RegressionError>
    where
        S: ScoringStrategy + ?Sized,
    {
        let labels: Vec<f64> = players.iter().map(|p| labeler.score(p, difficulty)).collect();
        Self::fit(players, &labels)
    }

    pub fn coefficients(&self) -> &[f64; NUM_COEFFICIENTS] {
        &self.coefficients
    }

    pub fn report(&self) -> FitReport {
        self.report
    }

    pub fn predict(&self, player: &Player) -> f64 {
        features(player)
            .iter()
            .zip(self.coefficients.iter())
            .map(|(f, b)| f * b)
            .sum()
    }
}

impl ScoringStrategy for RegressionStrategy {
    fn name(&self) -> &'static str {
        "regression"
    }

    /// The difficulty map only enters through the labels the model was fit on.
    fn score(&self, player: &Player, _difficulty: &DifficultyMap) -> f64 {
        self.predict(player)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Availability, Position};
    use crate::scoring::HeuristicStrategy;
    use std::collections::HashMap;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_player(id: u32, cost: u32, form: f64, goals: u32, assists: u32, cs: u32, minutes: u32) -> Player {
        Player {
            id,
            name: format!("P{id}"),
            team: 1,
            position: Position::Midfielder,
            minutes,
            goals,
            assists,
            clean_sheets: cs,
            cost_tenths: cost,
            availability: Availability::Active,
            chance_of_playing: None,
            form,
        }
    }

    fn varied_pool(n: u32) -> Vec<Player> {
        (0..n)
            .map(|i| {
                make_player(
                    i,
                    40 + (i * 7) % 90,
                    ((i * 3) % 11) as f64 * 0.5,
                    (i * 5) % 13,
                    (i * 2) % 9,
                    (i * 11) % 7,
                    (i * 173) % 3000,
                )
            })
            .collect()
    }

    #[test]
    fn recovers_exact_linear_labels() {
        let players = varied_pool(40);
        let labels: Vec<f64> = players
            .iter()
            .map(|p| 0.5 + 0.2 * p.cost() + 1.5 * p.form + 3.0 * p.goals as f64 + 0.001 * p.minutes as f64)
            .collect();

        let model = RegressionStrategy::fit(&players, &labels).unwrap();
        let c = model.coefficients();
        assert!(approx_eq(c[0], 0.5, 1e-3), "intercept {}", c[0]);
        assert!(approx_eq(c[1], 0.2, 1e-3), "cost {}", c[1]);
        assert!(approx_eq(c[2], 1.5, 1e-3), "form {}", c[2]);
        assert!(approx_eq(c[3], 3.0, 1e-3), "goals {}", c[3]);

        let report = model.report();
        assert_eq!(report.train_rows, 32);
        assert_eq!(report.test_rows, 8);
        assert!(report.test_mse.unwrap() < 1e-6);
    }

    #[test]
    fn too_few_rows_is_rejected() {
        let players = varied_pool(6);
        let labels = vec![1.0; 6];
        let err = RegressionStrategy::fit(&players, &labels).unwrap_err();
        assert!(matches!(err, RegressionError::NotEnoughSamples { .. }));
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let players = varied_pool(20);
        let err = RegressionStrategy::fit(&players, &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            RegressionError::LengthMismatch {
                players: 20,
                labels: 2
            }
        );
    }

    #[test]
    fn constant_feature_does_not_break_fit() {
        // Every player has form 0.0; the ridge term keeps the system solvable.
        let mut players = varied_pool(30);
        for p in players.iter_mut() {
            p.form = 0.0;
        }
        let labels: Vec<f64> = players.iter().map(|p| 2.0 * p.assists as f64).collect();
        let model = RegressionStrategy::fit(&players, &labels).unwrap();
        assert!(approx_eq(model.coefficients()[4], 2.0, 1e-3));
    }

    #[test]
    fn fit_to_heuristic_scores_on_shared_interface() {
        let players = varied_pool(50);
        let mut ratings = HashMap::new();
        ratings.insert(1, 2);
        let map = DifficultyMap::from_ratings(3, ratings);

        let heuristic = HeuristicStrategy::default();
        let model = RegressionStrategy::fit_to(&players, &heuristic, &map).unwrap();
        let strategy: &dyn ScoringStrategy = &model;

        assert_eq!(strategy.name(), "regression");
        for p in &players {
            assert!(strategy.score(p, &map).is_finite());
        }
    }
}
