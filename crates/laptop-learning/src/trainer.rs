//! Grid-search training and the model building stage.
//!
//! [`GridSearchTrainer`] cross-validates every grid candidate, refits the best
//! one on the full training split and scores it on both splits.
//! [`run_model_building`] wires that into the artifact layout.

use crate::config::TrainerConfig;
use crate::cv::{Fold, KFold};
use crate::dataset::Dataset;
use crate::error::{LearningError, Result};
use crate::grid::ParamGridExt;
use crate::metrics::r2_score;
use crate::model::{GradientBoostedRegressor, TrainedModel};
use crate::types::{CandidateScore, HyperParams, RegressionMetrics, TrainingResult};
use laptop_processing::{ModelBuildingConfig, TransformationArtifacts};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Exhaustive grid search with k-fold cross-validation.
#[derive(Debug, Clone)]
pub struct GridSearchTrainer {
    config: TrainerConfig,
}

impl GridSearchTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Cross-validate every candidate on `train`.
    ///
    /// Returns scores in grid order. Fits run in parallel over
    /// (candidate, fold) pairs; the call returns once all have finished.
    pub fn search(&self, train: &Dataset) -> Result<Vec<CandidateScore>> {
        check_trainable(train)?;
        let folds = KFold::new(self.config.cv_folds)?.split(train.len())?;
        let candidates = self.config.param_grid.candidates();
        if candidates.is_empty() {
            return Err(LearningError::InvalidConfig("parameter grid is empty".to_string()));
        }

        info!(
            "Grid search: {} candidates x {} folds on {} rows",
            candidates.len(),
            folds.len(),
            train.len()
        );

        let jobs: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        let fold_scores: Vec<f64> = self.run_parallel(|| {
            jobs.par_iter()
                .map(|&(c, f)| score_fold(train, &folds[f], candidates[c]))
                .collect::<Result<Vec<f64>>>()
        })?;

        let scores = candidates
            .into_iter()
            .zip(fold_scores.chunks(folds.len()))
            .map(|(params, chunk)| {
                let mean_score = chunk.iter().sum::<f64>() / chunk.len() as f64;
                debug!("{} -> mean R² {:.4}", params, mean_score);
                CandidateScore {
                    params,
                    fold_scores: chunk.to_vec(),
                    mean_score,
                }
            })
            .collect();
        Ok(scores)
    }

    /// Search, refit the best candidate on all of `train` and evaluate it.
    pub fn train(&self, train: &Dataset, test: &Dataset) -> Result<(TrainedModel, TrainingResult)> {
        if train.feature_names != test.feature_names {
            return Err(LearningError::InvalidData(format!(
                "train has {} features, test has {} (or names differ)",
                train.n_features(),
                test.n_features()
            )));
        }

        let start = Instant::now();
        let candidates = self.search(train)?;
        let (best_params, cv_score) = select_best(&candidates).map(|b| (b.params, b.mean_score))?;
        info!("Best params: {} (CV R² {:.4})", best_params, cv_score);

        let regressor = GradientBoostedRegressor::fit(best_params, &train.features, &train.target)?;
        let model = TrainedModel::new(train.feature_names.clone(), regressor)?;

        let train_pred = model.predict(&train.features)?;
        let train_metrics = RegressionMetrics::evaluate(&train.target, &train_pred, best_params)?;
        let test_pred = model.predict(&test.features)?;
        let test_metrics = RegressionMetrics::evaluate(&test.target, &test_pred, best_params)?;

        let result = TrainingResult {
            best_params,
            cv_score,
            candidates,
            train_metrics,
            test_metrics,
            training_time_seconds: start.elapsed().as_secs_f64(),
        };
        Ok((model, result))
    }

    fn run_parallel<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send,
        T: Send,
    {
        if self.config.n_jobs > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.config.n_jobs as usize)
                .build()
                .map_err(|e| LearningError::TrainingFailed(format!("thread pool: {e}")))?;
            pool.install(op)
        } else {
            op()
        }
    }
}

fn check_trainable(train: &Dataset) -> Result<()> {
    let first = train.target.first().copied().unwrap_or_default();
    if train.target.iter().all(|&v| v == first) {
        return Err(LearningError::InvalidData(
            "target is constant, nothing to learn".to_string(),
        ));
    }
    Ok(())
}

fn score_fold(train: &Dataset, fold: &Fold, params: HyperParams) -> Result<f64> {
    let (x_fit, y_fit) = train.subset(fold.train.iter().copied());
    let (x_val, y_val) = train.subset(fold.validation.clone());
    let model = GradientBoostedRegressor::fit(params, &x_fit, &y_fit)?;
    let score = r2_score(&y_val, &model.predict(&x_val)?);
    if !score.is_finite() {
        return Err(LearningError::TrainingFailed(format!(
            "non-finite validation score for {params}"
        )));
    }
    Ok(score)
}

/// Highest mean score; ties go to the earliest candidate.
fn select_best(candidates: &[CandidateScore]) -> Result<&CandidateScore> {
    candidates
        .iter()
        .reduce(|best, c| if c.mean_score > best.mean_score { c } else { best })
        .ok_or_else(|| LearningError::TrainingFailed("no candidates were evaluated".to_string()))
}

/// Paths and results of the model building stage.
#[derive(Debug, Clone, Serialize)]
pub struct ModelArtifacts {
    pub model_path: PathBuf,
    pub train_metrics_path: PathBuf,
    pub test_metrics_path: PathBuf,
    pub result: TrainingResult,
}

/// Train on the transformed arrays and persist model and metrics.
///
/// Nothing is written unless training and evaluation both succeeded.
pub fn run_model_building(
    config: &ModelBuildingConfig,
    arrays: &TransformationArtifacts,
) -> Result<ModelArtifacts> {
    info!("Model building started");
    let trainer = GridSearchTrainer::new(TrainerConfig::from_model_config(config)?);
    let train = Dataset::from_array(&arrays.train)?;
    let test = Dataset::from_array(&arrays.test)?;

    let (model, result) = trainer.train(&train, &test)?;

    model.save(&config.model_path)?;
    result.train_metrics.save_json(&config.train_metrics_path)?;
    result.test_metrics.save_json(&config.test_metrics_path)?;
    info!(
        "Model saved: {} (train R² {:.4}, test R² {:.4}, {:.1}s)",
        config.model_path.display(),
        result.train_metrics.r2,
        result.test_metrics.r2,
        result.training_time_seconds
    );

    Ok(ModelArtifacts {
        model_path: config.model_path.clone(),
        train_metrics_path: config.train_metrics_path.clone(),
        test_metrics_path: config.test_metrics_path.clone(),
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use laptop_processing::ParamGrid;
    use pretty_assertions::assert_eq;

    fn tiny_config(folds: usize) -> TrainerConfig {
        TrainerConfig::builder()
            .cv_folds(folds)
            .param_grid(ParamGrid {
                n_estimators: vec![5, 20],
                max_depth: vec![2],
                learning_rate: vec![0.3],
            })
            .n_jobs(2)
            .build()
            .unwrap()
    }

    fn linear(n: usize, offset: usize) -> Dataset {
        let features: Vec<Vec<f64>> = (offset..offset + n)
            .map(|i| vec![i as f64, (i % 4) as f64])
            .collect();
        let target = features.iter().map(|r| 100.0 + 10.0 * r[0]).collect();
        Dataset::from_rows(vec!["x".into(), "k".into()], features, target).unwrap()
    }

    fn score(mean_score: f64, n_estimators: usize) -> CandidateScore {
        CandidateScore {
            params: HyperParams {
                n_estimators,
                max_depth: 2,
                learning_rate: 0.1,
            },
            fold_scores: vec![mean_score],
            mean_score,
        }
    }

    #[test]
    fn test_select_best_prefers_earliest_on_tie() {
        let scores = vec![score(0.5, 10), score(0.8, 20), score(0.8, 30)];
        assert_eq!(select_best(&scores).unwrap().params.n_estimators, 20);
        assert!(select_best(&[]).is_err());
    }

    #[test]
    fn test_search_scores_every_candidate() {
        let trainer = GridSearchTrainer::new(tiny_config(3));
        let scores = trainer.search(&linear(30, 0)).unwrap();

        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.fold_scores.len() == 3));
        assert_eq!(scores[0].params.n_estimators, 5);
    }

    #[test]
    fn test_train_produces_consistent_metrics() {
        let trainer = GridSearchTrainer::new(tiny_config(3));
        let (model, result) = trainer.train(&linear(30, 0), &linear(8, 3)).unwrap();

        assert_eq!(model.params(), result.best_params);
        assert_eq!(result.train_metrics.params, result.best_params);
        assert_eq!(result.test_metrics.params, result.best_params);
        assert!(result.train_metrics.mse >= 0.0);
        assert!(result.test_metrics.mae >= 0.0);
        assert!(result.test_metrics.r2 <= 1.0);
    }

    #[test]
    fn test_constant_target_is_rejected() {
        let data = Dataset::from_rows(
            vec!["x".into()],
            (0..10).map(|i| vec![i as f64]).collect(),
            vec![5.0; 10],
        )
        .unwrap();
        let err = GridSearchTrainer::new(tiny_config(2)).search(&data).unwrap_err();
        assert!(matches!(err, LearningError::InvalidData(_)));
    }

    #[test]
    fn test_fewer_rows_than_folds() {
        let err = GridSearchTrainer::new(tiny_config(5)).search(&linear(4, 0)).unwrap_err();
        assert!(matches!(err, LearningError::InvalidData(_)));
    }

    #[test]
    fn test_feature_layout_must_match() {
        let test = Dataset::from_rows(vec!["x".into()], vec![vec![1.0]], vec![1.0]).unwrap();
        let err = GridSearchTrainer::new(tiny_config(3))
            .train(&linear(30, 0), &test)
            .unwrap_err();
        assert!(matches!(err, LearningError::InvalidData(_)));
    }
}
