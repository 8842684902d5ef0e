//! The online SGD driver.
//!
//! A [`Trainer`] owns one [`Strategy`] and one seeded random generator, and
//! drives a run over a [`Dataset`]: optional learn phase, optional evaluate
//! phase, optional model write, all gated independently by configuration.
//!
//! The learn loop per iteration: pick the learning rate, sample one instance
//! uniformly with replacement, apply the strategy's single update, then (on
//! the regularization interval) shrink every submodel, then (when enabled)
//! apply the Pegasos-style L2-ball projection, then (when enabled and the
//! model changed) write an intermediate checkpoint.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::Dataset;
use crate::model::{Model, ModelError};

use super::logger::{TrainingLogger, Verbosity};
use super::strategy::Strategy;

// ============================================================================
// Configuration
// ============================================================================

/// Regularization applied on the regularization interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegType {
    /// No regularization.
    None,
    /// Soft-threshold L1 shrinkage (O(d) per submodel).
    L1,
    /// Uniform L2 shrinkage (O(1) per submodel via the lazy scale).
    #[default]
    L2,
}

/// Parameters for an SGD training run.
///
/// Defaults mirror the classic sparse online learner: learning rate 0.02,
/// margin 1.0, L2 regularization with parameter 1.0 every 1000 iterations,
/// 100k iterations.
#[derive(Debug, Clone)]
pub struct TrainerParams {
    /// Run the learn phase.
    pub learn: bool,

    /// Run the evaluate phase.
    pub evaluate: bool,

    /// Initial learning rate.
    pub initial_learning_rate: f32,

    /// Decrease the rate as `initial / (1 + reg_param * iteration)`.
    pub decreasing_learning_rate: bool,

    /// Margin for the hinge updates (multi-label ignores it).
    pub margin: f32,

    /// Regularization type.
    pub reg_type: RegType,

    /// Regularization parameter.
    pub reg_param: f32,

    /// Apply regularization every this many iterations.
    pub reg_interval: u32,

    /// Apply the Pegasos-style L2-ball projection after every update.
    pub pegasos_projection: bool,

    /// Number of learn iterations.
    pub num_iterations: u32,

    /// Number of features; 0 derives the count from the data set.
    pub num_features: usize,

    /// Seed for the instance sampler.
    pub seed: u64,

    /// Report progress every this many iterations (0 = off).
    pub progress_interval: u32,

    /// Collect per-instance predictions during evaluation.
    pub print_predictions: bool,

    /// Initialize the model from this file before training.
    pub model_in: Option<PathBuf>,

    /// Write the final model to this file; also the base path for
    /// intermediate checkpoints.
    pub model_out: Option<PathBuf>,

    /// Write an intermediate model after every iteration that changed the
    /// model, to `<model_out>.<8-hex-digit iteration>`.
    pub write_intermediate_models: bool,

    /// Logging verbosity.
    pub verbosity: Verbosity,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            learn: false,
            evaluate: false,
            initial_learning_rate: 0.02,
            decreasing_learning_rate: false,
            margin: 1.0,
            reg_type: RegType::default(),
            reg_param: 1.0,
            reg_interval: 1000,
            pegasos_projection: false,
            num_iterations: 100_000,
            num_features: 0,
            seed: 42,
            progress_interval: 0,
            print_predictions: false,
            model_in: None,
            model_out: None,
            write_intermediate_models: false,
            verbosity: Verbosity::default(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Invalid configuration, caught before training starts.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Multi-class needs at least two classes.
    #[error("multi-class training needs num_classes >= 2, got {num_classes}")]
    InvalidClassCount {
        /// Configured class count.
        num_classes: usize,
    },

    /// Multi-label needs 1..=24 label bits (targets ride through an f32).
    #[error("multi-label training needs 1 <= num_labels <= 24, got {num_labels}")]
    InvalidLabelCount {
        /// Configured label count.
        num_labels: usize,
    },

    /// The regularization interval divides the iteration counter.
    #[error("reg_interval must be > 0")]
    InvalidRegInterval,

    /// Intermediate checkpoints need a base path.
    #[error("write_intermediate_models requires model_out")]
    CheckpointsWithoutModelOut,
}

/// Failure during a training run.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Model file read or write failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Learn or evaluate was requested on an empty data set.
    #[error("data set is empty")]
    EmptyDataset,
}

// ============================================================================
// Run results
// ============================================================================

/// Accumulated evaluation counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Correctly classified instances.
    pub positive: usize,
    /// Misclassified instances.
    pub negative: usize,
    /// Per-instance predictions, collected when `print_predictions` is set.
    pub predictions: Option<Vec<f32>>,
}

impl Evaluation {
    /// Fraction of correctly classified instances.
    pub fn accuracy(&self) -> f32 {
        self.positive as f32 / (self.positive + self.negative) as f32
    }
}

/// What a [`Trainer::run`] produced.
#[derive(Debug)]
pub struct RunReport {
    /// The model after the run (trained, loaded, or both).
    pub model: Model,
    /// Evaluation counts, present when the evaluate phase ran.
    pub evaluation: Option<Evaluation>,
}

// ============================================================================
// Trainer
// ============================================================================

/// SGD driver for one [`Strategy`].
#[derive(Debug)]
pub struct Trainer {
    strategy: Strategy,
    params: TrainerParams,
    rng: StdRng,
    logger: TrainingLogger,
}

impl Trainer {
    /// Create a trainer, validating the configuration.
    pub fn new(strategy: Strategy, params: TrainerParams) -> Result<Self, ConfigError> {
        strategy.validate()?;
        if params.reg_interval == 0 {
            return Err(ConfigError::InvalidRegInterval);
        }
        if params.write_intermediate_models && params.model_out.is_none() {
            return Err(ConfigError::CheckpointsWithoutModelOut);
        }
        let rng = StdRng::seed_from_u64(params.seed);
        let logger = TrainingLogger::new(params.verbosity);
        Ok(Self {
            strategy,
            params,
            rng,
            logger,
        })
    }

    /// The active strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The run configuration.
    pub fn params(&self) -> &TrainerParams {
        &self.params
    }

    /// Drive a full run: size and initialize the model, optionally load it,
    /// optionally learn, optionally evaluate, optionally write it out.
    pub fn run(&mut self, dataset: &Dataset) -> Result<RunReport, TrainError> {
        let num_features = self.resolve_num_features(dataset);
        let mut model = Model::new(self.strategy.num_submodels(), num_features);

        if let Some(path) = self.params.model_in.clone() {
            self.logger.phase("reading model");
            model.read(&path)?;
        }

        if self.params.learn {
            self.logger.phase("learning");
            self.learn(&mut model, dataset)?;
        }

        let evaluation = if self.params.evaluate {
            self.logger.phase("evaluating");
            Some(self.evaluate(&model, dataset)?)
        } else {
            None
        };

        if let Some(path) = self.params.model_out.clone() {
            self.logger.phase("writing model");
            model.write(&path)?;
        }

        Ok(RunReport { model, evaluation })
    }

    /// Feature count: the configured value, widened to `max_id + 1` when the
    /// data set holds a larger id (with a warning if a count was configured).
    fn resolve_num_features(&self, dataset: &Dataset) -> usize {
        let max_id = dataset.max_id() as usize;
        let configured = self.params.num_features;
        if max_id >= configured {
            if configured != 0 {
                self.logger.warn(&format!(
                    "maximum feature id in data greater than num_features ({max_id} >= {configured})"
                ));
            }
            max_id + 1
        } else {
            configured
        }
    }

    /// The SGD learn loop.
    pub fn learn(&mut self, model: &mut Model, dataset: &Dataset) -> Result<(), TrainError> {
        if dataset.is_empty() {
            return Err(TrainError::EmptyDataset);
        }

        let num_iterations = self.params.num_iterations;
        for i in 0..num_iterations {
            let learning_rate = if self.params.decreasing_learning_rate {
                self.params.initial_learning_rate / (1.0 + self.params.reg_param * i as f32)
            } else {
                self.params.initial_learning_rate
            };

            // Update from loss
            let index = self.rng.gen_range(0..dataset.len());
            let mut model_updated = self.strategy.single_update(
                model,
                &dataset[index],
                learning_rate,
                self.params.margin,
            );

            // Update from regularization
            if i % self.params.reg_interval == 0 {
                match self.params.reg_type {
                    RegType::L1 => {
                        model.regularize_l1(self.params.reg_param * learning_rate);
                        model_updated = true;
                    }
                    RegType::L2 => {
                        model.regularize_l2(self.params.reg_param * learning_rate);
                        model_updated = true;
                    }
                    RegType::None => {}
                }
            }

            // Update from Pegasos ball projection. The first submodel's norm
            // is the shared radius reference for every submodel; a zero norm
            // skips the projection for this iteration.
            if self.params.pegasos_projection {
                let norm = model.submodel(0).squared_norm().sqrt();
                if norm > 0.0 {
                    let factor = 1.0 / (self.params.reg_param.sqrt() * norm);
                    if factor < 1.0 {
                        for j in 0..model.num_submodels() {
                            model.submodel_mut(j).scale_by(factor);
                        }
                        model_updated = true;
                    }
                }
            }

            // Write intermediate models
            if self.params.write_intermediate_models && model_updated {
                if let Some(base) = &self.params.model_out {
                    let mut path = base.as_os_str().to_owned();
                    path.push(format!(".{i:08x}"));
                    model.write(PathBuf::from(path))?;
                }
            }

            // Report progress
            if self.params.progress_interval > 0 && i % self.params.progress_interval == 0 {
                self.logger.progress(i as usize, num_iterations as usize);
            }
        }
        Ok(())
    }

    /// The evaluation loop: score every instance, count correct and
    /// incorrect predictions.
    pub fn evaluate(&self, model: &Model, dataset: &Dataset) -> Result<Evaluation, TrainError> {
        if dataset.is_empty() {
            return Err(TrainError::EmptyDataset);
        }

        let mut evaluation = Evaluation {
            predictions: self
                .params
                .print_predictions
                .then(|| Vec::with_capacity(dataset.len())),
            ..Evaluation::default()
        };

        for (i, instance) in dataset.iter().enumerate() {
            let prediction = self.strategy.score_and_classify(model, instance);
            if prediction.correct {
                evaluation.positive += 1;
            } else {
                evaluation.negative += 1;
            }
            if let Some(predictions) = &mut evaluation.predictions {
                predictions.push(prediction.value);
            }
            if self.params.progress_interval > 0
                && i as u32 % self.params.progress_interval == 0
            {
                self.logger.progress(i, dataset.len());
            }
        }

        self.logger.result(
            evaluation.accuracy(),
            evaluation.positive,
            evaluation.positive + evaluation.negative,
        );
        Ok(evaluation)
    }
}
