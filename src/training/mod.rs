//! Training infrastructure.
//!
//! This module provides the SGD driver and its collaborators:
//!
//! - [`Trainer`], [`TrainerParams`], [`RegType`]: the iteration loop with
//!   interleaved regularization, projection and checkpointing
//! - [`Strategy`]: binary / multi-class / multi-label update and scoring
//!   rules
//! - [`Evaluation`], [`RunReport`]: what a run produces
//! - [`TrainingLogger`], [`Verbosity`]: structured logging
//!
//! Training is single-threaded and synchronous; the instance sampler is the
//! sole source of nondeterminism and is seeded from [`TrainerParams::seed`].

mod logger;
mod strategy;
mod trainer;

pub use logger::{TrainingLogger, Verbosity};
pub use strategy::{Prediction, Strategy};
pub use trainer::{
    ConfigError, Evaluation, RegType, RunReport, TrainError, Trainer, TrainerParams,
};
