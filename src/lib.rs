//! solin: sparse online linear learning.
//!
//! Trains linear classification models from sparse feature vectors using
//! online stochastic sub-gradient descent, with hinge-loss margin updates
//! and lazily scaled L2 shrinkage.
//!
//! # Key Types
//!
//! - [`Trainer`] / [`TrainerParams`] - The SGD driver and its configuration
//! - [`Strategy`] - Binary / multi-class / multi-label update rules
//! - [`Model`] / [`WeightVector`] - Per-class dense weights with lazy scaling
//! - [`Dataset`] / [`SparseInstance`] - Sparse training data
//!
//! # Training
//!
//! Load a [`Dataset`] from the line-oriented sparse text format, pick a
//! [`Strategy`], fill in [`TrainerParams`], then call [`Trainer::run`].
//! See the [`training`] module for the update rules and loop mechanics.
//!
//! # Model Files
//!
//! Models persist as one text line per submodel (`bias id:weight ...`),
//! reusing the data line parser on the way back in. See [`model`].

// Re-export approx traits for users who want to compare scores
pub use approx;

pub mod data;
pub mod model;
pub mod training;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Data types (sparse instances and data sets)
pub use data::{DataError, Dataset, ParseErrorKind, SparseInstance};

// Model types
pub use model::{Model, ModelError, WeightVector};

// Training types (trainer, update strategies, configuration)
pub use training::{
    ConfigError, Evaluation, RegType, RunReport, Strategy, TrainError, Trainer, TrainerParams,
    Verbosity,
};
