//! Per-variant update and scoring rules.
//!
//! [`Strategy`] is a closed set of three variants sharing one contract:
//! a loss-driven stochastic update against a single instance, and a
//! score-and-classify rule for evaluation. The trainer owns one variant and
//! dispatches on it; there is no open extension point.
//!
//! - [`Strategy::Binary`]: one submodel, hinge-loss margin update
//! - [`Strategy::MultiClass`]: one submodel per class, Crammer-Singer style
//!   max-violator update
//! - [`Strategy::MultiLabel`]: one submodel per bit of the packed label set,
//!   independent binary updates at a fixed unit margin

use crate::data::SparseInstance;
use crate::model::{sign, Model};

use super::trainer::ConfigError;

/// Label targets ride through an f32, which is exact only up to 2^24.
const MAX_LABELS: usize = 24;

/// The outcome of scoring one instance during evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted value in target space: a sign for binary, a class index
    /// for multi-class, a packed label set for multi-label.
    pub value: f32,
    /// Whether the prediction counts as correct against the target.
    pub correct: bool,
}

/// Update strategy: which kind of classifier is being trained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Binary classification with targets `±1`.
    Binary,
    /// Multi-class classification with class indices `0..num_classes`.
    MultiClass {
        /// Number of classes; one submodel each.
        num_classes: usize,
    },
    /// Multi-label classification with bit-packed targets in
    /// `0..2^num_labels`.
    MultiLabel {
        /// Number of label bits; one submodel each.
        num_labels: usize,
    },
}

impl Strategy {
    /// Submodels this strategy needs: 1, `num_classes`, or `num_labels`.
    pub fn num_submodels(&self) -> usize {
        match *self {
            Strategy::Binary => 1,
            Strategy::MultiClass { num_classes } => num_classes,
            Strategy::MultiLabel { num_labels } => num_labels,
        }
    }

    /// Check class/label counts before training starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Strategy::Binary => Ok(()),
            Strategy::MultiClass { num_classes } if num_classes < 2 => {
                Err(ConfigError::InvalidClassCount { num_classes })
            }
            Strategy::MultiClass { .. } => Ok(()),
            Strategy::MultiLabel { num_labels }
                if num_labels == 0 || num_labels > MAX_LABELS =>
            {
                Err(ConfigError::InvalidLabelCount { num_labels })
            }
            Strategy::MultiLabel { .. } => Ok(()),
        }
    }

    /// Perform one stochastic update against `instance`.
    ///
    /// Returns whether any weight changed. Multi-class targets must lie in
    /// `0..num_classes`; an out-of-range class index panics on submodel
    /// access.
    pub fn single_update(
        &self,
        model: &mut Model,
        instance: &SparseInstance,
        learning_rate: f32,
        margin: f32,
    ) -> bool {
        match *self {
            Strategy::Binary => binary_update(model, instance, learning_rate, margin),
            Strategy::MultiClass { .. } => {
                multi_class_update(model, instance, learning_rate, margin)
            }
            Strategy::MultiLabel { .. } => multi_label_update(model, instance, learning_rate),
        }
    }

    /// Score `instance` and decide whether the prediction matches the target.
    pub fn score_and_classify(&self, model: &Model, instance: &SparseInstance) -> Prediction {
        match *self {
            Strategy::Binary => binary_classify(model, instance),
            Strategy::MultiClass { .. } => multi_class_classify(model, instance),
            Strategy::MultiLabel { .. } => multi_label_classify(model, instance),
        }
    }
}

// =============================================================================
// Binary
// =============================================================================

fn binary_update(
    model: &mut Model,
    instance: &SparseInstance,
    learning_rate: f32,
    margin: f32,
) -> bool {
    let bias = model[0].bias();
    let score = model[0].inner_product(instance) + bias;
    let target_sign = sign(instance.target());

    if target_sign * score < margin {
        model[0].add_scaled(learning_rate * target_sign, instance);
        model[0].set_bias(bias + learning_rate * target_sign);
        true
    } else {
        false
    }
}

fn binary_classify(model: &Model, instance: &SparseInstance) -> Prediction {
    let score = model[0].inner_product(instance) + model[0].bias();
    let target = instance.target();
    Prediction {
        value: sign(score),
        // Matching signs, or the degenerate exact match (covers 0 == 0).
        correct: score * target > 0.0 || score == target,
    }
}

// =============================================================================
// Multi-class
// =============================================================================

fn multi_class_update(
    model: &mut Model,
    instance: &SparseInstance,
    learning_rate: f32,
    margin: f32,
) -> bool {
    let target = instance.target() as usize;
    let bias = model[target].bias();
    let score = model[target].inner_product(instance) + bias;

    // Max margin violator: highest-scoring class other than the target,
    // ties broken by the first class encountered.
    let mut max_class = target;
    let mut max_bias = 0.0f32;
    let mut max_score = f32::MIN;
    for c in 0..model.num_submodels() {
        if c == target {
            continue;
        }
        let tmp_bias = model[c].bias();
        let tmp_score = model[c].inner_product(instance) + tmp_bias;
        if max_score < tmp_score {
            max_class = c;
            max_bias = tmp_bias;
            max_score = tmp_score;
        }
    }

    if max_class != target && score - max_score < margin {
        model[target].add_scaled(learning_rate, instance);
        model[target].set_bias(bias + learning_rate);
        model[max_class].add_scaled(-learning_rate, instance);
        model[max_class].set_bias(max_bias - learning_rate);
        true
    } else {
        false
    }
}

fn multi_class_classify(model: &Model, instance: &SparseInstance) -> Prediction {
    let mut best_class = 0usize;
    let mut best_score = f32::MIN;
    for c in 0..model.num_submodels() {
        let score = model[c].inner_product(instance) + model[c].bias();
        if score > best_score {
            best_score = score;
            best_class = c;
        }
    }
    Prediction {
        value: best_class as f32,
        correct: best_class as f32 == instance.target(),
    }
}

// =============================================================================
// Multi-label
// =============================================================================

fn multi_label_update(model: &mut Model, instance: &SparseInstance, learning_rate: f32) -> bool {
    let target = instance.target() as u32;
    let mut updated = false;

    for j in 0..model.num_submodels() {
        let target_sign = if target & (1 << j) != 0 { 1.0 } else { -1.0 };
        let bias = model[j].bias();
        let score = model[j].inner_product(instance) + bias;

        // Fixed unit margin, independent of the configured margin.
        if target_sign * score < 1.0 {
            model[j].add_scaled(target_sign * learning_rate, instance);
            model[j].set_bias(bias + learning_rate * target_sign);
            updated = true;
        }
    }
    updated
}

fn multi_label_classify(model: &Model, instance: &SparseInstance) -> Prediction {
    let mut predicted = 0u32;
    for j in 0..model.num_submodels() {
        let score = model[j].inner_product(instance) + model[j].bias();
        if score > 0.0 {
            predicted |= 1 << j;
        }
    }
    Prediction {
        value: predicted as f32,
        // All bits must match; partially correct label sets do not count.
        correct: predicted == instance.target() as u32,
    }
}
