//! Dense weight vectors with lazily applied uniform scaling.
//!
//! The stored array is *unscaled*: the effective weight at index `i` is
//! `scale * stored[i]`. Uniform L2 shrinkage therefore costs O(1) (multiply
//! `scale`) instead of O(d), and sparse accumulation divides by `scale` on
//! the way in so the effective values come out right.
//!
//! The squared L2 norm of the effective weights is cached and maintained
//! incrementally on every mutation; it is never recomputed from scratch
//! inside the training loop. The delta algebra is not safe under concurrent
//! mutation; a parallel trainer would have to recompute norms under a
//! barrier instead.

use ndarray::Array1;

use crate::data::SparseInstance;

/// `sign` with `sign(0) = 0`, so L1 shrinkage leaves exact zeros alone.
#[inline]
pub(crate) fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// A dense per-class weight vector with scale factor, bias and cached
/// squared L2 norm.
///
/// Created zeroed at a fixed size; all arithmetic is f32. Sparse operands
/// must keep their feature ids below [`len`](Self::len); out-of-range ids
/// panic, and the caller validates dimensions before training starts.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightVector {
    weights: Array1<f32>,
    bias: f32,
    scale: f32,
    squared_norm: f32,
}

impl WeightVector {
    /// Create a zeroed weight vector for `size` features.
    pub fn new(size: usize) -> Self {
        Self {
            weights: Array1::zeros(size),
            bias: 0.0,
            scale: 1.0,
            squared_norm: 0.0,
        }
    }

    /// Number of features.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the vector has zero features.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Bias term. Plain f32, not subject to scaling.
    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Set the bias term.
    #[inline]
    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
    }

    /// Cached squared L2 norm of the effective (scale-applied) weights.
    #[inline]
    pub fn squared_norm(&self) -> f32 {
        self.squared_norm
    }

    /// Effective weight at `index`.
    #[inline]
    pub fn get_weight(&self, index: usize) -> f32 {
        self.scale * self.weights[index]
    }

    /// Set the effective weight at `index`.
    ///
    /// Does not touch the cached norm; only the O(d) regularization paths
    /// use this, and they restore the norm themselves.
    #[inline]
    fn set_weight(&mut self, index: usize, value: f32) {
        self.weights[index] = value / self.scale;
    }

    /// Zero all weights, reset scale to 1 and the cached norm to 0.
    ///
    /// The bias is left untouched; it has its own lifecycle.
    pub fn clear(&mut self) {
        self.weights.fill(0.0);
        self.scale = 1.0;
        self.squared_norm = 0.0;
    }

    /// Dot product with a sparse operand, O(sparse size).
    ///
    /// Accumulates over the unscaled storage and applies `scale` once at
    /// the end.
    pub fn inner_product(&self, rhs: &SparseInstance) -> f32 {
        let mut ip = 0.0f32;
        for (id, value) in rhs.iter() {
            ip += self.weights[id as usize] * value;
        }
        self.scale * ip
    }

    /// `self += rhs` (effective weights), O(sparse size).
    pub fn add(&mut self, rhs: &SparseInstance) {
        self.add_scaled(1.0, rhs);
    }

    /// `self += scalar * rhs` (effective weights), O(sparse size).
    ///
    /// The cached norm is updated through the expansion of
    /// `‖w + s·x‖² − ‖w‖² = s·(s·‖x‖² + 2·⟨w, x⟩)`, where `⟨w, x⟩` is
    /// accumulated from the pre-update stored values during the same pass.
    pub fn add_scaled(&mut self, scalar: f32, rhs: &SparseInstance) {
        let mut accum = 0.0f32;
        for (id, value) in rhs.iter() {
            let index = id as usize;
            accum += value * self.weights[index];
            self.weights[index] += scalar * value / self.scale;
        }
        self.squared_norm += scalar * (scalar * rhs.squared_norm() + 2.0 * self.scale * accum);
    }

    /// Multiply every effective weight by `factor` in O(1).
    ///
    /// Only the scale factor and the cached norm change; the dense storage
    /// is untouched.
    pub fn scale_by(&mut self, factor: f32) {
        self.scale *= factor;
        self.squared_norm *= factor * factor;
    }

    /// Soft-threshold L1 shrinkage: every effective weight moves toward zero
    /// by `factor` and is truncated to exactly zero when it lands within
    /// `factor` of it.
    ///
    /// O(d): the per-coordinate truncation is nonlinear, so unlike L2 this
    /// cannot ride on the scale factor. The cached norm is rebuilt in the
    /// same pass.
    pub fn regularize_l1(&mut self, factor: f32) {
        let mut norm = 0.0f32;
        for i in 0..self.len() {
            let mut weight = self.get_weight(i);
            weight -= sign(weight) * factor;
            if weight.abs() < factor {
                weight = 0.0;
            }
            self.set_weight(i, weight);
            norm += weight * weight;
        }
        self.squared_norm = norm;
    }

    /// L2 shrinkage by `factor`: multiply every effective weight by
    /// `1 - factor`. O(1) through the lazy scale.
    pub fn regularize_l2(&mut self, factor: f32) {
        self.scale_by(1.0 - factor);
    }
}
