//! Sparse feature vectors.
//!
//! A [`SparseInstance`] is an id-sorted sequence of `(feature id, value)`
//! pairs with a target value. The squared L2 norm and the maximum feature id
//! are maintained incrementally on every push, so the hot training loop never
//! has to rescan the pair sequence.

/// Feature id type. Ids are dense array indices into a [`WeightVector`]
/// (`crate::model::WeightVector`), so they stay within `usize` range in
/// practice; `u32` matches the on-disk format.
pub type FeatureId = u32;

/// A sparse feature vector with a target value.
///
/// Pairs must be pushed in strictly increasing id order; [`push`](Self::push)
/// rejects anything else. Instances are built once by the parser and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseInstance {
    elems: Vec<(FeatureId, f32)>,
    target: f32,
    squared_norm: f32,
    max_id: FeatureId,
}

/// Violation of the strictly-increasing feature id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("feature ids must be strictly increasing, but {prev} >= {id}")]
pub struct IdOrderError {
    /// Last id already in the vector.
    pub prev: FeatureId,
    /// The offending id.
    pub id: FeatureId,
}

impl SparseInstance {
    /// Create an empty instance with target 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty instance that can hold `capacity` pairs without
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elems: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Target value. Semantics depend on the strategy: `±1` for binary,
    /// a class index for multi-class, a bit-packed label set for multi-label.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Set the target value.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Append one `(id, value)` pair.
    ///
    /// Fails unless `id` is strictly greater than the previously pushed id.
    /// The first id may be 0. On success the cached squared norm and max id
    /// are updated.
    pub fn push(&mut self, id: FeatureId, value: f32) -> Result<(), IdOrderError> {
        if !self.elems.is_empty() && self.max_id >= id {
            return Err(IdOrderError {
                prev: self.max_id,
                id,
            });
        }
        self.elems.push((id, value));
        self.squared_norm += value * value;
        self.max_id = id;
        Ok(())
    }

    /// Cached squared L2 norm of the values.
    #[inline]
    pub fn squared_norm(&self) -> f32 {
        self.squared_norm
    }

    /// Largest feature id in the vector (0 when empty).
    #[inline]
    pub fn max_id(&self) -> FeatureId {
        self.max_id
    }

    /// Number of stored pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Whether the vector holds no pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Iterate over `(id, value)` pairs in ascending id order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, f32)> + '_ {
        self.elems.iter().copied()
    }

    /// Sparse dot product via a merge join over the two id-sorted sequences.
    ///
    /// O(|self| + |other|); returns 0.0 for disjoint supports.
    pub fn inner_product(&self, other: &SparseInstance) -> f32 {
        let mut result = 0.0f32;
        let mut left = self.elems.iter().peekable();
        let mut right = other.elems.iter().peekable();
        while let (Some(&&(lid, lval)), Some(&&(rid, rval))) = (left.peek(), right.peek()) {
            if lid < rid {
                left.next();
            } else if lid > rid {
                right.next();
            } else {
                result += lval * rval;
                left.next();
                right.next();
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn instance(pairs: &[(u32, f32)]) -> SparseInstance {
        let mut v = SparseInstance::new();
        for &(id, value) in pairs {
            v.push(id, value).unwrap();
        }
        v
    }

    #[test]
    fn push_tracks_norm_and_max_id() {
        let v = instance(&[(0, 1.0), (3, -2.0), (7, 0.5)]);
        assert_eq!(v.len(), 3);
        assert_eq!(v.max_id(), 7);
        assert_abs_diff_eq!(v.squared_norm(), 1.0 + 4.0 + 0.25);
    }

    #[test]
    fn push_rejects_duplicate_id() {
        let mut v = instance(&[(2, 1.0)]);
        let err = v.push(2, 0.5).unwrap_err();
        assert_eq!(err, IdOrderError { prev: 2, id: 2 });
    }

    #[test]
    fn push_rejects_decreasing_id() {
        let mut v = instance(&[(5, 1.0)]);
        assert!(v.push(3, 0.5).is_err());
        // The failed push must not have touched the caches.
        assert_eq!(v.len(), 1);
        assert_eq!(v.max_id(), 5);
        assert_abs_diff_eq!(v.squared_norm(), 1.0);
    }

    #[test]
    fn first_id_may_be_zero() {
        let mut v = SparseInstance::new();
        v.push(0, 0.25).unwrap();
        assert_eq!(v.max_id(), 0);
    }

    #[test]
    fn inner_product_disjoint_is_zero() {
        let a = instance(&[(1, 1.0), (3, 2.0)]);
        let b = instance(&[(0, 5.0), (2, -1.0), (4, 9.0)]);
        assert_eq!(a.inner_product(&b), 0.0);
    }

    #[test]
    fn inner_product_with_self_equals_squared_norm() {
        let v = instance(&[(1, 0.5), (4, -1.5), (9, 2.0), (10, 0.1)]);
        let brute: f32 = v.iter().map(|(_, x)| x * x).sum();
        assert_abs_diff_eq!(v.inner_product(&v), brute, epsilon = 1e-6);
        assert_abs_diff_eq!(v.inner_product(&v), v.squared_norm(), epsilon = 1e-6);
    }

    #[test]
    fn inner_product_overlapping_support() {
        let a = instance(&[(1, 2.0), (3, 1.0), (5, -1.0)]);
        let b = instance(&[(3, 4.0), (5, 2.0), (8, 7.0)]);
        assert_abs_diff_eq!(a.inner_product(&b), 4.0 - 2.0);
    }
}
