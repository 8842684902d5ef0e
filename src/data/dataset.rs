//! Data sets of sparse instances.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::Path;

use super::error::DataError;
use super::format::parse_line;
use super::sparse::{FeatureId, SparseInstance};

/// An ordered, immutable collection of [`SparseInstance`]s.
///
/// Tracks the maximum feature id across all instances, which sizes the model
/// when no explicit feature count is configured.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    instances: Vec<SparseInstance>,
    max_id: FeatureId,
}

impl Dataset {
    /// Create an empty data set, reserving room for `capacity_hint` instances
    /// when the hint is nonzero.
    pub fn with_capacity(capacity_hint: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity_hint),
            max_id: 0,
        }
    }

    /// Load a data set from a buffered reader, one instance per line.
    ///
    /// The first malformed line aborts the whole load with its 1-based
    /// line and column position.
    pub fn from_reader<R: BufRead>(reader: R, capacity_hint: usize) -> Result<Self, DataError> {
        let mut dataset = Self::with_capacity(capacity_hint);
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let instance = parse_line(&line).map_err(|e| DataError::Format {
                line: index + 1,
                column: e.column,
                kind: e.kind,
            })?;
            if instance.max_id() > dataset.max_id {
                dataset.max_id = instance.max_id();
            }
            dataset.instances.push(instance);
        }
        Ok(dataset)
    }

    /// Load a data set from a file.
    pub fn from_path<P: AsRef<Path>>(path: P, capacity_hint: usize) -> Result<Self, DataError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), capacity_hint)
    }

    /// Number of instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the data set holds no instances.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Largest feature id seen across all instances (0 when empty).
    #[inline]
    pub fn max_id(&self) -> FeatureId {
        self.max_id
    }

    /// Instance at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> &SparseInstance {
        &self.instances[index]
    }

    /// Iterate over instances in load order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, SparseInstance> {
        self.instances.iter()
    }
}

impl Index<usize> for Dataset {
    type Output = SparseInstance;

    #[inline]
    fn index(&self, index: usize) -> &SparseInstance {
        &self.instances[index]
    }
}
