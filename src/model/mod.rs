//! Linear models: ordered submodel collections with text persistence.
//!
//! A [`Model`] holds one [`WeightVector`] per class (binary: 1, multi-class:
//! `num_classes`, multi-label: `num_labels`), all sharing the same feature
//! dimension. Bulk regularization fans out to every submodel.
//!
//! # Model Files
//!
//! One line per submodel, in submodel order:
//!
//! ```text
//! <bias> <id>:<weight> <id>:<weight> ...
//! ```
//!
//! Only nonzero effective weights are written, ids ascending. Reading reuses
//! the data line parser: the parsed target becomes the bias and the pairs
//! become the weights.

mod weight_vector;

pub use weight_vector::WeightVector;

pub(crate) use weight_vector::sign;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::{Index, IndexMut};
use std::path::Path;

use crate::data::{parse_line, ParseErrorKind};

/// Failure while reading or writing a model file.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A model line failed to parse. Positions are 1-based.
    #[error("error in model:{line}:{column}: {kind}")]
    Format {
        /// 1-based line number (== submodel index + 1).
        line: usize,
        /// 1-based column offset into the line.
        column: usize,
        /// Error classification.
        kind: ParseErrorKind,
    },

    /// The file ended before every submodel had a line.
    #[error("model file has {found} submodel lines, expected {expected}")]
    MissingSubmodels {
        /// Submodels the model was initialized with.
        expected: usize,
        /// Lines actually present.
        found: usize,
    },

    /// A stored weight id does not fit the configured feature dimension.
    #[error("model line {line} has feature id {max_id}, but the model holds {num_features} features")]
    DimensionMismatch {
        /// 1-based line number.
        line: usize,
        /// Largest id on the offending line.
        max_id: u32,
        /// Feature dimension of the model.
        num_features: usize,
    },

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An ordered collection of [`WeightVector`] submodels.
#[derive(Debug, Clone)]
pub struct Model {
    submodels: Vec<WeightVector>,
}

impl Model {
    /// Allocate `num_submodels` zeroed weight vectors of `num_features` each.
    pub fn new(num_submodels: usize, num_features: usize) -> Self {
        Self {
            submodels: vec![WeightVector::new(num_features); num_submodels],
        }
    }

    /// Number of submodels.
    #[inline]
    pub fn num_submodels(&self) -> usize {
        self.submodels.len()
    }

    /// Shared feature dimension (0 for a model without submodels).
    #[inline]
    pub fn num_features(&self) -> usize {
        self.submodels.first().map_or(0, WeightVector::len)
    }

    /// Submodel at `index`.
    #[inline]
    pub fn submodel(&self, index: usize) -> &WeightVector {
        &self.submodels[index]
    }

    /// Mutable submodel at `index`.
    #[inline]
    pub fn submodel_mut(&mut self, index: usize) -> &mut WeightVector {
        &mut self.submodels[index]
    }

    /// Apply L1 shrinkage to every submodel.
    pub fn regularize_l1(&mut self, factor: f32) {
        for submodel in &mut self.submodels {
            submodel.regularize_l1(factor);
        }
    }

    /// Apply L2 shrinkage to every submodel.
    pub fn regularize_l2(&mut self, factor: f32) {
        for submodel in &mut self.submodels {
            submodel.regularize_l2(factor);
        }
    }

    /// Write the model to a writer, one line per submodel.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ModelError> {
        for submodel in &self.submodels {
            write!(writer, "{} ", submodel.bias())?;
            for i in 0..submodel.len() {
                let weight = submodel.get_weight(i);
                if weight != 0.0 {
                    write!(writer, "{i}:{weight} ")?;
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Write the model to a file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read submodel lines from a reader into this model.
    ///
    /// Expects exactly [`num_submodels`](Self::num_submodels) parseable
    /// lines whose ids all fit the model's feature dimension. Each submodel
    /// is cleared, accumulated from the parsed pairs and given the parsed
    /// target as its bias.
    pub fn read_from<R: BufRead>(&mut self, reader: R) -> Result<(), ModelError> {
        let mut lines = reader.lines();
        for index in 0..self.submodels.len() {
            let line = match lines.next() {
                Some(line) => line?,
                None => {
                    return Err(ModelError::MissingSubmodels {
                        expected: self.submodels.len(),
                        found: index,
                    })
                }
            };
            let parsed = parse_line(&line).map_err(|e| ModelError::Format {
                line: index + 1,
                column: e.column,
                kind: e.kind,
            })?;
            if !parsed.is_empty() && parsed.max_id() as usize >= self.num_features() {
                return Err(ModelError::DimensionMismatch {
                    line: index + 1,
                    max_id: parsed.max_id(),
                    num_features: self.num_features(),
                });
            }
            let submodel = &mut self.submodels[index];
            submodel.clear();
            submodel.add(&parsed);
            submodel.set_bias(parsed.target());
        }
        Ok(())
    }

    /// Read a model from a file.
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ModelError> {
        let file = File::open(path)?;
        self.read_from(BufReader::new(file))
    }
}

impl Index<usize> for Model {
    type Output = WeightVector;

    #[inline]
    fn index(&self, index: usize) -> &WeightVector {
        &self.submodels[index]
    }
}

impl IndexMut<usize> for Model {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut WeightVector {
        &mut self.submodels[index]
    }
}
