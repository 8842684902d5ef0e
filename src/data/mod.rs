//! Sparse data handling.
//!
//! # Overview
//!
//! - [`SparseInstance`]: id-sorted `(feature id, value)` pairs with a target,
//!   cached squared L2 norm and cached max id
//! - [`Dataset`]: ordered instances loaded from the line-oriented text format
//! - [`parse_line`]: the shared line parser (data files and model files use
//!   the same wire format)
//!
//! # Wire Format
//!
//! ```text
//! <target> <id>:<value> <id>:<value> ... [# comment]
//! ```
//!
//! Ids are strictly increasing on every line; the first malformed line aborts
//! a load with a 1-based `line:column` position.

mod dataset;
mod error;
mod format;
mod sparse;

pub use dataset::Dataset;
pub use error::DataError;
pub use format::{parse_line, LineParseError, ParseErrorKind};
pub use sparse::{FeatureId, IdOrderError, SparseInstance};
