//! Errors raised while loading sparse data.

use super::format::ParseErrorKind;

/// Failure while loading a data set from text.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// A line failed to parse. Positions are 1-based.
    #[error("error in input:{line}:{column}: {kind}")]
    Format {
        /// 1-based line number.
        line: usize,
        /// 1-based column offset into the line.
        column: usize,
        /// Error classification.
        kind: ParseErrorKind,
    },

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
