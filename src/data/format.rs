//! Line parser for the sparse text format.
//!
//! One instance per line:
//!
//! ```text
//! <target> <id>:<value> <id>:<value> ... [# comment]
//! ```
//!
//! Feature ids must be strictly increasing left to right. `#` starts a
//! trailing comment anywhere on the line. Numbers are parsed as maximal
//! prefixes (C `strtof`/`strtoul` style), so a stray character inside a
//! token surfaces as a parse error at that exact column.
//!
//! Model files share this format: the target slot holds the submodel bias.

use super::sparse::{FeatureId, SparseInstance};

/// What went wrong while parsing a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// The leading target value is missing or malformed.
    #[error("can't read target value")]
    Target,
    /// A feature id is missing or malformed.
    #[error("can't read feature id")]
    FeatureId,
    /// Feature ids are not strictly increasing.
    #[error("feature ids must be strictly increasing, but {prev} >= {id}")]
    IdOrder {
        /// The previous feature id on the line.
        prev: FeatureId,
        /// The offending feature id.
        id: FeatureId,
    },
    /// The `:` separating id and value is missing.
    #[error("colon ':' expected")]
    MissingColon,
    /// A feature value is missing or malformed.
    #[error("can't read feature value")]
    FeatureValue,
}

/// A parse error with its 1-based column offset into the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("column {column}: {kind}")]
pub struct LineParseError {
    /// 1-based byte offset into the line.
    pub column: usize,
    /// Error classification.
    pub kind: ParseErrorKind,
}

/// Parse one line of sparse data format into a [`SparseInstance`].
///
/// A successful parse consumes the whole line up to an optional `#` comment.
/// Any unconsumed character that is not a comment marker is a hard failure.
pub fn parse_line(line: &str) -> Result<SparseInstance, LineParseError> {
    let mut scanner = Scanner::new(line);
    let mut instance = SparseInstance::new();

    // Target value
    scanner.skip_spaces();
    let target = scanner
        .take_float()
        .ok_or_else(|| scanner.error(ParseErrorKind::Target))?;
    instance.set_target(target);
    scanner.skip_spaces();

    // Feature pairs until end of line or comment
    let mut last_id: Option<FeatureId> = None;
    while !scanner.at_end() && scanner.peek() != Some(b'#') {
        let id_column = scanner.pos;
        let id = scanner
            .take_uint()
            .ok_or_else(|| scanner.error(ParseErrorKind::FeatureId))?;

        if let Some(prev) = last_id {
            if prev >= id {
                return Err(LineParseError {
                    column: id_column + 1,
                    kind: ParseErrorKind::IdOrder { prev, id },
                });
            }
        }
        last_id = Some(id);

        if scanner.peek() != Some(b':') {
            return Err(scanner.error(ParseErrorKind::MissingColon));
        }
        scanner.advance();

        let value = scanner
            .take_float()
            .ok_or_else(|| scanner.error(ParseErrorKind::FeatureValue))?;

        // Order was checked above; map a violation to the id column anyway
        // so the error cannot be silently lost.
        instance.push(id, value).map_err(|e| LineParseError {
            column: id_column + 1,
            kind: ParseErrorKind::IdOrder {
                prev: e.prev,
                id: e.id,
            },
        })?;

        scanner.skip_spaces();
    }

    Ok(instance)
}

/// Byte cursor over one line with maximal-prefix number scanning.
struct Scanner<'a> {
    bytes: &'a [u8],
    line: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            bytes: line.as_bytes(),
            line,
            pos: 0,
        }
    }

    fn error(&self, kind: ParseErrorKind) -> LineParseError {
        LineParseError {
            column: self.pos + 1,
            kind,
        }
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.advance();
        }
    }

    /// Consume a run of ASCII digits starting at `from`; returns the end.
    fn digits_end(&self, from: usize) -> usize {
        let mut end = from;
        while end < self.bytes.len() && self.bytes[end].is_ascii_digit() {
            end += 1;
        }
        end
    }

    /// Consume the maximal unsigned-integer prefix at the cursor.
    fn take_uint(&mut self) -> Option<FeatureId> {
        let end = self.digits_end(self.pos);
        if end == self.pos {
            return None;
        }
        let parsed = self.line[self.pos..end].parse::<FeatureId>().ok()?;
        self.pos = end;
        Some(parsed)
    }

    /// Consume the maximal float prefix at the cursor, `strtof` style:
    /// `[+-]? digits [. digits*] [(e|E) [+-]? digits]` or `[+-]? . digits ...`.
    /// A dangling exponent marker is left unconsumed, as `strtof` does.
    fn take_float(&mut self) -> Option<f32> {
        let start = self.pos;
        let mut end = start;

        if matches!(self.bytes.get(end), Some(b'+') | Some(b'-')) {
            end += 1;
        }
        let int_end = self.digits_end(end);
        let mut has_digits = int_end > end;
        end = int_end;

        if self.bytes.get(end) == Some(&b'.') {
            let frac_end = self.digits_end(end + 1);
            if frac_end > end + 1 || has_digits {
                has_digits = has_digits || frac_end > end + 1;
                end = frac_end;
            }
        }
        if !has_digits {
            return None;
        }

        if matches!(self.bytes.get(end), Some(b'e') | Some(b'E')) {
            let mut exp_end = end + 1;
            if matches!(self.bytes.get(exp_end), Some(b'+') | Some(b'-')) {
                exp_end += 1;
            }
            let exp_digits_end = self.digits_end(exp_end);
            if exp_digits_end > exp_end {
                end = exp_digits_end;
            }
        }

        let parsed = self.line[start..end].parse::<f32>().ok()?;
        self.pos = end;
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_target_and_pairs() {
        let v = parse_line("1.0 1:0.5 3:-2 10:1e-2").unwrap();
        assert_eq!(v.target(), 1.0);
        let pairs: Vec<_> = v.iter().collect();
        assert_eq!(pairs, vec![(1, 0.5), (3, -2.0), (10, 0.01)]);
        assert_eq!(v.max_id(), 10);
    }

    #[test]
    fn parses_target_only_line() {
        let v = parse_line("-1").unwrap();
        assert_eq!(v.target(), -1.0);
        assert!(v.is_empty());
    }

    #[test]
    fn comment_terminates_line() {
        let v = parse_line("2 1:1.5 # trailing words: 3:4").unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v.target(), 2.0);
    }

    #[test]
    fn comment_may_touch_a_value() {
        // strtof stops at '#', then the comment eats the rest.
        let v = parse_line("1 2:3#comment").unwrap();
        let pairs: Vec<_> = v.iter().collect();
        assert_eq!(pairs, vec![(2, 3.0)]);
    }

    #[test]
    fn id_zero_is_accepted() {
        let v = parse_line("0.5 0:1 1:2").unwrap();
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn non_increasing_id_pinpoints_second_id() {
        let err = parse_line("1.0 3:0.5 2:0.1").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::IdOrder { prev: 3, id: 2 }
        );
        // "1.0 3:0.5 2:0.1" - the offending id starts at column 11.
        assert_eq!(err.column, 11);
    }

    #[rstest]
    #[case("", 1, ParseErrorKind::Target)]
    #[case("   ", 4, ParseErrorKind::Target)]
    #[case("abc", 1, ParseErrorKind::Target)]
    #[case("# just a comment", 1, ParseErrorKind::Target)]
    #[case("1.0 x:1", 5, ParseErrorKind::FeatureId)]
    #[case("1.0 2 3", 6, ParseErrorKind::MissingColon)]
    #[case("1.0 2:", 7, ParseErrorKind::FeatureValue)]
    #[case("1.0 2:x", 7, ParseErrorKind::FeatureValue)]
    #[case("1.0 2:1 2:1", 9, ParseErrorKind::IdOrder { prev: 2, id: 2 })]
    fn error_columns(
        #[case] line: &str,
        #[case] column: usize,
        #[case] kind: ParseErrorKind,
    ) {
        let err = parse_line(line).unwrap_err();
        assert_eq!(err.kind, kind, "line {line:?}");
        assert_eq!(err.column, column, "line {line:?}");
    }

    #[test]
    fn dangling_exponent_is_not_consumed() {
        // "1e" parses as 1.0 with "e" left over, which then fails as a
        // feature id, exactly like strtof followed by strtoul.
        let err = parse_line("1e").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::FeatureId);
        assert_eq!(err.column, 2);
    }

    #[test]
    fn negative_values_and_signs() {
        let v = parse_line("-1.5 1:-0.25 2:+3").unwrap();
        assert_eq!(v.target(), -1.5);
        let pairs: Vec<_> = v.iter().collect();
        assert_eq!(pairs, vec![(1, -0.25), (2, 3.0)]);
    }
}
