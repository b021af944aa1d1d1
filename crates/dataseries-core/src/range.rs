//! Row-range description and resolution.
//!
//! A [`Range`] describes a contiguous sub-interval of rows without knowing
//! how many rows exist. Every range-scoped operation (`copy`, `table`,
//! forecasting) resolves the range against a concrete row count via
//! [`Range::limits`] and gets back an inclusive `(start, end)` pair or a
//! recoverable [`RangeError`].
//!
//! Resolution failures are ordinary errors, never panics: a caller asking
//! for rows that do not exist is an expected, validatable condition.

use snafu::prelude::*;

/// Errors from resolving a [`Range`] against a concrete row count.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum RangeError {
    /// The sequence has no rows, so no range resolves over it — not even
    /// the default whole-sequence range.
    #[snafu(display("Range is undefined over an empty sequence"))]
    EmptyDomain,

    /// The start bound is past the end bound.
    #[snafu(display("Invalid range: start {start} is greater than end {end}"))]
    Inverted {
        /// Requested start row (inclusive).
        start: usize,
        /// Requested end row (inclusive).
        end: usize,
    },

    /// The end bound is at or past the row count.
    #[snafu(display("Range end {end} is out of bounds for {rows} rows"))]
    OutOfBounds {
        /// Requested end row (inclusive).
        end: usize,
        /// Row count the range was resolved against.
        rows: usize,
    },
}

/// A contiguous sub-interval of rows, with both bounds optional.
///
/// `Range::default()` means the whole sequence. Explicit bounds are
/// inclusive. Bounds are `usize`, so a negative start is unrepresentable
/// by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range {
    /// First row (inclusive); `None` means row 0.
    pub start: Option<usize>,
    /// Last row (inclusive); `None` means the final row.
    pub end: Option<usize>,
}

impl Range {
    /// Range covering rows `start..=end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Range covering everything from `start` to the final row.
    pub fn from_row(start: usize) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Resolve this range against `rows` total rows.
    ///
    /// On success returns the inclusive `(start, end)` pair. Fails when the
    /// sequence is empty, the bounds are inverted, or the end bound falls
    /// outside `0..rows`.
    pub fn limits(&self, rows: usize) -> Result<(usize, usize), RangeError> {
        ensure!(rows > 0, EmptyDomainSnafu);

        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(rows - 1);

        ensure!(start <= end, InvertedSnafu { start, end });
        ensure!(end < rows, OutOfBoundsSnafu { end, rows });

        Ok((start, end))
    }
}
