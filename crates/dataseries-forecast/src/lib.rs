//! Forecasting functions over the `dataseries` read contract.
//!
//! The functions here are leaf consumers: they read a series through its
//! public contract (row count, range resolution, raw value access under a
//! read guard) and produce a brand-new series as output. They impose no
//! extra invariants on the series itself.
//!
//! Long-running computations accept a cancellation flag and check it
//! before every unit of work, so a caller can abort a forecast from
//! another thread without waiting for the loop to finish.
#![deny(missing_docs)]

use std::sync::atomic::{AtomicBool, Ordering};

use snafu::prelude::*;

use dataseries_core::{Float64Series, RangeError};

pub use dataseries_core::Range;

/// Errors from forecast validation and execution.
///
/// All of these are expected, validatable conditions the caller is meant
/// to check — unlike an out-of-range row index, which faults.
#[derive(Debug, Snafu)]
pub enum ForecastError {
    /// The series holds no rows at all.
    #[snafu(display("no values in series range"))]
    EmptyRange,

    /// The resolved window holds fewer than two observations, so the
    /// smoothing recursion has nothing to smooth.
    #[snafu(display("need at least two observations in range, got {count}"))]
    NotEnoughObservations {
        /// Number of observations the resolved window actually holds.
        count: usize,
    },

    /// The requested forecast horizon is zero.
    #[snafu(display("forecast horizon must be greater than 0"))]
    InvalidHorizon,

    /// The smoothing coefficient is outside `[0, 1]`.
    #[snafu(display("alpha must be within [0, 1], got {alpha}"))]
    InvalidAlpha {
        /// The rejected coefficient.
        alpha: f64,
    },

    /// The range did not resolve against the series' row count.
    #[snafu(display("invalid forecast range: {source}"))]
    Range {
        /// Underlying range resolution error.
        source: RangeError,
    },

    /// The cancellation flag was raised mid-computation.
    #[snafu(display("forecast cancelled"))]
    Cancelled,
}

/// Simple exponential smoothing: project `horizon` values past the end of
/// the historical window.
///
/// The level estimate starts at the first observation and folds each
/// subsequent one in with weight `alpha`:
///
/// ```text
/// S_0 = x[start]
/// S_i = alpha * x_i + (1 - alpha) * S_{i-1}
/// ```
///
/// Projection continues the same recursion with the last observation held
/// fixed. The result is a new `"forecast"` series of exactly `horizon`
/// rows; the input series is never modified.
///
/// `cancel` is checked before every historical step and every projection
/// step; raising it aborts with [`ForecastError::Cancelled`].
///
/// # Examples
///
/// ```
/// use std::sync::atomic::AtomicBool;
/// use dataseries_core::{Float64Series, Range, Series};
/// use dataseries_forecast::simple_exponential_smoothing;
///
/// let history = Float64Series::new("demand", None, [10.0, 12.0, 13.0, 12.0, 15.0]);
/// let cancel = AtomicBool::new(false);
///
/// let forecast =
///     simple_exponential_smoothing(&cancel, &history, 0.5, 2, Range::default()).unwrap();
/// assert_eq!(forecast.value(0), Some(14.25));
/// assert_eq!(forecast.value(1), Some(14.625));
/// ```
pub fn simple_exponential_smoothing(
    cancel: &AtomicBool,
    series: &Float64Series,
    alpha: f64,
    horizon: usize,
    range: Range,
) -> Result<Float64Series, ForecastError> {
    let guard = series.read();

    let count = guard.nrows();
    ensure!(count > 0, EmptyRangeSnafu);

    let (start, end) = range.limits(count).context(RangeSnafu)?;
    ensure!(
        end - start >= 1,
        NotEnoughObservationsSnafu {
            count: end - start + 1_usize,
        }
    );
    ensure!(horizon > 0, InvalidHorizonSnafu);
    ensure!((0.0..=1.0).contains(&alpha), InvalidAlphaSnafu { alpha });

    let values = guard.values();

    let mut level = values[start];
    for &xt in &values[start + 1..=end] {
        ensure!(!cancel.load(Ordering::Relaxed), CancelledSnafu);
        level = alpha * xt + (1.0 - alpha) * level;
    }

    let last = values[end];
    let mut forecast = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        ensure!(!cancel.load(Ordering::Relaxed), CancelledSnafu);
        level = alpha * last + (1.0 - alpha) * level;
        forecast.push(level);
    }

    drop(guard);
    Ok(Float64Series::new("forecast", None, forecast))
}
