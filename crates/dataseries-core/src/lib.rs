//! Typed, lockable columnar series with explicit null tracking.
//!
//! This crate provides the foundational pieces for `dataseries`:
//!
//! - A `Range` value type describing a contiguous row sub-interval,
//!   resolved against a concrete row count before use (`range` module).
//! - A closed value-coercion layer (`Datum` / `Input`) that replaces
//!   dynamic "anything goes" call sites with tagged unions resolved at
//!   compile time (`value` module).
//! - The polymorphic `Series` contract and its two concrete variants:
//!   `Float64Series`, which encodes absence as the NaN sentinel directly
//!   in dense storage, and `Int64Series`, which stores one nullable slot
//!   per row since the integer domain has no spare bit pattern
//!   (`series` module).
//!
//! Every series owns a reader/writer lock guarding its name, storage, and
//! null count as one unit. Public methods lock per call; the `read()` /
//! `write()` guards let callers batch several operations atomically
//! without re-entering the lock.
//!
//! Higher-level crates (forecasting, rendering front ends) are expected to
//! consume the series through this contract rather than re-implementing
//! the storage and null accounting.
#![deny(missing_docs)]

pub mod range;
pub mod series;
pub mod value;

pub use range::{Range, RangeError};
pub use series::float::Float64Series;
pub use series::int::Int64Series;
pub use series::{Series, SeriesInit, SortOrder};
pub use value::{Datum, Input, ValueFormatter};
