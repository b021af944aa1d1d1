//! Value inputs and formatting shared by the series variants.
//!
//! Rather than accepting "anything" and coercing at runtime, the accepted
//! shapes form a closed set resolved at compile time:
//!
//! - [`Datum`] is a single value-or-absence, with a textual fallback arm
//!   as the only dynamic path.
//! - [`Input`] widens a datum to the batch forms accepted by `insert` and
//!   `append` (a block of native values, or a block of nullable slots).
//!
//! Coercing the textual arm can still fail; that failure is a usage bug
//! (wrong data handed to the wrong series), so it panics rather than
//! returning an error. Absent data is never an error.

use std::fmt;
use std::sync::Arc;

/// A single value supplied to a series operation: present, absent, or a
/// textual fallback parsed during coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum<T> {
    /// A concrete native value.
    Present(T),
    /// Explicit absence of a value.
    Absent,
    /// Text to be parsed into the native type on coercion. Unparseable
    /// text is a fatal fault, not absent data.
    Text(String),
}

impl<T> From<T> for Datum<T> {
    fn from(v: T) -> Self {
        Datum::Present(v)
    }
}

impl<T> From<Option<T>> for Datum<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Datum::Present(v),
            None => Datum::Absent,
        }
    }
}

impl From<&str> for Datum<f64> {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

impl From<String> for Datum<f64> {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

impl From<&str> for Datum<i64> {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

impl From<String> for Datum<i64> {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

/// A value block accepted by positional insertion: a single datum or a
/// contiguous batch inserted as one unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Input<T> {
    /// One value-or-absence.
    Single(Datum<T>),
    /// A block of native values. For the float variant, NaN entries count
    /// as absent; for the int variant every entry is present.
    Batch(Vec<T>),
    /// A block of nullable slots, each absence counted explicitly.
    OptionalBatch(Vec<Option<T>>),
}

impl<T> From<Datum<T>> for Input<T> {
    fn from(d: Datum<T>) -> Self {
        Input::Single(d)
    }
}

impl<T> From<T> for Input<T> {
    fn from(v: T) -> Self {
        Input::Single(Datum::Present(v))
    }
}

impl<T> From<Option<T>> for Input<T> {
    fn from(v: Option<T>) -> Self {
        Input::Single(v.into())
    }
}

impl<T> From<Vec<T>> for Input<T> {
    fn from(batch: Vec<T>) -> Self {
        Input::Batch(batch)
    }
}

impl<T> From<Vec<Option<T>>> for Input<T> {
    fn from(batch: Vec<Option<T>>) -> Self {
        Input::OptionalBatch(batch)
    }
}

impl From<&str> for Input<f64> {
    fn from(s: &str) -> Self {
        Input::Single(s.into())
    }
}

impl From<&str> for Input<i64> {
    fn from(s: &str) -> Self {
        Input::Single(s.into())
    }
}

/// Function mapping a value-or-absence to its string form.
///
/// Installed per series via `set_value_formatter`; shared with read guards,
/// so it must be callable from multiple threads.
pub type ValueFormatter<T> = Arc<dyn Fn(Option<&T>) -> String + Send + Sync>;

/// The canonical formatter: the native `Display` form for present values,
/// the literal `"NaN"` for absence.
pub fn default_value_formatter<T: fmt::Display>() -> ValueFormatter<T> {
    Arc::new(|v: Option<&T>| match v {
        Some(v) => v.to_string(),
        None => "NaN".to_string(),
    })
}
