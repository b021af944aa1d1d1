//! The polymorphic series contract and its concrete variants.
//!
//! Both variants expose the same capability set through the [`Series`]
//! trait: naming, row count, indexed get/set, null accounting, range-scoped
//! copy, ordering (sort, swap), and textual materialization. They differ
//! only in how absence is stored:
//!
//! - [`float::Float64Series`] keeps dense `f64` storage and encodes absence
//!   as the NaN bit pattern.
//! - [`int::Int64Series`] keeps one nullable slot per row, since the
//!   integer domain has no spare encoding.
//!
//! Row indices handed to `value`, `update`, `remove`, and `swap` must be in
//! `0..nrows()`; an out-of-range index is a usage bug and faults the call
//! (index panic) rather than returning an error. Callers validate through
//! `nrows()` or [`crate::range::Range::limits`] first.

pub mod float;
pub mod int;
pub(crate) mod render;

use std::cmp::Ordering;
use std::fmt;

use log::warn;

use crate::range::{Range, RangeError};
use crate::value::{Datum, Input, ValueFormatter};

/// Pre-sizing hints for a new series.
///
/// `size` rows exist up front; rows not covered by the initial value list
/// start absent and are counted into the null total. `capacity` reserves
/// storage beyond the initial size so early appends avoid reallocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesInit {
    /// Number of rows the series starts with.
    pub size: usize,
    /// Storage capacity to reserve up front.
    pub capacity: usize,
}

impl SeriesInit {
    /// Resolve the hints to a concrete `(size, capacity)` pair.
    ///
    /// A nonzero capacity below the requested size is almost certainly a
    /// caller mistake; it is raised to the size with a warning rather than
    /// rejected.
    pub(crate) fn normalized(self) -> (usize, usize) {
        let mut capacity = self.capacity;
        if self.size > capacity {
            if capacity != 0 {
                warn!(
                    "series init capacity {capacity} is below size {}; raising capacity to size",
                    self.size
                );
            }
            capacity = self.size;
        }
        (self.size, capacity)
    }
}

/// Sort direction for [`Series::sort`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest present value first.
    #[default]
    Ascending,
    /// Largest present value first.
    Descending,
}

/// Compare two value-or-absence slots for sorting.
///
/// Absence sorts ahead of every present value in *both* directions; only
/// the present-present comparison is reversed for descending. Two absent
/// slots compare equal, so a stable sort never reorders them — their
/// relative input order survives ascending and descending sorts alike.
/// Downstream consumers depend on this clustering, so it is part of the
/// contract, not an implementation detail.
pub(crate) fn order_slots<T: PartialOrd>(
    a: Option<&T>,
    b: Option<&T>,
    order: SortOrder,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(y).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        }
    }
}

/// The capability set both series variants implement.
///
/// Every method is `&self`; each call acquires the series' internal
/// reader/writer lock for its own duration. To batch several calls under
/// one lock acquisition, use the variant's `read()` / `write()` guards,
/// which expose the same operations without re-locking.
pub trait Series: fmt::Display {
    /// The native value type held by the series.
    type Native: Clone + PartialEq + PartialOrd + fmt::Display;

    /// Display label of the series.
    fn name(&self) -> String;

    /// Replace the display label.
    fn rename(&self, name: &str);

    /// Static name of the native data type (`"float64"` / `"int64"`).
    fn dtype(&self) -> &'static str;

    /// Current row count.
    fn nrows(&self) -> usize;

    /// Value at `row`, or `None` for an absent slot.
    ///
    /// Faults if `row` is outside `0..nrows()`.
    fn value(&self, row: usize) -> Option<Self::Native>;

    /// The active formatter applied to [`Series::value`].
    fn value_string(&self, row: usize) -> String;

    /// Insert `val` at row 0, shifting all rows right by one.
    ///
    /// With spare trailing capacity the shift happens in place; storage is
    /// only reallocated when full.
    fn prepend(&self, val: impl Into<Datum<Self::Native>>);

    /// Insert `val` at the end and return the row index it was given.
    fn append(&self, val: impl Into<Input<Self::Native>>) -> usize;

    /// Insert a single value or a contiguous batch at `row`, shifting
    /// later rows right by the block length.
    fn insert(&self, row: usize, val: impl Into<Input<Self::Native>>);

    /// Delete `row`, shifting all later rows left by one.
    fn remove(&self, row: usize);

    /// Overwrite `row` with `val`, reconciling the null count on
    /// absent/present transitions.
    fn update(&self, row: usize, val: impl Into<Datum<Self::Native>>);

    /// Exchange two rows. A no-op — without touching the lock — when
    /// `row1 == row2`.
    fn swap(&self, row1: usize, row2: usize);

    /// Stable in-place sort. See [`order_slots`] for the absence policy.
    fn sort(&self, order: SortOrder);

    /// Deep, independently-owned snapshot of the rows in `range`
    /// (default: the whole series). An empty series copies to an empty
    /// series without resolving the range.
    fn copy(&self, range: Option<Range>) -> Result<Self, RangeError>
    where
        Self: Sized;

    /// Render the rows in `range` (default: all) as a bordered table.
    fn table(&self, range: Option<Range>) -> Result<String, RangeError>;

    /// Whether any slot is currently absent.
    fn contains_nil(&self) -> bool;

    /// Install a custom row formatter; `None` restores the canonical
    /// default, which renders absence as `"NaN"`.
    fn set_value_formatter(&self, formatter: Option<ValueFormatter<Self::Native>>);

    /// Total-order equality over value-or-absence: two absences are equal,
    /// mixed is not.
    fn is_equal(&self, a: Option<&Self::Native>, b: Option<&Self::Native>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Total-order "less than" over value-or-absence: absence is less than
    /// everything, including another absence.
    fn is_less_than(&self, a: Option<&Self::Native>, b: Option<&Self::Native>) -> bool {
        match (a, b) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(x), Some(y)) => x < y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_normalization_raises_capacity_to_size() {
        let init = SeriesInit {
            size: 10,
            capacity: 4,
        };
        assert_eq!(init.normalized(), (10, 10));

        let init = SeriesInit {
            size: 3,
            capacity: 0,
        };
        assert_eq!(init.normalized(), (3, 3));

        let init = SeriesInit {
            size: 3,
            capacity: 8,
        };
        assert_eq!(init.normalized(), (3, 8));
    }

    #[test]
    fn absence_orders_first_in_both_directions() {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            assert_eq!(order_slots(None, Some(&1.0), order), Ordering::Less);
            assert_eq!(order_slots(Some(&1.0), None, order), Ordering::Greater);
            // Absent ties never invert; stable sorts keep their input order.
            assert_eq!(order_slots::<f64>(None, None, order), Ordering::Equal);
        }
    }

    #[test]
    fn present_comparison_reverses_for_descending() {
        assert_eq!(
            order_slots(Some(&1.0), Some(&2.0), SortOrder::Ascending),
            Ordering::Less
        );
        assert_eq!(
            order_slots(Some(&1.0), Some(&2.0), SortOrder::Descending),
            Ordering::Greater
        );
        // Duplicate present values tie under both directions, preserving
        // stability.
        assert_eq!(
            order_slots(Some(&5i64), Some(&5i64), SortOrder::Ascending),
            Ordering::Equal
        );
        assert_eq!(
            order_slots(Some(&5i64), Some(&5i64), SortOrder::Descending),
            Ordering::Equal
        );
    }
}
