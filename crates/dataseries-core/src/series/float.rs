//! Dense-sentinel series for float64 data.
//!
//! Absence is encoded as the NaN bit pattern directly in the value
//! storage; there is no side presence flag. This keeps the storage a plain
//! `Vec<f64>` (one machine word per row, no per-slot boxing) at the cost
//! of treating NaN specially in every null-accounting and ordering path.
//!
//! The locking model has two layers. Public [`Series`] methods lock the
//! internal reader/writer lock for the duration of one call and delegate
//! to [`FloatInner`], whose methods assume the lock is held — so internal
//! call paths can never re-enter the lock. [`Float64Series::read`] and
//! [`Float64Series::write`] hand out block-scoped guards exposing the same
//! operations lock-free, for callers that need several calls to be atomic
//! as a batch.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::range::{Range, RangeError};
use crate::series::{order_slots, render, Series, SeriesInit, SortOrder};
use crate::value::{default_value_formatter, Datum, Input, ValueFormatter};

/// Static data type name reported by [`Series::dtype`].
const DTYPE: &str = "float64";

/// Coerce a datum to the sentinel encoding.
///
/// Unparseable text is a usage bug, not absent data: it faults the call.
fn coerce(val: Datum<f64>) -> f64 {
    match val {
        Datum::Present(v) => v,
        Datum::Absent => f64::NAN,
        Datum::Text(raw) => match raw.parse::<f64>() {
            Ok(v) => v,
            Err(_) => panic!("cannot coerce {raw:?} into a float64 value"),
        },
    }
}

/// A named, mutable series of `f64` values with NaN-encoded absence.
///
/// Multiple threads may hold references to the same series; every field is
/// guarded by one reader/writer lock as a single unit.
pub struct Float64Series {
    inner: RwLock<FloatInner>,
}

impl fmt::Debug for Float64Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Float64Series").finish_non_exhaustive()
    }
}

/// The lock-guarded state. Methods here assume the caller holds the lock.
struct FloatInner {
    name: String,
    values: Vec<f64>,
    nil_count: usize,
    formatter: ValueFormatter<f64>,
}

impl FloatInner {
    fn value(&self, row: usize) -> Option<f64> {
        let v = self.values[row];
        if v.is_nan() {
            None
        } else {
            Some(v)
        }
    }

    fn value_string(&self, row: usize) -> String {
        (self.formatter)(self.value(row).as_ref())
    }

    fn insert(&mut self, row: usize, val: Input<f64>) {
        match val {
            Input::Single(datum) => {
                let v = coerce(datum);
                if v.is_nan() {
                    self.nil_count += 1;
                }
                self.values.insert(row, v);
            }
            Input::Batch(batch) => {
                self.nil_count += batch.iter().filter(|v| v.is_nan()).count();
                self.values.splice(row..row, batch);
            }
            Input::OptionalBatch(batch) => {
                // A Some(NaN) slot still lands as the sentinel, so it must
                // count as absent.
                self.nil_count += batch
                    .iter()
                    .filter(|v| v.map_or(true, f64::is_nan))
                    .count();
                self.values
                    .splice(row..row, batch.into_iter().map(|v| v.unwrap_or(f64::NAN)));
            }
        }
    }

    fn remove(&mut self, row: usize) {
        let removed = self.values.remove(row);
        if removed.is_nan() {
            self.nil_count -= 1;
        }
    }

    fn update(&mut self, row: usize, val: Datum<f64>) {
        let new = coerce(val);
        let old = self.values[row];
        if old.is_nan() && !new.is_nan() {
            self.nil_count -= 1;
        } else if !old.is_nan() && new.is_nan() {
            self.nil_count += 1;
        }
        self.values[row] = new;
    }

    fn sort(&mut self, order: SortOrder) {
        self.values.sort_by(|a, b| {
            let a = if a.is_nan() { None } else { Some(a) };
            let b = if b.is_nan() { None } else { Some(b) };
            order_slots(a, b, order)
        });
    }

    fn table(&self, range: Option<Range>) -> Result<String, RangeError> {
        let mut window = Vec::new();
        if !self.values.is_empty() {
            let (start, end) = range.unwrap_or_default().limits(self.values.len())?;
            for row in start..=end {
                window.push((row, self.value_string(row)));
            }
        }
        Ok(render::series_table(
            &self.name,
            DTYPE,
            self.values.len(),
            &window,
        ))
    }
}

impl Float64Series {
    /// Create a series from pre-sizing hints and an initial value list.
    ///
    /// The list may be shorter than `init.size`; uncovered rows start
    /// absent. Accepts anything convertible to a [`Datum<f64>`]: native
    /// values, `Option<f64>`, or text parsed on coercion.
    pub fn new<I, D>(name: &str, init: Option<SeriesInit>, vals: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Datum<f64>>,
    {
        let (size, capacity) = init.unwrap_or_default().normalized();

        let mut values = Vec::with_capacity(capacity);
        values.resize(size, f64::NAN);
        // Every pre-sized row starts absent; present initial values below
        // decrement as they land.
        let mut nil_count = size;

        for (idx, val) in vals.into_iter().enumerate() {
            let v = coerce(val.into());
            if idx < size {
                if !v.is_nan() {
                    nil_count -= 1;
                }
                values[idx] = v;
            } else {
                if v.is_nan() {
                    nil_count += 1;
                }
                values.push(v);
            }
        }

        Self {
            inner: RwLock::new(FloatInner {
                name: name.to_string(),
                values,
                nil_count,
                formatter: default_value_formatter(),
            }),
        }
    }

    /// Hold the read lock across several calls.
    ///
    /// The guard exposes the reading operations without re-locking and
    /// releases on drop, on every exit path.
    pub fn read(&self) -> Float64ReadGuard<'_> {
        Float64ReadGuard {
            inner: self.inner_read(),
        }
    }

    /// Hold the write lock across several calls.
    ///
    /// The guard exposes the full operation set without re-locking, making
    /// the batch atomic with respect to other threads. Releases on drop.
    pub fn write(&self) -> Float64WriteGuard<'_> {
        Float64WriteGuard {
            inner: self.inner_write(),
        }
    }

    fn inner_read(&self) -> RwLockReadGuard<'_, FloatInner> {
        // The stored state is a plain sequence; a writer that panicked
        // mid-operation has already surfaced the fault, so recover the
        // guard rather than compounding it.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn inner_write(&self) -> RwLockWriteGuard<'_, FloatInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Series for Float64Series {
    type Native = f64;

    fn name(&self) -> String {
        self.inner_read().name.clone()
    }

    fn rename(&self, name: &str) {
        name.clone_into(&mut self.inner_write().name);
    }

    fn dtype(&self) -> &'static str {
        DTYPE
    }

    fn nrows(&self) -> usize {
        self.inner_read().values.len()
    }

    fn value(&self, row: usize) -> Option<f64> {
        self.inner_read().value(row)
    }

    fn value_string(&self, row: usize) -> String {
        self.inner_read().value_string(row)
    }

    fn prepend(&self, val: impl Into<Datum<f64>>) {
        // Vec::insert shifts in place whenever capacity allows; no
        // reallocation happens unless the storage is full.
        self.inner_write().insert(0, Input::Single(val.into()));
    }

    fn append(&self, val: impl Into<Input<f64>>) -> usize {
        let mut inner = self.inner_write();
        let row = inner.values.len();
        inner.insert(row, val.into());
        row
    }

    fn insert(&self, row: usize, val: impl Into<Input<f64>>) {
        self.inner_write().insert(row, val.into());
    }

    fn remove(&self, row: usize) {
        self.inner_write().remove(row);
    }

    fn update(&self, row: usize, val: impl Into<Datum<f64>>) {
        self.inner_write().update(row, val.into());
    }

    fn swap(&self, row1: usize, row2: usize) {
        if row1 == row2 {
            return;
        }
        self.inner_write().values.swap(row1, row2);
    }

    fn sort(&self, order: SortOrder) {
        self.inner_write().sort(order);
    }

    fn copy(&self, range: Option<Range>) -> Result<Self, RangeError> {
        let inner = self.inner_read();

        if inner.values.is_empty() {
            return Ok(Self {
                inner: RwLock::new(FloatInner {
                    name: inner.name.clone(),
                    values: Vec::new(),
                    nil_count: inner.nil_count,
                    formatter: Arc::clone(&inner.formatter),
                }),
            });
        }

        let (start, end) = range.unwrap_or_default().limits(inner.values.len())?;
        let values = inner.values[start..=end].to_vec();
        let nil_count = values.iter().filter(|v| v.is_nan()).count();

        Ok(Self {
            inner: RwLock::new(FloatInner {
                name: inner.name.clone(),
                values,
                nil_count,
                formatter: Arc::clone(&inner.formatter),
            }),
        })
    }

    fn table(&self, range: Option<Range>) -> Result<String, RangeError> {
        self.inner_read().table(range)
    }

    fn contains_nil(&self) -> bool {
        self.inner_read().nil_count > 0
    }

    fn set_value_formatter(&self, formatter: Option<ValueFormatter<f64>>) {
        self.inner_write().formatter = formatter.unwrap_or_else(default_value_formatter);
    }
}

impl fmt::Display for Float64Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner_read();
        f.write_str(&render::series_inline(inner.values.len(), |row| {
            inner.value_string(row)
        }))
    }
}

/// Read-mode guard over a [`Float64Series`].
///
/// All methods assume — and rely on — the lock held by this guard.
pub struct Float64ReadGuard<'a> {
    inner: RwLockReadGuard<'a, FloatInner>,
}

impl Float64ReadGuard<'_> {
    /// Display label of the series.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current row count.
    pub fn nrows(&self) -> usize {
        self.inner.values.len()
    }

    /// Value at `row`, or `None` for an absent slot.
    pub fn value(&self, row: usize) -> Option<f64> {
        self.inner.value(row)
    }

    /// The active formatter applied to the value at `row`.
    pub fn value_string(&self, row: usize) -> String {
        self.inner.value_string(row)
    }

    /// The raw sentinel-encoded storage (absent slots are NaN).
    ///
    /// Exposed for numeric interop: the slice can be handed to numeric
    /// routines without copying out of the series.
    pub fn values(&self) -> &[f64] {
        &self.inner.values
    }

    /// Whether any slot is currently absent.
    pub fn contains_nil(&self) -> bool {
        self.inner.nil_count > 0
    }
}

/// Write-mode guard over a [`Float64Series`].
///
/// Exposes the full operation set of [`Series`] without re-locking; the
/// whole batch of calls made through one guard is atomic with respect to
/// other threads.
pub struct Float64WriteGuard<'a> {
    inner: RwLockWriteGuard<'a, FloatInner>,
}

impl Float64WriteGuard<'_> {
    /// Display label of the series.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Replace the display label.
    pub fn rename(&mut self, name: &str) {
        name.clone_into(&mut self.inner.name);
    }

    /// Current row count.
    pub fn nrows(&self) -> usize {
        self.inner.values.len()
    }

    /// Value at `row`, or `None` for an absent slot.
    pub fn value(&self, row: usize) -> Option<f64> {
        self.inner.value(row)
    }

    /// The active formatter applied to the value at `row`.
    pub fn value_string(&self, row: usize) -> String {
        self.inner.value_string(row)
    }

    /// The raw sentinel-encoded storage (absent slots are NaN).
    pub fn values(&self) -> &[f64] {
        &self.inner.values
    }

    /// Whether any slot is currently absent.
    pub fn contains_nil(&self) -> bool {
        self.inner.nil_count > 0
    }

    /// Insert `val` at row 0, shifting all rows right by one.
    pub fn prepend(&mut self, val: impl Into<Datum<f64>>) {
        self.inner.insert(0, Input::Single(val.into()));
    }

    /// Insert `val` at the end and return the row index it was given.
    pub fn append(&mut self, val: impl Into<Input<f64>>) -> usize {
        let row = self.inner.values.len();
        self.inner.insert(row, val.into());
        row
    }

    /// Insert a single value or a contiguous batch at `row`.
    pub fn insert(&mut self, row: usize, val: impl Into<Input<f64>>) {
        self.inner.insert(row, val.into());
    }

    /// Delete `row`, shifting all later rows left by one.
    pub fn remove(&mut self, row: usize) {
        self.inner.remove(row);
    }

    /// Overwrite `row` with `val`.
    pub fn update(&mut self, row: usize, val: impl Into<Datum<f64>>) {
        self.inner.update(row, val.into());
    }

    /// Exchange two rows.
    pub fn swap(&mut self, row1: usize, row2: usize) {
        if row1 == row2 {
            return;
        }
        self.inner.values.swap(row1, row2);
    }

    /// Stable in-place sort.
    pub fn sort(&mut self, order: SortOrder) {
        self.inner.sort(order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nan_pattern(s: &Float64Series) -> Vec<bool> {
        (0..s.nrows()).map(|row| s.value(row).is_none()).collect()
    }

    #[test]
    fn new_counts_sentinel_and_short_init_list() {
        let s = Float64Series::new(
            "x",
            Some(SeriesInit {
                size: 4,
                capacity: 8,
            }),
            [Some(1.0), None],
        );

        assert_eq!(s.nrows(), 4);
        assert_eq!(nan_pattern(&s), [false, true, true, true]);
        assert!(s.contains_nil());
    }

    #[test]
    fn new_appends_past_the_pre_size() {
        let s = Float64Series::new(
            "x",
            Some(SeriesInit {
                size: 1,
                capacity: 0,
            }),
            [1.0, f64::NAN, 3.0],
        );

        assert_eq!(s.nrows(), 3);
        assert_eq!(nan_pattern(&s), [false, true, false]);
    }

    #[test]
    fn textual_input_parses_to_native() {
        let s = Float64Series::new("x", None, ["1.5", "-2"]);
        assert_eq!(s.value(0), Some(1.5));
        assert_eq!(s.value(1), Some(-2.0));
    }

    #[test]
    #[should_panic(expected = "cannot coerce")]
    fn unparseable_text_faults() {
        let _ = Float64Series::new("x", None, ["not-a-number"]);
    }

    #[test]
    fn append_round_trips_values_and_absence() {
        let s = Float64Series::new("x", None, Vec::<f64>::new());

        let row = s.append(2.5);
        assert_eq!(row, 0);
        assert_eq!(s.value(row), Some(2.5));

        let row = s.append(None::<f64>);
        assert_eq!(row, 1);
        assert_eq!(s.value(row), None);
        assert!(s.contains_nil());
    }

    #[test]
    fn update_reconciles_nil_count() {
        let s = Float64Series::new("x", None, [Some(1.0), None]);
        assert!(s.contains_nil());

        s.update(1, 5.0);
        assert!(!s.contains_nil());
        assert_eq!(s.value(1), Some(5.0));

        s.update(0, None::<f64>);
        assert!(s.contains_nil());
    }

    #[test]
    fn remove_shifts_rows_and_reconciles() {
        let s = Float64Series::new("x", None, [Some(1.0), None, Some(3.0)]);

        s.remove(1);
        assert_eq!(s.nrows(), 2);
        assert_eq!(s.value(1), Some(3.0));
        assert!(!s.contains_nil());
    }

    #[test]
    fn prepend_becomes_row_zero() {
        let s = Float64Series::new("x", None, [2.0, 3.0]);
        s.prepend(1.0);
        assert_eq!(s.value(0), Some(1.0));
        assert_eq!(s.value(2), Some(3.0));
    }

    #[test]
    fn batch_insert_counts_sentinel_entries() {
        let s = Float64Series::new("x", None, [Some(1.0), None, None]);

        s.insert(1, vec![7.0, f64::NAN, 9.0]);
        assert_eq!(s.nrows(), 6);
        assert_eq!(nan_pattern(&s), [false, false, true, false, true, true]);
    }

    #[test]
    fn optional_batch_insert_counts_every_absence() {
        let s = Float64Series::new("x", None, [1.0]);

        s.insert(0, vec![Some(5.0), None, Some(f64::NAN)]);
        assert_eq!(s.nrows(), 4);
        // Some(NaN) lands as the sentinel and counts as absent.
        assert_eq!(nan_pattern(&s), [false, true, true, false]);
    }

    #[test]
    fn sort_clusters_absence_first_in_both_directions() {
        let s = Float64Series::new("x", None, [Some(3.0), None, Some(1.0), None]);

        s.sort(SortOrder::Ascending);
        assert_eq!(nan_pattern(&s), [true, true, false, false]);
        assert_eq!(s.value(2), Some(1.0));
        assert_eq!(s.value(3), Some(3.0));

        s.sort(SortOrder::Descending);
        assert_eq!(nan_pattern(&s), [true, true, false, false]);
        assert_eq!(s.value(2), Some(3.0));
        assert_eq!(s.value(3), Some(1.0));
    }

    #[test]
    fn swap_exchanges_rows() {
        let s = Float64Series::new("x", None, [1.0, 2.0]);
        s.swap(0, 1);
        assert_eq!(s.value(0), Some(2.0));
        assert_eq!(s.value(1), Some(1.0));
        // Same-row swap is a no-op.
        s.swap(0, 0);
        assert_eq!(s.value(0), Some(2.0));
    }

    #[test]
    fn copy_is_deep_and_range_scoped() {
        let s = Float64Series::new("x", None, [Some(1.0), None, Some(3.0)]);

        let full = s.copy(None).unwrap();
        assert_eq!(full.nrows(), 3);
        assert_eq!(nan_pattern(&full), nan_pattern(&s));

        full.update(0, 99.0);
        assert_eq!(s.value(0), Some(1.0));

        let tail = s.copy(Some(Range::new(1, 2))).unwrap();
        assert_eq!(tail.nrows(), 2);
        assert_eq!(tail.value(0), None);
        assert_eq!(tail.value(1), Some(3.0));
        assert!(tail.contains_nil());
    }

    #[test]
    fn copy_of_empty_series_is_empty() {
        let s = Float64Series::new("x", None, Vec::<f64>::new());
        let copied = s.copy(None).unwrap();
        assert_eq!(copied.nrows(), 0);
        assert_eq!(copied.name(), "x");
    }

    #[test]
    fn custom_formatter_and_reset() {
        let s = Float64Series::new("x", None, [Some(1.5), None]);

        s.set_value_formatter(Some(Arc::new(|v: Option<&f64>| match v {
            Some(v) => format!("{v:.3}"),
            None => "-".to_string(),
        })));
        assert_eq!(s.value_string(0), "1.500");
        assert_eq!(s.value_string(1), "-");

        s.set_value_formatter(None);
        assert_eq!(s.value_string(0), "1.5");
        assert_eq!(s.value_string(1), "NaN");
    }

    #[test]
    fn display_elides_long_series() {
        let s = Float64Series::new("x", None, [1.0, 2.0, 3.0]);
        assert_eq!(s.to_string(), "[ 1 2 3 ]");

        let long = Float64Series::new("x", None, (0..10).map(f64::from));
        assert_eq!(long.to_string(), "[ 0 1 2 ... 7 8 9 ]");
    }

    #[test]
    fn write_guard_batches_operations() {
        let s = Float64Series::new("x", None, [1.0]);

        {
            let mut guard = s.write();
            let row = guard.append(2.0);
            assert_eq!(row, 1);
            guard.update(0, None::<f64>);
            guard.rename("batched");
            assert_eq!(guard.nrows(), 2);
        }

        assert_eq!(s.name(), "batched");
        assert_eq!(s.value(0), None);
        assert_eq!(s.value(1), Some(2.0));
    }

    #[test]
    fn read_guard_exposes_raw_storage() {
        let s = Float64Series::new("x", None, [Some(1.0), None]);
        let guard = s.read();
        assert_eq!(guard.values().len(), 2);
        assert_eq!(guard.values()[0], 1.0);
        assert!(guard.values()[1].is_nan());
    }
}
