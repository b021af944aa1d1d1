//! Boxed-optional series for int64 data.
//!
//! The integer domain has no spare bit pattern to reserve, so absence is a
//! first-class `None` slot rather than a sentinel value. Storage is
//! `Vec<Option<i64>>`; null accounting reads presence directly off each
//! slot instead of inspecting value content.
//!
//! Locking follows the same two-layer model as the float variant: public
//! [`Series`] methods lock per call and delegate to [`IntInner`], whose
//! methods assume the lock is held; [`Int64Series::read`] and
//! [`Int64Series::write`] expose block-scoped guards for atomic batches.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::range::{Range, RangeError};
use crate::series::{order_slots, render, Series, SeriesInit, SortOrder};
use crate::value::{default_value_formatter, Datum, Input, ValueFormatter};

/// Static data type name reported by [`Series::dtype`].
const DTYPE: &str = "int64";

/// Coerce a datum to a nullable slot.
///
/// Unparseable text is a usage bug, not absent data: it faults the call.
fn coerce(val: Datum<i64>) -> Option<i64> {
    match val {
        Datum::Present(v) => Some(v),
        Datum::Absent => None,
        Datum::Text(raw) => match raw.parse::<i64>() {
            Ok(v) => Some(v),
            Err(_) => panic!("cannot coerce {raw:?} into an int64 value"),
        },
    }
}

/// A named, mutable series of `i64` values with per-slot absence.
///
/// Multiple threads may hold references to the same series; every field is
/// guarded by one reader/writer lock as a single unit.
pub struct Int64Series {
    inner: RwLock<IntInner>,
}

/// The lock-guarded state. Methods here assume the caller holds the lock.
struct IntInner {
    name: String,
    values: Vec<Option<i64>>,
    nil_count: usize,
    formatter: ValueFormatter<i64>,
}

impl IntInner {
    fn value(&self, row: usize) -> Option<i64> {
        self.values[row]
    }

    fn value_string(&self, row: usize) -> String {
        (self.formatter)(self.values[row].as_ref())
    }

    fn insert(&mut self, row: usize, val: Input<i64>) {
        match val {
            Input::Single(datum) => {
                let v = coerce(datum);
                if v.is_none() {
                    self.nil_count += 1;
                }
                self.values.insert(row, v);
            }
            // A raw batch is implicitly all-present; nothing to count.
            Input::Batch(batch) => {
                self.values.splice(row..row, batch.into_iter().map(Some));
            }
            Input::OptionalBatch(batch) => {
                self.nil_count += batch.iter().filter(|v| v.is_none()).count();
                self.values.splice(row..row, batch);
            }
        }
    }

    fn remove(&mut self, row: usize) {
        if self.values.remove(row).is_none() {
            self.nil_count -= 1;
        }
    }

    fn update(&mut self, row: usize, val: Datum<i64>) {
        let new = coerce(val);
        let old = self.values[row];
        if old.is_none() && new.is_some() {
            self.nil_count -= 1;
        } else if old.is_some() && new.is_none() {
            self.nil_count += 1;
        }
        self.values[row] = new;
    }

    fn sort(&mut self, order: SortOrder) {
        self.values
            .sort_by(|a, b| order_slots(a.as_ref(), b.as_ref(), order));
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

impl Int64Series {
    /// Create a series from pre-sizing hints and an initial value list.
    ///
    /// The list may be shorter than `init.size`; uncovered rows start
    /// absent. Accepts anything convertible to a [`Datum<i64>`]: native
    /// values, `Option<i64>`, or text parsed on coercion.
    pub fn new<I, D>(name: &str, init: Option<SeriesInit>, vals: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Datum<i64>>,
    {
        let (size, capacity) = init.unwrap_or_default().normalized();

        let mut values = Vec::with_capacity(capacity);
        values.resize(size, None);
        let mut nil_count = size;

        for (idx, val) in vals.into_iter().enumerate() {
            let v = coerce(val.into());
            if idx < size {
                if v.is_some() {
                    nil_count -= 1;
                }
                values[idx] = v;
            } else {
                if v.is_none() {
                    nil_count += 1;
                }
                values.push(v);
            }
        }

        Self {
            inner: RwLock::new(IntInner {
                name: name.to_string(),
                values,
                nil_count,
                formatter: default_value_formatter(),
            }),
        }
    }

    /// Hold the read lock across several calls.
    pub fn read(&self) -> Int64ReadGuard<'_> {
        Int64ReadGuard {
            inner: self.inner_read(),
        }
    }

    /// Hold the write lock across several calls; the batch is atomic with
    /// respect to other threads. Releases on drop.
    pub fn write(&self) -> Int64WriteGuard<'_> {
        Int64WriteGuard {
            inner: self.inner_write(),
        }
    }

    fn inner_read(&self) -> RwLockReadGuard<'_, IntInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn inner_write(&self) -> RwLockWriteGuard<'_, IntInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Series for Int64Series {
    type Native = i64;

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

    fn value(&self, row: usize) -> Option<i64> {
        self.inner_read().value(row)
    }

    fn value_string(&self, row: usize) -> String {
        self.inner_read().value_string(row)
    }

    fn prepend(&self, val: impl Into<Datum<i64>>) {
        self.inner_write().insert(0, Input::Single(val.into()));
    }

    fn append(&self, val: impl Into<Input<i64>>) -> usize {
        let mut inner = self.inner_write();
        let row = inner.values.len();
        inner.insert(row, val.into());
        row
    }

    fn insert(&self, row: usize, val: impl Into<Input<i64>>) {
        self.inner_write().insert(row, val.into());
    }

    fn remove(&self, row: usize) {
        self.inner_write().remove(row);
    }

    fn update(&self, row: usize, val: impl Into<Datum<i64>>) {
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
                inner: RwLock::new(IntInner {
                    name: inner.name.clone(),
                    values: Vec::new(),
                    nil_count: inner.nil_count,
                    formatter: Arc::clone(&inner.formatter),
                }),
            });
        }

        let (start, end) = range.unwrap_or_default().limits(inner.values.len())?;
        let values = inner.values[start..=end].to_vec();
        let nil_count = values.iter().filter(|v| v.is_none()).count();

        Ok(Self {
            inner: RwLock::new(IntInner {
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

    fn set_value_formatter(&self, formatter: Option<ValueFormatter<i64>>) {
        self.inner_write().formatter = formatter.unwrap_or_else(default_value_formatter);
    }
}

impl fmt::Display for Int64Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner_read();
        f.write_str(&render::series_inline(inner.values.len(), |row| {
            inner.value_string(row)
        }))
    }
}

/// Read-mode guard over an [`Int64Series`].
pub struct Int64ReadGuard<'a> {
    inner: RwLockReadGuard<'a, IntInner>,
}

impl Int64ReadGuard<'_> {
    /// Display label of the series.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current row count.
    pub fn nrows(&self) -> usize {
        self.inner.values.len()
    }

    /// Value at `row`, or `None` for an absent slot.
    pub fn value(&self, row: usize) -> Option<i64> {
        self.inner.value(row)
    }

    /// The active formatter applied to the value at `row`.
    pub fn value_string(&self, row: usize) -> String {
        self.inner.value_string(row)
    }

    /// The raw nullable storage.
    pub fn values(&self) -> &[Option<i64>] {
        &self.inner.values
    }

    /// Whether any slot is currently absent.
    pub fn contains_nil(&self) -> bool {
        self.inner.nil_count > 0
    }
}

/// Write-mode guard over an [`Int64Series`].
///
/// Exposes the full operation set of [`Series`] without re-locking.
pub struct Int64WriteGuard<'a> {
    inner: RwLockWriteGuard<'a, IntInner>,
}

impl Int64WriteGuard<'_> {
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
    pub fn value(&self, row: usize) -> Option<i64> {
        self.inner.value(row)
    }

    /// The active formatter applied to the value at `row`.
    pub fn value_string(&self, row: usize) -> String {
        self.inner.value_string(row)
    }

    /// The raw nullable storage.
    pub fn values(&self) -> &[Option<i64>] {
        &self.inner.values
    }

    /// Whether any slot is currently absent.
    pub fn contains_nil(&self) -> bool {
        self.inner.nil_count > 0
    }

    /// Insert `val` at row 0, shifting all rows right by one.
    pub fn prepend(&mut self, val: impl Into<Datum<i64>>) {
        self.inner.insert(0, Input::Single(val.into()));
    }

    /// Insert `val` at the end and return the row index it was given.
    pub fn append(&mut self, val: impl Into<Input<i64>>) -> usize {
        let row = self.inner.values.len();
        self.inner.insert(row, val.into());
        row
    }

    /// Insert a single value or a contiguous batch at `row`.
    pub fn insert(&mut self, row: usize, val: impl Into<Input<i64>>) {
        self.inner.insert(row, val.into());
    }

    /// Delete `row`, shifting all later rows left by one.
    pub fn remove(&mut self, row: usize) {
        self.inner.remove(row);
    }

    /// Overwrite `row` with `val`.
    pub fn update(&mut self, row: usize, val: impl Into<Datum<i64>>) {
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

    fn slots(s: &Int64Series) -> Vec<Option<i64>> {
        (0..s.nrows()).map(|row| s.value(row)).collect()
    }

    #[test]
    fn new_fills_uncovered_rows_with_absence() {
        let s = Int64Series::new(
            "counts",
            Some(SeriesInit {
                size: 3,
                capacity: 0,
            }),
            [5i64],
        );

        assert_eq!(slots(&s), [Some(5), None, None]);
        assert!(s.contains_nil());
    }

    #[test]
    fn textual_input_parses_to_native() {
        let s = Int64Series::new("x", None, ["42", "-7"]);
        assert_eq!(slots(&s), [Some(42), Some(-7)]);
    }

    #[test]
    #[should_panic(expected = "cannot coerce")]
    fn unparseable_text_faults() {
        let _ = Int64Series::new("x", None, ["4.2"]);
    }

    #[test]
    fn raw_batch_is_implicitly_present() {
        let s = Int64Series::new("x", None, [None::<i64>]);

        s.insert(0, vec![1i64, 2, 3]);
        assert_eq!(slots(&s), [Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn optional_batch_counts_each_absence() {
        let s = Int64Series::new("x", None, [Some(1i64), None]);

        s.insert(1, vec![Some(7i64), None, Some(9)]);
        assert_eq!(slots(&s), [Some(1), Some(7), None, Some(9), None]);
    }

    #[test]
    fn update_and_remove_reconcile_nil_count() {
        let s = Int64Series::new("x", None, [Some(1i64), None, Some(3)]);

        s.update(0, None::<i64>);
        s.update(1, 2i64);
        assert_eq!(slots(&s), [None, Some(2), Some(3)]);

        s.remove(0);
        assert_eq!(slots(&s), [Some(2), Some(3)]);
        assert!(!s.contains_nil());
    }

    #[test]
    fn sort_clusters_absence_first_in_both_directions() {
        let s = Int64Series::new("x", None, [Some(3i64), None, Some(1), None]);

        s.sort(SortOrder::Ascending);
        assert_eq!(slots(&s), [None, None, Some(1), Some(3)]);

        s.sort(SortOrder::Descending);
        assert_eq!(slots(&s), [None, None, Some(3), Some(1)]);
    }

    #[test]
    fn copy_is_deep_and_range_scoped() {
        let s = Int64Series::new("x", None, [Some(1i64), None, Some(3)]);

        let copied = s.copy(None).unwrap();
        copied.update(2, 99i64);
        assert_eq!(s.value(2), Some(3));

        let mid = s.copy(Some(Range::new(1, 1))).unwrap();
        assert_eq!(slots(&mid), [None]);
        assert!(mid.contains_nil());
    }

    #[test]
    fn append_returns_assigned_row() {
        let s = Int64Series::new("x", None, Vec::<i64>::new());
        assert_eq!(s.append(10i64), 0);
        assert_eq!(s.append(None::<i64>), 1);
        assert_eq!(s.value(1), None);
    }

    #[test]
    fn guards_batch_reads_and_writes() {
        let s = Int64Series::new("x", None, [Some(1i64), Some(2)]);

        {
            let mut guard = s.write();
            guard.swap(0, 1);
            guard.prepend(0i64);
            assert_eq!(guard.values(), [Some(0), Some(2), Some(1)]);
        }

        let guard = s.read();
        assert_eq!(guard.nrows(), 3);
        assert_eq!(guard.value(0), Some(0));
    }
}
