//! Timing decorator for any [`Table`].
//!
//! [`TimedTable`] measures each table operation that reaches the store and
//! reports it to a [`TimingSink`]. Derived views are handed out unwrapped;
//! their scans are not timed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kvtable_commons::{Cell, Result};

use crate::collection::{CollectionRef, MapRef, SetRef};
use crate::table::Table;

/// Receives one measurement per timed operation.
pub trait TimingSink: Send + Sync {
    fn record(&self, operation: &'static str, elapsed: Duration, succeeded: bool);
}

/// Writes measurements to the `log` facade at debug level.
#[derive(Debug, Clone)]
pub struct LogTimingSink {
    table: String,
}

impl LogTimingSink {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl TimingSink for LogTimingSink {
    fn record(&self, operation: &'static str, elapsed: Duration, succeeded: bool) {
        log::debug!(
            "table={} op={} elapsed={:?} ok={}",
            self.table,
            operation,
            elapsed,
            succeeded
        );
    }
}

/// A [`Table`] that times every operation of the table it wraps.
pub struct TimedTable<T> {
    inner: T,
    sink: Arc<dyn TimingSink>,
}

impl<T> TimedTable<T> {
    pub fn new(inner: T, sink: Arc<dyn TimingSink>) -> Self {
        Self { inner, sink }
    }

    /// Times with a [`LogTimingSink`] labelled `name`.
    pub fn logged(inner: T, name: impl Into<String>) -> Self {
        Self::new(inner, Arc::new(LogTimingSink::new(name)))
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn time<X>(&self, operation: &'static str, f: impl FnOnce() -> Result<X>) -> Result<X> {
        let start = Instant::now();
        let result = f();
        self.sink.record(operation, start.elapsed(), result.is_ok());
        result
    }
}

impl<R, C, V, T> Table<R, C, V> for TimedTable<T>
where
    T: Table<R, C, V>,
{
    fn get(&self, row: &R, column: &C) -> Result<Option<V>> {
        self.time("get", || self.inner.get(row, column))
    }

    fn put(&self, row: R, column: C, value: V) -> Result<Option<V>> {
        self.time("put", || self.inner.put(row, column, value))
    }

    fn remove(&self, row: &R, column: &C) -> Result<Option<V>> {
        self.time("remove", || self.inner.remove(row, column))
    }

    fn contains(&self, row: &R, column: &C) -> Result<bool> {
        self.time("contains", || self.inner.contains(row, column))
    }

    fn contains_row(&self, row: &R) -> Result<bool> {
        self.time("contains_row", || self.inner.contains_row(row))
    }

    fn contains_column(&self, column: &C) -> Result<bool> {
        self.time("contains_column", || self.inner.contains_column(column))
    }

    fn contains_value(&self, value: &V) -> Result<bool> {
        self.time("contains_value", || self.inner.contains_value(value))
    }

    fn size(&self) -> Result<usize> {
        self.time("size", || self.inner.size())
    }

    fn is_empty(&self) -> Result<bool> {
        self.time("is_empty", || self.inner.is_empty())
    }

    fn clear(&self) -> Result<()> {
        self.time("clear", || self.inner.clear())
    }

    fn put_all(&self, other: &dyn Table<R, C, V>) -> Result<()> {
        self.time("put_all", || self.inner.put_all(other))
    }

    fn cell_set(&self) -> SetRef<Cell<R, C, V>> {
        self.inner.cell_set()
    }

    fn row_key_set(&self) -> SetRef<R> {
        self.inner.row_key_set()
    }

    fn column_key_set(&self) -> SetRef<C> {
        self.inner.column_key_set()
    }

    fn values(&self) -> CollectionRef<V> {
        self.inner.values()
    }

    fn row(&self, row: R) -> Result<MapRef<C, V>> {
        self.inner.row(row)
    }

    fn column(&self, column: C) -> Result<MapRef<R, V>> {
        self.inner.column(column)
    }

    fn row_map(&self) -> MapRef<R, MapRef<C, V>> {
        self.inner.row_map()
    }

    fn column_map(&self) -> MapRef<C, MapRef<R, V>> {
        self.inner.column_map()
    }
}
