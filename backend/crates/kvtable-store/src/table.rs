//! The two-dimensional table contract.
//!
//! A [`Table<R, C, V>`] maps `(row, column)` pairs to values, holding at most
//! one [`Cell`] per pair. Besides single-cell access it exposes live derived
//! views: the cell set, the row and column key sets, the values, one row or
//! column as a map, and the nested row map and column map.
//!
//! ## Contract deviations
//!
//! The outer maps returned by [`Table::row_map`] and [`Table::column_map`] do
//! not return the previous inner map from `put` and `remove`:
//!
//! - `put(key, inner)` replaces every cell of that row (or column) with the
//!   entries of `inner` and returns the *current* view of the row, never its
//!   former contents.
//! - `remove(key)` deletes every cell of the row (or column) and returns the
//!   now-empty live view, or `None` if the row held no cells.
//!
//! Materialising the previous contents would take a full scan before every
//! write. Callers that need the old contents must read them first.

use kvtable_commons::{Cell, Result};

use crate::collection::{CollectionRef, CollectionView, MapRef, SetRef};

/// A two-dimensional table of `(row, column) -> value`.
pub trait Table<R, C, V>: Send + Sync {
    /// Returns the value at `(row, column)`, or `None` if absent.
    fn get(&self, row: &R, column: &C) -> Result<Option<V>>;

    /// Stores `value` at `(row, column)` and returns the value it replaced.
    fn put(&self, row: R, column: C, value: V) -> Result<Option<V>>;

    /// Removes the cell at `(row, column)` and returns its value.
    ///
    /// Removing an absent cell returns `None`.
    fn remove(&self, row: &R, column: &C) -> Result<Option<V>>;

    fn contains(&self, row: &R, column: &C) -> Result<bool> {
        Ok(self.get(row, column)?.is_some())
    }

    fn contains_row(&self, row: &R) -> Result<bool>;

    fn contains_column(&self, column: &C) -> Result<bool>;

    fn contains_value(&self, value: &V) -> Result<bool>;

    /// Number of cells.
    fn size(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.size()? == 0)
    }

    /// Removes every cell, one remove per cell.
    fn clear(&self) -> Result<()>;

    /// Copies every cell of `other` into this table, one put per cell.
    fn put_all(&self, other: &dyn Table<R, C, V>) -> Result<()> {
        let cells = other.cell_set();
        for cell in cells.iter()? {
            let (row, column, value) = cell?.into_parts();
            self.put(row, column, value)?;
        }
        Ok(())
    }

    /// Live set of every cell.
    ///
    /// `add` is a `put` and returns true when the stored value changed: a
    /// new address, or an existing address that held a different value.
    /// Overwriting `(r, c, v)` with `(r, c, w)` therefore returns true even
    /// though `put` returned `Some(v)`.
    fn cell_set(&self) -> SetRef<Cell<R, C, V>>;

    /// Live set of the rows that hold at least one cell.
    fn row_key_set(&self) -> SetRef<R>;

    /// Live set of the columns that hold at least one cell.
    fn column_key_set(&self) -> SetRef<C>;

    /// Live collection of every value, one per cell.
    fn values(&self) -> CollectionRef<V>;

    /// Live `column -> value` map of one row.
    fn row(&self, row: R) -> Result<MapRef<C, V>>;

    /// Live `row -> value` map of one column.
    fn column(&self, column: C) -> Result<MapRef<R, V>>;

    /// Live `row -> (column -> value)` map. See the module docs for how `put`
    /// and `remove` deviate from the usual map contract.
    fn row_map(&self) -> MapRef<R, MapRef<C, V>>;

    /// Live `column -> (row -> value)` map, with the same deviations as
    /// [`Table::row_map`].
    fn column_map(&self) -> MapRef<C, MapRef<R, V>>;
}
