use std::collections::HashSet;
use std::sync::Arc;

use kvtable_commons::Result;

use crate::collection::{
    map_eq, CollectionRef, CollectionView, EntryRef, MapEntry, MapRef, MapView, SetRef, ViewIter,
};
use crate::scope::Scope;
use crate::string_table::StringTable;
use crate::table::Table;

use super::{Axis, ProjectionView, ScopedCollection, UniqueSet, ValuesView};

type Inner = MapRef<String, String>;

/// The row map (`row -> (column -> value)`) or column map of a table.
///
/// Keys are the rows (or columns) holding at least one cell; each value is
/// the live [`ProjectionView`] of that row.
///
/// # Contract deviation
///
/// `put` and `remove` return the *current* live view of the affected row,
/// not its previous contents:
///
/// - `put(key, inner)` deletes every cell of the row, writes the entries of
///   `inner` and returns `Some(view)`.
/// - `remove(key)` deletes every cell of the row and returns `Some(view)` of
///   the now-empty row, or `None` when the row held no cells.
#[derive(Clone)]
pub struct AxisMapView {
    table: StringTable,
    axis: Axis,
}

impl AxisMapView {
    pub fn new(table: StringTable, axis: Axis) -> Self {
        Self { table, axis }
    }

    fn projection(&self, key: String) -> Inner {
        Arc::new(ProjectionView::new(self.table.clone(), self.axis, key))
    }

    fn keys(&self) -> UniqueSet<String, ScopedCollection<String>> {
        let table = self.table.clone();
        UniqueSet::new(match self.axis {
            Axis::Row => ScopedCollection::rows(table, Scope::all()),
            Axis::Column => ScopedCollection::columns(table, Scope::all()),
        })
    }

    /// Replaces every cell under `key` with the entries of `inner`.
    ///
    /// `inner` is read in full before anything is deleted, so it may be a
    /// live view of the same row.
    fn replace(&self, key: &str, inner: &dyn MapView<String, String>) -> Result<()> {
        let cells = inner.to_vec()?;
        self.table.remove_scope(&self.axis.scope(key))?;
        for (cross, value) in cells {
            let (row, column) = self.axis.address(key, &cross);
            self.table.put(row, column, value)?;
        }
        Ok(())
    }
}

impl MapView<String, Inner> for AxisMapView {
    fn get(&self, key: &String) -> Result<Option<Inner>> {
        if self.table.exists(&self.axis.scope(key))? {
            Ok(Some(self.projection(key.clone())))
        } else {
            Ok(None)
        }
    }

    fn contains_key(&self, key: &String) -> Result<bool> {
        self.table.exists(&self.axis.scope(key))
    }

    /// Linear: compares `inner` against every row.
    fn contains_value(&self, inner: &Inner) -> Result<bool> {
        for key in self.keys().iter()? {
            let view = ProjectionView::new(self.table.clone(), self.axis, key?);
            if map_eq(&view, inner)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Streams one entry per distinct key, in first-seen order.
    fn entries(&self) -> Result<ViewIter<'_, EntryRef<String, Inner>>> {
        let axis = self.axis;
        let mut seen = HashSet::new();
        let cells = self.table.scan_cells(&Scope::all())?;
        Ok(Box::new(cells.filter_map(move |cell| {
            let key = match cell {
                Ok(cell) => axis.split(cell).0,
                Err(e) => return Some(Err(e)),
            };
            if !seen.insert(key.clone()) {
                return None;
            }
            Some(Ok(Box::new(AxisEntry {
                map: self.clone(),
                value: self.projection(key.clone()),
                key,
            }) as EntryRef<String, Inner>))
        })))
    }

    fn key_set(&self) -> SetRef<String> {
        Box::new(self.keys())
    }

    fn values(&self) -> CollectionRef<Inner> {
        Box::new(ValuesView::new(self.clone()))
    }

    fn size(&self) -> Result<usize> {
        self.keys().size()
    }

    fn is_empty(&self) -> Result<bool> {
        self.table.is_empty()
    }

    /// Returns the current view of the row, never its previous contents.
    fn put(&self, key: String, inner: Inner) -> Result<Option<Inner>> {
        self.replace(&key, &*inner)?;
        Ok(Some(self.projection(key)))
    }

    /// Returns the emptied view of the row, or `None` if it held no cells.
    fn remove(&self, key: &String) -> Result<Option<Inner>> {
        let removed = self.table.remove_scope(&self.axis.scope(key))?;
        Ok((removed > 0).then(|| self.projection(key.clone())))
    }

    fn clear(&self) -> Result<()> {
        self.table.clear()
    }
}

/// Entry of an [`AxisMapView`]. `set_value` replaces the whole row.
pub struct AxisEntry {
    map: AxisMapView,
    key: String,
    value: Inner,
}

impl MapEntry<String, Inner> for AxisEntry {
    fn key(&self) -> &String {
        &self.key
    }

    fn value(&self) -> &Inner {
        &self.value
    }

    /// Returns the live view of the row, like [`AxisMapView::put`].
    fn set_value(&mut self, inner: Inner) -> Result<Option<Inner>> {
        self.map.replace(&self.key, &*inner)?;
        Ok(Some(Arc::clone(&self.value)))
    }

    fn into_parts(self: Box<Self>) -> (String, Inner) {
        (self.key, self.value)
    }
}
