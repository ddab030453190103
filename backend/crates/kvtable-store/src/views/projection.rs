use kvtable_commons::Result;

use crate::collection::{count, CollectionRef, EntryRef, MapEntry, MapView, SetRef, ViewIter};
use crate::scope::Scope;
use crate::string_table::StringTable;
use crate::table::Table;

use super::{Axis, ScopedCollection, ScopedSet};

/// One row (`cross key = column`) or one column (`cross key = row`) as a map.
///
/// Every entry is an addressable cell, so `put`, `remove` and `clear` write
/// through to the table. `put` and `remove` return the previous value.
pub struct ProjectionView {
    table: StringTable,
    axis: Axis,
    key: String,
}

impl ProjectionView {
    pub fn new(table: StringTable, axis: Axis, key: String) -> Self {
        Self { table, axis, key }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn scope(&self) -> Scope {
        self.axis.scope(&self.key)
    }
}

impl MapView<String, String> for ProjectionView {
    fn get(&self, cross: &String) -> Result<Option<String>> {
        let (row, column) = self.axis.address(&self.key, cross);
        self.table.get(&row, &column)
    }

    fn contains_value(&self, value: &String) -> Result<bool> {
        self.table.exists(&self.scope().with_value(value.as_str()))
    }

    fn entries(&self) -> Result<ViewIter<'_, EntryRef<String, String>>> {
        let axis = self.axis;
        let cells = self.table.scan_cells(&self.scope())?;
        Ok(Box::new(cells.map(move |cell| {
            let (key, cross, value) = axis.split(cell?);
            Ok(Box::new(CellEntry {
                table: self.table.clone(),
                axis,
                key,
                cross,
                value,
            }) as EntryRef<String, String>)
        })))
    }

    fn key_set(&self) -> SetRef<String> {
        let table = self.table.clone();
        let keys = match self.axis {
            Axis::Row => ScopedCollection::columns(table, self.scope()),
            Axis::Column => ScopedCollection::rows(table, self.scope()),
        };
        Box::new(ScopedSet::new(keys))
    }

    fn values(&self) -> CollectionRef<String> {
        Box::new(ScopedCollection::values(self.table.clone(), self.scope()))
    }

    fn size(&self) -> Result<usize> {
        count(self.table.scan_cells(&self.scope())?)
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(!self.table.exists(&self.scope())?)
    }

    fn put(&self, cross: String, value: String) -> Result<Option<String>> {
        let (row, column) = self.axis.address(&self.key, &cross);
        self.table.put(row, column, value)
    }

    fn remove(&self, cross: &String) -> Result<Option<String>> {
        let (row, column) = self.axis.address(&self.key, cross);
        self.table.remove(&row, &column)
    }

    fn clear(&self) -> Result<()> {
        self.table.remove_scope(&self.scope()).map(|_| ())
    }
}

/// Entry of a [`ProjectionView`]; `set_value` writes the cell.
pub struct CellEntry {
    table: StringTable,
    axis: Axis,
    key: String,
    cross: String,
    value: String,
}

impl MapEntry<String, String> for CellEntry {
    fn key(&self) -> &String {
        &self.cross
    }

    fn value(&self) -> &String {
        &self.value
    }

    fn set_value(&mut self, value: String) -> Result<Option<String>> {
        let (row, column) = self.axis.address(&self.key, &self.cross);
        let previous = self.table.put(row, column, value.clone())?;
        self.value = value;
        Ok(previous)
    }

    fn into_parts(self: Box<Self>) -> (String, String) {
        (self.cross, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::collection::CollectionView;
    use crate::in_memory::InMemoryTableService;

    fn s(v: &str) -> String {
        v.to_string()
    }

    fn table() -> StringTable {
        let table = StringTable::new(Arc::new(InMemoryTableService::new()), "projection");
        table.put(s("r1"), s("c1"), s("v1")).unwrap();
        table.put(s("r1"), s("c2"), s("v2")).unwrap();
        table.put(s("r2"), s("c1"), s("v3")).unwrap();
        table
    }

    #[test]
    fn test_row_projection_reads() {
        let row = ProjectionView::new(table(), Axis::Row, s("r1"));
        assert_eq!(row.get(&s("c1")).unwrap(), Some(s("v1")));
        assert!(row.contains_key(&s("c2")).unwrap());
        assert!(!row.contains_value(&s("v3")).unwrap());
        assert_eq!(row.size().unwrap(), 2);

        let mut keys = row.key_set().to_vec().unwrap();
        keys.sort();
        assert_eq!(keys, vec![s("c1"), s("c2")]);
    }

    #[test]
    fn test_column_projection_reads() {
        let column = ProjectionView::new(table(), Axis::Column, s("c1"));
        assert_eq!(column.get(&s("r2")).unwrap(), Some(s("v3")));
        assert!(column.values().contains(&s("v1")).unwrap());
        assert!(!column.key_set().contains(&s("c1")).unwrap());
    }

    #[test]
    fn test_projection_writes_through() {
        let table = table();
        let row = ProjectionView::new(table.clone(), Axis::Row, s("r1"));
        assert_eq!(row.put(s("c3"), s("v4")).unwrap(), None);
        assert_eq!(row.put(s("c3"), s("v5")).unwrap(), Some(s("v4")));
        assert_eq!(table.get(&s("r1"), &s("c3")).unwrap(), Some(s("v5")));

        assert_eq!(row.remove(&s("c1")).unwrap(), Some(s("v1")));
        row.clear().unwrap();
        assert!(row.is_empty().unwrap());
        assert_eq!(table.size().unwrap(), 1);
    }

    #[test]
    fn test_entry_set_value() {
        let table = table();
        let column = ProjectionView::new(table.clone(), Axis::Column, s("c2"));
        let mut entries: Vec<_> = column.entries().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &mut entries[0];
        assert_eq!(entry.key(), "r1");
        assert_eq!(entry.set_value(s("changed")).unwrap(), Some(s("v2")));
        assert_eq!(entry.value(), "changed");
        assert_eq!(table.get(&s("r1"), &s("c2")).unwrap(), Some(s("changed")));
    }
}
