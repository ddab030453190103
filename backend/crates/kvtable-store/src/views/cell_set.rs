use kvtable_commons::Result;

use crate::collection::{CollectionView, SetView, ViewIter};
use crate::scope::Scope;
use crate::string_table::{StringCell, StringTable};
use crate::table::Table;

/// Live set of every cell of a table.
///
/// A cell is an addressable unit, so the set is mutable: `add` is a table
/// `put`, `remove` a table `remove` and `clear` clears the table.
pub struct CellSetView {
    table: StringTable,
}

impl CellSetView {
    pub fn new(table: StringTable) -> Self {
        Self { table }
    }
}

impl CollectionView<StringCell> for CellSetView {
    fn iter(&self) -> Result<ViewIter<'_, StringCell>> {
        self.table.scan_cells(&Scope::all())
    }

    /// True if the table holds this exact value at the cell's address.
    fn contains(&self, cell: &StringCell) -> Result<bool> {
        Ok(self.table.get(cell.row(), cell.column())?.as_ref() == Some(cell.value()))
    }

    fn size(&self) -> Result<usize> {
        self.table.size()
    }

    fn is_empty(&self) -> Result<bool> {
        self.table.is_empty()
    }

    /// Puts the cell; true unless the table already held this exact cell.
    ///
    /// This is not "the previous `put` returned `None`": replacing a
    /// different value at the same address also returns true.
    fn add(&self, cell: StringCell) -> Result<bool> {
        let (row, column, value) = cell.into_parts();
        let previous = self.table.put(row, column, value.clone())?;
        Ok(previous.as_ref() != Some(&value))
    }

    /// Removes the cell only if the table holds this exact value there.
    fn remove(&self, cell: &StringCell) -> Result<bool> {
        if !self.contains(cell)? {
            return Ok(false);
        }
        Ok(self.table.remove(cell.row(), cell.column())?.is_some())
    }

    fn clear(&self) -> Result<()> {
        self.table.clear()
    }
}

impl SetView<StringCell> for CellSetView {}
