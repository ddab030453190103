use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

use kvtable_commons::Result;

use crate::collection::{CollectionView, SetView, ViewIter};
use crate::scope::Scope;
use crate::string_table::{StringCell, StringTable};

/// Turns a scanned cell into a view element.
pub type Extractor<E> = fn(StringCell) -> E;

/// Narrows a scope to the cells holding `element`; `None` if none can.
pub type Narrower<E> = fn(&Scope, &E) -> Option<Scope>;

fn row_of(cell: StringCell) -> String {
    cell.into_parts().0
}

fn column_of(cell: StringCell) -> String {
    cell.into_parts().1
}

fn value_of(cell: StringCell) -> String {
    cell.into_parts().2
}

fn narrow_row(scope: &Scope, row: &String) -> Option<Scope> {
    match scope.fixed_row() {
        Some(fixed) if fixed != row => None,
        _ => Some(scope.clone().with_row(row.as_str())),
    }
}

fn narrow_column(scope: &Scope, column: &String) -> Option<Scope> {
    match scope.fixed_column() {
        Some(fixed) if fixed != column => None,
        _ => Some(scope.clone().with_column(column.as_str())),
    }
}

fn narrow_value(scope: &Scope, value: &String) -> Option<Scope> {
    match scope.fixed_value() {
        Some(fixed) if fixed != value => None,
        _ => Some(scope.clone().with_value(value.as_str())),
    }
}

/// One element per cell in a scope.
///
/// Without a narrower, `contains` is a linear pass over the scope.
pub struct ScopedCollection<E> {
    table: StringTable,
    scope: Scope,
    extract: Extractor<E>,
    narrow: Option<Narrower<E>>,
}

impl<E> ScopedCollection<E> {
    pub fn new(table: StringTable, scope: Scope, extract: Extractor<E>) -> Self {
        Self {
            table,
            scope,
            extract,
            narrow: None,
        }
    }

    /// Answers `contains` with a filtered single-result scan.
    pub fn with_narrowing(mut self, narrow: Narrower<E>) -> Self {
        self.narrow = Some(narrow);
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl ScopedCollection<String> {
    /// Row key of every cell in `scope`. Repeats a row once per cell.
    pub fn rows(table: StringTable, scope: Scope) -> Self {
        Self::new(table, scope, row_of).with_narrowing(narrow_row)
    }

    /// Column key of every cell in `scope`. Repeats a column once per cell.
    pub fn columns(table: StringTable, scope: Scope) -> Self {
        Self::new(table, scope, column_of).with_narrowing(narrow_column)
    }

    /// Value of every cell in `scope`.
    pub fn values(table: StringTable, scope: Scope) -> Self {
        Self::new(table, scope, value_of).with_narrowing(narrow_value)
    }
}

impl<E: PartialEq> CollectionView<E> for ScopedCollection<E> {
    fn iter(&self) -> Result<ViewIter<'_, E>> {
        let extract = self.extract;
        let cells = self.table.scan_cells(&self.scope)?;
        Ok(Box::new(cells.map(move |cell| cell.map(extract))))
    }

    fn contains(&self, element: &E) -> Result<bool> {
        if let Some(narrow) = self.narrow {
            return match narrow(&self.scope, element) {
                Some(scope) => self.table.exists(&scope),
                None => Ok(false),
            };
        }
        for item in self.iter()? {
            if item? == *element {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// A [`ScopedCollection`] whose extracted field is unique within its scope,
/// such as the column keys of one row.
pub struct ScopedSet<E>(ScopedCollection<E>);

impl<E> ScopedSet<E> {
    pub fn new(inner: ScopedCollection<E>) -> Self {
        Self(inner)
    }
}

impl<E: PartialEq> CollectionView<E> for ScopedSet<E> {
    fn iter(&self) -> Result<ViewIter<'_, E>> {
        self.0.iter()
    }

    fn contains(&self, element: &E) -> Result<bool> {
        self.0.contains(element)
    }
}

impl<E: PartialEq> SetView<E> for ScopedSet<E> {}

/// Set semantics over a collection that may repeat elements.
///
/// Each traversal keeps the elements it has yielded so far and skips repeats,
/// so every distinct element comes out once, in first-seen order. The memory
/// held is bounded by the distinct elements of the current traversal.
pub struct UniqueSet<E, C> {
    inner: C,
    _phantom: PhantomData<fn() -> E>,
}

impl<E, C> UniqueSet<E, C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            _phantom: PhantomData,
        }
    }
}

impl<E, C> CollectionView<E> for UniqueSet<E, C>
where
    E: Eq + Hash + Clone,
    C: CollectionView<E>,
{
    fn iter(&self) -> Result<ViewIter<'_, E>> {
        let mut seen = HashSet::new();
        let items = self.inner.iter()?;
        Ok(Box::new(items.filter(move |item| match item {
            Ok(element) => seen.insert(element.clone()),
            Err(_) => true,
        })))
    }

    fn contains(&self, element: &E) -> Result<bool> {
        self.inner.contains(element)
    }
}

impl<E, C> SetView<E> for UniqueSet<E, C>
where
    E: Eq + Hash + Clone,
    C: CollectionView<E>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::in_memory::InMemoryTableService;
    use crate::table::Table;

    struct Repeating(Vec<&'static str>);

    impl CollectionView<&'static str> for Repeating {
        fn iter(&self) -> Result<ViewIter<'_, &'static str>> {
            Ok(Box::new(self.0.clone().into_iter().map(Ok)))
        }

        fn contains(&self, element: &&'static str) -> Result<bool> {
            Ok(self.0.contains(element))
        }
    }

    fn table() -> StringTable {
        let table = StringTable::new(Arc::new(InMemoryTableService::new()), "scoped");
        for (r, c, v) in [("r1", "c1", "x"), ("r1", "c2", "y"), ("r2", "c1", "x")] {
            table.put(r.to_string(), c.to_string(), v.to_string()).unwrap();
        }
        table
    }

    #[test]
    fn test_unique_set_yields_first_seen_order() {
        let set = UniqueSet::new(Repeating(vec!["L1", "L2", "L2", "L1", "L1"]));
        assert_eq!(set.to_vec().unwrap(), vec!["L1", "L2"]);
        assert_eq!(set.size().unwrap(), 2);
        // a second traversal starts from scratch
        assert_eq!(set.to_vec().unwrap(), vec!["L1", "L2"]);
        assert!(set.contains(&"L2").unwrap());
    }

    #[test]
    fn test_scoped_collection_repeats_per_cell() {
        let rows = ScopedCollection::rows(table(), Scope::all());
        assert_eq!(rows.size().unwrap(), 3);
        assert_eq!(UniqueSet::new(rows).size().unwrap(), 2);
    }

    #[test]
    fn test_narrowed_contains() {
        let values = ScopedCollection::values(table(), Scope::row("r1"));
        assert!(values.contains(&"y".to_string()).unwrap());
        assert!(!values.contains(&"z".to_string()).unwrap());

        let columns = ScopedCollection::columns(table(), Scope::column("c2"));
        assert!(!columns.contains(&"c1".to_string()).unwrap());
        assert!(columns.contains(&"c2".to_string()).unwrap());
    }

    #[test]
    fn test_linear_contains_without_narrower() {
        fn upper_value(cell: StringCell) -> String {
            cell.value().to_uppercase()
        }
        let upper = ScopedCollection::new(table(), Scope::row("r1"), upper_value);
        assert!(upper.contains(&"Y".to_string()).unwrap());
        assert!(!upper.contains(&"y".to_string()).unwrap());
    }
}
