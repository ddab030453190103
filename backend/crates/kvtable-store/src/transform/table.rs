use std::sync::Arc;

use kvtable_commons::{Cell, Marshaller, Result};

use crate::collection::{CollectionRef, DetachedMap, MapRef, MapView, SetRef};
use crate::table::Table;

use super::{marshal_lookup, unmarshal_opt, TransformingCollection, TransformingMap, TransformingSet};

/// A `Table<R1, C1, V1>` presented as a `Table<R, C, V>`.
///
/// Built from one marshaller per axis; cells, rows, columns and the nested
/// row and column maps are transformed by marshallers composed from those
/// three.
///
/// ```rust,ignore
/// let typed: TransformingTable<f32, i64, i32> = TransformingTable::new(
///     Arc::new(string_table),
///     Arc::new(ParseMarshaller::<f32>::new()),
///     Arc::new(ParseMarshaller::<i64>::new()),
///     Arc::new(ParseMarshaller::<i32>::new()),
/// );
/// typed.put(0.5, 23, 1)?;
/// assert_eq!(typed.get(&0.5, &23)?, Some(1));
/// ```
pub struct TransformingTable<R, C, V, R1 = String, C1 = String, V1 = String> {
    inner: Arc<dyn Table<R1, C1, V1>>,
    rows: Arc<dyn Marshaller<R, R1>>,
    columns: Arc<dyn Marshaller<C, C1>>,
    values: Arc<dyn Marshaller<V, V1>>,
}

impl<R, C, V, R1, C1, V1> Clone for TransformingTable<R, C, V, R1, C1, V1> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            rows: Arc::clone(&self.rows),
            columns: Arc::clone(&self.columns),
            values: Arc::clone(&self.values),
        }
    }
}

impl<R, C, V, R1, C1, V1> TransformingTable<R, C, V, R1, C1, V1> {
    pub fn new(
        inner: Arc<dyn Table<R1, C1, V1>>,
        rows: Arc<dyn Marshaller<R, R1>>,
        columns: Arc<dyn Marshaller<C, C1>>,
        values: Arc<dyn Marshaller<V, V1>>,
    ) -> Self {
        Self {
            inner,
            rows,
            columns,
            values,
        }
    }

    pub fn inner(&self) -> &Arc<dyn Table<R1, C1, V1>> {
        &self.inner
    }

    /// Marshals a lookup address; `None` if either key has no representation.
    fn lookup(&self, row: &R, column: &C) -> Result<Option<(R1, C1)>> {
        let Some(row) = marshal_lookup(self.rows.as_ref(), row)? else {
            return Ok(None);
        };
        let Some(column) = marshal_lookup(self.columns.as_ref(), column)? else {
            return Ok(None);
        };
        Ok(Some((row, column)))
    }
}

impl<R, C, V, R1, C1, V1> Table<R, C, V> for TransformingTable<R, C, V, R1, C1, V1>
where
    R: 'static,
    C: 'static,
    V: 'static,
    R1: PartialEq + Clone + 'static,
    C1: PartialEq + Clone + 'static,
    V1: PartialEq + Clone + 'static,
{
    fn get(&self, row: &R, column: &C) -> Result<Option<V>> {
        match self.lookup(row, column)? {
            Some((row, column)) => unmarshal_opt(self.values.as_ref(), self.inner.get(&row, &column)?),
            None => Ok(None),
        }
    }

    fn put(&self, row: R, column: C, value: V) -> Result<Option<V>> {
        let row = self.rows.marshal(&row)?;
        let column = self.columns.marshal(&column)?;
        let value = self.values.marshal(&value)?;
        unmarshal_opt(self.values.as_ref(), self.inner.put(row, column, value)?)
    }

    fn remove(&self, row: &R, column: &C) -> Result<Option<V>> {
        match self.lookup(row, column)? {
            Some((row, column)) => {
                unmarshal_opt(self.values.as_ref(), self.inner.remove(&row, &column)?)
            }
            None => Ok(None),
        }
    }

    fn contains(&self, row: &R, column: &C) -> Result<bool> {
        match self.lookup(row, column)? {
            Some((row, column)) => self.inner.contains(&row, &column),
            None => Ok(false),
        }
    }

    fn contains_row(&self, row: &R) -> Result<bool> {
        match marshal_lookup(self.rows.as_ref(), row)? {
            Some(row) => self.inner.contains_row(&row),
            None => Ok(false),
        }
    }

    fn contains_column(&self, column: &C) -> Result<bool> {
        match marshal_lookup(self.columns.as_ref(), column)? {
            Some(column) => self.inner.contains_column(&column),
            None => Ok(false),
        }
    }

    fn contains_value(&self, value: &V) -> Result<bool> {
        match marshal_lookup(self.values.as_ref(), value)? {
            Some(value) => self.inner.contains_value(&value),
            None => Ok(false),
        }
    }

    fn size(&self) -> Result<usize> {
        self.inner.size()
    }

    fn is_empty(&self) -> Result<bool> {
        self.inner.is_empty()
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    fn cell_set(&self) -> SetRef<Cell<R, C, V>> {
        let cells: Arc<dyn Marshaller<Cell<R, C, V>, Cell<R1, C1, V1>>> =
            Arc::new(CellMarshaller::new(
                Arc::clone(&self.rows),
                Arc::clone(&self.columns),
                Arc::clone(&self.values),
            ));
        Box::new(TransformingSet::new(self.inner.cell_set(), cells))
    }

    fn row_key_set(&self) -> SetRef<R> {
        Box::new(TransformingSet::new(
            self.inner.row_key_set(),
            Arc::clone(&self.rows),
        ))
    }

    fn column_key_set(&self) -> SetRef<C> {
        Box::new(TransformingSet::new(
            self.inner.column_key_set(),
            Arc::clone(&self.columns),
        ))
    }

    fn values(&self) -> CollectionRef<V> {
        Box::new(TransformingCollection::new(
            self.inner.values(),
            Arc::clone(&self.values),
        ))
    }

    fn row(&self, row: R) -> Result<MapRef<C, V>> {
        let inner = self.inner.row(self.rows.marshal(&row)?)?;
        Ok(Arc::new(TransformingMap::new(
            inner,
            Arc::clone(&self.columns),
            Arc::clone(&self.values),
        )))
    }

    fn column(&self, column: C) -> Result<MapRef<R, V>> {
        let inner = self.inner.column(self.columns.marshal(&column)?)?;
        Ok(Arc::new(TransformingMap::new(
            inner,
            Arc::clone(&self.rows),
            Arc::clone(&self.values),
        )))
    }

    fn row_map(&self) -> MapRef<R, MapRef<C, V>> {
        let inner_maps: Arc<dyn Marshaller<MapRef<C, V>, MapRef<C1, V1>>> = Arc::new(
            InnerMapMarshaller::new(Arc::clone(&self.columns), Arc::clone(&self.values)),
        );
        Arc::new(TransformingMap::new(
            self.inner.row_map(),
            Arc::clone(&self.rows),
            inner_maps,
        ))
    }

    fn column_map(&self) -> MapRef<C, MapRef<R, V>> {
        let inner_maps: Arc<dyn Marshaller<MapRef<R, V>, MapRef<R1, V1>>> = Arc::new(
            InnerMapMarshaller::new(Arc::clone(&self.rows), Arc::clone(&self.values)),
        );
        Arc::new(TransformingMap::new(
            self.inner.column_map(),
            Arc::clone(&self.columns),
            inner_maps,
        ))
    }
}

/// Transforms whole cells axis by axis.
pub struct CellMarshaller<R, C, V, R1, C1, V1> {
    rows: Arc<dyn Marshaller<R, R1>>,
    columns: Arc<dyn Marshaller<C, C1>>,
    values: Arc<dyn Marshaller<V, V1>>,
}

impl<R, C, V, R1, C1, V1> CellMarshaller<R, C, V, R1, C1, V1> {
    pub fn new(
        rows: Arc<dyn Marshaller<R, R1>>,
        columns: Arc<dyn Marshaller<C, C1>>,
        values: Arc<dyn Marshaller<V, V1>>,
    ) -> Self {
        Self {
            rows,
            columns,
            values,
        }
    }
}

impl<R, C, V, R1, C1, V1> Marshaller<Cell<R, C, V>, Cell<R1, C1, V1>>
    for CellMarshaller<R, C, V, R1, C1, V1>
{
    fn marshal(&self, cell: &Cell<R, C, V>) -> Result<Cell<R1, C1, V1>> {
        Ok(Cell::new(
            self.rows.marshal(cell.row())?,
            self.columns.marshal(cell.column())?,
            self.values.marshal(cell.value())?,
        ))
    }

    fn unmarshal(&self, cell: &Cell<R1, C1, V1>) -> Result<Cell<R, C, V>> {
        Ok(Cell::new(
            self.rows.unmarshal(cell.row())?,
            self.columns.unmarshal(cell.column())?,
            self.values.unmarshal(cell.value())?,
        ))
    }
}

/// Transforms the inner maps of a row map or column map.
///
/// Unmarshalling wraps the canonical inner map without copying it, so the
/// typed inner map stays live. Marshalling a typed inner map reads it once
/// into a [`DetachedMap`], which is what `put` on the outer map consumes.
pub struct InnerMapMarshaller<K, V, K1, V1> {
    keys: Arc<dyn Marshaller<K, K1>>,
    values: Arc<dyn Marshaller<V, V1>>,
}

impl<K, V, K1, V1> InnerMapMarshaller<K, V, K1, V1> {
    pub fn new(keys: Arc<dyn Marshaller<K, K1>>, values: Arc<dyn Marshaller<V, V1>>) -> Self {
        Self { keys, values }
    }
}

impl<K, V, K1, V1> Marshaller<MapRef<K, V>, MapRef<K1, V1>> for InnerMapMarshaller<K, V, K1, V1>
where
    K: 'static,
    V: 'static,
    K1: PartialEq + Clone + 'static,
    V1: PartialEq + Clone + 'static,
{
    fn marshal(&self, map: &MapRef<K, V>) -> Result<MapRef<K1, V1>> {
        let mut pairs = Vec::new();
        for (key, value) in map.to_vec()? {
            pairs.push((self.keys.marshal(&key)?, self.values.marshal(&value)?));
        }
        Ok(Arc::new(DetachedMap::new(pairs)))
    }

    fn unmarshal(&self, map: &MapRef<K1, V1>) -> Result<MapRef<K, V>> {
        Ok(Arc::new(TransformingMap::new(
            Arc::clone(map),
            Arc::clone(&self.keys),
            Arc::clone(&self.values),
        )))
    }
}
