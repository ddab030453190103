use std::sync::Arc;

use kvtable_commons::{Marshaller, Result};

use crate::collection::{CollectionRef, EntryRef, MapEntry, MapRef, MapView, SetRef, ViewIter};

use super::{marshal_lookup, unmarshal_opt, TransformingCollection, TransformingSet};

/// A `MapView<K1, V1>` presented as a `MapView<K, V>`.
///
/// Keys and values have independent marshallers; each operation transforms
/// only the dimensions it touches.
pub struct TransformingMap<K, V, K1, V1, M = MapRef<K1, V1>> {
    inner: M,
    keys: Arc<dyn Marshaller<K, K1>>,
    values: Arc<dyn Marshaller<V, V1>>,
}

impl<K, V, K1, V1, M> TransformingMap<K, V, K1, V1, M> {
    pub fn new(
        inner: M,
        keys: Arc<dyn Marshaller<K, K1>>,
        values: Arc<dyn Marshaller<V, V1>>,
    ) -> Self {
        Self {
            inner,
            keys,
            values,
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<K, V, K1, V1, M> MapView<K, V> for TransformingMap<K, V, K1, V1, M>
where
    K: 'static,
    V: 'static,
    K1: 'static,
    V1: 'static,
    M: MapView<K1, V1>,
{
    fn get(&self, key: &K) -> Result<Option<V>> {
        match marshal_lookup(self.keys.as_ref(), key)? {
            Some(repr) => unmarshal_opt(self.values.as_ref(), self.inner.get(&repr)?),
            None => Ok(None),
        }
    }

    fn contains_value(&self, value: &V) -> Result<bool> {
        match marshal_lookup(self.values.as_ref(), value)? {
            Some(repr) => self.inner.contains_value(&repr),
            None => Ok(false),
        }
    }

    fn entries(&self) -> Result<ViewIter<'_, EntryRef<K, V>>> {
        let entries = self.inner.entries()?;
        Ok(Box::new(entries.map(move |entry| {
            let entry = entry?;
            let key = self.keys.unmarshal(entry.key())?;
            let value = self.values.unmarshal(entry.value())?;
            Ok(Box::new(TransformingEntry {
                inner: entry,
                key,
                value,
                values: Arc::clone(&self.values),
            }) as EntryRef<K, V>)
        })))
    }

    fn key_set(&self) -> SetRef<K> {
        Box::new(TransformingSet::new(
            self.inner.key_set(),
            Arc::clone(&self.keys),
        ))
    }

    fn values(&self) -> CollectionRef<V> {
        Box::new(TransformingCollection::new(
            self.inner.values(),
            Arc::clone(&self.values),
        ))
    }

    fn contains_key(&self, key: &K) -> Result<bool> {
        match marshal_lookup(self.keys.as_ref(), key)? {
            Some(repr) => self.inner.contains_key(&repr),
            None => Ok(false),
        }
    }

    fn size(&self) -> Result<usize> {
        self.inner.size()
    }

    fn is_empty(&self) -> Result<bool> {
        self.inner.is_empty()
    }

    fn put(&self, key: K, value: V) -> Result<Option<V>> {
        let key = self.keys.marshal(&key)?;
        let value = self.values.marshal(&value)?;
        unmarshal_opt(self.values.as_ref(), self.inner.put(key, value)?)
    }

    fn remove(&self, key: &K) -> Result<Option<V>> {
        match marshal_lookup(self.keys.as_ref(), key)? {
            Some(repr) => unmarshal_opt(self.values.as_ref(), self.inner.remove(&repr)?),
            None => Ok(None),
        }
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }
}

/// Entry of a [`TransformingMap`]. `set_value` marshals and writes through
/// the backing entry.
pub struct TransformingEntry<K, V, K1, V1> {
    inner: EntryRef<K1, V1>,
    key: K,
    value: V,
    values: Arc<dyn Marshaller<V, V1>>,
}

impl<K, V, K1, V1> MapEntry<K, V> for TransformingEntry<K, V, K1, V1> {
    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn set_value(&mut self, value: V) -> Result<Option<V>> {
        let repr = self.values.marshal(&value)?;
        let previous = self.inner.set_value(repr)?;
        self.value = value;
        unmarshal_opt(self.values.as_ref(), previous)
    }

    fn into_parts(self: Box<Self>) -> (K, V) {
        (self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use kvtable_commons::ParseMarshaller;

    use crate::collection::{CollectionView, DetachedMap};
    use crate::in_memory::InMemoryTableService;
    use crate::string_table::StringTable;
    use crate::table::Table;

    fn typed_row(table: &StringTable) -> TransformingMap<i64, i32, String, String> {
        TransformingMap::new(
            table.row("row".to_string()).unwrap(),
            Arc::new(ParseMarshaller::<i64>::new()),
            Arc::new(ParseMarshaller::<i32>::new()),
        )
    }

    #[test]
    fn test_reads_and_writes_marshal() {
        let table = StringTable::new(Arc::new(InMemoryTableService::new()), "map");
        let row = typed_row(&table);

        assert_eq!(row.put(7, 70).unwrap(), None);
        assert_eq!(row.put(7, 71).unwrap(), Some(70));
        assert_eq!(
            table.get(&"row".to_string(), &"7".to_string()).unwrap(),
            Some("71".to_string())
        );
        assert_eq!(row.get(&7).unwrap(), Some(71));
        assert!(row.contains_key(&7).unwrap());
        assert!(row.contains_value(&71).unwrap());
        assert!(row.key_set().contains(&7).unwrap());
        assert_eq!(row.values().to_vec().unwrap(), vec![71]);
        assert_eq!(row.remove(&7).unwrap(), Some(71));
        assert!(row.is_empty().unwrap());
    }

    #[test]
    fn test_entry_set_value_writes_through() {
        let table = StringTable::new(Arc::new(InMemoryTableService::new()), "map");
        let row = typed_row(&table);
        row.put(1, 10).unwrap();

        let mut entries: Vec<_> = row.entries().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(*entries[0].key(), 1);
        assert_eq!(entries[0].set_value(11).unwrap(), Some(10));
        assert_eq!(*entries[0].value(), 11);
        assert_eq!(row.get(&1).unwrap(), Some(11));
    }

    #[test]
    fn test_detached_entries_reject_set_value() {
        let map: TransformingMap<i64, i64, String, String, DetachedMap<String, String>> =
            TransformingMap::new(
                DetachedMap::new(vec![("1".to_string(), "2".to_string())]),
                Arc::new(ParseMarshaller::<i64>::new()),
                Arc::new(ParseMarshaller::<i64>::new()),
            );
        assert_eq!(map.to_vec().unwrap(), vec![(1, 2)]);
        let mut entries: Vec<_> = map.entries().unwrap().collect::<Result<_>>().unwrap();
        assert!(entries[0].set_value(3).is_err());
    }
}
