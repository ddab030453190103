use std::marker::PhantomData;

use kvtable_commons::Result;

use crate::collection::{CollectionView, MapView, SetView, ViewIter};

/// Live key set of any map. Removing a key removes its entry.
pub struct KeySetView<M, K, V> {
    map: M,
    _phantom: PhantomData<fn() -> (K, V)>,
}

impl<M, K, V> KeySetView<M, K, V> {
    pub fn new(map: M) -> Self {
        Self {
            map,
            _phantom: PhantomData,
        }
    }
}

impl<M: MapView<K, V>, K, V> CollectionView<K> for KeySetView<M, K, V> {
    fn iter(&self) -> Result<ViewIter<'_, K>> {
        let entries = self.map.entries()?;
        Ok(Box::new(
            entries.map(|entry| entry.map(|entry| entry.into_parts().0)),
        ))
    }

    fn contains(&self, key: &K) -> Result<bool> {
        self.map.contains_key(key)
    }

    fn size(&self) -> Result<usize> {
        self.map.size()
    }

    fn is_empty(&self) -> Result<bool> {
        self.map.is_empty()
    }

    fn remove(&self, key: &K) -> Result<bool> {
        Ok(self.map.remove(key)?.is_some())
    }

    fn clear(&self) -> Result<()> {
        self.map.clear()
    }
}

impl<M: MapView<K, V>, K, V> SetView<K> for KeySetView<M, K, V> {}

/// Live values of any map, one per entry.
pub struct ValuesView<M, K, V> {
    map: M,
    _phantom: PhantomData<fn() -> (K, V)>,
}

impl<M, K, V> ValuesView<M, K, V> {
    pub fn new(map: M) -> Self {
        Self {
            map,
            _phantom: PhantomData,
        }
    }
}

impl<M: MapView<K, V>, K, V> CollectionView<V> for ValuesView<M, K, V> {
    fn iter(&self) -> Result<ViewIter<'_, V>> {
        let entries = self.map.entries()?;
        Ok(Box::new(
            entries.map(|entry| entry.map(|entry| entry.into_parts().1)),
        ))
    }

    fn contains(&self, value: &V) -> Result<bool> {
        self.map.contains_value(value)
    }

    fn size(&self) -> Result<usize> {
        self.map.size()
    }

    fn is_empty(&self) -> Result<bool> {
        self.map.is_empty()
    }

    fn clear(&self) -> Result<()> {
        self.map.clear()
    }
}
