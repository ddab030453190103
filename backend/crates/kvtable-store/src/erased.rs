//! Lookups with type-erased arguments.
//!
//! Each extension trait narrows `&dyn Any` arguments with [`try_cast`] before
//! running the typed operation. An argument of any other type resolves to
//! `false` or `None`; it is never an error.
//!
//! ```rust,ignore
//! use kvtable_store::erased::TableAnyExt;
//!
//! table.put(0.5_f32, 23_i64, 1_i32)?;
//! assert!(table.contains_any(&0.5_f32, &23_i64)?);
//! assert!(!table.contains_any(&0.5_f32, &"wrong-type-object")?);
//! ```

use std::any::Any;

use kvtable_commons::{try_cast, Result};

use crate::collection::{CollectionView, MapView};
use crate::table::Table;

/// Type-erased lookups on a [`Table`].
pub trait TableAnyExt<R: 'static, C: 'static, V: 'static>: Table<R, C, V> {
    fn contains_any(&self, row: &dyn Any, column: &dyn Any) -> Result<bool> {
        match (try_cast::<R>(row), try_cast::<C>(column)) {
            (Some(row), Some(column)) => self.contains(row, column),
            _ => Ok(false),
        }
    }

    fn get_any(&self, row: &dyn Any, column: &dyn Any) -> Result<Option<V>> {
        match (try_cast::<R>(row), try_cast::<C>(column)) {
            (Some(row), Some(column)) => self.get(row, column),
            _ => Ok(None),
        }
    }

    fn remove_any(&self, row: &dyn Any, column: &dyn Any) -> Result<Option<V>> {
        match (try_cast::<R>(row), try_cast::<C>(column)) {
            (Some(row), Some(column)) => self.remove(row, column),
            _ => Ok(None),
        }
    }

    fn contains_row_any(&self, row: &dyn Any) -> Result<bool> {
        try_cast::<R>(row).map_or(Ok(false), |row| self.contains_row(row))
    }

    fn contains_column_any(&self, column: &dyn Any) -> Result<bool> {
        try_cast::<C>(column).map_or(Ok(false), |column| self.contains_column(column))
    }

    fn contains_value_any(&self, value: &dyn Any) -> Result<bool> {
        try_cast::<V>(value).map_or(Ok(false), |value| self.contains_value(value))
    }
}

impl<R, C, V, T> TableAnyExt<R, C, V> for T
where
    R: 'static,
    C: 'static,
    V: 'static,
    T: Table<R, C, V> + ?Sized,
{
}

/// Type-erased lookups on a [`CollectionView`].
pub trait CollectionAnyExt<E: 'static>: CollectionView<E> {
    fn contains_any(&self, element: &dyn Any) -> Result<bool> {
        try_cast::<E>(element).map_or(Ok(false), |element| self.contains(element))
    }

    fn remove_any(&self, element: &dyn Any) -> Result<bool> {
        try_cast::<E>(element).map_or(Ok(false), |element| self.remove(element))
    }
}

impl<E: 'static, T: CollectionView<E> + ?Sized> CollectionAnyExt<E> for T {}

/// Type-erased lookups on a [`MapView`].
pub trait MapAnyExt<K: 'static, V: 'static>: MapView<K, V> {
    fn get_any(&self, key: &dyn Any) -> Result<Option<V>> {
        try_cast::<K>(key).map_or(Ok(None), |key| self.get(key))
    }

    fn contains_key_any(&self, key: &dyn Any) -> Result<bool> {
        try_cast::<K>(key).map_or(Ok(false), |key| self.contains_key(key))
    }

    fn contains_value_any(&self, value: &dyn Any) -> Result<bool> {
        try_cast::<V>(value).map_or(Ok(false), |value| self.contains_value(value))
    }

    fn remove_any(&self, key: &dyn Any) -> Result<Option<V>> {
        try_cast::<K>(key).map_or(Ok(None), |key| self.remove(key))
    }
}

impl<K: 'static, V: 'static, T: MapView<K, V> + ?Sized> MapAnyExt<K, V> for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::DetachedMap;

    #[test]
    fn test_map_lookups_with_foreign_types() {
        let map = DetachedMap::new(vec![(1_i64, "one".to_string())]);
        assert_eq!(map.get_any(&1_i64).unwrap(), Some("one".to_string()));
        assert_eq!(map.get_any(&1_i32).unwrap(), None);
        assert!(map.contains_key_any(&1_i64).unwrap());
        assert!(!map.contains_key_any(&"1").unwrap());
        assert!(map.contains_value_any(&"one".to_string()).unwrap());
        assert!(!map.contains_value_any(&"one").unwrap());
        assert_eq!(map.remove_any(&2.0_f64).unwrap(), None);
    }

    #[test]
    fn test_collection_lookups_with_foreign_types() {
        let map = DetachedMap::new(vec![("a".to_string(), 1_u8)]);
        let keys = map.key_set();
        assert!(keys.contains_any(&"a".to_string()).unwrap());
        assert!(!keys.contains_any(&'a').unwrap());
        assert!(!keys.remove_any(&7_u8).unwrap());
    }
}
