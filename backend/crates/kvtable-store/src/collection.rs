//! Collection, set and map contracts for live, remote-backed views.
//!
//! Every view here is *live*: it holds no copy of the data, and each
//! observation (`iter`, `size`, `contains`, ...) runs a fresh scan against the
//! store. Two observations of the same view may therefore disagree when the
//! store changes in between; views are eventually consistent, never snapshots.
//!
//! Items produced by an iterator are `Result`s because a remote scan can fail
//! after it started.
//!
//! ## Mutation
//!
//! Mutating methods default to [`TableError::Unsupported`]. Views whose
//! elements map onto addressable cells (cell sets, row and column projections,
//! row and column maps) override them and delegate to the owning table.
//!
//! ## Equality
//!
//! [`collection_eq`] compares unordered multisets, [`set_eq`] compares sets and
//! [`map_eq`] compares key/value mappings. The matching hashes are order
//! independent, so equal views hash alike whatever order the store returns.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use kvtable_commons::{Result, TableError};

/// Lazily evaluated sequence of view elements.
pub type ViewIter<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

/// Owned handle to a collection view.
pub type CollectionRef<E> = Box<dyn CollectionView<E>>;

/// Owned handle to a set view.
pub type SetRef<E> = Box<dyn SetView<E>>;

/// Shared handle to a map view. Shared so nested maps can be re-wrapped.
pub type MapRef<K, V> = Arc<dyn MapView<K, V>>;

/// Owned handle to a map entry.
pub type EntryRef<K, V> = Box<dyn MapEntry<K, V>>;

/// A live collection of elements.
pub trait CollectionView<E> {
    /// Starts a fresh traversal. Nothing is retained between calls.
    fn iter(&self) -> Result<ViewIter<'_, E>>;

    /// Returns true if the collection holds `element`.
    fn contains(&self, element: &E) -> Result<bool>;

    /// Counts the elements a traversal yields right now.
    fn size(&self) -> Result<usize> {
        count(self.iter()?)
    }

    fn is_empty(&self) -> Result<bool> {
        is_exhausted(self.iter()?)
    }

    /// Collects one traversal into a vector.
    fn to_vec(&self) -> Result<Vec<E>> {
        self.iter()?.collect()
    }

    fn add(&self, _element: E) -> Result<bool> {
        Err(TableError::unsupported("add"))
    }

    fn remove(&self, _element: &E) -> Result<bool> {
        Err(TableError::unsupported("remove"))
    }

    /// Adds every element; returns true if any call changed the collection.
    ///
    /// Runs one `add` per element with no atomicity across elements.
    fn add_all(&self, elements: Vec<E>) -> Result<bool> {
        let mut changed = false;
        for element in elements {
            changed |= self.add(element)?;
        }
        Ok(changed)
    }

    /// Removes every element; returns true if any call changed the collection.
    fn remove_all(&self, elements: &[E]) -> Result<bool> {
        let mut changed = false;
        for element in elements {
            changed |= self.remove(element)?;
        }
        Ok(changed)
    }

    fn retain_all(&self, _elements: &[E]) -> Result<bool> {
        Err(TableError::unsupported("retain_all"))
    }

    fn clear(&self) -> Result<()> {
        Err(TableError::unsupported("clear"))
    }
}

/// A collection that yields each element at most once per traversal.
pub trait SetView<E>: CollectionView<E> {}

/// A key/value pair produced by a map traversal.
pub trait MapEntry<K, V> {
    fn key(&self) -> &K;

    fn value(&self) -> &V;

    /// Writes `value` through to the backing map and returns the value it replaced.
    fn set_value(&mut self, value: V) -> Result<Option<V>>;

    fn into_parts(self: Box<Self>) -> (K, V);
}

/// A live key/value mapping.
pub trait MapView<K, V> {
    fn get(&self, key: &K) -> Result<Option<V>>;

    fn contains_value(&self, value: &V) -> Result<bool>;

    /// Starts a fresh traversal over the entries.
    fn entries(&self) -> Result<ViewIter<'_, EntryRef<K, V>>>;

    /// Live view of the keys.
    fn key_set(&self) -> SetRef<K>;

    /// Live view of the values.
    fn values(&self) -> CollectionRef<V>;

    fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn size(&self) -> Result<usize> {
        count(self.entries()?)
    }

    fn is_empty(&self) -> Result<bool> {
        is_exhausted(self.entries()?)
    }

    /// Collects one traversal into `(key, value)` pairs.
    fn to_vec(&self) -> Result<Vec<(K, V)>> {
        self.entries()?
            .map(|entry| entry.map(|entry| entry.into_parts()))
            .collect()
    }

    fn put(&self, _key: K, _value: V) -> Result<Option<V>> {
        Err(TableError::unsupported("put"))
    }

    fn remove(&self, _key: &K) -> Result<Option<V>> {
        Err(TableError::unsupported("remove"))
    }

    /// Copies every entry of `other` into this map, one `put` per entry.
    fn put_all(&self, other: &dyn MapView<K, V>) -> Result<()> {
        for entry in other.entries()? {
            let (key, value) = entry?.into_parts();
            self.put(key, value)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Err(TableError::unsupported("clear"))
    }
}

impl<E, T: CollectionView<E> + ?Sized> CollectionView<E> for Box<T> {
    fn iter(&self) -> Result<ViewIter<'_, E>> {
        (**self).iter()
    }

    fn contains(&self, element: &E) -> Result<bool> {
        (**self).contains(element)
    }

    fn size(&self) -> Result<usize> {
        (**self).size()
    }

    fn is_empty(&self) -> Result<bool> {
        (**self).is_empty()
    }

    fn to_vec(&self) -> Result<Vec<E>> {
        (**self).to_vec()
    }

    fn add(&self, element: E) -> Result<bool> {
        (**self).add(element)
    }

    fn remove(&self, element: &E) -> Result<bool> {
        (**self).remove(element)
    }

    fn add_all(&self, elements: Vec<E>) -> Result<bool> {
        (**self).add_all(elements)
    }

    fn remove_all(&self, elements: &[E]) -> Result<bool> {
        (**self).remove_all(elements)
    }

    fn retain_all(&self, elements: &[E]) -> Result<bool> {
        (**self).retain_all(elements)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

impl<E, T: SetView<E> + ?Sized> SetView<E> for Box<T> {}

impl<K, V, T: MapView<K, V> + ?Sized> MapView<K, V> for Arc<T> {
    fn get(&self, key: &K) -> Result<Option<V>> {
        (**self).get(key)
    }

    fn contains_value(&self, value: &V) -> Result<bool> {
        (**self).contains_value(value)
    }

    fn entries(&self) -> Result<ViewIter<'_, EntryRef<K, V>>> {
        (**self).entries()
    }

    fn key_set(&self) -> SetRef<K> {
        (**self).key_set()
    }

    fn values(&self) -> CollectionRef<V> {
        (**self).values()
    }

    fn contains_key(&self, key: &K) -> Result<bool> {
        (**self).contains_key(key)
    }

    fn size(&self) -> Result<usize> {
        (**self).size()
    }

    fn is_empty(&self) -> Result<bool> {
        (**self).is_empty()
    }

    fn to_vec(&self) -> Result<Vec<(K, V)>> {
        (**self).to_vec()
    }

    fn put(&self, key: K, value: V) -> Result<Option<V>> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &K) -> Result<Option<V>> {
        (**self).remove(key)
    }

    fn put_all(&self, other: &dyn MapView<K, V>) -> Result<()> {
        (**self).put_all(other)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Counts the items of a traversal, stopping at the first error.
pub fn count<T>(iter: ViewIter<'_, T>) -> Result<usize> {
    let mut n = 0;
    for item in iter {
        item?;
        n += 1;
    }
    Ok(n)
}

/// Returns true when a traversal yields nothing.
pub fn is_exhausted<T>(mut iter: ViewIter<'_, T>) -> Result<bool> {
    match iter.next() {
        None => Ok(true),
        Some(item) => item.map(|_| false),
    }
}

/// Unordered multiset equality: same elements with the same multiplicities.
pub fn collection_eq<E, A, B>(a: &A, b: &B) -> Result<bool>
where
    E: Eq + Hash,
    A: CollectionView<E> + ?Sized,
    B: CollectionView<E> + ?Sized,
{
    let mut counts: HashMap<E, isize> = HashMap::new();
    for element in a.iter()? {
        *counts.entry(element?).or_insert(0) += 1;
    }
    for element in b.iter()? {
        *counts.entry(element?).or_insert(0) -= 1;
    }
    Ok(counts.values().all(|n| *n == 0))
}

/// Set equality: same distinct elements, multiplicity ignored.
pub fn set_eq<E, A, B>(a: &A, b: &B) -> Result<bool>
where
    E: Eq + Hash,
    A: CollectionView<E> + ?Sized,
    B: CollectionView<E> + ?Sized,
{
    let left: HashSet<E> = a.iter()?.collect::<Result<_>>()?;
    let right: HashSet<E> = b.iter()?.collect::<Result<_>>()?;
    Ok(left == right)
}

/// Mapping equality: same keys, each bound to an equal value.
pub fn map_eq<K, V, A, B>(a: &A, b: &B) -> Result<bool>
where
    K: Eq + Hash,
    V: PartialEq,
    A: MapView<K, V> + ?Sized,
    B: MapView<K, V> + ?Sized,
{
    let left: HashMap<K, V> = a.to_vec()?.into_iter().collect();
    let right: HashMap<K, V> = b.to_vec()?.into_iter().collect();
    Ok(left == right)
}

/// Order-independent hash over the elements of one traversal.
///
/// Consistent with both [`collection_eq`] and [`set_eq`] for duplicate-free
/// collections.
pub fn content_hash<E, A>(a: &A) -> Result<u64>
where
    E: Hash,
    A: CollectionView<E> + ?Sized,
{
    let mut sum = 0u64;
    for element in a.iter()? {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        element?.hash(&mut hasher);
        sum = sum.wrapping_add(hasher.finish());
    }
    Ok(sum)
}

/// Read-only entry detached from any store.
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedEntry<K, V> {
    key: K,
    value: V,
}

impl<K, V> DetachedEntry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

impl<K, V> MapEntry<K, V> for DetachedEntry<K, V> {
    fn key(&self) -> &K {
        &self.key
    }

    fn value(&self) -> &V {
        &self.value
    }

    fn set_value(&mut self, _value: V) -> Result<Option<V>> {
        Err(TableError::unsupported("set_value on a detached entry"))
    }

    fn into_parts(self: Box<Self>) -> (K, V) {
        (self.key, self.value)
    }
}

/// An immutable, in-process map.
///
/// Used to hand whole inner maps to `row_map().put(..)` and as the canonical
/// form of a typed inner map during marshalling. Later entries for a key
/// replace earlier ones.
#[derive(Debug)]
pub struct DetachedMap<K, V> {
    entries: Arc<Vec<(K, V)>>,
}

impl<K, V> Clone for DetachedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K: PartialEq, V> DetachedMap<K, V> {
    pub fn new(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut entries: Vec<(K, V)> = Vec::new();
        for (key, value) in pairs {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl<K, V> MapView<K, V> for DetachedMap<K, V>
where
    K: PartialEq + Clone + 'static,
    V: PartialEq + Clone + 'static,
{
    fn get(&self, key: &K) -> Result<Option<V>> {
        Ok(self
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    fn contains_value(&self, value: &V) -> Result<bool> {
        Ok(self.entries.iter().any(|(_, v)| v == value))
    }

    fn entries(&self) -> Result<ViewIter<'_, EntryRef<K, V>>> {
        Ok(Box::new(self.entries.iter().map(|(k, v)| {
            Ok(Box::new(DetachedEntry::new(k.clone(), v.clone())) as EntryRef<K, V>)
        })))
    }

    fn key_set(&self) -> SetRef<K> {
        Box::new(crate::views::KeySetView::new(self.clone()))
    }

    fn values(&self) -> CollectionRef<V> {
        Box::new(crate::views::ValuesView::new(self.clone()))
    }

    fn size(&self) -> Result<usize> {
        Ok(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecCollection(Vec<i32>);

    impl CollectionView<i32> for VecCollection {
        fn iter(&self) -> Result<ViewIter<'_, i32>> {
            Ok(Box::new(self.0.iter().copied().map(Ok)))
        }

        fn contains(&self, element: &i32) -> Result<bool> {
            Ok(self.0.contains(element))
        }
    }

    #[test]
    fn test_default_size_and_is_empty() {
        assert_eq!(VecCollection(vec![1, 2, 3]).size().unwrap(), 3);
        assert!(VecCollection(vec![]).is_empty().unwrap());
        assert!(!VecCollection(vec![4]).is_empty().unwrap());
    }

    #[test]
    fn test_default_mutations_are_unsupported() {
        let c = VecCollection(vec![1]);
        assert!(matches!(c.add(2), Err(TableError::Unsupported(_))));
        assert!(matches!(c.remove(&1), Err(TableError::Unsupported(_))));
        assert!(matches!(c.clear(), Err(TableError::Unsupported(_))));
        assert!(matches!(c.retain_all(&[1]), Err(TableError::Unsupported(_))));
    }

    #[test]
    fn test_collection_eq_is_unordered_multiset() {
        let a = VecCollection(vec![1, 2, 2, 3]);
        let b = VecCollection(vec![2, 3, 1, 2]);
        let c = VecCollection(vec![1, 2, 3, 3]);
        assert!(collection_eq(&a, &b).unwrap());
        assert!(!collection_eq(&a, &c).unwrap());
        assert_eq!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    #[test]
    fn test_set_eq_ignores_multiplicity() {
        let a = VecCollection(vec![1, 2, 2]);
        let b = VecCollection(vec![2, 1]);
        assert!(set_eq(&a, &b).unwrap());
        assert!(!collection_eq(&a, &b).unwrap());
    }

    #[test]
    fn test_error_stops_count() {
        struct Failing;
        impl CollectionView<i32> for Failing {
            fn iter(&self) -> Result<ViewIter<'_, i32>> {
                Ok(Box::new(
                    vec![Ok(1), Err(TableError::decode("bad"))].into_iter(),
                ))
            }
            fn contains(&self, _element: &i32) -> Result<bool> {
                Ok(false)
            }
        }
        assert!(matches!(Failing.size(), Err(TableError::Decode(_))));
    }

    #[test]
    fn test_detached_map() {
        let map = DetachedMap::new(vec![("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(map.size().unwrap(), 2);
        assert_eq!(map.get(&"a").unwrap(), Some(3));
        assert!(map.contains_value(&2).unwrap());
        assert!(!map.contains_value(&1).unwrap());
        assert!(map.key_set().contains(&"b").unwrap());
        assert!(matches!(map.put("c", 4), Err(TableError::Unsupported(_))));

        let same = DetachedMap::new(vec![("b", 2), ("a", 3)]);
        assert!(map_eq(&map, &same).unwrap());
    }
}
