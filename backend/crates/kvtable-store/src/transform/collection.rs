use std::hash::Hash;
use std::sync::Arc;

use kvtable_commons::{Marshaller, Result};

use crate::collection::{
    collection_eq, content_hash, set_eq, CollectionRef, CollectionView, SetRef, SetView, ViewIter,
};

use super::marshal_lookup;

/// A `CollectionView<T>` presented as a `CollectionView<F>`.
pub struct TransformingCollection<F, T, I = CollectionRef<T>> {
    inner: I,
    marshaller: Arc<dyn Marshaller<F, T>>,
}

impl<F, T, I> TransformingCollection<F, T, I> {
    pub fn new(inner: I, marshaller: Arc<dyn Marshaller<F, T>>) -> Self {
        Self { inner, marshaller }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<F, T, I: CollectionView<T>> TransformingCollection<F, T, I> {
    /// Unordered multiset equality with any collection of `F`.
    pub fn equals(&self, other: &dyn CollectionView<F>) -> Result<bool>
    where
        F: Eq + Hash,
    {
        collection_eq(self, other)
    }

    /// Order-independent hash, consistent with [`Self::equals`].
    pub fn hash_code(&self) -> Result<u64>
    where
        F: Hash,
    {
        content_hash(self)
    }
}

impl<F, T, I: CollectionView<T>> CollectionView<F> for TransformingCollection<F, T, I> {
    fn iter(&self) -> Result<ViewIter<'_, F>> {
        let marshaller = &self.marshaller;
        let items = self.inner.iter()?;
        Ok(Box::new(
            items.map(move |item| item.and_then(|repr| marshaller.unmarshal(&repr))),
        ))
    }

    fn contains(&self, element: &F) -> Result<bool> {
        match marshal_lookup(self.marshaller.as_ref(), element)? {
            Some(repr) => self.inner.contains(&repr),
            None => Ok(false),
        }
    }

    fn size(&self) -> Result<usize> {
        self.inner.size()
    }

    fn is_empty(&self) -> Result<bool> {
        self.inner.is_empty()
    }

    fn add(&self, element: F) -> Result<bool> {
        let repr = self.marshaller.marshal(&element)?;
        self.inner.add(repr)
    }

    fn remove(&self, element: &F) -> Result<bool> {
        match marshal_lookup(self.marshaller.as_ref(), element)? {
            Some(repr) => self.inner.remove(&repr),
            None => Ok(false),
        }
    }

    fn retain_all(&self, elements: &[F]) -> Result<bool> {
        let mut reprs = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(repr) = marshal_lookup(self.marshaller.as_ref(), element)? {
                reprs.push(repr);
            }
        }
        self.inner.retain_all(&reprs)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }
}

/// A `SetView<T>` presented as a `SetView<F>`.
///
/// The marshaller is a bijection, so distinct canonical elements stay
/// distinct and the result is still a set.
pub struct TransformingSet<F, T, I = SetRef<T>>(TransformingCollection<F, T, I>);

impl<F, T, I> TransformingSet<F, T, I> {
    pub fn new(inner: I, marshaller: Arc<dyn Marshaller<F, T>>) -> Self {
        Self(TransformingCollection::new(inner, marshaller))
    }

    pub fn inner(&self) -> &I {
        self.0.inner()
    }
}

impl<F, T, I: CollectionView<T>> TransformingSet<F, T, I> {
    /// Set equality with any collection of `F`.
    pub fn equals(&self, other: &dyn CollectionView<F>) -> Result<bool>
    where
        F: Eq + Hash,
    {
        set_eq(self, other)
    }

    pub fn hash_code(&self) -> Result<u64>
    where
        F: Hash,
    {
        content_hash(self)
    }
}

impl<F, T, I: CollectionView<T>> CollectionView<F> for TransformingSet<F, T, I> {
    fn iter(&self) -> Result<ViewIter<'_, F>> {
        self.0.iter()
    }

    fn contains(&self, element: &F) -> Result<bool> {
        self.0.contains(element)
    }

    fn size(&self) -> Result<usize> {
        self.0.size()
    }

    fn is_empty(&self) -> Result<bool> {
        self.0.is_empty()
    }

    fn add(&self, element: F) -> Result<bool> {
        self.0.add(element)
    }

    fn remove(&self, element: &F) -> Result<bool> {
        self.0.remove(element)
    }

    fn retain_all(&self, elements: &[F]) -> Result<bool> {
        self.0.retain_all(elements)
    }

    fn clear(&self) -> Result<()> {
        self.0.clear()
    }
}

impl<F, T, I: SetView<T>> SetView<F> for TransformingSet<F, T, I> {}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    use kvtable_commons::{JsonMarshaller, ParseMarshaller, TableError};

    /// Canonical collection holding marshalled strings.
    #[derive(Default)]
    struct Strings(Mutex<Vec<String>>);

    impl CollectionView<String> for Strings {
        fn iter(&self) -> Result<ViewIter<'_, String>> {
            Ok(Box::new(self.0.lock().clone().into_iter().map(Ok)))
        }

        fn contains(&self, element: &String) -> Result<bool> {
            Ok(self.0.lock().contains(element))
        }

        fn add(&self, element: String) -> Result<bool> {
            self.0.lock().push(element);
            Ok(true)
        }

        fn remove(&self, element: &String) -> Result<bool> {
            let mut items = self.0.lock();
            match items.iter().position(|e| e == element) {
                Some(i) => {
                    items.remove(i);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    impl SetView<String> for Strings {}

    fn longs(values: &[&str]) -> TransformingCollection<i64, String, Strings> {
        let inner = Strings(Mutex::new(values.iter().map(|v| v.to_string()).collect()));
        TransformingCollection::new(inner, Arc::new(ParseMarshaller::<i64>::new()))
    }

    #[test]
    fn test_iteration_unmarshals() {
        let c = longs(&["3", "1", "2"]);
        assert_eq!(c.to_vec().unwrap(), vec![3, 1, 2]);
        assert_eq!(c.size().unwrap(), 3);
    }

    #[test]
    fn test_add_and_remove_marshal() {
        let c = longs(&[]);
        assert!(c.add(42).unwrap());
        assert_eq!(c.inner().0.lock().clone(), vec!["42".to_string()]);
        assert!(c.contains(&42).unwrap());
        assert!(c.remove(&42).unwrap());
        assert!(!c.remove(&42).unwrap());
        assert!(c.is_empty().unwrap());
    }

    #[test]
    fn test_unrepresentable_lookups_are_absent() {
        let inner = Strings::default();
        let c: TransformingCollection<Option<u8>, String, Strings> =
            TransformingCollection::new(inner, Arc::new(JsonMarshaller::<Option<u8>>::new()));
        assert!(!c.contains(&None).unwrap());
        assert!(!c.remove(&None).unwrap());
        assert!(matches!(c.add(None), Err(TableError::InvalidArgument(_))));
        assert!(c.add(Some(1)).unwrap());
        assert!(c.contains(&Some(1)).unwrap());
    }

    #[test]
    fn test_equality_is_unordered() {
        let a = longs(&["1", "2", "2"]);
        let b = longs(&["2", "1", "2"]);
        let c = longs(&["1", "2"]);
        assert!(a.equals(&b).unwrap());
        assert!(!a.equals(&c).unwrap());
        assert_eq!(a.hash_code().unwrap(), b.hash_code().unwrap());
    }

    #[test]
    fn test_set_equality() {
        let marshaller: Arc<dyn Marshaller<i64>> = Arc::new(ParseMarshaller::<i64>::new());
        let a = TransformingSet::new(
            Strings(Mutex::new(vec!["1".into(), "2".into()])),
            marshaller.clone(),
        );
        let b = TransformingSet::new(Strings(Mutex::new(vec!["2".into(), "1".into()])), marshaller);
        assert!(a.equals(&b).unwrap());
        assert_eq!(a.hash_code().unwrap(), b.hash_code().unwrap());
    }
}
