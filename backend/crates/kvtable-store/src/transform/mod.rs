//! Bijective transformations of collections, maps and tables.
//!
//! Each wrapper owns a backing view of canonical type plus one
//! [`Marshaller`] per dimension, and presents the backing view in the domain
//! type. Nothing is copied: reads unmarshal each element as it is yielded,
//! writes marshal the argument and delegate.
//!
//! ```text
//! TransformingTable<f32, i64, i32>
//!     │  rows: f32 <-> String, columns: i64 <-> String, values: i32 <-> String
//!     ↓
//! StringTable (Table<String, String, String>)
//! ```
//!
//! ## Lookups that cannot match
//!
//! A lookup (`get`, `contains*`, `remove`) whose argument has no canonical
//! representation, i.e. the marshaller rejects it with
//! [`TableError::InvalidArgument`], resolves to absent instead of failing.
//! Writes (`put`, `add`) propagate the error. Arguments of a foreign type are
//! handled by the extension traits in [`crate::erased`].
//!
//! ## Equality
//!
//! [`TransformingCollection::equals`] is unordered multiset equality and
//! [`TransformingSet::equals`] is set equality; both hash order-independently.
//!
//! [`Marshaller`]: kvtable_commons::Marshaller
//! [`TableError::InvalidArgument`]: kvtable_commons::TableError::InvalidArgument

mod collection;
mod map;
mod table;

pub use collection::{TransformingCollection, TransformingSet};
pub use map::{TransformingEntry, TransformingMap};
pub use table::{CellMarshaller, InnerMapMarshaller, TransformingTable};

use kvtable_commons::{Marshaller, Result, TableError};

/// Marshals a lookup argument; `None` when it has no canonical form.
pub(crate) fn marshal_lookup<F, T>(marshaller: &dyn Marshaller<F, T>, value: &F) -> Result<Option<T>> {
    match marshaller.marshal(value) {
        Ok(repr) => Ok(Some(repr)),
        Err(TableError::InvalidArgument(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Unmarshals an optional canonical result.
pub(crate) fn unmarshal_opt<F, T>(marshaller: &dyn Marshaller<F, T>, repr: Option<T>) -> Result<Option<F>> {
    repr.map(|repr| marshaller.unmarshal(&repr)).transpose()
}
