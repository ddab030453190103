//! A typed table that stores rows, columns and values as JSON text.
//!
//! Any serde type can be a row, column or value. The canonical table only
//! ever sees JSON strings, which the codec then makes safe for the store.
//! Values that serialize to JSON `null` cannot be stored and are rejected by
//! `put` with [`TableError::InvalidArgument`].
//!
//! ```rust
//! use std::sync::Arc;
//! use serde::{Deserialize, Serialize};
//! use kvtable_store::{json_table, InMemoryTableService, StringTable, Table};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Score { points: u32 }
//!
//! let strings = StringTable::new(Arc::new(InMemoryTableService::new()), "scores");
//! let scores = json_table::<String, u16, Score>(Arc::new(strings));
//! scores.put("alice".to_string(), 2024, Score { points: 7 }).unwrap();
//! assert_eq!(
//!     scores.get(&"alice".to_string(), &2024).unwrap(),
//!     Some(Score { points: 7 })
//! );
//! ```
//!
//! [`TableError::InvalidArgument`]: kvtable_commons::TableError::InvalidArgument

use std::sync::Arc;

use kvtable_commons::JsonMarshaller;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::table::Table;
use crate::transform::TransformingTable;

/// A [`TransformingTable`] whose three marshallers are JSON.
pub type JsonTable<R, C, V> = TransformingTable<R, C, V>;

/// Lifts a canonical string table into a JSON-serializing typed table.
pub fn json_table<R, C, V>(inner: Arc<dyn Table<String, String, String>>) -> JsonTable<R, C, V>
where
    R: Serialize + DeserializeOwned + 'static,
    C: Serialize + DeserializeOwned + 'static,
    V: Serialize + DeserializeOwned + 'static,
{
    TransformingTable::new(
        inner,
        Arc::new(JsonMarshaller::<R>::new()),
        Arc::new(JsonMarshaller::<C>::new()),
        Arc::new(JsonMarshaller::<V>::new()),
    )
}
