//! Wire-level entity stored in the remote table.
//!
//! ## Naming
//!
//! The remote store addresses an entity by `(partition_key, row_key)`. The
//! canonical table stores its **row** in `partition_key` and its **column** in
//! `row_key`. The store's "row key" is therefore the table's *column*; keep the
//! two vocabularies apart when reading gateway code.

use serde::{Deserialize, Serialize};

/// Name of the single property carrying a cell's value.
pub const VALUE_PROPERTY: &str = "Value";

/// An encoded `(partition_key, row_key, value)` record as held by the store.
///
/// All three fields are already passed through [`crate::codec::encode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entity {
    pub partition_key: String,
    pub row_key: String,
    pub value: String,
}

impl Entity {
    pub fn new(
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            value: value.into(),
        }
    }

    /// Returns the `(partition_key, row_key)` address of this entity.
    pub fn address(&self) -> (&str, &str) {
        (&self.partition_key, &self.row_key)
    }
}
