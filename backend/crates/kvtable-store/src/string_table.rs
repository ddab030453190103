//! The canonical `Table<String, String, String>` backed by the remote store.
//!
//! Every row, column and value passes through [`codec`] before it reaches the
//! gateway and is decoded on the way out, so arbitrary strings survive the
//! store's key restrictions. The table row is the entity's partition key and
//! the table column is the entity's row key.
//!
//! All derived collections are live views (see [`crate::views`]); nothing is
//! cached between calls.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use kvtable_store::{InMemoryTableService, MapView, StringTable, Table};
//!
//! let table = StringTable::new(Arc::new(InMemoryTableService::new()), "people");
//! table.put("r1".to_string(), "c1".to_string(), "v1".to_string()).unwrap();
//! assert_eq!(table.get(&"r1".to_string(), &"c1".to_string()).unwrap(), Some("v1".to_string()));
//!
//! let row = table.row("r1".to_string()).unwrap();
//! assert!(row.contains_key(&"c1".to_string()).unwrap());
//! ```

use std::sync::Arc;
use std::time::Duration;

use kvtable_commons::{codec, Cell, Entity, Result, TableError};
use kvtable_configs::config::defaults::default_max_key_bytes;
use kvtable_configs::TableSettings;

use crate::collection::{CollectionRef, MapRef, SetRef, ViewIter};
use crate::gateway::{EntityScan, RemoteTable};
use crate::query::TableQuery;
use crate::scope::Scope;
use crate::service::TableService;
use crate::table::Table;
use crate::views::{Axis, AxisMapView, CellSetView, ProjectionView, ScopedCollection, UniqueSet};

/// A cell of the canonical table.
pub type StringCell = Cell<String, String, String>;

/// Canonical string table. Cheap to clone; clones address the same remote table.
#[derive(Clone)]
pub struct StringTable {
    gateway: RemoteTable,
    max_key_bytes: usize,
}

impl StringTable {
    pub fn new(service: Arc<dyn TableService>, table_id: impl Into<String>) -> Self {
        Self::from_gateway(RemoteTable::new(service, table_id))
    }

    pub fn from_gateway(gateway: RemoteTable) -> Self {
        Self {
            gateway,
            max_key_bytes: default_max_key_bytes(),
        }
    }

    /// Builds a table from the `[table]` configuration section.
    pub fn with_settings(service: Arc<dyn TableService>, settings: &TableSettings) -> Self {
        let gateway = RemoteTable::new(service, settings.name.clone())
            .with_timeout(settings.request_timeout_ms.map(Duration::from_millis));
        Self {
            gateway,
            max_key_bytes: settings.max_key_bytes,
        }
    }

    /// Overrides the largest encoded key accepted by `put`.
    pub fn with_max_key_bytes(mut self, max_key_bytes: usize) -> Self {
        self.max_key_bytes = max_key_bytes;
        self
    }

    pub fn gateway(&self) -> &RemoteTable {
        &self.gateway
    }

    pub fn max_key_bytes(&self) -> usize {
        self.max_key_bytes
    }

    /// Encodes a key, or `None` if the encoded form exceeds the key limit.
    ///
    /// An oversized key can never have been stored.
    fn encode_key(&self, key: &str) -> Option<String> {
        let encoded = codec::encode(key);
        (encoded.len() <= self.max_key_bytes).then_some(encoded)
    }

    fn encode_key_checked(&self, what: &str, key: &str) -> Result<String> {
        self.encode_key(key).ok_or_else(|| {
            TableError::invalid_argument(format!(
                "encoded {} key exceeds {} bytes",
                what, self.max_key_bytes
            ))
        })
    }

    fn address(&self, row: &str, column: &str) -> Option<(String, String)> {
        Some((self.encode_key(row)?, self.encode_key(column)?))
    }

    fn decode_value(entity: &Entity) -> Result<String> {
        codec::decode(&entity.value)
    }

    pub(crate) fn decode_entity(entity: Entity) -> Result<StringCell> {
        Ok(Cell::new(
            codec::decode(&entity.partition_key)?,
            codec::decode(&entity.row_key)?,
            codec::decode(&entity.value)?,
        ))
    }

    /// Fresh scan of the decoded cells in `scope`.
    pub(crate) fn scan_cells(&self, scope: &Scope) -> Result<ViewIter<'_, StringCell>> {
        let entities = self.gateway.scan(&scope.to_query())?;
        Ok(Box::new(
            entities.map(|entity| entity.and_then(Self::decode_entity)),
        ))
    }

    /// Returns true if at least one cell lies in `scope`.
    pub(crate) fn exists(&self, scope: &Scope) -> Result<bool> {
        self.gateway.exists(scope.to_query())
    }

    /// Removes every cell in `scope` and returns how many were removed.
    ///
    /// The scan is collected before deleting so deletes cannot disturb it.
    pub(crate) fn remove_scope(&self, scope: &Scope) -> Result<usize> {
        let entities: Vec<Entity> = self.gateway.scan(&scope.to_query())?.collect::<Result<_>>()?;
        let mut removed = 0;
        for entity in entities {
            if self.gateway.delete(&entity)?.is_some() {
                removed += 1;
            }
        }
        log::debug!(
            "removed {} cells from {} in scope {:?}",
            removed,
            self.gateway.table_id(),
            scope
        );
        Ok(removed)
    }

    fn entities(&self) -> EntityScan {
        EntityScan::new(self.gateway.clone(), TableQuery::all())
    }
}

impl Table<String, String, String> for StringTable {
    fn get(&self, row: &String, column: &String) -> Result<Option<String>> {
        let Some((partition_key, row_key)) = self.address(row, column) else {
            return Ok(None);
        };
        self.gateway
            .retrieve(&partition_key, &row_key)?
            .map(|entity| Self::decode_value(&entity))
            .transpose()
    }

    fn put(&self, row: String, column: String, value: String) -> Result<Option<String>> {
        let partition_key = self.encode_key_checked("row", &row)?;
        let row_key = self.encode_key_checked("column", &column)?;
        self.gateway
            .put(&partition_key, &row_key, &codec::encode(&value))?
            .map(|entity| Self::decode_value(&entity))
            .transpose()
    }

    /// Reads the cell, then deletes it.
    ///
    /// Returns `None` when the cell is absent or disappears between the read
    /// and the delete.
    fn remove(&self, row: &String, column: &String) -> Result<Option<String>> {
        let Some((partition_key, row_key)) = self.address(row, column) else {
            return Ok(None);
        };
        let Some(existing) = self.gateway.retrieve(&partition_key, &row_key)? else {
            return Ok(None);
        };
        match self.gateway.delete(&existing)? {
            Some(_) => Self::decode_value(&existing).map(Some),
            None => Ok(None),
        }
    }

    fn contains_row(&self, row: &String) -> Result<bool> {
        self.exists(&Scope::row(row.as_str()))
    }

    fn contains_column(&self, column: &String) -> Result<bool> {
        self.exists(&Scope::column(column.as_str()))
    }

    fn contains_value(&self, value: &String) -> Result<bool> {
        self.exists(&Scope::all().with_value(value.as_str()))
    }

    fn size(&self) -> Result<usize> {
        self.entities().size()
    }

    fn is_empty(&self) -> Result<bool> {
        self.entities().is_empty()
    }

    fn clear(&self) -> Result<()> {
        self.remove_scope(&Scope::all()).map(|_| ())
    }

    fn cell_set(&self) -> SetRef<StringCell> {
        Box::new(CellSetView::new(self.clone()))
    }

    fn row_key_set(&self) -> SetRef<String> {
        Box::new(UniqueSet::new(ScopedCollection::rows(self.clone(), Scope::all())))
    }

    fn column_key_set(&self) -> SetRef<String> {
        Box::new(UniqueSet::new(ScopedCollection::columns(
            self.clone(),
            Scope::all(),
        )))
    }

    fn values(&self) -> CollectionRef<String> {
        Box::new(ScopedCollection::values(self.clone(), Scope::all()))
    }

    fn row(&self, row: String) -> Result<MapRef<String, String>> {
        Ok(Arc::new(ProjectionView::new(self.clone(), Axis::Row, row)))
    }

    fn column(&self, column: String) -> Result<MapRef<String, String>> {
        Ok(Arc::new(ProjectionView::new(self.clone(), Axis::Column, column)))
    }

    fn row_map(&self) -> MapRef<String, MapRef<String, String>> {
        Arc::new(AxisMapView::new(self.clone(), Axis::Row))
    }

    fn column_map(&self) -> MapRef<String, MapRef<String, String>> {
        Arc::new(AxisMapView::new(self.clone(), Axis::Column))
    }
}
