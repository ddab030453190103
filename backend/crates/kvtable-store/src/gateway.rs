//! Typed gateway over the remote table service.
//!
//! ## Architecture
//!
//! ```text
//! StringTable / views      ← logical rows, columns, values
//!     ↓
//! RemoteTable (this file)  ← encoded keys, entities, not-found normalisation
//!     ↓
//! TableService             ← transport, auth, retries (external)
//! ```
//!
//! All keys and values handled here are already encoded. The gateway turns a
//! not-found [`StoreError`] on retrieve and delete into `None`; every other
//! store error propagates as [`TableError::Store`].

use std::sync::Arc;
use std::time::Duration;

use kvtable_commons::{Entity, Result, StoreError, TableError};

use crate::query::{Filter, TableQuery};
use crate::service::{RequestContext, TableOperation, TableService};
use crate::collection::ViewIter;

/// Returns true if `err` reports a missing entity.
///
/// Both spellings of the store's not-found code are recognised.
pub fn is_not_found(err: &StoreError) -> bool {
    err.is_not_found()
}

/// Handle on one remote table. Cheap to clone; clones share the service.
#[derive(Clone)]
pub struct RemoteTable {
    service: Arc<dyn TableService>,
    table_id: String,
    timeout: Option<Duration>,
}

impl RemoteTable {
    pub fn new(service: Arc<dyn TableService>, table_id: impl Into<String>) -> Self {
        Self {
            service,
            table_id: table_id.into(),
            timeout: None,
        }
    }

    /// Sets the deadline applied to every request issued through this handle.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn context(&self) -> RequestContext {
        match self.timeout {
            Some(timeout) => RequestContext::with_timeout(timeout),
            None => RequestContext::unbounded(),
        }
    }

    /// Fetches the entity at `(partition_key, row_key)`.
    pub fn retrieve(&self, partition_key: &str, row_key: &str) -> Result<Option<Entity>> {
        log::debug!("retrieve {}:{}:{}", self.table_id, partition_key, row_key);
        let operation = TableOperation::Retrieve {
            partition_key: partition_key.to_string(),
            row_key: row_key.to_string(),
        };
        match self.service.execute(&self.table_id, operation, &self.context()) {
            Ok(entity) => Ok(entity),
            Err(err) if is_not_found(&err) => {
                log::trace!("retrieve {}:{}: not found", partition_key, row_key);
                Ok(None)
            }
            Err(err) => Err(TableError::Store(err)),
        }
    }

    /// Upserts an entity and returns the one it replaced.
    ///
    /// Reads the previous entity first; the read and the write are two separate
    /// requests with no atomicity between them.
    pub fn put(&self, partition_key: &str, row_key: &str, value: &str) -> Result<Option<Entity>> {
        let previous = self.retrieve(partition_key, row_key)?;
        log::debug!("insert_or_replace {}:{}:{}", self.table_id, partition_key, row_key);
        let entity = Entity::new(partition_key, row_key, value);
        self.service
            .execute(&self.table_id, TableOperation::InsertOrReplace(entity), &self.context())?;
        Ok(previous)
    }

    /// Deletes an entity and returns what was removed.
    ///
    /// Deleting a missing entity is not an error and returns `None`.
    pub fn delete(&self, entity: &Entity) -> Result<Option<Entity>> {
        log::debug!(
            "delete {}:{}:{}",
            self.table_id,
            entity.partition_key,
            entity.row_key
        );
        match self.service.execute(
            &self.table_id,
            TableOperation::Delete(entity.clone()),
            &self.context(),
        ) {
            Ok(removed) => Ok(removed),
            Err(err) if is_not_found(&err) => {
                log::trace!(
                    "delete {}:{}: already gone",
                    entity.partition_key,
                    entity.row_key
                );
                Ok(None)
            }
            Err(err) => Err(TableError::Store(err)),
        }
    }

    /// Starts a fresh scan for `query`.
    pub fn scan(&self, query: &TableQuery) -> Result<ViewIter<'_, Entity>> {
        log::debug!(
            "query {} filter={}",
            self.table_id,
            query.filter().map_or_else(|| "<none>".to_string(), |f| f.to_string())
        );
        let entities = self.service.query(&self.table_id, query, &self.context())?;
        Ok(Box::new(entities.map(|item| item.map_err(TableError::Store))))
    }

    pub fn scan_all(&self) -> Result<ViewIter<'_, Entity>> {
        self.scan(&TableQuery::all())
    }

    pub fn scan_by_row(&self, partition_key: &str) -> Result<ViewIter<'_, Entity>> {
        self.scan(&TableQuery::filtered(Filter::partition_key_eq(partition_key)))
    }

    pub fn scan_by_column(&self, row_key: &str) -> Result<ViewIter<'_, Entity>> {
        self.scan(&TableQuery::filtered(Filter::row_key_eq(row_key)))
    }

    pub fn scan_by_value(&self, value: &str) -> Result<ViewIter<'_, Entity>> {
        self.scan(&TableQuery::filtered(Filter::value_eq(value)))
    }

    pub fn scan_by_row_with_value(
        &self,
        partition_key: &str,
        value: &str,
    ) -> Result<ViewIter<'_, Entity>> {
        self.scan(&TableQuery::filtered(
            Filter::partition_key_eq(partition_key).and(Filter::value_eq(value)),
        ))
    }

    pub fn scan_by_column_with_value(
        &self,
        row_key: &str,
        value: &str,
    ) -> Result<ViewIter<'_, Entity>> {
        self.scan(&TableQuery::filtered(
            Filter::row_key_eq(row_key).and(Filter::value_eq(value)),
        ))
    }

    /// Returns true if `query` matches at least one entity.
    ///
    /// Asks the store for a single result.
    pub fn exists(&self, query: TableQuery) -> Result<bool> {
        match self.scan(&query.with_take(1))?.next() {
            None => Ok(false),
            Some(entity) => entity.map(|_| true),
        }
    }
}

/// Read-only, set-like wrapper over the entities a query yields.
///
/// Offers only `size`, `is_empty` and `contains`; each call rescans.
pub struct EntityScan {
    gateway: RemoteTable,
    query: TableQuery,
}

impl EntityScan {
    pub fn new(gateway: RemoteTable, query: TableQuery) -> Self {
        Self { gateway, query }
    }

    pub fn size(&self) -> Result<usize> {
        crate::collection::count(self.gateway.scan(&self.query)?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(!self.gateway.exists(self.query.clone())?)
    }

    /// Returns true if the scan yields an entity equal to `entity`.
    pub fn contains(&self, entity: &Entity) -> Result<bool> {
        if !self.query.matches(entity) {
            return Ok(false);
        }
        Ok(self
            .gateway
            .retrieve(&entity.partition_key, &entity.row_key)?
            .map_or(false, |found| found == *entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::{CallKind, InMemoryTableService};

    fn gateway() -> (Arc<InMemoryTableService>, RemoteTable) {
        let service = Arc::new(InMemoryTableService::new());
        let gateway = RemoteTable::new(service.clone(), "cells");
        (service, gateway)
    }

    #[test]
    fn test_put_returns_previous_entity() {
        let (_, gateway) = gateway();
        assert_eq!(gateway.put("p", "r", "v1").unwrap(), None);
        let previous = gateway.put("p", "r", "v2").unwrap().unwrap();
        assert_eq!(previous.value, "v1");
        assert_eq!(gateway.retrieve("p", "r").unwrap().unwrap().value, "v2");
    }

    #[test]
    fn test_retrieve_missing_is_none() {
        let (_, gateway) = gateway();
        assert_eq!(gateway.retrieve("p", "r").unwrap(), None);
    }

    #[test]
    fn test_delete_missing_is_none() {
        let (_, gateway) = gateway();
        assert_eq!(gateway.delete(&Entity::new("p", "r", "v")).unwrap(), None);
    }

    #[test]
    fn test_legacy_not_found_code_is_normalised() {
        let (service, gateway) = gateway();
        service.fail_next(
            CallKind::Retrieve,
            StoreError::new("RESOURCE_NOT_FOUND", "no such entity"),
        );
        assert_eq!(gateway.retrieve("p", "r").unwrap(), None);
    }

    #[test]
    fn test_other_errors_propagate() {
        let (service, gateway) = gateway();
        service.fail_next(CallKind::Delete, StoreError::new("AuthorizationFailure", "denied"));
        let err = gateway.delete(&Entity::new("p", "r", "v")).unwrap_err();
        assert_eq!(err.as_store_error().unwrap().code(), "AuthorizationFailure");
    }

    #[test]
    fn test_scoped_scans() {
        let (_, gateway) = gateway();
        gateway.put("a", "1", "x").unwrap();
        gateway.put("a", "2", "y").unwrap();
        gateway.put("b", "1", "x").unwrap();

        assert_eq!(crate::collection::count(gateway.scan_all().unwrap()).unwrap(), 3);
        assert_eq!(crate::collection::count(gateway.scan_by_row("a").unwrap()).unwrap(), 2);
        assert_eq!(crate::collection::count(gateway.scan_by_column("1").unwrap()).unwrap(), 2);
        assert_eq!(crate::collection::count(gateway.scan_by_value("x").unwrap()).unwrap(), 2);
        assert_eq!(
            crate::collection::count(gateway.scan_by_row_with_value("a", "x").unwrap()).unwrap(),
            1
        );
        assert_eq!(
            crate::collection::count(gateway.scan_by_column_with_value("2", "x").unwrap())
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_entity_scan() {
        let (_, gateway) = gateway();
        gateway.put("a", "1", "x").unwrap();
        gateway.put("b", "1", "y").unwrap();

        let row_a = EntityScan::new(
            gateway.clone(),
            TableQuery::filtered(Filter::partition_key_eq("a")),
        );
        assert_eq!(row_a.size().unwrap(), 1);
        assert!(!row_a.is_empty().unwrap());
        assert!(row_a.contains(&Entity::new("a", "1", "x")).unwrap());
        assert!(!row_a.contains(&Entity::new("a", "1", "stale")).unwrap());
        assert!(!row_a.contains(&Entity::new("b", "1", "y")).unwrap());

        let empty = EntityScan::new(gateway, TableQuery::filtered(Filter::value_eq("zzz")));
        assert!(empty.is_empty().unwrap());
    }
}
