//! In-process implementation of [`TableService`].
//!
//! Behaves like the remote store as far as this crate can observe: missing
//! entities produce not-found errors, scans read a snapshot taken when the
//! scan starts, and deadlines are honoured. Used by tests and local
//! development.
//!
//! Faults can be scheduled with [`InMemoryTableService::fail_next`]; the next
//! call of the given kind fails with the supplied error instead of running.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use kvtable_commons::{Entity, StoreError};
use parking_lot::{Mutex, RwLock};

use crate::query::TableQuery;
use crate::service::{EntityIter, RequestContext, StoreResult, TableOperation, TableService};

/// Kind of call a scheduled fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Retrieve,
    InsertOrReplace,
    Delete,
    Query,
}

impl CallKind {
    fn of(operation: &TableOperation) -> Self {
        match operation {
            TableOperation::Retrieve { .. } => CallKind::Retrieve,
            TableOperation::InsertOrReplace(_) => CallKind::InsertOrReplace,
            TableOperation::Delete(_) => CallKind::Delete,
        }
    }
}

type Rows = BTreeMap<(String, String), Entity>;

/// Thread-safe in-memory table service.
#[derive(Default)]
pub struct InMemoryTableService {
    tables: RwLock<HashMap<String, Rows>>,
    faults: Mutex<VecDeque<(CallKind, StoreError)>>,
    executes: AtomicUsize,
    queries: AtomicUsize,
}

impl InMemoryTableService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `kind` fail with `error`.
    ///
    /// Faults queue up in the order they are scheduled.
    pub fn fail_next(&self, kind: CallKind, error: StoreError) {
        self.faults.lock().push_back((kind, error));
    }

    /// Number of `execute` calls served so far.
    pub fn execute_calls(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }

    /// Number of `query` calls served so far.
    pub fn query_calls(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of entities stored in `table`.
    pub fn entity_count(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, |rows| rows.len())
    }

    fn take_fault(&self, kind: CallKind) -> Option<StoreError> {
        let mut faults = self.faults.lock();
        let position = faults.iter().position(|(k, _)| *k == kind)?;
        faults.remove(position).map(|(_, err)| err)
    }

    fn missing(table: &str, partition_key: &str, row_key: &str) -> StoreError {
        StoreError::not_found(format!(
            "entity ({}, {}) does not exist in table {}",
            partition_key, row_key, table
        ))
    }
}

impl TableService for InMemoryTableService {
    fn execute(
        &self,
        table: &str,
        operation: TableOperation,
        ctx: &RequestContext,
    ) -> StoreResult<Option<Entity>> {
        self.executes.fetch_add(1, Ordering::SeqCst);
        ctx.check(operation.name())?;
        if let Some(err) = self.take_fault(CallKind::of(&operation)) {
            return Err(err);
        }

        match operation {
            TableOperation::Retrieve {
                partition_key,
                row_key,
            } => {
                let tables = self.tables.read();
                tables
                    .get(table)
                    .and_then(|rows| rows.get(&(partition_key.clone(), row_key.clone())))
                    .cloned()
                    .map(Some)
                    .ok_or_else(|| Self::missing(table, &partition_key, &row_key))
            }
            TableOperation::InsertOrReplace(entity) => {
                let mut tables = self.tables.write();
                let key = (entity.partition_key.clone(), entity.row_key.clone());
                tables
                    .entry(table.to_string())
                    .or_default()
                    .insert(key, entity.clone());
                Ok(Some(entity))
            }
            TableOperation::Delete(entity) => {
                let mut tables = self.tables.write();
                let key = (entity.partition_key.clone(), entity.row_key.clone());
                tables
                    .get_mut(table)
                    .and_then(|rows| rows.remove(&key))
                    .map(Some)
                    .ok_or_else(|| Self::missing(table, &entity.partition_key, &entity.row_key))
            }
        }
    }

    fn query(
        &self,
        table: &str,
        query: &TableQuery,
        ctx: &RequestContext,
    ) -> StoreResult<EntityIter<'_>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        ctx.check("query")?;
        if let Some(err) = self.take_fault(CallKind::Query) {
            return Err(err);
        }

        let tables = self.tables.read();
        let limit = query.take().unwrap_or(usize::MAX);
        let snapshot: Vec<Entity> = tables
            .get(table)
            .map(|rows| {
                rows.values()
                    .filter(|entity| query.matches(entity))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(Box::new(snapshot.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Filter;

    fn retrieve(pk: &str, rk: &str) -> TableOperation {
        TableOperation::Retrieve {
            partition_key: pk.to_string(),
            row_key: rk.to_string(),
        }
    }

    #[test]
    fn test_upsert_and_retrieve() {
        let service = InMemoryTableService::new();
        let ctx = RequestContext::unbounded();
        service
            .execute("t", TableOperation::InsertOrReplace(Entity::new("p", "r", "1")), &ctx)
            .unwrap();
        service
            .execute("t", TableOperation::InsertOrReplace(Entity::new("p", "r", "2")), &ctx)
            .unwrap();

        let found = service.execute("t", retrieve("p", "r"), &ctx).unwrap();
        assert_eq!(found, Some(Entity::new("p", "r", "2")));
        assert_eq!(service.entity_count("t"), 1);
    }

    #[test]
    fn test_missing_entity_is_not_found() {
        let service = InMemoryTableService::new();
        let ctx = RequestContext::unbounded();
        let err = service.execute("t", retrieve("p", "r"), &ctx).unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .execute("t", TableOperation::Delete(Entity::new("p", "r", "")), &ctx)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_query_filters_and_takes() {
        let service = InMemoryTableService::new();
        let ctx = RequestContext::unbounded();
        for (pk, rk, v) in [("a", "1", "x"), ("a", "2", "y"), ("b", "1", "x")] {
            service
                .execute("t", TableOperation::InsertOrReplace(Entity::new(pk, rk, v)), &ctx)
                .unwrap();
        }

        let by_value: Vec<Entity> = service
            .query("t", &TableQuery::filtered(Filter::value_eq("x")), &ctx)
            .unwrap()
            .collect::<StoreResult<_>>()
            .unwrap();
        assert_eq!(by_value.len(), 2);

        let first = service
            .query("t", &TableQuery::all().with_take(1), &ctx)
            .unwrap()
            .count();
        assert_eq!(first, 1);
        assert_eq!(service.query_calls(), 2);
    }

    #[test]
    fn test_scheduled_fault_fires_once() {
        let service = InMemoryTableService::new();
        let ctx = RequestContext::unbounded();
        service.fail_next(CallKind::Query, StoreError::new("ServerBusy", "slow down"));

        let err = service.query("t", &TableQuery::all(), &ctx).err().unwrap();
        assert_eq!(err.code(), "ServerBusy");
        assert!(service.query("t", &TableQuery::all(), &ctx).is_ok());
    }

    #[test]
    fn test_expired_deadline() {
        let service = InMemoryTableService::new();
        let ctx = RequestContext::with_timeout(std::time::Duration::ZERO);
        let err = service.execute("t", retrieve("p", "r"), &ctx).unwrap_err();
        assert!(err.is_timeout());
    }
}
