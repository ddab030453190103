//! Remote table service capability.
//!
//! [`TableService`] is the boundary to the network client that talks to the
//! remote store. Transport, authentication and retry policy live behind it;
//! this crate only issues single-entity operations and filtered scans.
//!
//! ## Contract for implementations
//!
//! - `Retrieve` and `Delete` of a missing entity fail with a not-found
//!   [`StoreError`] (see [`StoreError::is_not_found`]).
//! - `InsertOrReplace` is an unconditional upsert and returns the stored entity.
//! - `Delete` returns the entity that was removed.
//! - Requests whose [`RequestContext`] deadline has passed fail with
//!   [`StoreError::timed_out`].
//! - Scans are restartable: each `query` call is a new scan.
//! - Implementations must be safe to share between threads.
//!
//! ## Implementing a Custom Service
//!
//! ```rust,ignore
//! use kvtable_store::service::{EntityIter, RequestContext, StoreResult, TableOperation, TableService};
//! use kvtable_store::query::TableQuery;
//!
//! struct HttpTableService { /* client handle */ }
//!
//! impl TableService for HttpTableService {
//!     fn execute(&self, table: &str, op: TableOperation, ctx: &RequestContext)
//!         -> StoreResult<Option<Entity>> {
//!         // Send the operation, map HTTP/transport errors to StoreError
//!         todo!()
//!     }
//!
//!     fn query(&self, table: &str, query: &TableQuery, ctx: &RequestContext)
//!         -> StoreResult<EntityIter<'_>> {
//!         // `query.filter()` renders to the service's `$filter` string
//!         todo!()
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use kvtable_commons::{Entity, StoreError};

use crate::query::TableQuery;

/// Result type of raw service calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Lazily fetched scan results. Pages may fail after the scan started.
pub type EntityIter<'a> = Box<dyn Iterator<Item = StoreResult<Entity>> + 'a>;

/// Per-request options carried to the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A request without a deadline.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A request that must finish within `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Fails with a timeout error when the deadline has passed.
    pub fn check(&self, operation: &str) -> StoreResult<()> {
        if self.is_expired() {
            return Err(StoreError::timed_out(format!(
                "deadline expired before {} completed",
                operation
            )));
        }
        Ok(())
    }
}

/// A single-entity operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOperation {
    Retrieve {
        partition_key: String,
        row_key: String,
    },
    InsertOrReplace(Entity),
    Delete(Entity),
}

impl TableOperation {
    pub fn name(&self) -> &'static str {
        match self {
            TableOperation::Retrieve { .. } => "retrieve",
            TableOperation::InsertOrReplace(_) => "insert_or_replace",
            TableOperation::Delete(_) => "delete",
        }
    }
}

/// Client capability for the remote table service.
pub trait TableService: Send + Sync {
    /// Executes one single-entity operation against `table`.
    fn execute(
        &self,
        table: &str,
        operation: TableOperation,
        ctx: &RequestContext,
    ) -> StoreResult<Option<Entity>>;

    /// Starts a scan of `table` restricted by `query`.
    fn query(
        &self,
        table: &str,
        query: &TableQuery,
        ctx: &RequestContext,
    ) -> StoreResult<EntityIter<'_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_context_never_expires() {
        let ctx = RequestContext::unbounded();
        assert!(ctx.deadline().is_none());
        assert!(ctx.check("get").is_ok());
    }

    #[test]
    fn test_expired_context() {
        let ctx = RequestContext::with_timeout(Duration::ZERO);
        assert!(ctx.is_expired());
        let err = ctx.check("scan").unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_operation_names() {
        let op = TableOperation::Delete(Entity::new("a", "b", "c"));
        assert_eq!(op.name(), "delete");
    }
}
