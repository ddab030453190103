//! # kvtable-store
//!
//! Typed two-dimensional tables (row, column, value) stored in a remote flat
//! key-value table store. Every cell is one remote entity: the row is the
//! partition key, the column is the row key and the value is a single
//! property, all three encoded with [`kvtable_commons::codec`].
//!
//! ## Architecture
//!
//! ```text
//! TransformingTable / json_table / TimedTable   (typed surface)
//!     ↓  marshallers
//! StringTable                                   (canonical String table + live views)
//!     ↓  codec + Scope
//! RemoteTable                                   (gateway, not-found normalisation)
//!     ↓  TableQuery / TableOperation
//! dyn TableService                              (remote store or InMemoryTableService)
//! ```
//!
//! ## Views
//!
//! Key sets, value collections, row and column maps are *live*: they hold no
//! cells and re-scan the store on every observation, so they always reflect
//! writes made through any other handle.

pub mod collection;
pub mod erased;
pub mod gateway;
pub mod in_memory;
pub mod json_table;
pub mod query;
pub mod scope;
pub mod service;
pub mod string_table;
pub mod table;
pub mod timed_table;
pub mod transform;
pub mod views;

pub use collection::{
    collection_eq, content_hash, map_eq, set_eq, CollectionRef, CollectionView, DetachedMap,
    EntryRef, MapEntry, MapRef, MapView, SetRef, SetView, ViewIter,
};
pub use erased::{CollectionAnyExt, MapAnyExt, TableAnyExt};
pub use gateway::{EntityScan, RemoteTable};
pub use in_memory::{CallKind, InMemoryTableService};
pub use json_table::{json_table, JsonTable};
pub use query::{Filter, TableQuery};
pub use scope::Scope;
pub use service::{RequestContext, TableOperation, TableService};
pub use string_table::{StringCell, StringTable};
pub use table::Table;
pub use timed_table::{LogTimingSink, TimedTable, TimingSink};
pub use transform::{TransformingCollection, TransformingMap, TransformingSet, TransformingTable};

// Shared types callers need alongside the store
pub use kvtable_commons::{Cell, Result, StoreError, TableError};
