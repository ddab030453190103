//! Query construction for entity scans.
//!
//! A [`Filter`] is a conjunction of equality tests on an entity's properties.
//! It is what decides which views can be answered by the store alone: any
//! scope that is a conjunction of "row is X", "column is Y" and "value is Z"
//! becomes a single filtered scan instead of a client-side pass over the
//! whole table.
//!
//! Filters render to the store's OData syntax for transports that forward a
//! query string, and evaluate structurally through [`Filter::matches`] for
//! in-process backends.
//!
//! ```rust
//! use kvtable_store::query::Filter;
//!
//! let filter = Filter::partition_key_eq("cjE").and(Filter::value_eq("it's"));
//! assert_eq!(
//!     filter.to_string(),
//!     "(PartitionKey eq 'cjE') and (Value eq 'it''s')"
//! );
//! ```

use std::fmt;

use kvtable_commons::{Entity, VALUE_PROPERTY};

/// Entity property a filter can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    PartitionKey,
    RowKey,
    Value,
}

impl Property {
    pub fn name(&self) -> &'static str {
        match self {
            Property::PartitionKey => "PartitionKey",
            Property::RowKey => "RowKey",
            Property::Value => VALUE_PROPERTY,
        }
    }

    fn read<'e>(&self, entity: &'e Entity) -> &'e str {
        match self {
            Property::PartitionKey => &entity.partition_key,
            Property::RowKey => &entity.row_key,
            Property::Value => &entity.value,
        }
    }
}

/// Equality filter over encoded entity properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(Property, String),
    And(Box<Filter>, Box<Filter>),
}

impl Filter {
    pub fn partition_key_eq(value: impl Into<String>) -> Self {
        Filter::Eq(Property::PartitionKey, value.into())
    }

    pub fn row_key_eq(value: impl Into<String>) -> Self {
        Filter::Eq(Property::RowKey, value.into())
    }

    pub fn value_eq(value: impl Into<String>) -> Self {
        Filter::Eq(Property::Value, value.into())
    }

    /// Conjunction of `self` and `other`.
    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    /// Joins optional filters with `and`; `None` when there is nothing to join.
    pub fn all_of(filters: impl IntoIterator<Item = Filter>) -> Option<Filter> {
        filters.into_iter().reduce(Filter::and)
    }

    /// Evaluates the filter against an entity.
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Filter::Eq(property, expected) => property.read(entity) == expected,
            Filter::And(left, right) => left.matches(entity) && right.matches(entity),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Eq(property, value) => {
                write!(f, "{} eq '{}'", property.name(), value.replace('\'', "''"))
            }
            Filter::And(left, right) => write!(f, "({}) and ({})", left, right),
        }
    }
}

/// A scan request: an optional filter and an optional result cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQuery {
    filter: Option<Filter>,
    take: Option<usize>,
}

impl TableQuery {
    /// Selects every entity of the table.
    pub fn all() -> Self {
        Self::default()
    }

    /// Selects the entities matching `filter`.
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            take: None,
        }
    }

    pub fn from_filter(filter: Option<Filter>) -> Self {
        Self { filter, take: None }
    }

    /// Caps the number of returned entities.
    pub fn with_take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn take(&self) -> Option<usize> {
        self.take
    }

    /// Returns true if `entity` belongs to the result set (ignoring `take`).
    pub fn matches(&self, entity: &Entity) -> bool {
        self.filter.as_ref().map_or(true, |f| f.matches(entity))
    }
}
