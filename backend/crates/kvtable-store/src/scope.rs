//! Scopes: what a live view's scan includes.
//!
//! A [`Scope`] holds *logical* (decoded) keys and value; [`Scope::to_filter`]
//! encodes them into the store's filter. An empty scope covers the whole
//! table, each fixed component narrows it by one equality test.

use kvtable_commons::codec;

use crate::query::{Filter, TableQuery};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    row: Option<String>,
    column: Option<String>,
    value: Option<String>,
}

impl Scope {
    /// The whole table.
    pub fn all() -> Self {
        Self::default()
    }

    /// Every cell of one row.
    pub fn row(row: impl Into<String>) -> Self {
        Self::all().with_row(row)
    }

    /// Every cell of one column.
    pub fn column(column: impl Into<String>) -> Self {
        Self::all().with_column(column)
    }

    /// The single cell at `(row, column)`.
    pub fn cell(row: impl Into<String>, column: impl Into<String>) -> Self {
        Self::row(row).with_column(column)
    }

    pub fn with_row(mut self, row: impl Into<String>) -> Self {
        self.row = Some(row.into());
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn fixed_row(&self) -> Option<&str> {
        self.row.as_deref()
    }

    pub fn fixed_column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn fixed_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Encoded store filter; `None` for the whole table.
    pub fn to_filter(&self) -> Option<Filter> {
        let row = self.row.as_deref().map(|r| Filter::partition_key_eq(codec::encode(r)));
        let column = self.column.as_deref().map(|c| Filter::row_key_eq(codec::encode(c)));
        let value = self.value.as_deref().map(|v| Filter::value_eq(codec::encode(v)));
        Filter::all_of([row, column, value].into_iter().flatten())
    }

    pub fn to_query(&self) -> TableQuery {
        TableQuery::from_filter(self.to_filter())
    }
}
