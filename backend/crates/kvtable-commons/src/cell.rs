//! The atomic addressable unit of a table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An immutable `(row, column, value)` triple.
///
/// A table holds at most one cell per `(row, column)` pair. Two cells are
/// equal when all three components are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell<R, C, V> {
    row: R,
    column: C,
    value: V,
}

impl<R, C, V> Cell<R, C, V> {
    pub fn new(row: R, column: C, value: V) -> Self {
        Self { row, column, value }
    }

    pub fn row(&self) -> &R {
        &self.row
    }

    pub fn column(&self) -> &C {
        &self.column
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the cell, returning `(row, column, value)`.
    pub fn into_parts(self) -> (R, C, V) {
        (self.row, self.column, self.value)
    }
}

impl<R, C, V> From<(R, C, V)> for Cell<R, C, V> {
    fn from((row, column, value): (R, C, V)) -> Self {
        Self::new(row, column, value)
    }
}

impl<R: fmt::Display, C: fmt::Display, V: fmt::Display> fmt::Display for Cell<R, C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})={}", self.row, self.column, self.value)
    }
}
