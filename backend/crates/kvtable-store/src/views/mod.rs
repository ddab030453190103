//! Live views over the canonical string table.
//!
//! A view is a [`Scope`] plus a way to turn each scanned cell into an element.
//! It holds a handle to the owning [`StringTable`] and nothing else: every
//! `iter`, `size` or `contains` re-runs the scoped scan. Views are created per
//! call and never cached.
//!
//! ## View kinds
//!
//! | View | Elements | Mutable |
//! |---|---|---|
//! | [`ScopedCollection`] | one extracted field per cell | no |
//! | [`ScopedSet`] | same, when the field is unique within the scope | no |
//! | [`UniqueSet`] | de-duplicated elements of any collection, streaming | no |
//! | [`CellSetView`] | whole cells | add / remove / clear |
//! | [`ProjectionView`] | one row or column as a map | put / remove / clear |
//! | [`AxisMapView`] | row map or column map | put / remove / clear (see below) |
//! | [`KeySetView`], [`ValuesView`] | keys or values of any map | through the map |
//!
//! [`AxisMapView`] keeps the documented deviation of the outer row and
//! column maps: `put` and `remove` return the current live view of the
//! affected row or column, never its previous contents.
//!
//! ## Membership checks
//!
//! Where an extracted field maps onto a filterable entity property (row,
//! column or value), `contains` narrows the scope by that field and asks the
//! store for a single match instead of scanning the whole scope.
//!
//! [`Scope`]: crate::scope::Scope
//! [`StringTable`]: crate::string_table::StringTable

mod axis_map;
mod cell_set;
mod map_views;
mod projection;
mod scoped;

pub use axis_map::{AxisEntry, AxisMapView};
pub use cell_set::CellSetView;
pub use map_views::{KeySetView, ValuesView};
pub use projection::{CellEntry, ProjectionView};
pub use scoped::{Extractor, Narrower, ScopedCollection, ScopedSet, UniqueSet};

use crate::scope::Scope;
use crate::string_table::StringCell;

/// Which key a projection holds fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    /// Scope of every cell whose key on this axis is `key`.
    pub fn scope(self, key: &str) -> Scope {
        match self {
            Axis::Row => Scope::row(key),
            Axis::Column => Scope::column(key),
        }
    }

    /// Splits a cell into `(key on this axis, key on the other axis, value)`.
    pub(crate) fn split(self, cell: StringCell) -> (String, String, String) {
        let (row, column, value) = cell.into_parts();
        match self {
            Axis::Row => (row, column, value),
            Axis::Column => (column, row, value),
        }
    }

    /// Orders a fixed key and a cross key as `(row, column)`.
    pub(crate) fn address(self, fixed: &str, cross: &str) -> (String, String) {
        match self {
            Axis::Row => (fixed.to_string(), cross.to_string()),
            Axis::Column => (cross.to_string(), fixed.to_string()),
        }
    }
}
