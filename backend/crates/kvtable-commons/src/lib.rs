//! # kvtable-commons
//!
//! Shared types for the kvtable crates.
//!
//! - [`Cell`]: the `(row, column, value)` triple a table is made of
//! - [`Entity`]: the encoded record the remote store holds
//! - [`codec`]: string encoding that survives the store's key restrictions
//! - [`marshaller`]: paired conversions between domain types and strings
//! - [`errors`]: the error taxonomy shared by every layer
//!
//! ## Example Usage
//!
//! ```rust
//! use kvtable_commons::codec;
//! use kvtable_commons::marshaller::{Marshaller, ParseMarshaller};
//!
//! let encoded = codec::encode("row/with#forbidden?chars");
//! assert_eq!(codec::decode(&encoded).unwrap(), "row/with#forbidden?chars");
//!
//! let longs = ParseMarshaller::<i64>::new();
//! assert_eq!(longs.unmarshal(&longs.marshal(&23).unwrap()).unwrap(), 23);
//! ```

pub mod cell;
pub mod codec;
pub mod entity;
pub mod errors;
pub mod marshaller;

pub use cell::Cell;
pub use entity::{Entity, VALUE_PROPERTY};
pub use errors::{Result, StoreError, TableError};
pub use marshaller::{
    try_cast, FnMarshaller, IdentityMarshaller, Inverse, JsonMarshaller, Marshaller,
    ParseMarshaller,
};
