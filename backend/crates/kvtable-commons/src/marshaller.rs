//! Marshallers: paired conversions between a domain type and its canonical form.
//!
//! A [`Marshaller<F, T>`] converts a domain value `F` to its canonical
//! representation `T` (a `String` unless stated otherwise) and back. Every
//! implementation must satisfy the round-trip law
//!
//! ```text
//! unmarshal(marshal(x)) == x
//! ```
//!
//! for every valid `x`, must be deterministic, and must never fail on a value
//! produced by its own paired function.
//!
//! ## Stock marshallers
//!
//! | Type | Domain |
//! |---|---|
//! | [`IdentityMarshaller`] | `String` as itself |
//! | [`ParseMarshaller<T>`] | any `T: Display + FromStr` (numbers, bools, ...) |
//! | [`JsonMarshaller<T>`] | any `T: Serialize + DeserializeOwned`, via `serde_json` |
//! | [`FnMarshaller`] | a pair of closures |
//! | [`Inverse<M>`] | `M` with the two directions swapped |
//!
//! ## Type-erased arguments
//!
//! [`try_cast`] narrows a `&dyn Any` to the marshaller's domain type. Callers
//! that accept foreign-typed arguments use it before marshalling and treat a
//! `None` as "absent" rather than as an error.

use std::any::Any;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{Result, TableError};

/// Narrows a type-erased argument to `F`.
///
/// Returns `None` when the argument holds some other type.
pub fn try_cast<F: 'static>(value: &dyn Any) -> Option<&F> {
    value.downcast_ref::<F>()
}

/// Converts between a domain type `F` and its canonical representation `T`.
pub trait Marshaller<F, T = String>: Send + Sync {
    /// Converts a domain value to its canonical representation.
    fn marshal(&self, value: &F) -> Result<T>;

    /// Converts a canonical representation back to the domain value.
    fn unmarshal(&self, repr: &T) -> Result<F>;

    /// Runtime tag of the domain type, used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<F>()
    }
}

/// Passes strings through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMarshaller;

impl Marshaller<String> for IdentityMarshaller {
    fn marshal(&self, value: &String) -> Result<String> {
        Ok(value.clone())
    }

    fn unmarshal(&self, repr: &String) -> Result<String> {
        Ok(repr.clone())
    }
}

/// Marshals through `Display` and parses back through `FromStr`.
///
/// Suitable for integers, floats, booleans and chars: their `Display` output
/// parses back to the same value.
pub struct ParseMarshaller<T>(PhantomData<fn() -> T>);

impl<T> ParseMarshaller<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ParseMarshaller<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ParseMarshaller<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Marshaller<T> for ParseMarshaller<T>
where
    T: Display + FromStr,
    T::Err: Display,
{
    fn marshal(&self, value: &T) -> Result<String> {
        Ok(value.to_string())
    }

    fn unmarshal(&self, repr: &String) -> Result<T> {
        repr.parse::<T>().map_err(|e| {
            TableError::serialization(format!(
                "cannot parse '{}' as {}: {}",
                repr,
                std::any::type_name::<T>(),
                e
            ))
        })
    }
}

/// Marshals any serde type to its JSON text.
///
/// A value that serializes to JSON `null` has no representation in the store
/// and is rejected with [`TableError::InvalidArgument`].
pub struct JsonMarshaller<T>(PhantomData<fn() -> T>);

impl<T> JsonMarshaller<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonMarshaller<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonMarshaller<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Marshaller<T> for JsonMarshaller<T>
where
    T: Serialize + DeserializeOwned,
{
    fn marshal(&self, value: &T) -> Result<String> {
        let json = serde_json::to_value(value)
            .map_err(|e| TableError::serialization(e.to_string()))?;
        if json.is_null() {
            return Err(TableError::invalid_argument(format!(
                "{} value serializes to null",
                std::any::type_name::<T>()
            )));
        }
        serde_json::to_string(&json).map_err(|e| TableError::serialization(e.to_string()))
    }

    fn unmarshal(&self, repr: &String) -> Result<T> {
        serde_json::from_str(repr).map_err(|e| TableError::serialization(e.to_string()))
    }
}

/// A marshaller built from two closures.
pub struct FnMarshaller<F, T, M, U>
where
    M: Fn(&F) -> Result<T> + Send + Sync,
    U: Fn(&T) -> Result<F> + Send + Sync,
{
    marshal: M,
    unmarshal: U,
    _phantom: PhantomData<fn(F) -> T>,
}

impl<F, T, M, U> FnMarshaller<F, T, M, U>
where
    M: Fn(&F) -> Result<T> + Send + Sync,
    U: Fn(&T) -> Result<F> + Send + Sync,
{
    pub fn new(marshal: M, unmarshal: U) -> Self {
        Self {
            marshal,
            unmarshal,
            _phantom: PhantomData,
        }
    }
}

impl<F, T, M, U> Marshaller<F, T> for FnMarshaller<F, T, M, U>
where
    M: Fn(&F) -> Result<T> + Send + Sync,
    U: Fn(&T) -> Result<F> + Send + Sync,
{
    fn marshal(&self, value: &F) -> Result<T> {
        (self.marshal)(value)
    }

    fn unmarshal(&self, repr: &T) -> Result<F> {
        (self.unmarshal)(repr)
    }
}

/// Swaps the direction of a marshaller.
///
/// Lifts a typed collection into a canonical one: `Inverse(m)` marshals the
/// canonical form `T` to `F` and unmarshals `F` back to `T`.
pub struct Inverse<M>(pub M);

impl<F, T, M> Marshaller<T, F> for Inverse<M>
where
    M: Marshaller<F, T>,
{
    fn marshal(&self, value: &T) -> Result<F> {
        self.0.unmarshal(value)
    }

    fn unmarshal(&self, repr: &F) -> Result<T> {
        self.0.marshal(repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_parse_marshaller_round_trip() {
        let floats = ParseMarshaller::<f32>::new();
        for x in [0.5_f32, -1.25, 3.0e10, f32::MIN_POSITIVE] {
            assert_eq!(floats.unmarshal(&floats.marshal(&x).unwrap()).unwrap(), x);
        }

        let longs = ParseMarshaller::<i64>::new();
        assert_eq!(longs.marshal(&23).unwrap(), "23");
        assert_eq!(longs.unmarshal(&"-42".to_string()).unwrap(), -42);
    }

    #[test]
    fn test_parse_marshaller_rejects_garbage() {
        let ints = ParseMarshaller::<i32>::new();
        let err = ints.unmarshal(&"twelve".to_string()).unwrap_err();
        assert!(matches!(err, TableError::Serialization(_)));
    }

    #[test]
    fn test_json_marshaller_round_trip() {
        let points = JsonMarshaller::<Point>::new();
        let p = Point { x: 1, y: -2 };
        let json = points.marshal(&p).unwrap();
        assert_eq!(json, r#"{"x":1,"y":-2}"#);
        assert_eq!(points.unmarshal(&json).unwrap(), p);
    }

    #[test]
    fn test_json_marshaller_rejects_null() {
        let options = JsonMarshaller::<Option<u8>>::new();
        assert!(matches!(
            options.marshal(&None),
            Err(TableError::InvalidArgument(_))
        ));
        assert_eq!(options.marshal(&Some(3)).unwrap(), "3");
    }

    #[test]
    fn test_fn_marshaller_and_inverse() {
        let upper = FnMarshaller::new(
            |s: &String| Ok(s.to_uppercase()),
            |s: &String| Ok(s.to_lowercase()),
        );
        assert_eq!(upper.marshal(&"abc".to_string()).unwrap(), "ABC");

        let lengths = Inverse(ParseMarshaller::<u32>::new());
        assert_eq!(lengths.marshal(&"17".to_string()).unwrap(), 17);
        assert_eq!(lengths.unmarshal(&17).unwrap(), "17");
    }

    #[test]
    fn test_try_cast() {
        let float: &dyn Any = &0.5_f32;
        assert_eq!(try_cast::<f32>(float), Some(&0.5));
        assert_eq!(try_cast::<i64>(float), None);
        assert_eq!(ParseMarshaller::<i64>::new().type_name(), "i64");
    }
}
