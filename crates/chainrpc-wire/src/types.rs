//! Target types with a dedicated wire representation.
//!
//! Most Rust types map onto JSON the obvious way. The ones here don't:
//!
//! - [`Bytes`] and [`ByteArray`] travel as hex strings, not number arrays.
//! - [`Poly`] is a value of a registered interface, written as
//!   `[tag, payload]` so the reader knows which concrete type to build.
//! - Structs describe their fields through [`WireStruct`].

use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Layout used when writing timestamps: UTC, millisecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Layout accepted when reading timestamps. The fractional part is optional.
pub const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

// ---------------------------------------------------------------------------
// Byte containers
// ---------------------------------------------------------------------------

/// A variable-length byte string, hex encoded on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// Returns the bytes as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the wrapper and returns the inner vector.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl DerefMut for Bytes {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(&self.0))
    }
}

/// A fixed-length byte array (hashes, keys, signatures), hex encoded on
/// the wire. Decoding rejects any string whose length is not exactly `N`
/// bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteArray<const N: usize>(pub [u8; N]);

impl<const N: usize> ByteArray<N> {
    /// Returns the inner array.
    pub fn into_inner(self) -> [u8; N] {
        self.0
    }
}

impl<const N: usize> Default for ByteArray<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> Deref for ByteArray<N> {
    type Target = [u8; N];

    fn deref(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for ByteArray<N> {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes)
    }
}

impl<const N: usize> fmt::Display for ByteArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

// ---------------------------------------------------------------------------
// Polymorphic interfaces
// ---------------------------------------------------------------------------

/// A polymorphic interface type that concrete types can be registered
/// behind, usually a boxed trait object such as `Box<dyn RpcResult>`.
///
/// The registry keys interfaces by their `TypeId`, and finds the tag of a
/// value being encoded through [`as_any`](Self::as_any), which must return
/// the concrete value, not the box.
pub trait Interface: Send + Sync + 'static {
    /// Returns the concrete value behind the interface.
    fn as_any(&self) -> &dyn Any;
}

/// A value of the registered interface `I`. `None` is the empty interface
/// and is written as `null`.
#[derive(Debug)]
pub struct Poly<I>(pub Option<I>);

impl<I> Default for Poly<I> {
    fn default() -> Self {
        Self(None)
    }
}

impl<I: Interface> Poly<I> {
    /// Wraps a concrete interface value.
    pub fn new(value: I) -> Self {
        Self(Some(value))
    }

    /// Returns the empty interface value.
    pub fn empty() -> Self {
        Self(None)
    }

    /// Returns `true` for the empty interface value.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the interface value, if any.
    pub fn get(&self) -> Option<&I> {
        self.0.as_ref()
    }

    /// Consumes the wrapper and returns the interface value, if any.
    pub fn into_inner(self) -> Option<I> {
        self.0
    }

    /// Borrows the concrete value if it is a `C`.
    pub fn downcast_ref<C: 'static>(&self) -> Option<&C> {
        self.0.as_ref()?.as_any().downcast_ref::<C>()
    }
}

// ---------------------------------------------------------------------------
// Struct layout
// ---------------------------------------------------------------------------

/// Per-field encoding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldOptions {
    /// Key of the field in the JSON object.
    pub json_name: &'static str,
    /// The struct has exactly this one field and is written as the field's
    /// value, without a wrapping object.
    pub unwrap: bool,
    /// Floats are allowed in this field (and anything nested below it).
    pub unsafe_float: bool,
}

impl FieldOptions {
    /// Options for a plain field keyed by `json_name`.
    pub const fn named(json_name: &'static str) -> Self {
        Self {
            json_name,
            unwrap: false,
            unsafe_float: false,
        }
    }

    /// Options for the single field of an unwrap struct.
    pub const fn unwrapped(json_name: &'static str) -> Self {
        Self {
            json_name,
            unwrap: true,
            unsafe_float: false,
        }
    }

    /// Returns these options with float support enabled.
    pub const fn with_unsafe_float(mut self) -> Self {
        self.unsafe_float = true;
        self
    }
}

/// Describes one field of a [`WireStruct`]. The field's index is its
/// position in [`WireStruct::FIELDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field name.
    pub name: &'static str,
    /// Rust field type, as written in the declaration.
    pub type_name: &'static str,
    /// Encoding options.
    pub options: FieldOptions,
}

/// Field layout of a struct declared through [`wire_struct!`](crate::wire_struct).
pub trait WireStruct {
    /// Fields in declaration order.
    const FIELDS: &'static [FieldDescriptor];

    /// Returns `true` if the struct is written as its single field.
    fn is_unwrap() -> bool {
        Self::FIELDS.len() == 1 && Self::FIELDS[0].options.unwrap
    }

    /// Looks up a field by its JSON key.
    fn field(json_name: &str) -> Option<(usize, &'static FieldDescriptor)> {
        Self::FIELDS
            .iter()
            .enumerate()
            .find(|(_, field)| field.options.json_name == json_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Ping;

    impl Interface for Box<Ping> {
        fn as_any(&self) -> &dyn Any {
            &**self
        }
    }

    #[test]
    fn test_byte_array_default_is_zeroed() {
        let arr = ByteArray::<64>::default();
        assert!(arr.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_bytes_display_is_upper_hex() {
        let bytes = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(bytes.to_string(), "DEADBEEF");
    }

    #[test]
    fn test_poly_downcast_reaches_concrete_value() {
        let poly = Poly::new(Box::new(Ping));
        assert!(poly.downcast_ref::<Ping>().is_some());
        assert!(poly.downcast_ref::<String>().is_none());
        assert!(Poly::<Box<Ping>>::empty().downcast_ref::<Ping>().is_none());
    }

    #[test]
    fn test_field_options_builders() {
        let opts = FieldOptions::named("ratio").with_unsafe_float();
        assert_eq!(opts.json_name, "ratio");
        assert!(opts.unsafe_float);
        assert!(!opts.unwrap);
        assert!(FieldOptions::unwrapped("value").unwrap);
    }
}
