//! The read path: a parsed `serde_json::Value` into a typed target.
//!
//! Every supported target implements [`WireDecode`]. Decoding writes into a
//! caller-supplied value rather than returning a fresh one, so struct fields
//! whose keys are absent from the JSON keep whatever the caller put there.
//!
//! # Rules
//!
//! | Target              | JSON                 | Notes                               |
//! |---------------------|----------------------|-------------------------------------|
//! | `Poly<I>`           | `[tag, payload]`     | `null` is the empty interface       |
//! | `Option<T>`         | `null` or `T`        | a fresh `T` is built for `Some`     |
//! | `[u8; N]`, `ByteArray<N>` | hex string     | exactly `N` bytes                   |
//! | `[T; N]`            | array                | exactly `N` elements                |
//! | `Vec<u8>`, `Bytes`  | hex string           | any length                          |
//! | `Vec<T>`            | array                | replaced, never appended to         |
//! | `DateTime<Utc>`     | ISO-8601 string      | `YYYY-MM-DDTHH:MM:SS[.fff]Z`        |
//! | integers            | number               | fractions truncate, width checked   |
//! | `f32` / `f64`       | number               | field must be marked `unsafe`       |
//! | `String` / `bool`   | string / bool        |                                     |
//! | `Value`             | anything             | copied as-is                        |
//!
//! Structs get their impl from [`wire_struct!`](crate::wire_struct).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::context::WireContext;
use crate::error::DecodeError;
use crate::registry::Registry;
use crate::types::{ByteArray, Bytes, Interface, Poly, TIMESTAMP_PARSE_FORMAT};

/// A target the decoder can populate from a JSON value.
pub trait WireDecode {
    /// Overwrites `self` (or, for structs, the fields present in `raw`)
    /// with the decoded value.
    ///
    /// On error `self` may be partially written.
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError>;

    /// Decodes a `Vec<Self>`: a JSON array, element by element. `u8`
    /// overrides this to read a hex string.
    #[doc(hidden)]
    fn decode_vec(target: &mut Vec<Self>, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError>
    where
        Self: Sized + Default,
    {
        let items = raw.as_array().ok_or_else(|| mismatch("array", raw))?;
        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut element = Self::default();
            element
                .decode_into(item, cx)
                .map_err(|e| e.at_index(index))?;
            decoded.push(element);
        }
        *target = decoded;
        Ok(())
    }

    /// Decodes a `[Self; N]`: a JSON array of exactly `N` elements. `u8`
    /// overrides this to read a hex string of exactly `N` bytes.
    #[doc(hidden)]
    fn decode_array<const N: usize>(
        target: &mut [Self; N],
        raw: &Value,
        cx: &WireContext<'_>,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        let items = raw.as_array().ok_or_else(|| mismatch("array", raw))?;
        if items.len() != N {
            return Err(DecodeError::LengthMismatch {
                expected: N,
                found: items.len(),
            });
        }
        for (index, (slot, item)) in target.iter_mut().zip(items).enumerate() {
            slot.decode_into(item, cx).map_err(|e| e.at_index(index))?;
        }
        Ok(())
    }
}

/// Decodes `raw` into a fresh `T`.
pub fn decode<T: WireDecode + Default>(raw: &Value, registry: &Registry) -> Result<T, DecodeError> {
    let mut target = T::default();
    decode_into(&mut target, raw, registry)?;
    Ok(target)
}

/// Decodes `raw` into an existing `target`, keeping fields absent from
/// `raw` untouched.
pub fn decode_into<T: WireDecode + ?Sized>(
    target: &mut T,
    raw: &Value,
    registry: &Registry,
) -> Result<(), DecodeError> {
    target.decode_into(raw, &WireContext::new(registry))
}

/// Name of a JSON value's kind, as reported in [`DecodeError::TypeMismatch`].
pub fn kind_of(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &'static str, raw: &Value) -> DecodeError {
    DecodeError::TypeMismatch {
        expected,
        found: kind_of(raw),
    }
}

/// Borrows `raw` as an object. Used by generated struct impls.
pub fn expect_object(raw: &Value) -> Result<&Map<String, Value>, DecodeError> {
    raw.as_object().ok_or_else(|| mismatch("object", raw))
}

fn expect_str<'v>(raw: &'v Value) -> Result<&'v str, DecodeError> {
    raw.as_str().ok_or_else(|| mismatch("string", raw))
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

impl WireDecode for String {
    fn decode_into(&mut self, raw: &Value, _cx: &WireContext<'_>) -> Result<(), DecodeError> {
        let s = expect_str(raw)?;
        self.clear();
        self.push_str(s);
        Ok(())
    }
}

impl WireDecode for bool {
    fn decode_into(&mut self, raw: &Value, _cx: &WireContext<'_>) -> Result<(), DecodeError> {
        *self = raw.as_bool().ok_or_else(|| mismatch("bool", raw))?;
        Ok(())
    }
}

/// Reads a JSON number as an integer, truncating any fraction.
fn read_integer(raw: &Value, unsigned: bool) -> Result<i128, DecodeError> {
    let Value::Number(n) = raw else {
        return Err(mismatch("number", raw));
    };
    if let Some(i) = n.as_i64() {
        if unsigned && i < 0 {
            return Err(DecodeError::NegativeForUnsigned {
                value: n.to_string(),
            });
        }
        return Ok(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(i128::from(u));
    }
    let f = n.as_f64().unwrap_or_default();
    if unsigned && f < 0.0 {
        return Err(DecodeError::NegativeForUnsigned {
            value: n.to_string(),
        });
    }
    // Saturates outside i128, which every target width then rejects.
    Ok(f.trunc() as i128)
}

/// [`read_integer`] narrowed to `T`.
fn read_width<T: TryFrom<i128>>(
    raw: &Value,
    unsigned: bool,
    target: &'static str,
) -> Result<T, DecodeError> {
    let n = read_integer(raw, unsigned)?;
    T::try_from(n).map_err(|_| DecodeError::OutOfRange {
        target,
        value: n.to_string(),
    })
}

macro_rules! decode_integer {
    ($unsigned:expr => $($ty:ty),*) => {
        $(
            impl WireDecode for $ty {
                fn decode_into(
                    &mut self,
                    raw: &Value,
                    _cx: &WireContext<'_>,
                ) -> Result<(), DecodeError> {
                    *self = read_width(raw, $unsigned, stringify!($ty))?;
                    Ok(())
                }
            }
        )*
    };
}

decode_integer!(false => i8, i16, i32, i64, isize);
decode_integer!(true => u16, u32, u64, usize);

/// A lone `u8` is a number; `Vec<u8>` and `[u8; N]` are hex strings.
impl WireDecode for u8 {
    fn decode_into(&mut self, raw: &Value, _cx: &WireContext<'_>) -> Result<(), DecodeError> {
        *self = read_width(raw, true, "u8")?;
        Ok(())
    }

    fn decode_vec(target: &mut Vec<u8>, raw: &Value, _cx: &WireContext<'_>) -> Result<(), DecodeError> {
        let s = strip_hex_prefix(expect_str(raw)?);
        *target = hex::decode(s)?;
        Ok(())
    }

    fn decode_array<const N: usize>(
        target: &mut [u8; N],
        raw: &Value,
        _cx: &WireContext<'_>,
    ) -> Result<(), DecodeError> {
        let s = strip_hex_prefix(expect_str(raw)?);
        if s.len() != N * 2 {
            return Err(DecodeError::LengthMismatch {
                expected: N,
                found: s.len() / 2,
            });
        }
        hex::decode_to_slice(s, target)?;
        Ok(())
    }
}

impl WireDecode for f64 {
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError> {
        if !cx.options().unsafe_float {
            return Err(DecodeError::UnsafeFloatDisabled);
        }
        *self = raw.as_f64().ok_or_else(|| mismatch("number", raw))?;
        Ok(())
    }
}

impl WireDecode for f32 {
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError> {
        let mut wide = 0f64;
        wide.decode_into(raw, cx)?;
        *self = wide as f32;
        Ok(())
    }
}

impl WireDecode for DateTime<Utc> {
    fn decode_into(&mut self, raw: &Value, _cx: &WireContext<'_>) -> Result<(), DecodeError> {
        let s = expect_str(raw)?;
        *self = NaiveDateTime::parse_from_str(s, TIMESTAMP_PARSE_FORMAT)?.and_utc();
        Ok(())
    }
}

impl WireDecode for Value {
    fn decode_into(&mut self, raw: &Value, _cx: &WireContext<'_>) -> Result<(), DecodeError> {
        self.clone_from(raw);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bytes
// ---------------------------------------------------------------------------

impl WireDecode for Bytes {
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError> {
        u8::decode_vec(&mut self.0, raw, cx)
    }
}

impl<const N: usize> WireDecode for ByteArray<N> {
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError> {
        u8::decode_array(&mut self.0, raw, cx)
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

impl<T: WireDecode + Default> WireDecode for Option<T> {
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError> {
        if raw.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.decode_into(raw, cx)?;
        *self = Some(inner);
        Ok(())
    }
}

impl<T: WireDecode + Default> WireDecode for Vec<T> {
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError> {
        T::decode_vec(self, raw, cx)
    }
}

impl<T: WireDecode, const N: usize> WireDecode for [T; N] {
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError> {
        T::decode_array(self, raw, cx)
    }
}

impl<T: WireDecode + ?Sized> WireDecode for Box<T> {
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError> {
        (**self).decode_into(raw, cx)
    }
}

// ---------------------------------------------------------------------------
// Interfaces
// ---------------------------------------------------------------------------

impl<I: Interface> WireDecode for Poly<I> {
    fn decode_into(&mut self, raw: &Value, cx: &WireContext<'_>) -> Result<(), DecodeError> {
        let registry = cx.registry();
        if !registry.is_registered::<I>() {
            return Err(DecodeError::UnregisteredInterface {
                interface: std::any::type_name::<I>(),
            });
        }
        if raw.is_null() {
            self.0 = None;
            return Ok(());
        }

        let pair = raw.as_array().ok_or_else(|| mismatch("array", raw))?;
        let [tag, payload] = pair.as_slice() else {
            return Err(DecodeError::LengthMismatch {
                expected: 2,
                found: pair.len(),
            });
        };
        let tag = read_width::<u8>(tag, false, "tag byte")?;

        let value = registry.decode_variant::<I>(tag, payload, cx)?;
        self.0 = Some(value);
        Ok(())
    }
}
