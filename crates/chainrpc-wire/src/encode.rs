//! The write path, mirroring [`decode`](crate::decode): typed values into
//! `serde_json::Value` in the same wire format.
//!
//! Bytes (`Vec<u8>`, `[u8; N]` and their newtypes) are written as
//! upper-case hex without a prefix, timestamps in UTC
//! with millisecond precision, interfaces as `[tag, payload]`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::context::WireContext;
use crate::error::EncodeError;
use crate::registry::Registry;
use crate::types::{ByteArray, Bytes, Interface, Poly, TIMESTAMP_FORMAT};

/// A value the encoder can write.
pub trait WireEncode {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError>;

    /// Encodes a slice of `Self` as a JSON array. `u8` overrides this to
    /// write a hex string.
    #[doc(hidden)]
    fn encode_slice(items: &[Self], cx: &WireContext<'_>) -> Result<Value, EncodeError>
    where
        Self: Sized,
    {
        items
            .iter()
            .map(|item| item.encode(cx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Encodes `value` at the top level.
pub fn encode<T: WireEncode + ?Sized>(value: &T, registry: &Registry) -> Result<Value, EncodeError> {
    value.encode(&WireContext::new(registry))
}

impl WireEncode for String {
    fn encode(&self, _cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        Ok(Value::String(self.clone()))
    }
}

impl WireEncode for str {
    fn encode(&self, _cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        Ok(Value::String(self.to_owned()))
    }
}

impl WireEncode for bool {
    fn encode(&self, _cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        Ok(Value::Bool(*self))
    }
}

macro_rules! encode_integer {
    ($($ty:ty),*) => {
        $(
            impl WireEncode for $ty {
                fn encode(&self, _cx: &WireContext<'_>) -> Result<Value, EncodeError> {
                    Ok(Value::from(*self))
                }
            }
        )*
    };
}

encode_integer!(i8, i16, i32, i64, isize, u16, u32, u64, usize);

impl WireEncode for u8 {
    fn encode(&self, _cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        Ok(Value::from(*self))
    }

    fn encode_slice(items: &[u8], _cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        Ok(Value::String(hex::encode_upper(items)))
    }
}

impl WireEncode for f64 {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        if !cx.options().unsafe_float {
            return Err(EncodeError::UnsafeFloatDisabled);
        }
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .ok_or(EncodeError::NonFiniteFloat(*self))
    }
}

impl WireEncode for f32 {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        f64::from(*self).encode(cx)
    }
}

impl WireEncode for DateTime<Utc> {
    fn encode(&self, _cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        Ok(Value::String(self.format(TIMESTAMP_FORMAT).to_string()))
    }
}

impl WireEncode for Value {
    fn encode(&self, _cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        Ok(self.clone())
    }
}

impl WireEncode for Bytes {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        u8::encode_slice(&self.0, cx)
    }
}

impl<const N: usize> WireEncode for ByteArray<N> {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        u8::encode_slice(&self.0, cx)
    }
}

impl<T: WireEncode> WireEncode for Option<T> {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        match self {
            Some(inner) => inner.encode(cx),
            None => Ok(Value::Null),
        }
    }
}

impl<T: WireEncode> WireEncode for [T] {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        T::encode_slice(self, cx)
    }
}

impl<T: WireEncode> WireEncode for Vec<T> {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        self.as_slice().encode(cx)
    }
}

impl<T: WireEncode, const N: usize> WireEncode for [T; N] {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        self.as_slice().encode(cx)
    }
}

impl<T: WireEncode + ?Sized> WireEncode for Box<T> {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        (**self).encode(cx)
    }
}

impl<I: Interface> WireEncode for Poly<I> {
    fn encode(&self, cx: &WireContext<'_>) -> Result<Value, EncodeError> {
        match &self.0 {
            Some(value) => cx.registry().encode_variant(value, cx),
            None => Ok(Value::Null),
        }
    }
}
