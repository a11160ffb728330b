/// Declares a struct together with its wire layout.
///
/// Each field names its JSON key after `=>`. Append `[unsafe]` to allow
/// floats in that field. A struct with a single field marked `=> unwrap`
/// is written as that field's value, without a wrapping object; it takes
/// `[unsafe]` the same way (`=> unwrap [unsafe]`).
///
/// ```rust
/// use chainrpc_wire::{ByteArray, Registry, decode, wire_struct};
/// use serde_json::json;
///
/// wire_struct! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct BlockMeta {
///         pub height: u64 => "height",
///         pub hash: ByteArray<4> => "hash",
///         pub ratio: f64 => "ratio" [unsafe],
///     }
/// }
///
/// wire_struct! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Height {
///         pub value: u64 => unwrap,
///     }
/// }
///
/// let registry = Registry::empty();
/// let meta: BlockMeta = decode(
///     &json!({"height": 10, "hash": "deadbeef", "ratio": 0.5}),
///     &registry,
/// )
/// .unwrap();
/// assert_eq!(meta.height, 10);
///
/// let height: Height = decode(&json!(42), &registry).unwrap();
/// assert_eq!(height.value, 42);
/// ```
///
/// The generated impls are [`WireStruct`](crate::WireStruct),
/// [`WireDecode`](crate::WireDecode) and [`WireEncode`](crate::WireEncode).
/// Decoding only touches fields whose keys are present; unknown keys are
/// ignored.
#[macro_export]
macro_rules! wire_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(#[$fmeta:meta])*
            $fvis:vis $field:ident : $fty:ty => unwrap $([$flag:tt])? $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(#[$fmeta])*
            $fvis $field: $fty,
        }

        impl $crate::WireStruct for $name {
            const FIELDS: &'static [$crate::FieldDescriptor] = &[$crate::FieldDescriptor {
                name: stringify!($field),
                type_name: stringify!($fty),
                options: $crate::__wire_field_options!(@unwrap stringify!($field) $(, $flag)?),
            }];
        }

        impl $crate::WireDecode for $name {
            fn decode_into(
                &mut self,
                raw: &$crate::__private::Value,
                cx: &$crate::WireContext<'_>,
            ) -> ::core::result::Result<(), $crate::DecodeError> {
                let cx = cx.with_options($crate::__wire_field_options!(@unwrap stringify!($field) $(, $flag)?));
                $crate::WireDecode::decode_into(&mut self.$field, raw, &cx)
            }
        }

        impl $crate::WireEncode for $name {
            fn encode(
                &self,
                cx: &$crate::WireContext<'_>,
            ) -> ::core::result::Result<$crate::__private::Value, $crate::EncodeError> {
                let cx = cx.with_options($crate::__wire_field_options!(@unwrap stringify!($field) $(, $flag)?));
                $crate::WireEncode::encode(&self.$field, &cx)
            }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty => $json:literal $([$flag:tt])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::WireStruct for $name {
            const FIELDS: &'static [$crate::FieldDescriptor] = &[$(
                $crate::FieldDescriptor {
                    name: stringify!($field),
                    type_name: stringify!($fty),
                    options: $crate::__wire_field_options!($json $(, $flag)?),
                }
            ),*];
        }

        impl $crate::WireDecode for $name {
            fn decode_into(
                &mut self,
                raw: &$crate::__private::Value,
                cx: &$crate::WireContext<'_>,
            ) -> ::core::result::Result<(), $crate::DecodeError> {
                let _object = $crate::expect_object(raw)?;
                $(
                    if let Some(value) = _object.get($json) {
                        let cx = cx.with_options($crate::__wire_field_options!($json $(, $flag)?));
                        $crate::WireDecode::decode_into(&mut self.$field, value, &cx)
                            .map_err(|e| e.in_field($json))?;
                    }
                )*
                Ok(())
            }
        }

        impl $crate::WireEncode for $name {
            fn encode(
                &self,
                cx: &$crate::WireContext<'_>,
            ) -> ::core::result::Result<$crate::__private::Value, $crate::EncodeError> {
                #[allow(unused_mut)]
                let mut object = $crate::__private::Map::new();
                $(
                    let field_cx = cx.with_options($crate::__wire_field_options!($json $(, $flag)?));
                    object.insert(
                        ::std::string::String::from($json),
                        $crate::WireEncode::encode(&self.$field, &field_cx)
                            .map_err(|e| e.in_field($json))?,
                    );
                )*
                Ok($crate::__private::Value::Object(object))
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __wire_field_options {
    (@unwrap $name:expr) => {
        $crate::FieldOptions::unwrapped($name)
    };
    (@unwrap $name:expr, unsafe) => {
        $crate::FieldOptions::unwrapped($name).with_unsafe_float()
    };
    ($json:literal) => {
        $crate::FieldOptions::named($json)
    };
    ($json:literal, unsafe) => {
        $crate::FieldOptions::named($json).with_unsafe_float()
    };
}
