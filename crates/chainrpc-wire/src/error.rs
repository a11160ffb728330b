//! Error types for the wire layer.
//!
//! Decoding, encoding and registration fail for different reasons, so each
//! gets its own enum. None of them carry state back into the registry: a
//! failed decode leaves nothing behind except a partially written target.

/// Errors that can occur while decoding a JSON value into a typed target.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The JSON kind is incompatible with the target type.
    ///
    /// The decoder never coerces across kinds: a JSON string is never
    /// read as a number, a number never as a boolean, and so on.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A fixed-size target received the wrong number of elements or bytes.
    #[error("length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// The tag byte of a polymorphic value has no registered concrete type.
    #[error("tag byte {tag:#04x} is not registered for interface {interface}")]
    UnknownVariant { interface: &'static str, tag: u8 },

    /// The target interface was never registered.
    #[error("interface {interface} is not registered")]
    UnregisteredInterface { interface: &'static str },

    /// A negative number was decoded into an unsigned target.
    #[error("expected unsigned number, found {value}")]
    NegativeForUnsigned { value: String },

    /// The number does not fit in the target integer width.
    #[error("{value} does not fit in {target}")]
    OutOfRange { target: &'static str, value: String },

    /// A float target was decoded without the `unsafe` field option.
    #[error("float decoding requires the `unsafe` field option")]
    UnsafeFloatDisabled,

    /// A byte field held a string that is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A timestamp field held a string outside the ISO-8601 profile.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    /// An error raised below a struct field or sequence element.
    #[error("{path}: {source}")]
    At {
        path: String,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Prefixes the error path with a struct field name.
    pub fn in_field(self, field: &str) -> Self {
        self.prefixed(field.to_owned())
    }

    /// Prefixes the error path with a sequence index.
    pub fn at_index(self, index: usize) -> Self {
        self.prefixed(format!("[{index}]"))
    }

    /// Returns the error that started the chain, skipping path context.
    pub fn innermost(&self) -> &DecodeError {
        match self {
            Self::At { source, .. } => source.innermost(),
            other => other,
        }
    }

    /// Returns the dotted path to the failing value, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::At { path, .. } => Some(path),
            _ => None,
        }
    }

    fn prefixed(self, segment: String) -> Self {
        match self {
            Self::At { path, source } => {
                let path = if path.starts_with('[') {
                    format!("{segment}{path}")
                } else {
                    format!("{segment}.{path}")
                };
                Self::At { path, source }
            }
            other => Self::At {
                path: segment,
                source: Box::new(other),
            },
        }
    }
}

/// Errors that can occur while encoding a typed value into JSON.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A float was encoded without the `unsafe` field option.
    #[error("float encoding requires the `unsafe` field option")]
    UnsafeFloatDisabled,

    /// JSON has no representation for NaN or infinities.
    #[error("cannot encode non-finite float {0}")]
    NonFiniteFloat(f64),

    /// The interface of a polymorphic value was never registered.
    #[error("interface {interface} is not registered")]
    UnregisteredInterface { interface: &'static str },

    /// The concrete value behind an interface has no tag byte.
    #[error("concrete type behind {interface} is not registered")]
    UnregisteredConcrete { interface: &'static str },

    /// An error raised below a struct field.
    #[error("{path}: {source}")]
    At {
        path: String,
        #[source]
        source: Box<EncodeError>,
    },
}

impl EncodeError {
    /// Prefixes the error path with a struct field name.
    pub fn in_field(self, field: &str) -> Self {
        match self {
            Self::At { path, source } => Self::At {
                path: format!("{field}.{path}"),
                source,
            },
            other => Self::At {
                path: field.to_owned(),
                source: Box::new(other),
            },
        }
    }
}

/// Errors raised while building a [`Registry`](crate::Registry).
///
/// Registration happens once at startup, so callers usually treat these
/// as fatal.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The same interface was registered twice.
    #[error("interface {interface} is already registered")]
    DuplicateInterface { interface: &'static str },

    /// Two concrete types claimed the same tag byte within one interface.
    #[error("tag byte {tag:#04x} registered twice for interface {interface}")]
    DuplicateTag { interface: &'static str, tag: u8 },
}
