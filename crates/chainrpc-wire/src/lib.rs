//! # chainrpc-wire
//!
//! The value format spoken by the node's RPC endpoints, on top of plain
//! JSON.
//!
//! JSON alone cannot say which concrete type sits behind a polymorphic
//! field, so the node writes such values as `[tag, payload]`, where the tag
//! byte is looked up in a [`Registry`] built at startup. Byte strings are
//! hex, timestamps follow a fixed ISO-8601 profile, and floats are only
//! accepted in fields that explicitly allow them.
//!
//! ## Architecture
//!
//! ```text
//!            serde_json::Value
//!                   │
//!         ┌─────────▼─────────┐        ┌────────────┐
//!         │   WireDecode /    │◄──────►│  Registry  │
//!         │   WireEncode      │  tags  │ (immutable)│
//!         └─────────▲─────────┘        └────────────┘
//!                   │
//!        typed value (structs via wire_struct!)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use chainrpc_wire::{Registry, decode, wire_struct};
//! use serde_json::json;
//!
//! wire_struct! {
//!     #[derive(Debug, Default)]
//!     pub struct Status {
//!         pub moniker: String => "moniker",
//!         pub latest_height: u64 => "latest_block_height",
//!     }
//! }
//!
//! let registry = Registry::empty();
//! let status: Status = decode(
//!     &json!({"moniker": "node-0", "latest_block_height": 1200}),
//!     &registry,
//! )?;
//! assert_eq!(status.latest_height, 1200);
//! # Ok::<(), chainrpc_wire::DecodeError>(())
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod context;
pub mod decode;
pub mod encode;
pub mod error;
mod macros;
pub mod registry;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use context::WireContext;
pub use decode::{WireDecode, decode, decode_into, expect_object, kind_of};
pub use encode::{WireEncode, encode};
pub use error::{DecodeError, EncodeError, RegistryError};
pub use registry::{ConcreteType, InterfaceDef, Registry, RegistryBuilder};
pub use types::{
    ByteArray, Bytes, FieldDescriptor, FieldOptions, Interface, Poly, TIMESTAMP_FORMAT,
    TIMESTAMP_PARSE_FORMAT, WireStruct,
};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::{Map, Value};
}
