//! The polymorphic `Result` interface.
//!
//! Every RPC method answers with one concrete result type, but callers that
//! consume a stream of events (or want one decode path for all methods)
//! read into `Box<dyn RpcResult>` and downcast afterwards. The concrete
//! types are registered with their tag bytes at startup:
//!
//! ```rust
//! use chainrpc_protocol::result::{AnyResult, RpcResult, boxed};
//! use chainrpc_wire::{InterfaceDef, Registry, decode, wire_struct};
//! use serde_json::json;
//!
//! wire_struct! {
//!     #[derive(Debug, Default)]
//!     pub struct ResultHeight {
//!         pub height: u64 => "height",
//!     }
//! }
//!
//! let registry = Registry::builder()
//!     .register(InterfaceDef::<Box<dyn RpcResult>>::new().variant(0x01, boxed::<ResultHeight>))
//!     .unwrap()
//!     .build();
//!
//! let result: AnyResult = decode(&json!([1, {"height": 9}]), &registry).unwrap();
//! assert_eq!(result.downcast_ref::<ResultHeight>().unwrap().height, 9);
//! ```

use std::any::Any;
use std::fmt::Debug;

use chainrpc_wire::{Interface, Poly};

/// Any concrete RPC result. Implemented for every `'static` type that is
/// `Debug + Send + Sync`, so result structs need no extra impl.
pub trait RpcResult: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Debug + Send + Sync> RpcResult for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Interface for Box<dyn RpcResult> {
    fn as_any(&self) -> &dyn Any {
        RpcResult::as_any(&**self)
    }
}

/// A decoded value of the `Result` interface.
pub type AnyResult = Poly<Box<dyn RpcResult>>;

/// Boxes a concrete result behind the interface. Pass it to
/// [`InterfaceDef::variant`](chainrpc_wire::InterfaceDef::variant).
pub fn boxed<C: RpcResult>(result: C) -> Box<dyn RpcResult> {
    Box::new(result)
}
