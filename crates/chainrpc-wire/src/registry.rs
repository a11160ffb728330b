//! Interface registry: which concrete types may appear behind which
//! polymorphic interface, and under which tag byte.
//!
//! The registry is built once at startup through [`RegistryBuilder`] and is
//! immutable afterwards, so it can be shared behind an `Arc` by every
//! decoder, codec and client without locking.
//!
//! ```text
//! Box<dyn RpcResult> ──┬── 0x10 ↔ ResultStatus
//!                      ├── 0x11 ↔ ResultBlock
//!                      └── 0x20 ↔ ResultEvent
//! ```

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::context::WireContext;
use crate::decode::WireDecode;
use crate::encode::WireEncode;
use crate::error::{DecodeError, EncodeError, RegistryError};
use crate::types::Interface;

type DecodeFn = Arc<
    dyn Fn(&Value, &WireContext<'_>) -> Result<Box<dyn Any + Send>, DecodeError>
        + Send
        + Sync,
>;

type EncodeFn =
    Arc<dyn Fn(&dyn Any, &WireContext<'_>) -> Result<Value, EncodeError> + Send + Sync>;

/// Identity of a concrete type registered behind an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcreteType {
    /// Runtime identity of the concrete type.
    pub type_id: TypeId,
    /// Name of the concrete type, for diagnostics.
    pub type_name: &'static str,
}

#[derive(Clone)]
struct Variant {
    concrete: ConcreteType,
    decode: DecodeFn,
    encode: EncodeFn,
}

struct InterfaceEntry {
    name: &'static str,
    by_tag: HashMap<u8, Variant>,
    by_type: HashMap<TypeId, u8>,
}

// ---------------------------------------------------------------------------
// InterfaceDef
// ---------------------------------------------------------------------------

/// The concrete types of one interface, collected before registration.
///
/// ```rust,ignore
/// let results = InterfaceDef::<Box<dyn RpcResult>>::new()
///     .variant(0x10, boxed::<ResultStatus>)
///     .variant(0x11, boxed::<ResultBlock>);
/// ```
pub struct InterfaceDef<I> {
    variants: Vec<(u8, Variant)>,
    _interface: PhantomData<fn() -> I>,
}

impl<I: Interface> InterfaceDef<I> {
    /// Starts an empty definition.
    pub fn new() -> Self {
        Self {
            variants: Vec::new(),
            _interface: PhantomData,
        }
    }

    /// Adds the concrete type `C` under `tag`. `into` boxes a decoded `C`
    /// behind the interface.
    ///
    /// The same concrete type may appear under several tags; encoding
    /// uses the first one.
    pub fn variant<C>(mut self, tag: u8, into: fn(C) -> I) -> Self
    where
        C: WireDecode + WireEncode + Default + Send + 'static,
    {
        let decode: DecodeFn = Arc::new(move |raw, cx| {
            let mut concrete = C::default();
            concrete.decode_into(raw, cx)?;
            Ok(Box::new(into(concrete)) as Box<dyn Any + Send>)
        });
        let encode: EncodeFn = Arc::new(|value, cx| match value.downcast_ref::<C>() {
            Some(concrete) => concrete.encode(cx),
            None => Err(EncodeError::UnregisteredConcrete {
                interface: type_name::<I>(),
            }),
        });
        self.variants.push((
            tag,
            Variant {
                concrete: ConcreteType {
                    type_id: TypeId::of::<C>(),
                    type_name: type_name::<C>(),
                },
                decode,
                encode,
            },
        ));
        self
    }
}

impl<I: Interface> Default for InterfaceDef<I> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// RegistryBuilder
// ---------------------------------------------------------------------------

/// Collects interface definitions, then freezes them into a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    interfaces: HashMap<TypeId, InterfaceEntry>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interface `I` with its concrete types.
    ///
    /// # Errors
    /// - [`RegistryError::DuplicateInterface`] if `I` was registered before.
    /// - [`RegistryError::DuplicateTag`] if two variants share a tag byte.
    pub fn register<I: Interface>(
        mut self,
        def: InterfaceDef<I>,
    ) -> Result<Self, RegistryError> {
        let interface = type_name::<I>();
        let slot = match self.interfaces.entry(TypeId::of::<I>()) {
            Entry::Occupied(_) => {
                return Err(RegistryError::DuplicateInterface { interface });
            }
            Entry::Vacant(slot) => slot,
        };

        let mut by_tag = HashMap::with_capacity(def.variants.len());
        let mut by_type = HashMap::with_capacity(def.variants.len());
        for (tag, variant) in def.variants {
            by_type.entry(variant.concrete.type_id).or_insert(tag);
            if by_tag.insert(tag, variant).is_some() {
                return Err(RegistryError::DuplicateTag { interface, tag });
            }
        }

        tracing::debug!(interface, variants = by_tag.len(), "registered interface");
        slot.insert(InterfaceEntry {
            name: interface,
            by_tag,
            by_type,
        });
        Ok(self)
    }

    /// Freezes the registrations.
    pub fn build(self) -> Registry {
        Registry {
            interfaces: self.interfaces,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable table of registered interfaces.
#[derive(Default)]
pub struct Registry {
    interfaces: HashMap<TypeId, InterfaceEntry>,
}

impl Registry {
    /// Starts building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry without interfaces, for payloads that never carry
    /// polymorphic values.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if `I` has been registered.
    pub fn is_registered<I: Interface>(&self) -> bool {
        self.interfaces.contains_key(&TypeId::of::<I>())
    }

    /// Finds the concrete type registered behind `I` under `tag`.
    pub fn lookup<I: Interface>(&self, tag: u8) -> Option<ConcreteType> {
        self.entry::<I>()?
            .by_tag
            .get(&tag)
            .map(|variant| variant.concrete)
    }

    /// Finds the tag byte of a concrete type registered behind `I`.
    pub fn reverse_lookup<I: Interface>(&self, concrete: TypeId) -> Option<u8> {
        self.entry::<I>()?.by_type.get(&concrete).copied()
    }

    /// Typed shorthand for [`reverse_lookup`](Self::reverse_lookup).
    pub fn tag_of<I: Interface, C: 'static>(&self) -> Option<u8> {
        self.reverse_lookup::<I>(TypeId::of::<C>())
    }

    /// Decodes `payload` as the concrete type registered under `tag` and
    /// boxes it behind `I`.
    pub(crate) fn decode_variant<I: Interface>(
        &self,
        tag: u8,
        payload: &Value,
        cx: &WireContext<'_>,
    ) -> Result<I, DecodeError> {
        let entry = self
            .entry::<I>()
            .ok_or(DecodeError::UnregisteredInterface {
                interface: type_name::<I>(),
            })?;
        let variant = entry.by_tag.get(&tag).ok_or(DecodeError::UnknownVariant {
            interface: entry.name,
            tag,
        })?;
        let boxed = (variant.decode)(payload, cx)?;
        boxed
            .downcast::<I>()
            .map(|value| *value)
            .map_err(|_| DecodeError::TypeMismatch {
                expected: entry.name,
                found: variant.concrete.type_name,
            })
    }

    /// Encodes `value` as `[tag, payload]`.
    pub(crate) fn encode_variant<I: Interface>(
        &self,
        value: &I,
        cx: &WireContext<'_>,
    ) -> Result<Value, EncodeError> {
        let interface = type_name::<I>();
        let entry = self
            .entry::<I>()
            .ok_or(EncodeError::UnregisteredInterface { interface })?;
        let concrete = value.as_any();
        let variant = entry
            .by_type
            .get(&Any::type_id(concrete))
            .and_then(|tag| entry.by_tag.get(tag).map(|variant| (*tag, variant)));
        let Some((tag, variant)) = variant else {
            return Err(EncodeError::UnregisteredConcrete { interface });
        };
        let payload = (variant.encode)(concrete, cx)?;
        Ok(Value::Array(vec![Value::from(tag), payload]))
    }

    fn entry<I: Interface>(&self) -> Option<&InterfaceEntry> {
        self.interfaces.get(&TypeId::of::<I>())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for entry in self.interfaces.values() {
            list.entry(&(entry.name, entry.by_tag.len()));
        }
        list.finish()
    }
}
