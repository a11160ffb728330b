use crate::registry::Registry;
use crate::types::FieldOptions;

/// State threaded through a decode or encode walk: the interface registry
/// and the options of the field currently being visited.
///
/// The context is `Copy`; struct impls hand a fresh copy with the field's
/// options to each field.
#[derive(Debug, Clone, Copy)]
pub struct WireContext<'r> {
    registry: &'r Registry,
    options: FieldOptions,
}

impl<'r> WireContext<'r> {
    /// A top-level context with default options.
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            options: FieldOptions::default(),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn options(&self) -> FieldOptions {
        self.options
    }

    /// Returns a context for a struct field. Options are replaced, not
    /// merged: each field starts from its own declaration. Sequence and
    /// optional wrappers pass the context through unchanged, so a float
    /// list under an `unsafe` field accepts its elements.
    pub fn with_options(&self, options: FieldOptions) -> Self {
        Self {
            registry: self.registry,
            options,
        }
    }

    /// Allows floats at the top level, for bare float targets.
    pub fn allow_unsafe_float(mut self) -> Self {
        self.options.unsafe_float = true;
        self
    }
}
