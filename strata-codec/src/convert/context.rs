use std::collections::HashMap;
use std::sync::Arc;

use strata_dtype::CompositeId;

use crate::CompositeConverterRef;

/// A mapping between a composite type's id and the converter for it, shared by every group
/// resolved against it.
#[derive(Debug, Clone, Default)]
pub struct ConverterContext {
    converters: HashMap<CompositeId, CompositeConverterRef>,
}

/// An atomic shared reference to a [`ConverterContext`].
pub type ConverterContextRef = Arc<ConverterContext>;

impl ConverterContext {
    pub fn with_converter(mut self, converter: CompositeConverterRef) -> Self {
        self.converters.insert(converter.id(), converter);
        self
    }

    pub fn with_converters<C: IntoIterator<Item = CompositeConverterRef>>(
        mut self,
        converters: C,
    ) -> Self {
        self.converters
            .extend(converters.into_iter().map(|c| (c.id(), c)));
        self
    }

    pub fn converters(&self) -> impl Iterator<Item = CompositeConverterRef> + '_ {
        self.converters.values().cloned()
    }

    pub fn lookup(&self, id: &CompositeId) -> Option<CompositeConverterRef> {
        self.converters.get(id).cloned()
    }
}
