use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::RwLock;
use strata_dtype::{GroupName, GroupSchema};
use strata_error::StrataResult;

use crate::{FieldLayout, SchemaResolver};

/// Resolved layouts keyed by group name.
///
/// A layout is resolved at most once per group and is never mutated afterwards, so readers only
/// ever take the read lock once the cache is warm.
#[derive(Debug)]
pub struct LayoutCache {
    resolver: SchemaResolver,
    layouts: RwLock<HashMap<GroupName, Arc<FieldLayout>>>,
}

impl LayoutCache {
    pub fn new(resolver: SchemaResolver) -> Self {
        Self {
            resolver,
            layouts: Default::default(),
        }
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// The cached layout of `group`, if it has been resolved.
    pub fn get(&self, group: &str) -> Option<Arc<FieldLayout>> {
        self.layouts.read().get(group).cloned()
    }

    /// The layout of `schema`'s group, resolving and caching it on first use.
    pub fn get_or_resolve(&self, schema: &GroupSchema) -> StrataResult<Arc<FieldLayout>> {
        if let Some(layout) = self.get(schema.group()) {
            return Ok(layout);
        }

        let layout = Arc::new(self.resolver.resolve(schema)?);
        Ok(match self.layouts.write().entry(schema.group().clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(layout).clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.layouts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use strata_dtype::{GroupSchema, LogicalType};

    use super::*;

    #[test]
    fn resolves_once() {
        let cache = LayoutCache::new(SchemaResolver::default());
        let schema = GroupSchema::entity("Person", LogicalType::UTF8)
            .with_property("age", LogicalType::I32);

        assert!(cache.get("Person").is_none());
        let first = cache.get_or_resolve(&schema).unwrap();
        let second = cache.get_or_resolve(&schema).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_resolution_is_not_cached() {
        let cache = LayoutCache::new(SchemaResolver::default());
        let schema = GroupSchema::entity("Person", LogicalType::UTF8)
            .with_property("location", LogicalType::composite("point"));

        assert!(cache.get_or_resolve(&schema).is_err());
        assert!(cache.is_empty());
    }
}
