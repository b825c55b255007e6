//! Item factory registry.
//!
//! Merging needs to construct items from their type string. Factories are
//! registered per type on an explicit [`ItemRegistry`] that callers pass to
//! merge operations; an optional fallback handles every other type.

use std::collections::BTreeMap;
use std::fmt;

use itemdoc_model::Uid;

use crate::live::Item;

/// Builds an item of one registered type under the given identifier.
pub type ItemFactory = Box<dyn Fn(&Uid) -> Box<dyn Item>>;

/// Builds an item of any type; receives the identifier and type string.
pub type FallbackFactory = Box<dyn Fn(&Uid, &str) -> Box<dyn Item>>;

/// Registry of item factories indexed by item type.
#[derive(Default)]
pub struct ItemRegistry {
    factories: BTreeMap<String, ItemFactory>,
    fallback: Option<FallbackFactory>,
}

impl ItemRegistry {
    /// Creates an empty registry without a fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for an item type.
    ///
    /// If a factory for this type is already registered, it is replaced.
    pub fn register<F>(&mut self, item_type: impl Into<String>, factory: F)
    where
        F: Fn(&Uid) -> Box<dyn Item> + 'static,
    {
        self.factories.insert(item_type.into(), Box::new(factory));
    }

    /// Sets the factory used for types without a registered factory.
    pub fn set_fallback<F>(&mut self, factory: F)
    where
        F: Fn(&Uid, &str) -> Box<dyn Item> + 'static,
    {
        self.fallback = Some(Box::new(factory));
    }

    /// Builder form of [`ItemRegistry::set_fallback`].
    #[must_use]
    pub fn with_fallback<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Uid, &str) -> Box<dyn Item> + 'static,
    {
        self.set_fallback(factory);
        self
    }

    /// Constructs an item, or `None` when the type is unknown.
    pub fn create(&self, item_type: &str, id: &Uid) -> Option<Box<dyn Item>> {
        match self.factories.get(item_type) {
            Some(factory) => Some(factory(id)),
            None => self.fallback.as_ref().map(|fallback| fallback(id, item_type)),
        }
    }

    /// Returns true if `item_type` can be constructed.
    pub fn supports(&self, item_type: &str) -> bool {
        self.fallback.is_some() || self.factories.contains_key(item_type)
    }

    /// Returns the number of registered types (excluding the fallback).
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no types are registered (excluding the fallback).
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns an iterator over all registered item types.
    pub fn item_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }
}

impl fmt::Debug for ItemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemRegistry")
            .field("item_types", &self.factories.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::GenericItem;

    #[test]
    fn test_register_and_create() {
        let mut registry = ItemRegistry::new();
        registry.register("ec/resistor", |id| {
            Box::new(GenericItem::new(id.clone(), "ec/resistor").with_slots(["p1", "n1"]))
        });

        let item = registry.create("ec/resistor", &Uid::from("r1")).unwrap();
        assert_eq!(item.id().as_str(), "r1");
        assert_eq!(item.child_slots(), vec!["p1".to_string(), "n1".to_string()]);
        assert!(registry.create("ec/capacitor", &Uid::from("c1")).is_none());
        assert_eq!(registry.len(), 1);
        assert!(!registry.supports("ec/capacitor"));
    }

    #[test]
    fn test_fallback_receives_type() {
        let registry = ItemRegistry::new()
            .with_fallback(|id, item_type| Box::new(GenericItem::new(id.clone(), item_type)));
        let item = registry.create("dp/text", &Uid::from("t")).unwrap();
        assert_eq!(item.item_type(), "dp/text");
        assert!(registry.supports("anything"));
        assert!(registry.is_empty());
    }
}
