//! Reconstitution support
//!
//! Objects persisted across requests (session scope) are rebuilt without
//! running their constructor. A class opts in by implementing
//! [`SupportsExternalRestore`] and registering with
//! [`ClassDefinition::restorable`](crate::reflect::ClassDefinition::restorable).

use std::collections::BTreeMap;

use super::manager::{ObjectFactory, ObjectManager};
use crate::value::Value;

/// Everything a restoring class gets to rebuild its state
pub struct RestoreContext<'a> {
    object_name: &'a str,
    properties: &'a BTreeMap<String, Value>,
    object_manager: &'a dyn ObjectManager,
    object_factory: &'a dyn ObjectFactory,
}

impl<'a> RestoreContext<'a> {
    pub(crate) fn new(
        object_name: &'a str,
        properties: &'a BTreeMap<String, Value>,
        object_manager: &'a dyn ObjectManager,
        object_factory: &'a dyn ObjectFactory,
    ) -> Self {
        Self {
            object_name,
            properties,
            object_manager,
            object_factory,
        }
    }

    /// Name of the object being reconstituted
    pub fn object_name(&self) -> &str {
        self.object_name
    }

    /// The persisted properties
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        self.properties
    }

    /// A single persisted property
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Manager for fetching dependencies that are not persisted
    pub fn object_manager(&self) -> &dyn ObjectManager {
        self.object_manager
    }

    /// Factory for creating fresh prototype dependencies
    pub fn object_factory(&self) -> &dyn ObjectFactory {
        self.object_factory
    }
}

/// A type that can be rebuilt from persisted properties
pub trait SupportsExternalRestore: Sized {
    fn restore_from(context: &RestoreContext<'_>) -> Result<Self, String>;
}
