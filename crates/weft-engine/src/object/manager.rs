//! Object manager and factory
//!
//! The builder fetches referenced objects through an [`ObjectManager`] and
//! reconstituted objects create fresh dependencies through an
//! [`ObjectFactory`]. [`ObjectContainer`] implements both: it registers
//! object configurations, applies their scope and hands the actual building
//! to an [`ObjectBuilder`], which calls back into the container for nested
//! dependencies.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::argument::ConfigurationArgument;
use super::builder::ObjectBuilder;
use super::configuration::{ObjectConfiguration, Scope};
use super::definition::{DefinitionError, ObjectDefinitions};
use super::error::ObjectError;
use super::session::{InMemorySessionStore, SessionStore};
use crate::reflect::ReflectionClassFactory;
use crate::value::{Instance, Value};

/// Hands out objects by name, honouring their scope
pub trait ObjectManager: Send + Sync {
    fn get_object(&self, object_name: &str) -> Result<Instance, ObjectError>;
}

/// Creates fresh objects by name
pub trait ObjectFactory: Send + Sync {
    fn create(
        &self,
        object_name: &str,
        overriding_arguments: &[ConfigurationArgument],
    ) -> Result<Instance, ObjectError>;
}

/// Scope-aware object registry
pub struct ObjectContainer {
    builder: ObjectBuilder,
    /// Registered configurations by object name
    configurations: RwLock<FxHashMap<String, Arc<ObjectConfiguration>>>,
    /// Singleton instances by object name
    singletons: Mutex<FxHashMap<String, Instance>>,
    session: Arc<dyn SessionStore>,
}

impl ObjectContainer {
    /// Create a container with an in-memory session store
    pub fn new(reflections: Arc<ReflectionClassFactory>) -> Self {
        Self::with_session_store(reflections, Arc::new(InMemorySessionStore::new()))
    }

    /// Create a container backed by the given session store
    pub fn with_session_store(
        reflections: Arc<ReflectionClassFactory>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            builder: ObjectBuilder::new(reflections),
            configurations: RwLock::new(FxHashMap::default()),
            singletons: Mutex::new(FxHashMap::default()),
            session,
        }
    }

    pub fn builder(&self) -> &ObjectBuilder {
        &self.builder
    }

    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Register a configuration under its object name
    ///
    /// Replaces an earlier configuration of the same name and forgets a
    /// singleton already built from it.
    pub fn register(&self, configuration: ObjectConfiguration) {
        let object_name = configuration.object_name().to_string();
        trace!(
            "Registering object {} ({}, from {})",
            object_name,
            configuration.scope(),
            configuration.configuration_source_hint()
        );
        self.singletons.lock().remove(&object_name);
        self.configurations
            .write()
            .insert(object_name, Arc::new(configuration));
    }

    /// Register every configuration of a definition set
    pub fn load_definitions(&self, definitions: &ObjectDefinitions) -> Result<(), DefinitionError> {
        for configuration in definitions.to_configurations()? {
            self.register(configuration);
        }
        Ok(())
    }

    pub fn is_registered(&self, object_name: &str) -> bool {
        self.configurations.read().contains_key(object_name)
    }

    /// Names of all registered objects, sorted
    pub fn registered_object_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configurations.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// The configuration used for `object_name`
    ///
    /// Falls back to a default configuration when the name is an
    /// instantiable class that has not been registered explicitly.
    pub fn configuration(
        &self,
        object_name: &str,
    ) -> Result<Arc<ObjectConfiguration>, ObjectError> {
        if let Some(configuration) = self.configurations.read().get(object_name) {
            return Ok(Arc::clone(configuration));
        }

        let reflections = self.builder.reflections();
        if reflections.class_exists(object_name)
            && reflections.reflect(object_name)?.is_instantiable()
        {
            let mut configuration = ObjectConfiguration::new(object_name, None);
            configuration.set_configuration_source_hint("implicit class configuration");
            let configuration = Arc::new(configuration);
            let mut configurations = self.configurations.write();
            let registered = configurations
                .entry(object_name.to_string())
                .or_insert(configuration);
            return Ok(Arc::clone(registered));
        }

        Err(ObjectError::UnknownObject(object_name.to_string()))
    }

    /// Check whether a singleton or session instance exists for `object_name`
    pub fn is_instantiated(&self, object_name: &str) -> bool {
        self.singletons.lock().contains_key(object_name) || self.session.get(object_name).is_some()
    }

    /// Reconstitute an object from persisted properties
    ///
    /// Session-scoped results replace the instance kept in the session store.
    pub fn reconstitute_object(
        &self,
        object_name: &str,
        properties: &BTreeMap<String, Value>,
    ) -> Result<Instance, ObjectError> {
        let configuration = self.configuration(object_name)?;
        let instance =
            self.builder
                .reconstitute_object(object_name, &configuration, properties, self, self)?;
        if configuration.scope() == Scope::Session {
            self.session.put(object_name, instance.clone());
        }
        Ok(instance)
    }

    fn build(
        &self,
        object_name: &str,
        configuration: &ObjectConfiguration,
        overriding_arguments: &[ConfigurationArgument],
    ) -> Result<Instance, ObjectError> {
        self.builder
            .create_object(object_name, configuration, overriding_arguments, self)
    }
}

impl ObjectManager for ObjectContainer {
    fn get_object(&self, object_name: &str) -> Result<Instance, ObjectError> {
        let configuration = self.configuration(object_name)?;

        match configuration.scope() {
            Scope::Prototype => self.build(object_name, &configuration, &[]),
            Scope::Singleton => {
                if let Some(instance) = self.singletons.lock().get(object_name) {
                    return Ok(instance.clone());
                }
                let instance = self.build(object_name, &configuration, &[])?;
                let mut singletons = self.singletons.lock();
                let cached = singletons
                    .entry(object_name.to_string())
                    .or_insert(instance);
                Ok(cached.clone())
            }
            Scope::Session => {
                if let Some(instance) = self.session.get(object_name) {
                    return Ok(instance);
                }
                let instance = self.build(object_name, &configuration, &[])?;
                debug!("Storing session object {}", object_name);
                self.session.put(object_name, instance.clone());
                Ok(instance)
            }
        }
    }
}

impl ObjectFactory for ObjectContainer {
    fn create(
        &self,
        object_name: &str,
        overriding_arguments: &[ConfigurationArgument],
    ) -> Result<Instance, ObjectError> {
        let configuration = self.configuration(object_name)?;
        self.build(object_name, &configuration, overriding_arguments)
    }
}

impl std::fmt::Debug for ObjectContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectContainer")
            .field("registered", &self.registered_object_names())
            .field("builder", &self.builder)
            .finish()
    }
}
