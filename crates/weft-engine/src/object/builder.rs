//! Object builder
//!
//! Takes care of the whole building process of an object: resolves its
//! dependencies (fetching other objects from the object manager if
//! necessary), instantiates it, injects constructor arguments and properties
//! and calls its lifecycle initialization method.
//!
//! The builder keeps a small registry of the object names currently being
//! built, per thread. The object manager re-enters the builder for nested
//! dependencies on the same thread, and a name that shows up twice in one
//! build chain is a circular dependency.

use std::any::Any;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tracing::debug;

use super::argument::{ConfigurationArgument, ConfigurationProperty, ConfigurationValue};
use super::configuration::{AutoWiringMode, ObjectConfiguration};
use super::error::ObjectError;
use super::manager::{ObjectFactory, ObjectManager};
use super::restore::RestoreContext;
use crate::reflect::{
    ClassReflection, MethodReflection, ParameterReflection, ReflectionClassFactory,
    ReflectionError, TypeHint,
};
use crate::value::{Arguments, Instance, Value};

/// Method name prefix marking injection setters
const INJECT_PREFIX: &str = "inject";

/// Method name prefix of plain setters
const SET_PREFIX: &str = "set";

/// Tag marking an injection setter whose dependency may be missing
const OPTIONAL_TAG: &str = "optional";

/// Number of autowiring notes kept; older notes are dropped first
pub const MAX_DEBUG_MESSAGES: usize = 1024;

/// Removes an object name from the in-progress registry when dropped
struct BuildGuard<'a> {
    objects_being_built: &'a Mutex<FxHashSet<(ThreadId, String)>>,
    key: (ThreadId, String),
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.objects_being_built.lock().remove(&self.key);
    }
}

/// Builds ready-to-use objects from object configurations
pub struct ObjectBuilder {
    reflections: Arc<ReflectionClassFactory>,
    /// Objects currently being built, by building thread
    objects_being_built: Mutex<FxHashSet<(ThreadId, String)>>,
    /// Most recent non-fatal autowiring notes
    debug_messages: Mutex<VecDeque<String>>,
}

impl ObjectBuilder {
    pub fn new(reflections: Arc<ReflectionClassFactory>) -> Self {
        Self {
            reflections,
            objects_being_built: Mutex::new(FxHashSet::default()),
            debug_messages: Mutex::new(VecDeque::new()),
        }
    }

    /// The reflection cache used to resolve classes
    pub fn reflections(&self) -> &Arc<ReflectionClassFactory> {
        &self.reflections
    }

    /// Check whether the current thread is building an object
    pub fn is_building(&self, object_name: &str) -> bool {
        let key = (thread::current().id(), object_name.to_string());
        self.objects_being_built.lock().contains(&key)
    }

    /// Names of the objects the current thread is building, sorted
    pub fn objects_being_built(&self) -> Vec<String> {
        let current = thread::current().id();
        let mut names: Vec<String> = self
            .objects_being_built
            .lock()
            .iter()
            .filter(|(thread_id, _)| *thread_id == current)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// The most recent autowiring notes, oldest first
    ///
    /// At most [`MAX_DEBUG_MESSAGES`] notes are kept.
    pub fn debug_messages(&self) -> Vec<String> {
        self.debug_messages.lock().iter().cloned().collect()
    }

    pub fn clear_debug_messages(&self) {
        self.debug_messages.lock().clear();
    }

    /// Create a ready-to-use object of the specified configuration
    ///
    /// `overriding_arguments` replace configured or autowired constructor
    /// arguments at the same position. Positions start with 1 and may not
    /// exceed the highest configured position plus the number of constructor
    /// parameters.
    pub fn create_object(
        &self,
        object_name: &str,
        configuration: &ObjectConfiguration,
        overriding_arguments: &[ConfigurationArgument],
        object_manager: &dyn ObjectManager,
    ) -> Result<Instance, ObjectError> {
        let _guard = self
            .enter(object_name)
            .ok_or_else(|| ObjectError::CircularDependency(object_name.to_string()))?;
        debug!("Building object {}", object_name);

        let class = self.resolve_class(object_name, configuration.class_name())?;

        let mut constructor_arguments = configuration.get_constructor_arguments();
        let parameter_count = class
            .get_constructor()
            .map_or(0, MethodReflection::number_of_parameters);
        let highest_position = constructor_arguments
            .len()
            .checked_add(parameter_count)
            .ok_or_else(|| {
                ObjectError::cannot_build(object_name, "too many constructor arguments")
            })?;
        for argument in overriding_arguments {
            let position = argument.index();
            if position == 0 {
                return Err(ObjectError::cannot_build(
                    object_name,
                    "overriding constructor argument positions start with 1",
                ));
            }
            if position > highest_position {
                return Err(ObjectError::cannot_build(
                    object_name,
                    format!(
                        "overriding constructor argument position {} exceeds the highest position {} of {}",
                        position,
                        highest_position,
                        class.name()
                    ),
                ));
            }
            if constructor_arguments.len() < position {
                constructor_arguments.resize(position, None);
            }
            constructor_arguments[position - 1] = Some(argument.clone());
        }

        let mut properties = configuration.properties().clone();
        if configuration.auto_wiring_mode() == AutoWiringMode::On {
            self.autowire_constructor_arguments(object_name, &class, &mut constructor_arguments)?;
            self.autowire_setter_properties(object_name, &class, &mut properties)?;
        }

        let prepared = self.prepare_constructor_arguments(&constructor_arguments, object_manager)?;
        let mut object = class.new_instance(Arguments::new(prepared)).map_err(|message| {
            ObjectError::cannot_build(
                object_name,
                format!(
                    "An error occurred while instantiating class {} ({})",
                    class.name(),
                    message
                ),
            )
        })?;

        self.inject_setter_properties(
            object_name,
            &class,
            object.as_mut(),
            &properties,
            object_manager,
        )?;
        self.call_lifecycle_initialization_method(
            object_name,
            &class,
            object.as_mut(),
            configuration,
        )?;

        Ok(Instance::from_boxed(class.name(), object))
    }

    /// Rebuild an object from persisted properties without running its constructor
    pub fn reconstitute_object(
        &self,
        object_name: &str,
        configuration: &ObjectConfiguration,
        properties: &BTreeMap<String, Value>,
        object_manager: &dyn ObjectManager,
        object_factory: &dyn ObjectFactory,
    ) -> Result<Instance, ObjectError> {
        let _guard = self.enter(object_name).ok_or_else(|| {
            ObjectError::cannot_reconstitute(object_name, "circular object dependency")
        })?;
        debug!("Reconstituting object {}", object_name);

        let class_name = configuration.class_name();
        let class = self
            .reflections
            .reflect(class_name)
            .map_err(|e| ObjectError::cannot_reconstitute(object_name, e.to_string()))?;

        let context = RestoreContext::new(object_name, properties, object_manager, object_factory);
        let object = match class.restore(&context) {
            Some(Ok(object)) => object,
            Some(Err(message)) => {
                return Err(ObjectError::cannot_reconstitute(
                    object_name,
                    format!("restoring an instance of {} failed ({})", class_name, message),
                ))
            }
            None => {
                return Err(ObjectError::cannot_reconstitute(
                    object_name,
                    format!("class {} does not support external restore", class_name),
                ))
            }
        };

        Ok(Instance::from_boxed(class.name(), object))
    }

    /// Mark an object as being built; `None` if it already is
    fn enter(&self, object_name: &str) -> Option<BuildGuard<'_>> {
        let key = (thread::current().id(), object_name.to_string());
        if !self.objects_being_built.lock().insert(key.clone()) {
            return None;
        }
        Some(BuildGuard {
            objects_being_built: &self.objects_being_built,
            key,
        })
    }

    fn note(&self, message: String) {
        debug!("{}", message);
        let mut messages = self.debug_messages.lock();
        if messages.len() == MAX_DEBUG_MESSAGES {
            messages.pop_front();
        }
        messages.push_back(message);
    }

    fn resolve_class(
        &self,
        object_name: &str,
        class_name: &str,
    ) -> Result<Arc<ClassReflection>, ObjectError> {
        let class = self.reflections.reflect(class_name).map_err(|e| match e {
            ReflectionError::UnknownClass(_) => ObjectError::cannot_build(
                object_name,
                format!(
                    "No valid implementation class found (class \"{}\" does not exist)",
                    class_name
                ),
            ),
            other => other.into(),
        })?;

        if !class.is_instantiable() {
            return Err(ObjectError::cannot_build(
                object_name,
                format!("class \"{}\" is not instantiable", class_name),
            ));
        }
        Ok(class)
    }

    /// Fill constructor arguments which have not been defined yet, where possible
    fn autowire_constructor_arguments(
        &self,
        object_name: &str,
        class: &ClassReflection,
        arguments: &mut Vec<Option<ConfigurationArgument>>,
    ) -> Result<(), ObjectError> {
        let Some(constructor) = class.get_constructor() else {
            self.note(format!(
                "Autowiring for class {} disabled because no constructor was found.",
                class.name()
            ));
            return Ok(());
        };

        for parameter in constructor.parameters() {
            let index = parameter.position() + 1;
            if arguments.len() < index {
                arguments.resize(index, None);
            }
            if arguments[index - 1].is_some() {
                self.note(format!(
                    "Did not try to autowire parameter ${} in {}::{}() because it was already set.",
                    parameter.name(),
                    class.name(),
                    constructor.name()
                ));
                continue;
            }
            let argument =
                self.autowire_constructor_parameter(object_name, class, constructor, parameter)?;
            arguments[index - 1] = Some(argument);
        }
        Ok(())
    }

    fn autowire_constructor_parameter(
        &self,
        object_name: &str,
        class: &ClassReflection,
        constructor: &MethodReflection,
        parameter: &ParameterReflection,
    ) -> Result<ConfigurationArgument, ObjectError> {
        let index = parameter.position() + 1;

        if parameter.is_optional() {
            let default = parameter
                .default_value()
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            return Ok(ConfigurationArgument::straight(index, default));
        }

        if let Some(type_name) = parameter.type_hint().and_then(TypeHint::object_name) {
            if !self.reflections.class_exists(type_name) {
                return Err(ObjectError::cannot_build(
                    object_name,
                    format!(
                        "While trying to autowire the parameter ${} of the method {}::{}() the type {} could not be resolved. Please verify the definition of your constructor method in {}.",
                        parameter.name(),
                        class.name(),
                        constructor.name(),
                        type_name,
                        constructor.location()
                    ),
                ));
            }
            return Ok(ConfigurationArgument::reference(index, type_name));
        }

        if parameter.allows_null() {
            return Ok(ConfigurationArgument::straight(index, Value::null()));
        }

        self.note(format!(
            "Tried everything to autowire parameter ${} in {}::{}() but I saw no way.",
            parameter.name(),
            class.name(),
            constructor.name()
        ));
        Err(ObjectError::cannot_build(
            object_name,
            format!(
                "The required parameter ${} of {}::{}() is neither optional, nor typed with a class or interface, nor nullable and has not been configured. Please verify the definition of your constructor method in {}.",
                parameter.name(),
                class.name(),
                constructor.name(),
                constructor.location()
            ),
        ))
    }

    /// Find yet unmatched dependencies which are injected through `inject*` methods
    fn autowire_setter_properties(
        &self,
        object_name: &str,
        class: &ClassReflection,
        properties: &mut BTreeMap<String, ConfigurationProperty>,
    ) -> Result<(), ObjectError> {
        for method in class.get_public_methods() {
            let Some(remainder) = method.name().strip_prefix(INJECT_PREFIX) else {
                continue;
            };
            if remainder.is_empty() {
                continue;
            }
            let property_name = lcfirst(remainder);

            if properties.contains_key(&property_name) {
                self.note(format!(
                    "Did not try to autowire property ${} in {} because it was already set.",
                    property_name,
                    class.name()
                ));
                continue;
            }
            if method.number_of_parameters() != 1 {
                self.note(format!(
                    "Could not autowire property ${} in {} because it had not exactly one parameter.",
                    property_name,
                    class.name()
                ));
                continue;
            }

            let dependency = method.parameters()[0]
                .type_hint()
                .and_then(TypeHint::object_name)
                .filter(|type_name| self.reflections.class_exists(type_name));

            match dependency {
                Some(type_name) => {
                    let property =
                        ConfigurationProperty::reference(property_name.as_str(), type_name);
                    properties.insert(property_name, property);
                }
                None => {
                    self.note(format!(
                        "Could not autowire property ${} in {} because I could not determine the class of the setter's parameter.",
                        property_name,
                        class.name()
                    ));
                    if !method.is_tagged_with(OPTIONAL_TAG) {
                        return Err(ObjectError::cannot_build(
                            object_name,
                            format!(
                                "While trying to autowire the required property ${} in class {} the type of the setter's parameter could not be determined. Please verify the definition of your setter method in {}.",
                                property_name,
                                class.name(),
                                method.location()
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve constructor arguments into the values passed to the constructor
    fn prepare_constructor_arguments(
        &self,
        arguments: &[Option<ConfigurationArgument>],
        object_manager: &dyn ObjectManager,
    ) -> Result<Vec<Value>, ObjectError> {
        arguments
            .iter()
            .map(|slot| match slot {
                Some(argument) => self.resolve_value(argument.value(), object_manager),
                None => Ok(Value::null()),
            })
            .collect()
    }

    fn resolve_value(
        &self,
        value: &ConfigurationValue,
        object_manager: &dyn ObjectManager,
    ) -> Result<Value, ObjectError> {
        match value {
            ConfigurationValue::Straight(value) => Ok(value.clone()),
            ConfigurationValue::Reference(object_name) => {
                object_manager.get_object(object_name).map(Value::Object)
            }
        }
    }

    /// Inject properties through `inject<Name>` or else `set<Name>`; others are skipped
    fn inject_setter_properties(
        &self,
        object_name: &str,
        class: &ClassReflection,
        object: &mut (dyn Any + Send + Sync),
        properties: &BTreeMap<String, ConfigurationProperty>,
        object_manager: &dyn ObjectManager,
    ) -> Result<(), ObjectError> {
        for (property_name, property) in properties {
            let value = self.resolve_value(property.value(), object_manager)?;

            let suffix = ucfirst(property_name);
            let inject_method = format!("{}{}", INJECT_PREFIX, suffix);
            let set_method = format!("{}{}", SET_PREFIX, suffix);
            let method = if class.has_method(&inject_method) {
                inject_method
            } else if class.has_method(&set_method) {
                set_method
            } else {
                self.note(format!(
                    "Did not inject property ${} into {} because it has neither {}() nor {}().",
                    property_name,
                    class.name(),
                    inject_method,
                    set_method
                ));
                continue;
            };

            if let Some(Err(message)) = class.invoke(object, &method, Arguments::new(vec![value])) {
                return Err(ObjectError::cannot_build(
                    object_name,
                    format!(
                        "Injecting property ${} through {}::{}() failed ({})",
                        property_name,
                        class.name(),
                        method,
                        message
                    ),
                ));
            }
        }
        Ok(())
    }

    fn call_lifecycle_initialization_method(
        &self,
        object_name: &str,
        class: &ClassReflection,
        object: &mut (dyn Any + Send + Sync),
        configuration: &ObjectConfiguration,
    ) -> Result<(), ObjectError> {
        let method = configuration.lifecycle_initialization_method();
        if let Some(Err(message)) = class.invoke(object, method, Arguments::default()) {
            return Err(ObjectError::cannot_build(
                object_name,
                format!(
                    "The lifecycle initialization method {}::{}() failed ({})",
                    class.name(),
                    method,
                    message
                ),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ObjectBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBuilder")
            .field("objects_being_built", &self.objects_being_built())
            .finish()
    }
}

fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ClassLoader;

    fn builder() -> ObjectBuilder {
        ObjectBuilder::new(Arc::new(ReflectionClassFactory::new(Arc::new(
            ClassLoader::new(),
        ))))
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(lcfirst("LoggerFactory"), "loggerFactory");
        assert_eq!(ucfirst("loggerFactory"), "LoggerFactory");
        assert_eq!(lcfirst(""), "");
        assert_eq!(ucfirst("x"), "X");
    }

    #[test]
    fn test_build_guard_releases_on_drop() {
        let builder = builder();
        {
            let _guard = builder.enter("Acme\\A").unwrap();
            assert!(builder.is_building("Acme\\A"));
            assert!(builder.enter("Acme\\A").is_none());
            let _inner = builder.enter("Acme\\B").unwrap();
            assert_eq!(builder.objects_being_built(), vec!["Acme\\A", "Acme\\B"]);
        }
        assert!(builder.objects_being_built().is_empty());
        assert!(builder.enter("Acme\\A").is_some());
    }

    #[test]
    fn test_build_chains_are_per_thread() {
        let builder = builder();
        let _guard = builder.enter("Acme\\A").unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                assert!(!builder.is_building("Acme\\A"));
                assert!(builder.enter("Acme\\A").is_some());
            });
        });
        assert!(builder.is_building("Acme\\A"));
    }

    #[test]
    fn test_debug_messages() {
        let builder = builder();
        builder.note("first".to_string());
        builder.note("second".to_string());
        assert_eq!(builder.debug_messages(), vec!["first", "second"]);
        builder.clear_debug_messages();
        assert!(builder.debug_messages().is_empty());
    }

    #[test]
    fn test_debug_messages_are_bounded() {
        let builder = builder();
        for i in 0..MAX_DEBUG_MESSAGES + 10 {
            builder.note(format!("note {}", i));
        }
        let messages = builder.debug_messages();
        assert_eq!(messages.len(), MAX_DEBUG_MESSAGES);
        assert_eq!(messages[0], "note 10");
        assert_eq!(
            messages.last().map(String::as_str),
            Some(format!("note {}", MAX_DEBUG_MESSAGES + 9).as_str())
        );
    }
}
