//! Class registration
//!
//! Rust has no runtime reflection, so classes are registered explicitly: a
//! [`ClassDefinition`] describes a type's constructor, methods, tags and
//! interfaces, and wires typed closures into the dispatch tables the builder
//! uses for construction, injection and lifecycle calls.

use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use super::class_reflection::{
    ClassReflection, ConstructorFn, MethodFn, MethodReflection, ParameterReflection, RestoreFn,
};
use crate::object::{RestoreContext, SupportsExternalRestore};
use crate::value::{Arguments, ObjectBox};

/// Name under which constructors are reflected
const CONSTRUCTOR_NAME: &str = "new";

/// The reflection facade: produces class reflections by name
pub trait ReflectionSource: Send + Sync {
    /// Build a reflection of the named class or interface
    fn reflect_class(&self, class_name: &str) -> Option<ClassReflection>;

    /// Check whether a class or interface of this name exists
    fn type_exists(&self, type_name: &str) -> bool {
        self.reflect_class(type_name).is_some()
    }
}

/// Registry of class and interface reflections
#[derive(Debug, Default)]
pub struct ClassLoader {
    classes: RwLock<FxHashMap<String, ClassReflection>>,
}

impl ClassLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class definition (replaces a previous one of the same name)
    pub fn register<T: Any + Send + Sync>(&self, definition: ClassDefinition<T>) {
        self.register_reflection(definition.build());
    }

    /// Register a prebuilt reflection
    pub fn register_reflection(&self, reflection: ClassReflection) {
        trace!("Registered {:?} {}", reflection.kind(), reflection.name());
        self.classes
            .write()
            .insert(reflection.name().to_string(), reflection);
    }

    /// Register an interface by name
    pub fn register_interface(&self, name: &str) {
        self.register_reflection(ClassReflection::interface(name));
    }

    /// Check if a class or interface is registered
    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    /// Names of all registered types, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }
}

impl ReflectionSource for ClassLoader {
    fn reflect_class(&self, class_name: &str) -> Option<ClassReflection> {
        self.classes.read().get(class_name).cloned()
    }

    fn type_exists(&self, type_name: &str) -> bool {
        self.contains(type_name)
    }
}

/// Typed builder for a class reflection and its dispatch tables
pub struct ClassDefinition<T> {
    reflection: ClassReflection,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ClassDefinition<T> {
    /// Start a definition for the class `name`
    pub fn new(name: &str) -> Self {
        Self {
            reflection: ClassReflection::new(name),
            _marker: PhantomData,
        }
    }

    /// Declare an implemented interface
    pub fn implements(mut self, interface: &str) -> Self {
        self.reflection.add_interface(interface.to_string());
        self
    }

    /// Declare the constructor and its handler
    #[track_caller]
    pub fn constructor<F>(mut self, parameters: Vec<ParameterReflection>, constructor: F) -> Self
    where
        F: Fn(Arguments) -> Result<T, String> + Send + Sync + 'static,
    {
        self.reflection
            .set_constructor(MethodReflection::new(CONSTRUCTOR_NAME).with_parameters(parameters));
        let constructor: ConstructorFn = Arc::new(move |arguments: Arguments| {
            constructor(arguments).map(|object| Box::new(object) as ObjectBox)
        });
        self.reflection.runtime.constructor = Some(constructor);
        self
    }

    /// Declare a handler for objects without an explicit constructor
    pub fn default_constructor(mut self) -> Self
    where
        T: Default,
    {
        let constructor: ConstructorFn =
            Arc::new(|_: Arguments| Ok(Box::new(T::default()) as ObjectBox));
        self.reflection.runtime.constructor = Some(constructor);
        self
    }

    /// Declare a method together with its handler
    pub fn method<F>(mut self, method: MethodReflection, handler: F) -> Self
    where
        F: Fn(&mut T, Arguments) -> Result<(), String> + Send + Sync + 'static,
    {
        let handler: MethodFn = Arc::new(
            move |object: &mut (dyn Any + Send + Sync), arguments: Arguments| {
                let this = object
                    .downcast_mut::<T>()
                    .ok_or_else(|| format!("receiver is not a {}", type_name::<T>()))?;
                handler(this, arguments)
            },
        );
        self.reflection
            .runtime
            .handlers
            .insert(method.name().to_string(), handler);
        self.reflection.add_method(method);
        self
    }

    /// Declare method metadata without a callable handler
    pub fn declare_method(mut self, method: MethodReflection) -> Self {
        self.reflection.add_method(method);
        self
    }

    /// Allow objects of this class to be reconstituted
    pub fn restorable(mut self) -> Self
    where
        T: SupportsExternalRestore,
    {
        let restore: RestoreFn = Arc::new(|context: &RestoreContext<'_>| {
            T::restore_from(context).map(|object| Box::new(object) as ObjectBox)
        });
        self.reflection.runtime.restore = Some(restore);
        self
    }

    /// Finish the definition
    pub fn build(self) -> ClassReflection {
        self.reflection
    }
}
