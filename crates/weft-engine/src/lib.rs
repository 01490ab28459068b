//! Weft Object Framework
//!
//! This crate provides the object-construction core of the Weft framework:
//! - Class reflection (constructors, methods, parameters, tags) and a
//!   memoising reflection cache
//! - Object configurations (scope, autowiring, constructor arguments,
//!   injected properties, lifecycle method)
//! - The object builder: autowiring, constructor and setter injection,
//!   circular dependency detection, lifecycle calls and reconstitution
//! - A reference object container with singleton, session and prototype scopes
//! - Pointcut filters that select join points by method tags
//!
//! # Example
//!
//! ```ignore
//! use weft_engine::{ClassDefinition, ClassLoader, ObjectContainer, ReflectionClassFactory};
//!
//! let loader = ClassLoader::new();
//! loader.register(ClassDefinition::<Clock>::new("Acme\\Clock").default_constructor());
//!
//! let container = ObjectContainer::new(Arc::new(ReflectionClassFactory::new(Arc::new(loader))));
//! let clock = container.get_object("Acme\\Clock")?;
//! ```

pub mod aop;
pub mod object;
pub mod reflect;
pub mod value;

pub use aop::{matching_methods, AopError, PointcutFilter, PointcutMethodTaggedWithFilter, QueryId};
pub use object::{
    AutoWiringMode, ConfigurationArgument, ConfigurationProperty, ConfigurationValue,
    DefinitionError, InMemorySessionStore, ObjectBuilder, ObjectConfiguration, ObjectContainer,
    ObjectDefinition, ObjectDefinitions, ObjectError, ObjectFactory, ObjectManager, RestoreContext,
    Scope, SessionStore, SupportsExternalRestore, ValueDefinition,
    DEFAULT_LIFECYCLE_INITIALIZATION_METHOD, MAX_CONSTRUCTOR_ARGUMENT_POSITION,
    MAX_DEBUG_MESSAGES,
};
pub use reflect::{
    ClassDefinition, ClassKind, ClassLoader, ClassReflection, MethodReflection,
    ParameterReflection, ReflectionClassFactory, ReflectionError, ReflectionSource,
    SourceLocation, TypeHint, Visibility,
};
pub use value::{Arguments, Instance, Value};
