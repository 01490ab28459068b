//! Class Reflection
//!
//! This module provides the reflection facade consumed by the object builder
//! and the pointcut filters: class, constructor, method and parameter
//! metadata, declared tags, and the per-class dispatch tables that replace
//! dynamic method invocation.
//!
//! ## Layers
//!
//! - [`ClassReflection`] and friends: the metadata model
//! - [`ReflectionSource`]: the facade contract ("reflect this class name")
//! - [`ClassLoader`]: the in-memory source classes are registered with,
//!   through [`ClassDefinition`]
//! - [`ReflectionClassFactory`]: the memoising cache in front of a source
//!
//! ## Usage
//!
//! ```ignore
//! let loader = ClassLoader::new();
//! loader.register(
//!     ClassDefinition::<Greeter>::new("Acme\\Greeter")
//!         .constructor(vec![ParameterReflection::scalar("name", "string")], |args| {
//!             Ok(Greeter::new(args.string(0)?))
//!         })
//!         .method(
//!             MethodReflection::new("greet").with_tag("session", ["user"]),
//!             |greeter, _| { greeter.greet(); Ok(()) },
//!         ),
//! );
//!
//! let factory = ReflectionClassFactory::new(Arc::new(loader));
//! let class = factory.reflect("Acme\\Greeter")?;
//! ```

mod class_loader;
mod class_reflection;
mod error;
mod factory;

pub use class_loader::{ClassDefinition, ClassLoader, ReflectionSource};
pub use class_reflection::{
    ClassKind, ClassReflection, ConstructorFn, MethodFn, MethodReflection, ParameterReflection,
    RestoreFn, SourceLocation, TypeHint, Visibility,
};
pub use error::ReflectionError;
pub use factory::ReflectionClassFactory;
