//! Object Framework
//!
//! Dependency injection for registered classes:
//! - [`ObjectConfiguration`]: how one named object is built
//! - [`ObjectBuilder`]: resolves, instantiates, injects and initialises objects
//! - [`ObjectContainer`]: scope-aware registry that feeds configurations to
//!   the builder and serves as its object manager
//! - [`ObjectDefinitions`]: object configurations loaded from TOML

mod argument;
mod builder;
mod configuration;
mod definition;
mod error;
mod manager;
mod restore;
mod session;

pub use argument::{ConfigurationArgument, ConfigurationProperty, ConfigurationValue};
pub use builder::{ObjectBuilder, MAX_DEBUG_MESSAGES};
pub use configuration::{
    AutoWiringMode, ObjectConfiguration, Scope, DEFAULT_LIFECYCLE_INITIALIZATION_METHOD,
    MAX_CONSTRUCTOR_ARGUMENT_POSITION,
};
pub use definition::{DefinitionError, ObjectDefinition, ObjectDefinitions, ValueDefinition};
pub use error::ObjectError;
pub use manager::{ObjectContainer, ObjectFactory, ObjectManager};
pub use restore::{RestoreContext, SupportsExternalRestore};
pub use session::{InMemorySessionStore, SessionStore};
