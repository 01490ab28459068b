//! Object configuration
//!
//! Describes how one named object is built: its implementation class, scope,
//! autowiring mode, constructor arguments, injected properties and lifecycle
//! initialization method.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::argument::{ConfigurationArgument, ConfigurationProperty};
use super::error::ObjectError;
use crate::reflect::SourceLocation;

/// Default name of the lifecycle initialization method
pub const DEFAULT_LIFECYCLE_INITIALIZATION_METHOD: &str = "initializeObject";

/// Highest accepted constructor argument position
pub const MAX_CONSTRUCTOR_ARGUMENT_POSITION: usize = 255;

/// Lifetime policy of an object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A new instance per request
    Prototype,
    /// One instance per container
    #[default]
    Singleton,
    /// One instance per session
    Session,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Prototype => "prototype",
            Scope::Singleton => "singleton",
            Scope::Session => "session",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prototype" => Ok(Scope::Prototype),
            "singleton" => Ok(Scope::Singleton),
            "session" => Ok(Scope::Session),
            other => Err(ObjectError::InvalidConfiguration(format!(
                "unknown scope \"{}\"",
                other
            ))),
        }
    }
}

/// Whether missing dependencies are inferred from reflection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AutoWiringMode {
    #[default]
    On,
    Off,
}

/// How to build one named object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectConfiguration {
    object_name: String,
    class_name: String,
    scope: Scope,
    auto_wiring_mode: AutoWiringMode,
    constructor_arguments: BTreeMap<usize, ConfigurationArgument>,
    properties: BTreeMap<String, ConfigurationProperty>,
    lifecycle_initialization_method: String,
    configuration_source_hint: String,
}

impl ObjectConfiguration {
    /// Create a configuration; the class name defaults to the object name
    ///
    /// The source hint defaults to the location this was called from.
    #[track_caller]
    pub fn new(object_name: &str, class_name: Option<&str>) -> Self {
        Self {
            object_name: object_name.to_string(),
            class_name: class_name.unwrap_or(object_name).to_string(),
            scope: Scope::default(),
            auto_wiring_mode: AutoWiringMode::default(),
            constructor_arguments: BTreeMap::new(),
            properties: BTreeMap::new(),
            lifecycle_initialization_method: DEFAULT_LIFECYCLE_INITIALIZATION_METHOD.to_string(),
            configuration_source_hint: SourceLocation::caller().to_string(),
        }
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn set_class_name(&mut self, class_name: &str) {
        self.class_name = class_name.to_string();
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn set_auto_wiring_mode(&mut self, mode: AutoWiringMode) {
        self.auto_wiring_mode = mode;
    }

    pub fn auto_wiring_mode(&self) -> AutoWiringMode {
        self.auto_wiring_mode
    }

    /// Set the method called after all dependencies are injected
    pub fn set_lifecycle_initialization_method(&mut self, method: &str) -> Result<(), ObjectError> {
        if method.is_empty() {
            return Err(ObjectError::InvalidConfiguration(
                "the lifecycle initialization method name must not be empty".to_string(),
            ));
        }
        self.lifecycle_initialization_method = method.to_string();
        Ok(())
    }

    pub fn lifecycle_initialization_method(&self) -> &str {
        &self.lifecycle_initialization_method
    }

    /// Replace all injected properties
    pub fn set_properties(&mut self, properties: Vec<ConfigurationProperty>) {
        self.properties = properties
            .into_iter()
            .map(|property| (property.name().to_string(), property))
            .collect();
    }

    /// Add or replace a single injected property
    pub fn set_property(&mut self, property: ConfigurationProperty) {
        self.properties.insert(property.name().to_string(), property);
    }

    /// Injected properties by name
    pub fn properties(&self) -> &BTreeMap<String, ConfigurationProperty> {
        &self.properties
    }

    /// Merge constructor arguments by index; an empty list removes all arguments
    pub fn set_constructor_arguments(
        &mut self,
        arguments: Vec<ConfigurationArgument>,
    ) -> Result<(), ObjectError> {
        if arguments.is_empty() {
            self.constructor_arguments.clear();
            return Ok(());
        }
        if let Some(invalid) = arguments.iter().find(|a| !is_valid_position(a.index())) {
            return Err(invalid_index(invalid));
        }
        for argument in arguments {
            self.constructor_arguments.insert(argument.index(), argument);
        }
        Ok(())
    }

    /// Add or replace a single constructor argument
    pub fn set_constructor_argument(
        &mut self,
        argument: ConfigurationArgument,
    ) -> Result<(), ObjectError> {
        if !is_valid_position(argument.index()) {
            return Err(invalid_index(&argument));
        }
        self.constructor_arguments.insert(argument.index(), argument);
        Ok(())
    }

    /// Constructor arguments as a dense list
    ///
    /// Element `i` holds the argument at position `i + 1`; positions without
    /// a configured argument are `None`.
    pub fn get_constructor_arguments(&self) -> Vec<Option<ConfigurationArgument>> {
        let count = self
            .constructor_arguments
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0);
        (1..=count)
            .map(|index| self.constructor_arguments.get(&index).cloned())
            .collect()
    }

    /// Set a hint about where this configuration was created
    pub fn set_configuration_source_hint(&mut self, hint: &str) {
        self.configuration_source_hint = hint.to_string();
    }

    pub fn configuration_source_hint(&self) -> &str {
        &self.configuration_source_hint
    }
}

fn is_valid_position(index: usize) -> bool {
    (1..=MAX_CONSTRUCTOR_ARGUMENT_POSITION).contains(&index)
}

fn invalid_index(argument: &ConfigurationArgument) -> ObjectError {
    ObjectError::InvalidConfiguration(format!(
        "constructor argument positions range from 1 to {}, got {} ({:?})",
        MAX_CONSTRUCTOR_ARGUMENT_POSITION,
        argument.index(),
        argument.value()
    ))
}
