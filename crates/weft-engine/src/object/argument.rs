//! Constructor arguments and injected properties of an object configuration

use crate::value::Value;

/// A configured value: used as is, or resolved through the object manager
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationValue {
    /// Passed on literally
    Straight(Value),
    /// Name of another object to fetch from the object manager
    Reference(String),
}

impl ConfigurationValue {
    pub fn is_reference(&self) -> bool {
        matches!(self, ConfigurationValue::Reference(_))
    }
}

/// A constructor argument, positioned from 1
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationArgument {
    index: usize,
    value: ConfigurationValue,
}

impl ConfigurationArgument {
    pub fn new(index: usize, value: ConfigurationValue) -> Self {
        Self { index, value }
    }

    /// A literal (or already built) argument
    pub fn straight(index: usize, value: impl Into<Value>) -> Self {
        Self::new(index, ConfigurationValue::Straight(value.into()))
    }

    /// An argument referring to another object
    pub fn reference(index: usize, object_name: impl Into<String>) -> Self {
        Self::new(index, ConfigurationValue::Reference(object_name.into()))
    }

    /// Position of the argument, starting with 1
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&self) -> &ConfigurationValue {
        &self.value
    }
}

/// A property injected after construction
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationProperty {
    name: String,
    value: ConfigurationValue,
}

impl ConfigurationProperty {
    pub fn new(name: impl Into<String>, value: ConfigurationValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// A literal (or already built) property value
    pub fn straight(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, ConfigurationValue::Straight(value.into()))
    }

    /// A property referring to another object
    pub fn reference(name: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self::new(name, ConfigurationValue::Reference(object_name.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ConfigurationValue {
        &self.value
    }
}
