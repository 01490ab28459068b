//! Object definitions (Objects.toml)
//!
//! Declarative object configurations:
//!
//! ```toml
//! [objects."Acme\\MailerInterface"]
//! class = "Acme\\SmtpMailer"
//! scope = "prototype"
//! autowiring = false
//! lifecycle-initialization-method = "initializeObject"
//!
//! [objects."Acme\\MailerInterface".arguments]
//! 1 = { object = "Acme\\Transport" }
//! 2 = { value = 25 }
//!
//! [objects."Acme\\MailerInterface".properties]
//! sender = { value = "noreply@example.com" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::argument::{ConfigurationArgument, ConfigurationProperty, ConfigurationValue};
use super::configuration::{AutoWiringMode, ObjectConfiguration, Scope};
use crate::value::Value;

/// Errors that can occur while loading object definitions
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Failed to read the definition file
    #[error("Failed to read object definitions: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse object definitions: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid object definition for \"{object_name}\": {reason}")]
    Invalid { object_name: String, reason: String },
}

/// A configured value: `{ object = "Name" }` or `{ value = ... }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ValueDefinition {
    /// Reference to another object
    Object(String),
    /// Literal value
    Value(serde_json::Value),
}

impl From<&ValueDefinition> for ConfigurationValue {
    fn from(definition: &ValueDefinition) -> Self {
        match definition {
            ValueDefinition::Object(name) => ConfigurationValue::Reference(name.clone()),
            ValueDefinition::Value(value) => {
                ConfigurationValue::Straight(Value::Literal(value.clone()))
            }
        }
    }
}

/// Definition of a single object
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ObjectDefinition {
    /// Implementation class (defaults to the object name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// "prototype", "singleton" or "session"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Whether to autowire missing dependencies (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autowiring: Option<bool>,

    /// Method called after injection (default: "initializeObject")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_initialization_method: Option<String>,

    /// Constructor arguments by position, starting with "1"
    #[serde(default)]
    pub arguments: BTreeMap<String, ValueDefinition>,

    /// Injected properties by name
    #[serde(default)]
    pub properties: BTreeMap<String, ValueDefinition>,
}

/// A set of object definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObjectDefinitions {
    /// Definitions by object name
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectDefinition>,

    /// Where the definitions were loaded from
    #[serde(skip)]
    source: Option<String>,
}

impl ObjectDefinitions {
    /// Load definitions from a file
    pub fn from_file(path: &Path) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        let mut definitions = Self::from_str(&content)?;
        definitions.source = Some(path.display().to_string());
        Ok(definitions)
    }

    /// Parse definitions from TOML
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, DefinitionError> {
        let definitions: ObjectDefinitions = toml::from_str(content)?;
        definitions.validate()?;
        Ok(definitions)
    }

    /// Where the definitions were loaded from, if from a file
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Check every definition for values the configuration would reject
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (object_name, definition) in &self.objects {
            self.convert(object_name, definition)?;
        }
        Ok(())
    }

    /// Convert all definitions into object configurations
    pub fn to_configurations(&self) -> Result<Vec<ObjectConfiguration>, DefinitionError> {
        self.objects
            .iter()
            .map(|(object_name, definition)| self.convert(object_name, definition))
            .collect()
    }

    fn convert(
        &self,
        object_name: &str,
        definition: &ObjectDefinition,
    ) -> Result<ObjectConfiguration, DefinitionError> {
        let invalid = |reason: String| DefinitionError::Invalid {
            object_name: object_name.to_string(),
            reason,
        };

        if object_name.is_empty() {
            return Err(invalid("object name cannot be empty".to_string()));
        }

        let mut configuration = ObjectConfiguration::new(object_name, definition.class.as_deref());
        configuration.set_configuration_source_hint(self.source().unwrap_or("object definitions"));

        if let Some(scope) = &definition.scope {
            let scope: Scope = scope.parse().map_err(|e| invalid(format!("{}", e)))?;
            configuration.set_scope(scope);
        }
        if let Some(autowiring) = definition.autowiring {
            configuration.set_auto_wiring_mode(if autowiring {
                AutoWiringMode::On
            } else {
                AutoWiringMode::Off
            });
        }
        if let Some(method) = &definition.lifecycle_initialization_method {
            configuration
                .set_lifecycle_initialization_method(method)
                .map_err(|e| invalid(e.to_string()))?;
        }

        let arguments = definition
            .arguments
            .iter()
            .map(|(position, value)| -> Result<ConfigurationArgument, DefinitionError> {
                let index: usize = position.parse().map_err(|_| {
                    invalid(format!("argument position \"{}\" is not a number", position))
                })?;
                Ok(ConfigurationArgument::new(index, value.into()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        configuration
            .set_constructor_arguments(arguments)
            .map_err(|e| invalid(e.to_string()))?;

        configuration.set_properties(
            definition
                .properties
                .iter()
                .map(|(name, value)| ConfigurationProperty::new(name.as_str(), value.into()))
                .collect(),
        );

        Ok(configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITIONS: &str = r#"
[objects."Acme\\MailerInterface"]
class = "Acme\\SmtpMailer"
scope = "prototype"
autowiring = false
lifecycle-initialization-method = "boot"

[objects."Acme\\MailerInterface".arguments]
1 = { object = "Acme\\Transport" }
3 = { value = 25 }

[objects."Acme\\MailerInterface".properties]
sender = { value = "noreply@example.com" }
logger = { object = "Acme\\Logger" }

[objects."Acme\\Transport"]
"#;

    #[test]
    fn test_parse_definitions() {
        let definitions = ObjectDefinitions::from_str(DEFINITIONS).unwrap();
        assert_eq!(definitions.objects.len(), 2);
        assert!(definitions.source().is_none());

        let mailer = &definitions.objects["Acme\\MailerInterface"];
        assert_eq!(mailer.class.as_deref(), Some("Acme\\SmtpMailer"));
        assert_eq!(
            mailer.arguments["1"],
            ValueDefinition::Object("Acme\\Transport".to_string())
        );
        assert_eq!(
            mailer.arguments["3"],
            ValueDefinition::Value(serde_json::json!(25))
        );
    }

    #[test]
    fn test_to_configurations() {
        let definitions = ObjectDefinitions::from_str(DEFINITIONS).unwrap();
        let configurations = definitions.to_configurations().unwrap();
        assert_eq!(configurations.len(), 2);

        let mailer = &configurations[0];
        assert_eq!(mailer.object_name(), "Acme\\MailerInterface");
        assert_eq!(mailer.class_name(), "Acme\\SmtpMailer");
        assert_eq!(mailer.scope(), Scope::Prototype);
        assert_eq!(mailer.auto_wiring_mode(), AutoWiringMode::Off);
        assert_eq!(mailer.lifecycle_initialization_method(), "boot");
        assert_eq!(mailer.configuration_source_hint(), "object definitions");

        let arguments = mailer.get_constructor_arguments();
        assert_eq!(arguments.len(), 3);
        assert_eq!(
            arguments[0],
            Some(ConfigurationArgument::reference(1, "Acme\\Transport"))
        );
        assert!(arguments[1].is_none());
        assert_eq!(
            arguments[2],
            Some(ConfigurationArgument::straight(3, serde_json::json!(25)))
        );

        assert_eq!(
            mailer.properties()["logger"],
            ConfigurationProperty::reference("logger", "Acme\\Logger")
        );

        let transport = &configurations[1];
        assert_eq!(transport.class_name(), "Acme\\Transport");
        assert_eq!(transport.scope(), Scope::Singleton);
        assert_eq!(transport.auto_wiring_mode(), AutoWiringMode::On);
    }

    #[test]
    fn test_invalid_scope() {
        let result = ObjectDefinitions::from_str(
            r#"
[objects.Foo]
scope = "request"
"#,
        );
        assert!(matches!(result, Err(DefinitionError::Invalid { .. })));
    }

    #[test]
    fn test_invalid_argument_position() {
        for position in ["first", "0"] {
            let content = format!("[objects.Foo.arguments]\n{} = {{ value = 1 }}\n", position);
            let result = ObjectDefinitions::from_str(&content);
            assert!(
                matches!(result, Err(DefinitionError::Invalid { .. })),
                "position {} should be rejected",
                position
            );
        }
    }

    #[test]
    fn test_argument_position_out_of_range() {
        let result = ObjectDefinitions::from_str(
            "[objects.Foo.arguments]\n1099511627776 = { value = 1 }\n",
        );
        match result {
            Err(DefinitionError::Invalid { object_name, reason }) => {
                assert_eq!(object_name, "Foo");
                assert!(reason.contains("1099511627776"));
            }
            other => panic!("expected an invalid definition, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ObjectDefinitions::from_str("[objects.Foo]\nfactory = \"x\"\n");
        assert!(matches!(result, Err(DefinitionError::Parse(_))));
    }

    #[test]
    fn test_empty_document() {
        let definitions = ObjectDefinitions::from_str("").unwrap();
        assert!(definitions.objects.is_empty());
        assert!(definitions.to_configurations().unwrap().is_empty());
    }
}
