//! Object framework errors

use thiserror::Error;

use crate::reflect::ReflectionError;

/// Errors that can occur while configuring or building objects
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ObjectError {
    /// The object is already being built further up the current build chain
    #[error("Circular object dependency for object \"{0}\"")]
    CircularDependency(String),

    /// The object could not be built
    #[error("Cannot build object \"{object_name}\": {reason}")]
    CannotBuildObject { object_name: String, reason: String },

    /// The object could not be reconstituted
    #[error("Cannot reconstitute object \"{object_name}\": {reason}")]
    CannotReconstituteObject { object_name: String, reason: String },

    /// No configuration and no class exist for the object name
    #[error("Unknown object \"{0}\"")]
    UnknownObject(String),

    /// A configuration value was rejected
    #[error("Invalid object configuration: {0}")]
    InvalidConfiguration(String),

    /// Reflection lookup failed
    #[error(transparent)]
    Reflection(#[from] ReflectionError),
}

impl ObjectError {
    pub(crate) fn cannot_build(object_name: &str, reason: impl Into<String>) -> Self {
        ObjectError::CannotBuildObject {
            object_name: object_name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn cannot_reconstitute(object_name: &str, reason: impl Into<String>) -> Self {
        ObjectError::CannotReconstituteObject {
            object_name: object_name.to_string(),
            reason: reason.into(),
        }
    }
}
