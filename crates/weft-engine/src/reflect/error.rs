//! Reflection errors

use thiserror::Error;

/// Errors raised by the reflection layer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReflectionError {
    /// The reflection source does not know the requested class
    #[error("Class \"{0}\" does not exist")]
    UnknownClass(String),

    /// A bulk operation was handed an unusable reflection
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
