//! AOP errors

use thiserror::Error;

/// Errors raised while evaluating pointcuts
#[derive(Debug, Clone, Error)]
pub enum AopError {
    /// A filter pattern is not a valid regular expression
    #[error("Invalid pointcut expression \"{expression}\": {source}")]
    PointcutExpression {
        expression: String,
        #[source]
        source: regex::Error,
    },
}
