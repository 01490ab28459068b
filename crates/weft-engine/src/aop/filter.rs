//! Pointcut filters

use regex::Regex;
use tracing::trace;

use super::error::AopError;
use crate::reflect::{ClassReflection, MethodReflection};

/// Identifies one evaluation of a pointcut expression
///
/// Composite pointcut evaluators use it to detect circular references.
pub type QueryId = u64;

/// A predicate over join points
pub trait PointcutFilter: Send + Sync {
    /// Check whether the advice applies to `method` of `class`
    fn matches(
        &self,
        class: &ClassReflection,
        method: &MethodReflection,
        query_id: QueryId,
    ) -> Result<bool, AopError>;
}

/// Matches methods carrying a tag whose name matches a regular expression
///
/// The expression must match the whole tag name. It uses the syntax of the
/// `regex` crate, which has no lookaround and no backreferences: `(?!x).*`
/// or `(a)\1` are invalid expressions. An invalid expression is reported on
/// every call to [`matches`](PointcutFilter::matches), whatever tags the
/// method carries.
#[derive(Debug, Clone)]
pub struct PointcutMethodTaggedWithFilter {
    expression: String,
    pattern: Result<Regex, regex::Error>,
}

impl PointcutMethodTaggedWithFilter {
    pub fn new(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        let pattern = Regex::new(&format!("^(?:{})$", expression));
        Self {
            expression,
            pattern,
        }
    }

    /// The tag name expression as configured
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Check the expression without matching anything
    pub fn validate(&self) -> Result<(), AopError> {
        self.pattern().map(|_| ())
    }

    fn pattern(&self) -> Result<&Regex, AopError> {
        self.pattern
            .as_ref()
            .map_err(|e| AopError::PointcutExpression {
                expression: self.expression.clone(),
                source: e.clone(),
            })
    }
}

impl PointcutFilter for PointcutMethodTaggedWithFilter {
    fn matches(
        &self,
        class: &ClassReflection,
        method: &MethodReflection,
        _query_id: QueryId,
    ) -> Result<bool, AopError> {
        let pattern = self.pattern()?;
        let matched = method.tags_values().keys().any(|tag| pattern.is_match(tag));
        if matched {
            trace!(
                "Method {}::{} matches tag filter \"{}\"",
                class.name(),
                method.name(),
                self.expression
            );
        }
        Ok(matched)
    }
}

/// Methods of `class` selected by `filter`, in declaration order
pub fn matching_methods<'c>(
    filter: &dyn PointcutFilter,
    class: &'c ClassReflection,
    query_id: QueryId,
) -> Result<Vec<&'c MethodReflection>, AopError> {
    let mut matched = Vec::new();
    for method in class.get_methods() {
        if filter.matches(class, method, query_id)? {
            matched.push(method);
        }
    }
    Ok(matched)
}
