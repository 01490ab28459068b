//! Runtime values handled by the object framework
//!
//! A [`Value`] is either a literal (any JSON-shaped datum coming from
//! configuration) or an [`Instance`] of a built object. Constructors and
//! methods registered on a class receive their inputs as [`Arguments`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Owned, type-erased object as produced by a class constructor
pub type ObjectBox = Box<dyn Any + Send + Sync>;

/// A built object together with the name of the class it was built from
///
/// Cloning an instance is cheap and yields a handle to the same object.
#[derive(Clone)]
pub struct Instance {
    class_name: Arc<str>,
    object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wrap a concrete value
    pub fn new<T: Any + Send + Sync>(class_name: &str, object: T) -> Self {
        Self {
            class_name: Arc::from(class_name),
            object: Arc::new(object),
        }
    }

    /// Wrap an already boxed object (the builder's path after injection)
    pub fn from_boxed(class_name: &str, object: ObjectBox) -> Self {
        Self {
            class_name: Arc::from(class_name),
            object: Arc::from(object),
        }
    }

    /// Name of the implementation class
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Borrow the object as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    /// Get a shared handle to the object as `T`
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.object).downcast::<T>().ok()
    }

    /// Check whether the object is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.object.is::<T>()
    }

    /// Identity comparison
    pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
        Arc::ptr_eq(&a.object, &b.object)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class_name", &self.class_name)
            .field("ptr", &Arc::as_ptr(&self.object))
            .finish()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Instance::ptr_eq(self, other)
    }
}

/// A value passed to constructors, injection methods and restore hooks
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A literal datum (string, number, list, map, null ...)
    Literal(serde_json::Value),
    /// A built object
    Object(Instance),
}

impl Value {
    /// The null literal
    pub fn null() -> Self {
        Value::Literal(serde_json::Value::Null)
    }

    /// Check for the null literal
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Literal(serde_json::Value::Null))
    }

    /// Get the literal, if this is one
    pub fn as_literal(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Literal(literal) => Some(literal),
            Value::Object(_) => None,
        }
    }

    /// Get the instance, if this is one
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            Value::Literal(_) => None,
        }
    }

    /// Short description used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Literal(serde_json::Value::Null) => "null",
            Value::Literal(serde_json::Value::Bool(_)) => "bool",
            Value::Literal(serde_json::Value::Number(_)) => "number",
            Value::Literal(serde_json::Value::String(_)) => "string",
            Value::Literal(serde_json::Value::Array(_)) => "array",
            Value::Literal(serde_json::Value::Object(_)) => "map",
            Value::Object(_) => "object",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::null()
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Literal(value)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Object(instance)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Literal(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Literal(serde_json::Value::String(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Literal(serde_json::Value::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Literal(serde_json::Value::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Literal(serde_json::Value::Bool(value))
    }
}

/// Positional arguments handed to a constructor or method handler
///
/// Accessors report mismatches as plain messages; the builder wraps them into
/// its own error type together with the object name.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    /// Create an argument list
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no arguments
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get an argument by 0-based position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// All arguments in order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume into the underlying values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    fn require(&self, index: usize) -> Result<&Value, String> {
        self.values
            .get(index)
            .ok_or_else(|| format!("missing argument #{}", index + 1))
    }

    /// Get an argument as an instance handle
    pub fn instance(&self, index: usize) -> Result<Instance, String> {
        match self.require(index)? {
            Value::Object(instance) => Ok(instance.clone()),
            other => Err(format!(
                "argument #{} must be an object, got {}",
                index + 1,
                other.type_name()
            )),
        }
    }

    /// Get an argument as a shared handle to a concrete type
    pub fn object<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, String> {
        let instance = self.instance(index)?;
        instance.downcast::<T>().ok_or_else(|| {
            format!(
                "argument #{} is an instance of {}, expected {}",
                index + 1,
                instance.class_name(),
                std::any::type_name::<T>()
            )
        })
    }

    /// Get an argument as an optional shared handle (null maps to `None`)
    pub fn optional_object<T: Any + Send + Sync>(
        &self,
        index: usize,
    ) -> Result<Option<Arc<T>>, String> {
        match self.values.get(index) {
            None => Ok(None),
            Some(value) if value.is_null() => Ok(None),
            Some(_) => self.object(index).map(Some),
        }
    }

    /// Get an argument as a literal
    pub fn literal(&self, index: usize) -> Result<&serde_json::Value, String> {
        self.require(index)?
            .as_literal()
            .ok_or_else(|| format!("argument #{} must be a literal, got object", index + 1))
    }

    /// Get an argument as a string
    pub fn string(&self, index: usize) -> Result<String, String> {
        match self.literal(index)? {
            serde_json::Value::String(s) => Ok(s.clone()),
            other => Err(format!("argument #{} must be a string, got {}", index + 1, other)),
        }
    }

    /// Get an argument as an integer
    pub fn int(&self, index: usize) -> Result<i64, String> {
        self.literal(index)?
            .as_i64()
            .ok_or_else(|| format!("argument #{} must be an integer", index + 1))
    }

    /// Get an argument as a boolean
    pub fn bool(&self, index: usize) -> Result<bool, String> {
        self.literal(index)?
            .as_bool()
            .ok_or_else(|| format!("argument #{} must be a boolean", index + 1))
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}
