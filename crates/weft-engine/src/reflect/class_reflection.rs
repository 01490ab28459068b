//! Class Metadata for Reflection
//!
//! Stores the reflection metadata of a class: its constructor, methods,
//! parameters, tags and implemented interfaces. Every reflection also carries
//! the class's dispatch tables (constructor, method handlers, restore hook),
//! which are shared between clones.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::object::RestoreContext;
use crate::value::{Arguments, ObjectBox};

/// Constructor handler: builds a fresh object from positional arguments
pub type ConstructorFn = Arc<dyn Fn(Arguments) -> Result<ObjectBox, String> + Send + Sync>;

/// Method handler: invokes a method on an object under construction
pub type MethodFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), Arguments) -> Result<(), String> + Send + Sync>;

/// Restore handler: rebuilds an object from persisted properties
pub type RestoreFn =
    Arc<dyn Fn(&RestoreContext<'_>) -> Result<ObjectBox, String> + Send + Sync>;

/// Method visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// Where a constructor or method was declared
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file
    pub file: String,
    /// Line of the declaration
    pub line: u32,
}

impl SourceLocation {
    /// Create a location
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location of the caller
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {}", self.file, self.line)
    }
}

/// Declared type of a parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHint {
    /// Primitive type (string, int, array ...)
    Scalar(String),
    /// Class or interface type
    Object(String),
}

impl TypeHint {
    /// Type name
    pub fn name(&self) -> &str {
        match self {
            TypeHint::Scalar(name) | TypeHint::Object(name) => name,
        }
    }

    /// Class or interface name, if this is an object type
    pub fn object_name(&self) -> Option<&str> {
        match self {
            TypeHint::Object(name) => Some(name),
            TypeHint::Scalar(_) => None,
        }
    }
}

/// Parameter information for reflection
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterReflection {
    name: String,
    position: usize,
    type_hint: Option<TypeHint>,
    default_value: Option<serde_json::Value>,
    optional: bool,
    allows_null: bool,
}

impl ParameterReflection {
    /// An untyped, required, non-nullable parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: 0,
            type_hint: None,
            default_value: None,
            optional: false,
            allows_null: false,
        }
    }

    /// A parameter typed with a class or interface
    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name).with_type(TypeHint::Object(type_name.into()))
    }

    /// A parameter typed with a primitive type
    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name).with_type(TypeHint::Scalar(type_name.into()))
    }

    /// Set the declared type
    pub fn with_type(mut self, type_hint: TypeHint) -> Self {
        self.type_hint = Some(type_hint);
        self
    }

    /// Set a default value (makes the parameter optional)
    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self.optional = true;
        self
    }

    /// Mark the parameter optional without a default value
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Allow null for this parameter
    pub fn nullable(mut self) -> Self {
        self.allows_null = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 0-based position in the parameter list
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn type_hint(&self) -> Option<&TypeHint> {
        self.type_hint.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default_value(&self) -> Option<&serde_json::Value> {
        self.default_value.as_ref()
    }

    pub fn is_default_value_available(&self) -> bool {
        self.default_value.is_some()
    }

    pub fn allows_null(&self) -> bool {
        self.allows_null
    }
}

/// Method information for reflection
#[derive(Debug, Clone, PartialEq)]
pub struct MethodReflection {
    name: String,
    visibility: Visibility,
    parameters: Vec<ParameterReflection>,
    tags: BTreeMap<String, Vec<String>>,
    location: SourceLocation,
}

impl MethodReflection {
    /// A public method without parameters, declared at the call site
    #[track_caller]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            parameters: Vec::new(),
            tags: BTreeMap::new(),
            location: SourceLocation::caller(),
        }
    }

    /// Append a parameter
    pub fn with_parameter(mut self, mut parameter: ParameterReflection) -> Self {
        parameter.position = self.parameters.len();
        self.parameters.push(parameter);
        self
    }

    /// Append several parameters
    pub fn with_parameters(
        self,
        parameters: impl IntoIterator<Item = ParameterReflection>,
    ) -> Self {
        parameters
            .into_iter()
            .fold(self, |method, parameter| method.with_parameter(parameter))
    }

    /// Attach a tag with values
    pub fn with_tag<I, S>(mut self, tag: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .entry(tag.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Attach a tag without values
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.entry(tag.into()).or_default();
        self
    }

    /// Set the visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Override the declaration site
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = SourceLocation::new(file, line);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn parameters(&self) -> &[ParameterReflection] {
        &self.parameters
    }

    pub fn number_of_parameters(&self) -> usize {
        self.parameters.len()
    }

    /// All tags with their values
    pub fn tags_values(&self) -> &BTreeMap<String, Vec<String>> {
        &self.tags
    }

    /// Values of one tag
    pub fn tag_values(&self, tag: &str) -> Option<&[String]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    pub fn is_tagged_with(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }
}

/// Kind of a reflected type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
}

/// Dispatch tables of a class
#[derive(Clone, Default)]
pub(crate) struct ClassRuntime {
    pub(crate) constructor: Option<ConstructorFn>,
    pub(crate) handlers: FxHashMap<String, MethodFn>,
    pub(crate) restore: Option<RestoreFn>,
}

impl fmt::Debug for ClassRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        handlers.sort_unstable();
        f.debug_struct("ClassRuntime")
            .field("constructor", &self.constructor.is_some())
            .field("handlers", &handlers)
            .field("restore", &self.restore.is_some())
            .finish()
    }
}

/// Reflection of a single class or interface
#[derive(Debug, Clone)]
pub struct ClassReflection {
    name: String,
    kind: ClassKind,
    interfaces: Vec<String>,
    constructor: Option<MethodReflection>,
    methods: Vec<MethodReflection>,
    pub(crate) runtime: ClassRuntime,
}

impl ClassReflection {
    /// Create an empty class reflection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            interfaces: Vec::new(),
            constructor: None,
            methods: Vec::new(),
            runtime: ClassRuntime::default(),
        }
    }

    /// Create an interface reflection
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Interface,
            ..Self::new(name)
        }
    }

    pub(crate) fn add_interface(&mut self, interface: String) {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
    }

    pub(crate) fn set_constructor(&mut self, constructor: MethodReflection) {
        self.constructor = Some(constructor);
    }

    /// Add or replace method metadata
    pub(crate) fn add_method(&mut self, method: MethodReflection) {
        match self.methods.iter_mut().find(|m| m.name == method.name) {
            Some(existing) => *existing = method,
            None => self.methods.push(method),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Check if objects of this class can be constructed
    pub fn is_instantiable(&self) -> bool {
        self.kind == ClassKind::Class && self.runtime.constructor.is_some()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn implements_interface(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|i| i == interface)
    }

    pub fn get_constructor(&self) -> Option<&MethodReflection> {
        self.constructor.as_ref()
    }

    /// All declared methods in declaration order
    pub fn get_methods(&self) -> &[MethodReflection] {
        &self.methods
    }

    /// Public methods in declaration order
    pub fn get_public_methods(&self) -> impl Iterator<Item = &MethodReflection> {
        self.methods.iter().filter(|m| m.is_public())
    }

    pub fn get_method(&self, name: &str) -> Option<&MethodReflection> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Check if the class exposes a callable handler for `name`
    pub fn has_method(&self, name: &str) -> bool {
        self.runtime.handlers.contains_key(name)
    }

    /// Check if the class can be restored without running its constructor
    pub fn supports_restore(&self) -> bool {
        self.runtime.restore.is_some()
    }

    /// Construct a new object
    pub fn new_instance(&self, arguments: Arguments) -> Result<ObjectBox, String> {
        match &self.runtime.constructor {
            Some(constructor) => constructor(arguments),
            None => Err(format!("class {} is not instantiable", self.name)),
        }
    }

    /// Invoke a method handler on an object; `None` if the class has no such handler
    pub fn invoke(
        &self,
        object: &mut (dyn Any + Send + Sync),
        method: &str,
        arguments: Arguments,
    ) -> Option<Result<(), String>> {
        self.runtime
            .handlers
            .get(method)
            .map(|handler| handler(object, arguments))
    }

    /// Restore an object; `None` if the class does not support it
    pub fn restore(&self, context: &RestoreContext<'_>) -> Option<Result<ObjectBox, String>> {
        self.runtime.restore.as_ref().map(|restore| restore(context))
    }
}
