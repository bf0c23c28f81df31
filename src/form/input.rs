use crate::form::FormDefinition;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Declared kind of a scalar input, or of the elements of a list input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Integer,
    Float,
    Boolean,
    Address,
    Any,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let output = match self {
            Kind::String  => "string",
            Kind::Integer => "integer",
            Kind::Float   => "float",
            Kind::Boolean => "boolean",
            Kind::Address => "address",
            Kind::Any     => "any",
        };
        write!(f, "{}", output)
    }
}

/// The shape of an input: one value, a list of values, or a repeated nested form.
#[derive(Clone, Debug)]
pub enum Shape {
    Scalar(Kind),
    List(Kind),
    Nested(Arc<FormDefinition>),
}

impl Shape {
    /// Lists and nested forms are collections; their emptiness message differs.
    pub fn is_collection(&self) -> bool {
        !matches!(self, Shape::Scalar(_))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(kind) => write!(f, "{}", kind),
            Shape::List(kind)   => write!(f, "[{}]", kind),
            Shape::Nested(_)    => write!(f, "[form]"),
        }
    }
}

pub type Generator = Arc<dyn Fn() -> Value + Send + Sync>;

/// Where an input's value comes from when the raw map has none.
#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    /// Evaluated afresh on every instantiation.
    Generated(Generator),
}

impl DefaultValue {
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Generated(generate) => generate(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => write!(f, "Literal({})", value),
            DefaultValue::Generated(_) => write!(f, "Generated(..)"),
        }
    }
}

/// Declared shape, default and requiredness of one form input.
///
/// # Example
///
/// ```
/// use cmdform::form::{InputSpec, Kind};
///
/// let port = InputSpec::scalar("port", Kind::Integer).default(80);
/// assert_eq!(port.name(), "port");
/// assert!(!port.is_required());
/// ```
#[derive(Clone, Debug)]
pub struct InputSpec {
    name:     String,
    shape:    Shape,
    default:  Option<DefaultValue>,
    required: bool,
}

impl InputSpec {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            default: None,
            required: false,
        }
    }

    pub fn scalar(name: impl Into<String>, kind: Kind) -> Self {
        Self::new(name, Shape::Scalar(kind))
    }

    pub fn list(name: impl Into<String>, kind: Kind) -> Self {
        Self::new(name, Shape::List(kind))
    }

    /// A repeated nested form; every element of the raw list becomes a child instance.
    pub fn nested(name: impl Into<String>, definition: FormDefinition) -> Self {
        Self::new(name, Shape::Nested(Arc::new(definition)))
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Literal(value.into()));
        self
    }

    pub fn default_with<F>(mut self, generate: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Generated(Arc::new(generate)));
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Resolves the default, running the generator if there is one.
    pub fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultValue::resolve)
    }

    /// The element definition of a nested input.
    pub fn definition(&self) -> Option<&FormDefinition> {
        match &self.shape {
            Shape::Nested(definition) => Some(definition),
            _ => None,
        }
    }

    pub(crate) fn missing_message(&self) -> &'static str {
        if self.shape.is_collection() {
            "cannot be empty"
        } else {
            "is required"
        }
    }
}

/// Absent-equivalent values for the purpose of requiredness.
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
