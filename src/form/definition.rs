use crate::form::{FormInstance, InputSpec, Rule, Transform};
use crate::form::{AccessError, DecodeError, RuleError};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A definition was assembled incorrectly. Raised once, while building.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("input `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("input `{0}` is not declared")]
    UnknownField(String),
}

/// Ordered inputs plus the decode chains and rules attached to them.
///
/// Built once with [`FormDefinition::builder`] and read-only afterwards.
#[derive(Clone, Default)]
pub struct FormDefinition {
    inputs:   IndexMap<String, InputSpec>,
    decoders: IndexMap<String, Vec<Transform>>,
    rules:    IndexMap<String, Vec<Rule>>,
}

/// One row of [`FormDefinition::describe`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, tabled::Tabled)]
pub struct InputSummary {
    #[tabled(rename = "Input")]
    pub name: String,

    #[tabled(rename = "Type")]
    pub shape: String,

    #[tabled(rename = "Required")]
    pub required: bool,

    #[tabled(rename = "Default")]
    pub default: bool,
}

impl FormDefinition {
    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    pub fn inputs(&self) -> impl Iterator<Item = &InputSpec> {
        self.inputs.values()
    }

    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.get(name)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn decoders(&self, name: &str) -> &[Transform] {
        self.decoders.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rules(&self, name: &str) -> &[Rule] {
        self.rules.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Decodes and validates `raw` against this definition.
    pub fn instantiate(&self, raw: &Map<String, Value>) -> FormInstance {
        FormInstance::build(self, raw)
    }

    /// Like [`instantiate`](Self::instantiate), for a raw value that should be a map.
    pub fn instantiate_value(&self, raw: &Value) -> Result<FormInstance, AccessError> {
        match raw {
            Value::Object(map) => Ok(self.instantiate(map)),
            other => Err(AccessError::NotAMap(other.to_string())),
        }
    }

    pub fn describe(&self) -> Vec<InputSummary> {
        self.inputs()
            .map(|spec| InputSummary {
                name:     spec.name().to_string(),
                shape:    spec.shape().to_string(),
                required: spec.is_required(),
                default:  spec.has_default(),
            })
            .collect()
    }
}

impl fmt::Debug for FormDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormDefinition")
            .field("inputs", &self.inputs.keys().collect::<Vec<_>>())
            .field("decoders", &self.decoders)
            .field("rules", &self.rules)
            .finish()
    }
}

/// Fluent builder for [`FormDefinition`].
///
/// Inputs must be declared before decoders or rules are attached to them.
/// The first mistake is remembered and reported by [`build`](Self::build).
///
/// # Example
///
/// ```
/// use cmdform::decoding;
/// use cmdform::form::{FormDefinition, InputSpec, Kind};
///
/// let definition = FormDefinition::builder()
///     .input(InputSpec::scalar("port", Kind::Integer).required())
///     .decode("port", decoding::integer())
///     .validates_as::<i64, _>("port", "port must be between 0 and 65,535", |p| (0..=65535).contains(p))
///     .build()
///     .unwrap();
///
/// let form = definition.instantiate_value(&serde_json::json!({"port": "8080"})).unwrap();
/// assert!(form.is_valid());
/// ```
#[derive(Default)]
pub struct FormBuilder {
    definition: FormDefinition,
    error:      Option<DefinitionError>,
}

impl FormBuilder {
    pub fn input(mut self, spec: InputSpec) -> Self {
        if self.definition.inputs.contains_key(spec.name()) {
            self.fail(DefinitionError::DuplicateField(spec.name().to_string()));
        } else {
            self.definition.inputs.insert(spec.name().to_string(), spec);
        }
        self
    }

    /// Appends a transform to the field's decode chain.
    pub fn decode(mut self, field: &str, transform: Transform) -> Self {
        if self.check_declared(field) {
            self.definition
                .decoders
                .entry(field.to_string())
                .or_default()
                .push(transform);
        }
        self
    }

    /// Appends an ad-hoc transform built from a closure.
    pub fn decode_with<F>(self, field: &str, name: &str, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.decode(field, Transform::new(name, func))
    }

    pub fn rule(mut self, field: &str, rule: Rule) -> Self {
        if self.check_declared(field) {
            self.definition
                .rules
                .entry(field.to_string())
                .or_default()
                .push(rule);
        }
        self
    }

    /// Infallible predicate over the raw decoded value.
    pub fn validates<F>(self, field: &str, message: &str, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.rule(field, Rule::new(message, move |value: &Value| Ok::<_, RuleError>(predicate(value))))
    }

    /// Predicate over the decoded value deserialized as `T`.
    pub fn validates_as<T, F>(self, field: &str, message: &str, predicate: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.rule(field, Rule::typed::<T, F>(message, predicate))
    }

    pub fn build(self) -> Result<FormDefinition, DefinitionError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.definition),
        }
    }

    fn check_declared(&mut self, field: &str) -> bool {
        let declared = self.definition.inputs.contains_key(field);
        if !declared {
            self.fail(DefinitionError::UnknownField(field.to_string()));
        }
        declared
    }

    fn fail(&mut self, err: DefinitionError) {
        // keep the first
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
