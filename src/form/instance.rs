use crate::form::decode::{self, into_elements};
use crate::form::input::is_empty;
use crate::form::validate::{self, ValidationResult};
use crate::form::{FormDefinition, Shape};
use indexmap::IndexMap;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Reading a value out of an instance failed.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("input `{0}` is not declared")]
    UnknownField(String),

    #[error("input `{0}` failed to decode")]
    Undecoded(String),

    #[error("input `{0}` is a nested form; read it with `children`")]
    Nested(String),

    #[error("input `{0}` is not a nested form")]
    NotNested(String),

    #[error("input `{field}` does not hold the requested type: {source}")]
    Mismatch {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("decoded form does not fit the requested type: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("form has decode errors or violations")]
    Invalid,

    #[error("form inputs must be a map, got {0}")]
    NotAMap(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Value,
    Nested,
}

/// One decoded and validated instantiation of a [`FormDefinition`].
///
/// Built by [`FormDefinition::instantiate`]; never changes afterwards.
#[derive(Clone, Debug)]
pub struct FormInstance {
    slots:      IndexMap<String, Slot>,
    raw:        IndexMap<String, Value>,
    decoded:    IndexMap<String, Value>,
    errors:     IndexMap<String, Vec<String>>,
    violations: IndexMap<String, Vec<String>>,
    nested:     IndexMap<String, Vec<FormInstance>>,
}

impl FormInstance {
    pub(crate) fn build(definition: &FormDefinition, raw: &Map<String, Value>) -> Self {
        let mut instance = FormInstance {
            slots:      IndexMap::new(),
            raw:        IndexMap::new(),
            decoded:    IndexMap::new(),
            errors:     IndexMap::new(),
            violations: IndexMap::new(),
            nested:     IndexMap::new(),
        };

        for spec in definition.inputs() {
            let name = spec.name();
            let slot = match spec.shape() {
                Shape::Nested(_) => Slot::Nested,
                _ => Slot::Value,
            };
            instance.slots.insert(name.to_string(), slot);

            // Raw input wins; the default only fills a gap.
            let value = match raw.get(name) {
                Some(value) if !value.is_null() => Some(value.clone()),
                _ => spec.default_value(),
            };

            let value = match value {
                Some(value) if !(spec.is_required() && is_empty(&value)) => value,
                Some(_) | None if spec.is_required() => {
                    debug!("`{}` is required but empty", name);
                    instance.violate(name, vec![spec.missing_message().to_string()]);
                    continue;
                }
                _ => continue,
            };
            instance.raw.insert(name.to_string(), value.clone());

            match spec.shape() {
                Shape::Nested(element) => instance.build_children(definition, name, element, value),
                _ => match decode::decode_field(spec, definition.decoders(name), value) {
                    Ok(decoded) => {
                        let failed = validate::check_field(name, definition.rules(name), &decoded);
                        instance.violate(name, failed);
                        instance.decoded.insert(name.to_string(), decoded);
                    }
                    Err(err) => {
                        debug!("`{}` failed to decode: {}", name, err);
                        instance.fail(name, err.to_string());
                    }
                },
            }
        }

        instance
    }

    fn build_children(&mut self, parent: &FormDefinition, name: &str, element: &FormDefinition, value: Value) {
        let mut children = Vec::new();
        let mut inputs = Vec::new();

        for (index, item) in into_elements(value).into_iter().enumerate() {
            match decode::run_chain(name, parent.decoders(name), item) {
                Ok(Value::Object(map)) => {
                    children.push(element.instantiate(&map));
                    inputs.push(Value::Object(map));
                }
                Ok(other) => {
                    debug!("`{}[{}]` is not a map: {}", name, index, other);
                    self.fail(name, "expected a map of inputs".to_string());
                }
                Err(err) => {
                    debug!("`{}[{}]` failed to decode: {}", name, index, err);
                    self.fail(name, err.to_string());
                }
            }
        }

        // Field-level rules see the element inputs, never the children's messages.
        let failed = validate::check_field(name, parent.rules(name), &Value::Array(inputs));
        self.violate(name, failed);
        self.nested.insert(name.to_string(), children);
    }

    fn fail(&mut self, name: &str, message: String) {
        self.errors.entry(name.to_string()).or_default().push(message);
    }

    fn violate(&mut self, name: &str, messages: Vec<String>) {
        if !messages.is_empty() {
            self.violations.entry(name.to_string()).or_default().extend(messages);
        }
    }

    /// True when this instance and every nested child decoded and validated cleanly.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
            && self.violations.is_empty()
            && self.nested.values().flatten().all(FormInstance::is_valid)
    }

    /// Top-level violations only; children keep their own.
    pub fn violations(&self) -> &IndexMap<String, Vec<String>> {
        &self.violations
    }

    /// Top-level decode errors only.
    pub fn errors(&self) -> &IndexMap<String, Vec<String>> {
        &self.errors
    }

    pub fn validation(&self) -> ValidationResult<'_> {
        let nested = self
            .nested
            .iter()
            .map(|(name, children)| (name.as_str(), children.iter().map(FormInstance::validation).collect()))
            .collect();
        ValidationResult::new(&self.errors, &self.violations, nested)
    }

    /// The raw input, or the default that stood in for it.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// The decoded value of a scalar or list input.
    ///
    /// `Ok(None)` means the input was optional and nothing was supplied.
    pub fn get(&self, name: &str) -> Result<Option<&Value>, AccessError> {
        match self.slots.get(name) {
            None => Err(AccessError::UnknownField(name.to_string())),
            Some(Slot::Nested) => Err(AccessError::Nested(name.to_string())),
            Some(Slot::Value) if self.errors.contains_key(name) => {
                Err(AccessError::Undecoded(name.to_string()))
            }
            Some(Slot::Value) => Ok(self.decoded.get(name)),
        }
    }

    /// Typed variant of [`get`](Self::get). Absent values deserialize from `null`,
    /// so ask for an `Option<T>` when the input is optional.
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Result<T, AccessError> {
        let value = self.get(name)?.cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|source| AccessError::Mismatch {
            field: name.to_string(),
            source,
        })
    }

    pub fn children(&self, name: &str) -> Result<&[FormInstance], AccessError> {
        match self.slots.get(name) {
            None => Err(AccessError::UnknownField(name.to_string())),
            Some(Slot::Value) => Err(AccessError::NotNested(name.to_string())),
            Some(Slot::Nested) => Ok(self.nested.get(name).map(Vec::as_slice).unwrap_or(&[])),
        }
    }

    /// Assembles the decoded inputs, children included, into one JSON object.
    /// Absent optional inputs are left out.
    pub fn to_value(&self) -> Result<Value, AccessError> {
        let mut object = Map::new();
        for (name, slot) in &self.slots {
            match slot {
                Slot::Nested => {
                    let children = self
                        .children(name)?
                        .iter()
                        .map(FormInstance::to_value)
                        .collect::<Result<Vec<_>, _>>()?;
                    object.insert(name.clone(), Value::Array(children));
                }
                Slot::Value => {
                    if let Some(value) = self.get(name)? {
                        object.insert(name.clone(), value.clone());
                    }
                }
            }
        }
        Ok(Value::Object(object))
    }

    /// Converts a valid instance into a domain type.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, AccessError> {
        if !self.is_valid() {
            return Err(AccessError::Invalid);
        }
        serde_json::from_value(self.to_value()?).map_err(AccessError::Shape)
    }
}

#[cfg(test)]
mod tests {
    use crate::decoding;
    use crate::form::{AccessError, FormDefinition, InputSpec, Kind};
    use serde_json::json;

    fn point() -> FormDefinition {
        FormDefinition::builder()
            .input(InputSpec::scalar("x", Kind::Integer).required())
            .input(InputSpec::scalar("y", Kind::Integer).default(0))
            .decode("x", decoding::integer())
            .decode("y", decoding::integer())
            .validates_as::<i64, _>("x", "x must be positive", |x| *x > 0)
            .build()
            .unwrap()
    }

    fn path() -> FormDefinition {
        FormDefinition::builder()
            .input(InputSpec::scalar("label", Kind::String))
            .input(InputSpec::nested("points", point()).required())
            .decode("points", decoding::positional(',', &["x", "y"]))
            .build()
            .unwrap()
    }

    #[test]
    fn default_fills_a_missing_value() {
        let form = point().instantiate_value(&json!({"x": "3"})).unwrap();
        assert!(form.is_valid());
        assert_eq!(form.value::<i64>("x").unwrap(), 3);
        assert_eq!(form.value::<i64>("y").unwrap(), 0);
        assert_eq!(form.raw("y"), Some(&json!(0)));
    }

    #[test]
    fn null_counts_as_missing() {
        let form = point().instantiate_value(&json!({"x": null})).unwrap();
        assert_eq!(form.violations()["x"], vec!["is required"]);
        assert!(form.errors().is_empty());
        assert_eq!(form.get("x").unwrap(), None);
    }

    #[test]
    fn optional_without_default_is_absent() {
        let form = path().instantiate_value(&json!({"points": ["1,2"]})).unwrap();
        assert!(form.is_valid());
        assert_eq!(form.get("label").unwrap(), None);
        assert_eq!(form.value::<Option<String>>("label").unwrap(), None);
    }

    #[test]
    fn decode_failure_blocks_access() {
        let form = point().instantiate_value(&json!({"x": "three", "y": "4"})).unwrap();
        assert!(!form.is_valid());
        assert_eq!(form.errors()["x"], vec!["'three' is not a valid integer"]);
        assert!(form.violations().get("x").is_none());
        assert!(matches!(form.get("x"), Err(AccessError::Undecoded(_))));
        assert_eq!(form.value::<i64>("y").unwrap(), 4);
    }

    #[test]
    fn unknown_and_misused_fields() {
        let form = path().instantiate_value(&json!({"points": ["1,2"]})).unwrap();
        assert!(matches!(form.get("nope"), Err(AccessError::UnknownField(_))));
        assert!(matches!(form.get("points"), Err(AccessError::Nested(_))));
        assert!(matches!(form.children("label"), Err(AccessError::NotNested(_))));
        assert!(matches!(form.value::<i64>("label"), Err(AccessError::Mismatch { .. })));
    }

    #[test]
    fn children_follow_input_order() {
        let form = path()
            .instantiate_value(&json!({"points": ["1,2", {"x": 5}, "-1"]}))
            .unwrap();
        let points = form.children("points").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].value::<i64>("y").unwrap(), 2);
        assert_eq!(points[1].value::<i64>("y").unwrap(), 0);
        assert_eq!(points[2].violations()["x"], vec!["x must be positive"]);
        assert!(form.violations().is_empty());
        assert!(!form.is_valid());
    }

    #[test]
    fn non_map_element_is_a_parent_error() {
        let form = path().instantiate_value(&json!({"points": [7]})).unwrap();
        assert_eq!(form.errors()["points"], vec!["expected a map of inputs"]);
        assert!(form.children("points").unwrap().is_empty());
    }

    #[test]
    fn to_value_and_extract() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Point {
            x: i64,
            y: i64,
        }
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Path {
            label: Option<String>,
            points: Vec<Point>,
        }

        let form = path()
            .instantiate_value(&json!({"label": "L", "points": ["1,2", "3"]}))
            .unwrap();
        assert_eq!(
            form.to_value().unwrap(),
            json!({"label": "L", "points": [{"x": 1, "y": 2}, {"x": 3, "y": 0}]})
        );
        let decoded: Path = form.extract().unwrap();
        assert_eq!(decoded.label.as_deref(), Some("L"));
        assert_eq!(decoded.points[1], Point { x: 3, y: 0 });

        let invalid = path().instantiate_value(&json!({"points": []})).unwrap();
        assert!(matches!(invalid.extract::<Path>(), Err(AccessError::Invalid)));
    }
}
