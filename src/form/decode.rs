use crate::form::{InputSpec, Shape};
use log::trace;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A raw value could not be converted into the shape its input expects.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type TransformFn = dyn Fn(Value) -> Result<Value, DecodeError> + Send + Sync;

/// One named step of a decode chain.
#[derive(Clone)]
pub struct Transform {
    name: String,
    func: Arc<TransformFn>,
}

impl Transform {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, value: Value) -> Result<Value, DecodeError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform({})", self.name)
    }
}

/// Feeds `value` through every transform in order, stopping at the first failure.
pub(crate) fn run_chain(field: &str, chain: &[Transform], value: Value) -> Result<Value, DecodeError> {
    chain.iter().try_fold(value, |value, transform| {
        trace!("decoding `{}` with {}", field, transform.name());
        transform.apply(value)
    })
}

/// Decodes a scalar or list input. Lists are decoded element by element.
pub(crate) fn decode_field(spec: &InputSpec, chain: &[Transform], value: Value) -> Result<Value, DecodeError> {
    match spec.shape() {
        Shape::List(_) => {
            let decoded = into_elements(value)
                .into_iter()
                .map(|element| run_chain(spec.name(), chain, element))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(decoded))
        }
        _ => run_chain(spec.name(), chain, value),
    }
}

/// A lone value given for a collection input counts as a one-element list.
pub(crate) fn into_elements(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Kind;
    use serde_json::json;

    fn double() -> Transform {
        Transform::new("double", |v: Value| {
            v.as_i64()
                .map(|n| json!(n * 2))
                .ok_or_else(|| DecodeError::new(format!("{} is not a number", v)))
        })
    }

    #[test]
    fn chain_runs_in_order() {
        let add_one = Transform::new("add_one", |v: Value| Ok(json!(v.as_i64().unwrap_or(0) + 1)));
        let chain = vec![add_one, double()];
        assert_eq!(run_chain("n", &chain, json!(2)), Ok(json!(6)));
    }

    #[test]
    fn chain_stops_at_first_failure() {
        let never = Transform::new("never", |_| panic!("must not run after a failure"));
        let chain = vec![double(), never];
        let err = run_chain("n", &chain, json!("x")).unwrap_err();
        assert_eq!(err.message(), "\"x\" is not a number");
    }

    #[test]
    fn empty_chain_is_identity() {
        assert_eq!(run_chain("n", &[], json!("raw")), Ok(json!("raw")));
    }

    #[test]
    fn list_decodes_each_element_and_wraps_scalars() {
        let spec = InputSpec::list("ns", Kind::Integer);
        let chain = vec![double()];
        assert_eq!(decode_field(&spec, &chain, json!([1, 2])), Ok(json!([2, 4])));
        assert_eq!(decode_field(&spec, &chain, json!(3)), Ok(json!([6])));
        assert!(decode_field(&spec, &chain, json!([1, "two"])).is_err());
    }
}
