use indexmap::IndexMap;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// A predicate could not be evaluated at all.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RuleError(String);

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}

/// Result of evaluating one rule against a decoded value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(String),
}

type PredicateFn = dyn Fn(&Value) -> Result<bool, RuleError> + Send + Sync;

/// A `(predicate, message)` pair attached to one input.
#[derive(Clone)]
pub struct Rule {
    message:   String,
    predicate: Arc<PredicateFn>,
}

impl Rule {
    pub fn new<F>(message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, RuleError> + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// A rule over the decoded value deserialized as `T`.
    /// A value that does not deserialize fails the rule.
    pub fn typed<T, F>(message: impl Into<String>, predicate: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(message, move |value: &Value| {
            let typed: T = serde_json::from_value(value.clone())?;
            Ok(predicate(&typed))
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn evaluate(&self, value: &Value) -> Outcome {
        match (self.predicate)(value) {
            Ok(true) => Outcome::Pass,
            Ok(false) => Outcome::Fail(self.message.clone()),
            Err(err) => {
                debug!("rule `{}` could not be evaluated: {}", self.message, err);
                Outcome::Fail(self.message.clone())
            }
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({:?})", self.message)
    }
}

/// Every failing rule contributes its message; nothing short-circuits.
pub(crate) fn check_field(field: &str, rules: &[Rule], value: &Value) -> Vec<String> {
    rules
        .iter()
        .filter_map(|rule| match rule.evaluate(value) {
            Outcome::Pass => None,
            Outcome::Fail(message) => {
                debug!("`{}` violates: {}", field, message);
                Some(message)
            }
        })
        .collect()
}

/// Recursive view of an instance's decode errors and violations.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationResult<'a> {
    valid:      bool,
    errors:     &'a IndexMap<String, Vec<String>>,
    violations: &'a IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    nested:     IndexMap<&'a str, Vec<ValidationResult<'a>>>,
}

/// Whether a flattened message came from decoding or from a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Error,
    Violation,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Error => write!(f, "error"),
            MessageKind::Violation => write!(f, "violation"),
        }
    }
}

/// One message of a flattened result, addressed by its path (`nodes[1].address`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    pub path: String,
    pub kind: MessageKind,
    pub text: String,
}

impl<'a> ValidationResult<'a> {
    pub(crate) fn new(
        errors: &'a IndexMap<String, Vec<String>>,
        violations: &'a IndexMap<String, Vec<String>>,
        nested: IndexMap<&'a str, Vec<ValidationResult<'a>>>,
    ) -> Self {
        let valid = errors.is_empty()
            && violations.is_empty()
            && nested.values().flatten().all(ValidationResult::is_valid);
        Self { valid, errors, violations, nested }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &IndexMap<String, Vec<String>> {
        self.errors
    }

    pub fn violations(&self) -> &IndexMap<String, Vec<String>> {
        self.violations
    }

    /// Child results of a nested input, in input order. Empty when there are none.
    pub fn nested(&self, field: &str) -> &[ValidationResult<'a>] {
        self.nested.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every message in the tree, parents before children.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::new();
        self.collect_messages("", &mut messages);
        messages
    }

    fn collect_messages(&self, prefix: &str, out: &mut Vec<Message>) {
        let path = |field: &str| {
            if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            }
        };

        for (kind, map) in [(MessageKind::Error, self.errors), (MessageKind::Violation, self.violations)] {
            for (field, texts) in map {
                out.extend(texts.iter().map(|text| Message {
                    path: path(field.as_str()),
                    kind,
                    text: text.clone(),
                }));
            }
        }

        for (field, children) in &self.nested {
            for (index, child) in children.iter().enumerate() {
                child.collect_messages(&format!("{}[{}]", path(*field), index), out);
            }
        }
    }
}

impl<'a> Index<&str> for ValidationResult<'a> {
    type Output = [ValidationResult<'a>];

    fn index(&self, field: &str) -> &Self::Output {
        self.nested(field)
    }
}
