//! Stock transforms for decode chains.
//!
//! Every transform takes the value produced by the previous step and either
//! returns a new value or a [`DecodeError`] with a message meant for the user.

use crate::form::{DecodeError, Transform};
use regex::Regex;
use serde_json::{Map, Value};
use std::net::IpAddr;

/// Renders a raw value for messages: strings bare, everything else as JSON.
fn show(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accepts strings, and stringifies numbers and booleans.
pub fn string() -> Transform {
    Transform::new("string", |value: Value| match value {
        Value::String(_) => Ok(value),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(DecodeError::new(format!("'{}' is not a string", show(&other)))),
    })
}

pub fn integer() -> Transform {
    Transform::new("integer", |value: Value| {
        let parsed = match &value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed
            .map(Value::from)
            .ok_or_else(|| DecodeError::new(format!("'{}' is not a valid integer", show(&value))))
    })
}

pub fn float() -> Transform {
    Transform::new("float", |value: Value| {
        let parsed = match &value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|f| f.is_finite())
            .map(Value::from)
            .ok_or_else(|| DecodeError::new(format!("'{}' is not a valid number", show(&value))))
    })
}

pub fn boolean() -> Transform {
    Transform::new("boolean", |value: Value| {
        let parsed = match &value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1"  => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed
            .map(Value::Bool)
            .ok_or_else(|| DecodeError::new(format!("'{}' is not a valid boolean", show(&value))))
    })
}

fn map_str<F>(name: &'static str, func: F) -> Transform
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    Transform::new(name, move |value: Value| match value {
        Value::String(s) => Ok(Value::String(func(&s))),
        other => Err(DecodeError::new(format!("'{}' is not a string", show(&other)))),
    })
}

pub fn upcase() -> Transform {
    map_str("upcase", str::to_uppercase)
}

pub fn downcase() -> Transform {
    map_str("downcase", str::to_lowercase)
}

pub fn trim() -> Transform {
    map_str("trim", |s| s.trim().to_string())
}

/// Parses an IPv4 or IPv6 address and keeps its canonical text form.
pub fn ip_address() -> Transform {
    Transform::new("ip_address", |value: Value| {
        value
            .as_str()
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
            .map(|addr| Value::String(addr.to_string()))
            .ok_or_else(|| DecodeError::new(format!("'{}' is not a valid address", show(&value))))
    })
}

/// Splits shorthand such as `10.0.0.1:80:enabled` into a map keyed by `keys`.
///
/// Maps pass through untouched and empty pieces are skipped, so a later
/// default can fill them. Other values pass through for the next step to judge.
pub fn positional(separator: char, keys: &[&str]) -> Transform {
    let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    Transform::new("positional", move |value: Value| {
        let shorthand = match value {
            Value::String(s) => s,
            other => return Ok(other),
        };

        let pieces: Vec<&str> = shorthand.split(separator).collect();
        if pieces.len() > keys.len() {
            return Err(DecodeError::new(format!(
                "'{}' has more than {} parts",
                shorthand,
                keys.len()
            )));
        }

        let map: Map<String, Value> = keys
            .iter()
            .zip(pieces)
            .filter(|(_, piece)| !piece.is_empty())
            .map(|(key, piece)| (key.clone(), Value::String(piece.to_string())))
            .collect();
        Ok(Value::Object(map))
    })
}

/// Requires a string matching `pattern`; the value itself is unchanged.
pub fn matching(pattern: &str) -> Result<Transform, regex::Error> {
    let re = Regex::new(pattern)?;
    Ok(Transform::new("matching", move |value: Value| {
        if value.as_str().is_some_and(|s| re.is_match(s)) {
            Ok(value)
        } else {
            Err(DecodeError::new(format!("'{}' does not match {}", show(&value), re.as_str())))
        }
    }))
}
