use crate::form::{InputSummary, Message, ValidationResult};
use clap::ValueEnum;
use colored::Colorize;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    #[default]
    JsonPretty,
    Table,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json"        => Ok(OutputFormat::Json),
            "json-pretty" => Ok(OutputFormat::JsonPretty),
            "table"       => Ok(OutputFormat::Table),
            _             => Err(format!("Invalid output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            OutputFormat::Json       => "json",
            OutputFormat::JsonPretty => "json-pretty",
            OutputFormat::Table      => "table",
        };
        write!(f, "{}", output)
    }
}

#[derive(Clone, Tabled)]
struct MessageRow {
    #[tabled(rename = "Input")]
    path: String,

    #[tabled(rename = "Kind")]
    kind: String,

    #[tabled(rename = "Message")]
    text: String,
}

impl From<Message> for MessageRow {
    fn from(message: Message) -> Self {
        Self {
            path: message.path,
            kind: message.kind.to_string(),
            text: message.text,
        }
    }
}

#[derive(Clone, Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,

    #[tabled(rename = "Value")]
    value: String,
}

fn table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn json<S: Serialize + ?Sized>(value: &S, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string(value),
        _ => serde_json::to_string_pretty(value),
    };
    text.wrap_err("Error serializing JSON")
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A coloured one-word verdict.
pub fn banner(valid: bool) -> String {
    if valid {
        "valid".green().bold().to_string()
    } else {
        "invalid".red().bold().to_string()
    }
}

/// Renders a validation report. Tables list one row per message under a banner.
pub fn render_report(result: &ValidationResult<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let messages = result.messages();
            if messages.is_empty() {
                return Ok(banner(result.is_valid()));
            }
            let rows = messages.into_iter().map(MessageRow::from);
            Ok(format!("{}\n{}", banner(result.is_valid()), table(rows)))
        }
        _ => json(result, format),
    }
}

/// Renders any serializable value. Tables show the top-level fields of an object.
pub fn render_value<S: Serialize>(value: &S, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let value = serde_json::to_value(value).wrap_err("Error serializing value")?;
            match value {
                Value::Object(map) => Ok(table(map.iter().map(|(field, value)| FieldRow {
                    field: field.clone(),
                    value: cell(value),
                }))),
                other => Ok(cell(&other)),
            }
        }
        _ => json(value, format),
    }
}

/// Renders a list of rows, one table row or one JSON array element each.
pub fn render_rows<R>(rows: &[R], format: OutputFormat) -> Result<String>
where
    R: Tabled + Serialize + Clone,
{
    match format {
        OutputFormat::Table => Ok(table(rows.iter().cloned())),
        _ => json(rows, format),
    }
}

pub fn render_inputs(inputs: &[InputSummary], format: OutputFormat) -> Result<String> {
    render_rows(inputs, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_parse_and_display() {
        assert_eq!("JSON-Pretty".parse::<OutputFormat>(), Ok(OutputFormat::JsonPretty));
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert!("raw".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::JsonPretty);
    }

    #[test]
    fn compact_json_is_one_line() {
        let text = render_value(&json!({"name": "lb", "port": 80}), OutputFormat::Json).unwrap();
        assert_eq!(text, r#"{"name":"lb","port":80}"#);
    }

    #[test]
    fn table_lists_object_fields() {
        let text = render_value(&json!({"name": "lb", "port": 80}), OutputFormat::Table).unwrap();
        assert!(text.contains("Field"));
        assert!(text.contains("lb"));
        assert!(text.contains("80"));
    }
}
