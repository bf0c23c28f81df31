use crate::decoding;
use crate::form::{DefinitionError, FormDefinition, InputSpec, Kind};
use crate::naming::NameGenerator;
use serde_json::Value;
use std::sync::Arc;

pub const PORT_RANGE: &str = "port must be between 0 and 65,535";

const TYPES: [&str; 2] = ["PRIMARY", "SECONDARY"];
const CONDITIONS: [&str; 2] = ["ENABLED", "DISABLED"];

/// Order of the pieces in node shorthand such as `10.0.0.1:80:enabled:primary`.
pub const NODE_SHORTHAND: [&str; 4] = ["address", "port", "condition", "type"];

fn in_port_range(port: &i64) -> bool {
    (0..=65_535).contains(port)
}

/// A single back-end node.
pub fn node() -> Result<FormDefinition, DefinitionError> {
    FormDefinition::builder()
        .input(InputSpec::scalar("address", Kind::Address).required())
        .input(InputSpec::scalar("port", Kind::Integer).required())
        .input(InputSpec::scalar("type", Kind::String).default("PRIMARY"))
        .input(InputSpec::scalar("condition", Kind::String).default("ENABLED"))
        .decode("address", decoding::ip_address())
        .decode("port", decoding::integer())
        .decode("type", decoding::string())
        .decode("type", decoding::upcase())
        .decode("condition", decoding::string())
        .decode("condition", decoding::upcase())
        .validates_as::<i64, _>("port", PORT_RANGE, in_port_range)
        .validates_as::<String, _>("type", "invalid type", |kind| TYPES.contains(&kind.as_str()))
        .validates_as::<String, _>("condition", "invalid condition", |condition| {
            CONDITIONS.contains(&condition.as_str())
        })
        .build()
}

/// A load balancer with at least one node. `name` defaults to a generated one.
pub fn definition(
    naming: Arc<dyn NameGenerator>,
    prefix: &str,
    suffix: &str,
) -> Result<FormDefinition, DefinitionError> {
    let (prefix, suffix) = (prefix.to_string(), suffix.to_string());

    FormDefinition::builder()
        .input(
            InputSpec::scalar("name", Kind::String)
                .default_with(move || Value::String(naming.generate(&prefix, &suffix))),
        )
        .input(InputSpec::scalar("port", Kind::Integer).default(80))
        .input(InputSpec::scalar("protocol", Kind::String).default("HTTP"))
        .input(InputSpec::list("virtual_ips", Kind::String).default(vec!["PUBLIC"]))
        .input(InputSpec::nested("nodes", node()?).required())
        .decode("name", decoding::string())
        .decode("port", decoding::integer())
        .decode("protocol", decoding::string())
        .decode("protocol", decoding::upcase())
        .decode("virtual_ips", decoding::string())
        .decode("virtual_ips", decoding::upcase())
        .decode("nodes", decoding::positional(':', &NODE_SHORTHAND))
        .validates_as::<i64, _>("port", PORT_RANGE, in_port_range)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::FixedName;
    use serde_json::json;

    fn form() -> FormDefinition {
        definition(Arc::new(FixedName("random-name".into())), "l", "b").unwrap()
    }

    #[test]
    fn node_fills_type_and_condition() {
        let node = node().unwrap().instantiate_value(&json!({"address": "10.0.0.1", "port": "80"})).unwrap();
        assert!(node.is_valid());
        assert_eq!(node.value::<String>("type").unwrap(), "PRIMARY");
        assert_eq!(node.value::<String>("condition").unwrap(), "ENABLED");
    }

    #[test]
    fn unknown_type_and_condition_are_violations() {
        let node = node()
            .unwrap()
            .instantiate_value(&json!({"address": "10.0.0.1", "port": 80, "type": "tertiary", "condition": "maybe"}))
            .unwrap();
        assert_eq!(node.violations()["type"], vec!["invalid type"]);
        assert_eq!(node.violations()["condition"], vec!["invalid condition"]);
    }

    #[test]
    fn top_level_port_has_its_own_range_rule() {
        let form = form().instantiate_value(&json!({"port": "70000", "nodes": ["10.0.0.1:80"]})).unwrap();
        assert!(!form.is_valid());
        assert_eq!(form.violations()["port"], vec![PORT_RANGE]);
        assert!(form.validation().nested("nodes")[0].is_valid());
    }

    #[test]
    fn too_much_shorthand_is_a_parent_error() {
        let form = form().instantiate_value(&json!({"nodes": ["10.0.0.1:80:enabled:primary:extra"]})).unwrap();
        assert_eq!(form.errors()["nodes"], vec!["'10.0.0.1:80:enabled:primary:extra' has more than 4 parts"]);
        assert!(form.children("nodes").unwrap().is_empty());
    }

    #[test]
    fn describe_lists_inputs_in_order() {
        let names: Vec<String> = form().describe().into_iter().map(|row| row.name).collect();
        assert_eq!(names, ["name", "port", "protocol", "virtual_ips", "nodes"]);
    }
}
