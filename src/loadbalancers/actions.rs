use crate::cli::Invocation;
use crate::form::FormDefinition;
use crate::loadbalancers::{definition, LoadBalancer};
use crate::naming::NameGenerator;
use crate::output;
use crate::router::{ActionTable, Bindings};
use eyre::{eyre, Result, WrapErr};
use log::debug;
use serde_json::json;
use std::sync::Arc;

/// What the load-balancer actions need beyond the invocation itself.
#[derive(Clone)]
pub struct Settings {
    pub naming: Arc<dyn NameGenerator>,
    pub name_prefix: String,
    pub name_suffix: String,
}

impl Settings {
    fn definition(&self) -> Result<FormDefinition> {
        definition(self.naming.clone(), &self.name_prefix, &self.name_suffix)
            .wrap_err("Failed to define the load balancer form")
    }
}

fn create(settings: &Settings, invocation: &Invocation) -> Result<String> {
    let form = settings.definition()?.instantiate(&invocation.params);
    debug!("loadbalancer form valid: {}", form.is_valid());

    if !form.is_valid() {
        return output::render_report(&form.validation(), invocation.format);
    }
    let loadbalancer: LoadBalancer = form.extract().wrap_err("Failed to read the load balancer")?;
    output::render_value(&loadbalancer, invocation.format)
}

fn show(invocation: &Invocation, bindings: &Bindings) -> Result<String> {
    let id = bindings.get("id").ok_or_else(|| eyre!("route did not capture an id"))?;
    output::render_value(&json!({ "id": id }), invocation.format)
}

fn describe(settings: &Settings, invocation: &Invocation) -> Result<String> {
    output::render_inputs(&settings.definition()?.describe(), invocation.format)
}

/// `loadbalancers#create`, `loadbalancers#show` and `loadbalancers#describe`.
pub fn actions(settings: Settings) -> ActionTable<Invocation, String> {
    let for_create = settings.clone();
    ActionTable::new()
        .register("loadbalancers#create", move |invocation: &Invocation, _: &Bindings| {
            create(&for_create, invocation)
        })
        .register("loadbalancers#show", show)
        .register("loadbalancers#describe", move |invocation: &Invocation, _: &Bindings| {
            describe(&settings, invocation)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::FixedName;
    use crate::output::OutputFormat;
    use crate::router::ActionRegistry;
    use serde_json::{json, Value};

    fn table() -> ActionTable<Invocation, String> {
        actions(Settings {
            naming: Arc::new(FixedName("random-name".into())),
            name_prefix: "l".into(),
            name_suffix: "b".into(),
        })
    }

    fn invocation(params: Value) -> Invocation {
        Invocation {
            argv: vec!["loadbalancers".into(), "create".into()],
            params: params.as_object().cloned().unwrap_or_default(),
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn create_prints_the_load_balancer() {
        let table = table();
        let create = table.resolve("loadbalancers#create").unwrap();
        let text = create(&invocation(json!({"nodes": ["10.0.0.1:80"]})), &Bindings::new()).unwrap();
        let printed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(printed["name"], "random-name");
        assert_eq!(printed["nodes"][0]["type"], "PRIMARY");
    }

    #[test]
    fn create_prints_the_report_when_invalid() {
        let table = table();
        let create = table.resolve("loadbalancers#create").unwrap();
        let text = create(&invocation(json!({"nodes": []})), &Bindings::new()).unwrap();
        let printed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(printed["valid"], false);
        assert_eq!(printed["violations"]["nodes"], json!(["cannot be empty"]));
    }

    #[test]
    fn show_echoes_the_captured_id() {
        let table = table();
        let show = table.resolve("loadbalancers#show").unwrap();
        let mut bindings = Bindings::new();
        bindings.insert("id".into(), "6".into());
        assert_eq!(show(&invocation(json!({})), &bindings).unwrap(), r#"{"id":"6"}"#);
    }
}
