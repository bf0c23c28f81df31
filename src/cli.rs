use crate::config::{Config, CONFIG};
use crate::loadbalancers::{self, Settings};
use crate::naming::{NameGenerator, RandomNames};
use crate::output::{self, OutputFormat};
use crate::router::{ActionTable, Command, Router};
use clap::Parser;
use eyre::{Result, WrapErr};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

pub type Actions = ActionTable<Invocation, String>;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Form parameter as KEY=VALUE; values that parse as JSON are taken as JSON
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, Value)>,

    /// Node shorthand, ADDRESS:PORT[:CONDITION[:TYPE]]; repeatable
    #[arg(short = 'n', long = "node", value_name = "SHORTHAND")]
    pub nodes: Vec<String>,

    /// Command words, e.g. `loadbalancers create` or `show loadbalancer 6`
    pub command: Vec<String>,
}

/// One parsed command line: its tokens plus the raw form parameters.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub params: Map<String, Value>,
    pub format: OutputFormat,
}

impl Command for Invocation {
    fn argv(&self) -> &[String] {
        &self.argv
    }
}

#[derive(Clone, Serialize, tabled::Tabled)]
struct RouteRow {
    #[tabled(rename = "Pattern")]
    pattern: String,

    #[tabled(rename = "Target")]
    target: String,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", s))?;
    if key.is_empty() {
        return Err(format!("missing key in `{}`", s));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Builds the routing table: load-balancer actions, `config save`, and the
/// inline `routes` and `config` commands.
pub fn router(config: &Config, naming: Arc<dyn NameGenerator>) -> Router<Invocation, String, Actions> {
    let mut actions = loadbalancers::actions(Settings {
        naming,
        name_prefix: config.name_prefix.clone(),
        name_suffix: config.name_suffix.clone(),
    });
    let saved = config.clone();
    actions.insert("config#save", move |_, _| {
        saved.save()?;
        Ok(format!("saved {}", Config::path().display()))
    });

    let marker = config.capture_marker;
    let mut router = Router::new(actions).with_capture_marker(marker);
    router
        .route("loadbalancers create", "loadbalancers#create")
        .route("loadbalancers describe", "loadbalancers#describe")
        .route(&format!("show loadbalancer {}id", marker), "loadbalancers#show")
        .route("config save", "config#save");

    let mut rows: Vec<RouteRow> = router
        .routes()
        .iter()
        .map(|route| RouteRow {
            pattern: route.pattern().to_string(),
            target:  route.label().to_string(),
        })
        .collect();
    rows.extend(["routes", "config"].map(|name| RouteRow {
        pattern: name.to_string(),
        target:  "<inline>".to_string(),
    }));

    let shown = config.clone();
    router
        .inline("routes", move |invocation: &Invocation| output::render_rows(&rows, invocation.format))
        .inline("config", move |_: &Invocation| shown.to_toml());
    router
}

impl Cli {
    pub fn invocation(&self, config: &Config) -> Invocation {
        let mut params: Map<String, Value> = self.params.iter().cloned().collect();
        if !self.nodes.is_empty() {
            let shorthand = self.nodes.iter().cloned().map(Value::String);
            let nodes = params.entry("nodes").or_insert(Value::Null);
            // a lone `--set nodes=...` value joins the list
            let given = match nodes.take() {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                other => vec![other],
            };
            *nodes = Value::Array(given.into_iter().chain(shorthand).collect());
        }

        Invocation {
            argv: self.command.clone(),
            params,
            format: self.format.unwrap_or(config.format),
        }
    }

    pub fn run(&self) -> Result<()> {
        let config: &Config = &CONFIG;
        let invocation = self.invocation(config);
        debug!("invocation: {:?}", invocation);

        let router = router(config, Arc::new(RandomNames));
        let text = router
            .call(&invocation)
            .wrap_err_with(|| format!("Failed to run `{}`", invocation.argv.join(" ")))?;
        println!("{}", text);
        Ok(())
    }
}
