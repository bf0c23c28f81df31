//! Load-balancer forms and the actions that use them.

mod actions;
mod form;

pub use actions::{actions, Settings};
pub use form::{definition, node, NODE_SHORTHAND, PORT_RANGE};

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Node {
    pub address: IpAddr,
    pub port: u16,
    #[serde(rename = "type")]
    pub kind: String,
    pub condition: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoadBalancer {
    pub name: String,
    pub port: u16,
    pub protocol: String,
    pub virtual_ips: Vec<String>,
    pub nodes: Vec<Node>,
}
