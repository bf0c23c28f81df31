//! Declarative input forms and command routing for command-line tools.
//!
//! A [`form::FormDefinition`] turns a raw parameter map into a
//! [`form::FormInstance`] holding decoded values, decode errors and rule
//! violations. A [`router::Router`] maps tokenized command lines to handlers.

pub mod cli;
pub mod config;
pub mod decoding;
pub mod form;
pub mod loadbalancers;
pub mod naming;
pub mod output;
pub mod router;
