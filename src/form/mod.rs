//! Declarative forms: inputs, decode chains, validation rules and the
//! instances they produce from raw parameter maps.

mod decode;
mod definition;
mod input;
mod instance;
mod validate;

pub use decode::{DecodeError, Transform};
pub use definition::{DefinitionError, FormBuilder, FormDefinition, InputSummary};
pub use input::{DefaultValue, Generator, InputSpec, Kind, Shape};
pub use instance::{AccessError, FormInstance};
pub use validate::{Message, MessageKind, Outcome, Rule, RuleError, ValidationResult};
