use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::RequestArguments;

/// A reusable, named access check. Its name is its identity: within one
/// planning pass, fields referencing the same name share one evaluation.
pub trait Policy: Send + Sync {
    fn name(&self) -> &str;

    fn fire(&self, arguments: &RequestArguments) -> bool;
}

/// Grants access when a request argument equals a fixed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentMatch {
    pub argument: String,
    pub equals: Value,
}

impl ArgumentMatch {
    pub fn new(argument: impl Into<String>, equals: impl Into<Value>) -> Self {
        Self {
            argument: argument.into(),
            equals: equals.into(),
        }
    }

    pub fn matches(&self, arguments: &RequestArguments) -> bool {
        arguments.get(&self.argument) == Some(&self.equals)
    }
}

#[derive(Debug, Clone)]
pub struct NamedPolicy {
    name: String,
    check: ArgumentMatch,
}

impl NamedPolicy {
    pub fn new(name: impl Into<String>, check: ArgumentMatch) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl Policy for NamedPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn fire(&self, arguments: &RequestArguments) -> bool {
        self.check.matches(arguments)
    }
}
