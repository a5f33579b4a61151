use std::{fmt::Debug, sync::Arc};

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{planner::materialize::RelationLoader, request::RequestArguments};

/// The query-building surface a storage layer exposes while eager-loading a
/// relation. Relation loaders and query modifiers drive it; the planner itself
/// never executes anything.
pub trait EagerQuery {
    fn select(&mut self, columns: &[String]);

    /// Registers nested relations to eager-load, each with its own loader.
    fn with(&mut self, relations: Vec<(String, RelationLoader)>);

    fn where_eq(&mut self, column: &str, value: &Value);

    fn order_by(&mut self, column: &str, descending: bool);

    fn limit(&mut self, limit: u64);
}

pub type QueryModifierFn = dyn Fn(&mut dyn EagerQuery, &RequestArguments) + Send + Sync;

/// A per-relation query customization declared on a field.
///
/// Two modifiers are equal only when they share the same function value.
#[derive(Clone)]
pub struct QueryModifier {
    name: String,
    apply: Arc<QueryModifierFn>,
}

impl QueryModifier {
    pub fn new<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&mut dyn EagerQuery, &RequestArguments) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, query: &mut dyn EagerQuery, arguments: &RequestArguments) {
        (self.apply)(query, arguments)
    }
}

impl PartialEq for QueryModifier {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.apply, &other.apply)
    }
}

impl Debug for QueryModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "QueryModifier({})", self.name)
    }
}

impl Serialize for QueryModifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}
