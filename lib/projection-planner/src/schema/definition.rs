//! Declarative schema documents, loaded from JSON.
//!
//! ```json
//! {
//!   "policies": { "admins_only": { "argument": "role", "equals": "admin" } },
//!   "types": {
//!     "Post": {
//!       "model": "Post",
//!       "fields": {
//!         "title": { "type": "String!" },
//!         "author": { "type": "User", "query": { "order_by": "id" } },
//!         "notes": { "type": "String", "privacy": { "policy": "admins_only" } }
//!       }
//!     }
//!   },
//!   "models": {
//!     "Post": { "relations": { "author": { "kind": "belongs_to", "foreign_key": "author_id" } } }
//!   }
//! }
//! ```

use std::{collections::HashMap, path::Path, sync::Arc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    privacy::{ArgumentMatch, NamedPolicy, Policy, PrivacyRule},
    request::RequestArguments,
    storage::{EagerQuery, QueryModifier},
};

use super::{
    error::SchemaError,
    field::{EagerLoadHint, FieldDescriptor},
    registry::{ObjectType, SchemaRegistry},
    relation::RelationDeclaration,
    type_ref::TypeRef,
};

/// Prefix marking a filter value as a reference to a request argument.
const ARGUMENT_REFERENCE_PREFIX: char = '$';

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scalars: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub policies: IndexMap<String, ArgumentMatch>,
    #[serde(default)]
    pub types: IndexMap<String, TypeDefinition>,
    #[serde(default)]
    pub models: IndexMap<String, ModelDefinition>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDefinition>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_selectable")]
    pub selectable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<PrivacyDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub always: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eager_load: Vec<EagerLoadHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryModifierDefinition>,
}

fn default_selectable() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrivacyDefinition {
    /// `{ "policy": "admins_only" }`, a policy declared under `policies`.
    Policy { policy: String },
    /// `{ "argument": "role", "equals": "admin" }`, checked on every use.
    Argument(ArgumentMatch),
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDefinition {
    #[serde(default)]
    pub relations: IndexMap<String, RelationDeclaration>,
}

/// Declarative query customization of a relation.
///
/// String filter values starting with `$` are read from the request
/// arguments; the filter is skipped when the argument is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryModifierDefinition {
    #[serde(rename = "where", default, skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default)]
    pub descending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl QueryModifierDefinition {
    pub fn into_modifier(self, name: impl Into<String>) -> QueryModifier {
        QueryModifier::new(name, move |query: &mut dyn EagerQuery, arguments| {
            self.apply(query, arguments)
        })
    }

    fn apply(&self, query: &mut dyn EagerQuery, arguments: &RequestArguments) {
        for (column, value) in &self.filters {
            match value
                .as_str()
                .and_then(|raw| raw.strip_prefix(ARGUMENT_REFERENCE_PREFIX))
            {
                Some(argument) => {
                    if let Some(value) = arguments.get(argument) {
                        query.where_eq(column, value);
                    }
                }
                None => query.where_eq(column, value),
            }
        }

        if let Some(column) = &self.order_by {
            query.order_by(column, self.descending);
        }

        if let Some(limit) = self.limit {
            query.limit(limit);
        }
    }
}

impl SchemaDefinition {
    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn into_registry(self) -> Result<SchemaRegistry, SchemaError> {
        let policies: HashMap<String, Arc<dyn Policy>> = self
            .policies
            .into_iter()
            .map(|(name, check)| {
                let policy: Arc<dyn Policy> = Arc::new(NamedPolicy::new(name.clone(), check));
                (name, policy)
            })
            .collect();

        let mut builder = SchemaRegistry::builder();

        for scalar in self.scalars {
            builder = builder.scalar(scalar);
        }

        for (type_name, type_definition) in self.types {
            let mut object_type = ObjectType::new(type_name.clone());
            if let Some(model) = type_definition.model {
                object_type = object_type.with_model(model);
            }

            for (field_name, field_definition) in type_definition.fields {
                let field =
                    field_definition.into_descriptor(&type_name, field_name, &policies)?;
                object_type = object_type.field(field);
            }

            builder = builder.object(object_type);
        }

        for (model, model_definition) in self.models {
            for (name, declaration) in model_definition.relations {
                builder = builder.relation(model.clone(), name, declaration);
            }
        }

        builder.build()
    }
}

impl FieldDefinition {
    fn into_descriptor(
        self,
        type_name: &str,
        field_name: String,
        policies: &HashMap<String, Arc<dyn Policy>>,
    ) -> Result<FieldDescriptor, SchemaError> {
        let privacy = match self.privacy {
            None => None,
            Some(PrivacyDefinition::Argument(check)) => {
                Some(PrivacyRule::predicate(move |arguments| check.matches(arguments)))
            }
            Some(PrivacyDefinition::Policy { policy }) => match policies.get(&policy) {
                Some(resolved) => Some(PrivacyRule::Policy(resolved.clone())),
                None => {
                    return Err(SchemaError::UnknownPolicy {
                        type_name: type_name.to_string(),
                        field_name,
                        policy,
                    })
                }
            },
        };

        let query = self
            .query
            .map(|definition| definition.into_modifier(format!("{type_name}.{field_name}")));

        Ok(FieldDescriptor {
            name: field_name,
            alias: self.alias,
            model: self.model,
            selectable: self.selectable,
            privacy,
            always: self.always,
            eager_load: self.eager_load,
            query,
            ty: self.ty,
        })
    }
}
