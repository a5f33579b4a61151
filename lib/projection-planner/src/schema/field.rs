use serde::{Deserialize, Serialize};

use crate::{privacy::PrivacyRule, storage::QueryModifier};

use super::type_ref::TypeRef;

/// Schema-declared extra relation columns a field depends on.
///
/// Resolving the field also needs `select` from `relation`, joined through
/// `foreign_key`. The foreign key is selected on the level holding the
/// relation, and on the related level as well unless `reference_key` names
/// a different column there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EagerLoadHint {
    /// Relation name, relative to the level the field is compiled at. Nested
    /// relations are separated with dots (`orders.items`).
    pub relation: String,
    #[serde(rename = "foreignKey", alias = "foreign_key")]
    pub foreign_key: String,
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(
        rename = "referenceKey",
        alias = "reference_key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_key: Option<String>,
}

impl EagerLoadHint {
    pub fn new(relation: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            foreign_key: foreign_key.into(),
            select: Vec::new(),
            reference_key: None,
        }
    }

    pub fn select<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.select.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn reference_key(mut self, column: impl Into<String>) -> Self {
        self.reference_key = Some(column.into());
        self
    }

    /// The key column selected on the related level.
    pub fn related_key(&self) -> &str {
        self.reference_key.as_deref().unwrap_or(&self.foreign_key)
    }

    /// The relation path split into segments.
    pub fn relation_path(&self) -> Vec<&str> {
        self.relation
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    /// Overrides `name` as the storage-level column or relation name.
    pub alias: Option<String>,
    /// The model backing the field's target type, when the type declares none.
    pub model: Option<String>,
    pub selectable: bool,
    pub privacy: Option<PrivacyRule>,
    /// Columns selected whenever the field is requested, even when access is denied.
    pub always: Vec<String>,
    pub eager_load: Vec<EagerLoadHint>,
    pub query: Option<QueryModifier>,
    pub ty: TypeRef,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            alias: None,
            model: None,
            selectable: true,
            privacy: None,
            always: Vec::new(),
            eager_load: Vec::new(),
            query: None,
            ty,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn not_selectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    pub fn privacy(mut self, rule: PrivacyRule) -> Self {
        self.privacy = Some(rule);
        self
    }

    pub fn always<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.always.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn eager_load(mut self, hint: EagerLoadHint) -> Self {
        self.eager_load.push(hint);
        self
    }

    pub fn query(mut self, modifier: QueryModifier) -> Self {
        self.query = Some(modifier);
        self
    }

    /// The storage-level name of the field: the alias when present, the name otherwise.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
