use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// To-one, the current record holds the key (`post.author_id -> users.id`).
    BelongsTo,
    /// To-one, the related record holds the key (`users.id <- profiles.user_id`).
    HasOne,
    /// To-many, the related records hold the key (`users.id <- posts.user_id`).
    HasMany,
    /// Polymorphic to-one, the current record holds an id and a type column.
    MorphTo,
    /// Polymorphic to-many, the related records hold an id and a type column.
    MorphMany,
}

impl RelationKind {
    pub fn is_to_many(&self) -> bool {
        matches!(self, RelationKind::HasMany | RelationKind::MorphMany)
    }

    /// Whether the current (owning) record stores the foreign key of the relation.
    pub fn is_owning(&self) -> bool {
        matches!(self, RelationKind::BelongsTo | RelationKind::MorphTo)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
            RelationKind::MorphTo => "morph_to",
            RelationKind::MorphMany => "morph_many",
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RelationError {
    #[error("model '{0}' is not known")]
    UnknownModel(String),
    #[error("model '{model}' has no relation named '{relation}'")]
    UnknownRelation { model: String, relation: String },
    #[error("{kind} relation declares no {side} key columns")]
    MissingKeys { kind: RelationKind, side: &'static str },
}

/// Key metadata of a relation, oriented from the record that traverses it.
///
/// `local_keys` always live on the current record and `foreign_keys` on the
/// related one, whatever the kind. Both lists are non-empty and hold bare
/// column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    pub kind: RelationKind,
    pub local_keys: Vec<String>,
    pub foreign_keys: Vec<String>,
}

impl RelationDescriptor {
    pub fn new<L, F>(kind: RelationKind, local_keys: L, foreign_keys: F) -> Result<Self, RelationError>
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        let local_keys = bare_columns(local_keys);
        let foreign_keys = bare_columns(foreign_keys);

        if local_keys.is_empty() {
            return Err(RelationError::MissingKeys { kind, side: "local" });
        }

        if foreign_keys.is_empty() {
            return Err(RelationError::MissingKeys {
                kind,
                side: "foreign",
            });
        }

        Ok(Self {
            kind,
            local_keys,
            foreign_keys,
        })
    }

    /// `foreign_key` lives on the current record, `owner_key` on the owner.
    pub fn belongs_to(foreign_key: &str, owner_key: &str) -> Result<Self, RelationError> {
        Self::new(RelationKind::BelongsTo, [foreign_key], [owner_key])
    }

    /// `foreign_key` lives on the related record, `local_key` on the current one.
    pub fn has_one(foreign_key: &str, local_key: &str) -> Result<Self, RelationError> {
        Self::new(RelationKind::HasOne, [local_key], [foreign_key])
    }

    pub fn has_many(foreign_key: &str, local_key: &str) -> Result<Self, RelationError> {
        Self::new(RelationKind::HasMany, [local_key], [foreign_key])
    }

    pub fn morph_to(id_column: &str, type_column: &str, owner_key: &str) -> Result<Self, RelationError> {
        Self::new(RelationKind::MorphTo, [id_column, type_column], [owner_key])
    }

    pub fn morph_many(id_column: &str, type_column: &str, local_key: &str) -> Result<Self, RelationError> {
        Self::new(RelationKind::MorphMany, [local_key], [id_column, type_column])
    }

    /// Columns the current level has to select for the relation to be joined.
    pub fn parent_columns(&self) -> &[String] {
        &self.local_keys
    }

    /// Columns the related level has to select for the relation to be joined.
    pub fn child_columns(&self) -> &[String] {
        &self.foreign_keys
    }
}

/// One or more key columns, written either as a single name or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyColumns {
    One(String),
    Many(Vec<String>),
}

impl KeyColumns {
    pub fn as_slice(&self) -> &[String] {
        match self {
            KeyColumns::One(column) => std::slice::from_ref(column),
            KeyColumns::Many(columns) => columns,
        }
    }
}

impl Default for KeyColumns {
    fn default() -> Self {
        KeyColumns::One(DEFAULT_PRIMARY_KEY.to_string())
    }
}

impl From<&str> for KeyColumns {
    fn from(value: &str) -> Self {
        KeyColumns::One(value.to_string())
    }
}

const DEFAULT_PRIMARY_KEY: &str = "id";

/// A relation-traversal method as declared on a model, in the storage
/// layer's own vocabulary. Resolving it yields a [`RelationDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationDeclaration {
    BelongsTo {
        foreign_key: KeyColumns,
        #[serde(default)]
        owner_key: KeyColumns,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    HasOne {
        foreign_key: KeyColumns,
        #[serde(default)]
        local_key: KeyColumns,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    HasMany {
        foreign_key: KeyColumns,
        #[serde(default)]
        local_key: KeyColumns,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    MorphTo {
        id_column: String,
        type_column: String,
        #[serde(default)]
        owner_key: KeyColumns,
    },
    MorphMany {
        id_column: String,
        type_column: String,
        #[serde(default)]
        local_key: KeyColumns,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
}

impl RelationDeclaration {
    pub fn belongs_to(foreign_key: impl Into<KeyColumns>) -> Self {
        RelationDeclaration::BelongsTo {
            foreign_key: foreign_key.into(),
            owner_key: KeyColumns::default(),
            target: None,
        }
    }

    pub fn has_one(foreign_key: impl Into<KeyColumns>) -> Self {
        RelationDeclaration::HasOne {
            foreign_key: foreign_key.into(),
            local_key: KeyColumns::default(),
            target: None,
        }
    }

    pub fn has_many(foreign_key: impl Into<KeyColumns>) -> Self {
        RelationDeclaration::HasMany {
            foreign_key: foreign_key.into(),
            local_key: KeyColumns::default(),
            target: None,
        }
    }

    pub fn morph_to(id_column: impl Into<String>, type_column: impl Into<String>) -> Self {
        RelationDeclaration::MorphTo {
            id_column: id_column.into(),
            type_column: type_column.into(),
            owner_key: KeyColumns::default(),
        }
    }

    pub fn morph_many(id_column: impl Into<String>, type_column: impl Into<String>) -> Self {
        RelationDeclaration::MorphMany {
            id_column: id_column.into(),
            type_column: type_column.into(),
            local_key: KeyColumns::default(),
            target: None,
        }
    }

    pub fn kind(&self) -> RelationKind {
        match self {
            RelationDeclaration::BelongsTo { .. } => RelationKind::BelongsTo,
            RelationDeclaration::HasOne { .. } => RelationKind::HasOne,
            RelationDeclaration::HasMany { .. } => RelationKind::HasMany,
            RelationDeclaration::MorphTo { .. } => RelationKind::MorphTo,
            RelationDeclaration::MorphMany { .. } => RelationKind::MorphMany,
        }
    }

    /// The related model, when the declaration names it.
    pub fn target(&self) -> Option<&str> {
        match self {
            RelationDeclaration::BelongsTo { target, .. }
            | RelationDeclaration::HasOne { target, .. }
            | RelationDeclaration::HasMany { target, .. }
            | RelationDeclaration::MorphMany { target, .. } => target.as_deref(),
            RelationDeclaration::MorphTo { .. } => None,
        }
    }

    /// Orients the declared keys from the traversing record's point of view.
    pub fn resolve(&self) -> Result<RelationDescriptor, RelationError> {
        let kind = self.kind();

        match self {
            RelationDeclaration::BelongsTo {
                foreign_key,
                owner_key,
                ..
            } => RelationDescriptor::new(kind, foreign_key.as_slice(), owner_key.as_slice()),
            RelationDeclaration::HasOne {
                foreign_key,
                local_key,
                ..
            }
            | RelationDeclaration::HasMany {
                foreign_key,
                local_key,
                ..
            } => RelationDescriptor::new(kind, local_key.as_slice(), foreign_key.as_slice()),
            RelationDeclaration::MorphTo {
                id_column,
                type_column,
                owner_key,
            } => RelationDescriptor::new(kind, [id_column, type_column], owner_key.as_slice()),
            RelationDeclaration::MorphMany {
                id_column,
                type_column,
                local_key,
                ..
            } => RelationDescriptor::new(kind, local_key.as_slice(), [id_column, type_column]),
        }
    }
}

/// Strips the table qualification of a column name: `posts.user_id` becomes `user_id`.
pub fn unqualified_column(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, column)| column)
}

fn bare_columns<I>(columns: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut bare: Vec<String> = Vec::new();

    for column in columns {
        let column = unqualified_column(column.as_ref().trim());
        if !column.is_empty() && !bare.iter().any(|existing| existing == column) {
            bare.push(column.to_string());
        }
    }

    bare
}
