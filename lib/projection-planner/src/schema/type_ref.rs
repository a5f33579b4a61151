use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::SchemaError;

const PAGINATED_OPEN: &str = "Paginated<";

/// A declared field type, possibly wrapped in list, non-null or pagination layers.
///
/// The textual form follows GraphQL SDL (`[Post!]!`), with pagination
/// envelopes written as `Paginated<Post>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
    Paginated(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    pub fn paginated(item: TypeRef) -> Self {
        TypeRef::Paginated(Box::new(item))
    }

    /// The type directly wrapped by this layer, `None` for named types.
    pub fn wrapped(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Named(_) => None,
            TypeRef::List(inner) | TypeRef::NonNull(inner) | TypeRef::Paginated(inner) => {
                Some(inner)
            }
        }
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }

    /// The innermost named type, after removing every wrapper.
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) | TypeRef::Paginated(inner) => {
                inner.named_type()
            }
        }
    }

    fn parse_prefix(input: &str) -> Result<(TypeRef, &str), SchemaError> {
        let input = input.trim_start();
        let invalid = || SchemaError::InvalidTypeReference(input.to_string());

        let (base, rest) = if let Some(rest) = input.strip_prefix('[') {
            let (inner, rest) = Self::parse_prefix(rest)?;
            let rest = rest.trim_start().strip_prefix(']').ok_or_else(invalid)?;
            (TypeRef::list(inner), rest)
        } else if let Some(rest) = input.strip_prefix(PAGINATED_OPEN) {
            let (inner, rest) = Self::parse_prefix(rest)?;
            let rest = rest.trim_start().strip_prefix('>').ok_or_else(invalid)?;
            (TypeRef::paginated(inner), rest)
        } else {
            let end = input
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(input.len());

            if end == 0 {
                return Err(invalid());
            }

            (TypeRef::named(&input[..end]), &input[end..])
        };

        match rest.trim_start().strip_prefix('!') {
            Some(rest) => Ok((TypeRef::non_null(base), rest)),
            None => Ok((base, rest)),
        }
    }
}

impl FromStr for TypeRef {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_ref, rest) = Self::parse_prefix(s)?;

        if !rest.trim().is_empty() {
            return Err(SchemaError::InvalidTypeReference(s.to_string()));
        }

        Ok(type_ref)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{name}"),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
            TypeRef::Paginated(inner) => write!(f, "{PAGINATED_OPEN}{inner}>"),
        }
    }
}
