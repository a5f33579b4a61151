use std::fmt::Display;

use indexmap::{map::Entry, IndexMap};
use serde::Serialize;

use crate::utils::pretty_display::{get_indent, PrettyDisplay};

mod arguments;
pub mod operation;

pub use arguments::RequestArguments;
pub use operation::SelectionError;

/// Reserved introspection field, never backed by a column.
pub const TYPENAME_FIELD: &str = "__typename";

/// The nested field selection a client requested, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestedFieldTree {
    fields: IndexMap<String, RequestedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedField {
    Leaf,
    Selection(RequestedFieldTree),
}

/// Leaves serialize as `true`, selections as nested maps.
impl Serialize for RequestedField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RequestedField::Leaf => serializer.serialize_bool(true),
            RequestedField::Selection(tree) => tree.serialize(serializer),
        }
    }
}

impl RequestedField {
    pub fn as_selection(&self) -> Option<&RequestedFieldTree> {
        match self {
            RequestedField::Leaf => None,
            RequestedField::Selection(tree) => Some(tree),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, RequestedField::Leaf)
    }
}

impl RequestedFieldTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scalar selection.
    pub fn leaf(mut self, key: impl Into<String>) -> Self {
        self.insert(key.into(), RequestedField::Leaf);
        self
    }

    /// Adds a composite selection.
    pub fn selection(mut self, key: impl Into<String>, tree: RequestedFieldTree) -> Self {
        self.insert(key.into(), RequestedField::Selection(tree));
        self
    }

    /// Inserts a requested field, merging it with an existing entry of the same key.
    /// A composite selection always wins over a leaf.
    pub fn insert(&mut self, key: String, field: RequestedField) {
        match self.fields.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(field);
            }
            Entry::Occupied(mut entry) => {
                if let RequestedField::Selection(incoming) = field {
                    match entry.get_mut() {
                        RequestedField::Selection(existing) => existing.merge(incoming),
                        existing => *existing = RequestedField::Selection(incoming),
                    }
                }
            }
        }
    }

    pub fn merge(&mut self, other: RequestedFieldTree) {
        for (key, field) in other.fields {
            self.insert(key, field);
        }
    }

    pub fn get(&self, key: &str) -> Option<&RequestedField> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RequestedField)> {
        self.fields.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of nested levels, a flat selection has a depth of 1.
    pub fn depth(&self) -> usize {
        1 + self
            .fields
            .values()
            .filter_map(RequestedField::as_selection)
            .map(RequestedFieldTree::depth)
            .max()
            .unwrap_or(0)
    }

    /// The selection of the only top-level field, what the resolver of that
    /// field gets to see.
    pub fn root_field(&self) -> Option<(&str, &RequestedFieldTree)> {
        if self.fields.len() != 1 {
            return None;
        }

        self.iter()
            .find(|(key, _)| *key != TYPENAME_FIELD)
            .and_then(|(key, field)| field.as_selection().map(|tree| (key, tree)))
    }
}

impl Display for RequestedFieldTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pretty_fmt(f, 0)
    }
}

impl PrettyDisplay for RequestedFieldTree {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = get_indent(depth);
        writeln!(f, "{{")?;
        for (key, field) in &self.fields {
            match field {
                RequestedField::Leaf => writeln!(f, "{indent}  {key}")?,
                RequestedField::Selection(tree) => {
                    write!(f, "{indent}  {key} ")?;
                    tree.pretty_fmt(f, depth + 1)?;
                }
            }
        }
        writeln!(f, "{indent}}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_selections_win_over_leaves() {
        let mut tree = RequestedFieldTree::new().leaf("author");
        tree.insert(
            "author".to_string(),
            RequestedField::Selection(RequestedFieldTree::new().leaf("name")),
        );
        tree.insert("author".to_string(), RequestedField::Leaf);

        assert_eq!(
            tree.get("author").and_then(RequestedField::as_selection),
            Some(&RequestedFieldTree::new().leaf("name"))
        );
    }

    #[test]
    fn merges_nested_selections() {
        let mut tree = RequestedFieldTree::new()
            .selection("author", RequestedFieldTree::new().leaf("name"));
        tree.merge(
            RequestedFieldTree::new().selection(
                "author",
                RequestedFieldTree::new()
                    .leaf("email")
                    .selection("avatar", RequestedFieldTree::new().leaf("url")),
            ),
        );

        assert_eq!(tree.depth(), 3);
        insta::assert_snapshot!(format!("{}", tree), @r"
        {
          author {
            name
            email
            avatar {
              url
            }
          }
        }
        ");
    }
}
