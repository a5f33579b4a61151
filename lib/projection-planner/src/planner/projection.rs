use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter as FmtFormatter, Result as FmtResult},
    sync::Arc,
};

use serde::Serialize;

use crate::{
    request::RequestArguments,
    storage::QueryModifier,
    utils::pretty_display::{get_indent, write_joined, PrettyDisplay},
};

/// Columns to select on one traversal level, plus the relations to eager-load from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionNode {
    columns: BTreeSet<String>,
    relations: BTreeMap<String, Arc<RelationProjection>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelationProjection {
    #[serde(flatten)]
    pub node: ProjectionNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<QueryModifier>,
}

impl ProjectionNode {
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn column_list(&self) -> Vec<String> {
        self.columns.iter().cloned().collect()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationProjection> {
        self.relations.get(name).map(Arc::as_ref)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &Arc<RelationProjection>)> {
        self.relations.iter().map(|(name, relation)| (name.as_str(), relation))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.relations.is_empty()
    }

    pub(crate) fn add_column(&mut self, column: &str) {
        if !self.columns.contains(column) {
            self.columns.insert(column.to_string());
        }
    }

    pub(crate) fn add_columns<'c, I>(&mut self, columns: I)
    where
        I: IntoIterator<Item = &'c String>,
    {
        for column in columns {
            self.add_column(column);
        }
    }

    /// The relation entry called `name`, created empty when missing.
    pub(crate) fn relation_entry(&mut self, name: &str) -> &mut RelationProjection {
        let relation = self.relations.entry(name.to_string()).or_default();
        Arc::make_mut(relation)
    }

    /// The node reached by following `path` through relation entries, creating
    /// missing entries on the way.
    pub(crate) fn node_at_path(&mut self, path: &[&str]) -> &mut ProjectionNode {
        match path.split_first() {
            None => self,
            Some((first, rest)) => self.relation_entry(first).node.node_at_path(rest),
        }
    }
}

/// A field whose resolution must yield null, written as `Type.field`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FieldCoordinate {
    pub type_name: String,
    pub field_name: String,
}

impl FieldCoordinate {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl Display for FieldCoordinate {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// The outcome of planning one request: what to fetch, and which fields
/// were denied and have to resolve to null.
///
/// The plan keeps the request arguments it was compiled against; its relation
/// loaders hand exactly those to query modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionPlan {
    pub root: ProjectionNode,
    pub null_resolved: BTreeSet<FieldCoordinate>,
    #[serde(skip)]
    pub(crate) arguments: Arc<RequestArguments>,
}

impl ProjectionPlan {
    pub fn is_null_resolved(&self, type_name: &str, field_name: &str) -> bool {
        self.null_resolved
            .contains(&FieldCoordinate::new(type_name, field_name))
    }

    pub fn arguments(&self) -> &RequestArguments {
        &self.arguments
    }
}

impl Display for ProjectionPlan {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

impl Display for ProjectionNode {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

impl PrettyDisplay for ProjectionPlan {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(f, "{indent}ProjectionPlan {{")?;
        self.root.pretty_fmt(f, depth + 1)?;

        if !self.null_resolved.is_empty() {
            let coordinates = self
                .null_resolved
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            write!(f, "{}NullResolved(", get_indent(depth + 1))?;
            write_joined(f, coordinates.iter().map(String::as_str))?;
            writeln!(f, "),")?;
        }

        writeln!(f, "{indent}}}")?;
        Ok(())
    }
}

impl PrettyDisplay for ProjectionNode {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        write!(f, "{indent}Columns(")?;
        write_joined(f, self.columns())?;
        writeln!(f, "),")?;

        for (name, relation) in &self.relations {
            match &relation.modifier {
                Some(modifier) => writeln!(
                    f,
                    "{indent}Relation({name}, query: {}) {{",
                    modifier.name()
                )?,
                None => writeln!(f, "{indent}Relation({name}) {{")?,
            }
            relation.node.pretty_fmt(f, depth + 1)?;
            writeln!(f, "{indent}}},")?;
        }

        Ok(())
    }
}
