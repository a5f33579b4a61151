use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    request::{RequestArguments, RequestedFieldTree},
    schema::{type_ref::TypeRef, RelationAdapter, SchemaAdapter},
};

use self::{
    compiler::SelectionCompiler,
    error::PlanError,
    projection::{ProjectionNode, ProjectionPlan},
};

mod compiler;
pub mod error;
pub mod materialize;
pub mod projection;

pub const DEFAULT_EMBEDDED_SEPARATOR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Joins an embedded field's name and the names of its own fields.
    pub embedded_separator: String,
    /// Keys of a pagination envelope that hold the paginated items.
    pub pagination_item_fields: Vec<String>,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            embedded_separator: DEFAULT_EMBEDDED_SEPARATOR.to_string(),
            pagination_item_fields: vec!["data".to_string(), "edges".to_string()],
        }
    }
}

impl PlannerOptions {
    pub fn is_pagination_item_field(&self, key: &str) -> bool {
        self.pagination_item_fields.iter().any(|field| field == key)
    }
}

/// Compiles requested-field trees into projection plans.
///
/// A planner only holds shared references to its schema, so one instance can
/// serve any number of requests, concurrently. Every call to [`plan`] runs its
/// own compilation pass with its own privacy memo.
///
/// [`plan`]: ProjectionPlanner::plan
pub struct ProjectionPlanner<'s, S, R> {
    schema: &'s S,
    relations: &'s R,
    options: PlannerOptions,
}

impl<'s, S, R> ProjectionPlanner<'s, S, R>
where
    S: SchemaAdapter,
    R: RelationAdapter,
{
    pub fn new(schema: &'s S, relations: &'s R) -> Self {
        Self {
            schema,
            relations,
            options: PlannerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PlannerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    #[instrument(level = "trace", skip_all, fields(root_type = %root_type))]
    pub fn plan(
        &self,
        requested: &RequestedFieldTree,
        root_type: &TypeRef,
        arguments: &RequestArguments,
    ) -> Result<ProjectionPlan, PlanError> {
        let mut compiler =
            SelectionCompiler::new(self.schema, self.relations, &self.options, arguments);
        let mut root = ProjectionNode::default();

        compiler.compile_root(requested, root_type, &mut root)?;

        let plan = ProjectionPlan {
            root,
            null_resolved: compiler.into_null_resolved(),
            arguments: Arc::new(arguments.clone()),
        };

        debug!(
            null_resolved = plan.null_resolved.len(),
            "projection plan compiled"
        );

        Ok(plan)
    }
}
