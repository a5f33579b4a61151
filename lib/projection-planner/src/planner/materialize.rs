use std::{fmt::Debug, sync::Arc};

use tracing::trace;

use crate::{request::RequestArguments, storage::EagerQuery};

use super::projection::{ProjectionNode, ProjectionPlan, RelationProjection};

/// What a storage layer needs to run one level of a plan.
#[derive(Debug, Clone)]
pub struct LoadInstructions {
    pub columns: Vec<String>,
    pub relations: Vec<(String, RelationLoader)>,
}

/// Applies one relation of a plan to the storage layer's eager-load query.
///
/// Loaders only read the plan and the request arguments captured when they
/// were created, so they can be cloned, moved across threads and invoked any
/// number of times.
#[derive(Clone)]
pub struct RelationLoader {
    relation: Arc<RelationProjection>,
    arguments: Arc<RequestArguments>,
}

impl RelationLoader {
    pub fn projection(&self) -> &RelationProjection {
        &self.relation
    }

    /// Runs the relation's query modifier, then selects its columns and
    /// registers its own relations as nested eager loads.
    pub fn apply(&self, query: &mut dyn EagerQuery) {
        if let Some(modifier) = &self.relation.modifier {
            trace!(modifier = modifier.name(), "applying relation query modifier");
            modifier.apply(query, &self.arguments);
        }

        query.select(&self.relation.node.column_list());

        let nested = self.relation.node.relation_loaders(&self.arguments);
        if !nested.is_empty() {
            query.with(nested);
        }
    }
}

impl Debug for RelationLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationLoader")
            .field("relation", &self.relation)
            .finish_non_exhaustive()
    }
}

impl ProjectionNode {
    fn materialize(&self, arguments: &Arc<RequestArguments>) -> LoadInstructions {
        LoadInstructions {
            columns: self.column_list(),
            relations: self.relation_loaders(arguments),
        }
    }

    fn relation_loaders(&self, arguments: &Arc<RequestArguments>) -> Vec<(String, RelationLoader)> {
        self.relations()
            .map(|(name, relation)| {
                (
                    name.to_string(),
                    RelationLoader {
                        relation: relation.clone(),
                        arguments: arguments.clone(),
                    },
                )
            })
            .collect()
    }
}

impl ProjectionPlan {
    /// Load instructions for the root level. Relation loaders capture the
    /// arguments the plan was compiled against.
    pub fn materialize(&self) -> LoadInstructions {
        self.root.materialize(&self.arguments)
    }
}
