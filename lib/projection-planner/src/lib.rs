pub mod planner;
pub mod privacy;
pub mod request;
pub mod schema;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod tests;

pub use planner::{
    error::PlanError,
    projection::{FieldCoordinate, ProjectionNode, ProjectionPlan, RelationProjection},
    PlannerOptions, ProjectionPlanner,
};
pub use privacy::{PrivacyEvaluator, PrivacyOutcome, PrivacyRule};
pub use request::{RequestArguments, RequestedField, RequestedFieldTree};
pub use schema::{
    field::{EagerLoadHint, FieldDescriptor},
    relation::{RelationDescriptor, RelationError, RelationKind},
    registry::SchemaRegistry,
    type_ref::TypeRef,
    RelationAdapter, SchemaAdapter,
};
pub use storage::{EagerQuery, QueryModifier};
