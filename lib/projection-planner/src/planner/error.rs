use crate::schema::relation::RelationError;

/// Schema defects found while compiling a plan. None of them can be worked
/// around by a single request, so planning stops at the first one.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlanError {
    #[error("type '{0}' is not defined in the schema")]
    UnknownType(String),
    #[error("type reference '{0}' does not resolve to a named type")]
    UnresolvableType(String),
    #[error("field '{type_name}.{field_name}' traverses relation '{relation}' of model '{model}' with unresolvable keys: {source}")]
    UnresolvableRelation {
        type_name: String,
        field_name: String,
        model: String,
        relation: String,
        #[source]
        source: RelationError,
    },
}
