#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid type reference '{0}'")]
    InvalidTypeReference(String),
    #[error("type '{0}' is defined more than once")]
    DuplicateType(String),
    #[error("field '{type_name}.{field_name}' refers to unknown type '{referenced}'")]
    UnknownFieldType {
        type_name: String,
        field_name: String,
        referenced: String,
    },
    #[error("field '{type_name}.{field_name}' refers to unknown policy '{policy}'")]
    UnknownPolicy {
        type_name: String,
        field_name: String,
        policy: String,
    },
    #[error("relation '{model}.{relation}' is declared more than once")]
    DuplicateRelation { model: String, relation: String },
    #[error("relation '{model}.{relation}' targets unknown model '{target}'")]
    UnknownRelationTarget {
        model: String,
        relation: String,
        target: String,
    },
    #[error("failed to read schema definition: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse schema definition: {0}")]
    Parse(#[from] serde_json::Error),
}
