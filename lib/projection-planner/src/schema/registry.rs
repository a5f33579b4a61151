use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::{debug, instrument};

use super::{
    error::SchemaError,
    field::FieldDescriptor,
    relation::{RelationDeclaration, RelationDescriptor, RelationError},
    RelationAdapter, SchemaAdapter,
};

static BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub model: Option<String>,
    pub fields: IndexMap<String, FieldDescriptor>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            fields: IndexMap::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

/// In-memory schema and model metadata, implementing both adapters the
/// planner consumes.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    types: HashMap<String, ObjectType>,
    scalars: HashSet<String>,
    relations: HashMap<String, IndexMap<String, RelationDeclaration>>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name)
    }

    pub fn is_scalar_type(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name) || self.scalars.contains(name)
    }

    pub fn relation_declaration(&self, model: &str, relation: &str) -> Option<&RelationDeclaration> {
        self.relations
            .get(model)
            .and_then(|relations| relations.get(relation))
    }
}

impl SchemaAdapter for SchemaRegistry {
    fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDescriptor> {
        self.types
            .get(type_name)
            .and_then(|object_type| object_type.fields.get(field_name))
    }

    fn contains_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    fn backing_model(&self, type_name: &str) -> Option<&str> {
        self.types
            .get(type_name)
            .and_then(|object_type| object_type.model.as_deref())
    }
}

impl RelationAdapter for SchemaRegistry {
    fn has_relation(&self, model: &str, relation: &str) -> bool {
        self.relation_declaration(model, relation).is_some()
    }

    fn describe_relation(
        &self,
        model: &str,
        relation: &str,
    ) -> Result<RelationDescriptor, RelationError> {
        let relations = self
            .relations
            .get(model)
            .ok_or_else(|| RelationError::UnknownModel(model.to_string()))?;

        relations
            .get(relation)
            .ok_or_else(|| RelationError::UnknownRelation {
                model: model.to_string(),
                relation: relation.to_string(),
            })?
            .resolve()
    }
}

#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    types: Vec<ObjectType>,
    scalars: HashSet<String>,
    relations: Vec<(String, String, RelationDeclaration)>,
}

impl SchemaRegistryBuilder {
    pub fn object(mut self, object_type: ObjectType) -> Self {
        self.types.push(object_type);
        self
    }

    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.scalars.insert(name.into());
        self
    }

    pub fn relation(
        mut self,
        model: impl Into<String>,
        name: impl Into<String>,
        declaration: RelationDeclaration,
    ) -> Self {
        self.relations.push((model.into(), name.into(), declaration));
        self
    }

    #[instrument(level = "trace", skip(self), fields(
        types = self.types.len(),
        relations = self.relations.len()
    ))]
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let mut registry = SchemaRegistry {
            scalars: self.scalars,
            ..Default::default()
        };

        for object_type in self.types {
            if registry.types.contains_key(&object_type.name) {
                return Err(SchemaError::DuplicateType(object_type.name));
            }

            registry
                .types
                .insert(object_type.name.clone(), object_type);
        }

        for (model, name, declaration) in self.relations {
            let relations = registry.relations.entry(model.clone()).or_default();
            if relations.contains_key(&name) {
                return Err(SchemaError::DuplicateRelation {
                    model,
                    relation: name,
                });
            }

            relations.insert(name, declaration);
        }

        registry.verify()?;
        debug!(
            types = registry.types.len(),
            models = registry.relations.len(),
            "schema registry built"
        );

        Ok(registry)
    }
}

impl SchemaRegistry {
    fn verify(&self) -> Result<(), SchemaError> {
        for object_type in self.types.values() {
            for field in object_type.fields.values() {
                let referenced = field.ty.named_type();

                if !self.types.contains_key(referenced) && !self.is_scalar_type(referenced) {
                    return Err(SchemaError::UnknownFieldType {
                        type_name: object_type.name.clone(),
                        field_name: field.name.clone(),
                        referenced: referenced.to_string(),
                    });
                }
            }
        }

        let known_models = self.known_models();
        for (model, relations) in &self.relations {
            for (name, declaration) in relations {
                if let Some(target) = declaration.target() {
                    if !known_models.contains(target) {
                        return Err(SchemaError::UnknownRelationTarget {
                            model: model.clone(),
                            relation: name.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    fn known_models(&self) -> HashSet<&str> {
        self.types
            .values()
            .flat_map(|object_type| {
                object_type.model.as_deref().into_iter().chain(
                    object_type
                        .fields
                        .values()
                        .filter_map(|field| field.model.as_deref()),
                )
            })
            .chain(self.relations.keys().map(String::as_str))
            .collect()
    }
}
