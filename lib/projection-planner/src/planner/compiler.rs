use std::collections::BTreeSet;

use tracing::{debug, instrument, trace};

use crate::{
    privacy::{PrivacyEvaluator, PrivacyOutcome},
    request::{RequestArguments, RequestedField, RequestedFieldTree, TYPENAME_FIELD},
    schema::{field::FieldDescriptor, type_ref::TypeRef, RelationAdapter, SchemaAdapter},
};

use super::{
    error::PlanError,
    projection::{FieldCoordinate, ProjectionNode},
    PlannerOptions,
};

/// Where the fields being compiled land: the column prefix of embedded
/// objects, and the model backing the current record.
#[derive(Debug, Clone, Default)]
struct Scope<'s> {
    prefix: String,
    model: Option<&'s str>,
}

impl<'s> Scope<'s> {
    fn column(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn embedded(&self, field_name: &str, separator: &str, model: Option<&'s str>) -> Self {
        Self {
            prefix: format!("{}{}{}", self.prefix, field_name, separator),
            model,
        }
    }
}

/// One compilation pass. Owns the pass-scoped privacy memo, and is dropped
/// once the plan is built.
pub(crate) struct SelectionCompiler<'a, S, R> {
    schema: &'a S,
    relations: &'a R,
    options: &'a PlannerOptions,
    privacy: PrivacyEvaluator<'a>,
    null_resolved: BTreeSet<FieldCoordinate>,
}

impl<'a, S, R> SelectionCompiler<'a, S, R>
where
    S: SchemaAdapter,
    R: RelationAdapter,
{
    pub(crate) fn new(
        schema: &'a S,
        relations: &'a R,
        options: &'a PlannerOptions,
        arguments: &'a RequestArguments,
    ) -> Self {
        Self {
            schema,
            relations,
            options,
            privacy: PrivacyEvaluator::new(arguments),
            null_resolved: BTreeSet::new(),
        }
    }

    pub(crate) fn compile_root(
        &mut self,
        requested: &RequestedFieldTree,
        ty: &'a TypeRef,
        root: &mut ProjectionNode,
    ) -> Result<(), PlanError> {
        self.compile_selection(requested, ty, &Scope::default(), root)
    }

    pub(crate) fn into_null_resolved(self) -> BTreeSet<FieldCoordinate> {
        self.null_resolved
    }

    #[instrument(level = "trace", skip_all, fields(ty = %ty, prefix = scope.prefix.as_str()))]
    fn compile_selection(
        &mut self,
        requested: &RequestedFieldTree,
        ty: &'a TypeRef,
        scope: &Scope<'a>,
        node: &mut ProjectionNode,
    ) -> Result<(), PlanError> {
        let mut current = ty;
        while let Some(inner) = self.schema.unwrap_type(current) {
            if self.schema.is_pagination_wrapper(current) {
                return self.compile_pagination_envelope(requested, inner, scope, node);
            }
            current = inner;
        }

        let type_name = current
            .as_named()
            .ok_or_else(|| PlanError::UnresolvableType(ty.to_string()))?;

        if !self.schema.contains_type(type_name) {
            return Err(PlanError::UnknownType(type_name.to_string()));
        }

        let scope = Scope {
            prefix: scope.prefix.clone(),
            model: self.schema.backing_model(type_name).or(scope.model),
        };

        for (key, requested_field) in requested.iter() {
            if key == TYPENAME_FIELD {
                continue;
            }

            let Some(field) = self.schema.field(type_name, key) else {
                trace!(key, type_name, "no field descriptor, selecting as a raw column");
                node.add_column(&scope.column(key));
                continue;
            };

            match self.privacy.evaluate(field) {
                PrivacyOutcome::Denied => {
                    debug!(type_name, field = key, "access denied, field resolves to null");
                    self.null_resolved
                        .insert(FieldCoordinate::new(type_name, key));
                    node.add_columns(&field.always);
                    continue;
                }
                PrivacyOutcome::AllowedNotSelectable => {
                    node.add_columns(&field.always);
                    continue;
                }
                PrivacyOutcome::Allowed => {}
            }

            self.apply_eager_load(field, node);

            match requested_field {
                RequestedField::Leaf => {
                    node.add_column(&scope.column(field.output_name()));
                    node.add_columns(&field.always);
                }
                RequestedField::Selection(selection) => {
                    node.add_columns(&field.always);
                    self.compile_composite(type_name, key, field, selection, &scope, node)?;
                }
            }
        }

        Ok(())
    }

    /// Only the envelope's item fields reach storage; they are compiled on the
    /// same level, against the item type.
    fn compile_pagination_envelope(
        &mut self,
        requested: &RequestedFieldTree,
        item_type: &'a TypeRef,
        scope: &Scope<'a>,
        node: &mut ProjectionNode,
    ) -> Result<(), PlanError> {
        for (key, requested_field) in requested.iter() {
            match requested_field {
                RequestedField::Selection(selection)
                    if self.options.is_pagination_item_field(key) =>
                {
                    self.compile_selection(selection, item_type, scope, node)?;
                }
                _ => trace!(key, "pagination envelope field skipped"),
            }
        }

        Ok(())
    }

    fn compile_composite(
        &mut self,
        type_name: &str,
        key: &str,
        field: &'a FieldDescriptor,
        selection: &RequestedFieldTree,
        scope: &Scope<'a>,
        node: &mut ProjectionNode,
    ) -> Result<(), PlanError> {
        let Some(model) = scope.model else {
            trace!(key, "no backing model, compiling in place");
            return self.compile_selection(selection, &field.ty, scope, node);
        };

        let relation_name = field.output_name();
        if !self.relations.has_relation(model, relation_name) {
            trace!(key, model, "embedded object, flattening into the current level");
            let embedded = scope.embedded(relation_name, &self.options.embedded_separator, Some(model));
            return self.compile_selection(selection, &field.ty, &embedded, node);
        }

        let relation = self
            .relations
            .describe_relation(model, relation_name)
            .map_err(|source| PlanError::UnresolvableRelation {
                type_name: type_name.to_string(),
                field_name: key.to_string(),
                model: model.to_string(),
                relation: relation_name.to_string(),
                source,
            })?;

        debug!(
            model,
            relation = relation_name,
            kind = %relation.kind,
            "eager-loading relation"
        );

        node.add_columns(relation.parent_columns());

        let entry = node.relation_entry(relation_name);
        entry.node.add_columns(relation.child_columns());
        if let Some(modifier) = &field.query {
            entry.modifier = Some(modifier.clone());
        }

        let child_scope = Scope {
            prefix: String::new(),
            model: field.model.as_deref(),
        };

        self.compile_selection(selection, &field.ty, &child_scope, &mut entry.node)
    }

    /// Widens the plan with the relations a field depends on, relative to the
    /// current level. Entries created here merge with the ones created when the
    /// same relation is requested explicitly.
    fn apply_eager_load(&self, field: &FieldDescriptor, node: &mut ProjectionNode) {
        for hint in &field.eager_load {
            let path = hint.relation_path();
            let Some((relation, parents)) = path.split_last() else {
                continue;
            };

            trace!(field = field.name.as_str(), relation = hint.relation.as_str(), "eager-load hint");

            let parent = node.node_at_path(parents);
            parent.add_column(&hint.foreign_key);

            let target = &mut parent.relation_entry(relation).node;
            target.add_columns(&hint.select);
            target.add_column(hint.related_key());
        }
    }
}
