use field::FieldDescriptor;
use relation::{RelationDescriptor, RelationError};
use type_ref::TypeRef;

pub mod definition;
pub mod error;
pub mod field;
pub mod registry;
pub mod relation;
pub mod type_ref;

/// Read-only view of the object types the compiler walks.
pub trait SchemaAdapter {
    /// Looks up a field of an object type by its schema name.
    fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDescriptor>;

    fn contains_type(&self, type_name: &str) -> bool;

    /// The storage model an object type is backed by, if any.
    fn backing_model(&self, type_name: &str) -> Option<&str>;

    /// Removes one wrapper layer (list, non-null or pagination).
    fn unwrap_type<'t>(&self, ty: &'t TypeRef) -> Option<&'t TypeRef> {
        ty.wrapped()
    }

    fn is_pagination_wrapper(&self, ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Paginated(_))
    }
}

/// Read-only view of the relation-traversal methods of storage models.
pub trait RelationAdapter {
    fn has_relation(&self, model: &str, relation: &str) -> bool;

    fn describe_relation(
        &self,
        model: &str,
        relation: &str,
    ) -> Result<RelationDescriptor, RelationError>;
}
