//! Attribute listing: which fields of a class get persisted, and how.

use crate::schema::{FieldShape, PrimitiveCollectionMode, TypeSchema};

/// How the reconciler writes an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// A property on the owning node (scalars, and scalar arrays written as
    /// multi-value properties).
    Scalar,
    /// A child node holding a nested object.
    Object,
    /// A set of child nodes, one per element.
    Collection,
    /// A set of child nodes named by the map keys.
    Map,
}

impl AttributeKind {
    /// Returns `true` for attributes that produce child nodes.
    pub fn is_complex(&self) -> bool {
        !matches!(self, Self::Scalar)
    }
}

/// A persistable field of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Field name on the object.
    pub field: String,
    /// Name in the store (property name or container node name).
    pub name: String,
    pub shape: FieldShape,
    pub kind: AttributeKind,
    /// Children are written directly under the owning node.
    pub direct_descendants: bool,
}

/// List the persistable attributes of `schema`, in declaration order (base
/// classes first).
///
/// Excluded are transient fields, fields whose same-named accessor is
/// transient, and fields of unsupported shape. Scalar arrays become
/// [`AttributeKind::Scalar`] or [`AttributeKind::Collection`] depending on
/// the field's own mode, falling back to `default_mode`.
pub fn persistable_attributes(
    schema: &TypeSchema,
    default_mode: PrimitiveCollectionMode,
) -> Vec<Attribute> {
    schema
        .all_fields()
        .into_iter()
        .filter(|field| !field.transient)
        .filter(|field| {
            !schema
                .accessor(&field.name)
                .is_some_and(|accessor| accessor.transient)
        })
        .filter_map(|field| {
            let kind = match field.shape {
                FieldShape::Scalar(_) => AttributeKind::Scalar,
                FieldShape::ScalarArray(_) => {
                    match field.primitive_collection.unwrap_or(default_mode) {
                        PrimitiveCollectionMode::Property => AttributeKind::Scalar,
                        PrimitiveCollectionMode::ChildNodes => AttributeKind::Collection,
                    }
                }
                FieldShape::Object => AttributeKind::Object,
                FieldShape::Collection => AttributeKind::Collection,
                FieldShape::Map => AttributeKind::Map,
                FieldShape::Unsupported => return None,
            };
            Some(Attribute {
                field: field.name.clone(),
                name: field.external_name().to_string(),
                shape: field.shape,
                kind,
                direct_descendants: field.direct_descendants,
            })
        })
        .collect()
}
