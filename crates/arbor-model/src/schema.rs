//! Declarative type descriptions.
//!
//! A [`TypeSchema`] describes one class of persistable object: its type
//! markers, its declared fields, its accessors, and optionally the schema it
//! extends. Schemas are built once (usually in a `LazyLock`) and shared
//! through `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Kind of a scalar field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Long,
    Double,
    Boolean,
    Date,
}

/// Declared shape of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldShape {
    /// A single scalar (number, boolean, string, date).
    Scalar(ScalarKind),
    /// An array or collection of scalars.
    ScalarArray(ScalarKind),
    /// A nested persistable object.
    Object,
    /// An ordered collection of nested objects.
    Collection,
    /// A map from string key to nested object (or scalar).
    Map,
    /// Anything the engine cannot persist (handles, callbacks, ...).
    Unsupported,
}

/// How an array of scalars is written to the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveCollectionMode {
    /// One multi-value property on the owning node.
    #[default]
    Property,
    /// One child node per element, each holding the element as a property.
    ChildNodes,
}

/// A declared field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name, as passed to [`crate::Persistable::read_field`].
    pub name: String,
    pub shape: FieldShape,
    /// Never persisted.
    pub transient: bool,
    /// External (property or container) name, if it differs from `name`.
    pub named: Option<String>,
    /// Collection children live directly under the owning node instead of
    /// under a container named after the field.
    pub direct_descendants: bool,
    /// The field holds the object's path.
    pub path_marker: bool,
    /// Per-field override of the scalar-array handling.
    pub primitive_collection: Option<PrimitiveCollectionMode>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, shape: FieldShape) -> Self {
        Self {
            name: name.into(),
            shape,
            transient: false,
            named: None,
            direct_descendants: false,
            path_marker: false,
            primitive_collection: None,
        }
    }

    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, FieldShape::Scalar(kind))
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::String)
    }

    pub fn scalar_array(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, FieldShape::ScalarArray(kind))
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, FieldShape::Object)
    }

    pub fn collection(name: impl Into<String>) -> Self {
        Self::new(name, FieldShape::Collection)
    }

    pub fn map(name: impl Into<String>) -> Self {
        Self::new(name, FieldShape::Map)
    }

    pub fn unsupported(name: impl Into<String>) -> Self {
        Self::new(name, FieldShape::Unsupported)
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn named(mut self, external: impl Into<String>) -> Self {
        self.named = Some(external.into());
        self
    }

    pub fn direct_descendants(mut self) -> Self {
        self.direct_descendants = true;
        self
    }

    pub fn path_marker(mut self) -> Self {
        self.path_marker = true;
        self
    }

    pub fn primitive_collection(mut self, mode: PrimitiveCollectionMode) -> Self {
        self.primitive_collection = Some(mode);
        self
    }

    /// Name used in the store: the naming override, or the field name.
    pub fn external_name(&self) -> &str {
        self.named.as_deref().unwrap_or(&self.name)
    }
}

/// A declared accessor method.
///
/// An accessor named like a field governs that field: marking it transient
/// excludes the field from persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessorDef {
    /// Accessor name, as passed to [`crate::Persistable::invoke_accessor`].
    pub name: String,
    pub transient: bool,
    /// The accessor returns the object's path.
    pub path_marker: bool,
    /// Declared return kind, `None` for non-scalar returns.
    pub returns: Option<ScalarKind>,
}

impl AccessorDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transient: false,
            path_marker: false,
            returns: None,
        }
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn path_marker(mut self) -> Self {
        self.path_marker = true;
        self.returns.get_or_insert(ScalarKind::String);
        self
    }

    pub fn returning(mut self, kind: ScalarKind) -> Self {
        self.returns = Some(kind);
        self
    }
}

/// Description of one class of persistable object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSchema {
    /// Unique class name; the type cache is keyed by it.
    pub class_name: String,
    /// Explicit resource type marker.
    pub resource_type: Option<String>,
    /// Model-level resource type declaration. Only used when it holds
    /// exactly one value.
    pub model_resource_types: Vec<String>,
    /// Type of the content sub-node, if the class stores its data one level
    /// below its own node.
    pub child_type: Option<String>,
    /// Fields declared by this class (not its parents).
    pub fields: Vec<FieldDef>,
    /// Accessors declared by this class (not its parents).
    pub accessors: Vec<AccessorDef>,
    /// The schema this class extends.
    pub parent: Option<Arc<TypeSchema>>,
}

impl TypeSchema {
    /// Start building a schema for `class_name`.
    pub fn builder(class_name: impl Into<String>) -> TypeSchemaBuilder {
        TypeSchemaBuilder {
            schema: TypeSchema {
                class_name: class_name.into(),
                resource_type: None,
                model_resource_types: Vec::new(),
                child_type: None,
                fields: Vec::new(),
                accessors: Vec::new(),
                parent: None,
            },
        }
    }

    /// The inheritance chain, most general class first, ending with `self`.
    pub fn lineage(&self) -> Vec<&TypeSchema> {
        let mut chain = vec![self];
        let mut current = self.parent.as_deref();
        while let Some(schema) = current {
            chain.push(schema);
            current = schema.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    /// Every field across the inheritance chain, base class fields first.
    /// A field redeclared in a subclass replaces the inherited one in place.
    pub fn all_fields(&self) -> Vec<&FieldDef> {
        let mut order: Vec<&str> = Vec::new();
        let mut by_name: BTreeMap<&str, &FieldDef> = BTreeMap::new();
        for schema in self.lineage() {
            for field in &schema.fields {
                if by_name.insert(field.name.as_str(), field).is_none() {
                    order.push(field.name.as_str());
                }
            }
        }
        order.into_iter().filter_map(|name| by_name.get(name).copied()).collect()
    }

    /// Every accessor across the inheritance chain; subclass declarations
    /// override inherited ones.
    pub fn all_accessors(&self) -> Vec<&AccessorDef> {
        let mut by_name: BTreeMap<&str, &AccessorDef> = BTreeMap::new();
        for schema in self.lineage() {
            for accessor in &schema.accessors {
                by_name.insert(accessor.name.as_str(), accessor);
            }
        }
        by_name.into_values().collect()
    }

    /// Look up a field by name, searching parents too.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.lineage()
            .into_iter()
            .rev()
            .find_map(|schema| schema.fields.iter().find(|f| f.name == name))
    }

    /// Look up an accessor by name, searching parents too.
    pub fn accessor(&self, name: &str) -> Option<&AccessorDef> {
        self.lineage()
            .into_iter()
            .rev()
            .find_map(|schema| schema.accessors.iter().find(|a| a.name == name))
    }

    /// Resource type marker, searching parents too.
    pub fn inherited_resource_type(&self) -> Option<&str> {
        self.lineage()
            .into_iter()
            .rev()
            .find_map(|schema| schema.resource_type.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Child type marker, searching parents too.
    pub fn inherited_child_type(&self) -> Option<&str> {
        self.lineage()
            .into_iter()
            .rev()
            .find_map(|schema| schema.child_type.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// Builder for [`TypeSchema`].
#[derive(Debug)]
pub struct TypeSchemaBuilder {
    schema: TypeSchema,
}

impl TypeSchemaBuilder {
    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.schema.resource_type = Some(resource_type.into());
        self
    }

    pub fn model_resource_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema.model_resource_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn child_type(mut self, child_type: impl Into<String>) -> Self {
        self.schema.child_type = Some(child_type.into());
        self
    }

    pub fn extends(mut self, parent: Arc<TypeSchema>) -> Self {
        self.schema.parent = Some(parent);
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.schema.fields.push(field);
        self
    }

    pub fn accessor(mut self, accessor: AccessorDef) -> Self {
        self.schema.accessors.push(accessor);
        self
    }

    pub fn build(self) -> TypeSchema {
        self.schema
    }

    pub fn build_arc(self) -> Arc<TypeSchema> {
        Arc::new(self.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Arc<TypeSchema> {
        TypeSchema::builder("app.Base")
            .resource_type("app/base")
            .child_type("app:content")
            .field(FieldDef::string("id"))
            .field(FieldDef::string("title"))
            .accessor(AccessorDef::new("title"))
            .build_arc()
    }

    #[test]
    fn lineage_is_base_first() {
        let child = TypeSchema::builder("app.Child").extends(base()).build();
        let names: Vec<&str> = child.lineage().iter().map(|s| s.class_name.as_str()).collect();
        assert_eq!(names, vec!["app.Base", "app.Child"]);
    }

    #[test]
    fn subclass_field_shadows_in_place() {
        let child = TypeSchema::builder("app.Child")
            .extends(base())
            .field(FieldDef::string("extra"))
            .field(FieldDef::string("title").named("heading"))
            .build();
        let fields = child.all_fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "extra"]);
        assert_eq!(fields[1].external_name(), "heading");
    }

    #[test]
    fn accessor_override() {
        let child = TypeSchema::builder("app.Child")
            .extends(base())
            .accessor(AccessorDef::new("title").transient())
            .build();
        assert!(child.accessor("title").unwrap().transient);
        assert_eq!(child.all_accessors().len(), 1);
    }

    #[test]
    fn inherited_markers() {
        let child = TypeSchema::builder("app.Child").extends(base()).build();
        assert_eq!(child.inherited_resource_type(), Some("app/base"));
        assert_eq!(child.inherited_child_type(), Some("app:content"));

        let own = TypeSchema::builder("app.Own")
            .extends(base())
            .resource_type("app/own")
            .build();
        assert_eq!(own.inherited_resource_type(), Some("app/own"));
    }

    #[test]
    fn path_marker_accessor_returns_string() {
        let accessor = AccessorDef::new("location").path_marker();
        assert_eq!(accessor.returns, Some(ScalarKind::String));
    }
}
