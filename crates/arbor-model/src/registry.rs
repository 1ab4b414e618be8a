//! Type resolution with a per-class cache.
//!
//! [`TypeRegistry`] turns an object into the pair of node types it is stored
//! with. The result depends only on the object's class, so it is cached by
//! class name for the lifetime of the registry. The registry is an ordinary
//! value owned by whoever drives synchronization; there is no global cache.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use arbor_types::DEFAULT_NODE_TYPE;
use tracing::debug;

use crate::persistable::Persistable;
use crate::schema::TypeSchema;

/// The node types an object is stored with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    /// Type of the object's own node.
    pub primary: String,
    /// Type of the content sub-node, when the object's data lives one level
    /// below its node.
    pub child: Option<String>,
}

impl TypeKey {
    pub fn new(primary: impl Into<String>, child: Option<String>) -> Self {
        Self {
            primary: primary.into(),
            child,
        }
    }
}

/// Resolves and caches [`TypeKey`]s per class.
#[derive(Debug)]
pub struct TypeRegistry {
    default_type: String,
    cache: RwLock<HashMap<String, TypeKey>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_TYPE)
    }
}

impl TypeRegistry {
    /// An empty registry falling back to `default_type`.
    pub fn new(default_type: impl Into<String>) -> Self {
        Self {
            default_type: default_type.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the node types for `object`.
    ///
    /// `None` resolves to the default type with no child type. A
    /// per-instance resource type wins over everything and is not cached,
    /// since it does not hold for the class as a whole.
    pub fn resolve(&self, object: Option<&dyn Persistable>) -> TypeKey {
        let Some(object) = object else {
            return self.default_key();
        };
        let schema = object.schema();

        if let Some(instance_type) = object.resource_type().filter(|t| !t.is_empty()) {
            let child = schema.inherited_child_type().map(str::to_string);
            return TypeKey::new(instance_type, child);
        }

        if let Some(hit) = self.cached(&schema.class_name) {
            return hit;
        }

        let key = self.derive(schema);
        debug!(class = %schema.class_name, primary = %key.primary, "type resolved");
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(schema.class_name.clone(), key.clone());
        key
    }

    /// The cached key for `class_name`, if it has been resolved before.
    pub fn cached(&self, class_name: &str) -> Option<TypeKey> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(class_name)
            .cloned()
    }

    /// Number of cached classes.
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every cached key.
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn default_key(&self) -> TypeKey {
        TypeKey::new(self.default_type.clone(), None)
    }

    fn derive(&self, schema: &TypeSchema) -> TypeKey {
        let primary = schema
            .inherited_resource_type()
            .map(str::to_string)
            .or_else(|| single_model_type(schema));
        match primary {
            Some(primary) => {
                TypeKey::new(primary, schema.inherited_child_type().map(str::to_string))
            }
            None => self.default_key(),
        }
    }
}

/// The model-level declaration closest to `schema`, if it names exactly one
/// non-empty type. Ambiguous declarations yield `None`.
fn single_model_type(schema: &TypeSchema) -> Option<String> {
    let declared = schema
        .lineage()
        .into_iter()
        .rev()
        .find(|s| !s.model_resource_types.is_empty())?;
    match declared.model_resource_types.as_slice() {
        [only] if !only.is_empty() => Some(only.clone()),
        _ => None,
    }
}
