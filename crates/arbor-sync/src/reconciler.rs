//! Depth-first reconciliation of an object graph into the store.
//!
//! For one object the reconciler:
//! 1. resolves its node types and makes sure its node exists with the
//!    primary type (re-typing an existing node when needed);
//! 2. switches to the content sub-node when the type declares a child type;
//! 3. writes scalar attributes as properties, removing those that became
//!    null;
//! 4. in deep mode, recurses into nested objects, collections, and maps,
//!    then deletes the children that no longer correspond to an element.

use std::collections::HashSet;
use std::sync::LazyLock;

use arbor_model::{
    persistable_attributes, AccessError, Attribute, AttributeKind, Element, FieldValue,
    IdentityResolver, Persistable, TypeRegistry, TypeSchema,
};
use arbor_store::NodeStore;
use arbor_types::{NodePath, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::orphans::{delete_container, delete_orphans};
use crate::report::SyncReport;
use crate::transaction::Transaction;

static CONTAINER_SCHEMA: LazyLock<TypeSchema> =
    LazyLock::new(|| TypeSchema::builder("arbor.Container").build());

/// Empty object persisted to create collection and map containers.
struct Container;

impl Persistable for Container {
    fn schema(&self) -> &TypeSchema {
        &CONTAINER_SCHEMA
    }

    fn read_field(&self, name: &str) -> Result<FieldValue<'_>, AccessError> {
        Err(AccessError::NoSuchField(name.to_string()))
    }
}

/// A collection element or map value, with scalars owned.
enum Member<'o> {
    Object(&'o dyn Persistable),
    Scalar(Value),
}

impl<'o> From<Element<'o>> for Member<'o> {
    fn from(element: Element<'o>) -> Self {
        match element {
            Element::Object(object) => Self::Object(object),
            Element::Scalar(value) => Self::Scalar(value.clone()),
        }
    }
}

/// Members keyed by map key; collection members carry no key.
type Members<'o> = Vec<(Option<String>, Member<'o>)>;

/// One synchronization pass. Accumulates its [`SyncReport`].
pub(crate) struct Reconciler<'a> {
    config: &'a SyncConfig,
    registry: &'a TypeRegistry,
    identity: &'a IdentityResolver,
    report: SyncReport,
}

impl<'a> Reconciler<'a> {
    pub(crate) fn new(
        config: &'a SyncConfig,
        registry: &'a TypeRegistry,
        identity: &'a IdentityResolver,
    ) -> Self {
        Self {
            config,
            registry,
            identity,
            report: SyncReport::default(),
        }
    }

    pub(crate) fn into_report(self) -> SyncReport {
        self.report
    }

    /// Persist `object` at `path` inside its own transaction scope.
    pub(crate) fn persist(
        &mut self,
        tx: &mut Transaction<'_>,
        path: &NodePath,
        object: &dyn Persistable,
        deep: bool,
    ) -> SyncResult<()> {
        tx.scope(|tx| self.persist_object(tx, path, object, deep))
    }

    fn persist_object(
        &mut self,
        tx: &mut Transaction<'_>,
        path: &NodePath,
        object: &dyn Persistable,
        deep: bool,
    ) -> SyncResult<()> {
        let store = tx.store();
        let key = self.registry.resolve(Some(object));
        self.ensure_node(store, path, &key.primary)?;

        let target = match key.child.as_deref().filter(|t| !t.is_empty()) {
            Some(child_type) => {
                let content = path.join(&self.config.content_node_name)?;
                self.ensure_node(store, &content, child_type)?;
                content
            }
            None => path.clone(),
        };

        if let Some(elements) = object.as_collection() {
            let members: Members<'_> =
                elements.into_iter().map(|e| (None, e.into())).collect();
            let keep = self.persist_members(tx, &target, members)?;
            let pruned = delete_orphans(store, &target, &keep, &HashSet::new());
            self.report.absorb(pruned);
            return Ok(());
        }

        let attributes = persistable_attributes(object.schema(), self.config.primitive_collections);
        let protected: HashSet<String> = attributes
            .iter()
            .filter(|a| {
                a.kind == AttributeKind::Object || (a.kind.is_complex() && !a.direct_descendants)
            })
            .map(|a| a.name.clone())
            .chain(std::iter::once(self.config.content_node_name.clone()))
            .collect();
        let mut implicit_keep = HashSet::new();
        let mut implicit_present = false;

        for attribute in &attributes {
            if attribute.kind.is_complex() && !deep {
                continue;
            }
            let Some(value) = read(object, attribute) else {
                continue;
            };

            match attribute.kind {
                AttributeKind::Scalar => self.write_property(store, &target, attribute, value)?,
                AttributeKind::Object => match value {
                    FieldValue::Null => {}
                    FieldValue::Object(nested) => {
                        self.persist(tx, &target.join(&attribute.name)?, nested, true)?
                    }
                    other => mismatch(object, attribute, &other),
                },
                AttributeKind::Collection | AttributeKind::Map => {
                    let Some(members) = members_of(object, attribute, value) else {
                        continue;
                    };
                    if attribute.direct_descendants {
                        implicit_present = true;
                        implicit_keep.extend(self.persist_members(tx, &target, members)?);
                    } else {
                        self.persist_container(tx, &target, attribute, members)?;
                    }
                }
            }
        }

        if implicit_present {
            let pruned = delete_orphans(store, &target, &implicit_keep, &protected);
            self.report.absorb(pruned);
        }
        Ok(())
    }

    /// Write the members of a non-implicit collection or map into their
    /// container below `parent`.
    fn persist_container(
        &mut self,
        tx: &mut Transaction<'_>,
        parent: &NodePath,
        attribute: &Attribute,
        members: Members<'_>,
    ) -> SyncResult<()> {
        let store = tx.store();
        let container = parent.join(&attribute.name)?;

        if members.is_empty() {
            let pruned = delete_container(store, &container);
            self.report.absorb(pruned);
            return Ok(());
        }

        self.persist(tx, &container, &Container, true)?;
        let keep = self.persist_members(tx, &container, members)?;
        let pruned = delete_orphans(store, &container, &keep, &HashSet::new());
        self.report.absorb(pruned);
        Ok(())
    }

    /// Persist each member as a child of `container`; returns the paths
    /// written.
    fn persist_members(
        &mut self,
        tx: &mut Transaction<'_>,
        container: &NodePath,
        members: Members<'_>,
    ) -> SyncResult<HashSet<NodePath>> {
        let mut keep = HashSet::with_capacity(members.len());

        for (key, member) in members {
            let name = match (key, &member) {
                (Some(key), _) => key,
                (None, Member::Object(object)) => self.element_name(*object),
                (None, Member::Scalar(_)) => anonymous_name(),
            };
            let child = container.join(&name)?;

            match member {
                Member::Object(object) => self.persist(tx, &child, object, true)?,
                Member::Scalar(value) => self.write_value_node(tx.store(), &child, value)?,
            }
            keep.insert(child);
        }
        Ok(keep)
    }

    /// The last segment of the element's identity path, or a fresh unique
    /// name when it has none.
    fn element_name(&self, object: &dyn Persistable) -> String {
        self.identity
            .resolve(object)
            .and_then(|path| {
                path.rsplit('/')
                    .find(|segment| !segment.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(anonymous_name)
    }

    /// A scalar element stored as its own node.
    fn write_value_node(
        &mut self,
        store: &dyn NodeStore,
        path: &NodePath,
        value: Value,
    ) -> SyncResult<()> {
        let config = self.config;
        self.ensure_node(store, path, &config.default_node_type)?;
        let name = &config.scalar_value_property;
        store.remove_property(path, name)?;
        store.set_property(path, name, value)?;
        self.report.properties_written += 1;
        Ok(())
    }

    fn write_property(
        &mut self,
        store: &dyn NodeStore,
        target: &NodePath,
        attribute: &Attribute,
        value: FieldValue<'_>,
    ) -> SyncResult<()> {
        let value = match value {
            FieldValue::Null => None,
            FieldValue::Scalar(value) => Some(value),
            FieldValue::Collection(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Element::Scalar(value) => values.push(value.clone()),
                        Element::Object(_) => {
                            warn!(
                                field = %attribute.field,
                                "object inside a scalar array; attribute skipped"
                            );
                            return Ok(());
                        }
                    }
                }
                Some(Value::array(values)?)
            }
            other => {
                warn!(
                    field = %attribute.field,
                    value = ?other,
                    "scalar attribute holds a complex value; skipped"
                );
                return Ok(());
            }
        };

        let previous = store.remove_property(target, &attribute.name)?;
        match value {
            Some(value) => {
                debug!(path = %target, property = %attribute.name, "property written");
                store.set_property(target, &attribute.name, value)?;
                self.report.properties_written += 1;
            }
            None if previous.is_some() => {
                debug!(path = %target, property = %attribute.name, "property removed");
                self.report.properties_removed += 1;
            }
            None => {}
        }
        Ok(())
    }

    /// Make sure a node of `node_type` exists at `path`.
    ///
    /// The root keeps its own type.
    fn ensure_node(
        &mut self,
        store: &dyn NodeStore,
        path: &NodePath,
        node_type: &str,
    ) -> SyncResult<()> {
        match store.node(path)? {
            Some(node) if node.node_type == node_type || path.is_root() => {}
            Some(node) => {
                debug!(path = %path, from = %node.node_type, to = node_type, "node re-typed");
                store.set_node_type(path, node_type)?;
                self.report.nodes_retyped += 1;
            }
            None => {
                store.resolve_or_create(path, node_type, &self.config.default_node_type, true)?;
                debug!(path = %path, node_type, "node created");
                self.report.nodes_created += 1;
            }
        }
        Ok(())
    }
}

fn anonymous_name() -> String {
    Uuid::now_v7().to_string()
}

fn read<'o>(object: &'o dyn Persistable, attribute: &Attribute) -> Option<FieldValue<'o>> {
    match object.read_field(&attribute.field) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                class = %object.schema().class_name,
                field = %attribute.field,
                error = %e,
                "field unreadable; skipped"
            );
            None
        }
    }
}

/// The members of a collection or map value. `None` for null and for
/// values of the wrong shape.
fn members_of<'o>(
    object: &dyn Persistable,
    attribute: &Attribute,
    value: FieldValue<'o>,
) -> Option<Members<'o>> {
    match value {
        FieldValue::Null => None,
        FieldValue::Collection(items) => {
            Some(items.into_iter().map(|e| (None, e.into())).collect())
        }
        FieldValue::Map(entries) => Some(
            entries
                .into_iter()
                .map(|(key, e)| (Some(key), e.into()))
                .collect(),
        ),
        FieldValue::Scalar(Value::Array(values)) => Some(
            values
                .into_iter()
                .map(|v| (None, Member::Scalar(v)))
                .collect(),
        ),
        other => {
            mismatch(object, attribute, &other);
            None
        }
    }
}

fn mismatch(object: &dyn Persistable, attribute: &Attribute, value: &FieldValue<'_>) {
    warn!(
        class = %object.schema().class_name,
        field = %attribute.field,
        expected = ?attribute.kind,
        value = ?value,
        "value does not match the declared shape; skipped"
    );
}
