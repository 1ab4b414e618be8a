use arbor_model::{IdentityResolver, Persistable, TypeRegistry};
use arbor_store::NodeStore;
use arbor_types::NodePath;
use tracing::info;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::reconciler::Reconciler;
use crate::report::SyncReport;
use crate::transaction::Transaction;

/// Entry point for persisting object graphs.
///
/// Owns the configuration and the type cache, so one synchronizer should be
/// reused across calls. Each call validates its arguments before touching
/// the store and commits exactly once when it succeeds.
pub struct Synchronizer {
    config: SyncConfig,
    registry: TypeRegistry,
    identity: IdentityResolver,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl Synchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            registry: TypeRegistry::new(config.default_node_type.clone()),
            identity: IdentityResolver::new(config.warn_on_missing_identity),
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Persist `object` deeply at the path it declares.
    pub fn persist(&self, object: &dyn Persistable, store: &dyn NodeStore) -> SyncResult<SyncReport> {
        self.persist_with_depth(object, store, true)
    }

    /// Persist `object` at the path it declares.
    pub fn persist_with_depth(
        &self,
        object: &dyn Persistable,
        store: &dyn NodeStore,
        deep: bool,
    ) -> SyncResult<SyncReport> {
        let path = self.identity.resolve(object).ok_or_else(|| {
            SyncError::InvalidArgument(format!(
                "{} declares no path; supply one explicitly",
                object.schema().class_name
            ))
        })?;
        self.persist_at_with_depth(&path, object, store, deep)
    }

    /// Persist `object` deeply at `path`.
    pub fn persist_at(
        &self,
        path: &str,
        object: &dyn Persistable,
        store: &dyn NodeStore,
    ) -> SyncResult<SyncReport> {
        self.persist_at_with_depth(path, object, store, true)
    }

    /// Persist `object` at `path`. Shallow mode (`deep == false`) writes only
    /// scalar properties, never child nodes.
    pub fn persist_at_with_depth(
        &self,
        path: &str,
        object: &dyn Persistable,
        store: &dyn NodeStore,
        deep: bool,
    ) -> SyncResult<SyncReport> {
        let path = target_path(path)?;

        let mut tx = Transaction::begin(store);
        let mut reconciler = Reconciler::new(&self.config, &self.registry, &self.identity);
        reconciler.persist(&mut tx, &path, object, deep)?;

        let report = reconciler.into_report();
        info!(
            path = %path,
            deep,
            created = report.nodes_created,
            retyped = report.nodes_retyped,
            written = report.properties_written,
            removed = report.properties_removed,
            deleted = report.nodes_deleted,
            failed_deletions = report.failed_deletions,
            "object graph synchronized"
        );
        Ok(report)
    }
}

fn target_path(path: &str) -> SyncResult<NodePath> {
    if path.trim().is_empty() {
        return Err(SyncError::InvalidArgument("path must not be blank".into()));
    }
    NodePath::parse(path).map_err(|e| SyncError::InvalidArgument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, LazyLock};

    use arbor_model::{
        AccessError, AccessorDef, FieldDef, FieldValue, Item, Persistable,
        PrimitiveCollectionMode, Record, ScalarKind, Slot, TypeSchema,
    };
    use arbor_store::{InMemoryNodeStore, Node, PropertyMap, StoreError, StoreResult};
    use arbor_types::Value;
    use proptest::prelude::*;

    fn path(p: &str) -> NodePath {
        NodePath::parse(p).unwrap()
    }

    fn quiet() -> Synchronizer {
        Synchronizer::new(SyncConfig {
            warn_on_missing_identity: false,
            ..SyncConfig::default()
        })
    }

    fn item_schema() -> Arc<TypeSchema> {
        TypeSchema::builder("test.Item")
            .resource_type("app/item")
            .field(FieldDef::string("path").transient())
            .field(FieldDef::string("label"))
            .build_arc()
    }

    fn page_schema() -> Arc<TypeSchema> {
        TypeSchema::builder("test.Page")
            .resource_type("app/page")
            .field(FieldDef::string("path").transient())
            .field(FieldDef::string("title"))
            .field(FieldDef::scalar("count", ScalarKind::Long))
            .field(FieldDef::scalar_array("tags", ScalarKind::String))
            .field(FieldDef::object("author"))
            .field(FieldDef::collection("items"))
            .field(FieldDef::map("links"))
            .build_arc()
    }

    fn item(id: &str, label: &str) -> Record {
        Record::new(item_schema())
            .with("path", Value::from(format!("/items/{id}")))
            .with("label", Value::from(label))
    }

    fn items(ids: &[&str]) -> Slot {
        Slot::Collection(ids.iter().map(|id| Item::Object(item(id, id))).collect())
    }

    fn page() -> Record {
        Record::new(page_schema())
            .with("path", Value::from("/content/page"))
            .with("title", Value::from("Home"))
            .with("count", Value::from(3))
    }

    fn child_names(store: &dyn NodeStore, p: &str) -> Vec<String> {
        store
            .children(&path(p))
            .unwrap()
            .iter()
            .filter_map(|n| n.name().map(str::to_string))
            .collect()
    }

    // ---- Entry points and arguments ----

    #[test]
    fn persist_uses_declared_path() {
        let store = InMemoryNodeStore::new();
        quiet().persist(&page(), &store).unwrap();

        let node = store.node(&path("/content/page")).unwrap().unwrap();
        assert_eq!(node.node_type, "app/page");
        assert_eq!(
            store.node(&path("/content")).unwrap().unwrap().node_type,
            "nt:unstructured"
        );
    }

    #[test]
    fn persist_without_identity_is_rejected() {
        let store = InMemoryNodeStore::new();
        let anonymous = Record::new(item_schema()).with("label", Value::from("x"));
        let err = quiet().persist(&anonymous, &store).unwrap_err();
        assert!(matches!(err, SyncError::InvalidArgument(_)));
        assert!(!store.has_pending_changes().unwrap());
    }

    #[test]
    fn invalid_paths_write_nothing() {
        let store = InMemoryNodeStore::new();
        let sync = quiet();
        for bad in ["", "   ", "relative/path", "/a//b"] {
            let err = sync.persist_at(bad, &page(), &store).unwrap_err();
            assert!(matches!(err, SyncError::InvalidArgument(_)), "{bad:?}");
        }
        assert!(!store.has_pending_changes().unwrap());
        assert_eq!(store.commit_count().unwrap(), 0);
    }

    #[test]
    fn explicit_path_overrides_declared_one() {
        let store = InMemoryNodeStore::new();
        quiet().persist_at("/elsewhere", &page(), &store).unwrap();
        assert!(store.exists(&path("/elsewhere")).unwrap());
        assert!(!store.exists(&path("/content/page")).unwrap());
    }

    #[test]
    fn path_marker_beats_path_accessor() {
        let schema = TypeSchema::builder("test.Marked")
            .field(FieldDef::string("location").path_marker().transient())
            .accessor(AccessorDef::new("path").returning(ScalarKind::String))
            .field(FieldDef::string("title"))
            .build_arc();
        let obj = Record::new(schema)
            .with("location", Value::from("/from/marker"))
            .with_accessor("path", Value::from("/from/accessor"))
            .with("title", Value::from("t"));

        let store = InMemoryNodeStore::new();
        quiet().persist(&obj, &store).unwrap();
        assert!(store.exists(&path("/from/marker")).unwrap());
        assert!(!store.exists(&path("/from/accessor")).unwrap());
    }

    // ---- Scalars ----

    #[test]
    fn scalar_round_trip() {
        let store = InMemoryNodeStore::new();
        let report = quiet().persist(&page(), &store).unwrap();

        let props = store.properties(&path("/content/page")).unwrap();
        assert_eq!(props.get("title"), Some(&Value::from("Home")));
        assert_eq!(props.get("count"), Some(&Value::Long(3)));
        assert!(!props.contains_key("path"));
        assert_eq!(report.properties_written, 2);
    }

    #[test]
    fn nulled_scalar_removes_property() {
        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist(&page(), &store).unwrap();

        let mut changed = page();
        changed.set("title", Slot::Null);
        let report = sync.persist(&changed, &store).unwrap();

        assert_eq!(store.property(&path("/content/page"), "title").unwrap(), None);
        assert_eq!(report.properties_removed, 1);
    }

    #[test]
    fn scalar_array_as_multi_value_property() {
        let store = InMemoryNodeStore::new();
        let tags = Value::array([Value::from("a"), Value::from("b")]).unwrap();
        let obj = page().with("tags", tags.clone());

        quiet().persist(&obj, &store).unwrap();
        assert_eq!(store.property(&path("/content/page"), "tags").unwrap(), Some(tags));
        assert!(!store.exists(&path("/content/page/tags")).unwrap());
    }

    #[test]
    fn scalar_array_as_child_nodes() {
        let store = InMemoryNodeStore::new();
        let sync = Synchronizer::new(SyncConfig {
            primitive_collections: PrimitiveCollectionMode::ChildNodes,
            warn_on_missing_identity: false,
            ..SyncConfig::default()
        });
        let obj = page().with(
            "tags",
            Value::array([Value::from("a"), Value::from("b")]).unwrap(),
        );

        sync.persist(&obj, &store).unwrap();
        let tags = store.children(&path("/content/page/tags")).unwrap();
        assert_eq!(tags.len(), 2);
        let mut values: Vec<Value> = tags
            .iter()
            .filter_map(|n| store.property(&n.path, "value").unwrap())
            .collect();
        values.sort_by_key(|v| v.to_string());
        assert_eq!(values, vec![Value::from("a"), Value::from("b")]);
        assert_eq!(store.property(&path("/content/page"), "tags").unwrap(), None);
    }

    // ---- Nested objects ----

    #[test]
    fn nested_object_is_child_node() {
        let store = InMemoryNodeStore::new();
        let obj = page().with("author", item("ada", "Ada"));
        quiet().persist(&obj, &store).unwrap();

        let author = store.node(&path("/content/page/author")).unwrap().unwrap();
        assert_eq!(author.node_type, "app/item");
        assert_eq!(
            store.string_property(&author.path, "label").unwrap(),
            Some("Ada".into())
        );
    }

    #[test]
    fn null_nested_object_leaves_existing_node() {
        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist(&page().with("author", item("ada", "Ada")), &store).unwrap();
        sync.persist(&page(), &store).unwrap();
        assert!(store.exists(&path("/content/page/author")).unwrap());
    }

    #[test]
    fn content_node_receives_data() {
        let schema = TypeSchema::builder("test.File")
            .resource_type("nt:file")
            .child_type("nt:resource")
            .field(FieldDef::string("mimeType"))
            .build_arc();
        let file = Record::new(schema).with("mimeType", Value::from("text/plain"));

        let store = InMemoryNodeStore::new();
        quiet().persist_at("/files/a.txt", &file, &store).unwrap();

        assert_eq!(store.node(&path("/files/a.txt")).unwrap().unwrap().node_type, "nt:file");
        let content = store.node(&path("/files/a.txt/jcr:content")).unwrap().unwrap();
        assert_eq!(content.node_type, "nt:resource");
        assert_eq!(
            store.string_property(&content.path, "mimeType").unwrap(),
            Some("text/plain".into())
        );
        assert!(store.properties(&path("/files/a.txt")).unwrap().is_empty());
    }

    #[test]
    fn existing_node_is_retyped() {
        let store = InMemoryNodeStore::new();
        store
            .resolve_or_create(&path("/content/page"), "nt:unstructured", "nt:unstructured", true)
            .unwrap();
        store.commit().unwrap();

        let report = quiet().persist(&page(), &store).unwrap();
        assert_eq!(report.nodes_retyped, 1);
        assert_eq!(report.nodes_created, 0);
        assert_eq!(
            store.node(&path("/content/page")).unwrap().unwrap().node_type,
            "app/page"
        );
    }

    // ---- Collections and maps ----

    #[test]
    fn collection_elements_named_by_identity() {
        let store = InMemoryNodeStore::new();
        let obj = page().with("items", items(&["a", "b", "c"]));
        quiet().persist(&obj, &store).unwrap();

        assert_eq!(child_names(&store, "/content/page/items"), vec!["a", "b", "c"]);
        assert_eq!(
            store.node(&path("/content/page/items")).unwrap().unwrap().node_type,
            "nt:unstructured"
        );
    }

    #[test]
    fn collection_shrinkage_deletes_orphan() {
        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist(&page().with("items", items(&["a", "b", "c"])), &store).unwrap();

        let report = sync.persist(&page().with("items", items(&["a", "b"])), &store).unwrap();

        assert_eq!(child_names(&store, "/content/page/items"), vec!["a", "b"]);
        assert!(!store.exists(&path("/content/page/items/c")).unwrap());
        assert_eq!(report.nodes_deleted, 1);
        assert_eq!(report.failed_deletions, 0);
    }

    #[test]
    fn emptied_collection_deletes_container() {
        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist(&page().with("items", items(&["a"])), &store).unwrap();
        sync.persist(&page().with("items", items(&[])), &store).unwrap();
        assert!(!store.exists(&path("/content/page/items")).unwrap());
    }

    #[test]
    fn null_collection_is_left_alone() {
        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist(&page().with("items", items(&["a"])), &store).unwrap();
        sync.persist(&page(), &store).unwrap();
        assert!(store.exists(&path("/content/page/items/a")).unwrap());
    }

    #[test]
    fn map_keys_become_node_names() {
        let mut links = BTreeMap::new();
        links.insert("home".to_string(), Item::Object(item("x", "Home")));
        links.insert("count".to_string(), Item::Scalar(Value::from(7)));

        let store = InMemoryNodeStore::new();
        quiet().persist(&page().with("links", Slot::Map(links)), &store).unwrap();

        assert_eq!(child_names(&store, "/content/page/links"), vec!["count", "home"]);
        assert_eq!(
            store.string_property(&path("/content/page/links/home"), "label").unwrap(),
            Some("Home".into())
        );
        assert_eq!(
            store.property(&path("/content/page/links/count"), "value").unwrap(),
            Some(Value::Long(7))
        );
    }

    fn links(keys: &[&str]) -> Slot {
        Slot::Map(
            keys.iter()
                .map(|key| (key.to_string(), Item::Object(item(key, key))))
                .collect(),
        )
    }

    #[test]
    fn map_shrinkage_deletes_orphan() {
        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist(&page().with("links", links(&["a", "b", "c"])), &store).unwrap();

        let report = sync.persist(&page().with("links", links(&["a", "b"])), &store).unwrap();

        assert_eq!(child_names(&store, "/content/page/links"), vec!["a", "b"]);
        assert!(!store.exists(&path("/content/page/links/c")).unwrap());
        assert_eq!(report.nodes_deleted, 1);
    }

    #[test]
    fn emptied_map_deletes_container() {
        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist(&page().with("links", links(&["a", "b"])), &store).unwrap();
        assert!(store.exists(&path("/content/page/links")).unwrap());

        sync.persist(&page().with("links", links(&[])), &store).unwrap();
        assert!(!store.exists(&path("/content/page/links")).unwrap());
        assert!(store.exists(&path("/content/page")).unwrap());
    }

    #[test]
    fn invalid_map_key_is_an_error() {
        let mut links = BTreeMap::new();
        links.insert("a/b".to_string(), Item::Scalar(Value::from(1)));

        let store = InMemoryNodeStore::new();
        let err = quiet()
            .persist(&page().with("links", Slot::Map(links)), &store)
            .unwrap_err();
        assert!(matches!(err, SyncError::Type(_)));
        assert_eq!(store.commit_count().unwrap(), 0);
    }

    #[test]
    fn anonymous_elements_are_replaced_each_call() {
        let anon = |label: &str| Item::Object(Record::new(item_schema()).with("label", Value::from(label)));
        let obj = page().with("items", Slot::Collection(vec![anon("x"), anon("y")]));

        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist(&obj, &store).unwrap();
        let first = child_names(&store, "/content/page/items");
        let report = sync.persist(&obj, &store).unwrap();
        let second = child_names(&store, "/content/page/items");

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert!(first.iter().all(|name| !second.contains(name)));
        assert_eq!(report.nodes_deleted, 2);
    }

    #[test]
    fn implicit_collection_writes_under_owner() {
        let schema = TypeSchema::builder("test.Folder")
            .field(FieldDef::collection("entries").direct_descendants())
            .field(FieldDef::object("meta"))
            .build_arc();
        let folder = |ids: &[&str]| {
            Record::new(Arc::clone(&schema))
                .with("entries", items(ids))
                .with("meta", item("m", "meta"))
        };

        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist_at("/folder", &folder(&["a", "b"]), &store).unwrap();
        assert_eq!(child_names(&store, "/folder"), vec!["a", "b", "meta"]);

        let report = sync.persist_at("/folder", &folder(&["b"]), &store).unwrap();
        assert_eq!(child_names(&store, "/folder"), vec!["b", "meta"]);
        assert_eq!(report.nodes_deleted, 1);
    }

    #[test]
    fn emptied_implicit_collection_prunes_elements() {
        let schema = TypeSchema::builder("test.Folder")
            .field(FieldDef::collection("entries").direct_descendants())
            .field(FieldDef::object("meta"))
            .build_arc();
        let folder = |ids: &[&str]| {
            Record::new(Arc::clone(&schema))
                .with("entries", items(ids))
                .with("meta", item("m", "meta"))
        };

        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist_at("/folder", &folder(&["a", "b"]), &store).unwrap();

        let report = sync.persist_at("/folder", &folder(&[]), &store).unwrap();
        assert_eq!(child_names(&store, "/folder"), vec!["meta"]);
        assert_eq!(report.nodes_deleted, 2);
    }

    #[test]
    fn object_that_is_a_collection() {
        let list_schema = TypeSchema::builder("test.List").build_arc();
        let list = Record::list(
            Arc::clone(&list_schema),
            vec![Item::Object(item("one", "1")), Item::Object(item("two", "2"))],
        );

        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist_at("/list", &list, &store).unwrap();
        assert_eq!(child_names(&store, "/list"), vec!["one", "two"]);

        let shorter = Record::list(list_schema, vec![Item::Object(item("two", "2"))]);
        sync.persist_at("/list", &shorter, &store).unwrap();
        assert_eq!(child_names(&store, "/list"), vec!["two"]);
    }

    // ---- Hand-written persistables ----

    static CATALOG_SCHEMA: LazyLock<TypeSchema> = LazyLock::new(|| {
        TypeSchema::builder("test.Catalog")
            .resource_type("app/catalog")
            .field(FieldDef::string("title"))
            .field(FieldDef::collection("entries"))
            .field(FieldDef::map("featured"))
            .build()
    });

    struct Catalog {
        title: Option<String>,
        entries: Vec<Record>,
        featured: BTreeMap<String, Record>,
    }

    impl Persistable for Catalog {
        fn schema(&self) -> &TypeSchema {
            &CATALOG_SCHEMA
        }

        fn read_field(&self, name: &str) -> Result<FieldValue<'_>, AccessError> {
            match name {
                "title" => Ok(FieldValue::optional(self.title.clone())),
                "entries" => Ok(FieldValue::objects(&self.entries)),
                "featured" => Ok(FieldValue::object_map(self.featured.iter())),
                _ => Err(AccessError::NoSuchField(name.to_string())),
            }
        }
    }

    #[test]
    fn typed_struct_with_object_collection_and_map() {
        let mut catalog = Catalog {
            title: Some("Spring".into()),
            entries: vec![item("a", "A"), item("b", "B")],
            featured: BTreeMap::from([("top".to_string(), item("t", "Top"))]),
        };

        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist_at("/catalog", &catalog, &store).unwrap();

        assert_eq!(
            store.node(&path("/catalog")).unwrap().unwrap().node_type,
            "app/catalog"
        );
        assert_eq!(
            store.string_property(&path("/catalog"), "title").unwrap(),
            Some("Spring".into())
        );
        assert_eq!(child_names(&store, "/catalog/entries"), vec!["a", "b"]);
        assert_eq!(child_names(&store, "/catalog/featured"), vec!["top"]);
        assert_eq!(
            store.string_property(&path("/catalog/featured/top"), "label").unwrap(),
            Some("Top".into())
        );

        catalog.title = None;
        let report = sync.persist_at("/catalog", &catalog, &store).unwrap();
        assert_eq!(store.property(&path("/catalog"), "title").unwrap(), None);
        assert_eq!(report.properties_removed, 1);
    }

    // ---- Depth ----

    #[test]
    fn shallow_persist_writes_no_children() {
        let obj = page()
            .with("author", item("ada", "Ada"))
            .with("items", items(&["a"]));

        let store = InMemoryNodeStore::new();
        let report = quiet().persist_with_depth(&obj, &store, false).unwrap();

        assert!(store.children(&path("/content/page")).unwrap().is_empty());
        assert_eq!(
            store.string_property(&path("/content/page"), "title").unwrap(),
            Some("Home".into())
        );
        assert_eq!(report.nodes_created, 1);
    }

    #[test]
    fn shallow_persist_keeps_existing_children() {
        let store = InMemoryNodeStore::new();
        let sync = quiet();
        sync.persist(&page().with("items", items(&["a", "b"])), &store).unwrap();
        sync.persist_with_depth(&page().with("items", items(&[])), &store, false)
            .unwrap();
        assert_eq!(child_names(&store, "/content/page/items"), vec!["a", "b"]);
    }

    // ---- Transactions ----

    #[test]
    fn one_commit_per_call() {
        let obj = page()
            .with("author", item("ada", "Ada"))
            .with("items", items(&["a", "b"]));
        let store = InMemoryNodeStore::new();
        let sync = quiet();

        sync.persist(&obj, &store).unwrap();
        assert_eq!(store.commit_count().unwrap(), 1);
        sync.persist(&obj, &store).unwrap();
        assert_eq!(store.commit_count().unwrap(), 2);
        assert!(!store.has_pending_changes().unwrap());
    }

    #[test]
    fn repeated_persist_is_idempotent() {
        let obj = page()
            .with("author", item("ada", "Ada"))
            .with("items", items(&["a", "b"]))
            .with("tags", Value::array([Value::from("t")]).unwrap());
        let store = InMemoryNodeStore::new();
        let sync = quiet();

        sync.persist(&obj, &store).unwrap();
        let first = store.committed_tree().unwrap();
        let report = sync.persist(&obj, &store).unwrap();

        assert_eq!(store.committed_tree().unwrap(), first);
        assert!(!report.changed_structure());
    }

    /// Delegates to an in-memory store, failing selected operations.
    struct FailingStore {
        inner: InMemoryNodeStore,
        fail_deletes: bool,
        fail_property: Option<&'static str>,
    }

    impl FailingStore {
        fn new() -> Self {
            Self {
                inner: InMemoryNodeStore::new(),
                fail_deletes: false,
                fail_property: None,
            }
        }
    }

    impl NodeStore for FailingStore {
        fn node(&self, path: &NodePath) -> StoreResult<Option<Node>> {
            self.inner.node(path)
        }

        fn resolve_or_create(
            &self,
            path: &NodePath,
            node_type: &str,
            default_type: &str,
            create_ancestors: bool,
        ) -> StoreResult<Node> {
            self.inner
                .resolve_or_create(path, node_type, default_type, create_ancestors)
        }

        fn set_node_type(&self, path: &NodePath, node_type: &str) -> StoreResult<()> {
            self.inner.set_node_type(path, node_type)
        }

        fn properties(&self, path: &NodePath) -> StoreResult<PropertyMap> {
            self.inner.properties(path)
        }

        fn set_property(&self, path: &NodePath, name: &str, value: Value) -> StoreResult<()> {
            if self.fail_property.is_some_and(|p| p == name) {
                return Err(StoreError::ReadOnly);
            }
            self.inner.set_property(path, name, value)
        }

        fn remove_property(&self, path: &NodePath, name: &str) -> StoreResult<Option<Value>> {
            self.inner.remove_property(path, name)
        }

        fn children(&self, path: &NodePath) -> StoreResult<Vec<Node>> {
            self.inner.children(path)
        }

        fn delete(&self, path: &NodePath) -> StoreResult<bool> {
            if self.fail_deletes {
                return Err(StoreError::ReadOnly);
            }
            self.inner.delete(path)
        }

        fn commit(&self) -> StoreResult<()> {
            self.inner.commit()
        }

        fn discard(&self) -> StoreResult<()> {
            self.inner.discard()
        }

        fn has_pending_changes(&self) -> StoreResult<bool> {
            self.inner.has_pending_changes()
        }
    }

    #[test]
    fn failed_deletions_are_counted_not_raised() {
        let mut store = FailingStore::new();
        let sync = quiet();
        sync.persist(&page().with("items", items(&["a", "b", "c"])), &store).unwrap();

        store.fail_deletes = true;
        let report = sync.persist(&page().with("items", items(&["a"])), &store).unwrap();

        assert_eq!(report.failed_deletions, 2);
        assert_eq!(report.nodes_deleted, 0);
        assert_eq!(store.inner.commit_count().unwrap(), 2);
        assert_eq!(child_names(&store, "/content/page/items"), vec!["a", "b", "c"]);
    }

    #[test]
    fn write_failure_propagates_without_commit() {
        let mut store = FailingStore::new();
        store.fail_property = Some("label");

        let err = quiet()
            .persist(&page().with("items", items(&["a"])), &store)
            .unwrap_err();

        assert!(matches!(err, SyncError::Store(StoreError::ReadOnly)));
        assert_eq!(store.inner.commit_count().unwrap(), 0);
        assert!(store.has_pending_changes().unwrap());

        store.discard().unwrap();
        assert!(!store.exists(&path("/content")).unwrap());
    }

    // ---- Properties ----

    fn scalar_graph() -> impl Strategy<Value = (String, i64, Vec<String>)> {
        (
            "[a-zA-Z ]{0,12}",
            any::<i64>(),
            prop::collection::btree_set("[a-z]{1,6}", 0..5)
                .prop_map(|ids| ids.into_iter().collect::<Vec<_>>()),
        )
    }

    proptest! {
        #[test]
        fn persist_twice_changes_nothing((title, count, ids) in scalar_graph()) {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            let obj = page()
                .with("title", Value::from(title))
                .with("count", Value::from(count))
                .with("items", items(&ids));

            let store = InMemoryNodeStore::new();
            let sync = quiet();
            sync.persist(&obj, &store).unwrap();
            let first = store.committed_tree().unwrap();
            sync.persist(&obj, &store).unwrap();

            prop_assert_eq!(store.committed_tree().unwrap(), first);
        }
    }
}
