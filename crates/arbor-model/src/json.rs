//! Build [`Record`]s from JSON documents.
//!
//! Plain JSON maps onto the object model as follows:
//!
//! - strings, integers, floats and booleans become scalar fields;
//! - arrays of scalars of one kind become scalar-array fields;
//! - arrays of objects become collections;
//! - nested objects become nested objects.
//!
//! Keys starting with `@` are directives rather than fields:
//!
//! | Directive    | Meaning                                              |
//! |--------------|------------------------------------------------------|
//! | `@type`      | resource type of the object                          |
//! | `@childType` | type of the object's content sub-node                |
//! | `@path`      | the object's identity path                           |
//! | `@implicit`  | names of collection fields written without container |
//! | `@entries`   | the object is a map; entries are its key/value pairs |

use std::collections::{BTreeMap, BTreeSet};

use arbor_types::Value;
use serde_json::{Map, Value as Json};

use crate::error::{ModelError, ModelResult};
use crate::record::{Item, Record, Slot};
use crate::schema::{FieldDef, FieldShape, ScalarKind, TypeSchema};

const TYPE: &str = "@type";
const CHILD_TYPE: &str = "@childType";
const PATH: &str = "@path";
const IMPLICIT: &str = "@implicit";
const ENTRIES: &str = "@entries";

/// Parse a JSON document into a record.
pub fn record_from_str(text: &str) -> ModelResult<Record> {
    let doc: Json = serde_json::from_str(text)?;
    record_from_json(&doc)
}

/// Convert a JSON document into a record.
///
/// A root object becomes a compound record; a root array becomes a list
/// record whose elements are persisted directly under the target node.
pub fn record_from_json(doc: &Json) -> ModelResult<Record> {
    match doc {
        Json::Object(map) => object_record(map),
        Json::Array(items) => {
            let schema = TypeSchema::builder("json:list").build_arc();
            let items = items
                .iter()
                .map(|item| item_from_json("[root]", item))
                .collect::<ModelResult<Vec<_>>>()?;
            Ok(Record::list(schema, items))
        }
        other => Err(ModelError::UnsupportedRoot(json_kind(other))),
    }
}

fn object_record(map: &Map<String, Json>) -> ModelResult<Record> {
    let resource_type = string_directive(map, TYPE)?;
    let child_type = string_directive(map, CHILD_TYPE)?;
    let path = string_directive(map, PATH)?;
    let implicit = implicit_fields(map)?;

    let class_name = format!(
        "json:{}|{}",
        resource_type.as_deref().unwrap_or("object"),
        child_type.as_deref().unwrap_or("")
    );
    let mut builder = TypeSchema::builder(class_name);
    if let Some(t) = &resource_type {
        builder = builder.resource_type(t.clone());
    }
    if let Some(t) = &child_type {
        builder = builder.child_type(t.clone());
    }

    let mut slots: Vec<(String, Slot)> = Vec::new();
    if let Some(path) = path {
        builder = builder.field(FieldDef::string(PATH).path_marker().transient());
        slots.push((PATH.to_string(), Slot::Scalar(Value::String(path))));
    }

    for (key, value) in map {
        if key.starts_with('@') {
            if ![TYPE, CHILD_TYPE, PATH, IMPLICIT].contains(&key.as_str()) {
                return Err(ModelError::InvalidDirective {
                    directive: key.clone(),
                    reason: "unknown directive".into(),
                });
            }
            continue;
        }
        let (mut field, slot) = field_from_json(key, value)?;
        if implicit.contains(key.as_str()) {
            if field.shape != FieldShape::Collection {
                return Err(ModelError::InvalidDirective {
                    directive: IMPLICIT.into(),
                    reason: format!("{key} is not a collection of objects"),
                });
            }
            field = field.direct_descendants();
        }
        builder = builder.field(field);
        slots.push((key.clone(), slot));
    }

    let mut record = Record::new(builder.build_arc());
    for (name, slot) in slots {
        record.set(name, slot);
    }
    Ok(record)
}

fn field_from_json(key: &str, value: &Json) -> ModelResult<(FieldDef, Slot)> {
    match value {
        Json::Null => Ok((FieldDef::string(key), Slot::Null)),
        Json::String(_) | Json::Bool(_) | Json::Number(_) => {
            let kind = scalar_kind(value).ok_or_else(|| ModelError::MixedArray { field: key.into() })?;
            Ok((FieldDef::scalar(key, kind), Slot::Scalar(scalar(value)?)))
        }
        Json::Array(items) => array_field(key, items),
        Json::Object(map) if map.contains_key(ENTRIES) => {
            if map.len() != 1 {
                return Err(ModelError::InvalidDirective {
                    directive: ENTRIES.into(),
                    reason: format!("{key}: a map object may hold only {ENTRIES}"),
                });
            }
            let Some(Json::Object(entries)) = map.get(ENTRIES) else {
                return Err(ModelError::InvalidDirective {
                    directive: ENTRIES.into(),
                    reason: format!("{key}: {ENTRIES} must be an object"),
                });
            };
            let entries = entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), item_from_json(key, v)?)))
                .collect::<ModelResult<BTreeMap<_, _>>>()?;
            Ok((FieldDef::map(key), Slot::Map(entries)))
        }
        Json::Object(map) => Ok((FieldDef::object(key), Slot::from(object_record(map)?))),
    }
}

fn array_field(key: &str, items: &[Json]) -> ModelResult<(FieldDef, Slot)> {
    if items.iter().any(Json::is_array) {
        return Err(ModelError::NestedArray { field: key.into() });
    }
    if items.is_empty() || items.iter().all(Json::is_object) {
        let items = items
            .iter()
            .map(|item| item_from_json(key, item))
            .collect::<ModelResult<Vec<_>>>()?;
        return Ok((FieldDef::collection(key), Slot::Collection(items)));
    }

    let mixed = || ModelError::MixedArray { field: key.into() };
    let kinds = items
        .iter()
        .map(scalar_kind)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(mixed)?;
    let kind = kinds[0];
    if kinds.iter().any(|k| *k != kind) {
        return Err(mixed());
    }
    let values = items.iter().map(scalar).collect::<ModelResult<Vec<_>>>()?;
    let array = Value::array(values).map_err(|_| ModelError::NestedArray { field: key.into() })?;
    Ok((FieldDef::scalar_array(key, kind), Slot::Scalar(array)))
}

fn item_from_json(field: &str, value: &Json) -> ModelResult<Item> {
    match value {
        Json::Object(map) => Ok(Item::Object(object_record(map)?)),
        Json::Array(_) => Err(ModelError::NestedArray { field: field.into() }),
        Json::Null => Err(ModelError::MixedArray { field: field.into() }),
        other => Ok(Item::Scalar(scalar(other)?)),
    }
}

fn scalar_kind(value: &Json) -> Option<ScalarKind> {
    match value {
        Json::String(_) => Some(ScalarKind::String),
        Json::Bool(_) => Some(ScalarKind::Boolean),
        Json::Number(n) if n.is_i64() => Some(ScalarKind::Long),
        Json::Number(_) => Some(ScalarKind::Double),
        _ => None,
    }
}

fn scalar(value: &Json) -> ModelResult<Value> {
    match value {
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Bool(b) => Ok(Value::Boolean(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Long(i)),
            None => Ok(Value::Double(n.as_f64().unwrap_or(f64::NAN))),
        },
        _ => Err(ModelError::MixedArray {
            field: "[scalar]".into(),
        }),
    }
}

fn string_directive(map: &Map<String, Json>, directive: &str) -> ModelResult<Option<String>> {
    match map.get(directive) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ModelError::InvalidDirective {
            directive: directive.into(),
            reason: format!("expected a string, got {}", json_kind(other)),
        }),
    }
}

fn implicit_fields(map: &Map<String, Json>) -> ModelResult<BTreeSet<String>> {
    let invalid = || ModelError::InvalidDirective {
        directive: IMPLICIT.into(),
        reason: "expected an array of field names".into(),
    };
    match map.get(IMPLICIT) {
        None => Ok(BTreeSet::new()),
        Some(Json::Array(names)) => names
            .iter()
            .map(|n| n.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
