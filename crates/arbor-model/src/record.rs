//! A dynamic, schema-driven persistable object.
//!
//! [`Record`] pairs a [`TypeSchema`] with owned slot values. It serves
//! callers that have no hand-written [`Persistable`] impl, such as the JSON
//! adapter.

use std::collections::BTreeMap;
use std::sync::Arc;

use arbor_types::Value;

use crate::error::AccessError;
use crate::persistable::{Element, FieldValue, Persistable};
use crate::schema::TypeSchema;

/// An element of a collection or map held by a [`Record`].
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Object(Record),
    Scalar(Value),
}

impl Item {
    fn as_element(&self) -> Element<'_> {
        match self {
            Self::Object(record) => Element::Object(record),
            Self::Scalar(value) => Element::Scalar(value),
        }
    }
}

/// The value held in one field or accessor of a [`Record`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Slot {
    #[default]
    Null,
    Scalar(Value),
    Object(Box<Record>),
    Collection(Vec<Item>),
    Map(BTreeMap<String, Item>),
}

impl Slot {
    fn as_field_value(&self) -> FieldValue<'_> {
        match self {
            Self::Null => FieldValue::Null,
            Self::Scalar(value) => FieldValue::Scalar(value.clone()),
            Self::Object(record) => FieldValue::Object(record.as_ref()),
            Self::Collection(items) => {
                FieldValue::Collection(items.iter().map(Item::as_element).collect())
            }
            Self::Map(entries) => FieldValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.as_element()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<Record> for Slot {
    fn from(record: Record) -> Self {
        Self::Object(Box::new(record))
    }
}

/// A persistable object described entirely at runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    schema: Arc<TypeSchema>,
    fields: BTreeMap<String, Slot>,
    accessors: BTreeMap<String, Slot>,
    resource_type: Option<String>,
    elements: Option<Vec<Item>>,
}

impl Record {
    /// An empty record of the given class.
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self {
            schema,
            fields: BTreeMap::new(),
            accessors: BTreeMap::new(),
            resource_type: None,
            elements: None,
        }
    }

    /// A record that is itself a collection of `items`.
    pub fn list(schema: Arc<TypeSchema>, items: Vec<Item>) -> Self {
        Self {
            elements: Some(items),
            ..Self::new(schema)
        }
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, field: impl Into<String>, slot: impl Into<Slot>) -> Self {
        self.set(field, slot);
        self
    }

    /// Builder-style [`Record::set_accessor`].
    pub fn with_accessor(mut self, accessor: impl Into<String>, slot: impl Into<Slot>) -> Self {
        self.set_accessor(accessor, slot);
        self
    }

    /// Builder-style per-instance resource type.
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Set a field value.
    pub fn set(&mut self, field: impl Into<String>, slot: impl Into<Slot>) {
        self.fields.insert(field.into(), slot.into());
    }

    /// Set the value an accessor returns.
    pub fn set_accessor(&mut self, accessor: impl Into<String>, slot: impl Into<Slot>) {
        self.accessors.insert(accessor.into(), slot.into());
    }
}

impl Persistable for Record {
    fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    fn read_field(&self, name: &str) -> Result<FieldValue<'_>, AccessError> {
        if self.schema.field(name).is_none() {
            return Err(AccessError::NoSuchField(name.to_string()));
        }
        Ok(self
            .fields
            .get(name)
            .map_or(FieldValue::Null, Slot::as_field_value))
    }

    fn invoke_accessor(&self, name: &str) -> Result<FieldValue<'_>, AccessError> {
        if self.schema.accessor(name).is_none() {
            return Err(AccessError::NoSuchAccessor(name.to_string()));
        }
        Ok(self
            .accessors
            .get(name)
            .map_or(FieldValue::Null, Slot::as_field_value))
    }

    fn resource_type(&self) -> Option<String> {
        self.resource_type.clone()
    }

    fn as_collection(&self) -> Option<Vec<Element<'_>>> {
        self.elements
            .as_ref()
            .map(|items| items.iter().map(Item::as_element).collect())
    }
}
