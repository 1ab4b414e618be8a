//! Object model for Arbor.
//!
//! The synchronization engine never inspects objects by reflection. Instead
//! every persistable object implements [`Persistable`], which pairs a
//! declarative [`TypeSchema`] (what fields, accessors and type markers the
//! class has) with accessors for the current values.
//!
//! # Modules
//!
//! - [`schema`] — [`TypeSchema`], [`FieldDef`], [`AccessorDef`]
//! - [`persistable`] — the [`Persistable`] trait and borrowed [`FieldValue`]s
//! - [`registry`] — [`TypeRegistry`]: node types per class, cached
//! - [`introspect`] — [`persistable_attributes`]: which fields are written
//! - [`identity`] — [`IdentityResolver`]: the store path of an object
//! - [`record`] — [`Record`], a dynamic persistable object
//! - [`json`] — build [`Record`]s from JSON documents

pub mod error;
pub mod identity;
pub mod introspect;
pub mod json;
pub mod persistable;
pub mod record;
pub mod registry;
pub mod schema;

pub use error::{AccessError, ModelError, ModelResult};
pub use identity::{IdentityResolver, PATH_MEMBER};
pub use introspect::{persistable_attributes, Attribute, AttributeKind};
pub use json::{record_from_json, record_from_str};
pub use persistable::{Element, FieldValue, Persistable};
pub use record::{Item, Record, Slot};
pub use registry::{TypeKey, TypeRegistry};
pub use schema::{
    AccessorDef, FieldDef, FieldShape, PrimitiveCollectionMode, ScalarKind, TypeSchema,
    TypeSchemaBuilder,
};
