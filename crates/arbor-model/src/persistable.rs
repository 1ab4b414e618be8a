//! The capability trait through which the engine reads an object graph.

use arbor_types::Value;

use crate::error::AccessError;
use crate::schema::TypeSchema;

/// A member of a collection or the value of a map entry.
#[derive(Clone, Copy)]
pub enum Element<'a> {
    Object(&'a dyn Persistable),
    Scalar(&'a Value),
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object(obj) => write!(f, "Object({})", obj.schema().class_name),
            Self::Scalar(value) => write!(f, "Scalar({value})"),
        }
    }
}

/// The current value of a field or accessor, borrowed from the object.
#[derive(Clone)]
pub enum FieldValue<'a> {
    Null,
    /// A scalar, or an array of scalars.
    Scalar(Value),
    Object(&'a dyn Persistable),
    Collection(Vec<Element<'a>>),
    /// Entries keyed by their string form.
    Map(Vec<(String, Element<'a>)>),
}

impl<'a> FieldValue<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `Null` for `None`, otherwise the converted scalar.
    pub fn optional<T: Into<Value>>(value: Option<T>) -> Self {
        value.map_or(Self::Null, |v| Self::Scalar(v.into()))
    }

    /// A collection of objects.
    pub fn objects<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: Persistable + 'a,
    {
        Self::Collection(
            items
                .into_iter()
                .map(|item| Element::Object(item as &dyn Persistable))
                .collect(),
        )
    }

    /// A map of objects, keyed by the string form of each key.
    pub fn object_map<I, K, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, &'a T)>,
        K: ToString,
        T: Persistable + 'a,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), Element::Object(v as &dyn Persistable)))
                .collect(),
        )
    }

    /// The string payload of a string scalar.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Scalar(value) => write!(f, "Scalar({value})"),
            Self::Object(obj) => write!(f, "Object({})", obj.schema().class_name),
            Self::Collection(items) => f.debug_tuple("Collection").field(items).finish(),
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
        }
    }
}

/// An object the engine can persist.
///
/// The schema declares what the object has; `read_field` and
/// `invoke_accessor` return what it currently holds. Implementations never
/// need to filter or classify fields themselves.
pub trait Persistable {
    /// The class description of this object.
    fn schema(&self) -> &TypeSchema;

    /// Current value of a declared field.
    fn read_field(&self, name: &str) -> Result<FieldValue<'_>, AccessError>;

    /// Current value returned by a declared accessor.
    fn invoke_accessor(&self, name: &str) -> Result<FieldValue<'_>, AccessError> {
        Err(AccessError::NoSuchAccessor(name.to_string()))
    }

    /// Per-instance resource type, overriding the class-level markers.
    ///
    /// Resolved on every call; it bypasses the per-class type cache.
    fn resource_type(&self) -> Option<String> {
        None
    }

    /// Elements, when the object is itself a collection rather than a
    /// compound object.
    fn as_collection(&self) -> Option<Vec<Element<'_>>> {
        None
    }
}
