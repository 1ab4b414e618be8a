//! Identity resolution: where in the store an object lives.

use tracing::warn;

use crate::error::AccessError;
use crate::persistable::{FieldValue, Persistable};
use crate::schema::{FieldShape, ScalarKind};

/// Name of the conventional path accessor and path field.
pub const PATH_MEMBER: &str = "path";

/// Resolves the store path of an object.
///
/// Resolution order, first match wins:
/// 1. a field, then an accessor, carrying the path marker;
/// 2. an accessor named `path` declared to return a string;
/// 3. a field named `path` holding a string (transient or not);
/// 4. nothing: the caller has to supply the path.
///
/// Blank strings never count as a path. Read failures are logged and the
/// rule is skipped.
#[derive(Clone, Debug)]
pub struct IdentityResolver {
    warn_on_missing: bool,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl IdentityResolver {
    /// A resolver that logs a warning for objects without identity when
    /// `warn_on_missing` is set.
    pub fn new(warn_on_missing: bool) -> Self {
        Self { warn_on_missing }
    }

    /// The path of `object`, if it declares one.
    pub fn resolve(&self, object: &dyn Persistable) -> Option<String> {
        let schema = object.schema();

        for field in schema.all_fields().into_iter().filter(|f| f.path_marker) {
            if let Some(path) = read(object, &field.name, Member::Field) {
                return Some(path);
            }
        }
        for accessor in schema.all_accessors().into_iter().filter(|a| a.path_marker) {
            if let Some(path) = read(object, &accessor.name, Member::Accessor) {
                return Some(path);
            }
        }

        if schema
            .accessor(PATH_MEMBER)
            .is_some_and(|a| a.returns == Some(ScalarKind::String))
        {
            if let Some(path) = read(object, PATH_MEMBER, Member::Accessor) {
                return Some(path);
            }
        }

        if schema
            .field(PATH_MEMBER)
            .is_some_and(|f| f.shape == FieldShape::Scalar(ScalarKind::String))
        {
            if let Some(path) = read(object, PATH_MEMBER, Member::Field) {
                return Some(path);
            }
        }

        if self.warn_on_missing {
            warn!(
                class = %schema.class_name,
                "object has no path; instances without identity may collide at the caller-supplied path"
            );
        }
        None
    }
}

#[derive(Clone, Copy)]
enum Member {
    Field,
    Accessor,
}

fn read(object: &dyn Persistable, name: &str, member: Member) -> Option<String> {
    let result: Result<FieldValue<'_>, AccessError> = match member {
        Member::Field => object.read_field(name),
        Member::Accessor => object.invoke_accessor(name),
    };
    match result {
        Ok(value) => value
            .as_string()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        Err(e) => {
            warn!(class = %object.schema().class_name, member = name, error = %e, "path lookup failed");
            None
        }
    }
}
