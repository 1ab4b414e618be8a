//! Node paths and node name validation.
//!
//! A node path is absolute and slash-delimited: `/` is the root, and every
//! other path is `/` followed by one or more node names joined by `/`.
//!
//! Valid node names:
//! - Must be non-empty and not only whitespace
//! - Must not be `.` or `..`
//! - Must not contain `/`, `[`, `]`, `*`, `|` or control characters

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Characters that are forbidden anywhere in a node name.
const FORBIDDEN_CHARS: &[char] = &['/', '[', ']', '*', '|'];

/// Validate a single node name (one path segment).
///
/// # Examples
///
/// ```
/// use arbor_types::validate_node_name;
///
/// assert!(validate_node_name("jcr:content").is_ok());
/// assert!(validate_node_name("item-1").is_ok());
/// assert!(validate_node_name("").is_err());
/// assert!(validate_node_name("a/b").is_err());
/// ```
pub fn validate_node_name(name: &str) -> Result<(), TypeError> {
    if name.trim().is_empty() {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: "node name must not be empty".into(),
        });
    }

    if name == "." || name == ".." {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: "'.' and '..' are reserved".into(),
        });
    }

    for ch in FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return Err(TypeError::InvalidName {
                name: name.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
    }

    if let Some(ch) = name.chars().find(|c| c.is_control()) {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: format!("contains control character: {ch:?}"),
        });
    }

    Ok(())
}

/// An absolute, normalized node path.
///
/// The root is `/`. Any other path has no trailing slash and no empty
/// segments, so two `NodePath`s are equal exactly when they address the same
/// node.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath(String);

impl NodePath {
    /// The root path `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and validate an absolute path.
    ///
    /// A single trailing slash is tolerated and dropped (`/a/b/` is `/a/b`).
    pub fn parse(path: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if path.trim().is_empty() {
            return Err(invalid("path must not be blank"));
        }
        if !path.starts_with('/') {
            return Err(invalid("path must be absolute"));
        }
        if path == "/" {
            return Ok(Self::root());
        }

        let body = path.strip_suffix('/').unwrap_or(path);
        for segment in body[1..].split('/') {
            validate_node_name(segment).map_err(|e| invalid(&e.to_string()))?;
        }
        Ok(Self(body.to_string()))
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `/`.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Append one validated node name.
    pub fn join(&self, name: &str) -> Result<NodePath, TypeError> {
        validate_node_name(name)?;
        if self.is_root() {
            Ok(Self(format!("/{name}")))
        } else {
            Ok(Self(format!("{}/{name}", self.0)))
        }
    }

    /// Node names from the root down, excluding the root itself.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Number of segments below the root (`/` has depth 0).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Every proper ancestor, ordered from the root downward.
    pub fn ancestors(&self) -> Vec<NodePath> {
        let mut chain = Vec::with_capacity(self.depth());
        let mut current = self.parent();
        while let Some(path) = current {
            current = path.parent();
            chain.push(path);
        }
        chain.reverse();
        chain
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({})", self.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodePath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodePath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.0
    }
}

impl AsRef<str> for NodePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
