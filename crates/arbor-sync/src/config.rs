use std::path::Path;

use arbor_model::PrimitiveCollectionMode;
use arbor_types::{validate_node_name, CONTENT_NODE_NAME, DEFAULT_NODE_TYPE};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Configuration for the synchronizer.
///
/// Every key is optional in TOML; missing keys take the defaults below.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Type for new nodes without a more specific type.
    pub default_node_type: String,
    /// Name of the content sub-node used by types that declare a child type.
    pub content_node_name: String,
    /// Property holding the value of a scalar stored as its own node.
    pub scalar_value_property: String,
    /// How scalar arrays are stored when a field does not say.
    pub primitive_collections: PrimitiveCollectionMode,
    /// Log a warning for objects that declare no path.
    pub warn_on_missing_identity: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_node_type: DEFAULT_NODE_TYPE.to_string(),
            content_node_name: CONTENT_NODE_NAME.to_string(),
            scalar_value_property: "value".to_string(),
            primitive_collections: PrimitiveCollectionMode::Property,
            warn_on_missing_identity: true,
        }
    }
}

impl SyncConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> SyncResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Check that the configured names can be used in the store.
    pub fn validate(&self) -> SyncResult<()> {
        if self.default_node_type.trim().is_empty() {
            return Err(SyncError::Config("default_node_type must not be empty".into()));
        }
        for (key, name) in [
            ("content_node_name", &self.content_node_name),
            ("scalar_value_property", &self.scalar_value_property),
        ] {
            validate_node_name(name).map_err(|e| SyncError::Config(format!("{key}: {e}")))?;
        }
        Ok(())
    }
}
