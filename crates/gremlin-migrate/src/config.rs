//! Migration configuration.
//!
//! Configuration is read from an optional JSON file. Every field has a
//! default, so an empty object is a valid configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};
use crate::package::DependencyPolicy;

/// Storage backend of the graph, used to pick the index repair job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Apache Cassandra.
    #[default]
    Cassandra,
    /// Apache HBase.
    Hbase,
}

impl StorageBackend {
    /// Returns the repair job prefix (`cassandra` or `hbase`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cassandra => "cassandra",
            Self::Hbase => "hbase",
        }
    }

    /// Returns the partitioner class the repair job needs, if any.
    #[must_use]
    pub const fn partitioner(self) -> Option<&'static str> {
        match self {
            Self::Cassandra => Some("org.apache.cassandra.dht.Murmur3Partitioner"),
            Self::Hbase => None,
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Storage backend.
    #[serde(default)]
    pub storage: StorageBackend,
    /// Path of the graph's properties file on the server.
    pub properties_file: String,
}

impl BackendConfig {
    /// Creates backend settings.
    #[must_use]
    pub fn new(storage: StorageBackend, properties_file: impl Into<String>) -> Self {
        Self {
            storage,
            properties_file: properties_file.into(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Directory holding the migration files.
    pub migrations_dir: PathBuf,
    /// Package the migrations belong to.
    pub package: String,
    /// Variable prefix for generated scripts. Defaults to the package.
    pub model_name: Option<String>,
    /// What to do with dependencies on other packages.
    pub dependency_policy: DependencyPolicy,
    /// Storage backend, needed for index repair.
    pub backend: Option<BackendConfig>,
    /// Wait for every new graph index to be registered after the
    /// management transaction commits.
    pub wait_for_registration: bool,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("migrations"),
            package: "app".to_string(),
            model_name: None,
            dependency_policy: DependencyPolicy::Warn,
            backend: None,
            wait_for_registration: false,
        }
    }
}

impl MigrateConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        contents.parse().map_err(|e| match e {
            MigrateError::Serialization(err) => MigrateError::ParseError {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
            other => other,
        })
    }

    /// Returns the script variable prefix.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(&self.package)
    }
}

impl FromStr for MigrateConfig {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
