//! Error types for the migration system.

use std::path::PathBuf;

use crate::executor::QueryError;

/// Errors that can occur during migration operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Invalid model or property definition.
    #[error("Definition error: {0}")]
    Definition(String),

    /// The graph engine rejected a submitted script.
    #[error("Gremlin execution error: {0}")]
    Execution(#[from] QueryError),

    /// A required parameter was not configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A dependency names a migration in another package.
    #[error("Migration '{migration}' depends on '{dependency}' outside its package")]
    UnsupportedDependency {
        /// The migration declaring the dependency.
        migration: String,
        /// The foreign dependency.
        dependency: String,
    },

    /// A dependency names a migration that does not exist in the package.
    #[error("Missing dependency: {migration} depends on {dependency}")]
    MissingDependency {
        /// The migration that has the dependency.
        migration: String,
        /// The missing dependency.
        dependency: String,
    },

    /// Migration cannot be reversed.
    #[error("Migration is not reversible: {0}")]
    NotReversible(String),

    /// A migration runner was executed more than once.
    #[error("Migration has already been executed: {0}")]
    AlreadyExecuted(String),

    /// No property type is registered under the given identifier.
    #[error("Unknown property type: {0}")]
    UnknownPropertyType(String),

    /// Migration not found.
    #[error("Migration not found: {package}/{name}")]
    MigrationNotFound {
        /// Package name.
        package: String,
        /// Migration name.
        name: String,
    },

    /// Migrations directory not found.
    #[error("Migrations directory not found: {0}")]
    MigrationsDirNotFound(PathBuf),

    /// A migration file already exists at the target path.
    #[error("Migration file already exists: {0}")]
    MigrationExists(PathBuf),

    /// Parse error in a migration file.
    #[error("Failed to parse migration file {path}: {message}")]
    ParseError {
        /// Path to the file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
