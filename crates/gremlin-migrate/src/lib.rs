//! Schema migrations for Titan property graphs.
//!
//! `gremlin-migrate` compares frozen snapshots of vertex and edge models
//! with the live models, turns the differences into reversible migration
//! actions, and compiles migrations into Gremlin/Groovy management scripts
//! that run as a single remote transaction.
//!
//! # Architecture
//!
//! - **Schema** - `PropertyDefinition`, `SchemaState` and `build_schema`
//! - **Autodetector** - Diffs two schema states into change sets
//! - **Actions** - Compiles change sets into invertible actions
//! - **Builder** - Accumulates management statements and wraps them in
//!   the transactional envelope
//! - **Runner** - Executes a migration against the graph or writes its
//!   script to a file
//! - **Package** - Discovers migration files and links their dependencies
//! - **Writer** - Generates JSON migration files
//!
//! # Example
//!
//! ```rust,ignore
//! use gremlin_migrate::prelude::*;
//!
//! struct Initial;
//!
//! impl Migration for Initial {
//!     fn name(&self) -> &str {
//!         "0001_initial"
//!     }
//!
//!     fn forwards(&self, db: &mut ScriptBuilder) -> Result<()> {
//!         db.create_vertex_type("person", None);
//!         db.create_property_key("person_name", DataType::String, Cardinality::Single);
//!         Ok(())
//!     }
//!
//!     fn backwards(&self, db: &mut ScriptBuilder) -> Result<()> {
//!         db.delete_property_key("person_name");
//!         db.delete_vertex_type("person");
//!         Ok(())
//!     }
//! }
//!
//! let mut db = ScriptBuilder::new("people").dry_run(true);
//! MigrationRunner::new(&Initial, RunTarget::Graph(&UnconfiguredExecutor))
//!     .execute(&mut db, Direction::Forwards)?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Show the migrations of a package
//! gremlin-migrate showmigrations
//!
//! # Print the script of a migration
//! gremlin-migrate scriptmigrate 0002
//!
//! # Generate a migration from a frozen snapshot of the live models
//! gremlin-migrate makemigrations --models models.json --name add_email
//!
//! # Preview a rollback
//! gremlin-migrate migrate 0002 --reverse --dry-run
//! ```

pub mod actions;
pub mod autodetector;
pub mod builder;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod frozen;
pub mod operations;
pub mod package;
pub mod registry;
pub mod runner;
pub mod schema;
pub mod signals;
pub mod writer;

use crate::builder::ScriptBuilder;
use crate::error::Result;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::actions::{get_model_info, to_actions, Action, ActionKind, ModelInfo};
    pub use crate::autodetector::{
        diff_composite_indices, diff_element_label, diff_properties, Autodetector,
        AutodetectorOptions, ChangeSet,
    };
    pub use crate::builder::ScriptBuilder;
    pub use crate::config::{BackendConfig, MigrateConfig, StorageBackend};
    pub use crate::dialect::{ManagementDialect, TitanDialect};
    pub use crate::error::{MigrateError, Result};
    pub use crate::executor::{QueryError, QueryExecutor, UnconfiguredExecutor};
    pub use crate::operations::SchemaOperation;
    pub use crate::package::{DependencyPolicy, MigrationDefinition, MigrationFile, PackageMigrations};
    pub use crate::registry::{ModelRegistry, PropertyTypeRegistry};
    pub use crate::runner::{Direction, MigrationRunner, RunTarget};
    pub use crate::schema::{
        build_schema, Cardinality, CompositeIndexSpec, DataType, ElementKind, Multiplicity,
        PropertyDefinition, PropertyType, SchemaAction, SchemaState, TimeUnit, Ttl,
    };
    pub use crate::writer::{generate_migration_name, MigrationWriter};
    pub use crate::Migration;
}

/// A migration: a named pair of forwards and backwards schema changes.
///
/// Both directions must be implemented. They populate the builder through
/// its primitives; the runner then generates and delivers the script.
pub trait Migration {
    /// Migration name (e.g., "0001_initial").
    fn name(&self) -> &str;

    /// Migrations that must run before this one.
    fn depends_on(&self) -> &[String] {
        &[]
    }

    /// Applies the schema changes.
    fn forwards(&self, db: &mut ScriptBuilder) -> Result<()>;

    /// Undoes the schema changes.
    fn backwards(&self, db: &mut ScriptBuilder) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    struct TestMigration;

    impl Migration for TestMigration {
        fn name(&self) -> &str {
            "0001_initial"
        }

        fn forwards(&self, db: &mut ScriptBuilder) -> Result<()> {
            db.create_edge_type("knows", Multiplicity::Simple, false, None);
            Ok(())
        }

        fn backwards(&self, db: &mut ScriptBuilder) -> Result<()> {
            db.delete_edge_type("knows");
            Ok(())
        }
    }

    #[test]
    fn test_migration_trait() {
        assert_eq!(TestMigration.name(), "0001_initial");
        assert!(TestMigration.depends_on().is_empty());

        let mut db = ScriptBuilder::new("test");
        TestMigration.forwards(&mut db).unwrap();
        assert_eq!(db.cached_commands().len(), 1);
    }

    #[test]
    fn test_migration_as_trait_object() {
        let migration: &dyn Migration = &TestMigration;
        let mut db = ScriptBuilder::new("test").dry_run(true);
        let outcome = MigrationRunner::new(migration, RunTarget::Graph(&UnconfiguredExecutor))
            .execute(&mut db, Direction::Backwards)
            .unwrap();
        assert!(outcome.script.contains("test_knows = mgmt.getEdgeLabel(\"knows\")"));
    }
}
