//! Migration package discovery and dependency graph.
//!
//! A package is a directory of JSON migration definitions named
//! `NNNN_name.json`. File order is the total order of the package: the
//! latest migration is the last file, whatever the declared dependencies
//! say.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::builder::ScriptBuilder;
use crate::error::{MigrateError, Result};
use crate::frozen::FrozenModels;
use crate::operations::SchemaOperation;
use crate::registry::PropertyTypeRegistry;
use crate::schema::{ElementKind, SchemaState};
use crate::Migration;

static MIGRATION_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}_[A-Za-z0-9_]+\.json$").expect("migration filename pattern is valid")
});

/// What to do with a dependency on another package's migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyPolicy {
    /// Drop the dependency and log a warning.
    #[default]
    Warn,
    /// Fail with [`MigrateError::UnsupportedDependency`].
    Error,
}

impl fmt::Display for DependencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => f.write_str("warn"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Returns true for `NNNN_name.json` where the name is alphanumeric or `_`.
#[must_use]
pub fn is_migration_filename(filename: &str) -> bool {
    MIGRATION_FILENAME.is_match(filename)
}

/// The serialized form of a migration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MigrationDefinition {
    /// Migrations this one depends on, as `name` or `package/name`.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Operations applied when migrating forwards.
    #[serde(default)]
    pub forwards: Vec<SchemaOperation>,
    /// Operations applied when migrating backwards. Derived from
    /// `forwards` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backwards: Option<Vec<SchemaOperation>>,
    /// Frozen models as of this migration.
    #[serde(default)]
    pub models: FrozenModels,
    /// Console summary of the detected changes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary: Vec<String>,
}

impl MigrationDefinition {
    /// Returns the backwards operations of the migration named `name`.
    ///
    /// Without an explicit list, every forwards operation is reversed in
    /// reverse order. Fails if any of them cannot be reversed.
    pub fn backwards_operations(&self, name: &str) -> Result<Vec<SchemaOperation>> {
        if let Some(backwards) = &self.backwards {
            return Ok(backwards.clone());
        }

        self.forwards
            .iter()
            .rev()
            .map(|op| {
                op.reverse().ok_or_else(|| {
                    MigrateError::NotReversible(format!("{}: {}", name, op.description()))
                })
            })
            .collect()
    }
}

/// One migration of a package.
#[derive(Debug, Clone)]
pub struct MigrationFile {
    name: String,
    path: Option<PathBuf>,
    definition: MigrationDefinition,
    dependencies: BTreeSet<String>,
    dependents: BTreeSet<String>,
    models: IndexMap<String, SchemaState>,
}

impl MigrationFile {
    /// Creates a migration from an in-memory definition.
    #[must_use]
    pub fn new(name: impl Into<String>, definition: MigrationDefinition) -> Self {
        Self {
            name: name.into(),
            path: None,
            definition,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            models: IndexMap::new(),
        }
    }

    /// Loads a migration definition file. The name is the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| MigrateError::ParseError {
                path: path.to_path_buf(),
                message: "file name is not valid UTF-8".to_string(),
            })?
            .to_string();

        let contents = fs::read_to_string(path)?;
        let definition =
            serde_json::from_str(&contents).map_err(|e| MigrateError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut migration = Self::new(name, definition);
        migration.path = Some(path.to_path_buf());
        Ok(migration)
    }

    /// Returns the file path, if the migration was loaded from disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the migration definition.
    #[must_use]
    pub const fn definition(&self) -> &MigrationDefinition {
        &self.definition
    }

    /// Returns the number prefix of the name.
    #[must_use]
    pub fn number(&self) -> Option<u32> {
        self.name.get(..4).and_then(|prefix| prefix.parse().ok())
    }

    /// Returns the resolved in-package dependencies.
    #[must_use]
    pub const fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Returns the migrations that depend on this one.
    #[must_use]
    pub const fn dependents(&self) -> &BTreeSet<String> {
        &self.dependents
    }

    /// Rehydrates the frozen models into schema states.
    pub fn regenerate_models(&mut self, types: &PropertyTypeRegistry) -> Result<()> {
        self.models = self
            .definition
            .models
            .iter()
            .map(|(model_ref, frozen)| Ok((model_ref.clone(), frozen.thaw(model_ref, types)?)))
            .collect::<Result<_>>()?;
        debug!(migration = %self.name, models = self.models.len(), "Regenerated models");
        Ok(())
    }

    /// Returns the rehydrated models, keyed by model reference.
    #[must_use]
    pub const fn models(&self) -> &IndexMap<String, SchemaState> {
        &self.models
    }

    /// Returns a rehydrated model by reference.
    #[must_use]
    pub fn get_model_by_ref(&self, model_ref: &str) -> Option<&SchemaState> {
        self.models.get(model_ref)
    }

    /// Returns a rehydrated model by kind and label.
    #[must_use]
    pub fn get_model_by_label(&self, kind: ElementKind, label: &str) -> Option<&SchemaState> {
        self.models
            .values()
            .find(|model| model.kind == kind && model.label == label)
    }
}

impl Migration for MigrationFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn depends_on(&self) -> &[String] {
        &self.definition.depends_on
    }

    fn forwards(&self, db: &mut ScriptBuilder) -> Result<()> {
        for op in &self.definition.forwards {
            op.apply(db)?;
        }
        Ok(())
    }

    fn backwards(&self, db: &mut ScriptBuilder) -> Result<()> {
        for op in self.definition.backwards_operations(&self.name)? {
            op.apply(db)?;
        }
        Ok(())
    }
}

/// All migrations of one package, in file order.
#[derive(Debug, Clone)]
pub struct PackageMigrations {
    package: String,
    directory: Option<PathBuf>,
    migrations: IndexMap<String, MigrationFile>,
}

impl PackageMigrations {
    /// Loads every migration file in `directory`.
    ///
    /// Files not named `NNNN_name.json` are ignored.
    pub fn load(directory: &Path, package: impl Into<String>) -> Result<Self> {
        if !directory.is_dir() {
            return Err(MigrateError::MigrationsDirNotFound(directory.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            let matches = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(is_migration_filename);
            if matches && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut migrations = IndexMap::new();
        for path in paths {
            let migration = MigrationFile::load(&path)?;
            migrations.insert(migration.name.clone(), migration);
        }

        let package = package.into();
        debug!(package = %package, count = migrations.len(), "Loaded migrations");
        Ok(Self {
            package,
            directory: Some(directory.to_path_buf()),
            migrations,
        })
    }

    /// Builds a package from in-memory definitions, kept in the given order.
    pub fn from_definitions<I, S>(package: impl Into<String>, definitions: I) -> Self
    where
        I: IntoIterator<Item = (S, MigrationDefinition)>,
        S: Into<String>,
    {
        let migrations = definitions
            .into_iter()
            .map(|(name, definition)| {
                let migration = MigrationFile::new(name, definition);
                (migration.name.clone(), migration)
            })
            .collect();
        Self {
            package: package.into(),
            directory: None,
            migrations,
        }
    }

    /// Returns the package name.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Returns the directory the package was loaded from.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Links every migration to its dependencies and dependents.
    ///
    /// A dependency is `name` or `package/name`. Dependencies on another
    /// package are handled according to `policy`. An in-package name that
    /// matches no migration is always an error.
    pub fn resolve_dependencies(&mut self, policy: DependencyPolicy) -> Result<()> {
        let mut edges = Vec::new();

        for migration in self.migrations.values() {
            for dependency in &migration.definition.depends_on {
                let (package, name) = dependency
                    .split_once('/')
                    .unwrap_or((self.package.as_str(), dependency.as_str()));

                if package != self.package {
                    match policy {
                        DependencyPolicy::Warn => {
                            warn!(
                                migration = %migration.name,
                                dependency = %dependency,
                                "Dependencies on other packages are not supported, ignoring"
                            );
                            continue;
                        }
                        DependencyPolicy::Error => {
                            return Err(MigrateError::UnsupportedDependency {
                                migration: migration.name.clone(),
                                dependency: dependency.clone(),
                            });
                        }
                    }
                }

                if !self.migrations.contains_key(name) {
                    return Err(MigrateError::MissingDependency {
                        migration: migration.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
                edges.push((migration.name.clone(), name.to_string()));
            }
        }

        for migration in self.migrations.values_mut() {
            migration.dependencies.clear();
            migration.dependents.clear();
        }
        for (migration, dependency) in edges {
            if let Some(file) = self.migrations.get_mut(&migration) {
                file.dependencies.insert(dependency.clone());
            }
            if let Some(file) = self.migrations.get_mut(&dependency) {
                file.dependents.insert(migration);
            }
        }
        Ok(())
    }

    /// Rehydrates the frozen models of every migration.
    pub fn regenerate_models(&mut self, types: &PropertyTypeRegistry) -> Result<()> {
        for migration in self.migrations.values_mut() {
            migration.regenerate_models(types)?;
        }
        Ok(())
    }

    /// Returns the latest migration. With `update`, returns the one before
    /// it instead, which is the base a rewritten latest migration diffs
    /// against.
    #[must_use]
    pub fn get_latest(&self, update: bool) -> Option<&MigrationFile> {
        let skip = usize::from(update);
        self.migrations.values().rev().nth(skip)
    }

    /// Returns a migration by full name or by its four-digit number.
    pub fn get(&self, name: &str) -> Result<&MigrationFile> {
        if let Some(migration) = self.migrations.get(name) {
            return Ok(migration);
        }

        let number: Option<u32> = name.parse().ok();
        self.migrations
            .values()
            .find(|m| number.is_some() && m.number() == number)
            .ok_or_else(|| MigrateError::MigrationNotFound {
                package: self.package.clone(),
                name: name.to_string(),
            })
    }

    /// Returns the migration preceding `name` in file order.
    #[must_use]
    pub fn previous(&self, name: &str) -> Option<&MigrationFile> {
        let index = self.migrations.get_index_of(name)?;
        index
            .checked_sub(1)
            .and_then(|i| self.migrations.get_index(i))
            .map(|(_, migration)| migration)
    }

    /// Returns the number the next migration should get.
    #[must_use]
    pub fn next_number(&self) -> u32 {
        self.migrations
            .values()
            .filter_map(MigrationFile::number)
            .max()
            .map_or(1, |n| n + 1)
    }

    /// Iterates the migrations in file order.
    pub fn iter(&self) -> impl Iterator<Item = &MigrationFile> {
        self.migrations.values()
    }

    /// Returns the number of migrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Returns true if the package has no migrations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}
