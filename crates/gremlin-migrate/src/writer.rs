//! Migration file writer.
//!
//! Turns the actions found by the autodetector into a JSON migration
//! definition, the on-disk format [`PackageMigrations`] loads.
//!
//! [`PackageMigrations`]: crate::package::PackageMigrations

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tracing::info;

use crate::actions::Action;
use crate::error::{MigrateError, Result};
use crate::frozen::FrozenModels;
use crate::operations::SchemaOperation;
use crate::package::MigrationDefinition;

static NAME_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9]+").expect("name separator pattern is valid")
});

/// Builds and writes one migration file.
#[derive(Debug, Clone)]
pub struct MigrationWriter {
    package: String,
    name: String,
    depends_on: Vec<String>,
    actions: Vec<Action>,
    models: FrozenModels,
}

impl MigrationWriter {
    /// Creates a writer for migration `name` of `package`.
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            depends_on: Vec::new(),
            actions: Vec::new(),
            models: FrozenModels::new(),
        }
    }

    /// Adds a dependency on another migration.
    #[must_use]
    pub fn depends_on(mut self, migration: impl Into<String>) -> Self {
        self.depends_on.push(migration.into());
        self
    }

    /// Adds a detected action.
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Adds detected actions, in order.
    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Sets the frozen models stored with the migration.
    #[must_use]
    pub fn models(mut self, models: FrozenModels) -> Self {
        self.models = models;
        self
    }

    /// Returns the migration name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the forwards operations, in execution order.
    #[must_use]
    pub fn forwards_operations(&self) -> Vec<SchemaOperation> {
        let mut operations = Vec::new();
        for action in &self.actions {
            action.add_forwards(&mut operations);
        }
        operations
    }

    /// Returns the backwards operations, in execution order.
    ///
    /// Actions are undone last to first. Actions flagged to prepend their
    /// backwards side, such as index removals, still go first.
    #[must_use]
    pub fn backwards_operations(&self) -> Vec<SchemaOperation> {
        let mut operations = Vec::new();
        for action in self.actions.iter().rev() {
            action.add_backwards(&mut operations);
        }
        operations
    }

    /// Returns the migration definition.
    #[must_use]
    pub fn definition(&self) -> MigrationDefinition {
        MigrationDefinition {
            depends_on: self.depends_on.clone(),
            forwards: self.forwards_operations(),
            backwards: Some(self.backwards_operations()),
            models: self.models.clone(),
            summary: self.actions.iter().map(Action::console_line).collect(),
        }
    }

    /// Serializes the migration definition as pretty-printed JSON.
    pub fn generate(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.definition())?;
        json.push('\n');
        Ok(json)
    }

    /// Renders the forwards and backwards code of every action, for
    /// previews.
    #[must_use]
    pub fn render_code(&self) -> String {
        let mut forwards = Vec::new();
        let mut backwards = Vec::new();
        for action in &self.actions {
            action.add_forwards_code(&mut forwards);
        }
        for action in self.actions.iter().rev() {
            action.add_backwards_code(&mut backwards);
        }

        let mut code = format!("# {}/{}\n", self.package, self.name);
        for dependency in &self.depends_on {
            code.push_str(&format!("# depends on {}\n", dependency));
        }
        code.push_str("\nforwards:\n");
        code.push_str(&code_block(&forwards));
        code.push_str("\nbackwards:\n");
        code.push_str(&code_block(&backwards));
        code
    }

    /// Writes `<dir>/<name>.json`, creating `dir` if needed.
    ///
    /// An existing file is only replaced when `overwrite` is set.
    pub fn write_to(&self, dir: &Path, overwrite: bool) -> Result<PathBuf> {
        let path = dir.join(format!("{}.json", self.name));
        if path.exists() && !overwrite {
            return Err(MigrateError::MigrationExists(path));
        }

        let json = self.generate()?;
        fs::create_dir_all(dir)?;
        fs::write(&path, json)?;
        info!(
            package = %self.package,
            migration = %self.name,
            path = %path.display(),
            "Created migration"
        );
        Ok(path)
    }
}

fn code_block(lines: &[String]) -> String {
    if lines.is_empty() {
        "        # no operations\n".to_string()
    } else {
        lines.concat()
    }
}

/// Generates a migration name from its number and a description.
///
/// The description is reduced to the characters a migration file name
/// allows. Without one, a timestamped `auto_` name is used.
#[must_use]
pub fn generate_migration_name(number: u32, name: &str) -> String {
    let cleaned = NAME_SEPARATORS.replace_all(name, "_");
    let cleaned = cleaned.trim_matches('_');

    if cleaned.is_empty() {
        format!("{:04}_auto_{}", number, Utc::now().format("%Y%m%d_%H%M"))
    } else {
        format!("{:04}_{}", number, cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::get_model_info;
    use crate::autodetector::Autodetector;
    use crate::builder::ScriptBuilder;
    use crate::package::{is_migration_filename, PackageMigrations};
    use crate::registry::ModelRegistry;
    use crate::schema::{
        build_schema, CompositeIndexSpec, DataType, ElementKind, PropertyDefinition, PropertyType,
        SchemaState,
    };
    use indexmap::IndexMap;
    use crate::Migration;

    fn person_actions() -> (Vec<Action>, FrozenModels) {
        let person = build_schema(
            ElementKind::Vertex,
            "people.Person",
            "person",
            vec![PropertyDefinition::new("name", PropertyType::STRING).db_field("person_name")],
        )
        .unwrap()
        .with_composite_index("by_name", CompositeIndexSpec::new(["person_name"]));

        let info = get_model_info(&person);
        let actions = vec![
            Action::add_element_type(&info),
            Action::add_property(&info, &person.properties["name"]),
            Action::add_composite_index(&info, "by_name", &person.composite_indices["by_name"]),
        ];
        let models = ModelRegistry::new().with(person).unwrap().freeze("people");
        (actions, models)
    }

    #[test]
    fn test_generate_migration_name() {
        assert_eq!(generate_migration_name(1, "initial"), "0001_initial");
        assert_eq!(generate_migration_name(12, "add phone-number"), "0012_add_phone_number");
        assert_eq!(generate_migration_name(4, "  rename -- email  "), "0004_rename_email");
        assert_eq!(generate_migration_name(5, "add_pet"), "0005_add_pet");

        let auto = generate_migration_name(3, "");
        assert!(auto.starts_with("0003_auto_"));
        assert!(is_migration_filename(&format!("{}.json", auto)));
    }

    #[test]
    fn test_operation_order() {
        let (actions, _) = person_actions();
        let writer = MigrationWriter::new("people", "0001_initial").actions(actions);

        assert_eq!(
            writer.forwards_operations(),
            vec![
                SchemaOperation::create_vertex_type("person"),
                SchemaOperation::create_property_key("person_name", crate::schema::DataType::String),
                SchemaOperation::CreateCompositeIndex {
                    index_key: "by_name".to_string(),
                    edge_key: None,
                    element: ElementKind::Vertex,
                    keys: vec!["person_name".to_string()],
                    unique: false,
                    indexer: None,
                },
            ]
        );
        assert_eq!(
            writer.backwards_operations(),
            vec![
                SchemaOperation::delete_composite_index("by_name"),
                SchemaOperation::delete_property_key("person_name"),
                SchemaOperation::delete_vertex_type("person"),
            ]
        );
    }

    fn indexed_person(index: CompositeIndexSpec) -> SchemaState {
        build_schema(
            ElementKind::Vertex,
            "people.Person",
            "person",
            vec![PropertyDefinition::new("name", PropertyType::STRING).db_field("person_name")],
        )
        .unwrap()
        .with_composite_index("by_name", index)
    }

    fn by_model_ref(model: SchemaState) -> IndexMap<String, SchemaState> {
        [(model.model_ref.clone(), model)].into_iter().collect()
    }

    #[test]
    fn test_removed_model_rebuilds_index_last() {
        let previous = by_model_ref(indexed_person(CompositeIndexSpec::new(["person_name"])));
        let actions = Autodetector::new().plan(&previous, &ModelRegistry::new(), "people");
        let writer = MigrationWriter::new("people", "0002_drop_person").actions(actions);

        assert_eq!(
            writer.forwards_operations(),
            vec![
                SchemaOperation::delete_composite_index("by_name"),
                SchemaOperation::delete_property_key("person_name"),
                SchemaOperation::delete_vertex_type("person"),
            ]
        );
        assert_eq!(
            writer.backwards_operations(),
            vec![
                SchemaOperation::create_vertex_type("person"),
                SchemaOperation::create_property_key("person_name", DataType::String),
                SchemaOperation::CreateCompositeIndex {
                    index_key: "by_name".to_string(),
                    edge_key: None,
                    element: ElementKind::Vertex,
                    keys: vec!["person_name".to_string()],
                    unique: false,
                    indexer: None,
                },
            ]
        );

        let mut db = ScriptBuilder::new("people");
        for op in writer.backwards_operations() {
            op.apply(&mut db).unwrap();
        }
        let script = db.generate_script();
        let make_key = script.find("mgmt.makePropertyKey(\"person_name\")").unwrap();
        let build_index = script.find("mgmt.buildIndex(").unwrap();
        assert!(make_key < build_index);
    }

    #[test]
    fn test_changed_index_rollback_order() {
        let previous = by_model_ref(indexed_person(CompositeIndexSpec::new(["person_name"])));
        let registry = ModelRegistry::new()
            .with(indexed_person(CompositeIndexSpec::new(["person_name"]).unique()))
            .unwrap();
        let actions = Autodetector::new().plan(&previous, &registry, "people");
        let writer = MigrationWriter::new("people", "0002_unique_name").actions(actions);

        let index = |unique| SchemaOperation::CreateCompositeIndex {
            index_key: "by_name".to_string(),
            edge_key: None,
            element: ElementKind::Vertex,
            keys: vec!["person_name".to_string()],
            unique,
            indexer: None,
        };
        assert_eq!(
            writer.forwards_operations(),
            vec![SchemaOperation::delete_composite_index("by_name"), index(true)]
        );
        assert_eq!(
            writer.backwards_operations(),
            vec![SchemaOperation::delete_composite_index("by_name"), index(false)]
        );
    }

    #[test]
    fn test_render_code() {
        let (actions, _) = person_actions();
        let code = MigrationWriter::new("people", "0001_initial")
            .actions(actions)
            .render_code();

        assert!(code.starts_with("# people/0001_initial\n"));
        assert!(code.contains("        # Adding vertex 'people.Person'\n        db.create_vertex_type('person')\n"));
        let backwards = code.split("\nbackwards:\n").nth(1).unwrap();
        assert!(backwards.find("delete_composite_index") < backwards.find("delete_vertex_type"));

        let empty = MigrationWriter::new("people", "0002_empty").render_code();
        assert!(empty.contains("\nforwards:\n        # no operations\n"));
    }

    #[test]
    fn test_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let (actions, models) = person_actions();
        let writer = MigrationWriter::new("people", "0001_initial")
            .actions(actions)
            .models(models);

        let path = writer.write_to(dir.path(), false).unwrap();
        assert_eq!(path, dir.path().join("0001_initial.json"));
        assert!(matches!(
            writer.write_to(dir.path(), false),
            Err(MigrateError::MigrationExists(_))
        ));
        writer.write_to(dir.path(), true).unwrap();

        let pkg = PackageMigrations::load(dir.path(), "people").unwrap();
        let migration = pkg.get("0001_initial").unwrap();
        assert_eq!(migration.definition(), &writer.definition());
        assert_eq!(migration.depends_on().len(), 0);
        assert_eq!(
            migration.definition().summary[0],
            " + Added element type 'Person' for package 'people'"
        );
    }
}
