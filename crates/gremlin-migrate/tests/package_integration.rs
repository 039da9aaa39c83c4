//! Integration tests for migration packages.
//!
//! These tests load the `people` fixture package from disk, replay its
//! migrations through the script builder, diff its frozen models, and
//! write a follow-up migration next to copies of the fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use gremlin_migrate::prelude::*;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/people")
}

fn load_people(policy: DependencyPolicy) -> gremlin_migrate::error::Result<PackageMigrations> {
    let mut package = PackageMigrations::load(&fixtures(), "people")?;
    package.resolve_dependencies(policy)?;
    package.regenerate_models(&PropertyTypeRegistry::with_builtins())?;
    Ok(package)
}

// =============================================================================
// Discovery and dependency graph
// =============================================================================

#[test]
fn test_load_skips_non_migration_files() {
    let package = load_people(DependencyPolicy::Warn).unwrap();
    let names: Vec<&str> = package.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["0001_initial", "0002_add_phone"]);
    assert_eq!(package.get_latest(false).unwrap().name(), "0002_add_phone");
    assert_eq!(package.get_latest(true).unwrap().name(), "0001_initial");
    assert_eq!(package.next_number(), 3);
}

#[test]
fn test_foreign_dependency_is_dropped() {
    let package = load_people(DependencyPolicy::Warn).unwrap();
    let latest = package.get("0002_add_phone").unwrap();
    assert_eq!(latest.depends_on().len(), 2);
    assert_eq!(
        latest.dependencies().iter().collect::<Vec<_>>(),
        vec!["0001_initial"]
    );
    assert!(package
        .get("0001_initial")
        .unwrap()
        .dependents()
        .contains("0002_add_phone"));
}

#[test]
fn test_foreign_dependency_fails_under_error_policy() {
    let result = load_people(DependencyPolicy::Error);
    assert!(matches!(
        result,
        Err(MigrateError::UnsupportedDependency { .. })
    ));
}

#[test]
fn test_missing_directory() {
    let result = PackageMigrations::load(Path::new("does/not/exist"), "people");
    assert!(matches!(result, Err(MigrateError::MigrationsDirNotFound(_))));
}

#[test]
fn test_invalid_migration_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("0001_broken.json"), "{ \"forwards\": 3 }").unwrap();
    let result = PackageMigrations::load(dir.path(), "people");
    assert!(matches!(result, Err(MigrateError::ParseError { .. })));
}

// =============================================================================
// Frozen models
// =============================================================================

#[test]
fn test_models_are_rehydrated() {
    let package = load_people(DependencyPolicy::Warn).unwrap();
    let initial = package.get("0001_initial").unwrap();

    let person = initial.get_model_by_ref("people.Person").unwrap();
    assert_eq!(person.kind, ElementKind::Vertex);
    assert!(person.properties["name"].required);
    assert!(person.properties["email"].index);
    assert_eq!(person.properties["email"].db_field_name(), "person_email");
    assert!(person.composite_indices["by_email"].unique);

    let knows = initial.get_model_by_label(ElementKind::Edge, "knows").unwrap();
    assert_eq!(knows.properties["since"].data_type(), DataType::Double);
}

#[test]
fn test_diff_between_migrations() {
    let package = load_people(DependencyPolicy::Warn).unwrap();
    let previous = package.get("0001_initial").unwrap();
    let current = package.get("0002_add_phone").unwrap();

    let mut registry = ModelRegistry::new();
    for model in current.models().values() {
        registry.register(model.clone()).unwrap();
    }

    let actions = Autodetector::new().plan(previous.models(), &registry, "people");
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].kind(), ActionKind::AddProperty);
    assert_eq!(
        actions[0].console_line(),
        " + Added element property 'phone' to 'Person' for package 'people'"
    );
    assert_eq!(
        actions[0].forwards(),
        &current.definition().forwards[0]
    );
}

// =============================================================================
// Scripts
// =============================================================================

#[test]
fn test_forwards_script() {
    let package = load_people(DependencyPolicy::Warn).unwrap();
    let initial = package.get("0001").unwrap();

    let mut db = ScriptBuilder::new("people");
    initial.forwards(&mut db).unwrap();
    let script = db.generate_script();

    assert!(script.starts_with("try {\n    mgmt = g.getManagementSystem();"));
    assert!(script.contains("    people_person = mgmt.makeVertexLabel(\"person\").make()\n"));
    assert!(script.contains(
        "    people_knows = mgmt.makeEdgeLabel(\"knows\").multiplicity(Multiplicity.SIMPLE).make()\n"
    ));
    assert!(script.contains(
        "    people_by_email = mgmt.buildIndex(\"people_by_email\", Vertex.class)\
         .addKey(mgmt.getPropertyKey(\"person_email\")).unique().buildCompositeIndex()\n"
    ));
    assert_eq!(script.matches("mgmt.commit()").count(), 1);
    assert_eq!(script.matches("mgmt.rollback()").count(), 1);
}

#[test]
fn test_derived_backwards_script() {
    let package = load_people(DependencyPolicy::Warn).unwrap();
    let latest = package.get("0002_add_phone").unwrap();

    let mut db = ScriptBuilder::new("people");
    latest.backwards(&mut db).unwrap();
    assert_eq!(
        db.cached_commands(),
        &[
            "people_person_phone = mgmt.getPropertyKey(\"person_phone\")".to_string(),
            "people_person_phone.remove()".to_string(),
        ]
    );
}

#[test]
fn test_run_to_file() {
    let package = load_people(DependencyPolicy::Warn).unwrap();
    let migration = package.get("0002_add_phone").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("0002_add_phone.groovy");

    let mut db = ScriptBuilder::new("people");
    let outcome = MigrationRunner::new(migration, RunTarget::File(Some(output.clone())))
        .execute(&mut db, Direction::Forwards)
        .unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), outcome.script);
    assert!(outcome.script.contains("mgmt.makePropertyKey(\"person_phone\")"));
}

#[test]
fn test_run_against_unconfigured_graph() {
    let package = load_people(DependencyPolicy::Warn).unwrap();
    let migration = package.get("0002_add_phone").unwrap();

    let mut db = ScriptBuilder::new("people");
    let result = MigrationRunner::new(migration, RunTarget::Graph(&UnconfiguredExecutor))
        .execute(&mut db, Direction::Forwards);
    assert!(matches!(result, Err(MigrateError::Execution(_))));
}

// =============================================================================
// Writing a follow-up migration
// =============================================================================

#[test]
fn test_make_next_migration() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["0001_initial.json", "0002_add_phone.json"] {
        fs::copy(fixtures().join(name), dir.path().join(name)).unwrap();
    }

    let types = PropertyTypeRegistry::with_builtins();
    let mut package = PackageMigrations::load(dir.path(), "people").unwrap();
    package.resolve_dependencies(DependencyPolicy::Warn).unwrap();
    package.regenerate_models(&types).unwrap();
    let latest = package.get_latest(false).unwrap();

    let pet = build_schema(
        ElementKind::Vertex,
        "people.Pet",
        "pet",
        vec![PropertyDefinition::new("species", PropertyType::STRING).db_field("pet_species")],
    )
    .unwrap();
    let mut registry = ModelRegistry::new();
    for model in latest.models().values() {
        registry.register(model.clone()).unwrap();
    }
    registry.register(pet).unwrap();

    let actions = Autodetector::new().plan(latest.models(), &registry, "people");
    let name = generate_migration_name(package.next_number(), "add pet");
    let path = MigrationWriter::new("people", &name)
        .depends_on(latest.name())
        .actions(actions)
        .models(registry.freeze("people"))
        .write_to(dir.path(), false)
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "0003_add_pet.json");

    let mut reloaded = PackageMigrations::load(dir.path(), "people").unwrap();
    reloaded.resolve_dependencies(DependencyPolicy::Warn).unwrap();
    reloaded.regenerate_models(&types).unwrap();

    let newest = reloaded.get_latest(false).unwrap();
    assert_eq!(newest.name(), "0003_add_pet");
    assert!(newest.dependencies().contains("0002_add_phone"));
    assert!(newest.get_model_by_label(ElementKind::Vertex, "pet").is_some());

    let mut db = ScriptBuilder::new("people");
    newest.backwards(&mut db).unwrap();
    assert_eq!(
        db.cached_commands(),
        &[
            "people_pet_species = mgmt.getPropertyKey(\"pet_species\")".to_string(),
            "people_pet_species.remove()".to_string(),
            "people_pet = mgmt.getVertexLabel(\"pet\")".to_string(),
            "people_pet.remove()".to_string(),
        ]
    );
}
