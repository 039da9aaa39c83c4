//! Registries of live models and known property types.
//!
//! Both are plain values constructed once at startup and passed to the
//! components that need them.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{MigrateError, Result};
use crate::frozen::{FrozenModel, FrozenModels};
use crate::schema::{ElementKind, PropertyType, SchemaState};

/// Lookup of property types by their frozen identifier.
#[derive(Debug, Clone)]
pub struct PropertyTypeRegistry {
    types: HashMap<String, PropertyType>,
}

impl Default for PropertyTypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl PropertyTypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Creates a registry holding every builtin property type.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for property_type in PropertyType::BUILTIN {
            registry.register(property_type.clone());
        }
        registry
    }

    /// Registers a property type, replacing any previous one of the same name.
    pub fn register(&mut self, property_type: PropertyType) {
        self.types
            .insert(property_type.name.to_string(), property_type);
    }

    /// Resolves a property type by identifier.
    pub fn get(&self, name: &str) -> Result<&PropertyType> {
        self.types
            .get(name)
            .ok_or_else(|| MigrateError::UnknownPropertyType(name.to_string()))
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// The live models of an application, keyed by model reference.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, SchemaState>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model.
    pub fn register(&mut self, schema: SchemaState) -> Result<()> {
        if self.models.contains_key(&schema.model_ref) {
            return Err(MigrateError::Definition(format!(
                "model {} is already registered",
                schema.model_ref
            )));
        }
        if let Some(existing) = self.get_by_label(schema.kind, &schema.label) {
            return Err(MigrateError::Definition(format!(
                "{} label '{}' is used by both {} and {}",
                schema.kind, schema.label, existing.model_ref, schema.model_ref
            )));
        }
        self.models.insert(schema.model_ref.clone(), schema);
        Ok(())
    }

    /// Registers a model, builder style.
    pub fn with(mut self, schema: SchemaState) -> Result<Self> {
        self.register(schema)?;
        Ok(self)
    }

    /// Returns a model by reference.
    #[must_use]
    pub fn get(&self, model_ref: &str) -> Option<&SchemaState> {
        self.models.get(model_ref)
    }

    /// Returns a model by element kind and label.
    #[must_use]
    pub fn get_by_label(&self, kind: ElementKind, label: &str) -> Option<&SchemaState> {
        self.models
            .values()
            .find(|m| m.kind == kind && m.label == label)
    }

    /// Iterates over every registered model in registration order.
    pub fn models(&self) -> impl Iterator<Item = &SchemaState> {
        self.models.values()
    }

    /// Iterates over the models belonging to `package`.
    pub fn for_package<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a SchemaState> {
        self.models.values().filter(move |m| m.package() == package)
    }

    /// Freezes the models of `package` into the snapshot format.
    #[must_use]
    pub fn freeze(&self, package: &str) -> FrozenModels {
        self.for_package(package)
            .map(|m| (m.model_ref.clone(), FrozenModel::freeze(m)))
            .collect()
    }

    /// Rebuilds a registry from a frozen snapshot.
    pub fn from_frozen(frozen: &FrozenModels, types: &PropertyTypeRegistry) -> Result<Self> {
        let mut registry = Self::new();
        for (model_ref, model) in frozen {
            registry.register(model.thaw(model_ref, types)?)?;
        }
        Ok(registry)
    }

    /// Returns the number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if no models are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{build_schema, DataType, PropertyDefinition};

    fn person() -> SchemaState {
        build_schema(
            ElementKind::Vertex,
            "people.Person",
            "person",
            vec![PropertyDefinition::new("name", PropertyType::STRING)],
        )
        .unwrap()
    }

    #[test]
    fn test_builtin_types() {
        let registry = PropertyTypeRegistry::with_builtins();
        assert_eq!(registry.get("Email").unwrap().data_type, DataType::String);
        assert_eq!(registry.get("DateTime").unwrap().data_type, DataType::Double);
        assert!(matches!(
            registry.get("Nope"),
            Err(MigrateError::UnknownPropertyType(_))
        ));
    }

    #[test]
    fn test_custom_type() {
        let mut registry = PropertyTypeRegistry::empty();
        assert!(registry.is_empty());
        registry.register(PropertyType::custom("Point", DataType::GeoShape));
        assert_eq!(registry.get("Point").unwrap().data_type, DataType::GeoShape);
    }

    #[test]
    fn test_register_duplicate_model() {
        let mut registry = ModelRegistry::new();
        registry.register(person()).unwrap();
        assert!(matches!(
            registry.register(person()),
            Err(MigrateError::Definition(_))
        ));
    }

    #[test]
    fn test_for_package() {
        let registry = ModelRegistry::new().with(person()).unwrap();
        assert_eq!(registry.for_package("people").count(), 1);
        assert_eq!(registry.for_package("other").count(), 0);
        assert!(registry.get_by_label(ElementKind::Vertex, "person").is_some());
        assert!(registry.get_by_label(ElementKind::Edge, "person").is_none());
    }
}
