//! Frozen model snapshots.
//!
//! Every migration file carries a snapshot of the models as they were when
//! the migration was generated. The snapshot is plain data: each property is
//! stored as a `(type, db_field_name, kwargs)` triple where `type` is the
//! identifier of a [`PropertyType`](crate::schema::PropertyType). Thawing a
//! snapshot resolves the identifiers through a
//! [`PropertyTypeRegistry`](crate::registry::PropertyTypeRegistry).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MigrateError, Result};
use crate::registry::PropertyTypeRegistry;
use crate::schema::{
    build_schema, Cardinality, CompositeIndexSpec, ElementKind, PropertyDefault,
    PropertyDefinition, SchemaState, UniqueDirection,
};

/// Frozen models keyed by model reference.
pub type FrozenModels = IndexMap<String, FrozenModel>;

/// A frozen property: type identifier, database field name and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenProperty(pub String, pub String, #[serde(default)] pub IndexMap<String, Value>);

/// A frozen vertex or edge model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenModel {
    /// Element kind, `vertex` or `edge`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Vertex label or edge type.
    pub label: String,
    /// Properties keyed by attribute name.
    #[serde(default)]
    pub properties: IndexMap<String, FrozenProperty>,
    /// Composite indices keyed by index name.
    #[serde(default)]
    pub composite_indices: IndexMap<String, CompositeIndexSpec>,
}

impl FrozenModel {
    /// Freezes a schema.
    #[must_use]
    pub fn freeze(schema: &SchemaState) -> Self {
        let properties = schema
            .properties
            .iter()
            .map(|(name, prop)| (name.clone(), freeze_property(prop)))
            .collect();

        Self {
            kind: schema.kind.as_str().to_string(),
            label: schema.label.clone(),
            properties,
            composite_indices: schema.composite_indices.clone(),
        }
    }

    /// Rehydrates the snapshot into a schema state.
    pub fn thaw(&self, model_ref: &str, types: &PropertyTypeRegistry) -> Result<SchemaState> {
        let kind: ElementKind = self.kind.parse()?;

        let mut fields = Vec::with_capacity(self.properties.len());
        for (name, FrozenProperty(type_name, db_field_name, kwargs)) in &self.properties {
            let property_type = types.get(type_name)?.clone();
            let mut prop = PropertyDefinition::new(name.clone(), property_type);
            if db_field_name != name {
                prop = prop.db_field(db_field_name.clone());
            }
            fields.push(thaw_kwargs(prop, kwargs, model_ref)?);
        }

        let mut schema = build_schema(kind, model_ref, self.label.clone(), fields)?;
        schema.composite_indices = self.composite_indices.clone();
        Ok(schema)
    }
}

fn freeze_property(prop: &PropertyDefinition) -> FrozenProperty {
    let mut kwargs = IndexMap::new();
    if prop.required {
        kwargs.insert("required".to_string(), Value::Bool(true));
    }
    match &prop.default {
        Some(PropertyDefault::Value(value)) => {
            kwargs.insert("default".to_string(), value.clone());
        }
        Some(PropertyDefault::Factory(name)) => {
            kwargs.insert("default_factory".to_string(), Value::from(name.as_str()));
        }
        None => {}
    }
    if prop.index {
        kwargs.insert("index".to_string(), Value::Bool(true));
    }
    if let Some(ext) = &prop.index_ext {
        kwargs.insert("index_ext".to_string(), Value::from(ext.as_str()));
    }
    if let Some(unique) = prop.unique {
        kwargs.insert("unique".to_string(), Value::from(unique.as_str()));
    }
    if prop.cardinality != Cardinality::Single {
        // Serialization of a fieldless enum cannot fail.
        if let Ok(value) = serde_json::to_value(prop.cardinality) {
            kwargs.insert("cardinality".to_string(), value);
        }
    }
    for (key, value) in &prop.options {
        kwargs.insert(key.clone(), value.clone());
    }

    FrozenProperty(
        prop.property_type.name.to_string(),
        prop.db_field_name(),
        kwargs,
    )
}

fn thaw_kwargs(
    mut prop: PropertyDefinition,
    kwargs: &IndexMap<String, Value>,
    model_ref: &str,
) -> Result<PropertyDefinition> {
    let prop_name = prop.name.clone();
    let invalid = |key: &str, value: &Value| {
        MigrateError::Definition(format!(
            "{}.{}: invalid value {} for '{}'",
            model_ref, prop_name, value, key
        ))
    };

    let mut options = IndexMap::new();
    let mut required = false;
    let mut index = false;
    let mut default = None;
    let mut index_ext = None;
    let mut unique = None;
    let mut cardinality = Cardinality::Single;

    for (key, value) in kwargs {
        match key.as_str() {
            "required" => required = parse_flag(value).ok_or_else(|| invalid(key, value))?,
            "index" => index = parse_flag(value).ok_or_else(|| invalid(key, value))?,
            "default" => default = Some(PropertyDefault::Value(value.clone())),
            "default_factory" => {
                let name = value.as_str().ok_or_else(|| invalid(key, value))?;
                default = Some(PropertyDefault::Factory(name.to_string()));
            }
            "index_ext" => {
                let ext = value.as_str().ok_or_else(|| invalid(key, value))?;
                index_ext = Some(ext.to_string());
            }
            "unique" => {
                let direction: UniqueDirection =
                    serde_json::from_value(value.clone()).map_err(|_| invalid(key, value))?;
                unique = Some(direction);
            }
            "cardinality" => {
                cardinality =
                    serde_json::from_value(value.clone()).map_err(|_| invalid(key, value))?;
            }
            _ => {
                options.insert(key.clone(), value.clone());
            }
        }
    }

    prop.required = required;
    prop.index = index;
    prop.default = default;
    prop.index_ext = index_ext;
    prop.unique = unique;
    prop.cardinality = cardinality;
    prop.options = options;
    Ok(prop)
}

/// Accepts JSON booleans and the legacy `"True"`/`"False"` strings.
fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(s) => match s.as_str() {
            "True" | "true" => Some(true),
            "False" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PropertyType, UniqueDirection};
    use serde_json::json;

    fn person() -> SchemaState {
        build_schema(
            ElementKind::Vertex,
            "people.Person",
            "person",
            vec![
                PropertyDefinition::new("name", PropertyType::STRING)
                    .db_field("person_name")
                    .required()
                    .option("max_length", 512),
                PropertyDefinition::new("email", PropertyType::EMAIL)
                    .unique(UniqueDirection::Both)
                    .default_factory("empty_email"),
                PropertyDefinition::new("tags", PropertyType::LIST).cardinality(Cardinality::Set),
            ],
        )
        .unwrap()
        .with_composite_index("by_name", CompositeIndexSpec::new(["person_name"]))
    }

    #[test]
    fn test_freeze_format() {
        let frozen = FrozenModel::freeze(&person());
        let value = serde_json::to_value(&frozen).unwrap();

        assert_eq!(value["type"], "vertex");
        assert_eq!(value["label"], "person");
        assert_eq!(
            value["properties"]["name"],
            json!(["String", "person_name", {"required": true, "max_length": 512}])
        );
        assert_eq!(value["properties"]["tags"][2]["cardinality"], "SET");
        assert_eq!(
            value["composite_indices"]["by_name"],
            json!({"keys": ["person_name"]})
        );
    }

    #[test]
    fn test_thaw_preserves_definitions() {
        let original = person();
        let frozen = FrozenModel::freeze(&original);
        let thawed = frozen
            .thaw("people.Person", &PropertyTypeRegistry::with_builtins())
            .unwrap();

        assert_eq!(thawed.label, original.label);
        assert_eq!(thawed.composite_indices, original.composite_indices);
        for (name, prop) in &original.properties {
            assert_eq!(thawed.properties[name].definition(), prop.definition());
        }
    }

    #[test]
    fn test_thaw_legacy_flags() {
        let frozen: FrozenModel = serde_json::from_value(json!({
            "type": "vertex",
            "label": "person",
            "properties": {
                "name": ["String", "person_name", {"required": "True", "max_length": "512"}]
            },
            "composite_indices": {}
        }))
        .unwrap();

        let schema = frozen
            .thaw("models.Person", &PropertyTypeRegistry::with_builtins())
            .unwrap();
        let name = schema.get_property("name").unwrap();
        assert!(name.required);
        assert_eq!(name.db_field_name(), "person_name");
        assert_eq!(name.options["max_length"], "512");
    }

    #[test]
    fn test_thaw_invalid_kind() {
        let frozen = FrozenModel {
            kind: "hyperedge".to_string(),
            label: "x".to_string(),
            properties: IndexMap::new(),
            composite_indices: IndexMap::new(),
        };
        let result = frozen.thaw("a.X", &PropertyTypeRegistry::with_builtins());
        assert!(matches!(result, Err(MigrateError::Definition(_))));
    }

    #[test]
    fn test_thaw_unknown_type() {
        let frozen: FrozenModel = serde_json::from_value(json!({
            "type": "edge",
            "label": "knows",
            "properties": {"since": ["Timestamp", "since", {}]}
        }))
        .unwrap();
        let result = frozen.thaw("a.Knows", &PropertyTypeRegistry::with_builtins());
        assert!(matches!(result, Err(MigrateError::UnknownPropertyType(t)) if t == "Timestamp"));
    }
}
