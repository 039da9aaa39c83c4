//! Schema representation types.
//!
//! These types describe vertex and edge models and their property keys. They
//! are used both for the live models an application registers and for the
//! frozen snapshots stored in migration files, so the diff engine can compare
//! the two without caring where a [`SchemaState`] came from.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MigrateError, Result};

/// Value types a property key can hold on the graph engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataType {
    /// Any serializable object.
    #[default]
    Object,
    /// Text.
    String,
    /// Single character.
    Character,
    /// Boolean.
    Boolean,
    /// 8-bit integer.
    Byte,
    /// 16-bit integer.
    Short,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// Fixed-point decimal.
    Decimal,
    /// High-precision fixed-point decimal.
    Precision,
    /// Date.
    Date,
    /// Geographic shape.
    GeoShape,
    /// Map of values.
    HashMap,
    /// List of values.
    ArrayList,
}

impl DataType {
    /// Returns the JVM class name used in `dataType(<Type>.class)`.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::String => "String",
            Self::Character => "Character",
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Precision => "Precision",
            Self::Date => "Date",
            Self::GeoShape => "Geoshape",
            Self::HashMap => "HashMap",
            Self::ArrayList => "ArrayList",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// How many values of a property key an element may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cardinality {
    /// At most one value.
    #[default]
    Single,
    /// Ordered values, duplicates allowed.
    List,
    /// Unordered values, no duplicates.
    Set,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Single => "SINGLE",
            Self::List => "LIST",
            Self::Set => "SET",
        };
        write!(f, "Cardinality.{}", name)
    }
}

/// Edge label multiplicity constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Multiplicity {
    /// Any number of edges between any pair of vertices.
    #[default]
    Multi,
    /// At most one edge of this label between a pair of vertices.
    Simple,
    /// At most one outgoing edge per vertex.
    Many2One,
    /// At most one incoming edge per vertex.
    One2Many,
    /// At most one incoming and one outgoing edge per vertex.
    One2One,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Multi => "MULTI",
            Self::Simple => "SIMPLE",
            Self::Many2One => "MANY2ONE",
            Self::One2Many => "ONE2MANY",
            Self::One2One => "ONE2ONE",
        };
        write!(f, "Multiplicity.{}", name)
    }
}

/// Time unit of a TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days.
    #[default]
    Days,
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Milliseconds => "MILLISECONDS",
            Self::Seconds => "SECONDS",
            Self::Minutes => "MINUTES",
            Self::Hours => "HOURS",
            Self::Days => "DAYS",
        };
        write!(f, "TimeUnit.{}", name)
    }
}

/// Time-to-live applied to a vertex or edge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ttl {
    /// Amount of `unit`.
    pub value: u64,
    /// Unit of `value`.
    #[serde(default)]
    pub unit: TimeUnit,
}

impl Ttl {
    /// Creates a TTL.
    #[must_use]
    pub const fn new(value: u64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self::new(1, TimeUnit::Days)
    }
}

/// Index lifecycle transitions accepted by `mgmt.updateIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaAction {
    /// Register the index with all instances.
    RegisterIndex,
    /// Rebuild the index from existing data.
    Reindex,
    /// Enable a registered index.
    EnableIndex,
    /// Disable an enabled index.
    DisableIndex,
    /// Remove a disabled index.
    RemoveIndex,
}

impl fmt::Display for SchemaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RegisterIndex => "REGISTER_INDEX",
            Self::Reindex => "REINDEX",
            Self::EnableIndex => "ENABLE_INDEX",
            Self::DisableIndex => "DISABLE_INDEX",
            Self::RemoveIndex => "REMOVE_INDEX",
        };
        write!(f, "SchemaAction.{}", name)
    }
}

/// The two element kinds of a property graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A vertex.
    Vertex,
    /// An edge.
    Edge,
}

impl ElementKind {
    /// Returns the lowercase kind name (`vertex` or `edge`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
        }
    }

    /// Returns the JVM element class name used by `buildIndex`.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Vertex => "Vertex",
            Self::Edge => "Edge",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vertex" => Ok(Self::Vertex),
            "edge" => Ok(Self::Edge),
            other => Err(MigrateError::Definition(format!(
                "{} is Not a Vertex or Edge",
                other
            ))),
        }
    }
}

/// Direction in which a property value must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniqueDirection {
    /// Unique among incoming edges.
    In,
    /// Unique among outgoing edges.
    Out,
    /// Unique in both directions.
    Both,
    /// Unique within a list cardinality.
    List,
}

impl UniqueDirection {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Both => "both",
            Self::List => "list",
        }
    }
}

/// A named property type and the graph data type it stores.
///
/// Frozen migration files refer to property types by `name`; see
/// [`PropertyTypeRegistry`](crate::registry::PropertyTypeRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyType {
    /// Stable identifier written to frozen models.
    pub name: Cow<'static, str>,
    /// Data type of the property key.
    pub data_type: DataType,
}

impl PropertyType {
    /// Free text.
    pub const STRING: Self = Self::builtin("String", DataType::String);
    /// An email address, stored as a string.
    pub const EMAIL: Self = Self::builtin("Email", DataType::String);
    /// A URL, stored as a string.
    pub const URL: Self = Self::builtin("URL", DataType::String);
    /// A URL slug, stored as a string.
    pub const SLUG: Self = Self::builtin("Slug", DataType::String);
    /// A UUID in its canonical string form.
    pub const UUID: Self = Self::builtin("UUID", DataType::String);
    /// An IPv4 address, stored as a string.
    pub const IPV4: Self = Self::builtin("IPV4", DataType::String);
    /// An IPv6 address, stored as a string.
    pub const IPV6: Self = Self::builtin("IPV6", DataType::String);
    /// An IPv6 address that may embed an IPv4 address.
    pub const IPV6_WITH_V4: Self = Self::builtin("IPV6WithV4", DataType::String);
    /// A 16-bit integer.
    pub const SHORT: Self = Self::builtin("Short", DataType::Short);
    /// A 32-bit integer.
    pub const INTEGER: Self = Self::builtin("Integer", DataType::Integer);
    /// A 32-bit integer that must not be negative.
    pub const POSITIVE_INTEGER: Self = Self::builtin("PositiveInteger", DataType::Integer);
    /// A 64-bit integer.
    pub const LONG: Self = Self::builtin("Long", DataType::Long);
    /// A 64-bit integer that must not be negative.
    pub const POSITIVE_LONG: Self = Self::builtin("PositiveLong", DataType::Long);
    /// A boolean.
    pub const BOOLEAN: Self = Self::builtin("Boolean", DataType::Boolean);
    /// A 32-bit float.
    pub const FLOAT: Self = Self::builtin("Float", DataType::Float);
    /// A 64-bit float.
    pub const DOUBLE: Self = Self::builtin("Double", DataType::Double);
    /// A decimal number.
    pub const DECIMAL: Self = Self::builtin("Decimal", DataType::Decimal);
    /// A timezone-aware timestamp, stored as epoch seconds.
    pub const DATETIME: Self = Self::builtin("DateTime", DataType::Double);
    /// A timestamp without timezone, stored as epoch seconds.
    pub const DATETIME_NAIVE: Self = Self::builtin("DateTimeNaive", DataType::Double);
    /// A string-keyed map.
    pub const DICTIONARY: Self = Self::builtin("Dictionary", DataType::HashMap);
    /// An ordered list of values.
    pub const LIST: Self = Self::builtin("List", DataType::ArrayList);

    /// Every property type shipped with the crate.
    pub const BUILTIN: &'static [Self] = &[
        Self::STRING,
        Self::EMAIL,
        Self::URL,
        Self::SLUG,
        Self::UUID,
        Self::IPV4,
        Self::IPV6,
        Self::IPV6_WITH_V4,
        Self::SHORT,
        Self::INTEGER,
        Self::POSITIVE_INTEGER,
        Self::LONG,
        Self::POSITIVE_LONG,
        Self::BOOLEAN,
        Self::FLOAT,
        Self::DOUBLE,
        Self::DECIMAL,
        Self::DATETIME,
        Self::DATETIME_NAIVE,
        Self::DICTIONARY,
        Self::LIST,
    ];

    const fn builtin(name: &'static str, data_type: DataType) -> Self {
        Self {
            name: Cow::Borrowed(name),
            data_type,
        }
    }

    /// Creates an application-defined property type.
    #[must_use]
    pub fn custom(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            data_type,
        }
    }
}

/// Default value of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyDefault {
    /// A literal value.
    Value(Value),
    /// A named factory evaluated by the application (e.g. `now`).
    Factory(String),
}

/// A property definition serialized as a flat key/value map.
///
/// This is what the diff engine compares at the property level.
pub type Definition = IndexMap<String, Value>;

static NEXT_POSITION: AtomicU64 = AtomicU64::new(0);

fn next_position() -> u64 {
    NEXT_POSITION.fetch_add(1, Ordering::Relaxed)
}

/// Declaration of a single property on a vertex or edge model.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// Attribute name on the model.
    pub name: String,
    /// Explicit database field name, if it differs from `name`.
    pub db_field: Option<String>,
    /// Prefix prepended to the database field name.
    pub db_field_prefix: String,
    /// Property type.
    pub property_type: PropertyType,
    /// Whether a value is required.
    pub required: bool,
    /// Default value.
    pub default: Option<PropertyDefault>,
    /// Whether the property key is indexed.
    pub index: bool,
    /// External index backend name.
    pub index_ext: Option<String>,
    /// Uniqueness constraint.
    pub unique: Option<UniqueDirection>,
    /// Value cardinality.
    pub cardinality: Cardinality,
    /// Type-specific options such as `max_length`.
    pub options: IndexMap<String, Value>,
    /// Declaration order across the process.
    pub position: u64,
}

impl PropertyDefinition {
    /// Creates a property definition with the next declaration position.
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            db_field: None,
            db_field_prefix: String::new(),
            property_type,
            required: false,
            default: None,
            index: false,
            index_ext: None,
            unique: None,
            cardinality: Cardinality::Single,
            options: IndexMap::new(),
            position: next_position(),
        }
    }

    /// Sets the database field name.
    #[must_use]
    pub fn db_field(mut self, db_field: impl Into<String>) -> Self {
        self.db_field = Some(db_field.into());
        self
    }

    /// Sets the database field prefix.
    #[must_use]
    pub fn db_field_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.db_field_prefix = prefix.into();
        self
    }

    /// Marks the property as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets a literal default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(PropertyDefault::Value(value.into()));
        self
    }

    /// Sets a named default factory.
    #[must_use]
    pub fn default_factory(mut self, factory: impl Into<String>) -> Self {
        self.default = Some(PropertyDefault::Factory(factory.into()));
        self
    }

    /// Marks the property key as indexed.
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }

    /// Sets the external index backend.
    #[must_use]
    pub fn index_ext(mut self, backend: impl Into<String>) -> Self {
        self.index_ext = Some(backend.into());
        self
    }

    /// Sets the uniqueness constraint.
    #[must_use]
    pub fn unique(mut self, direction: UniqueDirection) -> Self {
        self.unique = Some(direction);
        self
    }

    /// Sets the cardinality.
    #[must_use]
    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Sets a type-specific option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Overrides the declaration position.
    #[must_use]
    pub fn position(mut self, position: u64) -> Self {
        self.position = position;
        self
    }

    /// Returns the name of the property key on the graph engine.
    #[must_use]
    pub fn db_field_name(&self) -> String {
        let field = self.db_field.as_deref().unwrap_or(&self.name);
        format!("{}{}", self.db_field_prefix, field)
    }

    /// Returns the data type of the property key.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.property_type.data_type
    }

    /// Returns true if a default value or factory is set.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Serializes the definition into a flat map for diffing.
    #[must_use]
    pub fn definition(&self) -> Definition {
        let mut def = Definition::new();
        def.insert("type".into(), Value::from(self.property_type.name.as_ref()));
        def.insert("db_field_name".into(), Value::from(self.db_field_name()));
        def.insert(
            "data_type".into(),
            Value::from(self.data_type().class_name()),
        );
        def.insert(
            "cardinality".into(),
            Value::from(self.cardinality.to_string()),
        );
        def.insert("required".into(), Value::Bool(self.required));
        let default = match &self.default {
            Some(PropertyDefault::Value(value)) => value.clone(),
            Some(PropertyDefault::Factory(name)) => Value::from(format!("<{}>", name)),
            None => Value::Null,
        };
        def.insert("default".into(), default);
        def.insert("index".into(), Value::Bool(self.index));
        def.insert(
            "index_ext".into(),
            self.index_ext.clone().map_or(Value::Null, Value::from),
        );
        def.insert(
            "unique".into(),
            self.unique.map_or(Value::Null, |u| Value::from(u.as_str())),
        );
        for (key, value) in &self.options {
            def.insert(key.clone(), value.clone());
        }
        def
    }
}

/// A composite index over one or more property keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeIndexSpec {
    /// Property keys covered by the index, in order.
    pub keys: Vec<String>,
    /// Whether the indexed combination must be unique.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    /// Mixed-index backend; `None` builds a composite index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexer: Option<String>,
}

impl CompositeIndexSpec {
    /// Creates an index spec over `keys`.
    #[must_use]
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            unique: false,
            indexer: None,
        }
    }

    /// Makes the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Builds a mixed index on the named backend.
    #[must_use]
    pub fn indexer(mut self, indexer: impl Into<String>) -> Self {
        self.indexer = Some(indexer.into());
        self
    }
}

/// The schema of one vertex or edge model.
///
/// Either built from live model code with [`build_schema`] or rehydrated
/// from a frozen migration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaState {
    /// Element kind.
    pub kind: ElementKind,
    /// Qualified model reference, `<package>.<Class>`.
    pub model_ref: String,
    /// Vertex label or edge type.
    pub label: String,
    /// Properties keyed by attribute name, in declaration order.
    pub properties: IndexMap<String, PropertyDefinition>,
    /// Composite indices keyed by index name.
    pub composite_indices: IndexMap<String, CompositeIndexSpec>,
}

impl SchemaState {
    /// Returns the class name (the last segment of the model reference).
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.model_ref
            .rsplit_once('.')
            .map_or(self.model_ref.as_str(), |(_, class)| class)
    }

    /// Returns the package part of the model reference.
    #[must_use]
    pub fn package(&self) -> &str {
        self.model_ref
            .rsplit_once('.')
            .map_or("", |(package, _)| package)
    }

    /// Returns a property by attribute name.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get(name)
    }

    /// Returns a property by database field name.
    #[must_use]
    pub fn get_property_by_db_field(&self, db_field_name: &str) -> Option<&PropertyDefinition> {
        self.properties
            .values()
            .find(|p| p.db_field_name() == db_field_name)
    }

    /// Adds a composite index.
    #[must_use]
    pub fn with_composite_index(mut self, name: impl Into<String>, spec: CompositeIndexSpec) -> Self {
        self.composite_indices.insert(name.into(), spec);
        self
    }
}

/// Builds a schema from an ordered list of property declarations.
///
/// Properties are ordered by their declaration position. Two properties
/// mapping to the same database field name are rejected.
pub fn build_schema(
    kind: ElementKind,
    model_ref: impl Into<String>,
    label: impl Into<String>,
    mut fields: Vec<PropertyDefinition>,
) -> Result<SchemaState> {
    let model_ref = model_ref.into();
    fields.sort_by_key(|f| f.position);

    let mut seen = HashSet::new();
    let mut properties = IndexMap::with_capacity(fields.len());
    for field in fields {
        let db_field_name = field.db_field_name();
        if !seen.insert(db_field_name.clone()) {
            return Err(MigrateError::Definition(format!(
                "{} has more than one property mapped to db field '{}'",
                model_ref, db_field_name
            )));
        }
        if properties.contains_key(&field.name) {
            return Err(MigrateError::Definition(format!(
                "{} declares property '{}' twice",
                model_ref, field.name
            )));
        }
        properties.insert(field.name.clone(), field);
    }

    Ok(SchemaState {
        kind,
        model_ref,
        label: label.into(),
        properties,
        composite_indices: IndexMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_field_name() {
        let plain = PropertyDefinition::new("name", PropertyType::STRING);
        assert_eq!(plain.db_field_name(), "name");

        let mapped = PropertyDefinition::new("name", PropertyType::STRING)
            .db_field("person_name")
            .db_field_prefix("x_");
        assert_eq!(mapped.db_field_name(), "x_person_name");
    }

    #[test]
    fn test_positions_are_monotonic() {
        let first = PropertyDefinition::new("a", PropertyType::STRING);
        let second = PropertyDefinition::new("b", PropertyType::STRING);
        assert!(second.position > first.position);
    }

    #[test]
    fn test_build_schema_orders_by_position() {
        let a = PropertyDefinition::new("a", PropertyType::STRING);
        let b = PropertyDefinition::new("b", PropertyType::INTEGER);
        let schema = build_schema(ElementKind::Vertex, "people.Person", "person", vec![b, a])
            .unwrap();

        let names: Vec<_> = schema.properties.keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(schema.class_name(), "Person");
        assert_eq!(schema.package(), "people");
    }

    #[test]
    fn test_build_schema_rejects_duplicate_db_field() {
        let a = PropertyDefinition::new("a", PropertyType::STRING).db_field("shared");
        let b = PropertyDefinition::new("b", PropertyType::STRING).db_field("shared");
        let result = build_schema(ElementKind::Vertex, "people.Person", "person", vec![a, b]);
        assert!(matches!(result, Err(MigrateError::Definition(_))));
    }

    #[test]
    fn test_element_kind_from_str() {
        assert_eq!("vertex".parse::<ElementKind>().unwrap(), ElementKind::Vertex);
        assert_eq!("edge".parse::<ElementKind>().unwrap(), ElementKind::Edge);

        let err = "relationship".parse::<ElementKind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Definition error: relationship is Not a Vertex or Edge"
        );
    }

    #[test]
    fn test_definition_contents() {
        let prop = PropertyDefinition::new("email", PropertyType::EMAIL)
            .required()
            .option("max_length", 255);
        let def = prop.definition();

        assert_eq!(def["type"], "Email");
        assert_eq!(def["data_type"], "String");
        assert_eq!(def["required"], true);
        assert_eq!(def["default"], Value::Null);
        assert_eq!(def["max_length"], 255);
        assert_eq!(def["cardinality"], "Cardinality.SINGLE");
    }

    #[test]
    fn test_enum_rendering() {
        assert_eq!(TimeUnit::Hours.to_string(), "TimeUnit.HOURS");
        assert_eq!(Multiplicity::One2Many.to_string(), "Multiplicity.ONE2MANY");
        assert_eq!(Cardinality::Set.to_string(), "Cardinality.SET");
        assert_eq!(
            SchemaAction::EnableIndex.to_string(),
            "SchemaAction.ENABLE_INDEX"
        );
        assert_eq!(DataType::HashMap.class_name(), "HashMap");
        assert_eq!(Ttl::default(), Ttl::new(1, TimeUnit::Days));
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(
            serde_json::to_string(&Multiplicity::Many2One).unwrap(),
            "\"MANY2ONE\""
        );
        assert_eq!(
            serde_json::to_string(&SchemaAction::RegisterIndex).unwrap(),
            "\"REGISTER_INDEX\""
        );
        assert_eq!(serde_json::to_string(&ElementKind::Edge).unwrap(), "\"edge\"");
    }
}
