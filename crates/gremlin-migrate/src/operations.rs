//! Schema operations.
//!
//! A migration is a list of these operations. Each one maps onto a single
//! [`ScriptBuilder`] primitive, renders as the `db.*` call shown in migration
//! previews, and knows its reverse where one can be derived.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::builder::ScriptBuilder;
use crate::error::Result;
use crate::schema::{Cardinality, DataType, ElementKind, Multiplicity, SchemaAction, Ttl};

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single schema operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SchemaOperation {
    /// Create a vertex label.
    CreateVertexType {
        /// Vertex label.
        label: String,
        /// Optional time-to-live.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ttl: Option<Ttl>,
    },

    /// Create an edge label.
    CreateEdgeType {
        /// Edge label.
        label: String,
        /// Multiplicity constraint.
        #[serde(default)]
        multiplicity: Multiplicity,
        /// Whether the edge is only traversable out of its source.
        #[serde(default, skip_serializing_if = "is_false")]
        unidirected: bool,
        /// Optional time-to-live.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ttl: Option<Ttl>,
    },

    /// Create a property key.
    CreatePropertyKey {
        /// Property key name (the database field name).
        name: String,
        /// Value type.
        #[serde(default)]
        data_type: DataType,
        /// Value cardinality.
        #[serde(default)]
        cardinality: Cardinality,
    },

    /// Build a composite (or mixed) graph index.
    CreateCompositeIndex {
        /// Index key.
        index_key: String,
        /// Edge key for vertex-centric indices.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        edge_key: Option<String>,
        /// Indexed element kind.
        element: ElementKind,
        /// Property keys covered by the index.
        keys: Vec<String>,
        /// Whether the indexed combination must be unique.
        #[serde(default, skip_serializing_if = "is_false")]
        unique: bool,
        /// Mixed-index backend.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        indexer: Option<String>,
    },

    /// Remove a vertex label.
    DeleteVertexType {
        /// Vertex label.
        label: String,
    },

    /// Remove an edge label.
    DeleteEdgeType {
        /// Edge label.
        label: String,
    },

    /// Remove a property key.
    DeletePropertyKey {
        /// Property key name.
        name: String,
    },

    /// Remove a graph index.
    DeleteCompositeIndex {
        /// Index key.
        index_key: String,
        /// Edge key for vertex-centric indices.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        edge_key: Option<String>,
    },

    /// Move a graph index through its lifecycle.
    UpdateIndex {
        /// Index key.
        index_key: String,
        /// Lifecycle action.
        action: SchemaAction,
    },

    /// Repair a graph index from the storage backend.
    RepairIndex {
        /// Index key.
        index_key: String,
        /// Edge key for vertex-centric indices.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        edge_key: Option<String>,
    },

    /// Run raw Groovy statements inside the management transaction.
    RunScript {
        /// Forward statements.
        forward: String,
        /// Statements undoing `forward`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        backward: Option<String>,
    },
}

impl SchemaOperation {
    /// Creates a CreateVertexType operation.
    #[must_use]
    pub fn create_vertex_type(label: impl Into<String>) -> Self {
        Self::CreateVertexType {
            label: label.into(),
            ttl: None,
        }
    }

    /// Creates a CreateEdgeType operation with the default multiplicity.
    #[must_use]
    pub fn create_edge_type(label: impl Into<String>) -> Self {
        Self::CreateEdgeType {
            label: label.into(),
            multiplicity: Multiplicity::Multi,
            unidirected: false,
            ttl: None,
        }
    }

    /// Creates a CreatePropertyKey operation with single cardinality.
    #[must_use]
    pub fn create_property_key(name: impl Into<String>, data_type: DataType) -> Self {
        Self::CreatePropertyKey {
            name: name.into(),
            data_type,
            cardinality: Cardinality::Single,
        }
    }

    /// Creates a DeleteVertexType operation.
    #[must_use]
    pub fn delete_vertex_type(label: impl Into<String>) -> Self {
        Self::DeleteVertexType {
            label: label.into(),
        }
    }

    /// Creates a DeleteEdgeType operation.
    #[must_use]
    pub fn delete_edge_type(label: impl Into<String>) -> Self {
        Self::DeleteEdgeType {
            label: label.into(),
        }
    }

    /// Creates a DeletePropertyKey operation.
    #[must_use]
    pub fn delete_property_key(name: impl Into<String>) -> Self {
        Self::DeletePropertyKey { name: name.into() }
    }

    /// Creates a DeleteCompositeIndex operation.
    #[must_use]
    pub fn delete_composite_index(index_key: impl Into<String>) -> Self {
        Self::DeleteCompositeIndex {
            index_key: index_key.into(),
            edge_key: None,
        }
    }

    /// Creates a RunScript operation.
    #[must_use]
    pub fn run_script(forward: impl Into<String>, backward: Option<String>) -> Self {
        Self::RunScript {
            forward: forward.into(),
            backward,
        }
    }

    /// Feeds this operation into a script builder.
    pub fn apply(&self, db: &mut ScriptBuilder) -> Result<()> {
        match self {
            Self::CreateVertexType { label, ttl } => db.create_vertex_type(label, *ttl),
            Self::CreateEdgeType {
                label,
                multiplicity,
                unidirected,
                ttl,
            } => db.create_edge_type(label, *multiplicity, *unidirected, *ttl),
            Self::CreatePropertyKey {
                name,
                data_type,
                cardinality,
            } => db.create_property_key(name, *data_type, *cardinality),
            Self::CreateCompositeIndex {
                index_key,
                edge_key,
                element,
                keys,
                unique,
                indexer,
            } => db.create_composite_index(
                index_key,
                edge_key.as_deref(),
                *element,
                keys,
                *unique,
                indexer.as_deref(),
            ),
            Self::DeleteVertexType { label } => db.delete_vertex_type(label),
            Self::DeleteEdgeType { label } => db.delete_edge_type(label),
            Self::DeletePropertyKey { name } => db.delete_property_key(name),
            Self::DeleteCompositeIndex {
                index_key,
                edge_key,
            } => db.delete_composite_index(index_key, edge_key.as_deref()),
            Self::UpdateIndex { index_key, action } => db.update_index(index_key, *action),
            Self::RepairIndex {
                index_key,
                edge_key,
            } => return db.repair_index(index_key, edge_key.as_deref()),
            Self::RunScript { forward, .. } => db.run_script(forward),
        }
        Ok(())
    }

    /// Returns the reverse operation for rollback.
    ///
    /// Returns `None` if the operation is not reversible.
    #[must_use]
    pub fn reverse(&self) -> Option<Self> {
        match self {
            Self::CreateVertexType { label, .. } => Some(Self::delete_vertex_type(label.clone())),
            Self::CreateEdgeType { label, .. } => Some(Self::delete_edge_type(label.clone())),
            Self::CreatePropertyKey { name, .. } => Some(Self::delete_property_key(name.clone())),
            Self::CreateCompositeIndex {
                index_key,
                edge_key,
                ..
            } => Some(Self::DeleteCompositeIndex {
                index_key: index_key.clone(),
                edge_key: edge_key.clone(),
            }),

            Self::DeleteVertexType { .. } => {
                // A label cannot be recreated without its TTL
                None
            }

            Self::DeleteEdgeType { .. } => {
                // Multiplicity and direction are lost
                None
            }

            Self::DeletePropertyKey { .. } => {
                // Data type and cardinality are lost
                None
            }

            Self::DeleteCompositeIndex { .. } => {
                // Covered keys are lost
                None
            }

            Self::UpdateIndex { index_key, action } => {
                let inverse = match action {
                    SchemaAction::EnableIndex => SchemaAction::DisableIndex,
                    SchemaAction::DisableIndex => SchemaAction::EnableIndex,
                    _ => return None,
                };
                Some(Self::UpdateIndex {
                    index_key: index_key.clone(),
                    action: inverse,
                })
            }

            Self::RepairIndex { .. } => None,

            Self::RunScript { forward, backward } => backward.as_ref().map(|bwd| Self::RunScript {
                forward: bwd.clone(),
                backward: Some(forward.clone()),
            }),
        }
    }

    /// Returns true if this operation can be reversed.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.reverse().is_some()
    }

    /// Returns a human-readable description of this operation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateVertexType { label, .. } => format!("Create vertex label '{}'", label),
            Self::CreateEdgeType { label, .. } => format!("Create edge label '{}'", label),
            Self::CreatePropertyKey { name, data_type, .. } => {
                format!("Create property key '{}' of type {}", name, data_type)
            }
            Self::CreateCompositeIndex {
                index_key, keys, ..
            } => format!("Create index '{}' over {}", index_key, keys.join(", ")),
            Self::DeleteVertexType { label } => format!("Remove vertex label '{}'", label),
            Self::DeleteEdgeType { label } => format!("Remove edge label '{}'", label),
            Self::DeletePropertyKey { name } => format!("Remove property key '{}'", name),
            Self::DeleteCompositeIndex { index_key, .. } => {
                format!("Remove index '{}'", index_key)
            }
            Self::UpdateIndex { index_key, action } => {
                format!("Update index '{}' with {}", index_key, action)
            }
            Self::RepairIndex { index_key, .. } => format!("Repair index '{}'", index_key),
            Self::RunScript { .. } => "Run custom script".to_string(),
        }
    }
}

fn fmt_ttl(f: &mut fmt::Formatter<'_>, ttl: Option<&Ttl>) -> fmt::Result {
    match ttl {
        Some(ttl) => write!(
            f,
            ", set_ttl=True, ttl_time_value={}, ttl_time_unit={}",
            ttl.value, ttl.unit
        ),
        None => Ok(()),
    }
}

/// Renders the `db.*` call of the operation, as shown in migration code.
impl fmt::Display for SchemaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateVertexType { label, ttl } => {
                write!(f, "db.create_vertex_type('{}'", label)?;
                fmt_ttl(f, ttl.as_ref())?;
                f.write_str(")")
            }
            Self::CreateEdgeType {
                label,
                multiplicity,
                unidirected,
                ttl,
            } => {
                write!(f, "db.create_edge_type('{}'", label)?;
                if *multiplicity != Multiplicity::Multi {
                    write!(f, ", multiplicity={}", multiplicity)?;
                }
                if *unidirected {
                    f.write_str(", unidirected=True")?;
                }
                fmt_ttl(f, ttl.as_ref())?;
                f.write_str(")")
            }
            Self::CreatePropertyKey {
                name,
                data_type,
                cardinality,
            } => {
                write!(f, "db.create_property_key(\"{}\", data_type=\"{}\"", name, data_type)?;
                if *cardinality != Cardinality::Single {
                    write!(f, ", cardinality={}", cardinality)?;
                }
                f.write_str(")")
            }
            Self::CreateCompositeIndex {
                index_key,
                edge_key,
                element,
                keys,
                unique,
                indexer,
            } => {
                let keys: Vec<String> = keys.iter().map(|k| format!("\"{}\"", k)).collect();
                write!(
                    f,
                    "db.create_composite_index(\"{}\", \"{}\", keys=[{}]",
                    index_key,
                    element,
                    keys.join(", ")
                )?;
                if let Some(edge_key) = edge_key {
                    write!(f, ", edge_key=\"{}\"", edge_key)?;
                }
                if *unique {
                    f.write_str(", unique=True")?;
                }
                if let Some(indexer) = indexer {
                    write!(f, ", indexer=\"{}\"", indexer)?;
                }
                f.write_str(")")
            }
            Self::DeleteVertexType { label } => write!(f, "db.delete_vertex_type('{}')", label),
            Self::DeleteEdgeType { label } => write!(f, "db.delete_edge_type('{}')", label),
            Self::DeletePropertyKey { name } => write!(f, "db.delete_property_key(\"{}\")", name),
            Self::DeleteCompositeIndex {
                index_key,
                edge_key,
            } => match edge_key {
                Some(edge_key) => write!(
                    f,
                    "db.delete_composite_index(\"{}\", \"{}\")",
                    index_key, edge_key
                ),
                None => write!(f, "db.delete_composite_index(\"{}\")", index_key),
            },
            Self::UpdateIndex { index_key, action } => {
                write!(f, "db.update_index(\"{}\", {})", index_key, action)
            }
            Self::RepairIndex {
                index_key,
                edge_key,
            } => match edge_key {
                Some(edge_key) => write!(f, "db.repair_index(\"{}\", \"{}\")", index_key, edge_key),
                None => write!(f, "db.repair_index(\"{}\")", index_key),
            },
            Self::RunScript { forward, .. } => write!(f, "db.run_script({:?})", forward),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TimeUnit;

    #[test]
    fn test_create_vertex_type_reverse() {
        let op = SchemaOperation::create_vertex_type("person");
        let reverse = op.reverse().unwrap();
        match reverse {
            SchemaOperation::DeleteVertexType { label } => assert_eq!(label, "person"),
            _ => panic!("Expected DeleteVertexType"),
        }
    }

    #[test]
    fn test_edge_keyed_index_reverse() {
        let op: SchemaOperation = serde_json::from_str(
            r#"{"op": "create_composite_index", "index_key": "by_since", "edge_key": "knows",
                "element": "edge", "keys": ["knows_since"]}"#,
        )
        .unwrap();
        assert_eq!(
            op.reverse(),
            Some(SchemaOperation::DeleteCompositeIndex {
                index_key: "by_since".to_string(),
                edge_key: Some("knows".to_string()),
            })
        );
        assert_eq!(
            op.to_string(),
            "db.create_composite_index(\"by_since\", \"edge\", keys=[\"knows_since\"], edge_key=\"knows\")"
        );
    }

    #[test]
    fn test_delete_property_key_not_reversible() {
        let op = SchemaOperation::delete_property_key("person_name");
        assert!(op.reverse().is_none());
        assert!(!op.is_reversible());
    }

    #[test]
    fn test_update_index_reverse() {
        let op = SchemaOperation::UpdateIndex {
            index_key: "by_name".to_string(),
            action: SchemaAction::EnableIndex,
        };
        assert!(matches!(
            op.reverse(),
            Some(SchemaOperation::UpdateIndex {
                action: SchemaAction::DisableIndex,
                ..
            })
        ));

        let register = SchemaOperation::UpdateIndex {
            index_key: "by_name".to_string(),
            action: SchemaAction::RegisterIndex,
        };
        assert!(!register.is_reversible());
    }

    #[test]
    fn test_run_script_reversible() {
        let op = SchemaOperation::run_script("a = 1", Some("a = 0".to_string()));
        match op.reverse().unwrap() {
            SchemaOperation::RunScript { forward, backward } => {
                assert_eq!(forward, "a = 0");
                assert_eq!(backward.as_deref(), Some("a = 1"));
            }
            _ => panic!("Expected RunScript"),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SchemaOperation::create_vertex_type("person").to_string(),
            "db.create_vertex_type('person')"
        );
        assert_eq!(
            SchemaOperation::create_property_key("person_name", DataType::String).to_string(),
            "db.create_property_key(\"person_name\", data_type=\"String\")"
        );
        let edge = SchemaOperation::CreateEdgeType {
            label: "knows".to_string(),
            multiplicity: Multiplicity::Simple,
            unidirected: true,
            ttl: Some(Ttl::new(2, TimeUnit::Hours)),
        };
        assert_eq!(
            edge.to_string(),
            "db.create_edge_type('knows', multiplicity=Multiplicity.SIMPLE, unidirected=True, \
             set_ttl=True, ttl_time_value=2, ttl_time_unit=TimeUnit.HOURS)"
        );
        let index = SchemaOperation::CreateCompositeIndex {
            index_key: "by_name".to_string(),
            edge_key: None,
            element: ElementKind::Vertex,
            keys: vec!["person_name".to_string()],
            unique: true,
            indexer: None,
        };
        assert_eq!(
            index.to_string(),
            "db.create_composite_index(\"by_name\", \"vertex\", keys=[\"person_name\"], unique=True)"
        );
    }

    #[test]
    fn test_serde_format() {
        let op: SchemaOperation = serde_json::from_str(
            r#"{"op": "create_property_key", "name": "person_phone", "data_type": "String"}"#,
        )
        .unwrap();
        assert_eq!(
            op,
            SchemaOperation::create_property_key("person_phone", DataType::String)
        );

        let json = serde_json::to_value(SchemaOperation::create_vertex_type("person")).unwrap();
        assert_eq!(json, serde_json::json!({"op": "create_vertex_type", "label": "person"}));
    }
}
