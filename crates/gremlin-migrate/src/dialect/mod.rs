//! Management-API dialects.
//!
//! A dialect knows the statement text a graph engine's management API
//! expects for each schema primitive. The [`ScriptBuilder`] owns variable
//! naming and ordering; the dialect only renders the right-hand sides.
//!
//! [`ScriptBuilder`]: crate::builder::ScriptBuilder

mod titan;

pub use titan::TitanDialect;

use std::fmt;

use crate::config::BackendConfig;
use crate::schema::{Cardinality, DataType, ElementKind, Multiplicity, SchemaAction, Ttl};

/// Trait for engine-specific management statements.
pub trait ManagementDialect: fmt::Debug + Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Creates a vertex label.
    fn make_vertex_label(&self, label: &str) -> String;

    /// Creates an edge label.
    fn make_edge_label(&self, label: &str, multiplicity: Multiplicity, unidirected: bool)
        -> String;

    /// Creates a property key.
    fn make_property_key(&self, name: &str, data_type: DataType, cardinality: Cardinality)
        -> String;

    /// Builds a graph index named `name` over `keys`.
    fn build_index(
        &self,
        name: &str,
        element: ElementKind,
        keys: &[String],
        unique: bool,
        indexer: Option<&str>,
    ) -> String;

    /// Looks up a vertex label.
    fn get_vertex_label(&self, label: &str) -> String;

    /// Looks up an edge label.
    fn get_edge_label(&self, label: &str) -> String;

    /// Looks up a property key.
    fn get_property_key(&self, name: &str) -> String;

    /// Looks up a graph index.
    fn get_graph_index(&self, name: &str) -> String;

    /// Removes the schema element bound to `var`.
    fn remove(&self, var: &str) -> String {
        format!("{}.remove()", var)
    }

    /// Sets the TTL of the label bound to `var`.
    fn set_ttl(&self, var: &str, ttl: Ttl) -> String;

    /// Moves the index bound to `var` through its lifecycle.
    fn update_index(&self, var: &str, action: SchemaAction) -> String;

    /// Runs the storage-level index repair job. Executed outside the
    /// management transaction.
    fn repair_index(&self, backend: &BackendConfig, index_name: &str, edge_key: &str) -> String;

    /// Blocks until every key of the index is registered. Executed outside
    /// the management transaction.
    fn await_registration(&self, index_name: &str) -> String;

    /// Wraps the statements in the transactional envelope.
    fn wrap_transaction(&self, statements: &[String]) -> String;

    /// Quotes a string literal.
    fn quote(&self, value: &str) -> String {
        format!(
            "\"{}\"",
            value.replace('\\', "\\\\").replace('"', "\\\"")
        )
    }
}
