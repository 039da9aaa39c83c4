//! Titan management-system dialect.
//!
//! Statements target the Titan 0.5 `TitanManagement` API as exposed to
//! Gremlin/Groovy scripts, with the graph bound to `g`.

use crate::config::BackendConfig;
use crate::schema::{Cardinality, DataType, ElementKind, Multiplicity, SchemaAction, Ttl};

use super::ManagementDialect;

const INDENT: &str = "    ";

/// Titan management dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitanDialect;

impl TitanDialect {
    /// Creates a new Titan dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ManagementDialect for TitanDialect {
    fn name(&self) -> &'static str {
        "titan"
    }

    fn make_vertex_label(&self, label: &str) -> String {
        format!("mgmt.makeVertexLabel({}).make()", self.quote(label))
    }

    fn make_edge_label(
        &self,
        label: &str,
        multiplicity: Multiplicity,
        unidirected: bool,
    ) -> String {
        let mut stmt = format!(
            "mgmt.makeEdgeLabel({}).multiplicity({})",
            self.quote(label),
            multiplicity
        );
        if unidirected {
            stmt.push_str(".unidirected()");
        }
        stmt.push_str(".make()");
        stmt
    }

    fn make_property_key(
        &self,
        name: &str,
        data_type: DataType,
        cardinality: Cardinality,
    ) -> String {
        format!(
            "mgmt.makePropertyKey({}).dataType({}.class).cardinality({}).make()",
            self.quote(name),
            data_type.class_name(),
            cardinality
        )
    }

    fn build_index(
        &self,
        name: &str,
        element: ElementKind,
        keys: &[String],
        unique: bool,
        indexer: Option<&str>,
    ) -> String {
        let mut stmt = format!(
            "mgmt.buildIndex({}, {}.class)",
            self.quote(name),
            element.class_name()
        );
        for key in keys {
            stmt.push_str(&format!(".addKey({})", self.get_property_key(key)));
        }
        if unique {
            stmt.push_str(".unique()");
        }
        match indexer {
            Some(indexer) => stmt.push_str(&format!(".buildMixedIndex({})", self.quote(indexer))),
            None => stmt.push_str(".buildCompositeIndex()"),
        }
        stmt
    }

    fn get_vertex_label(&self, label: &str) -> String {
        format!("mgmt.getVertexLabel({})", self.quote(label))
    }

    fn get_edge_label(&self, label: &str) -> String {
        format!("mgmt.getEdgeLabel({})", self.quote(label))
    }

    fn get_property_key(&self, name: &str) -> String {
        format!("mgmt.getPropertyKey({})", self.quote(name))
    }

    fn get_graph_index(&self, name: &str) -> String {
        format!("mgmt.getGraphIndex({})", self.quote(name))
    }

    fn set_ttl(&self, var: &str, ttl: Ttl) -> String {
        format!("mgmt.setTTL({}, {}, {}).make()", var, ttl.value, ttl.unit)
    }

    fn update_index(&self, var: &str, action: SchemaAction) -> String {
        format!("mgmt.updateIndex({}, {})", var, action)
    }

    fn repair_index(&self, backend: &BackendConfig, index_name: &str, edge_key: &str) -> String {
        let mut args = vec![
            self.quote(&backend.properties_file),
            self.quote(index_name),
            self.quote(edge_key),
        ];
        if let Some(partitioner) = backend.storage.partitioner() {
            args.push(self.quote(partitioner));
        }
        format!(
            "TitanIndexRepair.{}Repair({})",
            backend.storage.as_str(),
            args.join(", ")
        )
    }

    fn await_registration(&self, index_name: &str) -> String {
        let name = self.quote(index_name);
        [
            "registered = false".to_string(),
            "while (!registered) {".to_string(),
            format!("{}Thread.sleep(500L)", INDENT),
            format!("{}mgmt2 = g.getManagementSystem()", INDENT),
            format!("{}idx = mgmt2.getGraphIndex({})", INDENT, name),
            format!("{}registered = true", INDENT),
            format!("{}for (key in idx.getFieldKeys()) {{", INDENT),
            format!(
                "{0}{0}registered &= idx.getIndexStatus(key).equals(SchemaStatus.REGISTERED)",
                INDENT
            ),
            format!("{}}}", INDENT),
            format!("{}mgmt2.rollback()", INDENT),
            "}".to_string(),
        ]
        .join("\n")
    }

    fn wrap_transaction(&self, statements: &[String]) -> String {
        let body: Vec<String> = statements
            .iter()
            .flat_map(|stmt| stmt.lines())
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", INDENT, line)
                }
            })
            .collect();

        format!(
            "try {{\n{i}mgmt = g.getManagementSystem();\n\n{body}\n\n{i}mgmt.commit()\n}} catch (err) {{\n{i}mgmt.rollback()\n{i}g.stopTransaction(FAILURE)\n{i}throw(err)\n}}\n",
            i = INDENT,
            body = body.join("\n")
        )
    }
}
