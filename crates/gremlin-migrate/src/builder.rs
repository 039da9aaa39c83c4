//! Management script builder.
//!
//! [`ScriptBuilder`] accumulates schema primitives as Groovy statements and
//! assembles them into one transactional script. Nothing is sent to the
//! graph engine until [`ScriptBuilder::execute`] is called.
//!
//! Every statement that binds a schema element goes through a variable
//! cache keyed by `(model_name, index_key, edge_key)`. The same target always
//! gets the same variable name, so a later delete can rebind the variable an
//! earlier create used instead of colliding with it.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::config::BackendConfig;
use crate::dialect::{ManagementDialect, TitanDialect};
use crate::error::{MigrateError, Result};
use crate::executor::{QueryExecutor, QueryParams};
use crate::schema::{Cardinality, DataType, ElementKind, Multiplicity, SchemaAction, Ttl};
use crate::signals::{SchemaSignal, SignalBus};

/// The schema element a script variable is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarTarget {
    /// Model (variable prefix) the builder was created for.
    pub model_name: String,
    /// Label, key or index name.
    pub index_key: String,
    /// Edge key of a vertex-centric index, empty otherwise.
    pub edge_key: String,
}

/// Accumulates management statements for one migration run.
#[derive(Debug)]
pub struct ScriptBuilder {
    model_name: String,
    dry_run: bool,
    dialect: Box<dyn ManagementDialect>,
    cached_commands: Vec<String>,
    deferred_commands: Vec<String>,
    cached_vars: IndexMap<String, VarTarget>,
    backend: Option<BackendConfig>,
    signals: Option<SignalBus>,
    wait_for_registration: bool,
}

impl ScriptBuilder {
    /// Creates a builder that prefixes its variables with `model_name`.
    #[must_use]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            dry_run: false,
            dialect: Box::new(TitanDialect::new()),
            cached_commands: Vec::new(),
            deferred_commands: Vec::new(),
            cached_vars: IndexMap::new(),
            backend: None,
            signals: None,
            wait_for_registration: false,
        }
    }

    /// Enables dry-run mode (the script is printed instead of executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Uses a different management dialect.
    #[must_use]
    pub fn dialect(mut self, dialect: impl ManagementDialect + 'static) -> Self {
        self.dialect = Box::new(dialect);
        self
    }

    /// Sets the storage backend used by index repair.
    #[must_use]
    pub fn backend(mut self, backend: BackendConfig) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Publishes create/delete signals to `signals`.
    #[must_use]
    pub fn signals(mut self, signals: SignalBus) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Schedules a registration wait after every new graph index.
    #[must_use]
    pub fn wait_for_registration(mut self, enabled: bool) -> Self {
        self.wait_for_registration = enabled;
        self
    }

    /// Returns the variable prefix.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns true in dry-run mode.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the statements of the transactional body, in order.
    #[must_use]
    pub fn cached_commands(&self) -> &[String] {
        &self.cached_commands
    }

    /// Returns the statements run after the transaction, in order.
    #[must_use]
    pub fn deferred_commands(&self) -> &[String] {
        &self.deferred_commands
    }

    /// Returns the variable cache.
    #[must_use]
    pub const fn cached_vars(&self) -> &IndexMap<String, VarTarget> {
        &self.cached_vars
    }

    /// Returns the variable bound to `(index_key, edge_key)`, registering it
    /// on first use.
    pub fn get_or_create_var(&mut self, index_key: &str, edge_key: Option<&str>) -> String {
        let edge_key = edge_key.unwrap_or_default();
        let var = if edge_key.is_empty() {
            format!("{}_{}", self.model_name, index_key)
        } else {
            format!("{}_{}_{}", self.model_name, index_key, edge_key)
        };

        if !self.cached_vars.contains_key(&var) {
            self.cached_vars.insert(
                var.clone(),
                VarTarget {
                    model_name: self.model_name.clone(),
                    index_key: index_key.to_string(),
                    edge_key: edge_key.to_string(),
                },
            );
        }
        var
    }

    fn push(&mut self, statement: String) {
        debug!(statement = %statement, "Queued management statement");
        self.cached_commands.push(statement);
    }

    fn bind(&mut self, var: &str, expression: String) {
        self.push(format!("{} = {}", var, expression));
    }

    fn defer(&mut self, statement: String) {
        debug!(statement = %statement, "Queued deferred statement");
        self.deferred_commands.push(statement);
    }

    fn send(&self, signal: &SchemaSignal) {
        if let Some(signals) = &self.signals {
            signals.send(signal);
        }
    }

    /// Creates a vertex label, optionally with a TTL.
    pub fn create_vertex_type(&mut self, label: &str, ttl: Option<Ttl>) {
        let var = self.get_or_create_var(label, None);
        let stmt = self.dialect.make_vertex_label(label);
        self.bind(&var, stmt);
        if let Some(ttl) = ttl {
            let stmt = self.dialect.set_ttl(&var, ttl);
            self.push(stmt);
        }
        self.send(&SchemaSignal::create("vertex", label));
    }

    /// Creates an edge label, optionally with a TTL.
    pub fn create_edge_type(
        &mut self,
        label: &str,
        multiplicity: Multiplicity,
        unidirected: bool,
        ttl: Option<Ttl>,
    ) {
        let var = self.get_or_create_var(label, None);
        let stmt = self.dialect.make_edge_label(label, multiplicity, unidirected);
        self.bind(&var, stmt);
        if let Some(ttl) = ttl {
            let stmt = self.dialect.set_ttl(&var, ttl);
            self.push(stmt);
        }
        self.send(&SchemaSignal::create("edge", label));
    }

    /// Creates a property key.
    pub fn create_property_key(&mut self, name: &str, data_type: DataType, cardinality: Cardinality) {
        let var = self.get_or_create_var(name, None);
        let stmt = self.dialect.make_property_key(name, data_type, cardinality);
        self.bind(&var, stmt);
        self.send(&SchemaSignal::create("property_key", name));
    }

    /// Builds a graph index over `keys`.
    ///
    /// The index is named after its cache variable, which is also the name
    /// [`delete_composite_index`](Self::delete_composite_index) looks up for
    /// the same `index_key` and `edge_key`.
    pub fn create_composite_index(
        &mut self,
        index_key: &str,
        edge_key: Option<&str>,
        element: ElementKind,
        keys: &[String],
        unique: bool,
        indexer: Option<&str>,
    ) {
        let var = self.get_or_create_var(index_key, edge_key);
        let stmt = self.dialect.build_index(&var, element, keys, unique, indexer);
        self.bind(&var, stmt);
        if self.wait_for_registration {
            let stmt = self.dialect.await_registration(&var);
            self.defer(stmt);
        }
        self.send(&SchemaSignal::create("composite_index", index_key));
    }

    /// Removes a vertex label.
    pub fn delete_vertex_type(&mut self, label: &str) {
        let var = self.get_or_create_var(label, None);
        let stmt = self.dialect.get_vertex_label(label);
        self.remove(&var, stmt);
        self.send(&SchemaSignal::delete("vertex", label));
    }

    /// Removes an edge label.
    pub fn delete_edge_type(&mut self, label: &str) {
        let var = self.get_or_create_var(label, None);
        let stmt = self.dialect.get_edge_label(label);
        self.remove(&var, stmt);
        self.send(&SchemaSignal::delete("edge", label));
    }

    /// Removes a property key.
    pub fn delete_property_key(&mut self, name: &str) {
        let var = self.get_or_create_var(name, None);
        let stmt = self.dialect.get_property_key(name);
        self.remove(&var, stmt);
        self.send(&SchemaSignal::delete("property_key", name));
    }

    /// Removes a graph index.
    pub fn delete_composite_index(&mut self, index_key: &str, edge_key: Option<&str>) {
        let var = self.get_or_create_var(index_key, edge_key);
        let stmt = self.dialect.get_graph_index(&var);
        self.remove(&var, stmt);
        self.send(&SchemaSignal::delete("composite_index", index_key));
    }

    fn remove(&mut self, var: &str, lookup: String) {
        self.bind(var, lookup);
        let stmt = self.dialect.remove(var);
        self.push(stmt);
    }

    /// Sets the TTL of a label created earlier in this script.
    pub fn set_ttl(&mut self, label: &str, ttl: Ttl) {
        let var = self.get_or_create_var(label, None);
        let stmt = self.dialect.set_ttl(&var, ttl);
        self.push(stmt);
    }

    /// Moves a graph index through its lifecycle.
    pub fn update_index(&mut self, index_key: &str, action: SchemaAction) {
        let var = self.get_or_create_var(index_key, None);
        let lookup = self.dialect.get_graph_index(&var);
        self.bind(&var, lookup);
        let stmt = self.dialect.update_index(&var, action);
        self.push(stmt);
    }

    /// Schedules a storage-level repair of a graph index.
    ///
    /// Fails if no storage backend is configured.
    pub fn repair_index(&mut self, index_key: &str, edge_key: Option<&str>) -> Result<()> {
        let backend = self.backend.clone().ok_or_else(|| {
            MigrateError::Configuration(
                "index repair requires a storage backend and properties file".to_string(),
            )
        })?;
        let index_name = self.get_or_create_var(index_key, None);
        let stmt = self
            .dialect
            .repair_index(&backend, &index_name, edge_key.unwrap_or_default());
        self.defer(stmt);
        Ok(())
    }

    /// Schedules a wait until every key of a graph index is registered.
    pub fn await_index_registration(&mut self, index_key: &str) {
        let index_name = self.get_or_create_var(index_key, None);
        let stmt = self.dialect.await_registration(&index_name);
        self.defer(stmt);
    }

    /// Appends raw statements to the transactional body.
    pub fn run_script(&mut self, script: &str) {
        self.push(script.to_string());
    }

    /// Assembles the full script: the transactional envelope around the
    /// cached commands, followed by any deferred commands.
    #[must_use]
    pub fn generate_script(&self) -> String {
        let mut script = self.dialect.wrap_transaction(&self.cached_commands);
        for stmt in &self.deferred_commands {
            script.push('\n');
            script.push_str(stmt);
            script.push('\n');
        }
        script
    }

    /// Submits `script` as one isolated transaction and returns the engine's
    /// response. Nothing is submitted in dry-run mode.
    pub fn execute(&self, executor: &dyn QueryExecutor, script: &str) -> Result<Value> {
        if self.dry_run {
            debug!(model = %self.model_name, "Dry run, script not submitted");
            return Ok(Value::Null);
        }
        debug!(model = %self.model_name, dialect = self.dialect.name(), "Submitting script");
        Ok(executor.execute_query(script, &QueryParams::new(), true, true)?)
    }
}
