//! Query-execution boundary.
//!
//! The wire client that talks to the graph engine lives outside this crate.
//! Migrations only need something that accepts a fully assembled script and
//! hands back the engine's response, which is what [`QueryExecutor`] models.

use serde_json::{Map, Value};

/// Script parameters, bound by name on the remote side.
pub type QueryParams = Map<String, Value>;

/// Failure reported by the graph engine or the transport in front of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    /// Error message as reported by the engine.
    pub message: String,
    /// The script that was rejected, if known.
    pub script: Option<String>,
}

impl QueryError {
    /// Creates a new query error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            script: None,
        }
    }

    /// Attaches the rejected script.
    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }
}

/// Executes Gremlin/Groovy scripts against a graph engine.
pub trait QueryExecutor {
    /// Submits `script` with `params`.
    ///
    /// `transaction` asks the engine to wrap the evaluation in a transaction,
    /// `isolate` asks it to evaluate in a fresh script context.
    fn execute_query(
        &self,
        script: &str,
        params: &QueryParams,
        transaction: bool,
        isolate: bool,
    ) -> Result<Value, QueryError>;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    fn execute_query(
        &self,
        script: &str,
        params: &QueryParams,
        transaction: bool,
        isolate: bool,
    ) -> Result<Value, QueryError> {
        (**self).execute_query(script, params, transaction, isolate)
    }
}

/// Executor used when no graph connection has been configured.
///
/// Every call fails, so dry runs and file generation work while a real
/// execution reports the missing connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredExecutor;

impl QueryExecutor for UnconfiguredExecutor {
    fn execute_query(
        &self,
        script: &str,
        _params: &QueryParams,
        _transaction: bool,
        _isolate: bool,
    ) -> Result<Value, QueryError> {
        Err(QueryError::new("no graph connection is configured").with_script(script))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_executor_fails() {
        let result = UnconfiguredExecutor.execute_query("1 + 1", &QueryParams::new(), true, true);
        let err = result.unwrap_err();
        assert_eq!(err.message, "no graph connection is configured");
        assert_eq!(err.script.as_deref(), Some("1 + 1"));
    }

    #[test]
    fn test_query_error_display() {
        let err = QueryError::new("Property key already exists");
        assert_eq!(err.to_string(), "Property key already exists");
    }
}
