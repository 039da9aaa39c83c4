//! Migration runner.
//!
//! A [`MigrationRunner`] drives one migration through a [`ScriptBuilder`]
//! and hands the generated script to its target: the graph engine, or a
//! file on disk. A runner executes once; a second call fails because the
//! builder it populated already holds the migration's statements.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::builder::ScriptBuilder;
use crate::error::{MigrateError, Result};
use crate::executor::QueryExecutor;
use crate::Migration;

const BANNER_WIDTH: usize = 80;

/// Which side of a migration to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Apply the migration.
    #[default]
    Forwards,
    /// Roll the migration back.
    Backwards,
}

impl Direction {
    /// Returns `Backwards` when `reverse` is set.
    #[must_use]
    pub const fn from_reverse(reverse: bool) -> Self {
        if reverse {
            Self::Backwards
        } else {
            Self::Forwards
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forwards => f.write_str("forwards"),
            Self::Backwards => f.write_str("backwards"),
        }
    }
}

/// Lifecycle of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not executed yet.
    Pending,
    /// Executed. Terminal.
    Executed,
}

/// Where the generated script goes.
pub enum RunTarget<'a> {
    /// Submit the script to the graph engine.
    Graph(&'a dyn QueryExecutor),
    /// Write the script to a file. `None` is a configuration error.
    File(Option<PathBuf>),
}

impl fmt::Debug for RunTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph(_) => f.write_str("Graph"),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// The generated script.
    pub script: String,
    /// The engine's response, `Null` when nothing was submitted.
    pub result: Value,
    /// The file the script was written to.
    pub output: Option<PathBuf>,
}

/// Runs a single migration.
pub struct MigrationRunner<'a> {
    migration: &'a dyn Migration,
    target: RunTarget<'a>,
    state: RunState,
}

impl<'a> MigrationRunner<'a> {
    /// Creates a pending runner.
    pub fn new(migration: &'a dyn Migration, target: RunTarget<'a>) -> Self {
        Self {
            migration,
            target,
            state: RunState::Pending,
        }
    }

    /// Returns the runner's state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Populates `db` from the migration and delivers the script.
    ///
    /// In dry-run mode the script is printed with a banner instead of
    /// being submitted or written. Errors from the graph engine are
    /// returned unchanged.
    pub fn execute(&mut self, db: &mut ScriptBuilder, direction: Direction) -> Result<RunOutcome> {
        let name = self.migration.name().to_string();
        if self.state == RunState::Executed {
            return Err(MigrateError::AlreadyExecuted(name));
        }
        let delivery = match &self.target {
            RunTarget::Graph(executor) => Delivery::Graph(*executor),
            RunTarget::File(Some(path)) => Delivery::File(path.clone()),
            RunTarget::File(None) => {
                return Err(MigrateError::Configuration(
                    "Output file must be a valid path string".to_string(),
                ));
            }
        };
        self.state = RunState::Executed;

        info!(migration = %name, direction = %direction, "Running migration");
        match direction {
            Direction::Forwards => self.migration.forwards(db)?,
            Direction::Backwards => self.migration.backwards(db)?,
        }
        let script = db.generate_script();

        match delivery {
            Delivery::Graph(executor) => {
                if db.is_dry_run() {
                    println!("{}", dry_run_banner(&name, None, &script));
                }
                let result = db.execute(executor, &script)?;
                if !db.is_dry_run() {
                    info!(migration = %name, "Migration executed successfully");
                }
                Ok(RunOutcome {
                    script,
                    result,
                    output: None,
                })
            }
            Delivery::File(path) => {
                if db.is_dry_run() {
                    println!("{}", dry_run_banner(&name, Some(&path), &script));
                } else {
                    fs::write(&path, &script)?;
                    info!(migration = %name, path = %path.display(), "Migration script written");
                }
                Ok(RunOutcome {
                    script,
                    result: Value::Null,
                    output: Some(path),
                })
            }
        }
    }
}

enum Delivery<'a> {
    Graph(&'a dyn QueryExecutor),
    File(PathBuf),
}

/// Formats the dry-run preview of a script.
#[must_use]
pub fn dry_run_banner(name: &str, output: Option<&Path>, script: &str) -> String {
    let rule = "-".repeat(BANNER_WIDTH);
    let heading = match output {
        Some(path) => format!("Migration for {} to be written to {}", name, path.display()),
        None => format!("Migration for {} to be executed", name),
    };
    format!("{rule}\n{heading}\n{rule}\n{script}\n{rule}")
}
