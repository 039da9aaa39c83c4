//! gremlin-migrate CLI
//!
//! Command-line tool for managing graph schema migrations.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use gremlin_migrate::frozen::FrozenModels;
use gremlin_migrate::prelude::*;

/// Schema migrations for Titan property graphs.
#[derive(Parser)]
#[command(name = "gremlin-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON).
    #[arg(short, long, env = "GREMLIN_MIGRATE_CONFIG")]
    config: Option<PathBuf>,

    /// Migrations directory.
    #[arg(short, long, env = "GREMLIN_MIGRATE_DIR")]
    migrations_dir: Option<PathBuf>,

    /// Package the migrations belong to.
    #[arg(short, long)]
    package: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the migrations of the package.
    ShowMigrations,

    /// Print the script of a migration without executing it.
    ScriptMigrate {
        /// Migration name or number.
        migration: String,

        /// Print the rollback script instead.
        #[arg(short, long)]
        reverse: bool,
    },

    /// Run a migration (the latest if not specified).
    Migrate {
        /// Migration name or number.
        migration: Option<String>,

        /// Roll the migration back instead of applying it.
        #[arg(short, long)]
        reverse: bool,

        /// Print the script without executing it.
        #[arg(long)]
        dry_run: bool,

        /// Write the script to this file instead of executing it.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a migration from a frozen snapshot of the live models.
    MakeMigrations {
        /// Frozen models file (JSON).
        #[arg(long)]
        models: PathBuf,

        /// Migration name/description. Ignored with --update.
        #[arg(short, long)]
        name: Option<String>,

        /// Show the migration without writing it.
        #[arg(long)]
        dry_run: bool,

        /// Rewrite the latest migration instead of adding a new one.
        #[arg(long)]
        update: bool,
    },

    /// Show the changes between two migrations.
    Diff {
        /// Base migration name or number.
        from: String,

        /// Target migration name or number.
        to: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => MigrateConfig::load(path)?,
        None => MigrateConfig::default(),
    };
    if let Some(dir) = cli.migrations_dir {
        config.migrations_dir = dir;
    }
    if let Some(package) = cli.package {
        config.package = package;
    }

    let types = PropertyTypeRegistry::with_builtins();

    match cli.command {
        Commands::ShowMigrations => {
            let package = load_package(&config, &types)?;
            if package.is_empty() {
                info!("No migrations found in {}", config.migrations_dir.display());
                return Ok(());
            }

            let latest = package.get_latest(false).map(|m| m.name().to_string());
            println!("\n{}:", package.package());
            println!("{:-<60}", "");
            for migration in package.iter() {
                let marker = if latest.as_deref() == Some(migration.name()) {
                    "*"
                } else {
                    " "
                };
                println!(" [{}] {}", marker, migration.name());
                if !migration.dependencies().is_empty() {
                    println!(
                        "       depends on: {}",
                        join(migration.dependencies().iter())
                    );
                }
                if !migration.dependents().is_empty() {
                    println!(
                        "       required by: {}",
                        join(migration.dependents().iter())
                    );
                }
            }
            println!();
        }

        Commands::ScriptMigrate { migration, reverse } => {
            let package = load_package(&config, &types)?;
            let migration = package.get(&migration)?;
            let mut db = script_builder(&config, false);
            match Direction::from_reverse(reverse) {
                Direction::Forwards => migration.forwards(&mut db)?,
                Direction::Backwards => migration.backwards(&mut db)?,
            }
            println!("{}", db.generate_script());
        }

        Commands::Migrate {
            migration,
            reverse,
            dry_run,
            output,
        } => {
            let package = load_package(&config, &types)?;
            let migration = match &migration {
                Some(name) => package.get(name)?,
                None => match package.get_latest(false) {
                    Some(latest) => latest,
                    None => {
                        info!("No migrations found. Use `makemigrations` first.");
                        return Ok(());
                    }
                },
            };

            if dry_run {
                info!("Dry run mode - the script will be printed but not executed.");
            }

            let executor = UnconfiguredExecutor;
            let target = match output {
                Some(path) => RunTarget::File(Some(path)),
                None => RunTarget::Graph(&executor),
            };
            let mut db = script_builder(&config, dry_run);
            MigrationRunner::new(migration, target)
                .execute(&mut db, Direction::from_reverse(reverse))?;
        }

        Commands::MakeMigrations {
            models,
            name,
            dry_run,
            update,
        } => {
            let package = load_package_or_empty(&config, &types)?;
            let frozen: FrozenModels = serde_json::from_str(&fs::read_to_string(&models)?)?;
            let current = ModelRegistry::from_frozen(&frozen, &types)?;

            let base = package.get_latest(update);
            let previous = base.map(|m| m.models().clone()).unwrap_or_default();
            let actions = Autodetector::new().plan(&previous, &current, package.package());
            if actions.is_empty() {
                info!("No changes detected");
                return Ok(());
            }
            for action in &actions {
                println!("{}", action.console_line());
            }

            let full_name = match (update, package.get_latest(false)) {
                (true, Some(latest)) => {
                    if name.is_some() {
                        warn!("--name is ignored with --update");
                    }
                    latest.name().to_string()
                }
                _ => generate_migration_name(package.next_number(), name.as_deref().unwrap_or("")),
            };

            let mut writer = MigrationWriter::new(package.package(), &full_name)
                .actions(actions)
                .models(current.freeze(package.package()));
            if let Some(base) = base {
                writer = writer.depends_on(base.name());
            }

            if dry_run {
                println!("\nWould create migration: {}/{}", package.package(), full_name);
                println!("\n{}", writer.render_code());
            } else {
                writer.write_to(&config.migrations_dir, update)?;
            }
        }

        Commands::Diff { from, to } => {
            let package = load_package(&config, &types)?;
            let from = package.get(&from)?;
            let to = package.get(&to)?;

            let mut current = ModelRegistry::new();
            for model in to.models().values() {
                current.register(model.clone())?;
            }
            let actions = Autodetector::new().plan(from.models(), &current, package.package());
            if actions.is_empty() {
                info!("No changes between {} and {}", from.name(), to.name());
            }
            for action in &actions {
                println!("{}", action.console_line());
            }
        }
    }

    Ok(())
}

fn load_package(
    config: &MigrateConfig,
    types: &PropertyTypeRegistry,
) -> Result<PackageMigrations> {
    let mut package = PackageMigrations::load(&config.migrations_dir, config.package.clone())?;
    package.resolve_dependencies(config.dependency_policy)?;
    package.regenerate_models(types)?;
    Ok(package)
}

fn load_package_or_empty(
    config: &MigrateConfig,
    types: &PropertyTypeRegistry,
) -> Result<PackageMigrations> {
    if config.migrations_dir.is_dir() {
        load_package(config, types)
    } else {
        Ok(PackageMigrations::from_definitions(
            config.package.clone(),
            Vec::<(String, MigrationDefinition)>::new(),
        ))
    }
}

fn script_builder(config: &MigrateConfig, dry_run: bool) -> ScriptBuilder {
    let mut db = ScriptBuilder::new(config.model_name())
        .dry_run(dry_run)
        .wait_for_registration(config.wait_for_registration);
    if let Some(backend) = &config.backend {
        db = db.backend(backend.clone());
    }
    db
}

fn join<'a>(names: impl Iterator<Item = &'a String>) -> String {
    names.map(String::as_str).collect::<Vec<_>>().join(", ")
}
