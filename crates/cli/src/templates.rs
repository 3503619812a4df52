//! Scaffold templates and placeholder rendering.
//!
//! Templates use `{{key}}` placeholders filled by simple replacement; the
//! migration template is written to the project's templates directory by
//! `stratum init` so teams can adjust it.

use std::collections::HashMap;

use crate::error::CliError;

/// Marker line the `new` command inserts `mod` declarations before.
pub const MOD_MARKER: &str = "// stratum:mod";

/// Marker line the `new` command inserts registration calls before.
pub const REGISTER_MARKER: &str = "// stratum:register";

/// File name of the migration template inside the templates directory.
pub const MIGRATION_TEMPLATE_FILE: &str = "new_migration.rs.tmpl";

pub fn render_template(template: &str, context: &HashMap<&str, String>) -> Result<String, CliError> {
    let mut result = template.to_string();

    for (key, value) in context {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    Ok(result)
}

pub static MIGRATION_TEMPLATE: &str = r#"use stratum_migrate::{MigrationUnit, PgVersionStore};

// Migration: {{name}}
// Created: {{created}}

pub fn migration() -> MigrationUnit<PgVersionStore> {
    MigrationUnit::new({{number}})
        .up(|store| async move {
            // Apply your pre-deploy change here, e.g.
            // sqlx::query("CREATE TABLE ...").execute(store.pool()).await?;
            let _ = store;
            Ok(())
        })
        .down(|store| async move {
            // Reverse the change applied by `up`.
            let _ = store;
            Ok(())
        })
}
"#;

pub static MIGRATIONS_MOD_TEMPLATE: &str = r#"//! Migration units, one module per file.
//!
//! The entries below are maintained by `stratum new`; keep the marker
//! comments in place.

use stratum_migrate::{MigrateResult, PgVersionStore, Registry};

// stratum:mod

pub fn register_all(registry: &mut Registry<PgVersionStore>) -> MigrateResult<()> {
    // stratum:register
    Ok(())
}
"#;

pub static HOST_CARGO_TEMPLATE: &str = r#"[package]
name = "migrator"
version = "0.1.0"
edition = "2021"
publish = false

[dependencies]
stratum-migrate = "0.2"
clap = { version = "4.0", features = ["derive"] }
tokio = { version = "1.0", features = ["full"] }
tracing-subscriber = { version = "0.3", features = ["env-filter"] }
"#;

pub static HOST_MAIN_TEMPLATE: &str = r#"use std::process;

use clap::Parser;
use stratum_migrate::{Direction, MigrationRunner, PgVersionStore, Registry, RunRequest, ScopeFilter};

mod migrations;

#[derive(Parser)]
#[command(name = "migrator", about = "Run {{project}} migrations")]
struct Args {
    /// Run up migrations (the default)
    #[arg(long)]
    up: bool,

    /// Run down migrations; requires --version
    #[arg(long, conflicts_with = "up")]
    down: bool,

    /// Run pre-deploy migrations only
    #[arg(long)]
    pre: bool,

    /// Run post-deploy migrations only
    #[arg(long)]
    post: bool,

    /// Restrict the run to one ordering number
    #[arg(long)]
    version: Option<i64>,

    /// Re-run hooks even if already recorded; requires --version
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL must be set");
            process::exit(1);
        }
    };

    let store = match PgVersionStore::connect(&database_url).await {
        Ok(store) => store,
        Err(err) => {
            eprintln!("{err}");
            process::exit(5);
        }
    };
    if let Err(err) = store.ensure_table().await {
        eprintln!("{err}");
        process::exit(5);
    }

    let mut registry = Registry::new();
    if let Err(err) = migrations::register_all(&mut registry) {
        eprintln!("{err}");
        process::exit(err.exit_code());
    }

    let request = RunRequest {
        direction: if args.down { Direction::Down } else { Direction::Up },
        scopes: ScopeFilter::from_flags(args.pre, args.post),
        target: args.version,
        force: args.force,
    };

    let runner = MigrationRunner::new(registry, store);
    match runner.run(&request).await {
        Ok(report) => println!(
            "Done migrating: {} pre, {} post, {} skipped",
            report.pre.len(),
            report.post.len(),
            report.skipped
        ),
        Err(err) => {
            eprintln!("{err}");
            process::exit(err.exit_code());
        }
    }
}
"#;
