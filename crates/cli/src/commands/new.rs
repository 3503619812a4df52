//! Scaffold a new migration unit and register it.
//!
//! Writes `m<number>_<name>.rs` from the project's migration template, then
//! inserts the `mod` declaration and the `registry.register(...)` call into
//! the migrations module, each before its marker comment.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use stratum_migrate::ordering_number;

use crate::config::Config;
use crate::error::CliError;
use crate::patch;
use crate::templates::{self, MIGRATION_TEMPLATE_FILE, MOD_MARKER, REGISTER_MARKER};
use crate::utils::sanitize_name;

pub async fn run(root: &Path, name: &str) -> Result<(), CliError> {
    if !Config::exists(root) {
        return Err(CliError::Validation(
            "No stratum.toml found; run `stratum init` first".to_string(),
        ));
    }
    let config = Config::load(root)?;

    let sanitized = sanitize_name(name);
    if sanitized.is_empty() {
        return Err(CliError::Validation(format!(
            "Migration name {:?} has no usable characters",
            name
        )));
    }

    let now = Utc::now();
    let number = ordering_number(now);
    let module = format!("m{}_{}", number, sanitized);
    tracing::debug!(number, module = %module, "scaffolding migration unit");

    let template_path = root.join(&config.templates_dir).join(MIGRATION_TEMPLATE_FILE);
    let template = fs::read_to_string(&template_path).map_err(|e| {
        CliError::Template(format!(
            "Could not read template {}: {}",
            template_path.display(),
            e
        ))
    })?;

    let mut context = HashMap::new();
    context.insert("name", name.to_string());
    context.insert("number", number.to_string());
    context.insert("module", module.clone());
    context.insert("created", now.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    let rendered = templates::render_template(&template, &context)?;

    let migrations_dir = root.join(&config.migrations_dir);
    let unit_path = migrations_dir.join(format!("{module}.rs"));
    if unit_path.exists() {
        return Err(CliError::Validation(format!(
            "{} already exists",
            unit_path.display()
        )));
    }
    fs::write(&unit_path, rendered)?;

    let mod_path = migrations_dir.join("mod.rs");
    patch::patch_file(&mod_path, MOD_MARKER, &format!("mod {module};"))?;
    patch::patch_file(
        &mod_path,
        REGISTER_MARKER,
        &format!("registry.register({module}::migration())?;"),
    )?;

    println!("Created migration {}", unit_path.display());
    Ok(())
}
