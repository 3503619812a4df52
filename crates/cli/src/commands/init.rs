//! Bootstrap the default config and migrator layout.
//!
//! The first run only writes `stratum.toml` and stops, so the layout can be
//! adjusted before anything is scaffolded; running `init` again creates the
//! host crate, the migrations module and the default template. Existing
//! files are never overwritten, so re-running is always safe.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::CliError;
use crate::templates::{
    self, HOST_CARGO_TEMPLATE, HOST_MAIN_TEMPLATE, MIGRATIONS_MOD_TEMPLATE, MIGRATION_TEMPLATE,
    MIGRATION_TEMPLATE_FILE,
};

pub async fn run(root: &Path) -> Result<(), CliError> {
    if !Config::exists(root) {
        Config::default().save(root)?;
        println!("Created default config file {CONFIG_FILE_NAME}");
        println!("You can optionally edit this file, then run `stratum init` again.");
        return Ok(());
    }

    let config = Config::load(root)?;

    println!("Creating migration folders ...");
    fs::create_dir_all(root.join(&config.migrations_dir))?;
    fs::create_dir_all(root.join(&config.templates_dir))?;

    let project = root
        .canonicalize()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string());
    let mut context = HashMap::new();
    context.insert("project", project);

    write_if_absent(
        &root.join(&config.migrator_dir).join("Cargo.toml"),
        &templates::render_template(HOST_CARGO_TEMPLATE, &context)?,
    )?;
    write_if_absent(
        &root.join(&config.migrator_dir).join("src").join("main.rs"),
        &templates::render_template(HOST_MAIN_TEMPLATE, &context)?,
    )?;
    write_if_absent(
        &root.join(&config.migrations_dir).join("mod.rs"),
        MIGRATIONS_MOD_TEMPLATE,
    )?;
    // The migration template keeps its {{placeholders}}; it is rendered by
    // `stratum new`, not here.
    write_if_absent(
        &root.join(&config.templates_dir).join(MIGRATION_TEMPLATE_FILE),
        MIGRATION_TEMPLATE,
    )?;

    println!("\nYou're all set.");
    println!("\tCreate a migration with `stratum new <name>`");
    println!("\tRun migrations with `cargo run -p migrator -- --up`");
    Ok(())
}

/// Write `content` to `path` unless the file already exists.
fn write_if_absent(path: &Path, content: &str) -> Result<(), CliError> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn first_run_creates_config_only() {
        let dir = TempDir::new().unwrap();

        run(dir.path()).await.unwrap();

        assert!(Config::exists(dir.path()));
        assert!(!dir.path().join("migrator").exists());
    }

    #[tokio::test]
    async fn second_run_scaffolds_the_layout() {
        let dir = TempDir::new().unwrap();
        run(dir.path()).await.unwrap();
        run(dir.path()).await.unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert!(dir.path().join(&config.migrator_dir).join("Cargo.toml").exists());
        assert!(dir.path().join(&config.migrator_dir).join("src/main.rs").exists());
        assert!(dir.path().join(&config.migrations_dir).join("mod.rs").exists());
        assert!(dir
            .path()
            .join(&config.templates_dir)
            .join(MIGRATION_TEMPLATE_FILE)
            .exists());

        let main_rs =
            fs::read_to_string(dir.path().join(&config.migrator_dir).join("src/main.rs")).unwrap();
        assert!(!main_rs.contains("{{project}}"), "placeholders must be rendered");
    }

    #[tokio::test]
    async fn init_never_overwrites_existing_files() {
        let dir = TempDir::new().unwrap();
        run(dir.path()).await.unwrap();
        run(dir.path()).await.unwrap();

        let config = Config::load(dir.path()).unwrap();
        let mod_path = dir.path().join(&config.migrations_dir).join("mod.rs");
        fs::write(&mod_path, "// customized\n").unwrap();

        run(dir.path()).await.unwrap();
        assert_eq!(fs::read_to_string(&mod_path).unwrap(), "// customized\n");
    }
}
