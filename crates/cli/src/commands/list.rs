//! List migration unit sources found in the project.

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::CliError;

pub async fn run(root: &Path) -> Result<(), CliError> {
    if !Config::exists(root) {
        return Err(CliError::Validation(
            "No stratum.toml found; run `stratum init` first".to_string(),
        ));
    }
    let config = Config::load(root)?;

    let migrations_dir = root.join(&config.migrations_dir);
    if !migrations_dir.exists() {
        println!("No migrations directory found");
        return Ok(());
    }

    let mut units: Vec<(i64, String)> = Vec::new();
    for entry in fs::read_dir(&migrations_dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if let Some(unit) = parse_unit_file_name(&file_name) {
            units.push(unit);
        }
    }
    units.sort();

    if units.is_empty() {
        println!("No migrations found");
        return Ok(());
    }

    println!("Found {} migration(s):", units.len());
    for (number, name) in units {
        println!("  {number}  {name}");
    }
    Ok(())
}

/// Parse `m<number>_<name>.rs` into its ordering number and display name.
fn parse_unit_file_name(file_name: &str) -> Option<(i64, String)> {
    let stem = file_name.strip_suffix(".rs")?;
    let rest = stem.strip_prefix('m')?;
    let (digits, name) = rest.split_once('_')?;
    let number: i64 = digits.parse().ok()?;
    Some((number, name.replace('_', " ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scaffolded_file_names() {
        assert_eq!(
            parse_unit_file_name("m2026080703723_create_users.rs"),
            Some((2026080703723, "create users".to_string()))
        );
    }

    #[test]
    fn ignores_non_unit_files() {
        assert_eq!(parse_unit_file_name("mod.rs"), None);
        assert_eq!(parse_unit_file_name("README.md"), None);
        assert_eq!(parse_unit_file_name("m_no_number.rs"), None);
        assert_eq!(parse_unit_file_name("helpers.rs"), None);
    }
}
