//! Project configuration loaded from `stratum.toml`.
//!
//! All paths are relative to the project root. Defaults match the layout
//! that `stratum init` scaffolds; edit the file before the second `init`
//! pass to customize.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CliError;

pub const CONFIG_FILE_NAME: &str = "stratum.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host binary crate that embeds the engine.
    pub migrator_dir: PathBuf,
    /// Where migration unit sources live. Must sit under the host crate's
    /// `src/` so `mod migrations;` resolves.
    pub migrations_dir: PathBuf,
    /// Where scaffold templates live.
    pub templates_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrator_dir: PathBuf::from("migrator"),
            migrations_dir: PathBuf::from("migrator/src/migrations"),
            templates_dir: PathBuf::from("migrator/templates"),
        }
    }
}

impl Config {
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    pub fn exists(root: &Path) -> bool {
        Self::path(root).exists()
    }

    pub fn load(root: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(Self::path(root))?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, root: &Path) -> Result<(), CliError> {
        fs::write(Self::path(root), toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
