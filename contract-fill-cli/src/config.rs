//! Optional TOML configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Settings read from `contract-fill.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Directory the template files named by each contract type live in.
    pub templates_dir: PathBuf,
    /// How many missing fields a report lists per group before summarizing.
    pub max_listed_fields: usize,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            max_listed_fields: 30,
        }
    }
}

impl FillConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = FillConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FillConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("contract-fill.toml");
        fs::write(&path, "templates_dir = \"/srv/templates\"\n").unwrap();

        let config = FillConfig::load(&path).unwrap();
        assert_eq!(config.templates_dir, PathBuf::from("/srv/templates"));
        assert_eq!(config.max_listed_fields, 30);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("contract-fill.toml");
        fs::write(&path, "max_listed_fields = \"many\"\n").unwrap();

        assert!(FillConfig::load(&path).is_err());
    }
}
