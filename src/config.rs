//! YAML configuration for building a [`LogWriter`].

use crate::categories::{Category, CategoryRegistry};
use crate::log_paths;
use crate::writer::LogWriter;
use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Optional file-based setup for a [`LogWriter`].
///
/// ```yaml
/// log_dir: /var/log/myapp
/// categories:
///   audit: ["Audit:", "an audit"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogitConfig {
    /// Exact log file to write. Overrides the daily file name.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// Directory for the daily `YYYY_MM_DD.log` file. Default: `logs`
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Extra categories merged over the built-ins.
    #[serde(default)]
    pub categories: BTreeMap<String, Category>,
}

impl LogitConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse config as YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.file_path.is_some() && self.log_dir.is_some() {
            anyhow::bail!("Only one of 'file_path' and 'log_dir' may be set");
        }

        if let Some(ref file_path) = self.file_path {
            if file_path.file_name().is_none() {
                anyhow::bail!(
                    "file_path '{}' does not name a file",
                    file_path.display()
                );
            }
        }

        Ok(())
    }

    /// Resolves the log file path, dating the daily file with today's local date.
    pub fn resolve_file_path(&self) -> PathBuf {
        if let Some(ref file_path) = self.file_path {
            return file_path.clone();
        }
        let today = Local::now().date_naive();
        match self.log_dir {
            Some(ref dir) => log_paths::daily_log_path_in(dir, today),
            None => log_paths::daily_log_path(today),
        }
    }

    /// Builds a writer with the configured path and categories.
    pub fn build_writer(&self) -> LogWriter {
        let mut categories = CategoryRegistry::new();
        categories.extend_with(self.categories.clone());
        LogWriter::new(self.resolve_file_path()).with_categories(categories)
    }
}
