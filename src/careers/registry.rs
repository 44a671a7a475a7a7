//! Snapshot of the job titles currently open for applications.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Deserialize;

use crate::config::schema::CareersConfig;

/// Error type for loading a positions file.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read positions file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse positions file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct PositionsFile {
    #[serde(default)]
    positions: Vec<Posting>,
}

#[derive(Debug, Deserialize)]
struct Posting {
    title: String,
    #[serde(default = "default_open")]
    open: bool,
}

fn default_open() -> bool {
    true
}

/// Read-mostly registry of open job titles.
///
/// Readers take a cheap [`Arc`] snapshot per request; reloads swap the whole
/// list atomically so a request never observes a half-updated registry.
#[derive(Debug, Default)]
pub struct JobRegistry {
    titles: ArcSwap<Vec<String>>,
}

impl JobRegistry {
    /// Create a registry from a fixed list of titles.
    pub fn new(titles: Vec<String>) -> Self {
        Self {
            titles: ArcSwap::from_pointee(normalize(titles)),
        }
    }

    /// Build the registry described by the careers section.
    ///
    /// A positions file takes precedence over the inline list.
    pub fn from_config(config: &CareersConfig) -> Result<Self, RegistryError> {
        match &config.positions_file {
            Some(path) => Ok(Self::new(load_positions(Path::new(path))?)),
            None => Ok(Self::new(config.open_positions.clone())),
        }
    }

    /// Current titles. Empty means cross-validation is disabled.
    pub fn snapshot(&self) -> Arc<Vec<String>> {
        self.titles.load_full()
    }

    /// Replace the list of open titles.
    pub fn replace(&self, titles: Vec<String>) {
        let titles = normalize(titles);
        tracing::info!(open_positions = titles.len(), "Job registry updated");
        self.titles.store(Arc::new(titles));
    }

    /// Re-read a positions file; the previous snapshot survives a failure.
    pub fn reload_from(&self, path: &Path) -> Result<(), RegistryError> {
        let titles = load_positions(path)?;
        self.replace(titles);
        Ok(())
    }
}

/// Parse a positions file and return the titles of open postings.
pub fn load_positions(path: &Path) -> Result<Vec<String>, RegistryError> {
    let content = std::fs::read_to_string(path)?;
    let file: PositionsFile = toml::from_str(&content)?;
    Ok(file
        .positions
        .into_iter()
        .filter(|p| p.open)
        .map(|p| p.title)
        .collect())
}

fn normalize(titles: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    out.dedup();
    out
}
