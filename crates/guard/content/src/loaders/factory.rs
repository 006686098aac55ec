//! Content factory resolving every data file of a level pack.

use std::path::{Path, PathBuf};

use guard_core::{LevelLayout, SimConfig, Simulation};

use crate::loaders::{ConfigLoader, LevelLoader, LoadResult};

/// Content factory that loads simulation content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── levels/
///     ├── dock.ron
///     └── warehouse.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load simulation configuration from `config.toml`.
    ///
    /// A pack without a config file runs on defaults.
    pub fn load_config(&self) -> LoadResult<SimConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(SimConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load a level from `levels/{level_name}.ron`.
    pub fn load_level(&self, level_name: &str) -> LoadResult<LevelLayout> {
        let path = self
            .data_dir
            .join("levels")
            .join(format!("{}.ron", level_name));
        LevelLoader::load(&path)
    }

    /// Builds a ready-to-tick simulation for `level_name`.
    pub fn build_simulation(&self, level_name: &str) -> LoadResult<Simulation> {
        let config = self.load_config()?;
        let layout = self.load_level(level_name)?;
        Simulation::from_layout(config, &layout)
            .map_err(|e| anyhow::anyhow!("Failed to build level {}: {}", level_name, e))
    }

    /// Names of every level in the pack, sorted.
    pub fn level_names(&self) -> LoadResult<Vec<String>> {
        let dir = self.data_dir.join("levels");
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
