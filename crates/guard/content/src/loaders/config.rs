//! Simulation configuration loader.

use std::path::Path;

use guard_core::SimConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for simulation configuration from TOML files.
///
/// Every table and key is optional; missing values fall back to the
/// documented defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<SimConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<SimConfig> {
        let config: SimConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.manager.grenade_capacity > config.manager.grenade_slots() {
            tracing::warn!(
                requested = config.manager.grenade_capacity,
                slots = config.manager.grenade_slots(),
                "grenade capacity exceeds the slot limit and is clamped"
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
seed = 17

[agent]
vision_distance = 40.0
cover_chance = 100

[zone]
alarm_cooldown = 12.5
"#,
        )
        .unwrap();

        assert_eq!(config.seed, 17);
        assert_eq!(config.agent.vision_distance, 40.0);
        assert_eq!(config.agent.cover_chance, 100);
        assert_eq!(config.zone.alarm_cooldown, 12.5);
        assert_eq!(
            config.agent.hearing_radius,
            guard_core::AiConfig::DEFAULT_HEARING_RADIUS
        );
        assert_eq!(config.manager, guard_core::ManagerConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 3").unwrap();
        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.seed, 3);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let error = ConfigLoader::parse("seed = \"many\"").unwrap_err();
        assert!(error.to_string().contains("Failed to parse config TOML"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = ConfigLoader::load(&dir.path().join("config.toml")).unwrap_err();
        assert!(error.to_string().contains("Failed to read file"));
    }
}
