use std::path::Path;

use tracing::warn;

use crate::error::ConfigError;
use crate::game::GameConfig;
use crate::modes::TrainConfig;
use crate::rl::AgentConfig;

/// Top-level application configuration, loadable from TOML.
///
/// Every section and field is optional in the file; missing values take
/// their defaults.
///
/// ```toml
/// [game]
/// grid_width = 20
///
/// [agent]
/// gamma = 0.95
/// seed = 42
///
/// [training]
/// max_episodes = 500
/// history_path = "runs/scores.json"
/// ```
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub agent: AgentConfig,
    pub training: TrainConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;
        self.agent.validate()?;
        self.training.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.max_memory, 100_000);
        assert_eq!(config.agent.batch_size, 1000);
        assert_eq!(config.game.grid_width, 32);
        assert_eq!(config.game.grid_height, 24);
        assert_eq!(config.training.max_episodes, None);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
[agent]
gamma = 0.95
seed = 42

[training]
max_episodes = 500
"#,
        );

        let config = AppConfig::load(file.path()).unwrap();

        assert_eq!(config.agent.gamma, 0.95);
        assert_eq!(config.agent.seed, Some(42));
        assert_eq!(config.agent.batch_size, 1000);
        assert_eq!(config.training.max_episodes, Some(500));
        assert_eq!(config.game.initial_snake_length, 3);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = write_config("[agent]\nbatch_size = 0\n");

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let file = write_config("[agent\ngamma = ");

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.agent.epsilon_start, 80);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.agent.hidden_size = 128;
        config.training.log_frequency = 10;

        let text = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed.agent.hidden_size, 128);
        assert_eq!(parsed.training.log_frequency, 10);
    }
}
