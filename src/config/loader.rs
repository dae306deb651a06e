use super::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        let config_path = Self::get_config_path();
        Self { config_path }
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn get_config_path() -> PathBuf {
        // Next to the executable, so separate installs keep separate settings
        let exe_path = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));

        let exe_dir = exe_path.parent().unwrap_or_else(|| Path::new("."));

        exe_dir.join("config.toml")
    }

    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            info!(
                "Config file not found, creating default config at {:?}",
                self.config_path
            );
            let config = Config::default();
            self.save(&config)?;
            return Ok(config);
        }

        let contents =
            fs::read_to_string(&self.config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        info!("Loaded configuration from {:?}", self.config_path);
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, toml_string).context("Failed to write config file")?;

        info!("Saved configuration to {:?}", self.config_path);
        Ok(())
    }

    pub fn update_property<F>(&self, mut updater: F) -> Result<()>
    where
        F: FnMut(&mut Config),
    {
        let mut config = self.load()?;
        updater(&mut config);
        self.save(&config)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::AmountStyle;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::with_path(dir.path().join("nested").join("config.toml"));

        let config = loader.load().unwrap();

        assert_eq!(config, Config::default());
        assert!(loader.path().exists());
    }

    #[test]
    fn test_update_property_persists() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::with_path(dir.path().join("config.toml"));

        loader
            .update_property(|c| {
                c.amount_style = AmountStyle::Compact;
                c.players_per_page = 10;
            })
            .unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.amount_style, AmountStyle::Compact);
        assert_eq!(config.players_per_page, 10);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "players_per_page = \"many\"").unwrap();

        let err = ConfigLoader::with_path(&path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
