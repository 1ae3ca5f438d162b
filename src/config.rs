use std::path::PathBuf;

use color_eyre::eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};

use crate::services::recommend::DEFAULT_CONCURRENCY;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    spotify: Option<SpotifyConfig>,
    /// Cap on concurrent catalog requests during a fan-out.
    #[serde(default)]
    concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-wizard").join("config.toml"))
    }

    /// Load config with default fallback
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or(eyre!("Config file not found"))?;

        if !config_path.exists() {
            // Credentials may still arrive via the environment
            return Ok(Config::default());
        }

        Self::from_file(&config_path)
    }

    /// Create a default config file, if it doesn't exist
    pub fn create_default() -> Result<()> {
        let config_path = Self::config_path().ok_or(eyre!("No default config path found"))?;
        if config_path.exists() {
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }

        let default = Config {
            spotify: Some(SpotifyConfig {
                client_id: String::new(),
                client_secret: String::new(),
            }),
            concurrency: None,
        };
        let contents =
            toml::to_string_pretty(&default).context("Failed to serialize default config")?;
        std::fs::write(&config_path, contents).context(format!(
            "Failed to write config file: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Get Spotify credentials, falling back to environment variables
    pub fn spotify_config(&self) -> Result<SpotifyConfig> {
        if let Some(ref spotify) = self.spotify {
            if !spotify.client_id.is_empty() && !spotify.client_secret.is_empty() {
                return Ok(spotify.clone());
            }
        }

        let client_id = std::env::var("SPOTIFY_CLIENT_ID").ok();
        let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET").ok();

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(SpotifyConfig {
                client_id,
                client_secret,
            }),
            _ => Err(eyre!(
                "Spotify credentials missing: set [spotify] in the config file or the SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET environment variables"
            )),
        }
    }

    /// Fan-out concurrency cap, defaulting when unset
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }
}
