use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, YtsumError};

pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_WHISPER_MODEL: &str = "base";

/// Optional defaults from ~/.config/ytsum/config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    pub default_lang: Option<String>,
    pub default_model: Option<String>,
    pub whisper_model: Option<String>,
}

impl FileConfig {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: FileConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(FileConfig::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

/// Process-wide configuration, resolved once at startup and passed down the
/// pipeline instead of read ambiently.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub youtube_api_key: Option<String>,
    pub lang: String,
    pub model: String,
    pub whisper_model: String,
}

impl Config {
    /// Resolve configuration from CLI flags, the environment (with `.env`
    /// support), and the config file. Flags win over the file; real
    /// environment variables win over `.env` values because dotenv loading
    /// never overrides variables that are already set.
    pub fn resolve(
        api_key_flag: Option<String>,
        lang_flag: Option<String>,
        model_flag: Option<String>,
    ) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let file = FileConfig::load().unwrap_or_default();
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            file,
            api_key_flag,
            lang_flag,
            model_flag,
        )
    }

    fn from_lookup(
        env: impl Fn(&str) -> Option<String>,
        file: FileConfig,
        api_key_flag: Option<String>,
        lang_flag: Option<String>,
        model_flag: Option<String>,
    ) -> Result<Self> {
        let gemini_api_key = env("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(YtsumError::MissingCredential("GEMINI_API_KEY"))?;

        let youtube_api_key = api_key_flag
            .or_else(|| env("YOUTUBE_DATA_API_KEY"))
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            gemini_api_key,
            youtube_api_key,
            lang: lang_flag
                .or(file.default_lang)
                .unwrap_or_else(|| DEFAULT_LANG.to_string()),
            model: model_flag
                .or(file.default_model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            whisper_model: file
                .whisper_model
                .unwrap_or_else(|| DEFAULT_WHISPER_MODEL.to_string()),
        })
    }
}
