//! Application configuration.
//!
//! Read from `./data/kathakalpana.toml`. Every key is optional; a missing
//! file yields the defaults. `KATHA_API_URL` overrides the API base URL.

use crate::error::AppError;
use chapter_images::{ImageQueueConfig, ImageUrlConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "KATHA_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub min_chapters: u32,
    pub max_chapters: u32,
    pub default_chapters: u32,
    pub speech_rate: f32,
    pub images: ImageSettings,
}

/// The `[images]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImageSettings {
    #[serde(flatten)]
    pub url: ImageUrlConfig,
    #[serde(flatten)]
    pub queue: ImageQueueConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://kathakalpana-api.onrender.com".to_string(),
            request_timeout_secs: 120,
            min_chapters: 1,
            max_chapters: 5,
            default_chapters: 3,
            speech_rate: 0.9,
            images: ImageSettings::default(),
        }
    }
}

pub fn get_config_path() -> PathBuf {
    crate::database::get_data_directory().join("kathakalpana.toml")
}

impl AppConfig {
    /// Loads the config file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self, AppError> {
        let config = Self::load_from(&get_config_path())?;
        Ok(config.with_api_override(std::env::var(API_URL_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, AppError> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config.normalized())
    }

    pub fn with_api_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            log::info!("API base URL overridden by {}: {}", API_URL_ENV, url);
            self.api_base_url = url;
        }
        self
    }

    /// Repairs inconsistent chapter bounds instead of rejecting the file
    fn normalized(mut self) -> Self {
        self.min_chapters = self.min_chapters.max(1);
        if self.max_chapters < self.min_chapters {
            log::warn!(
                "max_chapters {} below min_chapters {}, raising it",
                self.max_chapters,
                self.min_chapters
            );
            self.max_chapters = self.min_chapters;
        }
        self.default_chapters = self.clamp_chapters(self.default_chapters);
        if !(self.speech_rate > 0.0) {
            self.speech_rate = 0.9;
        }
        self
    }

    pub fn clamp_chapters(&self, chapters: u32) -> u32 {
        chapters.clamp(self.min_chapters, self.max_chapters)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
