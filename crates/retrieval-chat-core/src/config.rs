use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;
use crate::retrieval::client::DEFAULT_BASE_URL;
use crate::retrieval::{SearchParams, SearchType};

pub const URL_ENV_VAR: &str = "RETRIEVAL_CHAT_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub search_type: SearchType,
    pub request_timeout_secs: u64,
    pub doc_types: Vec<String>,
    pub include_relationships: bool,
    pub model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_type: SearchType::Focused,
            request_timeout_secs: 30,
            doc_types: Vec::new(),
            include_relationships: false,
            model: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_search_type(search_type: SearchType) -> Result<(), ConfigError> {
        let config_path = Self::get_config_path()?;
        Self::save_search_type_to(&config_path, search_type)
    }

    /// Update only the search type in the file at `path`.
    ///
    /// An unreadable or invalid file is left untouched.
    pub fn save_search_type_to(path: &Path, search_type: SearchType) -> Result<(), ConfigError> {
        let mut config = Self::load_from(path).map_err(|err| {
            warn!(path = %path.display(), error = %err, "not overwriting unreadable config");
            err
        })?;
        config.search_type = search_type;
        config.save_to(path)
    }

    /// Let `RETRIEVAL_CHAT_URL` override the configured base URL.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV_VAR) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            search_type: self.search_type,
            doc_types: self.doc_types.clone(),
            include_relationships: self.include_relationships,
            model: self.model.clone(),
        }
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("retrieval-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.search_type, SearchType::Focused);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.search_type = SearchType::Timeline;
        config.doc_types = vec!["pdf".to_string()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search_type, SearchType::Timeline);
        assert_eq!(loaded.doc_types, vec!["pdf".to_string()]);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"search_type":"detailed"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.search_type, SearchType::Detailed);
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"request_timeout_secs":0}"#).unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Invalid(_))));

        fs::write(&path, r#"{"base_url":"localhost:8080"}"#).unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_search_type_keeps_other_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"doc_types":["pdf"]}"#).unwrap();

        Config::save_search_type_to(&path, SearchType::Detailed).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.search_type, SearchType::Detailed);
        assert_eq!(config.doc_types, vec!["pdf".to_string()]);
    }

    #[test]
    fn test_save_search_type_leaves_invalid_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            Config::save_search_type_to(&path, SearchType::Timeline),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_search_params_mirror_config() {
        let mut config = Config::new();
        config.include_relationships = true;
        config.model = Some("gpt-4o-mini".to_string());
        let params = config.search_params();
        assert!(params.include_relationships);
        assert_eq!(params.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(params.search_type, SearchType::Focused);
    }
}
