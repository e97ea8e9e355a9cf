use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_MATCH_THRESHOLD, DEFAULT_SAMPLE_INTERVAL};

pub const ENV_ENDPOINT: &str = "ROLLCALL_ENDPOINT";
pub const ENV_API_KEY: &str = "ROLLCALL_API_KEY";
pub const ENV_REGION: &str = "ROLLCALL_REGION";

/// Provider connection and pipeline settings.
///
/// Loaded from a JSON file under the user config directory, with
/// credentials and endpoint overridable from the environment — the
/// hosting environment supplies them in deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub region: String,
    #[serde(default = "default_threshold")]
    pub match_threshold: f32,
    #[serde(default = "default_interval")]
    pub sample_interval: usize,
}

fn default_threshold() -> f32 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_interval() -> usize {
    DEFAULT_SAMPLE_INTERVAL
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            api_key: None,
            region: "us-east-2".to_string(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Rollcall").join("settings.json"))
    }

    /// Loads the settings file, falling back to defaults, then applies
    /// environment overrides from the real process environment.
    pub fn load() -> Self {
        let base: Self = Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Writes the settings file under the user config directory.
    pub fn save(&self) -> std::io::Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| std::io::Error::other("could not determine config directory"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)
    }

    /// Applies endpoint/key/region overrides from an environment lookup.
    /// Injected as a closure so tests don't mutate the process environment.
    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = var(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(key) = var(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(region) = var(ENV_REGION) {
            self.region = region;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.match_threshold, DEFAULT_MATCH_THRESHOLD);
        assert_eq!(s.sample_interval, DEFAULT_SAMPLE_INTERVAL);
        assert!(s.api_key.is_none());
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        let s = Settings::default().with_env_overrides(|name| match name {
            ENV_ENDPOINT => Some("https://rek.example.com".to_string()),
            ENV_API_KEY => Some("secret".to_string()),
            _ => None,
        });
        assert_eq!(s.endpoint, "https://rek.example.com");
        assert_eq!(s.api_key.as_deref(), Some("secret"));
        assert_eq!(s.region, Settings::default().region);
    }

    #[test]
    fn test_missing_env_leaves_settings_untouched() {
        let s = Settings::default().with_env_overrides(|_| None);
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let s = Settings {
            endpoint: "https://api.example.com".to_string(),
            api_key: Some("k".to_string()),
            region: "eu-west-1".to_string(),
            match_threshold: 80.0,
            sample_interval: 3,
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_save_to_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Rollcall").join("settings.json");
        let s = Settings {
            endpoint: "https://api.example.com".to_string(),
            api_key: Some("k".to_string()),
            region: "eu-west-1".to_string(),
            match_threshold: 80.0,
            sample_interval: 3,
        };

        // Parent directories are created on first save.
        s.save_to(&path).unwrap();
        let back: Settings =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let back: Settings =
            serde_json::from_str(r#"{"endpoint": "http://x", "region": "us-east-2"}"#).unwrap();
        assert_eq!(back.match_threshold, DEFAULT_MATCH_THRESHOLD);
        assert_eq!(back.sample_interval, DEFAULT_SAMPLE_INTERVAL);
    }
}
