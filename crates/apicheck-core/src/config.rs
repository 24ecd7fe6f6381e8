//! Project configuration for contract runs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the API under verification
    pub base_url: String,

    /// Default HTTP headers sent with every request (Auth, Accept, etc.)
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Named values seeded as bindings into every scenario
    /// (API keys, entity IDs); referenced as `{{name}}` in suite files.
    #[serde(default)]
    pub params: HashMap<String, String>,

    /// Scenario suite files to run
    #[serde(default)]
    pub suites: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            headers: HashMap::new(),
            params: HashMap::new(),
            suites: vec![PathBuf::from("scenarios.toml")],
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.apicheck.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".apicheck.toml", ".apicheck.json", "apicheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Config params as the initial binding set of every scenario.
    #[must_use]
    pub fn seed_bindings(&self) -> HashMap<String, serde_json::Value> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect()
    }

    /// Create example config file
    #[must_use]
    pub fn example() -> &'static str {
        r#"# apicheck configuration

# API under verification
base_url = "https://api.github.com"

# Scenario suite files
suites = ["scenarios.toml"]

# HTTP headers sent with every request (auth, accept)
[headers]
Accept = "application/json"
# Authorization = "Bearer your-token-here"

# Values available as {{name}} bindings in every scenario
# (API keys, well-known entity IDs)
[params]
# api_key = "your-api-key"
# org = "cucumber"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.suites, vec![PathBuf::from("scenarios.toml")]);
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
base_url = "https://api.github.com"
suites = ["github.toml", "houses.yaml"]

[headers]
Accept = "application/json"

[params]
org = "cucumber"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.base_url, "https://api.github.com");
        assert_eq!(
            config.suites,
            vec![PathBuf::from("github.toml"), PathBuf::from("houses.yaml")]
        );
        assert_eq!(
            config.headers.get("Accept"),
            Some(&"application/json".to_string())
        );
        assert_eq!(config.params.get("org"), Some(&"cucumber".to_string()));
    }

    #[test]
    fn example_config_parses() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert_eq!(config.base_url, "https://api.github.com");
        assert!(!config.suites.is_empty());
    }

    #[test]
    fn seed_bindings_are_strings() {
        let mut config = Config::default();
        config
            .params
            .insert("api_key".to_string(), "secret".to_string());
        let seeds = config.seed_bindings();
        assert_eq!(seeds.get("api_key"), Some(&serde_json::json!("secret")));
    }

    #[test]
    fn load_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url": "http://localhost:3000"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/.apicheck.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
