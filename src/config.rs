//! Configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModulusConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Model names (normalized or package names) excluded from discovery
    pub disabled_models: Vec<String>,
}

impl Default for ModulusConfig {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            api_port: default_api_port(),
            disabled_models: Vec::new(),
        }
    }
}

impl ModulusConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(host) = std::env::var("MODULUS_API_HOST") {
            config.api_host = host;
        }
        if let Ok(port) = std::env::var("MODULUS_API_PORT") {
            config.api_port = port.parse().context("Invalid MODULUS_API_PORT value")?;
        }
        if let Ok(disabled) = std::env::var("MODULUS_DISABLED_MODELS") {
            config.disabled_models = parse_list(&disabled);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_port < 1024 {
            anyhow::bail!("API port must be >= 1024 (got {})", self.api_port);
        }
        if self.api_host.trim().is_empty() {
            anyhow::bail!("API host cannot be empty");
        }
        if self.disabled_models.iter().any(|m| m.trim().is_empty()) {
            anyhow::bail!("Disabled model names cannot be empty");
        }

        Ok(())
    }

    /// Socket address string for the API listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Split a comma-separated list, dropping blanks
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// Default functions
fn default_api_host() -> String {
    "0.0.0.0".to_string()
}
fn default_api_port() -> u16 {
    8000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModulusConfig::default();
        assert_eq!(config.api_port, 8000);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_validation() {
        let config = ModulusConfig {
            api_port: 500, // Below 1024
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host_rejected() {
        let config = ModulusConfig {
            api_host: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_disabled_name_rejected() {
        let config = ModulusConfig {
            disabled_models: vec!["decision_tree".to_string(), "".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ModulusConfig = toml::from_str("api_port = 9100").unwrap();
        assert_eq!(config.api_port, 9100);
        assert_eq!(config.api_host, "0.0.0.0");
        assert!(config.disabled_models.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modulus.toml");
        std::fs::write(
            &path,
            "api_host = \"127.0.0.1\"\ndisabled_models = [\"linear_regression\"]\n",
        )
        .unwrap();

        let config = ModulusConfig::load(Some(path)).unwrap();
        assert_eq!(config.api_host, "127.0.0.1");
        assert_eq!(config.disabled_models, vec!["linear_regression"]);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ModulusConfig::load(Some(PathBuf::from("/nonexistent/modulus.toml"))).is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" decision_tree, ,linear_regression "),
            vec!["decision_tree", "linear_regression"]
        );
        assert!(parse_list("").is_empty());
    }
}
