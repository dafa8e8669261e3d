use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid monitor window_size: {0}. Must be at least 1")]
    InvalidWindowSize(usize),

    #[error("Invalid request_timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Duplicate agent name: {0}")]
    DuplicateAgentName(String),

    #[error("Chain '{0}' has no agents")]
    EmptyChain(String),

    #[error("Unknown agent kind '{kind}' for agent '{name}'")]
    UnknownAgentKind { kind: String, name: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (the stock agents and chains)
    /// 2. triage.yaml in the working directory
    /// 3. Environment variables (TRIAGE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::builtin()))
            .merge(Yaml::file("triage.yaml"))
            .merge(Env::prefixed("TRIAGE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::builtin()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.monitor.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize(config.monitor.window_size));
        }

        if config.system.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                config.system.request_timeout_secs,
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for agent in &config.agents {
            if agent.name.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "agent name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::DuplicateAgentName(agent.name.clone()));
            }
        }

        for chain in &config.chains {
            if chain.agents.is_empty() {
                return Err(ConfigError::EmptyChain(chain.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AgentEntry, ChainEntry};
    use std::io::Write;

    #[test]
    fn test_builtin_config_is_valid() {
        let config = Config::builtin();
        ConfigLoader::validate(&config).expect("builtin config should be valid");
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_zero_window_size() {
        let mut config = Config::default();
        config.monitor.window_size = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidWindowSize(0))
        ));
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = Config::default();
        config.system.request_timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTimeout(0))
        ));
    }

    #[test]
    fn test_duplicate_agent_name() {
        let mut config = Config::default();
        let entry = AgentEntry {
            kind: "quota".to_string(),
            name: "twin".to_string(),
            description: String::new(),
            priority: 10,
            enabled: true,
        };
        config.agents = vec![entry.clone(), entry];
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::DuplicateAgentName(_))
        ));
    }

    #[test]
    fn test_empty_chain() {
        let mut config = Config::default();
        config.chains = vec![ChainEntry {
            name: "hollow".to_string(),
            agents: vec![],
        }];
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyChain(_))
        ));
    }

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "logging:\n  level: debug\nmonitor:\n  window_size: 7\n"
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.monitor.window_size, 7);
        // Defaults shine through for everything not in the file
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.agents.len(), 3);
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  level: loudest\n").unwrap();
        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = ConfigLoader::load_from_file("/nonexistent/triage.yaml").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.chains.len(), 3);
    }
}
