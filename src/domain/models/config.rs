use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub system: SystemSettings,
    pub logging: LoggingConfig,
    pub monitor: MonitorConfig,
    /// Agents to instantiate through the factory at startup
    pub agents: Vec<AgentEntry>,
    /// Chains to create at startup
    pub chains: Vec<ChainEntry>,
}

/// Outbound API endpoints and HTTP behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSettings {
    pub quota_api_url: String,
    pub project_api_url: String,
    pub ticket_api_url: String,
    pub request_timeout_secs: u64,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            quota_api_url: "https://api.example.com/quota".to_string(),
            project_api_url: "https://api.example.com/projects".to_string(),
            ticket_api_url: "https://api.example.com/tickets".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace | debug | info | warn | error
    pub level: String,
    /// json | pretty
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Capacity of the recent-request window
    pub window_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { window_size: 100 }
    }
}

/// One agent to construct at startup. `kind` selects a constructor from the
/// factory; arbitrary code paths are never resolved from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_priority() -> i32 {
    10
}

fn default_enabled() -> bool {
    true
}

/// One chain to create at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEntry {
    pub name: String,
    pub agents: Vec<String>,
}

impl Config {
    /// The stock setup: the three built-in agents and the three standard
    /// chains, mirroring what `triage init` would write out.
    pub fn builtin() -> Self {
        Self {
            agents: vec![
                AgentEntry {
                    kind: "business_logic".to_string(),
                    name: "business_logic_agent".to_string(),
                    description: "screens tickets for compliance and risk".to_string(),
                    priority: 5,
                    enabled: true,
                },
                AgentEntry {
                    kind: "quota".to_string(),
                    name: "quota_agent".to_string(),
                    description: "handles quota adjustment requests".to_string(),
                    priority: 10,
                    enabled: true,
                },
                AgentEntry {
                    kind: "project".to_string(),
                    name: "project_agent".to_string(),
                    description: "handles project creation requests".to_string(),
                    priority: 10,
                    enabled: true,
                },
            ],
            chains: vec![
                ChainEntry {
                    name: "full_processing".to_string(),
                    agents: vec![
                        "business_logic_agent".to_string(),
                        "quota_agent".to_string(),
                        "project_agent".to_string(),
                    ],
                },
                ChainEntry {
                    name: "quota_only".to_string(),
                    agents: vec![
                        "business_logic_agent".to_string(),
                        "quota_agent".to_string(),
                    ],
                },
                ChainEntry {
                    name: "project_only".to_string(),
                    agents: vec![
                        "business_logic_agent".to_string(),
                        "project_agent".to_string(),
                    ],
                },
            ],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.monitor.window_size, 100);
        assert_eq!(config.system.request_timeout_secs, 30);
        assert!(config.agents.is_empty());
    }

    #[test]
    fn test_builtin_setup() {
        let config = Config::builtin();
        assert_eq!(config.agents.len(), 3);
        assert_eq!(config.chains.len(), 3);
        assert_eq!(config.agents[0].priority, 5);
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r"
logging:
  level: debug
monitor:
  window_size: 25
agents:
  - kind: quota
    name: q
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.monitor.window_size, 25);
        assert_eq!(config.agents.len(), 1);
        assert_eq!(config.agents[0].priority, 10);
        assert!(config.agents[0].enabled);
    }
}
