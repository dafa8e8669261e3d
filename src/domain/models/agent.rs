use serde::{Deserialize, Serialize};

/// Configuration for a registered agent.
///
/// Created at registration time and owned by the registry. The only fields
/// that may change afterwards are `enabled` and `priority`, through explicit
/// registry updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique agent name within the registry
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Priority tie-break among equal-confidence agents; lower value wins
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Disabled agents are invisible to routing and scoring
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_priority() -> i32 {
    10
}

fn default_enabled() -> bool {
    true
}

impl AgentConfig {
    /// Create a config with default priority (10) and enabled state.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority: default_priority(),
            enabled: default_enabled(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Serializable snapshot of an agent's registration metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub name: String,
    pub description: String,
    pub priority: i32,
    pub enabled: bool,
}

impl From<&AgentConfig> for AgentMetadata {
    fn from(config: &AgentConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            priority: config.priority,
            enabled: config.enabled,
        }
    }
}

/// Summary of the registry population.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatus {
    pub total_agents: usize,
    pub enabled_agents: usize,
    pub disabled_agents: usize,
    pub agents: Vec<AgentMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AgentConfig::new("quota_agent", "handles quota requests");
        assert_eq!(config.priority, 10);
        assert!(config.enabled);
    }

    #[test]
    fn test_config_builders() {
        let config = AgentConfig::new("a", "b").with_priority(5).disabled();
        assert_eq!(config.priority, 5);
        assert!(!config.enabled);
    }

    #[test]
    fn test_yaml_defaults_applied() {
        let yaml = "name: quota_agent\ndescription: quota\n";
        let config: AgentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.priority, 10);
        assert!(config.enabled);
    }

    #[test]
    fn test_metadata_snapshot() {
        let config = AgentConfig::new("a", "desc").with_priority(3);
        let meta = AgentMetadata::from(&config);
        assert_eq!(meta.name, "a");
        assert_eq!(meta.priority, 3);
        assert!(meta.enabled);
    }
}
