//! Agent Registry Service
//!
//! Owns every registered agent, its configuration, and its tools; answers
//! "who can handle this ticket, and how confident are they?".

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::domain::error::RegistryError;
use crate::domain::models::{AgentConfig, AgentMetadata, Candidate, RegistryStatus, Tool, ToolSpec};
use crate::domain::ports::TicketAgent;

struct AgentSlot {
    config: AgentConfig,
    agent: Arc<dyn TicketAgent>,
    tools: HashMap<String, Tool>,
    shared_tools: HashMap<String, Tool>,
}

/// Registry of ticket agents. Registration order is preserved; agent names
/// are unique. Agent invocations (`can_handle`, `confidence`, tool handlers)
/// always run on a snapshot taken under the read lock, never while the lock
/// is held.
pub struct AgentRegistry {
    slots: RwLock<Vec<AgentSlot>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
        }
    }

    /// Register an agent under `config.name`. The agent's tools are
    /// collected once, here, and split into private and shared sets.
    #[instrument(skip(self, agent), fields(agent = %config.name))]
    pub async fn register(
        &self,
        config: AgentConfig,
        agent: Arc<dyn TicketAgent>,
    ) -> Result<(), RegistryError> {
        let mut slots = self.slots.write().await;
        if slots.iter().any(|s| s.config.name == config.name) {
            return Err(RegistryError::DuplicateAgent(config.name));
        }

        let mut tools = HashMap::new();
        let mut shared_tools = HashMap::new();
        for tool in agent.tools() {
            if tool.spec.shared {
                shared_tools.insert(tool.spec.name.clone(), tool);
            } else {
                tools.insert(tool.spec.name.clone(), tool);
            }
        }

        info!(
            tools = tools.len() + shared_tools.len(),
            priority = config.priority,
            "Registered agent"
        );
        slots.push(AgentSlot {
            config,
            agent,
            tools,
            shared_tools,
        });
        Ok(())
    }

    /// Remove an agent. Removing an unknown name is a silent no-op.
    #[instrument(skip(self))]
    pub async fn unregister(&self, name: &str) {
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|s| s.config.name != name);
        if slots.len() < before {
            info!("Unregistered agent");
        }
    }

    /// Look up an agent by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn TicketAgent>> {
        let slots = self.slots.read().await;
        slots
            .iter()
            .find(|s| s.config.name == name)
            .map(|s| Arc::clone(&s.agent))
    }

    /// Metadata for every registered agent, in registration order.
    pub async fn list_agents(&self) -> Vec<AgentMetadata> {
        let slots = self.slots.read().await;
        slots.iter().map(|s| AgentMetadata::from(&s.config)).collect()
    }

    /// Metadata for enabled agents only, in registration order.
    pub async fn enabled_agents(&self) -> Vec<AgentMetadata> {
        let slots = self.slots.read().await;
        slots
            .iter()
            .filter(|s| s.config.enabled)
            .map(|s| AgentMetadata::from(&s.config))
            .collect()
    }

    /// Score every enabled agent against the ticket and return candidates
    /// with confidence > 0, sorted by descending confidence then ascending
    /// priority. Confidence dominates; priority only discriminates ties.
    pub async fn candidates(&self, ticket: &str) -> Vec<Candidate> {
        let snapshot: Vec<(AgentConfig, Arc<dyn TicketAgent>)> = {
            let slots = self.slots.read().await;
            slots
                .iter()
                .filter(|s| s.config.enabled)
                .map(|s| (s.config.clone(), Arc::clone(&s.agent)))
                .collect()
        };

        let mut candidates: Vec<Candidate> = snapshot
            .into_iter()
            .filter_map(|(config, agent)| {
                let confidence = agent.confidence(ticket);
                if confidence > 0.0 {
                    Some(Candidate {
                        agent: config.name,
                        confidence,
                        priority: config.priority,
                    })
                } else {
                    None
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.priority.cmp(&b.priority))
        });

        debug!(count = candidates.len(), "Scored routing candidates");
        candidates
    }

    /// The single best candidate for the ticket, if any agent claims it.
    pub async fn find_best(&self, ticket: &str) -> Option<Candidate> {
        self.candidates(ticket).await.into_iter().next()
    }

    /// Tool descriptors for one agent, private tools first.
    pub async fn agent_tools(&self, name: &str) -> Result<Vec<ToolSpec>, RegistryError> {
        let slots = self.slots.read().await;
        let slot = slots
            .iter()
            .find(|s| s.config.name == name)
            .ok_or_else(|| RegistryError::AgentNotFound(name.to_string()))?;

        let mut specs: Vec<ToolSpec> = slot.tools.values().map(|t| t.spec.clone()).collect();
        specs.extend(slot.shared_tools.values().map(|t| t.spec.clone()));
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specs)
    }

    /// All shared tools, grouped by owning agent.
    pub async fn all_shared_tools(&self) -> BTreeMap<String, Vec<ToolSpec>> {
        let slots = self.slots.read().await;
        let mut grouped = BTreeMap::new();
        for slot in slots.iter() {
            if slot.shared_tools.is_empty() {
                continue;
            }
            let mut specs: Vec<ToolSpec> =
                slot.shared_tools.values().map(|t| t.spec.clone()).collect();
            specs.sort_by(|a, b| a.name.cmp(&b.name));
            grouped.insert(slot.config.name.clone(), specs);
        }
        grouped
    }

    /// Copy a shared tool from `source` into `target`'s shared-tool set.
    ///
    /// The tool is looked up in the source's shared set only; the copy is an
    /// independent value.
    #[instrument(skip(self))]
    pub async fn share_tool(
        &self,
        source: &str,
        target: &str,
        tool_name: &str,
    ) -> Result<(), RegistryError> {
        let mut slots = self.slots.write().await;

        let target_pos = slots
            .iter()
            .position(|s| s.config.name == target)
            .ok_or_else(|| RegistryError::AgentNotFound(target.to_string()))?;

        let tool = slots
            .iter()
            .find(|s| s.config.name == source)
            .ok_or_else(|| RegistryError::AgentNotFound(source.to_string()))?
            .shared_tools
            .get(tool_name)
            .cloned()
            .ok_or_else(|| RegistryError::ToolNotFound {
                agent: source.to_string(),
                tool: tool_name.to_string(),
            })?;

        info!("Shared tool between agents");
        slots[target_pos]
            .shared_tools
            .insert(tool.spec.name.clone(), tool);
        Ok(())
    }

    /// Invoke one of an agent's tools (private first, then shared). The
    /// handler runs after the registry lock is released.
    pub async fn execute_tool(
        &self,
        agent: &str,
        tool_name: &str,
        args: Value,
    ) -> anyhow::Result<String> {
        let tool = {
            let slots = self.slots.read().await;
            let slot = slots
                .iter()
                .find(|s| s.config.name == agent)
                .ok_or_else(|| RegistryError::AgentNotFound(agent.to_string()))?;
            slot.tools
                .get(tool_name)
                .or_else(|| slot.shared_tools.get(tool_name))
                .cloned()
                .ok_or_else(|| RegistryError::ToolNotFound {
                    agent: agent.to_string(),
                    tool: tool_name.to_string(),
                })?
        };

        tool.invoke(args).await
    }

    /// Enable or disable an agent.
    pub async fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), RegistryError> {
        let mut slots = self.slots.write().await;
        let slot = slots
            .iter_mut()
            .find(|s| s.config.name == name)
            .ok_or_else(|| RegistryError::AgentNotFound(name.to_string()))?;
        slot.config.enabled = enabled;
        info!(agent = name, enabled, "Agent enabled state changed");
        Ok(())
    }

    /// Change an agent's routing priority.
    pub async fn set_priority(&self, name: &str, priority: i32) -> Result<(), RegistryError> {
        let mut slots = self.slots.write().await;
        let slot = slots
            .iter_mut()
            .find(|s| s.config.name == name)
            .ok_or_else(|| RegistryError::AgentNotFound(name.to_string()))?;
        slot.config.priority = priority;
        info!(agent = name, priority, "Agent priority changed");
        Ok(())
    }

    /// Population summary.
    pub async fn status(&self) -> RegistryStatus {
        let agents = self.list_agents().await;
        let enabled = agents.iter().filter(|a| a.enabled).count();
        RegistryStatus {
            total_agents: agents.len(),
            enabled_agents: enabled,
            disabled_agents: agents.len() - enabled,
            agents,
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
