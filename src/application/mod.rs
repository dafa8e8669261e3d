//! Application wiring.
//!
//! `TriageSystem` is the explicit handle that owns the registry, router,
//! chain executor and monitor. Callers construct it from configuration and
//! pass it around; there is no process-global instance.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{info, instrument};

use crate::adapters::AgentFactory;
use crate::domain::error::ChainError;
use crate::domain::models::{AgentConfig, ChainRunResult, Config, RouteOutcome};
use crate::domain::ports::TicketApi;
use crate::infrastructure::api::HttpTicketApi;
use crate::infrastructure::config::{ConfigError, ConfigLoader};
use crate::services::{AgentMonitor, AgentRegistry, ChainExecutor, TicketRouter};

pub struct TriageSystem {
    registry: Arc<AgentRegistry>,
    monitor: Arc<AgentMonitor>,
    router: TicketRouter,
    chains: ChainExecutor,
}

impl std::fmt::Debug for TriageSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageSystem").finish_non_exhaustive()
    }
}

impl TriageSystem {
    /// Build the full system from configuration with the HTTP API backend.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let api: Arc<dyn TicketApi> = Arc::new(HttpTicketApi::new(&config.system)?);
        Self::with_api(config, api, &AgentFactory::builtin()).await
    }

    /// Build the system with an explicit API implementation and factory.
    /// This is the seam tests and embedders use to swap out the backend.
    #[instrument(skip_all)]
    pub async fn with_api(
        config: &Config,
        api: Arc<dyn TicketApi>,
        factory: &AgentFactory,
    ) -> Result<Self> {
        ConfigLoader::validate(config)?;

        let registry = Arc::new(AgentRegistry::new());
        let monitor = Arc::new(AgentMonitor::new(config.monitor.window_size));

        for entry in &config.agents {
            let agent = factory.build(&entry.kind, Arc::clone(&api)).ok_or(
                ConfigError::UnknownAgentKind {
                    kind: entry.kind.clone(),
                    name: entry.name.clone(),
                },
            )?;

            let mut agent_config = AgentConfig::new(&entry.name, &entry.description)
                .with_priority(entry.priority);
            if !entry.enabled {
                agent_config = agent_config.disabled();
            }
            registry.register(agent_config, agent).await?;
        }

        let chains = ChainExecutor::new(Arc::clone(&registry), Arc::clone(&monitor));
        for entry in &config.chains {
            chains.create_chain(&entry.name, entry.agents.clone()).await?;
        }

        info!(
            agents = config.agents.len(),
            chains = config.chains.len(),
            "Triage system initialized"
        );

        Ok(Self {
            router: TicketRouter::new(Arc::clone(&registry), Arc::clone(&monitor)),
            chains,
            registry,
            monitor,
        })
    }

    /// Route one ticket to its best agent.
    pub async fn process_ticket(&self, ticket: &str) -> RouteOutcome {
        self.router.route(ticket).await
    }

    /// Run one ticket through a named chain.
    pub async fn process_with_chain(
        &self,
        chain: &str,
        ticket: &str,
        deadline: Option<Instant>,
    ) -> Result<ChainRunResult, ChainError> {
        self.chains.run(chain, ticket, deadline).await
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn monitor(&self) -> &AgentMonitor {
        &self.monitor
    }

    pub fn router(&self) -> &TicketRouter {
        &self.router
    }

    pub fn chains(&self) -> &ChainExecutor {
        &self.chains
    }
}
