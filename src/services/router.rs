//! Ticket Routing Service
//!
//! Picks the single best agent for one ticket and invokes it, reporting the
//! outcome to the monitor. A ticket no agent claims is a normal terminal
//! outcome, not an error.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::models::{AgentMetadata, RouteOutcome, TicketAnalysis};
use crate::services::{AgentMonitor, AgentRegistry};

/// Dispatcher for single-agent ticket handling.
pub struct TicketRouter {
    registry: Arc<AgentRegistry>,
    monitor: Arc<AgentMonitor>,
}

impl TicketRouter {
    pub fn new(registry: Arc<AgentRegistry>, monitor: Arc<AgentMonitor>) -> Self {
        Self { registry, monitor }
    }

    /// Score the ticket against every enabled agent without invoking anyone.
    pub async fn analyze(&self, ticket: &str) -> TicketAnalysis {
        let candidates = self.registry.candidates(ticket).await;
        let best = candidates.first();

        let agent_metadata = match best {
            Some(candidate) => self
                .registry
                .list_agents()
                .await
                .into_iter()
                .find(|a| a.name == candidate.agent),
            None => None,
        };

        TicketAnalysis {
            best_agent: best.map(|c| c.agent.clone()),
            confidence: best.map_or(0.0, |c| c.confidence),
            candidates,
            agent_metadata,
        }
    }

    /// Route a ticket to the best agent and process it.
    pub async fn route(&self, ticket: &str) -> RouteOutcome {
        self.route_with_deadline(ticket, None).await
    }

    /// Route with an optional deadline, checked after analysis and before
    /// the agent is invoked (agent invocations are never interrupted
    /// mid-flight).
    #[instrument(skip(self, ticket), fields(request_id = %Uuid::new_v4()))]
    pub async fn route_with_deadline(
        &self,
        ticket: &str,
        deadline: Option<Instant>,
    ) -> RouteOutcome {
        let started = Instant::now();
        let analysis = self.analyze(ticket).await;

        let Some(best_agent) = analysis.best_agent.clone() else {
            info!("No suitable agent; ticket requires manual handling");
            let outcome = RouteOutcome::unhandled(analysis);
            self.record(&outcome, started).await;
            return outcome;
        };

        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(agent = %best_agent, "Deadline exceeded before dispatch");
            let outcome = RouteOutcome {
                processed: false,
                result: "routing aborted: deadline exceeded".to_string(),
                agent_used: "unknown".to_string(),
                error: Some("deadline exceeded".to_string()),
                analysis,
            };
            self.record(&outcome, started).await;
            return outcome;
        }

        // The agent may have been unregistered between scoring and dispatch.
        let Some(agent) = self.registry.get(&best_agent).await else {
            warn!(agent = %best_agent, "Best agent vanished before dispatch");
            let outcome = RouteOutcome {
                processed: false,
                result: "routing failed".to_string(),
                agent_used: "unknown".to_string(),
                error: Some(format!("agent '{best_agent}' not found")),
                analysis,
            };
            self.record(&outcome, started).await;
            return outcome;
        };

        info!(agent = %best_agent, confidence = analysis.confidence, "Dispatching ticket");

        let outcome = match agent.process(ticket).await {
            Ok(result) => RouteOutcome {
                processed: true,
                result,
                agent_used: best_agent,
                error: None,
                analysis,
            },
            Err(e) => {
                let message = e.to_string();
                warn!(agent = %best_agent, error = %message, "Agent processing failed");
                RouteOutcome {
                    processed: false,
                    result: format!("agent processing failed: {message}"),
                    agent_used: best_agent,
                    error: Some(message),
                    analysis,
                }
            }
        };

        self.record(&outcome, started).await;
        outcome
    }

    async fn record(&self, outcome: &RouteOutcome, started: Instant) {
        self.monitor
            .record(
                &outcome.agent_used,
                outcome.processed,
                started.elapsed().as_secs_f64(),
                outcome.error.as_deref(),
            )
            .await;
    }

    /// Metadata listing passthrough for front ends.
    pub async fn list_available_agents(&self) -> Vec<AgentMetadata> {
        self.registry.list_agents().await
    }
}
