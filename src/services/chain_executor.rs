//! Chain Execution Service
//!
//! Runs named, ordered agent pipelines against one ticket. A step that
//! declines the ticket is a skip, not a failure; a step that fails never
//! aborts the pipeline. The chain's output is the last processing agent's
//! output.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::domain::error::ChainError;
use crate::domain::models::{ChainInfo, ChainRunResult, ChainStatus, StepResult};
use crate::services::{AgentMonitor, AgentRegistry};

/// Executor for named agent chains. Chains reference registry agents by
/// name; membership is validated at creation and update time, not on every
/// run.
pub struct ChainExecutor {
    registry: Arc<AgentRegistry>,
    monitor: Arc<AgentMonitor>,
    chains: RwLock<HashMap<String, Vec<String>>>,
}

impl ChainExecutor {
    pub fn new(registry: Arc<AgentRegistry>, monitor: Arc<AgentMonitor>) -> Self {
        Self {
            registry,
            monitor,
            chains: RwLock::new(HashMap::new()),
        }
    }

    /// Create a chain. Creation is not idempotent: an existing name fails.
    #[instrument(skip(self, agents))]
    pub async fn create_chain(&self, name: &str, agents: Vec<String>) -> Result<(), ChainError> {
        self.validate_members(name, &agents).await?;

        let mut chains = self.chains.write().await;
        if chains.contains_key(name) {
            return Err(ChainError::DuplicateChain(name.to_string()));
        }
        info!(agents = ?agents, "Created chain");
        chains.insert(name.to_string(), agents);
        Ok(())
    }

    /// Replace an existing chain's member list.
    #[instrument(skip(self, agents))]
    pub async fn update_chain(&self, name: &str, agents: Vec<String>) -> Result<(), ChainError> {
        self.validate_members(name, &agents).await?;

        let mut chains = self.chains.write().await;
        let entry = chains
            .get_mut(name)
            .ok_or_else(|| ChainError::ChainNotFound(name.to_string()))?;
        info!(agents = ?agents, "Updated chain");
        *entry = agents;
        Ok(())
    }

    /// Delete a chain.
    #[instrument(skip(self))]
    pub async fn delete_chain(&self, name: &str) -> Result<(), ChainError> {
        let mut chains = self.chains.write().await;
        chains
            .remove(name)
            .map(|_| info!("Deleted chain"))
            .ok_or_else(|| ChainError::ChainNotFound(name.to_string()))
    }

    /// Member names of one chain, if it exists.
    pub async fn get_chain(&self, name: &str) -> Option<Vec<String>> {
        let chains = self.chains.read().await;
        chains.get(name).cloned()
    }

    /// All chains, sorted by name.
    pub async fn list_chains(&self) -> Vec<ChainInfo> {
        let chains = self.chains.read().await;
        let mut infos: Vec<ChainInfo> = chains
            .iter()
            .map(|(name, agents)| ChainInfo {
                name: name.clone(),
                agents: agents.clone(),
                length: agents.len(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Summary of the chain map.
    pub async fn status(&self) -> ChainStatus {
        let chains = self.list_chains().await;
        let total_members: usize = chains.iter().map(|c| c.length).sum();
        let average = if chains.is_empty() {
            0.0
        } else {
            total_members as f64 / chains.len() as f64
        };
        ChainStatus {
            total_chains: chains.len(),
            total_agents_in_chains: total_members,
            average_chain_length: average,
            chains,
        }
    }

    /// Run a chain against a ticket.
    ///
    /// An unknown chain fails immediately with no monitor record. Otherwise
    /// every member runs in order; a failed step is recorded and the run
    /// continues. The deadline is checked between steps only: when it
    /// expires, no further steps are issued and already-collected step
    /// results are preserved.
    #[instrument(skip(self, ticket, deadline))]
    pub async fn run(
        &self,
        name: &str,
        ticket: &str,
        deadline: Option<Instant>,
    ) -> Result<ChainRunResult, ChainError> {
        let members = self
            .get_chain(name)
            .await
            .ok_or_else(|| ChainError::ChainNotFound(name.to_string()))?;

        let started = Instant::now();
        let mut steps: Vec<StepResult> = Vec::with_capacity(members.len());
        let mut final_result = String::new();
        let mut deadline_exceeded = false;

        info!(steps = members.len(), "Running chain");

        for member in &members {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(completed = steps.len(), "Chain deadline exceeded");
                deadline_exceeded = true;
                break;
            }

            // Members may have been unregistered since the chain was built.
            let Some(agent) = self.registry.get(member).await else {
                warn!(agent = %member, "Chain member not registered");
                steps.push(StepResult::failed(member, "agent not registered"));
                continue;
            };

            if !agent.can_handle(ticket) {
                debug!(agent = %member, "Step skipped");
                steps.push(StepResult::skipped(member));
                continue;
            }

            match agent.process(ticket).await {
                Ok(output) => {
                    debug!(agent = %member, "Step processed");
                    final_result = output.clone();
                    steps.push(StepResult::processed(member, output));
                }
                Err(e) => {
                    warn!(agent = %member, error = %e, "Step failed; continuing");
                    steps.push(StepResult::failed(member, e.to_string()));
                }
            }
        }

        let processed_agents = steps.iter().filter(|s| s.processed).count();
        let successful_agents = steps.iter().filter(|s| s.success).count();
        let success = !deadline_exceeded && successful_agents == steps.len();
        let error = deadline_exceeded.then(|| "deadline exceeded".to_string());

        let result = ChainRunResult {
            success,
            result: final_result,
            chain_name: name.to_string(),
            total_agents: steps.len(),
            processed_agents,
            successful_agents,
            chain_results: steps,
            error,
        };

        self.monitor
            .record(
                &format!("chain_{name}"),
                result.success,
                started.elapsed().as_secs_f64(),
                result.error.as_deref(),
            )
            .await;

        Ok(result)
    }

    /// Pick the chain whose members are collectively most confident about
    /// the ticket. A chain's score is the mean member confidence; only a
    /// score above 0.5 is a match. Chains are scanned in name order so ties
    /// resolve deterministically.
    pub async fn auto_detect(&self, ticket: &str) -> Option<String> {
        let snapshot: Vec<(String, Vec<String>)> = {
            let chains = self.chains.read().await;
            let mut entries: Vec<_> = chains
                .iter()
                .map(|(n, a)| (n.clone(), a.clone()))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            entries
        };

        let mut best: Option<(String, f64)> = None;
        for (name, members) in snapshot {
            let score = self.chain_score(&members, ticket).await;
            debug!(chain = %name, score, "Scored chain");
            if best.as_ref().is_none_or(|(_, s)| score > *s) {
                best = Some((name, score));
            }
        }

        best.filter(|(_, score)| *score > 0.5).map(|(name, _)| name)
    }

    async fn chain_score(&self, members: &[String], ticket: &str) -> f64 {
        if members.is_empty() {
            return 0.0;
        }
        let mut total = 0.0;
        for member in members {
            if let Some(agent) = self.registry.get(member).await {
                total += agent.confidence(ticket);
            }
        }
        total / members.len() as f64
    }

    async fn validate_members(&self, chain: &str, agents: &[String]) -> Result<(), ChainError> {
        for agent in agents {
            if self.registry.get(agent).await.is_none() {
                return Err(ChainError::UnknownAgent {
                    chain: chain.to_string(),
                    agent: agent.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::AgentConfig;
    use crate::domain::ports::TicketAgent;
    use async_trait::async_trait;
    use serde_json::{Map, Value};

    struct StepAgent {
        handles: bool,
        fail: bool,
        output: &'static str,
        confidence: f64,
    }

    #[async_trait]
    impl TicketAgent for StepAgent {
        fn can_handle(&self, _ticket: &str) -> bool {
            self.handles
        }

        fn extract_info(&self, _ticket: &str) -> Map<String, Value> {
            Map::new()
        }

        async fn process(&self, _ticket: &str) -> anyhow::Result<String> {
            if self.fail {
                anyhow::bail!("step blew up");
            }
            Ok(self.output.to_string())
        }

        fn confidence(&self, _ticket: &str) -> f64 {
            self.confidence
        }
    }

    async fn setup(agents: Vec<(&str, bool, bool, &'static str, f64)>) -> ChainExecutor {
        let registry = Arc::new(AgentRegistry::new());
        for (name, handles, fail, output, confidence) in agents {
            registry
                .register(
                    AgentConfig::new(name, "test"),
                    Arc::new(StepAgent { handles, fail, output, confidence }),
                )
                .await
                .unwrap();
        }
        ChainExecutor::new(registry, Arc::new(AgentMonitor::new(10)))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_requires_known_agents() {
        let executor = setup(vec![("a", true, false, "out", 0.5)]).await;
        let err = executor
            .create_chain("c", names(&["a", "ghost"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::UnknownAgent { .. }));
    }

    #[tokio::test]
    async fn test_create_not_idempotent() {
        let executor = setup(vec![("a", true, false, "out", 0.5)]).await;
        executor.create_chain("c", names(&["a"])).await.unwrap();
        let err = executor.create_chain("c", names(&["a"])).await.unwrap_err();
        assert!(matches!(err, ChainError::DuplicateChain(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_require_existing_chain() {
        let executor = setup(vec![("a", true, false, "out", 0.5)]).await;
        assert!(matches!(
            executor.update_chain("ghost", names(&["a"])).await,
            Err(ChainError::ChainNotFound(_))
        ));
        assert!(matches!(
            executor.delete_chain("ghost").await,
            Err(ChainError::ChainNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_member_list() {
        let executor = setup(vec![
            ("a", true, false, "a-out", 0.5),
            ("b", true, false, "b-out", 0.5),
        ])
        .await;
        executor.create_chain("c", names(&["a"])).await.unwrap();
        executor.update_chain("c", names(&["b"])).await.unwrap();

        let chains = executor.list_chains().await;
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].agents, names(&["b"]));
    }

    #[tokio::test]
    async fn test_run_unknown_chain_fails_without_record() {
        let executor = setup(vec![]).await;
        assert!(matches!(
            executor.run("ghost", "ticket", None).await,
            Err(ChainError::ChainNotFound(_))
        ));
        let stats = executor.monitor.system_stats().await;
        assert_eq!(stats.total_requests, 0);
    }

    #[tokio::test]
    async fn test_skip_is_not_failure() {
        let executor = setup(vec![
            ("a", false, false, "a-out", 0.0),
            ("b", true, false, "b-out", 0.5),
        ])
        .await;
        executor.create_chain("c", names(&["a", "b"])).await.unwrap();

        let run = executor.run("c", "ticket", None).await.unwrap();
        assert!(run.success);
        assert_eq!(run.result, "b-out");
        assert_eq!(run.total_agents, 2);
        assert_eq!(run.processed_agents, 1);
        assert_eq!(run.successful_agents, 2);

        assert!(run.chain_results[0].success);
        assert!(!run.chain_results[0].processed);
        assert!(run.chain_results[1].success);
        assert!(run.chain_results[1].processed);
    }

    #[tokio::test]
    async fn test_failure_continues_and_marks_run_failed() {
        let executor = setup(vec![
            ("a", true, true, "a-out", 0.5),
            ("b", true, false, "b-out", 0.5),
        ])
        .await;
        executor.create_chain("c", names(&["a", "b"])).await.unwrap();

        let run = executor.run("c", "ticket", None).await.unwrap();
        assert!(!run.success);
        // Second step still executed and provides the final result
        assert_eq!(run.result, "b-out");
        assert_eq!(run.chain_results.len(), 2);
        assert!(!run.chain_results[0].success);
        assert_eq!(run.chain_results[0].error.as_deref(), Some("step blew up"));
        assert!(run.chain_results[1].processed);
    }

    #[tokio::test]
    async fn test_later_output_overwrites_earlier() {
        let executor = setup(vec![
            ("a", true, false, "first", 0.5),
            ("b", true, false, "second", 0.5),
        ])
        .await;
        executor.create_chain("c", names(&["a", "b"])).await.unwrap();

        let run = executor.run("c", "ticket", None).await.unwrap();
        assert_eq!(run.result, "second");
    }

    #[tokio::test]
    async fn test_unregistered_member_is_failed_step() {
        let executor = setup(vec![
            ("a", true, false, "a-out", 0.5),
            ("b", true, false, "b-out", 0.5),
        ])
        .await;
        executor.create_chain("c", names(&["a", "b"])).await.unwrap();
        executor.registry.unregister("a").await;

        let run = executor.run("c", "ticket", None).await.unwrap();
        assert!(!run.success);
        assert_eq!(
            run.chain_results[0].error.as_deref(),
            Some("agent not registered")
        );
        assert!(run.chain_results[1].processed);
    }

    #[tokio::test]
    async fn test_expired_deadline_stops_issuing_steps() {
        let executor = setup(vec![("a", true, false, "a-out", 0.5)]).await;
        executor.create_chain("c", names(&["a"])).await.unwrap();

        let past = Instant::now() - std::time::Duration::from_secs(1);
        let run = executor.run("c", "ticket", Some(past)).await.unwrap();

        assert!(!run.success);
        assert_eq!(run.error.as_deref(), Some("deadline exceeded"));
        assert!(run.chain_results.is_empty());
    }

    #[tokio::test]
    async fn test_run_records_under_chain_key() {
        let executor = setup(vec![("a", true, false, "a-out", 0.5)]).await;
        executor.create_chain("c", names(&["a"])).await.unwrap();
        executor.run("c", "ticket", None).await.unwrap();

        let stats = executor.monitor.agent_stats("chain_c").await;
        assert_eq!(stats.successful_requests, 1);
    }

    #[tokio::test]
    async fn test_auto_detect_threshold() {
        let executor = setup(vec![
            ("confident", true, false, "out", 0.9),
            ("meh", true, false, "out", 0.2),
        ])
        .await;
        executor
            .create_chain("good", names(&["confident"]))
            .await
            .unwrap();
        executor.create_chain("weak", names(&["meh"])).await.unwrap();

        assert_eq!(executor.auto_detect("ticket").await.as_deref(), Some("good"));

        executor.delete_chain("good").await.unwrap();
        assert!(executor.auto_detect("ticket").await.is_none());
    }

    #[tokio::test]
    async fn test_status_summary() {
        let executor = setup(vec![
            ("a", true, false, "out", 0.5),
            ("b", true, false, "out", 0.5),
        ])
        .await;
        executor.create_chain("one", names(&["a"])).await.unwrap();
        executor.create_chain("two", names(&["a", "b"])).await.unwrap();

        let status = executor.status().await;
        assert_eq!(status.total_chains, 2);
        assert_eq!(status.total_agents_in_chains, 3);
        assert!((status.average_chain_length - 1.5).abs() < f64::EPSILON);
    }
}
