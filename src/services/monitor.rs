//! Agent Monitoring Service
//!
//! Aggregates per-agent and system-wide request counters and keeps a bounded
//! window of recent activity. Fed by both the router and the chain executor.

use std::collections::{HashMap, VecDeque};

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::models::{
    AgentMetrics, AgentStats, MonitorReport, PerformanceEntry, RequestRecord, SystemStats,
};

struct MonitorState {
    metrics: HashMap<String, AgentMetrics>,
    recent: VecDeque<RequestRecord>,
    started_at: chrono::DateTime<Utc>,
}

/// Metrics sink for the dispatch engine.
///
/// The append-and-evict on the recent window happens under a single write
/// acquisition, so readers never observe a window above capacity.
pub struct AgentMonitor {
    state: RwLock<MonitorState>,
    window_size: usize,
}

impl AgentMonitor {
    /// Create a monitor with the given recent-window capacity.
    pub fn new(window_size: usize) -> Self {
        Self {
            state: RwLock::new(MonitorState {
                metrics: HashMap::new(),
                recent: VecDeque::with_capacity(window_size),
                started_at: Utc::now(),
            }),
            window_size,
        }
    }

    /// Record one request outcome for an agent (created on first use).
    pub async fn record(
        &self,
        agent: &str,
        success: bool,
        processing_time: f64,
        error_kind: Option<&str>,
    ) {
        let mut state = self.state.write().await;
        state
            .metrics
            .entry(agent.to_string())
            .or_default()
            .record(success, processing_time, error_kind);

        state.recent.push_back(RequestRecord {
            timestamp: Utc::now(),
            agent: agent.to_string(),
            success,
            processing_time,
            error_kind: error_kind.map(str::to_string),
        });
        if state.recent.len() > self.window_size {
            state.recent.pop_front();
        }

        debug!(agent, success, processing_time, "Recorded request");
    }

    /// Metrics snapshot for one agent; zeroed when the agent is unknown.
    pub async fn agent_stats(&self, agent: &str) -> AgentStats {
        let state = self.state.read().await;
        state
            .metrics
            .get(agent)
            .map(AgentMetrics::snapshot)
            .unwrap_or_default()
    }

    /// System-wide aggregate with safe divides.
    pub async fn system_stats(&self) -> SystemStats {
        let state = self.state.read().await;
        let total_requests: u64 = state.metrics.values().map(|m| m.total_requests).sum();
        let total_success: u64 = state.metrics.values().map(|m| m.successful_requests).sum();
        let total_time: f64 = state.metrics.values().map(|m| m.total_processing_time).sum();

        let success_rate = if total_requests > 0 {
            total_success as f64 / total_requests as f64
        } else {
            0.0
        };
        let average_processing_time = if total_requests > 0 {
            total_time / total_requests as f64
        } else {
            0.0
        };

        let one_hour_ago = Utc::now() - Duration::hours(1);
        let recent_requests_1h = state
            .recent
            .iter()
            .filter(|r| r.timestamp > one_hour_ago)
            .count();

        let now = Utc::now();
        SystemStats {
            started_at: state.started_at,
            uptime_seconds: (now - state.started_at).num_milliseconds() as f64 / 1000.0,
            total_agents: state.metrics.len(),
            total_requests,
            success_rate,
            average_processing_time,
            recent_requests_1h,
        }
    }

    /// Agents with at least one request, ranked by descending efficiency.
    /// The +0.1 floor keeps near-zero latencies from blowing up the score.
    pub async fn performance_ranking(&self) -> Vec<PerformanceEntry> {
        let state = self.state.read().await;
        let mut ranking: Vec<PerformanceEntry> = state
            .metrics
            .iter()
            .filter(|(_, m)| m.total_requests > 0)
            .map(|(agent, m)| {
                let avg = m.average_processing_time();
                PerformanceEntry {
                    agent: agent.clone(),
                    total_requests: m.total_requests,
                    success_rate: m.success_rate(),
                    average_processing_time: avg,
                    efficiency_score: m.success_rate() / (avg + 0.1),
                }
            })
            .collect();

        ranking.sort_by(|a, b| {
            b.efficiency_score
                .partial_cmp(&a.efficiency_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranking
    }

    /// Each agent's share of total requests; empty when nothing recorded.
    pub async fn usage_distribution(&self) -> HashMap<String, f64> {
        let state = self.state.read().await;
        let total: u64 = state.metrics.values().map(|m| m.total_requests).sum();
        if total == 0 {
            return HashMap::new();
        }
        state
            .metrics
            .iter()
            .map(|(agent, m)| (agent.clone(), m.total_requests as f64 / total as f64))
            .collect()
    }

    /// The last `limit` failed window entries, in chronological order.
    pub async fn recent_errors(&self, limit: usize) -> Vec<RequestRecord> {
        let state = self.state.read().await;
        let errors: Vec<RequestRecord> = state
            .recent
            .iter()
            .filter(|r| !r.success)
            .cloned()
            .collect();
        let skip = errors.len().saturating_sub(limit);
        errors.into_iter().skip(skip).collect()
    }

    /// Clear all metrics and the window; restart the uptime clock.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.metrics.clear();
        state.recent.clear();
        state.started_at = Utc::now();
        info!("Monitor metrics reset");
    }

    /// Bundle of every aggregate for observability consumers.
    pub async fn report(&self) -> MonitorReport {
        let agent_details = {
            let state = self.state.read().await;
            state
                .metrics
                .iter()
                .map(|(agent, m)| (agent.clone(), m.snapshot()))
                .collect()
        };

        MonitorReport {
            system_overview: self.system_stats().await,
            performance_ranking: self.performance_ranking().await,
            usage_distribution: self.usage_distribution().await,
            recent_errors: self.recent_errors(10).await,
            agent_details,
        }
    }
}

impl Default for AgentMonitor {
    fn default() -> Self {
        Self::new(100)
    }
}
