use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-agent request counters. Monotonically non-decreasing except on reset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Cumulative processing time in seconds
    pub total_processing_time: f64,
    pub last_request_time: Option<DateTime<Utc>>,
    /// Error kind to occurrence count
    pub error_count: HashMap<String, u64>,
}

impl AgentMetrics {
    pub fn record(&mut self, success: bool, processing_time: f64, error_kind: Option<&str>) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
            if let Some(kind) = error_kind {
                *self.error_count.entry(kind.to_string()).or_default() += 1;
            }
        }
        self.total_processing_time += processing_time;
        self.last_request_time = Some(Utc::now());
    }

    /// Successful / total, 0 when no requests have been recorded.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successful_requests as f64 / self.total_requests as f64
    }

    /// Cumulative / total, 0 when no requests have been recorded.
    pub fn average_processing_time(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.total_processing_time / self.total_requests as f64
    }

    /// Serializable snapshot including the derived rates.
    pub fn snapshot(&self) -> AgentStats {
        AgentStats {
            total_requests: self.total_requests,
            successful_requests: self.successful_requests,
            failed_requests: self.failed_requests,
            success_rate: self.success_rate(),
            average_processing_time: self.average_processing_time(),
            last_request_time: self.last_request_time,
            error_count: self.error_count.clone(),
        }
    }
}

/// Point-in-time view of one agent's metrics, with derived fields computed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
    pub average_processing_time: f64,
    pub last_request_time: Option<DateTime<Utc>>,
    pub error_count: HashMap<String, u64>,
}

/// One entry in the bounded recent-activity window.
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub success: bool,
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

/// System-wide aggregate across all known agents.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: f64,
    pub total_agents: usize,
    pub total_requests: u64,
    pub success_rate: f64,
    pub average_processing_time: f64,
    /// Recent-window entries newer than one hour
    pub recent_requests_1h: usize,
}

/// Performance ranking entry; ranked by descending efficiency score.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceEntry {
    pub agent: String,
    pub total_requests: u64,
    pub success_rate: f64,
    pub average_processing_time: f64,
    /// success_rate / (average_processing_time + 0.1)
    pub efficiency_score: f64,
}

/// Everything an observability consumer needs in one structure.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    pub system_overview: SystemStats,
    pub performance_ranking: Vec<PerformanceEntry>,
    pub usage_distribution: HashMap<String, f64>,
    pub recent_errors: Vec<RequestRecord>,
    pub agent_details: HashMap<String, AgentStats>,
}
