use serde::Serialize;

use super::agent::AgentMetadata;

/// One scored routing candidate.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub agent: String,
    pub confidence: f64,
    pub priority: i32,
}

/// Analysis of a ticket against every enabled agent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketAnalysis {
    pub best_agent: Option<String>,
    pub confidence: f64,
    /// All candidates with confidence > 0, sorted by descending confidence
    /// then ascending priority
    pub candidates: Vec<Candidate>,
    pub agent_metadata: Option<AgentMetadata>,
}

/// Result of routing one ticket.
///
/// "No suitable agent" is a normal terminal outcome, not an error: the
/// outcome has `processed = false` and `error = None`.
#[derive(Debug, Clone, Serialize)]
pub struct RouteOutcome {
    pub processed: bool,
    pub result: String,
    /// Agent that handled the ticket, or "unknown" when none did
    pub agent_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub analysis: TicketAnalysis,
}

impl RouteOutcome {
    /// Terminal outcome when no agent claims the ticket.
    pub fn unhandled(analysis: TicketAnalysis) -> Self {
        Self {
            processed: false,
            result: "no suitable agent for this ticket; requires manual handling".to_string(),
            agent_used: "unknown".to_string(),
            error: None,
            analysis,
        }
    }
}
