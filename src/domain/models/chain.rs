use serde::Serialize;

/// Outcome of one agent within one chain run.
///
/// `processed = false` with `success = true` means the agent declined the
/// ticket (a skip, not a failure). `success = false` means the agent failed
/// while processing.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub agent: String,
    pub success: bool,
    pub processed: bool,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    /// The agent declined the ticket.
    pub fn skipped(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            success: true,
            processed: false,
            result: "skipped (cannot handle this ticket)".to_string(),
            error: None,
        }
    }

    /// The agent processed the ticket successfully.
    pub fn processed(agent: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            success: true,
            processed: true,
            result: output.into(),
            error: None,
        }
    }

    /// The agent failed while processing.
    pub fn failed(agent: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            agent: agent.into(),
            success: false,
            processed: false,
            result: format!("processing failed: {error}"),
            error: Some(error),
        }
    }
}

/// Result of a full chain run.
#[derive(Debug, Clone, Serialize)]
pub struct ChainRunResult {
    /// True only when every step succeeded (skips count as success)
    pub success: bool,
    /// Output of the last agent that actually processed the ticket
    pub result: String,
    pub chain_name: String,
    pub chain_results: Vec<StepResult>,
    pub total_agents: usize,
    pub processed_agents: usize,
    pub successful_agents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Descriptive listing entry for a chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainInfo {
    pub name: String,
    pub agents: Vec<String>,
    pub length: usize,
}

/// Summary of the chain map.
#[derive(Debug, Clone, Serialize)]
pub struct ChainStatus {
    pub total_chains: usize,
    pub total_agents_in_chains: usize,
    pub average_chain_length: f64,
    pub chains: Vec<ChainInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_is_success_not_processed() {
        let step = StepResult::skipped("a");
        assert!(step.success);
        assert!(!step.processed);
        assert!(step.error.is_none());
    }

    #[test]
    fn test_failed_captures_error() {
        let step = StepResult::failed("a", "boom");
        assert!(!step.success);
        assert!(!step.processed);
        assert_eq!(step.error.as_deref(), Some("boom"));
        assert!(step.result.contains("boom"));
    }
}
