//! Business logic review agent.
//!
//! Accepts every ticket and produces a compliance summary: permission
//! check, request-reason validation and a risk score. All checks are local
//! heuristics; no outbound calls are made.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::adapters::agents::str_arg;
use crate::domain::models::{Tool, ToolSpec};
use crate::domain::ports::TicketAgent;

const HIGH_PERMISSION_USERS: &[&str] = &["admin", "manager", "user001"];
const RESTRICTED_RESOURCES: &[&str] = &["production", "sensitive_data"];

const VALID_REASONS: &[&str] = &[
    "business growth",
    "project requirement",
    "performance",
    "capacity",
    "new feature",
    "upgrade",
    "user growth",
];

const URGENCY_KEYWORDS: &[&str] = &["urgent", "immediately", "asap", "critical", "emergency"];
const BULK_KEYWORDS: &[&str] = &["bulk", "entire", "massive", "large-scale", "everything"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

pub struct BusinessLogicAgent {
    user_re: Regex,
}

impl BusinessLogicAgent {
    pub fn new() -> Self {
        Self {
            user_re: Regex::new(r"(?i)\buser(?:\s*id)?\s*[:#]\s*([A-Za-z0-9_-]+)")
                .expect("user pattern"),
        }
    }

    /// Returns (allowed, human-readable verdict).
    fn check_permission(user_id: &str, resource_type: &str) -> (bool, String) {
        if HIGH_PERMISSION_USERS.contains(&user_id) {
            (true, format!("user {user_id} has elevated permissions"))
        } else if RESTRICTED_RESOURCES.contains(&resource_type) {
            (
                false,
                format!("user {user_id} may not access restricted resource '{resource_type}'"),
            )
        } else {
            (true, format!("user {user_id} has standard permissions"))
        }
    }

    /// Returns (sufficient, human-readable verdict).
    fn validate_reason(ticket: &str) -> (bool, String) {
        let lower = ticket.to_lowercase();
        let found: Vec<&str> = VALID_REASONS
            .iter()
            .filter(|r| lower.contains(*r))
            .copied()
            .collect();
        if found.is_empty() {
            (
                false,
                "request reason unclear; additional justification recommended".to_string(),
            )
        } else {
            (true, format!("request reason is sufficient ({})", found.join(", ")))
        }
    }

    fn assess_risk(ticket: &str) -> (RiskLevel, String) {
        let lower = ticket.to_lowercase();
        let mut score = 0;
        for keyword in URGENCY_KEYWORDS {
            if lower.contains(keyword) {
                score += 2;
            }
        }
        for keyword in BULK_KEYWORDS {
            if lower.contains(keyword) {
                score += 1;
            }
        }

        let level = if score >= 3 {
            RiskLevel::High
        } else if score >= 1 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        let text = match level {
            RiskLevel::High => {
                format!("{level} risk: urgent wording combined with large-scale changes")
            }
            RiskLevel::Medium => format!("{level} risk: additional review suggested"),
            RiskLevel::Low => format!("{level} risk: request follows the normal process"),
        };
        (level, text)
    }

    fn resource_type(ticket: &str) -> Option<&'static str> {
        let lower = ticket.to_lowercase();
        ["cpu", "memory", "storage", "project", "production", "resource"]
            .into_iter()
            .find(|k| lower.contains(k))
    }

    fn check_permission_tool() -> Tool {
        let spec = ToolSpec::new("check_user_permission", "Check a user's access to a resource")
            .with_parameter("user_id", "user identifier")
            .with_parameter("resource_type", "resource being requested")
            .shared();
        Tool::new(
            spec,
            Arc::new(|args| {
                async move {
                    let user_id = str_arg(&args, "user_id")?;
                    let resource_type = str_arg(&args, "resource_type")?;
                    Ok(Self::check_permission(&user_id, &resource_type).1)
                }
                .boxed()
            }),
        )
    }

    fn validate_reason_tool() -> Tool {
        let spec = ToolSpec::new(
            "validate_request_reason",
            "Check whether a ticket states an acceptable reason",
        )
        .with_parameter("ticket_content", "full ticket text")
        .shared();
        Tool::new(
            spec,
            Arc::new(|args| {
                async move {
                    let ticket = str_arg(&args, "ticket_content")?;
                    Ok(Self::validate_reason(&ticket).1)
                }
                .boxed()
            }),
        )
    }

    fn assess_risk_tool() -> Tool {
        let spec = ToolSpec::new("assess_risk_level", "Score the risk level of a ticket")
            .with_parameter("ticket_content", "full ticket text")
            .shared();
        Tool::new(
            spec,
            Arc::new(|args| {
                async move {
                    let ticket = str_arg(&args, "ticket_content")?;
                    Ok(Self::assess_risk(&ticket).1)
                }
                .boxed()
            }),
        )
    }
}

impl Default for BusinessLogicAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketAgent for BusinessLogicAgent {
    /// Business logic review applies to every ticket.
    fn can_handle(&self, _ticket: &str) -> bool {
        true
    }

    fn extract_info(&self, ticket: &str) -> Map<String, Value> {
        let lower = ticket.to_lowercase();
        let user_id = self.user_re.captures(ticket).map(|c| c[1].to_string());
        let has_urgent = URGENCY_KEYWORDS.iter().any(|k| lower.contains(k));

        let mut info = Map::new();
        info.insert("user_id".to_string(), user_id.map_or(Value::Null, Value::String));
        info.insert(
            "resource_type".to_string(),
            Self::resource_type(ticket).map_or(Value::Null, |r| Value::String(r.to_string())),
        );
        info.insert("has_urgent_keywords".to_string(), Value::Bool(has_urgent));
        info.insert("has_request".to_string(), Value::Bool(true));
        info
    }

    #[instrument(skip(self, ticket))]
    async fn process(&self, ticket: &str) -> anyhow::Result<String> {
        let info = self.extract_info(ticket);
        let mut lines = Vec::new();

        let mut permission_denied = false;
        if let (Some(user_id), Some(resource_type)) =
            (info["user_id"].as_str(), info["resource_type"].as_str())
        {
            let (allowed, verdict) = Self::check_permission(user_id, resource_type);
            permission_denied = !allowed;
            lines.push(format!("permission check: {verdict}"));
        }

        let (reason_ok, reason_verdict) = Self::validate_reason(ticket);
        lines.push(format!("request reason: {reason_verdict}"));

        let (risk, risk_verdict) = Self::assess_risk(ticket);
        lines.push(format!("risk assessment: {risk_verdict}"));

        let recommendation = if permission_denied || risk == RiskLevel::High {
            "manual review required"
        } else if !reason_ok || risk == RiskLevel::Medium {
            "additional review recommended before processing"
        } else {
            "checks passed, processing may continue"
        };
        lines.push(format!("recommendation: {recommendation}"));

        Ok(lines.join("\n"))
    }

    fn tools(&self) -> Vec<Tool> {
        vec![
            Self::check_permission_tool(),
            Self::validate_reason_tool(),
            Self::assess_risk_tool(),
        ]
    }
}
