//! Quota adjustment agent.
//!
//! Detects quota-increase requests, checks whether the increase is actually
//! needed against current usage, and drives the quota and ticket-status
//! APIs to completion.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::adapters::agents::{render_response, str_arg};
use crate::domain::models::{Tool, ToolSpec};
use crate::domain::ports::{TicketAgent, TicketApi};

const QUOTA_KEYWORDS: &[&str] = &["quota", "increase", "raise", "allocation", "need more"];

/// Ticket statuses the agent is allowed to act on.
const EXECUTABLE_STATUSES: &[&str] = &["pending", "new", "open"];

pub struct QuotaAgent {
    api: Arc<dyn TicketApi>,
    ticket_re: Regex,
    user_re: Regex,
    amount_re: Regex,
}

impl QuotaAgent {
    pub fn new(api: Arc<dyn TicketApi>) -> Self {
        // Literal patterns, compile-checked by the test suite.
        Self {
            api,
            ticket_re: Regex::new(r"(?i)ticket(?:\s*id)?\s*[:#]\s*([A-Za-z0-9_-]+)")
                .expect("ticket pattern"),
            user_re: Regex::new(r"(?i)\buser(?:\s*id)?\s*[:#]\s*([A-Za-z0-9_-]+)")
                .expect("user pattern"),
            amount_re: Regex::new(r"(?i)\b(\d+)\s*(?:gb|mb|tb|cores?|vcpus?|units?)\b")
                .expect("amount pattern"),
        }
    }

    fn resource_type(ticket: &str) -> Option<&'static str> {
        let lower = ticket.to_lowercase();
        if ["cpu", "processor", "vcpu", "compute"].iter().any(|k| lower.contains(k)) {
            Some("cpu")
        } else if ["memory", "ram"].iter().any(|k| lower.contains(k)) {
            Some("memory")
        } else if ["storage", "disk"].iter().any(|k| lower.contains(k)) {
            Some("storage")
        } else {
            None
        }
    }

    /// A ticket is executable only while it still awaits handling. Unknown
    /// status (lookup failure included) counts as not executable.
    async fn ticket_executable(&self, ticket_id: &str) -> bool {
        let resp = self.api.get_ticket_status(ticket_id).await;
        if !resp.success {
            warn!(ticket_id, "Ticket status lookup failed");
            return false;
        }
        resp.data
            .as_ref()
            .and_then(|d| d.get("status"))
            .and_then(Value::as_str)
            .is_some_and(|s| EXECUTABLE_STATUSES.contains(&s.to_lowercase().as_str()))
    }

    /// Whether the remaining quota falls short of the requested amount.
    /// When usage cannot be determined the increase proceeds.
    async fn increase_needed(&self, user_id: &str, resource_type: &str, amount: i64) -> bool {
        let resp = self.api.get_user_quota_usage(user_id, resource_type).await;
        if !resp.success {
            return true;
        }
        let usage = resp.data.unwrap_or(Value::Null);
        let current = usage.get("current_usage").and_then(Value::as_i64).unwrap_or(0);
        let total = usage.get("total_quota").and_then(Value::as_i64).unwrap_or(0);
        total - current < amount
    }

    fn increase_quota_tool(&self) -> Tool {
        let api = Arc::clone(&self.api);
        let spec = ToolSpec::new("increase_quota", "Raise a user's quota for one resource type")
            .with_parameter("user_id", "user identifier")
            .with_parameter("resource_type", "resource type (cpu, memory, storage)")
            .with_parameter("amount", "units to add")
            .shared();
        Tool::new(
            spec,
            Arc::new(move |args| {
                let api = Arc::clone(&api);
                async move {
                    let user_id = str_arg(&args, "user_id")?;
                    let resource_type = str_arg(&args, "resource_type")?;
                    let amount = args
                        .get("amount")
                        .and_then(Value::as_i64)
                        .ok_or_else(|| anyhow::anyhow!("missing or invalid 'amount' argument"))?;
                    let resp = api.increase_quota(&user_id, &resource_type, amount).await;
                    Ok(render_response(&resp))
                }
                .boxed()
            }),
        )
    }

    fn get_user_quota_tool(&self) -> Tool {
        let api = Arc::clone(&self.api);
        let spec = ToolSpec::new("get_user_quota", "Look up a user's current quota")
            .with_parameter("user_id", "user identifier")
            .shared();
        Tool::new(
            spec,
            Arc::new(move |args| {
                let api = Arc::clone(&api);
                async move {
                    let user_id = str_arg(&args, "user_id")?;
                    let resp = api.get_user_quota(&user_id).await;
                    Ok(render_response(&resp))
                }
                .boxed()
            }),
        )
    }

    fn get_user_quota_usage_tool(&self) -> Tool {
        let api = Arc::clone(&self.api);
        let spec = ToolSpec::new(
            "get_user_quota_usage",
            "Look up a user's quota usage for one resource type",
        )
        .with_parameter("user_id", "user identifier")
        .with_parameter("resource_type", "resource type (cpu, memory, storage)")
        .shared();
        Tool::new(
            spec,
            Arc::new(move |args| {
                let api = Arc::clone(&api);
                async move {
                    let user_id = str_arg(&args, "user_id")?;
                    let resource_type = str_arg(&args, "resource_type")?;
                    let resp = api.get_user_quota_usage(&user_id, &resource_type).await;
                    Ok(render_response(&resp))
                }
                .boxed()
            }),
        )
    }
}

#[async_trait]
impl TicketAgent for QuotaAgent {
    fn can_handle(&self, ticket: &str) -> bool {
        let lower = ticket.to_lowercase();
        QUOTA_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    fn extract_info(&self, ticket: &str) -> Map<String, Value> {
        let ticket_id = self
            .ticket_re
            .captures(ticket)
            .map(|c| c[1].to_string());
        let user_id = self.user_re.captures(ticket).map(|c| c[1].to_string());
        let resource_type = Self::resource_type(ticket);
        let amount = self
            .amount_re
            .captures(ticket)
            .and_then(|c| c[1].parse::<i64>().ok());

        let has_request = self.can_handle(ticket)
            && user_id.is_some()
            && resource_type.is_some()
            && amount.is_some();

        let mut info = Map::new();
        info.insert("ticket_id".to_string(), ticket_id.map_or(Value::Null, Value::String));
        info.insert("user_id".to_string(), user_id.map_or(Value::Null, Value::String));
        info.insert(
            "resource_type".to_string(),
            resource_type.map_or(Value::Null, |r| Value::String(r.to_string())),
        );
        info.insert("amount".to_string(), amount.map_or(Value::Null, Value::from));
        info.insert("has_request".to_string(), Value::Bool(has_request));
        info
    }

    #[instrument(skip(self, ticket))]
    async fn process(&self, ticket: &str) -> anyhow::Result<String> {
        let info = self.extract_info(ticket);
        if !info.get("has_request").and_then(Value::as_bool).unwrap_or(false) {
            return Ok("no actionable quota request found in ticket".to_string());
        }

        // has_request guarantees these fields are present
        let user_id = info["user_id"].as_str().unwrap_or_default().to_string();
        let resource_type = info["resource_type"].as_str().unwrap_or_default().to_string();
        let amount = info["amount"].as_i64().unwrap_or_default();
        let ticket_id = info["ticket_id"].as_str().map(str::to_string);

        if let Some(id) = &ticket_id {
            if !self.ticket_executable(id).await {
                return Ok(format!(
                    "ticket {id} is already handled or not executable; skipping quota adjustment"
                ));
            }
        }

        if !self.increase_needed(&user_id, &resource_type, amount).await {
            debug!(user_id, resource_type, "Quota already sufficient");
            if let Some(id) = &ticket_id {
                self.api
                    .update_ticket_status(id, "completed", "quota sufficient, no adjustment needed")
                    .await;
            }
            return Ok(format!(
                "user {user_id} has sufficient {resource_type} quota; no increase needed"
            ));
        }

        let resp = self.api.increase_quota(&user_id, &resource_type, amount).await;
        if resp.success {
            if let Some(id) = &ticket_id {
                self.api
                    .update_ticket_status(
                        id,
                        "completed",
                        &format!("increased {resource_type} quota by {amount} units"),
                    )
                    .await;
            }
            Ok(render_response(&resp))
        } else {
            if let Some(id) = &ticket_id {
                self.api
                    .update_ticket_status(id, "failed", "quota adjustment failed")
                    .await;
            }
            anyhow::bail!(
                "quota increase for user {user_id} failed: {}",
                resp.error.as_deref().unwrap_or("unknown error")
            )
        }
    }

    fn tools(&self) -> Vec<Tool> {
        vec![
            self.increase_quota_tool(),
            self.get_user_quota_tool(),
            self.get_user_quota_usage_tool(),
        ]
    }
}
