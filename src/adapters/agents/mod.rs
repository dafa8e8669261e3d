//! Built-in ticket agents and the factory that constructs them.
//!
//! Agents are instantiated by kind identifier through an explicit
//! registration map; nothing is loaded by path or reflection. Adding an
//! agent kind means registering a constructor here (or on a factory
//! instance at startup).

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{ApiResponse, TicketAgent, TicketApi};

pub mod business_logic;
pub mod project;
pub mod quota;

pub use business_logic::BusinessLogicAgent;
pub use project::ProjectAgent;
pub use quota::QuotaAgent;

/// Constructor for one agent kind. The API handle is shared; agents that do
/// no outbound calls simply ignore it.
pub type AgentConstructor = fn(Arc<dyn TicketApi>) -> Arc<dyn TicketAgent>;

/// Explicit-registration agent factory.
pub struct AgentFactory {
    constructors: HashMap<String, AgentConstructor>,
}

impl AgentFactory {
    /// Factory with no registered kinds.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Factory preloaded with the built-in kinds.
    pub fn builtin() -> Self {
        let mut factory = Self::empty();
        factory.register("quota", |api| Arc::new(QuotaAgent::new(api)));
        factory.register("project", |api| Arc::new(ProjectAgent::new(api)));
        factory.register("business_logic", |_api| Arc::new(BusinessLogicAgent::new()));
        factory
    }

    /// Register (or replace) a constructor for a kind identifier.
    pub fn register(&mut self, kind: &str, constructor: AgentConstructor) {
        debug!(kind, "Registered agent constructor");
        self.constructors.insert(kind.to_string(), constructor);
    }

    /// Build an agent of the given kind; `None` for unknown kinds.
    pub fn build(&self, kind: &str, api: Arc<dyn TicketApi>) -> Option<Arc<dyn TicketAgent>> {
        self.constructors.get(kind).map(|ctor| ctor(api))
    }

    /// Registered kind identifiers, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.constructors.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

impl Default for AgentFactory {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Pull a required string argument out of a tool's JSON argument object.
fn str_arg(args: &Value, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing or invalid '{key}' argument"))
}

/// Render an API envelope as tool output text.
fn render_response(resp: &ApiResponse) -> String {
    if resp.success {
        match (&resp.message, &resp.data) {
            (Some(message), Some(data)) => format!("{message}: {data}"),
            (Some(message), None) => message.clone(),
            (None, Some(data)) => data.to_string(),
            (None, None) => "ok".to_string(),
        }
    } else {
        let detail = resp
            .error
            .as_deref()
            .or(resp.message.as_deref())
            .unwrap_or("unknown error");
        format!("request failed: {detail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NullApi;

    #[async_trait::async_trait]
    impl TicketApi for NullApi {
        async fn increase_quota(&self, _: &str, _: &str, _: i64) -> ApiResponse {
            ApiResponse::ok("ok")
        }
        async fn create_project(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: Option<Value>,
        ) -> ApiResponse {
            ApiResponse::ok("ok")
        }
        async fn get_user_quota(&self, _: &str) -> ApiResponse {
            ApiResponse::ok("ok")
        }
        async fn get_ticket_status(&self, _: &str) -> ApiResponse {
            ApiResponse::ok("ok")
        }
        async fn update_ticket_status(&self, _: &str, _: &str, _: &str) -> ApiResponse {
            ApiResponse::ok("ok")
        }
        async fn get_user_quota_usage(&self, _: &str, _: &str) -> ApiResponse {
            ApiResponse::ok("ok")
        }
    }

    #[test]
    fn test_builtin_kinds() {
        let factory = AgentFactory::builtin();
        assert_eq!(factory.kinds(), vec!["business_logic", "project", "quota"]);
    }

    #[test]
    fn test_build_known_and_unknown() {
        let factory = AgentFactory::builtin();
        let api: Arc<dyn TicketApi> = Arc::new(NullApi);
        assert!(factory.build("quota", Arc::clone(&api)).is_some());
        assert!(factory.build("nonexistent", api).is_none());
    }

    #[test]
    fn test_custom_registration() {
        let mut factory = AgentFactory::empty();
        assert!(factory.kinds().is_empty());
        factory.register("business_logic", |_| Arc::new(BusinessLogicAgent::new()));
        let api: Arc<dyn TicketApi> = Arc::new(NullApi);
        assert!(factory.build("business_logic", api).is_some());
    }

    #[test]
    fn test_render_response_variants() {
        assert_eq!(render_response(&ApiResponse::ok("done")), "done");
        assert_eq!(
            render_response(&ApiResponse::ok_with_data("quota", json!({"cpu": 4}))),
            "quota: {\"cpu\":4}"
        );
        assert_eq!(
            render_response(&ApiResponse::failure("nope", "timeout")),
            "request failed: timeout"
        );
    }

    #[test]
    fn test_str_arg() {
        let args = json!({"user_id": "u1", "amount": 4});
        assert_eq!(str_arg(&args, "user_id").unwrap(), "u1");
        assert!(str_arg(&args, "amount").is_err());
        assert!(str_arg(&args, "missing").is_err());
    }
}
