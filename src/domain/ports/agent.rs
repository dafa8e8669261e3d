use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::models::Tool;

/// Capability contract for a ticket agent.
///
/// `can_handle` and `extract_info` are synchronous text heuristics;
/// `process` is async because concrete agents may perform outbound I/O.
/// Callers must invoke all three outside any registry lock.
#[async_trait]
pub trait TicketAgent: Send + Sync {
    /// Whether this agent claims the ticket at all.
    fn can_handle(&self, ticket: &str) -> bool;

    /// Extract structured fields from the ticket text. Implementations
    /// should include a boolean-ish `has_request` entry; the default
    /// confidence policy keys off it.
    fn extract_info(&self, ticket: &str) -> Map<String, Value>;

    /// Process the ticket, producing a human-readable result.
    async fn process(&self, ticket: &str) -> anyhow::Result<String>;

    /// Confidence in [0, 1] that this agent should process the ticket.
    ///
    /// Default policy: 0.0 when `can_handle` is false; otherwise 0.8 when
    /// `extract_info` reports a truthy `has_request`, else 0.3. Agents with
    /// real scoring override this.
    fn confidence(&self, ticket: &str) -> f64 {
        if !self.can_handle(ticket) {
            return 0.0;
        }
        let info = self.extract_info(ticket);
        if info.get("has_request").is_some_and(is_truthy) {
            0.8
        } else {
            0.3
        }
    }

    /// Tools this agent exposes. Collected once, at registration time.
    fn tools(&self) -> Vec<Tool> {
        Vec::new()
    }
}

/// JSON truthiness: true, non-zero number, or non-empty string/array/object.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct KeywordAgent {
        keyword: &'static str,
        strong: bool,
    }

    #[async_trait]
    impl TicketAgent for KeywordAgent {
        fn can_handle(&self, ticket: &str) -> bool {
            ticket.contains(self.keyword)
        }

        fn extract_info(&self, _ticket: &str) -> Map<String, Value> {
            let mut info = Map::new();
            info.insert("has_request".to_string(), Value::Bool(self.strong));
            info
        }

        async fn process(&self, _ticket: &str) -> anyhow::Result<String> {
            Ok("done".to_string())
        }
    }

    #[test]
    fn test_default_confidence_cannot_handle() {
        let agent = KeywordAgent { keyword: "quota", strong: true };
        assert_eq!(agent.confidence("unrelated"), 0.0);
    }

    #[test]
    fn test_default_confidence_with_request() {
        let agent = KeywordAgent { keyword: "quota", strong: true };
        assert!((agent.confidence("quota please") - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_confidence_without_request() {
        let agent = KeywordAgent { keyword: "quota", strong: false };
        assert!((agent.confidence("quota please") - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("x")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!([])));
    }
}
