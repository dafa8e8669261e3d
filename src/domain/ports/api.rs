use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope returned by every outbound API operation.
///
/// Transport failures surface as `success = false`, never as an `Err`; the
/// engine treats these values as opaque agent output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    pub fn ok_with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Outbound quota/project/ticket operations consumed by concrete agents.
#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn increase_quota(&self, user_id: &str, resource_type: &str, amount: i64) -> ApiResponse;

    async fn create_project(
        &self,
        name: &str,
        description: &str,
        owner_id: &str,
        settings: Option<Value>,
    ) -> ApiResponse;

    async fn get_user_quota(&self, user_id: &str) -> ApiResponse;

    async fn get_ticket_status(&self, ticket_id: &str) -> ApiResponse;

    async fn update_ticket_status(&self, ticket_id: &str, status: &str, notes: &str)
        -> ApiResponse;

    async fn get_user_quota_usage(&self, user_id: &str, resource_type: &str) -> ApiResponse;
}
