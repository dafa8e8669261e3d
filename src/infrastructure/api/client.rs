//! HTTP implementation of the outbound ticket API.
//!
//! Every operation returns an `ApiResponse` envelope. Transport and HTTP
//! status failures become `success = false` responses; callers never see a
//! reqwest error directly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::domain::models::SystemSettings;
use crate::domain::ports::{ApiResponse, TicketApi};

pub struct HttpTicketApi {
    client: Client,
    quota_api_url: String,
    project_api_url: String,
    ticket_api_url: String,
}

impl HttpTicketApi {
    pub fn new(settings: &SystemSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            quota_api_url: settings.quota_api_url.trim_end_matches('/').to_string(),
            project_api_url: settings.project_api_url.trim_end_matches('/').to_string(),
            ticket_api_url: settings.ticket_api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post(&self, url: &str, payload: &Value, success_message: &str) -> ApiResponse {
        let result = self.client.post(url).json(payload).send().await;
        Self::into_response(url, result, Some(success_message)).await
    }

    async fn put(&self, url: &str, payload: &Value, success_message: &str) -> ApiResponse {
        let result = self.client.put(url).json(payload).send().await;
        Self::into_response(url, result, Some(success_message)).await
    }

    async fn get(&self, url: &str) -> ApiResponse {
        let result = self.client.get(url).send().await;
        Self::into_response(url, result, None).await
    }

    async fn into_response(
        url: &str,
        result: Result<reqwest::Response, reqwest::Error>,
        success_message: Option<&str>,
    ) -> ApiResponse {
        let response = match result.and_then(reqwest::Response::error_for_status) {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "API request failed");
                return ApiResponse::failure("request failed", e.to_string());
            }
        };

        let data = match response.json::<Value>().await {
            Ok(data) => data,
            Err(e) => {
                warn!(url, error = %e, "API response was not valid JSON");
                return ApiResponse::failure("invalid response body", e.to_string());
            }
        };

        debug!(url, "API request succeeded");
        ApiResponse::ok_with_data(success_message.unwrap_or("ok"), data)
    }
}

#[async_trait]
impl TicketApi for HttpTicketApi {
    #[instrument(skip(self))]
    async fn increase_quota(&self, user_id: &str, resource_type: &str, amount: i64) -> ApiResponse {
        let url = format!("{}/increase", self.quota_api_url);
        let payload = json!({
            "user_id": user_id,
            "resource_type": resource_type,
            "amount": amount,
        });
        let message = format!("increased {resource_type} quota by {amount} units");
        self.post(&url, &payload, &message).await
    }

    #[instrument(skip(self, description, settings))]
    async fn create_project(
        &self,
        name: &str,
        description: &str,
        owner_id: &str,
        settings: Option<Value>,
    ) -> ApiResponse {
        let url = format!("{}/create", self.project_api_url);
        let payload = json!({
            "name": name,
            "description": description,
            "owner_id": owner_id,
            "settings": settings.unwrap_or_else(|| json!({})),
        });
        let message = format!("project '{name}' created");
        self.post(&url, &payload, &message).await
    }

    #[instrument(skip(self))]
    async fn get_user_quota(&self, user_id: &str) -> ApiResponse {
        let url = format!("{}/{user_id}", self.quota_api_url);
        self.get(&url).await
    }

    #[instrument(skip(self))]
    async fn get_ticket_status(&self, ticket_id: &str) -> ApiResponse {
        let url = format!("{}/{ticket_id}/status", self.ticket_api_url);
        self.get(&url).await
    }

    #[instrument(skip(self, notes))]
    async fn update_ticket_status(
        &self,
        ticket_id: &str,
        status: &str,
        notes: &str,
    ) -> ApiResponse {
        let url = format!("{}/{ticket_id}/status", self.ticket_api_url);
        let payload = json!({ "status": status, "notes": notes });
        let message = format!("ticket status updated to {status}");
        self.put(&url, &payload, &message).await
    }

    #[instrument(skip(self))]
    async fn get_user_quota_usage(&self, user_id: &str, resource_type: &str) -> ApiResponse {
        let url = format!("{}/{user_id}/usage/{resource_type}", self.quota_api_url);
        self.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base: &str) -> SystemSettings {
        SystemSettings {
            quota_api_url: format!("{base}/quota"),
            project_api_url: format!("{base}/projects"),
            ticket_api_url: format!("{base}/tickets"),
            request_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_increase_quota_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/quota/increase")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({"user_id": "alice", "resource_type": "cpu", "amount": 4}),
            ))
            .with_status(200)
            .with_body(r#"{"granted": true}"#)
            .create_async()
            .await;

        let api = HttpTicketApi::new(&settings(&server.url())).unwrap();
        let resp = api.increase_quota("alice", "cpu", 4).await;

        mock.assert_async().await;
        assert!(resp.success);
        assert_eq!(resp.message.as_deref(), Some("increased cpu quota by 4 units"));
        assert_eq!(resp.data.unwrap()["granted"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn test_http_error_becomes_failure_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/quota/alice")
            .with_status(500)
            .create_async()
            .await;

        let api = HttpTicketApi::new(&settings(&server.url())).unwrap();
        let resp = api.get_user_quota("alice").await;

        assert!(!resp.success);
        assert!(resp.error.is_some());
    }

    #[tokio::test]
    async fn test_non_json_body_is_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tickets/T-1/status")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let api = HttpTicketApi::new(&settings(&server.url())).unwrap();
        let resp = api.get_ticket_status("T-1").await;

        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("invalid response body"));
    }

    #[tokio::test]
    async fn test_update_ticket_status_put() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/tickets/T-1/status")
            .match_body(mockito::Matcher::PartialJson(
                serde_json::json!({"status": "completed"}),
            ))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let api = HttpTicketApi::new(&settings(&server.url())).unwrap();
        let resp = api.update_ticket_status("T-1", "completed", "done").await;

        mock.assert_async().await;
        assert!(resp.success);
        assert_eq!(resp.message.as_deref(), Some("ticket status updated to completed"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_failure() {
        let api = HttpTicketApi::new(&settings("http://127.0.0.1:1")).unwrap();
        let resp = api.get_user_quota_usage("alice", "cpu").await;
        assert!(!resp.success);
    }
}
