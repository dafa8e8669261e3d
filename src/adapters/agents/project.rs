//! Project creation agent.
//!
//! Detects project-creation requests, extracts the project name, owner and
//! description, and creates the project through the outbound API.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::instrument;

use crate::adapters::agents::{render_response, str_arg};
use crate::domain::models::{Tool, ToolSpec};
use crate::domain::ports::{TicketAgent, TicketApi};

const PROJECT_KEYWORDS: &[&str] = &[
    "create project",
    "new project",
    "set up a project",
    "project request",
];

/// Description fallback cap when no explicit description is given.
const DESCRIPTION_LIMIT: usize = 200;

pub struct ProjectAgent {
    api: Arc<dyn TicketApi>,
    name_re: Regex,
    description_re: Regex,
    owner_re: Regex,
    environment_re: Regex,
}

impl ProjectAgent {
    pub fn new(api: Arc<dyn TicketApi>) -> Self {
        Self {
            api,
            name_re: Regex::new(r"(?i)project\s*(?:name)?\s*[:#]\s*([^\n.,!?]+)")
                .expect("name pattern"),
            description_re: Regex::new(r"(?i)(?:description|purpose)\s*:\s*([^\n.,!?]+)")
                .expect("description pattern"),
            owner_re: Regex::new(r"(?i)\b(?:user|owner)(?:\s*id)?\s*[:#]\s*([A-Za-z0-9_-]+)")
                .expect("owner pattern"),
            environment_re: Regex::new(r"(?i)\b(production|development)\b")
                .expect("environment pattern"),
        }
    }

    fn create_project_tool(&self) -> Tool {
        let api = Arc::clone(&self.api);
        let spec = ToolSpec::new("create_project", "Create a new project for a user")
            .with_parameter("project_name", "name of the project")
            .with_parameter("description", "what the project is for")
            .with_parameter("owner_id", "owning user identifier")
            .with_parameter("settings", "optional settings object")
            .shared();
        Tool::new(
            spec,
            Arc::new(move |args| {
                let api = Arc::clone(&api);
                async move {
                    let name = str_arg(&args, "project_name")?;
                    let description = str_arg(&args, "description")?;
                    let owner_id = str_arg(&args, "owner_id")?;
                    let settings = args.get("settings").cloned();
                    let resp = api.create_project(&name, &description, &owner_id, settings).await;
                    Ok(render_response(&resp))
                }
                .boxed()
            }),
        )
    }
}

#[async_trait]
impl TicketAgent for ProjectAgent {
    fn can_handle(&self, ticket: &str) -> bool {
        let lower = ticket.to_lowercase();
        PROJECT_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    fn extract_info(&self, ticket: &str) -> Map<String, Value> {
        let project_name = self
            .name_re
            .captures(ticket)
            .map(|c| c[1].trim().to_string());
        let owner_id = self.owner_re.captures(ticket).map(|c| c[1].to_string());

        let description = self
            .description_re
            .captures(ticket)
            .map_or_else(
                || {
                    ticket
                        .chars()
                        .take(DESCRIPTION_LIMIT)
                        .collect::<String>()
                        .trim()
                        .to_string()
                },
                |c| c[1].trim().to_string(),
            );

        let mut settings = Map::new();
        if let Some(captures) = self.environment_re.captures(ticket) {
            settings.insert(
                "environment".to_string(),
                Value::String(captures[1].to_lowercase()),
            );
        }

        let has_request =
            self.can_handle(ticket) && project_name.is_some() && owner_id.is_some();

        let mut info = Map::new();
        info.insert(
            "project_name".to_string(),
            project_name.map_or(Value::Null, Value::String),
        );
        info.insert("description".to_string(), Value::String(description));
        info.insert("owner_id".to_string(), owner_id.map_or(Value::Null, Value::String));
        info.insert("settings".to_string(), Value::Object(settings));
        info.insert("has_request".to_string(), Value::Bool(has_request));
        info
    }

    #[instrument(skip(self, ticket))]
    async fn process(&self, ticket: &str) -> anyhow::Result<String> {
        let info = self.extract_info(ticket);
        if !info.get("has_request").and_then(Value::as_bool).unwrap_or(false) {
            return Ok("no actionable project creation request found in ticket".to_string());
        }

        let name = info["project_name"].as_str().unwrap_or_default();
        let description = info["description"].as_str().unwrap_or_default();
        let owner_id = info["owner_id"].as_str().unwrap_or_default();
        let settings = match &info["settings"] {
            Value::Object(map) if !map.is_empty() => Some(json!(map)),
            _ => None,
        };

        let resp = self.api.create_project(name, description, owner_id, settings).await;
        if resp.success {
            Ok(render_response(&resp))
        } else {
            anyhow::bail!(
                "project creation for '{name}' failed: {}",
                resp.error.as_deref().unwrap_or("unknown error")
            )
        }
    }

    fn tools(&self) -> Vec<Tool> {
        vec![self.create_project_tool()]
    }
}
