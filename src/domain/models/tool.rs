use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Invocable handle backing a tool. Takes a JSON argument object and
/// produces a human-readable result.
pub type ToolHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync>;

/// Serializable tool descriptor: everything about a tool except its handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// Parameter name to parameter description
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Shared tools may be copied into other agents' shared-tool sets
    #[serde(default)]
    pub shared: bool,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
            shared: false,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), description.into());
        self
    }

    pub fn shared(mut self) -> Self {
        self.shared = true;
        self
    }
}

/// A named operation exposed by an agent.
///
/// Sharing a tool clones this value: the descriptor is copied and the handle
/// points at an immutable closure, so a copy can never observe changes made
/// to the original.
#[derive(Clone)]
pub struct Tool {
    pub spec: ToolSpec,
    handler: ToolHandler,
}

impl Tool {
    pub fn new(spec: ToolSpec, handler: ToolHandler) -> Self {
        Self { spec, handler }
    }

    /// Invoke the tool with a JSON argument object.
    pub async fn invoke(&self, args: Value) -> anyhow::Result<String> {
        (self.handler)(args).await
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;

    fn echo_tool() -> Tool {
        let spec = ToolSpec::new("echo", "echoes its input")
            .with_parameter("text", "text to echo")
            .shared();
        Tool::new(
            spec,
            Arc::new(|args| {
                async move {
                    let text = args
                        .get("text")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    Ok(text)
                }
                .boxed()
            }),
        )
    }

    #[tokio::test]
    async fn test_invoke() {
        let tool = echo_tool();
        let out = tool.invoke(json!({"text": "hello"})).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_clone_is_independent_descriptor() {
        let tool = echo_tool();
        let mut copy = tool.clone();
        copy.spec.description = "changed".to_string();
        assert_eq!(tool.spec.description, "echoes its input");
    }

    #[test]
    fn test_spec_builder() {
        let spec = ToolSpec::new("t", "d").with_parameter("a", "first").shared();
        assert!(spec.shared);
        assert_eq!(spec.parameters.get("a").map(String::as_str), Some("first"));
    }
}
