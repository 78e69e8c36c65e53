//! Tool dispatch facade.
//!
//! Resolves a tool name to its registered adapter, applies the call deadline,
//! and normalizes the adapter's content items into a canonical JSON value.
//! Retry toward the upstream is the adapter's business, never this layer's.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::{GatewayError, GatewayResult, ToolCallResult, ToolContent, ToolDefinition};

/// One registered tool. Adapters dispatch their `action` internally via a
/// tagged variant; the facade only validates presence.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn definition(&self) -> ToolDefinition;

    /// Whether `action` is listing-style: empty adapter content then
    /// canonicalizes to `[]` so callers never observe null where a list was
    /// expected.
    fn is_listing_action(&self, action: &str) -> bool;

    async fn call(&self, action: &str, arguments: &Map<String, Value>)
        -> GatewayResult<ToolCallResult>;
}

/// Registry mapping tool names to adapters, resolved once at startup.
#[derive(Default)]
pub struct ToolDispatcher {
    adapters: HashMap<&'static str, Arc<dyn ToolAdapter>>,
    order: Vec<&'static str>,
}

impl ToolDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn ToolAdapter>) {
        let name = adapter.name();
        if self.adapters.insert(name, adapter).is_none() {
            self.order.push(name);
        }
        tracing::info!(tool = name, "registered tool");
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.order.iter().map(|n| (*n).to_string()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|n| self.adapters.get(n))
            .map(|a| a.definition())
            .collect()
    }

    /// Invoke a tool and canonicalize its result.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<Value>,
        deadline: Duration,
    ) -> GatewayResult<Value> {
        let adapter = self
            .adapters
            .get(name)
            .ok_or_else(|| GatewayError::ToolNotFound(name.to_string()))?;

        let arguments = match arguments {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(GatewayError::InvalidParams(format!(
                    "arguments must be an object, got {other}"
                )))
            }
            None => Map::new(),
        };

        let action = arguments
            .get("action")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MissingAction)?
            .to_string();

        tracing::info!(tool = name, action = %action, "tool invocation");

        let result = tokio::time::timeout(deadline, adapter.call(&action, &arguments))
            .await
            .map_err(|_| GatewayError::Upstream {
                message: format!("tool '{name}' action '{action}' exceeded deadline"),
                cause: None,
            })??;

        Ok(canonicalize(result, adapter.is_listing_action(&action)))
    }
}

/// Unwrap an adapter result into the canonical value: the first text item,
/// parsed as JSON when it parses, the raw text otherwise. Empty content is an
/// empty list for listing actions and null for everything else.
fn canonicalize(result: ToolCallResult, listing: bool) -> Value {
    let first_text = result
        .content
        .into_iter()
        .map(|item| match item {
            ToolContent::Text { text } => text,
        })
        .next();

    match first_text {
        Some(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        None if listing => Value::Array(Vec::new()),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubTool {
        result: ToolCallResult,
    }

    #[async_trait]
    impl ToolAdapter for StubTool {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "stub".into(),
                description: None,
                input_schema: serde_json::json!({"type": "object"}),
            }
        }

        fn is_listing_action(&self, action: &str) -> bool {
            action == "list"
        }

        async fn call(
            &self,
            _action: &str,
            _arguments: &Map<String, Value>,
        ) -> GatewayResult<ToolCallResult> {
            Ok(self.result.clone())
        }
    }

    fn dispatcher_with(result: ToolCallResult) -> ToolDispatcher {
        let mut d = ToolDispatcher::new();
        d.register(Arc::new(StubTool { result }));
        d
    }

    fn args(action: &str) -> Option<Value> {
        Some(serde_json::json!({"action": action}))
    }

    #[tokio::test]
    async fn unknown_tool_is_tool_not_found() {
        let d = dispatcher_with(ToolCallResult::empty());
        let err = d
            .invoke("does-not-exist", args("list"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn missing_action_is_rejected() {
        let d = dispatcher_with(ToolCallResult::empty());
        let err = d
            .invoke("stub", Some(serde_json::json!({})), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingAction));
    }

    #[tokio::test]
    async fn nested_json_text_is_parsed() {
        let d = dispatcher_with(ToolCallResult::text(
            r#"{"totalResults":0,"results":[]}"#.to_string(),
        ));
        let value = d.invoke("stub", args("search"), Duration::from_secs(1)).await.unwrap();
        assert_eq!(value["totalResults"], 0);
        assert!(value["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_json_text_stays_raw() {
        let d = dispatcher_with(ToolCallResult::text("integration enabled".to_string()));
        let value = d.invoke("stub", args("enable"), Duration::from_secs(1)).await.unwrap();
        assert_eq!(value, Value::String("integration enabled".into()));
    }

    #[tokio::test]
    async fn empty_content_on_listing_action_is_empty_array_not_null() {
        let d = dispatcher_with(ToolCallResult::empty());
        let value = d.invoke("stub", args("list"), Duration::from_secs(1)).await.unwrap();
        assert_eq!(value, Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn empty_content_on_other_action_is_null() {
        let d = dispatcher_with(ToolCallResult::empty());
        let value = d.invoke("stub", args("delete"), Duration::from_secs(1)).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    struct SlowTool;

    #[async_trait]
    impl ToolAdapter for SlowTool {
        fn name(&self) -> &'static str {
            "slow"
        }
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "slow".into(),
                description: None,
                input_schema: serde_json::json!({"type": "object"}),
            }
        }
        fn is_listing_action(&self, _action: &str) -> bool {
            false
        }
        async fn call(
            &self,
            _action: &str,
            _arguments: &Map<String, Value>,
        ) -> GatewayResult<ToolCallResult> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ToolCallResult::empty())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_surfaces_as_upstream_failure() {
        let mut d = ToolDispatcher::new();
        d.register(Arc::new(SlowTool));
        let err = d
            .invoke("slow", args("get"), Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { .. }));
    }
}
