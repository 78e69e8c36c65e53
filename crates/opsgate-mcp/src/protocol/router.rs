//! The single dispatch engine behind every entry point.
//!
//! Both the session-scoped request endpoint and the direct endpoint feed
//! classified messages through here, so handshake and routing behavior cannot
//! diverge between them.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::session::SessionState;
use crate::tools::ToolDispatcher;
use crate::types::{
    GatewayError, RequestId, ResponseEnvelope, ToolCallParams, ToolListResult,
};

use super::classifier::{Classified, MalformedReason};
use super::handshake::{self, HandshakeOutcome};

/// Method names on the wire. `callTool` is the legacy alias kept for older
/// callers; both reach the same dispatch path.
const METHOD_INITIALIZE: &str = "initialize";
const METHOD_TOOLS_LIST: &str = "tools/list";
const METHOD_TOOLS_CALL: &str = "tools/call";
const METHOD_CALL_TOOL_LEGACY: &str = "callTool";
const METHOD_PING: &str = "ping";

/// What the transport should do with one handled message.
pub enum RouteReply {
    /// Emit this envelope in the call's negotiated framing, HTTP 200.
    Framed(Value),
    /// Client-level error: plain JSON envelope with this HTTP status.
    BadRequest(Value),
    /// Success with no body (absorbed acks, empty-method no-ops).
    Empty,
}

pub struct ProtocolRouter {
    dispatcher: Arc<ToolDispatcher>,
    call_deadline: Duration,
}

impl ProtocolRouter {
    pub fn new(dispatcher: Arc<ToolDispatcher>, call_deadline: Duration) -> Self {
        Self {
            dispatcher,
            call_deadline,
        }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Handle one classified message for a session. Exactly one reply per
    /// message; pure acknowledgments yield a status with no body.
    pub async fn handle(
        &self,
        session: &Arc<Mutex<SessionState>>,
        classified: Classified,
    ) -> RouteReply {
        match classified {
            Classified::Malformed { reason, id } => self.handle_malformed(reason, id),
            Classified::Acknowledgment { id, is_error } => {
                match handshake::acknowledge(session, &id, is_error).await {
                    HandshakeOutcome::Ready(notification) => {
                        let body = json_or_internal(&notification, id);
                        self.deliver_notification(session, body).await
                    }
                    _ => RouteReply::Empty,
                }
            }
            Classified::Request { method, id, params } => {
                self.handle_request(session, &method, id, params).await
            }
        }
    }

    /// Deliver a server-initiated notification: over the session's push
    /// channel when one is open, otherwise as this call's reply body. A dead
    /// channel is detached and the reply path used instead.
    async fn deliver_notification(
        &self,
        session: &Arc<Mutex<SessionState>>,
        body: Value,
    ) -> RouteReply {
        let mut session = session.lock().await;
        if let Some(tx) = &session.push_tx {
            if tx.send(body.to_string()).is_ok() {
                tracing::debug!(session = %session.id, "notification pushed over channel");
                return RouteReply::Empty;
            }
            session.push_tx = None;
        }
        RouteReply::Framed(body)
    }

    fn handle_malformed(&self, reason: MalformedReason, id: RequestId) -> RouteReply {
        match reason {
            MalformedReason::EmptyBody => RouteReply::BadRequest(
                error_body(GatewayError::Parse("Empty request body".into()), id),
            ),
            MalformedReason::NotAnObject => RouteReply::BadRequest(error_body(
                GatewayError::Parse("Invalid request format - expected JSON-RPC".into()),
                id,
            )),
            MalformedReason::UnsupportedVersion(version) => RouteReply::BadRequest(error_body(
                GatewayError::InvalidRequest(format!(
                    "Unsupported JSON-RPC version: {version}"
                )),
                id,
            )),
            // Degenerate ack-shaped payload; answered with success so the
            // caller's connection does not appear broken.
            MalformedReason::EmptyMethod => {
                tracing::warn!("request with empty method treated as no-op");
                RouteReply::Empty
            }
        }
    }

    async fn handle_request(
        &self,
        session: &Arc<Mutex<SessionState>>,
        method: &str,
        id: RequestId,
        params: Option<Value>,
    ) -> RouteReply {
        match method {
            METHOD_INITIALIZE => match handshake::initialize(session, id.clone(), params).await {
                Ok(HandshakeOutcome::Reply(envelope)) => {
                    RouteReply::Framed(json_or_internal(&envelope, id))
                }
                Ok(_) => RouteReply::Empty,
                Err(e) => RouteReply::Framed(error_body(e, id)),
            },

            METHOD_TOOLS_LIST => {
                let result = ToolListResult {
                    tools: self.dispatcher.definitions(),
                };
                let envelope = ResponseEnvelope::new(
                    id.clone(),
                    serde_json::to_value(&result).unwrap_or_default(),
                );
                RouteReply::Framed(json_or_internal(&envelope, id))
            }

            METHOD_TOOLS_CALL | METHOD_CALL_TOOL_LEGACY => {
                self.handle_tool_call(id, params).await
            }

            METHOD_PING => {
                let envelope = ResponseEnvelope::new(id.clone(), json!({}));
                RouteReply::Framed(json_or_internal(&envelope, id))
            }

            other => RouteReply::Framed(error_body(
                GatewayError::MethodNotFound(other.to_string()),
                id,
            )),
        }
    }

    async fn handle_tool_call(&self, id: RequestId, params: Option<Value>) -> RouteReply {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(p) => p,
                Err(e) => {
                    return RouteReply::Framed(error_body(
                        GatewayError::InvalidParams(e.to_string()),
                        id,
                    ))
                }
            },
            None => ToolCallParams::default(),
        };

        let Some(name) = params.name else {
            return RouteReply::Framed(error_body(
                GatewayError::InvalidParams("missing tool name".into()),
                id,
            ));
        };

        match self
            .dispatcher
            .invoke(&name, params.arguments, self.call_deadline)
            .await
        {
            Ok(result) => {
                let envelope = ResponseEnvelope::new(id.clone(), result);
                RouteReply::Framed(json_or_internal(&envelope, id))
            }
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool invocation failed");
                RouteReply::Framed(error_body(e, id))
            }
        }
    }
}

fn error_body(error: GatewayError, id: RequestId) -> Value {
    serde_json::to_value(error.to_error_envelope(id)).unwrap_or_default()
}

fn json_or_internal(value: &impl serde::Serialize, id: RequestId) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|e| error_body(GatewayError::Internal(e.to_string()), id))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::Map;

    use crate::protocol::classify;
    use crate::session::SessionRegistry;
    use crate::tools::ToolAdapter;
    use crate::types::{GatewayResult, ToolCallResult, ToolDefinition};

    use super::*;

    struct EchoTool;

    #[async_trait]
    impl ToolAdapter for EchoTool {
        fn name(&self) -> &'static str {
            "integrations"
        }
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "integrations".into(),
                description: None,
                input_schema: json!({"type": "object"}),
            }
        }
        fn is_listing_action(&self, action: &str) -> bool {
            matches!(action, "list" | "listTypes")
        }
        async fn call(
            &self,
            _action: &str,
            _arguments: &Map<String, Value>,
        ) -> GatewayResult<ToolCallResult> {
            Ok(ToolCallResult::empty())
        }
    }

    fn router() -> ProtocolRouter {
        let mut dispatcher = ToolDispatcher::new();
        dispatcher.register(Arc::new(EchoTool));
        ProtocolRouter::new(Arc::new(dispatcher), Duration::from_secs(5))
    }

    async fn route(router: &ProtocolRouter, body: &str) -> RouteReply {
        let session = SessionRegistry::new(true).register("s").await;
        router.handle(&session, classify(body.as_bytes())).await
    }

    #[tokio::test]
    async fn unknown_method_echoes_id() {
        let reply = route(&router(), r#"{"jsonrpc":"2.0","id":42,"method":"foo"}"#).await;
        match reply {
            RouteReply::Framed(body) => {
                assert_eq!(body["id"], 42);
                assert_eq!(body["error"]["code"], -32601);
            }
            _ => panic!("expected framed error"),
        }
    }

    #[tokio::test]
    async fn tools_list_returns_definitions() {
        let reply = route(&router(), r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;
        match reply {
            RouteReply::Framed(body) => {
                let tools = body["result"]["tools"].as_array().unwrap();
                assert_eq!(tools.len(), 1);
                assert_eq!(tools[0]["name"], "integrations");
            }
            _ => panic!("expected framed result"),
        }
    }

    #[tokio::test]
    async fn legacy_call_tool_alias_reaches_dispatch() {
        let body = r#"{"jsonrpc":"2.0","id":2,"method":"callTool","params":{"name":"integrations","arguments":{"action":"list"}}}"#;
        match route(&router(), body).await {
            RouteReply::Framed(reply) => {
                // Empty content on a listing action canonicalizes to [].
                assert_eq!(reply["result"], json!([]));
            }
            _ => panic!("expected framed result"),
        }
    }

    #[tokio::test]
    async fn tool_call_without_name_is_invalid_params() {
        let body = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"arguments":{"action":"list"}}}"#;
        match route(&router(), body).await {
            RouteReply::Framed(reply) => assert_eq!(reply["error"]["code"], -32602),
            _ => panic!("expected framed error"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_tool_not_found() {
        let body = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"does-not-exist","arguments":{"action":"list"}}}"#;
        match route(&router(), body).await {
            RouteReply::Framed(reply) => assert_eq!(reply["error"]["code"], -32803),
            _ => panic!("expected framed error"),
        }
    }

    #[tokio::test]
    async fn bad_version_is_client_error_with_id() {
        match route(&router(), r#"{"jsonrpc":"1.0","id":9,"method":"ping"}"#).await {
            RouteReply::BadRequest(body) => {
                assert_eq!(body["id"], 9);
                assert_eq!(body["error"]["code"], -32600);
            }
            _ => panic!("expected bad request"),
        }
    }

    #[tokio::test]
    async fn empty_method_is_silent_success() {
        match route(&router(), r#"{"jsonrpc":"2.0","id":5,"method":""}"#).await {
            RouteReply::Empty => {}
            _ => panic!("expected empty success"),
        }
    }

    #[tokio::test]
    async fn ready_notification_prefers_an_open_push_channel() {
        let r = router();
        let registry = SessionRegistry::new(false);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        registry.attach_push_channel("s", tx).await;
        let session = registry.get("s").await.unwrap();

        let init = classify(br#"{"jsonrpc":"2.0","id":0,"method":"initialize"}"#);
        r.handle(&session, init).await;

        let ack = classify(br#"{"jsonrpc":"2.0","id":1,"result":{}}"#);
        match r.handle(&session, ack).await {
            RouteReply::Empty => {}
            _ => panic!("pushed notification must leave the reply empty"),
        }
        let frame = rx.recv().await.unwrap();
        assert!(frame.contains("\"initialized\""));
    }

    #[tokio::test]
    async fn dead_push_channel_falls_back_to_the_reply_body() {
        let r = router();
        let registry = SessionRegistry::new(false);
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        registry.attach_push_channel("s", tx).await;
        drop(rx);
        let session = registry.get("s").await.unwrap();

        let init = classify(br#"{"jsonrpc":"2.0","id":0,"method":"initialize"}"#);
        r.handle(&session, init).await;

        let ack = classify(br#"{"jsonrpc":"2.0","id":1,"result":{}}"#);
        match r.handle(&session, ack).await {
            RouteReply::Framed(body) => assert_eq!(body["method"], "initialized"),
            _ => panic!("expected fallback to the reply body"),
        }
        assert!(session.lock().await.push_tx.is_none());
    }

    #[tokio::test]
    async fn ping_answers_empty_object() {
        match route(&router(), r#"{"jsonrpc":"2.0","id":6,"method":"ping"}"#).await {
            RouteReply::Framed(reply) => assert_eq!(reply["result"], json!({})),
            _ => panic!("expected framed result"),
        }
    }
}
