//! HTTP surface — push channel, session endpoint, direct endpoint, and
//! operational probes.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json as AxumJson, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;

use crate::protocol::{classify, ProtocolRouter, RouteReply};
use crate::session::SessionRegistry;
use crate::types::{DEFAULT_PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};

use super::encoder::{self, Framing};

/// Shared server state passed to all handlers via axum State.
pub struct GatewayState {
    pub registry: Arc<SessionRegistry>,
    pub router: Arc<ProtocolRouter>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(registry: Arc<SessionRegistry>, router: Arc<ProtocolRouter>) -> Self {
        Self {
            registry,
            router,
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/sse", get(handle_sse))
        .route("/message", post(handle_message))
        .route("/mcp", post(handle_direct))
        .route("/health", get(handle_health))
        .route("/readiness", get(handle_readiness))
        .route("/debug", get(handle_debug))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP server on the given address until shutdown is signalled.
pub async fn run(state: Arc<GatewayState>, addr: &str) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    Ok(())
}

#[derive(Deserialize)]
struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Push stream for one session: the endpoint event first, then whatever the
/// server pushes. Dropping the stream unregisters the session.
struct PushStream {
    session_id: String,
    registry: Arc<SessionRegistry>,
    endpoint_sent: bool,
    rx: mpsc::UnboundedReceiver<String>,
}

impl Stream for PushStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if !self.endpoint_sent {
            self.endpoint_sent = true;
            let endpoint = format!("/message?sessionId={}", self.session_id);
            return Poll::Ready(Some(Ok(Event::default().event("endpoint").data(endpoint))));
        }

        self.rx
            .poll_recv(cx)
            .map(|frame| frame.map(|json| Ok(Event::default().event("message").data(json))))
    }
}

impl Drop for PushStream {
    fn drop(&mut self) {
        let registry = self.registry.clone();
        let id = self.session_id.clone();
        tokio::spawn(async move {
            registry.remove(&id).await;
        });
    }
}

/// `GET /sse` — open a push channel. Mints the session id, registers it, and
/// tells the client where to post.
async fn handle_sse(
    State(state): State<Arc<GatewayState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::unbounded_channel();
    state.registry.attach_push_channel(&session_id, tx).await;

    tracing::info!(session = %session_id, "push channel opened");

    let stream = PushStream {
        session_id,
        registry: state.registry.clone(),
        endpoint_sent: false,
        rx,
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(30))
            .text("keep-alive"),
    )
}

/// `POST /message?sessionId=` — one envelope per call, answered in the
/// call's negotiated framing. A missing sessionId with a JSON body falls
/// through to the direct path; some clients post here before opening their
/// push channel.
async fn handle_message(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(session_id) = query.session_id else {
        if serde_json::from_slice::<serde_json::Value>(&body).is_ok() {
            return direct_reply(&state, &body).await;
        }
        return encoder::encode_error(
            StatusCode::BAD_REQUEST,
            &serde_json::json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32600, "message": "Missing sessionId parameter" }
            }),
        );
    };

    let session = match state.registry.get(&session_id).await {
        Ok(session) => session,
        Err(e) => {
            return encoder::encode_error(
                StatusCode::BAD_REQUEST,
                &serde_json::to_value(e.to_error_envelope(Default::default()))
                    .unwrap_or_default(),
            );
        }
    };

    let framing = encoder::negotiate(&headers);
    match state.router.handle(&session, classify(&body)).await {
        RouteReply::Framed(reply) => encoder::encode_reply(framing, &reply),
        RouteReply::BadRequest(reply) => encoder::encode_error(StatusCode::BAD_REQUEST, &reply),
        RouteReply::Empty => StatusCode::OK.into_response(),
    }
}

/// `POST /mcp` — direct single-shot endpoint. No session bootstrap, plain
/// framing, 204 for replies with no body.
async fn handle_direct(State(state): State<Arc<GatewayState>>, body: Bytes) -> Response {
    direct_reply(&state, &body).await
}

async fn direct_reply(state: &Arc<GatewayState>, body: &[u8]) -> Response {
    // Ephemeral session: direct calls carry no identity across requests.
    let session_id = format!("direct-{}", uuid::Uuid::new_v4());
    let session = state.registry.register(&session_id).await;

    let reply = state.router.handle(&session, classify(body)).await;
    state.registry.remove(&session_id).await;

    match reply {
        RouteReply::Framed(reply) => encoder::encode_reply(Framing::Plain, &reply),
        RouteReply::BadRequest(reply) => encoder::encode_error(StatusCode::BAD_REQUEST, &reply),
        RouteReply::Empty => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn handle_health(State(state): State<Arc<GatewayState>>) -> AxumJson<serde_json::Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "service": SERVER_NAME,
        "version": SERVER_VERSION,
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "tools": state.router.dispatcher().tool_names(),
        "endpoints": {
            "sse": "/sse",
            "message": "/message",
            "mcp": "/mcp",
            "health": "/health",
            "readiness": "/readiness",
            "debug": "/debug",
        },
    }))
}

async fn handle_readiness(State(state): State<Arc<GatewayState>>) -> AxumJson<serde_json::Value> {
    let tool_count = state.router.dispatcher().tool_names().len();
    AxumJson(serde_json::json!({
        "ready": tool_count > 0,
        "checks": {
            "tools": tool_count,
            "sessions": state.registry.count().await,
        },
    }))
}

/// `GET /debug` — server identity plus an optional session probe.
async fn handle_debug(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<SessionQuery>,
) -> Response {
    let mut body = serde_json::json!({
        "server": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "protocol_version": DEFAULT_PROTOCOL_VERSION,
        },
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "tools": state.router.dispatcher().tool_names(),
        "sessions": state.registry.count().await,
    });

    if let Some(session_id) = query.session_id {
        let exists = state.registry.contains(&session_id).await;
        body["session"] = serde_json::json!({ "id": session_id, "exists": exists });
    }

    let mut response = AxumJson(body).into_response();
    if state.registry.permissive() {
        if let Ok(value) = "true".parse() {
            response
                .headers_mut()
                .insert("X-Accept-Any-Session", value);
        }
    }
    response
}
