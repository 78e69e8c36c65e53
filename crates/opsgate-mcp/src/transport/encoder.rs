//! Per-call framing negotiation and reply encoding.
//!
//! Each POST picks its own framing from the `Accept` header; it is a property
//! of the call, not the session. A caller holding an open push channel still
//! gets plain JSON when it posts without asking for the stream framing.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

/// How one reply is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Plain JSON body, `application/json`.
    Plain,
    /// Single SSE frame in the response body, `text/event-stream`.
    Pushed,
}

/// Pick the framing for one call from its `Accept` header.
pub fn negotiate(headers: &HeaderMap) -> Framing {
    let accepts_stream = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/event-stream"))
        .unwrap_or(false);

    if accepts_stream {
        Framing::Pushed
    } else {
        Framing::Plain
    }
}

/// Render one envelope as an SSE message frame.
pub fn render_sse_frame(body: &Value) -> String {
    format!("event: message\ndata: {body}\n\n")
}

/// Encode a reply body in the negotiated framing, HTTP 200.
pub fn encode_reply(framing: Framing, body: &Value) -> Response {
    match framing {
        Framing::Plain => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response(),
        Framing::Pushed => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            render_sse_frame(body),
        )
            .into_response(),
    }
}

/// Plain-JSON error reply at a caller-visible status. Errors never use the
/// stream framing.
pub fn encode_error(status: StatusCode, body: &Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn default_is_plain() {
        assert_eq!(negotiate(&HeaderMap::new()), Framing::Plain);
    }

    #[test]
    fn event_stream_accept_selects_pushed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        assert_eq!(negotiate(&headers), Framing::Pushed);

        let mut mixed = HeaderMap::new();
        mixed.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/event-stream"),
        );
        assert_eq!(negotiate(&mixed), Framing::Pushed);
    }

    #[test]
    fn json_accept_stays_plain() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        assert_eq!(negotiate(&headers), Framing::Plain);
    }

    #[test]
    fn sse_frame_shape() {
        let frame = render_sse_frame(&json!({"jsonrpc":"2.0","id":1,"result":{}}));
        assert!(frame.starts_with("event: message\ndata: {"));
        assert!(frame.ends_with("\n\n"));
    }
}
