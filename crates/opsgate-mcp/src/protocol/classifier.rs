//! Inbound message classification.
//!
//! Widely deployed clients diverge from strict JSON-RPC: they post
//! acknowledgment-shaped envelopes with no method, echo both `id` and
//! `result`, or send a present-but-empty method string. Classification is a
//! fixed precedence order so these ambiguities resolve the same way on every
//! entry point. The acknowledgment check runs before the request check: an
//! envelope carrying `result` without `method` is an ack, not garbage.

use serde_json::Value;

use crate::types::{RawEnvelope, RequestId, JSONRPC_VERSION};

/// Label assigned to one inbound message.
#[derive(Debug, Clone)]
pub enum Classified {
    /// A well-formed request (or inbound notification) to route.
    Request {
        method: String,
        id: RequestId,
        params: Option<Value>,
    },
    /// A response-shaped envelope: the client acknowledging something we sent.
    Acknowledgment { id: RequestId, is_error: bool },
    /// Everything else, with the reason and whatever id was salvageable.
    Malformed { reason: MalformedReason, id: RequestId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    EmptyBody,
    NotAnObject,
    UnsupportedVersion(String),
    /// Method present but empty. Answered with an empty success, not an
    /// error: degenerate acknowledgment payloads from real clients look like
    /// this.
    EmptyMethod,
}

/// Classify a raw request body.
pub fn classify(body: &[u8]) -> Classified {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return malformed(MalformedReason::EmptyBody, RequestId::Null);
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return malformed(MalformedReason::NotAnObject, RequestId::Null),
    };

    if !value.is_object() {
        return malformed(MalformedReason::NotAnObject, RequestId::Null);
    }

    let envelope: RawEnvelope = match serde_json::from_value(value) {
        Ok(e) => e,
        Err(_) => return malformed(MalformedReason::NotAnObject, RequestId::Null),
    };

    classify_envelope(envelope)
}

fn classify_envelope(envelope: RawEnvelope) -> Classified {
    let id = envelope.id.unwrap_or_default();

    if let Some(version) = &envelope.jsonrpc {
        if version != JSONRPC_VERSION {
            return malformed(MalformedReason::UnsupportedVersion(version.clone()), id);
        }
    }

    // Ack before request: clients echo both id and result without a method.
    if envelope.method.is_none() && (envelope.result.is_some() || envelope.error.is_some()) {
        return Classified::Acknowledgment {
            id,
            is_error: envelope.error.is_some(),
        };
    }

    match envelope.method {
        Some(method) if !method.is_empty() => Classified::Request {
            method,
            id,
            params: envelope.params,
        },
        Some(_) => malformed(MalformedReason::EmptyMethod, id),
        None => malformed(MalformedReason::NotAnObject, id),
    }
}

fn malformed(reason: MalformedReason, id: RequestId) -> Classified {
    Classified::Malformed { reason, id }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_str(s: &str) -> Classified {
        classify(s.as_bytes())
    }

    #[test]
    fn empty_body_is_malformed() {
        match classify_str("") {
            Classified::Malformed { reason, .. } => assert_eq!(reason, MalformedReason::EmptyBody),
            other => panic!("expected malformed, got {other:?}"),
        }
        match classify_str("   \n") {
            Classified::Malformed { reason, .. } => assert_eq!(reason, MalformedReason::EmptyBody),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn non_json_is_not_an_object() {
        for body in ["not json at all", "[1,2,3]", "42"] {
            match classify_str(body) {
                Classified::Malformed { reason, .. } => {
                    assert_eq!(reason, MalformedReason::NotAnObject);
                }
                other => panic!("expected malformed for {body}, got {other:?}"),
            }
        }
    }

    #[test]
    fn bad_version_preserves_id() {
        match classify_str(r#"{"jsonrpc":"1.0","id":9,"method":"ping"}"#) {
            Classified::Malformed { reason, id } => {
                assert_eq!(reason, MalformedReason::UnsupportedVersion("1.0".into()));
                assert_eq!(id, RequestId::Number(9));
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn ack_wins_over_request_when_method_absent() {
        match classify_str(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#) {
            Classified::Acknowledgment { id, is_error } => {
                assert_eq!(id, RequestId::Number(1));
                assert!(!is_error);
            }
            other => panic!("expected ack, got {other:?}"),
        }
    }

    #[test]
    fn error_ack_is_flagged() {
        match classify_str(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-1,"message":"x"}}"#) {
            Classified::Acknowledgment { is_error, .. } => assert!(is_error),
            other => panic!("expected ack, got {other:?}"),
        }
    }

    #[test]
    fn request_with_method_and_result_still_routes_as_request() {
        // Method presence dominates once the no-method ack rule has not fired.
        match classify_str(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list","result":{}}"#) {
            Classified::Request { method, .. } => assert_eq!(method, "tools/list"),
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn empty_method_is_its_own_reason() {
        match classify_str(r#"{"jsonrpc":"2.0","id":3,"method":""}"#) {
            Classified::Malformed { reason, id } => {
                assert_eq!(reason, MalformedReason::EmptyMethod);
                assert_eq!(id, RequestId::Number(3));
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn method_less_envelope_without_result_is_invalid() {
        match classify_str(r#"{"jsonrpc":"2.0","id":4}"#) {
            Classified::Malformed { reason, .. } => {
                assert_eq!(reason, MalformedReason::NotAnObject);
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn missing_version_field_is_tolerated() {
        match classify_str(r#"{"id":5,"method":"ping"}"#) {
            Classified::Request { method, id, .. } => {
                assert_eq!(method, "ping");
                assert_eq!(id, RequestId::Number(5));
            }
            other => panic!("expected request, got {other:?}"),
        }
    }
}
