//! Per-session handshake coordination.
//!
//! Three steps: the client requests `initialize`, we answer and move to
//! `AwaitingAck`; the client acknowledges (deployed clients use id 1 after an
//! initialize with id 0), we move to `Ready` and emit one `initialized`
//! notification. Every other acknowledgment is absorbed as a no-op so the
//! caller's connection never looks broken. The handshake is advisory: tool
//! calls are routed regardless of state.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::session::{HandshakeState, SessionState};
use crate::types::{
    GatewayError, GatewayResult, InitializeParams, InitializeResult, NotificationEnvelope,
    RequestId, ResponseEnvelope,
};

/// Id the deployed clients use for the post-initialize acknowledgment. This
/// mirrors one specific client's numbering, not a protocol guarantee.
const INIT_ACK_ID: i64 = 1;

/// What one handshake-relevant message produced.
pub enum HandshakeOutcome {
    /// The initialize reply, to emit in the call's negotiated framing.
    Reply(ResponseEnvelope),
    /// Handshake completed: emit the `initialized` notification, once.
    Ready(NotificationEnvelope),
    /// No-op acknowledgment: success at the transport level, no body.
    Absorbed,
}

/// Answer an `initialize` request and move the session to `AwaitingAck`,
/// regardless of its current state. Never delegated to tool dispatch.
pub async fn initialize(
    session: &Arc<Mutex<SessionState>>,
    id: RequestId,
    params: Option<Value>,
) -> GatewayResult<HandshakeOutcome> {
    let params: InitializeParams = match params {
        Some(p) => serde_json::from_value(p)
            .map_err(|e| GatewayError::InvalidParams(e.to_string()))?,
        None => InitializeParams::default(),
    };

    let result = InitializeResult::for_version(params.protocol_version.as_deref());

    let mut session = session.lock().await;
    session.handshake = HandshakeState::AwaitingAck;
    tracing::info!(
        session = %session.id,
        protocol_version = %result.protocol_version,
        "initialize answered, awaiting acknowledgment"
    );

    let value = serde_json::to_value(&result)?;
    Ok(HandshakeOutcome::Reply(ResponseEnvelope::new(id, value)))
}

/// Advance the session for an acknowledgment envelope.
pub async fn acknowledge(
    session: &Arc<Mutex<SessionState>>,
    id: &RequestId,
    is_error: bool,
) -> HandshakeOutcome {
    let mut session = session.lock().await;

    if is_error {
        tracing::debug!(session = %session.id, %id, "error acknowledgment absorbed");
        return HandshakeOutcome::Absorbed;
    }

    if id.as_number() == Some(INIT_ACK_ID) && session.handshake == HandshakeState::AwaitingAck {
        session.handshake = HandshakeState::Ready;
        tracing::info!(session = %session.id, "handshake complete, emitting initialized notification");
        return HandshakeOutcome::Ready(NotificationEnvelope::new("initialized"));
    }

    // Duplicate or out-of-order ack. State never regresses and the
    // notification never fires twice.
    tracing::debug!(
        session = %session.id,
        %id,
        state = ?session.handshake,
        "acknowledgment absorbed without transition"
    );
    HandshakeOutcome::Absorbed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRegistry;

    async fn fresh_session() -> Arc<Mutex<SessionState>> {
        SessionRegistry::new(false).register("s1").await
    }

    #[tokio::test]
    async fn initialize_sets_awaiting_ack_and_echoes_version() {
        let session = fresh_session().await;
        let params = serde_json::json!({"protocolVersion": "2024-11-05"});
        let outcome = initialize(&session, RequestId::Number(0), Some(params))
            .await
            .unwrap();

        match outcome {
            HandshakeOutcome::Reply(envelope) => {
                assert_eq!(envelope.id, RequestId::Number(0));
                assert_eq!(envelope.result["protocolVersion"], "2024-11-05");
                assert!(envelope.result["capabilities"]["tools"].is_object());
            }
            _ => panic!("expected reply"),
        }
        assert_eq!(session.lock().await.handshake, HandshakeState::AwaitingAck);
    }

    #[tokio::test]
    async fn ack_one_while_awaiting_produces_single_notification() {
        let session = fresh_session().await;
        initialize(&session, RequestId::Number(0), None).await.unwrap();

        match acknowledge(&session, &RequestId::Number(1), false).await {
            HandshakeOutcome::Ready(n) => assert_eq!(n.method, "initialized"),
            _ => panic!("expected ready notification"),
        }
        assert_eq!(session.lock().await.handshake, HandshakeState::Ready);

        // Second identical ack: absorbed, no second notification.
        match acknowledge(&session, &RequestId::Number(1), false).await {
            HandshakeOutcome::Absorbed => {}
            _ => panic!("duplicate ack must be absorbed"),
        }
        assert_eq!(session.lock().await.handshake, HandshakeState::Ready);
    }

    #[tokio::test]
    async fn ack_before_initialize_is_absorbed() {
        let session = fresh_session().await;
        match acknowledge(&session, &RequestId::Number(1), false).await {
            HandshakeOutcome::Absorbed => {}
            _ => panic!("out-of-order ack must be absorbed"),
        }
        assert_eq!(session.lock().await.handshake, HandshakeState::Uninitialized);
    }

    #[tokio::test]
    async fn error_and_mismatched_acks_do_not_transition() {
        let session = fresh_session().await;
        initialize(&session, RequestId::Number(0), None).await.unwrap();

        match acknowledge(&session, &RequestId::Number(1), true).await {
            HandshakeOutcome::Absorbed => {}
            _ => panic!("error ack must be absorbed"),
        }
        match acknowledge(&session, &RequestId::Number(7), false).await {
            HandshakeOutcome::Absorbed => {}
            _ => panic!("mismatched id must be absorbed"),
        }
        assert_eq!(session.lock().await.handshake, HandshakeState::AwaitingAck);
    }

    #[tokio::test]
    async fn reinitialize_resets_to_awaiting_ack() {
        let session = fresh_session().await;
        initialize(&session, RequestId::Number(0), None).await.unwrap();
        acknowledge(&session, &RequestId::Number(1), false).await;
        assert_eq!(session.lock().await.handshake, HandshakeState::Ready);

        // A fresh initialize re-arms the ack step for clients that restart
        // their handshake over a live channel.
        initialize(&session, RequestId::Number(0), None).await.unwrap();
        assert_eq!(session.lock().await.handshake, HandshakeState::AwaitingAck);
    }
}
