//! Gateway error taxonomy and JSON-RPC error codes.

use serde_json::Value;

use super::message::{ErrorEnvelope, ErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Gateway-specific error codes.
pub mod gateway_error_codes {
    /// Upstream management API failure or call deadline exceeded.
    pub const UPSTREAM_FAILURE: i32 = -32000;
    pub const TOOL_NOT_FOUND: i32 = -32803;
    pub const SESSION_NOT_FOUND: i32 = -32851;
}

/// All errors the gateway can answer a call with. Nothing here crashes the
/// process; each becomes exactly one reply.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Missing action parameter")]
    MissingAction,

    #[error("Upstream failure: {message}")]
    Upstream {
        message: String,
        cause: Option<Value>,
    },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use gateway_error_codes::*;
        match self {
            GatewayError::Parse(_) | GatewayError::Json(_) => PARSE_ERROR,
            GatewayError::InvalidRequest(_) => INVALID_REQUEST,
            GatewayError::MethodNotFound(_) => METHOD_NOT_FOUND,
            GatewayError::InvalidParams(_) | GatewayError::MissingAction => INVALID_PARAMS,
            GatewayError::Internal(_) | GatewayError::Transport(_) | GatewayError::Io(_) => {
                INTERNAL_ERROR
            }
            GatewayError::ToolNotFound(_) => TOOL_NOT_FOUND,
            GatewayError::Upstream { .. } => UPSTREAM_FAILURE,
            GatewayError::SessionNotFound(_) => SESSION_NOT_FOUND,
        }
    }

    /// The `data` payload carried on the wire, where one exists. For upstream
    /// failures this is the adapter's cause.
    pub fn data(&self) -> Option<Value> {
        match self {
            GatewayError::Upstream { cause, .. } => cause.clone(),
            _ => None,
        }
    }

    pub fn to_error_envelope(&self, id: RequestId) -> ErrorEnvelope {
        ErrorEnvelope {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: ErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: self.data(),
            },
        }
    }
}

impl From<opsgate_client::ClientError> for GatewayError {
    fn from(e: opsgate_client::ClientError) -> Self {
        let cause = match &e {
            opsgate_client::ClientError::Api { status, body } => Some(serde_json::json!({
                "status": status,
                "body": body,
            })),
            _ => None,
        };
        GatewayError::Upstream {
            message: e.to_string(),
            cause,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_carries_cause_in_data() {
        let err = GatewayError::Upstream {
            message: "boom".into(),
            cause: Some(serde_json::json!({"status": 502})),
        };
        let envelope = err.to_error_envelope(RequestId::Number(5));
        assert_eq!(envelope.error.code, gateway_error_codes::UPSTREAM_FAILURE);
        assert_eq!(envelope.error.data.unwrap()["status"], 502);
        assert_eq!(envelope.id, RequestId::Number(5));
    }

    #[test]
    fn method_not_found_uses_standard_code() {
        let err = GatewayError::MethodNotFound("foo".into());
        assert_eq!(err.code(), error_codes::METHOD_NOT_FOUND);
        assert!(err.data().is_none());
    }
}
