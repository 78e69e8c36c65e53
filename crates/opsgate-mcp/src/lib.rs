//! OpsGate MCP — protocol gateway exposing infrastructure-management tools
//! over JSON-RPC 2.0 with HTTP and SSE transports.

pub mod config;
pub mod protocol;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::GatewayConfig;
pub use protocol::ProtocolRouter;
pub use session::SessionRegistry;
pub use tools::ToolDispatcher;
pub use transport::GatewayState;
