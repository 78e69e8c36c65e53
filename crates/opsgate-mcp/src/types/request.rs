//! Request parameter types.

use serde::Deserialize;
use serde_json::Value;

/// Parameters of `tools/call` and its legacy `callTool` alias. `name` is
/// validated by the router; `arguments.action` names the operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
}
