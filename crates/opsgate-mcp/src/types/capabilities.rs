//! Capability and initialization types.

use serde::{Deserialize, Serialize};

/// Protocol version answered when a client does not request one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "OpsGate MCP";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Parameters of the `initialize` request. Everything is optional: deployed
/// clients omit fields or send the bare minimum.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub client_info: Option<Implementation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingCapability {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    #[serde(default)]
    pub list_changed: bool,
    #[serde(default)]
    pub subscribe: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    #[serde(default)]
    pub list_changed: bool,
}

impl InitializeResult {
    /// Build the bootstrap reply, echoing the protocol version the client
    /// asked for.
    pub fn for_version(requested: Option<&str>) -> Self {
        Self {
            protocol_version: requested.unwrap_or(DEFAULT_PROTOCOL_VERSION).to_string(),
            capabilities: ServerCapabilities {
                logging: Some(LoggingCapability {}),
                resources: Some(ResourcesCapability {
                    list_changed: true,
                    subscribe: false,
                }),
                tools: Some(ToolsCapability { list_changed: true }),
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            instructions: Some(
                "OpsGate MCP server providing access to infrastructure integrations and \
                 resources. Use the 'integrations' tool to manage integrations and the \
                 'resources' tool to access managed resources."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_requested_protocol_version() {
        let result = InitializeResult::for_version(Some("2025-03-26"));
        assert_eq!(result.protocol_version, "2025-03-26");
    }

    #[test]
    fn defaults_protocol_version_when_absent() {
        let result = InitializeResult::for_version(None);
        assert_eq!(result.protocol_version, DEFAULT_PROTOCOL_VERSION);
        assert!(result.capabilities.tools.unwrap().list_changed);
    }
}
