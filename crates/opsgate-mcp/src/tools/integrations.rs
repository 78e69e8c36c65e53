//! Tool: integrations — lifecycle operations for installed integrations.

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use opsgate_client::IntegrationsApi;

use crate::types::{GatewayError, GatewayResult, ToolCallResult, ToolDefinition};

use super::dispatch::ToolAdapter;

/// Operations the integrations tool supports, parsed once from the `action`
/// argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationAction {
    List,
    Get,
    GetDetailed,
    Create,
    Update,
    Delete,
    Enable,
    Disable,
    ListTypes,
    GetType,
}

impl IntegrationAction {
    pub const NAMES: [&'static str; 10] = [
        "list", "get", "getDetailed", "create", "update", "delete", "enable", "disable",
        "listTypes", "getType",
    ];
}

impl FromStr for IntegrationAction {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "get" => Ok(Self::Get),
            "getDetailed" => Ok(Self::GetDetailed),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "listTypes" => Ok(Self::ListTypes),
            "getType" => Ok(Self::GetType),
            other => Err(GatewayError::InvalidParams(format!(
                "unknown integrations action '{other}', expected one of: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }
}

pub struct IntegrationsTool {
    api: IntegrationsApi,
}

impl IntegrationsTool {
    pub fn new(api: IntegrationsApi) -> Self {
        Self { api }
    }
}

fn required_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> GatewayResult<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::InvalidParams(format!("missing required argument '{key}'")))
}

#[async_trait]
impl ToolAdapter for IntegrationsTool {
    fn name(&self) -> &'static str {
        "integrations"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "integrations".to_string(),
            description: Some(
                "Manage integrations: list, inspect, install, update, enable/disable, \
                 and browse supported integration types"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": IntegrationAction::NAMES,
                        "description": "Operation to perform"
                    },
                    "id": { "type": "string", "description": "Integration id (get/update/delete/enable/disable/getType)" },
                    "type": { "type": "string", "description": "Integration type to install (create)" },
                    "config": { "type": "object", "description": "Integration configuration (create/update)" }
                },
                "required": ["action"]
            }),
        }
    }

    fn is_listing_action(&self, action: &str) -> bool {
        matches!(action, "list" | "listTypes")
    }

    async fn call(
        &self,
        action: &str,
        arguments: &Map<String, Value>,
    ) -> GatewayResult<ToolCallResult> {
        let action = IntegrationAction::from_str(action)?;

        let result = match action {
            IntegrationAction::List => {
                let integrations = self.api.list().await?;
                ToolCallResult::json(&integrations)
            }
            IntegrationAction::Get => {
                let id = required_str(arguments, "id")?;
                ToolCallResult::json(&self.api.get(id).await?)
            }
            IntegrationAction::GetDetailed => {
                let id = required_str(arguments, "id")?;
                ToolCallResult::json(&self.api.get_detailed(id).await?)
            }
            IntegrationAction::Create => {
                let type_name = required_str(arguments, "type")?;
                let config = arguments.get("config").cloned().unwrap_or(json!({}));
                ToolCallResult::json(&self.api.create(type_name, &config).await?)
            }
            IntegrationAction::Update => {
                let id = required_str(arguments, "id")?;
                let config = arguments.get("config").cloned().unwrap_or(json!({}));
                ToolCallResult::json(&self.api.update(id, &config).await?)
            }
            IntegrationAction::Delete => {
                let id = required_str(arguments, "id")?;
                self.api.delete(id).await?;
                ToolCallResult::text(format!("integration {id} deleted"))
            }
            IntegrationAction::Enable => {
                let id = required_str(arguments, "id")?;
                self.api.enable(id).await?;
                ToolCallResult::text(format!("integration {id} enabled"))
            }
            IntegrationAction::Disable => {
                let id = required_str(arguments, "id")?;
                self.api.disable(id).await?;
                ToolCallResult::text(format!("integration {id} disabled"))
            }
            IntegrationAction::ListTypes => ToolCallResult::json(&self.api.list_types()),
            IntegrationAction::GetType => {
                let id = required_str(arguments, "id")?;
                ToolCallResult::json(&self.api.get_type(id)?)
            }
        };

        Ok(result)
    }
}
