//! Tool: resources — search, CRUD, bulk operations, state, metrics, and tags
//! for managed infrastructure resources.

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use opsgate_client::types::{
    ResourceBulkDeleteRequest, ResourceBulkUpdateRequest, ResourceMetricsRequest,
    ResourceSearchParams, ResourceStateChangeRequest, Tag,
};
use opsgate_client::ResourcesApi;

use crate::types::{GatewayError, GatewayResult, ToolCallResult, ToolDefinition};

use super::dispatch::ToolAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Search,
    Get,
    GetDetailed,
    Create,
    Update,
    Delete,
    BulkUpdate,
    BulkDelete,
    GetResourceTypes,
    ChangeState,
    GetMetrics,
    GetTags,
    UpdateTags,
}

impl ResourceAction {
    pub const NAMES: [&'static str; 14] = [
        "search",
        "list",
        "get",
        "getDetailed",
        "create",
        "update",
        "delete",
        "bulkUpdate",
        "bulkDelete",
        "getResourceTypes",
        "changeState",
        "getMetrics",
        "getTags",
        "updateTags",
    ];
}

impl FromStr for ResourceAction {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // "list" is the legacy spelling some callers still use.
            "search" | "list" => Ok(Self::Search),
            "get" => Ok(Self::Get),
            "getDetailed" => Ok(Self::GetDetailed),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "bulkUpdate" => Ok(Self::BulkUpdate),
            "bulkDelete" => Ok(Self::BulkDelete),
            "getResourceTypes" => Ok(Self::GetResourceTypes),
            "changeState" => Ok(Self::ChangeState),
            "getMetrics" => Ok(Self::GetMetrics),
            "getTags" => Ok(Self::GetTags),
            "updateTags" => Ok(Self::UpdateTags),
            other => Err(GatewayError::InvalidParams(format!(
                "unknown resources action '{other}', expected one of: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }
}

pub struct ResourcesTool {
    api: ResourcesApi,
}

impl ResourcesTool {
    pub fn new(api: ResourcesApi) -> Self {
        Self { api }
    }
}

fn required_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> GatewayResult<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::InvalidParams(format!("missing required argument '{key}'")))
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> GatewayResult<T> {
    serde_json::from_value(value)
        .map_err(|e| GatewayError::InvalidParams(format!("invalid {what}: {e}")))
}

#[async_trait]
impl ToolAdapter for ResourcesTool {
    fn name(&self) -> &'static str {
        "resources"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "resources".to_string(),
            description: Some(
                "Access managed resources: search with filters and pagination, inspect, \
                 create, update, bulk operations, state changes, metrics, and tags"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ResourceAction::NAMES,
                        "description": "Operation to perform"
                    },
                    "id": { "type": "string", "description": "Resource id" },
                    "params": { "type": "object", "description": "Search filters and pagination (search)" },
                    "resource": { "type": "object", "description": "Resource document (create/update)" },
                    "resourceIds": { "type": "array", "items": {"type": "string"}, "description": "Targets (bulkUpdate/bulkDelete)" },
                    "updates": { "type": "object", "description": "Field updates (bulkUpdate)" },
                    "state": { "type": "string", "description": "New state (changeState)" },
                    "metrics": { "type": "object", "description": "Metric query (getMetrics)" },
                    "tags": { "type": "array", "description": "Tags to set (updateTags)" }
                },
                "required": ["action"]
            }),
        }
    }

    fn is_listing_action(&self, action: &str) -> bool {
        matches!(action, "search" | "list" | "getResourceTypes")
    }

    async fn call(
        &self,
        action: &str,
        arguments: &Map<String, Value>,
    ) -> GatewayResult<ToolCallResult> {
        let action = ResourceAction::from_str(action)?;

        let result = match action {
            ResourceAction::Search => {
                let params: ResourceSearchParams = match arguments.get("params") {
                    Some(p) => decode(p.clone(), "search params")?,
                    None => ResourceSearchParams::default(),
                };
                ToolCallResult::json(&self.api.search(&params).await?)
            }
            ResourceAction::Get => {
                let id = required_str(arguments, "id")?;
                ToolCallResult::json(&self.api.get(id).await?)
            }
            ResourceAction::GetDetailed => {
                let id = required_str(arguments, "id")?;
                ToolCallResult::json(&self.api.get_detailed(id).await?)
            }
            ResourceAction::Create => {
                let resource = arguments
                    .get("resource")
                    .cloned()
                    .ok_or_else(|| GatewayError::InvalidParams("missing 'resource'".into()))?;
                ToolCallResult::json(&self.api.create(&resource).await?)
            }
            ResourceAction::Update => {
                let id = required_str(arguments, "id")?;
                let resource = arguments
                    .get("resource")
                    .cloned()
                    .ok_or_else(|| GatewayError::InvalidParams("missing 'resource'".into()))?;
                ToolCallResult::json(&self.api.update(id, &resource).await?)
            }
            ResourceAction::Delete => {
                let id = required_str(arguments, "id")?;
                self.api.delete(id).await?;
                ToolCallResult::text(format!("resource {id} deleted"))
            }
            ResourceAction::BulkUpdate => {
                let request = ResourceBulkUpdateRequest {
                    resource_ids: decode(
                        arguments.get("resourceIds").cloned().unwrap_or(json!([])),
                        "resourceIds",
                    )?,
                    updates: decode(
                        arguments.get("updates").cloned().unwrap_or(json!({})),
                        "updates",
                    )?,
                };
                if request.resource_ids.is_empty() {
                    return Err(GatewayError::InvalidParams(
                        "bulkUpdate requires at least one resource id".into(),
                    ));
                }
                self.api.bulk_update(&request).await?;
                ToolCallResult::text(format!("{} resources updated", request.resource_ids.len()))
            }
            ResourceAction::BulkDelete => {
                let request = ResourceBulkDeleteRequest {
                    resource_ids: decode(
                        arguments.get("resourceIds").cloned().unwrap_or(json!([])),
                        "resourceIds",
                    )?,
                };
                if request.resource_ids.is_empty() {
                    return Err(GatewayError::InvalidParams(
                        "bulkDelete requires at least one resource id".into(),
                    ));
                }
                self.api.bulk_delete(&request).await?;
                ToolCallResult::text(format!("{} resources deleted", request.resource_ids.len()))
            }
            ResourceAction::GetResourceTypes => {
                ToolCallResult::json(&self.api.resource_types().await?)
            }
            ResourceAction::ChangeState => {
                let id = required_str(arguments, "id")?;
                let state = required_str(arguments, "state")?;
                self.api
                    .change_state(
                        id,
                        &ResourceStateChangeRequest {
                            state: state.to_string(),
                        },
                    )
                    .await?;
                ToolCallResult::text(format!("resource {id} state changed to {state}"))
            }
            ResourceAction::GetMetrics => {
                let id = required_str(arguments, "id")?;
                let request: ResourceMetricsRequest = match arguments.get("metrics") {
                    Some(m) => decode(m.clone(), "metrics request")?,
                    None => ResourceMetricsRequest::default(),
                };
                ToolCallResult::json(&self.api.metrics(id, &request).await?)
            }
            ResourceAction::GetTags => {
                let id = required_str(arguments, "id")?;
                ToolCallResult::json(&self.api.tags(id).await?)
            }
            ResourceAction::UpdateTags => {
                let id = required_str(arguments, "id")?;
                let tags: Vec<Tag> = decode(
                    arguments.get("tags").cloned().unwrap_or(json!([])),
                    "tags",
                )?;
                self.api.update_tags(id, &tags).await?;
                ToolCallResult::text(format!("resource {id} tags updated"))
            }
        };

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_is_an_alias_for_search() {
        assert_eq!(
            ResourceAction::from_str("list").unwrap(),
            ResourceAction::Search
        );
        assert_eq!(
            ResourceAction::from_str("search").unwrap(),
            ResourceAction::Search
        );
    }

    #[test]
    fn all_documented_names_parse() {
        for name in ResourceAction::NAMES {
            assert!(ResourceAction::from_str(name).is_ok(), "{name} must parse");
        }
    }

    #[test]
    fn unknown_action_is_invalid_params() {
        assert!(matches!(
            ResourceAction::from_str("reboot"),
            Err(GatewayError::InvalidParams(_))
        ));
    }
}
