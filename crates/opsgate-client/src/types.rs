//! Entity types exchanged with the management API, trimmed to the fields the
//! gateway tools surface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A name/value tag attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// Generic configuration block shared by all integration types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_schedule: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    /// Type-specific settings passed through untouched.
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

/// An installed integration instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub integration_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub config: IntegrationConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_time: Option<String>,
}

/// Schema description of a supported integration type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
}

/// A managed infrastructure resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub agent_installed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Remaining upstream fields, preserved as-is.
    #[serde(default, flatten)]
    pub properties: HashMap<String, Value>,
}

/// Pagination and filter parameters for a resource search.
///
/// Filters unknown to this struct land in `extra` and are forwarded as query
/// parameters untouched, so new upstream filters need no client change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_no: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_descending_order: Option<bool>,
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

/// Paged search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSearchResponse {
    #[serde(default)]
    pub results: Vec<Resource>,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub page_no: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBulkUpdateRequest {
    pub resource_ids: Vec<String>,
    pub updates: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBulkDeleteRequest {
    pub resource_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTypeInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceStateChangeRequest {
    pub state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetricsRequest {
    #[serde(default)]
    pub metric_names: Vec<String>,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetricsResponse {
    pub resource_id: String,
    #[serde(default)]
    pub metrics: Vec<ResourceMetricDataPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceMetricDataPoint {
    pub name: String,
    pub timestamp: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}
