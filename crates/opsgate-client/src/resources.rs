//! Resource operations against the management API: search, CRUD, bulk
//! operations, state changes, metrics, and tags.

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::types::{
    Resource, ResourceBulkDeleteRequest, ResourceBulkUpdateRequest, ResourceMetricsRequest,
    ResourceMetricsResponse, ResourceSearchParams, ResourceSearchResponse,
    ResourceStateChangeRequest, ResourceTypeInfo, Tag,
};

#[derive(Clone)]
pub struct ResourcesApi {
    client: ApiClient,
}

impl ResourcesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn endpoint(&self, path: &str) -> String {
        let tenant = self.client.tenant_id();
        if path.is_empty() {
            format!("/api/v2/tenants/{tenant}/resources")
        } else {
            format!("/api/v2/tenants/{tenant}/resources/{path}")
        }
    }

    pub async fn search(&self, params: &ResourceSearchParams) -> ClientResult<ResourceSearchResponse> {
        let mut endpoint = self.endpoint("search");
        let query = build_query(params);
        if !query.is_empty() {
            endpoint = format!("{endpoint}?{query}");
        }
        self.client.get(&endpoint).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Resource> {
        self.client.get(&self.endpoint(id)).await
    }

    pub async fn get_detailed(&self, id: &str) -> ClientResult<Value> {
        self.client.get(&self.endpoint(id)).await
    }

    pub async fn create(&self, resource: &Value) -> ClientResult<Resource> {
        self.client.post(&self.endpoint(""), resource).await
    }

    pub async fn update(&self, id: &str, resource: &Value) -> ClientResult<Resource> {
        self.client.put(&self.endpoint(id), resource).await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.client.delete(&self.endpoint(id)).await
    }

    pub async fn bulk_update(&self, request: &ResourceBulkUpdateRequest) -> ClientResult<()> {
        let _: Value = self.client.post(&self.endpoint("bulk-update"), request).await?;
        Ok(())
    }

    pub async fn bulk_delete(&self, request: &ResourceBulkDeleteRequest) -> ClientResult<()> {
        let _: Value = self.client.post(&self.endpoint("bulk-delete"), request).await?;
        Ok(())
    }

    pub async fn resource_types(&self) -> ClientResult<Vec<ResourceTypeInfo>> {
        self.client.get(&self.endpoint("types")).await
    }

    pub async fn change_state(&self, id: &str, request: &ResourceStateChangeRequest) -> ClientResult<()> {
        let _: Value = self
            .client
            .post(&self.endpoint(&format!("{id}/state")), request)
            .await?;
        Ok(())
    }

    pub async fn metrics(
        &self,
        id: &str,
        request: &ResourceMetricsRequest,
    ) -> ClientResult<ResourceMetricsResponse> {
        self.client
            .post(&self.endpoint(&format!("{id}/metrics")), request)
            .await
    }

    pub async fn tags(&self, id: &str) -> ClientResult<Vec<Tag>> {
        self.client.get(&self.endpoint(&format!("{id}/tags"))).await
    }

    pub async fn update_tags(&self, id: &str, tags: &[Tag]) -> ClientResult<()> {
        let _: Value = self
            .client
            .put(&self.endpoint(&format!("{id}/tags")), &tags)
            .await?;
        Ok(())
    }
}

/// Translate search parameters into the upstream query string. Unknown extra
/// filters are forwarded verbatim; non-string values are rendered compactly.
fn build_query(params: &ResourceSearchParams) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();

    if let Some(n) = params.page_no {
        pairs.push(("pageNo".into(), n.to_string()));
    }
    if let Some(n) = params.page_size {
        pairs.push(("pageSize".into(), n.to_string()));
    }
    if let Some(q) = &params.query_string {
        pairs.push(("queryString".into(), q.clone()));
    }
    if let Some(s) = &params.sort_name {
        pairs.push(("sortName".into(), s.clone()));
    }
    if let Some(d) = params.is_descending_order {
        pairs.push(("isDescendingOrder".into(), d.to_string()));
    }

    let mut extra: Vec<_> = params.extra.iter().collect();
    extra.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in extra {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        pairs.push((key.clone(), rendered));
    }

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push_str("%20"),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_includes_pagination_and_filters() {
        let mut params = ResourceSearchParams {
            page_no: Some(1),
            page_size: Some(5),
            query_string: Some("state:active".into()),
            ..Default::default()
        };
        params
            .extra
            .insert("deviceGroup".into(), Value::String("prod east".into()));

        let q = build_query(&params);
        assert!(q.contains("pageNo=1"));
        assert!(q.contains("pageSize=5"));
        assert!(q.contains("queryString=state%3Aactive"));
        assert!(q.contains("deviceGroup=prod%20east"));
    }

    #[test]
    fn empty_params_build_empty_query() {
        assert!(build_query(&ResourceSearchParams::default()).is_empty());
    }
}
