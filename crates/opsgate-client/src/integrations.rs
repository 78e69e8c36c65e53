//! Integration lifecycle operations against the management API.

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::types::{Integration, IntegrationType};

/// API surface for installed integrations and the integration-type catalog.
#[derive(Clone)]
pub struct IntegrationsApi {
    client: ApiClient,
}

impl IntegrationsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "/api/v2/tenants/{}/integrations/{path}",
            self.client.tenant_id()
        )
    }

    pub async fn list(&self) -> ClientResult<Vec<Integration>> {
        self.client.get(&self.endpoint("installed")).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Integration> {
        self.client.get(&self.endpoint(&format!("installed/{id}"))).await
    }

    /// Same endpoint as `get`; the upstream returns the full document and the
    /// caller decides how much of it to surface.
    pub async fn get_detailed(&self, id: &str) -> ClientResult<Value> {
        self.client.get(&self.endpoint(&format!("installed/{id}"))).await
    }

    pub async fn create(&self, type_name: &str, config: &Value) -> ClientResult<Integration> {
        self.client
            .post(&self.endpoint(&format!("install/{type_name}")), config)
            .await
    }

    pub async fn update(&self, id: &str, config: &Value) -> ClientResult<Integration> {
        self.client
            .post(&self.endpoint(&format!("installed/{id}")), config)
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.client.delete(&self.endpoint(&format!("installed/{id}"))).await
    }

    pub async fn enable(&self, id: &str) -> ClientResult<()> {
        let _: Value = self
            .client
            .post(&self.endpoint(&format!("installed/{id}/enable")), &Value::Null)
            .await?;
        Ok(())
    }

    pub async fn disable(&self, id: &str) -> ClientResult<()> {
        let _: Value = self
            .client
            .post(&self.endpoint(&format!("installed/{id}/disable")), &Value::Null)
            .await?;
        Ok(())
    }

    /// The upstream has no catalog endpoint; the supported set is static.
    pub fn list_types(&self) -> Vec<IntegrationType> {
        static_catalog()
    }

    pub fn get_type(&self, id: &str) -> ClientResult<IntegrationType> {
        static_catalog()
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("integration type {id}")))
    }
}

fn static_catalog() -> Vec<IntegrationType> {
    let entries = [
        ("aws", "AWS Cloud", "Amazon Web Services Cloud Integration", "cloud"),
        ("azure", "Microsoft Azure", "Microsoft Azure Cloud Integration", "cloud"),
        ("gcp", "Google Cloud Platform", "Google Cloud Platform Integration", "cloud"),
        ("vmware", "VMware vCenter", "VMware vCenter Integration", "virtualization"),
        ("kubernetes", "Kubernetes", "Kubernetes Container Orchestration", "containers"),
    ];

    entries
        .iter()
        .map(|(id, name, description, category)| IntegrationType {
            id: (*id).to_string(),
            name: (*name).to_string(),
            description: (*description).to_string(),
            category: (*category).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_by_id() {
        let api = IntegrationsApi::new(ApiClient::new(&crate::UpstreamConfig {
            tenant_url: "https://example.api".into(),
            auth_url: "https://example.api/auth/oauth/token".into(),
            auth_key: "k".into(),
            auth_secret: "s".into(),
            tenant_id: "t-1".into(),
        }));

        assert_eq!(api.get_type("aws").unwrap().category, "cloud");
        assert!(api.get_type("nope").is_err());
        assert_eq!(api.list_types().len(), 5);
    }
}
