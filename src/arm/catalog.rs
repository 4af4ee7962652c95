//! The ARM-backed catalog implementation.
//!
//! Thin methods over [`ArmHttpClient`]: build the resource URL, attach a
//! token, classify the outcome into the domain error taxonomy. The endpoint
//! is configurable so tests can point the whole client at a mock server.

use crate::arm::auth::AzureCredentials;
use crate::arm::http::{ArmHttpClient, ArmHttpError};
use crate::blueprint::api::CatalogApi;
use crate::blueprint::error::{BlueprintError, Result};
use crate::blueprint::paging::Page;
use async_trait::async_trait;
use serde_json::Value;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const BLUEPRINT_API_VERSION: &str = "2018-11-01-preview";
pub const MANAGEMENT_GROUPS_API_VERSION: &str = "2020-05-01";

pub struct ArmCatalog {
    credentials: AzureCredentials,
    http: ArmHttpClient,
    endpoint: String,
}

impl ArmCatalog {
    pub fn new(credentials: AzureCredentials, endpoint: &str) -> Result<Self> {
        let http = ArmHttpClient::new()
            .map_err(|err| BlueprintError::Transport(format!("HTTP client setup: {err}")))?;

        Ok(Self {
            credentials,
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn token(&self) -> Result<String> {
        self.credentials
            .get_token()
            .await
            .map_err(|err| BlueprintError::Transport(format!("token acquisition: {err:#}")))
    }

    fn classify(err: ArmHttpError, container: &str, resource: &str) -> BlueprintError {
        match err {
            ArmHttpError::NotFound => BlueprintError::NotFound {
                container: container.to_string(),
                resource: resource.to_string(),
            },
            other => BlueprintError::Transport(format!("{resource} in '{container}': {other}")),
        }
    }

    // =========================================================================
    // Blueprint resource provider URL helpers
    // =========================================================================

    /// Base path of the Blueprint RP under a management group.
    fn blueprints_base(&self, management_group: &str) -> String {
        format!(
            "{}/providers/Microsoft.Management/managementGroups/{}/providers/Microsoft.Blueprint/blueprints",
            self.endpoint, management_group
        )
    }

    fn blueprint_url(&self, management_group: &str, name: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.blueprints_base(management_group),
            name,
            BLUEPRINT_API_VERSION
        )
    }

    fn blueprints_url(&self, management_group: &str) -> String {
        format!(
            "{}?api-version={}",
            self.blueprints_base(management_group),
            BLUEPRINT_API_VERSION
        )
    }

    fn version_url(&self, management_group: &str, name: &str, version: &str) -> String {
        format!(
            "{}/{}/versions/{}?api-version={}",
            self.blueprints_base(management_group),
            name,
            version,
            BLUEPRINT_API_VERSION
        )
    }

    fn versions_url(&self, management_group: &str, name: &str) -> String {
        format!(
            "{}/{}/versions?api-version={}",
            self.blueprints_base(management_group),
            name,
            BLUEPRINT_API_VERSION
        )
    }

    fn assignment_base(&self, subscription_id: &str) -> String {
        format!(
            "{}/subscriptions/{}/providers/Microsoft.Blueprint/blueprintAssignments",
            self.endpoint, subscription_id
        )
    }

    fn assignment_url(&self, subscription_id: &str, name: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.assignment_base(subscription_id),
            name,
            BLUEPRINT_API_VERSION
        )
    }

    fn assignments_url(&self, subscription_id: &str) -> String {
        format!(
            "{}?api-version={}",
            self.assignment_base(subscription_id),
            BLUEPRINT_API_VERSION
        )
    }

    fn management_groups_url(&self) -> String {
        format!(
            "{}/providers/Microsoft.Management/managementGroups?api-version={}",
            self.endpoint, MANAGEMENT_GROUPS_API_VERSION
        )
    }
}

#[async_trait]
impl CatalogApi for ArmCatalog {
    async fn get_blueprint(&self, management_group: &str, name: &str) -> Result<Value> {
        let token = self.token().await?;
        self.http
            .get(&self.blueprint_url(management_group, name), &token)
            .await
            .map_err(|err| {
                Self::classify(err, management_group, &format!("blueprint '{name}'"))
            })
    }

    async fn list_blueprints(&self, management_group: &str) -> Result<Page> {
        let token = self.token().await?;
        let body = self
            .http
            .get(&self.blueprints_url(management_group), &token)
            .await
            .map_err(|err| Self::classify(err, management_group, "blueprint list"))?;
        Ok(Page::from_envelope(&body))
    }

    async fn get_published_blueprint(
        &self,
        management_group: &str,
        name: &str,
        version: &str,
    ) -> Result<Value> {
        let token = self.token().await?;
        self.http
            .get(&self.version_url(management_group, name, version), &token)
            .await
            .map_err(|err| {
                Self::classify(
                    err,
                    management_group,
                    &format!("version '{version}' of blueprint '{name}'"),
                )
            })
    }

    async fn list_published_blueprints(
        &self,
        management_group: &str,
        name: &str,
    ) -> Result<Page> {
        let token = self.token().await?;
        let body = self
            .http
            .get(&self.versions_url(management_group, name), &token)
            .await
            .map_err(|err| {
                Self::classify(
                    err,
                    management_group,
                    &format!("published versions of blueprint '{name}'"),
                )
            })?;
        Ok(Page::from_envelope(&body))
    }

    async fn get_assignment(&self, subscription_id: &str, name: &str) -> Result<Value> {
        let token = self.token().await?;
        self.http
            .get(&self.assignment_url(subscription_id, name), &token)
            .await
            .map_err(|err| Self::classify(err, subscription_id, &format!("assignment '{name}'")))
    }

    async fn list_assignments(&self, subscription_id: &str) -> Result<Page> {
        let token = self.token().await?;
        let body = self
            .http
            .get(&self.assignments_url(subscription_id), &token)
            .await
            .map_err(|err| Self::classify(err, subscription_id, "assignment list"))?;
        Ok(Page::from_envelope(&body))
    }

    async fn create_or_update_assignment(
        &self,
        subscription_id: &str,
        name: &str,
        body: &Value,
    ) -> Result<Value> {
        let token = self.token().await?;
        self.http
            .put(&self.assignment_url(subscription_id, name), &token, body)
            .await
            .map_err(|err| Self::classify(err, subscription_id, &format!("assignment '{name}'")))
    }

    async fn delete_assignment(
        &self,
        subscription_id: &str,
        name: &str,
    ) -> Result<Option<Value>> {
        let token = self.token().await?;
        self.http
            .delete(&self.assignment_url(subscription_id, name), &token)
            .await
            .map_err(|err| Self::classify(err, subscription_id, &format!("assignment '{name}'")))
    }

    async fn list_next(&self, next_link: &str) -> Result<Page> {
        let token = self.token().await?;
        let body = self
            .http
            .get(next_link, &token)
            .await
            .map_err(|err| BlueprintError::Transport(format!("continuation page: {err}")))?;
        Ok(Page::from_envelope(&body))
    }

    async fn list_management_groups(&self) -> Result<Page> {
        let token = self.token().await?;
        let body = self
            .http
            .get(&self.management_groups_url(), &token)
            .await
            .map_err(|err| Self::classify(err, "tenant", "management group list"))?;
        Ok(Page::from_envelope(&body))
    }
}
