//! The remote catalog capability the client is written against.
//!
//! [`CatalogApi`] is the minimal surface the Azure Blueprints resource
//! provider exposes, kept at the raw-JSON level: records come back as
//! `serde_json::Value` and are only given shape by the mapper. The production
//! implementation lives in [`crate::arm::catalog`]; tests substitute an
//! in-memory fake.

use crate::blueprint::error::Result;
use crate::blueprint::paging::Page;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one blueprint definition, or `NotFound`.
    async fn get_blueprint(&self, management_group: &str, name: &str) -> Result<Value>;

    /// First page of definitions under a management group.
    async fn list_blueprints(&self, management_group: &str) -> Result<Page>;

    /// Fetch one published version of a definition, or `NotFound`.
    async fn get_published_blueprint(
        &self,
        management_group: &str,
        name: &str,
        version: &str,
    ) -> Result<Value>;

    /// First page of published versions of a definition.
    async fn list_published_blueprints(&self, management_group: &str, name: &str)
        -> Result<Page>;

    /// Fetch one assignment under a subscription, or `NotFound`.
    async fn get_assignment(&self, subscription_id: &str, name: &str) -> Result<Value>;

    /// First page of assignments under a subscription.
    async fn list_assignments(&self, subscription_id: &str) -> Result<Page>;

    /// Idempotent upsert of an assignment; returns the resulting record.
    async fn create_or_update_assignment(
        &self,
        subscription_id: &str,
        name: &str,
        body: &Value,
    ) -> Result<Value>;

    /// Delete an assignment. `Ok(None)` when the service returned no body,
    /// which is not an error.
    async fn delete_assignment(&self, subscription_id: &str, name: &str)
        -> Result<Option<Value>>;

    /// Follow a continuation cursor from any of the list operations. ARM
    /// cursors are absolute URLs, so one continuation entry point covers all
    /// resource types.
    async fn list_next(&self, next_link: &str) -> Result<Page>;

    /// First page of management groups visible to the caller. Used when an
    /// operation targets "all management groups" and none were named.
    async fn list_management_groups(&self) -> Result<Page>;
}
