//! The blueprint client façade.
//!
//! Composes the catalog capability, the pagination walker, the mapper, and
//! the latest-version selector into the operations callers actually use.
//! List operations always materialize the full walked collection before
//! returning, so callers see a completed `Vec`, never an in-flight stream.
//!
//! Batch variants take a slice of names and apply the isolation rule: for a
//! single explicit target any failure propagates, for several targets a
//! not-found or transport failure on one target is skipped and the rest are
//! still fetched. Mapping and validation failures always propagate.

use crate::blueprint::api::CatalogApi;
use crate::blueprint::assignment::AssignmentSpec;
use crate::blueprint::error::{BlueprintError, Result};
use crate::blueprint::latest::select_latest;
use crate::blueprint::mapper::{map_assignment, map_blueprint, map_published_blueprint};
use crate::blueprint::models::{Assignment, Blueprint, PublishedBlueprint};
use crate::blueprint::paging;

pub struct BlueprintClient<A: CatalogApi> {
    api: A,
}

impl<A: CatalogApi> BlueprintClient<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Whether a batch over `count` targets fails fast. A single explicit
    /// target fails loudly; several degrade gracefully to partial results.
    fn fail_fast(count: usize) -> bool {
        count == 1
    }

    fn absorb(err: BlueprintError, fail_fast: bool) -> Result<()> {
        if !fail_fast && err.is_absorbable() {
            tracing::debug!("skipping batch target: {err}");
            Ok(())
        } else {
            Err(err)
        }
    }

    // ------------------------------------------------------------------
    // Blueprint definitions
    // ------------------------------------------------------------------

    pub async fn get_blueprint(&self, management_group: &str, name: &str) -> Result<Blueprint> {
        let record = self.api.get_blueprint(management_group, name).await?;
        map_blueprint(&record, management_group)
    }

    pub async fn list_blueprints(&self, management_group: &str) -> Result<Vec<Blueprint>> {
        let first = self.api.list_blueprints(management_group).await?;
        let records = paging::drain(first, |link| async move {
            self.api.list_next(&link).await
        })
        .await?;

        records
            .iter()
            .map(|record| map_blueprint(record, management_group))
            .collect()
    }

    /// Fetch several named definitions, applying the isolation rule.
    pub async fn get_blueprints(
        &self,
        management_group: &str,
        names: &[String],
    ) -> Result<Vec<Blueprint>> {
        let fail_fast = Self::fail_fast(names.len());
        let mut found = Vec::new();

        for name in names {
            match self.get_blueprint(management_group, name).await {
                Ok(blueprint) => found.push(blueprint),
                Err(err) => Self::absorb(err, fail_fast)?,
            }
        }

        Ok(found)
    }

    // ------------------------------------------------------------------
    // Published versions
    // ------------------------------------------------------------------

    pub async fn get_published_blueprint(
        &self,
        management_group: &str,
        name: &str,
        version: &str,
    ) -> Result<PublishedBlueprint> {
        let record = self
            .api
            .get_published_blueprint(management_group, name, version)
            .await?;
        map_published_blueprint(&record, management_group)
    }

    pub async fn list_published_blueprints(
        &self,
        management_group: &str,
        name: &str,
    ) -> Result<Vec<PublishedBlueprint>> {
        let first = self
            .api
            .list_published_blueprints(management_group, name)
            .await?;
        let records = paging::drain(first, |link| async move {
            self.api.list_next(&link).await
        })
        .await?;

        records
            .iter()
            .map(|record| map_published_blueprint(record, management_group))
            .collect()
    }

    /// The most recently modified published version of a definition, or
    /// `None` when it has never been published.
    pub async fn get_latest_published(
        &self,
        management_group: &str,
        name: &str,
    ) -> Result<Option<PublishedBlueprint>> {
        let versions = self
            .list_published_blueprints(management_group, name)
            .await?;
        Ok(select_latest(versions))
    }

    /// Fetch one named version of several definitions, applying the
    /// isolation rule.
    pub async fn get_published_blueprints(
        &self,
        management_group: &str,
        names: &[String],
        version: &str,
    ) -> Result<Vec<PublishedBlueprint>> {
        let fail_fast = Self::fail_fast(names.len());
        let mut found = Vec::new();

        for name in names {
            match self
                .get_published_blueprint(management_group, name, version)
                .await
            {
                Ok(published) => found.push(published),
                Err(err) => Self::absorb(err, fail_fast)?,
            }
        }

        Ok(found)
    }

    /// Latest published version for each of several definitions, applying
    /// the isolation rule. Definitions that exist but were never published
    /// are silently omitted.
    pub async fn get_latest_published_many(
        &self,
        management_group: &str,
        names: &[String],
    ) -> Result<Vec<PublishedBlueprint>> {
        let fail_fast = Self::fail_fast(names.len());
        let mut found = Vec::new();

        for name in names {
            match self.get_latest_published(management_group, name).await {
                Ok(Some(published)) => found.push(published),
                Ok(None) => {}
                Err(err) => Self::absorb(err, fail_fast)?,
            }
        }

        Ok(found)
    }

    // ------------------------------------------------------------------
    // Assignments
    // ------------------------------------------------------------------

    pub async fn get_assignment(&self, subscription_id: &str, name: &str) -> Result<Assignment> {
        let record = self.api.get_assignment(subscription_id, name).await?;
        map_assignment(&record, subscription_id)
    }

    pub async fn list_assignments(&self, subscription_id: &str) -> Result<Vec<Assignment>> {
        let first = self.api.list_assignments(subscription_id).await?;
        let records = paging::drain(first, |link| async move {
            self.api.list_next(&link).await
        })
        .await?;

        records
            .iter()
            .map(|record| map_assignment(record, subscription_id))
            .collect()
    }

    /// Fetch several named assignments, applying the isolation rule.
    pub async fn get_assignments(
        &self,
        subscription_id: &str,
        names: &[String],
    ) -> Result<Vec<Assignment>> {
        let fail_fast = Self::fail_fast(names.len());
        let mut found = Vec::new();

        for name in names {
            match self.get_assignment(subscription_id, name).await {
                Ok(assignment) => found.push(assignment),
                Err(err) => Self::absorb(err, fail_fast)?,
            }
        }

        Ok(found)
    }

    /// Idempotent upsert. The returned entity carries whatever provisioning
    /// state the service reported synchronously; the client does not poll.
    pub async fn create_or_update_assignment(
        &self,
        subscription_id: &str,
        name: &str,
        spec: &AssignmentSpec,
    ) -> Result<Assignment> {
        let body = spec.to_request_body();
        let record = self
            .api
            .create_or_update_assignment(subscription_id, name, &body)
            .await?;
        map_assignment(&record, subscription_id)
    }

    /// Delete an assignment. `Ok(None)` when the service returned no body;
    /// otherwise the deleted assignment's last-known state.
    pub async fn delete_assignment(
        &self,
        subscription_id: &str,
        name: &str,
    ) -> Result<Option<Assignment>> {
        match self.api.delete_assignment(subscription_id, name).await? {
            Some(record) => Ok(Some(map_assignment(&record, subscription_id)?)),
            None => Ok(None),
        }
    }

    /// Delete several assignments, applying the isolation rule. Returns the
    /// last-known state of each deletion that produced a body.
    pub async fn delete_assignments(
        &self,
        subscription_id: &str,
        names: &[String],
    ) -> Result<Vec<Assignment>> {
        let fail_fast = Self::fail_fast(names.len());
        let mut deleted = Vec::new();

        for name in names {
            match self.delete_assignment(subscription_id, name).await {
                Ok(Some(assignment)) => deleted.push(assignment),
                Ok(None) => {}
                Err(err) => Self::absorb(err, fail_fast)?,
            }
        }

        Ok(deleted)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory catalog used by unit tests.

    use super::*;
    use crate::blueprint::paging::Page;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeCatalog {
        pub blueprints: HashMap<(String, String), Value>,
        /// First page per management group.
        pub blueprint_pages: HashMap<String, Page>,
        /// Published versions per (management group, blueprint name).
        pub versions: HashMap<(String, String), Vec<Value>>,
        pub assignments: Mutex<HashMap<(String, String), Value>>,
        /// Continuation cursor -> page.
        pub continuations: HashMap<String, Page>,
        /// Targets that fail with a transport error.
        pub broken: Vec<String>,
        pub management_groups: Vec<String>,
    }

    impl FakeCatalog {
        pub fn with_blueprint(mut self, mg: &str, name: &str, record: Value) -> Self {
            self.blueprints
                .insert((mg.to_string(), name.to_string()), record);
            self
        }

        pub fn blueprint_record(mg: &str, name: &str) -> Value {
            json!({
                "id": format!("/providers/Microsoft.Management/managementGroups/{mg}/providers/Microsoft.Blueprint/blueprints/{name}"),
                "name": name,
                "properties": {"targetScope": "subscription"}
            })
        }

        fn not_found(container: &str, resource: String) -> BlueprintError {
            BlueprintError::NotFound {
                container: container.to_string(),
                resource,
            }
        }

        fn check_broken(&self, name: &str) -> Result<()> {
            if self.broken.iter().any(|b| b == name) {
                Err(BlueprintError::Transport(format!(
                    "simulated fault for '{name}'"
                )))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CatalogApi for FakeCatalog {
        async fn get_blueprint(&self, mg: &str, name: &str) -> Result<Value> {
            self.check_broken(name)?;
            self.blueprints
                .get(&(mg.to_string(), name.to_string()))
                .cloned()
                .ok_or_else(|| Self::not_found(mg, format!("blueprint '{name}'")))
        }

        async fn list_blueprints(&self, mg: &str) -> Result<Page> {
            self.check_broken(mg)?;
            Ok(self.blueprint_pages.get(mg).cloned().unwrap_or_default())
        }

        async fn get_published_blueprint(
            &self,
            mg: &str,
            name: &str,
            version: &str,
        ) -> Result<Value> {
            self.check_broken(name)?;
            self.versions
                .get(&(mg.to_string(), name.to_string()))
                .and_then(|versions| {
                    versions
                        .iter()
                        .find(|record| record.get("name").and_then(|n| n.as_str()) == Some(version))
                })
                .cloned()
                .ok_or_else(|| {
                    Self::not_found(mg, format!("version '{version}' of blueprint '{name}'"))
                })
        }

        async fn list_published_blueprints(&self, mg: &str, name: &str) -> Result<Page> {
            self.check_broken(name)?;
            Ok(Page::last(
                self.versions
                    .get(&(mg.to_string(), name.to_string()))
                    .cloned()
                    .unwrap_or_default(),
            ))
        }

        async fn get_assignment(&self, sub: &str, name: &str) -> Result<Value> {
            self.check_broken(name)?;
            self.assignments
                .lock()
                .unwrap()
                .get(&(sub.to_string(), name.to_string()))
                .cloned()
                .ok_or_else(|| Self::not_found(sub, format!("assignment '{name}'")))
        }

        async fn list_assignments(&self, sub: &str) -> Result<Page> {
            let assignments = self.assignments.lock().unwrap();
            Ok(Page::last(
                assignments
                    .iter()
                    .filter(|((s, _), _)| s == sub)
                    .map(|(_, record)| record.clone())
                    .collect(),
            ))
        }

        async fn create_or_update_assignment(
            &self,
            sub: &str,
            name: &str,
            body: &Value,
        ) -> Result<Value> {
            self.check_broken(name)?;
            let mut record = body.clone();
            record["name"] = json!(name);
            record["properties"]["provisioningState"] = json!("creating");
            self.assignments
                .lock()
                .unwrap()
                .insert((sub.to_string(), name.to_string()), record.clone());
            Ok(record)
        }

        async fn delete_assignment(&self, sub: &str, name: &str) -> Result<Option<Value>> {
            self.check_broken(name)?;
            Ok(self
                .assignments
                .lock()
                .unwrap()
                .remove(&(sub.to_string(), name.to_string())))
        }

        async fn list_next(&self, next_link: &str) -> Result<Page> {
            self.continuations
                .get(next_link)
                .cloned()
                .ok_or_else(|| BlueprintError::Transport(format!("bad cursor '{next_link}'")))
        }

        async fn list_management_groups(&self) -> Result<Page> {
            Ok(Page::last(
                self.management_groups
                    .iter()
                    .map(|name| json!({"name": name}))
                    .collect(),
            ))
        }
    }
}
