//! Fetching blueprints across many management groups at once.
//!
//! One independent list per management group, with a bounded number in
//! flight. The branches share nothing mutable; a failure in one group never
//! cancels the others, and with more than one group a failed branch is
//! skipped rather than failing the whole operation. Results carry their
//! originating group on the entity, with no ordering guarantee between
//! groups.

use crate::blueprint::api::CatalogApi;
use crate::blueprint::client::BlueprintClient;
use crate::blueprint::error::Result;
use crate::blueprint::models::Blueprint;
use crate::blueprint::paging;
use futures::stream::{self, StreamExt};

/// Default cap on concurrent in-flight list walks.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Names of every management group visible to the caller.
pub async fn management_group_names<A: CatalogApi>(
    client: &BlueprintClient<A>,
) -> Result<Vec<String>> {
    let api = client.api();
    let first = api.list_management_groups().await?;
    let records = paging::drain(first, |link| async move { api.list_next(&link).await }).await?;

    Ok(records
        .iter()
        .filter_map(|record| record.get("name").and_then(|n| n.as_str()))
        .map(str::to_string)
        .collect())
}

/// List blueprints across the given management groups, discovering the
/// groups when none are named. An optional name filter keeps only
/// definitions whose name matches one of the given names, case-insensitive.
pub async fn list_blueprints_across_groups<A: CatalogApi>(
    client: &BlueprintClient<A>,
    groups: &[String],
    name_filter: Option<&[String]>,
    concurrency: usize,
) -> Result<Vec<Blueprint>> {
    // Only a single explicitly named group fails hard; discovered groups are
    // always skipped on failure, even when discovery found just one.
    let fail_fast = groups.len() == 1;
    let groups: Vec<String> = if groups.is_empty() {
        management_group_names(client).await?
    } else {
        groups.to_vec()
    };

    let mut branches = stream::iter(groups.into_iter().map(|mg| async move {
        let listed = client.list_blueprints(&mg).await;
        (mg, listed)
    }))
    .buffer_unordered(concurrency.max(1));

    let mut all = Vec::new();
    while let Some((mg, listed)) = branches.next().await {
        match listed {
            Ok(blueprints) => all.extend(blueprints),
            Err(err) if !fail_fast && err.is_absorbable() => {
                tracing::debug!("skipping management group '{mg}': {err}");
            }
            Err(err) => return Err(err),
        }
    }

    if let Some(names) = name_filter {
        all.retain(|bp| names.iter().any(|name| name.eq_ignore_ascii_case(&bp.name)));
    }

    Ok(all)
}
