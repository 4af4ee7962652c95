//! `azbp blueprint get`
//!
//! Mirrors the three shapes of the original tooling: plain fetch (all or
//! named definitions, one group or every group), fetch of one published
//! version, and fetch of the latest published version. The latter two demand
//! exactly one management group, checked before any remote call.

use crate::blueprint::api::CatalogApi;
use crate::blueprint::error::BlueprintError;
use crate::blueprint::{fanout, BlueprintClient};
use crate::commands::print_entities;
use crate::config::Config;
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct GetBlueprintArgs {
    pub names: Vec<String>,
    pub management_groups: Vec<String>,
    pub version: Option<String>,
    pub latest_published: bool,
}

fn ensure_single_management_group(groups: &[String]) -> std::result::Result<&str, BlueprintError> {
    match groups {
        [only] => Ok(only),
        _ => Err(BlueprintError::Validation(
            "exactly one --management-group must be provided".to_string(),
        )),
    }
}

fn ensure_names(names: &[String]) -> std::result::Result<(), BlueprintError> {
    if names.is_empty() {
        Err(BlueprintError::Validation(
            "at least one blueprint name must be provided".to_string(),
        ))
    } else {
        Ok(())
    }
}

pub async fn get<A: CatalogApi>(
    client: &BlueprintClient<A>,
    args: GetBlueprintArgs,
    config: &Config,
) -> Result<()> {
    if let Some(version) = &args.version {
        let group = ensure_single_management_group(&args.management_groups)?;
        ensure_names(&args.names)?;
        let found = client
            .get_published_blueprints(group, &args.names, version)
            .await?;
        return print_entities(&found);
    }

    if args.latest_published {
        let group = ensure_single_management_group(&args.management_groups)?;
        ensure_names(&args.names)?;
        let found = client
            .get_latest_published_many(group, &args.names)
            .await?;
        return print_entities(&found);
    }

    // Plain fetch. With a single group the names are explicit targets; with
    // no group (falling back to the configured default, when set) or several
    // groups we fan out and filter.
    let mut groups = args.management_groups.clone();
    if groups.is_empty() {
        if let Some(default_group) = &config.management_group {
            groups.push(default_group.clone());
        }
    }

    if let [group] = groups.as_slice() {
        let found = if args.names.is_empty() {
            client.list_blueprints(group).await?
        } else {
            client.get_blueprints(group, &args.names).await?
        };
        return print_entities(&found);
    }

    let name_filter = (!args.names.is_empty()).then_some(args.names.as_slice());
    let found = fanout::list_blueprints_across_groups(
        client,
        &groups,
        name_filter,
        config.effective_fanout_limit(),
    )
    .await?;
    print_entities(&found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_group_guard() {
        assert!(ensure_single_management_group(&["mg1".to_string()]).is_ok());
        assert!(ensure_single_management_group(&[]).is_err());
        assert!(
            ensure_single_management_group(&["mg1".to_string(), "mg2".to_string()]).is_err()
        );
    }
}
