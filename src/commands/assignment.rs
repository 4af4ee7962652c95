//! `azbp assignment get|create|delete`
//!
//! Assignment targets resolve their subscription from the flag, the config
//! file, or `AZURE_SUBSCRIPTION_ID`, in that order. Creation validates the
//! supplied parameters against the target definition before submitting when
//! the blueprint id names a management-group-scoped definition.

use crate::blueprint::api::CatalogApi;
use crate::blueprint::assignment::{parse_blueprint_id, AssignmentSpec, ParameterValue};
use crate::blueprint::error::BlueprintError;
use crate::blueprint::BlueprintClient;
use crate::commands::{print_entities, print_entity};
use crate::config::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;

fn resolve_subscription(
    cli: Option<&str>,
    config: &Config,
) -> std::result::Result<String, BlueprintError> {
    config.effective_subscription(cli).ok_or_else(|| {
        BlueprintError::Validation(
            "no subscription given; pass --subscription or set one in the config".to_string(),
        )
    })
}

pub async fn get<A: CatalogApi>(
    client: &BlueprintClient<A>,
    names: Vec<String>,
    subscription: Option<String>,
    config: &Config,
) -> Result<()> {
    let subscription = resolve_subscription(subscription.as_deref(), config)?;

    let found = if names.is_empty() {
        client.list_assignments(&subscription).await?
    } else {
        client.get_assignments(&subscription, &names).await?
    };
    print_entities(&found)
}

#[derive(Debug, Clone)]
pub struct CreateAssignmentArgs {
    pub name: String,
    pub blueprint_id: String,
    pub subscription: Option<String>,
    pub location: String,
    /// Inline JSON object, or `@path` to read one from a file.
    pub parameters: Option<String>,
    pub lock: bool,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

/// Parse the `--parameters` argument into tagged values. A plain JSON value
/// becomes a literal; an object of the form
/// `{"reference": {"keyVault": {"id": ...}, "secretName": ...}}` becomes a
/// secret reference.
fn parse_parameters(raw: &str) -> Result<BTreeMap<String, ParameterValue>> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameter file '{path}'"))?,
        None => raw.to_string(),
    };

    let body: Value =
        serde_json::from_str(&text).context("--parameters must be a JSON object")?;
    let Some(map) = body.as_object() else {
        anyhow::bail!("--parameters must be a JSON object of name/value pairs");
    };

    let mut parameters = BTreeMap::new();
    for (name, value) in map {
        let parsed = match value.get("reference") {
            Some(reference) => {
                let key_vault_id = reference
                    .get("keyVault")
                    .and_then(|kv| kv.get("id"))
                    .and_then(|id| id.as_str())
                    .with_context(|| {
                        format!("parameter '{name}': reference needs keyVault.id")
                    })?;
                let secret_name = reference
                    .get("secretName")
                    .and_then(|s| s.as_str())
                    .with_context(|| {
                        format!("parameter '{name}': reference needs secretName")
                    })?;
                ParameterValue::SecretReference {
                    key_vault_id: key_vault_id.to_string(),
                    secret_name: secret_name.to_string(),
                    secret_version: reference
                        .get("secretVersion")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                }
            }
            None => ParameterValue::Literal(value.clone()),
        };
        parameters.insert(name.clone(), parsed);
    }

    Ok(parameters)
}

pub async fn create<A: CatalogApi>(
    client: &BlueprintClient<A>,
    args: CreateAssignmentArgs,
    config: &Config,
) -> Result<()> {
    let subscription = resolve_subscription(args.subscription.as_deref(), config)?;

    let mut spec = AssignmentSpec::new(&args.blueprint_id, &args.location).with_lock(args.lock);
    spec.display_name = args.display_name;
    spec.description = args.description;
    if let Some(raw) = &args.parameters {
        spec.parameters = parse_parameters(raw)?;
    }

    // Validate against the definition when the id tells us where it lives;
    // a subscription-scoped blueprint id is submitted as-is.
    if let Some((group, blueprint_name)) = parse_blueprint_id(&args.blueprint_id) {
        let definition = client.get_blueprint(&group, &blueprint_name).await?;
        spec.validate_against(&definition)?;
    }

    let assignment = client
        .create_or_update_assignment(&subscription, &args.name, &spec)
        .await?;
    tracing::info!(
        "assignment '{}' submitted, provisioning state: {}",
        assignment.name,
        assignment.provisioning_state
    );
    print_entity(&assignment)
}

pub async fn delete<A: CatalogApi>(
    client: &BlueprintClient<A>,
    names: Vec<String>,
    subscription: Option<String>,
    config: &Config,
) -> Result<()> {
    if names.is_empty() {
        return Err(BlueprintError::Validation(
            "at least one assignment name must be provided".to_string(),
        )
        .into());
    }
    let subscription = resolve_subscription(subscription.as_deref(), config)?;

    let deleted = client.delete_assignments(&subscription, &names).await?;
    print_entities(&deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_and_reference_parameters() {
        let raw = json!({
            "region": "westeurope",
            "instances": 3,
            "dbPassword": {
                "reference": {
                    "keyVault": {"id": "/x/vaults/kv1"},
                    "secretName": "db-password",
                    "secretVersion": "7"
                }
            }
        })
        .to_string();

        let parameters = parse_parameters(&raw).unwrap();
        assert!(matches!(
            parameters["region"],
            ParameterValue::Literal(Value::String(_))
        ));
        assert!(matches!(
            parameters["instances"],
            ParameterValue::Literal(Value::Number(_))
        ));
        match &parameters["dbPassword"] {
            ParameterValue::SecretReference {
                secret_name,
                secret_version,
                ..
            } => {
                assert_eq!(secret_name, "db-password");
                assert_eq!(secret_version.as_deref(), Some("7"));
            }
            other => panic!("expected secret reference, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_object_parameters() {
        assert!(parse_parameters("[1, 2]").is_err());
        assert!(parse_parameters("not json").is_err());
    }

    #[test]
    fn incomplete_reference_is_an_error() {
        let raw = json!({"broken": {"reference": {"secretName": "s"}}}).to_string();
        assert!(parse_parameters(&raw).is_err());
    }
}
