//! Assignment submission.
//!
//! [`AssignmentSpec`] is what a caller supplies to create or update an
//! assignment. Parameter values are a tagged variant: either a literal JSON
//! value or a reference to a Key Vault secret. The spec can be validated
//! against the target definition's declared parameters before anything is
//! sent to the service.

use crate::blueprint::error::{BlueprintError, Result};
use crate::blueprint::models::{Blueprint, LockMode};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_IDENTITY_TYPE: &str = "SystemAssigned";

/// A value supplied for one declared blueprint parameter.
#[derive(Debug, Clone)]
pub enum ParameterValue {
    /// A literal JSON value.
    Literal(Value),
    /// A reference to a secret held in Key Vault, resolved by the service at
    /// deployment time.
    SecretReference {
        key_vault_id: String,
        secret_name: String,
        secret_version: Option<String>,
    },
}

impl ParameterValue {
    fn to_wire(&self) -> Value {
        match self {
            ParameterValue::Literal(value) => json!({ "value": value }),
            ParameterValue::SecretReference {
                key_vault_id,
                secret_name,
                secret_version,
            } => {
                let mut reference = Map::new();
                reference.insert("keyVault".to_string(), json!({ "id": key_vault_id }));
                reference.insert("secretName".to_string(), json!(secret_name));
                if let Some(version) = secret_version {
                    reference.insert("secretVersion".to_string(), json!(version));
                }
                json!({ "reference": Value::Object(reference) })
            }
        }
    }
}

/// A resource-group placeholder value supplied at assignment time.
#[derive(Debug, Clone, Default)]
pub struct ResourceGroupBinding {
    pub name: Option<String>,
    pub location: Option<String>,
}

/// What to submit when creating or updating an assignment.
#[derive(Debug, Clone)]
pub struct AssignmentSpec {
    /// Fully qualified id of the published blueprint to assign.
    pub blueprint_id: String,
    pub location: String,
    pub identity_type: String,
    pub lock: LockMode,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub parameters: BTreeMap<String, ParameterValue>,
    pub resource_groups: BTreeMap<String, ResourceGroupBinding>,
}

impl AssignmentSpec {
    pub fn new(blueprint_id: &str, location: &str) -> Self {
        Self {
            blueprint_id: blueprint_id.to_string(),
            location: location.to_string(),
            identity_type: DEFAULT_IDENTITY_TYPE.to_string(),
            lock: LockMode::None,
            display_name: None,
            description: None,
            parameters: BTreeMap::new(),
            resource_groups: BTreeMap::new(),
        }
    }

    pub fn with_lock(mut self, locked: bool) -> Self {
        self.lock = if locked {
            LockMode::AllResources
        } else {
            LockMode::None
        };
        self
    }

    pub fn with_parameter(mut self, name: &str, value: ParameterValue) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    /// Check this spec against the definition it targets. Every supplied
    /// parameter must be declared, and every declared parameter without a
    /// default must be supplied. Runs before any remote call.
    pub fn validate_against(&self, definition: &Blueprint) -> Result<()> {
        let mut problems = Vec::new();

        for name in self.parameters.keys() {
            if !definition.parameters.contains_key(name) {
                problems.push(format!(
                    "parameter '{}' is not declared by blueprint '{}'",
                    name, definition.name
                ));
            }
        }

        for (name, declared) in &definition.parameters {
            if declared.requires_value() && !self.parameters.contains_key(name) {
                problems.push(format!(
                    "parameter '{}' has no default value and must be supplied",
                    name
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(BlueprintError::Validation(problems.join("; ")))
        }
    }

    /// The ARM request body for a create-or-update call.
    pub fn to_request_body(&self) -> Value {
        let parameters: Map<String, Value> = self
            .parameters
            .iter()
            .map(|(name, value)| (name.clone(), value.to_wire()))
            .collect();

        let resource_groups: Map<String, Value> = self
            .resource_groups
            .iter()
            .map(|(key, binding)| {
                let mut entry = Map::new();
                if let Some(name) = &binding.name {
                    entry.insert("name".to_string(), json!(name));
                }
                if let Some(location) = &binding.location {
                    entry.insert("location".to_string(), json!(location));
                }
                (key.clone(), Value::Object(entry))
            })
            .collect();

        let mut props = Map::new();
        props.insert("blueprintId".to_string(), json!(self.blueprint_id));
        if let Some(display_name) = &self.display_name {
            props.insert("displayName".to_string(), json!(display_name));
        }
        if let Some(description) = &self.description {
            props.insert("description".to_string(), json!(description));
        }
        props.insert("locks".to_string(), json!({ "mode": self.lock.as_wire() }));
        props.insert("parameters".to_string(), Value::Object(parameters));
        props.insert("resourceGroups".to_string(), Value::Object(resource_groups));

        json!({
            "identity": { "type": self.identity_type },
            "location": self.location,
            "properties": Value::Object(props),
        })
    }
}

/// Split a blueprint id into its management group and definition name, when
/// it has the management-group form. Published-version ids (with a trailing
/// `/versions/{v}` segment) resolve to the owning definition.
pub fn parse_blueprint_id(id: &str) -> Option<(String, String)> {
    let segments: Vec<&str> = id.trim_matches('/').split('/').collect();
    let mg = segments
        .windows(2)
        .find(|w| w[0].eq_ignore_ascii_case("managementGroups"))
        .map(|w| w[1])?;
    let name = segments
        .windows(2)
        .find(|w| w[0].eq_ignore_ascii_case("blueprints"))
        .map(|w| w[1])?;
    Some((mg.to_string(), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::mapper::map_blueprint;

    fn definition() -> Blueprint {
        let record = serde_json::json!({
            "id": "/providers/Microsoft.Management/managementGroups/mg1/providers/Microsoft.Blueprint/blueprints/web-stack",
            "name": "web-stack",
            "properties": {
                "parameters": {
                    "region": {"type": "string", "defaultValue": "westeurope"},
                    "owner": {"type": "string"}
                }
            }
        });
        map_blueprint(&record, "mg1").unwrap()
    }

    #[test]
    fn request_body_shape() {
        let spec = AssignmentSpec::new("/x/blueprints/web-stack/versions/1.2", "westeurope")
            .with_lock(true)
            .with_parameter("owner", ParameterValue::Literal(json!("platform-team")))
            .with_parameter(
                "secret",
                ParameterValue::SecretReference {
                    key_vault_id: "/x/vaults/kv1".to_string(),
                    secret_name: "db-password".to_string(),
                    secret_version: None,
                },
            );

        let body = spec.to_request_body();
        assert_eq!(body["identity"]["type"], "SystemAssigned");
        assert_eq!(body["properties"]["locks"]["mode"], "AllResources");
        assert_eq!(
            body["properties"]["parameters"]["owner"]["value"],
            "platform-team"
        );
        assert_eq!(
            body["properties"]["parameters"]["secret"]["reference"]["secretName"],
            "db-password"
        );
    }

    #[test]
    fn validation_accepts_complete_spec() {
        let spec = AssignmentSpec::new("/x", "westeurope")
            .with_parameter("owner", ParameterValue::Literal(json!("team")));
        assert!(spec.validate_against(&definition()).is_ok());
    }

    #[test]
    fn validation_rejects_undeclared_parameter() {
        let spec = AssignmentSpec::new("/x", "westeurope")
            .with_parameter("owner", ParameterValue::Literal(json!("team")))
            .with_parameter("typo", ParameterValue::Literal(json!(1)));
        let err = spec.validate_against(&definition()).unwrap_err();
        assert!(matches!(err, BlueprintError::Validation(_)));
        assert!(err.to_string().contains("typo"));
    }

    #[test]
    fn validation_rejects_missing_required_parameter() {
        let spec = AssignmentSpec::new("/x", "westeurope");
        let err = spec.validate_against(&definition()).unwrap_err();
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn blueprint_id_parsing() {
        let (mg, name) = parse_blueprint_id(
            "/providers/Microsoft.Management/managementGroups/mg1/providers/Microsoft.Blueprint/blueprints/web-stack/versions/1.2",
        )
        .unwrap();
        assert_eq!(mg, "mg1");
        assert_eq!(name, "web-stack");

        assert!(parse_blueprint_id("/subscriptions/sub1/whatever").is_none());
    }
}
