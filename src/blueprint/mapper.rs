//! Mapping raw catalog records into the domain model.
//!
//! The mapper is total for well-formed input: malformed enum values become
//! the explicit `Unknown` member, malformed timestamps become absent, and an
//! absent parameter or resource-group map becomes an empty one. Only a
//! structurally missing identity field (name, id) is an error, because that
//! means the service broke its contract rather than omitted metadata.
//!
//! The container the record was fetched from (management group name or
//! subscription id) is attached to every produced entity; it is not present
//! in the record itself but later operations need it.

use crate::blueprint::dates::parse_timestamp;
use crate::blueprint::error::{BlueprintError, Result};
use crate::blueprint::models::{
    Assignment, AssignmentParameter, Blueprint, BlueprintStatus, LockMode, ManagedIdentity,
    ParameterDefinition, ProvisioningState, PublishedBlueprint, ResourceGroupDefinition,
    ResourceGroupValue, TargetScope,
};
use serde_json::Value;
use std::collections::BTreeMap;

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn required_str(record: &Value, key: &'static str, container: &str) -> Result<String> {
    str_field(record, key).ok_or_else(|| BlueprintError::Mapping {
        container: container.to_string(),
        field: key,
    })
}

/// ARM nests the interesting fields under `properties`; tolerate records that
/// arrive already flattened by falling back to the record itself.
fn properties(record: &Value) -> &Value {
    record.get("properties").unwrap_or(record)
}

fn map_status(props: &Value) -> BlueprintStatus {
    let status = props.get("status").unwrap_or(&Value::Null);
    BlueprintStatus {
        time_created: status
            .get("timeCreated")
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp),
        last_modified: status
            .get("lastModified")
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp),
    }
}

fn map_parameter_definitions(props: &Value) -> BTreeMap<String, ParameterDefinition> {
    let Some(map) = props.get("parameters").and_then(|v| v.as_object()) else {
        return BTreeMap::new();
    };

    map.iter()
        .map(|(key, raw)| {
            let metadata = raw.get("metadata").unwrap_or(raw);
            let definition = ParameterDefinition {
                parameter_type: str_field(raw, "type").unwrap_or_default(),
                display_name: str_field(metadata, "displayName"),
                description: str_field(metadata, "description"),
                strong_type: str_field(metadata, "strongType"),
                default_value: raw.get("defaultValue").cloned().unwrap_or(Value::Null),
                allowed_values: raw
                    .get("allowedValues")
                    .and_then(|v| v.as_array())
                    .cloned()
                    .unwrap_or_default(),
            };
            (key.clone(), definition)
        })
        .collect()
}

fn map_resource_group_definitions(props: &Value) -> BTreeMap<String, ResourceGroupDefinition> {
    let Some(map) = props.get("resourceGroups").and_then(|v| v.as_object()) else {
        return BTreeMap::new();
    };

    map.iter()
        .map(|(key, raw)| {
            let metadata = raw.get("metadata").unwrap_or(raw);
            let definition = ResourceGroupDefinition {
                name: str_field(raw, "name"),
                location: str_field(raw, "location"),
                display_name: str_field(metadata, "displayName"),
                description: str_field(metadata, "description"),
                strong_type: str_field(metadata, "strongType"),
                depends_on: raw
                    .get("dependsOn")
                    .and_then(|v| v.as_array())
                    .map(|deps| {
                        deps.iter()
                            .filter_map(|d| d.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default(),
            };
            (key.clone(), definition)
        })
        .collect()
}

/// Map one blueprint definition record.
pub fn map_blueprint(record: &Value, management_group: &str) -> Result<Blueprint> {
    let props = properties(record);

    Ok(Blueprint {
        id: required_str(record, "id", management_group)?,
        resource_type: str_field(record, "type"),
        name: required_str(record, "name", management_group)?,
        management_group: management_group.to_string(),
        display_name: str_field(props, "displayName"),
        description: str_field(props, "description"),
        status: map_status(props),
        target_scope: TargetScope::parse(props.get("targetScope").and_then(|v| v.as_str())),
        parameters: map_parameter_definitions(props),
        resource_groups: map_resource_group_definitions(props),
        versions: props.get("versions").cloned().unwrap_or(Value::Null),
        layout: props.get("layout").cloned().unwrap_or(Value::Null),
    })
}

/// Map one published-version record. The ARM resource name of the snapshot is
/// its version identifier; the owning definition's name travels in
/// `properties.blueprintName`.
pub fn map_published_blueprint(record: &Value, management_group: &str) -> Result<PublishedBlueprint> {
    let props = properties(record);

    Ok(PublishedBlueprint {
        id: required_str(record, "id", management_group)?,
        resource_type: str_field(record, "type"),
        version: required_str(record, "name", management_group)?,
        blueprint_name: str_field(props, "blueprintName"),
        management_group: management_group.to_string(),
        display_name: str_field(props, "displayName"),
        description: str_field(props, "description"),
        change_notes: str_field(props, "changeNotes"),
        status: map_status(props),
        target_scope: TargetScope::parse(props.get("targetScope").and_then(|v| v.as_str())),
        parameters: map_parameter_definitions(props),
        resource_groups: map_resource_group_definitions(props),
    })
}

fn map_assignment_parameters(props: &Value) -> BTreeMap<String, AssignmentParameter> {
    let Some(map) = props.get("parameters").and_then(|v| v.as_object()) else {
        return BTreeMap::new();
    };

    map.iter()
        .map(|(key, raw)| {
            let parameter = AssignmentParameter {
                value: raw.get("value").cloned().unwrap_or(Value::Null),
                description: str_field(raw, "description"),
            };
            (key.clone(), parameter)
        })
        .collect()
}

fn map_resource_group_values(props: &Value) -> BTreeMap<String, ResourceGroupValue> {
    let Some(map) = props.get("resourceGroups").and_then(|v| v.as_object()) else {
        return BTreeMap::new();
    };

    map.iter()
        .map(|(key, raw)| {
            let value = ResourceGroupValue {
                name: str_field(raw, "name"),
                location: str_field(raw, "location"),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Map one assignment record.
pub fn map_assignment(record: &Value, subscription_id: &str) -> Result<Assignment> {
    let props = properties(record);
    let identity = record.get("identity").unwrap_or(&Value::Null);
    let locks = props.get("locks").unwrap_or(&Value::Null);

    Ok(Assignment {
        id: str_field(record, "id"),
        resource_type: str_field(record, "type"),
        name: required_str(record, "name", subscription_id)?,
        subscription_id: subscription_id.to_string(),
        location: str_field(record, "location"),
        identity: ManagedIdentity {
            identity_type: str_field(identity, "type"),
            principal_id: str_field(identity, "principalId"),
            tenant_id: str_field(identity, "tenantId"),
        },
        display_name: str_field(props, "displayName"),
        description: str_field(props, "description"),
        blueprint_id: str_field(props, "blueprintId"),
        parameters: map_assignment_parameters(props),
        resource_groups: map_resource_group_values(props),
        status: map_status(props),
        locks: LockMode::parse(locks.get("mode").and_then(|v| v.as_str())),
        provisioning_state: ProvisioningState::parse(
            props.get("provisioningState").and_then(|v| v.as_str()),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blueprint_record() -> Value {
        json!({
            "id": "/providers/Microsoft.Management/managementGroups/mg1/providers/Microsoft.Blueprint/blueprints/web-stack",
            "type": "Microsoft.Blueprint/blueprints",
            "name": "web-stack",
            "properties": {
                "displayName": "Web stack",
                "description": "Baseline web workload",
                "targetScope": "subscription",
                "status": {
                    "timeCreated": "2023-05-01T10:00:00Z",
                    "lastModified": "2024-01-15T09:30:00Z"
                },
                "parameters": {
                    "region": {
                        "type": "string",
                        "defaultValue": "westeurope",
                        "allowedValues": ["westeurope", "northeurope"],
                        "metadata": {"displayName": "Region", "strongType": "location"}
                    },
                    "owner": {
                        "type": "string",
                        "metadata": {"description": "Owning team"}
                    }
                },
                "resourceGroups": {
                    "networking": {
                        "name": "rg-net",
                        "location": "westeurope",
                        "dependsOn": ["core"],
                        "metadata": {"displayName": "Networking"}
                    }
                }
            }
        })
    }

    #[test]
    fn maps_blueprint_and_attaches_container() {
        let bp = map_blueprint(&blueprint_record(), "mg1").unwrap();
        assert_eq!(bp.name, "web-stack");
        assert_eq!(bp.management_group, "mg1");
        assert_eq!(bp.target_scope, TargetScope::Subscription);
        assert_eq!(bp.display_name.as_deref(), Some("Web stack"));
        assert!(bp.status.last_modified.is_some());

        let region = &bp.parameters["region"];
        assert_eq!(region.allowed_values.len(), 2);
        assert_eq!(region.strong_type.as_deref(), Some("location"));
        assert!(!region.requires_value());
        assert!(bp.parameters["owner"].requires_value());

        assert_eq!(bp.resource_groups["networking"].depends_on, vec!["core"]);
    }

    #[test]
    fn identity_fields_round_trip() {
        let record = blueprint_record();
        let bp = map_blueprint(&record, "mg1").unwrap();
        assert_eq!(Some(bp.id.as_str()), record["id"].as_str());
        assert_eq!(Some(bp.name.as_str()), record["name"].as_str());
    }

    #[test]
    fn target_scope_casing_and_bogus_values() {
        let mut record = blueprint_record();
        record["properties"]["targetScope"] = json!("ManagementGroup");
        assert_eq!(
            map_blueprint(&record, "mg1").unwrap().target_scope,
            TargetScope::ManagementGroup
        );

        record["properties"]["targetScope"] = json!("bogus");
        assert_eq!(
            map_blueprint(&record, "mg1").unwrap().target_scope,
            TargetScope::Unknown
        );
    }

    #[test]
    fn absent_parameters_map_to_empty() {
        let record = json!({
            "id": "/x/blueprints/empty",
            "name": "empty",
            "properties": {}
        });
        let bp = map_blueprint(&record, "mg1").unwrap();
        assert!(bp.parameters.is_empty());
        assert!(bp.resource_groups.is_empty());
        assert!(bp.status.time_created.is_none());
        assert_eq!(bp.target_scope, TargetScope::Unknown);
    }

    #[test]
    fn missing_name_is_a_mapping_error() {
        let record = json!({"id": "/x/blueprints/anon", "properties": {}});
        let err = map_blueprint(&record, "mg1").unwrap_err();
        assert!(matches!(
            err,
            BlueprintError::Mapping { field: "name", .. }
        ));
    }

    #[test]
    fn unparsable_timestamps_become_absent() {
        let mut record = blueprint_record();
        record["properties"]["status"]["lastModified"] = json!("yesterday-ish");
        let bp = map_blueprint(&record, "mg1").unwrap();
        assert!(bp.status.last_modified.is_none());
        assert!(bp.status.time_created.is_some());
    }

    #[test]
    fn maps_published_version() {
        let record = json!({
            "id": "/x/blueprints/web-stack/versions/1.2",
            "type": "Microsoft.Blueprint/blueprints/versions",
            "name": "1.2",
            "properties": {
                "blueprintName": "web-stack",
                "changeNotes": "tighten NSG rules",
                "status": {"lastModified": "2024-02-01T00:00:00Z"},
                "targetScope": "subscription"
            }
        });
        let published = map_published_blueprint(&record, "mg1").unwrap();
        assert_eq!(published.version, "1.2");
        assert_eq!(published.blueprint_name.as_deref(), Some("web-stack"));
        assert_eq!(published.management_group, "mg1");
        assert_eq!(published.change_notes.as_deref(), Some("tighten NSG rules"));
    }

    #[test]
    fn maps_assignment_with_defaults() {
        let record = json!({
            "id": "/subscriptions/sub1/providers/Microsoft.Blueprint/blueprintAssignments/assign-web",
            "name": "assign-web",
            "location": "westeurope",
            "identity": {"type": "SystemAssigned", "principalId": "p-1", "tenantId": "t-1"},
            "properties": {
                "blueprintId": "/x/blueprints/web-stack/versions/1.2",
                "provisioningState": "succeeded",
                "locks": {"mode": "allResources"},
                "parameters": {"region": {"value": "westeurope"}},
                "resourceGroups": {"networking": {"name": "rg-net", "location": "westeurope"}},
                "status": {"timeCreated": "2024-02-02T08:00:00Z"}
            }
        });
        let assignment = map_assignment(&record, "sub1").unwrap();
        assert_eq!(assignment.subscription_id, "sub1");
        assert_eq!(assignment.provisioning_state, ProvisioningState::Succeeded);
        assert_eq!(assignment.locks, LockMode::AllResources);
        assert_eq!(assignment.identity.principal_id.as_deref(), Some("p-1"));
        assert_eq!(assignment.parameters["region"].value, json!("westeurope"));
    }

    #[test]
    fn assignment_tolerates_sparse_records() {
        let record = json!({"name": "bare"});
        let assignment = map_assignment(&record, "sub1").unwrap();
        assert_eq!(assignment.provisioning_state, ProvisioningState::Unknown);
        assert_eq!(assignment.locks, LockMode::Unknown);
        assert!(assignment.parameters.is_empty());
        assert!(assignment.identity.identity_type.is_none());
    }
}
