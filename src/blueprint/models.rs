//! Domain entities produced by the mapper.
//!
//! Everything here is a read-only result object: constructed once from a
//! single remote record, never mutated in place. Opaque payloads (parameter
//! defaults, version metadata, layout) stay as raw JSON values.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Creation/modification times of a catalog record. Both are optional; a
/// timestamp the service omitted or sent malformed is simply absent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlueprintStatus {
    pub time_created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Scope a blueprint definition can be assigned at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TargetScope {
    ManagementGroup,
    Subscription,
    #[default]
    Unknown,
}

impl TargetScope {
    /// Case-insensitive parse; anything unrecognized is `Unknown`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("managementgroup") => TargetScope::ManagementGroup,
            Some("subscription") => TargetScope::Subscription,
            _ => TargetScope::Unknown,
        }
    }
}

/// Resource locking applied by an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LockMode {
    #[default]
    None,
    AllResources,
    Unknown,
}

impl LockMode {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("none") => LockMode::None,
            Some("allresources") => LockMode::AllResources,
            _ => LockMode::Unknown,
        }
    }

    /// Wire spelling used when submitting an assignment.
    pub fn as_wire(&self) -> &'static str {
        match self {
            LockMode::None | LockMode::Unknown => "None",
            LockMode::AllResources => "AllResources",
        }
    }
}

/// Provisioning lifecycle of an assignment, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ProvisioningState {
    #[default]
    Unknown,
    Creating,
    Validating,
    Waiting,
    Deploying,
    Locking,
    ValidationFailed,
    Succeeded,
    Failed,
    Cancelled,
    Deleting,
}

impl ProvisioningState {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("creating") => ProvisioningState::Creating,
            Some("validating") => ProvisioningState::Validating,
            Some("waiting") => ProvisioningState::Waiting,
            Some("deploying") => ProvisioningState::Deploying,
            Some("locking") => ProvisioningState::Locking,
            Some("validationfailed") => ProvisioningState::ValidationFailed,
            Some("succeeded") => ProvisioningState::Succeeded,
            Some("failed") => ProvisioningState::Failed,
            Some("cancelled") | Some("canceled") => ProvisioningState::Cancelled,
            Some("deleting") => ProvisioningState::Deleting,
            _ => ProvisioningState::Unknown,
        }
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A parameter declared by a blueprint definition.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterDefinition {
    pub parameter_type: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub strong_type: Option<String>,
    /// Opaque default; `Value::Null` when the definition declares none.
    pub default_value: Value,
    /// Empty when the definition does not constrain values.
    pub allowed_values: Vec<Value>,
}

impl ParameterDefinition {
    /// Whether an assignment must supply a value for this parameter.
    pub fn requires_value(&self) -> bool {
        self.default_value.is_null()
    }
}

/// A resource-group placeholder declared by a blueprint definition.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceGroupDefinition {
    pub name: Option<String>,
    pub location: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub strong_type: Option<String>,
    pub depends_on: Vec<String>,
}

/// A draft blueprint definition under a management group.
#[derive(Debug, Clone, Serialize)]
pub struct Blueprint {
    pub id: String,
    pub resource_type: Option<String>,
    pub name: String,
    /// Management group the record was fetched from. Not present in the
    /// remote record itself; later operations need it for identity scoping.
    pub management_group: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub status: BlueprintStatus,
    pub target_scope: TargetScope,
    pub parameters: BTreeMap<String, ParameterDefinition>,
    pub resource_groups: BTreeMap<String, ResourceGroupDefinition>,
    /// Opaque version metadata payload.
    pub versions: Value,
    /// Opaque layout payload.
    pub layout: Value,
}

/// An immutable published snapshot of a blueprint definition.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedBlueprint {
    pub id: String,
    pub resource_type: Option<String>,
    /// The snapshot's version identifier (the ARM resource name).
    pub version: String,
    /// Name of the definition this snapshot was published from.
    pub blueprint_name: Option<String>,
    pub management_group: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub change_notes: Option<String>,
    pub status: BlueprintStatus,
    pub target_scope: TargetScope,
    pub parameters: BTreeMap<String, ParameterDefinition>,
    pub resource_groups: BTreeMap<String, ResourceGroupDefinition>,
}

/// Managed identity attached to an assignment. Fields stay empty until
/// provisioning has completed on the service side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManagedIdentity {
    pub identity_type: Option<String>,
    pub principal_id: Option<String>,
    pub tenant_id: Option<String>,
}

/// A concrete parameter value recorded on an assignment.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentParameter {
    pub value: Value,
    pub description: Option<String>,
}

/// A resolved resource-group placeholder on an assignment.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceGroupValue {
    pub name: Option<String>,
    pub location: Option<String>,
}

/// An application of a published blueprint to a subscription.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: Option<String>,
    pub resource_type: Option<String>,
    pub name: String,
    /// Subscription the assignment was fetched from; needed for deletion.
    pub subscription_id: String,
    pub location: Option<String>,
    pub identity: ManagedIdentity,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub blueprint_id: Option<String>,
    pub parameters: BTreeMap<String, AssignmentParameter>,
    pub resource_groups: BTreeMap<String, ResourceGroupValue>,
    pub status: BlueprintStatus,
    pub locks: LockMode,
    pub provisioning_state: ProvisioningState,
}
