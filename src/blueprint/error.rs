//! Failure taxonomy for catalog operations.

use thiserror::Error;

/// Errors surfaced by the blueprint client.
///
/// Batch operations over several names or management groups absorb
/// [`NotFound`](BlueprintError::NotFound) and
/// [`Transport`](BlueprintError::Transport) failures for individual targets
/// and continue; `Mapping` and `Validation` always propagate.
#[derive(Debug, Error)]
pub enum BlueprintError {
    /// The catalog has no record for an explicit get.
    #[error("{resource} was not found in '{container}'")]
    NotFound { container: String, resource: String },

    /// A required field is structurally absent from an otherwise well-formed
    /// remote record. Indicates a contract mismatch with the service, not a
    /// missing resource.
    #[error("malformed record from '{container}': missing required field '{field}'")]
    Mapping {
        container: String,
        field: &'static str,
    },

    /// The remote call itself failed (network fault, rejection, bad status).
    #[error("catalog request failed: {0}")]
    Transport(String),

    /// Caller-side contract violation, raised before any remote call.
    #[error("{0}")]
    Validation(String),
}

impl BlueprintError {
    /// Whether a batch operation with more than one target may swallow this
    /// failure and keep going. A mapping error means the service sent us
    /// something we do not understand, and a validation error means the call
    /// was wrong before it left the process; neither is recoverable by
    /// skipping one target.
    pub fn is_absorbable(&self) -> bool {
        matches!(
            self,
            BlueprintError::NotFound { .. } | BlueprintError::Transport(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BlueprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_transport_are_absorbable() {
        let not_found = BlueprintError::NotFound {
            container: "mg1".to_string(),
            resource: "blueprint 'x'".to_string(),
        };
        assert!(not_found.is_absorbable());
        assert!(BlueprintError::Transport("timeout".to_string()).is_absorbable());
    }

    #[test]
    fn mapping_and_validation_are_fatal() {
        let mapping = BlueprintError::Mapping {
            container: "mg1".to_string(),
            field: "name",
        };
        assert!(!mapping.is_absorbable());
        assert!(!BlueprintError::Validation("bad args".to_string()).is_absorbable());
    }
}
