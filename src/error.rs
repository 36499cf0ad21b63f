//! # Error Taxonomy
//!
//! Per-item reconciliation failures. Errors never cross between sibling
//! batch items: the orchestrator records an outcome for the failing item
//! and moves on. Every variant names the connection so an operator can
//! tell which item died and at which stage.

use crate::api::ApiError;
use std::fmt;
use thiserror::Error;

/// Stage of the per-item state machine a failure is attributed to.
///
/// `Pending -> [ProvisioningDependents] -> Resolving ->
/// {Creating | Updating} -> PolicySyncing -> Done`, with `Failed`
/// reachable from any stage. `PolicySyncing` failures are logged and do
/// not fail the item; all earlier stages abort it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ProvisioningDependents,
    Resolving,
    Creating,
    Updating,
    PolicySyncing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProvisioningDependents => f.write_str("provisioning dependents"),
            Self::Resolving => f.write_str("resolving"),
            Self::Creating => f.write_str("creating"),
            Self::Updating => f.write_str("updating"),
            Self::PolicySyncing => f.write_str("policy syncing"),
        }
    }
}

/// Failure of one batch item.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The declared backend type has no entry in the connection-type table.
    #[error("connection {name:?}: unknown connection type {connection_type:?}")]
    UnknownConnectionType {
        name: String,
        connection_type: String,
    },

    /// Both an inline issue-template definition and an existing template
    /// id were supplied; the inputs are mutually exclusive by contract.
    #[error(
        "connection {name:?}: jiraTemplate and jiraTemplateId are mutually exclusive, supply one"
    )]
    ConflictingTemplateInputs { name: String },

    /// The existence check returned something other than 200 or 404.
    #[error("connection {name:?}: existence check failed")]
    Lookup {
        name: String,
        #[source]
        source: ApiError,
    },

    /// A dependent guardrail or issue template could not be created; the
    /// item aborts before any connection write.
    #[error("connection {name:?}: failed to create dependent {resource}")]
    DependencyCreation {
        name: String,
        resource: &'static str,
        #[source]
        source: ApiError,
    },

    /// The connection create or update write was rejected.
    #[error("connection {name:?}: {stage} failed")]
    Write {
        name: String,
        stage: Stage,
        #[source]
        source: ApiError,
    },

    /// A plugin registry read-modify-write failed. Non-fatal: the
    /// orchestrator logs it and still counts the item as processed.
    #[error("connection {name:?}: failed to sync plugin registry {registry:?}")]
    RegistrySync {
        name: String,
        registry: String,
        #[source]
        source: ApiError,
    },
}

impl ReconcileError {
    /// Stage the failure is attributed to, for operator diagnosis.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::ConflictingTemplateInputs { .. } | Self::DependencyCreation { .. } => {
                Stage::ProvisioningDependents
            }
            Self::Lookup { .. } => Stage::Resolving,
            Self::UnknownConnectionType { .. } => Stage::Creating,
            Self::Write { stage, .. } => *stage,
            Self::RegistrySync { .. } => Stage::PolicySyncing,
        }
    }

    /// Name of the connection the failing item declared.
    #[must_use]
    pub fn connection_name(&self) -> &str {
        match self {
            Self::UnknownConnectionType { name, .. }
            | Self::ConflictingTemplateInputs { name }
            | Self::Lookup { name, .. }
            | Self::DependencyCreation { name, .. }
            | Self::Write { name, .. }
            | Self::RegistrySync { name, .. } => name,
        }
    }
}
