//! Declared batch types.
//!
//! These types mirror the JSON payload handed to the reconciler: a list of
//! `{action: "create" | "delete", ...}` items. Field names follow the
//! payload's camelCase convention, except for `runbook_config` which the
//! payload carries in snake_case.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One item of the declared batch, discriminated by its `action` field.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum BatchAction {
    /// Create or merge-update the declared connection.
    Create(Box<ConnectionSpec>),
    /// Delete a list of connections by id.
    Delete(DeleteAction),
}

/// A declared connection: the desired state for one named connection.
///
/// The name is the idempotency key - a batch run decides create vs. update
/// by looking the name up remotely. All other fields are partial: an
/// omitted field never overwrites remote state (see the merge rules in
/// [`crate::reconciler::merge`]).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSpec {
    /// Unique connection name, the create-vs-update key.
    pub name: String,

    /// Backend type key into the fixed connection-type table
    /// (mysql, postgres, mssql, oracledb, mongodb, custom).
    #[serde(rename = "type")]
    pub connection_type: String,

    /// Secret name to plaintext value. Encoded to the wire form by
    /// [`crate::reconciler::secrets::encode_secrets`] before any write.
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,

    /// Agent the connection is served through.
    #[serde(default)]
    pub agent_id: Option<String>,

    /// Access mode flags. Omitting the whole block leaves the remote
    /// access modes untouched on update.
    #[serde(default)]
    pub access_mode: Option<AccessMode>,

    /// Schema browsing flag.
    #[serde(default)]
    pub schema: Option<bool>,

    /// Reviewer group identifiers, treated as a set on merge.
    #[serde(default)]
    pub review_groups: Vec<String>,

    /// Data-masking (redact) flag. An explicit `false` disables masking
    /// on update; omission keeps the remote value.
    #[serde(default)]
    pub datamasking: Option<bool>,

    /// Redact type identifiers.
    #[serde(default)]
    pub redact_types: Vec<String>,

    /// Data-masking rule ids to bind to the connection after the write.
    #[serde(default)]
    pub datamasking_rules: Vec<String>,

    /// Guardrail references: existing ids or inline definitions to create.
    #[serde(default)]
    pub guardrails: Vec<GuardrailRef>,

    /// Inline issue-template definition to create. Mutually exclusive with
    /// `jira_template_id`; supplying both is a configuration error.
    #[serde(default)]
    pub jira_template: Option<serde_json::Value>,

    /// Existing issue-template id to associate verbatim.
    #[serde(default)]
    pub jira_template_id: Option<String>,

    /// Access-control policy value for the `access_control` plugin
    /// registry, carried opaquely.
    #[serde(default)]
    pub access_control: Option<serde_json::Value>,

    /// Runbook path config for the `runbooks` plugin registry.
    #[serde(default, rename = "runbook_config")]
    pub runbook_config: Option<String>,
}

/// Access mode flags of a declared connection.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessMode {
    /// Runbook execution access.
    #[serde(default)]
    pub runbook: bool,
    /// Web/exec access.
    #[serde(default)]
    pub web: bool,
    /// Native protocol (connect) access.
    #[serde(default)]
    pub native: bool,
}

/// A guardrail reference: either an existing guardrail id, or an inline
/// definition the reconciler creates remotely before the connection write.
/// The definition interior is opaque to the reconciler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GuardrailRef {
    Existing(String),
    Inline(serde_json::Value),
}

/// A `delete` batch item: connection ids to remove.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteAction {
    #[serde(default)]
    pub connections: Vec<String>,
}

/// Look up the `{type, subtype}` pair for a declared backend type key.
///
/// Returns `None` for an unrecognized key; callers treat that as a fatal
/// configuration error for the item.
#[must_use]
pub fn connection_type_mapping(key: &str) -> Option<(&'static str, &'static str)> {
    match key {
        "mysql" => Some(("database", "mysql")),
        "postgres" => Some(("database", "postgres")),
        "mssql" => Some(("database", "mssql")),
        "oracledb" => Some(("database", "oracledb")),
        "mongodb" => Some(("database", "mongodb")),
        "custom" => Some(("custom", "custom")),
        _ => None,
    }
}
