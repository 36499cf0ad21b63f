//! Management API wire types.
//!
//! These structs match the JSON documents the remote API reads and writes
//! (snake_case fields, `"enabled"`/`"disabled"` string toggles). The
//! connection document carries a flattened passthrough map so that fields
//! the merge does not model survive a read-merge-write cycle; the
//! connection write is a full replace and must not strip them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A two-state enable/disable wire value.
///
/// Remote access mode fields are never left unresolved: every merge
/// collapses to exactly `enabled` or `disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Enabled,
    #[default]
    Disabled,
}

impl Toggle {
    /// Derive the wire value from a declared boolean.
    #[must_use]
    pub fn from_flag(flag: bool) -> Self {
        if flag {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => f.write_str("enabled"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

/// The server-side connection document, superset of the declared spec.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteConnection {
    /// Server-generated identity; absent on a create payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(rename = "type")]
    pub connection_type: String,

    #[serde(default)]
    pub subtype: String,

    /// Encoded secret map (`envvar:KEY` to base64 value).
    #[serde(default)]
    pub secret: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    #[serde(default)]
    pub access_mode_runbooks: Toggle,
    #[serde(default)]
    pub access_mode_exec: Toggle,
    #[serde(default)]
    pub access_mode_connect: Toggle,
    #[serde(default)]
    pub access_schema: Toggle,

    #[serde(default)]
    pub reviewers: Vec<String>,

    #[serde(default)]
    pub redact_enabled: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redact_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_issue_template_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guardrail_rules: Vec<String>,

    /// Server fields the merge does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A named plugin policy registry (e.g. `access_control`, `runbooks`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Plugin {
    pub name: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub connections: Vec<PluginEntry>,
}

/// Registry membership entry for one connection. Identity key is `id`
/// (the connection's resource id), not `name`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PluginEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// One data-masking rule binding of the ordered rule list replaced via
/// `PUT /connections/{name}/datamasking-rules`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DataMaskingRuleBinding {
    pub rule_id: String,
    pub status: String,
}

/// Response shape of dependent-resource creation endpoints; only the
/// generated id matters to the reconciler.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResource {
    pub id: String,
}
