//! # Constants
//!
//! Shared constants used throughout the reconciler.

/// Plugin registry carrying access-control policy entries.
pub const ACCESS_CONTROL_PLUGIN: &str = "access_control";

/// Plugin registry carrying runbook path entries.
pub const RUNBOOKS_PLUGIN: &str = "runbooks";

/// Status assigned to every data-masking rule binding on sync.
pub const DATA_MASKING_RULE_STATUS: &str = "active";

/// Prefix applied to every encoded secret key.
pub const SECRET_ENVVAR_PREFIX: &str = "envvar:";
