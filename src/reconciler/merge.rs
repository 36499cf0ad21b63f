//! The merge engine.
//!
//! [`reconcile`] is a pure function from a declared spec, the resolution
//! of its name, and the provisioned dependent ids to the exact document
//! to persist. No I/O happens here; the orchestrator performs the write.
//!
//! Merge rules for an existing connection:
//! - access mode and schema toggles follow the sticky-enable contract of
//!   [`merge_toggle`];
//! - secrets are overlaid (new keys win, nothing is deleted);
//! - reviewers merge as an order-preserving set union;
//! - `agent_id`, `jira_issue_template_id` and `redact_types` fall back to
//!   the existing value when the declared one is absent or empty;
//! - `redact_enabled` takes an explicitly declared value, including an
//!   explicit `false`;
//! - `guardrail_rules` are replaced wholesale only when newly resolved
//!   ids exist, never partially merged;
//! - everything else of the existing document (id, type, unmodeled
//!   fields) is carried over untouched.

use crate::error::ReconcileError;
use crate::model::spec::connection_type_mapping;
use crate::model::{ConnectionSpec, RemoteConnection, Toggle};
use crate::reconciler::provision::ProvisionedDependents;
use crate::reconciler::resolve::Resolution;
use crate::reconciler::secrets::encode_secrets;
use std::collections::BTreeMap;

/// Tri-state toggle merge with the sticky-enable contract.
///
/// A declared boolean always decides. An omitted field keeps the remote
/// state as it is: an enabled field is never downgraded by omission, and
/// a disabled one is not silently enabled. With no value on either side
/// the field collapses to disabled.
#[must_use]
pub fn merge_toggle(declared: Option<bool>, existing: Option<Toggle>) -> Toggle {
    match declared {
        Some(flag) => Toggle::from_flag(flag),
        None => existing.unwrap_or_default(),
    }
}

/// Order-preserving set union of existing reviewers and declared groups.
fn union_reviewers(existing: &[String], declared: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + declared.len());
    for reviewer in existing.iter().chain(declared) {
        if !merged.contains(reviewer) {
            merged.push(reviewer.clone());
        }
    }
    merged
}

/// Build the connection document to persist.
///
/// # Errors
/// `UnknownConnectionType` when creating with a type key the fixed table
/// does not know.
pub fn reconcile(
    spec: &ConnectionSpec,
    resolution: &Resolution,
    deps: &ProvisionedDependents,
) -> Result<RemoteConnection, ReconcileError> {
    match resolution {
        Resolution::NotFound => build_new(spec, deps),
        Resolution::Found(existing) => Ok(merge_existing(spec, existing, deps)),
    }
}

fn build_new(
    spec: &ConnectionSpec,
    deps: &ProvisionedDependents,
) -> Result<RemoteConnection, ReconcileError> {
    let (connection_type, subtype) =
        connection_type_mapping(&spec.connection_type).ok_or_else(|| {
            ReconcileError::UnknownConnectionType {
                name: spec.name.clone(),
                connection_type: spec.connection_type.clone(),
            }
        })?;

    let access = spec.access_mode.as_ref();

    Ok(RemoteConnection {
        id: None,
        name: spec.name.clone(),
        connection_type: connection_type.to_string(),
        subtype: subtype.to_string(),
        secret: encode_secrets(&spec.secrets),
        agent_id: spec.agent_id.clone(),
        access_mode_runbooks: merge_toggle(access.map(|m| m.runbook), None),
        access_mode_exec: merge_toggle(access.map(|m| m.web), None),
        access_mode_connect: merge_toggle(access.map(|m| m.native), None),
        access_schema: merge_toggle(spec.schema, None),
        reviewers: union_reviewers(&[], &spec.review_groups),
        redact_enabled: spec.datamasking.unwrap_or(false),
        redact_types: spec.redact_types.clone(),
        jira_issue_template_id: deps.jira_issue_template_id.clone(),
        guardrail_rules: deps.guardrail_ids.clone(),
        extra: BTreeMap::new(),
    })
}

fn merge_existing(
    spec: &ConnectionSpec,
    existing: &RemoteConnection,
    deps: &ProvisionedDependents,
) -> RemoteConnection {
    let mut document = existing.clone();

    if let Some(agent_id) = spec.agent_id.as_deref().filter(|id| !id.is_empty()) {
        document.agent_id = Some(agent_id.to_string());
    }

    // Overlay: new keys win, remote-only keys survive.
    document.secret.extend(encode_secrets(&spec.secrets));

    let access = spec.access_mode.as_ref();
    document.access_mode_runbooks = merge_toggle(
        access.map(|m| m.runbook),
        Some(existing.access_mode_runbooks),
    );
    document.access_mode_exec =
        merge_toggle(access.map(|m| m.web), Some(existing.access_mode_exec));
    document.access_mode_connect =
        merge_toggle(access.map(|m| m.native), Some(existing.access_mode_connect));
    document.access_schema = merge_toggle(spec.schema, Some(existing.access_schema));

    document.reviewers = union_reviewers(&existing.reviewers, &spec.review_groups);

    if let Some(flag) = spec.datamasking {
        document.redact_enabled = flag;
    }
    if !spec.redact_types.is_empty() {
        document.redact_types = spec.redact_types.clone();
    }
    if deps.jira_issue_template_id.is_some() {
        document.jira_issue_template_id = deps.jira_issue_template_id.clone();
    }
    if !deps.guardrail_ids.is_empty() {
        document.guardrail_rules = deps.guardrail_ids.clone();
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AccessMode;
    use serde_json::json;

    fn base_spec() -> ConnectionSpec {
        ConnectionSpec {
            name: "PIX-USER".to_string(),
            connection_type: "mysql".to_string(),
            secrets: [("host".to_string(), "h".to_string())].into(),
            agent_id: Some("a1".to_string()),
            access_mode: Some(AccessMode {
                runbook: true,
                web: false,
                native: false,
            }),
            schema: Some(false),
            ..ConnectionSpec::default()
        }
    }

    fn existing_connection() -> RemoteConnection {
        RemoteConnection {
            id: Some("c-1".to_string()),
            name: "PIX-USER".to_string(),
            connection_type: "database".to_string(),
            subtype: "mysql".to_string(),
            secret: [("envvar:HOST".to_string(), "aA==".to_string())].into(),
            agent_id: Some("a1".to_string()),
            access_mode_runbooks: Toggle::Enabled,
            access_mode_exec: Toggle::Disabled,
            access_mode_connect: Toggle::Disabled,
            access_schema: Toggle::Disabled,
            reviewers: vec!["group1".to_string()],
            redact_enabled: false,
            redact_types: Vec::new(),
            jira_issue_template_id: None,
            guardrail_rules: vec!["g-1".to_string()],
            extra: BTreeMap::new(),
        }
    }

    mod toggle_merge {
        use super::*;

        #[test]
        fn test_declared_true_enables() {
            assert_eq!(merge_toggle(Some(true), None), Toggle::Enabled);
            assert_eq!(merge_toggle(Some(true), Some(Toggle::Disabled)), Toggle::Enabled);
        }

        #[test]
        fn test_explicit_false_disables_regardless_of_prior_state() {
            assert_eq!(merge_toggle(Some(false), Some(Toggle::Enabled)), Toggle::Disabled);
        }

        #[test]
        fn test_omitted_field_is_sticky() {
            assert_eq!(merge_toggle(None, Some(Toggle::Enabled)), Toggle::Enabled);
            assert_eq!(merge_toggle(None, Some(Toggle::Disabled)), Toggle::Disabled);
        }

        #[test]
        fn test_omitted_with_no_existing_collapses_to_disabled() {
            assert_eq!(merge_toggle(None, None), Toggle::Disabled);
        }
    }

    #[test]
    fn test_create_payload_shape() {
        let spec = base_spec();
        let document = reconcile(&spec, &Resolution::NotFound, &ProvisionedDependents::default())
            .expect("create should succeed");

        assert_eq!(document.name, "PIX-USER");
        assert_eq!(document.connection_type, "database");
        assert_eq!(document.subtype, "mysql");
        assert_eq!(document.secret["envvar:HOST"], "aA==");
        assert_eq!(document.agent_id.as_deref(), Some("a1"));
        assert_eq!(document.access_mode_runbooks, Toggle::Enabled);
        assert_eq!(document.access_mode_exec, Toggle::Disabled);
        assert_eq!(document.access_mode_connect, Toggle::Disabled);
        assert_eq!(document.access_schema, Toggle::Disabled);
        assert!(document.reviewers.is_empty());
        assert_eq!(document.id, None);
    }

    #[test]
    fn test_create_with_unknown_type_is_a_configuration_error() {
        let mut spec = base_spec();
        spec.connection_type = "redis".to_string();
        let err = reconcile(&spec, &Resolution::NotFound, &ProvisionedDependents::default())
            .expect_err("unknown type must fail");
        assert!(matches!(err, ReconcileError::UnknownConnectionType { .. }));
    }

    #[test]
    fn test_create_then_create_again_converges() {
        let spec = base_spec();
        let deps = ProvisionedDependents::default();
        let first = reconcile(&spec, &Resolution::NotFound, &deps).unwrap();

        // Second run sees the first document as remote state.
        let mut remote = first.clone();
        remote.id = Some("c-1".to_string());
        let second = reconcile(&spec, &Resolution::Found(remote.clone()), &deps).unwrap();

        assert_eq!(second, remote, "unchanged spec must not drift any field");
    }

    #[test]
    fn test_omitted_access_mode_keeps_enabled_runbooks() {
        let spec = ConnectionSpec {
            name: "PIX-USER".to_string(),
            connection_type: "mysql".to_string(),
            ..ConnectionSpec::default()
        };
        let document = reconcile(
            &spec,
            &Resolution::Found(existing_connection()),
            &ProvisionedDependents::default(),
        )
        .unwrap();
        assert_eq!(document.access_mode_runbooks, Toggle::Enabled);
    }

    #[test]
    fn test_explicit_disable_wins_over_remote_enabled() {
        let mut spec = base_spec();
        spec.access_mode = Some(AccessMode {
            runbook: false,
            web: false,
            native: false,
        });
        let document = reconcile(
            &spec,
            &Resolution::Found(existing_connection()),
            &ProvisionedDependents::default(),
        )
        .unwrap();
        assert_eq!(document.access_mode_runbooks, Toggle::Disabled);
    }

    #[test]
    fn test_secret_overlay_keeps_remote_only_keys() {
        let mut spec = base_spec();
        spec.secrets = [
            ("host".to_string(), "new-h".to_string()),
            ("port".to_string(), "5432".to_string()),
        ]
        .into();
        let document = reconcile(
            &spec,
            &Resolution::Found(existing_connection()),
            &ProvisionedDependents::default(),
        )
        .unwrap();

        // host overwritten, port added, nothing deleted
        assert_eq!(document.secret["envvar:HOST"], "bmV3LWg=");
        assert!(document.secret.contains_key("envvar:PORT"));
    }

    #[test]
    fn test_reviewers_merge_as_set_union() {
        let mut spec = base_spec();
        spec.review_groups = vec!["group1".to_string(), "group2".to_string()];
        let document = reconcile(
            &spec,
            &Resolution::Found(existing_connection()),
            &ProvisionedDependents::default(),
        )
        .unwrap();
        assert_eq!(document.reviewers, vec!["group1", "group2"]);
    }

    #[test]
    fn test_guardrails_replaced_only_when_newly_resolved() {
        let spec = base_spec();
        let kept = reconcile(
            &spec,
            &Resolution::Found(existing_connection()),
            &ProvisionedDependents::default(),
        )
        .unwrap();
        assert_eq!(kept.guardrail_rules, vec!["g-1"]);

        let deps = ProvisionedDependents {
            jira_issue_template_id: None,
            guardrail_ids: vec!["g-2".to_string(), "g-3".to_string()],
        };
        let replaced =
            reconcile(&spec, &Resolution::Found(existing_connection()), &deps).unwrap();
        assert_eq!(replaced.guardrail_rules, vec!["g-2", "g-3"]);
    }

    #[test]
    fn test_redact_flag_explicit_false_is_honored() {
        let mut existing = existing_connection();
        existing.redact_enabled = true;
        existing.redact_types = vec!["EMAIL".to_string()];

        let mut spec = base_spec();
        spec.datamasking = Some(false);
        let document = reconcile(
            &spec,
            &Resolution::Found(existing),
            &ProvisionedDependents::default(),
        )
        .unwrap();

        assert!(!document.redact_enabled);
        // omitted redact types keep the remote list
        assert_eq!(document.redact_types, vec!["EMAIL"]);
    }

    #[test]
    fn test_update_preserves_id_and_unmodeled_fields() {
        let mut existing = existing_connection();
        existing
            .extra
            .insert("managed_by".to_string(), json!("hoopagent"));

        let document = reconcile(
            &base_spec(),
            &Resolution::Found(existing),
            &ProvisionedDependents::default(),
        )
        .unwrap();

        assert_eq!(document.id.as_deref(), Some("c-1"));
        assert_eq!(document.extra.get("managed_by"), Some(&json!("hoopagent")));
    }

    #[test]
    fn test_empty_agent_id_falls_back_to_existing() {
        let mut spec = base_spec();
        spec.agent_id = Some(String::new());
        let document = reconcile(
            &spec,
            &Resolution::Found(existing_connection()),
            &ProvisionedDependents::default(),
        )
        .unwrap();
        assert_eq!(document.agent_id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_provisioned_template_id_overrides_existing() {
        let mut existing = existing_connection();
        existing.jira_issue_template_id = Some("t-old".to_string());

        let deps = ProvisionedDependents {
            jira_issue_template_id: Some("t-new".to_string()),
            guardrail_ids: Vec::new(),
        };
        let document = reconcile(&base_spec(), &Resolution::Found(existing), &deps).unwrap();
        assert_eq!(document.jira_issue_template_id.as_deref(), Some("t-new"));
    }
}
