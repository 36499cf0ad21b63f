//! Dependent resource provisioning.
//!
//! Resolves guardrail and issue-template references before the connection
//! write so their generated identifiers are available to the merge. Both
//! sub-flows are idempotent by construction: existing ids pass through
//! untouched, only inline definitions cause creation calls.

use crate::api::ManagementApi;
use crate::error::ReconcileError;
use crate::model::{ConnectionSpec, GuardrailRef};
use tracing::{debug, info};

/// Identifiers produced by dependent-resource provisioning, consumed by
/// the merge engine.
#[derive(Debug, Clone, Default)]
pub struct ProvisionedDependents {
    pub jira_issue_template_id: Option<String>,
    pub guardrail_ids: Vec<String>,
}

/// Provision the issue template and guardrails a spec references.
///
/// Supplying both an inline template and an existing template id is a
/// configuration error. A guardrail creation failure aborts the whole
/// item; no partial guardrail set is ever attached.
///
/// # Errors
/// `ConflictingTemplateInputs` or `DependencyCreation`.
pub async fn provision_dependents(
    api: &dyn ManagementApi,
    spec: &ConnectionSpec,
) -> Result<ProvisionedDependents, ReconcileError> {
    let jira_issue_template_id = match (&spec.jira_template, &spec.jira_template_id) {
        (Some(_), Some(_)) => {
            return Err(ReconcileError::ConflictingTemplateInputs {
                name: spec.name.clone(),
            })
        }
        (Some(template), None) => {
            let created = api.create_issue_template(template).await.map_err(|source| {
                ReconcileError::DependencyCreation {
                    name: spec.name.clone(),
                    resource: "issue template",
                    source,
                }
            })?;
            info!("issue template created with id {:?}", created.id);
            Some(created.id)
        }
        (None, Some(id)) => {
            debug!("using existing issue template id {id:?}");
            Some(id.clone())
        }
        (None, None) => None,
    };

    let guardrail_ids = resolve_guardrails(api, spec).await?;

    Ok(ProvisionedDependents {
        jira_issue_template_id,
        guardrail_ids,
    })
}

/// Resolve a guardrail reference list to an id list, preserving order and
/// length: bare ids pass through, inline definitions are created and
/// replaced by their generated id.
async fn resolve_guardrails(
    api: &dyn ManagementApi,
    spec: &ConnectionSpec,
) -> Result<Vec<String>, ReconcileError> {
    let mut ids = Vec::with_capacity(spec.guardrails.len());
    for guardrail in &spec.guardrails {
        match guardrail {
            GuardrailRef::Existing(id) => {
                debug!("using existing guardrail id {id:?}");
                ids.push(id.clone());
            }
            GuardrailRef::Inline(definition) => {
                let created = api.create_guardrail(definition).await.map_err(|source| {
                    ReconcileError::DependencyCreation {
                        name: spec.name.clone(),
                        resource: "guardrail",
                        source,
                    }
                })?;
                info!("guardrail created with id {:?}", created.id);
                ids.push(created.id);
            }
        }
    }
    Ok(ids)
}
