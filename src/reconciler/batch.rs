//! Batch orchestration.
//!
//! Walks the declared batch strictly in order: each item's side effects,
//! including dependent creation and registry mutation, complete before the
//! next item starts, because registry synchronization is an unlocked
//! read-modify-write and concurrent items would drop each other's entries.
//! Deletions inside one `delete` item carry no ordering requirement and
//! are dispatched concurrently with independent per-id accounting.

use crate::api::{ApiError, ManagementApi};
use crate::constants::DATA_MASKING_RULE_STATUS;
use crate::error::{ReconcileError, Stage};
use crate::model::{BatchAction, ConnectionSpec, DataMaskingRuleBinding, RemoteConnection};
use crate::reconciler::merge;
use crate::reconciler::plugins::sync_plugins;
use crate::reconciler::provision::provision_dependents;
use crate::reconciler::resolve::{resolve, Resolution};
use futures::future;
use tracing::{info, info_span, warn, Instrument};

/// Whether a reconciled item created a new connection or updated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Created,
    Updated,
}

/// Outcome of one batch item.
#[derive(Debug)]
pub enum ItemOutcome {
    Create {
        name: String,
        result: Result<WriteKind, ReconcileError>,
    },
    Delete {
        results: Vec<(String, Result<(), ApiError>)>,
    },
}

/// Per-item outcomes of one batch run.
#[derive(Debug)]
pub struct BatchSummary {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchSummary {
    /// Number of failed units: failed create items plus failed deletions.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .map(|outcome| match outcome {
                ItemOutcome::Create { result, .. } => usize::from(result.is_err()),
                ItemOutcome::Delete { results } => {
                    results.iter().filter(|(_, result)| result.is_err()).count()
                }
            })
            .sum()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}

/// Process a declared batch, one item at a time.
///
/// A failure inside one item never crosses into its siblings; the failing
/// item is recorded and the run continues.
pub async fn handle_actions(api: &dyn ManagementApi, batch: &[BatchAction]) -> BatchSummary {
    info!("handling {} batch item(s)", batch.len());

    let mut outcomes = Vec::with_capacity(batch.len());
    for item in batch {
        match item {
            BatchAction::Create(spec) => {
                let result = reconcile_item(api, spec)
                    .instrument(info_span!("reconcile", connection = %spec.name))
                    .await;
                if let Err(error) = &result {
                    warn!(
                        stage = %error.stage(),
                        "connection {:?} failed: {error}", spec.name
                    );
                }
                outcomes.push(ItemOutcome::Create {
                    name: spec.name.clone(),
                    result,
                });
            }
            BatchAction::Delete(delete) => {
                let results = delete_connections(api, &delete.connections).await;
                outcomes.push(ItemOutcome::Delete { results });
            }
        }
    }

    BatchSummary { outcomes }
}

/// Run one create item to `Done` or `Failed`:
/// provision dependents, resolve, merge, write, then the non-fatal policy
/// syncs (data-masking rule list and plugin registries).
async fn reconcile_item(
    api: &dyn ManagementApi,
    spec: &ConnectionSpec,
) -> Result<WriteKind, ReconcileError> {
    let deps = provision_dependents(api, spec).await?;
    let resolution = resolve(api, &spec.name).await?;
    let document = merge::reconcile(spec, &resolution, &deps)?;

    let (kind, written) = match &resolution {
        Resolution::NotFound => {
            info!("creating connection {:?}", spec.name);
            let written = api.create_connection(&document).await.map_err(|source| {
                ReconcileError::Write {
                    name: spec.name.clone(),
                    stage: Stage::Creating,
                    source,
                }
            })?;
            (WriteKind::Created, written)
        }
        Resolution::Found(_) => {
            info!("updating connection {:?}", spec.name);
            let written = api
                .update_connection(&spec.name, &document)
                .await
                .map_err(|source| ReconcileError::Write {
                    name: spec.name.clone(),
                    stage: Stage::Updating,
                    source,
                })?;
            (WriteKind::Updated, written)
        }
    };

    sync_policies(api, spec, &resolution, &written).await;

    Ok(kind)
}

/// Policy syncing stage. Failures here are logged and the item still
/// counts as processed.
async fn sync_policies(
    api: &dyn ManagementApi,
    spec: &ConnectionSpec,
    resolution: &Resolution,
    written: &RemoteConnection,
) {
    let bindings: Vec<DataMaskingRuleBinding> = spec
        .datamasking_rules
        .iter()
        .map(|rule_id| DataMaskingRuleBinding {
            rule_id: rule_id.clone(),
            status: DATA_MASKING_RULE_STATUS.to_string(),
        })
        .collect();
    if let Err(error) = api.replace_datamasking_rules(&written.name, &bindings).await {
        warn!(
            "data masking rule sync failed for connection {:?}: {error}",
            written.name
        );
    }

    if spec.access_control.is_none() && spec.runbook_config.is_none() {
        return;
    }

    // Prefer the write response's id; fall back to the resolved document.
    let connection_id = written.id.clone().or_else(|| match resolution {
        Resolution::Found(existing) => existing.id.clone(),
        Resolution::NotFound => None,
    });

    match connection_id {
        Some(id) => {
            if let Err(error) = sync_plugins(api, spec, &id, &written.name).await {
                warn!(stage = %error.stage(), "{error}");
            }
        }
        None => warn!(
            "connection {:?} write response carried no id, skipping plugin registry sync",
            written.name
        ),
    }
}

/// Delete connections by id, all requests in flight at once, recording
/// per-id success or failure independently.
pub async fn delete_connections(
    api: &dyn ManagementApi,
    ids: &[String],
) -> Vec<(String, Result<(), ApiError>)> {
    info!("deleting {} connection(s)", ids.len());

    let deletions = ids
        .iter()
        .map(|id| async move { (id.clone(), api.delete_connection(id).await) });
    let results = future::join_all(deletions).await;

    for (id, result) in &results {
        match result {
            Ok(()) => info!("connection {id} deleted"),
            Err(error) => warn!("connection {id} failed on delete: {error}"),
        }
    }

    results
}
