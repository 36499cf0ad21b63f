//! Plugin registry synchronization.
//!
//! Keeps the `access_control` and `runbooks` registries consistent with a
//! reconciled connection's identity: fetch the registry, find-or-replace
//! the entry keyed by connection id, write the full list back. Replacing
//! instead of appending is what keeps repeated runs from piling up
//! duplicate entries for the same connection.
//!
//! The read-modify-write cycle has no locking; callers serialize access
//! to each registry by processing batch items sequentially.

use crate::api::ManagementApi;
use crate::constants::{ACCESS_CONTROL_PLUGIN, RUNBOOKS_PLUGIN};
use crate::error::ReconcileError;
use crate::model::{ConnectionSpec, Plugin, PluginEntry};
use tracing::info;

/// Insert-or-replace a registry entry, keyed by connection id. An
/// existing entry is replaced in place, preserving list order.
pub fn upsert_entry(registry: &mut Plugin, entry: PluginEntry) {
    if let Some(slot) = registry
        .connections
        .iter_mut()
        .find(|existing| existing.id == entry.id)
    {
        *slot = entry;
    } else {
        registry.connections.push(entry);
    }
}

/// Synchronize the policy registries the declared connection carries
/// payloads for.
///
/// # Errors
/// `RegistrySync` - callers treat it as non-fatal and log it.
pub async fn sync_plugins(
    api: &dyn ManagementApi,
    spec: &ConnectionSpec,
    connection_id: &str,
    connection_name: &str,
) -> Result<(), ReconcileError> {
    if let Some(config) = &spec.access_control {
        sync_registry(
            api,
            ACCESS_CONTROL_PLUGIN,
            PluginEntry {
                id: connection_id.to_string(),
                name: connection_name.to_string(),
                config: config.clone(),
            },
        )
        .await?;
    }

    if let Some(path) = &spec.runbook_config {
        // The runbooks registry expects the path wrapped in a one-element list.
        sync_registry(
            api,
            RUNBOOKS_PLUGIN,
            PluginEntry {
                id: connection_id.to_string(),
                name: connection_name.to_string(),
                config: serde_json::Value::Array(vec![serde_json::Value::String(path.clone())]),
            },
        )
        .await?;
    }

    Ok(())
}

async fn sync_registry(
    api: &dyn ManagementApi,
    registry_name: &str,
    entry: PluginEntry,
) -> Result<(), ReconcileError> {
    let connection_name = entry.name.clone();
    let to_sync_error = |source| ReconcileError::RegistrySync {
        name: connection_name.clone(),
        registry: registry_name.to_string(),
        source,
    };

    let plugins = api.list_plugins().await.map_err(to_sync_error)?;
    let mut registry = plugins
        .into_iter()
        .find(|plugin| plugin.name == registry_name)
        .unwrap_or_else(|| Plugin {
            name: registry_name.to_string(),
            priority: 0,
            source: None,
            connections: Vec::new(),
        });

    upsert_entry(&mut registry, entry);

    api.update_plugin(registry_name, &registry)
        .await
        .map_err(to_sync_error)?;
    info!(
        "plugin registry {registry_name:?} synced for connection {connection_name:?}"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str, name: &str) -> PluginEntry {
        PluginEntry {
            id: id.to_string(),
            name: name.to_string(),
            config: json!(["admin"]),
        }
    }

    fn registry_with(entries: Vec<PluginEntry>) -> Plugin {
        Plugin {
            name: ACCESS_CONTROL_PLUGIN.to_string(),
            priority: 0,
            source: None,
            connections: entries,
        }
    }

    #[test]
    fn test_upsert_appends_when_absent() {
        let mut registry = registry_with(vec![entry("c-1", "first")]);
        upsert_entry(&mut registry, entry("c-2", "second"));
        assert_eq!(registry.connections.len(), 2);
        assert_eq!(registry.connections[1].id, "c-2");
    }

    #[test]
    fn test_upsert_replaces_in_place_preserving_order() {
        let mut registry = registry_with(vec![
            entry("c-1", "first"),
            entry("c-2", "second"),
            entry("c-3", "third"),
        ]);

        let mut updated = entry("c-2", "second");
        updated.config = json!(["ops"]);
        upsert_entry(&mut registry, updated);

        assert_eq!(registry.connections.len(), 3);
        assert_eq!(registry.connections[1].id, "c-2");
        assert_eq!(registry.connections[1].config, json!(["ops"]));
        assert_eq!(registry.connections[2].id, "c-3");
    }

    #[test]
    fn test_upsert_twice_leaves_single_entry() {
        let mut registry = registry_with(Vec::new());
        upsert_entry(&mut registry, entry("c-1", "conn"));
        upsert_entry(&mut registry, entry("c-1", "conn"));
        assert_eq!(registry.connections.len(), 1);
    }
}
