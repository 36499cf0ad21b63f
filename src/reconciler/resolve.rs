//! Connection resolution.

use crate::api::ManagementApi;
use crate::error::ReconcileError;
use crate::model::RemoteConnection;
use tracing::debug;

/// Outcome of a by-name existence check. The merge engine branches on
/// this union to decide create vs. update.
#[derive(Debug, Clone)]
pub enum Resolution {
    Found(RemoteConnection),
    NotFound,
}

/// Look a connection up by name: 200 maps to `Found`, 404 to `NotFound`,
/// anything else (including transport failure) aborts the item.
///
/// # Errors
/// `ReconcileError::Lookup`.
pub async fn resolve(
    api: &dyn ManagementApi,
    name: &str,
) -> Result<Resolution, ReconcileError> {
    match api.get_connection(name).await {
        Ok(Some(existing)) => {
            debug!("connection {name:?} found");
            Ok(Resolution::Found(existing))
        }
        Ok(None) => {
            debug!("connection {name:?} does not exist");
            Ok(Resolution::NotFound)
        }
        Err(source) => Err(ReconcileError::Lookup {
            name: name.to_string(),
            source,
        }),
    }
}
