//! # Management API
//!
//! The seam between the reconciliation logic and the remote resource API.
//!
//! [`ManagementApi`] carries one method per remote endpoint the reconciler
//! touches; [`rest::RestManagementApi`] is the HTTP implementation. The
//! trait exists so the orchestration layers can be exercised against an
//! in-memory fake without a network.

use crate::model::{CreatedResource, DataMaskingRuleBinding, Plugin, RemoteConnection};
use async_trait::async_trait;
use thiserror::Error;

pub mod rest;

pub use rest::RestManagementApi;

/// Transport-level failure of one API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status the operation does not accept.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Client for the remote management API.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Look a connection up by name.
    ///
    /// `Ok(None)` means the server answered 404; any other non-2xx status
    /// is an error. This three-way outcome is what the merge engine's
    /// create-vs-update decision rests on.
    async fn get_connection(&self, name: &str) -> Result<Option<RemoteConnection>, ApiError>;

    /// Create a new connection; returns the server's document (with id).
    async fn create_connection(
        &self,
        document: &RemoteConnection,
    ) -> Result<RemoteConnection, ApiError>;

    /// Full-replace an existing connection by name.
    async fn update_connection(
        &self,
        name: &str,
        document: &RemoteConnection,
    ) -> Result<RemoteConnection, ApiError>;

    /// Delete a connection by id. Only the HTTP status is authoritative.
    async fn delete_connection(&self, id: &str) -> Result<(), ApiError>;

    /// Create a guardrail from an inline definition.
    async fn create_guardrail(
        &self,
        definition: &serde_json::Value,
    ) -> Result<CreatedResource, ApiError>;

    /// Create an issue template from an inline definition.
    async fn create_issue_template(
        &self,
        template: &serde_json::Value,
    ) -> Result<CreatedResource, ApiError>;

    /// Fetch all plugin registries with their membership lists.
    async fn list_plugins(&self) -> Result<Vec<Plugin>, ApiError>;

    /// Full-replace one plugin registry.
    async fn update_plugin(&self, name: &str, plugin: &Plugin) -> Result<(), ApiError>;

    /// Full-replace the ordered data-masking rule list of a connection.
    async fn replace_datamasking_rules(
        &self,
        connection_name: &str,
        rules: &[DataMaskingRuleBinding],
    ) -> Result<(), ApiError>;
}
