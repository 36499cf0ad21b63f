//! # Connection Reconciler
//!
//! Reconciles a declarative batch of connection descriptions against a
//! remote management API.
//!
//! For each `create` item the reconciler provisions the guardrails and
//! issue templates the item references, decides create-vs-update by
//! looking the connection name up remotely, merges the partial declared
//! spec with the existing document without losing or duplicating remote
//! state, writes the result, and propagates the connection's identity
//! into the `access_control` and `runbooks` plugin registries. `delete`
//! items remove connections by id, concurrently, with independent per-id
//! accounting.
//!
//! The merge engine ([`reconciler::merge`]) is a pure function over the
//! declared spec and the resolution outcome; all I/O goes through the
//! [`api::ManagementApi`] trait so the orchestration layers can be tested
//! against an in-memory fake.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod reconciler;

pub use api::{ApiError, ManagementApi, RestManagementApi};
pub use config::ApiConfig;
pub use error::{ReconcileError, Stage};
