//! # Data Model
//!
//! Payload and wire types for the reconciler.
//!
//! - [`spec`] holds the caller-supplied batch types (camelCase JSON, the
//!   declarative side).
//! - [`remote`] holds the management API wire types (snake_case JSON, the
//!   authoritative side).

pub mod remote;
pub mod spec;

pub use remote::{
    CreatedResource, DataMaskingRuleBinding, Plugin, PluginEntry, RemoteConnection, Toggle,
};
pub use spec::{AccessMode, BatchAction, ConnectionSpec, DeleteAction, GuardrailRef};
