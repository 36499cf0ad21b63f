//! # Reconciler
//!
//! Core reconciliation logic, leaves first:
//!
//! - [`secrets`] - wire encoding of declared secret maps
//! - [`provision`] - idempotent guardrail / issue-template provisioning
//! - [`resolve`] - by-name existence check (found / not found / error)
//! - [`merge`] - the pure create-or-merge document builder
//! - [`plugins`] - find-or-replace policy registry synchronization
//! - [`batch`] - the sequential batch orchestrator
//!
//! ## Reconciliation flow (one create item)
//!
//! 1. Provision dependent resources so generated ids are available
//! 2. Resolve the connection name against the remote store
//! 3. Merge the declared spec with any existing document
//! 4. Write (POST for new, full-replace PUT for existing)
//! 5. Sync data-masking rules and plugin registries (non-fatal)

pub mod batch;
pub mod merge;
pub mod plugins;
pub mod provision;
pub mod resolve;
pub mod secrets;

pub use batch::{handle_actions, BatchSummary, ItemOutcome, WriteKind};
pub use merge::{merge_toggle, reconcile};
pub use provision::{provision_dependents, ProvisionedDependents};
pub use resolve::{resolve, Resolution};
pub use secrets::encode_secrets;
