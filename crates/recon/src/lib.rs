//! `dashsync-recon`: source-of-truth to dashboard reconciliation engine.
//!
//! Loads the source table, reads a snapshot of the remote table through a
//! [`RemoteStore`], computes the cell updates and new rows that bring the
//! remote in line, applies them in two batches and returns an audit log of
//! every decision. No network code lives here; stores are injected.

pub mod apply;
pub mod audit;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod loader;
pub mod memory;
pub mod model;
pub mod remote;
pub mod rules;

pub use apply::ApplyOutcome;
pub use audit::AuditLog;
pub use config::SyncConfig;
pub use engine::{plan, run, SyncReport};
pub use error::{FailedBatch, SchemaSide, SyncError};
pub use memory::MemoryStore;
pub use model::{CellUpdate, RowInsertion, SyncPlan};
pub use remote::{RemoteStore, RemoteTable, StoreError};
