//! File persistence for the inventory and the library audit trail.

/// Crash-safe whole-file replacement.
pub mod atomic;
mod audit_log;
mod backend;
/// The CSV inventory format.
pub mod csv_table;
/// The JSON inventory format.
pub mod json_document;
mod repository;

pub use atomic::write_atomic;
pub use audit_log::AuditLog;
pub use backend::{Backend, Snapshot, StoreError};
pub use csv_table::CsvTable;
pub use json_document::JsonDocument;
pub use repository::{LoadSummary, Loaded, Repository, RepositoryError, Unloaded};
