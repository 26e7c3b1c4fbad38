//! Response persistence.
//!
//! [`ResponseStore`] is the persistence contract: idempotent upserts keyed by
//! `(audit_id, qid, item)`, ordered listing, catalog seeding, evidence-only
//! updates, per-audit metadata and whole-audit deletion. [`NormLibrary`]
//! keeps named catalogs.
//!
//! Two implementations share the same document logic:
//!
//! - [`MemoryStore`]: in-process, for tests and one-shot runs
//! - [`JsonFileStore`]: a single JSON document, replaced atomically on each write
//!
//! Store documents carry a schema version and are upgraded on load by the
//! ordered transforms in [`migrate`].

mod document;
mod json_file;
mod memory;
pub mod migrate;
mod traits;

pub use document::{StoreDocument, StoredNorm};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::{
    AuditSummary, BatchSaveReport, NormInfo, NormLibrary, ResponseStore, ResponseUpsert,
    SaveFailure,
};
