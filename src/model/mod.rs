//! Core data model for compliance audits.
//!
//! Every input source (spreadsheet import, YAML norm, JSON store, CLI edit)
//! is normalized into these structures before it reaches the scoring and
//! risk engines:
//!
//! - [`ComplianceLevel`]: the four canonical answer states
//! - [`CatalogRow`]: one question of a norm
//! - [`ResponseRecord`]: one answered question within an audit
//! - [`RecordKey`]: the `(qid, item)` key unique within an audit
//! - [`AuditInfo`]: project, client and standard of an audit

mod audit;
mod level;
mod record;

pub use audit::AuditInfo;
pub(crate) use level::collapse_whitespace;
pub use level::ComplianceLevel;
pub use record::{CatalogRow, RecordKey, ResponseRecord};
