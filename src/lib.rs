//! **Compliance audit scoring, risk inference and remediation planning.**
//!
//! `audit-tools` evaluates questionnaire-based compliance audits (ISO 27001
//! style checklists, internal control reviews, supplier questionnaires). Each
//! item of a catalog is answered with a compliance level; the library turns
//! those answers into a weighted compliance rate, per-domain scores, a
//! per-item risk estimate and a prioritized remediation plan.
//!
//! ## Key Features
//!
//! - **Level Normalization**: Free-text answers (`"Conforme"`, `"partial"`,
//!   `"NC"`, `"Yes"`, ...) normalize to four canonical levels. Normalization
//!   is total: anything unrecognized is treated as not applicable.
//! - **Compliance Scoring**: Weighted mean over applicable records
//!   (compliant 1, partial 0.5, non-compliant 0), reported as an integer
//!   percentage, per audit and per domain, over filtered views.
//! - **Risk Inference**: Domain tiers, question keywords and the answer level
//!   combine into a probability, a loss estimate, a remediation cost and a
//!   priority for every record.
//! - **Persistence**: The [`store::ResponseStore`] contract with an in-memory
//!   and a JSON file implementation, batch saves with per-record failures,
//!   versioned document migrations and a library of saved norms.
//! - **Reporting**: Summary, table, JSON, CSV, Markdown and HTML renderers.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`ComplianceLevel`], catalog rows and response records.
//! - **[`catalog`]**: CSV / YAML / JSON catalog and answer-sheet import with
//!   header aliasing.
//! - **[`scoring`]**: [`ComplianceScorer`] and record filters.
//! - **[`risk`]**: [`RiskEngine`], reference tables and the remediation plan.
//! - **[`store`]**: response stores and migrations.
//! - **[`context`]**: [`AuditContext`], the per-operation bundle of audit id,
//!   catalog and engines.
//! - **[`reports`]**: report generators.
//!
//! ## Getting Started
//!
//! ```
//! use audit_tools::{
//!     AuditContext, ComplianceLevel, MemoryStore, RecordFilter, ResponseStore, ResponseUpsert,
//! };
//! use audit_tools::catalog::Catalog;
//! use audit_tools::config::AppConfig;
//! use audit_tools::model::CatalogRow;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog: Catalog = vec![
//!         CatalogRow::new("Sécurité", "SEC-01", "MFA", "MFA activé ?"),
//!         CatalogRow::new("Opérations", "OPS-01", "Backup", "Sauvegardes testées ?"),
//!     ]
//!     .into_iter()
//!     .collect();
//!
//!     let ctx = AuditContext::from_config("q3-2026", catalog, &AppConfig::default())?;
//!     let mut store = MemoryStore::new();
//!     ctx.seed(&mut store, ComplianceLevel::NotApplicable)?;
//!     ctx.save(
//!         &mut store,
//!         ResponseUpsert::new("", "SEC-01", "MFA", ComplianceLevel::normalize("Non conforme")),
//!     )?;
//!     ctx.save(
//!         &mut store,
//!         ResponseUpsert::new("", "OPS-01", "Backup", ComplianceLevel::Compliant),
//!     )?;
//!
//!     let records = store.list("q3-2026")?;
//!     let eval = ctx.evaluate(&records, &RecordFilter::new());
//!     assert_eq!(eval.score.metrics.rate, Some(50));
//!     assert_eq!(eval.plan.actions[0].record.qid, "SEC-01");
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! This documentation is for the `audit-tools` library crate. The binary of
//! the same name wraps it; run `audit-tools --help` for its commands.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Counts and amounts are converted between usize, u32 and f64 for rates
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::unused_self
)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod risk;
pub mod scoring;
pub mod store;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use context::{AuditContext, AuditEvaluation};
pub use error::{AuditError, ErrorContext, Result};
pub use model::{CatalogRow, ComplianceLevel, RecordKey, ResponseRecord};
pub use reports::{ReportFormat, ReportGenerator};
pub use risk::{Finding, Priority, RemediationPlan, RiskEngine, RiskEstimate, RiskTables, Tier};
pub use scoring::{ComplianceMetrics, ComplianceScorer, RecordFilter, ScoreReport};
pub use store::{
    BatchSaveReport, JsonFileStore, MemoryStore, NormLibrary, ResponseStore, ResponseUpsert,
};
