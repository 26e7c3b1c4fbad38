//! Compliance scoring.
//!
//! Turns per-item answers into exact level tallies, a weighted global rate
//! and per-domain aggregates. Not-applicable answers count toward totals
//! only; when nothing applies the rate is undefined rather than zero.
//!
//! # Usage
//!
//! ```
//! use audit_tools::model::{ComplianceLevel, ResponseRecord};
//! use audit_tools::scoring::ComplianceScorer;
//!
//! let records = vec![
//!     ResponseRecord::new("Sécurité", "SEC-01", "MFA", "MFA activé ?", ComplianceLevel::Compliant),
//!     ResponseRecord::new("Sécurité", "SEC-02", "TLS", "TLS ?", ComplianceLevel::PartiallyCompliant),
//! ];
//! let report = ComplianceScorer::new().score(&records);
//! assert_eq!(report.metrics.rate, Some(75));
//! ```

mod filter;
mod metrics;
mod scorer;

pub use filter::RecordFilter;
pub use metrics::{
    format_rate, ComplianceMetrics, DomainScore, EvidenceMetrics, LevelCounts, RATE_PLACEHOLDER,
};
pub use scorer::{ComplianceScorer, ScoreReport, SCORING_ENGINE_VERSION};
