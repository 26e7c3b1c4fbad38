//! Report generation for audit evaluations.
//!
//! This module provides multiple output formats for an [`AuditEvaluation`]:
//! - Summary: Compact shell-friendly output
//! - Table: Aligned tabular terminal output
//! - JSON: Structured data for programmatic integration
//! - CSV: Findings and action plan for spreadsheets
//! - Markdown: Executive summary, findings and action plan
//! - HTML: Self-contained stakeholder report
//!
//! # Security
//!
//! The `escape` module provides utilities for safe output generation.
//! All auditor-provided text (questions, comments, evidence references)
//! is escaped before being embedded in HTML or Markdown reports.

mod csv;
pub mod escape;
pub mod figures;
mod html;
mod json;
mod markdown;
mod summary;
mod types;

pub use self::csv::CsvReporter;
pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;
pub use summary::{SummaryReporter, TableReporter};
pub use types::{ReportConfig, ReportFormat, ReportMetadata, ReportSection};

use crate::context::AuditEvaluation;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("CSV error: {0}")]
    CsvError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

impl From<ReportError> for crate::error::AuditError {
    fn from(err: ReportError) -> Self {
        use crate::error::ReportErrorKind;
        let kind = match err {
            ReportError::IoError(e) => return Self::from(e),
            ReportError::SerializationError(msg) => ReportErrorKind::JsonSerializationError(msg),
            ReportError::CsvError(msg) => ReportErrorKind::CsvError(msg),
            ReportError::FormatError(e) => ReportErrorKind::UnsupportedFormat(e.to_string()),
        };
        Self::report("rendering report", kind)
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render an evaluation
    fn generate(
        &self,
        evaluation: &AuditEvaluation,
        config: &ReportConfig,
    ) -> Result<String, ReportError>;

    /// Write report to a writer
    fn write_report(
        &self,
        evaluation: &AuditEvaluation,
        config: &ReportConfig,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = self.generate(evaluation, config)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control
#[must_use]
pub fn create_reporter_with_options(
    format: ReportFormat,
    use_color: bool,
) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Summary => {
            if use_color {
                Box::new(SummaryReporter::new())
            } else {
                Box::new(SummaryReporter::new().no_color())
            }
        }
        ReportFormat::Table => {
            if use_color {
                Box::new(TableReporter::new())
            } else {
                Box::new(TableReporter::new().no_color())
            }
        }
        ReportFormat::Json => Box::new(JsonReporter::new()),
        ReportFormat::Csv => Box::new(CsvReporter::new()),
        ReportFormat::Markdown => Box::new(MarkdownReporter::new()),
        ReportFormat::Html => Box::new(HtmlReporter::new()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::catalog::Catalog;
    use crate::context::{AuditContext, AuditEvaluation};
    use crate::model::{CatalogRow, ComplianceLevel};
    use crate::risk::{RecommendationTexts, RiskTables};
    use crate::scoring::RecordFilter;
    use crate::store::{MemoryStore, ResponseStore, ResponseUpsert};

    /// Small evaluated audit shared by the reporter tests.
    pub fn evaluation() -> AuditEvaluation {
        let catalog: Catalog = vec![
            CatalogRow::new("Sécurité", "SEC-01", "MFA", "MFA activé ?"),
            CatalogRow::new("Opérations", "OPS-01", "Backup", "Sauvegardes | restaurées ?"),
            CatalogRow::new("Ressources humaines", "RH-01", "Charte", "Charte <signée> ?"),
        ]
        .into_iter()
        .collect();
        let ctx = AuditContext::new(
            "audit-1",
            catalog,
            &RiskTables::default(),
            RecommendationTexts::default(),
        )
        .unwrap();
        let mut store = MemoryStore::new();
        ctx.seed(&mut store, ComplianceLevel::NotApplicable).unwrap();
        ctx.save_all(
            &mut store,
            vec![
                ResponseUpsert::new("", "SEC-01", "MFA", ComplianceLevel::NonCompliant)
                    .comment("Pas de MFA"),
                ResponseUpsert::new("", "OPS-01", "Backup", ComplianceLevel::Compliant)
                    .evidence(vec!["restore-test.pdf".to_string()]),
                ResponseUpsert::new("", "RH-01", "Charte", ComplianceLevel::PartiallyCompliant),
            ],
        )
        .unwrap();
        let records = store.list("audit-1").unwrap();
        ctx.evaluate(&records, &RecordFilter::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_format_renders() {
        let eval = test_support::evaluation();
        let config = ReportConfig::default();
        for format in [
            ReportFormat::Summary,
            ReportFormat::Table,
            ReportFormat::Json,
            ReportFormat::Csv,
            ReportFormat::Markdown,
            ReportFormat::Html,
        ] {
            let reporter = create_reporter_with_options(format, false);
            assert_eq!(reporter.format(), format);
            let out = reporter.generate(&eval, &config).unwrap();
            assert!(out.contains("SEC-01"), "{format} report lacks SEC-01");
        }
    }

    #[test]
    fn test_headers_name_project_and_standard() {
        let eval = test_support::evaluation();
        let mut config = ReportConfig::default();
        config.metadata.audit = Some(
            crate::model::AuditInfo::default()
                .project("Refonte <SI>")
                .standard("ISO 27001")
                .version("2022"),
        );

        let summary = create_reporter_with_options(ReportFormat::Summary, false)
            .generate(&eval, &config)
            .unwrap();
        assert!(summary.contains("Project:  Refonte <SI>"));
        assert!(summary.contains("Standard:  ISO 27001 v2022"));

        let html = create_reporter_with_options(ReportFormat::Html, false)
            .generate(&eval, &config)
            .unwrap();
        assert!(html.contains("<p>Project <strong>Refonte &lt;SI&gt;</strong></p>"));

        let plain = create_reporter_with_options(ReportFormat::Summary, false)
            .generate(&eval, &ReportConfig::default())
            .unwrap();
        assert!(!plain.contains("Standard:"));
    }

    #[test]
    fn test_write_report_to_buffer() {
        let eval = test_support::evaluation();
        let mut buf = Vec::new();
        JsonReporter::new()
            .write_report(&eval, &ReportConfig::default(), &mut buf)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["audit_id"], "audit-1");
    }

    #[test]
    fn test_report_error_converts() {
        let err: crate::error::AuditError = ReportError::CsvError("bad".into()).into();
        assert!(err.to_string().contains("rendering report"));
    }
}
