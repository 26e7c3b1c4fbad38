//! Report output stage.
//!
//! Builds the report configuration from settings and writes a rendered
//! evaluation to the configured destination.

use crate::config::ReportSettings;
use crate::context::AuditEvaluation;
use crate::reports::{
    create_reporter_with_options, ReportConfig, ReportFormat, ReportMetadata, ReportSection,
};
use anyhow::Result;

use super::{should_use_color, write_output, OutputTarget, PipelineError};

/// Report configuration for `sections`, taking presentation from settings.
#[must_use]
pub fn report_config(
    settings: &ReportSettings,
    sections: Vec<ReportSection>,
    metadata: ReportMetadata,
) -> ReportConfig {
    ReportConfig {
        sections,
        max_items: settings.max_items,
        title: Some(settings.title.clone()),
        organisation: settings.organisation.clone(),
        currency: settings.currency.clone(),
        weak_domain_threshold: settings.weak_domain_threshold,
        metadata,
    }
}

/// Render an evaluation and write it to `target`.
///
/// Color is only used for terminal output and only when not disabled.
pub fn output_evaluation(
    eval: &AuditEvaluation,
    format: ReportFormat,
    config: &ReportConfig,
    target: &OutputTarget,
    no_color: bool,
) -> Result<()> {
    let use_color = should_use_color(no_color) && target.is_terminal();
    let reporter = create_reporter_with_options(format, use_color);
    let report = reporter
        .generate(eval, config)
        .map_err(|e| PipelineError::ReportFailed { source: e.into() })?;
    tracing::debug!("Rendered {} report ({} bytes)", reporter.format(), report.len());
    write_output(&report, target)
}
