//! Markdown report generator.

use super::escape::{escape_markdown_inline, escape_markdown_table};
use super::figures::{format_money, format_probability};
use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, ReportSection};
use crate::context::AuditEvaluation;
use crate::risk::Finding;
use crate::scoring::format_rate;
use std::fmt::Write;

/// Markdown report generator
pub struct MarkdownReporter {
    /// Include the per-domain table in the executive summary
    include_domains: bool,
}

impl MarkdownReporter {
    /// Create a new Markdown reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_domains: true,
        }
    }

    /// Leave the per-domain table out
    #[must_use]
    pub const fn without_domains(mut self) -> Self {
        self.include_domains = false;
        self
    }

    fn write_summary(
        &self,
        md: &mut String,
        eval: &AuditEvaluation,
        config: &ReportConfig,
    ) -> Result<(), ReportError> {
        let metrics = &eval.score.metrics;
        let counts = &metrics.counts;
        let open = eval.findings.iter().filter(|f| f.record.level.is_open()).count();

        writeln!(md, "## Executive Summary")?;
        writeln!(md)?;
        writeln!(md, "| Metric | Value |")?;
        writeln!(md, "|--------|-------|")?;
        writeln!(md, "| Compliance rate | **{}** |", metrics.rate_display())?;
        writeln!(
            md,
            "| Records | {} ({} applicable) |",
            metrics.total, metrics.applicable
        )?;
        writeln!(
            md,
            "| Compliant / Partial / Non-compliant / N/A | {} / {} / {} / {} |",
            counts.compliant, counts.partially_compliant, counts.non_compliant, counts.not_applicable
        )?;
        writeln!(md, "| Open items | {open} |")?;
        writeln!(
            md,
            "| Evidence | {} reference(s) on {} item(s) |",
            eval.score.evidence.total, eval.score.evidence.items_with_evidence
        )?;
        writeln!(
            md,
            "| Expected loss | {} |",
            format_money(eval.plan.total_expected_loss, &config.currency)
        )?;
        writeln!(
            md,
            "| Remediation cost | {} |",
            format_money(eval.plan.total_remediation_cost, &config.currency)
        )?;
        writeln!(md)?;

        if self.include_domains && !eval.score.domains.is_empty() {
            writeln!(md, "### Domains")?;
            writeln!(md)?;
            writeln!(md, "| Domain | Rate | C | PC | NC | N/A |")?;
            writeln!(md, "|--------|------|---|----|----|-----|")?;
            for (domain, score) in &eval.score.domains {
                writeln!(
                    md,
                    "| {} | {} | {} | {} | {} | {} |",
                    escape_markdown_table(domain),
                    format_rate(Some(score.rate)),
                    score.counts.compliant,
                    score.counts.partially_compliant,
                    score.counts.non_compliant,
                    score.counts.not_applicable
                )?;
            }
            writeln!(md)?;
        }

        let weakest = eval.score.weakest_domains(config.weak_domain_threshold);
        if !weakest.is_empty() {
            writeln!(
                md,
                "**Domains below {}%:** {}",
                config.weak_domain_threshold,
                weakest
                    .iter()
                    .map(|(name, score)| format!(
                        "{} ({})",
                        escape_markdown_inline(name),
                        format_rate(Some(score.rate))
                    ))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            writeln!(md)?;
        }
        Ok(())
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for MarkdownReporter {
    fn generate(
        &self,
        eval: &AuditEvaluation,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut md = String::new();

        writeln!(md, "# {}", escape_markdown_inline(config.title_or_default()))?;
        writeln!(md)?;
        if let Some(org) = &config.organisation {
            writeln!(md, "**Organisation:** {}  ", escape_markdown_inline(org))?;
        }
        writeln!(md, "**Audit:** {}  ", escape_markdown_inline(&eval.audit_id))?;
        if let Some(info) = &config.metadata.audit {
            if let Some(project) = info.project_label() {
                writeln!(md, "**Project:** {}  ", escape_markdown_inline(&project))?;
            }
            if let Some(standard) = info.standard_label() {
                writeln!(md, "**Standard:** {}  ", escape_markdown_inline(&standard))?;
            }
        }
        writeln!(
            md,
            "**Generated by:** audit-tools v{}{}",
            env!("CARGO_PKG_VERSION"),
            config
                .metadata
                .generated_at
                .as_deref()
                .map(|at| format!(" on {at}"))
                .unwrap_or_default()
        )?;
        writeln!(md)?;

        if config.includes(ReportSection::Score) {
            self.write_summary(&mut md, eval, config)?;
        }

        if config.includes(ReportSection::Findings) {
            writeln!(md, "## Findings")?;
            writeln!(md)?;
            if eval.findings.is_empty() {
                writeln!(md, "_No records in this view._")?;
            } else {
                writeln!(
                    md,
                    "| QID | Domain | Question | Level | Comment | Evidence | Probability | Expected Loss |"
                )?;
                writeln!(
                    md,
                    "|-----|--------|----------|-------|---------|----------|-------------|---------------|"
                )?;
                for finding in config.limit(&eval.findings) {
                    let record = &finding.record;
                    writeln!(
                        md,
                        "| {} | {} | {} | {} | {} | {} | {} | {} |",
                        escape_markdown_table(&record.qid),
                        escape_markdown_table(&record.domain),
                        escape_markdown_table(question_text(finding)),
                        record.level.label(),
                        escape_markdown_table(&record.comment),
                        escape_markdown_table(&record.evidence.join(", ")),
                        format_probability(finding.risk.probability),
                        format_money(finding.risk.expected_loss, &config.currency)
                    )?;
                }
            }
            writeln!(md)?;
        }

        if config.includes(ReportSection::Plan) {
            writeln!(md, "## Action Plan")?;
            writeln!(md)?;
            if eval.plan.is_empty() {
                writeln!(md, "_Nothing to remediate._")?;
            } else {
                writeln!(
                    md,
                    "| # | Priority | QID | Question | Level | Expected Loss | Cost | Recommendation |"
                )?;
                writeln!(
                    md,
                    "|---|----------|-----|----------|-------|---------------|------|----------------|"
                )?;
                for (rank, finding) in config.limit(&eval.plan.actions).iter().enumerate() {
                    writeln!(
                        md,
                        "| {} | {} | {} | {} | {} | {} | {} | {} |",
                        rank + 1,
                        finding.risk.priority,
                        escape_markdown_table(&finding.record.qid),
                        escape_markdown_table(question_text(finding)),
                        finding.record.level.label(),
                        format_money(finding.risk.expected_loss, &config.currency),
                        format_money(finding.risk.remediation_cost, &config.currency),
                        escape_markdown_table(&finding.recommendation)
                    )?;
                }
            }
            writeln!(md)?;
        }

        Ok(md)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }
}

/// Question text, or the item label when the question is blank.
pub(super) fn question_text(finding: &Finding) -> &str {
    if finding.record.question.trim().is_empty() {
        &finding.record.item
    } else {
        &finding.record.question
    }
}
