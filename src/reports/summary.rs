//! Summary and table report generators for shell output.

use super::figures::{format_money, format_probability};
use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, ReportSection};
use crate::context::AuditEvaluation;
use crate::model::ComplianceLevel;
use crate::risk::{Finding, Priority};
use crate::scoring::format_rate;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Actions listed by the summary when no limit is configured.
const SUMMARY_TOP_ACTIONS: usize = 5;

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

fn rate_color(rate: Option<u32>) -> &'static str {
    match rate {
        Some(r) if r >= 80 => "green",
        Some(r) if r >= 50 => "yellow",
        Some(_) => "red",
        None => "dim",
    }
}

const fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "red",
        Priority::Medium => "yellow",
        Priority::Low => "cyan",
        Priority::Info => "dim",
    }
}

const fn level_color(level: ComplianceLevel) -> &'static str {
    match level {
        ComplianceLevel::Compliant => "green",
        ComplianceLevel::PartiallyCompliant => "yellow",
        ComplianceLevel::NonCompliant => "red",
        ComplianceLevel::NotApplicable => "dim",
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn score_lines(&self, eval: &AuditEvaluation, config: &ReportConfig, lines: &mut Vec<String>) {
        let metrics = &eval.score.metrics;
        lines.push(format!(
            "{}  {} ({} applicable)",
            self.color("Records:", "cyan"),
            metrics.total,
            metrics.applicable
        ));
        lines.push(format!(
            "{}  {}",
            self.color("Compliance:", "cyan"),
            self.color(&metrics.rate_display(), rate_color(metrics.rate))
        ));
        let counts = &metrics.counts;
        lines.push(format!(
            "  {} compliant, {} partial, {} non-compliant, {} not applicable",
            self.color(&counts.compliant.to_string(), "green"),
            self.color(&counts.partially_compliant.to_string(), "yellow"),
            self.color(&counts.non_compliant.to_string(), "red"),
            counts.not_applicable
        ));
        let evidence = &eval.score.evidence;
        lines.push(format!(
            "{}  {} on {} of {} items",
            self.color("Evidence:", "cyan"),
            evidence.total,
            evidence.items_with_evidence,
            metrics.total
        ));

        if !eval.score.domains.is_empty() {
            lines.push(String::new());
            lines.push(self.color("Domains:", "bold"));
            let width = eval
                .score
                .domains
                .keys()
                .map(|d| UnicodeWidthStr::width(d.as_str()))
                .max()
                .unwrap_or(0);
            for (domain, score) in &eval.score.domains {
                lines.push(format!(
                    "  {}  {}",
                    pad(domain, width),
                    self.color(
                        &format!("{:>4}", format_rate(Some(score.rate))),
                        rate_color(Some(score.rate))
                    )
                ));
            }
        }

        let weakest = eval.score.weakest_domains(config.weak_domain_threshold);
        if !weakest.is_empty() {
            let names: Vec<&str> = weakest.iter().map(|(name, _)| *name).collect();
            lines.push(format!(
                "{}  {}",
                self.color(
                    &format!("Below {}%:", config.weak_domain_threshold),
                    "red"
                ),
                names.join(", ")
            ));
        }
    }

    fn plan_lines(&self, eval: &AuditEvaluation, config: &ReportConfig, lines: &mut Vec<String>) {
        let open: Vec<&Finding> = eval
            .plan
            .actions
            .iter()
            .filter(|f| f.record.level.is_open())
            .collect();
        lines.push(self.color("Top actions:", "bold"));
        if open.is_empty() {
            lines.push(format!("  {}", self.color("No open items", "dim")));
            return;
        }
        let limit = config.max_items.unwrap_or(SUMMARY_TOP_ACTIONS);
        for finding in open.iter().take(limit) {
            let priority = finding.risk.priority;
            lines.push(format!(
                "  {} {}  {}",
                self.color(
                    &format!("{:<8}", format!("[{}]", priority.as_str().to_uppercase())),
                    priority_color(priority)
                ),
                finding.record.title(),
                self.color(
                    &format_money(finding.risk.expected_loss, &config.currency),
                    "dim"
                )
            ));
        }
        if open.len() > limit {
            lines.push(self.color(&format!("  ... and {} more", open.len() - limit), "dim"));
        }
        lines.push(format!(
            "{}  {}    {}  {}",
            self.color("Expected loss:", "cyan"),
            format_money(eval.plan.total_expected_loss, &config.currency),
            self.color("Remediation cost:", "cyan"),
            format_money(eval.plan.total_remediation_cost, &config.currency)
        ));
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate(
        &self,
        eval: &AuditEvaluation,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        // Header
        lines.push(self.color(config.title_or_default(), "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));
        lines.push(format!("{}  {}", self.color("Audit:", "cyan"), eval.audit_id));
        if let Some(org) = &config.organisation {
            lines.push(format!("{}  {}", self.color("Organisation:", "cyan"), org));
        }
        if let Some(info) = &config.metadata.audit {
            if let Some(project) = info.project_label() {
                lines.push(format!("{}  {}", self.color("Project:", "cyan"), project));
            }
            if let Some(standard) = info.standard_label() {
                lines.push(format!("{}  {}", self.color("Standard:", "cyan"), standard));
            }
        }
        if !eval.filter.is_empty() {
            lines.push(format!(
                "{}  {}",
                self.color("View:", "cyan"),
                describe_filter(eval)
            ));
        }

        if config.includes(ReportSection::Score) {
            self.score_lines(eval, config, &mut lines);
        }
        if config.includes(ReportSection::Plan) || config.includes(ReportSection::Findings) {
            lines.push(String::new());
            self.plan_lines(eval, config, &mut lines);
        }

        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}

/// Table reporter for terminal output with aligned columns
pub struct TableReporter {
    /// Use colored output
    colored: bool,
}

impl TableReporter {
    /// Create a new table reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn domain_table(&self, eval: &AuditEvaluation, lines: &mut Vec<String>) {
        lines.push(self.color(
            &format!(
                "{} {} {} {} {} {}",
                pad("DOMAIN", 32),
                pad("RATE", 6),
                pad("C", 4),
                pad("PC", 4),
                pad("NC", 4),
                pad("N/A", 4)
            ),
            "bold",
        ));
        lines.push("─".repeat(59));
        for (domain, score) in &eval.score.domains {
            lines.push(format!(
                "{} {} {} {} {} {}",
                pad(&truncate(domain, 32), 32),
                self.color(
                    &pad(&format_rate(Some(score.rate)), 6),
                    rate_color(Some(score.rate))
                ),
                pad(&score.counts.compliant.to_string(), 4),
                pad(&score.counts.partially_compliant.to_string(), 4),
                pad(&score.counts.non_compliant.to_string(), 4),
                pad(&score.counts.not_applicable.to_string(), 4)
            ));
        }
    }

    fn finding_table(
        &self,
        findings: &[Finding],
        config: &ReportConfig,
        lines: &mut Vec<String>,
    ) {
        lines.push(self.color(
            &format!(
                "{} {} {} {} {} {} {}",
                pad("PRIORITY", 9),
                pad("QID", 10),
                pad("QUESTION", 40),
                pad("LEVEL", 20),
                pad("PROB", 5),
                pad("EXP. LOSS", 12),
                pad("COST", 12)
            ),
            "bold",
        ));
        lines.push("─".repeat(114));
        for finding in config.limit(findings) {
            let priority = finding.risk.priority;
            let level = finding.record.level;
            let question = if finding.record.question.trim().is_empty() {
                &finding.record.item
            } else {
                &finding.record.question
            };
            lines.push(format!(
                "{} {} {} {} {} {} {}",
                self.color(&pad(priority.as_str(), 9), priority_color(priority)),
                pad(&truncate(&finding.record.qid, 10), 10),
                pad(&truncate(question, 40), 40),
                self.color(&pad(level.label(), 20), level_color(level)),
                pad(&format_probability(finding.risk.probability), 5),
                pad_left(&format_money(finding.risk.expected_loss, &config.currency), 12),
                pad_left(&format_money(finding.risk.remediation_cost, &config.currency), 12)
            ));
        }
        if findings.len() > config.limit(findings).len() {
            lines.push(self.color(
                &format!(
                    "... and {} more",
                    findings.len() - config.limit(findings).len()
                ),
                "dim",
            ));
        }
    }
}

impl Default for TableReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TableReporter {
    fn generate(
        &self,
        eval: &AuditEvaluation,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        if config.includes(ReportSection::Score) {
            self.domain_table(eval, &mut lines);
            lines.push(String::new());
        }

        // The plan lists every finding, so findings only get their own
        // table when the plan is not shown.
        if config.includes(ReportSection::Plan) {
            self.finding_table(&eval.plan.actions, config, &mut lines);
            lines.push(String::new());
        } else if config.includes(ReportSection::Findings) {
            self.finding_table(&eval.findings, config, &mut lines);
            lines.push(String::new());
        }

        let metrics = &eval.score.metrics;
        lines.push(format!(
            "Audit {}: {} records, {} applicable | Compliance: {} | Expected loss: {} | Cost: {}",
            eval.audit_id,
            metrics.total,
            metrics.applicable,
            metrics.rate_display(),
            format_money(eval.plan.total_expected_loss, &config.currency),
            format_money(eval.plan.total_remediation_cost, &config.currency)
        ));

        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Table
    }
}

fn describe_filter(eval: &AuditEvaluation) -> String {
    let mut parts = Vec::new();
    if let Some(domain) = &eval.filter.domain {
        parts.push(format!("domain = {domain}"));
    }
    if let Some(query) = &eval.filter.query {
        parts.push(format!("text ~ \"{query}\""));
    }
    if eval.filter.open_only {
        parts.push("open items only".to_string());
    }
    parts.join(", ")
}

/// Pad to a display width (wide characters count double).
fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - w))
    }
}

fn pad_left(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{}{s}", " ".repeat(width - w))
    }
}

/// Truncate a string to fit within `max_width` display columns.
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(1);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    if max_width > 3 {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_support::evaluation;

    #[test]
    fn test_summary_plain() {
        let out = SummaryReporter::new()
            .no_color()
            .generate(&evaluation(), &ReportConfig::default())
            .unwrap();
        assert!(out.starts_with("Compliance Audit Report"));
        assert!(out.contains("Compliance:  50%"));
        assert!(out.contains("[HIGH]   SEC-01 — MFA activé ?  36 400 €"));
        assert!(!out.contains("OPS-01"), "compliant items are not actions");
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_summary_colored() {
        let out = SummaryReporter::new()
            .generate(&evaluation(), &ReportConfig::default())
            .unwrap();
        assert!(out.contains("\x1b[33m50%\x1b[0m"));
    }

    #[test]
    fn test_summary_score_only() {
        let config = ReportConfig::with_sections(vec![ReportSection::Score]);
        let out = SummaryReporter::new()
            .no_color()
            .generate(&evaluation(), &config)
            .unwrap();
        assert!(out.contains("Domains:"));
        assert!(!out.contains("Top actions:"));
        assert!(out.contains("Below 50%:  Sécurité"));
    }

    #[test]
    fn test_table_alignment() {
        let out = TableReporter::new()
            .no_color()
            .generate(&evaluation(), &ReportConfig::default())
            .unwrap();
        let row = out.lines().find(|l| l.contains("SEC-01")).unwrap();
        assert!(row.starts_with("High      SEC-01"));
        assert!(row.contains("40%"));
        assert!(out.contains("Compliance: 50%"));
    }

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate("Sécurité", 10), "Sécurité");
        assert_eq!(truncate("Gouvernance IA et conformité", 12), "Gouvernan...");
        assert_eq!(UnicodeWidthStr::width(pad("é", 4).as_str()), 4);
    }
}
