//! HTML report generator.
//!
//! Produces a single self-contained page (inline CSS, no scripts).

use super::escape::{escape_html, escape_html_attr};
use super::figures::{format_money, format_probability};
use super::markdown::question_text;
use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, ReportSection};
use crate::context::AuditEvaluation;
use crate::model::ComplianceLevel;
use crate::risk::{Finding, Priority};
use crate::scoring::format_rate;
use std::fmt::Write;

/// HTML report generator
pub struct HtmlReporter {
    /// Include inline CSS
    include_styles: bool,
}

impl HtmlReporter {
    /// Create a new HTML reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_styles: true,
        }
    }

    /// Emit bare markup for embedding in another page
    #[must_use]
    pub const fn without_styles(mut self) -> Self {
        self.include_styles = false;
        self
    }

    const fn get_styles(&self) -> &'static str {
        r#"
        <style>
            :root {
                --bg-color: #1e1e2e;
                --text-color: #cdd6f4;
                --accent-color: #89b4fa;
                --success-color: #a6e3a1;
                --warning-color: #f9e2af;
                --error-color: #f38ba8;
                --border-color: #45475a;
                --card-bg: #313244;
            }

            body {
                font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
                background-color: var(--bg-color);
                color: var(--text-color);
                margin: 0;
                padding: 20px;
                line-height: 1.6;
            }

            .container { max-width: 1200px; margin: 0 auto; }
            h1, h2, h3 { color: var(--accent-color); }

            .header {
                border-bottom: 2px solid var(--border-color);
                padding-bottom: 20px;
                margin-bottom: 30px;
            }

            .summary-cards {
                display: grid;
                grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
                gap: 20px;
                margin-bottom: 30px;
            }

            .card {
                background-color: var(--card-bg);
                border-radius: 8px;
                padding: 20px;
                border: 1px solid var(--border-color);
            }

            .card-title { font-size: 0.9em; color: #a6adc8; margin-bottom: 10px; }
            .card-value { font-size: 2em; font-weight: bold; }
            .card-value.good { color: var(--success-color); }
            .card-value.fair { color: var(--warning-color); }
            .card-value.poor { color: var(--error-color); }

            table {
                width: 100%;
                border-collapse: collapse;
                margin-bottom: 30px;
                background-color: var(--card-bg);
                border-radius: 8px;
                overflow: hidden;
            }

            th, td {
                padding: 12px 15px;
                text-align: left;
                border-bottom: 1px solid var(--border-color);
            }

            th { background-color: #45475a; font-weight: 600; }
            tr:hover { background-color: #3b3d4d; }
            td.num { text-align: right; white-space: nowrap; }

            .badge {
                display: inline-block;
                padding: 2px 8px;
                border-radius: 4px;
                font-size: 0.85em;
                font-weight: 500;
            }

            .badge-high { background-color: rgba(243, 139, 168, 0.3); color: var(--error-color); }
            .badge-medium { background-color: rgba(249, 226, 175, 0.3); color: var(--warning-color); }
            .badge-low { background-color: rgba(148, 226, 213, 0.3); color: #94e2d5; }
            .badge-info { background-color: rgba(110, 118, 129, 0.3); color: #a6adc8; }
            .level-compliant { color: var(--success-color); }
            .level-partially-compliant { color: var(--warning-color); }
            .level-non-compliant { color: var(--error-color); }
            .level-not-applicable { color: #a6adc8; }

            .section { margin-bottom: 40px; }

            .footer {
                margin-top: 40px;
                padding-top: 20px;
                border-top: 1px solid var(--border-color);
                font-size: 0.9em;
                color: #a6adc8;
            }
        </style>
        "#
    }

    fn write_card(html: &mut String, title: &str, value: &str, class: &str) -> std::fmt::Result {
        writeln!(html, "    <div class=\"card\">")?;
        writeln!(html, "        <div class=\"card-title\">{title}</div>")?;
        writeln!(html, "        <div class=\"card-value {class}\">{value}</div>")?;
        writeln!(html, "    </div>")
    }

    fn write_score(
        html: &mut String,
        eval: &AuditEvaluation,
        config: &ReportConfig,
    ) -> Result<(), ReportError> {
        let metrics = &eval.score.metrics;
        let open = eval.findings.iter().filter(|f| f.record.level.is_open()).count();

        writeln!(html, "<div class=\"summary-cards\">")?;
        Self::write_card(
            html,
            "Compliance Rate",
            &escape_html(&metrics.rate_display()),
            rate_class(metrics.rate),
        )?;
        Self::write_card(
            html,
            "Applicable Records",
            &format!("{} / {}", metrics.applicable, metrics.total),
            "",
        )?;
        Self::write_card(html, "Open Items", &open.to_string(), "poor")?;
        Self::write_card(
            html,
            "Expected Loss",
            &escape_html(&format_money(eval.plan.total_expected_loss, &config.currency)),
            "",
        )?;
        Self::write_card(
            html,
            "Remediation Cost",
            &escape_html(&format_money(eval.plan.total_remediation_cost, &config.currency)),
            "",
        )?;
        writeln!(html, "</div>")?;

        if !eval.score.domains.is_empty() {
            writeln!(html, "<div class=\"section\">")?;
            writeln!(html, "    <h2>Domains</h2>")?;
            writeln!(html, "    <table>")?;
            writeln!(
                html,
                "        <thead><tr><th>Domain</th><th>Rate</th><th>Compliant</th><th>Partial</th><th>Non-compliant</th><th>N/A</th></tr></thead>"
            )?;
            writeln!(html, "        <tbody>")?;
            for (domain, score) in &eval.score.domains {
                writeln!(
                    html,
                    "            <tr><td>{}</td><td class=\"num {}\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
                    escape_html(domain),
                    rate_class(Some(score.rate)),
                    format_rate(Some(score.rate)),
                    score.counts.compliant,
                    score.counts.partially_compliant,
                    score.counts.non_compliant,
                    score.counts.not_applicable
                )?;
            }
            writeln!(html, "        </tbody>")?;
            writeln!(html, "    </table>")?;
            writeln!(html, "</div>")?;
        }
        Ok(())
    }

    fn write_findings(
        html: &mut String,
        heading: &str,
        findings: &[Finding],
        ranked: bool,
        config: &ReportConfig,
    ) -> Result<(), ReportError> {
        writeln!(html, "<div class=\"section\">")?;
        writeln!(html, "    <h2>{heading}</h2>")?;
        if findings.is_empty() {
            writeln!(html, "    <p>No records in this view.</p>")?;
            writeln!(html, "</div>")?;
            return Ok(());
        }
        writeln!(html, "    <table>")?;
        writeln!(html, "        <thead>")?;
        writeln!(html, "            <tr>")?;
        if ranked {
            writeln!(html, "                <th>#</th>")?;
        }
        for th in [
            "Priority",
            "QID",
            "Domain",
            "Question",
            "Level",
            "Probability",
            "Expected Loss",
            "Cost",
            "Recommendation",
        ] {
            writeln!(html, "                <th>{th}</th>")?;
        }
        writeln!(html, "            </tr>")?;
        writeln!(html, "        </thead>")?;
        writeln!(html, "        <tbody>")?;
        for (rank, finding) in config.limit(findings).iter().enumerate() {
            let record = &finding.record;
            let risk = &finding.risk;
            writeln!(html, "            <tr>")?;
            if ranked {
                writeln!(html, "                <td class=\"num\">{}</td>", rank + 1)?;
            }
            writeln!(
                html,
                "                <td><span class=\"badge {}\">{}</span></td>",
                priority_class(risk.priority),
                risk.priority
            )?;
            writeln!(html, "                <td>{}</td>", escape_html(&record.qid))?;
            writeln!(html, "                <td>{}</td>", escape_html(&record.domain))?;
            writeln!(
                html,
                "                <td title=\"{}\">{}</td>",
                escape_html_attr(&record.comment),
                escape_html(question_text(finding))
            )?;
            writeln!(
                html,
                "                <td class=\"{}\">{}</td>",
                level_class(record.level),
                record.level.label()
            )?;
            writeln!(
                html,
                "                <td class=\"num\">{}</td>",
                format_probability(risk.probability)
            )?;
            writeln!(
                html,
                "                <td class=\"num\">{}</td>",
                escape_html(&format_money(risk.expected_loss, &config.currency))
            )?;
            writeln!(
                html,
                "                <td class=\"num\">{}</td>",
                escape_html(&format_money(risk.remediation_cost, &config.currency))
            )?;
            writeln!(
                html,
                "                <td>{}</td>",
                escape_html(&finding.recommendation)
            )?;
            writeln!(html, "            </tr>")?;
        }
        writeln!(html, "        </tbody>")?;
        writeln!(html, "    </table>")?;
        writeln!(html, "</div>")?;
        Ok(())
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for HtmlReporter {
    fn generate(
        &self,
        eval: &AuditEvaluation,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut html = String::new();
        let title = config.title_or_default();

        // HTML header
        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html lang=\"en\">")?;
        writeln!(html, "<head>")?;
        writeln!(html, "    <meta charset=\"UTF-8\">")?;
        writeln!(
            html,
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(html, "    <title>{}</title>", escape_html(title))?;
        if self.include_styles {
            writeln!(html, "{}", self.get_styles())?;
        }
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;
        writeln!(html, "<div class=\"container\">")?;

        // Header
        writeln!(html, "<div class=\"header\">")?;
        writeln!(html, "    <h1>{}</h1>", escape_html(title))?;
        if let Some(org) = &config.organisation {
            writeln!(html, "    <h3>{}</h3>", escape_html(org))?;
        }
        writeln!(
            html,
            "    <p>Audit <strong>{}</strong></p>",
            escape_html(&eval.audit_id)
        )?;
        if let Some(info) = &config.metadata.audit {
            if let Some(project) = info.project_label() {
                writeln!(html, "    <p>Project <strong>{}</strong></p>", escape_html(&project))?;
            }
            if let Some(standard) = info.standard_label() {
                writeln!(html, "    <p>Standard <strong>{}</strong></p>", escape_html(&standard))?;
            }
        }
        writeln!(html, "</div>")?;

        if config.includes(ReportSection::Score) {
            Self::write_score(&mut html, eval, config)?;
        }
        if config.includes(ReportSection::Findings) {
            Self::write_findings(&mut html, "Findings", &eval.findings, false, config)?;
        }
        if config.includes(ReportSection::Plan) {
            Self::write_findings(&mut html, "Action Plan", &eval.plan.actions, true, config)?;
        }

        // Footer
        writeln!(html, "<div class=\"footer\">")?;
        writeln!(
            html,
            "    <p>Generated by audit-tools v{}{}</p>",
            env!("CARGO_PKG_VERSION"),
            config
                .metadata
                .generated_at
                .as_deref()
                .map(|at| format!(" on {}", escape_html(at)))
                .unwrap_or_default()
        )?;
        writeln!(html, "</div>")?;
        writeln!(html, "</div>")?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;

        Ok(html)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }
}

fn rate_class(rate: Option<u32>) -> &'static str {
    match rate {
        Some(r) if r >= 80 => "good",
        Some(r) if r >= 50 => "fair",
        Some(_) => "poor",
        None => "",
    }
}

const fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "badge-high",
        Priority::Medium => "badge-medium",
        Priority::Low => "badge-low",
        Priority::Info => "badge-info",
    }
}

const fn level_class(level: ComplianceLevel) -> &'static str {
    match level {
        ComplianceLevel::Compliant => "level-compliant",
        ComplianceLevel::PartiallyCompliant => "level-partially-compliant",
        ComplianceLevel::NonCompliant => "level-non-compliant",
        ComplianceLevel::NotApplicable => "level-not-applicable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_support::evaluation;

    #[test]
    fn test_html_document() {
        let html = HtmlReporter::new()
            .generate(&evaluation(), &ReportConfig::default())
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("<div class=\"card-value fair\">50%</div>"));
        assert!(html.contains("<h2>Action Plan</h2>"));
        assert!(html.contains("<span class=\"badge badge-high\">High</span>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_html_escapes_free_text() {
        let config = ReportConfig {
            title: Some("<script>alert(1)</script>".to_string()),
            ..ReportConfig::default()
        };
        let html = HtmlReporter::new()
            .without_styles()
            .generate(&evaluation(), &config)
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("Charte &lt;signée&gt; ?"));
        assert!(!html.contains("<style>"));
    }
}
