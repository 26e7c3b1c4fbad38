//! CSV report generator.
//!
//! Emits one CSV block per section (domains, findings, plan), each preceded
//! by a `# <Section>` marker line, suitable for spreadsheet import.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, ReportSection};
use crate::context::AuditEvaluation;
use crate::risk::Finding;

const FINDING_HEADER: [&str; 15] = [
    "Rank",
    "Priority",
    "Domain",
    "QID",
    "Item",
    "Question",
    "Level",
    "Comment",
    "Evidence",
    "Tier",
    "Probability",
    "Loss",
    "Cost",
    "Expected Loss",
    "Recommendation",
];

/// CSV report generator.
pub struct CsvReporter;

impl CsvReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for CsvReporter {
    fn generate(
        &self,
        eval: &AuditEvaluation,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut content = String::new();

        if config.includes(ReportSection::Score) {
            content.push_str("# Domains\n");
            let mut rows = vec![vec![
                "Domain".to_string(),
                "Rate".to_string(),
                "Mean".to_string(),
                "Compliant".to_string(),
                "Partially Compliant".to_string(),
                "Non Compliant".to_string(),
                "Not Applicable".to_string(),
            ]];
            for (domain, score) in &eval.score.domains {
                rows.push(vec![
                    domain.clone(),
                    score.rate.to_string(),
                    format!("{:.4}", score.mean),
                    score.counts.compliant.to_string(),
                    score.counts.partially_compliant.to_string(),
                    score.counts.non_compliant.to_string(),
                    score.counts.not_applicable.to_string(),
                ]);
            }
            rows.push(vec![
                "Total".to_string(),
                eval.score
                    .metrics
                    .rate
                    .map(|r| r.to_string())
                    .unwrap_or_default(),
                String::new(),
                eval.score.metrics.counts.compliant.to_string(),
                eval.score.metrics.counts.partially_compliant.to_string(),
                eval.score.metrics.counts.non_compliant.to_string(),
                eval.score.metrics.counts.not_applicable.to_string(),
            ]);
            content.push_str(&write_block(rows)?);
        }

        if config.includes(ReportSection::Findings) {
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str("# Findings\n");
            content.push_str(&finding_block(config.limit(&eval.findings))?);
        }

        if config.includes(ReportSection::Plan) {
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str("# Plan\n");
            content.push_str(&finding_block(config.limit(&eval.plan.actions))?);
        }

        Ok(content)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}

fn finding_block(findings: &[Finding]) -> Result<String, ReportError> {
    let mut rows = Vec::with_capacity(findings.len() + 1);
    rows.push(FINDING_HEADER.iter().map(ToString::to_string).collect());
    for (rank, finding) in findings.iter().enumerate() {
        let record = &finding.record;
        let risk = &finding.risk;
        rows.push(vec![
            (rank + 1).to_string(),
            risk.priority.to_string(),
            record.domain.clone(),
            record.qid.clone(),
            record.item.clone(),
            record.question.clone(),
            record.level.label().to_string(),
            record.comment.clone(),
            record.evidence.join(";"),
            risk.tier.to_string(),
            format!("{:.2}", risk.probability),
            format!("{:.0}", risk.loss_estimate),
            format!("{:.0}", risk.remediation_cost),
            format!("{:.0}", risk.expected_loss),
            finding.recommendation.clone(),
        ]);
    }
    write_block(rows)
}

fn write_block(rows: Vec<Vec<String>>) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|e| ReportError::CsvError(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::CsvError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::CsvError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_support::evaluation;

    fn section<'a>(out: &'a str, name: &str) -> Vec<&'a str> {
        out.split("\n\n")
            .find(|block| block.starts_with(&format!("# {name}")))
            .map(|block| block.lines().skip(1).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_sections_present() {
        let out = CsvReporter::new()
            .generate(&evaluation(), &ReportConfig::default())
            .unwrap();
        let domains = section(&out, "Domains");
        assert_eq!(domains[0], "Domain,Rate,Mean,Compliant,Partially Compliant,Non Compliant,Not Applicable");
        assert!(domains.contains(&"Total,50,,1,1,1,0"));

        let plan = section(&out, "Plan");
        assert_eq!(plan.len(), 4);
        assert!(plan[1].starts_with("1,High,Sécurité,SEC-01,MFA,MFA activé ?,Non-compliant,Pas de MFA,,high,0.40,91000,20400,36400,"));
    }

    #[test]
    fn test_quotes_fields_with_delimiters() {
        let out = CsvReporter::new()
            .generate(
                &evaluation(),
                &ReportConfig::with_sections(vec![ReportSection::Findings]),
            )
            .unwrap();
        assert!(out.starts_with("# Findings\n"));
        let ops = out.lines().find(|l| l.contains("OPS-01")).unwrap();
        assert!(ops.contains("Sauvegardes | restaurées ?"));
        assert!(ops.contains("restore-test.pdf"));
    }
}
