//! Findings and remediation plan ordering.

use crate::model::ResponseRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::engine::RiskEstimate;

/// A record with its inferred risk and recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(flatten)]
    pub record: ResponseRecord,
    pub risk: RiskEstimate,
    pub recommendation: String,
}

/// Plan ordering: priority rank ascending, then expected loss descending.
#[must_use]
pub fn plan_order(a: &Finding, b: &Finding) -> Ordering {
    a.risk
        .priority
        .rank()
        .cmp(&b.risk.priority.rank())
        .then_with(|| b.risk.expected_loss.total_cmp(&a.risk.expected_loss))
}

/// Sort findings into plan order. Stable: ties keep their input order.
pub fn order_plan(findings: &mut [Finding]) {
    findings.sort_by(plan_order);
}

/// Ordered remediation plan with totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemediationPlan {
    pub actions: Vec<Finding>,
    pub total_expected_loss: f64,
    pub total_remediation_cost: f64,
}

impl RemediationPlan {
    /// Build a plan from findings, optionally keeping open items only.
    #[must_use]
    pub fn build(findings: &[Finding], open_only: bool) -> Self {
        let mut actions: Vec<Finding> = findings
            .iter()
            .filter(|f| !open_only || f.record.level.is_open())
            .cloned()
            .collect();
        order_plan(&mut actions);

        let total_expected_loss = actions.iter().map(|f| f.risk.expected_loss).sum();
        let total_remediation_cost = actions.iter().map(|f| f.risk.remediation_cost).sum();
        Self {
            actions,
            total_expected_loss,
            total_remediation_cost,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComplianceLevel;
    use crate::risk::tables::{Priority, Tier};

    fn finding(qid: &str, level: ComplianceLevel, priority: Priority, expected_loss: f64) -> Finding {
        Finding {
            record: ResponseRecord::new("D", qid, qid, "", level),
            risk: RiskEstimate {
                tier: Tier::Mid,
                weight: 0.7,
                probability: 0.1,
                loss_estimate: expected_loss * 10.0,
                remediation_cost: 1000.0,
                expected_loss,
                priority,
            },
            recommendation: String::new(),
        }
    }

    fn qids(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.record.qid.as_str()).collect()
    }

    #[test]
    fn test_priority_then_expected_loss() {
        let mut findings = vec![
            finding("info", ComplianceLevel::Compliant, Priority::Info, 99_999.0),
            finding("med-low", ComplianceLevel::PartiallyCompliant, Priority::Medium, 100.0),
            finding("high", ComplianceLevel::NonCompliant, Priority::High, 10.0),
            finding("med-high", ComplianceLevel::PartiallyCompliant, Priority::Medium, 5_000.0),
        ];
        order_plan(&mut findings);
        assert_eq!(qids(&findings), vec!["high", "med-high", "med-low", "info"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut findings = vec![
            finding("first", ComplianceLevel::NonCompliant, Priority::High, 500.0),
            finding("second", ComplianceLevel::NonCompliant, Priority::High, 500.0),
            finding("third", ComplianceLevel::NonCompliant, Priority::High, 500.0),
        ];
        order_plan(&mut findings);
        assert_eq!(qids(&findings), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_build_open_only_and_totals() {
        let findings = vec![
            finding("a", ComplianceLevel::Compliant, Priority::Info, 10.0),
            finding("b", ComplianceLevel::NonCompliant, Priority::High, 20.0),
            finding("c", ComplianceLevel::PartiallyCompliant, Priority::Medium, 30.0),
        ];
        let plan = RemediationPlan::build(&findings, true);
        assert_eq!(qids(&plan.actions), vec!["b", "c"]);
        assert!((plan.total_expected_loss - 50.0).abs() < 1e-9);
        assert!((plan.total_remediation_cost - 2000.0).abs() < 1e-9);

        let full = RemediationPlan::build(&findings, false);
        assert_eq!(full.len(), 3);
    }
}
