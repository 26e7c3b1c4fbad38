//! Compliance scorer combining global, per-domain and evidence metrics.

use crate::model::ResponseRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::filter::RecordFilter;
use super::metrics::{ComplianceMetrics, DomainScore, EvidenceMetrics, LevelCounts};

/// Scoring engine version, recorded in reports
pub const SCORING_ENGINE_VERSION: &str = "1.0";

/// Complete score of one view over an audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub scoring_engine_version: String,
    /// Global metrics
    pub metrics: ComplianceMetrics,
    /// Per-domain aggregates ordered by domain name; domains without
    /// applicable records are absent
    pub domains: BTreeMap<String, DomainScore>,
    pub evidence: EvidenceMetrics,
}

impl ScoreReport {
    /// Domains whose rate is below `threshold` percent, lowest first.
    #[must_use]
    pub fn weakest_domains(&self, threshold: u32) -> Vec<(&str, &DomainScore)> {
        let mut weak: Vec<_> = self
            .domains
            .iter()
            .filter(|(_, score)| score.rate < threshold)
            .map(|(name, score)| (name.as_str(), score))
            .collect();
        weak.sort_by_key(|(_, score)| score.rate);
        weak
    }
}

/// Stateless compliance scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceScorer;

impl ComplianceScorer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Score every record.
    #[must_use]
    pub fn score(&self, records: &[ResponseRecord]) -> ScoreReport {
        self.score_iter(records.iter())
    }

    /// Score the view selected by `filter`.
    #[must_use]
    pub fn score_view(&self, records: &[ResponseRecord], filter: &RecordFilter) -> ScoreReport {
        self.score_iter(records.iter().filter(|r| filter.matches(r)))
    }

    fn score_iter<'a>(&self, records: impl Iterator<Item = &'a ResponseRecord> + Clone) -> ScoreReport {
        let mut global = LevelCounts::default();
        let mut per_domain: BTreeMap<&str, LevelCounts> = BTreeMap::new();
        for record in records.clone() {
            global.add(record.level);
            per_domain
                .entry(record.domain.as_str())
                .or_default()
                .add(record.level);
        }

        let domains = per_domain
            .into_iter()
            .filter_map(|(name, counts)| {
                DomainScore::from_counts(counts).map(|score| (name.to_string(), score))
            })
            .collect();

        let report = ScoreReport {
            scoring_engine_version: SCORING_ENGINE_VERSION.to_string(),
            metrics: ComplianceMetrics::from_counts(global),
            domains,
            evidence: EvidenceMetrics::from_records(records),
        };
        tracing::debug!(
            total = report.metrics.total,
            applicable = report.metrics.applicable,
            rate = ?report.metrics.rate,
            "scored records"
        );
        report
    }
}
