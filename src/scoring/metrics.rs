//! Compliance metrics: level tallies, rates and evidence statistics.

use crate::model::{ComplianceLevel, ResponseRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder shown wherever a rate is undefined.
pub const RATE_PLACEHOLDER: &str = "—";

/// Exact per-level tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub compliant: usize,
    pub partially_compliant: usize,
    pub non_compliant: usize,
    pub not_applicable: usize,
}

impl LevelCounts {
    /// Tally the levels of a record sequence.
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a ResponseRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            counts.add(record.level);
        }
        counts
    }

    /// Count one more answer.
    pub fn add(&mut self, level: ComplianceLevel) {
        match level {
            ComplianceLevel::Compliant => self.compliant += 1,
            ComplianceLevel::PartiallyCompliant => self.partially_compliant += 1,
            ComplianceLevel::NonCompliant => self.non_compliant += 1,
            ComplianceLevel::NotApplicable => self.not_applicable += 1,
        }
    }

    #[must_use]
    pub const fn get(&self, level: ComplianceLevel) -> usize {
        match level {
            ComplianceLevel::Compliant => self.compliant,
            ComplianceLevel::PartiallyCompliant => self.partially_compliant,
            ComplianceLevel::NonCompliant => self.non_compliant,
            ComplianceLevel::NotApplicable => self.not_applicable,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.applicable() + self.not_applicable
    }

    /// Records whose level is not not-applicable.
    #[must_use]
    pub const fn applicable(&self) -> usize {
        self.compliant + self.partially_compliant + self.non_compliant
    }

    /// Weighted score sum: compliant counts 1, partially compliant 0.5.
    #[must_use]
    pub fn weighted_sum(&self) -> f64 {
        self.compliant as f64 + 0.5 * self.partially_compliant as f64
    }

    /// Mean score over applicable records in `[0, 1]`, `None` when nothing applies.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        let applicable = self.applicable();
        if applicable == 0 {
            None
        } else {
            Some(self.weighted_sum() / applicable as f64)
        }
    }

    /// Compliance rate in whole percent, rounded half up.
    ///
    /// Computed in integers as `(200·c + 100·pc + n) / (2·n)` so that exact
    /// halves such as 57.5 never fall below the rounding boundary.
    #[must_use]
    pub fn rate(&self) -> Option<u32> {
        let n = self.applicable() as u64;
        if n == 0 {
            return None;
        }
        let doubled = 200 * self.compliant as u64 + 100 * self.partially_compliant as u64;
        Some(((doubled + n) / (2 * n)) as u32)
    }
}

/// Aggregate compliance metrics over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceMetrics {
    /// Number of records, not-applicable included
    pub total: usize,
    /// Number of records entering the rate denominator
    pub applicable: usize,
    /// Per-level tallies
    pub counts: LevelCounts,
    /// Weighted compliance rate; `None` (serialized as `null`) when no record applies
    pub rate: Option<u32>,
}

impl ComplianceMetrics {
    /// Compute metrics for a record sequence.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ResponseRecord>) -> Self {
        Self::from_counts(LevelCounts::tally(records))
    }

    #[must_use]
    pub fn from_counts(counts: LevelCounts) -> Self {
        Self {
            total: counts.total(),
            applicable: counts.applicable(),
            counts,
            rate: counts.rate(),
        }
    }

    /// Rate formatted for display (`"63%"` or the placeholder).
    #[must_use]
    pub fn rate_display(&self) -> String {
        format_rate(self.rate)
    }
}

/// Score of one domain. Only produced for domains with at least one applicable record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    /// Mean score in `[0, 1]`
    pub mean: f64,
    /// Mean score in whole percent
    pub rate: u32,
    pub counts: LevelCounts,
}

impl DomainScore {
    /// Build from tallies; `None` when the domain has no applicable record.
    #[must_use]
    pub fn from_counts(counts: LevelCounts) -> Option<Self> {
        Some(Self {
            mean: counts.mean()?,
            rate: counts.rate()?,
            counts,
        })
    }
}

/// Evidence attachment statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceMetrics {
    /// Number of evidence references across all records
    pub total: usize,
    /// Records with at least one reference
    pub items_with_evidence: usize,
    /// Reference count per domain (domains without evidence included as 0)
    pub by_domain: BTreeMap<String, usize>,
}

impl EvidenceMetrics {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ResponseRecord>) -> Self {
        let mut metrics = Self::default();
        for record in records {
            let count = record.evidence.len();
            metrics.total += count;
            if count > 0 {
                metrics.items_with_evidence += 1;
            }
            *metrics.by_domain.entry(record.domain.clone()).or_insert(0) += count;
        }
        metrics
    }
}

/// Format an optional rate for display.
#[must_use]
pub fn format_rate(rate: Option<u32>) -> String {
    rate.map_or_else(|| RATE_PLACEHOLDER.to_string(), |r| format!("{r}%"))
}
