//! Catalog rows and response records.

use super::level::ComplianceLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key identifying a questionnaire item within one audit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub qid: String,
    pub item: String,
}

impl RecordKey {
    pub fn new(qid: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            qid: qid.into(),
            item: item.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.qid, self.item)
    }
}

/// One question of a norm (catalog), as imported from a spreadsheet or YAML file.
///
/// Only `domain`, `qid`, `item` and `question` are used by the engines; the
/// optional fields pass through to reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRow {
    pub domain: String,
    pub qid: String,
    pub item: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_evidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl CatalogRow {
    /// Create a row with the four required fields.
    pub fn new(
        domain: impl Into<String>,
        qid: impl Into<String>,
        item: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            qid: qid.into(),
            item: item.into(),
            question: question.into(),
            ..Self::default()
        }
    }

    /// Attach a catalog recommendation.
    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.qid.clone(), self.item.clone())
    }

    /// Skeleton response for this row, as created when a norm is loaded.
    #[must_use]
    pub fn skeleton(&self, level: ComplianceLevel) -> ResponseRecord {
        ResponseRecord {
            domain: self.domain.clone(),
            qid: self.qid.clone(),
            item: self.item.clone(),
            question: self.question.clone(),
            level,
            comment: String::new(),
            evidence: Vec::new(),
            updated_at: None,
        }
    }
}

/// One evaluated questionnaire item within one audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub domain: String,
    pub qid: String,
    pub item: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub level: ComplianceLevel,
    #[serde(default)]
    pub comment: String,
    /// Opaque references (names or paths) to attached artifacts, in attachment order
    #[serde(default)]
    pub evidence: Vec<String>,
    /// Set by stores on every write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResponseRecord {
    /// Create a record with an empty comment and no evidence.
    pub fn new(
        domain: impl Into<String>,
        qid: impl Into<String>,
        item: impl Into<String>,
        question: impl Into<String>,
        level: ComplianceLevel,
    ) -> Self {
        Self {
            domain: domain.into(),
            qid: qid.into(),
            item: item.into(),
            question: question.into(),
            level,
            comment: String::new(),
            evidence: Vec::new(),
            updated_at: None,
        }
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.qid.clone(), self.item.clone())
    }

    /// Same record without its write timestamp, for content comparisons.
    #[must_use]
    pub fn without_timestamp(&self) -> Self {
        Self {
            updated_at: None,
            ..self.clone()
        }
    }

    /// `"<qid> — <question>"`, falling back to the item label.
    #[must_use]
    pub fn title(&self) -> String {
        if self.question.trim().is_empty() {
            format!("{} — {}", self.qid, self.item)
        } else {
            format!("{} — {}", self.qid, self.question)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_copies_catalog_fields() {
        let row = CatalogRow::new("Sécurité", "SEC-01", "MFA", "MFA activé ?");
        let rec = row.skeleton(ComplianceLevel::NonCompliant);
        assert_eq!(rec.domain, "Sécurité");
        assert_eq!(rec.question, "MFA activé ?");
        assert_eq!(rec.level, ComplianceLevel::NonCompliant);
        assert!(rec.evidence.is_empty());
        assert_eq!(rec.key(), RecordKey::new("SEC-01", "MFA"));
    }

    #[test]
    fn test_title_falls_back_to_item() {
        let rec = ResponseRecord::new("Gov", "GOV-01", "Policy", "  ", ComplianceLevel::Compliant);
        assert_eq!(rec.title(), "GOV-01 — Policy");
    }

    #[test]
    fn test_record_key_ordering() {
        let a = RecordKey::new("A-01", "x");
        let b = RecordKey::new("A-01", "y");
        let c = RecordKey::new("B-01", "a");
        assert!(a < b && b < c);
    }
}
