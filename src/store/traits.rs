//! Store traits and write payloads.

use crate::error::{AuditError, Result};
use crate::model::{AuditInfo, CatalogRow, ComplianceLevel, RecordKey, ResponseRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One write against a response store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseUpsert {
    pub domain: String,
    pub qid: String,
    pub item: String,
    /// Question text; used only when the record is created
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub level: ComplianceLevel,
    /// New comment; `None` keeps the stored one
    #[serde(default)]
    pub comment: Option<String>,
    /// New evidence list; `None` keeps the stored one
    #[serde(default)]
    pub evidence: Option<Vec<String>>,
}

impl ResponseUpsert {
    pub fn new(
        domain: impl Into<String>,
        qid: impl Into<String>,
        item: impl Into<String>,
        level: ComplianceLevel,
    ) -> Self {
        Self {
            domain: domain.into(),
            qid: qid.into(),
            item: item.into(),
            question: None,
            level,
            comment: None,
            evidence: None,
        }
    }

    #[must_use]
    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = Some(evidence);
        self
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.qid.trim(), self.item.trim())
    }

    /// Check required fields and return a trimmed copy.
    pub fn validated(&self, audit_id: &str) -> Result<Self> {
        require("audit_id", audit_id)?;
        require("domain", &self.domain)?;
        require("qid", &self.qid)?;
        require("item", &self.item)?;
        Ok(Self {
            domain: self.domain.trim().to_string(),
            qid: self.qid.trim().to_string(),
            item: self.item.trim().to_string(),
            question: self.question.as_ref().map(|q| q.trim().to_string()),
            level: self.level,
            comment: self.comment.as_ref().map(|c| c.trim().to_string()),
            evidence: self.evidence.as_deref().map(clean_evidence),
        })
    }
}

impl From<&ResponseRecord> for ResponseUpsert {
    fn from(record: &ResponseRecord) -> Self {
        Self {
            domain: record.domain.clone(),
            qid: record.qid.clone(),
            item: record.item.clone(),
            question: Some(record.question.clone()),
            level: record.level,
            comment: Some(record.comment.clone()),
            evidence: Some(record.evidence.clone()),
        }
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(AuditError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Trimmed, non-blank references without duplicates, in first-seen order.
pub(crate) fn clean_evidence(evidence: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(evidence.len());
    for reference in evidence.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
        if !out.iter().any(|e| e == reference) {
            out.push(reference.to_string());
        }
    }
    out
}

/// Summary of one stored audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub audit_id: String,
    pub records: usize,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub info: AuditInfo,
}

/// A record that could not be saved in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFailure {
    pub qid: String,
    pub item: String,
    pub error: String,
}

/// Outcome of a batch save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSaveReport {
    /// Number of records committed
    pub saved: usize,
    pub failures: Vec<SaveFailure>,
}

impl BatchSaveReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn log(&self, audit_id: &str) {
        tracing::info!(
            audit = audit_id,
            saved = self.saved,
            failed = self.failures.len(),
            "batch save finished"
        );
    }
}

/// Run `save` on every upsert, counting successes and collecting failures.
pub(crate) fn apply_batch(
    upserts: Vec<ResponseUpsert>,
    mut save: impl FnMut(ResponseUpsert) -> Result<ResponseRecord>,
) -> BatchSaveReport {
    let mut report = BatchSaveReport::default();
    for upsert in upserts {
        let (qid, item) = (upsert.qid.clone(), upsert.item.clone());
        match save(upsert) {
            Ok(_) => report.saved += 1,
            Err(e) => {
                tracing::warn!("Failed to save {qid}/{item}: {e}");
                report.failures.push(SaveFailure {
                    qid,
                    item,
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

/// Persistence contract for audit responses.
///
/// Records are unique per `(audit_id, qid, item)`. Writes never delete
/// records; only [`ResponseStore::delete_audit`] removes them.
pub trait ResponseStore {
    /// Insert or update one record.
    ///
    /// On conflict `level` is replaced, as are `comment` and `evidence`
    /// when the write carries them; `domain` and `question` keep their first
    /// recorded values. Every write advances `updated_at`.
    fn upsert(&mut self, audit_id: &str, upsert: ResponseUpsert) -> Result<ResponseRecord>;

    /// Records of an audit ordered by `(domain, qid, item)`.
    fn list(&self, audit_id: &str) -> Result<Vec<ResponseRecord>>;

    fn get(&self, audit_id: &str, qid: &str, item: &str) -> Result<Option<ResponseRecord>>;

    /// Insert skeleton records for catalog rows not yet present.
    ///
    /// Returns the number of records created; existing records are untouched.
    fn seed(&mut self, audit_id: &str, rows: &[CatalogRow], level: ComplianceLevel)
        -> Result<usize>;

    /// Add evidence references to an existing record without touching its
    /// level or comment.
    fn attach_evidence(
        &mut self,
        audit_id: &str,
        qid: &str,
        item: &str,
        evidence: &[String],
    ) -> Result<ResponseRecord>;

    /// Remove evidence references from an existing record.
    fn detach_evidence(
        &mut self,
        audit_id: &str,
        qid: &str,
        item: &str,
        evidence: &[String],
    ) -> Result<ResponseRecord>;

    /// Delete every record of an audit, returning how many were removed.
    fn delete_audit(&mut self, audit_id: &str) -> Result<usize>;

    /// Stored audits ordered by id.
    fn audits(&self) -> Result<Vec<AuditSummary>>;

    /// Merge project, client and standard details into an audit. Fields
    /// left unset in `info` keep their stored values.
    fn set_audit_info(&mut self, audit_id: &str, info: AuditInfo) -> Result<AuditInfo>;

    fn audit_info(&self, audit_id: &str) -> Result<Option<AuditInfo>>;

    /// Apply many upserts. Failures are collected per record; successes
    /// are committed. An error is returned only when the store itself fails.
    fn save_batch(
        &mut self,
        audit_id: &str,
        upserts: Vec<ResponseUpsert>,
    ) -> Result<BatchSaveReport> {
        let report = apply_batch(upserts, |upsert| self.upsert(audit_id, upsert));
        report.log(audit_id);
        Ok(report)
    }
}

/// Metadata of a saved norm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormInfo {
    pub name: String,
    pub rows: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Named catalog library.
pub trait NormLibrary {
    /// Save or overwrite a named catalog.
    fn save_norm(&mut self, name: &str, rows: Vec<CatalogRow>) -> Result<NormInfo>;

    /// Saved norms ordered by name.
    fn list_norms(&self) -> Result<Vec<NormInfo>>;

    fn get_norm(&self, name: &str) -> Result<Option<Vec<CatalogRow>>>;

    /// Returns whether a norm was deleted.
    fn delete_norm(&mut self, name: &str) -> Result<bool>;
}
