//! In-memory store document shared by every store implementation.

use crate::error::{AuditError, Result, StoreErrorKind};
use crate::model::{AuditInfo, CatalogRow, ComplianceLevel, RecordKey, ResponseRecord};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::migrate::CURRENT_VERSION;
use super::traits::{clean_evidence, require, AuditSummary, NormInfo, ResponseUpsert};

type AuditRecords = BTreeMap<RecordKey, ResponseRecord>;

/// A saved catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNorm {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub rows: Vec<CatalogRow>,
}

/// Current store document layout.
///
/// Records are kept per audit in key order; on disk each audit is a plain
/// JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: u32,
    #[serde(default, with = "records_as_lists")]
    audits: BTreeMap<String, AuditRecords>,
    /// Per-audit metadata
    #[serde(default)]
    meta: BTreeMap<String, AuditInfo>,
    #[serde(default)]
    norms: BTreeMap<String, StoredNorm>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            audits: BTreeMap::new(),
            meta: BTreeMap::new(),
            norms: BTreeMap::new(),
        }
    }
}

/// Next write timestamp: now, or just after the previous one if the clock
/// has not moved past it.
fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

fn not_found(audit_id: &str, qid: &str, item: &str) -> AuditError {
    AuditError::store(
        format!("audit '{audit_id}'"),
        StoreErrorKind::NotFound(format!("{qid}/{item}")),
    )
}

impl StoreDocument {
    /// Metadata entry of an audit, created with the current time on first use.
    fn touch_meta(&mut self, audit_id: &str) -> &mut AuditInfo {
        let info = self.meta.entry(audit_id.trim().to_string()).or_default();
        if info.created_at.is_none() {
            info.created_at = Some(Utc::now());
        }
        info
    }

    pub fn upsert(&mut self, audit_id: &str, upsert: ResponseUpsert) -> Result<ResponseRecord> {
        let upsert = upsert.validated(audit_id)?;
        self.touch_meta(audit_id);
        let records = self.audits.entry(audit_id.trim().to_string()).or_default();
        let key = upsert.key();

        let record = match records.get_mut(&key) {
            Some(existing) => {
                existing.level = upsert.level;
                if let Some(comment) = upsert.comment {
                    existing.comment = comment;
                }
                if let Some(evidence) = upsert.evidence {
                    existing.evidence = evidence;
                }
                existing.updated_at = Some(next_timestamp(existing.updated_at));
                tracing::debug!(audit = audit_id, key = %key, "updated record");
                existing.clone()
            }
            None => {
                let record = ResponseRecord {
                    domain: upsert.domain,
                    qid: upsert.qid,
                    item: upsert.item,
                    question: upsert.question.unwrap_or_default(),
                    level: upsert.level,
                    comment: upsert.comment.unwrap_or_default(),
                    evidence: upsert.evidence.unwrap_or_default(),
                    updated_at: Some(next_timestamp(None)),
                };
                tracing::debug!(audit = audit_id, key = %key, "inserted record");
                records.insert(key, record.clone());
                record
            }
        };
        Ok(record)
    }

    pub fn list(&self, audit_id: &str) -> Vec<ResponseRecord> {
        let mut records: Vec<ResponseRecord> = self
            .audits
            .get(audit_id.trim())
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| {
            (&a.domain, &a.qid, &a.item).cmp(&(&b.domain, &b.qid, &b.item))
        });
        records
    }

    pub fn get(&self, audit_id: &str, qid: &str, item: &str) -> Option<ResponseRecord> {
        self.audits
            .get(audit_id.trim())
            .and_then(|records| records.get(&RecordKey::new(qid.trim(), item.trim())))
            .cloned()
    }

    pub fn seed(
        &mut self,
        audit_id: &str,
        rows: &[CatalogRow],
        level: ComplianceLevel,
    ) -> Result<usize> {
        require("audit_id", audit_id)?;
        for (index, row) in rows.iter().enumerate() {
            for (field, value) in [("domain", &row.domain), ("qid", &row.qid), ("item", &row.item)] {
                if value.trim().is_empty() {
                    return Err(AuditError::missing_field(index + 1, field));
                }
            }
        }

        self.touch_meta(audit_id);
        let records = self.audits.entry(audit_id.trim().to_string()).or_default();
        let mut created = 0;
        for row in rows {
            let key = RecordKey::new(row.qid.trim(), row.item.trim());
            if records.contains_key(&key) {
                continue;
            }
            let mut record = row.skeleton(level);
            record.domain = row.domain.trim().to_string();
            record.qid = key.qid.clone();
            record.item = key.item.clone();
            record.updated_at = Some(next_timestamp(None));
            records.insert(key, record);
            created += 1;
        }
        tracing::info!(audit = audit_id, created, "seeded audit from catalog");
        Ok(created)
    }

    fn update_evidence(
        &mut self,
        audit_id: &str,
        qid: &str,
        item: &str,
        change: impl FnOnce(&mut Vec<String>),
    ) -> Result<ResponseRecord> {
        let record = self
            .audits
            .get_mut(audit_id.trim())
            .and_then(|records| records.get_mut(&RecordKey::new(qid.trim(), item.trim())))
            .ok_or_else(|| not_found(audit_id, qid, item))?;
        change(&mut record.evidence);
        record.updated_at = Some(next_timestamp(record.updated_at));
        Ok(record.clone())
    }

    pub fn attach_evidence(
        &mut self,
        audit_id: &str,
        qid: &str,
        item: &str,
        evidence: &[String],
    ) -> Result<ResponseRecord> {
        self.update_evidence(audit_id, qid, item, |current| {
            let mut merged = std::mem::take(current);
            merged.extend(evidence.iter().cloned());
            *current = clean_evidence(&merged);
        })
    }

    pub fn detach_evidence(
        &mut self,
        audit_id: &str,
        qid: &str,
        item: &str,
        evidence: &[String],
    ) -> Result<ResponseRecord> {
        self.update_evidence(audit_id, qid, item, |current| {
            current.retain(|e| !evidence.iter().any(|r| r.trim() == e));
        })
    }

    pub fn delete_audit(&mut self, audit_id: &str) -> usize {
        self.meta.remove(audit_id.trim());
        let removed = self
            .audits
            .remove(audit_id.trim())
            .map_or(0, |records| records.len());
        tracing::info!(audit = audit_id, removed, "deleted audit");
        removed
    }

    /// Every audit with records or metadata, ordered by id.
    pub fn audits(&self) -> Vec<AuditSummary> {
        let ids: std::collections::BTreeSet<&String> =
            self.audits.keys().chain(self.meta.keys()).collect();
        ids.into_iter()
            .map(|audit_id| {
                let records = self.audits.get(audit_id);
                AuditSummary {
                    audit_id: audit_id.clone(),
                    records: records.map_or(0, BTreeMap::len),
                    last_updated: records
                        .and_then(|r| r.values().filter_map(|r| r.updated_at).max()),
                    info: self.meta.get(audit_id).cloned().unwrap_or_default(),
                }
            })
            .collect()
    }

    /// Merge metadata into an audit, creating its entry if needed.
    pub fn set_audit_info(&mut self, audit_id: &str, info: AuditInfo) -> Result<AuditInfo> {
        require("audit_id", audit_id)?;
        let current = self.touch_meta(audit_id);
        current.merge(info);
        tracing::debug!(audit = audit_id, "updated audit metadata");
        Ok(current.clone())
    }

    pub fn audit_info(&self, audit_id: &str) -> Option<AuditInfo> {
        self.meta.get(audit_id.trim()).cloned()
    }

    pub fn save_norm(&mut self, name: &str, rows: Vec<CatalogRow>) -> Result<NormInfo> {
        require("norm name", name)?;
        let name = name.trim().to_string();
        let now = Utc::now();
        let norm = self
            .norms
            .entry(name.clone())
            .and_modify(|norm| norm.updated_at = now)
            .or_insert_with(|| StoredNorm {
                created_at: now,
                updated_at: now,
                rows: Vec::new(),
            });
        norm.rows = rows;
        Ok(norm_info(&name, norm))
    }

    pub fn list_norms(&self) -> Vec<NormInfo> {
        self.norms
            .iter()
            .map(|(name, norm)| norm_info(name, norm))
            .collect()
    }

    pub fn get_norm(&self, name: &str) -> Option<Vec<CatalogRow>> {
        self.norms.get(name.trim()).map(|norm| norm.rows.clone())
    }

    pub fn delete_norm(&mut self, name: &str) -> bool {
        self.norms.remove(name.trim()).is_some()
    }
}

fn norm_info(name: &str, norm: &StoredNorm) -> NormInfo {
    NormInfo {
        name: name.to_string(),
        rows: norm.rows.len(),
        created_at: norm.created_at,
        updated_at: norm.updated_at,
    }
}

mod records_as_lists {
    use super::AuditRecords;
    use crate::model::ResponseRecord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(audits: &BTreeMap<String, AuditRecords>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let lists: BTreeMap<&String, Vec<&ResponseRecord>> = audits
            .iter()
            .map(|(id, records)| (id, records.values().collect()))
            .collect();
        lists.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, AuditRecords>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let lists = BTreeMap::<String, Vec<ResponseRecord>>::deserialize(deserializer)?;
        Ok(lists
            .into_iter()
            .map(|(id, records)| (id, records.into_iter().map(|r| (r.key(), r)).collect()))
            .collect())
    }
}
