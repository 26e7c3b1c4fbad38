//! JSON document store on disk.

use crate::error::{AuditError, ErrorContext, Result, StoreErrorKind};
use crate::model::{AuditInfo, CatalogRow, ComplianceLevel, ResponseRecord};
use std::fs;
use std::path::{Path, PathBuf};

use super::document::StoreDocument;
use super::migrate;
use super::traits::{
    apply_batch, AuditSummary, BatchSaveReport, NormInfo, NormLibrary, ResponseStore,
    ResponseUpsert,
};

/// Store persisted as a single JSON document.
///
/// The whole document is loaded on open. Every write is applied to a copy
/// which is written to a temporary file and renamed over the original; the
/// in-memory state only changes once the file is in place.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: StoreDocument,
}

impl JsonFileStore {
    /// Open a store, creating an empty document if the file does not exist.
    ///
    /// Older document versions are migrated in memory and written back on
    /// the next change.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = if path.exists() {
            Self::load(&path)?
        } else {
            tracing::debug!("Store {} does not exist yet, starting empty", path.display());
            StoreDocument::default()
        };
        Ok(Self { path, doc })
    }

    fn load(path: &Path) -> Result<StoreDocument> {
        let content = fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
        if content.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        let raw: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            AuditError::store(
                format!("parsing {}", path.display()),
                StoreErrorKind::Corrupt(e.to_string()),
            )
        })?;
        let migrated = migrate::migrate(raw).with_context(|| path.display().to_string())?;
        let doc = serde_json::from_value(migrated).map_err(|e| {
            AuditError::store(
                format!("decoding {}", path.display()),
                StoreErrorKind::Corrupt(e.to_string()),
            )
        })?;
        tracing::debug!("Loaded store from {}", path.display());
        Ok(doc)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, doc: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| AuditError::io(parent, e))?;
            }
        }
        let content = serde_json::to_string_pretty(doc)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(|e| AuditError::io(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| AuditError::io(&self.path, e))?;
        tracing::debug!("Saved store to {}", self.path.display());
        Ok(())
    }

    /// Apply a change to a copy of the document and commit it once persisted.
    fn write<T>(&mut self, change: impl FnOnce(&mut StoreDocument) -> Result<T>) -> Result<T> {
        let mut next = self.doc.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;
        self.doc = next;
        Ok(out)
    }
}

impl ResponseStore for JsonFileStore {
    fn upsert(&mut self, audit_id: &str, upsert: ResponseUpsert) -> Result<ResponseRecord> {
        self.write(|doc| doc.upsert(audit_id, upsert))
    }

    fn list(&self, audit_id: &str) -> Result<Vec<ResponseRecord>> {
        Ok(self.doc.list(audit_id))
    }

    fn get(&self, audit_id: &str, qid: &str, item: &str) -> Result<Option<ResponseRecord>> {
        Ok(self.doc.get(audit_id, qid, item))
    }

    fn seed(
        &mut self,
        audit_id: &str,
        rows: &[CatalogRow],
        level: ComplianceLevel,
    ) -> Result<usize> {
        self.write(|doc| doc.seed(audit_id, rows, level))
    }

    fn attach_evidence(
        &mut self,
        audit_id: &str,
        qid: &str,
        item: &str,
        evidence: &[String],
    ) -> Result<ResponseRecord> {
        self.write(|doc| doc.attach_evidence(audit_id, qid, item, evidence))
    }

    fn detach_evidence(
        &mut self,
        audit_id: &str,
        qid: &str,
        item: &str,
        evidence: &[String],
    ) -> Result<ResponseRecord> {
        self.write(|doc| doc.detach_evidence(audit_id, qid, item, evidence))
    }

    fn delete_audit(&mut self, audit_id: &str) -> Result<usize> {
        self.write(|doc| Ok(doc.delete_audit(audit_id)))
    }

    fn audits(&self) -> Result<Vec<AuditSummary>> {
        Ok(self.doc.audits())
    }

    fn set_audit_info(&mut self, audit_id: &str, info: AuditInfo) -> Result<AuditInfo> {
        self.write(|doc| doc.set_audit_info(audit_id, info))
    }

    fn audit_info(&self, audit_id: &str) -> Result<Option<AuditInfo>> {
        Ok(self.doc.audit_info(audit_id))
    }

    /// Applies the whole batch in memory and writes the file once.
    fn save_batch(
        &mut self,
        audit_id: &str,
        upserts: Vec<ResponseUpsert>,
    ) -> Result<BatchSaveReport> {
        let report = self.write(|doc| Ok(apply_batch(upserts, |upsert| doc.upsert(audit_id, upsert))))?;
        report.log(audit_id);
        Ok(report)
    }
}

impl NormLibrary for JsonFileStore {
    fn save_norm(&mut self, name: &str, rows: Vec<CatalogRow>) -> Result<NormInfo> {
        self.write(|doc| doc.save_norm(name, rows))
    }

    fn list_norms(&self) -> Result<Vec<NormInfo>> {
        Ok(self.doc.list_norms())
    }

    fn get_norm(&self, name: &str) -> Result<Option<Vec<CatalogRow>>> {
        Ok(self.doc.get_norm(name))
    }

    fn delete_norm(&mut self, name: &str) -> Result<bool> {
        self.write(|doc| Ok(doc.delete_norm(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reopen_sees_committed_writes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store
            .upsert(
                "a1",
                ResponseUpsert::new("Sécurité", "SEC-01", "MFA", ComplianceLevel::NonCompliant)
                    .question("MFA activé ?"),
            )
            .unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        let record = reopened.get("a1", "SEC-01", "MFA").unwrap().unwrap();
        assert_eq!(record.level, ComplianceLevel::NonCompliant);
        assert_eq!(record.question, "MFA activé ?");
    }

    #[test]
    fn test_legacy_document_is_migrated_on_open() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("legacy.json");
        fs::write(
            &path,
            r#"[{"domain": "Opérations", "qid": "OPS-01", "level": "conforme", "evidence_json": "[]"}]"#,
        )
        .unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        let records = store.list(migrate::LEGACY_AUDIT_ID).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item, "OPS-01");
        assert_eq!(records[0].level, ComplianceLevel::Compliant);
    }

    #[test]
    fn test_batch_reports_failures_and_persists_successes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        let report = store
            .save_batch(
                "a1",
                vec![
                    ResponseUpsert::new("Sécurité", "SEC-01", "MFA", ComplianceLevel::Compliant),
                    ResponseUpsert::new("Sécurité", "", "Orphelin", ComplianceLevel::Compliant),
                    ResponseUpsert::new("Opérations", "OPS-01", "Backup", ComplianceLevel::NonCompliant),
                ],
            )
            .unwrap();
        assert_eq!(report.saved, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].item, "Orphelin");

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.list("a1").unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, AuditError::Store { .. }));
    }

    #[test]
    fn test_failed_validation_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        let result = store.upsert("a1", ResponseUpsert::new("", "Q", "I", ComplianceLevel::Compliant));
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
