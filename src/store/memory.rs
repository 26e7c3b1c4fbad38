//! In-process store.

use crate::error::Result;
use crate::model::{AuditInfo, CatalogRow, ComplianceLevel, ResponseRecord};

use super::document::StoreDocument;
use super::traits::{AuditSummary, NormInfo, NormLibrary, ResponseStore, ResponseUpsert};

/// Store keeping everything in memory. Used by tests and one-shot commands.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    doc: StoreDocument,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the underlying document.
    #[must_use]
    pub fn document(&self) -> &StoreDocument {
        &self.doc
    }
}

impl ResponseStore for MemoryStore {
    fn upsert(&mut self, audit_id: &str, upsert: ResponseUpsert) -> Result<ResponseRecord> {
        self.doc.upsert(audit_id, upsert)
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
        self.doc.seed(audit_id, rows, level)
    }

    fn attach_evidence(
        &mut self,
        audit_id: &str,
        qid: &str,
        item: &str,
        evidence: &[String],
    ) -> Result<ResponseRecord> {
        self.doc.attach_evidence(audit_id, qid, item, evidence)
    }

    fn detach_evidence(
        &mut self,
        audit_id: &str,
        qid: &str,
        item: &str,
        evidence: &[String],
    ) -> Result<ResponseRecord> {
        self.doc.detach_evidence(audit_id, qid, item, evidence)
    }

    fn delete_audit(&mut self, audit_id: &str) -> Result<usize> {
        Ok(self.doc.delete_audit(audit_id))
    }

    fn audits(&self) -> Result<Vec<AuditSummary>> {
        Ok(self.doc.audits())
    }

    fn set_audit_info(&mut self, audit_id: &str, info: AuditInfo) -> Result<AuditInfo> {
        self.doc.set_audit_info(audit_id, info)
    }

    fn audit_info(&self, audit_id: &str) -> Result<Option<AuditInfo>> {
        Ok(self.doc.audit_info(audit_id))
    }
}

impl NormLibrary for MemoryStore {
    fn save_norm(&mut self, name: &str, rows: Vec<CatalogRow>) -> Result<NormInfo> {
        self.doc.save_norm(name, rows)
    }

    fn list_norms(&self) -> Result<Vec<NormInfo>> {
        Ok(self.doc.list_norms())
    }

    fn get_norm(&self, name: &str) -> Result<Option<Vec<CatalogRow>>> {
        Ok(self.doc.get_norm(name))
    }

    fn delete_norm(&mut self, name: &str) -> Result<bool> {
        Ok(self.doc.delete_norm(name))
    }
}
