//! Per-operation audit context.
//!
//! An [`AuditContext`] bundles everything one operation needs: the audit
//! id, the catalog index and the compiled engines. It is built per command
//! and passed explicitly; there is no global session state.

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::error::Result;
use crate::model::{ComplianceLevel, ResponseRecord};
use crate::risk::{Finding, RecommendationTexts, RemediationPlan, RiskEngine, RiskTables};
use crate::scoring::{ComplianceScorer, RecordFilter, ScoreReport};
use crate::store::{BatchSaveReport, ResponseStore, ResponseUpsert};
use serde::{Deserialize, Serialize};

/// Everything computed for one view over an audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvaluation {
    pub audit_id: String,
    /// Filter the evaluation was computed over
    pub filter: RecordFilter,
    pub score: ScoreReport,
    /// Findings in record order
    pub findings: Vec<Finding>,
    pub plan: RemediationPlan,
}

/// Audit id, catalog and engines for one operation.
#[derive(Debug)]
pub struct AuditContext {
    audit_id: String,
    catalog: Catalog,
    engine: RiskEngine,
    recommendations: RecommendationTexts,
    scorer: ComplianceScorer,
}

impl AuditContext {
    /// Build a context, compiling the risk tables.
    pub fn new(
        audit_id: impl Into<String>,
        catalog: Catalog,
        tables: &RiskTables,
        recommendations: RecommendationTexts,
    ) -> Result<Self> {
        Ok(Self {
            audit_id: audit_id.into(),
            catalog,
            engine: RiskEngine::new(tables)?,
            recommendations,
            scorer: ComplianceScorer::new(),
        })
    }

    /// Build a context from application configuration.
    pub fn from_config(
        audit_id: impl Into<String>,
        catalog: Catalog,
        config: &AppConfig,
    ) -> Result<Self> {
        Self::new(
            audit_id,
            catalog,
            &config.risk,
            config.recommendations.clone(),
        )
    }

    #[must_use]
    pub fn audit_id(&self) -> &str {
        &self.audit_id
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// Risk and recommendation of one record.
    #[must_use]
    pub fn finding(&self, record: &ResponseRecord) -> Finding {
        let catalog_text = self
            .catalog
            .get(&record.key())
            .and_then(|row| row.recommendation.as_deref());
        Finding {
            record: record.clone(),
            risk: self.engine.infer_record(record),
            recommendation: self.recommendations.resolve(record.level, catalog_text),
        }
    }

    /// Score, findings and plan of the view selected by `filter`.
    #[must_use]
    pub fn evaluate(&self, records: &[ResponseRecord], filter: &RecordFilter) -> AuditEvaluation {
        let view: Vec<ResponseRecord> = filter.apply(records).into_iter().cloned().collect();
        let score = self.scorer.score(&view);
        let findings: Vec<Finding> = view.iter().map(|r| self.finding(r)).collect();
        let plan = RemediationPlan::build(&findings, filter.open_only);
        tracing::info!(
            audit = %self.audit_id,
            records = view.len(),
            rate = ?score.metrics.rate,
            "evaluated audit"
        );
        AuditEvaluation {
            audit_id: self.audit_id.clone(),
            filter: filter.clone(),
            score,
            findings,
            plan,
        }
    }

    /// Seed the audit with skeleton records for every catalog row.
    pub fn seed(&self, store: &mut dyn ResponseStore, level: ComplianceLevel) -> Result<usize> {
        store.seed(&self.audit_id, &self.catalog.to_vec(), level)
    }

    /// Save one edit after resolving it against the catalog.
    pub fn save(
        &self,
        store: &mut dyn ResponseStore,
        upsert: ResponseUpsert,
    ) -> Result<ResponseRecord> {
        store.upsert(&self.audit_id, self.catalog.resolve(upsert))
    }

    /// Save many edits after resolving them against the catalog.
    pub fn save_all(
        &self,
        store: &mut dyn ResponseStore,
        upserts: Vec<ResponseUpsert>,
    ) -> Result<BatchSaveReport> {
        let resolved = upserts
            .into_iter()
            .map(|u| self.catalog.resolve(u))
            .collect();
        store.save_batch(&self.audit_id, resolved)
    }
}
