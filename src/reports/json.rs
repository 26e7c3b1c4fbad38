//! JSON report generator.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator, ReportSection};
use crate::context::AuditEvaluation;
use crate::model::AuditInfo;
use crate::risk::Finding;
use crate::scoring::{RecordFilter, ScoreReport};
use chrono::Utc;
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(
        &self,
        eval: &AuditEvaluation,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let plan = config.includes(ReportSection::Plan).then(|| JsonPlan {
            total_expected_loss: eval.plan.total_expected_loss,
            total_remediation_cost: eval.plan.total_remediation_cost,
            actions: config.limit(&eval.plan.actions),
        });

        let report = JsonAuditReport {
            metadata: JsonReportMetadata {
                tool: ToolInfo {
                    name: "audit-tools".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                generated_at: config
                    .metadata
                    .generated_at
                    .clone()
                    .unwrap_or_else(|| Utc::now().to_rfc3339()),
                title: config.title_or_default().to_string(),
                organisation: config.organisation.clone(),
                currency: config.currency.clone(),
                catalog_path: config.metadata.catalog_path.clone(),
                store_path: config.metadata.store_path.clone(),
                audit: config.metadata.audit.clone(),
            },
            audit_id: &eval.audit_id,
            filter: (!eval.filter.is_empty()).then_some(&eval.filter),
            score: config.includes(ReportSection::Score).then_some(&eval.score),
            findings: config
                .includes(ReportSection::Findings)
                .then(|| config.limit(&eval.findings)),
            plan,
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        json.map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

// JSON structures for serialization

#[derive(Serialize)]
struct JsonAuditReport<'a> {
    metadata: JsonReportMetadata,
    audit_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a RecordFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<&'a ScoreReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    findings: Option<&'a [Finding]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<JsonPlan<'a>>,
}

#[derive(Serialize)]
struct JsonReportMetadata {
    tool: ToolInfo,
    generated_at: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    organisation: Option<String>,
    currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audit: Option<AuditInfo>,
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct JsonPlan<'a> {
    total_expected_loss: f64,
    total_remediation_cost: f64,
    actions: &'a [Finding],
}
