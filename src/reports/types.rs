//! Report type definitions.

use crate::model::AuditInfo;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Brief summary output
    #[default]
    Summary,
    /// Compact table for terminal (colored)
    Table,
    /// Structured JSON output
    Json,
    /// CSV for spreadsheet import
    Csv,
    /// Human-readable Markdown
    #[value(alias = "md")]
    Markdown,
    /// Self-contained HTML report
    Html,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Markdown => write!(f, "markdown"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// Sections a report can contain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportSection {
    /// All sections
    #[default]
    All,
    /// Compliance rate and per-domain scores
    Score,
    /// Per-record risk findings
    Findings,
    /// Ordered remediation plan
    Plan,
}

/// Configuration for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Which sections to include
    pub sections: Vec<ReportSection>,
    /// Maximum rows per findings / plan section
    pub max_items: Option<usize>,
    /// Title for the report
    pub title: Option<String>,
    /// Audited organisation, shown under the title
    pub organisation: Option<String>,
    /// Currency suffix for amounts
    pub currency: String,
    /// Domains under this rate are listed as weakest
    pub weak_domain_threshold: u32,
    /// Additional metadata to include
    pub metadata: ReportMetadata,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sections: vec![ReportSection::All],
            max_items: None,
            title: None,
            organisation: None,
            currency: "€".to_string(),
            weak_domain_threshold: 50,
            metadata: ReportMetadata::default(),
        }
    }
}

impl ReportConfig {
    /// Create a config for all sections
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a config for specific sections
    #[must_use]
    pub fn with_sections(sections: Vec<ReportSection>) -> Self {
        Self {
            sections,
            ..Default::default()
        }
    }

    /// Check if a section should be included
    #[must_use]
    pub fn includes(&self, section: ReportSection) -> bool {
        self.sections.contains(&ReportSection::All) || self.sections.contains(&section)
    }

    /// Report title, falling back to a generic one
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Compliance Audit Report")
    }

    /// Truncate a slice to `max_items`
    #[must_use]
    pub fn limit<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        match self.max_items {
            Some(max) if max < items.len() => &items[..max],
            _ => items,
        }
    }
}

/// Metadata included in reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Catalog file the audit was evaluated against
    pub catalog_path: Option<String>,
    /// Response store the records came from
    pub store_path: Option<String>,
    /// Tool version
    pub tool_version: String,
    /// Generation timestamp
    pub generated_at: Option<String>,
    /// Project, client and standard of the audit
    pub audit: Option<AuditInfo>,
}

impl ReportMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Some(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
    }
}
