//! Configuration types for audit-tools operations.
//!
//! Provides structured configuration for scoring, risk inference, report
//! rendering and response storage.

use crate::model::ComplianceLevel;
use crate::reports::ReportFormat;
use crate::risk::{RecommendationTexts, RiskTables};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_AUDIT_ID, DEFAULT_CURRENCY, DEFAULT_REPORT_TITLE, DEFAULT_WEAK_DOMAIN_THRESHOLD,
};

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// This is the top-level configuration struct that aggregates all configuration
/// options. It can be constructed from CLI arguments, config files, or both
/// (with CLI overriding file settings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Audit defaults (id, seed level, rate gate)
    pub audit: AuditConfig,
    /// Risk reference tables (domain tiers, keywords, states, financials)
    pub risk: RiskTables,
    /// Level-derived recommendation texts
    pub recommendations: RecommendationTexts,
    /// Report rendering settings
    pub report: ReportSettings,
    /// Response store location
    pub store: StoreConfig,
    /// Output configuration (format, file, colors)
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the audit used when none is given.
    pub fn default_audit(mut self, audit_id: impl Into<String>) -> Self {
        self.config.audit.default_audit = audit_id.into();
        self
    }

    /// Set the level of records seeded from a catalog.
    pub const fn seed_level(mut self, level: ComplianceLevel) -> Self {
        self.config.audit.seed_level = level;
        self
    }

    /// Set the minimum acceptable compliance rate.
    pub const fn min_rate(mut self, min_rate: Option<u32>) -> Self {
        self.config.audit.min_rate = min_rate;
        self
    }

    /// Replace the risk tables.
    pub fn risk_tables(mut self, tables: RiskTables) -> Self {
        self.config.risk = tables;
        self
    }

    /// Set the report title.
    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.config.report.title = title.into();
        self
    }

    /// Set the currency suffix used for amounts.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.config.report.currency = currency.into();
        self
    }

    /// Set the response store path.
    pub fn store_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.store.path = path;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Disable colored output.
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section Configurations
// ============================================================================

/// Audit defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AuditConfig {
    /// Audit id used when a command is given none
    pub default_audit: String,
    /// Level given to skeleton records when a catalog is loaded
    pub seed_level: ComplianceLevel,
    /// Minimum compliance rate (0-100); `score` exits with 1 below it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rate: Option<u32>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_audit: DEFAULT_AUDIT_ID.to_string(),
            seed_level: ComplianceLevel::NotApplicable,
            min_rate: None,
        }
    }
}

/// Report rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReportSettings {
    /// Report title
    pub title: String,
    /// Audited organisation, shown under the title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organisation: Option<String>,
    /// Currency suffix for amounts
    pub currency: String,
    /// Domains under this rate are listed as weakest
    pub weak_domain_threshold: u32,
    /// Maximum rows in findings and plan sections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
            organisation: None,
            currency: DEFAULT_CURRENCY.to_string(),
            weak_domain_threshold: DEFAULT_WEAK_DOMAIN_THRESHOLD,
            max_items: None,
        }
    }
}

/// Response store location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StoreConfig {
    /// Store file; the user data directory is used when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Output-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Disable colored output
    pub no_color: bool,
}
