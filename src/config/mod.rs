//! Configuration module for audit-tools.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use audit_tools::config::{load_or_default, AppConfig, Validatable};
//!
//! // Use builder
//! let config = AppConfig::builder()
//!     .default_audit("q3-2026")
//!     .min_rate(Some(70))
//!     .build();
//! assert!(config.is_valid());
//!
//! // Load from file
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.audit-tools.yaml` file in your project root or `~/.config/audit-tools/`:
//!
//! ```yaml
//! audit:
//!   default_audit: q3-2026
//!   min_rate: 70
//! risk:
//!   financials:
//!     high: { loss: 90000, cost: 20000 }
//! report:
//!   organisation: ACME
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    default_store_path, DEFAULT_AUDIT_ID, DEFAULT_CURRENCY, DEFAULT_REPORT_TITLE,
    DEFAULT_STORE_FILE, DEFAULT_WEAK_DOMAIN_THRESHOLD,
};
pub use types::{AppConfig, AppConfigBuilder, AuditConfig, OutputConfig, ReportSettings, StoreConfig};
pub use validation::{ConfigError, Validatable};

// Re-export file utilities
pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.audit-tools.yaml` config files. It can be used by editors for
/// validation and autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
