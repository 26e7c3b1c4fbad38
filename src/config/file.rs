//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::defaults::{
    DEFAULT_AUDIT_ID, DEFAULT_CURRENCY, DEFAULT_REPORT_TITLE, DEFAULT_WEAK_DOMAIN_THRESHOLD,
};
use super::types::AppConfig;
use crate::model::ComplianceLevel;
use crate::reports::ReportFormat;
use crate::risk::{RecommendationTexts, RiskTables};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".audit-tools.yaml",
    ".audit-tools.yml",
    "audit-tools.yaml",
    "audit-tools.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/audit-tools/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // 1. Use explicit path if provided
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // 2. Search current directory
    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    // 3. Search git root (if in a repo)
    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    // 4. Search user config directory
    if let Some(path) =
        dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("audit-tools")))
    {
        return Some(path);
    }

    // 5. Search home directory
    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    // An empty file is a valid, all-defaults config.
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only values that differ from their defaults are taken from `other`,
    /// which makes this suitable for layering CLI args over file config.
    pub fn merge(&mut self, other: &Self) {
        // Audit config
        if other.audit.default_audit != DEFAULT_AUDIT_ID {
            self.audit.default_audit.clone_from(&other.audit.default_audit);
        }
        if other.audit.seed_level != ComplianceLevel::NotApplicable {
            self.audit.seed_level = other.audit.seed_level;
        }
        if other.audit.min_rate.is_some() {
            self.audit.min_rate = other.audit.min_rate;
        }

        // Reference tables are replaced wholesale
        if other.risk != RiskTables::default() {
            self.risk = other.risk.clone();
        }
        if other.recommendations != RecommendationTexts::default() {
            self.recommendations = other.recommendations.clone();
        }

        // Report settings
        if other.report.title != DEFAULT_REPORT_TITLE {
            self.report.title.clone_from(&other.report.title);
        }
        if other.report.organisation.is_some() {
            self.report.organisation.clone_from(&other.report.organisation);
        }
        if other.report.currency != DEFAULT_CURRENCY {
            self.report.currency.clone_from(&other.report.currency);
        }
        if other.report.weak_domain_threshold != DEFAULT_WEAK_DOMAIN_THRESHOLD {
            self.report.weak_domain_threshold = other.report.weak_domain_threshold;
        }
        if other.report.max_items.is_some() {
            self.report.max_items = other.report.max_items;
        }

        // Store config
        if other.store.path.is_some() {
            self.store.path.clone_from(&other.store.path);
        }

        // Output config - only override if explicitly set
        if other.output.format != ReportFormat::Summary {
            self.output.format = other.output.format;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
        if other.output.no_color {
            self.output.no_color = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# audit-tools configuration
# Place this file at .audit-tools.yaml in your project root or ~/.config/audit-tools/

{}
",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with the most common options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# audit-tools Configuration File
# ==============================
#
# Place it at:
#   - .audit-tools.yaml in your project root
#   - ~/.config/audit-tools/audit-tools.yaml for global config
#
# CLI arguments always override file settings.

# Audit defaults
audit:
  # Audit used when --audit is not given
  default_audit: default
  # Level of records created when a catalog is loaded:
  # compliant, partially-compliant, non-compliant, not-applicable
  seed_level: not-applicable
  # Minimum compliance rate (0-100); `score` exits with 1 below it
  # min_rate: 70

# Risk reference tables. Omitted keys keep the built-in values;
# a list given here replaces the built-in list entirely.
risk:
  # Ordered domain fragments; the first fragment contained in the
  # lowercase domain name wins
  # domain_tiers:
  #   - { fragment: 'sécurité', tier: high, weight: 1.0 }
  #   - { fragment: 'ressources humaines', tier: low, weight: 0.5 }
  default_tier: mid
  default_weight: 0.7
  # Keyword regexes over the lowercase question; all matches compound
  # keywords:
  #   - { pattern: '\b(mfa|2fa)\b', loss_mul: 1.3, cost_mul: 1.2 }
  financials:
    high: { loss: 70000, cost: 17000 }
    mid: { loss: 40000, cost: 10000 }
    low: { loss: 22000, cost: 6000 }

# Recommendation texts by level (catalog recommendations take precedence
# for compliant and not-applicable items)
# recommendations:
#   non_compliant: 'Mettre en place le contrôle.'
#   partially_compliant: 'Compléter la mise en œuvre.'
#   maintain: 'Maintenir et surveiller.'

# Report settings
report:
  title: Compliance Audit Report
  # organisation: ACME
  currency: '€'
  # Domains under this rate are listed as weakest
  weak_domain_threshold: 50
  # Maximum rows in findings and plan sections
  # max_items: 25

# Response store (defaults to the user data directory)
# store:
#   path: ./responses.json

# Output configuration
output:
  # Format: summary, table, json, csv, markdown, html
  format: summary
  # Output file path (omit for stdout)
  # file: report.html
  # Disable colored output
  no_color: false
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
