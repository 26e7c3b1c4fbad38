//! Configuration validation for audit-tools.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{AppConfig, AuditConfig, OutputConfig, ReportSettings};
use crate::risk::{RecommendationTexts, RiskTables};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.audit.validate());
        errors.extend(self.risk.validate());
        errors.extend(self.recommendations.validate());
        errors.extend(self.report.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for AuditConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.default_audit.trim().is_empty() {
            errors.push(ConfigError::new(
                "audit.default_audit",
                "Default audit id must not be empty",
            ));
        }
        if let Some(rate) = self.min_rate {
            if rate > 100 {
                errors.push(ConfigError::new(
                    "audit.min_rate",
                    format!("Minimum rate must be between 0 and 100, got {rate}"),
                ));
            }
        }
        errors
    }
}

fn check_multiplier(errors: &mut Vec<ConfigError>, field: String, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(ConfigError::new(
            field,
            format!("Multiplier must be a non-negative number, got {value}"),
        ));
    }
}

fn check_weight(errors: &mut Vec<ConfigError>, field: String, value: f64) {
    if !(value > 0.0 && value <= 1.0) {
        errors.push(ConfigError::new(
            field,
            format!("Weight must be in (0.0, 1.0], got {value}"),
        ));
    }
}

impl Validatable for RiskTables {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (i, entry) in self.domain_tiers.iter().enumerate() {
            if entry.fragment.trim().is_empty() {
                errors.push(ConfigError::new(
                    format!("risk.domain_tiers[{i}].fragment"),
                    "Domain fragment must not be empty",
                ));
            }
            check_weight(&mut errors, format!("risk.domain_tiers[{i}].weight"), entry.weight);
        }
        check_weight(&mut errors, "risk.default_weight".to_string(), self.default_weight);

        for (i, keyword) in self.keywords.iter().enumerate() {
            if let Err(e) = regex::Regex::new(&keyword.pattern) {
                errors.push(ConfigError::new(
                    format!("risk.keywords[{i}].pattern"),
                    format!("Invalid regular expression '{}': {e}", keyword.pattern),
                ));
            }
            check_multiplier(&mut errors, format!("risk.keywords[{i}].loss_mul"), keyword.loss_mul);
            check_multiplier(&mut errors, format!("risk.keywords[{i}].cost_mul"), keyword.cost_mul);
        }

        for (i, state) in self.states.iter().enumerate() {
            if !(0.0..=1.0).contains(&state.probability) {
                errors.push(ConfigError::new(
                    format!("risk.states[{i}].probability"),
                    format!(
                        "Probability must be between 0.0 and 1.0, got {}",
                        state.probability
                    ),
                ));
            }
            check_multiplier(&mut errors, format!("risk.states[{i}].loss_mul"), state.loss_mul);
            check_multiplier(&mut errors, format!("risk.states[{i}].cost_mul"), state.cost_mul);
            if self.states[..i].iter().any(|s| s.level == state.level) {
                errors.push(ConfigError::new(
                    format!("risk.states[{i}].level"),
                    format!("Duplicate state for level '{}'", state.level),
                ));
            }
        }

        for (name, tier) in [
            ("high", self.financials.high),
            ("mid", self.financials.mid),
            ("low", self.financials.low),
        ] {
            for (field, value) in [("loss", tier.loss), ("cost", tier.cost)] {
                if !value.is_finite() || value < 0.0 {
                    errors.push(ConfigError::new(
                        format!("risk.financials.{name}.{field}"),
                        format!("Amount must be a non-negative number, got {value}"),
                    ));
                }
            }
        }

        errors
    }
}

impl Validatable for RecommendationTexts {
    fn validate(&self) -> Vec<ConfigError> {
        [
            ("non_compliant", &self.non_compliant),
            ("partially_compliant", &self.partially_compliant),
            ("maintain", &self.maintain),
        ]
        .into_iter()
        .filter(|(_, text)| text.trim().is_empty())
        .map(|(name, _)| {
            ConfigError::new(
                format!("recommendations.{name}"),
                "Recommendation text must not be empty",
            )
        })
        .collect()
    }
}

impl Validatable for ReportSettings {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.weak_domain_threshold > 100 {
            errors.push(ConfigError::new(
                "report.weak_domain_threshold",
                format!(
                    "Threshold must be between 0 and 100, got {}",
                    self.weak_domain_threshold
                ),
            ));
        }
        if self.max_items == Some(0) {
            errors.push(ConfigError::new(
                "report.max_items",
                "Max items must be at least 1",
            ));
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        // Validate output file path if specified
        if let Some(parent) = self.file.as_ref().and_then(|f| f.parent()) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                errors.push(ConfigError::new(
                    "output.file",
                    format!("Parent directory does not exist: {}", parent.display()),
                ));
            }
        }

        errors
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ComplianceLevel;
    use crate::risk::{KeywordWeight, StateEntry};

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.is_valid(), "{:?}", config.validate());
    }

    #[test]
    fn test_invalid_min_rate() {
        let config = AppConfig::builder().min_rate(Some(120)).build();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "audit.min_rate");
    }

    #[test]
    fn test_invalid_keyword_regex_is_reported() {
        let mut tables = RiskTables::default();
        tables.keywords.push(KeywordWeight {
            pattern: "(unclosed".to_string(),
            loss_mul: 1.1,
            cost_mul: -1.0,
        });
        let errors = tables.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["risk.keywords[8].pattern", "risk.keywords[8].cost_mul"]);
    }

    #[test]
    fn test_weights_and_probabilities() {
        let mut tables = RiskTables::default();
        tables.default_weight = 0.0;
        tables.domain_tiers[0].weight = 1.5;
        tables.states.push(StateEntry {
            level: ComplianceLevel::NonCompliant,
            probability: 1.2,
            ..StateEntry::PARTIAL_FALLBACK
        });
        let errors = tables.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"risk.default_weight"));
        assert!(fields.contains(&"risk.domain_tiers[0].weight"));
        assert!(fields.contains(&"risk.states[3].probability"));
        assert!(fields.contains(&"risk.states[3].level"));
    }

    #[test]
    fn test_negative_financials() {
        let mut tables = RiskTables::default();
        tables.financials.low.cost = -5.0;
        let errors = tables.validate();
        assert_eq!(errors[0].field, "risk.financials.low.cost");
    }

    #[test]
    fn test_blank_recommendation() {
        let texts = RecommendationTexts {
            maintain: "  ".to_string(),
            ..RecommendationTexts::default()
        };
        let errors = texts.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "recommendations.maintain: Recommendation text must not be empty");
    }
}
