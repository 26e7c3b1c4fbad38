//! Compliance levels and answer normalization.
//!
//! Questionnaire answers arrive as free text from spreadsheets and forms, in
//! French or English and in any case. [`ComplianceLevel::normalize`] maps any
//! such token onto one of the four canonical levels.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical compliance level of one questionnaire item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceLevel {
    /// Control fully implemented
    Compliant,
    /// Control partially implemented
    PartiallyCompliant,
    /// Control missing or ineffective
    NonCompliant,
    /// Control does not apply (also the fallback for unknown answers)
    #[default]
    NotApplicable,
}

impl ComplianceLevel {
    /// All levels in display order.
    pub const ALL: [Self; 4] = [
        Self::Compliant,
        Self::PartiallyCompliant,
        Self::NonCompliant,
        Self::NotApplicable,
    ];

    /// Normalize an arbitrary answer token.
    ///
    /// Matching ignores case, surrounding whitespace and repeated inner
    /// whitespace. Unknown and empty tokens map to
    /// [`ComplianceLevel::NotApplicable`] so that missing data never shows up
    /// as a low score.
    ///
    /// ```
    /// use audit_tools::model::ComplianceLevel;
    ///
    /// assert_eq!(ComplianceLevel::normalize("Partiellement conforme"), ComplianceLevel::PartiallyCompliant);
    /// assert_eq!(ComplianceLevel::normalize("  YES "), ComplianceLevel::Compliant);
    /// assert_eq!(ComplianceLevel::normalize("maybe"), ComplianceLevel::NotApplicable);
    /// ```
    #[must_use]
    pub fn normalize(token: &str) -> Self {
        let key = collapse_whitespace(&token.to_lowercase());
        match key.as_str() {
            "compliant" | "conforme" | "yes" | "oui" | "y" | "c" => Self::Compliant,
            "partially compliant"
            | "partially-compliant"
            | "partial"
            | "partiel"
            | "partielle"
            | "partiellement conforme"
            | "pc" => Self::PartiallyCompliant,
            "non compliant" | "non-compliant" | "not compliant" | "no" | "non"
            | "non conforme" | "non-conforme" | "nc" => Self::NonCompliant,
            _ => Self::NotApplicable,
        }
    }

    /// Numeric score, `None` for not-applicable.
    #[must_use]
    pub const fn score(self) -> Option<f64> {
        match self {
            Self::Compliant => Some(1.0),
            Self::PartiallyCompliant => Some(0.5),
            Self::NonCompliant => Some(0.0),
            Self::NotApplicable => None,
        }
    }

    /// Whether the level counts toward rate denominators.
    #[must_use]
    pub const fn is_applicable(self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    /// Whether the item still needs remediation work.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::PartiallyCompliant | Self::NonCompliant)
    }

    /// Stable machine name (matches the serde representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::PartiallyCompliant => "partially-compliant",
            Self::NonCompliant => "non-compliant",
            Self::NotApplicable => "not-applicable",
        }
    }

    /// Human-readable label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::PartiallyCompliant => "Partially compliant",
            Self::NonCompliant => "Non-compliant",
            Self::NotApplicable => "Not applicable",
        }
    }
}

impl fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ComplianceLevel {
    fn from(token: &str) -> Self {
        Self::normalize(token)
    }
}

// Deserialization goes through `normalize`, so stored or configured values
// in any accepted spelling load without error.
impl<'de> Deserialize<'de> for ComplianceLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::NotApplicable, Self::normalize))
    }
}

/// Lowercased text with runs of whitespace collapsed to a single space.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_french_variants() {
        assert_eq!(ComplianceLevel::normalize("conforme"), ComplianceLevel::Compliant);
        assert_eq!(
            ComplianceLevel::normalize("Partiellement  Conforme"),
            ComplianceLevel::PartiallyCompliant
        );
        assert_eq!(
            ComplianceLevel::normalize("NON CONFORME"),
            ComplianceLevel::NonCompliant
        );
        assert_eq!(
            ComplianceLevel::normalize("non applicable"),
            ComplianceLevel::NotApplicable
        );
    }

    #[test]
    fn test_normalize_english_variants() {
        assert_eq!(ComplianceLevel::normalize("Yes"), ComplianceLevel::Compliant);
        assert_eq!(
            ComplianceLevel::normalize("partial"),
            ComplianceLevel::PartiallyCompliant
        );
        assert_eq!(ComplianceLevel::normalize("No"), ComplianceLevel::NonCompliant);
        assert_eq!(ComplianceLevel::normalize("N/A"), ComplianceLevel::NotApplicable);
    }

    #[test]
    fn test_normalize_unknown_and_empty() {
        assert_eq!(ComplianceLevel::normalize(""), ComplianceLevel::NotApplicable);
        assert_eq!(ComplianceLevel::normalize("   "), ComplianceLevel::NotApplicable);
        assert_eq!(
            ComplianceLevel::normalize("to be checked"),
            ComplianceLevel::NotApplicable
        );
    }

    #[test]
    fn test_normalize_canonical_names_roundtrip() {
        for level in ComplianceLevel::ALL {
            assert_eq!(ComplianceLevel::normalize(level.as_str()), level);
        }
    }

    #[test]
    fn test_scores() {
        assert_eq!(ComplianceLevel::Compliant.score(), Some(1.0));
        assert_eq!(ComplianceLevel::PartiallyCompliant.score(), Some(0.5));
        assert_eq!(ComplianceLevel::NonCompliant.score(), Some(0.0));
        assert_eq!(ComplianceLevel::NotApplicable.score(), None);
    }

    #[test]
    fn test_deserialize_normalizes() {
        let level: ComplianceLevel = serde_json::from_str("\"Non conforme\"").unwrap();
        assert_eq!(level, ComplianceLevel::NonCompliant);
        let level: ComplianceLevel = serde_json::from_str("null").unwrap();
        assert_eq!(level, ComplianceLevel::NotApplicable);
    }

    #[test]
    fn test_open_levels() {
        assert!(ComplianceLevel::NonCompliant.is_open());
        assert!(ComplianceLevel::PartiallyCompliant.is_open());
        assert!(!ComplianceLevel::Compliant.is_open());
        assert!(!ComplianceLevel::NotApplicable.is_open());
    }
}
