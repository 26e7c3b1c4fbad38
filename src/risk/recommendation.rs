//! Recommendation texts attached to findings.

use crate::model::ComplianceLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Level-derived recommendation texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RecommendationTexts {
    /// Used for non-compliant answers
    pub non_compliant: String,
    /// Used for partially-compliant answers
    pub partially_compliant: String,
    /// Used when no level text applies and the catalog has no recommendation
    pub maintain: String,
}

impl Default for RecommendationTexts {
    fn default() -> Self {
        Self {
            non_compliant: "Mettre en œuvre le contrôle requis et corriger la non-conformité."
                .to_string(),
            partially_compliant: "Compléter la mise en œuvre jusqu’à conformité totale."
                .to_string(),
            maintain: "Maintenir, mesurer et documenter la conformité.".to_string(),
        }
    }
}

impl RecommendationTexts {
    /// Resolve the recommendation for an answer.
    ///
    /// Open levels get their level text; otherwise the catalog text is used
    /// verbatim when non-blank, then the maintain text.
    #[must_use]
    pub fn resolve(&self, level: ComplianceLevel, catalog: Option<&str>) -> String {
        match level {
            ComplianceLevel::NonCompliant => self.non_compliant.clone(),
            ComplianceLevel::PartiallyCompliant => self.partially_compliant.clone(),
            ComplianceLevel::Compliant | ComplianceLevel::NotApplicable => catalog
                .filter(|text| !text.trim().is_empty())
                .map_or_else(|| self.maintain.clone(), str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_levels_use_level_text() {
        let texts = RecommendationTexts::default();
        assert_eq!(
            texts.resolve(ComplianceLevel::NonCompliant, Some("Activer le MFA")),
            texts.non_compliant
        );
        assert_eq!(
            texts.resolve(ComplianceLevel::PartiallyCompliant, None),
            texts.partially_compliant
        );
    }

    #[test]
    fn test_closed_levels_prefer_catalog_text() {
        let texts = RecommendationTexts::default();
        assert_eq!(
            texts.resolve(ComplianceLevel::Compliant, Some("Revue annuelle")),
            "Revue annuelle"
        );
        assert_eq!(
            texts.resolve(ComplianceLevel::NotApplicable, Some("   ")),
            texts.maintain
        );
        assert_eq!(texts.resolve(ComplianceLevel::Compliant, None), texts.maintain);
    }
}
