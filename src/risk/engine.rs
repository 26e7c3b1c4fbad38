//! Risk inference engine.

use crate::error::{AuditError, Result};
use crate::model::{collapse_whitespace, ComplianceLevel, ResponseRecord};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::tables::{BaseFinancials, Priority, RiskTables, StateEntry, Tier};

/// Risk estimate of one record. Computed on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskEstimate {
    pub tier: Tier,
    /// Domain probability weight applied to the state probability
    pub weight: f64,
    /// Probability of failure in `[0, 1]`
    pub probability: f64,
    pub loss_estimate: f64,
    pub remediation_cost: f64,
    /// `probability * loss_estimate`
    pub expected_loss: f64,
    pub priority: Priority,
}

struct CompiledKeyword {
    regex: Regex,
    loss_mul: f64,
    cost_mul: f64,
}

/// Risk engine compiled from [`RiskTables`].
///
/// Construction validates and compiles every keyword pattern, so inference
/// itself cannot fail.
pub struct RiskEngine {
    domain_tiers: Vec<(String, Tier, f64)>,
    default_tier: Tier,
    default_weight: f64,
    keywords: Vec<CompiledKeyword>,
    states: Vec<StateEntry>,
    fallback_state: StateEntry,
    financials: BaseFinancials,
}

impl RiskEngine {
    /// Compile an engine from reference tables.
    pub fn new(tables: &RiskTables) -> Result<Self> {
        let keywords = tables
            .keywords
            .iter()
            .map(|kw| {
                Regex::new(&kw.pattern)
                    .map(|regex| CompiledKeyword {
                        regex,
                        loss_mul: kw.loss_mul,
                        cost_mul: kw.cost_mul,
                    })
                    .map_err(|e| {
                        AuditError::config(format!("invalid keyword regex '{}': {e}", kw.pattern))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let domain_tiers = tables
            .domain_tiers
            .iter()
            .map(|entry| {
                (
                    collapse_whitespace(&entry.fragment.to_lowercase()),
                    entry.tier,
                    entry.weight,
                )
            })
            .filter(|(fragment, _, _)| !fragment.is_empty())
            .collect();

        let fallback_state = tables
            .states
            .iter()
            .find(|s| s.level == ComplianceLevel::PartiallyCompliant)
            .copied()
            .unwrap_or(StateEntry::PARTIAL_FALLBACK);

        tracing::debug!(
            tiers = tables.domain_tiers.len(),
            keywords = tables.keywords.len(),
            "compiled risk engine"
        );

        Ok(Self {
            domain_tiers,
            default_tier: tables.default_tier,
            default_weight: tables.default_weight,
            keywords,
            states: tables.states.clone(),
            fallback_state,
            financials: tables.financials,
        })
    }

    /// Tier and weight of a domain: the first fragment contained in the
    /// normalized domain name, or the defaults.
    #[must_use]
    pub fn classify_domain(&self, domain: &str) -> (Tier, f64) {
        let normalized = collapse_whitespace(&domain.to_lowercase());
        self.domain_tiers
            .iter()
            .find(|(fragment, _, _)| normalized.contains(fragment.as_str()))
            .map_or((self.default_tier, self.default_weight), |(_, tier, weight)| {
                (*tier, *weight)
            })
    }

    /// Compounded `(loss, cost)` multipliers of every keyword matching the question.
    #[must_use]
    pub fn keyword_multipliers(&self, question: &str) -> (f64, f64) {
        let normalized = collapse_whitespace(&question.to_lowercase());
        self.keywords
            .iter()
            .filter(|kw| kw.regex.is_match(&normalized))
            .fold((1.0, 1.0), |(loss, cost), kw| {
                (loss * kw.loss_mul, cost * kw.cost_mul)
            })
    }

    /// State entry of a level, falling back to the partially-compliant entry.
    #[must_use]
    pub fn state(&self, level: ComplianceLevel) -> StateEntry {
        self.states
            .iter()
            .find(|s| s.level == level)
            .copied()
            .unwrap_or(self.fallback_state)
    }

    /// Infer the risk of one answer.
    #[must_use]
    pub fn infer(&self, domain: &str, question: &str, level: ComplianceLevel) -> RiskEstimate {
        let (tier, weight) = self.classify_domain(domain);
        let base = self.financials.for_tier(tier);
        let (kw_loss, kw_cost) = self.keyword_multipliers(question);
        let state = self.state(level);

        let probability = state.probability * weight;
        let loss_estimate = base.loss * kw_loss * state.loss_mul;
        let remediation_cost = base.cost * kw_cost * state.cost_mul;

        RiskEstimate {
            tier,
            weight,
            probability,
            loss_estimate,
            remediation_cost,
            expected_loss: probability * loss_estimate,
            priority: state.priority,
        }
    }

    /// Infer the risk of a stored record.
    #[must_use]
    pub fn infer_record(&self, record: &ResponseRecord) -> RiskEstimate {
        self.infer(&record.domain, &record.question, record.level)
    }
}

impl std::fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEngine")
            .field("domain_tiers", &self.domain_tiers.len())
            .field("keywords", &self.keywords.len())
            .field("states", &self.states.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::tables::KeywordWeight;

    fn engine() -> RiskEngine {
        RiskEngine::new(&RiskTables::default()).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_security_mfa_non_compliant() {
        let risk = engine().infer("Sécurité", "MFA", ComplianceLevel::NonCompliant);
        assert_eq!(risk.tier, Tier::High);
        assert!(approx(risk.probability, 0.40));
        assert!(approx(risk.loss_estimate, 91_000.0));
        assert!(approx(risk.remediation_cost, 20_400.0));
        assert!(approx(risk.expected_loss, 36_400.0));
        assert_eq!(risk.priority, Priority::High);
    }

    #[test]
    fn test_specific_fragment_wins_over_generic() {
        let engine = engine();
        assert_eq!(
            engine.classify_domain("Politiques de sécurité"),
            (Tier::Mid, 0.70)
        );
        assert_eq!(
            engine.classify_domain("Sécurité   Communications"),
            (Tier::High, 0.95)
        );
        assert_eq!(engine.classify_domain("Contrôle d'accès"), (Tier::High, 1.00));
        assert_eq!(engine.classify_domain("Contrôle d’accès"), (Tier::High, 1.00));
    }

    #[test]
    fn test_unknown_domain_uses_defaults() {
        assert_eq!(engine().classify_domain("Achats"), (Tier::Mid, 0.70));
        assert_eq!(engine().classify_domain(""), (Tier::Mid, 0.70));
    }

    #[test]
    fn test_keywords_compound() {
        let (loss, cost) = engine().keyword_multipliers("Chiffrement TLS et sauvegarde des données");
        assert!(approx(loss, 1.25 * 1.20));
        assert!(approx(cost, 1.20 * 1.15));
    }

    #[test]
    fn test_keywords_match_inflected_forms() {
        let e = engine();
        for (question, loss) in [
            ("Sauvegardes restaurées chaque trimestre ?", 1.20),
            ("Chiffrement des postes ?", 1.25),
            ("Authentification multifacteur ?", 1.30),
            ("Revue des privilèges ?", 1.20),
            ("Fournisseurs critiques évalués ?", 1.15),
        ] {
            let (got, _) = e.keyword_multipliers(question);
            assert!(approx(got, loss), "{question}: {got}");
        }
        let (loss, cost) = e.keyword_multipliers("Charte informatique signée ?");
        assert!(approx(loss, 1.0) && approx(cost, 1.0));
    }

    #[test]
    fn test_empty_inputs_use_defaults() {
        let risk = engine().infer("", "", ComplianceLevel::NotApplicable);
        assert_eq!(risk.tier, Tier::Mid);
        assert!(approx(risk.probability, 0.22 * 0.70));
        assert!(approx(risk.loss_estimate, 40_000.0 * 0.75));
        assert_eq!(risk.priority, Priority::Medium);
    }

    #[test]
    fn test_deterministic() {
        let engine = engine();
        let a = engine.infer("Opérations", "Patch management", ComplianceLevel::PartiallyCompliant);
        let b = engine.infer("Opérations", "Patch management", ComplianceLevel::PartiallyCompliant);
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_keyword_is_config_error() {
        let mut tables = RiskTables::default();
        tables.keywords.push(KeywordWeight {
            pattern: "(unclosed".into(),
            loss_mul: 1.0,
            cost_mul: 1.0,
        });
        let err = RiskEngine::new(&tables).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }

    #[test]
    fn test_missing_partial_state_uses_builtin_fallback() {
        let mut tables = RiskTables::default();
        tables
            .states
            .retain(|s| s.level != ComplianceLevel::PartiallyCompliant);
        let engine = RiskEngine::new(&tables).unwrap();
        let state = engine.state(ComplianceLevel::NotApplicable);
        assert_eq!(state, StateEntry::PARTIAL_FALLBACK);
    }
}
