//! Risk reference tables.
//!
//! Every table is plain configuration data and can be overridden from the
//! `risk` section of a config file. [`RiskEngine`](super::RiskEngine)
//! compiles them once before inference.

use crate::model::ComplianceLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Criticality tier of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Mid,
    Low,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Mid => write!(f, "mid"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Remediation priority, ranked High (most urgent) to Info.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "haute")]
    High,
    #[serde(alias = "moyenne")]
    Medium,
    #[serde(alias = "basse")]
    Low,
    Info,
}

impl Priority {
    /// Sort rank; lower is more urgent.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
            Self::Info => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Info => "Info",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain fragment mapped to a tier and probability weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DomainTierEntry {
    /// Lowercase fragment searched for in the normalized domain name
    pub fragment: String,
    pub tier: Tier,
    /// Probability weight in `(0, 1]`
    pub weight: f64,
}

impl DomainTierEntry {
    fn new(fragment: &str, tier: Tier, weight: f64) -> Self {
        Self {
            fragment: fragment.to_string(),
            tier,
            weight,
        }
    }
}

/// Keyword pattern compounding loss and cost when it matches the question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordWeight {
    /// Regular expression applied to the normalized (lowercase) question text
    pub pattern: String,
    pub loss_mul: f64,
    pub cost_mul: f64,
}

impl KeywordWeight {
    fn new(pattern: &str, loss_mul: f64, cost_mul: f64) -> Self {
        Self {
            pattern: pattern.to_string(),
            loss_mul,
            cost_mul,
        }
    }
}

/// Probability, multipliers and priority attached to a compliance level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StateEntry {
    pub level: ComplianceLevel,
    pub probability: f64,
    pub loss_mul: f64,
    pub cost_mul: f64,
    pub priority: Priority,
}

impl StateEntry {
    /// Entry used when no configured entry exists for a level.
    pub const PARTIAL_FALLBACK: Self = Self {
        level: ComplianceLevel::PartiallyCompliant,
        probability: 0.22,
        loss_mul: 0.75,
        cost_mul: 0.75,
        priority: Priority::Medium,
    };
}

/// Base loss and remediation cost of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TierFinancials {
    pub loss: f64,
    pub cost: f64,
}

/// Base financials for every tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BaseFinancials {
    pub high: TierFinancials,
    pub mid: TierFinancials,
    pub low: TierFinancials,
}

impl BaseFinancials {
    #[must_use]
    pub const fn for_tier(&self, tier: Tier) -> TierFinancials {
        match tier {
            Tier::High => self.high,
            Tier::Mid => self.mid,
            Tier::Low => self.low,
        }
    }
}

impl Default for BaseFinancials {
    fn default() -> Self {
        Self {
            high: TierFinancials {
                loss: 70_000.0,
                cost: 17_000.0,
            },
            mid: TierFinancials {
                loss: 40_000.0,
                cost: 10_000.0,
            },
            low: TierFinancials {
                loss: 22_000.0,
                cost: 6_000.0,
            },
        }
    }
}

/// All reference tables used by risk inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RiskTables {
    /// Ordered domain fragments; the first contained fragment wins
    pub domain_tiers: Vec<DomainTierEntry>,
    /// Tier used when no fragment matches
    pub default_tier: Tier,
    /// Weight used when no fragment matches
    pub default_weight: f64,
    /// Keyword multipliers; all matching patterns compound
    pub keywords: Vec<KeywordWeight>,
    /// Per-level state; levels without an entry use the partially-compliant one
    pub states: Vec<StateEntry>,
    pub financials: BaseFinancials,
}

impl Default for RiskTables {
    fn default() -> Self {
        Self {
            domain_tiers: vec![
                DomainTierEntry::new("sécurité modèle/données", Tier::High, 1.00),
                DomainTierEntry::new("sécurité communications", Tier::High, 0.95),
                DomainTierEntry::new("politiques de sécurité", Tier::Mid, 0.70),
                DomainTierEntry::new("contrôle d’accès", Tier::High, 1.00),
                DomainTierEntry::new("contrôle d'accès", Tier::High, 1.00),
                DomainTierEntry::new("gouvernance ia", Tier::High, 0.95),
                DomainTierEntry::new("gestion des risques ia", Tier::Mid, 0.75),
                DomainTierEntry::new("conformité & éthique", Tier::Mid, 0.75),
                DomainTierEntry::new("sécurité", Tier::High, 1.00),
                DomainTierEntry::new("opérations", Tier::High, 0.90),
                DomainTierEntry::new("organisation", Tier::Mid, 0.70),
                DomainTierEntry::new("ressources humaines", Tier::Low, 0.50),
            ],
            default_tier: Tier::Mid,
            default_weight: 0.70,
            keywords: vec![
                KeywordWeight::new(r"\b(mfa|2fa|multi-?factor\w*|multifacteur\w*)\b", 1.30, 1.20),
                KeywordWeight::new(r"\b(chiffr\w*|encrypt\w*|crypto\w*|tls|ssl)\b", 1.25, 1.20),
                KeywordWeight::new(r"\b(sauvegard\w*|backups?|restor\w*|restaur\w*)\b", 1.20, 1.15),
                KeywordWeight::new(
                    r"\b(pare-?feux?|firewalls?|segment\w*|ids|ips)\b",
                    1.20,
                    1.15,
                ),
                KeywordWeight::new(r"\b(vuln\w*|patch\w*|correctif\w*|cve)\b", 1.20, 1.15),
                KeywordWeight::new(
                    r"\b(journal\w*|logs?|logging|siem|détect\w*|detect\w*)\b",
                    1.15,
                    1.10,
                ),
                KeywordWeight::new(r"\b(acc[eè]s|access\w*|privil[eè]g\w*|iam)\b", 1.20, 1.15),
                KeywordWeight::new(
                    r"\b(fournisseurs?|tiers|vendors?|third[- ]part\w*)\b",
                    1.15,
                    1.10,
                ),
            ],
            states: vec![
                StateEntry {
                    level: ComplianceLevel::NonCompliant,
                    probability: 0.40,
                    loss_mul: 1.00,
                    cost_mul: 1.00,
                    priority: Priority::High,
                },
                StateEntry::PARTIAL_FALLBACK,
                StateEntry {
                    level: ComplianceLevel::Compliant,
                    probability: 0.05,
                    loss_mul: 0.20,
                    cost_mul: 0.30,
                    priority: Priority::Info,
                },
            ],
            financials: BaseFinancials::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_order() {
        let mut prios = vec![Priority::Info, Priority::Low, Priority::High, Priority::Medium];
        prios.sort_by_key(|p| p.rank());
        assert_eq!(
            prios,
            vec![Priority::High, Priority::Medium, Priority::Low, Priority::Info]
        );
    }

    #[test]
    fn test_priority_accepts_french_aliases() {
        let p: Priority = serde_yaml::from_str("haute").unwrap();
        assert_eq!(p, Priority::High);
        let p: Priority = serde_yaml::from_str("moyenne").unwrap();
        assert_eq!(p, Priority::Medium);
    }

    #[test]
    fn test_default_tables_have_partial_state() {
        let tables = RiskTables::default();
        assert!(tables
            .states
            .iter()
            .any(|s| s.level == ComplianceLevel::PartiallyCompliant));
        assert_eq!(tables.financials.for_tier(Tier::High).loss, 70_000.0);
    }

    #[test]
    fn test_partial_yaml_override_keeps_defaults() {
        let yaml = "default_weight: 0.6\nfinancials:\n  low:\n    loss: 1000\n    cost: 100\n";
        let tables: RiskTables = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(tables.default_weight, 0.6);
        assert_eq!(tables.financials.low.loss, 1000.0);
        assert_eq!(tables.financials.high.loss, 70_000.0);
        assert_eq!(tables.domain_tiers.len(), RiskTables::default().domain_tiers.len());
    }
}
