//! Risk inference.
//!
//! Derives, per answer, a probability of failure, a loss estimate, a
//! remediation cost and a priority from three inputs:
//!
//! - the domain, classified into a tier by ordered name fragments
//! - the question text, scanned for keywords that compound loss and cost
//! - the compliance level, selecting a state (probability, multipliers, priority)
//!
//! Findings are then ordered into a remediation plan (most urgent first,
//! largest expected loss first within a priority).

mod engine;
mod plan;
mod recommendation;
mod tables;

pub use engine::{RiskEngine, RiskEstimate};
pub use plan::{order_plan, plan_order, Finding, RemediationPlan};
pub use recommendation::RecommendationTexts;
pub use tables::{
    BaseFinancials, DomainTierEntry, KeywordWeight, Priority, RiskTables, StateEntry, Tier,
    TierFinancials,
};
