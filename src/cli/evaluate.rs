//! Evaluation command handlers.
//!
//! Implements `score`, `plan` and `report`, which share one evaluation of
//! an audit view and differ only in the report sections they render.

use crate::config::AppConfig;
use crate::context::AuditEvaluation;
use crate::pipeline::{
    build_context, exit_codes, open_store, output_evaluation, report_config, resolve_store_path,
    CatalogSource, OutputTarget,
};
use crate::reports::{ReportMetadata, ReportSection};
use crate::scoring::{format_rate, RecordFilter};
use crate::store::ResponseStore;
use anyhow::Result;

/// Audit view selected on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluateArgs {
    pub audit_id: String,
    pub filter: RecordFilter,
    pub catalog: CatalogSource,
}

/// Run the score command.
///
/// Exits with [`exit_codes::BELOW_THRESHOLD`] when a minimum rate is set
/// (flag or config) and the view does not reach it. A view without
/// applicable records has no rate and never reaches a minimum.
pub fn run_score(config: &AppConfig, args: &EvaluateArgs, min_rate: Option<u32>) -> Result<i32> {
    let (eval, metadata) = evaluate(config, args)?;
    render(config, &eval, vec![ReportSection::Score], metadata)?;

    let Some(min) = min_rate.or(config.audit.min_rate) else {
        return Ok(exit_codes::SUCCESS);
    };
    if meets_minimum(eval.score.metrics.rate, min) {
        Ok(exit_codes::SUCCESS)
    } else {
        tracing::warn!(
            "Compliance rate {} is below the required {}%",
            format_rate(eval.score.metrics.rate),
            min
        );
        Ok(exit_codes::BELOW_THRESHOLD)
    }
}

/// Run the plan command.
pub fn run_plan(config: &AppConfig, args: &EvaluateArgs) -> Result<i32> {
    let (eval, metadata) = evaluate(config, args)?;
    render(config, &eval, vec![ReportSection::Plan], metadata)?;
    Ok(exit_codes::SUCCESS)
}

/// Run the report command.
pub fn run_report(
    config: &AppConfig,
    args: &EvaluateArgs,
    sections: Vec<ReportSection>,
) -> Result<i32> {
    let (eval, metadata) = evaluate(config, args)?;
    let sections = if sections.is_empty() {
        vec![ReportSection::All]
    } else {
        sections
    };
    render(config, &eval, sections, metadata)?;
    Ok(exit_codes::SUCCESS)
}

fn evaluate(config: &AppConfig, args: &EvaluateArgs) -> Result<(AuditEvaluation, ReportMetadata)> {
    let store = open_store(config)?;
    let catalog = args.catalog.load(&store)?;
    let ctx = build_context(&args.audit_id, catalog, config)?;

    let records = store.list(&args.audit_id)?;
    if records.is_empty() {
        tracing::warn!("Audit '{}' has no records", args.audit_id);
    }
    let eval = ctx.evaluate(&records, &args.filter);

    let metadata = ReportMetadata {
        catalog_path: args.catalog.describe(),
        store_path: Some(resolve_store_path(config).display().to_string()),
        audit: store.audit_info(&args.audit_id)?,
        ..ReportMetadata::new()
    };
    Ok((eval, metadata))
}

fn render(
    config: &AppConfig,
    eval: &AuditEvaluation,
    sections: Vec<ReportSection>,
    metadata: ReportMetadata,
) -> Result<()> {
    let report_config = report_config(&config.report, sections, metadata);
    let target = OutputTarget::from_option(config.output.file.clone());
    output_evaluation(
        eval,
        config.output.format,
        &report_config,
        &target,
        config.output.no_color,
    )
}

fn meets_minimum(rate: Option<u32>, min: u32) -> bool {
    rate.is_some_and(|rate| rate >= min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_minimum() {
        assert!(meets_minimum(Some(70), 70));
        assert!(!meets_minimum(Some(69), 70));
        assert!(!meets_minimum(None, 0));
    }
}
