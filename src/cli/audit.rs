//! Audit editing command handlers.
//!
//! Implements `init`, `import`, `set`, `attach`/`detach`, `list` and `delete`.

use crate::catalog::load_answers;
use crate::config::AppConfig;
use crate::model::{AuditInfo, ComplianceLevel, ResponseRecord};
use crate::pipeline::{build_context, exit_codes, open_store, write_output, CatalogSource, OutputTarget};
use crate::store::{AuditSummary, NormLibrary, ResponseStore, ResponseUpsert};
use anyhow::{bail, Context, Result};
use std::fmt::Write as _;
use std::path::Path;

/// A single edit from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetArgs {
    pub qid: String,
    /// Defaults to the qid
    pub item: Option<String>,
    /// Needed only for records unknown to both the catalog and the store
    pub domain: Option<String>,
    pub question: Option<String>,
    pub level: ComplianceLevel,
    /// Keeps the stored comment when omitted
    pub comment: Option<String>,
    /// Replaces the stored evidence when given
    pub evidence: Option<Vec<String>>,
}

/// Run the init command: seed an audit with one record per catalog row.
///
/// `info` is merged into the audit metadata; its standard defaults to the
/// norm the catalog is saved as or loaded from.
pub fn run_init(
    config: &AppConfig,
    audit_id: &str,
    source: &CatalogSource,
    level: Option<ComplianceLevel>,
    save_as: Option<&str>,
    mut info: AuditInfo,
) -> Result<i32> {
    if source.is_empty() {
        bail!("A catalog is required: pass --catalog FILE or --norm NAME");
    }
    let mut store = open_store(config)?;
    let catalog = source.load(&store)?;
    if catalog.is_empty() {
        bail!(
            "Catalog {} has no rows",
            source.describe().unwrap_or_default()
        );
    }

    if let Some(name) = save_as {
        let info = store.save_norm(name, catalog.to_vec())?;
        tracing::info!("Saved norm '{}' ({} rows)", info.name, info.rows);
    }

    let ctx = build_context(audit_id, catalog, config)?;
    let level = level.unwrap_or(config.audit.seed_level);
    let created = ctx.seed(&mut store, level)?;

    if info.standard.is_none() {
        info.standard = save_as.or(source.norm.as_deref()).map(str::to_string);
    }
    let info = store.set_audit_info(audit_id, info)?;
    if let Some(standard) = info.standard_label() {
        tracing::info!("Audit '{}' follows {}", audit_id, standard);
    }
    tracing::info!(
        "Seeded {} new record(s) in audit '{}' from {} catalog row(s) ({})",
        created,
        audit_id,
        ctx.catalog().len(),
        level.label()
    );
    Ok(exit_codes::SUCCESS)
}

/// Run the import command: save an answer sheet as one batch.
///
/// Returns [`exit_codes::PARTIAL_FAILURE`] when any row was rejected; the
/// valid rows are saved regardless.
pub fn run_import(
    config: &AppConfig,
    audit_id: &str,
    answers: &Path,
    source: &CatalogSource,
) -> Result<i32> {
    let mut store = open_store(config)?;
    let catalog = source.load(&store)?;
    let ctx = build_context(audit_id, catalog, config)?;

    let upserts = load_answers(answers)
        .with_context(|| format!("Failed to load answers: {}", answers.display()))?;
    let report = ctx.save_all(&mut store, upserts)?;

    if report.is_complete() {
        tracing::info!("Imported {} record(s) into '{}'", report.saved, audit_id);
        Ok(exit_codes::SUCCESS)
    } else {
        tracing::warn!(
            "Imported {} record(s) into '{}', {} rejected",
            report.saved,
            audit_id,
            report.failures.len()
        );
        Ok(exit_codes::PARTIAL_FAILURE)
    }
}

/// Run the set command: save one record.
///
/// Fields not given on the command line keep their stored values.
pub fn run_set(
    config: &AppConfig,
    audit_id: &str,
    args: SetArgs,
    source: &CatalogSource,
) -> Result<i32> {
    let mut store = open_store(config)?;
    let catalog = source.load(&store)?;
    let ctx = build_context(audit_id, catalog, config)?;

    let item = args.item.unwrap_or_else(|| args.qid.clone());
    let existing = store.get(audit_id, args.qid.trim(), item.trim())?;

    let domain = args
        .domain
        .or_else(|| existing.as_ref().map(|r| r.domain.clone()))
        .unwrap_or_default();
    let mut upsert = ResponseUpsert::new(domain, args.qid, item, args.level);
    upsert.question = args.question;
    upsert.comment = args.comment;
    upsert.evidence = args.evidence;

    let record = ctx.save(&mut store, upsert)?;
    tracing::info!("{}: {}", record.title(), record.level.label());
    Ok(exit_codes::SUCCESS)
}

/// Run the attach command, or detach when `detach` is set.
pub fn run_attach(
    config: &AppConfig,
    audit_id: &str,
    qid: &str,
    item: Option<&str>,
    evidence: &[String],
    detach: bool,
) -> Result<i32> {
    if evidence.is_empty() {
        bail!("No evidence references given");
    }
    let mut store = open_store(config)?;
    let item = item.unwrap_or(qid);
    let record = if detach {
        store.detach_evidence(audit_id, qid, item, evidence)?
    } else {
        store.attach_evidence(audit_id, qid, item, evidence)?
    };
    tracing::info!(
        "{}: {} evidence reference(s)",
        record.title(),
        record.evidence.len()
    );
    Ok(exit_codes::SUCCESS)
}

/// Run the list command: stored audits, or the records of one audit.
pub fn run_list(config: &AppConfig, audit_id: Option<&str>, json: bool) -> Result<i32> {
    let store = open_store(config)?;
    let content = match audit_id {
        Some(id) => {
            let records = store.list(id)?;
            if records.is_empty() {
                tracing::warn!("Audit '{id}' has no records");
            }
            if json {
                serde_json::to_string_pretty(&records)?
            } else {
                format_records(&records)
            }
        }
        None => {
            let audits = store.audits()?;
            if json {
                serde_json::to_string_pretty(&audits)?
            } else {
                format_audits(&audits)
            }
        }
    };
    write_output(&content, &OutputTarget::Stdout)?;
    Ok(exit_codes::SUCCESS)
}

/// Run the delete command.
pub fn run_delete(config: &AppConfig, audit_id: &str) -> Result<i32> {
    let mut store = open_store(config)?;
    let removed = store.delete_audit(audit_id)?;
    if removed == 0 {
        tracing::warn!("Audit '{audit_id}' has no records");
    } else {
        tracing::info!("Deleted audit '{}' ({} records)", audit_id, removed);
    }
    Ok(exit_codes::SUCCESS)
}

fn format_audits(audits: &[AuditSummary]) -> String {
    if audits.is_empty() {
        return "No audits stored.".to_string();
    }
    let width = audits
        .iter()
        .map(|a| a.audit_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("AUDIT".len());
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>7}  {:<19}  {:<19}  STANDARD / PROJECT",
        "AUDIT", "RECORDS", "CREATED", "LAST UPDATED"
    );
    let stamp = |at: Option<chrono::DateTime<chrono::Utc>>| {
        at.map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M:%S").to_string())
    };
    for audit in audits {
        let about: Vec<String> = [audit.info.standard_label(), audit.info.project_label()]
            .into_iter()
            .flatten()
            .collect();
        let line = format!(
            "{:<width$}  {:>7}  {:<19}  {:<19}  {}",
            audit.audit_id,
            audit.records,
            stamp(audit.info.created_at),
            stamp(audit.last_updated),
            if about.is_empty() { "-".to_string() } else { about.join(" / ") }
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

fn format_records(records: &[ResponseRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{:<20} {:<12} {:<20} {}",
            record.level.label(),
            record.qid,
            record.item,
            record.domain
        );
    }
    out
}
