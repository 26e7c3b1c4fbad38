//! Catalog (norm) and answer-sheet import.
//!
//! Sources are CSV, YAML or JSON. Headers are normalized through
//! [`Column::from_header`], so `Domaine`/`Domain`, `ID`/`QID` or
//! `Contrôle`/`Question` all land in the same field. Rows whose identifier
//! cells are all blank are skipped; rows missing a required field are
//! rejected with their row number.

mod columns;
mod sheet;

pub use columns::{fold_header, Column, HeaderMap};
pub use sheet::{read_csv, read_structured, RawRow, RawTable};

use crate::error::{AuditError, CatalogErrorKind, Result};
use crate::model::{CatalogRow, ComplianceLevel, RecordKey};
use crate::store::ResponseUpsert;
use indexmap::IndexMap;
use std::path::Path;

/// Source format of a catalog or answer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Yaml,
    Json,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(AuditError::catalog(
                path.display().to_string(),
                CatalogErrorKind::UnsupportedFormat(if other.is_empty() {
                    "no extension".to_string()
                } else {
                    other.to_string()
                }),
            )),
        }
    }
}

/// Parse a source into a raw table.
pub fn read_table(text: &str, format: SourceFormat) -> Result<RawTable> {
    match format {
        SourceFormat::Csv => read_csv(text),
        SourceFormat::Yaml => {
            let doc: serde_json::Value = serde_yaml::from_str(text).map_err(|e| {
                AuditError::catalog("parsing YAML", CatalogErrorKind::Yaml(e.to_string()))
            })?;
            read_structured(&doc)
        }
        SourceFormat::Json => {
            let doc: serde_json::Value = serde_json::from_str(text).map_err(|e| {
                AuditError::catalog("parsing JSON", CatalogErrorKind::Json(e.to_string()))
            })?;
            read_structured(&doc)
        }
    }
}

fn read_file(path: &Path) -> Result<(String, SourceFormat)> {
    let format = SourceFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
    Ok((text, format))
}

fn require_columns(table: &RawTable) -> Result<()> {
    for column in [Column::Domain, Column::Qid] {
        if !table.headers.has(column) {
            return Err(AuditError::catalog(
                "checking columns",
                CatalogErrorKind::MissingColumn {
                    column: column.name().to_string(),
                },
            ));
        }
    }
    Ok(())
}

/// Identifier cells of a row. `item` falls back to `qid` when the source
/// has no item column at all.
fn identifiers(table: &RawTable, row: &RawRow) -> Result<(String, String, String)> {
    let domain = row.text(Column::Domain);
    let qid = row.text(Column::Qid);
    let item = if table.headers.has(Column::Item) {
        row.text(Column::Item)
    } else {
        qid
    };
    for (field, value) in [("domain", domain), ("qid", qid), ("item", item)] {
        if value.is_empty() {
            return Err(AuditError::missing_field(row.row, field));
        }
    }
    Ok((domain.to_string(), qid.to_string(), item.to_string()))
}

/// Catalog rows of a raw table.
pub fn catalog_rows(table: &RawTable) -> Result<Vec<CatalogRow>> {
    require_columns(table)?;
    let mut rows = Vec::with_capacity(table.rows.len());
    for raw in table.rows.iter().filter(|r| !r.is_blank()) {
        let (domain, qid, item) = identifiers(table, raw)?;
        rows.push(CatalogRow {
            domain,
            qid,
            item,
            question: raw.text(Column::Question).to_string(),
            objective: raw.optional(Column::Objective),
            expected_evidence: raw.optional(Column::ExpectedEvidence),
            reference: raw.optional(Column::Reference),
            criterion: raw.optional(Column::Criterion),
            recommendation: raw.optional(Column::Recommendation),
        });
    }
    let skipped = table.rows.len() - rows.len();
    if skipped > 0 {
        tracing::debug!("Skipped {skipped} rows without identifiers");
    }
    Ok(rows)
}

/// Parse catalog text.
pub fn parse_catalog(text: &str, format: SourceFormat) -> Result<Vec<CatalogRow>> {
    catalog_rows(&read_table(text, format)?)
}

/// Load a catalog file, detecting the format from its extension.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let (text, format) = read_file(path)?;
    let rows = parse_catalog(&text, format)?;
    tracing::info!("Loaded {} catalog rows from {}", rows.len(), path.display());
    Ok(Catalog::new(rows))
}

/// Split an evidence cell on `;` (and newlines).
#[must_use]
pub fn split_evidence(cell: &str) -> Vec<String> {
    cell.split([';', '\n'])
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// Answer rows of a raw table. Rows missing an identifier are still
/// returned so that the batch save reports them per record.
///
/// Without a comment or evidence column the stored values are left alone.
pub fn answer_rows(table: &RawTable) -> Result<Vec<ResponseUpsert>> {
    if !table.headers.has(Column::Qid) {
        return Err(AuditError::catalog(
            "checking columns",
            CatalogErrorKind::MissingColumn {
                column: Column::Qid.name().to_string(),
            },
        ));
    }
    let has_item = table.headers.has(Column::Item);
    let has_comment = table.headers.has(Column::Comment);
    let has_evidence = table.headers.has(Column::Evidence);
    Ok(table
        .rows
        .iter()
        .filter(|r| !r.is_blank())
        .map(|raw| {
            let qid = raw.text(Column::Qid);
            let item = if has_item { raw.text(Column::Item) } else { qid };
            ResponseUpsert {
                domain: raw.text(Column::Domain).to_string(),
                qid: qid.to_string(),
                item: item.to_string(),
                question: raw.optional(Column::Question),
                level: ComplianceLevel::normalize(raw.text(Column::Level)),
                comment: has_comment.then(|| raw.text(Column::Comment).to_string()),
                evidence: has_evidence.then(|| split_evidence(raw.text(Column::Evidence))),
            }
        })
        .collect())
}

/// Parse answer-sheet text.
pub fn parse_answers(text: &str, format: SourceFormat) -> Result<Vec<ResponseUpsert>> {
    answer_rows(&read_table(text, format)?)
}

/// Load an answer-sheet file.
pub fn load_answers(path: &Path) -> Result<Vec<ResponseUpsert>> {
    let (text, format) = read_file(path)?;
    let answers = parse_answers(&text, format)?;
    tracing::info!("Loaded {} answers from {}", answers.len(), path.display());
    Ok(answers)
}

/// Catalog rows indexed by `(qid, item)`, in source order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rows: IndexMap<RecordKey, CatalogRow>,
}

impl Catalog {
    /// Index rows. A repeated key keeps its first position and last content.
    #[must_use]
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        let mut index = IndexMap::with_capacity(rows.len());
        for row in rows {
            if let Some(previous) = index.insert(row.key(), row) {
                tracing::warn!("Duplicate catalog key {}", previous.key());
            }
        }
        Self { rows: index }
    }

    #[must_use]
    pub fn get(&self, key: &RecordKey) -> Option<&CatalogRow> {
        self.rows.get(key)
    }

    pub fn rows(&self) -> impl Iterator<Item = &CatalogRow> {
        self.rows.values()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<CatalogRow> {
        self.rows.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fill domain and question of an edit from the catalog when its key is
    /// known. The catalog wins over whatever the edit carried.
    #[must_use]
    pub fn resolve(&self, mut upsert: ResponseUpsert) -> ResponseUpsert {
        if let Some(row) = self.get(&upsert.key()) {
            upsert.domain = row.domain.clone();
            if !row.question.is_empty() {
                upsert.question = Some(row.question.clone());
            }
        }
        upsert
    }
}

impl FromIterator<CatalogRow> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Domaine;ID;Item;Contrôle;Recommandation;Owner
Sécurité;SEC-01;MFA;MFA activé pour les admins ?;Activer le MFA;alice
;;;;;
Opérations;OPS-01;Backup;Sauvegardes testées ?;;bob
";

    #[test]
    fn test_parse_catalog_csv() {
        let rows = parse_catalog(CSV, SourceFormat::Csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].domain, "Sécurité");
        assert_eq!(rows[0].recommendation.as_deref(), Some("Activer le MFA"));
        assert_eq!(rows[1].recommendation, None);
    }

    #[test]
    fn test_missing_field_reports_row() {
        let text = "Domain,QID,Item,Question\nOps,OPS-01,,Backups?\n";
        let err = parse_catalog(text, SourceFormat::Csv).unwrap_err();
        match err {
            AuditError::Catalog {
                source: CatalogErrorKind::MissingField { row, field },
                ..
            } => {
                assert_eq!(row, 1);
                assert_eq!(field, "item");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_column() {
        let err = parse_catalog("Question\nWhy?\n", SourceFormat::Csv).unwrap_err();
        assert!(err.to_string().contains("checking columns"));
    }

    #[test]
    fn test_item_defaults_to_qid_without_item_column() {
        let rows = parse_catalog("Domain,QID,Question\nOps,OPS-01,Backups?\n", SourceFormat::Csv)
            .unwrap();
        assert_eq!(rows[0].item, "OPS-01");
    }

    #[test]
    fn test_parse_yaml_catalog() {
        let yaml = "\
- domain: Gouvernance IA
  qid: GOV-01
  item: Charte
  question: Une charte IA est-elle publiée ?
  reference: ISO 42001 5.2
";
        let rows = parse_catalog(yaml, SourceFormat::Yaml).unwrap();
        assert_eq!(rows[0].reference.as_deref(), Some("ISO 42001 5.2"));
    }

    #[test]
    fn test_parse_answers() {
        let text = "ID,Item,Niveau,Commentaire,Preuves\n\
SEC-01,MFA,Partiellement conforme,Admins only,mfa.png; policy.pdf\n\
SEC-02,TLS,???,,\n";
        let answers = parse_answers(text, SourceFormat::Csv).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].level, ComplianceLevel::PartiallyCompliant);
        assert_eq!(
            answers[0].evidence,
            Some(vec!["mfa.png".to_string(), "policy.pdf".to_string()])
        );
        assert_eq!(answers[1].evidence, Some(Vec::new()));
        assert_eq!(answers[1].comment.as_deref(), Some(""));
        assert_eq!(answers[1].level, ComplianceLevel::NotApplicable);
        assert!(answers[0].domain.is_empty());
    }

    #[test]
    fn test_level_only_sheet_leaves_comment_and_evidence_unset() {
        let answers = parse_answers("ID;Item;Niveau\nSEC-01;MFA;Conforme\n", SourceFormat::Csv).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].level, ComplianceLevel::Compliant);
        assert_eq!(answers[0].comment, None);
        assert_eq!(answers[0].evidence, None);
    }

    #[test]
    fn test_catalog_resolves_domain_and_question() {
        let catalog: Catalog = parse_catalog(CSV, SourceFormat::Csv).unwrap().into_iter().collect();
        let edit = ResponseUpsert::new("", "SEC-01", "MFA", ComplianceLevel::Compliant);
        let resolved = catalog.resolve(edit);
        assert_eq!(resolved.domain, "Sécurité");
        assert_eq!(
            resolved.question.as_deref(),
            Some("MFA activé pour les admins ?")
        );

        let unknown = catalog.resolve(ResponseUpsert::new("", "X", "Y", ComplianceLevel::Compliant));
        assert!(unknown.domain.is_empty());
    }

    #[test]
    fn test_source_format_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("n.CSV")).unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("n.yml")).unwrap(), SourceFormat::Yaml);
        assert!(SourceFormat::from_path(Path::new("n.xlsx")).is_err());
    }
}
