//! Spreadsheet header normalization.
//!
//! Norm spreadsheets come from many hands: French or English headers, with
//! or without accents, in any case. Every raw header is folded to a key and
//! looked up in a fixed alias table.

use std::fmt;
use strsim::jaro_winkler;

/// Minimum similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Canonical catalog / answer-sheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Domain,
    Qid,
    Item,
    Question,
    Objective,
    ExpectedEvidence,
    Reference,
    Criterion,
    Recommendation,
    Level,
    Comment,
    Evidence,
}

/// Folded header keys per column. The first alias is the canonical name.
const ALIASES: &[(Column, &[&str])] = &[
    (Column::Domain, &["domain", "domaine"]),
    (
        Column::Qid,
        &["qid", "id", "question id", "identifiant", "code", "ref id"],
    ),
    (Column::Item, &["item", "element", "sous item", "point"]),
    (
        Column::Question,
        &["question", "controle", "control", "exigence", "requirement"],
    ),
    (Column::Objective, &["objective", "objectif"]),
    (
        Column::ExpectedEvidence,
        &[
            "expected evidence",
            "preuve attendue",
            "preuves attendues",
            "evidence expected",
        ],
    ),
    (Column::Reference, &["reference", "ref", "references"]),
    (Column::Criterion, &["criterion", "critere", "criteres", "criteria"]),
    (Column::Recommendation, &["recommendation", "recommandation"]),
    (
        Column::Level,
        &["level", "niveau", "reponse", "answer", "statut", "status"],
    ),
    (
        Column::Comment,
        &["comment", "commentaire", "commentaires", "comments", "remarque"],
    ),
    (Column::Evidence, &["evidence", "preuve", "preuves", "evidences"]),
];

impl Column {
    /// Map a raw header to its column, if any.
    ///
    /// ```
    /// use audit_tools::catalog::Column;
    ///
    /// assert_eq!(Column::from_header("Contrôle"), Some(Column::Question));
    /// assert_eq!(Column::from_header("  DOMAINE "), Some(Column::Domain));
    /// assert_eq!(Column::from_header("Owner"), None);
    /// ```
    #[must_use]
    pub fn from_header(raw: &str) -> Option<Self> {
        let key = fold_header(raw);
        ALIASES
            .iter()
            .find(|(_, aliases)| aliases.contains(&key.as_str()))
            .map(|(column, _)| *column)
    }

    /// Canonical header name.
    #[must_use]
    pub fn name(self) -> &'static str {
        ALIASES
            .iter()
            .find(|(column, _)| *column == self)
            .and_then(|(_, aliases)| aliases.first().copied())
            .unwrap_or("")
    }

    /// Closest canonical header for an unrecognized one.
    #[must_use]
    pub fn suggest(raw: &str) -> Option<Self> {
        let key = fold_header(raw);
        if key.is_empty() {
            return None;
        }
        ALIASES
            .iter()
            .flat_map(|(column, aliases)| aliases.iter().map(move |alias| (*column, *alias)))
            .map(|(column, alias)| (column, jaro_winkler(&key, alias)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(column, _)| column)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fold a header: lowercase, accents removed, `_`/`-` as spaces, whitespace collapsed.
#[must_use]
pub fn fold_header(raw: &str) -> String {
    let folded: String = raw
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ä' | 'ã' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' => 'i',
            'ô' | 'ö' | 'ó' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ç' => 'c',
            '_' | '-' => ' ',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Column layout of one header row.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    /// Column of each position, `None` for ignored headers
    pub columns: Vec<Option<Column>>,
    /// Headers that matched no column
    pub unknown: Vec<String>,
}

impl HeaderMap {
    /// Build from raw headers. Unknown headers are logged with a suggestion
    /// when one is close enough. A repeated column keeps its first position.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::default();
        for raw in headers {
            match Column::from_header(raw) {
                Some(column) if map.columns.contains(&Some(column)) => {
                    tracing::warn!("Duplicate column '{raw}' ignored ({column} already mapped)");
                    map.columns.push(None);
                }
                Some(column) => map.columns.push(Some(column)),
                None => {
                    map.note_unknown(raw);
                    map.columns.push(None);
                }
            }
        }
        map
    }

    /// Build from the keys of structured rows, where several aliases of the
    /// same column may appear across rows.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::default();
        for raw in keys {
            let column = Column::from_header(raw);
            if column.is_none() {
                map.note_unknown(raw);
            }
            map.columns.push(column);
        }
        map
    }

    fn note_unknown(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }
        match Column::suggest(raw) {
            Some(s) => tracing::warn!("Ignoring unknown column '{raw}' (did you mean '{s}'?)"),
            None => tracing::debug!("Ignoring unknown column '{raw}'"),
        }
        self.unknown.push(raw.to_string());
    }

    #[must_use]
    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(&Some(column))
    }

    #[must_use]
    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == Some(column))
    }
}
