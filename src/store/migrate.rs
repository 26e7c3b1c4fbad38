//! Versioned store document migrations.
//!
//! Each migration is a pure transform of the raw JSON document from one
//! version to the next. Documents without a `version` field are legacy
//! (version 0) flat row lists.

use crate::error::{AuditError, Result, StoreErrorKind};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};

type Migration = fn(Value) -> std::result::Result<Value, String>;

/// Migrations in order; entry `n` upgrades version `n` to `n + 1`.
const MIGRATIONS: &[Migration] = &[v0_to_v1, v1_to_v2];

/// Newest document version.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Audit id given to legacy rows without one.
pub const LEGACY_AUDIT_ID: &str = "default";

/// Version of a raw document.
pub fn detect_version(doc: &Value) -> Result<u32> {
    match doc {
        Value::Array(_) => Ok(0),
        Value::Object(map) => match map.get("version") {
            Some(v) => v
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| corrupt(format!("invalid version field: {v}"))),
            None if map.get("rows").is_some_and(Value::is_array) => Ok(0),
            None => Err(corrupt("missing version field".to_string())),
        },
        _ => Err(corrupt("document is neither an object nor an array".to_string())),
    }
}

/// Upgrade a raw document to [`CURRENT_VERSION`].
pub fn migrate(mut doc: Value) -> Result<Value> {
    let mut version = detect_version(&doc)?;
    if version > CURRENT_VERSION {
        return Err(AuditError::store(
            "loading store document",
            StoreErrorKind::UnsupportedVersion {
                found: version,
                latest: CURRENT_VERSION,
            },
        ));
    }
    while version < CURRENT_VERSION {
        let step = MIGRATIONS[version as usize];
        doc = step(doc).map_err(|message| {
            AuditError::store(
                "migrating store document",
                StoreErrorKind::Migration {
                    from: version,
                    message,
                },
            )
        })?;
        tracing::info!("Migrated store document from v{} to v{}", version, version + 1);
        version += 1;
    }
    Ok(doc)
}

fn corrupt(message: String) -> AuditError {
    AuditError::store("loading store document", StoreErrorKind::Corrupt(message))
}

fn text(row: &Map<String, Value>, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Legacy evidence: a list, or a JSON-encoded string holding a list of
/// references or `{name, path}` objects.
fn legacy_evidence(value: Option<&Value>) -> Vec<Value> {
    let parsed = match value {
        Some(Value::String(s)) if s.trim().is_empty() => return Vec::new(),
        Some(Value::String(s)) => {
            serde_json::from_str::<Value>(s).unwrap_or_else(|_| Value::String(s.clone()))
        }
        Some(other) => other.clone(),
        None => return Vec::new(),
    };
    let entries = match parsed {
        Value::Array(entries) => entries,
        Value::Null => Vec::new(),
        single => vec![single],
    };
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(s) if !s.trim().is_empty() => Some(Value::String(s)),
            Value::Object(obj) => ["path", "name"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str).map(str::to_string))
                .map(Value::String),
            _ => None,
        })
        .collect()
}

/// Legacy timestamps were naive ISO-8601 in UTC.
fn legacy_timestamp(value: Option<&Value>) -> Option<Value> {
    let raw = value?.as_str()?.trim();
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc())
        })?;
    Some(Value::String(parsed.to_rfc3339()))
}

/// v0 flat rows → v1 audits map.
fn v0_to_v1(doc: Value) -> std::result::Result<Value, String> {
    let rows = match doc {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("rows") {
            Some(Value::Array(rows)) => rows,
            _ => return Err("legacy document has no row list".to_string()),
        },
        _ => return Err("unexpected legacy document shape".to_string()),
    };

    let mut audits: Map<String, Value> = Map::new();
    let mut skipped = 0usize;
    for row in rows {
        let Value::Object(row) = row else {
            skipped += 1;
            continue;
        };
        let (Some(domain), Some(qid)) = (text(&row, "domain"), text(&row, "qid")) else {
            skipped += 1;
            continue;
        };
        let item = text(&row, "item").unwrap_or_else(|| qid.clone());
        let audit_id = text(&row, "audit_id").unwrap_or_else(|| LEGACY_AUDIT_ID.to_string());
        let evidence = legacy_evidence(row.get("evidence").or_else(|| row.get("evidence_json")));

        let mut record = json!({
            "domain": domain,
            "qid": qid,
            "item": item,
            "question": text(&row, "question").unwrap_or_default(),
            "level": text(&row, "level"),
            "comment": text(&row, "comment").unwrap_or_default(),
            "evidence": evidence,
        });
        if let Some(ts) = legacy_timestamp(row.get("updated_at")) {
            record["updated_at"] = ts;
        }

        if let Value::Array(list) = audits
            .entry(audit_id)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            list.push(record);
        }
    }
    if skipped > 0 {
        tracing::warn!("Skipped {skipped} legacy rows without domain or qid");
    }

    Ok(json!({
        "version": 1,
        "audits": audits,
        "norms": {},
    }))
}

/// v1 → v2: per-audit metadata. `created_at` is the earliest record
/// timestamp of each audit.
fn v1_to_v2(doc: Value) -> std::result::Result<Value, String> {
    let Value::Object(mut map) = doc else {
        return Err("v1 document is not an object".to_string());
    };
    let mut meta = Map::new();
    if let Some(Value::Object(audits)) = map.get("audits") {
        for (audit_id, records) in audits {
            let created_at = records
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|r| r.get("updated_at").and_then(Value::as_str))
                .filter_map(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .min();
            let mut entry = Map::new();
            if let Some(created_at) = created_at {
                entry.insert("created_at".to_string(), Value::String(created_at.to_rfc3339()));
            }
            meta.insert(audit_id.clone(), Value::Object(entry));
        }
    }
    map.insert("meta".to_string(), Value::Object(meta));
    map.insert("version".to_string(), json!(2));
    Ok(Value::Object(map))
}
