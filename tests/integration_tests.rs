//! Integration tests for audit-tools
//!
//! These tests verify end-to-end functionality of catalog import, response
//! persistence, scoring, risk inference and the remediation plan.

use audit_tools::catalog::{load_answers, load_catalog, parse_answers, SourceFormat};
use audit_tools::{
    AuditContext, AppConfig, ComplianceLevel, JsonFileStore, MemoryStore, NormLibrary, Priority,
    RecordFilter, ResponseStore, ResponseUpsert,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

const AUDIT: &str = "q3-2026";

/// Seed the fixture catalog and import the fixture answers.
fn populated(store: &mut dyn ResponseStore) -> AuditContext {
    let catalog = load_catalog(&fixture_path("catalog.csv")).expect("catalog fixture");
    let ctx = AuditContext::from_config(AUDIT, catalog, &AppConfig::default()).unwrap();
    ctx.seed(store, ComplianceLevel::NotApplicable).unwrap();
    let answers = load_answers(&fixture_path("answers.csv")).expect("answers fixture");
    ctx.save_all(store, answers).unwrap();
    ctx
}

// ============================================================================
// Catalog Import Tests
// ============================================================================

mod catalog_tests {
    use super::*;

    #[test]
    fn test_load_semicolon_catalog() {
        let catalog = load_catalog(&fixture_path("catalog.csv")).unwrap();
        assert_eq!(catalog.len(), 5);

        let qids: Vec<&str> = catalog.rows().map(|r| r.qid.as_str()).collect();
        assert_eq!(qids, vec!["SEC-01", "SEC-02", "OPS-01", "RH-01", "ORG-01"]);

        let mfa = catalog.rows().next().unwrap();
        assert_eq!(mfa.domain, "Sécurité");
        assert_eq!(mfa.question, "MFA activé ?");
        assert_eq!(
            mfa.expected_evidence.as_deref(),
            Some("Capture de la configuration VPN")
        );
        assert_eq!(
            mfa.recommendation.as_deref(),
            Some("Déployer le MFA sur tous les accès distants")
        );
        // Blank recommendation cells are absent, not empty
        assert!(catalog.rows().nth(1).unwrap().recommendation.is_none());
    }

    #[test]
    fn test_load_yaml_catalog_with_mixed_keys() {
        let catalog = load_catalog(&fixture_path("catalog.yaml")).unwrap();
        assert_eq!(catalog.len(), 3);

        let rh = catalog.rows().nth(2).unwrap();
        assert_eq!(rh.domain, "Ressources humaines");
        assert_eq!(rh.qid, "RH-01");
        assert_eq!(rh.item, "Charte");
        assert_eq!(rh.question, "Charte informatique signée ?");
    }

    #[test]
    fn test_load_answers_keeps_invalid_rows() {
        let answers = load_answers(&fixture_path("answers.csv")).unwrap();
        assert_eq!(answers.len(), 5);

        assert_eq!(answers[0].level, ComplianceLevel::NonCompliant);
        assert_eq!(answers[1].level, ComplianceLevel::Compliant);
        assert_eq!(
            answers[1].evidence,
            Some(vec!["gpo-bitlocker.png".to_string(), "inventaire.xlsx".to_string()])
        );
        assert_eq!(answers[2].level, ComplianceLevel::PartiallyCompliant);
        assert_eq!(answers[3].level, ComplianceLevel::Compliant);
        // Orphan row is returned so the batch can report it
        assert!(answers[4].qid.is_empty());
        assert_eq!(answers[4].item, "Orphelin");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.xlsx");
        std::fs::write(&path, "not a spreadsheet").unwrap();
        let err = load_catalog(&path).unwrap_err();
        assert!(err.to_string().contains("xlsx"), "{err}");
    }
}

// ============================================================================
// Evaluation Tests
// ============================================================================

mod evaluation_tests {
    use super::*;

    #[test]
    fn test_import_reports_orphan_row() {
        let mut store = MemoryStore::new();
        let catalog = load_catalog(&fixture_path("catalog.csv")).unwrap();
        let ctx = AuditContext::from_config(AUDIT, catalog, &AppConfig::default()).unwrap();
        assert_eq!(ctx.seed(&mut store, ComplianceLevel::NotApplicable).unwrap(), 5);

        let answers = load_answers(&fixture_path("answers.csv")).unwrap();
        let report = ctx.save_all(&mut store, answers).unwrap();
        assert_eq!(report.saved, 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].item, "Orphelin");
        assert!(!report.is_complete());

        // Valid rows were committed; the orphan created nothing
        assert_eq!(store.list(AUDIT).unwrap().len(), 5);
    }

    #[test]
    fn test_answers_resolve_domain_and_question_from_catalog() {
        let mut store = MemoryStore::new();
        populated(&mut store);

        let record = store.get(AUDIT, "OPS-01", "Backup").unwrap().unwrap();
        assert_eq!(record.domain, "Opérations");
        assert_eq!(record.question, "Sauvegardes restaurées chaque trimestre ?");
        assert_eq!(record.comment, "Test annuel seulement");
        assert_eq!(record.evidence, vec!["restore-2026.pdf".to_string()]);
        assert!(record.updated_at.is_some());
    }

    #[test]
    fn test_score_of_fixture_audit() {
        let mut store = MemoryStore::new();
        let ctx = populated(&mut store);
        let records = store.list(AUDIT).unwrap();
        let eval = ctx.evaluate(&records, &RecordFilter::new());

        let metrics = &eval.score.metrics;
        assert_eq!(metrics.total, 5);
        assert_eq!(metrics.applicable, 4);
        // (0 + 1 + 0.5 + 1) / 4 = 62.5, rounded half away from zero
        assert_eq!(metrics.rate, Some(63));

        let domains = &eval.score.domains;
        assert_eq!(domains.len(), 3);
        assert_eq!(domains["Sécurité"].rate, 50);
        assert_eq!(domains["Opérations"].rate, 50);
        assert_eq!(domains["Ressources humaines"].rate, 100);
        assert!(!domains.contains_key("Organisation"));

        assert_eq!(eval.score.evidence.total, 3);
        assert_eq!(eval.score.evidence.items_with_evidence, 2);
    }

    #[test]
    fn test_plan_order_of_fixture_audit() {
        let mut store = MemoryStore::new();
        let ctx = populated(&mut store);
        let records = store.list(AUDIT).unwrap();
        let eval = ctx.evaluate(&records, &RecordFilter::new());

        let order: Vec<&str> = eval
            .plan
            .actions
            .iter()
            .map(|f| f.record.qid.as_str())
            .collect();
        assert_eq!(order, vec!["SEC-01", "OPS-01", "ORG-01", "SEC-02", "RH-01"]);

        let top = &eval.plan.actions[0];
        assert_eq!(top.risk.priority, Priority::High);
        assert!((top.risk.loss_estimate - 91_000.0).abs() < 1e-6);
        assert!((top.risk.remediation_cost - 20_400.0).abs() < 1e-6);
        assert!((top.risk.expected_loss - 36_400.0).abs() < 1e-6);

        let ops = &eval.plan.actions[1];
        assert_eq!(ops.risk.priority, Priority::Medium);
        assert!((ops.risk.expected_loss - 12_474.0).abs() < 1e-6);

        // Not-applicable records fall back to the partial state
        let org = &eval.plan.actions[2];
        assert_eq!(org.record.level, ComplianceLevel::NotApplicable);
        assert_eq!(org.risk.priority, Priority::Medium);
        assert!((org.risk.expected_loss - 4_620.0).abs() < 1e-6);
    }

    #[test]
    fn test_recommendations() {
        let mut store = MemoryStore::new();
        let ctx = populated(&mut store);
        let records = store.list(AUDIT).unwrap();
        let eval = ctx.evaluate(&records, &RecordFilter::new());
        let texts = AppConfig::default().recommendations;

        let by_qid = |qid: &str| {
            eval.findings
                .iter()
                .find(|f| f.record.qid == qid)
                .unwrap()
                .recommendation
                .clone()
        };
        assert_eq!(by_qid("SEC-01"), texts.non_compliant);
        assert_eq!(by_qid("OPS-01"), texts.partially_compliant);
        assert_eq!(by_qid("SEC-02"), texts.maintain);
    }

    #[test]
    fn test_filtered_view() {
        let mut store = MemoryStore::new();
        let ctx = populated(&mut store);
        let records = store.list(AUDIT).unwrap();

        let security = ctx.evaluate(&records, &RecordFilter::new().domain("Sécurité"));
        assert_eq!(security.score.metrics.total, 2);
        assert_eq!(security.score.metrics.rate, Some(50));

        let by_comment = ctx.evaluate(&records, &RecordFilter::new().query("bitlocker"));
        assert_eq!(by_comment.findings.len(), 1);
        assert_eq!(by_comment.findings[0].record.qid, "SEC-02");

        let mut open = RecordFilter::new();
        open.open_only = true;
        let open_view = ctx.evaluate(&records, &open);
        let qids: Vec<&str> = open_view
            .plan
            .actions
            .iter()
            .map(|f| f.record.qid.as_str())
            .collect();
        assert_eq!(qids, vec!["SEC-01", "OPS-01"]);
    }

    #[test]
    fn test_empty_audit_has_no_rate() {
        let store = MemoryStore::new();
        let ctx = AuditContext::from_config(
            "empty",
            load_catalog(&fixture_path("catalog.csv")).unwrap(),
            &AppConfig::default(),
        )
        .unwrap();
        let eval = ctx.evaluate(&store.list("empty").unwrap(), &RecordFilter::new());
        assert_eq!(eval.score.metrics.rate, None);
        assert!(eval.plan.is_empty());
    }
}

// ============================================================================
// Persistence Tests
// ============================================================================

mod persistence_tests {
    use super::*;

    #[test]
    fn test_json_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("responses.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        populated(&mut store);
        let before = store.list(AUDIT).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.list(AUDIT).unwrap(), before);
        let audits = reopened.audits().unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].audit_id, AUDIT);
        assert_eq!(audits[0].records, 5);
    }

    #[test]
    fn test_attach_and_detach_keep_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("responses.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        populated(&mut store);

        let refs = vec!["pv-restauration.pdf".to_string(), "restore-2026.pdf".to_string()];
        let record = store.attach_evidence(AUDIT, "OPS-01", "Backup", &refs).unwrap();
        assert_eq!(
            record.evidence,
            vec!["restore-2026.pdf".to_string(), "pv-restauration.pdf".to_string()]
        );
        assert_eq!(record.level, ComplianceLevel::PartiallyCompliant);
        assert_eq!(record.comment, "Test annuel seulement");

        let record = store
            .detach_evidence(AUDIT, "OPS-01", "Backup", &["restore-2026.pdf".to_string()])
            .unwrap();
        assert_eq!(record.evidence, vec!["pv-restauration.pdf".to_string()]);

        let reopened = JsonFileStore::open(&path).unwrap();
        let stored = reopened.get(AUDIT, "OPS-01", "Backup").unwrap().unwrap();
        assert_eq!(stored.evidence, vec!["pv-restauration.pdf".to_string()]);
    }

    #[test]
    fn test_level_only_import_keeps_evidence_and_comment() {
        let mut store = MemoryStore::new();
        let ctx = populated(&mut store);
        store
            .attach_evidence(AUDIT, "SEC-01", "MFA", &["mfa.png".to_string()])
            .unwrap();

        let answers = parse_answers("ID,Item,Niveau\nSEC-01,MFA,Conforme\n", SourceFormat::Csv).unwrap();
        let report = ctx.save_all(&mut store, answers).unwrap();
        assert_eq!(report.saved, 1);

        let record = store.get(AUDIT, "SEC-01", "MFA").unwrap().unwrap();
        assert_eq!(record.level, ComplianceLevel::Compliant);
        assert_eq!(record.evidence, vec!["mfa.png".to_string()]);
        assert_eq!(record.comment, "Pas de MFA sur le VPN");

        // A present but empty evidence column clears the list
        let answers =
            parse_answers("ID;Item;Niveau;Preuves\nSEC-01;MFA;Conforme;\n", SourceFormat::Csv).unwrap();
        ctx.save_all(&mut store, answers).unwrap();
        let record = store.get(AUDIT, "SEC-01", "MFA").unwrap().unwrap();
        assert!(record.evidence.is_empty());
        assert_eq!(record.comment, "Pas de MFA sur le VPN");
    }

    #[test]
    fn test_attach_to_unknown_record_fails() {
        let mut store = MemoryStore::new();
        populated(&mut store);
        assert!(store
            .attach_evidence(AUDIT, "NOPE-01", "NOPE-01", &["x.pdf".to_string()])
            .is_err());
    }

    #[test]
    fn test_upsert_keeps_one_record_per_key() {
        let mut store = MemoryStore::new();
        let ctx = populated(&mut store);

        ctx.save(
            &mut store,
            ResponseUpsert::new("", "SEC-01", "MFA", ComplianceLevel::Compliant)
                .comment("MFA déployé"),
        )
        .unwrap();
        let records = store.list(AUDIT).unwrap();
        assert_eq!(records.len(), 5);
        let mfa = records.iter().find(|r| r.qid == "SEC-01").unwrap();
        assert_eq!(mfa.level, ComplianceLevel::Compliant);
        assert_eq!(mfa.domain, "Sécurité");

        let eval = ctx.evaluate(&records, &RecordFilter::new());
        // (1 + 1 + 0.5 + 1) / 4
        assert_eq!(eval.score.metrics.rate, Some(88));
    }

    #[test]
    fn test_delete_audit_leaves_others() {
        let mut store = MemoryStore::new();
        populated(&mut store);
        store
            .upsert(
                "other",
                ResponseUpsert::new("Sécurité", "SEC-01", "MFA", ComplianceLevel::Compliant),
            )
            .unwrap();

        assert_eq!(store.delete_audit(AUDIT).unwrap(), 5);
        assert!(store.list(AUDIT).unwrap().is_empty());
        assert_eq!(store.list("other").unwrap().len(), 1);
    }

    #[test]
    fn test_norm_library_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("responses.json");
        let catalog = load_catalog(&fixture_path("catalog.csv")).unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        let info = store.save_norm("interne", catalog.to_vec()).unwrap();
        assert_eq!(info.rows, 5);
        drop(store);

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_norm("interne").unwrap(), Some(catalog.to_vec()));
        assert!(store.delete_norm("interne").unwrap());
        assert!(store.list_norms().unwrap().is_empty());
    }
}

// ============================================================================
// Legacy Store Migration Tests
// ============================================================================

mod migration_tests {
    use super::*;

    fn legacy_store() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("responses.json");
        std::fs::copy(fixture_path("legacy_store_v0.json"), &path).unwrap();
        (dir, path)
    }

    #[test]
    fn test_legacy_rows_land_in_audits() {
        let (_dir, path) = legacy_store();
        let store = JsonFileStore::open(&path).unwrap();

        let audits: Vec<String> = store
            .audits()
            .unwrap()
            .into_iter()
            .map(|a| a.audit_id)
            .collect();
        assert_eq!(audits, vec!["default".to_string(), "pilot".to_string()]);

        // Ordered by domain: Opérations before Sécurité; the row without a
        // qid is skipped
        let records = store.list("default").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].qid, "OPS-01");
        assert_eq!(records[0].level, ComplianceLevel::Compliant);
        assert!(records[0].evidence.is_empty());

        let mfa = &records[1];
        assert_eq!(mfa.item, "SEC-01");
        assert_eq!(mfa.level, ComplianceLevel::NonCompliant);
        assert_eq!(mfa.evidence, vec!["evidence/default/audit-vpn.png".to_string()]);
        assert_eq!(
            mfa.updated_at.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-05-02T10:15:00+00:00")
        );

        let pilot = store.list("pilot").unwrap();
        assert_eq!(pilot.len(), 1);
        assert_eq!(pilot[0].level, ComplianceLevel::PartiallyCompliant);

        // Creation time of a legacy audit is its oldest record
        let info = store.audit_info("default").unwrap().unwrap();
        assert_eq!(
            info.created_at.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-05-02T10:15:00+00:00")
        );
        assert_eq!(store.audit_info("pilot").unwrap().unwrap().created_at, None);
    }

    #[test]
    fn test_legacy_file_rewritten_on_first_change() {
        let (_dir, path) = legacy_store();
        let mut store = JsonFileStore::open(&path).unwrap();
        store
            .attach_evidence("pilot", "SEC-02", "SEC-02", &["chiffrement.pdf".to_string()])
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 2);
        assert!(raw["audits"]["default"].is_array());
        assert!(raw["meta"]["pilot"].is_object());
        assert_eq!(raw["audits"]["pilot"][0]["evidence"][0], "chiffrement.pdf");
    }
}
