//! Performance benchmarks for scoring, risk inference and planning.
//!
//! Run with: cargo bench --bench scoring_benchmark

use audit_tools::catalog::{parse_catalog, SourceFormat};
use audit_tools::model::{ComplianceLevel, ResponseRecord};
use audit_tools::{
    AppConfig, AuditContext, ComplianceScorer, RecordFilter, RiskEngine, RiskTables,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fmt::Write as _;
use std::hint::black_box;

const DOMAINS: [&str; 5] = [
    "Sécurité",
    "Opérations",
    "Organisation",
    "Ressources humaines",
    "Achats",
];

const QUESTIONS: [&str; 6] = [
    "MFA activé pour les administrateurs ?",
    "Chiffrement des sauvegardes ?",
    "Journaux centralisés dans le SIEM ?",
    "Revue des accès privilégiés ?",
    "Charte informatique signée ?",
    "Fournisseurs évalués chaque année ?",
];

/// Generate an audit with the specified number of records.
fn generate_records(count: usize) -> Vec<ResponseRecord> {
    (0..count)
        .map(|i| {
            let qid = format!("Q-{i:05}");
            ResponseRecord::new(
                DOMAINS[i % DOMAINS.len()],
                qid.clone(),
                qid,
                QUESTIONS[i % QUESTIONS.len()],
                ComplianceLevel::ALL[i % ComplianceLevel::ALL.len()],
            )
        })
        .collect()
}

/// Generate a semicolon-separated catalog with the specified number of rows.
fn generate_catalog_csv(count: usize) -> String {
    let mut csv = String::from("Domaine;ID;Item;Contrôle;Recommandation\n");
    for i in 0..count {
        let _ = writeln!(
            csv,
            "{};Q-{i:05};Item {i};{};Corriger",
            DOMAINS[i % DOMAINS.len()],
            QUESTIONS[i % QUESTIONS.len()]
        );
    }
    csv
}

fn bench_scoring(c: &mut Criterion) {
    let scorer = ComplianceScorer::new();
    let mut group = c.benchmark_group("score");
    for size in [100, 1_000, 10_000] {
        let records = generate_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(scorer.score(black_box(records))));
        });
    }
    group.finish();
}

fn bench_risk_inference(c: &mut Criterion) {
    let engine = RiskEngine::new(&RiskTables::default()).expect("default tables compile");
    let records = generate_records(1_000);

    c.bench_function("infer_1000_records", |b| {
        b.iter(|| {
            for record in &records {
                black_box(engine.infer_record(black_box(record)));
            }
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let ctx = AuditContext::from_config("bench", Default::default(), &AppConfig::default())
        .expect("default config is valid");
    let records = generate_records(5_000);
    let mut open = RecordFilter::new();
    open.open_only = true;

    c.bench_function("evaluate_5000_records", |b| {
        b.iter(|| black_box(ctx.evaluate(black_box(&records), &RecordFilter::new())))
    });
    c.bench_function("evaluate_5000_records_open_only", |b| {
        b.iter(|| black_box(ctx.evaluate(black_box(&records), &open)))
    });
}

fn bench_catalog_import(c: &mut Criterion) {
    let csv = generate_catalog_csv(2_000);

    c.bench_function("parse_catalog_2000_rows", |b| {
        b.iter(|| black_box(parse_catalog(black_box(&csv), SourceFormat::Csv)))
    });
}

criterion_group!(
    benches,
    bench_scoring,
    bench_risk_inference,
    bench_evaluate,
    bench_catalog_import
);
criterion_main!(benches);
