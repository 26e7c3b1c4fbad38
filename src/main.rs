//! audit-tools: compliance audit scoring and remediation planning
//!
//! Scores questionnaire-based compliance audits, infers per-item risk and
//! renders prioritized remediation plans.

#![allow(clippy::too_many_lines, clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use audit_tools::{
    cli::{self, CatalogSource, EvaluateArgs, SetArgs},
    config::AppConfig,
    model::{AuditInfo, ComplianceLevel},
    pipeline::{exit_codes, resolve_store_path},
    reports::{ReportFormat, ReportSection},
    scoring::RecordFilter,
};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nCatalog and answer sheets:",
        "\n  CSV (',' or ';'), YAML, JSON",
        "\n\nOutput Formats:",
        "\n  summary, table, json, csv, markdown, html",
        "\n\nFeatures:",
        "\n  Weighted compliance rate, per-domain scores, risk inference, remediation plan"
    )
}

#[derive(Parser)]
#[command(name = "audit-tools")]
#[command(version, long_version = build_long_version())]
#[command(about = "Compliance audit scoring and risk-based remediation planning", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Compliance rate below --min-rate / some imported rows rejected
    3  Error occurred

EXAMPLES:
    # Start an audit from a catalog and keep the catalog as a named norm
    audit-tools --audit q3-2026 init --catalog iso27001.csv --save-norm iso27001

    # Import an answer sheet
    audit-tools --audit q3-2026 import answers.csv --norm iso27001

    # CI gate on the security domain
    audit-tools --audit q3-2026 score --domain Sécurité --min-rate 70

    # Full HTML report
    audit-tools --audit q3-2026 report --norm iso27001 -o html -O report.html")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Response store file
    #[arg(long, global = true, env = "AUDIT_TOOLS_STORE")]
    store: Option<PathBuf>,

    /// Audit id (defaults to `audit.default_audit` from the config)
    #[arg(short, long, global = true, env = "AUDIT_TOOLS_AUDIT")]
    audit: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Shared argument groups
// ============================================================================

/// Catalog selection
#[derive(Args)]
struct CatalogArgs {
    /// Catalog file (CSV, YAML or JSON)
    #[arg(long, conflicts_with = "norm")]
    catalog: Option<PathBuf>,

    /// Name of a saved norm
    #[arg(long)]
    norm: Option<String>,
}

impl From<CatalogArgs> for CatalogSource {
    fn from(args: CatalogArgs) -> Self {
        Self {
            path: args.catalog,
            norm: args.norm,
        }
    }
}

/// Audit description
#[derive(Args)]
struct AuditInfoArgs {
    /// Project the audit belongs to
    #[arg(long)]
    project: Option<String>,

    /// Audited client
    #[arg(long)]
    client: Option<String>,

    /// Standard the audit follows (defaults to the norm name)
    #[arg(long)]
    standard: Option<String>,

    /// Version of the standard
    #[arg(long, value_name = "VERSION")]
    standard_version: Option<String>,
}

impl From<AuditInfoArgs> for AuditInfo {
    fn from(args: AuditInfoArgs) -> Self {
        Self {
            project: args.project,
            client: args.client,
            standard: args.standard,
            version: args.standard_version,
            created_at: None,
        }
    }
}

/// View selection
#[derive(Args)]
struct ViewArgs {
    /// Only records of this domain
    #[arg(long)]
    domain: Option<String>,

    /// Only records whose qid, item, question or comment contain this text
    #[arg(long)]
    query: Option<String>,

    /// Only non-compliant and partially compliant records
    #[arg(long)]
    open_only: bool,
}

impl From<ViewArgs> for RecordFilter {
    fn from(args: ViewArgs) -> Self {
        Self {
            domain: args.domain,
            query: args.query,
            open_only: args.open_only,
        }
    }
}

/// Report output
#[derive(Args)]
struct OutputArgs {
    /// Output format
    #[arg(short, long)]
    output: Option<ReportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Maximum rows in findings and plan sections
    #[arg(long)]
    max_items: Option<usize>,
}

/// Target record of an evidence change
#[derive(Args)]
struct EvidenceArgs {
    /// Question id
    qid: String,

    /// Evidence references (file names, URLs, ticket ids)
    #[arg(required = true)]
    evidence: Vec<String>,

    /// Item within the question (defaults to the qid)
    #[arg(long)]
    item: Option<String>,
}

// ============================================================================
// Subcommands
// ============================================================================

#[derive(Subcommand)]
enum Commands {
    /// Seed an audit with one record per catalog row
    Init {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Initial level of new records (defaults to `audit.seed_level`)
        #[arg(long, value_parser = parse_level)]
        level: Option<ComplianceLevel>,

        /// Also save the catalog as a named norm
        #[arg(long, value_name = "NAME")]
        save_norm: Option<String>,

        #[command(flatten)]
        info: AuditInfoArgs,
    },

    /// Import an answer sheet into an audit
    Import {
        /// Answer sheet (CSV, YAML or JSON)
        answers: PathBuf,

        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Record the level of one item
    Set {
        /// Question id
        qid: String,

        /// Compliance level (compliant, partial, non-compliant, n/a, ...)
        #[arg(value_parser = parse_level)]
        level: ComplianceLevel,

        /// Item within the question (defaults to the qid)
        #[arg(long)]
        item: Option<String>,

        /// Domain, for items unknown to the catalog and the store
        #[arg(long)]
        domain: Option<String>,

        /// Question text, for items unknown to the catalog
        #[arg(long)]
        question: Option<String>,

        /// Auditor comment
        #[arg(short = 'm', long)]
        comment: Option<String>,

        /// Evidence references, replacing the stored ones
        #[arg(long, value_delimiter = ';')]
        evidence: Option<Vec<String>>,

        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Attach evidence references to a record
    Attach(EvidenceArgs),

    /// Remove evidence references from a record
    Detach(EvidenceArgs),

    /// Compute the compliance rate of an audit view
    Score {
        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Exit with code 1 if the rate is below this percentage
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        min_rate: Option<u32>,
    },

    /// Show the remediation plan of an audit view
    Plan {
        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render a full audit report
    Report {
        #[command(flatten)]
        view: ViewArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Sections to include
        #[arg(long, value_delimiter = ',')]
        sections: Vec<ReportSection>,
    },

    /// List stored audits, or the records of the selected audit
    List {
        /// List the records of the selected audit
        #[arg(long)]
        records: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every record of an audit
    Delete {
        /// Audit to delete
        audit_id: String,
    },

    /// Manage the library of saved norms
    Norm {
        #[command(subcommand)]
        action: NormAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `norm` command
#[derive(Subcommand)]
enum NormAction {
    /// Save a catalog file under a name, replacing any norm of that name
    Save {
        name: String,
        /// Catalog file (CSV, YAML or JSON)
        path: PathBuf,
    },
    /// List saved norms
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the rows of a saved norm
    Show {
        name: String,
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved norm
    Delete { name: String },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .audit-tools.yaml in the current directory
    Init,
}

fn parse_level(raw: &str) -> Result<ComplianceLevel, String> {
    Ok(ComplianceLevel::normalize(raw))
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

/// Effective configuration: config file, then global flags, then `output`.
fn effective_config(cli: &Cli, output: Option<&OutputArgs>) -> AppConfig {
    let mut overrides = AppConfig::builder()
        .store_path(cli.store.clone())
        .no_color(cli.no_color);
    if let Some(args) = output {
        if let Some(format) = args.output {
            overrides = overrides.output_format(format);
        }
        overrides = overrides.output_file(args.output_file.clone());
    }
    let mut overrides = overrides.build();
    overrides.report.max_items = output.and_then(|args| args.max_items);

    let (config, loaded_from) =
        AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides);
    if let Some(path) = loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }
    config
}

fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.command {
        Commands::Score { output, .. }
        | Commands::Plan { output, .. }
        | Commands::Report { output, .. } => effective_config(&cli, Some(output)),
        _ => effective_config(&cli, None),
    };
    let audit_id = cli
        .audit
        .clone()
        .unwrap_or_else(|| config.audit.default_audit.clone());

    // Dispatch to command handlers
    match cli.command {
        Commands::Init {
            catalog,
            level,
            save_norm,
            info,
        } => cli::run_init(
            &config,
            &audit_id,
            &catalog.into(),
            level,
            save_norm.as_deref(),
            info.into(),
        ),

        Commands::Import { answers, catalog } => {
            cli::run_import(&config, &audit_id, &answers, &catalog.into())
        }

        Commands::Set {
            qid,
            level,
            item,
            domain,
            question,
            comment,
            evidence,
            catalog,
        } => cli::run_set(
            &config,
            &audit_id,
            SetArgs {
                qid,
                item,
                domain,
                question,
                level,
                comment,
                evidence,
            },
            &catalog.into(),
        ),

        Commands::Attach(args) => cli::run_attach(
            &config,
            &audit_id,
            &args.qid,
            args.item.as_deref(),
            &args.evidence,
            false,
        ),

        Commands::Detach(args) => cli::run_attach(
            &config,
            &audit_id,
            &args.qid,
            args.item.as_deref(),
            &args.evidence,
            true,
        ),

        Commands::Score {
            view,
            catalog,
            min_rate,
            ..
        } => cli::run_score(
            &config,
            &evaluate_args(audit_id, view, catalog),
            min_rate,
        ),

        Commands::Plan { view, catalog, .. } => {
            cli::run_plan(&config, &evaluate_args(audit_id, view, catalog))
        }

        Commands::Report {
            view,
            catalog,
            sections,
            ..
        } => cli::run_report(&config, &evaluate_args(audit_id, view, catalog), sections),

        Commands::List { records, json } => {
            let selected = records.then_some(audit_id.as_str());
            cli::run_list(&config, selected, json)
        }

        Commands::Delete { audit_id } => cli::run_delete(&config, &audit_id),

        Commands::Norm { action } => match action {
            NormAction::Save { name, path } => cli::run_norm_save(&config, &name, &path),
            NormAction::List { json } => cli::run_norm_list(&config, json),
            NormAction::Show { name, json } => cli::run_norm_show(&config, &name, json),
            NormAction::Delete { name } => cli::run_norm_delete(&config, &name),
        },

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "audit-tools", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = audit_tools::config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (_, loaded_from) = audit_tools::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                eprintln!("# Store: {}", resolve_store_path(&config).display());
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    ::dirs::config_dir().map(|p| p.join("audit-tools").display().to_string()),
                    ::dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in &[
                    ".audit-tools.yaml",
                    ".audit-tools.yml",
                    "audit-tools.yaml",
                    "audit-tools.yml",
                ] {
                    eprintln!("  {name}");
                }
                eprintln!();
                match audit_tools::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".audit-tools.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = audit_tools::config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}

fn evaluate_args(audit_id: String, view: ViewArgs, catalog: CatalogArgs) -> EvaluateArgs {
    EvaluateArgs {
        audit_id,
        filter: view.into(),
        catalog: catalog.into(),
    }
}
