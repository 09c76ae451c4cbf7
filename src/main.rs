//! graph-iaa - inter-annotator agreement for graph-annotated texts
//!
//! A CLI tool that collects the labeled edges of every annotator from
//! their saved graph state, reconciles the annotators against each other,
//! and reports agreement coefficients for one text.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable corpus, missing annotation, undefined coefficient, etc.)

mod agreement;
mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;
mod schema;

use agreement::AnnotationTask;
use analysis::AggregateOptions;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use models::{AggregatedCorpus, AgreementReport, CorpusSummary, ReportMetadata};
use scanner::{AnnotatorScanner, ScanConfig};
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let (mut config, origin) = load_config(&args)?;
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("graph-iaa v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    match run(&args, &config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Agreement run failed: {:#}", e);
            eprintln!("\nError: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .graph-iaa.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Set corpus.data_root and task.text, then run graph-iaa.");
    Ok(())
}

/// Initialize logging from the command line and the merged configuration.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run aggregation and, unless dry-running, the agreement computation.
fn run(args: &Args, config: &Config) -> Result<i32> {
    let scanner = AnnotatorScanner::new(
        config.corpus.data_root.clone(),
        ScanConfig::from(&config.corpus),
    );
    let annotators = scanner
        .resolve(&config.task.annotators)
        .context("Failed to resolve annotators")?;
    info!("Annotators: {}", annotators.join(", "));

    let corpus = analysis::aggregate(
        &scanner,
        &annotators,
        &AggregateOptions::from(&config.corpus),
        !args.quiet,
    )
    .context("Failed to aggregate annotations")?;

    if args.dry_run {
        return handle_dry_run(&corpus);
    }

    let text = config
        .task
        .text
        .clone()
        .context("No text selected: pass --text or set task.text in the config file")?;

    let report = compute_report(config, &corpus, &annotators, &text)?;

    print!(
        "{}",
        report::generate_text_report(&report, config.report.precision)
    );

    if let Some(ref output) = args.output {
        let content = report::render(&report, config.report.format, config.report.precision)?;
        report::write_report(&content, output)?;
        info!("Report saved to {}", output.display());
    }

    Ok(0)
}

/// Reconcile `annotators` on `text` and compute the coefficients.
fn compute_report(
    config: &Config,
    corpus: &AggregatedCorpus,
    annotators: &[String],
    text: &str,
) -> Result<AgreementReport> {
    let policy = config.policy();
    if policy.dummy_label.is_empty() {
        anyhow::bail!("task.dummy_label must contain at least one label");
    }
    debug!("Policy: {:?}", policy);

    let items = analysis::build(corpus, text, annotators, &policy)
        .with_context(|| format!("Failed to build agreement data for '{}'", text))?;
    let distinct_items: BTreeSet<&str> = items.iter().map(|i| i.item.as_str()).collect();
    info!(
        "{} annotations over {} items for '{}'",
        items.len(),
        distinct_items.len(),
        text
    );

    let task = AnnotationTask::new(&items, config.task.distance);
    debug!(
        "{} coders, {} distance",
        task.coder_count(),
        config.task.distance
    );
    let coefficients = task
        .coefficients()
        .with_context(|| format!("Cannot compute agreement for '{}'", text))?;

    Ok(AgreementReport {
        metadata: ReportMetadata {
            text: text.to_string(),
            coders: analysis::coder_entries(annotators),
            distance: config.task.distance.to_string(),
            flexible: policy.flexible,
            add_missing: policy.add_missing,
            dummy_label: policy.dummy_label.clone(),
            triples: items.len(),
            items: distinct_items.len(),
            analysis_date: Utc::now(),
        },
        coefficients,
    })
}

/// Handle --dry-run: print what was aggregated and exit.
fn handle_dry_run(corpus: &AggregatedCorpus) -> Result<i32> {
    println!("\nDry run: corpus aggregated, no agreement computed.\n");

    let summary = CorpusSummary::from_corpus(corpus);
    if summary.annotators.is_empty() {
        println!("   No annotators found.");
    } else {
        println!("{}", report::generate_summary_text(&summary));
    }

    Ok(0)
}

/// Where the configuration came from.
///
/// Config is loaded before logging is set up, so this is logged afterwards.
enum ConfigOrigin {
    Explicit(std::path::PathBuf),
    DefaultFile,
    Defaults,
    DefaultFileInvalid(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::DefaultFileInvalid(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::DefaultFileInvalid(e))),
    }
}
