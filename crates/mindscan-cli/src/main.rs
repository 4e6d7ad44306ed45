//! MindScan
//!
//! Trains a TF-IDF + logistic regression classifier on labeled statements
//! and assesses a profile's posts against a rule cascade.

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use config::{AppConfig, Overrides};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.log_json);
    describe_metrics();

    let overrides = match &cli.command {
        Commands::Train { corpus, output } => Overrides {
            corpus: corpus.clone(),
            model_path: output.clone(),
            ..Default::default()
        },
        Commands::Predict { model, .. } => Overrides {
            model_path: model.clone(),
            ..Default::default()
        },
        Commands::Analyze { model, rules, .. } => Overrides {
            model_path: model.clone(),
            rules: rules.clone(),
            ..Default::default()
        },
    };

    // Load configuration
    let config = AppConfig::load(&cli.config, &overrides)?;
    info!(
        model = %config.model_path.display(),
        corpus = %config.corpus.path.display(),
        rules = config.rules.rules.len(),
        "Configuration loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Train { .. } => commands::run_train(&config, &mut out),
        Commands::Predict { text, json, .. } => {
            commands::run_predict(&config, &text.join(" "), json, &mut out)
        }
        Commands::Analyze { posts, json, .. } => {
            let mut stdin = std::io::stdin().lock();
            commands::run_analyze(&config, posts.as_deref(), json, &mut stdin, &mut out)
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("mindscan=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mindscan=info"))
    };

    // Logs go to stderr so reports on stdout stay machine-readable
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Register metric descriptions; without an installed recorder these are no-ops
fn describe_metrics() {
    metrics::describe_counter!(
        "mindscan_posts_classified_total",
        "Posts that produced a prediction"
    );
    metrics::describe_counter!(
        "mindscan_posts_skipped_total",
        "Posts without usable text or with a classification error"
    );
    metrics::describe_counter!(
        "mindscan_translation_failures_total",
        "Translations that fell back to the untranslated text"
    );
    metrics::describe_counter!(
        "mindscan_verdicts_total",
        "Profile verdicts by deciding rule"
    );
    metrics::describe_histogram!(
        "mindscan_predict_latency_us",
        metrics::Unit::Microseconds,
        "Single-text prediction latency in microseconds"
    );
}
