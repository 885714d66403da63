//! gravitys3 - Storage usage audit for S3-compatible object stores.
//!
//! Usage:
//!   gravitys3                      Audit every bucket, print JSON
//!   gravitys3 -b media -b backups  Audit selected buckets only
//!   gravitys3 --format text        Print a readable summary
//!   gravitys3 -o report.json       Write the report to a file
//!   gravitys3 --help               Show help
//!
//! Credentials come from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`
//! (or `--access-key` / `--secret-key`). The endpoint and region default to
//! `WASABI_ENDPOINT` and `AWS_DEFAULT_REGION` when set.

use std::fmt::Write as _;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use futures::{TryStreamExt, pin_mut};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use gravitys3_analyze::{Summarizer, SummaryConfig};
use gravitys3_core::{AuditConfig, BucketSummary, ConfigError, Report, format_size};
use gravitys3_scan::{ListProgress, S3Lister};

#[derive(Parser)]
#[command(
    name = "gravitys3",
    version,
    about = "Storage usage audit for S3-compatible object stores",
    long_about = "gravitys3 lists every object in every bucket your credentials can see \
                  and reports where the bytes go: by top-level prefix, by file type, \
                  and by year of last modification.\n\n\
                  The audit is read-only."
)]
struct Cli {
    /// Access key id (overrides AWS_ACCESS_KEY_ID)
    #[arg(long)]
    access_key: Option<String>,

    /// Secret access key (overrides AWS_SECRET_ACCESS_KEY)
    #[arg(long)]
    secret_key: Option<String>,

    /// Service endpoint (overrides WASABI_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,

    /// Signing region (overrides AWS_DEFAULT_REGION)
    #[arg(long)]
    region: Option<String>,

    /// Only audit this bucket (repeatable)
    #[arg(short, long = "bucket", value_name = "NAME")]
    buckets: Vec<String>,

    /// Number of sample keys to keep per bucket
    #[arg(short = 'n', long, default_value = "20")]
    samples: NonZeroUsize,

    /// Output format
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    };
    tracing::info!(?config, "starting audit");

    let report = run_audit(&config).await?;

    let rendered = match cli.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Text => render_text(&report),
    };
    write_output(&rendered, cli.output.as_deref())?;

    Ok(())
}

/// Set up stderr logging. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve configuration once: flags first, then the environment.
fn load_config(cli: &Cli) -> Result<AuditConfig, ConfigError> {
    config_from(cli, |name| std::env::var(name).ok())
}

fn config_from<F>(cli: &Cli, env: F) -> Result<AuditConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let flag = |name: &str| match name {
        "AWS_ACCESS_KEY_ID" => cli.access_key.clone(),
        "AWS_SECRET_ACCESS_KEY" => cli.secret_key.clone(),
        "WASABI_ENDPOINT" => cli.endpoint.clone(),
        "AWS_DEFAULT_REGION" => cli.region.clone(),
        _ => None,
    };

    let mut config =
        AuditConfig::from_lookup(|name: &str| flag(name).or_else(|| env(name)))?;
    config.buckets = cli.buckets.clone();
    config.sample_cap = cli.samples.get();
    Ok(config)
}

/// Audit every selected bucket, one at a time.
async fn run_audit(config: &AuditConfig) -> Result<Report> {
    let lister = S3Lister::connect(config).await;
    tokio::spawn(log_progress(lister.subscribe()));

    let mut report = Report::new(lister.endpoint());
    let buckets = lister
        .list_buckets()
        .await
        .context("Failed to enumerate buckets")?;

    for name in buckets.into_iter().filter(|b| config.includes_bucket(b)) {
        let location = lister.bucket_location(&name).await;
        tracing::info!(
            bucket = %name,
            region = %location.region,
            endpoint = %location.endpoint,
            "auditing bucket"
        );

        let mut summarizer = Summarizer::new(
            name.clone(),
            location.clone(),
            SummaryConfig::with_sample_cap(config.sample_cap),
        );

        let pages = lister.object_pages(&name, &location);
        pin_mut!(pages);
        while let Some(page) = pages.try_next().await? {
            summarizer.extend(page);
            tracing::trace!(
                bucket = %name,
                objects = summarizer.objects(),
                bytes = summarizer.bytes(),
                "page folded"
            );
        }

        let summary = summarizer.finish();
        tracing::info!(
            bucket = %summary.bucket,
            objects = summary.objects,
            size = %summary.bytes_human,
            "bucket done"
        );
        report.buckets.push(summary);
    }

    Ok(report)
}

/// Log listing progress until the lister goes away.
async fn log_progress(mut rx: broadcast::Receiver<ListProgress>) {
    loop {
        match rx.recv().await {
            Ok(progress) => tracing::debug!(
                bucket = %progress.bucket,
                pages = progress.pages_fetched,
                objects = progress.objects_listed,
                rate = progress.objects_per_second(),
                "listing"
            ),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

/// Write the rendered report to a file or stdout.
fn write_output(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported to {}", path.display());
        }
        None => {
            println!("{rendered}");
        }
    }
    Ok(())
}

/// Render a human-readable report.
fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let rule = "─".repeat(70);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        " {} bucket(s) via {} - {} in {} objects",
        report.buckets.len(),
        report.default_endpoint,
        format_size(report.total_bytes()),
        report.total_objects()
    );
    let _ = writeln!(out, "{rule}");

    for summary in &report.buckets {
        render_bucket(&mut out, summary);
    }

    out
}

fn render_bucket(out: &mut String, summary: &BucketSummary) {
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        " {} ({}) - {}",
        summary.bucket, summary.region, summary.bytes_human
    );
    let last = summary
        .last_modified
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "never".to_string());
    let _ = writeln!(
        out,
        " {} objects, last modified {last}",
        summary.objects
    );

    if summary.is_empty() {
        return;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, " File Types:");
    for (category, totals) in &summary.groups {
        let _ = writeln!(
            out,
            "   {:<12} {:>12} {:>8} files  {}",
            category.as_str(),
            format_size(totals.bytes),
            totals.count,
            make_bar(ratio(totals.bytes, summary.bytes), 20)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, " Top Prefixes:");
    for prefix in summary.top_prefixes.iter().take(10) {
        let _ = writeln!(
            out,
            "   {:<30} {:>12} {:>8} files",
            truncate(&prefix.prefix, 30),
            prefix.bytes_human,
            prefix.count
        );
    }
    let hidden = summary.top_prefixes.len().saturating_sub(10);
    if hidden > 0 {
        let _ = writeln!(out, "   ... and {hidden} more");
    }

    if !summary.year_histogram.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, " By Year:");
        for (year, totals) in &summary.year_histogram {
            let _ = writeln!(
                out,
                "   {:<6} {:>12} {:>8} files",
                year,
                format_size(totals.bytes),
                totals.count
            );
        }
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64
    } else {
        0.0
    }
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
