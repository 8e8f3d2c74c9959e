mod attribution;
mod contributors;
mod directory;
mod format;
mod preferences;
mod raw;
mod render;
mod report;
mod timeline;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use preferences::Preferences;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Builds a readable timeline and contributor report from an issue
/// tracker's JSON export.
#[derive(Debug, Parser)]
#[command(name = "issuetrail", version)]
struct Cli {
    /// Issue JSON file; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Preferences file (default: ./issuetrail.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Truncate comment text beyond this many characters (0 = never).
    #[arg(long)]
    max_comment_length: Option<usize>,

    /// Keep only this many of the most recent activities (0 = all).
    #[arg(long)]
    max_activities: Option<usize>,

    /// Attach the source record to every timeline item.
    #[arg(long)]
    include_raw_data: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    let prefs = Preferences::load(cli.config.as_deref())?;
    let mut options = prefs.report_options();
    if let Some(n) = cli.max_comment_length {
        options.max_comment_length = n;
    }
    if let Some(n) = cli.max_activities {
        options.max_activities = n;
    }
    if cli.include_raw_data {
        options.include_raw_data = true;
    }
    debug!(?options, "report options");

    let input = read_input(cli.input.as_ref())?;
    let issue: Value = serde_json::from_str(&input).context("parsing issue JSON")?;
    let report = report::build_report(&issue, &options);

    let output = match cli.format {
        OutputFormat::Json => render::render_json(&report)?,
        OutputFormat::Text => {
            let template = prefs.load_report_template()?;
            render::render_text(&report, &template)?
        }
    };
    Ok(output)
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok(output) => println!("{}", output.trim_end()),
        Err(err) => {
            eprintln!("issuetrail: {err:#}");
            process::exit(2);
        }
    }
}
