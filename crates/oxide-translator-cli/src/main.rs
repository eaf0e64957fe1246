//! oxide-translate CLI
//!
//! Translates a JSON-encoded argument stream into SQL for one engine and
//! prints the statement.

mod stream;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, warn, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_translator::{EngineKind, Translation, Translator, TranslatorConfig};

/// Injection-safe SQL template translator.
#[derive(Parser)]
#[command(name = "oxide-translate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file holding the argument stream (stdin if not specified).
    input: Option<PathBuf>,

    /// Engine used for escaping.
    #[arg(short, long, env = "OXIDE_TRANSLATE_ENGINE")]
    engine: Option<EngineKind>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Substitution as `name=text`; may be repeated.
    #[arg(short, long = "sub", value_name = "NAME=TEXT", value_parser = parse_substitution)]
    substitutions: Vec<(String, String)>,

    /// Treat `?` as plain text instead of a placeholder.
    #[arg(long)]
    no_placeholders: bool,

    /// Print the statement even if it has issues, and exit successfully.
    #[arg(long)]
    dump: bool,

    /// Print a JSON report instead of the bare statement.
    #[arg(long)]
    json: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

/// Machine-readable outcome of a translation.
#[derive(Debug, Serialize)]
struct Report<'a> {
    engine: &'a str,
    sql: &'a str,
    ok: bool,
    issues: Vec<String>,
    masked_regions: usize,
}

impl<'a> Report<'a> {
    fn new(engine: &'a str, translation: &'a Translation) -> Self {
        Self {
            engine,
            sql: &translation.sql,
            ok: translation.is_ok(),
            issues: translation.issues.iter().map(ToString::to_string).collect(),
            masked_regions: translation.masked_regions,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = build_config(&cli)?;
    debug!(engine = %config.engine, substitutions = config.substitutions.len(), "configured");
    let translator = Translator::from_config(&config);

    let input = read_input(cli.input.as_deref())?;
    let args = stream::parse(&input)?;
    let translation = translator.translate(args)?;

    if cli.json {
        let report = Report::new(translator.engine().name(), &translation);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", translation.sql);
    }

    for issue in &translation.issues {
        warn!(%issue, "translate issue");
    }
    if !cli.dump {
        translation.into_result()?;
    }
    Ok(())
}

/// Merges the configuration file with command-line overrides.
fn build_config(cli: &Cli) -> Result<TranslatorConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TranslatorConfig::default(),
    };
    if let Some(engine) = cli.engine {
        config.engine = engine;
    }
    config
        .substitutions
        .extend(cli.substitutions.iter().cloned());
    if cli.no_placeholders {
        config.placeholders = false;
    }
    Ok(config)
}

fn load_config(path: &Path) -> Result<TranslatorConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn parse_substitution(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, text)| (String::from(name), String::from(text)))
        .ok_or_else(|| format!("expected NAME=TEXT, got '{s}'"))
}
