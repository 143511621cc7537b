//! outline-audit
//!
//! Checks a course outline against a compliance checklist and prints one
//! verdict per item, either as a table or as the full JSON run.
//!
//! ```text
//! outline-audit --document outline.pdf
//! outline-audit --document outline.txt --checklist items.txt --context "No final exam" --json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use checklist_engine::{
    builtin_checklist, parse_checklist, Analyzer, ChecklistEngine, Config, HttpOracle,
};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod report;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "outline-audit")]
#[command(about = "Check a course outline against a compliance checklist")]
struct Args {
    /// Course outline (.pdf, .docx, .txt or .md)
    #[arg(short, long)]
    document: PathBuf,

    /// Checklist file with numbered or bulleted items; the built-in
    /// checklist is used when omitted
    #[arg(short, long)]
    checklist: Option<PathBuf>,

    /// Additional context, e.g. "This course has no final exam"
    #[arg(long, default_value = "")]
    context: String,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ask the configured oracle for a second opinion
    #[arg(long)]
    oracle: bool,

    /// Print the full analysis run as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let document = shared_text::extract_text(&args.document)
        .with_context(|| format!("Failed to extract text from {}", args.document.display()))?;
    let items = match &args.checklist {
        Some(path) => {
            let text = shared_text::extract_text(path)
                .with_context(|| format!("Failed to read checklist {}", path.display()))?;
            parse_checklist(&text)
        }
        None => builtin_checklist().iter().map(|item| item.to_string()).collect(),
    };
    info!(
        document = %args.document.display(),
        items = items.len(),
        "Checking outline"
    );

    let oracle_config = config.oracle.clone();
    let mut analyzer = Analyzer::new(ChecklistEngine::new(config));
    if args.oracle {
        match HttpOracle::from_config(&oracle_config) {
            Ok(oracle) => analyzer = analyzer.with_oracle(Arc::new(oracle)),
            Err(err) => warn!(error = %err, "oracle unavailable, using rule-based verdicts only"),
        }
    }

    let run = analyzer.analyze(&items, &document, &args.context).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print!("{}", report::render_table(&run));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_is_required() {
        assert!(Args::try_parse_from(["outline-audit"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["outline-audit", "--document", "outline.pdf"]).unwrap();
        assert_eq!(args.document, PathBuf::from("outline.pdf"));
        assert_eq!(args.checklist, None);
        assert_eq!(args.context, "");
        assert!(!args.oracle && !args.json && !args.verbose);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "outline-audit",
            "-d",
            "outline.txt",
            "-c",
            "items.md",
            "--context",
            "No final exam",
            "--config",
            "audit.toml",
            "--oracle",
            "--json",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.checklist, Some(PathBuf::from("items.md")));
        assert_eq!(args.context, "No final exam");
        assert_eq!(args.config, Some(PathBuf::from("audit.toml")));
        assert!(args.oracle && args.json && args.verbose);
    }
}
