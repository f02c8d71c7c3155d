//! CLI command definitions and handlers

mod audit;
mod init;
mod rules;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a 0-100 score threshold
fn parse_score(s: &str) -> Result<u32, String> {
    let n: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid score", s))?;
    if n > 100 {
        Err("score threshold cannot exceed 100".to_string())
    } else {
        Ok(n)
    }
}

/// pageaudit - deterministic single-page SEO and content audit
#[derive(Parser, Debug)]
#[command(name = "pageaudit")]
#[command(
    version,
    about = "Audit a fetched web page for SEO and content quality, producing a weighted 0-100 score",
    long_about = "pageaudit runs ten weighted audit phases (structured data, metadata, headings, \
content quality, accessibility, linking, calls to action, topical relevance, page experience, \
factual accuracy) over a fetched page and combines them into one score.\n\n\
No network access: the page and any Core Web Vitals or fact-check data are supplied as files.",
    after_help = "\
Examples:
  pageaudit audit page.json                          Audit fetcher output
  pageaudit audit page.html --url https://e.com/a    Audit raw markup
  pageaudit audit page.json --context map.json       Add topical map context
  pageaudit audit page.json --format json -o r.json  JSON report to a file
  pageaudit audit page.json --fail-under 80          Exit 1 when the score is below 80
  pageaudit rules                                    List phases and rules
  pageaudit init                                     Write an example pageaudit.toml"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit one page
    #[command(after_help = "\
INPUT is either fetcher output as JSON (url, html, text, status, headers, ...)
or a raw .html/.htm file.

Exit codes:
  0  audit completed (and met --fail-under, if given)
  1  score below --fail-under, or unreadable input
  2  phase contract violation or invalid scoring configuration")]
    Audit {
        /// Fetched page: JSON fetcher output or an .html file
        input: PathBuf,

        /// Topical map context as JSON (topic, target_keyword, entities, core_web_vitals, ...)
        #[arg(long, short = 'c')]
        context: Option<PathBuf>,

        /// Topic, overriding the context file
        #[arg(long)]
        topic: Option<String>,

        /// Target keyword, overriding the context file
        #[arg(long)]
        keyword: Option<String>,

        /// Page URL for .html input
        #[arg(long)]
        url: Option<String>,

        /// Config file (default: pageaudit.toml next to INPUT)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md"])]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit with code 1 when the overall score is below this
        #[arg(long, value_parser = parse_score)]
        fail_under: Option<u32>,

        /// Number of parallel workers (1-64, default: auto)
        #[arg(long, value_parser = parse_workers)]
        workers: Option<usize>,

        /// Explain the scoring formula with a per-phase breakdown
        #[arg(long)]
        explain: bool,

        /// Disable ANSI colors in text output (also NO_COLOR)
        #[arg(long)]
        no_color: bool,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// List audit phases, their weights and rules
    Rules {
        /// Only show this phase
        #[arg(long)]
        phase: Option<String>,

        /// Config file whose weights and disabled rules to show
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write an example pageaudit.toml
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Audit {
            input,
            context,
            topic,
            keyword,
            url,
            config,
            format,
            output,
            fail_under,
            workers,
            explain,
            no_color,
            compact,
        } => audit::run(audit::AuditArgs {
            input,
            context,
            topic,
            keyword,
            url,
            config,
            format,
            output,
            fail_under,
            workers,
            explain,
            no_color,
            compact,
        }),

        Commands::Rules { phase, config } => rules::run(phase.as_deref(), config.as_deref()),

        Commands::Init { path, force } => init::run(&path, force),
    }
}
