//! Audit command - run every phase over one fetched page

use crate::config::{load_audit_config, load_config_file, AuditConfig, CliDefaults, UserConfig};
use crate::content::FetchedContent;
use crate::context::TopicalMapContext;
use crate::engine::AuditEngine;
use crate::error::AuditError;
use crate::models::AuditReport;
use crate::reporters::{self, OutputFormat, RenderOptions};
use crate::scoring;
use anyhow::{Context, Result};
use console::style;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Flags of the `audit` subcommand
pub(super) struct AuditArgs {
    pub input: PathBuf,
    pub context: Option<PathBuf>,
    pub topic: Option<String>,
    pub keyword: Option<String>,
    pub url: Option<String>,
    pub config: Option<PathBuf>,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub fail_under: Option<u32>,
    pub workers: Option<usize>,
    pub explain: bool,
    pub no_color: bool,
    pub compact: bool,
}

pub(super) fn run(args: AuditArgs) -> Result<()> {
    let user_config = UserConfig::load()?;
    let config = load_config(&args)?;

    // CLI flags > project config > user config
    let defaults = CliDefaults {
        format: args.format.clone(),
        workers: args.workers,
        fail_under: args.fail_under,
    }
    .or(&config.defaults)
    .or(&user_config.defaults);
    debug!("Effective CLI defaults: {:?}", defaults);

    let format = OutputFormat::from_str(defaults.format.as_deref().unwrap_or("text"))?;
    let fetched = load_input(&args.input, args.url.as_deref())?;
    let context = load_context(&args)?;

    let engine = match AuditEngine::from_config(&config) {
        Ok(engine) => engine.with_workers(defaults.workers.unwrap_or(0)),
        Err(e) => exit_with_audit_error(e),
    };
    let report = match engine.run_audit(&fetched, &context) {
        Ok(report) => report,
        Err(e) => exit_with_audit_error(e),
    };

    let options = RenderOptions {
        color: !args.no_color
            && user_config.use_color()
            && args.output.is_none()
            && console::colors_enabled(),
        compact: args.compact,
    };
    let mut output = reporters::report_with_format(&report, format, options)?;
    if args.explain && format != OutputFormat::Json {
        output.push('\n');
        output.push_str(&scoring::explain(&report));
        output.push('\n');
    }

    write_output(&output, format, args.output.as_deref())?;
    check_fail_threshold(defaults.fail_under, &report);
    Ok(())
}

/// Explicit `--config`, else a config file next to the input
fn load_config(args: &AuditArgs) -> Result<AuditConfig> {
    match &args.config {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let dir = args
                .input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            Ok(load_audit_config(dir))
        }
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// Read fetcher JSON, or wrap a raw markup file as a browser-style fetch
fn load_input(path: &Path, url: Option<&str>) -> Result<FetchedContent> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input {}", path.display()))?;

    let mut fetched = if is_html(path) {
        FetchedContent::from_html(url.unwrap_or_default(), raw)
    } else {
        serde_json::from_str::<FetchedContent>(&raw)
            .with_context(|| format!("Failed to parse {} as fetcher JSON", path.display()))?
    };
    if let Some(url) = url {
        fetched.url = Some(Value::String(url.to_string()));
    }
    Ok(fetched)
}

fn load_context(args: &AuditArgs) -> Result<TopicalMapContext> {
    let mut context = match &args.context {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read context {}", path.display()))?;
            serde_json::from_str::<TopicalMapContext>(&raw)
                .with_context(|| format!("Invalid topical map context in {}", path.display()))?
        }
        None => TopicalMapContext::default(),
    };
    if let Some(topic) = &args.topic {
        context.topic = topic.clone();
    }
    if let Some(keyword) = &args.keyword {
        context.target_keyword = Some(keyword.clone());
    }
    Ok(context)
}

fn write_output(output: &str, format: OutputFormat, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            // stderr keeps stdout clean for machine-readable formats
            eprintln!(
                "Report written to: {}",
                style(path.display()).cyan()
            );
        }
        None => {
            if format == OutputFormat::Text {
                println!();
            }
            println!("{}", output);
        }
    }
    Ok(())
}

/// Exit 1 when the score misses the threshold
fn check_fail_threshold(fail_under: Option<u32>, report: &AuditReport) {
    if let Some(threshold) = fail_under {
        if report.overall_score < threshold {
            eprintln!(
                "Failing: score {} is below --fail-under={}",
                report.overall_score, threshold
            );
            std::process::exit(1);
        }
    }
}

/// Contract and configuration errors exit 2 with the offending phase
fn exit_with_audit_error(err: AuditError) -> ! {
    eprintln!("{} {}", style("error:").red().bold(), err);
    if let Some(phase) = err.phase() {
        eprintln!("  offending phase: {}", phase);
    }
    std::process::exit(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_html() {
        assert!(is_html(Path::new("page.html")));
        assert!(is_html(Path::new("dir/page.HTM")));
        assert!(!is_html(Path::new("page.json")));
        assert!(!is_html(Path::new("page")));
    }

    #[test]
    fn test_load_html_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<title>Hi</title>").expect("write");
        let fetched = load_input(&path, Some("https://example.com/hi")).expect("load");
        assert_eq!(fetched.url, Some(Value::String("https://example.com/hi".into())));
        assert_eq!(fetched.html, Some(Value::String("<title>Hi</title>".into())));
    }

    #[test]
    fn test_load_json_input_with_aliases() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("page.json");
        std::fs::write(&path, r#"{"final_url": "https://e.com", "raw_html": "<p>x</p>"}"#)
            .expect("write");
        let fetched = load_input(&path, None).expect("load");
        assert_eq!(fetched.url, Some(Value::String("https://e.com".into())));
    }

    #[test]
    fn test_load_invalid_json_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("page.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(load_input(&path, None).is_err());
    }

    #[test]
    fn test_context_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx_path = dir.path().join("ctx.json");
        std::fs::write(&ctx_path, r#"{"topic": "coffee", "target_keyword": "espresso"}"#)
            .expect("write");
        let args = AuditArgs {
            input: dir.path().join("page.json"),
            context: Some(ctx_path),
            topic: None,
            keyword: Some("grinder".into()),
            url: None,
            config: None,
            format: None,
            output: None,
            fail_under: None,
            workers: None,
            explain: false,
            no_color: true,
            compact: false,
        };
        let context = load_context(&args).expect("load context");
        assert_eq!(context.topic, "coffee");
        assert_eq!(context.target_keyword.as_deref(), Some("grinder"));
    }
}
