//! CLI entry point for `tenant-guard`.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tenant_guard::config::GuardConfig;
use tenant_guard::intercept::guard::{Decision, TenantGuard};
use tenant_guard::output::formatter::{self, OutputFormat};
use tenant_guard::output::report::Finding;
use tenant_guard::parser::sql_parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tenant-guard",
    about = "Report which SQL statements need a tenant filter"
)]
struct Cli {
    /// Input SQL files
    #[arg(required_unless_present = "sql_dir")]
    input: Vec<PathBuf>,

    /// Audit all .sql files in directory
    #[arg(long)]
    sql_dir: Option<PathBuf>,

    /// JSON policy configuration (sentinel, rules, exemptions)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Tenant discriminator column, overriding the configuration
    #[arg(long)]
    sentinel: Option<String>,

    /// Output format: text, json or markdown
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Write the rendered findings to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log analysis decisions to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Collect input files
    let mut sql_files = cli.input.clone();
    if let Some(dir) = &cli.sql_dir {
        match std::fs::read_dir(dir) {
            Ok(entries) => {
                let mut found: Vec<PathBuf> = entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|path| path.extension().is_some_and(|e| e == "sql"))
                    .collect();
                found.sort();
                sql_files.extend(found);
            }
            Err(e) => {
                eprintln!("Error reading SQL directory: {e}");
                process::exit(2);
            }
        }
    }

    if sql_files.is_empty() {
        eprintln!("No input SQL files provided");
        process::exit(2);
    }

    let guard = match build_guard(cli.rules.as_deref(), cli.sentinel.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error loading policy configuration: {e}");
            process::exit(2);
        }
    };

    let mut findings = Vec::new();
    for path in &sql_files {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(2);
            }
        };
        match audit_source(&guard, &path.display().to_string(), &content) {
            Ok(mut file_findings) => findings.append(&mut file_findings),
            Err(e) => {
                eprintln!("Error parsing {}: {e}", path.display());
                process::exit(2);
            }
        }
    }

    let rendered = match formatter::render(&findings, cli.format) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error rendering output: {e}");
            process::exit(2);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = formatter::write_output(path, &rendered) {
                eprintln!("Error writing output: {e}");
                process::exit(2);
            }
        }
        None => print!("{rendered}"),
    }

    // Exit code based on decisions
    if findings.iter().any(|f| f.decision.requires_filter()) {
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_guard(rules: Option<&Path>, sentinel: Option<&str>) -> tenant_guard::Result<TenantGuard> {
    let mut config = match rules {
        Some(path) => GuardConfig::from_path(path)?,
        None => GuardConfig::default(),
    };
    if let Some(sentinel) = sentinel {
        config.sentinel = Some(sentinel.to_string());
    }
    config.build()
}

fn audit_source(guard: &TenantGuard, source: &str, sql: &str) -> tenant_guard::Result<Vec<Finding>> {
    let statements = sql_parser::parse_statements(sql)?;
    Ok(statements
        .into_iter()
        .enumerate()
        .map(|(i, (sql, lowered))| {
            let decision = match lowered {
                Ok(statement) => guard.inspect_statement(&statement),
                Err(e) => Decision::Unsupported {
                    reason: e.to_string(),
                },
            };
            tracing::debug!(source, index = i + 1, decision = decision.label(), "audited statement");
            Finding {
                source: source.to_string(),
                index: i + 1,
                sql,
                decision,
            }
        })
        .collect())
}
