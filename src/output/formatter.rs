use std::fmt::{self, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::intercept::guard::Decision;
use crate::output::report::{self, Finding, Summary};

/// Rendering of audit findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per statement followed by a summary line.
    #[default]
    Text,
    /// Pretty-printed JSON array of findings.
    Json,
    /// Markdown report.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// Render `findings` in `format`.
pub fn render(findings: &[Finding], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(findings)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(findings)
                .map_err(|e| Error::Output(format!("Failed to serialize findings: {e}")))?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Markdown => Ok(report::build_report(findings)),
    }
}

fn render_text(findings: &[Finding]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, findings);
    out
}

fn write_text(out: &mut String, findings: &[Finding]) -> fmt::Result {
    for finding in findings {
        write!(out, "{}: {}", finding.location(), finding.decision.label())?;
        match &finding.decision {
            Decision::Inject { rules, table } => {
                if let Some(table) = table {
                    write!(out, " table={}", table.qualified_name())?;
                }
                write!(out, " rules={}", rules.join(","))?;
            }
            Decision::Unsupported { reason } => write!(out, " ({reason})")?,
            _ => {}
        }
        writeln!(out)?;
    }
    let summary = Summary::of(findings);
    writeln!(
        out,
        "{} statement(s): {} need a tenant filter, {} already scoped, {} unmatched, {} exempt, {} unsupported",
        summary.total(),
        summary.inject,
        summary.already_scoped,
        summary.no_matching_rule,
        summary.exempt,
        summary.unsupported
    )
}

/// Write rendered output to `path`, creating parent directories.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::Output("Output path must not be empty".to_string()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Output(format!("Failed to create output directory: {e}")))?;
    }
    std::fs::write(path, content)
        .map_err(|e| Error::Output(format!("Failed to write {}: {e}", path.display())))
}
