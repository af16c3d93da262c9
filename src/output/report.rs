use serde::Serialize;
use std::fmt::{self, Write};

use crate::intercept::guard::Decision;

/// Decision for one statement of an audited SQL source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// File (or other label) the statement came from.
    pub source: String,
    /// One-based position of the statement within its source.
    pub index: usize,
    /// Statement text as rendered after parsing.
    pub sql: String,
    /// Guard decision.
    #[serde(flatten)]
    pub decision: Decision,
}

impl Finding {
    /// `source#index`.
    pub fn location(&self) -> String {
        format!("{}#{}", self.source, self.index)
    }
}

/// Count of findings per decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Statements needing a tenant filter.
    pub inject: usize,
    /// Statements already carrying the sentinel.
    pub already_scoped: usize,
    /// Statements no rule applies to.
    pub no_matching_rule: usize,
    /// Exempt statements.
    pub exempt: usize,
    /// Statements that could not be analysed.
    pub unsupported: usize,
}

impl Summary {
    /// Tally `findings`.
    pub fn of(findings: &[Finding]) -> Self {
        findings
            .iter()
            .fold(Self::default(), |mut summary, finding| {
                match finding.decision {
                    Decision::Inject { .. } => summary.inject += 1,
                    Decision::AlreadyScoped => summary.already_scoped += 1,
                    Decision::NoMatchingRule => summary.no_matching_rule += 1,
                    Decision::Exempt => summary.exempt += 1,
                    Decision::Unsupported { .. } => summary.unsupported += 1,
                }
                summary
            })
    }

    /// Total number of statements.
    pub fn total(&self) -> usize {
        self.inject + self.already_scoped + self.no_matching_rule + self.exempt + self.unsupported
    }
}

/// Build a markdown report with a summary table and one row per statement.
pub fn build_report(findings: &[Finding]) -> String {
    let mut report = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut report, findings);
    report
}

fn write_report(report: &mut String, findings: &[Finding]) -> fmt::Result {
    let summary = Summary::of(findings);

    writeln!(report, "# Tenant Filter Audit")?;
    writeln!(report)?;
    writeln!(report, "## Summary")?;
    writeln!(report)?;
    writeln!(report, "| Decision | Statements |")?;
    writeln!(report, "|----------|------------|")?;
    writeln!(report, "| inject | {} |", summary.inject)?;
    writeln!(report, "| already_scoped | {} |", summary.already_scoped)?;
    writeln!(report, "| no_matching_rule | {} |", summary.no_matching_rule)?;
    writeln!(report, "| exempt | {} |", summary.exempt)?;
    writeln!(report, "| unsupported | {} |", summary.unsupported)?;
    writeln!(report, "| **total** | {} |", summary.total())?;

    if findings.is_empty() {
        return Ok(());
    }

    writeln!(report)?;
    writeln!(report, "## Statements")?;
    writeln!(report)?;
    writeln!(report, "| Location | Decision | Table | Rules | SQL |")?;
    writeln!(report, "|----------|----------|-------|-------|-----|")?;
    for finding in findings {
        writeln!(
            report,
            "| {} | {} | {} | {} | `{}` |",
            finding.location(),
            finding.decision.label(),
            table_cell(&finding.decision),
            rules_cell(&finding.decision),
            escape_cell(&finding.sql)
        )?;
    }

    let unsupported: Vec<&Finding> = findings
        .iter()
        .filter(|f| matches!(f.decision, Decision::Unsupported { .. }))
        .collect();
    if !unsupported.is_empty() {
        writeln!(report)?;
        writeln!(report, "## Unsupported")?;
        writeln!(report)?;
        for finding in unsupported {
            if let Decision::Unsupported { reason } = &finding.decision {
                writeln!(report, "- **{}**: {}", finding.location(), reason)?;
            }
        }
    }

    Ok(())
}

fn table_cell(decision: &Decision) -> String {
    match decision {
        Decision::Inject {
            table: Some(table), ..
        } => table.qualified_name(),
        _ => String::new(),
    }
}

fn rules_cell(decision: &Decision) -> String {
    match decision {
        Decision::Inject { rules, .. } => rules.join(", "),
        _ => String::new(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('`', "'")
}
