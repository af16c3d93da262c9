/// Renders findings as text, JSON or Markdown and writes them to disk.
pub mod formatter;
/// Builds a Markdown audit report from per-statement findings.
pub mod report;
