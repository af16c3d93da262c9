#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tenant_guard::analysis::sentinel::Sentinel;
use tenant_guard::config::GuardConfig;
use tenant_guard::intercept::guard::TenantGuard;
use tenant_guard::parser::ast::Statement;
use tenant_guard::parser::{lower, sql_parser};

pub(crate) fn fixture_dir(fixture: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture)
}

pub(crate) fn read_fixture_sql(fixture: &str) -> String {
    let path = fixture_dir(fixture).join("queries.sql");
    std::fs::read_to_string(path).expect("fixture SQL should be readable")
}

pub(crate) fn read_fixture_rules_json(fixture: &str) -> String {
    let path = fixture_dir(fixture).join("rules.json");
    std::fs::read_to_string(path).expect("fixture rules should be readable")
}

pub(crate) fn load_fixture_guard(fixture: &str) -> TenantGuard {
    GuardConfig::from_json(&read_fixture_rules_json(fixture))
        .expect("fixture rules should parse")
        .build()
        .expect("fixture rules should be valid")
}

/// Raw text of every statement in a fixture, one entry per statement.
pub(crate) fn fixture_statements(fixture: &str) -> Vec<String> {
    sql_parser::parse_raw(&read_fixture_sql(fixture))
        .expect("fixture SQL should parse")
        .iter()
        .map(ToString::to_string)
        .collect()
}

pub(crate) fn parse(sql: &str) -> Statement {
    sql_parser::parse_statement(sql).unwrap_or_else(|e| panic!("failed to parse `{sql}`: {e}"))
}

pub(crate) fn parse_all(sql: &str) -> Vec<Statement> {
    sql_parser::parse_raw(sql)
        .expect("SQL should parse")
        .iter()
        .map(|raw| lower::lower_statement(raw).expect("statement should lower"))
        .collect()
}

pub(crate) fn tenant() -> Sentinel {
    Sentinel::default()
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    std::fs::create_dir_all(&dir).expect("should create temp dir");
    dir
}
