mod support;

use std::borrow::Cow;
use std::sync::Arc;
use std::thread;

use support::{fixture_statements, load_fixture_guard, parse};
use tenant_guard::intercept::guard::{Decision, SqlRewriter, TenantGuard};
use tenant_guard::parser::ast::{Statement, TableRef};
use tenant_guard::policy::rule::PolicyRule;
use tenant_guard::{Error, Result};

/// Appends the tenant predicate as a trailing comment; enough to observe
/// which rules reached the rewriter.
struct CommentRewriter;

impl SqlRewriter for CommentRewriter {
    fn rewrite(&self, sql: &str, _statement: &Statement, rules: &[&PolicyRule]) -> Result<String> {
        let names: Vec<&str> = rules.iter().map(|rule| rule.name()).collect();
        Ok(format!("{sql} /* tenant filter: {} */", names.join(", ")))
    }
}

fn decisions(guard: &TenantGuard, fixture: &str) -> Vec<Decision> {
    fixture_statements(fixture)
        .iter()
        .map(|sql| guard.inspect(None, sql))
        .collect()
}

#[test]
fn role_queries_fixture_decisions() {
    let guard = load_fixture_guard("role_queries");
    let decisions = decisions(&guard, "role_queries");

    assert_eq!(decisions.len(), 5);
    let Decision::Inject { rules, table } = &decisions[0] else {
        panic!("joined role query should need a filter, got {:?}", decisions[0]);
    };
    assert_eq!(rules, &vec!["role_tables".to_string()]);
    let table = table.as_ref().expect("sys_role should resolve");
    assert_eq!(table.qualified_name(), "sys_role");
    assert_eq!(table.alias.as_deref(), Some("r"));
    assert!(
        matches!(&decisions[1], Decision::Inject { table: Some(t), .. } if t.name == "sys_role"),
        "count query over a derived table should need a filter, got {:?}",
        decisions[1]
    );
    assert_eq!(decisions[2], Decision::AlreadyScoped);
    assert_eq!(decisions[3], Decision::AlreadyScoped, "insert sets tenant_id");
    assert_eq!(decisions[4], Decision::NoMatchingRule);
}

#[test]
fn saas_orders_fixture_decisions() {
    let guard = load_fixture_guard("saas_orders");
    assert_eq!(guard.sentinel().as_str(), "org_id");

    let labels: Vec<&str> = decisions(&guard, "saas_orders")
        .iter()
        .map(Decision::label)
        .collect();
    assert_eq!(
        labels,
        vec![
            "already_scoped",
            "no_matching_rule",
            "inject",
            "inject",
            "unsupported",
            "inject",
        ]
    );

    assert_eq!(
        guard.inspect(None, "SELECT * FROM saas.customer"),
        Decision::Inject {
            rules: vec!["saas_db".to_string()],
            table: Some(TableRef::new("customer").with_schema("saas")),
        }
    );
    assert_eq!(
        guard.inspect(None, "DELETE FROM saas.purchase_order WHERE id = 3"),
        Decision::Inject {
            rules: vec![
                "orders".to_string(),
                "saas_db".to_string(),
                "delete_dml".to_string()
            ],
            table: Some(TableRef::new("purchase_order").with_schema("saas")),
        }
    );
}

#[test]
fn exempt_statements_skip_analysis() {
    let guard = load_fixture_guard("role_queries");
    let sql = "select * from sys_role";

    assert!(guard.inspect(None, sql).requires_filter());
    assert_eq!(
        guard.inspect(Some("com.acme.mapper.SysConfigMapper.selectConfig"), sql),
        Decision::Exempt
    );
    assert_eq!(
        guard.inspect(Some("com.acme.mapper.SysRoleMapper.selectRoleAll"), sql),
        Decision::Exempt
    );
    assert_eq!(
        guard.inspect(Some("com.acme.mapper.SysRoleMapper.selectRoleAll_COUNT"), sql),
        Decision::Exempt
    );
    assert!(guard
        .inspect(Some("com.acme.mapper.SysRoleMapper.selectRoleById"), sql)
        .requires_filter());
}

#[test]
fn exemption_applies_even_to_unparseable_sql() {
    let guard = load_fixture_guard("role_queries");
    assert_eq!(
        guard.inspect(Some("com.acme.mapper.SysConfigMapper.raw"), "not sql at all"),
        Decision::Exempt
    );
    assert!(matches!(
        guard.inspect(None, "not sql at all"),
        Decision::Unsupported { .. }
    ));
}

#[test]
fn multi_statement_text_is_unsupported() {
    let guard = load_fixture_guard("role_queries");
    let decision = guard.inspect(None, "select * from sys_role; select * from sys_user");
    assert_eq!(
        decision,
        Decision::Unsupported {
            reason: "expected a single statement, found 2".to_string()
        }
    );
}

#[test]
fn intercept_rewrites_only_when_a_filter_is_required() {
    let guard = load_fixture_guard("role_queries");

    let rewritten = guard
        .intercept(None, "select * from sys_role", &CommentRewriter)
        .expect("rewrite should succeed");
    assert_eq!(
        rewritten,
        "select * from sys_role /* tenant filter: role_tables */"
    );

    for sql in [
        "select * from sys_role where tenant_id = 1",
        "select * from sys_dept",
        "drop table sys_role",
    ] {
        let untouched = guard
            .intercept(None, sql, &CommentRewriter)
            .expect("untouched SQL is never an error");
        assert!(matches!(untouched, Cow::Borrowed(s) if s == sql), "{sql}");
    }

    let exempt = guard
        .intercept(
            Some("com.acme.mapper.SysConfigMapper.selectConfig"),
            "select * from sys_role",
            &CommentRewriter,
        )
        .expect("exempt SQL is never an error");
    assert!(matches!(exempt, Cow::Borrowed(_)));
}

#[test]
fn rewriter_errors_propagate() {
    let guard = load_fixture_guard("role_queries");
    let failing = |_: &str, _: &Statement, _: &[&PolicyRule]| -> Result<String> {
        Err(Error::Rewrite("no tenant in context".to_string()))
    };

    let err = guard
        .intercept(None, "select * from sys_user", &failing)
        .unwrap_err();
    assert_eq!(err.to_string(), "rewrite failed: no tenant in context");

    let untouched = guard
        .intercept(None, "select * from sys_dept", &failing)
        .expect("rewriter is not called without a matching rule");
    assert_eq!(untouched, "select * from sys_dept");
}

#[test]
fn inspect_statement_matches_inspect_for_parsed_input() {
    let guard = load_fixture_guard("saas_orders");
    for sql in fixture_statements("saas_orders")
        .iter()
        .filter(|sql| !sql.starts_with("CREATE"))
    {
        assert_eq!(
            guard.inspect_statement(&parse(sql)),
            guard.inspect(None, sql),
            "{sql}"
        );
    }
}

#[test]
fn guard_is_shareable_across_threads() {
    let guard = Arc::new(load_fixture_guard("saas_orders"));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let guard = Arc::clone(&guard);
            thread::spawn(move || guard.inspect(None, "UPDATE purchase_order SET a = 1").label())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread should not panic"), "inject");
    }
}
