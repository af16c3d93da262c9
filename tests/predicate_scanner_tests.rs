mod support;

use support::{parse, tenant};
use tenant_guard::analysis::predicate_scanner::{
    insert_has_sentinel, insert_sql_has_sentinel, scan, scan_sql,
};
use tenant_guard::analysis::sentinel::Sentinel;

fn assert_scoped(sql: &str) {
    assert!(
        scan(&parse(sql), &tenant()),
        "expected a tenant_id condition to be detected in `{sql}`"
    );
}

fn assert_unscoped(sql: &str) {
    assert!(
        !scan(&parse(sql), &tenant()),
        "expected no tenant_id condition in `{sql}`"
    );
}

#[test]
fn where_clause_comparisons_are_detected() {
    assert_scoped("select id from sys_user a where a.tenant_id = 1");
    assert_scoped("select id from sys_user a where a.tenant_id <> 1");
    assert_scoped("select id from sys_user a where a.id = 2 and a.tenant_id = 1");
    assert_scoped("select id from sys_user a where a.id = 2 or a.tenant_id = 1");
    assert_scoped("select id from sys_user a where a.id in (1,2) and a.tenant_id between 1 and 2");
}

#[test]
fn in_lists_and_negated_in_lists_are_detected() {
    assert_scoped("select id from sys_user a where a.tenant_id in (1,2)");
    assert_scoped("select id from sys_user a where a.tenant_id not in (1,2)");
    assert_scoped("select id from sys_user a where a.id in (1,2) or a.tenant_id in (1,2)");
    assert_scoped("select id from sys_user a where a.id in (1,2) and a.tenant_id in (1,2)");
}

#[test]
fn nested_queries_in_conditions_are_detected() {
    assert_scoped(
        "select id from sys_user a where a.id in (1,2) and exists (select a from b where tenant_id = 1)",
    );
    assert_scoped(
        "select id from sys_user a where a.id in (1,2) and a.name between (select id from c where tenant_id = 1) and 2",
    );
    assert_scoped("select id from sys_user a where a.id in (select id from c where tenant_id = 1) and a.b in (1,2)");
}

#[test]
fn join_conditions_are_detected_without_where() {
    assert_scoped(
        "select id from sys_user a left join sys_dept b on a.id = b.id and b.tenant_id = 1 where a.b in (1,2)",
    );
    assert_scoped(
        "select id from sys_user a left join sys_dept b on a.id = b.id or b.tenant_id = 1 where a.b in (1,2)",
    );
    assert_scoped(
        "select id from sys_user a left join sys_dept b on a.id = b.id or b.tenant_id between 1 and 2 where a.b in (1,2)",
    );
    assert_scoped(
        "select id from sys_user a join sys_dept b on a.id = b.id and exists (select a from b where tenant_id = 1) where a.b in (1,2)",
    );
    assert_scoped("select id from sys_user a join sys_dept b on a.tenant_id = b.tenant_id");
}

#[test]
fn union_branch_inside_derived_table_is_detected() {
    assert_scoped(
        "select count(0) from (select id from sys_user a where a.id = 1 union all select id from (select id from c where tenant_id = 1) a where a.id = 1) t",
    );
}

#[test]
fn quantified_and_pattern_comparisons_are_detected() {
    assert_scoped("select * from orders o where o.tenant_id = any(select id from tenants)");
    assert_scoped("select * from orders o where o.tenant_id > all(select id from tenants)");
    assert_scoped("select * from orders o where o.id = any(select id from t where tenant_id = 1)");
    assert_scoped("select * from orders where tenant_id is distinct from 1");
    assert_scoped("select * from orders where tenant_id is not distinct from 1");
    assert_scoped("select * from orders where tenant_id similar to 'acme%'");
    assert_scoped("select * from orders where tenant_id not similar to 'acme%'");
    assert_unscoped("select * from orders o where o.id = any(select id from tenants)");
}

#[test]
fn semi_and_anti_join_conditions_are_detected() {
    assert_scoped("select * from a semi join b on a.id = b.id and b.tenant_id = 1");
    assert_scoped("select * from a anti join b on b.tenant_id = 1");
    assert_scoped("select * from a left semi join b on b.tenant_id = 1");
    assert_scoped("select * from a left anti join b on a.id = b.id or b.tenant_id = 1");
    assert_unscoped("select * from a semi join b on a.id = b.id");
}

#[test]
fn function_arguments_are_detected() {
    assert_scoped("select id from sys_user where coalesce(tenant_id, 0) = 1");
}

#[test]
fn statements_without_a_tenant_condition_are_not_scoped() {
    assert_unscoped("select id from sys_user a where a.id = 1");
    assert_unscoped("select * from sys_user");
    assert_unscoped("select tenant_id, name from sys_user where id = 1");
    assert_unscoped("select * from sys_user a join tenant_id_map m on a.id = m.id");
    assert_unscoped("select id from sys_user where name = 'tenant_id'");
}

#[test]
fn opaque_predicates_do_not_count() {
    assert_unscoped("select id from sys_user where tenant_id is null");
    assert_unscoped("select id from sys_user where not tenant_id = 1");
}

#[test]
fn sentinel_comparison_ignores_case() {
    assert_scoped("SELECT id FROM sys_user WHERE TENANT_ID = 1");
    let org = Sentinel::new("Org_Id");
    assert!(scan(&parse("select * from t where ORG_ID = 1"), &org));
    assert!(!scan(&parse("select * from t where tenant_id = 1"), &org));
}

#[test]
fn writes_are_not_scanned_for_conditions() {
    assert_unscoped("update sys_user set name = 'x' where tenant_id = 1");
    assert_unscoped("delete from sys_user where tenant_id = 1");
}

#[test]
fn insert_column_list_carries_the_sentinel() {
    let sentinel = tenant();
    assert!(insert_has_sentinel(
        &parse("insert into test.user (name, TENANT_ID) values ('zs', 1)"),
        &sentinel
    ));
    assert!(!insert_has_sentinel(
        &parse("insert into test.user (name, age) values ('zs', 10)"),
        &sentinel
    ));
    assert!(!insert_has_sentinel(
        &parse("select * from user where tenant_id = 1"),
        &sentinel
    ));
}

#[test]
fn text_entry_points_reject_unparseable_sql() {
    let sentinel = tenant();
    assert!(scan_sql("select * from user where tenant_id = 1", &sentinel));
    assert!(!scan_sql("select * from user where", &sentinel));
    assert!(!scan_sql("select * from user where tenant_id = 1; select 1", &sentinel));
    assert!(insert_sql_has_sentinel(
        "insert into user (tenant_id) values (1)",
        &sentinel
    ));
    assert!(!insert_sql_has_sentinel("insert into user (tenant_id", &sentinel));
}

#[test]
fn scanning_is_idempotent() {
    let statement = parse("select * from a where a.id in (select id from b where tenant_id = 1)");
    let sentinel = tenant();
    let first = scan(&statement, &sentinel);
    assert!(first);
    assert_eq!(scan(&statement, &sentinel), first);
}
