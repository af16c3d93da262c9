//! Closed statement grammar consumed by the analysis core.
//!
//! Every node renders back to SQL through [`fmt::Display`]. The rendering is
//! used for logging and for the sentinel fast-reject check, so it must contain
//! every column name that is structurally reachable from the node.

use serde::Serialize;
use std::fmt;

/// A DML statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `SELECT` query, possibly a set operation.
    Select(SelectBody),
    /// `INSERT INTO target (columns) ...`.
    Insert {
        /// Target table; `None` when the insert targets a table function.
        table: Option<TableRef>,
        /// Explicit column list, empty when omitted.
        columns: Vec<String>,
    },
    /// `UPDATE target SET ... WHERE ...`.
    Update {
        /// Target table; `None` when the target is not a plain table.
        table: Option<TableRef>,
        /// `WHERE` predicate.
        selection: Option<Expression>,
    },
    /// `DELETE FROM target WHERE ...`.
    Delete {
        /// Target table; `None` when no plain table could be found.
        table: Option<TableRef>,
        /// `WHERE` predicate.
        selection: Option<Expression>,
    },
}

/// Body of a `SELECT` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectBody {
    /// A single `SELECT ... FROM ... JOIN ... WHERE ...`.
    Plain(PlainSelect),
    /// `UNION` / `INTERSECT` / `EXCEPT` chain. Branches keep source order.
    SetOperation {
        /// Operator joining the branches.
        operator: SetOperator,
        /// Branches in source order.
        branches: Vec<SelectBody>,
    },
    /// A body outside the supported grammar (VALUES lists, WITH queries).
    Other {
        /// Rendered source text.
        sql: String,
    },
}

/// A plain `SELECT` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainSelect {
    /// Projection list.
    pub projection: Vec<Expression>,
    /// Primary `FROM` item; `None` for `SELECT 1`.
    pub from: Option<FromItem>,
    /// Joins attached to the primary `FROM` item, then further comma-separated items.
    pub joins: Vec<Join>,
    /// `WHERE` predicate.
    pub selection: Option<Expression>,
}

/// Set operator of a [`SelectBody::SetOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperator {
    /// `UNION`
    Union,
    /// `UNION ALL`
    UnionAll,
    /// `INTERSECT`
    Intersect,
    /// `EXCEPT` / `MINUS`
    Except,
}

/// A relation in a `FROM` or `JOIN` position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromItem {
    /// A concrete table.
    Table(TableRef),
    /// A derived table.
    Subquery {
        /// The nested query.
        body: Box<SelectBody>,
        /// Derived-table alias.
        alias: Option<String>,
    },
    /// Table functions, nested join groups and other unsupported factors.
    Other {
        /// Rendered source text.
        sql: String,
    },
}

/// A concrete, possibly schema-qualified, table reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    /// Schema (database) qualifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Unqualified table name.
    pub name: String,
    /// Alias in the referencing statement.
    #[serde(skip)]
    pub alias: Option<String>,
}

impl TableRef {
    /// Build an unqualified table reference without alias.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Attach a schema qualifier.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// `schema.name` or `name`.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A `JOIN` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Joined relation.
    pub relation: FromItem,
    /// `ON` conditions; empty for `USING`, `NATURAL` and cross joins.
    pub on_conditions: Vec<Expression>,
}

/// A column reference, optionally qualified by a table name or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Qualifier (`a` in `a.tenant_id`).
    pub table: Option<String>,
    /// Column name.
    pub name: String,
}

/// Right-hand side of an `IN` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemsList {
    /// `IN (1, 2, 3)`
    ExpressionList(Vec<Expression>),
    /// `IN (SELECT ...)`
    Subquery(Box<SelectBody>),
}

/// Scalar and boolean expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// `l AND r`
    And(Box<Expression>, Box<Expression>),
    /// `l OR r`
    Or(Box<Expression>, Box<Expression>),
    /// `l = r`
    Equals(Box<Expression>, Box<Expression>),
    /// Every other binary operator: comparison, arithmetic, `LIKE`.
    OtherBinary {
        /// Operator as written.
        op: String,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
    /// `left [NOT] IN items`
    In {
        /// Tested expression.
        left: Box<Expression>,
        /// Candidate values.
        items: ItemsList,
        /// `NOT IN`
        negated: bool,
    },
    /// `target [NOT] BETWEEN start AND end`
    Between {
        /// Tested expression.
        target: Box<Expression>,
        /// Lower bound.
        start: Box<Expression>,
        /// Upper bound.
        end: Box<Expression>,
        /// `NOT BETWEEN`
        negated: bool,
    },
    /// `name(args...)`
    FunctionCall {
        /// Function name as written.
        name: String,
        /// Arguments; a subquery argument appears as [`Expression::Subquery`].
        args: Vec<Expression>,
    },
    /// Scalar subquery.
    Subquery(Box<SelectBody>),
    /// `[NOT] EXISTS (subquery)`
    Exists {
        /// The nested query.
        body: Box<SelectBody>,
        /// `NOT EXISTS`
        negated: bool,
    },
    /// Column reference.
    ColumnRef(ColumnRef),
    /// Literals, casts, `NOT`, `IS NULL` and any other opaque leaf.
    Other(String),
}

impl Expression {
    /// Column reference without qualifier.
    pub fn column(name: impl Into<String>) -> Self {
        Expression::ColumnRef(ColumnRef {
            table: None,
            name: name.into(),
        })
    }

    /// Opaque leaf, typically a literal.
    pub fn other(sql: impl Into<String>) -> Self {
        Expression::Other(sql.into())
    }

    /// `l AND r`
    #[must_use]
    pub fn and(self, right: Expression) -> Self {
        Expression::And(Box::new(self), Box::new(right))
    }

    /// `l OR r`
    #[must_use]
    pub fn or(self, right: Expression) -> Self {
        Expression::Or(Box::new(self), Box::new(right))
    }

    /// `l = r`
    #[must_use]
    pub fn equals(self, right: Expression) -> Self {
        Expression::Equals(Box::new(self), Box::new(right))
    }
}

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(body) => write!(f, "{body}"),
            Statement::Insert { table, columns } => {
                f.write_str("INSERT INTO ")?;
                match table {
                    Some(table) => write!(f, "{table}")?,
                    None => f.write_str("<unknown>")?,
                }
                if !columns.is_empty() {
                    f.write_str(" (")?;
                    write_separated(f, columns, ", ")?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            Statement::Update { table, selection } => {
                f.write_str("UPDATE ")?;
                match table {
                    Some(table) => write!(f, "{table}")?,
                    None => f.write_str("<unknown>")?,
                }
                if let Some(selection) = selection {
                    write!(f, " WHERE {selection}")?;
                }
                Ok(())
            }
            Statement::Delete { table, selection } => {
                f.write_str("DELETE FROM ")?;
                match table {
                    Some(table) => write!(f, "{table}")?,
                    None => f.write_str("<unknown>")?,
                }
                if let Some(selection) = selection {
                    write!(f, " WHERE {selection}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SelectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectBody::Plain(select) => write!(f, "{select}"),
            SelectBody::SetOperation { operator, branches } => {
                for (idx, branch) in branches.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " {operator} ")?;
                    }
                    write!(f, "({branch})")?;
                }
                Ok(())
            }
            SelectBody::Other { sql } => f.write_str(sql),
        }
    }
}

impl fmt::Display for PlainSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.projection.is_empty() {
            f.write_str("*")?;
        } else {
            write_separated(f, &self.projection, ", ")?;
        }
        if let Some(from) = &self.from {
            write!(f, " FROM {from}")?;
        }
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {selection}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetOperator::Union => "UNION",
            SetOperator::UnionAll => "UNION ALL",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::Except => "EXCEPT",
        })
    }
}

impl fmt::Display for FromItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FromItem::Table(table) => write!(f, "{table}"),
            FromItem::Subquery { body, alias } => {
                write!(f, "({body})")?;
                if let Some(alias) = alias {
                    write!(f, " {alias}")?;
                }
                Ok(())
            }
            FromItem::Other { sql } => f.write_str(sql),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())?;
        if let Some(alias) = &self.alias {
            write!(f, " {alias}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JOIN {}", self.relation)?;
        if !self.on_conditions.is_empty() {
            f.write_str(" ON ")?;
            write_separated(f, &self.on_conditions, " AND ")?;
        }
        Ok(())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl fmt::Display for ItemsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        match self {
            ItemsList::ExpressionList(items) => write_separated(f, items, ", ")?,
            ItemsList::Subquery(body) => write!(f, "{body}")?,
        }
        f.write_str(")")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::And(left, right) => write!(f, "{left} AND {right}"),
            Expression::Or(left, right) => write!(f, "({left} OR {right})"),
            Expression::Equals(left, right) => write!(f, "{left} = {right}"),
            Expression::OtherBinary { op, left, right } => write!(f, "{left} {op} {right}"),
            Expression::In {
                left,
                items,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{left} {not}IN {items}")
            }
            Expression::Between {
                target,
                start,
                end,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{target} {not}BETWEEN {start} AND {end}")
            }
            Expression::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                write_separated(f, args, ", ")?;
                f.write_str(")")
            }
            Expression::Subquery(body) => write!(f, "({body})"),
            Expression::Exists { body, negated } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{not}EXISTS ({body})")
            }
            Expression::ColumnRef(column) => write!(f, "{column}"),
            Expression::Other(sql) => f.write_str(sql),
        }
    }
}
