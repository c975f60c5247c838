//! Parser adapter - converts `sqlparser` statements into the SQLScout tree
//!
//! Parsing is delegated to the `sqlparser` crate. Exactly one statement is
//! accepted per call. Built-in call forms with keyword arguments (`TRIM`,
//! `SUBSTRING`, `EXTRACT` and friends) become [`Node::Function`] values and
//! predicate wrappers keep their operands as children. Constructs the tree
//! does not model are kept as [`Node::Raw`] leaves holding the parser's own
//! rendering, so they never hide a statement from the rules but also never
//! produce findings on their own.

use crate::tree::{
    Assignment, CallSyntax, Case, CommonTableExpr, Delete, Derived, FromItem, Function, Insert,
    Join, JoinConstraint, JoinKind, Like, Literal, Node, OrderingTerm, Query, Select,
    SetOperation, SqlTree, TableRef, Update,
};
use serde::{Deserialize, Serialize};
use sqlparser::ast;
use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// SQL dialect used to parse queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// Generic ANSI-like SQL (fallback)
    #[default]
    Generic,
    /// SQLite SQL dialect
    Sqlite,
    /// PostgreSQL SQL dialect
    Postgres,
    /// MySQL/MariaDB SQL dialect
    Mysql,
}

impl SqlDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
        }
    }

    /// Get the sqlparser dialect for this SQL variant
    pub fn sqlparser_dialect(&self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Mysql => Box::new(MySqlDialect {}),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generic" | "ansi" => Ok(Self::Generic),
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::Mysql),
            other => Err(format!(
                "unknown SQL dialect '{other}' (expected generic, sqlite, postgres or mysql)"
            )),
        }
    }
}

/// Errors that can occur when parsing a query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(String),

    #[error("no SQL statement found")]
    Empty,

    #[error("expected a single statement, found {0}")]
    MultipleStatements(usize),
}

/// Parses a single SQL statement into a [`SqlTree`]
///
/// # Examples
///
/// ```
/// use sqlscout_analyzer::parser::{parse, SqlDialect};
///
/// let tree = parse("select id from users where lower(email) = 'a'", SqlDialect::Generic).unwrap();
/// assert_eq!(tree.to_string(), "SELECT id FROM users WHERE LOWER(email) = 'a'");
/// ```
pub fn parse(sql: &str, dialect: SqlDialect) -> Result<SqlTree, ParseError> {
    let parser_dialect = dialect.sqlparser_dialect();
    let mut statements = Parser::parse_sql(parser_dialect.as_ref(), sql)
        .map_err(|e| ParseError::Syntax(e.to_string()))?;

    match statements.len() {
        0 => Err(ParseError::Empty),
        1 => {
            let statement = statements.remove(0);
            Ok(SqlTree::new(convert_statement(&statement)))
        }
        n => Err(ParseError::MultipleStatements(n)),
    }
}

fn convert_statement(statement: &ast::Statement) -> Node {
    match statement {
        ast::Statement::Query(query) => convert_query(query),
        ast::Statement::Insert(insert) => Node::Insert(Insert {
            table: insert.table_name.to_string(),
            columns: insert.columns.iter().map(|c| c.value.clone()).collect(),
            source: insert
                .source
                .as_deref()
                .map(|query| Box::new(convert_query(query))),
        }),
        ast::Statement::Update {
            table,
            assignments,
            selection,
            ..
        } => Node::Update(Update {
            table: Box::new(convert_table_with_joins(table)),
            assignments: assignments
                .iter()
                .map(|assignment| Assignment {
                    target: assignment.target.to_string(),
                    value: convert_expr(&assignment.value),
                })
                .collect(),
            selection: selection.as_ref().map(where_clause),
        }),
        ast::Statement::Delete(delete) => {
            let tables = match &delete.from {
                ast::FromTable::WithFromKeyword(tables) | ast::FromTable::WithoutKeyword(tables) => {
                    tables
                }
            };
            Node::Delete(Delete {
                from: convert_from(tables),
                selection: delete.selection.as_ref().map(where_clause),
            })
        }
        other => Node::Raw(other.to_string()),
    }
}

fn where_clause(predicate: &ast::Expr) -> Box<Node> {
    Box::new(Node::Where(Box::new(convert_expr(predicate))))
}

fn convert_query(query: &ast::Query) -> Node {
    let (recursive, with) = match &query.with {
        Some(with) => (
            with.recursive,
            with.cte_tables
                .iter()
                .map(|cte| CommonTableExpr {
                    name: cte.alias.name.value.clone(),
                    query: convert_query(&cte.query),
                })
                .collect(),
        ),
        None => (false, Vec::new()),
    };

    Node::Query(Query {
        recursive,
        with,
        body: Box::new(convert_set_expr(&query.body)),
        order_by: query
            .order_by
            .as_ref()
            .map(|order_by| Box::new(convert_order_by(&order_by.exprs))),
        limit: query.limit.as_ref().map(|limit| Box::new(convert_expr(limit))),
        offset: query
            .offset
            .as_ref()
            .map(|offset| Box::new(convert_expr(&offset.value))),
    })
}

fn convert_set_expr(set_expr: &ast::SetExpr) -> Node {
    match set_expr {
        ast::SetExpr::Select(select) => convert_select(select),
        ast::SetExpr::Query(query) => Node::Subquery(Box::new(convert_query(query))),
        ast::SetExpr::SetOperation {
            op,
            set_quantifier,
            left,
            right,
            ..
        } => Node::SetOperation(SetOperation {
            op: op.to_string(),
            quantifier: set_quantifier.to_string(),
            left: Box::new(convert_set_expr(left)),
            right: Box::new(convert_set_expr(right)),
        }),
        ast::SetExpr::Values(values) => Node::Values(
            values
                .rows
                .iter()
                .map(|row| row.iter().map(convert_expr).collect())
                .collect(),
        ),
        other => Node::Raw(other.to_string()),
    }
}

fn convert_select(select: &ast::Select) -> Node {
    let group_by = match &select.group_by {
        ast::GroupByExpr::Expressions(exprs, ..) => exprs.iter().map(convert_expr).collect(),
        ast::GroupByExpr::All(..) => vec![Node::Raw("ALL".to_string())],
    };

    Node::Select(Select {
        distinct: select.distinct.is_some(),
        projection: select.projection.iter().map(convert_select_item).collect(),
        from: convert_from(&select.from),
        selection: select.selection.as_ref().map(where_clause),
        group_by,
        having: select
            .having
            .as_ref()
            .map(|having| Box::new(convert_expr(having))),
    })
}

fn convert_select_item(item: &ast::SelectItem) -> Node {
    match item {
        ast::SelectItem::UnnamedExpr(expr) => convert_expr(expr),
        ast::SelectItem::ExprWithAlias { expr, alias, .. } => Node::Alias {
            expr: Box::new(convert_expr(expr)),
            alias: alias.value.clone(),
        },
        ast::SelectItem::QualifiedWildcard(qualifier, _) => {
            Node::Wildcard(Some(qualifier.to_string()))
        }
        ast::SelectItem::Wildcard(_) => Node::Wildcard(None),
    }
}

/// Folds comma-separated FROM entries into one [`FromItem`], each later
/// entry becoming a [`JoinKind::Comma`] join followed by its own joins
fn convert_from(tables: &[ast::TableWithJoins]) -> Option<FromItem> {
    let (first, rest) = tables.split_first()?;
    let mut from = convert_table_with_joins(first);
    for table in rest {
        from.joins.push(Node::Join(Join {
            kind: JoinKind::Comma,
            relation: Box::new(convert_table_factor(&table.relation)),
            constraint: JoinConstraint::None,
        }));
        from.joins.extend(table.joins.iter().map(convert_join));
    }
    Some(from)
}

fn convert_table_with_joins(table: &ast::TableWithJoins) -> FromItem {
    FromItem {
        relation: Box::new(convert_table_factor(&table.relation)),
        joins: table.joins.iter().map(convert_join).collect(),
    }
}

fn convert_table_factor(factor: &ast::TableFactor) -> Node {
    match factor {
        ast::TableFactor::Table { name, alias, .. } => Node::Table(TableRef {
            name: name.to_string(),
            alias: alias.as_ref().map(|alias| alias.name.value.clone()),
        }),
        ast::TableFactor::Derived {
            lateral,
            subquery,
            alias,
            ..
        } => Node::Derived(Derived {
            lateral: *lateral,
            subquery: Box::new(convert_query(subquery)),
            alias: alias.as_ref().map(|alias| alias.name.value.clone()),
        }),
        ast::TableFactor::NestedJoin {
            table_with_joins, ..
        } => Node::NestedJoin(Box::new(convert_table_with_joins(table_with_joins))),
        other => Node::Raw(other.to_string()),
    }
}

fn convert_join(join: &ast::Join) -> Node {
    use ast::JoinOperator as Op;

    let (kind, constraint) = match &join.join_operator {
        Op::Inner(constraint) => (JoinKind::Inner, Some(constraint)),
        Op::LeftOuter(constraint) => (JoinKind::Left, Some(constraint)),
        Op::RightOuter(constraint) => (JoinKind::Right, Some(constraint)),
        Op::FullOuter(constraint) => (JoinKind::Full, Some(constraint)),
        Op::LeftSemi(constraint) => (JoinKind::LeftSemi, Some(constraint)),
        Op::RightSemi(constraint) => (JoinKind::RightSemi, Some(constraint)),
        Op::LeftAnti(constraint) => (JoinKind::LeftAnti, Some(constraint)),
        Op::RightAnti(constraint) => (JoinKind::RightAnti, Some(constraint)),
        Op::CrossJoin => (JoinKind::Cross, None),
        Op::CrossApply => (JoinKind::CrossApply, None),
        Op::OuterApply => (JoinKind::OuterApply, None),
        #[allow(unreachable_patterns)]
        _ => return Node::Raw(join.to_string()),
    };

    let constraint = match constraint {
        Some(ast::JoinConstraint::On(on)) => JoinConstraint::On(Box::new(convert_expr(on))),
        Some(ast::JoinConstraint::Using(columns)) => {
            JoinConstraint::Using(columns.iter().map(|column| column.to_string()).collect())
        }
        Some(ast::JoinConstraint::Natural) => JoinConstraint::Natural,
        Some(ast::JoinConstraint::None) | None => JoinConstraint::None,
    };

    Node::Join(Join {
        kind,
        relation: Box::new(convert_table_factor(&join.relation)),
        constraint,
    })
}

fn convert_order_by(exprs: &[ast::OrderByExpr]) -> Node {
    Node::OrderBy(
        exprs
            .iter()
            .map(|term| OrderingTerm {
                expr: convert_expr(&term.expr),
                descending: term.asc.map(|asc| !asc),
                nulls_first: term.nulls_first,
            })
            .collect(),
    )
}

fn convert_expr(expr: &ast::Expr) -> Node {
    match expr {
        ast::Expr::Identifier(ident) => Node::Column(vec![ident.value.clone()]),
        ast::Expr::CompoundIdentifier(parts) => {
            Node::Column(parts.iter().map(|part| part.value.clone()).collect())
        }
        ast::Expr::Value(value) => convert_value(value),
        ast::Expr::Like {
            negated,
            expr,
            pattern,
            escape_char,
            ..
        } => convert_like(expr, pattern, *negated, false, escape_char.as_deref()),
        ast::Expr::ILike {
            negated,
            expr,
            pattern,
            escape_char,
            ..
        } => convert_like(expr, pattern, *negated, true, escape_char.as_deref()),
        ast::Expr::Function(function) => convert_function(function),
        ast::Expr::Cast {
            expr, data_type, ..
        } => Node::Cast {
            expr: Box::new(convert_expr(expr)),
            data_type: data_type.to_string(),
        },
        ast::Expr::BinaryOp { left, op, right, .. } => Node::BinaryOp {
            left: Box::new(convert_expr(left)),
            op: op.to_string(),
            right: Box::new(convert_expr(right)),
        },
        ast::Expr::UnaryOp { op, expr, .. } => Node::UnaryOp {
            op: op.to_string(),
            expr: Box::new(convert_expr(expr)),
        },
        ast::Expr::Nested(inner) => Node::Nested(Box::new(convert_expr(inner))),
        ast::Expr::IsNull(inner) => Node::IsNull {
            expr: Box::new(convert_expr(inner)),
            negated: false,
        },
        ast::Expr::IsNotNull(inner) => Node::IsNull {
            expr: Box::new(convert_expr(inner)),
            negated: true,
        },
        ast::Expr::IsTrue(inner) => postfix(inner, "IS TRUE"),
        ast::Expr::IsNotTrue(inner) => postfix(inner, "IS NOT TRUE"),
        ast::Expr::IsFalse(inner) => postfix(inner, "IS FALSE"),
        ast::Expr::IsNotFalse(inner) => postfix(inner, "IS NOT FALSE"),
        ast::Expr::IsUnknown(inner) => postfix(inner, "IS UNKNOWN"),
        ast::Expr::IsNotUnknown(inner) => postfix(inner, "IS NOT UNKNOWN"),
        ast::Expr::Collate { expr, collation } => postfix(expr, &format!("COLLATE {collation}")),
        ast::Expr::IsDistinctFrom(left, right) => Node::BinaryOp {
            left: Box::new(convert_expr(left)),
            op: "IS DISTINCT FROM".to_string(),
            right: Box::new(convert_expr(right)),
        },
        ast::Expr::IsNotDistinctFrom(left, right) => Node::BinaryOp {
            left: Box::new(convert_expr(left)),
            op: "IS NOT DISTINCT FROM".to_string(),
            right: Box::new(convert_expr(right)),
        },
        ast::Expr::AtTimeZone {
            timestamp,
            time_zone,
        } => Node::BinaryOp {
            left: Box::new(convert_expr(timestamp)),
            op: "AT TIME ZONE".to_string(),
            right: Box::new(convert_expr(time_zone)),
        },
        ast::Expr::AnyOp {
            left,
            compare_op,
            right,
            is_some,
        } => Node::Quantified {
            left: Box::new(convert_expr(left)),
            op: compare_op.to_string(),
            quantifier: if *is_some { "SOME" } else { "ANY" }.to_string(),
            right: Box::new(convert_expr(right)),
        },
        ast::Expr::AllOp {
            left,
            compare_op,
            right,
        } => Node::Quantified {
            left: Box::new(convert_expr(left)),
            op: compare_op.to_string(),
            quantifier: "ALL".to_string(),
            right: Box::new(convert_expr(right)),
        },
        ast::Expr::Tuple(items) => Node::Tuple(items.iter().map(convert_expr).collect()),
        ast::Expr::InList {
            expr,
            list,
            negated,
            ..
        } => Node::InList {
            expr: Box::new(convert_expr(expr)),
            list: list.iter().map(convert_expr).collect(),
            negated: *negated,
        },
        ast::Expr::InSubquery {
            expr,
            subquery,
            negated,
            ..
        } => Node::InSubquery {
            expr: Box::new(convert_expr(expr)),
            subquery: Box::new(convert_query(subquery)),
            negated: *negated,
        },
        ast::Expr::Between {
            expr,
            negated,
            low,
            high,
            ..
        } => Node::Between {
            expr: Box::new(convert_expr(expr)),
            low: Box::new(convert_expr(low)),
            high: Box::new(convert_expr(high)),
            negated: *negated,
        },
        ast::Expr::Exists {
            subquery, negated, ..
        } => Node::Exists {
            subquery: Box::new(convert_query(subquery)),
            negated: *negated,
        },
        ast::Expr::Subquery(query) => Node::Subquery(Box::new(convert_query(query))),
        ast::Expr::Case {
            operand,
            conditions,
            results,
            else_result,
            ..
        } => Node::Case(Case {
            operand: operand
                .as_deref()
                .map(|operand| Box::new(convert_expr(operand))),
            branches: conditions
                .iter()
                .zip(results)
                .map(|(condition, result)| (convert_expr(condition), convert_expr(result)))
                .collect(),
            else_result: else_result
                .as_deref()
                .map(|else_result| Box::new(convert_expr(else_result))),
        }),
        other => convert_builtin_call(other).unwrap_or_else(|| Node::Raw(other.to_string())),
    }
}

fn postfix(expr: &ast::Expr, op: &str) -> Node {
    Node::Postfix {
        expr: Box::new(convert_expr(expr)),
        op: op.to_string(),
    }
}

fn convert_like(
    expr: &ast::Expr,
    pattern: &ast::Expr,
    negated: bool,
    case_insensitive: bool,
    escape: Option<&str>,
) -> Node {
    Node::Like(Like {
        expr: Box::new(convert_expr(expr)),
        pattern: Box::new(convert_expr(pattern)),
        negated,
        case_insensitive,
        escape: escape.map(str::to_string),
    })
}

fn builtin(name: &str, args: Vec<Node>, syntax: CallSyntax) -> Node {
    Node::Function(Function {
        name: name.to_string(),
        args,
        distinct: false,
        parenthesized: true,
        over: None,
        syntax,
    })
}

fn keyword_args(prefix: Option<String>, separators: Vec<&'static str>) -> CallSyntax {
    CallSyntax::Keyword { prefix, separators }
}

fn convert_rounding(name: &str, expr: &ast::Expr, field: &ast::CeilFloorKind) -> Node {
    let mut args = vec![convert_expr(expr)];
    match field {
        ast::CeilFloorKind::DateTimeField(ast::DateTimeField::NoDateTime) => {
            builtin(name, args, CallSyntax::Comma)
        }
        ast::CeilFloorKind::DateTimeField(unit) => {
            args.push(Node::Raw(unit.to_string()));
            builtin(name, args, keyword_args(None, vec!["TO"]))
        }
        ast::CeilFloorKind::Scale(scale) => {
            args.push(convert_value(scale));
            builtin(name, args, CallSyntax::Comma)
        }
    }
}

/// Converts call forms that `sqlparser` models as dedicated expressions
fn convert_builtin_call(expr: &ast::Expr) -> Option<Node> {
    let node = match expr {
        ast::Expr::Trim {
            expr,
            trim_where,
            trim_what,
            trim_characters,
        } => {
            let mut args = Vec::new();
            let mut separators = Vec::new();
            if let Some(what) = trim_what {
                args.push(convert_expr(what));
                separators.push("FROM");
            }
            args.push(convert_expr(expr));
            let prefix = trim_where.as_ref().map(|side| side.to_string());
            if prefix.is_none() && separators.is_empty() {
                args.extend(trim_characters.iter().flatten().map(convert_expr));
                builtin("TRIM", args, CallSyntax::Comma)
            } else {
                builtin("TRIM", args, keyword_args(prefix, separators))
            }
        }
        ast::Expr::Substring {
            expr,
            substring_from,
            substring_for,
            special,
        } => {
            let mut args = vec![convert_expr(expr)];
            let mut separators = Vec::new();
            if let Some(from) = substring_from {
                args.push(convert_expr(from));
                separators.push("FROM");
            }
            if let Some(length) = substring_for {
                args.push(convert_expr(length));
                separators.push("FOR");
            }
            let syntax = if *special {
                CallSyntax::Comma
            } else {
                keyword_args(None, separators)
            };
            builtin("SUBSTRING", args, syntax)
        }
        ast::Expr::Extract {
            field,
            syntax,
            expr,
        } => match syntax {
            ast::ExtractSyntax::From => builtin(
                "EXTRACT",
                vec![convert_expr(expr)],
                keyword_args(Some(format!("{field} FROM")), Vec::new()),
            ),
            ast::ExtractSyntax::Comma => builtin(
                "EXTRACT",
                vec![Node::Raw(field.to_string()), convert_expr(expr)],
                CallSyntax::Comma,
            ),
        },
        ast::Expr::Ceil { expr, field } => convert_rounding("CEIL", expr, field),
        ast::Expr::Floor { expr, field } => convert_rounding("FLOOR", expr, field),
        ast::Expr::Position { expr, r#in } => builtin(
            "POSITION",
            vec![convert_expr(expr), convert_expr(r#in)],
            keyword_args(None, vec!["IN"]),
        ),
        ast::Expr::Overlay {
            expr,
            overlay_what,
            overlay_from,
            overlay_for,
        } => {
            let mut args = vec![
                convert_expr(expr),
                convert_expr(overlay_what),
                convert_expr(overlay_from),
            ];
            let mut separators = vec!["PLACING", "FROM"];
            if let Some(length) = overlay_for {
                args.push(convert_expr(length));
                separators.push("FOR");
            }
            builtin("OVERLAY", args, keyword_args(None, separators))
        }
        _ => return None,
    };
    Some(node)
}

fn convert_value(value: &ast::Value) -> Node {
    match value {
        ast::Value::SingleQuotedString(text)
        | ast::Value::NationalStringLiteral(text)
        | ast::Value::EscapedStringLiteral(text) => Node::Literal(Literal::String(text.clone())),
        ast::Value::Number(number, _) => Node::Literal(Literal::Number(number.to_string())),
        ast::Value::Boolean(value) => Node::Literal(Literal::Boolean(*value)),
        ast::Value::Null => Node::Literal(Literal::Null),
        ast::Value::Placeholder(placeholder) => Node::Parameter(placeholder.clone()),
        other => Node::Literal(Literal::Other(other.to_string())),
    }
}

fn convert_function(function: &ast::Function) -> Node {
    let (args, distinct, parenthesized) = match &function.args {
        ast::FunctionArguments::List(list) => (
            list.args.iter().map(convert_function_arg).collect(),
            matches!(
                list.duplicate_treatment,
                Some(ast::DuplicateTreatment::Distinct)
            ),
            true,
        ),
        ast::FunctionArguments::Subquery(query) => {
            (vec![Node::Subquery(Box::new(convert_query(query)))], false, true)
        }
        ast::FunctionArguments::None => (Vec::new(), false, false),
    };

    Node::Function(Function {
        name: function.name.to_string().to_uppercase(),
        args,
        distinct,
        parenthesized,
        over: function.over.as_ref().map(|window| window.to_string()),
        syntax: CallSyntax::Comma,
    })
}

fn convert_function_arg(arg: &ast::FunctionArg) -> Node {
    match arg {
        ast::FunctionArg::Unnamed(ast::FunctionArgExpr::Expr(expr)) => convert_expr(expr),
        ast::FunctionArg::Unnamed(ast::FunctionArgExpr::Wildcard) => Node::Wildcard(None),
        ast::FunctionArg::Unnamed(ast::FunctionArgExpr::QualifiedWildcard(qualifier)) => {
            Node::Wildcard(Some(qualifier.to_string()))
        }
        other => Node::Raw(other.to_string()),
    }
}

#[cfg(test)]
mod tests;
