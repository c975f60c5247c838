//! Expression Tree - SQL syntax tree consumed by the rule engine
//!
//! The parser adapter converts `sqlparser` statements into [`Node`] values.
//! Rules only read the tree: they locate nodes with [`Node::find_all`] and
//! render sub-expressions through `Display`, which produces a normalized
//! unparse of the node (keywords and function names upper-cased, single
//! spaces between tokens).

use std::fmt;

/// A single parsed SQL statement
#[derive(Debug, Clone, PartialEq)]
pub struct SqlTree {
    root: Node,
}

impl SqlTree {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Returns the statement node
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns an iterator over all nodes of the statement (preorder)
    pub fn iter_nodes(&self) -> Descendants<'_> {
        self.root.descendants()
    }

    /// Finds all nodes of the given kind in source order
    pub fn find_all(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.root.find_all(kind)
    }
}

impl fmt::Display for SqlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

/// Discriminant of a [`Node`], used to search the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Query,
    Select,
    SetOperation,
    Values,
    Insert,
    Update,
    Delete,
    Where,
    Join,
    NestedJoin,
    OrderBy,
    Table,
    Derived,
    Column,
    Wildcard,
    Literal,
    Parameter,
    Function,
    Cast,
    Like,
    BinaryOp,
    UnaryOp,
    Postfix,
    Quantified,
    Nested,
    Tuple,
    IsNull,
    InList,
    InSubquery,
    Between,
    Exists,
    Subquery,
    Case,
    Alias,
    Raw,
}

/// A node of the SQL syntax tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A full query: CTEs, body, ORDER BY, LIMIT/OFFSET
    Query(Query),
    Select(Select),
    SetOperation(SetOperation),
    /// `VALUES (..), (..)` rows
    Values(Vec<Vec<Node>>),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    /// A WHERE clause wrapping its predicate
    Where(Box<Node>),
    Join(Join),
    /// Parenthesized join tree in a FROM clause
    NestedJoin(Box<FromItem>),
    OrderBy(Vec<OrderingTerm>),
    Table(TableRef),
    /// Subquery used as a table in a FROM clause
    Derived(Derived),
    /// Column reference, possibly qualified (`t.col`)
    Column(Vec<String>),
    /// `*` or `qualifier.*`
    Wildcard(Option<String>),
    Literal(Literal),
    /// Bind parameter such as `?`, `$1` or `:name`
    Parameter(String),
    Function(Function),
    Cast {
        expr: Box<Node>,
        data_type: String,
    },
    Like(Like),
    BinaryOp {
        left: Box<Node>,
        op: String,
        right: Box<Node>,
    },
    UnaryOp {
        op: String,
        expr: Box<Node>,
    },
    /// Operator written after its operand: `IS TRUE`, `IS NOT UNKNOWN`, `COLLATE "C"`
    Postfix {
        expr: Box<Node>,
        op: String,
    },
    /// `left op ANY(right)` or `left op ALL(right)`
    Quantified {
        left: Box<Node>,
        op: String,
        quantifier: String,
        right: Box<Node>,
    },
    /// Parenthesized expression
    Nested(Box<Node>),
    /// Row constructor `(a, b)`
    Tuple(Vec<Node>),
    IsNull {
        expr: Box<Node>,
        negated: bool,
    },
    InList {
        expr: Box<Node>,
        list: Vec<Node>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Node>,
        subquery: Box<Node>,
        negated: bool,
    },
    Between {
        expr: Box<Node>,
        low: Box<Node>,
        high: Box<Node>,
        negated: bool,
    },
    Exists {
        subquery: Box<Node>,
        negated: bool,
    },
    /// Scalar or parenthesized subquery
    Subquery(Box<Node>),
    Case(Case),
    Alias {
        expr: Box<Node>,
        alias: String,
    },
    /// Construct the tree does not model, kept as rendered text
    Raw(String),
}

impl Node {
    /// Returns the kind of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Query(_) => NodeKind::Query,
            Self::Select(_) => NodeKind::Select,
            Self::SetOperation(_) => NodeKind::SetOperation,
            Self::Values(_) => NodeKind::Values,
            Self::Insert(_) => NodeKind::Insert,
            Self::Update(_) => NodeKind::Update,
            Self::Delete(_) => NodeKind::Delete,
            Self::Where(_) => NodeKind::Where,
            Self::Join(_) => NodeKind::Join,
            Self::NestedJoin(_) => NodeKind::NestedJoin,
            Self::OrderBy(_) => NodeKind::OrderBy,
            Self::Table(_) => NodeKind::Table,
            Self::Derived(_) => NodeKind::Derived,
            Self::Column(_) => NodeKind::Column,
            Self::Wildcard(_) => NodeKind::Wildcard,
            Self::Literal(_) => NodeKind::Literal,
            Self::Parameter(_) => NodeKind::Parameter,
            Self::Function(_) => NodeKind::Function,
            Self::Cast { .. } => NodeKind::Cast,
            Self::Like(_) => NodeKind::Like,
            Self::BinaryOp { .. } => NodeKind::BinaryOp,
            Self::UnaryOp { .. } => NodeKind::UnaryOp,
            Self::Postfix { .. } => NodeKind::Postfix,
            Self::Quantified { .. } => NodeKind::Quantified,
            Self::Nested(_) => NodeKind::Nested,
            Self::Tuple(_) => NodeKind::Tuple,
            Self::IsNull { .. } => NodeKind::IsNull,
            Self::InList { .. } => NodeKind::InList,
            Self::InSubquery { .. } => NodeKind::InSubquery,
            Self::Between { .. } => NodeKind::Between,
            Self::Exists { .. } => NodeKind::Exists,
            Self::Subquery(_) => NodeKind::Subquery,
            Self::Case(_) => NodeKind::Case,
            Self::Alias { .. } => NodeKind::Alias,
            Self::Raw(_) => NodeKind::Raw,
        }
    }

    /// Returns the direct children of this node in source order
    pub fn children(&self) -> Vec<&Node> {
        let mut children = Vec::new();
        match self {
            Self::Query(query) => {
                children.extend(query.with.iter().map(|cte| &cte.query));
                children.push(query.body.as_ref());
                children.extend(query.order_by.as_deref());
                children.extend(query.limit.as_deref());
                children.extend(query.offset.as_deref());
            }
            Self::Select(select) => {
                children.extend(&select.projection);
                if let Some(from) = &select.from {
                    from.push_children(&mut children);
                }
                children.extend(select.selection.as_deref());
                children.extend(&select.group_by);
                children.extend(select.having.as_deref());
            }
            Self::SetOperation(set) => {
                children.push(set.left.as_ref());
                children.push(set.right.as_ref());
            }
            Self::Values(rows) => children.extend(rows.iter().flatten()),
            Self::Insert(insert) => children.extend(insert.source.as_deref()),
            Self::Update(update) => {
                update.table.push_children(&mut children);
                children.extend(update.assignments.iter().map(|a| &a.value));
                children.extend(update.selection.as_deref());
            }
            Self::Delete(delete) => {
                if let Some(from) = &delete.from {
                    from.push_children(&mut children);
                }
                children.extend(delete.selection.as_deref());
            }
            Self::Where(predicate) => children.push(predicate.as_ref()),
            Self::Join(join) => {
                children.push(join.relation.as_ref());
                if let JoinConstraint::On(on) = &join.constraint {
                    children.push(on.as_ref());
                }
            }
            Self::NestedJoin(item) => item.push_children(&mut children),
            Self::OrderBy(terms) => children.extend(terms.iter().map(|t| &t.expr)),
            Self::Derived(derived) => children.push(derived.subquery.as_ref()),
            Self::Function(function) => children.extend(&function.args),
            Self::Like(like) => {
                children.push(like.expr.as_ref());
                children.push(like.pattern.as_ref());
            }
            Self::BinaryOp { left, right, .. } | Self::Quantified { left, right, .. } => {
                children.push(left.as_ref());
                children.push(right.as_ref());
            }
            Self::Tuple(items) => children.extend(items),
            Self::Cast { expr, .. }
            | Self::UnaryOp { expr, .. }
            | Self::Postfix { expr, .. }
            | Self::IsNull { expr, .. }
            | Self::Alias { expr, .. } => children.push(expr.as_ref()),
            Self::Nested(inner) | Self::Subquery(inner) => children.push(inner.as_ref()),
            Self::InList { expr, list, .. } => {
                children.push(expr.as_ref());
                children.extend(list);
            }
            Self::InSubquery { expr, subquery, .. } => {
                children.push(expr.as_ref());
                children.push(subquery.as_ref());
            }
            Self::Between {
                expr, low, high, ..
            } => {
                children.push(expr.as_ref());
                children.push(low.as_ref());
                children.push(high.as_ref());
            }
            Self::Exists { subquery, .. } => children.push(subquery.as_ref()),
            Self::Case(case) => {
                children.extend(case.operand.as_deref());
                for (condition, result) in &case.branches {
                    children.push(condition);
                    children.push(result);
                }
                children.extend(case.else_result.as_deref());
            }
            Self::Table(_)
            | Self::Column(_)
            | Self::Wildcard(_)
            | Self::Literal(_)
            | Self::Parameter(_)
            | Self::Raw(_) => {}
        }
        children
    }

    /// Returns an iterator over this node and all its descendants (preorder)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self)
    }

    /// Finds this node and all descendants of the given kind, in source order
    pub fn find_all(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.descendants().filter(move |node| node.kind() == kind)
    }

    /// Returns true if this node is a function call (CAST included)
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Function(_) | Self::Cast { .. })
    }

    pub fn as_select(&self) -> Option<&Select> {
        match self {
            Self::Select(select) => Some(select),
            _ => None,
        }
    }

    pub fn as_like(&self) -> Option<&Like> {
        match self {
            Self::Like(like) => Some(like),
            _ => None,
        }
    }

    pub fn as_join(&self) -> Option<&Join> {
        match self {
            Self::Join(join) => Some(join),
            _ => None,
        }
    }
}

/// Iterator for traversing tree nodes depth-first, in source order
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Descendants<'a> {
    fn new(root: &'a Node) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}

/// Common table expression attached to a query
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpr {
    pub name: String,
    pub query: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub recursive: bool,
    pub with: Vec<CommonTableExpr>,
    pub body: Box<Node>,
    /// Always a [`Node::OrderBy`]
    pub order_by: Option<Box<Node>>,
    pub limit: Option<Box<Node>>,
    pub offset: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub projection: Vec<Node>,
    pub from: Option<FromItem>,
    /// Always a [`Node::Where`]
    pub selection: Option<Box<Node>>,
    pub group_by: Vec<Node>,
    pub having: Option<Box<Node>>,
}

impl Select {
    /// Returns true if any projected item is a wildcard
    pub fn has_wildcard(&self) -> bool {
        self.projection
            .iter()
            .any(|item| matches!(item, Node::Wildcard(_)))
    }
}

/// The relations of a FROM clause
///
/// Every relation after the first is a [`Join`]; comma-separated entries
/// become joins of kind [`JoinKind::Comma`].
#[derive(Debug, Clone, PartialEq)]
pub struct FromItem {
    pub relation: Box<Node>,
    /// Always [`Node::Join`] values, in source order
    pub joins: Vec<Node>,
}

impl FromItem {
    fn push_children<'a>(&'a self, children: &mut Vec<&'a Node>) {
        children.push(self.relation.as_ref());
        children.extend(&self.joins);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    /// `UNION`, `INTERSECT`, `EXCEPT`
    pub op: String,
    /// `ALL`, `DISTINCT` or empty
    pub quantifier: String,
    pub left: Box<Node>,
    pub right: Box<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub source: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: String,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: Box<FromItem>,
    pub assignments: Vec<Assignment>,
    pub selection: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub from: Option<FromItem>,
    pub selection: Option<Box<Node>>,
}

/// Join operator of a [`Join`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Implicit join written as `FROM a, b`
    Comma,
    Inner,
    Left,
    Right,
    Full,
    Cross,
    LeftSemi,
    RightSemi,
    LeftAnti,
    RightAnti,
    CrossApply,
    OuterApply,
}

impl JoinKind {
    /// Returns the SQL keyword sequence for this join
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Comma => ",",
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
            Self::LeftSemi => "LEFT SEMI JOIN",
            Self::RightSemi => "RIGHT SEMI JOIN",
            Self::LeftAnti => "LEFT ANTI JOIN",
            Self::RightAnti => "RIGHT ANTI JOIN",
            Self::CrossApply => "CROSS APPLY",
            Self::OuterApply => "OUTER APPLY",
        }
    }

    /// Returns true for joins that take no condition by definition
    pub fn is_conditionless(&self) -> bool {
        matches!(self, Self::Cross | Self::CrossApply | Self::OuterApply)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(Box<Node>),
    Using(Vec<String>),
    Natural,
    None,
}

impl JoinConstraint {
    /// Returns true for an explicit `ON <predicate>`
    pub fn is_on(&self) -> bool {
        matches!(self, Self::On(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub relation: Box<Node>,
    pub constraint: JoinConstraint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderingTerm {
    pub expr: Node,
    /// `Some(true)` for DESC, `Some(false)` for an explicit ASC
    pub descending: Option<bool>,
    pub nulls_first: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub lateral: bool,
    pub subquery: Box<Node>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(String),
    Boolean(bool),
    Null,
    /// Any other literal form, kept as rendered text
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Upper-cased function name
    pub name: String,
    pub args: Vec<Node>,
    pub distinct: bool,
    /// False for niladic forms written without parentheses (`CURRENT_DATE`)
    pub parenthesized: bool,
    /// Rendered window specification
    pub over: Option<String>,
    pub syntax: CallSyntax,
}

/// How the arguments of a [`Function`] are written
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CallSyntax {
    /// `NAME(a, b)`
    #[default]
    Comma,
    /// Keyword-separated arguments such as `SUBSTRING(a FROM b FOR c)`
    ///
    /// `prefix` is written before the first argument and `separators[i]`
    /// before argument `i + 1`.
    Keyword {
        prefix: Option<String>,
        separators: Vec<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Like {
    pub expr: Box<Node>,
    pub pattern: Box<Node>,
    pub negated: bool,
    pub case_insensitive: bool,
    pub escape: Option<String>,
}

impl Like {
    /// Returns the pattern text when the pattern is a string literal
    pub fn literal_pattern(&self) -> Option<&str> {
        match self.pattern.as_ref() {
            Node::Literal(Literal::String(pattern)) => Some(pattern),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub operand: Option<Box<Node>>,
    pub branches: Vec<(Node, Node)>,
    pub else_result: Option<Box<Node>>,
}

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn not(negated: bool) -> &'static str {
    if negated { "NOT " } else { "" }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(query) => fmt::Display::fmt(query, f),
            Self::Select(select) => fmt::Display::fmt(select, f),
            Self::SetOperation(set) => {
                write!(f, "{} {}", set.left, set.op)?;
                if !set.quantifier.is_empty() {
                    write!(f, " {}", set.quantifier)?;
                }
                write!(f, " {}", set.right)
            }
            Self::Values(rows) => {
                f.write_str("VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("(")?;
                    write_separated(f, row, ", ")?;
                    f.write_str(")")?;
                }
                Ok(())
            }
            Self::Insert(insert) => {
                write!(f, "INSERT INTO {}", insert.table)?;
                if !insert.columns.is_empty() {
                    f.write_str(" (")?;
                    write_separated(f, &insert.columns, ", ")?;
                    f.write_str(")")?;
                }
                if let Some(source) = &insert.source {
                    write!(f, " {source}")?;
                }
                Ok(())
            }
            Self::Update(update) => {
                write!(f, "UPDATE {} SET ", update.table)?;
                for (i, assignment) in update.assignments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", assignment.target, assignment.value)?;
                }
                if let Some(selection) = &update.selection {
                    write!(f, " {selection}")?;
                }
                Ok(())
            }
            Self::Delete(delete) => {
                f.write_str("DELETE")?;
                if let Some(from) = &delete.from {
                    write!(f, " FROM {from}")?;
                }
                if let Some(selection) = &delete.selection {
                    write!(f, " {selection}")?;
                }
                Ok(())
            }
            Self::Where(predicate) => write!(f, "WHERE {predicate}"),
            Self::Join(join) => fmt::Display::fmt(join, f),
            Self::NestedJoin(item) => write!(f, "({item})"),
            Self::OrderBy(terms) => {
                f.write_str("ORDER BY ")?;
                write_separated(f, terms, ", ")
            }
            Self::Table(table) => {
                f.write_str(&table.name)?;
                if let Some(alias) = &table.alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
            Self::Derived(derived) => {
                if derived.lateral {
                    f.write_str("LATERAL ")?;
                }
                write!(f, "({})", derived.subquery)?;
                if let Some(alias) = &derived.alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
            Self::Column(parts) => write_separated(f, parts, "."),
            Self::Wildcard(None) => f.write_str("*"),
            Self::Wildcard(Some(qualifier)) => write!(f, "{qualifier}.*"),
            Self::Literal(literal) => fmt::Display::fmt(literal, f),
            Self::Parameter(parameter) => f.write_str(parameter),
            Self::Function(function) => fmt::Display::fmt(function, f),
            Self::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Self::Like(like) => fmt::Display::fmt(like, f),
            Self::BinaryOp { left, op, right } => write!(f, "{left} {op} {right}"),
            Self::Postfix { expr, op } => write!(f, "{expr} {op}"),
            Self::Quantified {
                left,
                op,
                quantifier,
                right,
            } => match right.as_ref() {
                Node::Subquery(_) => write!(f, "{left} {op} {quantifier}{right}"),
                _ => write!(f, "{left} {op} {quantifier}({right})"),
            },
            Self::UnaryOp { op, expr } => {
                if op.chars().all(|c| c.is_ascii_alphabetic()) {
                    write!(f, "{op} {expr}")
                } else {
                    write!(f, "{op}{expr}")
                }
            }
            Self::Nested(inner) => write!(f, "({inner})"),
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_separated(f, items, ", ")?;
                f.write_str(")")
            }
            Self::IsNull { expr, negated } => write!(f, "{expr} IS {}NULL", not(*negated)),
            Self::InList {
                expr,
                list,
                negated,
            } => {
                write!(f, "{expr} {}IN (", not(*negated))?;
                write_separated(f, list, ", ")?;
                f.write_str(")")
            }
            Self::InSubquery {
                expr,
                subquery,
                negated,
            } => write!(f, "{expr} {}IN ({subquery})", not(*negated)),
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => write!(f, "{expr} {}BETWEEN {low} AND {high}", not(*negated)),
            Self::Exists { subquery, negated } => {
                write!(f, "{}EXISTS ({subquery})", not(*negated))
            }
            Self::Subquery(query) => write!(f, "({query})"),
            Self::Case(case) => fmt::Display::fmt(case, f),
            Self::Alias { expr, alias } => write!(f, "{expr} AS {alias}"),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.with.is_empty() {
            f.write_str("WITH ")?;
            if self.recursive {
                f.write_str("RECURSIVE ")?;
            }
            for (i, cte) in self.with.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{} AS ({})", cte.name, cte.query)?;
            }
            f.write_str(" ")?;
        }
        write!(f, "{}", self.body)?;
        if let Some(order_by) = &self.order_by {
            write!(f, " {order_by}")?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = &self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        write_separated(f, &self.projection, ", ")?;
        if let Some(from) = &self.from {
            write!(f, " FROM {from}")?;
        }
        if let Some(selection) = &self.selection {
            write!(f, " {selection}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            write_separated(f, &self.group_by, ", ")?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        Ok(())
    }
}

impl fmt::Display for FromItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relation)?;
        for join in &self.joins {
            match join {
                Node::Join(Join {
                    kind: JoinKind::Comma,
                    ..
                }) => write!(f, "{join}")?,
                _ => write!(f, " {join}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == JoinKind::Comma {
            return write!(f, ", {}", self.relation);
        }
        if self.constraint == JoinConstraint::Natural {
            f.write_str("NATURAL ")?;
        }
        write!(f, "{} {}", self.kind.keyword(), self.relation)?;
        match &self.constraint {
            JoinConstraint::On(on) => write!(f, " ON {on}"),
            JoinConstraint::Using(columns) => {
                f.write_str(" USING (")?;
                write_separated(f, columns, ", ")?;
                f.write_str(")")
            }
            JoinConstraint::Natural | JoinConstraint::None => Ok(()),
        }
    }
}

impl fmt::Display for OrderingTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.descending {
            Some(true) => f.write_str(" DESC")?,
            Some(false) => f.write_str(" ASC")?,
            None => {}
        }
        match self.nulls_first {
            Some(true) => f.write_str(" NULLS FIRST"),
            Some(false) => f.write_str(" NULLS LAST"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Self::Number(value) | Self::Other(value) => f.write_str(value),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.parenthesized {
            f.write_str("(")?;
            if self.distinct {
                f.write_str("DISTINCT ")?;
            }
            match &self.syntax {
                CallSyntax::Comma => write_separated(f, &self.args, ", ")?,
                CallSyntax::Keyword { prefix, separators } => {
                    if let Some(prefix) = prefix {
                        f.write_str(prefix)?;
                        if !self.args.is_empty() {
                            f.write_str(" ")?;
                        }
                    }
                    for (i, arg) in self.args.iter().enumerate() {
                        if let Some(separator) = i.checked_sub(1).and_then(|i| separators.get(i)) {
                            write!(f, " {separator} ")?;
                        } else if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                }
            }
            f.write_str(")")?;
        }
        if let Some(over) = &self.over {
            write!(f, " OVER {over}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Like {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.case_insensitive { "ILIKE" } else { "LIKE" };
        write!(
            f,
            "{} {}{} {}",
            self.expr,
            not(self.negated),
            keyword,
            self.pattern
        )?;
        if let Some(escape) = &self.escape {
            write!(f, " ESCAPE '{}'", escape.replace('\'', "''"))?;
        }
        Ok(())
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CASE")?;
        if let Some(operand) = &self.operand {
            write!(f, " {operand}")?;
        }
        for (condition, result) in &self.branches {
            write!(f, " WHEN {condition} THEN {result}")?;
        }
        if let Some(else_result) = &self.else_result {
            write!(f, " ELSE {else_result}")?;
        }
        f.write_str(" END")
    }
}
