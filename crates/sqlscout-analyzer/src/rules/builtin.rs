//! Built-in rules

use super::Rule;
use crate::finding::{Finding, RuleId, Severity};
use crate::tree::{NodeKind, SqlTree};

/// Flags every SELECT that projects `*` or `table.*`
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectStar;

impl Rule for SelectStar {
    fn id(&self) -> RuleId {
        RuleId::SelectStar
    }

    fn evaluate(&self, tree: &SqlTree) -> Vec<Finding> {
        tree.find_all(NodeKind::Select)
            .filter_map(|node| node.as_select())
            .filter(|select| select.has_wildcard())
            .map(|_| {
                Finding::new(
                    self.id(),
                    Severity::Warn,
                    "SELECT * found: list the needed columns to reduce row width and I/O",
                )
            })
            .collect()
    }
}

/// Flags LIKE patterns that start with `%`, which cannot use an index
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingWildcard;

impl Rule for LeadingWildcard {
    fn id(&self) -> RuleId {
        RuleId::LeadingWildcard
    }

    fn evaluate(&self, tree: &SqlTree) -> Vec<Finding> {
        tree.find_all(NodeKind::Like)
            .filter_map(|node| node.as_like())
            .filter_map(|like| like.literal_pattern())
            .filter(|pattern| pattern.starts_with('%'))
            .map(|pattern| {
                Finding::new(
                    self.id(),
                    Severity::Warn,
                    "LIKE with a leading wildcard ('%text') is not sargable and bypasses indexes",
                )
                .with_detail("pattern", pattern)
            })
            .collect()
    }
}

/// Flags function calls inside WHERE clauses, e.g. `LOWER(col) = ...`
///
/// Every WHERE clause is searched on its own, so a call inside a nested
/// subquery's WHERE is reported once for each enclosing WHERE.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionInPredicate;

impl Rule for FunctionInPredicate {
    fn id(&self) -> RuleId {
        RuleId::FunctionInPredicate
    }

    fn evaluate(&self, tree: &SqlTree) -> Vec<Finding> {
        tree.find_all(NodeKind::Where)
            .flat_map(|clause| clause.descendants().filter(|node| node.is_call()))
            .map(|call| {
                Finding::new(
                    self.id(),
                    Severity::Warn,
                    "Function in WHERE predicate may prevent index use (e.g. LOWER(col))",
                )
                .with_detail("func", call.to_string())
            })
            .collect()
    }
}

/// Notes that ORDER BY may need a sort; reported once, for the first clause
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderByCost;

impl Rule for OrderByCost {
    fn id(&self) -> RuleId {
        RuleId::OrderByCost
    }

    fn evaluate(&self, tree: &SqlTree) -> Vec<Finding> {
        tree.find_all(NodeKind::OrderBy)
            .next()
            .map(|order| {
                Finding::new(
                    self.id(),
                    Severity::Info,
                    "ORDER BY may require a sort if no compatible index exists",
                )
                .with_detail("order", order.to_string())
            })
            .into_iter()
            .collect()
    }
}

/// Flags joins without an explicit ON predicate, except CROSS joins
///
/// USING, NATURAL and comma joins are reported too: none of them states the
/// join predicate in the query text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinWithoutOn;

impl Rule for JoinWithoutOn {
    fn id(&self) -> RuleId {
        RuleId::JoinWithoutOn
    }

    fn evaluate(&self, tree: &SqlTree) -> Vec<Finding> {
        tree.find_all(NodeKind::Join)
            .filter(|node| {
                node.as_join().is_some_and(|join| {
                    !join.kind.is_conditionless() && !join.constraint.is_on()
                })
            })
            .map(|join| {
                Finding::new(
                    self.id(),
                    Severity::Error,
                    "JOIN without ON condition: possible unintended cartesian product",
                )
                .with_detail("join", join.to_string())
            })
            .collect()
    }
}
