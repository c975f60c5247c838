//! Finding to suggestion mapping

use crate::finding::{Finding, RuleId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of remedy a suggestion proposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    /// Change the query or schema shape
    Rewrite,
    /// Add an index
    Index,
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rewrite => "rewrite",
            Self::Index => "index",
        }
    }
}

impl fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single improvement proposal derived from a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,
    /// Human-readable recommendation
    pub message: String,
    /// DDL statement or commented template
    pub ddl: String,
    /// Whether `ddl` can be executed as-is
    pub runnable: bool,
    /// Rule of the finding that produced this suggestion
    pub rule: RuleId,
}

/// Static suggestion text for one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionTemplate {
    pub suggestion_type: SuggestionType,
    pub message: &'static str,
    pub ddl: &'static str,
}

impl SuggestionTemplate {
    /// Instantiates the template for the given rule
    pub fn to_suggestion(&self, rule: RuleId) -> Suggestion {
        Suggestion {
            suggestion_type: self.suggestion_type,
            message: self.message.to_string(),
            ddl: self.ddl.to_string(),
            runnable: false,
            rule,
        }
    }
}

const LEADING_WILDCARD: SuggestionTemplate = SuggestionTemplate {
    suggestion_type: SuggestionType::Rewrite,
    message: "Avoid LIKE '%text'. Consider a normalized column and a prefix pattern 'text%'",
    ddl: "-- create an index on the normalized column where applicable",
};

const ORDER_BY_COST: SuggestionTemplate = SuggestionTemplate {
    suggestion_type: SuggestionType::Index,
    message: "Create an index covering the ORDER BY columns to avoid a sort",
    ddl: "-- CREATE INDEX idx_tbl_col ON tbl(col DESC);",
};

const FUNCTION_IN_PREDICATE: SuggestionTemplate = SuggestionTemplate {
    suggestion_type: SuggestionType::Rewrite,
    message: "Move the function out of the predicate (use a derived or persisted column and index it)",
    ddl: "-- ALTER TABLE ... ADD COLUMN col_norm ...; CREATE INDEX ...",
};

/// Returns the template for a rule, if that rule has one
pub fn template_for(rule: RuleId) -> Option<&'static SuggestionTemplate> {
    match rule {
        RuleId::LeadingWildcard => Some(&LEADING_WILDCARD),
        RuleId::OrderByCost => Some(&ORDER_BY_COST),
        RuleId::FunctionInPredicate => Some(&FUNCTION_IN_PREDICATE),
        RuleId::ParseError | RuleId::SelectStar | RuleId::JoinWithoutOn => None,
    }
}

/// Maps findings to suggestions, one per finding whose rule has a template,
/// preserving finding order
pub fn suggest(findings: &[Finding]) -> Vec<Suggestion> {
    findings
        .iter()
        .filter_map(|finding| {
            template_for(finding.rule).map(|template| template.to_suggestion(finding.rule))
        })
        .collect()
}
