//! Rule Engine - ordered registry of static SQL rules
//!
//! Each rule is a pure function from a parsed statement to findings. The
//! engine runs its rules in registration order and concatenates their output;
//! findings are never re-sorted.

mod builtin;

pub use builtin::*;

use crate::config::AnalyzerConfig;
use crate::finding::{Finding, RuleId};
use crate::parser::ParseError;
use crate::tree::SqlTree;
use std::fmt;

/// A static check over a parsed statement
pub trait Rule: Send + Sync {
    /// Identifier reported on every finding of this rule
    fn id(&self) -> RuleId;

    /// Evaluates the rule, returning findings in tree order
    fn evaluate(&self, tree: &SqlTree) -> Vec<Finding>;
}

/// The built-in rules in evaluation order
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(SelectStar),
        Box::new(LeadingWildcard),
        Box::new(FunctionInPredicate),
        Box::new(OrderByCost),
        Box::new(JoinWithoutOn),
    ]
}

/// Runs a fixed, ordered list of rules over a statement
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// Creates an engine with the built-in rules
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Creates an engine without rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Creates an engine with the built-in rules minus those disabled in `config`
    pub fn with_config(config: &AnalyzerConfig) -> Self {
        Self {
            rules: default_rules()
                .into_iter()
                .filter(|rule| config.is_enabled(rule.id()))
                .collect(),
        }
    }

    /// Appends a rule, evaluated after the existing ones
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Returns the identifiers of the registered rules, in evaluation order
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Runs every rule over the tree and concatenates their findings
    pub fn evaluate(&self, tree: &SqlTree) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in &self.rules {
            let found = rule.evaluate(tree);
            tracing::debug!(rule = %rule.id(), findings = found.len(), "evaluated rule");
            findings.extend(found);
        }
        findings
    }

    /// Diagnoses a parse result.
    ///
    /// A failed parse yields exactly one `parse_error` finding and no rule
    /// runs.
    pub fn diagnose(&self, parsed: &Result<SqlTree, ParseError>) -> Vec<Finding> {
        match parsed {
            Ok(tree) => self.evaluate(tree),
            Err(error) => {
                tracing::debug!(%error, "query did not parse");
                vec![Finding::parse_error(error)]
            }
        }
    }
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_ids())
            .finish()
    }
}
