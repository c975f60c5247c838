//! Analyzer configuration

use crate::finding::RuleId;
use crate::parser::SqlDialect;
use serde::{Deserialize, Serialize};

/// Configuration for the query advisor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Dialect used to parse queries
    pub dialect: SqlDialect,
    /// Rules skipped during diagnosis
    #[serde(default)]
    pub disabled_rules: Vec<RuleId>,
}

impl AnalyzerConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parsing dialect
    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Disables a rule
    pub fn with_disabled_rule(mut self, rule: RuleId) -> Self {
        if !self.disabled_rules.contains(&rule) {
            self.disabled_rules.push(rule);
        }
        self
    }

    /// Disables several rules
    pub fn with_disabled_rules(self, rules: impl IntoIterator<Item = RuleId>) -> Self {
        rules
            .into_iter()
            .fold(self, |config, rule| config.with_disabled_rule(rule))
    }

    /// Returns true if the rule should run
    pub fn is_enabled(&self, rule: RuleId) -> bool {
        !self.disabled_rules.contains(&rule)
    }
}
