//! Query Advisor - diagnosis, suggestions and index-effect comparison
//!
//! [`QueryAdvisor`] ties the pieces together: parse with the configured
//! dialect, run the rule engine, map findings to suggestions and, when an
//! engine and DDL are supplied, compare the plan before and after the DDL.

use crate::compare::{PlanComparisonRow, compare};
use crate::config::AnalyzerConfig;
use crate::finding::Finding;
use crate::parser::{self, ParseError};
use crate::rules::RuleEngine;
use crate::suggestions::{Suggestion, suggest};
use crate::tree::SqlTree;
use serde::{Deserialize, Serialize};
use sqlscout_core::{EngineError, PlanEngine};

/// Findings, suggestions and optional plan comparison for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeReport {
    pub findings: Vec<Finding>,
    pub suggestions: Vec<Suggestion>,
    /// Present only when DDL was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Vec<PlanComparisonRow>>,
}

impl OptimizeReport {
    /// Returns true if any finding is at least a warning
    pub fn has_warnings(&self) -> bool {
        self.findings
            .iter()
            .any(|finding| finding.severity.is_warning_or_above())
    }
}

/// Static SQL advisor
#[derive(Debug)]
pub struct QueryAdvisor {
    config: AnalyzerConfig,
    rules: RuleEngine,
}

impl Default for QueryAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryAdvisor {
    /// Creates an advisor with default config
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Creates an advisor with custom config
    pub fn with_config(config: AnalyzerConfig) -> Self {
        let rules = RuleEngine::with_config(&config);
        Self { config, rules }
    }

    /// Returns the advisor config
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Returns the rule engine
    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    /// Parses a query with the configured dialect
    pub fn parse(&self, query: &str) -> Result<SqlTree, ParseError> {
        parser::parse(query, self.config.dialect)
    }

    /// Runs the rules over a query. Never fails; unparsable input yields a
    /// single `parse_error` finding.
    pub fn diagnose(&self, query: &str) -> Vec<Finding> {
        self.rules.diagnose(&self.parse(query))
    }

    /// Maps findings to suggestions
    pub fn suggest(&self, findings: &[Finding]) -> Vec<Suggestion> {
        suggest(findings)
    }

    /// Static analysis only: findings and suggestions, no engine involved
    pub fn analyze(&self, query: &str) -> OptimizeReport {
        let findings = self.diagnose(query);
        let suggestions = self.suggest(&findings);
        OptimizeReport {
            findings,
            suggestions,
            comparison: None,
        }
    }

    /// Static analysis plus, when `create_index` is given, the before/after
    /// plan comparison for that DDL.
    ///
    /// The DDL is applied to the engine and stays applied.
    pub fn optimize<E: PlanEngine + ?Sized>(
        &self,
        engine: &E,
        query: &str,
        create_index: Option<&str>,
    ) -> Result<OptimizeReport, EngineError> {
        let mut report = self.analyze(query);
        if let Some(ddl) = create_index {
            report.comparison = Some(compare_index_effect(engine, query, ddl)?);
        }
        Ok(report)
    }
}

/// Explains `query`, applies `ddl`, explains again and pairs the two plans
pub fn compare_index_effect<E: PlanEngine + ?Sized>(
    engine: &E,
    query: &str,
    ddl: &str,
) -> Result<Vec<PlanComparisonRow>, EngineError> {
    let before = engine.explain_plan(query)?;
    engine.apply_ddl(ddl)?;
    let after = engine.explain_plan(query)?;
    tracing::debug!(
        engine = engine.engine_name(),
        before = before.len(),
        after = after.len(),
        "compared plans"
    );
    Ok(compare(&before, &after))
}
