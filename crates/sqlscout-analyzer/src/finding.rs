//! Findings - diagnostic results produced by rules

use crate::parser::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Severity level for findings, ordered `Info < Warn < Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational hint
    Info,
    /// Pattern that may impact performance
    Warn,
    /// Likely mistake
    Error,
}

impl Severity {
    /// Returns true if this is at least a warning
    pub fn is_warning_or_above(&self) -> bool {
        *self >= Self::Warn
    }

    /// Returns the severity level as a display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of the rule that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Synthetic rule reported when the query could not be parsed
    ParseError,
    SelectStar,
    LeadingWildcard,
    FunctionInPredicate,
    OrderByCost,
    JoinWithoutOn,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "parse_error",
            Self::SelectStar => "select_star",
            Self::LeadingWildcard => "leading_wildcard",
            Self::FunctionInPredicate => "function_in_predicate",
            Self::OrderByCost => "order_by_cost",
            Self::JoinWithoutOn => "join_without_on",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parse_error" => Ok(Self::ParseError),
            "select_star" => Ok(Self::SelectStar),
            "leading_wildcard" => Ok(Self::LeadingWildcard),
            "function_in_predicate" => Ok(Self::FunctionInPredicate),
            "order_by_cost" => Ok(Self::OrderByCost),
            "join_without_on" => Ok(Self::JoinWithoutOn),
            other => Err(format!("unknown rule '{other}'")),
        }
    }
}

/// Rule-specific payload of a finding
pub type Detail = BTreeMap<String, serde_json::Value>;

/// A single diagnostic result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule that produced the finding
    pub rule: RuleId,
    pub severity: Severity,
    /// Human-readable explanation, not used for logic
    pub message: String,
    #[serde(default)]
    pub detail: Detail,
}

impl Finding {
    /// Creates a finding without detail
    pub fn new(rule: RuleId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            message: message.into(),
            detail: Detail::new(),
        }
    }

    /// Adds a detail entry
    pub fn with_detail(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }

    /// The finding reported in place of all rules when parsing failed
    pub fn parse_error(error: &ParseError) -> Self {
        Self::new(
            RuleId::ParseError,
            Severity::Error,
            format!("Could not parse SQL: {error}"),
        )
    }

    /// Returns a string detail value
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.detail.get(key).and_then(|value| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error.is_warning_or_above());
        assert!(!Severity::Info.is_warning_or_above());
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&Severity::Warn).unwrap();
        assert_eq!(json, "\"WARN\"");

        let parsed: Severity = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(parsed, Severity::Error);
    }

    #[test]
    fn test_rule_id_round_trips_through_str() {
        for rule in [
            RuleId::ParseError,
            RuleId::SelectStar,
            RuleId::LeadingWildcard,
            RuleId::FunctionInPredicate,
            RuleId::OrderByCost,
            RuleId::JoinWithoutOn,
        ] {
            assert_eq!(rule.as_str().parse::<RuleId>(), Ok(rule));
            assert_eq!(
                serde_json::to_string(&rule).unwrap(),
                format!("\"{}\"", rule.as_str())
            );
        }
        assert!("select_all".parse::<RuleId>().is_err());
    }

    #[test]
    fn test_finding_json_shape() {
        let finding = Finding::new(RuleId::LeadingWildcard, Severity::Warn, "leading wildcard")
            .with_detail("pattern", "%foo");

        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "rule": "leading_wildcard",
                "severity": "WARN",
                "message": "leading wildcard",
                "detail": {"pattern": "%foo"}
            })
        );
        assert_eq!(finding.detail_str("pattern"), Some("%foo"));
        assert_eq!(finding.detail_str("func"), None);
    }

    #[test]
    fn test_parse_error_finding() {
        let finding = Finding::parse_error(&ParseError::Empty);
        assert_eq!(finding.rule, RuleId::ParseError);
        assert_eq!(finding.severity, Severity::Error);
        assert!(finding.message.contains("no SQL statement found"));
        assert!(finding.detail.is_empty());
    }
}
