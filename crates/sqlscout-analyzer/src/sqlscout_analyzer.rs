//! SQLScout Analyzer - static SQL diagnostics
//!
//! This crate provides functionality for:
//! - Parsing a SQL statement into an expression tree
//! - Detecting common performance anti-patterns with an ordered rule engine
//! - Mapping findings to index and rewrite suggestions
//! - Comparing execution plans before and after an index change

pub mod advisor;
pub mod compare;
pub mod config;
pub mod finding;
pub mod parser;
pub mod rules;
pub mod suggestions;
pub mod tree;

pub use advisor::*;
pub use compare::*;
pub use config::*;
pub use finding::*;
pub use parser::{ParseError, SqlDialect, parse};
pub use rules::*;
pub use suggestions::*;
pub use tree::*;

/// Diagnoses a query with the default configuration
pub fn diagnose(query: &str) -> Vec<Finding> {
    QueryAdvisor::new().diagnose(query)
}
