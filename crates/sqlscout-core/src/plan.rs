//! Plan rows returned by the engine's EXPLAIN facility

use serde::{Deserialize, Serialize};

/// One step of a query execution plan.
///
/// Mirrors the columns of SQLite's `EXPLAIN QUERY PLAN` (`id`, `parent`,
/// `notused`, `detail`); `notused` is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRow {
    /// Step identifier
    pub id: i64,
    /// Identifier of the parent step, 0 for top-level steps
    pub parent: i64,
    /// Engine description of the step, e.g. `SCAN users`
    pub detail: String,
}

impl PlanRow {
    pub fn new(id: i64, parent: i64, detail: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            detail: detail.into(),
        }
    }
}
