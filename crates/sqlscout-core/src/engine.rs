//! Relational engine abstraction

use crate::{EngineError, PlanRow};

/// A relational engine able to explain queries and apply DDL.
///
/// Implementations own their connection; callers pass the handle explicitly
/// to every operation. Calls are blocking and run in the order they are made,
/// so an index applied with [`PlanEngine::apply_ddl`] is visible to the next
/// [`PlanEngine::explain_plan`].
pub trait PlanEngine {
    /// Get the engine name (e.g., "sqlite")
    fn engine_name(&self) -> &str;

    /// Return the execution plan the engine would use for `query`
    fn explain_plan(&self, query: &str) -> Result<Vec<PlanRow>, EngineError>;

    /// Execute a single DDL statement such as `CREATE INDEX`
    fn apply_ddl(&self, ddl: &str) -> Result<(), EngineError>;

    /// Execute a schema script that may contain several statements
    fn load_schema(&self, script: &str) -> Result<(), EngineError>;
}
