//! SQLite engine implementation

use rusqlite::{Connection, OpenFlags};
use sqlscout_core::{EngineError, EngineOperation, PlanEngine, PlanRow};
use std::fmt;
use std::path::{Path, PathBuf};

/// Path accepted by [`SqliteEngine::open`] for a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// SQLite database handle used to explain queries and apply DDL.
///
/// The connection is closed when the engine is dropped.
pub struct SqliteEngine {
    conn: Connection,
    path: String,
}

impl fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteEngine")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteEngine {
    /// Open (or create) a SQLite database. `:memory:` opens a private
    /// in-memory database.
    pub fn open(path: &str) -> Result<Self, EngineError> {
        tracing::info!(path = %path, "opening SQLite database");
        let expanded_path = Self::expand_path(path)?;

        let conn = if path == MEMORY_PATH {
            Connection::open_in_memory().map_err(|e| {
                open_error(format!("Failed to open in-memory database: {}", e))
            })?
        } else {
            if !expanded_path.starts_with("file:") {
                let file_path = Path::new(&expanded_path);
                if let Some(parent) = file_path.parent()
                    && !parent.exists()
                {
                    return Err(open_error(format!(
                        "Parent directory does not exist: {}",
                        parent.display()
                    )));
                }
            }

            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX;

            Connection::open_with_flags(&expanded_path, flags).map_err(|e| {
                open_error(format!(
                    "Failed to open SQLite database at '{}': {}",
                    expanded_path, e
                ))
            })?
        };

        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| open_error(format!("Failed to enable foreign keys: {}", e)))?;

        tracing::info!(path = %expanded_path, "SQLite database opened");
        Ok(Self {
            conn,
            path: expanded_path,
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, EngineError> {
        Self::open(MEMORY_PATH)
    }

    /// Resolved database path, `:memory:` for in-memory databases
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Expand path to handle ~ (home directory) and relative paths
    fn expand_path(path: &str) -> Result<String, EngineError> {
        if path == MEMORY_PATH || path.starts_with("file:") {
            return Ok(path.to_string());
        }

        let expanded = if let Some(rest) = path.strip_prefix("~/") {
            match std::env::var_os("HOME") {
                Some(home) => PathBuf::from(home).join(rest),
                None => return Err(open_error("Unable to determine HOME directory")),
            }
        } else if path.starts_with('~') {
            return Err(open_error(
                "User-specific home directories (~user) are not supported",
            ));
        } else {
            PathBuf::from(path)
        };

        let absolute = if expanded.is_relative() {
            std::env::current_dir()
                .map_err(|e| open_error(format!("Failed to resolve working directory: {}", e)))?
                .join(expanded)
        } else {
            expanded
        };

        Ok(absolute.to_string_lossy().to_string())
    }
}

fn open_error(message: impl Into<String>) -> EngineError {
    EngineError::new(EngineOperation::Open, message)
}

impl PlanEngine for SqliteEngine {
    fn engine_name(&self) -> &str {
        "sqlite"
    }

    fn explain_plan(&self, query: &str) -> Result<Vec<PlanRow>, EngineError> {
        tracing::debug!(query = %query, "explaining query");
        let explain_error =
            |e: rusqlite::Error| EngineError::new(EngineOperation::Explain, e.to_string());

        let mut stmt = self
            .conn
            .prepare(&format!("EXPLAIN QUERY PLAN {}", query))
            .map_err(explain_error)?;

        // Columns: id, parent, notused, detail
        let rows = stmt
            .query_map([], |row| {
                Ok(PlanRow {
                    id: row.get(0)?,
                    parent: row.get(1)?,
                    detail: row.get(3)?,
                })
            })
            .map_err(explain_error)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(explain_error)
    }

    fn apply_ddl(&self, ddl: &str) -> Result<(), EngineError> {
        tracing::debug!(ddl = %ddl, "applying DDL");
        self.conn
            .execute(ddl, [])
            .map(|_| ())
            .map_err(|e| EngineError::new(EngineOperation::ApplyDdl, e.to_string()))
    }

    fn load_schema(&self, script: &str) -> Result<(), EngineError> {
        self.conn
            .execute_batch(script)
            .map_err(|e| EngineError::new(EngineOperation::LoadSchema, e.to_string()))?;
        tracing::info!(path = %self.path, "schema loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
