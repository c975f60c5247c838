//! Tests for the SQLite engine

use super::*;
use indoc::indoc;

const SCHEMA: &str = indoc! {"
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        email TEXT NOT NULL,
        name TEXT,
        created_at TEXT
    );
    INSERT INTO users (email, name, created_at) VALUES ('a@example.com', 'a', '2024-01-01');
"};

fn engine_with_schema() -> SqliteEngine {
    let engine = SqliteEngine::open_in_memory().unwrap();
    engine.load_schema(SCHEMA).unwrap();
    engine
}

fn details(rows: &[PlanRow]) -> Vec<&str> {
    rows.iter().map(|row| row.detail.as_str()).collect()
}

mod open_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_in_memory() {
        let engine = SqliteEngine::open(":memory:").unwrap();
        assert_eq!(engine.path(), MEMORY_PATH);
        assert_eq!(engine.engine_name(), "sqlite");
    }

    #[test]
    fn test_file_database_persists_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.db");
        let path = path.to_str().unwrap();

        {
            let engine = SqliteEngine::open(path).unwrap();
            engine.load_schema(SCHEMA).unwrap();
        }

        let reopened = SqliteEngine::open(path).unwrap();
        assert_eq!(reopened.path(), path);
        assert!(!reopened.explain_plan("SELECT * FROM users").unwrap().is_empty());
    }

    #[test]
    fn test_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("scout.db");
        let err = SqliteEngine::open(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.operation, EngineOperation::Open);
        assert!(err.message.contains("Parent directory does not exist"));
    }

    #[test]
    fn test_debug_shows_path() {
        let engine = SqliteEngine::open(":memory:").unwrap();
        assert_eq!(format!("{engine:?}"), "SqliteEngine { path: \":memory:\", .. }");
    }

    #[test]
    fn test_user_home_paths_are_rejected() {
        let err = SqliteEngine::open("~bob/scout.db").unwrap_err();
        assert_eq!(err.operation, EngineOperation::Open);
    }
}

mod explain_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_scan() {
        let engine = engine_with_schema();
        let plan = engine
            .explain_plan("SELECT name FROM users WHERE email = 'a@example.com'")
            .unwrap();
        assert_eq!(details(&plan), vec!["SCAN users"]);
        assert_eq!(plan[0].parent, 0);
    }

    #[test]
    fn test_order_by_uses_temp_btree() {
        let engine = engine_with_schema();
        let plan = engine
            .explain_plan("SELECT * FROM users ORDER BY created_at DESC")
            .unwrap();
        assert_eq!(
            details(&plan),
            vec!["SCAN users", "USE TEMP B-TREE FOR ORDER BY"]
        );
    }

    #[test]
    fn test_unknown_table() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let err = engine.explain_plan("SELECT * FROM nope").unwrap_err();
        assert_eq!(err.operation, EngineOperation::Explain);
        assert!(err.message.contains("no such table"));
    }
}

mod ddl_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_changes_plan() {
        let engine = engine_with_schema();
        let query = "SELECT name FROM users WHERE email = 'a@example.com'";

        let before = engine.explain_plan(query).unwrap();
        engine
            .apply_ddl("CREATE INDEX idx_users_email ON users(email)")
            .unwrap();
        let after = engine.explain_plan(query).unwrap();

        assert_eq!(details(&before), vec!["SCAN users"]);
        assert_eq!(after.len(), 1);
        assert!(after[0].detail.starts_with("SEARCH users"));
        assert!(after[0].detail.contains("idx_users_email"));
    }

    #[test]
    fn test_bad_ddl() {
        let engine = engine_with_schema();
        let err = engine.apply_ddl("CREATE INDX broken ON users(email)").unwrap_err();
        assert_eq!(err.operation, EngineOperation::ApplyDdl);
    }

    #[test]
    fn test_bad_schema_script() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let err = engine.load_schema("CREATE TABLE (;").unwrap_err();
        assert_eq!(err.operation, EngineOperation::LoadSchema);
        assert!(err.to_string().starts_with("load_schema failed"));
    }
}
