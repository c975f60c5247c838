//! SQLite plan engine

mod engine;

pub use engine::{MEMORY_PATH, SqliteEngine};
