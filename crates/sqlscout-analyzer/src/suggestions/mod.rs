//! Suggestion Mapper
//!
//! Turns findings into index or rewrite suggestions through a fixed
//! rule -> template lookup. Templates are commented DDL, never executed.

mod mapper;

pub use mapper::*;
