//! SQLScout Core - shared types for the SQL advisor
//!
//! This crate provides the pieces every other SQLScout crate depends on:
//!
//! - `PlanEngine` - Trait for the relational engine that produces query plans
//! - `PlanRow` - One step of an execution plan
//! - `ScoutError` / `EngineError` - Error types

mod engine;
mod error;
mod plan;

pub use engine::*;
pub use error::*;
pub use plan::*;
