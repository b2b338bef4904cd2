//! # dockhand-common
//!
//! Shared types, error taxonomy, configuration model, and constants used
//! across the Dockhand workspace.
//!
//! This crate is the leaf of the dependency graph — it depends on no other
//! internal crate and provides the foundational primitives that the engine
//! facade and the orchestrator build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
