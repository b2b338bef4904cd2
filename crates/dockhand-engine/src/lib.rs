//! # dockhand-engine
//!
//! Abstract facade over the external container engine.
//!
//! The engine itself (daemon, wire transport, image storage) lives outside
//! this workspace; this crate defines the narrow contract the orchestrator
//! programs against — the [`EngineClient`] trait, the [`ContainerSpec`]
//! submitted to it, the records it returns, and the engine-side error enum
//! that the orchestrator translates into the platform taxonomy.

pub mod client;
pub mod error;
pub mod record;
pub mod spec;

pub use client::EngineClient;
pub use error::{EngineError, EngineResult};
pub use record::{ConfigRecord, ContainerRecord, ExecId, ExecOptions, ImageSummary, StateRecord};
pub use spec::ContainerSpec;
