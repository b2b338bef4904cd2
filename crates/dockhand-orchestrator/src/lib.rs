//! # dockhand-orchestrator
//!
//! Container lifecycle orchestration for the Dockhand hosting platform.
//!
//! Mediates between the platform's domain model (servers and modules) and
//! the external container engine: builds container specs, drives lifecycle
//! transitions, executes remote commands with automatic privilege
//! escalation, and caches expensive inspect-based lookups.
//!
//! The engine itself is injected as an [`dockhand_engine::EngineClient`]
//! trait object; domain projection is delegated to an injected
//! [`mapper::ContainerMapper`].

mod archive;
mod boundary;
pub mod cache;
pub mod exec;
pub mod lifecycle;
mod locks;
pub mod mapper;
pub mod spec;

pub use cache::MetadataCache;
pub use exec::{ExecRequest, RemoteExec};
pub use lifecycle::Orchestrator;
pub use mapper::ContainerMapper;
