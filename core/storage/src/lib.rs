//! Snapshot transport abstraction for Marksync.
//!
//! This module provides a trait-based interface to the remote store that
//! holds snapshot files, plus in-memory and local-directory implementations.
//!
//! # Design Principles
//! - Transport isolation: no backend-specific logic outside this crate
//! - Async operations: all I/O operations are async
//! - Unified error semantics: consistent error types across transports
//! - Explicit configuration: transports are built from owned config values,
//!   never from a shared module-global handle

pub mod local;
pub mod memory;
pub mod transport;

pub use local::LocalDirTransport;
pub use memory::MemoryTransport;
pub use transport::{Entry, SnapshotTransport};
