//! Single-level cache simulator.
//!
//! Replays a trace of instruction and data accesses against one cache
//! configuration (direct-mapped or fully-associative, unified or split
//! instruction/data stores) and counts hits.

pub mod cache;
pub mod config;
pub mod error;
pub mod mapping;
pub mod organization;
pub mod sim;
pub mod stats;
pub mod trace;

pub use config::{Config, Mapping, Organization};
pub use error::{ConfigError, Error, TraceError};
pub use sim::Simulator;
pub use trace::{Access, AccessKind};
