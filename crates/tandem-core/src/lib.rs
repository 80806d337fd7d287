//! Core types and traits for the Tandem determinism harness.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Tandem workspace:
//! typed IDs, the input record, the simulation adapter boundary, and
//! run configuration.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod adapter;
pub mod config;
pub mod error;
pub mod id;
pub mod input;

pub use adapter::{ActorProbe, Outcome, SimAdapter, StateProbe};
pub use config::{ConfigError, CyclePolicy, RunConfig};
pub use error::{AdapterContractError, AdapterInitError};
pub use id::{MapId, ObjectiveId, TickId, TrialId, WorkerId};
pub use input::{ControllerKind, InputRecord};
