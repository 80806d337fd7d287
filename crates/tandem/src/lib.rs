//! Tandem: lockstep determinism verification for stepped simulations.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Tandem sub-crates. For most users, adding `tandem` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tandem::prelude::*;
//! use tandem::sim::ReferenceSim;
//!
//! // Replay three no-op ticks on the reference world.
//! let mut sim = ReferenceSim::new(1);
//! sim.initialize().unwrap();
//! let engine = ReplayEngine::new(CyclePolicy::Simple, 0, ReferenceSim::STATE_SIZE, 42);
//! let report = engine.run(&mut sim, &[InputRecord::NEUTRAL; 3]).unwrap();
//! assert_eq!(report.ticks, 3);
//!
//! // Cross-check the same sequence across four lockstep workers.
//! let config = RunConfig {
//!     state_size: ReferenceSim::STATE_SIZE,
//!     policy: CyclePolicy::Simple,
//!     rerecord_depth: 0,
//!     filler_seed: 42,
//!     controller: ControllerKind::PlaybackLog,
//!     expected: Outcome::default(),
//!     workers: Some(4),
//!     trials: 2,
//!     warmup: None,
//! };
//! let verifier = DeterminismVerifier::new(config).unwrap();
//! let outcome = verifier
//!     .run(
//!         |_worker| {
//!             let mut sim = ReferenceSim::new(1);
//!             sim.initialize()?;
//!             Ok(sim)
//!         },
//!         &[InputRecord::NEUTRAL; 3],
//!     )
//!     .unwrap();
//! assert!(outcome.passed());
//! assert_eq!(outcome.canonical_fingerprint(), Some(report.fingerprint));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tandem-core` | IDs, input records, the adapter trait, run configuration |
//! | [`replay`] | `tandem-replay` | Codec, snapshot store, fingerprinting, replay cycles |
//! | [`verify`] | `tandem-verify` | The lockstep determinism verifier and its report |
//! | [`sim`] | `tandem-sim` | The reference simulation adapter |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`tandem-core`).
pub use tandem_core as types;

/// Codec, snapshot buffers, fingerprinting, and replay cycles
/// (`tandem-replay`).
pub use tandem_replay as replay;

/// The lockstep determinism verifier (`tandem-verify`).
pub use tandem_verify as verify;

/// The reference simulation adapter (`tandem-sim`).
pub use tandem_sim as sim;

/// The most commonly used types, re-exported flat.
pub mod prelude {
    pub use tandem_core::{
        AdapterContractError, AdapterInitError, ConfigError, ControllerKind, CyclePolicy,
        InputRecord, Outcome, RunConfig, SimAdapter, TickId, TrialId, WorkerId,
    };
    pub use tandem_replay::{
        fingerprint, Fingerprint, ReplayEngine, ReplayReport, SnapshotBuf, SnapshotStore,
    };
    pub use tandem_verify::{DeterminismVerifier, VerificationOutcome, VerifyError};
}
