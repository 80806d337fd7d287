//! Cross-instance lockstep determinism verification.
//!
//! Owns the multi-thread half of the Tandem harness: one OS thread per
//! worker, one independently-constructed adapter per thread, a
//! double-barrier lockstep loop over the input sequence, and
//! mutex-guarded comparison of every worker's fingerprint and outcome
//! against the trial canonical and the external expectation.
//!
//! # Protocol sketch
//!
//! ```text
//! per trial:
//!   worker 0 restores the anchor snapshot
//!   per step i:
//!     worker 0: advance(input[i]); capture -> snapshot[i]
//!     -- barrier --
//!     workers 1..W: restore snapshot[i]; advance(input[i])
//!     -- barrier --
//!   every worker: fingerprint + outcome, reported under the mutex
//! ```
//!
//! Divergences and expectation mismatches are recorded, never thrown;
//! the run always completes its full trial/worker matrix.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod report;
pub mod verifier;

pub use report::{Divergence, ExpectationMismatch, VerificationOutcome, WorkerReport};
pub use verifier::{DeterminismVerifier, VerifyError};
