//! Input decoding, snapshot capture, fingerprinting, and replay cycles.
//!
//! This crate owns the single-instance half of the harness:
//!
//! - [`codec`] decodes text input sequences into
//!   [`InputRecord`](tandem_core::InputRecord)s (and encodes them back,
//!   for test generation)
//! - [`store`] provides the exact-length snapshot buffers and the shared
//!   per-step [`SnapshotStore`]
//! - [`fingerprint`] reduces observable simulation state to a 128-bit
//!   order-sensitive digest
//! - [`engine`] drives one adapter through a sequence under a
//!   [`CyclePolicy`](tandem_core::CyclePolicy)
//! - [`filler`] generates the seeded pseudo-random churn inputs the
//!   Rerecord cycle uses to perturb adapter-internal transient buffers
//!
//! The multi-instance lockstep protocol lives in `tandem-verify`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod engine;
pub mod error;
pub mod filler;
pub mod fingerprint;
pub mod store;

pub use codec::{decode_line, encode_line, load_sequence, load_sequence_file};
pub use engine::{ReplayEngine, ReplayReport};
pub use error::{DecodeError, DecodeReason, SequenceError};
pub use filler::FillerInputs;
pub use fingerprint::{fingerprint, probe_digest, Fingerprint};
pub use store::{SnapshotBuf, SnapshotStore};
