//! Adapter-boundary error types.
//!
//! Structural errors only: both variants here indicate a bug or
//! misconfiguration in a collaborator, never a transient condition, so
//! neither is retried. Semantic findings (divergence, expectation
//! mismatch) are recorded data, not errors — they live in
//! `tandem-verify`.

use std::error::Error;
use std::fmt;

use crate::id::TickId;

/// Failure to initialize a simulation adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdapterInitError {
    /// The adapter rejected its configuration.
    InvalidConfig {
        /// Human-readable description of what was rejected.
        reason: String,
    },
    /// A resource the adapter needs could not be loaded.
    ResourceLoad {
        /// Human-readable description of the missing resource.
        reason: String,
    },
}

impl fmt::Display for AdapterInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid adapter config: {reason}"),
            Self::ResourceLoad { reason } => write!(f, "adapter resource load failed: {reason}"),
        }
    }
}

impl Error for AdapterInitError {}

/// An adapter call violated its documented contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdapterContractError {
    /// `serialize` reported a length different from the configured
    /// state size.
    SerializedSizeMismatch {
        /// The configured state size.
        expected: usize,
        /// The length the adapter reported.
        actual: usize,
        /// The tick at which the capture was attempted.
        tick: TickId,
    },
    /// A caller passed a buffer whose length is not the configured
    /// state size.
    BufferSizeMismatch {
        /// The configured state size.
        expected: usize,
        /// The buffer length the caller supplied.
        actual: usize,
    },
    /// A snapshot slot index is outside the store.
    SlotOutOfRange {
        /// The requested slot index.
        index: usize,
        /// The number of slots in the store.
        len: usize,
    },
}

impl fmt::Display for AdapterContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SerializedSizeMismatch {
                expected,
                actual,
                tick,
            } => write!(
                f,
                "adapter serialized {actual} bytes at tick {tick}, expected exactly {expected}"
            ),
            Self::BufferSizeMismatch { expected, actual } => write!(
                f,
                "snapshot buffer is {actual} bytes, expected exactly {expected}"
            ),
            Self::SlotOutOfRange { index, len } => {
                write!(f, "snapshot slot {index} out of range (store has {len})")
            }
        }
    }
}

impl Error for AdapterContractError {}
