//! Run configuration and validation.
//!
//! [`RunConfig`] is externally supplied and immutable for the duration
//! of a run. [`RunConfig::validate`] checks structural invariants before
//! any simulation work starts; validation failure is fatal.

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::adapter::Outcome;
use crate::input::ControllerKind;

/// How serialize/deserialize are interposed around each advance call
/// during replay. Immutable for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CyclePolicy {
    /// Advance only.
    Simple,
    /// Pre-advance with filler inputs, restore, advance, capture back.
    /// Exercises the save/restore path on every tick.
    Rerecord,
    /// Reserved distinct policy. Its cycle currently matches
    /// [`Rerecord`](CyclePolicy::Rerecord).
    Full,
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Rerecord => write!(f, "rerecord"),
            Self::Full => write!(f, "full"),
        }
    }
}

impl FromStr for CyclePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "rerecord" => Ok(Self::Rerecord),
            "full" => Ok(Self::Full),
            _ => Err(ConfigError::UnknownCyclePolicy {
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ControllerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "playback" => Ok(Self::PlaybackLog),
            "native" => Ok(Self::Native),
            _ => Err(ConfigError::UnknownControllerKind {
                value: s.to_string(),
            }),
        }
    }
}

/// Errors detected during [`RunConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The configured state size is zero.
    ZeroStateSize,
    /// The configured trial count is zero.
    ZeroTrials,
    /// An explicit worker count of zero was supplied.
    ZeroWorkers,
    /// A cycle policy name did not match any known policy.
    UnknownCyclePolicy {
        /// The unrecognized name.
        value: String,
    },
    /// A controller kind name did not match any known grammar.
    UnknownControllerKind {
        /// The unrecognized name.
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroStateSize => write!(f, "state_size must be at least 1 byte"),
            Self::ZeroTrials => write!(f, "trial count must be at least 1"),
            Self::ZeroWorkers => write!(f, "worker count must be at least 1"),
            Self::UnknownCyclePolicy { value } => {
                write!(f, "unknown cycle policy '{value}' (simple|rerecord|full)")
            }
            Self::UnknownControllerKind { value } => {
                write!(f, "unknown controller kind '{value}' (playback|native)")
            }
        }
    }
}

impl Error for ConfigError {}

/// Externally supplied configuration for one verification or replay run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Exact serialized state size in bytes; every snapshot in the run
    /// must have this length.
    pub state_size: usize,
    /// The replay cycle policy.
    pub policy: CyclePolicy,
    /// How many filler pre-advances precede each restored tick under the
    /// Rerecord cycle. Ignored by [`CyclePolicy::Simple`].
    pub rerecord_depth: u32,
    /// Seed for the filler input generator.
    pub filler_seed: u64,
    /// Which grammar decodes the input sequence.
    pub controller: ControllerKind,
    /// The expected final outcome triple.
    pub expected: Outcome,
    /// Worker count; `None` selects hardware concurrency.
    pub workers: Option<usize>,
    /// Number of repeated full trials.
    pub trials: u32,
    /// Optional CPU-bound warm-up each worker performs before trial 0.
    /// Busy-wait only, no side effects, no correctness role.
    pub warmup: Option<Duration>,
}

impl RunConfig {
    /// Check structural invariants. Called before any simulation work.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_size == 0 {
            return Err(ConfigError::ZeroStateSize);
        }
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`; auto-detection uses
    /// hardware concurrency with the same clamp.
    pub fn resolved_workers(&self) -> usize {
        match self.workers {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 64),
        }
    }
}
