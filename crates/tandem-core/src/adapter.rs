//! The simulation adapter boundary.
//!
//! The underlying simulation engine is an external collaborator: this
//! harness never looks inside it. [`SimAdapter`] is the complete surface
//! the harness consumes — advance, exact-length state capture/restore,
//! and two read-only views ([`StateProbe`] for fingerprinting,
//! [`Outcome`] for final-state expectations).
//!
//! # Thread confinement
//!
//! Adapters are typically backed by engine-global mutable state and are
//! therefore pinned to the thread that constructed them. Nothing in this
//! trait requires `Send` or `Sync`; the verifier constructs each adapter
//! inside its owning worker thread and never migrates it.

use crate::error::AdapterInitError;
use crate::id::{MapId, ObjectiveId, TickId};
use crate::input::InputRecord;

/// One independent simulation instance, driven one tick at a time.
pub trait SimAdapter {
    /// Idempotent setup: load resources and reset to the initial state.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterInitError`] on bad configuration or resource
    /// load failure.
    fn initialize(&mut self) -> Result<(), AdapterInitError>;

    /// Apply one discrete input-driven step. Side-effecting, no return
    /// value; failures inside the engine surface later as fingerprint or
    /// outcome differences, which is exactly what the harness measures.
    fn advance(&mut self, input: &InputRecord);

    /// Serialize the complete simulation state into `buf` and return the
    /// number of bytes written.
    ///
    /// The caller supplies a buffer of exactly the configured state size;
    /// passing any other length is a caller contract violation. A return
    /// value different from the configured state size is an *adapter*
    /// contract violation and is fatal to the run.
    fn serialize(&self, buf: &mut [u8]) -> usize;

    /// Restore the complete simulation state from `buf`.
    ///
    /// `buf` is always exactly the bytes produced by a prior
    /// [`serialize`](SimAdapter::serialize) call of the configured state
    /// size. Restoring rewinds the instance to the top of the captured
    /// tick: transient per-tick observables from the tick before the
    /// capture are cleared.
    fn deserialize(&mut self, buf: &[u8]);

    /// Read-only view of the observable fields the fingerprinter digests.
    fn probe(&self) -> StateProbe;

    /// Read-only view of the outcome triple compared against the
    /// externally supplied expectation.
    fn outcome(&self) -> Outcome;
}

/// Observable simulation fields, in the order the fingerprinter
/// consumes them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateProbe {
    /// The map (level) identifier.
    pub map: MapId,
    /// The tick counter.
    pub tick: TickId,
    /// The tracked primary actor, if one exists.
    ///
    /// `None` means the actor's fields are omitted from the digest
    /// entirely (not zero-filled): fingerprints are only comparable
    /// across runs that agree on whether the actor exists.
    pub actor: Option<ActorProbe>,
}

/// Observable fields of the tracked primary actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorProbe {
    /// Position, three components.
    pub position: [f32; 3],
    /// Orientation (heading).
    pub orientation: f32,
    /// Velocity, three components.
    pub velocity: [f32; 3],
    /// Remaining health.
    pub health: i32,
}

/// The outcome triple: objective location plus the two terminal-condition
/// flags. Used both for observed outcomes and the externally supplied
/// expectation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Outcome {
    /// The objective location the instance ended on.
    pub objective: ObjectiveId,
    /// Terminal condition A: the instance reached a completed state.
    pub completed: bool,
    /// Terminal condition B: the instance reached a failed state.
    pub failed: bool,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "objective={} completed={} failed={}",
            self.objective, self.completed, self.failed
        )
    }
}
