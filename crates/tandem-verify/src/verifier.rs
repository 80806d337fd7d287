//! Barrier-synchronized lockstep determinism verification.
//!
//! [`DeterminismVerifier`] owns the lockstep protocol:
//! worker 0 advances and captures each step's snapshot, a barrier makes
//! the write visible, every other worker restores that snapshot and
//! *recomputes* the same transition itself, and a second barrier closes
//! the step. Replay-not-copy is the point: two independently computed
//! transitions from the same restored state must converge, which is
//! strictly stronger than copying state around and catches bugs (e.g.
//! residual scratch memory feeding only one code path) that a memory
//! copy check cannot.
//!
//! # Ownership model
//!
//! Each worker thread constructs and owns its adapter for the entire
//! run. Adapters commonly sit on engine-global mutable state, so they
//! are never shared or migrated between threads; nothing here requires
//! `Send` or `Sync` of the adapter type.
//!
//! # Fault handling
//!
//! A structural failure (adapter init, contract violation) must not
//! abort mid-protocol: a worker that stops arriving at barriers would
//! deadlock everyone else. Instead the failing worker records the error,
//! raises a shared fault flag, and keeps its full barrier schedule as a
//! no-op. Every worker finishes the trial matrix; the run then returns
//! the first recorded error.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Barrier, Mutex};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

use tandem_core::{
    AdapterContractError, AdapterInitError, ConfigError, InputRecord, RunConfig, SimAdapter,
    TrialId, WorkerId,
};
use tandem_replay::{fingerprint, SnapshotBuf, SnapshotStore};

use crate::report::VerificationOutcome;

// ── VerifyError ─────────────────────────────────────────────────

/// Structural failures that terminate a verification run.
///
/// Semantic findings (divergence, expectation mismatch) are not errors;
/// they are recorded in the [`VerificationOutcome`].
#[derive(Clone, Debug, PartialEq)]
pub enum VerifyError {
    /// The run configuration failed validation.
    Config(ConfigError),
    /// A worker's adapter failed to initialize.
    WorkerInit {
        /// The worker whose factory call failed.
        worker: WorkerId,
        /// The adapter's failure.
        source: AdapterInitError,
    },
    /// A worker's adapter violated the state-capture contract.
    Contract {
        /// The worker that observed the violation.
        worker: WorkerId,
        /// The trial in which it occurred.
        trial: TrialId,
        /// The violation itself.
        source: AdapterContractError,
    },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::WorkerInit { worker, source } => {
                write!(f, "worker {worker} failed to initialize: {source}")
            }
            Self::Contract {
                worker,
                trial,
                source,
            } => write!(f, "worker {worker} (trial {trial}): {source}"),
        }
    }
}

impl Error for VerifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::WorkerInit { source, .. } => Some(source),
            Self::Contract { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for VerifyError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ── Worker context ──────────────────────────────────────────────

/// Everything a worker thread shares with its peers. One instance per
/// run, borrowed by every worker.
struct WorkerCtx<'a> {
    config: &'a RunConfig,
    inputs: &'a [InputRecord],
    ticks: usize,
    store: &'a SnapshotStore,
    barrier: &'a Barrier,
    ledger: &'a Mutex<VerificationOutcome>,
    fault: &'a AtomicBool,
    errors: Sender<VerifyError>,
}

impl WorkerCtx<'_> {
    fn faulted(&self) -> bool {
        self.fault.load(Ordering::SeqCst)
    }

    /// Record a structural error and degrade every worker to
    /// barrier-keeping no-ops for the rest of the run.
    fn structural_fault(&self, error: VerifyError) {
        self.fault.store(true, Ordering::SeqCst);
        // The channel is unbounded and the receiver outlives the scope.
        let _ = self.errors.send(error);
    }

    /// One worker's full run: warm-up, anchor, then the trial matrix.
    ///
    /// `adapter` is `None` when the factory already failed; the worker
    /// still executes its complete barrier schedule.
    fn run_worker<A: SimAdapter>(&self, worker: WorkerId, mut adapter: Option<A>) {
        // Structurally impossible to violate while the sequence is a
        // shared read-only slice, but the lockstep protocol deadlocks
        // if any worker ever disagrees on N, so assert it anyway.
        assert_eq!(
            self.inputs.len(),
            self.ticks,
            "worker {worker}: sequence length disagrees with the shared tick count"
        );

        if let Some(warmup) = self.config.warmup {
            let end = Instant::now() + warmup;
            while Instant::now() < end {
                std::hint::spin_loop();
            }
        }

        // The agreed initial snapshot: worker 0 captures its freshly
        // initialized state once, before trial 0, and re-anchors from
        // it at the top of every trial.
        let mut anchor = SnapshotBuf::new(self.config.state_size);
        if worker.0 == 0 && !self.faulted() {
            if let Some(a) = adapter.as_ref() {
                if let Err(source) = anchor.capture(a) {
                    self.structural_fault(VerifyError::Contract {
                        worker,
                        trial: TrialId(0),
                        source,
                    });
                }
            }
        }

        for t in 0..self.config.trials {
            let trial = TrialId(t);

            if worker.0 == 0 && !self.faulted() {
                if let Some(a) = adapter.as_mut() {
                    anchor.restore(a);
                }
            }

            for i in 0..self.ticks {
                if worker.0 == 0 && !self.faulted() {
                    if let Some(a) = adapter.as_mut() {
                        a.advance(&self.inputs[i]);
                        if let Err(source) = self.store.capture(i, a) {
                            self.structural_fault(VerifyError::Contract {
                                worker,
                                trial,
                                source,
                            });
                        }
                    }
                }

                // snapshot[i] is fully written before any reader looks.
                self.barrier.wait();

                if worker.0 != 0 && !self.faulted() {
                    if let Some(a) = adapter.as_mut() {
                        match self.store.restore(i, a) {
                            // The same transition, recomputed here,
                            // not copied from worker 0's post-state.
                            Ok(()) => a.advance(&self.inputs[i]),
                            Err(source) => self.structural_fault(VerifyError::Contract {
                                worker,
                                trial,
                                source,
                            }),
                        }
                    }
                }

                // Every reader is done with snapshot[i] before worker 0
                // may overwrite the slot in a later trial.
                self.barrier.wait();
            }

            if !self.faulted() {
                if let Some(a) = adapter.as_ref() {
                    let fp = fingerprint(a);
                    let observed = a.outcome();
                    let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
                    ledger.record_fingerprint(trial, worker, fp);
                    ledger.record_outcome(trial, worker, self.config.expected, observed);
                }
            }
        }
    }
}

// ── DeterminismVerifier ─────────────────────────────────────────

/// Lockstep-replays one input sequence across W independently-owned
/// adapter instances, K times, and cross-checks every fingerprint and
/// outcome.
#[derive(Clone, Debug)]
pub struct DeterminismVerifier {
    config: RunConfig,
}

impl DeterminismVerifier {
    /// Create a verifier from a configuration, validating it first.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigError`].
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the full W × K verification matrix.
    ///
    /// `factory` is invoked once per worker, *inside* that worker's
    /// thread, so adapters backed by engine-global state are correctly
    /// thread-confined. The adapter type therefore needs neither `Send`
    /// nor `Sync`.
    ///
    /// # Errors
    ///
    /// The first structural failure ([`VerifyError::WorkerInit`] or
    /// [`VerifyError::Contract`]) observed by any worker. Semantic
    /// findings never produce an `Err`; they are in the returned
    /// [`VerificationOutcome`].
    pub fn run<A, F>(
        &self,
        factory: F,
        inputs: &[InputRecord],
    ) -> Result<VerificationOutcome, VerifyError>
    where
        A: SimAdapter,
        F: Fn(WorkerId) -> Result<A, AdapterInitError> + Sync,
    {
        let workers = self.config.resolved_workers();
        let ticks = inputs.len();

        let store = SnapshotStore::new(ticks, self.config.state_size);
        let barrier = Barrier::new(workers);
        let ledger = Mutex::new(VerificationOutcome::new(self.config.trials, workers));
        let fault = AtomicBool::new(false);
        let (err_tx, err_rx): (Sender<VerifyError>, Receiver<VerifyError>) =
            crossbeam_channel::unbounded();

        let ctx = WorkerCtx {
            config: &self.config,
            inputs,
            ticks,
            store: &store,
            barrier: &barrier,
            ledger: &ledger,
            fault: &fault,
            errors: err_tx,
        };

        let factory = &factory;
        let ctx = &ctx;
        thread::scope(|scope| {
            for w in 0..workers {
                let worker = WorkerId(w as u32);
                scope.spawn(move || {
                    let adapter = match factory(worker) {
                        Ok(adapter) => Some(adapter),
                        Err(source) => {
                            ctx.structural_fault(VerifyError::WorkerInit { worker, source });
                            None
                        }
                    };
                    ctx.run_worker(worker, adapter);
                });
            }
        });

        if let Some(error) = err_rx.try_iter().next() {
            return Err(error);
        }
        Ok(ledger.into_inner().unwrap_or_else(|e| e.into_inner()))
    }
}
