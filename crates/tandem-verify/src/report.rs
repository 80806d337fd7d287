//! Verification result aggregation.
//!
//! Semantic findings — cross-worker fingerprint divergences and
//! final-outcome expectation mismatches — are recorded here, never
//! raised as errors: the run always completes its full trial/worker
//! matrix before reporting. Both checks are independent and both are
//! always reported; neither short-circuits the other.

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use tandem_core::{Outcome, TrialId, WorkerId};
use tandem_replay::Fingerprint;

/// One worker's fingerprint report for one trial.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorkerReport {
    /// The reporting worker.
    pub worker: WorkerId,
    /// The fingerprint it computed.
    pub fingerprint: Fingerprint,
}

/// Two workers' fingerprints disagreed after identical processing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Divergence {
    /// The trial in which the disagreement occurred.
    pub trial: TrialId,
    /// The worker whose report disagreed with the canonical value.
    pub worker: WorkerId,
    /// The trial's canonical fingerprint (first one reported).
    pub canonical: Fingerprint,
    /// The disagreeing fingerprint.
    pub observed: Fingerprint,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trial {} worker {}: fingerprint {} diverges from canonical {}",
            self.trial, self.worker, self.observed, self.canonical
        )
    }
}

/// A worker's final outcome differed from the supplied expectation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpectationMismatch {
    /// The trial in which the mismatch occurred.
    pub trial: TrialId,
    /// The worker whose outcome mismatched.
    pub worker: WorkerId,
    /// The externally supplied expectation.
    pub expected: Outcome,
    /// What the worker's instance actually reported.
    pub observed: Outcome,
}

impl fmt::Display for ExpectationMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trial {} worker {}: outcome [{}] does not match expected [{}]",
            self.trial, self.worker, self.observed, self.expected
        )
    }
}

/// Aggregated result of one full verification run.
///
/// Accumulated under the verifier's mutex while workers report, then
/// returned by value and never mutated again.
#[derive(Clone, Debug)]
pub struct VerificationOutcome {
    trials: u32,
    workers: usize,
    fingerprints: IndexMap<TrialId, SmallVec<[WorkerReport; 8]>>,
    divergences: Vec<Divergence>,
    expectation_failures: Vec<ExpectationMismatch>,
}

impl VerificationOutcome {
    /// Create an empty aggregate for a `trials` × `workers` matrix.
    pub(crate) fn new(trials: u32, workers: usize) -> Self {
        Self {
            trials,
            workers,
            fingerprints: IndexMap::new(),
            divergences: Vec::new(),
            expectation_failures: Vec::new(),
        }
    }

    /// Record one worker's fingerprint for one trial.
    ///
    /// The first report for a trial becomes its canonical value; every
    /// later report is compared against it and any inequality is
    /// recorded as a [`Divergence`].
    pub(crate) fn record_fingerprint(
        &mut self,
        trial: TrialId,
        worker: WorkerId,
        fingerprint: Fingerprint,
    ) {
        let reports = self.fingerprints.entry(trial).or_default();
        if let Some(first) = reports.first() {
            if first.fingerprint != fingerprint {
                self.divergences.push(Divergence {
                    trial,
                    worker,
                    canonical: first.fingerprint,
                    observed: fingerprint,
                });
            }
        }
        reports.push(WorkerReport {
            worker,
            fingerprint,
        });
    }

    /// Record one worker's final-outcome check for one trial.
    pub(crate) fn record_outcome(
        &mut self,
        trial: TrialId,
        worker: WorkerId,
        expected: Outcome,
        observed: Outcome,
    ) {
        if observed != expected {
            self.expectation_failures.push(ExpectationMismatch {
                trial,
                worker,
                expected,
                observed,
            });
        }
    }

    /// Number of trials the run was configured for.
    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// Number of workers the run was configured for.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// All fingerprint reports for `trial`, in reporting order.
    pub fn reports(&self, trial: TrialId) -> &[WorkerReport] {
        self.fingerprints
            .get(&trial)
            .map(|r| r.as_slice())
            .unwrap_or(&[])
    }

    /// The canonical fingerprint of `trial`, if any worker reported.
    pub fn canonical(&self, trial: TrialId) -> Option<Fingerprint> {
        self.reports(trial).first().map(|r| r.fingerprint)
    }

    /// The run's headline fingerprint: trial 0's canonical value.
    pub fn canonical_fingerprint(&self) -> Option<Fingerprint> {
        self.canonical(TrialId(0))
    }

    /// All recorded divergences, in reporting order.
    pub fn divergences(&self) -> &[Divergence] {
        &self.divergences
    }

    /// All recorded expectation mismatches, in reporting order.
    pub fn expectation_failures(&self) -> &[ExpectationMismatch] {
        &self.expectation_failures
    }

    /// Overall success: every one of the trials × workers fingerprint
    /// comparisons and outcome comparisons passed.
    pub fn passed(&self) -> bool {
        self.divergences.is_empty() && self.expectation_failures.is_empty()
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} trials x {} workers, {} divergences, {} expectation mismatches",
            if self.passed() { "PASS" } else { "FAIL" },
            self.trials,
            self.workers,
            self.divergences.len(),
            self.expectation_failures.len(),
        )?;
        for d in &self.divergences {
            write!(f, "\n  {d}")?;
        }
        for m in &self.expectation_failures {
            write!(f, "\n  {m}")?;
        }
        Ok(())
    }
}
