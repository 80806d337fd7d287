//! `tandem` — determinism verification runner for the reference world.
//!
//! Exit status: 0 on full success (all comparisons passed, expectation
//! matched), non-zero otherwise. Structural errors print a message
//! identifying the offending input; semantic failures print the
//! aggregated report before the non-zero exit.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tandem_core::{
    AdapterInitError, ControllerKind, CyclePolicy, ObjectiveId, Outcome, RunConfig, SimAdapter,
    WorkerId,
};
use tandem_replay::{load_sequence_file, Fingerprint, ReplayEngine};
use tandem_sim::ReferenceSim;
use tandem_verify::DeterminismVerifier;

#[derive(Parser)]
#[command(name = "tandem", about = "Determinism verification for stepped simulations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by both subcommands: the sequence source, the
/// reference-world setup, and the expected outcome triple.
#[derive(Args)]
struct SequenceArgs {
    /// Input sequence file, one record per line
    #[arg(short, long)]
    input: PathBuf,

    /// Controller grammar: playback | native
    #[arg(short, long, default_value = "playback")]
    controller: String,

    /// Map the reference world runs
    #[arg(short, long, default_value = "1")]
    map: u32,

    /// Expected final objective id
    #[arg(long, default_value = "0")]
    expect_objective: u32,

    /// Expect the completed terminal flag to be set
    #[arg(long)]
    expect_completed: bool,

    /// Expect the failed terminal flag to be set
    #[arg(long)]
    expect_failed: bool,

    /// Write just the rendered fingerprint to this file
    #[arg(long)]
    fingerprint_out: Option<PathBuf>,
}

impl SequenceArgs {
    fn expected(&self) -> Outcome {
        Outcome {
            objective: ObjectiveId(self.expect_objective),
            completed: self.expect_completed,
            failed: self.expect_failed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a sequence on a single instance under a cycle policy
    Replay {
        #[command(flatten)]
        seq: SequenceArgs,

        /// Cycle policy: simple | rerecord | full
        #[arg(short, long, default_value = "simple")]
        policy: String,

        /// Filler pre-advances per tick under rerecord/full
        #[arg(short = 'd', long, default_value = "0")]
        depth: u32,

        /// Filler generator seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Lockstep-verify a sequence across workers and trials
    Verify {
        #[command(flatten)]
        seq: SequenceArgs,

        /// Worker count (default: hardware concurrency)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Number of repeated full trials
        #[arg(short, long, default_value = "1")]
        trials: u32,

        /// Busy-wait warm-up per worker, in milliseconds
        #[arg(long, default_value = "0")]
        warmup_ms: u64,
    },
}

fn write_fingerprint(path: &PathBuf, fingerprint: Fingerprint) -> anyhow::Result<()> {
    fs::write(path, format!("{fingerprint}\n"))
        .with_context(|| format!("writing fingerprint to '{}'", path.display()))
}

fn load_inputs(seq: &SequenceArgs) -> anyhow::Result<(ControllerKind, Vec<tandem_core::InputRecord>)> {
    let kind: ControllerKind = seq.controller.parse()?;
    let inputs = load_sequence_file(&seq.input, kind)?;
    tracing::info!(
        records = inputs.len(),
        controller = %kind,
        "decoded input sequence"
    );
    Ok((kind, inputs))
}

fn run_replay(seq: SequenceArgs, policy: String, depth: u32, seed: u64) -> anyhow::Result<bool> {
    let policy: CyclePolicy = policy.parse()?;
    let (_, inputs) = load_inputs(&seq)?;

    let mut sim = ReferenceSim::new(seq.map);
    sim.initialize()?;

    let engine = ReplayEngine::new(policy, depth, ReferenceSim::STATE_SIZE, seed);
    let report = engine.run(&mut sim, &inputs)?;
    tracing::info!(ticks = report.ticks, policy = %policy, "replay complete");

    println!("{}", report.fingerprint);
    if let Some(path) = &seq.fingerprint_out {
        write_fingerprint(path, report.fingerprint)?;
    }

    let expected = seq.expected();
    if report.matches(&expected) {
        Ok(true)
    } else {
        println!("outcome [{}] does not match expected [{expected}]", report.outcome);
        Ok(false)
    }
}

fn run_verify(
    seq: SequenceArgs,
    workers: Option<usize>,
    trials: u32,
    warmup_ms: u64,
) -> anyhow::Result<bool> {
    let (kind, inputs) = load_inputs(&seq)?;

    let config = RunConfig {
        state_size: ReferenceSim::STATE_SIZE,
        policy: CyclePolicy::Simple,
        rerecord_depth: 0,
        filler_seed: 0,
        controller: kind,
        expected: seq.expected(),
        workers,
        trials,
        warmup: (warmup_ms > 0).then(|| Duration::from_millis(warmup_ms)),
    };

    let verifier = DeterminismVerifier::new(config)?;
    tracing::info!(
        workers = verifier.config().resolved_workers(),
        trials,
        ticks = inputs.len(),
        "starting lockstep verification"
    );

    let map = seq.map;
    let outcome = verifier.run(
        move |_worker: WorkerId| -> Result<ReferenceSim, AdapterInitError> {
            let mut sim = ReferenceSim::new(map);
            sim.initialize()?;
            Ok(sim)
        },
        &inputs,
    )?;

    if let Some(fingerprint) = outcome.canonical_fingerprint() {
        println!("{fingerprint}");
        if let Some(path) = &seq.fingerprint_out {
            write_fingerprint(path, fingerprint)?;
        }
    }
    println!("{outcome}");

    Ok(outcome.passed())
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let passed = match cli.command {
        Commands::Replay {
            seq,
            policy,
            depth,
            seed,
        } => run_replay(seq, policy, depth, seed)?,
        Commands::Verify {
            seq,
            workers,
            trials,
            warmup_ms,
        } => run_verify(seq, workers, trials, warmup_ms)?,
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
