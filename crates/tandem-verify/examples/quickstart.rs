//! Minimal lockstep verification over the reference world.
//!
//! Run with: `cargo run -p tandem-verify --example quickstart`

use tandem_core::{
    AdapterInitError, ControllerKind, CyclePolicy, Outcome, RunConfig, SimAdapter, WorkerId,
};
use tandem_replay::load_sequence;
use tandem_sim::ReferenceSim;
use tandem_verify::DeterminismVerifier;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Six ticks of gentle forward motion with a little turning.
    let text = "\
20 0 0 0 0 0
20 0 15 0 0 0
20 0 -15 0 0 0
20 0 0 0 0 0
0 0 30 0 0 0
0 0 0 0 0 0
";
    let inputs = load_sequence(text.as_bytes(), ControllerKind::PlaybackLog)?;

    let config = RunConfig {
        state_size: ReferenceSim::STATE_SIZE,
        policy: CyclePolicy::Simple,
        rerecord_depth: 0,
        filler_seed: 42,
        controller: ControllerKind::PlaybackLog,
        expected: Outcome::default(),
        workers: Some(4),
        trials: 2,
        warmup: None,
    };

    let verifier = DeterminismVerifier::new(config)?;
    let outcome = verifier.run(
        |_worker: WorkerId| -> Result<ReferenceSim, AdapterInitError> {
            let mut sim = ReferenceSim::new(1);
            sim.initialize()?;
            Ok(sim)
        },
        &inputs,
    )?;

    if let Some(fingerprint) = outcome.canonical_fingerprint() {
        println!("{fingerprint}");
    }
    println!("{outcome}");
    Ok(())
}
