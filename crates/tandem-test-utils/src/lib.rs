//! Fault-injection adapters for Tandem development.
//!
//! Three deliberately misbehaving [`SimAdapter`] implementations for
//! exercising the harness's failure paths:
//!
//! - [`DriftingAdapter`] — consults process-global mutable state, so
//!   independently-owned instances diverge (divergence detection).
//! - [`TruncatingAdapter`] — reports a short serialized length
//!   (contract-violation handling).
//! - [`AmnesicAdapter`] — keeps input history outside its serialized
//!   image, the save/restore bug class the Rerecord cycle exists to
//!   catch: it only manifests after noise ticks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::atomic::{AtomicU64, Ordering};

use tandem_core::{
    ActorProbe, AdapterInitError, InputRecord, MapId, ObjectiveId, Outcome, SimAdapter,
    StateProbe, TickId,
};

/// Process-wide counter feeding [`DriftingAdapter`]. Interleaving across
/// threads is what makes instances disagree.
static GLOBAL_DRIFT: AtomicU64 = AtomicU64::new(0);

// ── DriftingAdapter ─────────────────────────────────────────────

/// An adapter whose per-tick state depends on a process-global counter.
///
/// Two instances fed identical inputs from identical anchor states
/// observe different counter values and produce different fingerprints.
/// The drift value is carried in the actor's health so it enters the
/// digest.
pub struct DriftingAdapter {
    tick: u64,
    drift: u32,
}

impl DriftingAdapter {
    /// Serialized state size in bytes.
    pub const STATE_SIZE: usize = 16;

    pub fn new() -> Self {
        Self { tick: 0, drift: 0 }
    }
}

impl Default for DriftingAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SimAdapter for DriftingAdapter {
    fn initialize(&mut self) -> Result<(), AdapterInitError> {
        self.tick = 0;
        self.drift = 0;
        Ok(())
    }

    fn advance(&mut self, _input: &InputRecord) {
        self.tick += 1;
        self.drift = GLOBAL_DRIFT.fetch_add(1, Ordering::Relaxed) as u32;
    }

    fn serialize(&self, buf: &mut [u8]) -> usize {
        buf[0..8].copy_from_slice(&self.tick.to_le_bytes());
        buf[8..12].copy_from_slice(&self.drift.to_le_bytes());
        buf[12..Self::STATE_SIZE].fill(0);
        Self::STATE_SIZE
    }

    fn deserialize(&mut self, buf: &[u8]) {
        let mut tick = [0u8; 8];
        tick.copy_from_slice(&buf[0..8]);
        self.tick = u64::from_le_bytes(tick);
        let mut drift = [0u8; 4];
        drift.copy_from_slice(&buf[8..12]);
        self.drift = u32::from_le_bytes(drift);
    }

    fn probe(&self) -> StateProbe {
        StateProbe {
            map: MapId(1),
            tick: TickId(self.tick),
            actor: Some(ActorProbe {
                position: [0.0; 3],
                orientation: 0.0,
                velocity: [0.0; 3],
                health: self.drift as i32,
            }),
        }
    }

    fn outcome(&self) -> Outcome {
        Outcome::default()
    }
}

// ── TruncatingAdapter ───────────────────────────────────────────

/// An adapter that violates the exact-length serialization contract by
/// reporting `reported` bytes instead of its declared state size.
pub struct TruncatingAdapter {
    state_size: usize,
    reported: usize,
    tick: u64,
}

impl TruncatingAdapter {
    pub fn new(state_size: usize, reported: usize) -> Self {
        Self {
            state_size,
            reported,
            tick: 0,
        }
    }
}

impl SimAdapter for TruncatingAdapter {
    fn initialize(&mut self) -> Result<(), AdapterInitError> {
        self.tick = 0;
        Ok(())
    }

    fn advance(&mut self, _input: &InputRecord) {
        self.tick += 1;
    }

    fn serialize(&self, buf: &mut [u8]) -> usize {
        let n = self.reported.min(self.state_size).min(buf.len()).min(8);
        buf[..n].copy_from_slice(&self.tick.to_le_bytes()[..n]);
        self.reported
    }

    fn deserialize(&mut self, buf: &[u8]) {
        let mut tick = [0u8; 8];
        let n = buf.len().min(8);
        tick[..n].copy_from_slice(&buf[..n]);
        self.tick = u64::from_le_bytes(tick);
    }

    fn probe(&self) -> StateProbe {
        StateProbe {
            map: MapId(1),
            tick: TickId(self.tick),
            actor: None,
        }
    }

    fn outcome(&self) -> Outcome {
        Outcome::default()
    }
}

// ── AmnesicAdapter ──────────────────────────────────────────────

/// An adapter whose turn history lives outside its serialized image.
///
/// `recent` and `head` are mutated by every advance but neither saved
/// nor restored, so a restore leaves whatever the instance last had in
/// memory. Replaying the real sequence in order therefore still matches
/// the simple path — until noise pre-advances pollute the history and
/// the restore fails to repair it. This is exactly the bug class the
/// Rerecord cycle's churn exists to surface.
pub struct AmnesicAdapter {
    map: u32,
    tick: u64,
    position: f32,
    momentum: f32,
    recent: [i16; 4],
    head: u8,
}

impl AmnesicAdapter {
    /// Serialized state size in bytes.
    pub const STATE_SIZE: usize = 24;

    pub fn new(map: u32) -> Self {
        Self {
            map,
            tick: 0,
            position: 0.0,
            momentum: 0.0,
            recent: [0; 4],
            head: 0,
        }
    }
}

impl SimAdapter for AmnesicAdapter {
    fn initialize(&mut self) -> Result<(), AdapterInitError> {
        *self = Self::new(self.map);
        Ok(())
    }

    fn advance(&mut self, input: &InputRecord) {
        self.tick += 1;
        self.recent[self.head as usize] = input.turn;
        self.head = (self.head + 1) % 4;
        let history: i32 = self.recent.iter().map(|&t| t as i32).sum();
        self.momentum = self.momentum * 0.5 + history as f32 * 0.125;
        self.position += input.thrust as f32 * 0.25 + self.momentum * 0.125;
    }

    fn serialize(&self, buf: &mut [u8]) -> usize {
        buf[0..8].copy_from_slice(&self.tick.to_le_bytes());
        buf[8..12].copy_from_slice(&self.map.to_le_bytes());
        buf[12..16].copy_from_slice(&self.position.to_le_bytes());
        buf[16..20].copy_from_slice(&self.momentum.to_le_bytes());
        // recent/head deliberately omitted.
        buf[20..Self::STATE_SIZE].fill(0);
        Self::STATE_SIZE
    }

    fn deserialize(&mut self, buf: &[u8]) {
        let mut tick = [0u8; 8];
        tick.copy_from_slice(&buf[0..8]);
        self.tick = u64::from_le_bytes(tick);
        let mut map = [0u8; 4];
        map.copy_from_slice(&buf[8..12]);
        self.map = u32::from_le_bytes(map);
        let mut position = [0u8; 4];
        position.copy_from_slice(&buf[12..16]);
        self.position = f32::from_le_bytes(position);
        let mut momentum = [0u8; 4];
        momentum.copy_from_slice(&buf[16..20]);
        self.momentum = f32::from_le_bytes(momentum);
        // recent/head keep whatever the instance last had in memory.
    }

    fn probe(&self) -> StateProbe {
        StateProbe {
            map: MapId(self.map),
            tick: TickId(self.tick),
            actor: Some(ActorProbe {
                position: [self.position, 0.0, 0.0],
                orientation: 0.0,
                velocity: [self.momentum, 0.0, 0.0],
                health: 100,
            }),
        }
    }

    fn outcome(&self) -> Outcome {
        Outcome {
            objective: ObjectiveId(0),
            completed: false,
            failed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drifting_instances_disagree() {
        let mut a = DriftingAdapter::new();
        let mut b = DriftingAdapter::new();
        a.advance(&InputRecord::NEUTRAL);
        b.advance(&InputRecord::NEUTRAL);
        assert_ne!(a.drift, b.drift);
    }

    #[test]
    fn truncating_reports_configured_length() {
        let sim = TruncatingAdapter::new(64, 32);
        let mut buf = vec![0u8; 64];
        assert_eq!(sim.serialize(&mut buf), 32);
    }

    #[test]
    fn amnesic_round_trip_loses_history() {
        let turn = InputRecord {
            turn: 100,
            ..InputRecord::NEUTRAL
        };
        let mut sim = AmnesicAdapter::new(1);
        sim.advance(&turn);
        sim.advance(&turn);

        let mut buf = vec![0u8; AmnesicAdapter::STATE_SIZE];
        sim.serialize(&mut buf);

        let mut fresh = AmnesicAdapter::new(1);
        fresh.deserialize(&buf);

        assert_eq!(sim.position, fresh.position);
        assert_eq!(sim.recent, [100, 100, 0, 0]);
        assert_eq!(fresh.recent, [0; 4]);

        // The missing history shows up one advance later.
        sim.advance(&InputRecord::NEUTRAL);
        fresh.advance(&InputRecord::NEUTRAL);
        assert_ne!(sim.momentum, fresh.momentum);
    }
}
