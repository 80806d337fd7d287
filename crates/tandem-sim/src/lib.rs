//! Reference simulation adapter.
//!
//! [`ReferenceSim`] is a small, fully deterministic toy world that
//! implements the complete [`SimAdapter`] contract. It exists so the
//! harness, CLI, tests, and benchmarks have a real collaborator to
//! drive; it is not the simulation under test in production use.
//!
//! The world is deliberately shaped to exercise every corner of the
//! adapter contract:
//!
//! - actor kinematics in `f32` with triangle-wave heading functions
//!   (no `sin`/`cos`, so state bits never depend on the platform libm)
//! - latched, serialized outcome flags (`completed`, `failed`)
//! - a serialized turn-smoothing scratch ring whose whole purpose is to
//!   make snapshot omissions observable after noise ticks
//! - a transient session-event latch that is *not* serialized, so
//!   restore clears it — the documented Rerecord transient caveat

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use tandem_core::{
    ActorProbe, AdapterInitError, InputRecord, MapId, ObjectiveId, Outcome, SimAdapter,
    StateProbe, TickId,
};

/// Session event: the primary button was pressed at least once.
pub const EVENT_PRIMARY: u8 = 0b0000_0001;
/// Session event: the actor took damage at least once.
pub const EVENT_DAMAGE: u8 = 0b0000_0010;
/// Session event: the goal zone was reached at least once.
pub const EVENT_GOAL: u8 = 0b0000_0100;

/// Highest valid map id the reference world ships.
pub const MAP_LIMIT: u32 = 32;

const SCRATCH_LEN: usize = 8;
const SPAWN_HEALTH: i32 = 100;
const DT: f32 = 0.125;
const DRAG: f32 = 0.90625;
const TURN_RATE: f32 = 0.000_244_140_625; // 2^-12 turns per smoothed unit
const ZONE_WIDTH: f32 = 16.0;
const GOAL_ZONE: u32 = 3;
const DAMAGE_PER_HIT: i32 = 7;

/// Triangle-wave cosine stand-in over orientation measured in turns.
///
/// Pure arithmetic (one `floor`, one `abs`), so results are bit-stable
/// across platforms, which a libm `cos` is not.
fn tri_cos(turns: f32) -> f32 {
    let t = turns - (turns + 0.5).floor();
    1.0 - 4.0 * t.abs()
}

/// Triangle-wave sine stand-in; quarter-turn phase shift of [`tri_cos`].
fn tri_sin(turns: f32) -> f32 {
    tri_cos(turns - 0.25)
}

/// Copy a fixed-width field out of a serialized state image.
///
/// The buffer is exactly [`ReferenceSim::STATE_SIZE`] bytes by caller
/// contract, so the slice index cannot fail for in-layout offsets.
fn field<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&buf[at..at + N]);
    bytes
}

/// The reference world: one actor, zoned objectives, latched terminal
/// flags, and a fixed serialized layout.
///
/// # Serialized layout
///
/// Exactly [`STATE_SIZE`](ReferenceSim::STATE_SIZE) bytes, all fields
/// little-endian:
///
/// ```text
/// offset  size  field
///      0     8  tick (u64)
///      8     4  map (u32)
///     12     4  objective (u32)
///     16     4  health (i32)
///     20    12  position (3 × f32)
///     32     4  orientation (f32)
///     36    12  velocity (3 × f32)
///     48    16  scratch ring (8 × i16)
///     64     1  flags (bit 0 completed, bit 1 failed)
///     65     1  selector (u8)
///     66     1  scratch head (u8)
///     67     5  reserved, zero
/// ```
///
/// The session-event latch is intentionally absent from the layout:
/// restoring a snapshot clears it.
#[derive(Clone, Debug)]
pub struct ReferenceSim {
    map: u32,
    tick: u64,
    objective: u32,
    completed: bool,
    failed: bool,
    position: [f32; 3],
    orientation: f32,
    velocity: [f32; 3],
    health: i32,
    scratch: [i16; SCRATCH_LEN],
    scratch_head: u8,
    selector: u8,
    session_events: u8,
}

impl ReferenceSim {
    /// Exact serialized state size in bytes.
    pub const STATE_SIZE: usize = 72;

    /// Create an instance on `map`, already at its spawn state.
    ///
    /// Map validity is checked by [`initialize`](SimAdapter::initialize),
    /// mirroring engines that defer resource loading.
    pub fn new(map: u32) -> Self {
        Self {
            map,
            tick: 0,
            objective: 0,
            completed: false,
            failed: false,
            position: [0.0; 3],
            orientation: 0.0,
            velocity: [0.0; 3],
            health: SPAWN_HEALTH,
            scratch: [0; SCRATCH_LEN],
            scratch_head: 0,
            selector: 0,
            session_events: 0,
        }
    }

    /// The transient session-event bitmask ([`EVENT_PRIMARY`] etc).
    ///
    /// Never serialized: restoring any snapshot clears it. Assertions on
    /// it are unreliable under save/restore replay cycles.
    pub fn session_events(&self) -> u8 {
        self.session_events
    }

    /// Advance `n` ticks with the no-op input. Test and bench helper.
    pub fn advance_neutral_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.advance(&InputRecord::NEUTRAL);
        }
    }

    fn zone(&self) -> u32 {
        if self.position[0] <= 0.0 {
            return 0;
        }
        ((self.position[0] / ZONE_WIDTH) as u32).min(7)
    }
}

impl SimAdapter for ReferenceSim {
    fn initialize(&mut self) -> Result<(), AdapterInitError> {
        if self.map == 0 || self.map > MAP_LIMIT {
            return Err(AdapterInitError::ResourceLoad {
                reason: format!("map {} not found (valid: 1..={MAP_LIMIT})", self.map),
            });
        }
        *self = Self::new(self.map);
        Ok(())
    }

    fn advance(&mut self, input: &InputRecord) {
        self.tick += 1;

        if self.failed {
            // Dead actor: the world clock keeps counting, nothing moves.
            return;
        }

        // Turn smoothing over the scratch ring. The ring is serialized
        // state: dropping it from a snapshot changes future headings.
        self.scratch[self.scratch_head as usize] = input.turn;
        self.scratch_head = (self.scratch_head + 1) % SCRATCH_LEN as u8;
        let smoothed: i32 = self.scratch.iter().map(|&t| t as i32).sum();
        self.orientation += smoothed as f32 * TURN_RATE;

        self.selector = input.selector;
        let power = 1.0 + self.selector as f32 * 0.25;

        let heading_x = tri_cos(self.orientation);
        let heading_z = tri_sin(self.orientation);
        let accel = [
            (input.thrust as f32 * heading_x - input.strafe as f32 * heading_z) * power,
            0.0,
            (input.thrust as f32 * heading_z + input.strafe as f32 * heading_x) * power,
        ];

        for i in 0..3 {
            self.velocity[i] = self.velocity[i] * DRAG + accel[i] * DT;
            self.position[i] += self.velocity[i] * DT;
        }

        if input.secondary {
            self.health -= DAMAGE_PER_HIT;
            self.session_events |= EVENT_DAMAGE;
            if self.health <= 0 {
                self.health = 0;
                self.failed = true;
            }
        }

        self.objective = self.zone();
        if self.objective >= GOAL_ZONE {
            self.session_events |= EVENT_GOAL;
        }

        if input.primary {
            self.session_events |= EVENT_PRIMARY;
            if self.objective >= GOAL_ZONE {
                self.completed = true;
            }
        }
    }

    fn serialize(&self, buf: &mut [u8]) -> usize {
        buf[0..8].copy_from_slice(&self.tick.to_le_bytes());
        buf[8..12].copy_from_slice(&self.map.to_le_bytes());
        buf[12..16].copy_from_slice(&self.objective.to_le_bytes());
        buf[16..20].copy_from_slice(&self.health.to_le_bytes());
        for (i, c) in self.position.iter().enumerate() {
            buf[20 + i * 4..24 + i * 4].copy_from_slice(&c.to_le_bytes());
        }
        buf[32..36].copy_from_slice(&self.orientation.to_le_bytes());
        for (i, c) in self.velocity.iter().enumerate() {
            buf[36 + i * 4..40 + i * 4].copy_from_slice(&c.to_le_bytes());
        }
        for (i, t) in self.scratch.iter().enumerate() {
            buf[48 + i * 2..50 + i * 2].copy_from_slice(&t.to_le_bytes());
        }
        buf[64] = self.completed as u8 | (self.failed as u8) << 1;
        buf[65] = self.selector;
        buf[66] = self.scratch_head;
        buf[67..Self::STATE_SIZE].fill(0);
        Self::STATE_SIZE
    }

    fn deserialize(&mut self, buf: &[u8]) {
        self.tick = u64::from_le_bytes(field::<8>(buf, 0));
        self.map = u32::from_le_bytes(field::<4>(buf, 8));
        self.objective = u32::from_le_bytes(field::<4>(buf, 12));
        self.health = i32::from_le_bytes(field::<4>(buf, 16));
        for i in 0..3 {
            self.position[i] = f32::from_le_bytes(field::<4>(buf, 20 + i * 4));
        }
        self.orientation = f32::from_le_bytes(field::<4>(buf, 32));
        for i in 0..3 {
            self.velocity[i] = f32::from_le_bytes(field::<4>(buf, 36 + i * 4));
        }
        for i in 0..SCRATCH_LEN {
            self.scratch[i] = i16::from_le_bytes(field::<2>(buf, 48 + i * 2));
        }
        self.completed = buf[64] & 0b01 != 0;
        self.failed = buf[64] & 0b10 != 0;
        self.selector = buf[65];
        self.scratch_head = buf[66];
        // Transient state never survives a restore.
        self.session_events = 0;
    }

    fn probe(&self) -> StateProbe {
        StateProbe {
            map: MapId(self.map),
            tick: TickId(self.tick),
            actor: (!self.failed).then_some(ActorProbe {
                position: self.position,
                orientation: self.orientation,
                velocity: self.velocity,
                health: self.health,
            }),
        }
    }

    fn outcome(&self) -> Outcome {
        Outcome {
            objective: ObjectiveId(self.objective),
            completed: self.completed,
            failed: self.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(sim: &mut ReferenceSim, inputs: &[InputRecord]) {
        for input in inputs {
            sim.advance(input);
        }
    }

    fn forward(thrust: i8) -> InputRecord {
        InputRecord {
            thrust,
            ..InputRecord::NEUTRAL
        }
    }

    #[test]
    fn initialize_accepts_shipped_maps() {
        let mut sim = ReferenceSim::new(1);
        assert!(sim.initialize().is_ok());
        let mut sim = ReferenceSim::new(MAP_LIMIT);
        assert!(sim.initialize().is_ok());
    }

    #[test]
    fn initialize_rejects_unknown_map() {
        let mut sim = ReferenceSim::new(0);
        assert!(matches!(
            sim.initialize(),
            Err(AdapterInitError::ResourceLoad { .. })
        ));
        let mut sim = ReferenceSim::new(MAP_LIMIT + 1);
        assert!(sim.initialize().is_err());
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut sim = ReferenceSim::new(2);
        sim.initialize().unwrap();
        sim.advance_neutral_ticks(10);
        sim.initialize().unwrap();
        assert_eq!(sim.probe().tick, TickId(0));
        assert_eq!(sim.outcome(), Outcome::default());
    }

    #[test]
    fn advance_increments_tick() {
        let mut sim = ReferenceSim::new(1);
        sim.advance_neutral_ticks(3);
        assert_eq!(sim.probe().tick, TickId(3));
    }

    #[test]
    fn neutral_input_leaves_actor_at_spawn() {
        let mut sim = ReferenceSim::new(1);
        sim.advance_neutral_ticks(20);
        let actor = sim.probe().actor.unwrap();
        assert_eq!(actor.position, [0.0; 3]);
        assert_eq!(actor.health, SPAWN_HEALTH);
        assert_eq!(sim.outcome(), Outcome::default());
    }

    #[test]
    fn thrust_moves_the_actor() {
        let mut sim = ReferenceSim::new(1);
        drive(&mut sim, &vec![forward(50); 10]);
        let actor = sim.probe().actor.unwrap();
        assert!(actor.position[0] > 0.0);
        assert!(actor.velocity[0] > 0.0);
    }

    #[test]
    fn advance_is_deterministic() {
        let inputs: Vec<InputRecord> = (0..50)
            .map(|i| InputRecord {
                thrust: (i % 50) as i8,
                strafe: -(i % 30) as i8,
                turn: ((i * 7) % 120) as i16,
                primary: i % 3 == 0,
                secondary: false,
                selector: (i % 8) as u8,
            })
            .collect();

        let mut a = ReferenceSim::new(1);
        let mut b = ReferenceSim::new(1);
        drive(&mut a, &inputs);
        drive(&mut b, &inputs);

        let pa = a.probe();
        let pb = b.probe();
        assert_eq!(pa, pb);
        assert_eq!(a.outcome(), b.outcome());
    }

    #[test]
    fn serialize_reports_exact_state_size() {
        let sim = ReferenceSim::new(1);
        let mut buf = vec![0u8; ReferenceSim::STATE_SIZE];
        assert_eq!(sim.serialize(&mut buf), ReferenceSim::STATE_SIZE);
    }

    #[test]
    fn round_trip_is_lossless_for_serialized_state() {
        let mut sim = ReferenceSim::new(3);
        drive(
            &mut sim,
            &[
                forward(40),
                InputRecord {
                    turn: 90,
                    secondary: true,
                    ..InputRecord::NEUTRAL
                },
                forward(-20),
            ],
        );

        let mut buf = vec![0u8; ReferenceSim::STATE_SIZE];
        sim.serialize(&mut buf);

        let mut restored = ReferenceSim::new(3);
        restored.deserialize(&buf);

        assert_eq!(sim.probe(), restored.probe());
        assert_eq!(sim.outcome(), restored.outcome());

        // The restored copy must continue identically to the original.
        sim.advance(&forward(10));
        restored.advance(&forward(10));
        assert_eq!(sim.probe(), restored.probe());
    }

    #[test]
    fn restore_clears_session_events() {
        let mut sim = ReferenceSim::new(1);
        sim.advance(&InputRecord {
            primary: true,
            ..InputRecord::NEUTRAL
        });
        assert_eq!(sim.session_events() & EVENT_PRIMARY, EVENT_PRIMARY);

        let mut buf = vec![0u8; ReferenceSim::STATE_SIZE];
        sim.serialize(&mut buf);
        sim.deserialize(&buf);
        assert_eq!(sim.session_events(), 0);
    }

    #[test]
    fn damage_latches_failed_and_removes_actor() {
        let mut sim = ReferenceSim::new(1);
        let hit = InputRecord {
            secondary: true,
            ..InputRecord::NEUTRAL
        };
        // 100 health at 7 per hit: the 15th hit is lethal.
        for _ in 0..15 {
            sim.advance(&hit);
        }
        let outcome = sim.outcome();
        assert!(outcome.failed);
        assert!(sim.probe().actor.is_none());
        assert_eq!(sim.session_events() & EVENT_DAMAGE, EVENT_DAMAGE);

        // Dead world keeps ticking but nothing else changes.
        let before = sim.probe();
        sim.advance(&forward(50));
        assert_eq!(sim.probe().tick, TickId(before.tick.0 + 1));
        assert!(sim.probe().actor.is_none());
    }

    #[test]
    fn reaching_the_goal_zone_and_interacting_completes() {
        let mut sim = ReferenceSim::new(1);
        // Full thrust with max selector power until deep in the goal zone.
        drive(
            &mut sim,
            &vec![
                InputRecord {
                    thrust: 50,
                    selector: 7,
                    ..InputRecord::NEUTRAL
                };
                60
            ],
        );
        assert!(sim.outcome().objective.0 >= GOAL_ZONE, "actor never reached the goal zone");
        assert!(!sim.outcome().completed);

        sim.advance(&InputRecord {
            primary: true,
            ..InputRecord::NEUTRAL
        });
        assert!(sim.outcome().completed);
        assert_eq!(sim.session_events() & EVENT_GOAL, EVENT_GOAL);
    }

    #[test]
    fn completed_flag_survives_round_trip() {
        let mut sim = ReferenceSim::new(1);
        drive(
            &mut sim,
            &vec![
                InputRecord {
                    thrust: 50,
                    selector: 7,
                    ..InputRecord::NEUTRAL
                };
                60
            ],
        );
        sim.advance(&InputRecord {
            primary: true,
            ..InputRecord::NEUTRAL
        });
        assert!(sim.outcome().completed);

        let mut buf = vec![0u8; ReferenceSim::STATE_SIZE];
        sim.serialize(&mut buf);
        let mut restored = ReferenceSim::new(1);
        restored.deserialize(&buf);
        assert!(restored.outcome().completed);
    }

    #[test]
    fn tri_waves_cover_unit_range() {
        assert_eq!(tri_cos(0.0), 1.0);
        assert_eq!(tri_cos(0.5), -1.0);
        assert_eq!(tri_cos(1.0), 1.0);
        assert_eq!(tri_sin(0.25), 1.0);
        assert_eq!(tri_sin(0.0), 0.0);
    }
}
