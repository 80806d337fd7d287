//! Order-sensitive 128-bit state fingerprinting.
//!
//! Uses FNV-1a for fast, deterministic digesting of observable
//! simulation state. Fingerprints are not cryptographically
//! collision-proof — they are regression-detection checksums: two equal
//! fingerprints mean "equivalent for verification purposes".
//!
//! Digest inputs, in fixed order: the map identifier, the tick counter,
//! and — only if the tracked primary actor exists — its position (3
//! components), orientation, velocity (3 components), and health.
//! Absent-actor fields are omitted, not zero-filled, so fingerprints
//! are only comparable across runs that agree on whether the actor
//! exists at the comparison point. Wall-clock time and memory addresses
//! never enter the digest.

use std::fmt;

use tandem_core::{SimAdapter, StateProbe};

/// FNV-1a offset basis for 128-bit.
const FNV_OFFSET: u128 = 0x6c62272e07bb014262b821756295c58d;
/// FNV-1a prime for 128-bit.
const FNV_PRIME: u128 = 0x0000000001000000000000000000013b;

/// Feed a single byte into an FNV-1a hash state.
#[inline]
fn fnv1a_byte(hash: u128, byte: u8) -> u128 {
    (hash ^ byte as u128).wrapping_mul(FNV_PRIME)
}

/// Feed a u32 (as 4 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u32(mut hash: u128, v: u32) -> u128 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed a u64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u64(mut hash: u128, v: u64) -> u128 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed an f32 (as its bit pattern) into an FNV-1a hash state.
#[inline]
fn fnv1a_f32(hash: u128, v: f32) -> u128 {
    fnv1a_u32(hash, v.to_bits())
}

/// A 128-bit order-sensitive digest of observable simulation state.
///
/// Renders as two concatenated 64-bit lowercase hex halves (32 hex
/// digits), high half first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u128);

impl Fingerprint {
    /// The high and low 64-bit halves, in rendering order.
    pub fn halves(&self) -> (u64, u64) {
        ((self.0 >> 64) as u64, self.0 as u64)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hi, lo) = self.halves();
        write!(f, "{hi:016x}{lo:016x}")
    }
}

/// Digest a probe directly.
///
/// Pure function of the probe's fields; [`fingerprint`] is this over
/// `adapter.probe()`. Exposed so tests can digest hand-built probes.
pub fn probe_digest(probe: &StateProbe) -> Fingerprint {
    let mut hash = FNV_OFFSET;

    hash = fnv1a_u32(hash, probe.map.0);
    hash = fnv1a_u64(hash, probe.tick.0);

    if let Some(actor) = &probe.actor {
        for &c in &actor.position {
            hash = fnv1a_f32(hash, c);
        }
        hash = fnv1a_f32(hash, actor.orientation);
        for &c in &actor.velocity {
            hash = fnv1a_f32(hash, c);
        }
        hash = fnv1a_u32(hash, actor.health as u32);
    }

    Fingerprint(hash)
}

/// Compute the fingerprint of a live simulation instance.
pub fn fingerprint(adapter: &dyn SimAdapter) -> Fingerprint {
    probe_digest(&adapter.probe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tandem_core::{ActorProbe, MapId, TickId};

    fn probe_with_actor() -> StateProbe {
        StateProbe {
            map: MapId(1),
            tick: TickId(100),
            actor: Some(ActorProbe {
                position: [1.0, 2.0, 3.0],
                orientation: 0.5,
                velocity: [0.1, 0.0, -0.1],
                health: 100,
            }),
        }
    }

    #[test]
    fn same_probe_same_digest() {
        assert_eq!(probe_digest(&probe_with_actor()), probe_digest(&probe_with_actor()));
    }

    #[test]
    fn different_tick_different_digest() {
        let a = probe_with_actor();
        let mut b = probe_with_actor();
        b.tick = TickId(101);
        assert_ne!(probe_digest(&a), probe_digest(&b));
    }

    #[test]
    fn field_order_matters() {
        // Same component values assigned to position vs velocity must
        // produce different digests.
        let a = StateProbe {
            map: MapId(0),
            tick: TickId(0),
            actor: Some(ActorProbe {
                position: [1.0, 2.0, 3.0],
                orientation: 0.0,
                velocity: [4.0, 5.0, 6.0],
                health: 0,
            }),
        };
        let b = StateProbe {
            actor: Some(ActorProbe {
                position: [4.0, 5.0, 6.0],
                orientation: 0.0,
                velocity: [1.0, 2.0, 3.0],
                health: 0,
            }),
            ..a
        };
        assert_ne!(probe_digest(&a), probe_digest(&b));
    }

    #[test]
    fn absent_actor_is_omitted_not_zero_filled() {
        // An absent actor and an all-zero actor are different states.
        let absent = StateProbe {
            map: MapId(1),
            tick: TickId(1),
            actor: None,
        };
        let zeroed = StateProbe {
            actor: Some(ActorProbe {
                position: [0.0; 3],
                orientation: 0.0,
                velocity: [0.0; 3],
                health: 0,
            }),
            ..absent
        };
        assert_ne!(probe_digest(&absent), probe_digest(&zeroed));
    }

    #[test]
    fn display_renders_32_hex_digits() {
        let fp = probe_digest(&probe_with_actor());
        let rendered = fp.to_string();
        assert_eq!(rendered.len(), 32);
        assert!(rendered.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn display_concatenates_halves() {
        let fp = Fingerprint(0x0123456789abcdef_fedcba9876543210_u128);
        assert_eq!(fp.to_string(), "0123456789abcdeffedcba9876543210");
        let (hi, lo) = fp.halves();
        assert_eq!(hi, 0x0123456789abcdef);
        assert_eq!(lo, 0xfedcba9876543210);
    }

    #[test]
    fn negative_zero_position_differs_from_positive_zero() {
        // to_bits() feeding means -0.0 and 0.0 are distinct states,
        // matching bit-identical outcome comparison.
        let a = StateProbe {
            map: MapId(0),
            tick: TickId(0),
            actor: Some(ActorProbe {
                position: [0.0, 0.0, 0.0],
                orientation: 0.0,
                velocity: [0.0; 3],
                health: 0,
            }),
        };
        let mut b = a;
        b.actor = Some(ActorProbe {
            position: [-0.0, 0.0, 0.0],
            ..a.actor.unwrap()
        });
        assert_ne!(probe_digest(&a), probe_digest(&b));
    }

    proptest! {
        #[test]
        fn digest_is_deterministic(map in any::<u32>(), tick in any::<u64>(), health in any::<i32>()) {
            let probe = StateProbe {
                map: MapId(map),
                tick: TickId(tick),
                actor: Some(ActorProbe {
                    position: [1.0, 2.0, 3.0],
                    orientation: 4.0,
                    velocity: [5.0, 6.0, 7.0],
                    health,
                }),
            };
            prop_assert_eq!(probe_digest(&probe), probe_digest(&probe));
        }

        #[test]
        fn map_perturbs_digest(map in 1u32..) {
            let base = StateProbe { map: MapId(0), tick: TickId(0), actor: None };
            let other = StateProbe { map: MapId(map), ..base };
            prop_assert_ne!(probe_digest(&base), probe_digest(&other));
        }
    }
}
