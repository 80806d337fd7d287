//! The input record and controller-kind selection.
//!
//! One [`InputRecord`] drives exactly one simulation tick. Records are
//! fixed-shape and immutable once decoded; equality is bitwise. The
//! concrete text grammars that produce records live in
//! `tandem-replay::codec` — this module only defines the value and its
//! valid ranges.

use std::fmt;

/// Magnitude limit for the two translation axes ([`InputRecord::thrust`],
/// [`InputRecord::strafe`]).
pub const AXIS_LIMIT: i8 = 50;

/// Magnitude limit for the rotational axis ([`InputRecord::turn`]).
pub const TURN_LIMIT: i16 = 120;

/// Largest valid value of the discrete selector.
pub const SELECTOR_LIMIT: u8 = 7;

/// One decoded input record: the complete input for one tick.
///
/// Axes are signed fixed ranges, the two buttons are momentary
/// toggles, and the selector is a bounded discrete choice. The all-zero
/// record ([`InputRecord::NEUTRAL`]) is the well-defined no-op input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct InputRecord {
    /// Forward/backward axis, in `[-AXIS_LIMIT, AXIS_LIMIT]`.
    pub thrust: i8,
    /// Sideways axis, in `[-AXIS_LIMIT, AXIS_LIMIT]`.
    pub strafe: i8,
    /// Rotational axis, in `[-TURN_LIMIT, TURN_LIMIT]`.
    pub turn: i16,
    /// Primary action button.
    pub primary: bool,
    /// Secondary action button.
    pub secondary: bool,
    /// Discrete selection, in `[0, SELECTOR_LIMIT]`.
    pub selector: u8,
}

impl InputRecord {
    /// The no-op record: all axes zero, buttons released, selector 0.
    pub const NEUTRAL: InputRecord = InputRecord {
        thrust: 0,
        strafe: 0,
        turn: 0,
        primary: false,
        secondary: false,
        selector: 0,
    };

    /// Whether this record is the no-op record.
    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    /// Whether every field is within its documented range.
    ///
    /// Decoders enforce this at the grammar level; this check exists for
    /// records constructed programmatically.
    pub fn in_range(&self) -> bool {
        self.thrust.unsigned_abs() <= AXIS_LIMIT as u8
            && self.strafe.unsigned_abs() <= AXIS_LIMIT as u8
            && self.turn.unsigned_abs() <= TURN_LIMIT as u16
            && self.selector <= SELECTOR_LIMIT
    }
}

/// Controller grammar selection, resolved once at configuration time.
///
/// The set of grammars is fixed and small, so this is a closed enum
/// rather than open-ended runtime polymorphism.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    /// Whitespace-separated decimal fields, one record per line.
    PlaybackLog,
    /// The engine-native packed-hex form: twelve hex digits per line.
    Native,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaybackLog => write!(f, "playback"),
            Self::Native => write!(f, "native"),
        }
    }
}
