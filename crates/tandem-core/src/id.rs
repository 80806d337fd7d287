//! Strongly-typed identifiers used across the harness.

use std::fmt;

/// Monotonically increasing tick counter.
///
/// Incremented each time a simulation instance advances one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies one verification worker thread.
///
/// Worker 0 is the snapshot writer in the lockstep protocol; all other
/// workers are readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies one full verification trial (a complete pass over the
/// input sequence by every worker).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrialId(pub u32);

impl fmt::Display for TrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TrialId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies the map (level) a simulation instance is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(pub u32);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MapId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies the objective location a simulation instance reports in
/// its outcome triple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectiveId(pub u32);

impl fmt::Display for ObjectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ObjectiveId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_inner_value() {
        assert_eq!(TickId(7).to_string(), "7");
        assert_eq!(WorkerId(3).to_string(), "3");
        assert_eq!(TrialId(1).to_string(), "1");
        assert_eq!(MapId(12).to_string(), "12");
        assert_eq!(ObjectiveId(4).to_string(), "4");
    }

    #[test]
    fn ids_order_by_inner_value() {
        assert!(TickId(1) < TickId(2));
        assert!(WorkerId(0) < WorkerId(1));
    }
}
