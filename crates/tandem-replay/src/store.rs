//! Exact-length snapshot buffers and the shared per-step store.
//!
//! [`SnapshotBuf`] owns one `state_size`-byte capture; [`SnapshotStore`]
//! holds one buffer per sequence step for the lockstep protocol. Both
//! enforce the exact-length contract: an adapter reporting any other
//! serialized length is a fatal contract violation.
//!
//! # Synchronization
//!
//! The store is shared across worker threads with a strict
//! write-then-barrier-then-read discipline: exactly one writer per step,
//! and no reader touches a slot until the writer's barrier has been
//! crossed. The per-slot locks therefore never contend — they exist
//! because the crate forbids `unsafe` and the slots still need a `Sync`
//! story the compiler accepts.

use std::sync::RwLock;

use tandem_core::{AdapterContractError, SimAdapter};

// ── SnapshotBuf ─────────────────────────────────────────────────

/// One owned, fixed-capacity state capture.
#[derive(Clone, Debug)]
pub struct SnapshotBuf {
    bytes: Box<[u8]>,
}

impl SnapshotBuf {
    /// Allocate a zero-filled buffer of exactly `state_size` bytes.
    pub fn new(state_size: usize) -> Self {
        Self {
            bytes: vec![0u8; state_size].into_boxed_slice(),
        }
    }

    /// The configured state size.
    pub fn state_size(&self) -> usize {
        self.bytes.len()
    }

    /// Serialize `adapter` into this buffer.
    ///
    /// # Errors
    ///
    /// [`AdapterContractError::SerializedSizeMismatch`] when the adapter
    /// reports a length other than the configured state size. Fatal,
    /// never retried.
    pub fn capture(&mut self, adapter: &dyn SimAdapter) -> Result<(), AdapterContractError> {
        let expected = self.bytes.len();
        let actual = adapter.serialize(&mut self.bytes);
        if actual != expected {
            return Err(AdapterContractError::SerializedSizeMismatch {
                expected,
                actual,
                tick: adapter.probe().tick,
            });
        }
        Ok(())
    }

    /// Restore `adapter` from this buffer.
    ///
    /// The buffer length is exact by construction, so restore cannot
    /// violate the length contract.
    pub fn restore(&self, adapter: &mut dyn SimAdapter) {
        adapter.deserialize(&self.bytes);
    }

    /// The captured bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Overwrite this buffer from raw bytes.
    ///
    /// # Errors
    ///
    /// [`AdapterContractError::BufferSizeMismatch`] when `bytes` is not
    /// exactly the configured state size.
    pub fn copy_from(&mut self, bytes: &[u8]) -> Result<(), AdapterContractError> {
        if bytes.len() != self.bytes.len() {
            return Err(AdapterContractError::BufferSizeMismatch {
                expected: self.bytes.len(),
                actual: bytes.len(),
            });
        }
        self.bytes.copy_from_slice(bytes);
        Ok(())
    }
}

// ── SnapshotStore ───────────────────────────────────────────────

/// An indexed sequence of snapshot slots, one per sequence step,
/// shared read-after-write between worker threads.
#[derive(Debug)]
pub struct SnapshotStore {
    slots: Vec<RwLock<SnapshotBuf>>,
    state_size: usize,
}

impl SnapshotStore {
    /// Allocate `steps` zero-filled slots of `state_size` bytes each.
    pub fn new(steps: usize, state_size: usize) -> Self {
        let slots = (0..steps)
            .map(|_| RwLock::new(SnapshotBuf::new(state_size)))
            .collect();
        Self { slots, state_size }
    }

    /// Number of slots (the sequence length).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the store has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The configured state size.
    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// Serialize `adapter` into slot `index`.
    ///
    /// # Errors
    ///
    /// [`AdapterContractError::SlotOutOfRange`] for a bad index, or the
    /// capture's size-mismatch error.
    pub fn capture(
        &self,
        index: usize,
        adapter: &dyn SimAdapter,
    ) -> Result<(), AdapterContractError> {
        let slot = self
            .slots
            .get(index)
            .ok_or(AdapterContractError::SlotOutOfRange {
                index,
                len: self.slots.len(),
            })?;
        // A poisoned lock means another worker panicked; the buffer
        // itself is plain bytes, so continue with its contents.
        let mut buf = slot.write().unwrap_or_else(|e| e.into_inner());
        buf.capture(adapter)
    }

    /// Restore `adapter` from slot `index`.
    ///
    /// # Errors
    ///
    /// [`AdapterContractError::SlotOutOfRange`] for a bad index.
    pub fn restore(
        &self,
        index: usize,
        adapter: &mut dyn SimAdapter,
    ) -> Result<(), AdapterContractError> {
        let slot = self
            .slots
            .get(index)
            .ok_or(AdapterContractError::SlotOutOfRange {
                index,
                len: self.slots.len(),
            })?;
        let buf = slot.read().unwrap_or_else(|e| e.into_inner());
        buf.restore(adapter);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::{SimAdapter as _, TickId};
    use tandem_sim::ReferenceSim;
    use tandem_test_utils::TruncatingAdapter;

    #[test]
    fn buf_round_trip_restores_state() {
        let mut sim = ReferenceSim::new(1);
        let mut buf = SnapshotBuf::new(ReferenceSim::STATE_SIZE);

        sim.advance_neutral_ticks(5);
        buf.capture(&sim).unwrap();
        let before = crate::fingerprint::fingerprint(&sim);

        sim.advance_neutral_ticks(3);
        assert_ne!(crate::fingerprint::fingerprint(&sim), before);

        buf.restore(&mut sim);
        assert_eq!(crate::fingerprint::fingerprint(&sim), before);
    }

    #[test]
    fn capture_rejects_short_serialization() {
        let sim = TruncatingAdapter::new(ReferenceSim::STATE_SIZE, 8);
        let mut buf = SnapshotBuf::new(ReferenceSim::STATE_SIZE);
        let err = buf.capture(&sim).unwrap_err();
        assert!(matches!(
            err,
            AdapterContractError::SerializedSizeMismatch {
                expected,
                actual: 8,
                ..
            } if expected == ReferenceSim::STATE_SIZE
        ));
    }

    #[test]
    fn copy_from_rejects_wrong_length() {
        let mut buf = SnapshotBuf::new(16);
        let err = buf.copy_from(&[0u8; 15]).unwrap_err();
        assert_eq!(
            err,
            AdapterContractError::BufferSizeMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert!(buf.copy_from(&[1u8; 16]).is_ok());
        assert_eq!(buf.as_bytes()[0], 1);
    }

    #[test]
    fn store_capture_then_restore_transfers_state() {
        let mut writer = ReferenceSim::new(1);
        let mut reader = ReferenceSim::new(1);
        let store = SnapshotStore::new(4, ReferenceSim::STATE_SIZE);

        writer.advance_neutral_ticks(2);
        store.capture(1, &writer).unwrap();
        store.restore(1, &mut reader).unwrap();

        assert_eq!(
            crate::fingerprint::fingerprint(&writer),
            crate::fingerprint::fingerprint(&reader)
        );
        assert_eq!(reader.probe().tick, TickId(2));
    }

    #[test]
    fn store_rejects_out_of_range_slot() {
        let mut sim = ReferenceSim::new(1);
        let store = SnapshotStore::new(2, ReferenceSim::STATE_SIZE);
        let err = store.capture(2, &sim).unwrap_err();
        assert_eq!(err, AdapterContractError::SlotOutOfRange { index: 2, len: 2 });
        let err = store.restore(5, &mut sim).unwrap_err();
        assert_eq!(err, AdapterContractError::SlotOutOfRange { index: 5, len: 2 });
    }
}
