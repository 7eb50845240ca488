//! Per-phase persistent overlay of player edits.
//!
//! Each phase keeps its own record of broken base-terrain voxels,
//! placed overrides, and container storage. The overlay outlives every
//! voxel field and is re-applied on each regeneration.

use std::collections::{BTreeMap, BTreeSet};

use chronovox_core::{BlockId, GridPos, ItemStack};
use serde::{Deserialize, Serialize};

use crate::TimePhase;

/// Number of slots in a container voxel's storage.
pub const STORAGE_SLOT_COUNT: usize = 40;

/// Persisted inventory state attached to a container voxel. The engine
/// does not interpret slot contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageState {
    /// Slot contents; `None` marks an empty slot.
    pub slots: Vec<Option<ItemStack>>,
}

impl StorageState {
    /// Create empty storage with the standard slot count.
    pub fn new() -> Self {
        Self {
            slots: vec![None; STORAGE_SLOT_COUNT],
        }
    }
}

impl Default for StorageState {
    fn default() -> Self {
        Self::new()
    }
}

/// Player-caused deviations from base terrain for a single phase.
///
/// Invariant: a coordinate is never simultaneously broken and placed.
/// Placing clears any broken mark; a placed voxel that gets broken is
/// removed from `placed` instead of entering `broken`.
///
/// Uses BTreeMap/BTreeSet for deterministic iteration order (the
/// regeneration overlay consumes RNG while expanding saplings).
#[derive(Debug, Clone, Default)]
pub struct PhaseDiff {
    broken: BTreeSet<GridPos>,
    placed: BTreeMap<GridPos, BlockId>,
    storage: BTreeMap<GridPos, StorageState>,
}

impl PhaseDiff {
    /// Record a placed voxel, clearing any broken mark at the same
    /// coordinate.
    pub fn record_placed(&mut self, pos: GridPos, id: BlockId) {
        self.placed.insert(pos, id);
        self.broken.remove(&pos);
    }

    /// Remove a placed record, returning the id it held.
    pub fn remove_placed(&mut self, pos: GridPos) -> Option<BlockId> {
        self.placed.remove(&pos)
    }

    /// Record a broken base-terrain voxel. Coordinates with a placed
    /// record are skipped to preserve the exclusivity invariant.
    pub fn record_broken(&mut self, pos: GridPos) {
        if !self.placed.contains_key(&pos) {
            self.broken.insert(pos);
        }
    }

    /// Whether the base terrain at this coordinate was destroyed.
    pub fn is_broken(&self, pos: GridPos) -> bool {
        self.broken.contains(&pos)
    }

    /// The placed override at this coordinate, if any.
    pub fn placed_id(&self, pos: GridPos) -> Option<BlockId> {
        self.placed.get(&pos).copied()
    }

    /// Iterate broken coordinates in deterministic order.
    pub fn iter_broken(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.broken.iter().copied()
    }

    /// Iterate placed overrides in deterministic order.
    pub fn iter_placed(&self) -> impl Iterator<Item = (GridPos, BlockId)> + '_ {
        self.placed.iter().map(|(pos, id)| (*pos, *id))
    }

    /// Number of broken records.
    pub fn broken_len(&self) -> usize {
        self.broken.len()
    }

    /// Number of placed records.
    pub fn placed_len(&self) -> usize {
        self.placed.len()
    }

    /// Storage attached to a coordinate, if any.
    pub fn storage(&self, pos: GridPos) -> Option<&StorageState> {
        self.storage.get(&pos)
    }

    /// Mutable storage for a coordinate, created empty on first use.
    pub fn storage_mut(&mut self, pos: GridPos) -> &mut StorageState {
        self.storage.entry(pos).or_default()
    }

    /// Replace the storage at a coordinate.
    pub fn set_storage(&mut self, pos: GridPos, state: StorageState) {
        self.storage.insert(pos, state);
    }

    /// Remove the storage at a coordinate, returning it.
    pub fn clear_storage(&mut self, pos: GridPos) -> Option<StorageState> {
        self.storage.remove(&pos)
    }
}

/// One [`PhaseDiff`] per phase, persisting for the whole session.
#[derive(Debug, Clone, Default)]
pub struct PhaseDiffStore {
    morning: PhaseDiff,
    noon: PhaseDiff,
    night: PhaseDiff,
}

impl PhaseDiffStore {
    /// The diff for a phase.
    pub fn diff(&self, phase: TimePhase) -> &PhaseDiff {
        match phase {
            TimePhase::Morning => &self.morning,
            TimePhase::Noon => &self.noon,
            TimePhase::Night => &self.night,
        }
    }

    /// Mutable diff for a phase.
    pub fn diff_mut(&mut self, phase: TimePhase) -> &mut PhaseDiff {
        match phase {
            TimePhase::Morning => &mut self.morning,
            TimePhase::Noon => &mut self.noon,
            TimePhase::Night => &mut self.night,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronovox_core::BLOCK_STONE;

    #[test]
    fn placing_clears_broken_mark() {
        let mut diff = PhaseDiff::default();
        let pos = GridPos::new(1, 2, 3);

        diff.record_broken(pos);
        assert!(diff.is_broken(pos));

        diff.record_placed(pos, BLOCK_STONE);
        assert!(!diff.is_broken(pos));
        assert_eq!(diff.placed_id(pos), Some(BLOCK_STONE));
    }

    #[test]
    fn breaking_a_placed_voxel_never_records_broken() {
        let mut diff = PhaseDiff::default();
        let pos = GridPos::new(4, 5, 6);

        diff.record_placed(pos, BLOCK_STONE);
        diff.record_broken(pos);
        // Still placed; exclusivity holds.
        assert_eq!(diff.placed_id(pos), Some(BLOCK_STONE));
        assert!(!diff.is_broken(pos));

        assert_eq!(diff.remove_placed(pos), Some(BLOCK_STONE));
        diff.record_broken(pos);
        assert!(diff.is_broken(pos));
    }

    #[test]
    fn diffs_are_independent_per_phase() {
        let mut store = PhaseDiffStore::default();
        let pos = GridPos::new(0, 0, 0);

        store.diff_mut(TimePhase::Morning).record_broken(pos);
        assert!(store.diff(TimePhase::Morning).is_broken(pos));
        assert!(!store.diff(TimePhase::Noon).is_broken(pos));
        assert!(!store.diff(TimePhase::Night).is_broken(pos));
    }

    #[test]
    fn storage_round_trip() {
        let mut diff = PhaseDiff::default();
        let pos = GridPos::new(7, 8, 9);

        assert!(diff.storage(pos).is_none());

        diff.storage_mut(pos).slots[0] = Some(ItemStack::new(3, 10));
        assert_eq!(
            diff.storage(pos).unwrap().slots[0],
            Some(ItemStack::new(3, 10))
        );
        assert_eq!(diff.storage(pos).unwrap().slots.len(), STORAGE_SLOT_COUNT);

        let taken = diff.clear_storage(pos).unwrap();
        assert_eq!(taken.slots[0], Some(ItemStack::new(3, 10)));
        assert!(diff.storage(pos).is_none());
    }

    #[test]
    fn storage_state_serialization_round_trip() {
        let mut state = StorageState::new();
        state.slots[5] = Some(ItemStack::new(1, 64));
        let serialized = serde_json::to_string(&state).unwrap();
        let deserialized: StorageState = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, state);
    }
}
