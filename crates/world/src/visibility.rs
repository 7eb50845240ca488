//! Visibility-driven materialization.
//!
//! Only voxels with at least one transparent neighbor need a live
//! representation on the host side. The materializer tracks the live
//! set and emits spawn/despawn events as edits expose or bury voxels.

use std::collections::BTreeSet;

use chronovox_core::{BlockFlags, BlockId, BlockRegistry, GridPos};

use crate::VoxelField;

/// A change to the set of materialized voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    /// A voxel became visible and should get a live representation.
    Spawn(GridPos, BlockId),
    /// A voxel is no longer visible (buried, broken, or regenerated).
    Despawn(GridPos),
}

/// Whether the cell at `pos` passes light: empty, out of the field, or
/// flagged transparent.
pub fn is_transparent(field: &VoxelField, registry: &BlockRegistry, pos: GridPos) -> bool {
    match field.get(pos) {
        Some(id) => registry.flags(id).contains(BlockFlags::TRANSPARENT),
        None => true,
    }
}

/// Whether a voxel is fully enclosed by opaque neighbors. Voxels on
/// the field border always count as visible.
pub fn is_hidden(field: &VoxelField, registry: &BlockRegistry, pos: GridPos) -> bool {
    let (width, height, depth) = field.dims();
    if pos.x <= 0
        || pos.x >= width - 1
        || pos.y <= 0
        || pos.y >= height - 1
        || pos.z <= 0
        || pos.z >= depth - 1
    {
        return false;
    }
    pos.neighbors()
        .iter()
        .all(|&n| !is_transparent(field, registry, n))
}

/// Whether the voxel at `pos` should be materialized. Transparent
/// voxels (water) always materialize so surfaces render even when
/// surrounded.
pub fn should_materialize(field: &VoxelField, registry: &BlockRegistry, pos: GridPos) -> bool {
    match field.get(pos) {
        None => false,
        Some(id) if registry.flags(id).contains(BlockFlags::TRANSPARENT) => true,
        Some(_) => !is_hidden(field, registry, pos),
    }
}

/// Tracks which voxels currently hold a live representation.
#[derive(Debug, Clone, Default)]
pub struct Materializer {
    live: BTreeSet<GridPos>,
}

impl Materializer {
    /// Rebuild the live set from scratch, despawning everything from
    /// the previous field first. Used after regeneration.
    pub fn rebuild(&mut self, field: &VoxelField, registry: &BlockRegistry) -> Vec<WorldEvent> {
        let mut events: Vec<WorldEvent> = self
            .live
            .iter()
            .map(|&pos| WorldEvent::Despawn(pos))
            .collect();
        self.live.clear();

        for (pos, id) in field.iter_filled() {
            if should_materialize(field, registry, pos) {
                self.live.insert(pos);
                events.push(WorldEvent::Spawn(pos, id));
            }
        }
        events
    }

    /// Re-evaluate a single position after an edit, syncing its live
    /// state. Idempotent: a second call for an unchanged field emits
    /// nothing.
    pub fn refresh(
        &mut self,
        field: &VoxelField,
        registry: &BlockRegistry,
        pos: GridPos,
    ) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        let want = should_materialize(field, registry, pos);
        let have = self.live.contains(&pos);
        if want && !have {
            if let Some(id) = field.get(pos) {
                self.live.insert(pos);
                events.push(WorldEvent::Spawn(pos, id));
            }
        } else if !want && have {
            self.live.remove(&pos);
            events.push(WorldEvent::Despawn(pos));
        }
        events
    }

    /// Drop a voxel's live representation, if any. Called before a
    /// cell changes identity in place, so the follow-up refresh spawns
    /// the new block instead of keeping a stale one.
    pub fn invalidate(&mut self, pos: GridPos) -> Option<WorldEvent> {
        if self.live.remove(&pos) {
            Some(WorldEvent::Despawn(pos))
        } else {
            None
        }
    }

    /// Whether a voxel currently has a live representation.
    pub fn is_live(&self, pos: GridPos) -> bool {
        self.live.contains(&pos)
    }

    /// Number of live voxels.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronovox_core::{BLOCK_DIRT, BLOCK_STONE, BLOCK_WATER};

    fn filled_cube(side: i32) -> VoxelField {
        let mut field = VoxelField::new(side, side, side);
        for x in 0..side {
            for y in 0..side {
                for z in 0..side {
                    field.set(GridPos::new(x, y, z), Some(BLOCK_STONE));
                }
            }
        }
        field
    }

    #[test]
    fn interior_of_a_solid_cube_is_hidden() {
        let field = filled_cube(3);
        let registry = BlockRegistry::new();

        assert!(is_hidden(&field, &registry, GridPos::new(1, 1, 1)));
        assert!(!is_hidden(&field, &registry, GridPos::new(0, 1, 1)));
        assert!(!should_materialize(&field, &registry, GridPos::new(1, 1, 1)));
        assert!(should_materialize(&field, &registry, GridPos::new(0, 1, 1)));
    }

    #[test]
    fn water_materializes_even_when_enclosed() {
        let mut field = filled_cube(5);
        field.set(GridPos::new(2, 2, 2), Some(BLOCK_WATER));
        let registry = BlockRegistry::new();

        assert!(should_materialize(&field, &registry, GridPos::new(2, 2, 2)));
        // The water cell is transparent, so its interior neighbors are
        // exposed through it.
        assert!(!is_hidden(&field, &registry, GridPos::new(2, 2, 1)));
        assert!(is_hidden(&field, &registry, GridPos::new(2, 1, 1)));
    }

    #[test]
    fn rebuild_spawns_only_visible_voxels() {
        let field = filled_cube(3);
        let registry = BlockRegistry::new();
        let mut mat = Materializer::default();

        let events = mat.rebuild(&field, &registry);
        // 27 voxels, one fully enclosed center.
        assert_eq!(events.len(), 26);
        assert!(events
            .iter()
            .all(|e| matches!(e, WorldEvent::Spawn(_, BLOCK_STONE))));
        assert!(!mat.is_live(GridPos::new(1, 1, 1)));
    }

    #[test]
    fn rebuild_despawns_the_previous_live_set() {
        let field = filled_cube(3);
        let registry = BlockRegistry::new();
        let mut mat = Materializer::default();
        mat.rebuild(&field, &registry);

        let empty = VoxelField::new(3, 3, 3);
        let events = mat.rebuild(&empty, &registry);
        assert_eq!(events.len(), 26);
        assert!(events.iter().all(|e| matches!(e, WorldEvent::Despawn(_))));
        assert_eq!(mat.live_count(), 0);
    }

    #[test]
    fn breaking_exposes_the_buried_neighbor() {
        let mut field = filled_cube(5);
        let registry = BlockRegistry::new();
        let mut mat = Materializer::default();
        mat.rebuild(&field, &registry);

        let center = GridPos::new(2, 2, 2);
        assert!(!mat.is_live(center));

        let opened = GridPos::new(2, 3, 2);
        field.set(opened, None);
        let mut events = mat.refresh(&field, &registry, opened);
        for n in opened.neighbors() {
            events.extend(mat.refresh(&field, &registry, n));
        }

        assert!(events.contains(&WorldEvent::Despawn(opened)));
        assert!(events.contains(&WorldEvent::Spawn(center, BLOCK_STONE)));
        assert!(mat.is_live(center));
    }

    #[test]
    fn invalidate_clears_a_stale_representation() {
        let mut field = VoxelField::new(3, 3, 3);
        let pos = GridPos::new(1, 1, 1);
        field.set(pos, Some(BLOCK_WATER));
        let registry = BlockRegistry::new();
        let mut mat = Materializer::default();
        mat.refresh(&field, &registry, pos);
        assert!(mat.is_live(pos));

        field.set(pos, Some(BLOCK_DIRT));
        assert_eq!(mat.invalidate(pos), Some(WorldEvent::Despawn(pos)));
        assert_eq!(mat.invalidate(pos), None);
        let events = mat.refresh(&field, &registry, pos);
        assert_eq!(events, vec![WorldEvent::Spawn(pos, BLOCK_DIRT)]);
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut field = VoxelField::new(3, 3, 3);
        field.set(GridPos::new(1, 1, 1), Some(BLOCK_DIRT));
        let registry = BlockRegistry::new();
        let mut mat = Materializer::default();

        let first = mat.refresh(&field, &registry, GridPos::new(1, 1, 1));
        assert_eq!(
            first,
            vec![WorldEvent::Spawn(GridPos::new(1, 1, 1), BLOCK_DIRT)]
        );
        let second = mat.refresh(&field, &registry, GridPos::new(1, 1, 1));
        assert!(second.is_empty());
    }
}
