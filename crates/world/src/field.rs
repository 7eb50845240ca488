use chronovox_core::{BlockId, GridPos};

/// Dense voxel field for the currently active phase.
///
/// Cells hold `Some(BlockId)` or `None` for empty, so the empty
/// sentinel can never collide with a real block type. The field is
/// ephemeral: every regeneration builds a fresh one and the previous
/// field is discarded wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelField {
    width: i32,
    height: i32,
    depth: i32,
    cells: Vec<Option<BlockId>>,
}

impl VoxelField {
    /// Allocate an all-empty field with the given dimensions.
    pub fn new(width: i32, height: i32, depth: i32) -> Self {
        let volume = (width.max(0) as usize) * (height.max(0) as usize) * (depth.max(0) as usize);
        Self {
            width,
            height,
            depth,
            cells: vec![None; volume],
        }
    }

    /// Field dimensions as (width, height, depth).
    pub fn dims(&self) -> (i32, i32, i32) {
        (self.width, self.height, self.depth)
    }

    /// Whether a position lies inside the field.
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0
            && pos.x < self.width
            && pos.y >= 0
            && pos.y < self.height
            && pos.z >= 0
            && pos.z < self.depth
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(((pos.y * self.depth + pos.z) * self.width + pos.x) as usize)
    }

    /// Fetch a cell. Returns `None` for empty cells and for positions
    /// outside the field.
    pub fn get(&self, pos: GridPos) -> Option<BlockId> {
        self.index(pos).and_then(|idx| self.cells[idx])
    }

    /// Set a cell. Returns false (no-op) when out of bounds.
    pub fn set(&mut self, pos: GridPos, cell: Option<BlockId>) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Height of the topmost non-empty voxel in a column.
    pub fn top_non_empty(&self, x: i32, z: i32) -> Option<i32> {
        for y in (0..self.height).rev() {
            if self.get(GridPos::new(x, y, z)).is_some() {
                return Some(y);
            }
        }
        None
    }

    /// Height of the topmost voxel in a column that is neither empty
    /// nor one of the given pass-through ids (used to skip water).
    pub fn top_excluding(&self, x: i32, z: i32, skip: &[BlockId]) -> Option<i32> {
        for y in (0..self.height).rev() {
            if let Some(id) = self.get(GridPos::new(x, y, z)) {
                if !skip.contains(&id) {
                    return Some(y);
                }
            }
        }
        None
    }

    /// Iterate all non-empty cells in deterministic (x, z, y) order.
    pub fn iter_filled(&self) -> impl Iterator<Item = (GridPos, BlockId)> + '_ {
        let (width, height, depth) = (self.width, self.height, self.depth);
        (0..width).flat_map(move |x| {
            (0..depth).flat_map(move |z| {
                (0..height).filter_map(move |y| {
                    let pos = GridPos::new(x, y, z);
                    self.get(pos).map(|id| (pos, id))
                })
            })
        })
    }
}
