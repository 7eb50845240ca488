use std::collections::HashSet;

use tracing::debug;

/// Registry of placed terrain stabilizers.
///
/// Keyed by horizontal (x, z) only: protection reaches the full height
/// of a column, so the generator can consult it before any voxel
/// heights exist.
#[derive(Debug, Clone)]
pub struct StabilizerRegistry {
    positions: HashSet<(i32, i32)>,
    range: f64,
}

impl StabilizerRegistry {
    /// Create an empty registry with the given protection radius.
    pub fn new(range: f64) -> Self {
        Self {
            positions: HashSet::new(),
            range,
        }
    }

    /// Register a stabilizer column. Returns false if one was already
    /// registered there.
    pub fn add(&mut self, x: i32, z: i32) -> bool {
        let added = self.positions.insert((x, z));
        if added {
            debug!(x, z, "stabilizer registered");
        }
        added
    }

    /// Remove a stabilizer column. Returns false if none was there.
    pub fn remove(&mut self, x: i32, z: i32) -> bool {
        let removed = self.positions.remove(&(x, z));
        if removed {
            debug!(x, z, "stabilizer removed");
        }
        removed
    }

    /// Whether a column lies within range of any stabilizer.
    pub fn is_protected(&self, x: i32, z: i32) -> bool {
        self.positions.iter().any(|&(sx, sz)| {
            let dx = (x - sx) as f64;
            let dz = (z - sz) as f64;
            (dx * dx + dz * dz).sqrt() <= self.range
        })
    }

    /// Number of registered stabilizers.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The protection radius.
    pub fn range(&self) -> f64 {
        self.range
    }
}
