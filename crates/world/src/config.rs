//! World configuration.
//!
//! All knobs are plain numeric parameters supplied at construction
//! time; defaults match the tuned values of the original game.

use chronovox_core::GridPos;

/// Configuration for world dimensions and generation rules.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// World width in voxels (X axis).
    pub width: i32,
    /// World depth in voxels (Z axis).
    pub depth: i32,
    /// World height in voxels (Y axis).
    pub world_height: i32,
    /// Maximum natural surface height before phase scaling.
    pub terrain_height: i32,
    /// Water fills Morning columns up to this height.
    pub water_level: i32,
    /// Horizontal scale of the height noise field.
    pub noise_scale: f64,
    /// Hole probability threshold for Night land rings (0..1).
    pub night_void_threshold: f64,
    /// Radius of the always-land disk at the map center (Night).
    pub center_safe_radius: f64,
    /// Thickness of each alternating void/land ring (Night).
    pub ring_width: f64,
    /// Columns within this radius of a ruin anchor are always land.
    pub ruin_island_radius: f64,
    /// Inset of the four ruin anchors from the map corners.
    pub ruin_padding: i32,
    /// Stabilizer protection radius in the horizontal plane.
    pub stabilizer_range: f64,
    /// Per-voxel iron ore chance in deep subsurface stone.
    pub iron_ore_chance: f64,
    /// Per-voxel coal ore chance, evaluated after iron.
    pub coal_ore_chance: f64,
    /// Below this height deep subsurface becomes bedrock.
    pub bedrock_depth: i32,
    /// Per-column natural tree chance (Morning).
    pub tree_density: f64,
    /// Border margin excluded from natural tree placement.
    pub tree_border: i32,
    /// Real-time seconds before an unprotected Night placement decays.
    pub decay_seconds: f32,
    /// Column slabs (X rows) filled per generation poll step.
    pub columns_per_step: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 50,
            depth: 50,
            world_height: 64,
            terrain_height: 20,
            water_level: 4,
            noise_scale: 20.0,
            night_void_threshold: 0.3,
            center_safe_radius: 8.0,
            ring_width: 8.0,
            ruin_island_radius: 6.0,
            ruin_padding: 10,
            stabilizer_range: 5.0,
            iron_ore_chance: 0.05,
            coal_ore_chance: 0.05,
            bedrock_depth: 3,
            tree_density: 0.01,
            tree_border: 2,
            decay_seconds: 1.0,
            columns_per_step: 2,
        }
    }
}

impl WorldConfig {
    /// Whether a position lies inside the world bounds.
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0
            && pos.x < self.width
            && pos.y >= 0
            && pos.y < self.world_height
            && pos.z >= 0
            && pos.z < self.depth
    }

    /// Whether a column lies inside the horizontal bounds.
    pub fn column_in_bounds(&self, x: i32, z: i32) -> bool {
        x >= 0 && x < self.width && z >= 0 && z < self.depth
    }

    /// Horizontal center of the map.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.depth as f64 / 2.0)
    }
}
