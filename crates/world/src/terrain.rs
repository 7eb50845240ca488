//! Phase-themed terrain generation.
//!
//! Generation is resumable: [`TerrainGenerator::begin`] allocates a
//! run, [`TerrainGenerator::step`] fills a few column slabs per call,
//! and [`TerrainGenerator::finish`] stamps structures and applies the
//! phase diff overlay. Dropping an unfinished [`Generation`] cancels
//! it with no side effects.

use chronovox_core::{
    scoped_rng, BlockFlags, BlockId, BlockRegistry, GridPos, BLOCK_BEDROCK, BLOCK_COAL_ORE,
    BLOCK_DIRT, BLOCK_GRASS, BLOCK_IRON_ORE, BLOCK_LEAVES, BLOCK_LOG, BLOCK_SAND, BLOCK_SANDSTONE,
    BLOCK_SAPLING, BLOCK_STONE, BLOCK_SUN_FRUIT, BLOCK_VOIDSTONE, BLOCK_WATER,
};
use noise::{NoiseFn, Perlin};
use rand::{rngs::StdRng, Rng};
use tracing::{debug, instrument};

use crate::{
    PhaseDiff, PhaseDiffStore, RuinRegistry, SaplingSimulator, StabilizerRegistry, TimePhase,
    VoxelField, WorldConfig,
};

const COLUMN_SALT: u64 = 0x636f_6c75;
const TREE_SALT: u64 = 0x7472_6565;
const GROWTH_SALT: u64 = 0x6772_6f77;

/// Horizontal frequency of the Night hole noise.
const HOLE_NOISE_FREQUENCY: f64 = 0.15;

fn phase_salt(phase: TimePhase) -> u64 {
    match phase {
        TimePhase::Morning => 1,
        TimePhase::Noon => 2,
        TimePhase::Night => 3,
    }
}

/// Progress report from a generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    /// More column slabs remain.
    InProgress,
    /// All columns are filled; the run is ready for [`TerrainGenerator::finish`].
    Complete,
}

/// An in-flight generation run. Holds the partially filled field and
/// the resume cursor.
#[derive(Debug)]
pub struct Generation {
    phase: TimePhase,
    field: VoxelField,
    next_x: i32,
    rng: StdRng,
    done: bool,
}

impl Generation {
    /// The phase this run generates.
    pub fn phase(&self) -> TimePhase {
        self.phase
    }

    /// Whether every column has been filled.
    pub fn is_complete(&self) -> bool {
        self.done
    }
}

/// Mutable collaborators consulted while finishing a run. Absent
/// collaborators degrade gracefully: no overlay, no ruins, no sapling
/// expansion.
#[derive(Default)]
pub struct GenerationContext<'a> {
    /// Per-phase edit overlay, re-applied on top of base terrain.
    pub diffs: Option<&'a mut PhaseDiffStore>,
    /// Ruin sites, restamped during Night generation.
    pub ruins: Option<&'a mut RuinRegistry>,
    /// Sapling records, consulted to expand grown saplings into trees.
    pub saplings: Option<&'a mut SaplingSimulator>,
}

/// Deterministic phase-themed terrain generator.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    seed: u64,
    height_noise: Perlin,
    hole_noise: Perlin,
}

impl TerrainGenerator {
    /// Create a generator for a world seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            height_noise: Perlin::new(seed as u32),
            hole_noise: Perlin::new(seed.wrapping_add(1000) as u32),
        }
    }

    /// The world seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Start a generation run for a phase.
    pub fn begin(&self, config: &WorldConfig, phase: TimePhase) -> Generation {
        Generation {
            phase,
            field: VoxelField::new(config.width, config.world_height, config.depth),
            next_x: 0,
            rng: scoped_rng(self.seed ^ phase_salt(phase), COLUMN_SALT),
            done: false,
        }
    }

    /// Fill the next `columns_per_step` column slabs. Stabilizer and
    /// ruin views only matter for Night void suppression.
    pub fn step(
        &self,
        config: &WorldConfig,
        run: &mut Generation,
        stabilizers: Option<&StabilizerRegistry>,
        ruins: Option<&RuinRegistry>,
    ) -> GenerationStatus {
        if run.done {
            return GenerationStatus::Complete;
        }
        let end_x = (run.next_x + config.columns_per_step.max(1)).min(config.width);
        for x in run.next_x..end_x {
            for z in 0..config.depth {
                self.fill_column(config, run, x, z, stabilizers, ruins);
            }
        }
        run.next_x = end_x;
        if run.next_x >= config.width {
            run.done = true;
            GenerationStatus::Complete
        } else {
            GenerationStatus::InProgress
        }
    }

    /// Stamp structures, apply the phase diff overlay, and hand over
    /// the finished field. The run must be complete.
    #[instrument(skip_all, fields(phase = %run.phase))]
    pub fn finish(
        &self,
        config: &WorldConfig,
        registry: &BlockRegistry,
        run: Generation,
        ctx: &mut GenerationContext<'_>,
    ) -> VoxelField {
        let phase = run.phase;
        let mut field = run.field;

        if phase == TimePhase::Morning {
            self.grow_natural_trees(config, &mut field);
        }
        if let Some(ruins) = ctx.ruins.as_deref_mut() {
            if phase == TimePhase::Night {
                stamp_ruins(&mut field, ruins);
            } else {
                // Ruin structures exist only at Night; their voxel
                // protection and altars must not carry into phases
                // where those coordinates hold ordinary terrain.
                ruins.begin_stamp();
            }
        }
        if let Some(diffs) = ctx.diffs.as_deref_mut() {
            apply_overlay(
                registry,
                &mut field,
                self.seed,
                phase,
                diffs.diff_mut(phase),
                ctx.saplings.as_deref_mut(),
            );
        }

        debug!("generation finished");
        field
    }

    /// Run a whole generation synchronously. Equivalent to stepping a
    /// run to completion and finishing it.
    pub fn generate(
        &self,
        config: &WorldConfig,
        registry: &BlockRegistry,
        phase: TimePhase,
        stabilizers: Option<&StabilizerRegistry>,
        ctx: &mut GenerationContext<'_>,
    ) -> VoxelField {
        let mut run = self.begin(config, phase);
        while self.step(config, &mut run, stabilizers, ctx.ruins.as_deref())
            == GenerationStatus::InProgress
        {}
        self.finish(config, registry, run, ctx)
    }

    fn fill_column(
        &self,
        config: &WorldConfig,
        run: &mut Generation,
        x: i32,
        z: i32,
        stabilizers: Option<&StabilizerRegistry>,
        ruins: Option<&RuinRegistry>,
    ) {
        let surface = match self.column_surface(config, run.phase, x, z, stabilizers, ruins) {
            Some(surface) => surface,
            None => return, // Night void column
        };
        for y in 0..=surface {
            let id = block_for_depth(config, &mut run.rng, run.phase, y, surface);
            run.field.set(GridPos::new(x, y, z), Some(id));
        }
        if run.phase == TimePhase::Morning {
            for y in (surface + 1)..=config.water_level {
                run.field.set(GridPos::new(x, y, z), Some(BLOCK_WATER));
            }
        }
    }

    /// Surface height for a column, or `None` for a Night void column.
    fn column_surface(
        &self,
        config: &WorldConfig,
        phase: TimePhase,
        x: i32,
        z: i32,
        stabilizers: Option<&StabilizerRegistry>,
        ruins: Option<&RuinRegistry>,
    ) -> Option<i32> {
        if phase == TimePhase::Night && !self.night_column_is_land(config, x, z, stabilizers, ruins)
        {
            return None;
        }

        let sample = self
            .height_noise
            .get([x as f64 / config.noise_scale, z as f64 / config.noise_scale]);
        let mut value = (sample * 0.5 + 0.5).clamp(0.0, 1.0);
        if phase == TimePhase::Noon {
            value *= 1.5;
        }
        let height = (value * config.terrain_height as f64).floor() as i32;
        Some(height.clamp(0, config.world_height - 1))
    }

    /// Night land decision: a safe disk at the center, then rings of
    /// void and land alternating outward. Land rings are punched with
    /// noise holes. Ruin islands and stabilizers override the result
    /// and force land.
    fn night_column_is_land(
        &self,
        config: &WorldConfig,
        x: i32,
        z: i32,
        stabilizers: Option<&StabilizerRegistry>,
        ruins: Option<&RuinRegistry>,
    ) -> bool {
        let (cx, cz) = config.center();
        let dx = x as f64 - cx;
        let dz = z as f64 - cz;
        let dist = (dx * dx + dz * dz).sqrt();

        let mut land = if dist < config.center_safe_radius {
            true
        } else {
            let ring = ((dist - config.center_safe_radius) / config.ring_width).floor() as i64;
            if ring % 2 == 0 {
                false
            } else {
                let sample = self.hole_noise.get([
                    x as f64 * HOLE_NOISE_FREQUENCY,
                    z as f64 * HOLE_NOISE_FREQUENCY,
                ]);
                let hole = (sample * 0.5 + 0.5) < config.night_void_threshold;
                !hole
            }
        };

        if let Some(ruins) = ruins {
            if ruins.is_protected_column(x, z, config.ruin_island_radius) {
                land = true;
            }
        }
        if let Some(stabilizers) = stabilizers {
            if stabilizers.is_protected(x, z) {
                land = true;
            }
        }
        land
    }

    fn grow_natural_trees(&self, config: &WorldConfig, field: &mut VoxelField) {
        let mut rng = scoped_rng(self.seed ^ phase_salt(TimePhase::Morning), TREE_SALT);
        let border = config.tree_border;
        for x in border..config.width - border {
            for z in border..config.depth - border {
                if rng.gen::<f64>() >= config.tree_density {
                    continue;
                }
                let surface = match field.top_excluding(x, z, &[BLOCK_WATER]) {
                    Some(y) => y,
                    None => continue,
                };
                if field.get(GridPos::new(x, surface, z)) != Some(BLOCK_GRASS) {
                    continue;
                }
                stamp_tree(field, &mut rng, GridPos::new(x, surface + 1, z), false, None);
            }
        }
    }
}

fn block_for_depth(
    config: &WorldConfig,
    rng: &mut StdRng,
    phase: TimePhase,
    y: i32,
    surface: i32,
) -> BlockId {
    // Ore and bedrock substitution applies only to deep subsurface;
    // shallow columns keep their themed blocks all the way down.
    if y < surface - 4 {
        if y < config.bedrock_depth {
            return BLOCK_BEDROCK;
        }
        let roll = rng.gen::<f64>();
        if roll < config.iron_ore_chance {
            return BLOCK_IRON_ORE;
        }
        if roll < config.iron_ore_chance + config.coal_ore_chance {
            return BLOCK_COAL_ORE;
        }
    }
    match phase {
        TimePhase::Morning => {
            if y == surface {
                BLOCK_GRASS
            } else if y < surface - 3 {
                BLOCK_STONE
            } else {
                BLOCK_DIRT
            }
        }
        TimePhase::Noon => {
            if y == surface {
                BLOCK_SAND
            } else if y < surface - 3 {
                BLOCK_STONE
            } else {
                BLOCK_SANDSTONE
            }
        }
        TimePhase::Night => BLOCK_VOIDSTONE,
    }
}

/// Stamp the four ruin structures and record their voxels as
/// protected. Each ruin is a 3x3 stone floor, corner log pillars two
/// high, a sandstone roof, and an empty altar cell at the center.
fn stamp_ruins(field: &mut VoxelField, ruins: &mut RuinRegistry) {
    ruins.begin_stamp();
    let anchors: Vec<(i32, i32)> = ruins
        .sites()
        .iter()
        .map(|site| (site.anchor_x, site.anchor_z))
        .collect();

    for (index, (ax, az)) in anchors.into_iter().enumerate() {
        let ground = field.top_non_empty(ax, az).unwrap_or(10);
        let altar_y = ground + 2;
        ruins.set_altar(index, altar_y);

        for dx in -1..=1 {
            for dz in -1..=1 {
                let (x, z) = (ax + dx, az + dz);
                let corner = dx != 0 && dz != 0;

                let floor = GridPos::new(x, ground + 1, z);
                if field.set(floor, Some(BLOCK_STONE)) {
                    ruins.record_stamp(floor);
                }
                for y in altar_y..altar_y + 2 {
                    let pos = GridPos::new(x, y, z);
                    if corner {
                        if field.set(pos, Some(BLOCK_LOG)) {
                            ruins.record_stamp(pos);
                        }
                    } else {
                        // Hollow interior, including the altar cell.
                        field.set(pos, None);
                    }
                }
                let roof = GridPos::new(x, ground + 4, z);
                if field.set(roof, Some(BLOCK_SANDSTONE)) {
                    ruins.record_stamp(roof);
                }
            }
        }
        debug!(x = ax, z = az, altar_y, "ruin stamped");
    }
}

/// Re-apply the phase diff on top of freshly generated terrain. Grown
/// saplings expand into full trees whose voxels replace the sapling's
/// placed entry.
fn apply_overlay(
    registry: &BlockRegistry,
    field: &mut VoxelField,
    seed: u64,
    phase: TimePhase,
    diff: &mut PhaseDiff,
    mut saplings: Option<&mut SaplingSimulator>,
) {
    for pos in diff.iter_broken() {
        field.set(pos, None);
    }

    let placed: Vec<(GridPos, BlockId)> = diff.iter_placed().collect();
    let mut rng = scoped_rng(seed ^ phase_salt(phase), GROWTH_SALT);
    for (pos, id) in placed {
        let grown = registry.flags(id).contains(BlockFlags::TRIGGERS_GROWTH)
            && saplings
                .as_deref()
                .and_then(|s| s.get(phase, pos))
                .is_some_and(|r| r.grown);
        if grown {
            diff.remove_placed(pos);
            if let Some(saplings) = saplings.as_deref_mut() {
                saplings.remove(phase, pos);
            }
            let fruit = phase == TimePhase::Noon;
            stamp_tree(field, &mut rng, pos, fruit, Some(&mut *diff));
        } else {
            field.set(pos, Some(id));
        }
    }
}

/// Stamp a tree rooted at `root`: a 4 to 6 voxel log trunk with a
/// leaf blob around its top. When `record` is given every written
/// voxel also enters the diff as placed, so the tree persists across
/// regenerations.
fn stamp_tree(
    field: &mut VoxelField,
    rng: &mut StdRng,
    root: GridPos,
    fruit: bool,
    mut record: Option<&mut PhaseDiff>,
) {
    fn put(
        field: &mut VoxelField,
        record: &mut Option<&mut PhaseDiff>,
        pos: GridPos,
        id: BlockId,
    ) -> bool {
        if let Some(diff) = record.as_deref_mut() {
            // A coordinate with its own placed edit is off-limits; the
            // edit wins over tree growth.
            if diff.placed_id(pos).is_some() {
                return false;
            }
            if field.set(pos, Some(id)) {
                diff.record_placed(pos, id);
                return true;
            }
            false
        } else {
            field.set(pos, Some(id))
        }
    }

    let trunk_height = rng.gen_range(4..7);
    for dy in 0..trunk_height {
        let pos = GridPos::new(root.x, root.y + dy, root.z);
        // Trunks push through foliage and the sapling itself, never
        // through other blocks.
        if matches!(
            field.get(pos),
            None | Some(BLOCK_LEAVES) | Some(BLOCK_SAPLING)
        ) {
            put(field, &mut record, pos, BLOCK_LOG);
        }
    }

    let top = root.y + trunk_height - 1;
    let mut leaves = Vec::new();
    for y in (top - 1)..=(top + 2) {
        for dx in -2..=2i32 {
            for dz in -2..=2i32 {
                let pos = GridPos::new(root.x + dx, y, root.z + dz);
                let ddx = dx as f64;
                let ddy = (y - top) as f64;
                let ddz = dz as f64;
                if (ddx * ddx + ddy * ddy + ddz * ddz).sqrt() > 2.5 {
                    continue;
                }
                // Leaves only fill open air; occupied cells, including
                // neighboring edits, are left alone.
                if field.get(pos).is_some() {
                    continue;
                }
                if put(field, &mut record, pos, BLOCK_LEAVES) {
                    leaves.push(pos);
                }
            }
        }
    }

    if fruit && !leaves.is_empty() {
        let count = rng.gen_range(1..=2usize);
        for _ in 0..count {
            // Leaf cells stamped above are ours to replace with fruit.
            let pos = leaves[rng.gen_range(0..leaves.len())];
            field.set(pos, Some(BLOCK_SUN_FRUIT));
            if let Some(diff) = record.as_deref_mut() {
                diff.record_placed(pos, BLOCK_SUN_FRUIT);
            }
        }
    }
}
