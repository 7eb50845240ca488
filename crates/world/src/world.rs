//! World facade tying generation, edits, simulation, and
//! materialization together.

use chronovox_core::{scoped_rng, BlockFlags, BlockId, BlockRegistry, GridPos};
use rand::rngs::StdRng;
use tracing::debug;

use crate::{
    Generation, GenerationContext, GenerationStatus, Materializer, PhaseDiffStore, RuinRegistry,
    SaplingSimulator, StabilizerRegistry, StorageState, TerrainGenerator, TimePhase, VoxelField,
    WorldConfig, WorldEvent,
};

const SIM_SALT: u64 = 0x73_696d;

/// Outcome of a generation poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationProgress {
    /// No generation is pending.
    Idle,
    /// Columns are still being filled.
    Working,
    /// The new field was committed this poll.
    Committed,
}

#[derive(Debug, Clone, Copy)]
struct DecayEntry {
    pos: GridPos,
    remaining: f32,
}

/// The complete engine state for one world.
///
/// Edits are rejected while a regeneration is pending; poll the
/// pending run to completion first. Starting a new generation while
/// one is pending cancels the old run with no visible effect.
pub struct WorldState {
    config: WorldConfig,
    registry: BlockRegistry,
    phase: TimePhase,
    generator: TerrainGenerator,
    diffs: PhaseDiffStore,
    stabilizers: StabilizerRegistry,
    ruins: RuinRegistry,
    saplings: SaplingSimulator,
    field: VoxelField,
    materializer: Materializer,
    pending: Option<Generation>,
    decay: Vec<DecayEntry>,
    rng: StdRng,
    saved_column: Option<(i32, i32)>,
    events: Vec<WorldEvent>,
}

impl WorldState {
    /// Create a world in the Morning phase with an empty field. No
    /// generation is started; call [`WorldState::begin_generation`] or
    /// [`WorldState::generate_now`].
    pub fn new(config: WorldConfig, seed: u64) -> Self {
        let field = VoxelField::new(config.width, config.world_height, config.depth);
        let stabilizers = StabilizerRegistry::new(config.stabilizer_range);
        let ruins = RuinRegistry::for_config(&config);
        Self {
            registry: BlockRegistry::new(),
            phase: TimePhase::Morning,
            generator: TerrainGenerator::new(seed),
            diffs: PhaseDiffStore::default(),
            stabilizers,
            ruins,
            saplings: SaplingSimulator::default(),
            field,
            materializer: Materializer::default(),
            pending: None,
            decay: Vec::new(),
            rng: scoped_rng(seed, SIM_SALT),
            saved_column: None,
            events: Vec::new(),
            config,
        }
    }

    /// Start (or restart) generation for a phase. A pending run is
    /// cancelled and replaced. `preserve_position` keeps the saved
    /// player column for spawn resolution; otherwise it is cleared.
    pub fn begin_generation(&mut self, phase: TimePhase, preserve_position: bool) {
        if !preserve_position {
            self.saved_column = None;
        }
        if self.pending.is_some() {
            debug!(phase = %phase, "cancelling pending generation");
        }
        self.phase = phase;
        self.pending = Some(self.generator.begin(&self.config, phase));
    }

    /// Advance the pending generation by one step, committing the new
    /// field when the run completes.
    pub fn poll_generation(&mut self) -> GenerationProgress {
        let status = match self.pending.as_mut() {
            Some(run) => self.generator.step(
                &self.config,
                run,
                Some(&self.stabilizers),
                Some(&self.ruins),
            ),
            None => return GenerationProgress::Idle,
        };
        if status == GenerationStatus::InProgress {
            return GenerationProgress::Working;
        }
        let run = match self.pending.take() {
            Some(run) => run,
            None => return GenerationProgress::Idle,
        };
        let mut ctx = GenerationContext {
            diffs: Some(&mut self.diffs),
            ruins: Some(&mut self.ruins),
            saplings: Some(&mut self.saplings),
        };
        self.field = self
            .generator
            .finish(&self.config, &self.registry, run, &mut ctx);
        self.decay.clear();
        let events = self.materializer.rebuild(&self.field, &self.registry);
        self.events.extend(events);
        GenerationProgress::Committed
    }

    /// Run a pending-free generation to completion synchronously.
    pub fn generate_now(&mut self, phase: TimePhase, preserve_position: bool) {
        self.begin_generation(phase, preserve_position);
        while self.poll_generation() == GenerationProgress::Working {}
    }

    /// Remember the player's column for spawn resolution after the
    /// next regeneration.
    pub fn record_player_column(&mut self, x: i32, z: i32) {
        self.saved_column = Some((x, z));
    }

    /// Advance to the next phase: settle sapling growth for the phase
    /// being left, then start regenerating the new phase's field. The
    /// player column is preserved.
    pub fn advance_phase(&mut self) {
        let leaving = self.phase;
        self.saplings.advance(leaving, &mut self.rng, &mut self.diffs);
        let next = leaving.next();
        debug!(from = %leaving, to = %next, "phase transition");
        self.begin_generation(next, true);
    }

    /// Place a block. Returns false without side effects when a
    /// generation is pending, the position is out of bounds or
    /// occupied by an opaque voxel, or the block is not placeable.
    pub fn place_block(&mut self, pos: GridPos, id: BlockId) -> bool {
        if self.pending.is_some() || !self.config.in_bounds(pos) {
            return false;
        }
        let flags = self.registry.flags(id);
        if !flags.contains(BlockFlags::PLACEABLE) {
            return false;
        }
        if let Some(existing) = self.field.get(pos) {
            // Transparent voxels (water) may be replaced.
            if !self
                .registry
                .flags(existing)
                .contains(BlockFlags::TRANSPARENT)
            {
                return false;
            }
            // The replaced voxel's representation is stale.
            if let Some(event) = self.materializer.invalidate(pos) {
                self.events.push(event);
            }
        }

        self.field.set(pos, Some(id));
        self.diffs.diff_mut(self.phase).record_placed(pos, id);

        if flags.contains(BlockFlags::TRIGGERS_GROWTH) {
            self.saplings.register(self.phase, pos);
        }
        if flags.contains(BlockFlags::TRIGGERS_PROTECTION) {
            self.stabilizers.add(pos.x, pos.z);
        }
        if flags.contains(BlockFlags::ACTIVATES_RUIN) {
            self.ruins.try_activate(pos);
        }
        if self.phase == TimePhase::Night
            && !flags.contains(BlockFlags::DECAY_EXEMPT)
            && !self.stabilizers.is_protected(pos.x, pos.z)
        {
            self.decay.push(DecayEntry {
                pos,
                remaining: self.config.decay_seconds,
            });
        }

        self.refresh_around(pos);
        true
    }

    /// Break a block. Returns false without side effects when a
    /// generation is pending, the position is out of bounds or empty,
    /// the block is unbreakable, or the voxel belongs to a ruin.
    pub fn break_block(&mut self, pos: GridPos) -> bool {
        if self.pending.is_some() || !self.config.in_bounds(pos) {
            return false;
        }
        let id = match self.field.get(pos) {
            Some(id) => id,
            None => return false,
        };
        let flags = self.registry.flags(id);
        if flags.contains(BlockFlags::UNBREAKABLE) || self.ruins.is_protected_voxel(pos) {
            return false;
        }

        let diff = self.diffs.diff_mut(self.phase);
        if diff.remove_placed(pos).is_some() {
            diff.clear_storage(pos);
            if flags.contains(BlockFlags::TRIGGERS_GROWTH) {
                self.saplings.remove(self.phase, pos);
            }
            if flags.contains(BlockFlags::TRIGGERS_PROTECTION) {
                self.stabilizers.remove(pos.x, pos.z);
            }
        } else {
            diff.record_broken(pos);
        }
        self.decay.retain(|entry| entry.pos != pos);
        self.field.set(pos, None);

        self.refresh_around(pos);
        true
    }

    /// Tick Night decay timers. Expired placements vanish without a
    /// broken mark; a placement that has since come under stabilizer
    /// protection is spared.
    pub fn tick_decay(&mut self, dt: f32) {
        if self.decay.is_empty() {
            return;
        }
        for entry in &mut self.decay {
            entry.remaining -= dt;
        }
        let expired: Vec<GridPos> = self
            .decay
            .iter()
            .filter(|entry| entry.remaining <= 0.0)
            .map(|entry| entry.pos)
            .collect();
        self.decay.retain(|entry| entry.remaining > 0.0);

        for pos in expired {
            if self.stabilizers.is_protected(pos.x, pos.z) {
                continue;
            }
            if let Some(id) = self.diffs.diff_mut(self.phase).remove_placed(pos) {
                let flags = self.registry.flags(id);
                if flags.contains(BlockFlags::TRIGGERS_GROWTH) {
                    self.saplings.remove(self.phase, pos);
                }
                self.diffs.diff_mut(self.phase).clear_storage(pos);
            }
            self.field.set(pos, None);
            self.refresh_around(pos);
            debug!(pos = %pos, "placement decayed");
        }
    }

    /// Storage attached to a voxel in the current phase.
    pub fn storage(&self, pos: GridPos) -> Option<&StorageState> {
        if !self.config.in_bounds(pos) {
            return None;
        }
        self.diffs.diff(self.phase).storage(pos)
    }

    /// Mutable storage for a voxel in the current phase, created on
    /// first use. Out-of-bounds positions get nothing.
    pub fn storage_mut(&mut self, pos: GridPos) -> Option<&mut StorageState> {
        if !self.config.in_bounds(pos) {
            return None;
        }
        Some(self.diffs.diff_mut(self.phase).storage_mut(pos))
    }

    /// Replace the storage attached to a voxel in the current phase.
    /// Returns false for out-of-bounds positions.
    pub fn set_storage(&mut self, pos: GridPos, state: StorageState) -> bool {
        if !self.config.in_bounds(pos) {
            return false;
        }
        self.diffs.diff_mut(self.phase).set_storage(pos, state);
        true
    }

    /// Remove the storage attached to a voxel in the current phase.
    pub fn clear_storage(&mut self, pos: GridPos) -> Option<StorageState> {
        if !self.config.in_bounds(pos) {
            return None;
        }
        self.diffs.diff_mut(self.phase).clear_storage(pos)
    }

    /// Resolve a spawn position: the saved player column (or the map
    /// center), two voxels above the terrain surface.
    pub fn spawn_position(&self) -> GridPos {
        let (x, z) = self.saved_column.unwrap_or((
            self.config.width / 2,
            self.config.depth / 2,
        ));
        let x = x.clamp(0, self.config.width - 1);
        let z = z.clamp(0, self.config.depth - 1);
        let y = self
            .field
            .top_non_empty(x, z)
            .map(|top| (top + 2).min(self.config.world_height - 1))
            .unwrap_or(self.config.world_height - 1);
        GridPos::new(x, y, z)
    }

    /// Take the buffered spawn/despawn events.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    /// The current phase.
    pub fn phase(&self) -> TimePhase {
        self.phase
    }

    /// The world configuration.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The block behavior registry.
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// The voxel at a position, if filled.
    pub fn voxel(&self, pos: GridPos) -> Option<BlockId> {
        self.field.get(pos)
    }

    /// The active voxel field.
    pub fn field(&self) -> &VoxelField {
        &self.field
    }

    /// Whether a generation run is pending.
    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of ruin sites activated so far.
    pub fn activated_ruin_count(&self) -> usize {
        self.ruins.activated_count()
    }

    /// The stabilizer registry.
    pub fn stabilizers(&self) -> &StabilizerRegistry {
        &self.stabilizers
    }

    /// The ruin registry.
    pub fn ruins(&self) -> &RuinRegistry {
        &self.ruins
    }

    /// The sapling simulator.
    pub fn saplings(&self) -> &SaplingSimulator {
        &self.saplings
    }

    /// The per-phase edit diffs.
    pub fn diffs(&self) -> &PhaseDiffStore {
        &self.diffs
    }

    /// Whether a voxel currently has a live representation.
    pub fn is_live(&self, pos: GridPos) -> bool {
        self.materializer.is_live(pos)
    }

    fn refresh_around(&mut self, pos: GridPos) {
        self.events
            .extend(self.materializer.refresh(&self.field, &self.registry, pos));
        for neighbor in pos.neighbors() {
            self.events
                .extend(self.materializer.refresh(&self.field, &self.registry, neighbor));
        }
    }
}
