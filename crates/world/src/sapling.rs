use chronovox_core::GridPos;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PhaseDiffStore, TimePhase};

/// Growth chance rolled for a sapling when a Noon passes.
pub const NOON_GROWTH_CHANCE: f64 = 0.3;

/// A planted sapling tracked across phase transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaplingRecord {
    /// Where the sapling was placed.
    pub pos: GridPos,
    /// The phase it was planted in. Noon-planted trees bear fruit.
    pub planted: TimePhase,
    /// Whether the sapling has matured into a tree.
    pub grown: bool,
}

/// Tracks saplings and advances their growth on phase transitions.
///
/// Growth is only uncertain across a Noon: a 0.3 roll grows the
/// sapling, anything else kills it. Transitions out of other phases
/// grow it unconditionally.
#[derive(Debug, Clone, Default)]
pub struct SaplingSimulator {
    records: Vec<SaplingRecord>,
}

impl SaplingSimulator {
    /// Register a newly planted sapling. Returns false if a record for
    /// the same position and phase already exists.
    pub fn register(&mut self, planted: TimePhase, pos: GridPos) -> bool {
        if self
            .records
            .iter()
            .any(|r| r.pos == pos && r.planted == planted)
        {
            return false;
        }
        self.records.push(SaplingRecord {
            pos,
            planted,
            grown: false,
        });
        true
    }

    /// Remove the record at a position for a phase, returning it.
    pub fn remove(&mut self, planted: TimePhase, pos: GridPos) -> Option<SaplingRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.pos == pos && r.planted == planted)?;
        Some(self.records.swap_remove(index))
    }

    /// The record at a position for a phase, if any.
    pub fn get(&self, planted: TimePhase, pos: GridPos) -> Option<&SaplingRecord> {
        self.records
            .iter()
            .find(|r| r.pos == pos && r.planted == planted)
    }

    /// All tracked records.
    pub fn records(&self) -> &[SaplingRecord] {
        &self.records
    }

    /// Advance growth when leaving `phase`. Dead saplings lose both
    /// their record and their placed-diff entry so they do not reappear
    /// on regeneration.
    pub fn advance(
        &mut self,
        phase: TimePhase,
        rng: &mut impl Rng,
        diffs: &mut PhaseDiffStore,
    ) {
        let mut index = self.records.len();
        while index > 0 {
            index -= 1;
            let record = self.records[index];
            if record.grown || record.planted != phase {
                continue;
            }
            let survives = phase != TimePhase::Noon || rng.gen::<f64>() < NOON_GROWTH_CHANCE;
            if survives {
                self.records[index].grown = true;
                debug!(pos = %record.pos, phase = %phase, "sapling grew");
            } else {
                self.records.swap_remove(index);
                diffs.diff_mut(phase).remove_placed(record.pos);
                debug!(pos = %record.pos, phase = %phase, "sapling died");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronovox_core::scoped_rng;

    #[test]
    fn register_deduplicates_by_position_and_phase() {
        let mut sim = SaplingSimulator::default();
        let pos = GridPos::new(5, 6, 7);

        assert!(sim.register(TimePhase::Morning, pos));
        assert!(!sim.register(TimePhase::Morning, pos));
        assert!(sim.register(TimePhase::Noon, pos));
        assert_eq!(sim.records().len(), 2);

        assert!(sim.remove(TimePhase::Morning, pos).is_some());
        assert!(sim.remove(TimePhase::Morning, pos).is_none());
    }

    #[test]
    fn non_noon_saplings_always_grow() {
        let mut sim = SaplingSimulator::default();
        let mut diffs = PhaseDiffStore::default();
        let pos = GridPos::new(1, 2, 3);
        sim.register(TimePhase::Morning, pos);

        let mut rng = scoped_rng(1, 0);
        sim.advance(TimePhase::Morning, &mut rng, &mut diffs);

        assert!(sim.get(TimePhase::Morning, pos).unwrap().grown);
    }

    #[test]
    fn grown_saplings_are_not_rerolled() {
        let mut sim = SaplingSimulator::default();
        let mut diffs = PhaseDiffStore::default();
        let pos = GridPos::new(1, 2, 3);
        sim.register(TimePhase::Noon, pos);
        sim.advance(TimePhase::Morning, &mut rng_always_fail(), &mut diffs);
        assert!(!sim.get(TimePhase::Noon, pos).unwrap().grown);

        // Force growth, then verify later Noon passes leave it alone.
        let mut rng = scoped_rng(0, 0);
        loop {
            sim.advance(TimePhase::Noon, &mut rng, &mut diffs);
            if let Some(record) = sim.get(TimePhase::Noon, pos) {
                if record.grown {
                    break;
                }
            } else {
                sim.register(TimePhase::Noon, pos);
            }
        }
        sim.advance(TimePhase::Noon, &mut rng_always_fail(), &mut diffs);
        assert!(sim.get(TimePhase::Noon, pos).unwrap().grown);
    }

    #[test]
    fn dead_noon_saplings_drop_their_diff_entry() {
        use chronovox_core::BLOCK_SAPLING;

        let mut sim = SaplingSimulator::default();
        let mut diffs = PhaseDiffStore::default();

        // With enough rolls some saplings must die; every death must
        // clear the matching placed entry.
        for i in 0..200 {
            let pos = GridPos::new(i, 1, 0);
            sim.register(TimePhase::Noon, pos);
            diffs.diff_mut(TimePhase::Noon).record_placed(pos, BLOCK_SAPLING);
        }
        let mut rng = scoped_rng(9, 0);
        sim.advance(TimePhase::Noon, &mut rng, &mut diffs);

        let surviving = sim.records().len();
        assert!(surviving < 200);
        assert_eq!(diffs.diff(TimePhase::Noon).placed_len(), surviving);
    }

    #[test]
    fn noon_growth_rate_is_near_the_nominal_chance() {
        let mut sim = SaplingSimulator::default();
        let mut diffs = PhaseDiffStore::default();
        let n = 10_000;
        for i in 0..n {
            sim.register(TimePhase::Noon, GridPos::new(i % 100, i / 100, 0));
        }
        let mut rng = scoped_rng(42, 0);
        sim.advance(TimePhase::Noon, &mut rng, &mut diffs);

        let rate = sim.records().len() as f64 / n as f64;
        assert!((0.28..0.32).contains(&rate), "rate {rate}");
    }

    // An RNG whose f64 draws are always >= any growth chance.
    fn rng_always_fail() -> impl Rng {
        struct MaxRng;
        impl rand::RngCore for MaxRng {
            fn next_u32(&mut self) -> u32 {
                u32::MAX
            }
            fn next_u64(&mut self) -> u64 {
                u64::MAX
            }
            fn fill_bytes(&mut self, dest: &mut [u8]) {
                dest.fill(0xFF);
            }
            fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
                dest.fill(0xFF);
                Ok(())
            }
        }
        MaxRng
    }
}
