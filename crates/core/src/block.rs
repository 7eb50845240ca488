//! Block identifiers and the static behavior registry.
//!
//! Behavior checks go through [`BlockFlags`] resolved once from the
//! registry instead of scattered id comparisons.

use bitflags::bitflags;

/// Block identifier referencing the registry.
pub type BlockId = u16;

/// ID for dirt (Morning subsurface).
pub const BLOCK_DIRT: BlockId = 0;
/// ID for grass (Morning surface).
pub const BLOCK_GRASS: BlockId = 1;
/// ID for stone (deep subsurface in every phase).
pub const BLOCK_STONE: BlockId = 2;
/// ID for water (Morning, transparent and non-solid).
pub const BLOCK_WATER: BlockId = 3;
/// ID for sand (Noon surface).
pub const BLOCK_SAND: BlockId = 4;
/// ID for sandstone (Noon subsurface, ruin roofs).
pub const BLOCK_SANDSTONE: BlockId = 5;
/// ID for voidstone (Night terrain).
pub const BLOCK_VOIDSTONE: BlockId = 6;
/// ID for iron ore.
pub const BLOCK_IRON_ORE: BlockId = 7;
/// ID for coal ore.
pub const BLOCK_COAL_ORE: BlockId = 8;
/// ID for tree logs (also ruin pillars).
pub const BLOCK_LOG: BlockId = 9;
/// ID for tree leaves.
pub const BLOCK_LEAVES: BlockId = 10;
/// ID for the terrain stabilizer.
pub const BLOCK_STABILIZER: BlockId = 11;
/// ID for sun fruit grown on Noon-planted trees.
pub const BLOCK_SUN_FRUIT: BlockId = 12;
/// ID for saplings.
pub const BLOCK_SAPLING: BlockId = 13;
/// ID for the lantern that activates ruin altars.
pub const BLOCK_LANTERN: BlockId = 14;
/// ID for bedrock (unbreakable floor layer).
pub const BLOCK_BEDROCK: BlockId = 15;

bitflags! {
    /// Behavior flags carried by a block kind.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BlockFlags: u8 {
        /// The edit API may place this block.
        const PLACEABLE = 0b0000_0001;
        /// The edit API refuses to break this block.
        const UNBREAKABLE = 0b0000_0010;
        /// Does not occlude neighbors; placement may replace it.
        const TRANSPARENT = 0b0000_0100;
        /// Placing registers a sapling record.
        const TRIGGERS_GROWTH = 0b0000_1000;
        /// Placing registers a stabilizer position.
        const TRIGGERS_PROTECTION = 0b0001_0000;
        /// Placing at a ruin altar activates the site.
        const ACTIVATES_RUIN = 0b0010_0000;
        /// Never scheduled for Night decay.
        const DECAY_EXEMPT = 0b0100_0000;
    }
}

/// Static description of a block type.
#[derive(Debug, Clone, Copy)]
pub struct BlockKind {
    /// Human-readable name, for logs and diagnostics.
    pub name: &'static str,
    /// Behavior flags.
    pub flags: BlockFlags,
}

impl BlockKind {
    const fn new(name: &'static str, flags: BlockFlags) -> Self {
        Self { name, flags }
    }
}

/// Fallback for ids the registry does not know: hosts may introduce
/// extra placeable block types (e.g. containers) without teaching the
/// engine about them.
const UNKNOWN_KIND: BlockKind = BlockKind::new("unknown", BlockFlags::PLACEABLE);

/// Block behavior registry, resolved once at world construction.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    kinds: Vec<BlockKind>,
}

impl BlockRegistry {
    /// Create a registry with the built-in block table.
    pub fn new() -> Self {
        let mut kinds = vec![UNKNOWN_KIND; 16];

        kinds[BLOCK_DIRT as usize] = BlockKind::new("dirt", BlockFlags::PLACEABLE);
        kinds[BLOCK_GRASS as usize] = BlockKind::new("grass", BlockFlags::PLACEABLE);
        kinds[BLOCK_STONE as usize] = BlockKind::new("stone", BlockFlags::PLACEABLE);
        kinds[BLOCK_WATER as usize] = BlockKind::new("water", BlockFlags::TRANSPARENT);
        kinds[BLOCK_SAND as usize] = BlockKind::new("sand", BlockFlags::PLACEABLE);
        kinds[BLOCK_SANDSTONE as usize] = BlockKind::new("sandstone", BlockFlags::PLACEABLE);
        kinds[BLOCK_VOIDSTONE as usize] = BlockKind::new("voidstone", BlockFlags::PLACEABLE);
        kinds[BLOCK_IRON_ORE as usize] = BlockKind::new("iron_ore", BlockFlags::PLACEABLE);
        kinds[BLOCK_COAL_ORE as usize] = BlockKind::new("coal_ore", BlockFlags::PLACEABLE);
        kinds[BLOCK_LOG as usize] = BlockKind::new("log", BlockFlags::PLACEABLE);
        kinds[BLOCK_LEAVES as usize] = BlockKind::new("leaves", BlockFlags::PLACEABLE);
        kinds[BLOCK_STABILIZER as usize] = BlockKind::new(
            "stabilizer",
            BlockFlags::PLACEABLE
                .union(BlockFlags::TRIGGERS_PROTECTION)
                .union(BlockFlags::DECAY_EXEMPT),
        );
        kinds[BLOCK_SUN_FRUIT as usize] = BlockKind::new("sun_fruit", BlockFlags::PLACEABLE);
        kinds[BLOCK_SAPLING as usize] = BlockKind::new(
            "sapling",
            BlockFlags::PLACEABLE.union(BlockFlags::TRIGGERS_GROWTH),
        );
        kinds[BLOCK_LANTERN as usize] = BlockKind::new(
            "lantern",
            BlockFlags::PLACEABLE
                .union(BlockFlags::ACTIVATES_RUIN)
                .union(BlockFlags::DECAY_EXEMPT),
        );
        kinds[BLOCK_BEDROCK as usize] = BlockKind::new("bedrock", BlockFlags::UNBREAKABLE);

        Self { kinds }
    }

    /// Get the kind for a block ID, falling back to a permissive
    /// default for host-defined ids.
    pub fn get(&self, id: BlockId) -> &BlockKind {
        self.kinds.get(id as usize).unwrap_or(&UNKNOWN_KIND)
    }

    /// Resolved behavior flags for a block ID.
    pub fn flags(&self, id: BlockId) -> BlockFlags {
        self.get(id).flags
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_behavior_flags() {
        let registry = BlockRegistry::new();

        assert!(registry.flags(BLOCK_WATER).contains(BlockFlags::TRANSPARENT));
        assert!(!registry.flags(BLOCK_WATER).contains(BlockFlags::PLACEABLE));

        assert!(registry.flags(BLOCK_BEDROCK).contains(BlockFlags::UNBREAKABLE));
        assert!(!registry.flags(BLOCK_BEDROCK).contains(BlockFlags::PLACEABLE));

        assert!(registry
            .flags(BLOCK_SAPLING)
            .contains(BlockFlags::TRIGGERS_GROWTH));
        assert!(registry
            .flags(BLOCK_STABILIZER)
            .contains(BlockFlags::TRIGGERS_PROTECTION | BlockFlags::DECAY_EXEMPT));
        assert!(registry
            .flags(BLOCK_LANTERN)
            .contains(BlockFlags::ACTIVATES_RUIN | BlockFlags::DECAY_EXEMPT));
    }

    #[test]
    fn unknown_ids_fall_back_to_placeable_solid() {
        let registry = BlockRegistry::new();
        let flags = registry.flags(999);
        assert!(flags.contains(BlockFlags::PLACEABLE));
        assert!(!flags.contains(BlockFlags::TRANSPARENT));
        assert!(!flags.contains(BlockFlags::UNBREAKABLE));
    }

    #[test]
    fn stone_is_a_plain_solid() {
        let registry = BlockRegistry::new();
        assert_eq!(registry.flags(BLOCK_STONE), BlockFlags::PLACEABLE);
        assert_eq!(registry.get(BLOCK_STONE).name, "stone");
    }
}
