//! Night ruin sites.
//!
//! Four ruins sit near the map corners. Their footprints force the
//! surrounding columns to stay land during Night generation, their
//! stamped voxels are unbreakable, and placing a lantern on an altar
//! activates the site once.

use std::collections::BTreeSet;

use chronovox_core::GridPos;
use tracing::debug;

use crate::WorldConfig;

/// A single ruin anchored near a map corner.
#[derive(Debug, Clone)]
pub struct RuinSite {
    /// Column of the ruin's 3x3 footprint center.
    pub anchor_x: i32,
    /// Column of the ruin's 3x3 footprint center.
    pub anchor_z: i32,
    /// Altar height, known once the ruin has been stamped.
    pub altar_y: Option<i32>,
    /// Whether a lantern has activated this site.
    pub activated: bool,
}

impl RuinSite {
    /// The altar position, if the ruin has been stamped.
    pub fn altar_pos(&self) -> Option<GridPos> {
        self.altar_y
            .map(|y| GridPos::new(self.anchor_x, y, self.anchor_z))
    }
}

/// Registry of ruin sites and their stamped (protected) voxels.
///
/// Activation state persists across regenerations; the protected voxel
/// set is rebuilt each time the ruins are stamped.
#[derive(Debug, Clone, Default)]
pub struct RuinRegistry {
    sites: Vec<RuinSite>,
    protected: BTreeSet<GridPos>,
}

impl RuinRegistry {
    /// Lay out the four corner sites for a config, dropping any whose
    /// anchor falls outside the map (small worlds).
    pub fn for_config(config: &WorldConfig) -> Self {
        let pad = config.ruin_padding;
        let anchors = [
            (pad, pad),
            (config.width - 1 - pad, pad),
            (pad, config.depth - 1 - pad),
            (config.width - 1 - pad, config.depth - 1 - pad),
        ];
        let sites = anchors
            .into_iter()
            .filter(|&(x, z)| config.column_in_bounds(x, z))
            .map(|(x, z)| RuinSite {
                anchor_x: x,
                anchor_z: z,
                altar_y: None,
                activated: false,
            })
            .collect();
        Self {
            sites,
            protected: BTreeSet::new(),
        }
    }

    /// The registered sites.
    pub fn sites(&self) -> &[RuinSite] {
        &self.sites
    }

    /// Whether a column lies within the given radius of any ruin
    /// anchor. Used by Night generation to force land.
    pub fn is_protected_column(&self, x: i32, z: i32, radius: f64) -> bool {
        self.sites.iter().any(|site| {
            let dx = (x - site.anchor_x) as f64;
            let dz = (z - site.anchor_z) as f64;
            (dx * dx + dz * dz).sqrt() <= radius
        })
    }

    /// Whether a voxel belongs to a stamped ruin structure.
    pub fn is_protected_voxel(&self, pos: GridPos) -> bool {
        self.protected.contains(&pos)
    }

    /// Reset stamped voxels before a fresh stamping pass. Altar heights
    /// are cleared too; activation state is kept.
    pub(crate) fn begin_stamp(&mut self) {
        self.protected.clear();
        for site in &mut self.sites {
            site.altar_y = None;
        }
    }

    /// Mark a stamped structure voxel as protected.
    pub(crate) fn record_stamp(&mut self, pos: GridPos) {
        self.protected.insert(pos);
    }

    /// Record the altar height for a site.
    pub(crate) fn set_altar(&mut self, index: usize, y: i32) {
        if let Some(site) = self.sites.get_mut(index) {
            site.altar_y = Some(y);
        }
    }

    /// Try to activate the site whose altar is at this position.
    /// Returns true only on the first activation of a site.
    pub fn try_activate(&mut self, pos: GridPos) -> bool {
        for site in &mut self.sites {
            if site.altar_pos() == Some(pos) && !site.activated {
                site.activated = true;
                debug!(x = pos.x, y = pos.y, z = pos.z, "ruin activated");
                return true;
            }
        }
        false
    }

    /// Number of activated sites.
    pub fn activated_count(&self) -> usize {
        self.sites.iter().filter(|s| s.activated).count()
    }
}
