use std::fmt;

use serde::{Deserialize, Serialize};

/// One of three mutually exclusive world themes. Each phase keeps its
/// own persistent diff of player edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePhase {
    /// Forest theme with water and natural trees.
    Morning,
    /// Desert theme with rougher terrain.
    Noon,
    /// Void theme with ring-patterned land and ruins.
    Night,
}

impl TimePhase {
    /// All phases in cycle order.
    pub const ALL: [TimePhase; 3] = [TimePhase::Morning, TimePhase::Noon, TimePhase::Night];

    /// The phase that follows this one.
    pub fn next(self) -> Self {
        match self {
            TimePhase::Morning => TimePhase::Noon,
            TimePhase::Noon => TimePhase::Night,
            TimePhase::Night => TimePhase::Morning,
        }
    }
}

impl fmt::Display for TimePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimePhase::Morning => "Morning",
            TimePhase::Noon => "Noon",
            TimePhase::Night => "Night",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_cycle_forward() {
        assert_eq!(TimePhase::Morning.next(), TimePhase::Noon);
        assert_eq!(TimePhase::Noon.next(), TimePhase::Night);
        assert_eq!(TimePhase::Night.next(), TimePhase::Morning);
    }

    #[test]
    fn full_cycle_returns_to_start() {
        let mut phase = TimePhase::Morning;
        for _ in 0..3 {
            phase = phase.next();
        }
        assert_eq!(phase, TimePhase::Morning);
    }
}
