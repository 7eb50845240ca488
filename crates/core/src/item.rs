//! Item stacks for container storage.
//!
//! The engine never interprets these beyond moving them in and out of
//! storage slots; item semantics live at the game layer.

use serde::{Deserialize, Serialize};

/// A stack of identical items held in a storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Opaque item identifier assigned by the game layer.
    pub item: u16,
    /// Number of items in the stack (always at least 1).
    pub count: u32,
}

impl ItemStack {
    /// Create a new stack.
    pub fn new(item: u16, count: u32) -> Self {
        Self { item, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_stack_serialization_round_trip() {
        let stack = ItemStack::new(7, 12);
        let serialized = serde_json::to_string(&stack).unwrap();
        let deserialized: ItemStack = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, stack);
    }
}
