use cranelift_entity::SecondaryMap;
use procir::Node;

/// Per-block memoization for the dispensability oracle, scoped to a single pass round.
///
/// Acquired fresh at the start of each fixpoint round in [`crate::driver::run`]: a block's
/// dispensability can change between rounds (folding a branch can turn a block that used to
/// carry a `Branch` into a jump-only one), so nothing here is allowed to outlive one round.
pub struct Scratch {
    removable: SecondaryMap<Node, Option<bool>>,
}

impl Scratch {
    pub fn acquire() -> Self {
        Self {
            removable: SecondaryMap::new(),
        }
    }

    pub fn removable(&self, block: Node) -> Option<bool> {
        self.removable[block]
    }

    pub fn set_removable(&mut self, block: Node, value: bool) {
        self.removable[block] = Some(value);
    }
}
