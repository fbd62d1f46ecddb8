use cranelift_entity::entity_impl;

/// A stable reference to any node owned by a [`crate::Procedure`]'s arena: a block, a jump,
/// a branch, a projection, a join, `Bad`, or `End`.
///
/// Kept as a single entity type (rather than one per node kind) because control edges,
/// join operands, and branch selectors all need to refer to "whatever node produced this
/// value", and the kind is only known once the node is looked up.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node(u32);
entity_impl!(Node, "node");

/// The value-mode of a node's result, analogous to an SSA value's type, but coarse enough
/// to cover everything this pass needs to reason about: control-mode edges, the boolean and
/// integer domains a branch selector may live in, and `None` for nodes that have no result
/// (blocks, `End`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The mode of control edges: jumps, branch projections, and control-mode `Bad`.
    Control,
    Bool,
    Int,
    /// Not a value-producing node.
    None,
}

impl Mode {
    pub const fn is_control(self) -> bool {
        matches!(self, Mode::Control)
    }
}
