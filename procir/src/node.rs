use smallvec::SmallVec;

use crate::{entity::Node, symbol::Symbol};

/// A basic block. Its only operand vector is `cfgpreds`: one control edge per incoming
/// edge, in a fixed order that every join node in this block indexes into.
#[derive(Debug, Clone, Default)]
pub struct BlockData {
    pub cfgpreds: Vec<Node>,
    /// An external label or address-taken marker. Blocks with an entity are never folded
    /// away, since code outside this procedure may jump to them directly.
    pub entity: Option<Symbol>,
}

/// Identifies which outgoing case of a multi-way branch a projection represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseLabel {
    Default,
    Value(u32),
}

#[derive(Debug, Clone)]
pub struct BranchData {
    pub selector: Node,
    /// A boolean selector makes this a two-way conditional; anything else is a switch.
    pub selector_is_boolean: bool,
}

#[derive(Debug, Clone)]
pub struct ProjData {
    /// The multi-result branch this projection picks an outcome of.
    pub parent: Node,
    pub case: CaseLabel,
}

#[derive(Debug, Clone)]
pub struct PhiData {
    /// `operands.len()` must equal `cfgpreds(home_block).len()` whenever the IR is
    /// consistent; operand `i` flows in along cfgpred `i`.
    pub operands: Vec<Node>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Block(BlockData),
    /// The procedure-global sink. Pins everything in `keepalive` against removal.
    End { keepalive: Vec<Node> },
    /// Single-successor unconditional control transfer.
    Jump,
    /// A control transfer through a computed, statically-unknown target. Never dispensable,
    /// and never removable as a block (we can't prove where it's reached from).
    IJmp,
    Branch(BranchData),
    Proj(ProjData),
    Phi(PhiData),
    /// Sentinel for a dead control edge or a dead value of a given mode.
    Bad,
    /// An opaque computation: anything that isn't control flow or a join. `constant` is
    /// populated when the value is statically known, for the branch folder's selector
    /// lookups; everything about instruction-level semantics beyond that is out of scope.
    Value { constant: Option<i64> },
    /// A forwarding tombstone left behind by [`crate::Procedure::replace`] and
    /// [`crate::Procedure::kill`]. [`crate::Procedure::resolve`] follows these transparently;
    /// no other code should match on this variant directly.
    Alias(Node),
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub mode: crate::entity::Mode,
    pub home_block: Option<Node>,
    pub kind: NodeKind,
}

pub type CaseList = SmallVec<[CaseLabel; 4]>;
