use cranelift_entity::PrimaryMap;
use rustc_hash::FxHashMap;

use crate::{
    entity::{Mode, Node},
    node::{BlockData, BranchData, CaseLabel, NodeData, NodeKind, PhiData, ProjData},
    symbol::Symbol,
};

/// A single procedure: an arena of nodes, plus the two nodes every procedure is pinned
/// around (`entry`, the unique entry block, and `end`, the global sink).
///
/// Node identity is stable for the lifetime of the procedure: removing a node never shifts
/// anyone else's [`Node`]. "Deleting" a node instead turns it into an [`NodeKind::Alias`]
/// (see [`Procedure::replace`] and [`Procedure::kill`]), which every accessor here resolves
/// through transparently.
#[derive(Debug, Clone)]
pub struct Procedure {
    name: Symbol,
    nodes: PrimaryMap<Node, NodeData>,
    entry: Node,
    end: Node,
    /// One canonical `Bad` node per mode, so repeated kills don't litter the arena with
    /// redundant sentinels.
    bad_cache: FxHashMap<Mode, Node>,
}

impl Procedure {
    pub fn new(name: impl Into<Symbol>) -> Self {
        let mut nodes = PrimaryMap::new();
        let entry = nodes.push(NodeData {
            mode: Mode::None,
            home_block: None,
            kind: NodeKind::Block(BlockData::default()),
        });
        let end = nodes.push(NodeData {
            mode: Mode::None,
            home_block: None,
            kind: NodeKind::End {
                keepalive: Vec::new(),
            },
        });
        Self {
            name: name.into(),
            nodes,
            entry,
            end,
            bad_cache: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn entry(&self) -> Node {
        self.entry
    }

    pub fn end(&self) -> Node {
        self.end
    }

    fn push(&mut self, mode: Mode, home_block: Option<Node>, kind: NodeKind) -> Node {
        self.nodes.push(NodeData {
            mode,
            home_block,
            kind,
        })
    }

    pub fn new_block(&mut self) -> Node {
        self.push(Mode::None, None, NodeKind::Block(BlockData::default()))
    }

    pub fn new_jump(&mut self, home_block: Node) -> Node {
        debug_assert!(self.is_block(home_block), "{home_block} is not a block");
        self.push(Mode::Control, Some(home_block), NodeKind::Jump)
    }

    pub fn new_ijmp(&mut self, home_block: Node) -> Node {
        debug_assert!(self.is_block(home_block), "{home_block} is not a block");
        self.push(Mode::Control, Some(home_block), NodeKind::IJmp)
    }

    pub fn new_branch(&mut self, home_block: Node, selector: Node, selector_is_boolean: bool) -> Node {
        debug_assert!(self.is_block(home_block), "{home_block} is not a block");
        self.push(
            Mode::None,
            Some(home_block),
            NodeKind::Branch(BranchData {
                selector,
                selector_is_boolean,
            }),
        )
    }

    pub fn new_projection(&mut self, home_block: Node, parent: Node, case: CaseLabel) -> Node {
        debug_assert!(self.is_block(home_block), "{home_block} is not a block");
        self.push(
            Mode::Control,
            Some(home_block),
            NodeKind::Proj(ProjData { parent, case }),
        )
    }

    pub fn new_phi(&mut self, home_block: Node, mode: Mode, operands: Vec<Node>) -> Node {
        debug_assert!(self.is_block(home_block), "{home_block} is not a block");
        self.push(mode, Some(home_block), NodeKind::Phi(PhiData { operands }))
    }

    pub fn new_value(&mut self, home_block: Node, mode: Mode, constant: Option<i64>) -> Node {
        debug_assert!(self.is_block(home_block), "{home_block} is not a block");
        self.push(mode, Some(home_block), NodeKind::Value { constant })
    }

    /// Returns the canonical `Bad` sentinel for `mode`, creating it on first use.
    pub fn bad(&mut self, mode: Mode) -> Node {
        if let Some(&n) = self.bad_cache.get(&mode) {
            return n;
        }
        let n = self.push(mode, None, NodeKind::Bad);
        self.bad_cache.insert(mode, n);
        n
    }

    pub fn push_keepalive(&mut self, value: Node) {
        match &mut self.nodes[self.end].kind {
            NodeKind::End { keepalive } => keepalive.push(value),
            _ => unreachable!("end node is always End"),
        }
    }

    pub fn keepalive(&self) -> &[Node] {
        match &self.nodes[self.end].kind {
            NodeKind::End { keepalive } => keepalive,
            _ => unreachable!("end node is always End"),
        }
    }

    pub fn set_keepalive(&mut self, new: Vec<Node>) {
        match &mut self.nodes[self.end].kind {
            NodeKind::End { keepalive } => *keepalive = new,
            _ => unreachable!("end node is always End"),
        }
    }

    pub fn set_entity(&mut self, block: Node, entity: Symbol) {
        self.block_mut(block).entity = Some(entity);
    }

    pub fn entity(&self, block: Node) -> Option<&Symbol> {
        self.block(block).entity.as_ref()
    }

    pub fn is_block(&self, n: Node) -> bool {
        matches!(self.nodes[n].kind, NodeKind::Block(_))
    }

    pub fn is_end(&self, n: Node) -> bool {
        n == self.end
    }

    pub fn is_bad(&self, n: Node) -> bool {
        matches!(self.nodes[self.resolve(n)].kind, NodeKind::Bad)
    }

    pub fn home_block(&self, n: Node) -> Option<Node> {
        self.nodes[n].home_block
    }

    pub fn mode(&self, n: Node) -> Mode {
        self.nodes[n].mode
    }

    pub fn kind(&self, n: Node) -> &NodeKind {
        &self.nodes[n].kind
    }

    pub fn block(&self, n: Node) -> &BlockData {
        match &self.nodes[n].kind {
            NodeKind::Block(b) => b,
            other => panic!("{n} is not a block: {other:?}"),
        }
    }

    pub fn block_mut(&mut self, n: Node) -> &mut BlockData {
        match &mut self.nodes[n].kind {
            NodeKind::Block(b) => b,
            other => panic!("{n} is not a block: {other:?}"),
        }
    }

    pub fn cfgpreds(&self, block: Node) -> &[Node] {
        &self.block(block).cfgpreds
    }

    pub fn set_cfgpreds(&mut self, block: Node, preds: Vec<Node>) {
        self.block_mut(block).cfgpreds = preds;
    }

    pub fn phi_operands(&self, phi: Node) -> &[Node] {
        match &self.nodes[phi].kind {
            NodeKind::Phi(p) => &p.operands,
            other => panic!("{phi} is not a join node: {other:?}"),
        }
    }

    pub fn set_phi_operands(&mut self, phi: Node, operands: Vec<Node>) {
        match &mut self.nodes[phi].kind {
            NodeKind::Phi(p) => p.operands = operands,
            other => panic!("{phi} is not a join node: {other:?}"),
        }
    }

    pub fn is_phi(&self, n: Node) -> bool {
        matches!(self.nodes[n].kind, NodeKind::Phi(_))
    }

    /// Re-homes a join node into `new_home` (its operand vector is left untouched; the caller
    /// is responsible for rebuilding it to match `new_home`'s arity). Used to relocate a join
    /// that lived in a block being elided into the surviving successor it now belongs to.
    pub fn set_phi_home(&mut self, phi: Node, new_home: Node) {
        debug_assert!(self.is_block(new_home), "{new_home} is not a block");
        match &self.nodes[phi].kind {
            NodeKind::Phi(_) => {}
            other => panic!("{phi} is not a join node: {other:?}"),
        }
        self.nodes[phi].home_block = Some(new_home);
    }

    /// Follows forwarding [`NodeKind::Alias`] chains to the live node a reference now means.
    /// Every read of an operand position (a cfgpred slot, a phi operand, a branch selector)
    /// should go through this first.
    pub fn resolve(&self, mut n: Node) -> Node {
        let mut hops = 0usize;
        while let NodeKind::Alias(target) = self.nodes[n].kind {
            n = target;
            hops += 1;
            debug_assert!(hops < 1_000_000, "alias cycle detected resolving {n}");
        }
        n
    }

    /// Globally rewrites `old` to be `new`: every existing reference to `old`, once resolved,
    /// now observes `new`. Mirrors the "exchange" operation a reverse-use-list IR needs; here
    /// it is just an indirection, since every reference is a stable [`Node`] id rather than a
    /// pointer into a use-list.
    pub fn replace(&mut self, old: Node, new: Node) {
        let new = self.resolve(new);
        debug_assert_ne!(old, new, "cannot alias {old} to itself");
        self.nodes[old].kind = NodeKind::Alias(new);
    }

    /// Kills `n`: all existing references to it, once resolved, observe a `Bad` of its mode.
    pub fn kill(&mut self, n: Node) {
        let mode = self.nodes[n].mode;
        let bad = self.bad(mode);
        self.nodes[n].kind = NodeKind::Alias(bad);
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (Node, &NodeData)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
