use petgraph::algo::dominators::{self, Dominators};
use petgraph::graphmap::DiGraphMap;
use rustc_hash::FxHashMap;

use crate::{cfg, entity::Node, procedure::Procedure};

/// Dominance over the procedure's block graph, computed fresh from the current `cfgpreds`
/// edges. Nothing here is cached on nodes; callers recompute whenever the CFG has changed
/// shape, same as [`crate::collector::Collector`] rediscovers phi/projection lists.
pub struct DominanceInfo {
    doms: Dominators<Node>,
    entry: Node,
}

impl DominanceInfo {
    pub fn compute(proc: &Procedure) -> Self {
        let mut graph = DiGraphMap::<Node, ()>::new();
        let entry = proc.entry();
        graph.add_node(entry);
        for block in cfg::all_blocks(proc) {
            graph.add_node(block);
            for succ in cfg::block_successors(proc, block) {
                graph.add_edge(block, succ, ());
            }
        }
        let doms = dominators::simple_fast(&graph, entry);
        Self { doms, entry }
    }

    /// The immediate dominator of `block`, or `None` for the entry block or for blocks
    /// unreachable from it.
    pub fn idom(&self, block: Node) -> Option<Node> {
        if block == self.entry {
            return None;
        }
        self.doms.immediate_dominator(block)
    }

    /// True if `a` dominates `b` (a block is considered to dominate itself).
    pub fn dominates(&self, a: Node, b: Node) -> bool {
        if a == b {
            return true;
        }
        match self.doms.dominators(b) {
            Some(mut chain) => chain.any(|d| d == a),
            None => false,
        }
    }

    /// Memoized per-query: walks the idom chain of both blocks to their common ancestor.
    pub fn common_dominator(&self, a: Node, b: Node) -> Node {
        let a_chain: Vec<Node> = match self.doms.dominators(a) {
            Some(it) => it.collect(),
            None => return self.entry,
        };
        let b_set: FxHashMap<Node, usize> = match self.doms.dominators(b) {
            Some(it) => it.enumerate().map(|(i, n)| (n, i)).collect(),
            None => return self.entry,
        };
        for n in a_chain {
            if b_set.contains_key(&n) {
                return n;
            }
        }
        self.entry
    }
}
