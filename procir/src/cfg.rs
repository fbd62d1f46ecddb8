use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::{entity::Node, node::NodeKind, procedure::Procedure};

/// The control successors of a control-mode node: where execution goes from here.
///
/// - A block's successors are its exiting `Jump`/`IJmp`/`Branch` projections' *consumers*,
///   not its own operands, so this only makes sense for nodes that themselves produce a
///   control edge.
/// - A `Jump` or `Proj` has exactly one successor: the block that lists it in `cfgpreds`.
/// - `IJmp` and `Bad` (control mode) are treated as going nowhere statically known.
pub fn successors(proc: &Procedure, n: Node) -> SmallVec<[Node; 2]> {
    let n = proc.resolve(n);
    let mut out = SmallVec::new();
    for (block, data) in proc.iter_nodes() {
        if let NodeKind::Block(b) = &data.kind {
            if b.cfgpreds.iter().any(|&p| proc.resolve(p) == n) {
                out.push(block);
            }
        }
    }
    out
}

/// Blocks reachable from `proc.entry()` by following `cfgpreds` edges forward.
///
/// The pass only ever needs *backward* reachability per block (is this predecessor live),
/// but a forward sweep from the entry is how unreachable blocks are identified for the
/// driver's dead-block bookkeeping.
pub fn reachable_blocks(proc: &Procedure) -> FxHashSet<Node> {
    let mut seen = FxHashSet::default();
    let mut stack = vec![proc.entry()];
    seen.insert(proc.entry());
    while let Some(block) = stack.pop() {
        for (succ, data) in proc.iter_nodes() {
            if let NodeKind::Block(b) = &data.kind {
                if seen.contains(&succ) {
                    continue;
                }
                let reaches = b.cfgpreds.iter().any(|&edge| {
                    proc.home_block(proc.resolve(edge)) == Some(block)
                });
                if reaches {
                    seen.insert(succ);
                    stack.push(succ);
                }
            }
        }
    }
    seen
}

/// All basic blocks in the procedure, entry first, in arena order otherwise.
pub fn all_blocks(proc: &Procedure) -> Vec<Node> {
    let mut blocks: Vec<Node> = proc
        .iter_nodes()
        .filter(|(n, data)| matches!(data.kind, NodeKind::Block(_)) && *n != proc.entry())
        .map(|(n, _)| n)
        .collect();
    blocks.insert(0, proc.entry());
    blocks
}

/// Postorder over the block graph rooted at `proc.entry()`: every successor is visited
/// (finished) before the block that reaches it. The block-merge rewrite in
/// [`crate::rewriter`] relies on this ordering so a predecessor block already folded into
/// its successor is never revisited as though it were still live.
pub fn postorder_blocks(proc: &Procedure) -> Vec<Node> {
    let mut order = Vec::new();
    let mut visited = FxHashSet::default();
    let mut stack = vec![(proc.entry(), false)];
    while let Some((block, expanded)) = stack.pop() {
        if expanded {
            order.push(block);
            continue;
        }
        if !visited.insert(block) {
            continue;
        }
        stack.push((block, true));
        for succ in block_successors(proc, block) {
            if !visited.contains(&succ) {
                stack.push((succ, false));
            }
        }
    }
    order
}

/// The blocks directly reachable from `block`'s exiting control nodes.
pub fn block_successors(proc: &Procedure, block: Node) -> SmallVec<[Node; 4]> {
    let mut out = SmallVec::new();
    for (n, data) in proc.iter_nodes() {
        if data.home_block != Some(block) {
            continue;
        }
        match &data.kind {
            NodeKind::Jump | NodeKind::IJmp => out.extend(successors(proc, n)),
            NodeKind::Branch(_) => {
                for (p, pdata) in proc.iter_nodes() {
                    if let NodeKind::Proj(proj) = &pdata.kind {
                        if proc.resolve(proj.parent) == n {
                            out.extend(successors(proc, p));
                        }
                    }
                }
            }
            _ => {}
        }
    }
    out
}
