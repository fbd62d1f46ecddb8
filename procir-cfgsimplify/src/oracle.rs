use procir::{Node, NodeKind, Procedure};

use crate::scratch::Scratch;

/// Decides whether a block is dispensable: safe to fold into whichever block(s) eventually
/// receive its control edges and any join it hosts.
///
/// A block qualifies when it is not the entry block, carries no externally-visible entity,
/// and its only live content is a single unconditional `Jump` — any joins it hosts are fine,
/// [`crate::rewriter`] relocates their operands into the successor rather than requiring the
/// block to be free of them.
///
/// The verdict computed here is a purely local, non-recursive shape check, memoized per block
/// for the lifetime of one [`Scratch`] since the same block is asked about from several
/// different predecessor positions as other blocks are rewritten. Guarding against a
/// dispensable block whose own predecessors loop back to it is
/// [`crate::rewriter::expand_slot`]'s job, not this one's: a block can be correctly,
/// permanently dispensable and still need its *expansion* to stop at a cycle.
///
/// The memoized verdict can also be downgraded to `false` from outside this module: when a
/// join-bearing block's predecessors would otherwise collapse two distinct paths into one
/// (the "both arms of a diamond" case), [`crate::rewriter`] forces one of them non-dispensable
/// via [`Scratch::set_removable`] before expansion runs, so a shape-only "yes" here is not the
/// final word on a block feeding a join.
pub fn is_dispensable(proc: &Procedure, scratch: &mut Scratch, block: Node) -> bool {
    if let Some(verdict) = scratch.removable(block) {
        return verdict;
    }
    let verdict = local_shape_allows_removal(proc, block);
    scratch.set_removable(block, verdict);
    verdict
}

fn local_shape_allows_removal(proc: &Procedure, block: Node) -> bool {
    if block == proc.entry() {
        return false;
    }
    if proc.entity(block).is_some() {
        return false;
    }
    let mut exit = None;
    for (n, data) in proc.iter_nodes() {
        if data.home_block != Some(block) {
            continue;
        }
        match &data.kind {
            NodeKind::Phi(_) => continue,
            NodeKind::Jump => {
                if exit.is_some() {
                    return false;
                }
                exit = Some(n);
            }
            _ => return false,
        }
    }
    exit.is_some()
}
