use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};

use procir::{DominanceInfo, Node, Procedure};

use crate::{collector::Collector, oracle, scratch::Scratch};

/// Recursively expands a single control edge through any chain of dispensable predecessor
/// blocks it passes through, to the list of real edges it should become once those blocks are
/// folded away.
///
/// A dead (`Bad`) edge contributes nothing — it is simply dropped. A non-dispensable source
/// bottoms out the recursion and contributes itself unchanged. A chain of several dispensable
/// blocks in a row expands all the way through to the first non-dispensable source.
///
/// `in_flight` records the blocks already being expanded along the current recursion path. A
/// block can be correctly, permanently dispensable and still have one of its own cfgpreds
/// route back to it (a self-loop, or a longer cycle of otherwise-empty jump blocks); reaching
/// such a block a second time on the same path means the edge is a back-edge of that cycle,
/// and it is left unexpanded rather than recursed into again.
pub fn expand_slot(proc: &Procedure, scratch: &mut Scratch, edge: Node) -> SmallVec<[Node; 4]> {
    expand_slot_inner(proc, scratch, edge, &mut FxHashSet::default())
}

fn expand_slot_inner(
    proc: &Procedure,
    scratch: &mut Scratch,
    edge: Node,
    in_flight: &mut FxHashSet<Node>,
) -> SmallVec<[Node; 4]> {
    let edge = proc.resolve(edge);
    if proc.is_bad(edge) {
        return SmallVec::new();
    }
    let Some(src_block) = proc.home_block(edge) else {
        return smallvec![edge];
    };
    if !oracle::is_dispensable(proc, scratch, src_block) || !in_flight.insert(src_block) {
        return smallvec![edge];
    }
    let mut out = SmallVec::new();
    for &pred in proc.cfgpreds(src_block) {
        out.extend(expand_slot_inner(proc, scratch, pred, in_flight));
    }
    in_flight.remove(&src_block);
    out
}

/// Expands a join operand in lockstep with [`expand_slot`] run on the edge it arrived along,
/// so the two always produce the same number of entries.
///
/// When the predecessor block being folded away is itself dispensable, two cases apply to the
/// operand:
///
/// - The operand is itself a join living in that same block: its value varied per one of that
///   block's own incoming edges, so each of its own operands is distributed to the
///   corresponding expanded position, recursively.
/// - Anything else: the value does not depend on which of the removed block's predecessors
///   was taken, and is broadcast unchanged to every position the edge expands into.
///
/// Shares the same cycle handling as [`expand_slot`]: a back-edge of a loop of dispensable
/// blocks is left unexpanded, contributing the operand as-is.
pub fn expand_phi_operand(
    proc: &Procedure,
    scratch: &mut Scratch,
    edge: Node,
    operand: Node,
) -> SmallVec<[Node; 4]> {
    expand_phi_operand_inner(proc, scratch, edge, operand, &mut FxHashSet::default())
}

fn expand_phi_operand_inner(
    proc: &Procedure,
    scratch: &mut Scratch,
    edge: Node,
    operand: Node,
    in_flight: &mut FxHashSet<Node>,
) -> SmallVec<[Node; 4]> {
    let edge = proc.resolve(edge);
    let operand = proc.resolve(operand);
    if proc.is_bad(edge) {
        return SmallVec::new();
    }
    let Some(src_block) = proc.home_block(edge) else {
        return smallvec![operand];
    };
    // Snapshot the ancestor set as it stood before this block joined the path: if the
    // broadcast case below needs to ask `expand_slot` how many positions this same edge
    // expands to, it must ask with the same ancestor context `expand_slot` itself would have
    // had, not one that already (redundantly) contains `src_block`.
    let ancestors_before_this_block = in_flight.clone();
    if !oracle::is_dispensable(proc, scratch, src_block) || !in_flight.insert(src_block) {
        return smallvec![operand];
    }

    let out = if proc.is_phi(operand) && proc.home_block(operand) == Some(src_block) {
        let sub_edges: SmallVec<[Node; 4]> = proc.cfgpreds(src_block).iter().copied().collect();
        let sub_operands: SmallVec<[Node; 4]> = proc.phi_operands(operand).iter().copied().collect();
        debug_assert_eq!(sub_edges.len(), sub_operands.len());
        let mut out = SmallVec::new();
        for (sub_edge, sub_operand) in sub_edges.iter().zip(sub_operands.iter()) {
            out.extend(expand_phi_operand_inner(
                proc, scratch, *sub_edge, *sub_operand, in_flight,
            ));
        }
        out
    } else {
        let count = expand_slot_inner(proc, scratch, edge, &mut { ancestors_before_this_block }).len();
        smallvec![operand; count]
    };
    in_flight.remove(&src_block);
    out
}

/// Enforces the shared-predecessor rule a join-bearing block's predecessors must obey: two
/// distinct cfgpred positions may never both collapse away into expansions that trace back
/// through a common ancestor block, since the join could no longer tell the two paths apart —
/// removing both arms of a diamond merge is the textbook instance.
///
/// Positions are resolved left to right, accumulating the set of ancestor blocks each
/// already-decided position contributes. A later position whose own contribution would
/// re-introduce a block already claimed by an earlier one is forced non-dispensable instead —
/// it keeps its own edge, anchoring the join against the earlier position's elision. This makes
/// the tie-break positional: whichever position is considered first keeps its elision.
///
/// No-op when `block` hosts no joins: without a join there is nothing for two collapsed
/// predecessors to make indistinguishable.
fn forbid_diamond_conflicts(proc: &Procedure, scratch: &mut Scratch, block: Node) {
    let mut claimed: FxHashSet<Node> = FxHashSet::default();
    for &pred in proc.cfgpreds(block) {
        let pred = proc.resolve(pred);
        if proc.is_bad(pred) {
            continue;
        }
        let Some(src) = proc.home_block(pred) else {
            continue;
        };
        if !oracle::is_dispensable(proc, scratch, src) {
            claimed.insert(src);
            continue;
        }
        let contributed: SmallVec<[Node; 4]> = expand_slot(proc, scratch, pred)
            .iter()
            .filter_map(|&edge| proc.home_block(proc.resolve(edge)))
            .collect();
        if contributed.iter().any(|b| claimed.contains(b)) {
            scratch.set_removable(src, false);
            claimed.insert(src);
        } else {
            claimed.extend(contributed);
        }
    }
}

/// Joins that live *inside* a predecessor about to be folded away don't disappear with their
/// block — they either move into `block` (the block they are merging into, if it is their
/// immediate dominator — the only place a new definition can legally stand in for them) or,
/// lacking any reachable use once their own block is gone, are killed outright.
///
/// A relocated join's new operand vector mirrors the broadcast rule [`expand_phi_operand`] uses
/// for every predecessor position other than the one it came from, with its own old operands
/// spliced in at that position — the same shape `block`'s own joins get rewritten into.
fn relocate_or_kill_hosted_phis(
    proc: &mut Procedure,
    scratch: &mut Scratch,
    collector: &Collector,
    dominance: &DominanceInfo,
    block: Node,
    old_preds: &[Node],
) -> Vec<Node> {
    let mut relocated = Vec::new();
    for (k, &pred) in old_preds.iter().enumerate() {
        let pred = proc.resolve(pred);
        if proc.is_bad(pred) {
            continue;
        }
        let Some(p) = proc.home_block(pred) else {
            continue;
        };
        if !oracle::is_dispensable(proc, scratch, p) {
            continue;
        }
        for &phi in collector.phis_of(p) {
            if proc.home_block(phi) != Some(p) {
                continue; // already relocated by an earlier position in this same call
            }
            if dominance.idom(block) != Some(p) {
                proc.kill(phi);
                continue;
            }
            let own_operands: Vec<Node> = proc.phi_operands(phi).to_vec();
            let mut new_ops = Vec::with_capacity(old_preds.len());
            for (i, &p_i) in old_preds.iter().enumerate() {
                if i == k {
                    new_ops.extend(own_operands.iter().copied());
                } else {
                    new_ops.extend(expand_phi_operand(proc, scratch, p_i, phi));
                }
            }
            proc.set_phi_home(phi, block);
            proc.set_phi_operands(phi, new_ops);
            relocated.push(phi);
        }
    }
    relocated
}

/// Outcome of rewriting one block's cfgpreds and joins.
#[derive(Debug, Default, Clone)]
pub struct RewriteOutcome {
    /// `block`'s cfgpreds or joins were actually mutated.
    pub changed: bool,
    /// Joins hosted in a folded-away predecessor that were relocated into `block` rather than
    /// killed, by node id — exactly the candidates the keep-alive cleanup sweep is allowed to
    /// drop, as opposed to `block`'s own pre-existing joins which are never pruned just for
    /// lacking other users.
    pub phis_relocated: Vec<Node>,
}

/// Rebuilds `block`'s cfgpred list, folding away dispensable predecessors, and every one of
/// its joins' operand lists in lockstep. Also relocates or kills joins that were hosted inside
/// a predecessor being folded away.
pub fn rewrite_joins(
    proc: &mut Procedure,
    scratch: &mut Scratch,
    collector: &Collector,
    dominance: &DominanceInfo,
    block: Node,
) -> RewriteOutcome {
    if !collector.phis_of(block).is_empty() {
        forbid_diamond_conflicts(proc, scratch, block);
    }

    let old_preds: Vec<Node> = proc.cfgpreds(block).to_vec();
    let mut new_preds = Vec::new();
    for &p in &old_preds {
        new_preds.extend(expand_slot(proc, scratch, p));
    }

    let unchanged = new_preds.len() == old_preds.len()
        && new_preds
            .iter()
            .zip(old_preds.iter())
            .all(|(a, b)| *a == proc.resolve(*b));
    if unchanged {
        return RewriteOutcome::default();
    }

    for &phi in collector.phis_of(block) {
        let old_ops: Vec<Node> = proc.phi_operands(phi).to_vec();
        debug_assert_eq!(old_ops.len(), old_preds.len());
        let mut new_ops = Vec::new();
        for (p, op) in old_preds.iter().zip(old_ops.iter()) {
            new_ops.extend(expand_phi_operand(proc, scratch, *p, *op));
        }
        debug_assert_eq!(new_ops.len(), new_preds.len());
        proc.set_phi_operands(phi, new_ops);
    }

    let phis_relocated = relocate_or_kill_hosted_phis(proc, scratch, collector, dominance, block, &old_preds);

    proc.set_cfgpreds(block, new_preds);
    RewriteOutcome {
        changed: true,
        phis_relocated,
    }
}
