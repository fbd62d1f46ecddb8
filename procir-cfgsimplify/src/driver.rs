use rustc_hash::FxHashSet;

use procir::{postorder_blocks, DominanceInfo, Node, NodeKind, Procedure};

use crate::{
    branch_folder::{self, ConstantQuery, DefaultConstantQuery},
    collector::Collector,
    config::Config,
    debug_invariants,
    error::Error,
    oracle,
    rewriter,
    scratch::Scratch,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    pub iterations: usize,
    pub branches_folded: usize,
    pub edges_killed: usize,
    pub blocks_merged: usize,
    /// Joins that lived inside a folded-away predecessor and were relocated into its
    /// successor rather than killed (its predecessor wasn't the successor's immediate
    /// dominator).
    pub joins_relocated: usize,
    /// Relocated joins later found to have no real user and dropped from the keep-alive list.
    pub joins_pruned: usize,
}

fn validate(proc: &Procedure) -> Result<(), Error> {
    for block in procir::all_blocks(proc) {
        if block == proc.entry() {
            continue;
        }
        if proc.cfgpreds(block).is_empty() {
            return Err(Error::UnpinnedBlock(block));
        }
    }
    Ok(())
}

/// True if some node other than `node` itself, and other than `End`, still references it —
/// as a join operand or a branch selector. `End`'s own keep-alive list doesn't count: a join
/// kept alive only by `End` with no other user is exactly what keep-alive cleanup is for.
fn has_real_user(proc: &Procedure, node: Node) -> bool {
    let node = proc.resolve(node);
    for (n, data) in proc.iter_nodes() {
        if n == node {
            continue;
        }
        let references = match &data.kind {
            NodeKind::Phi(p) => p.operands.iter().any(|&o| proc.resolve(o) == node),
            NodeKind::Branch(b) => proc.resolve(b.selector) == node,
            _ => false,
        };
        if references {
            return true;
        }
    }
    false
}

/// Drops joins from `End`'s keep-alive list that were relocated by a Phase B move this round
/// and, after the move, have no real user left — only `End` itself still referenced them.
///
/// Scoped to exactly the nodes Phase B relocated, not every keep-alive entry: a block's own
/// pre-existing join is routinely the procedure's entire observable result with no other
/// in-graph user, and auditing it the same way would strip it out too.
fn prune_dead_relocated_joins(proc: &mut Procedure, relocated_this_round: &FxHashSet<Node>) -> usize {
    let keepalive: Vec<Node> = proc.keepalive().to_vec();
    let mut kept = Vec::with_capacity(keepalive.len());
    let mut pruned = 0usize;
    for entry in keepalive {
        let resolved = proc.resolve(entry);
        if relocated_this_round.contains(&resolved) && proc.is_phi(resolved) && !has_real_user(proc, resolved) {
            pruned += 1;
            continue;
        }
        kept.push(entry);
    }
    if pruned > 0 {
        proc.set_keepalive(kept);
    }
    pruned
}

/// Runs the control-flow simplification pass to a fixpoint: alternately folding branches with
/// statically-decidable selectors to unconditional jumps, then collapsing dispensable
/// (empty, jump-only) blocks into whichever join-bearing blocks their control edges reach.
///
/// `query` supplies the constant-value answers the branch folder needs.
pub fn run(proc: &mut Procedure, config: &Config, query: &dyn ConstantQuery) -> Result<Stats, Error> {
    validate(proc)?;
    let mut stats = Stats::default();

    loop {
        let mut changed = false;
        let mut relocated_this_round: FxHashSet<Node> = FxHashSet::default();

        let collector = Collector::scan(proc);
        let fold_stats = branch_folder::fold_branches(proc, &collector, query);
        stats.branches_folded += fold_stats.folded;
        stats.edges_killed += fold_stats.edges_killed;
        changed |= fold_stats.folded > 0;

        let collector = Collector::scan(proc);
        let dominance = DominanceInfo::compute(proc);
        let mut scratch = Scratch::acquire();
        let mut merged = 0usize;
        for block in postorder_blocks(proc) {
            if block == proc.entry() || !proc.is_block(block) {
                continue;
            }
            if oracle::is_dispensable(proc, &mut scratch, block) {
                continue;
            }
            let outcome = rewriter::rewrite_joins(proc, &mut scratch, &collector, &dominance, block);
            if outcome.changed {
                merged += 1;
            }
            if !outcome.phis_relocated.is_empty() {
                stats.joins_relocated += outcome.phis_relocated.len();
                relocated_this_round.extend(outcome.phis_relocated);
            }
        }
        stats.blocks_merged += merged;
        changed |= merged > 0;

        if !relocated_this_round.is_empty() {
            stats.joins_pruned += prune_dead_relocated_joins(proc, &relocated_this_round);
        }

        if config.check_invariants() {
            let collector = Collector::scan(proc);
            debug_invariants::check(proc, &collector);
        }

        if !changed {
            break;
        }
        stats.iterations += 1;
        if stats.iterations >= config.max_iterations() {
            log::warn!(
                "cfgsimplify: stopping after {} rounds without reaching a fixpoint",
                stats.iterations
            );
            break;
        }
    }

    Ok(stats)
}

/// Convenience entry point using [`DefaultConstantQuery`].
pub fn simplify(proc: &mut Procedure, config: &Config) -> Result<Stats, Error> {
    run(proc, config, &DefaultConstantQuery)
}
