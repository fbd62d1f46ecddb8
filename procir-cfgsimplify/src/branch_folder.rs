use procir::{CaseLabel, Node, NodeKind, Procedure};
use smallvec::SmallVec;

use crate::collector::Collector;

/// A source of statically-known values for branch selectors.
///
/// Kept as a trait object so this pass never has to know how constants are derived elsewhere
/// in a larger pipeline; it only needs an answer to "is this value known, and if so what is
/// it". Instruction-level constant folding itself is out of scope here.
pub trait ConstantQuery {
    fn known_value(&self, proc: &Procedure, value: Node) -> Option<i64>;
}

/// Looks only at a node's own recorded constant, if any. Sufficient for procedures built with
/// literal selectors; a real pipeline would plug in its own constant-propagation analysis.
pub struct DefaultConstantQuery;

impl ConstantQuery for DefaultConstantQuery {
    fn known_value(&self, proc: &Procedure, value: Node) -> Option<i64> {
        match proc.kind(proc.resolve(value)) {
            NodeKind::Value { constant } => *constant,
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FoldStats {
    pub folded: usize,
    pub edges_killed: usize,
}

/// Folds every branch that no longer needs a real decision to an unconditional jump: the
/// winning projection is spliced in as a `Jump` and every other projection is killed, turning
/// it into a dead control edge for the block-merge rewrite to prune.
///
/// Two independent rules drive this, checked in order:
/// - If only one projection remains reachable (every other case was already pruned, e.g. by
///   an earlier round), it must be the one control takes — fold to it unconditionally. This
///   needs no knowledge of the selector's value at all.
/// - Otherwise, if the selector is a statically known constant, pick the projection whose case
///   matches it (falling back to the default), and fold to that one instead.
pub fn fold_branches(proc: &mut Procedure, collector: &Collector, query: &dyn ConstantQuery) -> FoldStats {
    let mut stats = FoldStats::default();

    let branches: Vec<Node> = proc
        .iter_nodes()
        .filter(|(_, data)| matches!(data.kind, NodeKind::Branch(_)))
        .map(|(n, _)| n)
        .collect();

    for branch in branches {
        let branch = proc.resolve(branch);
        let (selector, selector_is_boolean, home_block) = match proc.kind(branch) {
            NodeKind::Branch(b) => (
                proc.resolve(b.selector),
                b.selector_is_boolean,
                proc.home_block(branch),
            ),
            _ => continue,
        };

        let projections: SmallVec<[Node; 4]> = collector.projections_of(branch).iter().copied().collect();
        if projections.is_empty() {
            continue;
        }

        let home_block = home_block.expect("a branch always lives in a block");

        if projections.len() == 1 {
            let jump = proc.new_jump(home_block);
            proc.replace(projections[0], jump);
            stats.folded += 1;
            continue;
        }

        let Some(value) = query.known_value(proc, selector) else {
            continue;
        };

        let winning_label = if selector_is_boolean {
            CaseLabel::Value(if value != 0 { 1 } else { 0 })
        } else {
            CaseLabel::Value(value as u32)
        };

        let winner = projections
            .iter()
            .copied()
            .find(|&p| matches!(proc.kind(p), NodeKind::Proj(proj) if proj.case == winning_label))
            .or_else(|| {
                projections
                    .iter()
                    .copied()
                    .find(|&p| matches!(proc.kind(p), NodeKind::Proj(proj) if proj.case == CaseLabel::Default))
            });
        let Some(winner) = winner else {
            continue;
        };

        let jump = proc.new_jump(home_block);
        proc.replace(winner, jump);
        stats.folded += 1;

        for &proj in &projections {
            if proj != winner {
                proc.kill(proj);
                stats.edges_killed += 1;
            }
        }
    }

    stats
}
