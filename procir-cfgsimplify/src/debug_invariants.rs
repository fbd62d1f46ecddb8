use procir::{NodeKind, Procedure};

use crate::collector::Collector;

/// Checks the arity invariant: every join's operand count matches its home block's cfgpred
/// count.
///
/// Gated behind [`crate::config::Config::check_invariants`] rather than asserted
/// unconditionally — walking every join on every round is wasted work once a caller trusts
/// the rewrite to be correct. Left on by default in debug builds.
pub fn check(proc: &Procedure, collector: &Collector) {
    for (block, data) in proc.iter_nodes() {
        if !matches!(data.kind, NodeKind::Block(_)) {
            continue;
        }
        let pred_count = proc.cfgpreds(block).len();
        for &phi in collector.phis_of(block) {
            let op_count = proc.phi_operands(phi).len();
            assert_eq!(
                op_count, pred_count,
                "join {phi} in block {block} has {op_count} operands but block has {pred_count} cfgpreds",
            );
        }
    }
}
