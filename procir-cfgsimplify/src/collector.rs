use procir::{Node, NodeKind, Procedure};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Rediscovers, by a single linear scan of the arena, which join nodes live in each block and
/// which projections belong to each branch.
///
/// Nothing here is persisted on nodes between runs: every round of the driver's fixpoint loop
/// starts from a fresh scan, so a prior round's bookkeeping can never go stale once blocks get
/// folded and joins get rewritten out from under it.
pub struct Collector {
    phis: FxHashMap<Node, SmallVec<[Node; 4]>>,
    projections: FxHashMap<Node, SmallVec<[Node; 4]>>,
}

impl Collector {
    pub fn scan(proc: &Procedure) -> Self {
        let mut phis: FxHashMap<Node, SmallVec<[Node; 4]>> = FxHashMap::default();
        let mut projections: FxHashMap<Node, SmallVec<[Node; 4]>> = FxHashMap::default();

        for (n, data) in proc.iter_nodes() {
            match &data.kind {
                NodeKind::Phi(_) => {
                    if let Some(home) = data.home_block {
                        phis.entry(home).or_default().push(n);
                    }
                }
                NodeKind::Proj(proj) => {
                    projections.entry(proc.resolve(proj.parent)).or_default().push(n);
                }
                _ => {}
            }
        }

        Self { phis, projections }
    }

    pub fn phis_of(&self, block: Node) -> &[Node] {
        self.phis.get(&block).map(SmallVec::as_slice).unwrap_or(&[])
    }

    pub fn projections_of(&self, branch: Node) -> &[Node] {
        self.projections.get(&branch).map(SmallVec::as_slice).unwrap_or(&[])
    }
}
