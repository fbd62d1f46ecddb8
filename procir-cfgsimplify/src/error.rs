use procir::Node;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A non-entry block with no recorded cfgpreds: either dead code the caller forgot to
    /// drop, or the procedure is still mid-construction and hasn't been pinned down yet.
    #[error("block {0} has no recorded cfgpreds and is not the entry block")]
    UnpinnedBlock(Node),
}
