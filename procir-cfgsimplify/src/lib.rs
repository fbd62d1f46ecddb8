//! Control-flow simplification over [`procir::Procedure`]: folds statically-decidable
//! multi-way branches to unconditional jumps, then collapses the empty (jump-only) blocks
//! that folding, or the input itself, leaves behind into whichever join-bearing blocks their
//! control edges reach.

mod branch_folder;
mod collector;
mod config;
mod debug_invariants;
mod driver;
mod error;
mod oracle;
mod rewriter;
mod scratch;
#[cfg(test)]
mod tests;

pub use branch_folder::{ConstantQuery, DefaultConstantQuery, FoldStats};
pub use config::Config;
pub use driver::{run, simplify, Stats};
pub use error::Error;
