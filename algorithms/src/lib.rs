//! Algorithms bundled with phyloflow.
//!
//! Each algorithm implements [`workflow::Algorithm`] and is a small,
//! deterministic implementation of the textbook method it is named after.
//! Use [`registry::create`] to build one by name.

mod options;

mod taxa_filter;
pub use taxa_filter::TaxaFilter;

mod restriction;
pub use restriction::TaxaRestriction;

mod characters_filter;
pub use characters_filter::CharactersFilter;

/// Pairwise distances between sequences
mod distances;
pub use distances::{JukesCantor, UncorrectedP};

mod neighbor_joining;
pub use neighbor_joining::NeighborJoining;

mod tree_splits;
pub use tree_splits::TreeSplits;

pub mod registry;

use blocks::BlockKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown algorithm: \"{0}\"")]
    UnknownAlgorithm(String),
    #[error("Input data of kind {0} cannot be restricted to a set of taxa")]
    Unrestrictable(BlockKind),
}
