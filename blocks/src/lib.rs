//! The closed set of data blocks that flow through a phyloflow workflow.
//!
//! Blocks are plain values. Once a block has been published by the engine it is
//! shared behind an `Arc` and never mutated again; recomputation replaces it wholesale.

mod kind;
pub use kind::BlockKind;

mod taxa;
pub use taxa::TaxaBlock;

mod characters;
pub use characters::{CharactersBlock, CharactersType};

mod distances;
pub use distances::DistancesBlock;

/// Phylogenetic trees stored as node arenas
mod trees;
pub use trees::{PhyloTree, TreeEdge, TreesBlock};

mod splits;
pub use splits::{Split, SplitsBlock};

mod network;
pub use network::NetworkBlock;

mod block;
pub use block::DataBlock;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Taxon name appears more than once: \"{0}\"")]
    DuplicateTaxon(String),
    #[error("Taxon not found: \"{0}\"")]
    TaxonNotFound(String),
    #[error("Row {row} has {found} characters, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown characters data type: \"{0}\"")]
    UnknownDataType(String),
    #[error("Unknown block kind: \"{0}\"")]
    UnknownKind(String),
    #[error("Split side references taxon {0}, but block has only {1} taxa")]
    TaxonOutOfRange(usize, usize),
}
