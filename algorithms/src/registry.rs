//! Lookup of bundled algorithms by name.

use blocks::BlockKind;
use workflow::Algorithm;

use crate::{
    CharactersFilter, Error, JukesCantor, NeighborJoining, TaxaFilter, TaxaRestriction,
    TreeSplits, UncorrectedP,
};

/// Names accepted by [`create`].
pub const NAMES: &[&str] = &[
    "TaxaFilter",
    "CharactersFilter",
    "UncorrectedP",
    "JukesCantor",
    "NeighborJoining",
    "TreeSplits",
];

/// Create the algorithm called `name` (case-insensitive), with default options.
#[rustfmt::skip]
pub fn create(name: &str) -> Result<Box<dyn Algorithm>, Error> {
    let algorithm: Box<dyn Algorithm> = match name.to_ascii_lowercase().as_str() {
        "taxafilter"       => Box::new(TaxaFilter::default()),
        "charactersfilter" => Box::new(CharactersFilter::default()),
        "uncorrectedp"     => Box::new(UncorrectedP),
        "jukescantor"      => Box::new(JukesCantor),
        "neighborjoining"  => Box::new(NeighborJoining),
        "treesplits"       => Box::new(TreeSplits::default()),
        _ => return Err(Error::UnknownAlgorithm(name.to_owned())),
    };
    Ok(algorithm)
}

/// The filter inserted below a node of kind `kind` when a filter is requested
/// and none exists yet.
pub fn default_filter(kind: BlockKind) -> Option<Box<dyn Algorithm>> {
    match kind {
        BlockKind::Taxa => Some(Box::new(TaxaFilter::default())),
        BlockKind::Characters => Some(Box::new(CharactersFilter::default())),
        _ => None,
    }
}

/// The top filter restricting input data of kind `kind` to the working taxa.
pub fn top_filter(kind: BlockKind) -> Result<Box<dyn Algorithm>, Error> {
    Ok(Box::new(TaxaRestriction::new(kind)?))
}
