use std::fmt;

use crate::{
    BlockKind, CharactersBlock, CharactersType, DistancesBlock, NetworkBlock, SplitsBlock,
    TaxaBlock, TreesBlock,
};

/// Payload of a data node.
#[derive(Debug, Clone, PartialEq)]
pub enum DataBlock {
    Taxa(TaxaBlock),
    Characters(CharactersBlock),
    Distances(DistancesBlock),
    Trees(TreesBlock),
    Splits(SplitsBlock),
    Network(NetworkBlock),
}

impl DataBlock {
    /// Empty block of the given kind, published in place of a result when
    /// an algorithm is not applicable to its input.
    pub fn empty(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Taxa => Self::Taxa(TaxaBlock::default()),
            BlockKind::Characters => Self::Characters(CharactersBlock::empty(CharactersType::Dna)),
            BlockKind::Distances => Self::Distances(DistancesBlock::default()),
            BlockKind::Trees => Self::Trees(TreesBlock::default()),
            BlockKind::Splits => Self::Splits(SplitsBlock::default()),
            BlockKind::Network => Self::Network(NetworkBlock::default()),
        }
    }

    #[rustfmt::skip]
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Taxa(_)       => BlockKind::Taxa,
            Self::Characters(_) => BlockKind::Characters,
            Self::Distances(_)  => BlockKind::Distances,
            Self::Trees(_)      => BlockKind::Trees,
            Self::Splits(_)     => BlockKind::Splits,
            Self::Network(_)    => BlockKind::Network,
        }
    }

    /// Short human-readable summary, e.g. "Distances (5 taxa)".
    pub fn summary(&self) -> String {
        match self {
            Self::Taxa(b) => format!("Taxa ({} taxa)", b.len()),
            Self::Characters(b) => format!(
                "Characters ({} taxa, {} {} sites)",
                b.ntax(),
                b.nchar(),
                b.data_type()
            ),
            Self::Distances(b) => format!("Distances ({} taxa)", b.ntax()),
            Self::Trees(b) => format!("Trees ({} trees)", b.len()),
            Self::Splits(b) => format!("Splits ({} splits)", b.len()),
            Self::Network(b) => format!("Network ({} nodes)", b.num_nodes()),
        }
    }

    pub fn as_taxa(&self) -> Option<&TaxaBlock> {
        match self {
            Self::Taxa(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_characters(&self) -> Option<&CharactersBlock> {
        match self {
            Self::Characters(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_distances(&self) -> Option<&DistancesBlock> {
        match self {
            Self::Distances(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_trees(&self) -> Option<&TreesBlock> {
        match self {
            Self::Trees(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_splits(&self) -> Option<&SplitsBlock> {
        match self {
            Self::Splits(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_network(&self) -> Option<&NetworkBlock> {
        match self {
            Self::Network(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for DataBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Taxa(b) => b.fmt(f),
            Self::Characters(b) => b.fmt(f),
            Self::Distances(b) => b.fmt(f),
            Self::Trees(b) => b.fmt(f),
            Self::Splits(b) => b.fmt(f),
            Self::Network(b) => b.fmt(f),
        }
    }
}

#[cfg(test)]
mod test {
    use super::DataBlock;
    use crate::{BlockKind, NetworkBlock};

    #[test]
    fn test_empty_blocks_have_requested_kind() {
        for kind in BlockKind::ALL {
            assert_eq!(kind, DataBlock::empty(kind).kind());
        }
    }

    #[test]
    fn test_network_summary() {
        let mut network = NetworkBlock::default();
        let a = network.add_node(Some("a".to_owned()));
        let b = network.add_node(None);
        network.add_edge(a, b, 0.5);
        let block = DataBlock::Network(network);
        assert_eq!("Network (2 nodes)", block.summary());
        assert_eq!(Some("a"), block.as_network().and_then(|n| n.label(a)));
    }
}
