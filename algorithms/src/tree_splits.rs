use anyhow::anyhow;

use blocks::{BlockKind, DataBlock, Split, SplitsBlock, TaxaBlock};
use workflow::{Algorithm, ComputeError, OptionError, Progress};

use crate::options::parse_index;

/// The splits displayed by one tree of a trees block, weighted by edge length.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSplits {
    /// 1-based index of the tree to use
    which: usize,
}

impl Default for TreeSplits {
    fn default() -> Self {
        Self { which: 1 }
    }
}

impl Algorithm for TreeSplits {
    fn name(&self) -> &'static str {
        "TreeSplits"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Trees
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Splits
    }

    fn is_applicable(&self, _taxa: &TaxaBlock, parent: &DataBlock) -> bool {
        parent.as_trees().is_some_and(|t| !t.is_empty())
    }

    fn compute(
        &self,
        _progress: &Progress,
        taxa: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let trees = parent
            .as_trees()
            .ok_or_else(|| anyhow!("expected trees, found {}", parent.kind()))?;
        let tree = trees.get(self.which - 1).ok_or_else(|| {
            anyhow!("there is no tree {} (found {} trees)", self.which, trees.len())
        })?;

        let ntax = taxa.len();
        let mut splits = SplitsBlock::new(ntax);
        for edge in tree.edges() {
            let side = tree.taxa_below(edge.target);
            if side.is_empty() || side.len() >= ntax {
                continue;
            }
            let split = Split::new(&side, ntax, edge.weight).map_err(anyhow::Error::from)?;
            splits.add(split);
        }
        Ok(DataBlock::Splits(splits))
    }

    fn options(&self) -> Vec<(&'static str, String)> {
        vec![("which", self.which.to_string())]
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        match name {
            "which" => {
                self.which = parse_index(name, value)?;
                Ok(())
            }
            _ => Err(OptionError::Unknown(self.name(), name.to_owned())),
        }
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}
