use anyhow::anyhow;

use blocks::{BlockKind, DataBlock, TaxaBlock};
use workflow::{Algorithm, ComputeError, Progress};

use crate::Error;

/// Top filter: restricts input data, whose rows follow the input taxa, to
/// the working taxa.
///
/// Reads the working taxa as its first parent and the input data as its
/// second, and picks rows by each working taxon's origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxaRestriction {
    kind: BlockKind,
}

impl TaxaRestriction {
    pub fn new(kind: BlockKind) -> Result<Self, Error> {
        match kind {
            BlockKind::Characters | BlockKind::Distances => Ok(Self { kind }),
            _ => Err(Error::Unrestrictable(kind)),
        }
    }
}

fn check_rows(taxa: &TaxaBlock, rows: usize) -> anyhow::Result<()> {
    match taxa.origins().iter().position(|&o| o >= rows) {
        Some(i) => Err(anyhow!(
            "taxon {} refers to input row {}, but the input data has {rows} rows",
            taxa.name(i),
            taxa.origin(i) + 1
        )),
        None => Ok(()),
    }
}

impl Algorithm for TaxaRestriction {
    fn name(&self) -> &'static str {
        "TaxaRestriction"
    }

    fn from_kind(&self) -> BlockKind {
        self.kind
    }

    fn to_kind(&self) -> BlockKind {
        self.kind
    }

    fn compute(
        &self,
        _progress: &Progress,
        taxa: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let origins = taxa.origins();
        match parent {
            DataBlock::Characters(chars) => {
                check_rows(taxa, chars.ntax())?;
                Ok(DataBlock::Characters(chars.select_rows(origins)))
            }
            DataBlock::Distances(dist) => {
                check_rows(taxa, dist.ntax())?;
                Ok(DataBlock::Distances(dist.select(origins)))
            }
            other => Err(anyhow!("cannot restrict {} to taxa", other.kind()).into()),
        }
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}
