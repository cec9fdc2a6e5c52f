use anyhow::{anyhow, bail};

use blocks::{BlockKind, DataBlock, TaxaBlock};
use workflow::{Algorithm, ComputeError, OptionError, Progress};

use crate::options::parse_list;

/// Removes taxa, given by name or 1-based index, from a taxa block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxaFilter {
    exclude: Vec<String>,
}

impl TaxaFilter {
    pub fn excluding<S: Into<String>>(taxa: impl IntoIterator<Item = S>) -> Self {
        Self {
            exclude: taxa.into_iter().map(Into::into).collect(),
        }
    }

    /// 0-based indices of the taxa to keep.
    fn kept(&self, taxa: &TaxaBlock) -> anyhow::Result<Vec<usize>> {
        let mut excluded = vec![false; taxa.len()];
        for token in &self.exclude {
            let i = match token.parse::<usize>() {
                Ok(i) if i >= 1 && i <= taxa.len() => i - 1,
                Ok(i) => bail!("taxon index {i} is out of range 1..={}", taxa.len()),
                Err(_) => taxa
                    .index_of(token)
                    .ok_or_else(|| anyhow!("no taxon named \"{token}\""))?,
            };
            excluded[i] = true;
        }
        Ok((0..taxa.len()).filter(|&i| !excluded[i]).collect())
    }
}

impl Algorithm for TaxaFilter {
    fn name(&self) -> &'static str {
        "TaxaFilter"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Taxa
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Taxa
    }

    fn compute(
        &self,
        _progress: &Progress,
        taxa: &TaxaBlock,
        _parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let keep = self.kept(taxa)?;
        if keep.is_empty() {
            return Err(anyhow!("all taxa are excluded").into());
        }
        if keep.len() < taxa.len() {
            log::debug!("excluding {} of {} taxa", taxa.len() - keep.len(), taxa.len());
        }
        Ok(DataBlock::Taxa(taxa.restrict(&keep)))
    }

    fn options(&self) -> Vec<(&'static str, String)> {
        vec![("exclude", self.exclude.join(","))]
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        match name {
            "exclude" => {
                self.exclude = parse_list(value);
                Ok(())
            }
            _ => Err(OptionError::Unknown(self.name(), name.to_owned())),
        }
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}
