use anyhow::{anyhow, bail};

use blocks::{BlockKind, CharactersBlock, CharactersType, DataBlock, DistancesBlock, TaxaBlock};
use workflow::{Algorithm, ComputeError, Progress};

/// Proportion of differing sites between two rows, counting only sites
/// where both states are known.
fn p_distance(chars: &CharactersBlock, a: usize, b: usize) -> f64 {
    let (mut sites, mut diffs) = (0usize, 0usize);
    for (&x, &y) in chars.row(a).iter().zip(chars.row(b)) {
        if chars.is_unknown(x) || chars.is_unknown(y) {
            continue;
        }
        sites += 1;
        if x != y {
            diffs += 1;
        }
    }
    if sites == 0 {
        0.0
    } else {
        diffs as f64 / sites as f64
    }
}

/// Fill an ntax × ntax matrix with `f(i, j)` for every pair, one row at a time.
fn pairwise<F>(
    progress: &Progress,
    taxa: &TaxaBlock,
    chars: &CharactersBlock,
    mut f: F,
) -> Result<DistancesBlock, ComputeError>
where
    F: FnMut(usize, usize) -> anyhow::Result<f64>,
{
    let n = chars.ntax();
    if n != taxa.len() {
        return Err(anyhow!("characters have {n} rows but there are {} taxa", taxa.len()).into());
    }
    progress.set_subtask("computing distances");
    progress.set_maximum(n as u64);
    let mut out = DistancesBlock::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            out.set(i, j, f(i, j)?);
        }
        progress.increment_progress()?;
    }
    Ok(out)
}

fn characters(parent: &DataBlock) -> anyhow::Result<&CharactersBlock> {
    parent
        .as_characters()
        .ok_or_else(|| anyhow!("expected characters, found {}", parent.kind()))
}

/// Uncorrected p-distances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UncorrectedP;

impl Algorithm for UncorrectedP {
    fn name(&self) -> &'static str {
        "UncorrectedP"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Characters
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn compute(
        &self,
        progress: &Progress,
        taxa: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let chars = characters(parent)?;
        let out = pairwise(progress, taxa, chars, |i, j| Ok(p_distance(chars, i, j)))?;
        Ok(DataBlock::Distances(out))
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

/// Jukes-Cantor corrected distances: `d = -3/4 ln(1 - 4/3 p)`.
///
/// Only applicable to nucleotide data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JukesCantor;

impl Algorithm for JukesCantor {
    fn name(&self) -> &'static str {
        "JukesCantor"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Characters
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn is_applicable(&self, _taxa: &TaxaBlock, parent: &DataBlock) -> bool {
        parent
            .as_characters()
            .is_some_and(|c| c.data_type() == CharactersType::Dna)
    }

    fn compute(
        &self,
        progress: &Progress,
        taxa: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let chars = characters(parent)?;
        let out = pairwise(progress, taxa, chars, |i, j| {
            let p = p_distance(chars, i, j);
            let x = 1.0 - 4.0 / 3.0 * p;
            if x <= 0.0 {
                bail!(
                    "{} and {} are too divergent for a Jukes-Cantor correction (p = {p:.4})",
                    taxa.name(i),
                    taxa.name(j)
                );
            }
            Ok(-0.75 * x.ln())
        })?;
        Ok(DataBlock::Distances(out))
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}
