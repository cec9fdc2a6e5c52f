use anyhow::anyhow;

use blocks::{BlockKind, DataBlock, DistancesBlock, PhyloTree, TaxaBlock, TreesBlock};
use workflow::{Algorithm, ComputeError, Progress};

/// Saitou & Nei neighbor joining.
///
/// Produces a single unrooted tree, stored rooted at the node created by the
/// last join. Ties are broken by taking the first pair found, so the result
/// only depends on the input matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborJoining;

impl Algorithm for NeighborJoining {
    fn name(&self) -> &'static str {
        "NeighborJoining"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Distances
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Trees
    }

    fn is_applicable(&self, _taxa: &TaxaBlock, parent: &DataBlock) -> bool {
        parent.as_distances().is_some_and(|d| d.ntax() >= 3)
    }

    fn compute(
        &self,
        progress: &Progress,
        taxa: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let dist = parent
            .as_distances()
            .ok_or_else(|| anyhow!("expected distances, found {}", parent.kind()))?;
        if dist.ntax() != taxa.len() {
            return Err(anyhow!(
                "distance matrix has {} rows but there are {} taxa",
                dist.ntax(),
                taxa.len()
            )
            .into());
        }
        let tree = join(progress, taxa, dist)?;
        Ok(DataBlock::Trees(TreesBlock::new(vec![tree], false)))
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}

fn join(
    progress: &Progress,
    taxa: &TaxaBlock,
    dist: &DistancesBlock,
) -> Result<PhyloTree, ComputeError> {
    let n = dist.ntax();
    let mut tree = PhyloTree::new("NJ");
    // tree node of each active cluster:
    let mut active: Vec<usize> = (0..n).map(|t| tree.add_leaf(t, taxa.name(t))).collect();
    let mut d: Vec<Vec<f64>> = (0..n).map(|i| (0..n).map(|j| dist.get(i, j)).collect()).collect();

    progress.set_subtask("joining neighbors");
    progress.set_maximum(n.saturating_sub(3) as u64);
    while active.len() > 3 {
        let m = active.len();
        let r: Vec<f64> = d.iter().map(|row| row.iter().sum()).collect();

        let (mut bi, mut bj, mut best) = (0, 1, f64::INFINITY);
        for i in 0..m {
            for j in (i + 1)..m {
                let q = (m as f64 - 2.0) * d[i][j] - r[i] - r[j];
                if q < best {
                    (bi, bj, best) = (i, j, q);
                }
            }
        }

        let dij = d[bi][bj];
        let li = 0.5 * dij + (r[bi] - r[bj]) / (2.0 * (m as f64 - 2.0));
        let lj = dij - li;
        let u = tree.add_internal();
        tree.add_edge(u, active[bi], li.max(0.0));
        tree.add_edge(u, active[bj], lj.max(0.0));

        // the new cluster takes bi's slot, bj's slot is dropped:
        for k in 0..m {
            let duk = 0.5 * (d[bi][k] + d[bj][k] - dij);
            d[bi][k] = duk;
            d[k][bi] = duk;
        }
        d[bi][bi] = 0.0;
        d.remove(bj);
        for row in &mut d {
            row.remove(bj);
        }
        active[bi] = u;
        active.remove(bj);

        progress.increment_progress()?;
    }

    let center = tree.add_internal();
    match active[..] {
        [a, b, c] => {
            let la = 0.5 * (d[0][1] + d[0][2] - d[1][2]);
            let lb = d[0][1] - la;
            let lc = d[0][2] - la;
            tree.add_edge(center, a, la.max(0.0));
            tree.add_edge(center, b, lb.max(0.0));
            tree.add_edge(center, c, lc.max(0.0));
        }
        _ => {
            return Err(anyhow!("neighbor joining needs at least 3 taxa, got {n}").into());
        }
    }
    tree.set_root(center);
    Ok(tree)
}
