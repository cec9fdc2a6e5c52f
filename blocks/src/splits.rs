use std::fmt;

use crate::Error;

/// A weighted bipartition of the taxa.
///
/// Stored as the side that does *not* contain taxon 0, so that equal
/// bipartitions always compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    side: Vec<usize>,
    weight: f64,
}

impl Split {
    /// Create the split `side | rest` over `ntax` taxa (0-based indices).
    pub fn new(side: &[usize], ntax: usize, weight: f64) -> Result<Self, Error> {
        if let Some(&t) = side.iter().find(|&&t| t >= ntax) {
            return Err(Error::TaxonOutOfRange(t, ntax));
        }
        let mut side = side.to_vec();
        side.sort_unstable();
        side.dedup();
        if side.first() == Some(&0) {
            side = (0..ntax).filter(|t| side.binary_search(t).is_err()).collect();
        }
        Ok(Self { side, weight })
    }

    /// The side of the split not containing taxon 0.
    pub fn side(&self) -> &[usize] {
        &self.side
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// A split is trivial if it separates a single taxon from the rest.
    pub fn is_trivial(&self, ntax: usize) -> bool {
        self.side.len() <= 1 || self.side.len() + 1 >= ntax
    }

    pub fn same_bipartition(&self, other: &Split) -> bool {
        self.side == other.side
    }
}

/// Weighted splits over `ntax` taxa.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitsBlock {
    ntax: usize,
    splits: Vec<Split>,
}

impl SplitsBlock {
    pub fn new(ntax: usize) -> Self {
        Self {
            ntax,
            splits: Vec::new(),
        }
    }

    pub fn ntax(&self) -> usize {
        self.ntax
    }

    /// Add `split`, merging its weight into an existing equal bipartition if present.
    pub fn add(&mut self, split: Split) {
        match self.splits.iter_mut().find(|s| s.same_bipartition(&split)) {
            Some(existing) => existing.weight += split.weight,
            None => self.splits.push(split),
        }
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Split> {
        self.splits.iter()
    }
}

impl fmt::Display for SplitsBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ntax={} nsplits={}]", self.ntax, self.splits.len())?;
        for (i, split) in self.splits.iter().enumerate() {
            let side: Vec<String> = split.side.iter().map(|t| (t + 1).to_string()).collect();
            writeln!(f, "{:>4} {:.6} {}", i + 1, split.weight, side.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{Split, SplitsBlock};

    #[test]
    fn test_normalized_side() {
        let a = Split::new(&[0, 1], 5, 1.0).unwrap();
        let b = Split::new(&[4, 2, 3], 5, 0.5).unwrap();
        assert!(a.same_bipartition(&b));
        assert_eq!(&[2, 3, 4], a.side());
        assert!(Split::new(&[7], 5, 1.0).is_err());
    }

    #[test]
    fn test_add_merges_weights() {
        let mut splits = SplitsBlock::new(4);
        splits.add(Split::new(&[2, 3], 4, 1.0).unwrap());
        splits.add(Split::new(&[0, 1], 4, 0.5).unwrap());
        assert_eq!(1, splits.len());
        assert_eq!(1.5, splits.iter().next().unwrap().weight());
    }
}
