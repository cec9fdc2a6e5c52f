use std::fmt;

/// Symmetric matrix of pairwise distances between taxa.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistancesBlock {
    ntax: usize,
    values: Vec<f64>,
}

impl DistancesBlock {
    /// An `ntax` × `ntax` matrix of zeros.
    pub fn new(ntax: usize) -> Self {
        Self {
            ntax,
            values: vec![0.0; ntax * ntax],
        }
    }

    #[inline]
    pub fn ntax(&self) -> usize {
        self.ntax
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.ntax + j]
    }

    /// Set the distance between `i` and `j` (both directions).
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.ntax + j] = value;
        self.values[j * self.ntax + i] = value;
    }

    /// Matrix restricted to rows and columns `keep`, in that order.
    pub fn select(&self, keep: &[usize]) -> Self {
        let mut out = Self::new(keep.len());
        for (a, &i) in keep.iter().enumerate() {
            for (b, &j) in keep.iter().enumerate().skip(a + 1) {
                out.set(a, b, self.get(i, j));
            }
        }
        out
    }

    /// Iterate over the rows of the matrix.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks(self.ntax.max(1)).take(self.ntax)
    }
}

impl fmt::Display for DistancesBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ntax={}]", self.ntax)?;
        for (i, row) in self.rows().enumerate() {
            write!(f, "{:>4}", i + 1)?;
            for value in row {
                write!(f, " {value:.6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
