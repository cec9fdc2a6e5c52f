use std::fmt;

use util::HashMap;

use crate::Error;

/// An ordered set of taxon names.
///
/// Every taxon also remembers its index in the *input* taxa block it was
/// derived from, so that blocks aligned with the input taxa can be restricted
/// to a filtered set without consulting the input block again.
#[derive(Debug, Clone, Default)]
pub struct TaxaBlock {
    names: Vec<String>,
    origins: Vec<usize>,
    index: HashMap<String, usize>,
}

impl PartialEq for TaxaBlock {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.origins == other.origins
    }
}

impl TaxaBlock {
    /// Create an input taxa block; origins are the identity.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self, Error> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let origins = (0..names.len()).collect();
        Self::with_origins(names, origins)
    }

    fn with_origins(names: Vec<String>, origins: Vec<usize>) -> Result<Self, Error> {
        debug_assert_eq!(names.len(), origins.len());
        let mut index = util::map_with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(Error::DuplicateTaxon(name.clone()));
            }
        }
        Ok(Self {
            names,
            origins,
            index,
        })
    }

    /// Number of taxa.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the taxon at (0-based) index `i`.
    #[inline]
    pub fn name(&self, i: usize) -> &str {
        &self.names[i]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of taxon `i` in the input taxa block.
    #[inline]
    pub fn origin(&self, i: usize) -> usize {
        self.origins[i]
    }

    pub fn origins(&self) -> &[usize] {
        &self.origins
    }

    /// 0-based index of the taxon called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Return a new block containing only the taxa at `keep` (0-based, in order).
    pub fn restrict(&self, keep: &[usize]) -> Self {
        let names: Vec<String> = keep.iter().map(|&i| self.names[i].clone()).collect();
        let origins = keep.iter().map(|&i| self.origins[i]).collect();
        // names were unique before, so they're unique after:
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            origins,
            index,
        }
    }
}

impl fmt::Display for TaxaBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names.iter().enumerate() {
            writeln!(f, "{:>4} {name}", i + 1)?;
        }
        Ok(())
    }
}
