use std::fmt;
use std::str::FromStr;

use crate::Error;

pub const DEFAULT_MISSING: u8 = b'?';
pub const DEFAULT_GAP: u8 = b'-';

/// Alphabet of a characters matrix.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CharactersType {
    Dna,
    Protein,
    Standard,
}

impl CharactersType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dna => "dna",
            Self::Protein => "protein",
            Self::Standard => "standard",
        }
    }

    /// Symbols that count as a real state (anything else is treated as ambiguous).
    fn is_state(&self, c: u8) -> bool {
        match self {
            Self::Dna => matches!(c, b'A' | b'C' | b'G' | b'T' | b'U'),
            Self::Protein => c.is_ascii_uppercase() && !matches!(c, b'B' | b'J' | b'X' | b'Z'),
            Self::Standard => c.is_ascii_digit(),
        }
    }
}

impl fmt::Display for CharactersType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharactersType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dna" | "nucleotide" => Ok(Self::Dna),
            "protein" => Ok(Self::Protein),
            "standard" => Ok(Self::Standard),
            _ => Err(Error::UnknownDataType(s.to_owned())),
        }
    }
}

/// A taxa × sites matrix of character states. Row `i` belongs to taxon `i`
/// of the taxa block this matrix is aligned with.
#[derive(Debug, Clone, PartialEq)]
pub struct CharactersBlock {
    data_type: CharactersType,
    missing: u8,
    gap: u8,
    rows: Vec<Vec<u8>>,
}

impl CharactersBlock {
    /// Create a new matrix. All rows must have the same length.
    /// Sequences are upper-cased.
    pub fn new<S: AsRef<str>>(
        data_type: CharactersType,
        rows: impl IntoIterator<Item = S>,
    ) -> Result<Self, Error> {
        let rows: Vec<Vec<u8>> = rows
            .into_iter()
            .map(|row| row.as_ref().bytes().map(|b| b.to_ascii_uppercase()).collect())
            .collect();
        if let Some(first) = rows.first() {
            let expected = first.len();
            for (row, seq) in rows.iter().enumerate() {
                if seq.len() != expected {
                    return Err(Error::RaggedMatrix {
                        row,
                        expected,
                        found: seq.len(),
                    });
                }
            }
        }
        Ok(Self {
            data_type,
            missing: DEFAULT_MISSING,
            gap: DEFAULT_GAP,
            rows,
        })
    }

    pub fn empty(data_type: CharactersType) -> Self {
        Self {
            data_type,
            missing: DEFAULT_MISSING,
            gap: DEFAULT_GAP,
            rows: Vec::with_capacity(0),
        }
    }

    #[inline]
    pub fn data_type(&self) -> CharactersType {
        self.data_type
    }

    #[inline]
    pub fn missing(&self) -> u8 {
        self.missing
    }

    #[inline]
    pub fn gap(&self) -> u8 {
        self.gap
    }

    /// Number of rows (taxa).
    #[inline]
    pub fn ntax(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (sites).
    #[inline]
    pub fn nchar(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn row(&self, t: usize) -> &[u8] {
        &self.rows[t]
    }

    #[inline]
    pub fn state(&self, t: usize, c: usize) -> u8 {
        self.rows[t][c]
    }

    /// True if `state` is a gap, missing, or ambiguous symbol.
    #[inline]
    pub fn is_unknown(&self, state: u8) -> bool {
        state == self.gap || state == self.missing || !self.data_type.is_state(state)
    }

    /// True if any row has a gap in column `c`.
    pub fn has_gap(&self, c: usize) -> bool {
        self.rows.iter().any(|row| row[c] == self.gap)
    }

    /// True if every known state in column `c` is the same.
    pub fn is_constant(&self, c: usize) -> bool {
        let mut known = self
            .rows
            .iter()
            .map(|row| row[c])
            .filter(|&s| !self.is_unknown(s));
        match known.next() {
            Some(first) => known.all(|s| s == first),
            None => true,
        }
    }

    /// Matrix containing only rows `keep`, in that order.
    pub fn select_rows(&self, keep: &[usize]) -> Self {
        Self {
            rows: keep.iter().map(|&t| self.rows[t].clone()).collect(),
            ..self.clone_header()
        }
    }

    /// Matrix containing only columns `keep`, in that order.
    pub fn select_columns(&self, keep: &[usize]) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&c| row[c]).collect())
                .collect(),
            ..self.clone_header()
        }
    }

    fn clone_header(&self) -> Self {
        Self {
            data_type: self.data_type,
            missing: self.missing,
            gap: self.gap,
            rows: Vec::with_capacity(0),
        }
    }
}

impl fmt::Display for CharactersBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{} ntax={} nchar={}]",
            self.data_type,
            self.ntax(),
            self.nchar()
        )?;
        for (i, row) in self.rows.iter().enumerate() {
            writeln!(f, "{:>4} {}", i + 1, String::from_utf8_lossy(row))?;
        }
        Ok(())
    }
}
