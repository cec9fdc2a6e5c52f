use anyhow::anyhow;

use blocks::{BlockKind, DataBlock, TaxaBlock};
use workflow::{Algorithm, ComputeError, OptionError, Progress};

use crate::options::parse_bool;

/// Removes unwanted columns from a characters matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharactersFilter {
    /// drop columns with a gap in any row
    exclude_gaps: bool,
    /// drop columns where all known states agree
    exclude_constant: bool,
}

impl Algorithm for CharactersFilter {
    fn name(&self) -> &'static str {
        "CharactersFilter"
    }

    fn from_kind(&self) -> BlockKind {
        BlockKind::Characters
    }

    fn to_kind(&self) -> BlockKind {
        BlockKind::Characters
    }

    fn compute(
        &self,
        progress: &Progress,
        _taxa: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError> {
        let chars = parent
            .as_characters()
            .ok_or_else(|| anyhow!("expected characters, found {}", parent.kind()))?;
        if !self.exclude_gaps && !self.exclude_constant {
            return Ok(parent.clone());
        }

        progress.set_subtask("filtering columns");
        progress.set_maximum(chars.nchar() as u64);
        let mut keep = Vec::with_capacity(chars.nchar());
        for c in 0..chars.nchar() {
            let drop = (self.exclude_gaps && chars.has_gap(c))
                || (self.exclude_constant && chars.is_constant(c));
            if !drop {
                keep.push(c);
            }
            progress.increment_progress()?;
        }
        log::debug!("kept {} of {} columns", keep.len(), chars.nchar());
        Ok(DataBlock::Characters(chars.select_columns(&keep)))
    }

    fn options(&self) -> Vec<(&'static str, String)> {
        vec![
            ("exclude_gaps", self.exclude_gaps.to_string()),
            ("exclude_constant", self.exclude_constant.to_string()),
        ]
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        match name {
            "exclude_gaps" => self.exclude_gaps = parse_bool(name, value)?,
            "exclude_constant" => self.exclude_constant = parse_bool(name, value)?,
            _ => return Err(OptionError::Unknown(self.name(), name.to_owned())),
        }
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Algorithm> {
        Box::new(self.clone())
    }
}
