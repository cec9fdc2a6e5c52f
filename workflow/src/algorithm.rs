use blocks::{BlockKind, DataBlock, TaxaBlock};

use crate::progress::{Cancelled, Progress};

/// Error returned from [`Algorithm::compute`].
///
/// Cancellation and failure are distinct kinds.
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("computation was cancelled")]
    Cancelled,
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl From<Cancelled> for ComputeError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    #[error("{0} has no option named \"{1}\"")]
    Unknown(&'static str, String),
    #[error("Invalid value \"{value}\" for option \"{name}\": {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

impl OptionError {
    pub fn invalid(name: &str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            name: name.to_owned(),
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

/// A transformation deriving one data block from a parent block.
///
/// Implementations are held by a connector and cloned into each computation
/// task, so `compute` always sees the options as they were when the task was
/// launched. Options are exposed as strings by name; changing them through the
/// owning workflow invalidates the connector.
pub trait Algorithm: Send + Sync + 'static {
    /// Name of the algorithm. Two connectors running algorithms with the same
    /// name are considered the same step when reusing paths.
    fn name(&self) -> &'static str;

    /// Kind of block consumed.
    fn from_kind(&self) -> BlockKind;

    /// Kind of block produced.
    fn to_kind(&self) -> BlockKind;

    /// A filter produces the same kind of block it consumes.
    fn is_filter(&self) -> bool {
        self.from_kind() == self.to_kind()
    }

    /// Whether this algorithm can run on the given input.
    fn is_applicable(&self, _taxa: &TaxaBlock, _parent: &DataBlock) -> bool {
        true
    }

    /// Compute the child block. Long computations should poll `progress`
    /// regularly and propagate [`Cancelled`] with `?`.
    fn compute(
        &self,
        progress: &Progress,
        taxa: &TaxaBlock,
        parent: &DataBlock,
    ) -> Result<DataBlock, ComputeError>;

    /// Current option values, by name.
    fn options(&self) -> Vec<(&'static str, String)> {
        Vec::with_capacity(0)
    }

    /// Set option `name` from its string representation.
    fn set_option(&mut self, name: &str, _value: &str) -> Result<(), OptionError> {
        Err(OptionError::Unknown(self.name(), name.to_owned()))
    }

    /// Copy of this algorithm, including its options.
    fn box_clone(&self) -> Box<dyn Algorithm>;
}

impl std::fmt::Debug for dyn Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.name())
            .field("options", &self.options())
            .finish()
    }
}
