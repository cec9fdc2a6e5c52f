use std::fmt;

/// Update state of a connector, and of the data node it produces.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum UpdateState {
    /// Output is stale and nothing is computing it.
    Invalid,
    /// A computation task is running.
    Computing,
    /// Output holds the result of the latest inputs and options.
    Valid,
    /// The latest computation raised an error.
    Failed,
}

impl UpdateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Computing => "COMPUTING",
            Self::Valid => "VALID",
            Self::Failed => "FAILED",
        }
    }

    /// True for states no further work will change without new input.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Valid | Self::Failed)
    }
}

impl fmt::Display for UpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
