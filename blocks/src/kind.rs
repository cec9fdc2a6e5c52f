use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Type tag of a [`crate::DataBlock`].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum BlockKind {
    Taxa,
    Characters,
    Distances,
    Trees,
    Splits,
    Network,
}

impl BlockKind {
    pub const ALL: [BlockKind; 6] = [
        Self::Taxa,
        Self::Characters,
        Self::Distances,
        Self::Trees,
        Self::Splits,
        Self::Network,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taxa => "Taxa",
            Self::Characters => "Characters",
            Self::Distances => "Distances",
            Self::Trees => "Trees",
            Self::Splits => "Splits",
            Self::Network => "Network",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownKind(s.to_owned()))
    }
}

#[cfg(test)]
mod test {
    use super::BlockKind;

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!(BlockKind::Distances, "distances".parse().unwrap());
        assert_eq!(BlockKind::Trees, "TREES".parse().unwrap());
        assert!("forest".parse::<BlockKind>().is_err());
    }
}
