//! Ids for nodes of the workflow graph.

use std::fmt;

macro_rules! id {
    ($name:ident, $ty:ty, $prefix:literal) => {
        #[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name($ty);

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(val: usize) -> $name {
                Self(val as $ty)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

id!(DataNodeId, u32, "d");
id!(ConnectorId, u32, "c");

/// Any node of the workflow graph: a data node or a connector.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum NodeRef {
    Data(DataNodeId),
    Connector(ConnectorId),
}

impl From<DataNodeId> for NodeRef {
    fn from(id: DataNodeId) -> Self {
        Self::Data(id)
    }
}

impl From<ConnectorId> for NodeRef {
    fn from(id: ConnectorId) -> Self {
        Self::Connector(id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(id) => id.fmt(f),
            Self::Connector(id) => id.fmt(f),
        }
    }
}
