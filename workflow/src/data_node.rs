use std::sync::Arc;

use blocks::{BlockKind, DataBlock};

use crate::{ConnectorId, DataNodeId};

/// A graph node holding one data block.
///
/// A data node is a passive value holder: it never runs anything itself. It
/// is written only by its producing connector (or, for source nodes, by the
/// workflow on behalf of the user), and each write bumps its version.
#[derive(Debug)]
pub struct DataNode {
    id: DataNodeId,
    kind: BlockKind,
    block: Option<Arc<DataBlock>>,
    version: u64,
    pub(crate) producer: Option<ConnectorId>,
    pub(crate) consumers: Vec<ConnectorId>,
}

impl DataNode {
    pub(crate) fn new(id: DataNodeId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            block: None,
            version: 0,
            producer: None,
            consumers: Vec::with_capacity(2),
        }
    }

    #[inline]
    pub fn id(&self) -> DataNodeId {
        self.id
    }

    /// Kind of block this node holds (fixed for the node's lifetime).
    #[inline]
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Current block, or `None` if nothing has been computed yet.
    pub fn data_block(&self) -> Option<&Arc<DataBlock>> {
        self.block.as_ref()
    }

    /// Content version; incremented each time a new block is installed.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Connector that produces this node, or `None` for a source node.
    #[inline]
    pub fn producer(&self) -> Option<ConnectorId> {
        self.producer
    }

    /// Connectors consuming this node, in registration order.
    pub fn consumers(&self) -> &[ConnectorId] {
        &self.consumers
    }

    pub fn short_description(&self) -> String {
        match &self.block {
            Some(block) => block.summary(),
            None => self.kind.to_string(),
        }
    }

    /// Replace the block wholesale and bump the version.
    pub(crate) fn set_data_block(&mut self, block: Arc<DataBlock>) -> u64 {
        debug_assert_eq!(self.kind, block.kind());
        self.block = Some(block);
        self.version += 1;
        self.version
    }
}
