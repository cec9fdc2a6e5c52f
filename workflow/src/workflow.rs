use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

use blocks::DataBlock;
use util::IdVec;

use crate::event::EventBus;
use crate::task::TaskDone;
use crate::{
    Connector, ConnectorId, DataNode, DataNodeId, EngineContext, Error, NodeRef, UpdateState,
    WorkflowEvent,
};

/// The distinguished nodes created by [`Workflow::setup_input`].
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Roots {
    pub input_taxa: Option<DataNodeId>,
    pub working_taxa: Option<DataNodeId>,
    pub input_data: Option<DataNodeId>,
    pub working_data: Option<DataNodeId>,
    pub taxa_filter: Option<ConnectorId>,
    pub top_filter: Option<ConnectorId>,
}

/// Owner of the workflow graph.
///
/// All graph reads and writes go through `&self`/`&mut self`, so a single
/// owner (typically the UI or command thread) is the only writer. Computations
/// run on the context's worker pool and report back over a channel; their
/// results are applied when the owner calls [`Workflow::process_pending`] or
/// [`Workflow::wait_until_idle`].
pub struct Workflow {
    pub(crate) ctx: EngineContext,
    pub(crate) data_nodes: IdVec<DataNodeId, DataNode>,
    pub(crate) connectors: IdVec<ConnectorId, Connector>,
    pub(crate) roots: Roots,
    /// incremented by `clear()`; results from older epochs are dropped
    pub(crate) epoch: u64,
    /// number of tasks of the current epoch that have not reported back
    pub(crate) running: usize,
    pub(crate) done_tx: Sender<TaskDone>,
    done_rx: Receiver<TaskDone>,
    pub(crate) events: EventBus,
}

impl Workflow {
    /// Create an empty workflow that computes on `ctx`'s worker pool.
    pub fn new(ctx: EngineContext) -> Self {
        let (done_tx, done_rx) = unbounded();
        Self {
            ctx,
            data_nodes: IdVec::with_capacity(16),
            connectors: IdVec::with_capacity(16),
            roots: Roots::default(),
            epoch: 0,
            running: 0,
            done_tx,
            done_rx,
            events: EventBus::default(),
        }
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Receive every [`WorkflowEvent`] emitted from now on.
    pub fn subscribe(&mut self) -> Receiver<WorkflowEvent> {
        self.events.subscribe()
    }
}

// QUERIES ///////////////////////
impl Workflow {
    pub fn data_node(&self, id: DataNodeId) -> Result<&DataNode, Error> {
        self.data_nodes.get(id).ok_or(Error::UnknownDataNode(id))
    }

    pub fn connector(&self, id: ConnectorId) -> Result<&Connector, Error> {
        self.connectors.get(id).ok_or(Error::UnknownConnector(id))
    }

    pub(crate) fn data_node_mut(&mut self, id: DataNodeId) -> Result<&mut DataNode, Error> {
        self.data_nodes.get_mut(id).ok_or(Error::UnknownDataNode(id))
    }

    pub(crate) fn connector_mut(&mut self, id: ConnectorId) -> Result<&mut Connector, Error> {
        self.connectors.get_mut(id).ok_or(Error::UnknownConnector(id))
    }

    /// Ids of all data nodes, in creation order.
    pub fn data_node_ids(&self) -> Vec<DataNodeId> {
        self.data_nodes.ids()
    }

    /// Ids of all connectors, in creation order.
    pub fn connector_ids(&self) -> Vec<ConnectorId> {
        self.connectors.ids()
    }

    pub fn num_data_nodes(&self) -> usize {
        self.data_nodes.len()
    }

    pub fn num_connectors(&self) -> usize {
        self.connectors.len()
    }

    /// State of any node. A data node has the state of its producer; a
    /// source node is valid once it holds a block.
    pub fn state(&self, node: impl Into<NodeRef>) -> Result<UpdateState, Error> {
        match node.into() {
            NodeRef::Connector(id) => Ok(self.connector(id)?.state()),
            NodeRef::Data(id) => self.node_state(id),
        }
    }

    pub(crate) fn node_state(&self, id: DataNodeId) -> Result<UpdateState, Error> {
        let node = self.data_node(id)?;
        match node.producer() {
            Some(producer) => Ok(self.connector(producer)?.state()),
            None if node.data_block().is_some() => Ok(UpdateState::Valid),
            None => Ok(UpdateState::Invalid),
        }
    }

    /// Current block of a data node, if one has been computed.
    pub fn data_block(&self, id: DataNodeId) -> Result<Option<Arc<DataBlock>>, Error> {
        Ok(self.data_node(id)?.data_block().cloned())
    }

    /// True if the node holds a block that no longer reflects its inputs.
    pub fn is_stale(&self, id: DataNodeId) -> Result<bool, Error> {
        let has_block = self.data_node(id)?.data_block().is_some();
        Ok(has_block && self.node_state(id)? != UpdateState::Valid)
    }

    pub fn short_description(&self, node: impl Into<NodeRef>) -> Result<String, Error> {
        match node.into() {
            NodeRef::Connector(id) => Ok(self.connector(id)?.short_description()),
            NodeRef::Data(id) => Ok(self.data_node(id)?.short_description()),
        }
    }

    /// Option values of a connector's algorithm.
    pub fn options(&self, id: ConnectorId) -> Result<Vec<(&'static str, String)>, Error> {
        Ok(self.connector(id)?.algorithm().options())
    }

    /// Failure message of a connector, if its last computation failed.
    pub fn message(&self, id: ConnectorId) -> Result<Option<&str>, Error> {
        Ok(self.connector(id)?.message())
    }

    pub fn is_applicable(&self, id: ConnectorId) -> Result<bool, Error> {
        Ok(self.connector(id)?.is_applicable())
    }

    /// Taxa as read by the user, before the taxa filter.
    pub fn input_taxa_node(&self) -> Option<DataNodeId> {
        self.roots.input_taxa
    }

    /// Taxa after the taxa filter; all analyses use these.
    pub fn working_taxa_node(&self) -> Option<DataNodeId> {
        self.roots.working_taxa
    }

    pub fn input_data_node(&self) -> Option<DataNodeId> {
        self.roots.input_data
    }

    /// Input data restricted to the working taxa; analyses hang off this node.
    pub fn working_data_node(&self) -> Option<DataNodeId> {
        self.roots.working_data
    }

    pub fn taxa_filter(&self) -> Option<ConnectorId> {
        self.roots.taxa_filter
    }

    pub fn top_filter(&self) -> Option<ConnectorId> {
        self.roots.top_filter
    }
}

// COORDINATION ///////////////////
impl Workflow {
    /// Number of computations that have not yet reported back.
    pub fn running_tasks(&self) -> usize {
        self.running
    }

    /// True when no computation is in flight.
    pub fn is_idle(&self) -> bool {
        self.running == 0
    }

    /// Apply the results of every computation that has finished, without
    /// blocking. Returns the number of results applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(done) = self.done_rx.try_recv() {
            self.apply_done(done);
            applied += 1;
        }
        applied
    }

    /// Block until no computation is in flight, applying results as they
    /// arrive. Relies on running algorithms eventually returning.
    pub fn wait_until_idle(&mut self) {
        self.process_pending();
        while self.running > 0 {
            // we hold a sender ourselves, so the channel can't disconnect:
            match self.done_rx.recv() {
                Ok(done) => self.apply_done(done),
                Err(_) => break,
            }
        }
    }
}

impl Drop for Workflow {
    fn drop(&mut self) {
        // nothing will apply the results, so stop the work:
        for connector in self.connectors.values() {
            connector.cancel_task();
        }
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("data_nodes", &self.data_nodes.len())
            .field("connectors", &self.connectors.len())
            .field("running", &self.running)
            .field("epoch", &self.epoch)
            .finish()
    }
}
