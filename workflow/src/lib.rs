//! The phyloflow execution engine.
//!
//! A [`Workflow`] is a directed acyclic graph of [`DataNode`]s joined by
//! [`Connector`]s. Each connector runs an [`Algorithm`] that derives its child
//! data node from its parent(s). Whenever a parent changes, or an option of a
//! connector's algorithm changes, the affected connectors are invalidated and
//! recomputed in the background, and every state change is published as a
//! [`WorkflowEvent`].
//!
//! Threading model:
//! - algorithms run on the worker pool held by an [`EngineContext`];
//! - the graph itself is only touched by the owner of the `Workflow`
//!   (`&mut self` is the topology lock), which applies finished results
//!   by calling [`Workflow::process_pending`] or [`Workflow::wait_until_idle`].

mod id;
pub use id::{ConnectorId, DataNodeId, NodeRef};

mod state;
pub use state::UpdateState;

mod progress;
pub use progress::{Cancelled, Progress};

mod algorithm;
pub use algorithm::{Algorithm, ComputeError, OptionError};

mod context;
pub use context::{EngineConfig, EngineContext, EngineStats, StatsSnapshot};

mod event;
pub use event::WorkflowEvent;

mod data_node;
pub use data_node::DataNode;

mod connector;
pub use connector::Connector;

mod task;
pub use task::ComputationOutcome;

mod workflow;
pub use workflow::Workflow;

/// Graph construction and mutation
mod topology;
pub use topology::PathStep;

/// Invalidation and recomputation
mod schedule;

/// Upward and downward graph walks
mod traverse;

use blocks::BlockKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown data node: {0}")]
    UnknownDataNode(DataNodeId),
    #[error("Unknown connector: {0}")]
    UnknownConnector(ConnectorId),
    #[error("A connector needs one or two parents, got {0}")]
    ParentCount(usize),
    #[error("Incompatible block kinds: expected {expected}, found {found}")]
    IncompatibleKinds {
        expected: BlockKind,
        found: BlockKind,
    },
    #[error("Data node {0} already has a producer")]
    AlreadyProduced(DataNodeId),
    #[error("Data node {0} already holds data and cannot become a computed node")]
    ChildHasData(DataNodeId),
    #[error("Connecting {0} to {1} would create a cycle")]
    Cycle(DataNodeId, DataNodeId),
    #[error("No taxa found upstream of data node {0}")]
    MissingTaxa(DataNodeId),
    #[error("Algorithm {0} is not a filter for {1} blocks")]
    NotAFilter(&'static str, BlockKind),
    #[error("A path needs at least one step")]
    EmptyPath,
    #[error("Data node {0} is computed; only source nodes can be assigned data")]
    NotASource(DataNodeId),
    #[error("Input nodes are already set up; clear the workflow first")]
    InputAlreadySetUp,
    #[error("Connector {0} is a root filter and cannot be deleted")]
    RootConnector(ConnectorId),
    #[error(transparent)]
    Option(#[from] OptionError),
    #[error("Unable to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
