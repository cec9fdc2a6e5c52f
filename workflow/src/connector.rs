use crate::{Algorithm, ConnectorId, DataNodeId, Progress, UpdateState};

/// The computation currently running for a connector.
#[derive(Debug)]
pub(crate) struct RunningTask {
    /// sequence number of this run, unique per connector
    pub run: u64,
    pub progress: Progress,
    /// versions of the inputs this run reads; committed on success
    pub input_versions: Vec<u64>,
}

/// A graph edge: derives its child data node from its parent data node(s)
/// by running an algorithm.
///
/// Parents are ordered. The last parent is the main input, whose kind must
/// match the algorithm's input kind; when there are two parents, the first
/// supplies the taxa. With a single non-taxa parent, the taxa are read from
/// the nearest taxa ancestor of that parent.
#[derive(Debug)]
pub struct Connector {
    id: ConnectorId,
    pub(crate) parents: Vec<DataNodeId>,
    child: DataNodeId,
    pub(crate) algorithm: Box<dyn Algorithm>,
    pub(crate) state: UpdateState,
    pub(crate) applicable: bool,
    pub(crate) message: Option<String>,
    pub(crate) task: Option<RunningTask>,
    /// another run was requested while a task was running
    pub(crate) rerun: bool,
    pub(crate) runs: u64,
    /// versions of the inputs that produced the current child block
    pub(crate) input_versions: Vec<u64>,
}

impl Connector {
    pub(crate) fn new(
        id: ConnectorId,
        parents: Vec<DataNodeId>,
        child: DataNodeId,
        algorithm: Box<dyn Algorithm>,
    ) -> Self {
        Self {
            id,
            parents,
            child,
            algorithm,
            state: UpdateState::Invalid,
            applicable: true,
            message: None,
            task: None,
            rerun: false,
            runs: 0,
            input_versions: Vec::with_capacity(0),
        }
    }

    #[inline]
    pub fn id(&self) -> ConnectorId {
        self.id
    }

    pub fn parents(&self) -> &[DataNodeId] {
        &self.parents
    }

    /// The main (last) parent.
    pub fn main_parent(&self) -> DataNodeId {
        // connectors are only ever created with at least one parent:
        self.parents[self.parents.len() - 1]
    }

    #[inline]
    pub fn child(&self) -> DataNodeId {
        self.child
    }

    pub fn algorithm(&self) -> &dyn Algorithm {
        self.algorithm.as_ref()
    }

    #[inline]
    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// False if the algorithm rejected the latest input it was offered.
    #[inline]
    pub fn is_applicable(&self) -> bool {
        self.applicable
    }

    /// Failure message of the latest computation, if it failed.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Progress of the running computation, if any.
    pub fn progress(&self) -> Option<&Progress> {
        self.task.as_ref().map(|t| &t.progress)
    }

    /// Number of computations launched so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn short_description(&self) -> String {
        self.algorithm.name().to_owned()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Ask the running task (if any) to stop. Returns true if a task is running.
    pub(crate) fn cancel_task(&self) -> bool {
        match &self.task {
            Some(task) => {
                task.progress.cancel();
                true
            }
            None => false,
        }
    }
}
