use std::sync::Arc;

use blocks::DataBlock;

use crate::connector::RunningTask;
use crate::task::{Task, TaskDone};
use crate::{
    ComputationOutcome, ConnectorId, DataNodeId, Error, NodeRef, Progress, UpdateState, Workflow,
    WorkflowEvent,
};

/// Inputs of a connector whose parents are all valid.
struct Inputs {
    taxa: Arc<DataBlock>,
    parent: Arc<DataBlock>,
    versions: Vec<u64>,
}

// PUBLIC OPERATIONS /////////////////
impl Workflow {
    /// Invalidate `connector` and everything downstream of it, and compute
    /// it again even though its inputs did not change.
    pub fn force_recompute(&mut self, connector: ConnectorId) -> Result<(), Error> {
        self.connector(connector)?;
        log::debug!("forcing recompute of {connector}");
        self.invalidate(connector)
    }

    /// Set an option of a connector's algorithm. The connector is only
    /// invalidated if the option's value actually changed.
    pub fn set_option(
        &mut self,
        connector: ConnectorId,
        name: &str,
        value: &str,
    ) -> Result<(), Error> {
        let conn = self.connector_mut(connector)?;
        let before = conn.algorithm.options();
        conn.algorithm.set_option(name, value)?;
        if conn.algorithm.options() == before {
            log::trace!("option {name} of {connector} unchanged");
            return Ok(());
        }
        log::debug!("set option {name}={value} on {connector}");
        self.invalidate(connector)
    }

    /// Replace the block of a source node and invalidate its consumers.
    pub fn set_source_block(&mut self, node: DataNodeId, block: DataBlock) -> Result<(), Error> {
        let data_node = self.data_node(node)?;
        if data_node.producer().is_some() {
            return Err(Error::NotASource(node));
        }
        if data_node.kind() != block.kind() {
            return Err(Error::IncompatibleKinds {
                expected: data_node.kind(),
                found: block.kind(),
            });
        }
        let had_block = data_node.data_block().is_some();
        let consumers = data_node.consumers().to_vec();

        self.data_node_mut(node)?.set_data_block(Arc::new(block));
        if !had_block {
            self.events.emit(WorkflowEvent::StateChanged {
                node: NodeRef::Data(node),
                old: UpdateState::Invalid,
                new: UpdateState::Valid,
            });
        }
        for consumer in consumers {
            self.invalidate(consumer)?;
        }
        Ok(())
    }

    /// Invalidate and recompute every connector.
    pub fn recompute_all(&mut self) -> Result<(), Error> {
        for id in self.topological_connectors()? {
            // everything else is reached from the connectors reading sources:
            let reads_sources = self
                .connector(id)?
                .parents()
                .iter()
                .all(|&p| self.data_nodes.get(p).is_some_and(|n| n.producer().is_none()));
            if reads_sources {
                self.invalidate(id)?;
            }
        }
        Ok(())
    }

    /// Ask every running computation to stop. Cancelled connectors become
    /// invalid once their tasks report back.
    pub fn cancel_all(&mut self) {
        let mut cancelled = 0;
        for conn in self.connectors.values_mut() {
            conn.rerun = false;
            if conn.cancel_task() {
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            log::info!("cancelled {cancelled} running computation(s)");
        }
    }

    /// Cancel everything and remove all nodes. Does not wait for running
    /// computations; their results are dropped when they arrive.
    pub fn clear(&mut self) {
        self.cancel_all();
        self.epoch += 1;
        self.running = 0;
        self.connectors.clear();
        self.data_nodes.clear();
        self.roots = Default::default();
        log::info!("cleared workflow");
        self.events.emit(WorkflowEvent::TopologyChanged);
    }
}

// STATE MACHINE /////////////////
impl Workflow {
    /// Mark `root` and every connector downstream of it invalid, then try to
    /// start `root` again.
    pub(crate) fn invalidate(&mut self, root: ConnectorId) -> Result<(), Error> {
        for id in self.downstream_connectors(root)? {
            self.mark_invalid(id);
        }
        let conn = self.connector_mut(root)?;
        if conn.is_running() {
            conn.rerun = true;
            conn.cancel_task();
            return Ok(());
        }
        self.set_state(root, UpdateState::Invalid);
        self.try_start(root);
        Ok(())
    }

    fn mark_invalid(&mut self, id: ConnectorId) {
        let Some(conn) = self.connectors.get_mut(id) else {
            return;
        };
        // a running connector becomes invalid when its cancellation is observed:
        if conn.cancel_task() {
            return;
        }
        self.set_state(id, UpdateState::Invalid);
    }

    /// Launch a computation for `id` if all of its inputs are valid.
    /// Otherwise it stays invalid until a parent becomes valid.
    pub(crate) fn try_start(&mut self, id: ConnectorId) {
        if let Err(e) = self.start(id) {
            log::warn!("unable to start {id}: {e}");
            self.fail(id, e.to_string());
        }
    }

    fn start(&mut self, id: ConnectorId) -> Result<(), Error> {
        let conn = self.connector_mut(id)?;
        if conn.is_running() {
            conn.rerun = true;
            conn.cancel_task();
            return Ok(());
        }

        let Some(Inputs {
            taxa,
            parent,
            versions,
        }) = self.ready_inputs(id)?
        else {
            log::trace!("{id} is waiting for its inputs");
            return Ok(());
        };

        let conn = self.connector_mut(id)?;
        let applicable = match taxa.as_taxa() {
            Some(taxa) => conn.algorithm.is_applicable(taxa, &parent),
            None => false,
        };
        if conn.applicable != applicable {
            conn.applicable = applicable;
            self.events.emit(WorkflowEvent::ApplicableChanged {
                connector: id,
                applicable,
            });
        }

        if !applicable {
            let conn = self.connector_mut(id)?;
            log::debug!("{} is not applicable to {}", conn.algorithm.name(), parent.summary());
            let empty = DataBlock::empty(conn.algorithm.to_kind());
            conn.input_versions = versions;
            conn.message = None;
            return self.install(id, empty);
        }

        self.launch(id, taxa, parent, versions)
    }

    fn launch(
        &mut self,
        id: ConnectorId,
        taxa: Arc<DataBlock>,
        parent: Arc<DataBlock>,
        input_versions: Vec<u64>,
    ) -> Result<(), Error> {
        let conn = self.connector_mut(id)?;
        conn.runs += 1;
        let run = conn.runs;
        let progress = Progress::new();
        conn.task = Some(RunningTask {
            run,
            progress: progress.clone(),
            input_versions,
        });
        conn.rerun = false;
        let name = conn.algorithm.name();
        let task = Task {
            algorithm: conn.algorithm.box_clone(),
            progress,
            taxa,
            parent,
        };

        self.running += 1;
        self.set_state(id, UpdateState::Computing);
        self.ctx.stats().record_launch();
        log::debug!("launching {name} for {id} (run {run})");

        let tx = self.done_tx.clone();
        let epoch = self.epoch;
        self.ctx.spawn(move || {
            let outcome = task.run();
            // the workflow may be gone by now; then nobody wants the result
            let _ = tx.send(TaskDone {
                epoch,
                connector: id,
                run,
                outcome,
            });
        });
        Ok(())
    }

    /// Apply the result of a finished computation.
    pub(crate) fn apply_done(&mut self, done: TaskDone) {
        let TaskDone {
            epoch,
            connector: id,
            run,
            outcome,
        } = done;
        if epoch != self.epoch {
            log::trace!("dropping result of {id} from a cleared workflow");
            return;
        }
        self.running = self.running.saturating_sub(1);

        let stats = self.ctx.stats_handle();
        let Some(conn) = self.connectors.get_mut(id) else {
            log::trace!("dropping result of deleted connector {id}");
            stats.record_cancel();
            return;
        };
        let task = match conn.task.take() {
            Some(task) if task.run == run => task,
            other => {
                log::warn!("unexpected result for {id} (run {run})");
                conn.task = other;
                return;
            }
        };
        let rerun = std::mem::take(&mut conn.rerun);

        // a late success from a cancelled task must not be installed:
        let outcome = if task.progress.is_cancelled() {
            ComputationOutcome::Cancelled
        } else {
            outcome
        };

        match outcome {
            ComputationOutcome::Cancelled => {
                stats.record_cancel();
                log::debug!("{id} cancelled (run {run})");
                self.set_state(id, UpdateState::Invalid);
                if rerun {
                    self.try_start(id);
                }
            }
            ComputationOutcome::Success(block) => {
                stats.record_success();
                conn.input_versions = task.input_versions;
                conn.message = None;
                log::debug!("{id} computed {} (run {run})", block.summary());
                if let Err(e) = self.install(id, block) {
                    log::warn!("unable to install result of {id}: {e}");
                }
            }
            ComputationOutcome::Failure(message) => {
                stats.record_failure();
                log::warn!("{} ({id}) failed: {message}", conn.algorithm.name());
                self.fail(id, message);
            }
        }
    }

    /// Publish `block` as the child of `id`, make `id` valid, and wake up the
    /// consumers of the child.
    fn install(&mut self, id: ConnectorId, block: DataBlock) -> Result<(), Error> {
        let child = self.connector(id)?.child();
        self.data_node_mut(child)?.set_data_block(Arc::new(block));
        self.set_state(id, UpdateState::Valid);
        let consumers = self.data_node(child)?.consumers().to_vec();
        for consumer in consumers {
            self.parent_became_valid(consumer)?;
        }
        Ok(())
    }

    fn parent_became_valid(&mut self, id: ConnectorId) -> Result<(), Error> {
        let conn = self.connector(id)?;
        if conn.state() == UpdateState::Valid {
            let current = self.ready_inputs(id)?.map(|inputs| inputs.versions);
            if current.as_ref() == Some(&self.connector(id)?.input_versions) {
                return Ok(());
            }
        }
        self.invalidate(id)
    }

    /// Taxa and main parent blocks of `id`, if all its inputs are valid.
    fn ready_inputs(&self, id: ConnectorId) -> Result<Option<Inputs>, Error> {
        let conn = self.connector(id)?;
        let taxa_node = self.taxa_node_for(conn.parents())?;

        let mut versions = Vec::with_capacity(conn.parents().len() + 1);
        for &node in conn.parents().iter().chain(std::iter::once(&taxa_node)) {
            if self.node_state(node)? != UpdateState::Valid {
                return Ok(None);
            }
            versions.push(self.data_node(node)?.version());
        }

        let parent = self.data_node(conn.main_parent())?.data_block().cloned();
        let taxa = self.data_node(taxa_node)?.data_block().cloned();
        Ok(match (taxa, parent) {
            (Some(taxa), Some(parent)) => Some(Inputs {
                taxa,
                parent,
                versions,
            }),
            _ => None,
        })
    }

    fn fail(&mut self, id: ConnectorId, message: String) {
        if let Some(conn) = self.connectors.get_mut(id) {
            conn.message = Some(message);
            self.set_state(id, UpdateState::Failed);
        }
    }

    /// Change the state of a connector (and so of its child), notifying
    /// subscribers if it differs from the current one.
    fn set_state(&mut self, id: ConnectorId, new: UpdateState) {
        let Some(conn) = self.connectors.get_mut(id) else {
            return;
        };
        let old = conn.state;
        if old == new {
            return;
        }
        conn.state = new;
        let child = conn.child();
        log::trace!("{id}: {old} -> {new}");
        self.events.emit(WorkflowEvent::StateChanged {
            node: NodeRef::Connector(id),
            old,
            new,
        });
        self.events.emit(WorkflowEvent::StateChanged {
            node: NodeRef::Data(child),
            old,
            new,
        });
    }
}
