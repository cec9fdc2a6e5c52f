use std::sync::Arc;

use blocks::{BlockKind, DataBlock, TaxaBlock};

use crate::workflow::Roots;
use crate::{
    Algorithm, Connector, ConnectorId, DataNode, DataNodeId, Error, Workflow, WorkflowEvent,
};

/// One step of a path built by [`Workflow::find_or_create_path`]: an
/// algorithm and the kind of block it must produce.
#[derive(Debug)]
pub struct PathStep {
    algorithm: Box<dyn Algorithm>,
    kind: BlockKind,
}

impl PathStep {
    pub fn new<A: Algorithm>(algorithm: A, kind: BlockKind) -> Self {
        Self::boxed(Box::new(algorithm), kind)
    }

    pub fn boxed(algorithm: Box<dyn Algorithm>, kind: BlockKind) -> Self {
        Self { algorithm, kind }
    }
}

fn expect_kind(expected: BlockKind, found: BlockKind) -> Result<(), Error> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::IncompatibleKinds { expected, found })
    }
}

// PUBLIC OPERATIONS /////////////////
impl Workflow {
    /// Add a source node holding `block`. Source nodes have no producer and
    /// are valid from the start.
    pub fn create_data_node(&mut self, block: DataBlock) -> DataNodeId {
        let id = self.new_source(block);
        self.events.emit(WorkflowEvent::TopologyChanged);
        id
    }

    /// Add an empty node of kind `kind`, to be used as a connector's child.
    pub fn create_pending_node(&mut self, kind: BlockKind) -> DataNodeId {
        let id = self.new_data_node(kind);
        self.events.emit(WorkflowEvent::TopologyChanged);
        id
    }

    /// Add a connector computing `child` from `parents` with `algorithm`.
    ///
    /// `child` must be an empty node without a producer, and the new edge may
    /// not close a cycle. The connector starts out invalid and computes as
    /// soon as its parents are valid.
    pub fn create_connector(
        &mut self,
        parents: &[DataNodeId],
        child: DataNodeId,
        algorithm: Box<dyn Algorithm>,
    ) -> Result<ConnectorId, Error> {
        self.check_connector(parents, child, algorithm.as_ref())?;
        let id = self.attach(parents.to_vec(), child, algorithm)?;
        self.events.emit(WorkflowEvent::TopologyChanged);
        self.try_start(id);
        Ok(id)
    }

    /// Return the filter directly below `node`, inserting one made by
    /// `make_filter` if there is none.
    ///
    /// The first consumer of `node` (in registration order) that filters
    /// blocks of `node`'s kind, reading `node` as its main parent, counts as
    /// existing. A new filter is spliced in between
    /// `node` and all its current consumers, which are re-pointed to read the
    /// filter's output instead.
    pub fn find_or_insert_filter<F>(
        &mut self,
        node: DataNodeId,
        make_filter: F,
    ) -> Result<ConnectorId, Error>
    where
        F: FnOnce() -> Box<dyn Algorithm>,
    {
        let kind = self.data_node(node)?.kind();
        if let Some(existing) = self.find_filter(node)? {
            log::debug!("reusing filter {existing} below {node}");
            return Ok(existing);
        }

        let filter = make_filter();
        if !filter.is_filter() || filter.from_kind() != kind {
            return Err(Error::NotAFilter(filter.name(), kind));
        }
        self.taxa_node_for(&[node])?;

        let out = self.new_data_node(kind);
        let downstream = std::mem::take(&mut self.data_node_mut(node)?.consumers);
        let filter_id = self.attach(vec![node], out, filter)?;
        for &consumer in &downstream {
            for parent in &mut self.connector_mut(consumer)?.parents {
                if *parent == node {
                    *parent = out;
                }
            }
            self.data_node_mut(out)?.consumers.push(consumer);
        }
        log::info!(
            "inserted filter {filter_id} below {node}; re-pointed {} consumer(s) to {out}",
            downstream.len()
        );
        self.events.emit(WorkflowEvent::TopologyChanged);

        for consumer in downstream {
            self.invalidate(consumer)?;
        }
        self.try_start(filter_id);
        Ok(filter_id)
    }

    /// Walk down from `start` along `steps`, reusing existing connectors
    /// that run an algorithm of the same name into a node of the same kind,
    /// and creating the rest of the chain. Returns the last connector and
    /// its child.
    ///
    /// When several existing connectors match a step, the first one
    /// registered is used.
    pub fn find_or_create_path(
        &mut self,
        start: DataNodeId,
        steps: Vec<PathStep>,
    ) -> Result<(ConnectorId, DataNodeId), Error> {
        if steps.is_empty() {
            return Err(Error::EmptyPath);
        }

        // check the whole chain before touching the graph:
        let start_kind = self.data_node(start)?.kind();
        let mut kind = start_kind;
        for step in &steps {
            expect_kind(step.algorithm.from_kind(), kind)?;
            expect_kind(step.kind, step.algorithm.to_kind())?;
            kind = step.kind;
        }
        if start_kind != BlockKind::Taxa
            && self.ancestor_for_kind(start, BlockKind::Taxa)?.is_none()
        {
            return Err(Error::MissingTaxa(start));
        }

        let mut current = start;
        let mut last = None;
        for PathStep { algorithm, kind } in steps {
            let (connector, child) = match self.find_step(current, algorithm.name(), kind)? {
                Some(found) => found,
                None => {
                    let child = self.new_data_node(kind);
                    let connector = self.attach(vec![current], child, algorithm)?;
                    self.events.emit(WorkflowEvent::TopologyChanged);
                    self.try_start(connector);
                    (connector, child)
                }
            };
            current = child;
            last = Some((connector, child));
        }
        last.ok_or(Error::EmptyPath)
    }

    /// Create the standard input chain:
    ///
    /// ```text
    /// input taxa --[taxa filter]--> working taxa --+
    ///                                              +--[top filter]--> working data
    /// input data ----------------------------------+
    /// ```
    pub fn setup_input(
        &mut self,
        taxa: TaxaBlock,
        data: DataBlock,
        taxa_filter: Box<dyn Algorithm>,
        top_filter: Box<dyn Algorithm>,
    ) -> Result<(), Error> {
        if self.roots.input_taxa.is_some() {
            return Err(Error::InputAlreadySetUp);
        }
        if !taxa_filter.is_filter() || taxa_filter.from_kind() != BlockKind::Taxa {
            return Err(Error::NotAFilter(taxa_filter.name(), BlockKind::Taxa));
        }
        let kind = data.kind();
        if !top_filter.is_filter() || top_filter.from_kind() != kind {
            return Err(Error::NotAFilter(top_filter.name(), kind));
        }

        let input_taxa = self.new_source(DataBlock::Taxa(taxa));
        let working_taxa = self.new_data_node(BlockKind::Taxa);
        let taxa_filter = self.attach(vec![input_taxa], working_taxa, taxa_filter)?;

        let input_data = self.new_source(data);
        let working_data = self.new_data_node(kind);
        let top_filter = self.attach(vec![working_taxa, input_data], working_data, top_filter)?;

        self.roots = Roots {
            input_taxa: Some(input_taxa),
            working_taxa: Some(working_taxa),
            input_data: Some(input_data),
            working_data: Some(working_data),
            taxa_filter: Some(taxa_filter),
            top_filter: Some(top_filter),
        };
        log::info!("set up input chain with {kind} data");
        self.events.emit(WorkflowEvent::TopologyChanged);

        self.try_start(taxa_filter);
        self.try_start(top_filter);
        Ok(())
    }

    /// Remove `connector`, its child, and everything downstream of it,
    /// cancelling any of their running computations.
    pub fn delete(&mut self, connector: ConnectorId) -> Result<(), Error> {
        if Some(connector) == self.roots.taxa_filter || Some(connector) == self.roots.top_filter {
            return Err(Error::RootConnector(connector));
        }
        let mut doomed = vec![connector];
        doomed.extend(self.downstream_connectors(connector)?);

        for &id in &doomed {
            let Some(removed) = self.connectors.remove(id) else {
                continue;
            };
            // still counted as running until its result arrives and is dropped:
            removed.cancel_task();
            for parent in removed.parents() {
                if let Some(node) = self.data_nodes.get_mut(*parent) {
                    node.consumers.retain(|&c| c != id);
                }
            }
            self.data_nodes.remove(removed.child());
        }
        log::info!("deleted {} connector(s) starting at {connector}", doomed.len());
        self.events.emit(WorkflowEvent::TopologyChanged);
        Ok(())
    }
}

// INTERNALS ////////////////////
impl Workflow {
    pub(crate) fn new_data_node(&mut self, kind: BlockKind) -> DataNodeId {
        let id = self.data_nodes.next_id();
        self.data_nodes.push(DataNode::new(id, kind))
    }

    fn new_source(&mut self, block: DataBlock) -> DataNodeId {
        let id = self.new_data_node(block.kind());
        if let Some(node) = self.data_nodes.get_mut(id) {
            node.set_data_block(Arc::new(block));
        }
        id
    }

    /// Wire a connector into the graph without validating or starting it.
    fn attach(
        &mut self,
        parents: Vec<DataNodeId>,
        child: DataNodeId,
        algorithm: Box<dyn Algorithm>,
    ) -> Result<ConnectorId, Error> {
        let id = self.connectors.next_id();
        let name = algorithm.name();
        self.data_node_mut(child)?.producer = Some(id);
        for (i, &parent) in parents.iter().enumerate() {
            if !parents[..i].contains(&parent) {
                self.data_node_mut(parent)?.consumers.push(id);
            }
        }
        log::info!("added connector {id} ({name}): {parents:?} -> {child}");
        self.connectors
            .push(Connector::new(id, parents, child, algorithm));
        Ok(id)
    }

    fn check_connector(
        &self,
        parents: &[DataNodeId],
        child: DataNodeId,
        algorithm: &dyn Algorithm,
    ) -> Result<(), Error> {
        let (&main, rest) = match parents.split_last() {
            Some(split) if parents.len() <= 2 => split,
            _ => return Err(Error::ParentCount(parents.len())),
        };
        expect_kind(algorithm.from_kind(), self.data_node(main)?.kind())?;
        if let Some(&taxa) = rest.first() {
            expect_kind(BlockKind::Taxa, self.data_node(taxa)?.kind())?;
        }

        let child_node = self.data_node(child)?;
        expect_kind(algorithm.to_kind(), child_node.kind())?;
        if child_node.producer().is_some() {
            return Err(Error::AlreadyProduced(child));
        }
        if child_node.data_block().is_some() {
            return Err(Error::ChildHasData(child));
        }
        for &parent in parents {
            if self.reaches(child, parent)? {
                return Err(Error::Cycle(parent, child));
            }
        }
        self.taxa_node_for(parents)?;
        Ok(())
    }

    /// Node supplying the taxa for a connector with these parents.
    pub(crate) fn taxa_node_for(&self, parents: &[DataNodeId]) -> Result<DataNodeId, Error> {
        let &main = parents.last().ok_or(Error::ParentCount(0))?;
        if parents.len() == 2 {
            return Ok(parents[0]);
        }
        if self.data_node(main)?.kind() == BlockKind::Taxa {
            return Ok(main);
        }
        self.ancestor_for_kind(main, BlockKind::Taxa)?
            .ok_or(Error::MissingTaxa(main))
    }

    /// First filter that reads `node` as its main parent and filters
    /// blocks of its kind. A consumer using `node` only as its taxa does not
    /// count.
    fn find_filter(&self, node: DataNodeId) -> Result<Option<ConnectorId>, Error> {
        let kind = self.data_node(node)?.kind();
        for &consumer in self.data_node(node)?.consumers() {
            let connector = self.connector(consumer)?;
            let algorithm = connector.algorithm();
            if algorithm.is_filter()
                && algorithm.from_kind() == kind
                && connector.main_parent() == node
            {
                return Ok(Some(consumer));
            }
        }
        Ok(None)
    }

    fn find_step(
        &self,
        node: DataNodeId,
        name: &str,
        kind: BlockKind,
    ) -> Result<Option<(ConnectorId, DataNodeId)>, Error> {
        for &consumer in self.data_node(node)?.consumers() {
            let connector = self.connector(consumer)?;
            if connector.algorithm().name() == name
                && connector.main_parent() == node
                && self.data_node(connector.child())?.kind() == kind
            {
                return Ok(Some((consumer, connector.child())));
            }
        }
        Ok(None)
    }
}
