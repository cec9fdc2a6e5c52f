use std::path::Path;

use anyhow::{Context, Result};

use util::HashMap;
use workflow::{ConnectorId, DataNodeId, Workflow};

/// Building a workflow from a parsed document
mod load;
/// Writing a workflow back out as a document
mod save;

/// Taxa as read from the document.
pub const INPUT_TAXA: &str = "input_taxa";
/// Taxa left after the taxa filter.
pub const WORKING_TAXA: &str = "taxa";
/// Data as read from the document.
pub const INPUT_DATA: &str = "input";
/// Input data restricted to the working taxa.
pub const WORKING_DATA: &str = "working";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Document has no characters or distances block")]
    NoData,
    #[error("Document has more than one {0} block")]
    DuplicateBlock(&'static str),
    #[error("Unknown node \"{0}\"")]
    UnknownNode(String),
    #[error("Node name \"{0}\" is already in use")]
    DuplicateName(String),
    #[error("Matrix has {found} rows, but there are {expected} taxa")]
    RowCount { expected: usize, found: usize },
    #[error("Matrix has no row for taxon \"{0}\"")]
    MissingRow(String),
    #[error("Distance row for \"{taxon}\" has {found} values, expected {expected}")]
    RowLength {
        taxon: String,
        expected: usize,
        found: usize,
    },
    #[error("Invalid distance \"{value}\" in row \"{taxon}\"")]
    BadDistance { taxon: String, value: String },
    #[error("Distances between \"{0}\" and \"{1}\" are not symmetric")]
    Asymmetric(String, String),
    #[error("Node \"{node}\" is already filtered by {found}, not {expected}")]
    FilterMismatch {
        node: String,
        expected: String,
        found: &'static str,
    },
    #[error("Node \"{0}\" is not computed, and has no filter whose options could be set")]
    NotConfigurable(String),
    #[error("Cannot save input data of kind {0}")]
    UnsavableInput(blocks::BlockKind),
    #[error("Cannot save node {0}: it has no name and no producer")]
    UnnamedSource(DataNodeId),
}

/// A workflow together with the names its document gave to data nodes.
#[derive(Debug)]
pub struct Document {
    workflow: Workflow,
    names: HashMap<String, DataNodeId>,
}

impl Document {
    fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            names: util::map_with_capacity(16),
        }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut Workflow {
        &mut self.workflow
    }

    /// Look up a data node by name.
    pub fn node(&self, name: &str) -> Result<DataNodeId, Error> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownNode(name.to_owned()))
    }

    /// Name of a data node, if the document named it.
    pub fn name_of(&self, id: DataNodeId) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, &node)| node == id)
            .map(|(name, _)| name.as_str())
    }

    /// The connector configured by options given for node `name`: its
    /// producer, or for the input nodes, the filter directly below them.
    pub fn connector_for(&self, name: &str) -> Result<ConnectorId, Error> {
        let node = self.node(name)?;
        let producer = self
            .workflow
            .data_node(node)
            .ok()
            .and_then(|n| n.producer());
        let root_filter = if Some(node) == self.workflow.input_taxa_node() {
            self.workflow.taxa_filter()
        } else if Some(node) == self.workflow.input_data_node() {
            self.workflow.top_filter()
        } else {
            None
        };
        producer
            .or(root_filter)
            .ok_or_else(|| Error::NotConfigurable(name.to_owned()))
    }

    /// Set an option on the connector configured through node `node`.
    pub fn set_option(&mut self, node: &str, option: &str, value: &str) -> Result<()> {
        let connector = self.connector_for(node)?;
        self.workflow
            .set_option(connector, option, value)
            .with_context(|| format!("while setting option {option} of \"{node}\""))?;
        Ok(())
    }

    /// Read and load the document at `path`.
    pub fn read(path: &Path, workflow: Workflow) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("while reading workflow file {path:?}"))?;
        Self::load(&text, workflow)
            .with_context(|| format!("while loading workflow file {path:?}"))
    }

    /// Write this document to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut text = String::with_capacity(1024);
        self.write(&mut text)?;
        std::fs::write(path, text).with_context(|| format!("while saving workflow to {path:?}"))?;
        Ok(())
    }

    fn insert_name(&mut self, name: &str, id: DataNodeId) -> Result<(), Error> {
        if self.names.contains_key(name) {
            return Err(Error::DuplicateName(name.to_owned()));
        }
        self.names.insert(name.to_owned(), id);
        Ok(())
    }
}
