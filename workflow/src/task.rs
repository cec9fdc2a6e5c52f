use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use blocks::{DataBlock, TaxaBlock};

use crate::{Algorithm, ComputeError, ConnectorId, Progress};

/// Result of one computation task.
#[derive(Debug)]
pub enum ComputationOutcome {
    Success(DataBlock),
    Failure(String),
    Cancelled,
}

/// Message sent from a worker back to the coordinating workflow.
#[derive(Debug)]
pub(crate) struct TaskDone {
    pub epoch: u64,
    pub connector: ConnectorId,
    pub run: u64,
    pub outcome: ComputationOutcome,
}

/// Everything a worker needs to run one computation, detached from the graph.
pub(crate) struct Task {
    pub algorithm: Box<dyn Algorithm>,
    pub progress: Progress,
    pub taxa: Arc<DataBlock>,
    pub parent: Arc<DataBlock>,
}

impl Task {
    /// Run the algorithm, turning every way it can end into an outcome.
    pub fn run(self) -> ComputationOutcome {
        let Task {
            algorithm,
            progress,
            taxa,
            parent,
        } = self;
        if progress.is_cancelled() {
            return ComputationOutcome::Cancelled;
        }
        let Some(taxa) = taxa.as_taxa() else {
            return ComputationOutcome::Failure(format!(
                "expected a Taxa block, found {}",
                taxa.kind()
            ));
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            compute(algorithm.as_ref(), &progress, taxa, &parent)
        }));

        match result {
            Ok(Ok(block)) if block.kind() != algorithm.to_kind() => {
                ComputationOutcome::Failure(format!(
                    "{} produced a {} block, expected {}",
                    algorithm.name(),
                    block.kind(),
                    algorithm.to_kind()
                ))
            }
            Ok(Ok(block)) => ComputationOutcome::Success(block),
            Ok(Err(ComputeError::Cancelled)) => ComputationOutcome::Cancelled,
            Ok(Err(ComputeError::Failed(e))) => ComputationOutcome::Failure(format!("{e:#}")),
            Err(panic) => ComputationOutcome::Failure(panic_message(panic.as_ref())),
        }
    }
}

fn compute(
    algorithm: &dyn Algorithm,
    progress: &Progress,
    taxa: &TaxaBlock,
    parent: &DataBlock,
) -> Result<DataBlock, ComputeError> {
    log::trace!("{} computing on {}", algorithm.name(), parent.summary());
    algorithm.compute(progress, taxa, parent)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("algorithm panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("algorithm panicked: {s}")
    } else {
        "algorithm panicked".to_owned()
    }
}
