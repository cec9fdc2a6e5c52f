use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::{ConnectorId, NodeRef, UpdateState};

/// Notification published by a [`crate::Workflow`] to its subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// The state of a connector or data node changed.
    StateChanged {
        node: NodeRef,
        old: UpdateState,
        new: UpdateState,
    },
    /// A connector's algorithm became applicable or inapplicable to its input.
    ApplicableChanged {
        connector: ConnectorId,
        applicable: bool,
    },
    /// Nodes or edges were added or removed.
    TopologyChanged,
}

/// Fan-out of workflow events to any number of subscribers.
/// Subscribers that drop their receiver are forgotten on the next emit.
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    subscribers: Vec<Sender<WorkflowEvent>>,
}

impl EventBus {
    pub fn subscribe(&mut self) -> Receiver<WorkflowEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: WorkflowEvent) {
        if self.subscribers.is_empty() {
            return;
        }
        log::trace!("event: {event:?}");
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
