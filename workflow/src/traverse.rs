use std::collections::VecDeque;

use blocks::BlockKind;
use util::HashMap;

use crate::{ConnectorId, DataNodeId, Error, Workflow};

const QUEUE_CAPACITY: usize = 32;

impl Workflow {
    /// Walk strictly upward from `node` through producing connectors, and
    /// return the first data node of kind `kind` found (breadth-first,
    /// parents in order), if any.
    pub fn ancestor_for_kind(
        &self,
        node: DataNodeId,
        kind: BlockKind,
    ) -> Result<Option<DataNodeId>, Error> {
        let mut visited = util::set_with_capacity(QUEUE_CAPACITY);
        let mut queue = VecDeque::with_capacity(QUEUE_CAPACITY);
        queue.push_back(node);
        while let Some(current) = queue.pop_front() {
            let Some(producer) = self.data_node(current)?.producer() else {
                continue;
            };
            for &parent in self.connector(producer)?.parents() {
                if !visited.insert(parent) {
                    continue;
                }
                if self.data_node(parent)?.kind() == kind {
                    return Ok(Some(parent));
                }
                queue.push_back(parent);
            }
        }
        Ok(None)
    }

    /// All connectors strictly downstream of `root`, breadth-first.
    pub fn downstream_connectors(&self, root: ConnectorId) -> Result<Vec<ConnectorId>, Error> {
        let child = self.connector(root)?.child();
        let mut out = Vec::with_capacity(QUEUE_CAPACITY);
        let mut visited = util::set_with_capacity(QUEUE_CAPACITY);
        let mut queue = VecDeque::with_capacity(QUEUE_CAPACITY);
        queue.push_back(child);
        while let Some(node) = queue.pop_front() {
            for &consumer in self.data_node(node)?.consumers() {
                if consumer != root && visited.insert(consumer) {
                    out.push(consumer);
                    queue.push_back(self.connector(consumer)?.child());
                }
            }
        }
        Ok(out)
    }

    /// True if `target` is `from` or can be reached by walking downstream from it.
    pub(crate) fn reaches(&self, from: DataNodeId, target: DataNodeId) -> Result<bool, Error> {
        let mut visited = util::set_with_capacity(QUEUE_CAPACITY);
        let mut queue = VecDeque::with_capacity(QUEUE_CAPACITY);
        queue.push_back(from);
        while let Some(node) = queue.pop_front() {
            if node == target {
                return Ok(true);
            }
            if !visited.insert(node) {
                continue;
            }
            for &consumer in self.data_node(node)?.consumers() {
                queue.push_back(self.connector(consumer)?.child());
            }
        }
        Ok(false)
    }

    /// All connectors, ordered so that each comes after the producers of its
    /// parents. Ties keep creation order.
    pub fn topological_connectors(&self) -> Result<Vec<ConnectorId>, Error> {
        let ids = self.connectors.ids();
        let mut pending: HashMap<ConnectorId, usize> = util::map_with_capacity(ids.len());
        let mut queue = VecDeque::with_capacity(ids.len());
        for &id in &ids {
            let upstream = self
                .connector(id)?
                .parents()
                .iter()
                .filter(|&&p| self.data_nodes.get(p).and_then(|n| n.producer()).is_some())
                .count();
            if upstream == 0 {
                queue.push_back(id);
            } else {
                pending.insert(id, upstream);
            }
        }

        let mut out = Vec::with_capacity(ids.len());
        while let Some(id) = queue.pop_front() {
            out.push(id);
            let child = self.connector(id)?.child();
            for &consumer in self.data_node(child)?.consumers() {
                // a consumer can list the same parent twice:
                let times = self
                    .connector(consumer)?
                    .parents()
                    .iter()
                    .filter(|&&p| p == child)
                    .count();
                if let Some(count) = pending.get_mut(&consumer) {
                    *count = count.saturating_sub(times);
                    if *count == 0 {
                        pending.remove(&consumer);
                        queue.push_back(consumer);
                    }
                }
            }
        }
        Ok(out)
    }
}
