// Node Registry - the arena of simulated nodes and their protocol state

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, RngCore};

use crate::gs_interface::{NodeId, NodeStatus, Position, FIELD_SIZE, SEED_NODE};

/// The single data value disseminated in payload-carrying mode.
/// Generated once per run, origin-stamped at the seed node, immutable after.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlobalPayload {
    pub value: u64,
    pub origin: NodeId,
}

/// A simulated node
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub status: NodeStatus,
    /// Ordered sequence of received data items (payload-carrying mode)
    pub payload: Vec<u64>,
    pub position: Position,
}

impl Node {
    pub fn informed(&self) -> bool {
        self.status.is_informed()
    }

    pub fn failed(&self) -> bool {
        self.status.is_failed()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Fixed collection of nodes, addressed by stable id.
///
/// The node set is created wholesale at initialization and replaced wholesale
/// on reset; the only structural mid-run mutation is `remove` (admin action).
/// All protocol mutations go through the transition methods below, which
/// enforce that a failed node never becomes informed while failed.
pub struct NodeRegistry {
    nodes: BTreeMap<NodeId, Node>,
    global_payload: Option<GlobalPayload>,
}

impl NodeRegistry {
    /// Create `count` nodes with random positions, all uninformed except the
    /// distinguished seed node. In payload mode a fresh value is generated
    /// and origin-stamped at the seed.
    pub fn initialize(count: usize, payload_mode: bool, rng: &mut StdRng) -> Self {
        let mut registry = Self {
            nodes: BTreeMap::new(),
            global_payload: None,
        };
        registry.reset(count, payload_mode, rng);
        registry
    }

    /// Reinitialize wholesale from the current configuration. Positions are
    /// re-randomized; protocol state returns to the seed invariant.
    pub fn reset(&mut self, count: usize, payload_mode: bool, rng: &mut StdRng) {
        self.nodes.clear();
        self.global_payload = if payload_mode {
            Some(GlobalPayload {
                value: rng.next_u64(),
                origin: SEED_NODE,
            })
        } else {
            None
        };

        for id in 0..count as NodeId {
            let mut node = Node {
                id,
                status: if id == SEED_NODE {
                    NodeStatus::Informed
                } else {
                    NodeStatus::Uninformed
                },
                payload: Vec::new(),
                position: Position {
                    x: rng.gen_range(0.0..FIELD_SIZE),
                    y: rng.gen_range(0.0..FIELD_SIZE),
                },
            };
            if id == SEED_NODE {
                if let Some(payload) = &self.global_payload {
                    node.payload.push(payload.value);
                }
            }
            self.nodes.insert(id, node);
        }
    }

    // ========================================================================
    // Protocol transitions
    // ========================================================================

    /// Mark a node informed. Only `Uninformed -> Informed` is allowed: failed
    /// nodes, already-informed nodes and unknown ids are no-ops. Returns
    /// whether a transition happened. Appends the global payload in payload
    /// mode.
    pub fn infect(&mut self, id: NodeId) -> bool {
        let payload = self.global_payload;
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if node.status != NodeStatus::Uninformed {
            return false;
        }
        node.status = NodeStatus::Informed;
        if let Some(payload) = payload {
            node.payload.push(payload.value);
        }
        log::debug!("node {} informed", id);
        true
    }

    /// Set the failed flag. Failing freezes the current informed flag inside
    /// the `Failed` state; recovery restores exactly that flag. Returns
    /// whether the flag changed.
    pub fn set_failed(&mut self, id: NodeId, failed: bool) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        match (node.status, failed) {
            (NodeStatus::Uninformed, true) => {
                node.status = NodeStatus::Failed {
                    was_informed: false,
                };
            }
            (NodeStatus::Informed, true) => {
                node.status = NodeStatus::Failed { was_informed: true };
            }
            (NodeStatus::Failed { was_informed }, false) => {
                node.status = if was_informed {
                    NodeStatus::Informed
                } else {
                    NodeStatus::Uninformed
                };
            }
            _ => return false,
        }
        log::debug!("node {} failed={}", id, failed);
        true
    }

    /// Flip the failed flag (UI click). Returns the new flag, or `None` for
    /// an unknown id.
    pub fn toggle_failure(&mut self, id: NodeId) -> Option<bool> {
        let failed = self.nodes.get(&id)?.failed();
        self.set_failed(id, !failed);
        Some(!failed)
    }

    /// Remove a node from the set (admin action). Dangling membership and
    /// transfer references are pruned by the caller.
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    // ========================================================================
    // Read surface
    // ========================================================================

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn informed_count(&self) -> usize {
        self.nodes.values().filter(|n| n.informed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.nodes.values().filter(|n| n.failed()).count()
    }

    /// Informed, non-failed nodes - the sender snapshot of a round
    pub fn senders(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.status.is_sender())
            .map(|n| n.id)
            .collect()
    }

    /// Uninformed, non-failed nodes - the target pool of a round
    pub fn eligible_targets(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.status.is_target())
            .map(|n| n.id)
            .collect()
    }

    /// True when every non-failed node is informed (the convergence check).
    /// Vacuously true for an empty set.
    pub fn all_reachable_informed(&self) -> bool {
        self.nodes
            .values()
            .filter(|n| !n.failed())
            .all(|n| n.informed())
    }

    pub fn global_payload(&self) -> Option<&GlobalPayload> {
        self.global_payload.as_ref()
    }
}
