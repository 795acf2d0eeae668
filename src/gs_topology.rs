// Topology / Membership - proximity-based neighbor restriction

use hashbrown::{HashMap, HashSet};

use crate::gs_interface::NodeId;
use crate::gs_registry::NodeRegistry;

/// Symmetric neighbor relation materialized from node positions: two nodes
/// are neighbors iff their Euclidean distance is strictly less than the
/// radius. Recomputed whenever positions or the node set change; read-only
/// to the selection policy.
#[derive(Debug, Default)]
pub struct Membership {
    edges: HashMap<NodeId, HashSet<NodeId>>,
}

impl Membership {
    /// Pairwise O(n²) recompute. Fine at target scale (a few hundred nodes).
    pub fn compute(registry: &NodeRegistry, radius: f64) -> Self {
        let nodes: Vec<_> = registry.nodes().collect();
        let mut edges: HashMap<NodeId, HashSet<NodeId>> = nodes
            .iter()
            .map(|n| (n.id, HashSet::new()))
            .collect();

        for (i, a) in nodes.iter().enumerate() {
            for b in nodes.iter().skip(i + 1) {
                if a.position.distance(&b.position) < radius {
                    edges.entry(a.id).or_default().insert(b.id);
                    edges.entry(b.id).or_default().insert(a.id);
                }
            }
        }

        Self { edges }
    }

    pub fn neighbors(&self, id: NodeId) -> Option<&HashSet<NodeId>> {
        self.edges.get(&id)
    }

    pub fn are_neighbors(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.get(&a).map_or(false, |s| s.contains(&b))
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.edges.get(&id).map_or(0, |s| s.len())
    }

    /// Prune a removed node from both edge directions
    pub fn remove(&mut self, id: NodeId) {
        self.edges.remove(&id);
        for set in self.edges.values_mut() {
            set.remove(&id);
        }
    }
}
