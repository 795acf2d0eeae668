// Selection Policy - bounded random target draws without replacement

use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::Rng;

use crate::gs_interface::NodeId;
use crate::gs_topology::Membership;

/// One `(source, target)` pairing produced by a selection pass
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub source: NodeId,
    pub target: NodeId,
}

// ============================================================================
// Target Pool
// ============================================================================

/// The shared per-round pool of uninformed, non-failed node ids.
///
/// Backed by an `IndexSet` so a uniform draw is `gen_range` +
/// `swap_remove_index`. The pool shrinks as the round progresses - a target
/// handed to one sender is gone for every later sender, which is what rules
/// out double-informing within a round.
pub struct TargetPool {
    ids: IndexSet<NodeId>,
}

impl TargetPool {
    pub fn new(ids: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// Draw one target uniformly from the whole pool, removing it.
    /// Empty pool yields `None`, never an error.
    pub fn draw(&mut self, rng: &mut StdRng) -> Option<NodeId> {
        if self.ids.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.ids.len());
        self.ids.swap_remove_index(idx)
    }

    /// Draw one target uniformly among the pool members the predicate
    /// accepts (the sender's neighbor view), removing it from the shared
    /// pool.
    pub fn draw_where(
        &mut self,
        rng: &mut StdRng,
        eligible: impl Fn(NodeId) -> bool,
    ) -> Option<NodeId> {
        let candidates: Vec<NodeId> = self.ids.iter().copied().filter(|&id| eligible(id)).collect();
        if candidates.is_empty() {
            return None;
        }
        let target = candidates[rng.gen_range(0..candidates.len())];
        self.ids.swap_remove(&target);
        Some(target)
    }

    /// Remove a specific id (node removal / external infect mid-selection)
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.ids.swap_remove(&id)
    }
}

// ============================================================================
// Selection
// ============================================================================

/// For each sender draw up to `min(fanout, |eligible|)` targets without
/// replacement from the shared pool, restricted to the sender's neighbors
/// when a membership is given. Pure selection - no node state is mutated.
///
/// No ordering guarantee across senders; execution order is the sender list
/// order, and the shrinking pool is the only coupling between them.
pub fn select(
    senders: &[NodeId],
    pool: &mut TargetPool,
    membership: Option<&Membership>,
    fanout: usize,
    rng: &mut StdRng,
) -> Vec<Assignment> {
    let mut assignments = Vec::new();

    for &source in senders {
        for _ in 0..fanout {
            let target = match membership {
                None => pool.draw(rng),
                Some(m) => match m.neighbors(source) {
                    Some(neighbors) => pool.draw_where(rng, |id| neighbors.contains(&id)),
                    None => None,
                },
            };
            match target {
                Some(target) => assignments.push(Assignment { source, target }),
                // pool (or neighbor view) exhausted for this sender
                None => break,
            }
        }
    }

    assignments
}
