// Round Executor - the dissemination state machine

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::gs_interface::{
    EngineEvent, EventSink, ExecutorState, NoOpSink, NodeId, Round, RoundScheduler,
    TransferRecord, DEFAULT_FANOUT, DEFAULT_NODE_COUNT, DEFAULT_ROUND_DELAY_MS,
    FAULT_TOLERANT_DELIVERY, MIN_ROUND_DELAY_MS, NEIGHBOR_RADIUS,
};
use crate::gs_registry::{Node, NodeRegistry};
use crate::gs_selection::{select, Assignment, TargetPool};
use crate::gs_topology::Membership;

// ============================================================================
// Configuration
// ============================================================================

/// Engine configuration, supplied by the host UI / scenario file.
///
/// All values are clamped at the boundary by `normalized` - invalid input
/// falls back to the nearest valid bound, never a hard error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the node set (>= 1)
    pub node_count: usize,

    /// Max targets per sender per round (>= 1)
    pub fanout: usize,

    /// Time between automatic round advances (>= 1000)
    pub round_delay_ms: u64,

    /// Per-assignment delivery success probability (0.0 - 1.0)
    pub delivery_probability: f64,

    /// Restrict spread to proximity neighbors (fixed radius)
    pub topology_enabled: bool,

    /// Carry a global data value with each delivery
    pub payload_enabled: bool,

    /// Random seed for reproducibility
    pub seed: Option<[u8; 32]>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_count: DEFAULT_NODE_COUNT,
            fanout: DEFAULT_FANOUT,
            round_delay_ms: DEFAULT_ROUND_DELAY_MS,
            delivery_probability: 1.0,
            topology_enabled: false,
            payload_enabled: false,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// The fault-tolerant contract: lossy delivery at the classic 0.7
    pub fn fault_tolerant() -> Self {
        Self {
            delivery_probability: FAULT_TOLERANT_DELIVERY,
            ..Self::default()
        }
    }

    /// Clamp every field to its valid range
    pub fn normalized(mut self) -> Self {
        // upper bound is the id space: ids are assigned 0..node_count
        self.node_count = self.node_count.clamp(1, NodeId::MAX as usize);
        self.fanout = self.fanout.max(1);
        self.round_delay_ms = self.round_delay_ms.max(MIN_ROUND_DELAY_MS);
        self.delivery_probability = if self.delivery_probability.is_nan() {
            1.0
        } else {
            self.delivery_probability.clamp(0.0, 1.0)
        };
        self
    }
}

// ============================================================================
// Engine
// ============================================================================

struct RoundOutcome {
    senders: usize,
    assigned: usize,
    delivered: usize,
}

/// The round-based dissemination engine.
///
/// Single-threaded and synchronous: every entry point completes its mutation
/// before returning, so no two rounds can interleave and readers only ever
/// see post-mutation snapshots. Timing lives behind `RoundScheduler`; a
/// timer that fires after pause/reset finds the engine not `Running` and
/// does nothing.
pub struct GossipEngine {
    config: EngineConfig,
    seed: [u8; 32],
    rng: StdRng,

    registry: NodeRegistry,
    membership: Option<Membership>,

    state: ExecutorState,
    round: Round,

    /// Current display window of committed deliveries
    transfers: Vec<TransferRecord>,
    /// Draw staged by `select_targets`, committed by `send_to_selected`
    pending_selection: Option<Vec<Assignment>>,

    sink: Box<dyn EventSink>,
}

impl GossipEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_sink(config, Box::new(NoOpSink))
    }

    pub fn with_sink(config: EngineConfig, sink: Box<dyn EventSink>) -> Self {
        let config = config.normalized();
        let seed = config.seed.unwrap_or_else(random_seed);
        let mut rng = StdRng::from_seed(seed);
        let registry =
            NodeRegistry::initialize(config.node_count, config.payload_enabled, &mut rng);
        let membership = config
            .topology_enabled
            .then(|| Membership::compute(&registry, NEIGHBOR_RADIUS));

        Self {
            config,
            seed,
            rng,
            registry,
            membership,
            state: ExecutorState::Idle,
            round: 0,
            transfers: Vec::new(),
            pending_selection: None,
            sink,
        }
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Idle/Paused -> Running. A fresh start executes round 1 synchronously
    /// before the first delay; resuming from pause just re-arms the timer.
    pub fn start(&mut self, sched: &mut dyn RoundScheduler) {
        match self.state {
            ExecutorState::Idle => {
                self.state = ExecutorState::Running;
                log::info!("engine started ({} nodes)", self.registry.len());
                self.advance(sched);
            }
            ExecutorState::Paused => {
                self.state = ExecutorState::Running;
                sched.schedule_next(self.config.round_delay_ms);
            }
            _ => {}
        }
    }

    /// Running -> Paused. Halts the timer, mutates nothing.
    pub fn pause(&mut self, sched: &mut dyn RoundScheduler) {
        if self.state == ExecutorState::Running {
            self.state = ExecutorState::Paused;
            sched.cancel_pending();
        }
    }

    /// The tick. Ignores stale firings (anything outside `Running`).
    pub fn on_timer(&mut self, sched: &mut dyn RoundScheduler) {
        if self.state != ExecutorState::Running {
            return;
        }
        self.advance(sched);
    }

    /// Any state -> Idle. Cancels pending work, reinitializes the node set
    /// deterministically from the current configuration, round back to 0.
    pub fn reset(&mut self, sched: &mut dyn RoundScheduler) {
        sched.cancel_pending();
        self.seed = self.config.seed.unwrap_or_else(random_seed);
        self.rng = StdRng::from_seed(self.seed);
        self.registry.reset(
            self.config.node_count,
            self.config.payload_enabled,
            &mut self.rng,
        );
        self.membership = self
            .config
            .topology_enabled
            .then(|| Membership::compute(&self.registry, NEIGHBOR_RADIUS));
        self.state = ExecutorState::Idle;
        self.round = 0;
        self.transfers.clear();
        self.pending_selection = None;
        self.sink.log(0, EngineEvent::EngineReset);
    }

    /// Swap in a new configuration. Cancels pending work and restarts from a
    /// fresh node set - a changed parameter invalidates the running spread.
    pub fn reconfigure(&mut self, config: EngineConfig, sched: &mut dyn RoundScheduler) {
        self.config = config.normalized();
        self.reset(sched);
    }

    /// Theoretical saturation bound `ceil(log(n) / log(fanout))`, advisory.
    /// Undefined for fanout 1 (log base 1): no automatic bound, the
    /// all-informed check alone terminates the loop.
    pub fn max_rounds(&self) -> Option<Round> {
        if self.config.fanout <= 1 {
            return None;
        }
        let n = self.config.node_count as f64;
        let f = self.config.fanout as f64;
        Some((n.ln() / f.ln()).ceil() as Round)
    }

    fn advance(&mut self, sched: &mut dyn RoundScheduler) {
        if self.registry.all_reachable_informed() {
            return self.converge(sched);
        }
        if let Some(max) = self.max_rounds() {
            if self.round >= max {
                return self.converge(sched);
            }
        }

        let outcome = self.execute_round();

        // no non-failed informed node left, or full coverage: stop
        if outcome.senders == 0 || self.registry.all_reachable_informed() {
            self.converge(sched);
        } else {
            sched.schedule_next(self.config.round_delay_ms);
        }
    }

    fn converge(&mut self, sched: &mut dyn RoundScheduler) {
        self.state = ExecutorState::Converged;
        sched.cancel_pending();
        let informed = self.registry.informed_count();
        let total = self.registry.len();
        log::info!(
            "converged after round {}: {}/{} informed",
            self.round,
            informed,
            total
        );
        self.sink
            .log(self.round, EngineEvent::Converged { informed, total });
    }

    // ========================================================================
    // Round execution
    // ========================================================================

    /// One round: snapshot senders, draw from the shared shrinking pool,
    /// gate each assignment on an independent delivery draw, mutate.
    fn execute_round(&mut self) -> RoundOutcome {
        let senders = self.registry.senders();
        let mut pool = TargetPool::new(self.registry.eligible_targets());
        let assignments = select(
            &senders,
            &mut pool,
            self.membership.as_ref(),
            self.config.fanout,
            &mut self.rng,
        );

        self.round += 1;
        // previous round's display window ends here
        self.transfers.clear();

        let mut delivered = 0;
        for a in &assignments {
            if self.rng.gen_bool(self.config.delivery_probability) {
                if self.commit_delivery(*a) {
                    delivered += 1;
                }
            } else {
                self.sink.log(
                    self.round,
                    EngineEvent::DeliveryDropped {
                        source: a.source,
                        target: a.target,
                    },
                );
            }
        }

        log::debug!(
            "round {}: {} senders, {} assigned, {} delivered, {}/{} informed",
            self.round,
            senders.len(),
            assignments.len(),
            delivered,
            self.registry.informed_count(),
            self.registry.len()
        );
        self.sink.log(
            self.round,
            EngineEvent::RoundExecuted {
                senders: senders.len(),
                assigned: assignments.len(),
                delivered,
            },
        );

        RoundOutcome {
            senders: senders.len(),
            assigned: assignments.len(),
            delivered,
        }
    }

    /// Mark the target informed and record the transfer. Returns false when
    /// the target can no longer receive (failed/removed in the meantime).
    fn commit_delivery(&mut self, a: Assignment) -> bool {
        if !self.registry.infect(a.target) {
            return false;
        }
        let seq = if self.config.payload_enabled {
            self.registry
                .get(a.target)
                .and_then(|n| n.payload.len().checked_sub(1))
        } else {
            None
        };
        self.transfers.push(TransferRecord {
            source: a.source,
            target: a.target,
            round: self.round,
            seq,
        });
        self.sink.log(
            self.round,
            EngineEvent::NodeInformed {
                node: a.target,
                source: a.source,
            },
        );
        true
    }

    // ========================================================================
    // Manual "send message" path
    // ========================================================================

    /// One selection-policy draw under the same eligibility rules as the
    /// automatic path, staged without executing delivery. Returns the staged
    /// pairs for display.
    pub fn select_targets(&mut self) -> &[Assignment] {
        let senders = self.registry.senders();
        let mut pool = TargetPool::new(self.registry.eligible_targets());
        let assignments = select(
            &senders,
            &mut pool,
            self.membership.as_ref(),
            self.config.fanout,
            &mut self.rng,
        );
        self.pending_selection.insert(assignments).as_slice()
    }

    /// Commit the staged draw at 100% delivery (no probability gate) and
    /// advance the round by one. With nothing staged, or a staged draw whose
    /// targets have all since become ineligible, this is a reported no-op:
    /// no round advance, no mutation.
    pub fn send_to_selected(&mut self) -> bool {
        let Some(assignments) = self.pending_selection.take() else {
            return false;
        };
        // re-validate against the current node set: targets informed, failed
        // or removed since the draw are dropped
        let assignments: Vec<Assignment> = assignments
            .into_iter()
            .filter(|a| {
                self.registry.contains(a.source)
                    && self
                        .registry
                        .get(a.target)
                        .map_or(false, |n| n.status.is_target())
            })
            .collect();
        if assignments.is_empty() {
            return false;
        }

        self.round += 1;
        self.transfers.clear();
        for a in assignments {
            self.commit_delivery(a);
        }
        true
    }

    /// The currently staged draw, if any
    pub fn pending_selection(&self) -> Option<&[Assignment]> {
        self.pending_selection.as_deref()
    }

    // ========================================================================
    // Manual interventions
    // ========================================================================

    /// Directly inform a node (UI click). Same transition rules as delivery.
    pub fn infect(&mut self, id: NodeId) -> bool {
        if !self.registry.infect(id) {
            return false;
        }
        self.sink.log(
            self.round,
            EngineEvent::NodeInformed {
                node: id,
                source: id,
            },
        );
        true
    }

    /// Flip a node's failed flag (UI click)
    pub fn toggle_failure(&mut self, id: NodeId) -> Option<bool> {
        let failed = self.registry.toggle_failure(id)?;
        self.sink.log(
            self.round,
            if failed {
                EngineEvent::NodeFailed { node: id }
            } else {
                EngineEvent::NodeRecovered { node: id }
            },
        );
        Some(failed)
    }

    /// Remove a node (admin action) and prune every dangling reference:
    /// membership edges, staged selection pairs, live transfer records.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.registry.remove(id) {
            return false;
        }
        if let Some(membership) = &mut self.membership {
            membership.remove(id);
        }
        self.transfers
            .retain(|t| t.source != id && t.target != id);
        if let Some(selection) = &mut self.pending_selection {
            selection.retain(|a| a.source != id && a.target != id);
        }
        self.sink.log(self.round, EngineEvent::NodeRemoved { node: id });
        true
    }

    // ========================================================================
    // Read surface (renderer snapshots)
    // ========================================================================

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Seed actually in use (reported so a run can be replayed)
    pub fn seed_used(&self) -> [u8; 32] {
        self.seed
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.registry.nodes()
    }

    pub fn membership(&self) -> Option<&Membership> {
        self.membership.as_ref()
    }

    /// Transfer records of the current display window
    pub fn transfers(&self) -> &[TransferRecord] {
        &self.transfers
    }

    /// End the display window early (renderer fade-out timer fired)
    pub fn clear_transfers(&mut self) {
        self.transfers.clear();
    }
}

fn random_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);
    seed
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gs_interface::VecSink;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    /// Scheduler that records the pending delay instead of owning a timer
    #[derive(Default)]
    struct TestScheduler {
        pending: Option<u64>,
    }

    impl RoundScheduler for TestScheduler {
        fn schedule_next(&mut self, delay_ms: u64) {
            self.pending = Some(delay_ms);
        }
        fn cancel_pending(&mut self) {
            self.pending = None;
        }
    }

    fn seeded(config: EngineConfig, seed: u64) -> EngineConfig {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&seed.to_le_bytes());
        EngineConfig {
            seed: Some(bytes),
            ..config
        }
    }

    /// Drive the timer loop until the engine stops scheduling
    fn run_to_completion(engine: &mut GossipEngine, sched: &mut TestScheduler) {
        engine.start(sched);
        let mut guard = 0;
        while sched.pending.take().is_some() {
            engine.on_timer(sched);
            guard += 1;
            assert!(guard < 10_000, "engine never stopped scheduling");
        }
    }

    #[test]
    fn test_config_clamping() {
        let config = EngineConfig {
            node_count: 0,
            fanout: 0,
            round_delay_ms: 3,
            delivery_probability: 7.5,
            ..EngineConfig::default()
        }
        .normalized();
        assert_eq!(config.node_count, 1);
        assert_eq!(config.fanout, 1);
        assert_eq!(config.round_delay_ms, MIN_ROUND_DELAY_MS);
        assert_eq!(config.delivery_probability, 1.0);

        let config = EngineConfig {
            delivery_probability: -0.5,
            ..EngineConfig::default()
        }
        .normalized();
        assert_eq!(config.delivery_probability, 0.0);

        // node ids are u32: a wider count clamps to the id space
        let config = EngineConfig {
            node_count: usize::MAX,
            ..EngineConfig::default()
        }
        .normalized();
        assert_eq!(config.node_count, NodeId::MAX as usize);

        let config = EngineConfig {
            delivery_probability: f64::NAN,
            ..EngineConfig::default()
        }
        .normalized();
        assert_eq!(config.delivery_probability, 1.0);
    }

    #[test]
    fn test_max_rounds() {
        let engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 10,
                fanout: 2,
                ..EngineConfig::default()
            },
            1,
        ));
        assert_eq!(engine.max_rounds(), Some(4)); // ceil(ln 10 / ln 2)

        let engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 10,
                fanout: 1,
                ..EngineConfig::default()
            },
            1,
        ));
        assert_eq!(engine.max_rounds(), None); // log base 1 guard

        let engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 1,
                fanout: 3,
                ..EngineConfig::default()
            },
            1,
        ));
        assert_eq!(engine.max_rounds(), Some(0));
    }

    #[test]
    fn test_fresh_start_executes_round_one() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 10,
                fanout: 2,
                ..EngineConfig::default()
            },
            42,
        ));
        let mut sched = TestScheduler::default();

        assert_eq!(engine.state(), ExecutorState::Idle);
        engine.start(&mut sched);
        assert_eq!(engine.round(), 1);
        assert_eq!(engine.state(), ExecutorState::Running);
        assert_eq!(sched.pending, Some(DEFAULT_ROUND_DELAY_MS));
    }

    #[test]
    fn test_scenario_a_five_nodes_fanout_two() {
        // 5 nodes, fanout 2, p = 1.0: round 1 informs at most 2 more,
        // round 2 covers the rest
        for seed in 0..20 {
            let mut engine = GossipEngine::new(seeded(
                EngineConfig {
                    node_count: 5,
                    fanout: 2,
                    ..EngineConfig::default()
                },
                seed,
            ));
            let mut sched = TestScheduler::default();

            engine.start(&mut sched);
            assert_eq!(engine.round(), 1);
            assert!(engine.registry().informed_count() <= 3);

            engine.on_timer(&mut sched);
            assert_eq!(engine.round(), 2);
            assert_eq!(engine.registry().informed_count(), 5);
        }
    }

    #[test]
    fn test_scenario_b_failed_seed_yields_empty_selection() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 10,
                fanout: 1,
                ..EngineConfig::default()
            },
            9,
        ));
        engine.toggle_failure(0);
        assert!(engine.select_targets().is_empty());
        // and committing the empty draw is a reported no-op
        assert!(!engine.send_to_selected());
        assert_eq!(engine.round(), 0);
    }

    #[test]
    fn test_scenario_c_zero_delivery_probability() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 10,
                fanout: 2,
                delivery_probability: 0.0,
                ..EngineConfig::default()
            },
            5,
        ));
        let max = engine.max_rounds().unwrap();
        let mut sched = TestScheduler::default();

        engine.start(&mut sched);
        // rounds advance without any spread, and the engine does not falsely
        // converge while the advisory bound has budget left
        while engine.round() < max {
            assert_eq!(engine.state(), ExecutorState::Running);
            engine.on_timer(&mut sched);
        }
        assert_eq!(engine.registry().informed_count(), 1);

        // bound exhausted: next tick stops without full coverage
        engine.on_timer(&mut sched);
        assert_eq!(engine.state(), ExecutorState::Converged);
        assert_eq!(engine.round(), max);
        assert_eq!(engine.registry().informed_count(), 1);
        assert_eq!(sched.pending, None);
    }

    #[test]
    fn test_full_convergence_within_bound() {
        for (node_count, fanout) in [(2, 2), (5, 2), (10, 2), (50, 3), (100, 4)] {
            let mut engine = GossipEngine::new(seeded(
                EngineConfig {
                    node_count,
                    fanout,
                    ..EngineConfig::default()
                },
                node_count as u64,
            ));
            let mut sched = TestScheduler::default();
            run_to_completion(&mut engine, &mut sched);

            assert_eq!(engine.state(), ExecutorState::Converged);
            assert_eq!(engine.registry().informed_count(), node_count);
            let bound = ((node_count as f64).ln() / (fanout.max(2) as f64).ln()).ceil() as Round;
            assert!(
                engine.round() <= bound,
                "n={} f={}: {} rounds > bound {}",
                node_count,
                fanout,
                engine.round(),
                bound
            );
        }
    }

    #[test]
    fn test_fanout_one_converges() {
        let node_count = 10;
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count,
                fanout: 1,
                ..EngineConfig::default()
            },
            3,
        ));
        let mut sched = TestScheduler::default();
        run_to_completion(&mut engine, &mut sched);

        assert_eq!(engine.state(), ExecutorState::Converged);
        assert_eq!(engine.registry().informed_count(), node_count);
        assert!(engine.round() <= (node_count - 1) as Round);
    }

    #[test]
    fn test_single_node_converges_immediately() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 1,
                ..EngineConfig::default()
            },
            1,
        ));
        let mut sched = TestScheduler::default();
        engine.start(&mut sched);
        assert_eq!(engine.state(), ExecutorState::Converged);
        assert_eq!(engine.round(), 0);
        assert_eq!(sched.pending, None);
    }

    #[test]
    fn test_round_targets_are_fresh_and_unique() {
        let sink = Rc::new(RefCell::new(VecSink::default()));
        let mut engine = GossipEngine::with_sink(
            seeded(
                EngineConfig {
                    node_count: 30,
                    fanout: 3,
                    ..EngineConfig::default()
                },
                13,
            ),
            Box::new(sink.clone()),
        );
        let mut sched = TestScheduler::default();
        engine.start(&mut sched);

        loop {
            let eligible: HashSet<NodeId> =
                engine.registry().eligible_targets().into_iter().collect();
            sink.borrow_mut().events.clear();
            if engine.state() != ExecutorState::Running {
                break;
            }
            engine.on_timer(&mut sched);

            let mut seen = HashSet::new();
            for (_, event) in &sink.borrow().events {
                if let EngineEvent::NodeInformed { node, .. } = event {
                    // subset of the pre-round uninformed, non-failed pool
                    assert!(eligible.contains(node));
                    // no double-informing within the round
                    assert!(seen.insert(*node));
                }
            }
        }
    }

    #[test]
    fn test_pause_resume_and_stale_timer() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 50,
                fanout: 2,
                ..EngineConfig::default()
            },
            8,
        ));
        let mut sched = TestScheduler::default();

        engine.start(&mut sched);
        let round = engine.round();

        engine.pause(&mut sched);
        assert_eq!(engine.state(), ExecutorState::Paused);
        assert_eq!(sched.pending, None);

        // a timer firing after the pause is ignored
        engine.on_timer(&mut sched);
        assert_eq!(engine.round(), round);

        // resuming re-arms without executing a round
        engine.start(&mut sched);
        assert_eq!(engine.state(), ExecutorState::Running);
        assert_eq!(engine.round(), round);
        assert_eq!(sched.pending, Some(DEFAULT_ROUND_DELAY_MS));

        engine.on_timer(&mut sched);
        assert_eq!(engine.round(), round + 1);
    }

    #[test]
    fn test_reset_is_idempotent_and_cancels() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 20,
                fanout: 2,
                ..EngineConfig::default()
            },
            21,
        ));
        let mut sched = TestScheduler::default();

        engine.start(&mut sched);
        engine.toggle_failure(5);
        engine.reset(&mut sched);
        engine.reset(&mut sched);

        assert_eq!(engine.state(), ExecutorState::Idle);
        assert_eq!(engine.round(), 0);
        assert_eq!(engine.registry().informed_count(), 1);
        assert_eq!(engine.registry().failed_count(), 0);
        assert!(engine.transfers().is_empty());
        assert!(engine.pending_selection().is_none());
        assert_eq!(sched.pending, None);

        // a stale timer against the reinitialized node set does nothing
        engine.on_timer(&mut sched);
        assert_eq!(engine.round(), 0);
    }

    #[test]
    fn test_reconfigure_mid_run_restarts_from_idle() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 20,
                fanout: 2,
                ..EngineConfig::default()
            },
            17,
        ));
        let mut sched = TestScheduler::default();

        engine.start(&mut sched);
        engine.on_timer(&mut sched);
        assert!(engine.round() >= 2);

        // a changed parameter invalidates the running spread: pending work
        // cancelled, node set rebuilt at the new size, back to the seed
        // invariant
        engine.reconfigure(
            seeded(
                EngineConfig {
                    node_count: 7,
                    fanout: 3,
                    ..EngineConfig::default()
                },
                18,
            ),
            &mut sched,
        );
        assert_eq!(sched.pending, None);
        assert_eq!(engine.state(), ExecutorState::Idle);
        assert_eq!(engine.round(), 0);
        assert_eq!(engine.registry().len(), 7);
        assert_eq!(engine.registry().informed_count(), 1);
        assert_eq!(engine.config().fanout, 3);
        assert!(engine.transfers().is_empty());

        // and clamping applies to the incoming configuration too
        engine.reconfigure(
            EngineConfig {
                node_count: 0,
                ..EngineConfig::default()
            },
            &mut sched,
        );
        assert_eq!(engine.config().node_count, 1);
    }

    #[test]
    fn test_seeded_runs_replay_identically() {
        let run = || {
            let mut engine = GossipEngine::new(seeded(
                EngineConfig {
                    node_count: 40,
                    fanout: 2,
                    delivery_probability: 0.7,
                    ..EngineConfig::default()
                },
                99,
            ));
            let mut sched = TestScheduler::default();
            run_to_completion(&mut engine, &mut sched);
            (
                engine.round(),
                engine.registry().informed_count(),
                engine.seed_used(),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_manual_send_path() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 10,
                fanout: 2,
                // the manual path has no probability gate
                delivery_probability: 0.0,
                ..EngineConfig::default()
            },
            4,
        ));

        // nothing staged: reported no-op, round untouched
        assert!(!engine.send_to_selected());
        assert_eq!(engine.round(), 0);

        let staged = engine.select_targets().to_vec();
        assert_eq!(staged.len(), 2);
        assert_eq!(engine.registry().informed_count(), 1);

        assert!(engine.send_to_selected());
        assert_eq!(engine.round(), 1);
        assert_eq!(engine.registry().informed_count(), 3);
        for a in &staged {
            assert!(engine.registry().get(a.target).unwrap().informed());
        }
        assert_eq!(engine.transfers().len(), 2);

        // the draw is consumed on commit
        assert!(!engine.send_to_selected());
        assert_eq!(engine.round(), 1);
    }

    #[test]
    fn test_manual_send_revalidates_staged_targets() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 10,
                fanout: 3,
                ..EngineConfig::default()
            },
            16,
        ));
        let staged = engine.select_targets().to_vec();
        assert_eq!(staged.len(), 3);

        // one staged target fails before the commit
        let dropped = staged[0].target;
        engine.toggle_failure(dropped);

        assert!(engine.send_to_selected());
        assert!(!engine.registry().get(dropped).unwrap().informed());
        assert_eq!(engine.registry().informed_count(), 3);
    }

    #[test]
    fn test_failed_node_is_skipped_for_entire_round() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 5,
                fanout: 10,
                ..EngineConfig::default()
            },
            2,
        ));
        let mut sched = TestScheduler::default();
        engine.toggle_failure(3);

        run_to_completion(&mut engine, &mut sched);
        assert_eq!(engine.state(), ExecutorState::Converged);

        let node = engine.registry().get(3).unwrap();
        assert!(node.failed());
        assert!(!node.informed());
        // everyone reachable is informed
        assert_eq!(engine.registry().informed_count(), 4);

        // recovery does not retroactively inform
        engine.toggle_failure(3);
        assert!(!engine.registry().get(3).unwrap().informed());
    }

    #[test]
    fn test_remove_node_prunes_references() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 8,
                fanout: 2,
                topology_enabled: true,
                ..EngineConfig::default()
            },
            6,
        ));
        let staged: Vec<Assignment> = engine.select_targets().to_vec();

        let victim = staged.first().map(|a| a.target).unwrap_or(1);
        assert!(engine.remove_node(victim));
        assert!(!engine.registry().contains(victim));
        assert!(engine.membership().unwrap().neighbors(victim).is_none());
        assert!(engine
            .pending_selection()
            .unwrap()
            .iter()
            .all(|a| a.source != victim && a.target != victim));

        // removing an unknown id degrades to nothing
        assert!(!engine.remove_node(victim));

        // the surviving staged pairs still commit cleanly
        engine.send_to_selected();
        assert!(engine
            .transfers()
            .iter()
            .all(|t| t.source != victim && t.target != victim));
    }

    #[test]
    fn test_topology_spread_follows_edges() {
        let sink = Rc::new(RefCell::new(VecSink::default()));
        let mut engine = GossipEngine::with_sink(
            seeded(
                EngineConfig {
                    node_count: 60,
                    fanout: 2,
                    topology_enabled: true,
                    ..EngineConfig::default()
                },
                31,
            ),
            Box::new(sink.clone()),
        );
        let mut sched = TestScheduler::default();

        engine.start(&mut sched);
        let mut guard = 0;
        while sched.pending.take().is_some() && guard < 200 {
            engine.on_timer(&mut sched);
            guard += 1;
        }

        let membership = engine.membership().unwrap();
        for (_, event) in &sink.borrow().events {
            if let EngineEvent::NodeInformed { node, source } = event {
                if node != source {
                    assert!(membership.are_neighbors(*source, *node));
                }
            }
        }
    }

    #[test]
    fn test_payload_mode_copies_value_everywhere() {
        let mut engine = GossipEngine::new(seeded(
            EngineConfig {
                node_count: 12,
                fanout: 2,
                payload_enabled: true,
                ..EngineConfig::default()
            },
            44,
        ));
        let mut sched = TestScheduler::default();
        let value = engine.registry().global_payload().unwrap().value;

        run_to_completion(&mut engine, &mut sched);

        for node in engine.nodes() {
            assert_eq!(node.payload, vec![value]);
        }
        // every transfer of the final round carries a sequence index
        for t in engine.transfers() {
            assert_eq!(t.seq, Some(0));
        }
    }

    #[test]
    fn test_topology_converges_or_stalls_without_panic() {
        // disconnected clusters may leave coverage incomplete; the executor
        // must still terminate via the advisory bound
        for seed in 0..10 {
            let mut engine = GossipEngine::new(seeded(
                EngineConfig {
                    node_count: 25,
                    fanout: 2,
                    topology_enabled: true,
                    ..EngineConfig::default()
                },
                seed,
            ));
            let mut sched = TestScheduler::default();
            run_to_completion(&mut engine, &mut sched);
            assert_eq!(engine.state(), ExecutorState::Converged);
        }
    }
}
