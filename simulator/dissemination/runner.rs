// Dissemination Simulator Runner

use std::cell::RefCell;
use std::rc::Rc;

use gs_rust::gs_interface::{EngineEvent, EventSink, NodeId, Round, RoundScheduler};
use gs_rust::{ExecutorState, GossipEngine};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::config::{DisseminationConfig, NodeSelection, SimEvent};
use super::stats::{CoverageAnalysis, RoundMetrics, SimulationResult};

// ============================================================================
// Core Structures
// ============================================================================

/// Countdown stand-in for the host UI timer: the pending delay is recorded,
/// and the run loop "fires" it immediately.
#[derive(Default)]
pub struct SimScheduler {
    pub pending: Option<u64>,
}

impl RoundScheduler for SimScheduler {
    fn schedule_next(&mut self, delay_ms: u64) {
        self.pending = Some(delay_ms);
    }

    fn cancel_pending(&mut self) {
        self.pending = None;
    }
}

/// Sink counting delivery outcomes across the whole run
#[derive(Default)]
struct SimSink {
    delivered: usize,
    dropped: usize,
}

impl EventSink for SimSink {
    fn log(&mut self, _round: Round, event: EngineEvent) {
        match event {
            EngineEvent::NodeInformed { .. } => self.delivered += 1,
            EngineEvent::DeliveryDropped { .. } => self.dropped += 1,
            _ => {}
        }
    }
}

/// Main simulator runner
pub struct DisseminationRunner {
    config: DisseminationConfig,
    engine: GossipEngine,
    sink: Rc<RefCell<SimSink>>,

    // Event-selection randomness, separate stream from the engine's
    rng: StdRng,

    metrics_history: Vec<RoundMetrics>,
    last_informed: usize,
}

// ============================================================================
// Implementation
// ============================================================================

impl DisseminationRunner {
    /// Create new simulator
    pub fn new(config: DisseminationConfig) -> Self {
        let sink = Rc::new(RefCell::new(SimSink::default()));
        let engine = GossipEngine::with_sink(config.engine.clone(), Box::new(sink.clone()));
        let rng = StdRng::from_seed(engine.seed_used());

        Self {
            config,
            engine,
            sink,
            rng,
            metrics_history: Vec::new(),
            last_informed: 0,
        }
    }

    /// Run the simulation to convergence or the round cap
    pub fn run(mut self) -> SimulationResult {
        let mut sched = SimScheduler::default();

        // round 0 events shape the initial state (pre-seeded failures etc.)
        self.apply_events(0);
        self.last_informed = self.engine.registry().informed_count();

        self.engine.start(&mut sched);
        self.sample();

        let mut ticks = 1;
        while sched.pending.take().is_some() && ticks < self.config.rounds {
            self.apply_events(self.engine.round());
            self.engine.on_timer(&mut sched);
            self.sample();
            ticks += 1;
        }

        self.build_result()
    }

    // ========================================================================
    // Scheduled events
    // ========================================================================

    /// Apply every event scheduled for the given completed round
    fn apply_events(&mut self, round: Round) {
        let due: Vec<SimEvent> = self
            .config
            .events
            .events
            .iter()
            .filter(|e| e.round == round)
            .map(|e| e.event.clone())
            .collect();

        for event in due {
            match event {
                SimEvent::FailNodes { selection } => {
                    for id in self.pick(&selection, false) {
                        self.engine.toggle_failure(id);
                    }
                }
                SimEvent::RecoverNodes { selection } => {
                    for id in self.pick(&selection, true) {
                        self.engine.toggle_failure(id);
                    }
                }
                SimEvent::InfectNode { id } => {
                    self.engine.infect(id);
                }
                SimEvent::RemoveNode { id } => {
                    self.engine.remove_node(id);
                }
                SimEvent::ReportStats { label } => {
                    log::info!(
                        "[round {}] {}: {}/{} informed, {} failed",
                        round,
                        label.as_deref().unwrap_or("checkpoint"),
                        self.engine.registry().informed_count(),
                        self.engine.registry().len(),
                        self.engine.registry().failed_count()
                    );
                }
            }
        }
    }

    /// Resolve a node selection against the live node set. `failed_pool`
    /// picks among failed nodes (recovery), otherwise among non-failed.
    /// Explicit ids already on the requested side are dropped, so a
    /// recover of a healthy node (or a fail of a downed one) is a no-op
    /// rather than a toggle in the wrong direction.
    fn pick(&mut self, selection: &NodeSelection, failed_pool: bool) -> Vec<NodeId> {
        match selection {
            NodeSelection::Specific { ids } => ids
                .iter()
                .copied()
                .filter(|&id| {
                    self.engine
                        .registry()
                        .get(id)
                        .map_or(false, |n| n.failed() == failed_pool)
                })
                .collect(),
            NodeSelection::Random { count } => {
                let candidates: Vec<NodeId> = self
                    .engine
                    .nodes()
                    .filter(|n| n.failed() == failed_pool)
                    .map(|n| n.id)
                    .collect();
                candidates
                    .choose_multiple(&mut self.rng, *count)
                    .copied()
                    .collect()
            }
        }
    }

    // ========================================================================
    // Metrics
    // ========================================================================

    fn sample(&mut self) {
        let round = self.engine.round();
        if round as usize % self.config.metrics.sample_interval.max(1) != 0 {
            return;
        }

        let metrics = self.snapshot_metrics();
        if self.config.output.enable_console {
            log::info!(
                "round {}: {} informed (+{}), {} failed, {} transfers",
                metrics.round,
                metrics.informed,
                metrics.new_informed,
                metrics.failed,
                metrics.transfers
            );
        }
        self.last_informed = metrics.informed;
        self.metrics_history.push(metrics);
    }

    fn snapshot_metrics(&self) -> RoundMetrics {
        let registry = self.engine.registry();
        let informed = registry.informed_count();
        RoundMetrics {
            round: self.engine.round(),
            informed,
            uninformed: registry.len() - informed,
            failed: registry.failed_count(),
            new_informed: informed.saturating_sub(self.last_informed),
            transfers: self.engine.transfers().len(),
        }
    }

    /// Build final simulation result
    fn build_result(self) -> SimulationResult {
        let registry = self.engine.registry();
        let reachable = registry.len() - registry.failed_count();
        let informed_reachable = registry
            .nodes()
            .filter(|n| !n.failed() && n.informed())
            .count();
        let converged = self.engine.state() == ExecutorState::Converged;

        let counts = self.sink.borrow();
        SimulationResult {
            config_summary: format!(
                "Nodes: {}, Fanout: {}, Delivery: {:.2}, Topology: {}, Payload: {}",
                self.config.engine.node_count,
                self.config.engine.fanout,
                self.config.engine.delivery_probability,
                self.config.engine.topology_enabled,
                self.config.engine.payload_enabled,
            ),
            seed_used: self.engine.seed_used(),
            rounds_executed: self.engine.round(),
            max_rounds: self.engine.max_rounds(),
            final_state: self.engine.state(),
            final_metrics: self.snapshot_metrics(),
            metrics_history: self.metrics_history.clone(),
            coverage: CoverageAnalysis {
                converged,
                full_coverage: registry.all_reachable_informed(),
                rounds_to_converge: converged.then(|| self.engine.round()),
                coverage_percent: if reachable > 0 {
                    informed_reachable as f64 / reachable as f64 * 100.0
                } else {
                    0.0
                },
            },
            deliveries_total: counts.delivered,
            drops_total: counts.dropped,
        }
    }
}
