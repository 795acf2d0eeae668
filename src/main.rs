use log::info;
use rand::Rng;
use simple_logger::SimpleLogger;

use gs_rust::{EngineConfig, ExecutorState, GossipEngine, RoundScheduler};

/// Drives the engine in a plain loop: the pending delay is recorded instead
/// of slept, so the demo runs the whole spread instantly.
#[derive(Default)]
struct LoopScheduler {
    pending: Option<u64>,
}

impl RoundScheduler for LoopScheduler {
    fn schedule_next(&mut self, delay_ms: u64) {
        self.pending = Some(delay_ms);
    }

    fn cancel_pending(&mut self) {
        self.pending = None;
    }
}

fn main() {
    SimpleLogger::new().init().unwrap();

    info!("starting");

    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);

    let config = EngineConfig {
        node_count: 50,
        fanout: 2,
        delivery_probability: 0.7,
        seed: Some(seed),
        ..EngineConfig::default()
    };

    let mut engine = GossipEngine::new(config);
    let mut sched = LoopScheduler::default();

    engine.start(&mut sched);
    report(&engine);

    while sched.pending.take().is_some() {
        engine.on_timer(&mut sched);
        report(&engine);
    }

    let informed = engine.registry().informed_count();
    let total = engine.registry().len();
    info!("let seed = {:?};", engine.seed_used());
    info!(
        "done. state: {:?}, rounds: {} (bound {:?}), coverage: {}/{} ({:.0}%)",
        engine.state(),
        engine.round(),
        engine.max_rounds(),
        informed,
        total,
        informed as f64 / total as f64 * 100.0
    );
}

fn report(engine: &GossipEngine) {
    if engine.state() == ExecutorState::Converged {
        return;
    }
    info!(
        "round {}: {}/{} informed, {} transfers",
        engine.round(),
        engine.registry().informed_count(),
        engine.registry().len(),
        engine.transfers().len()
    );
}
