// Fault-Tolerant Dissemination Simulator Example
//
// The fault-tolerant contract: lossy delivery at 0.7, with failures injected
// mid-spread and a later partial recovery.

mod dissemination;

use dissemination::{
    DisseminationConfig, DisseminationRunner, EventSchedule, NodeSelection, ScheduledEvent,
    SimEvent,
};
use gs_rust::EngineConfig;
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new().init().unwrap();

    println!("╔════════════════════════════════════════════════════════╗");
    println!("║    Fault-Tolerant Dissemination Simulator              ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    let mut config = DisseminationConfig::default();
    config.engine = EngineConfig {
        node_count: 100,
        fanout: 3,
        ..EngineConfig::fault_tolerant()
    };
    config.rounds = 100;
    config.output.enable_console = true;

    // Knock out a tenth of the network after round 2, recover half of the
    // casualties two rounds later, and checkpoint around the churn
    config.events = EventSchedule {
        events: vec![
            ScheduledEvent {
                round: 2,
                event: SimEvent::FailNodes {
                    selection: NodeSelection::Random { count: 10 },
                },
            },
            ScheduledEvent {
                round: 2,
                event: SimEvent::ReportStats {
                    label: Some("after failure injection".to_string()),
                },
            },
            ScheduledEvent {
                round: 4,
                event: SimEvent::RecoverNodes {
                    selection: NodeSelection::Random { count: 5 },
                },
            },
            ScheduledEvent {
                round: 4,
                event: SimEvent::ReportStats {
                    label: Some("after partial recovery".to_string()),
                },
            },
        ],
    };

    println!("Starting simulation...");
    println!("  Nodes: {}", config.engine.node_count);
    println!("  Fanout: {}", config.engine.fanout);
    println!("  Delivery: {:.2}", config.engine.delivery_probability);
    println!("  Events: {}\n", config.events.events.len());

    let runner = DisseminationRunner::new(config);
    let result = runner.run();

    result.print_summary();

    println!("\n✓ Simulation complete!");
}
