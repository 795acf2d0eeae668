// Basic Dissemination Simulator Example
//
// The basic contract: every delivery succeeds, no failures, no topology.

mod dissemination;

use dissemination::{DisseminationConfig, DisseminationRunner};
use gs_rust::EngineConfig;
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new().init().unwrap();

    println!("╔════════════════════════════════════════════════════════╗");
    println!("║    Basic Dissemination Simulator                       ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    let mut config = DisseminationConfig::default();
    config.engine = EngineConfig {
        node_count: 50,
        fanout: 2,
        delivery_probability: 1.0,
        ..EngineConfig::default()
    };
    config.rounds = 50;
    config.output.enable_console = true;

    println!("Starting simulation...");
    println!("  Nodes: {}", config.engine.node_count);
    println!("  Fanout: {}", config.engine.fanout);
    println!("  Delivery: {:.2}\n", config.engine.delivery_probability);

    let runner = DisseminationRunner::new(config);
    let result = runner.run();

    result.print_summary();

    println!("\n✓ Simulation complete!");
}
