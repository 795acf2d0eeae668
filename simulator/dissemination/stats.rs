// Dissemination Simulator Statistics

use std::fs::File;
use std::io::Write;
use std::path::Path;

use gs_rust::{ExecutorState, Round};

// ============================================================================
// Simulation Result
// ============================================================================

/// Complete simulation result
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Configuration summary
    pub config_summary: String,

    /// Random seed used
    pub seed_used: [u8; 32],

    /// Rounds actually executed
    pub rounds_executed: Round,

    /// Advisory saturation bound the executor ran under
    pub max_rounds: Option<Round>,

    /// Executor state at the end of the run
    pub final_state: ExecutorState,

    /// Final metrics at end of simulation
    pub final_metrics: RoundMetrics,

    /// Historical metrics (sampled at intervals)
    pub metrics_history: Vec<RoundMetrics>,

    /// Coverage analysis
    pub coverage: CoverageAnalysis,

    /// Successful deliveries across the whole run
    pub deliveries_total: usize,

    /// Assignments lost to the probability gate
    pub drops_total: usize,
}

// ============================================================================
// Round Metrics
// ============================================================================

/// Metrics collected at a single round
#[derive(Debug, Clone, Default)]
pub struct RoundMetrics {
    /// Round number
    pub round: Round,

    /// Informed nodes (failed nodes report the flag they held)
    pub informed: usize,

    /// Uninformed nodes
    pub uninformed: usize,

    /// Failed nodes
    pub failed: usize,

    /// Nodes informed during this round
    pub new_informed: usize,

    /// Transfer records in the current display window
    pub transfers: usize,
}

// ============================================================================
// Coverage Analysis
// ============================================================================

/// How far and how fast the rumor spread
#[derive(Debug, Clone)]
pub struct CoverageAnalysis {
    /// Executor reached Converged
    pub converged: bool,

    /// Every non-failed node informed
    pub full_coverage: bool,

    /// Rounds until convergence (when converged)
    pub rounds_to_converge: Option<Round>,

    /// Informed fraction of the surviving node set (0.0 to 100.0)
    pub coverage_percent: f64,
}

// ============================================================================
// Helper Implementations
// ============================================================================

impl SimulationResult {
    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║    DISSEMINATION SIMULATION RESULTS                    ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration: {}", self.config_summary);
        println!(
            "Rounds: {} (advisory bound: {})",
            self.rounds_executed,
            match self.max_rounds {
                Some(max) => max.to_string(),
                None => "none".to_string(),
            }
        );
        println!();

        let metrics = &self.final_metrics;
        println!("═══ Final State ═══");
        println!("  Executor: {:?}", self.final_state);
        println!(
            "  Nodes: {} informed, {} uninformed, {} failed",
            metrics.informed, metrics.uninformed, metrics.failed
        );
        println!();

        println!("═══ Coverage ═══");
        println!("  Coverage: {:.1}%", self.coverage.coverage_percent);
        println!("  Full: {}", self.coverage.full_coverage);
        if let Some(rounds) = self.coverage.rounds_to_converge {
            println!("  Converged after: {} rounds", rounds);
        }
        println!();

        println!("═══ Deliveries ═══");
        println!("  Delivered: {}", self.deliveries_total);
        println!("  Dropped: {}", self.drops_total);
        let attempts = self.deliveries_total + self.drops_total;
        if attempts > 0 {
            println!(
                "  Success Rate: {:.1}%",
                self.deliveries_total as f64 / attempts as f64 * 100.0
            );
        }
        println!();
    }

    /// Export the metrics history as CSV
    pub fn write_csv(&self, path: &Path) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "round,informed,uninformed,failed,new_informed,transfers")?;
        for m in &self.metrics_history {
            writeln!(
                file,
                "{},{},{},{},{},{}",
                m.round, m.informed, m.uninformed, m.failed, m.new_informed, m.transfers
            )?;
        }
        Ok(())
    }
}
