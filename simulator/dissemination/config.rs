// Dissemination Simulator Configuration

use gs_rust::gs_interface::{NodeId, Round};
use gs_rust::EngineConfig;
use serde::{Deserialize, Serialize};

// ============================================================================
// Main Configuration
// ============================================================================

/// Main configuration for a dissemination simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisseminationConfig {
    /// Cap on driven rounds (safety bound; the engine usually converges first)
    pub rounds: usize,

    /// Engine configuration (clamped by the engine at the boundary)
    pub engine: EngineConfig,

    /// Scheduled interventions
    pub events: EventSchedule,

    /// Metrics tracking configuration
    pub metrics: MetricsConfig,

    /// Output configuration
    pub output: OutputConfig,
}

// ============================================================================
// Event Scheduling
// ============================================================================

/// Schedule of interventions applied while the simulation runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSchedule {
    pub events: Vec<ScheduledEvent>,
}

/// A single scheduled intervention.
///
/// `round` is the round number after which the event fires: round 0 events
/// apply before the spread starts, round N events apply once round N has
/// completed and before round N+1 executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub round: Round,
    pub event: SimEvent,
}

/// Types of interventions (the UI actions, driven headlessly)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimEvent {
    /// Fail nodes (excluded from sending and receiving from the next round)
    FailNodes { selection: NodeSelection },

    /// Recover nodes (eligible again, informed flag restored as held)
    RecoverNodes { selection: NodeSelection },

    /// Directly inform a node (the UI click)
    InfectNode { id: NodeId },

    /// Remove a node outright (admin action)
    RemoveNode { id: NodeId },

    /// Print a labelled progress report
    ReportStats { label: Option<String> },
}

/// Methods for selecting which nodes to affect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeSelection {
    /// Random selection among live candidates
    Random { count: usize },

    /// Specific node IDs
    Specific { ids: Vec<NodeId> },
}

// ============================================================================
// Metrics Configuration
// ============================================================================

/// Configuration for metrics tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// How often to sample metrics (every N rounds)
    pub sample_interval: usize,
}

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output and logging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Log per-round progress to the console
    pub enable_console: bool,

    /// CSV output file path
    pub csv_path: Option<String>,

    /// Verbose logging
    pub verbose: bool,
}

// ============================================================================
// Default Implementations
// ============================================================================

impl Default for DisseminationConfig {
    fn default() -> Self {
        Self {
            rounds: 100,
            engine: EngineConfig::default(),
            events: EventSchedule::default(),
            metrics: MetricsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { sample_interval: 1 }
    }
}
