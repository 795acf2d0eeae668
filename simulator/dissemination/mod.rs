// Dissemination Simulator Module

pub mod config;
pub mod runner;
pub mod stats;

// Re-export commonly used types
pub use config::{
    DisseminationConfig, EventSchedule, MetricsConfig, NodeSelection, OutputConfig,
    ScheduledEvent, SimEvent,
};

pub use stats::{CoverageAnalysis, RoundMetrics, SimulationResult};

pub use runner::{DisseminationRunner, SimScheduler};
