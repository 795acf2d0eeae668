//! # gsRust - Gossip Scope Dissemination Engine
//!
//! A Rust implementation of a round-based epidemic (gossip) dissemination
//! engine for pedagogical visualization. A fixed set of simulated nodes
//! spreads a rumor round by round: each informed node contacts a bounded
//! random subset of uninformed nodes, deliveries pass an independent
//! probability gate, and failed nodes drop out of both sides of the spread.
//!
//! ## Core Components
//!
//! - **NodeRegistry**: the fixed node arena with protocol state and the
//!   failure model
//! - **Membership**: optional proximity-based neighbor restriction
//! - **Selection Policy**: bounded random target draws without replacement
//!   from a shared per-round pool
//! - **GossipEngine**: the round executor state machine
//!   (Idle/Running/Paused/Converged), manual send path, transfer records
//!
//! ## Usage with a Renderer
//!
//! The engine is renderer-agnostic. A host UI:
//! 1. Builds an `EngineConfig` (invalid values are clamped, never rejected)
//! 2. Implements `RoundScheduler` on top of its timer mechanism
//! 3. Calls `start`/`pause`/`reset` and forwards timer firings to
//!    `GossipEngine::on_timer`
//! 4. Renders node snapshots and the current `TransferRecord` window after
//!    each transition
//!
//! ```no_run
//! use gs_rust::{EngineConfig, GossipEngine, ManualScheduler};
//!
//! let mut engine = GossipEngine::new(EngineConfig::default());
//! let mut sched = ManualScheduler;
//!
//! engine.start(&mut sched);
//! // on each timer firing:
//! engine.on_timer(&mut sched);
//! for node in engine.nodes() {
//!     // render node.id, node.informed(), node.failed()
//! }
//! ```
//!
//! ## Testing and Simulation
//!
//! For driving the engine without a UI, see the separate simulation
//! framework in `simulator/`. It provides scenario files, scheduled
//! failure/recovery events and per-round metrics.

// Core engine modules
pub mod gs_interface;
pub mod gs_registry;
pub mod gs_selection;
pub mod gs_topology;

pub mod gs_executor;

// Re-export commonly used types
pub use gs_executor::{EngineConfig, GossipEngine};
pub use gs_interface::{
    EngineEvent, EventSink, ExecutorState, ManualScheduler, NoOpSink, NodeId, NodeStatus,
    Position, Round, RoundScheduler, TransferRecord, VecSink, FAULT_TOLERANT_DELIVERY,
    NEIGHBOR_RADIUS, SEED_NODE,
};
pub use gs_registry::{GlobalPayload, Node, NodeRegistry};
pub use gs_selection::{Assignment, TargetPool};
pub use gs_topology::Membership;
