// all the same numeric type of some size to allow casting/interop
pub type NodeId = u32;
pub type Round = u32;

/// Side of the square field positions are randomized in (renderer viewport)
pub const FIELD_SIZE: f64 = 500.0;

/// Fixed proximity radius for membership edges (not configurable)
pub const NEIGHBOR_RADIUS: f64 = 150.0;

/// Lower bound for the automatic round delay
pub const MIN_ROUND_DELAY_MS: u64 = 1000;
pub const DEFAULT_ROUND_DELAY_MS: u64 = 5000;

pub const DEFAULT_NODE_COUNT: usize = 10;
pub const DEFAULT_FANOUT: usize = 2;

/// Delivery probability of the fault-tolerant contract
pub const FAULT_TOLERANT_DELIVERY: f64 = 0.7;

/// The distinguished initially-informed node
pub const SEED_NODE: NodeId = 0;

/// Node position, owned by the registry for proximity membership only.
/// The protocol never reads coordinates outside of `distance`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ============================================================================
// Node Protocol State
// ============================================================================

/// Protocol state of a node with explicit allowed transitions.
///
/// `Failed` remembers the informed flag the node held when it went down:
/// recovery restores that flag, it never upgrades it, and a node can never
/// become informed while failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeStatus {
    Uninformed,
    Informed,
    Failed { was_informed: bool },
}

impl NodeStatus {
    /// Informed flag as the renderer sees it (failed nodes report the
    /// flag they held when they went down)
    pub fn is_informed(&self) -> bool {
        matches!(
            self,
            NodeStatus::Informed | NodeStatus::Failed { was_informed: true }
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, NodeStatus::Failed { .. })
    }

    /// Eligible to send this round
    pub fn is_sender(&self) -> bool {
        matches!(self, NodeStatus::Informed)
    }

    /// Eligible to receive this round
    pub fn is_target(&self) -> bool {
        matches!(self, NodeStatus::Uninformed)
    }
}

// ============================================================================
// Transfer Records
// ============================================================================

/// One committed `(source, target)` delivery, consumed by the renderer for a
/// bounded display window and then discarded. Never part of protocol state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub round: Round,
    /// Index of the delivered item in the target's payload sequence
    /// (payload-carrying mode only)
    pub seq: Option<usize>,
}

// ============================================================================
// Executor State Machine
// ============================================================================

/// Lifecycle of the round executor
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecutorState {
    /// round = 0, nothing run
    Idle,
    /// actively advancing rounds on a timer or step trigger
    Running,
    /// user-halted, resumable
    Paused,
    /// all reachable nodes informed, or spread exhausted
    Converged,
}

// ============================================================================
// Scheduler Seam
// ============================================================================

/// Timer abstraction decoupling the executor from any event-loop mechanism.
///
/// The executor arms exactly one pending tick at a time and cancels it on
/// pause/reset. The driver owns the clock: when its timer fires it calls
/// `GossipEngine::on_timer`, which ignores stale firings (anything arriving
/// while the engine is not `Running`). Equally implementable as a blocking
/// loop, an actor mailbox, or an async task.
pub trait RoundScheduler {
    fn schedule_next(&mut self, delay_ms: u64);
    fn cancel_pending(&mut self);
}

/// Scheduler for purely manual driving (step-by-step UI, unit tests)
pub struct ManualScheduler;

impl RoundScheduler for ManualScheduler {
    fn schedule_next(&mut self, _delay_ms: u64) {}
    fn cancel_pending(&mut self) {}
}

// ============================================================================
// Event Logging System
// ============================================================================

/// Events emitted by the engine for the renderer, debugging and analysis
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A node learned the rumor
    NodeInformed {
        node: NodeId,
        source: NodeId,
    },
    /// A delivery attempt lost to the probability gate
    DeliveryDropped {
        source: NodeId,
        target: NodeId,
    },
    /// One automatic round finished
    RoundExecuted {
        senders: usize,
        assigned: usize,
        delivered: usize,
    },
    NodeFailed {
        node: NodeId,
    },
    NodeRecovered {
        node: NodeId,
    },
    NodeRemoved {
        node: NodeId,
    },
    /// Automatic advancement stopped
    Converged {
        informed: usize,
        total: usize,
    },
    EngineReset,
}

/// Trait for consuming events from the engine
pub trait EventSink {
    fn log(&mut self, round: Round, event: EngineEvent);
}

/// No-op event sink for production use (zero overhead)
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _round: Round, _event: EngineEvent) {
        // Intentionally empty - compiler should optimize this away
    }
}

/// Shared sinks: the driver keeps a handle and hands the engine a clone
impl<T: EventSink> EventSink for std::rc::Rc<std::cell::RefCell<T>> {
    fn log(&mut self, round: Round, event: EngineEvent) {
        self.borrow_mut().log(round, event);
    }
}

/// Sink that buffers events for later inspection (simulation and tests)
#[derive(Default)]
pub struct VecSink {
    pub events: Vec<(Round, EngineEvent)>,
}

impl EventSink for VecSink {
    fn log(&mut self, round: Round, event: EngineEvent) {
        self.events.push((round, event));
    }
}
