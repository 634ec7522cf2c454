//! Agent crew
//!
//! Worker loop, reply classification, Supervisor routing and the graph that
//! wires them together.

pub mod classify;
pub mod graph;
pub mod router;
pub mod state;
pub mod worker;

// Re-export commonly used types
pub use classify::{classify, Hallucination, ReplyClass};
pub use graph::{ConversationGraph, GraphNode, NodeEvent, ShutdownSignal, TurnOutcome, TurnReport};
pub use router::{resolve_route, Route, RoutingDecision, SupervisorRouter};
pub use state::{WorkerEvent, WorkerState};
pub use worker::{WorkerConfig, WorkerLoop, WorkerOutcome};
