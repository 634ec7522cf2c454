//! Worker loop state machine
//!
//! One iteration of a worker is: think (call the oracle), then handle the
//! classified reply, then either think again or stop.
//!
//! - Progress: every non-terminal handling state leads back to `Thinking` or
//!   to `Exhausted`, and the loop spends one iteration per `Thinking` visit
//! - Determinism: unique next state per (state, event)
//! - Terminal states absorb every event

use crate::errors::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Worker execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerState {
    /// Waiting on the oracle
    Thinking,

    /// Blank reply, nudging the model
    EmptyRetry,

    /// Running extracted tool calls
    ToolDispatch,

    /// Tool mentioned without a usable call, warning the model
    HallucinationRetry,

    /// Final answer produced (terminal)
    Done,

    /// Iteration budget spent without an answer (terminal)
    Exhausted,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEvent {
    EmptyReply,
    ToolRequests,
    Hallucination,
    FinalAnswer,
    /// Handling finished and iterations remain
    Resume,
    /// Handling finished and no iterations remain
    BudgetSpent,
}

impl WorkerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Done | WorkerState::Exhausted)
    }

    /// Attempt state transition with validation
    ///
    /// Valid transitions:
    /// 1. Thinking → EmptyRetry          (on: EmptyReply)
    /// 2. Thinking → ToolDispatch        (on: ToolRequests)
    /// 3. Thinking → HallucinationRetry  (on: Hallucination)
    /// 4. Thinking → Done                (on: FinalAnswer)
    /// 5. EmptyRetry | ToolDispatch | HallucinationRetry → Thinking   (on: Resume)
    /// 6. EmptyRetry | ToolDispatch | HallucinationRetry → Exhausted  (on: BudgetSpent)
    /// 7. Done, Exhausted → self
    pub fn transition(&self, event: WorkerEvent) -> Result<WorkerState> {
        use WorkerEvent::*;
        use WorkerState::*;

        let next_state = match (self, event) {
            (Thinking, EmptyReply) => EmptyRetry,
            (Thinking, ToolRequests) => ToolDispatch,
            (Thinking, Hallucination) => HallucinationRetry,
            (Thinking, FinalAnswer) => Done,

            (EmptyRetry | ToolDispatch | HallucinationRetry, Resume) => Thinking,
            (EmptyRetry | ToolDispatch | HallucinationRetry, BudgetSpent) => Exhausted,

            (Done, _) => Done,
            (Exhausted, _) => Exhausted,

            (from, event) => {
                return Err(AgentError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                });
            }
        };

        Ok(next_state)
    }
}
