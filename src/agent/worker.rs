//! ReAct worker loop
//!
//! A worker repeatedly asks the oracle for its next move, classifies the
//! reply and reacts:
//!
//! - blank reply: record it and nudge
//! - tool calls: dispatch them and feed back one observation
//! - tool mentioned but no usable call: record it and warn about the format
//! - anything else: that is the answer
//!
//! The loop is bounded by `max_iterations` oracle calls. Running out is not
//! an error: the worker answers with [`EXHAUSTED_ANSWER`] and the Supervisor
//! decides what to do about it.

use crate::agent::classify::{classify, Hallucination, ReplyClass};
use crate::agent::state::{WorkerEvent, WorkerState};
use crate::errors::{AgentError, Result};
use crate::llm::SharedOracle;
use crate::parser::StructuredCallExtractor;
use crate::prompts::{
    self, EMPTY_REPLY_NUDGE, EXHAUSTED_ANSWER, MALFORMED_CALL_WARNING, PLANNER, PLAN_CREATED,
};
use crate::tools::executor::ToolDispatcher;
use crate::tools::registry::CapabilitySet;
use crate::types::Message;
use tracing::{debug, info, warn};

/// Default iteration bound per worker turn
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Static description of one worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub name: String,
    pub role_prompt: String,
    pub capabilities: CapabilitySet,
    pub max_iterations: usize,
}

impl WorkerConfig {
    pub fn new(name: impl Into<String>, role_prompt: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            name: name.into(),
            role_prompt: role_prompt.into(),
            capabilities,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Base prompt, tool catalogue and role prompt in one system message
    pub fn system_prompt(&self) -> String {
        prompts::worker_system_prompt(&self.capabilities.catalogue(), &self.role_prompt)
    }
}

/// Result of one worker turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOutcome {
    pub worker: String,
    pub answer: String,
    /// Oracle calls spent
    pub iterations: usize,
    /// The bound was hit without a final answer
    pub exhausted: bool,
}

impl WorkerOutcome {
    /// The answer as it enters the shared transcript
    pub fn to_message(&self) -> Message {
        Message::observation(self.answer.clone()).with_name(self.worker.clone())
    }
}

/// Working state of a single turn
#[derive(Debug)]
struct LoopState {
    state: WorkerState,
    local: Vec<Message>,
    iterations: usize,
    answer: Option<String>,
}

/// Drives a worker turn against an oracle and the tool dispatcher
#[derive(Clone)]
pub struct WorkerLoop {
    oracle: SharedOracle,
    dispatcher: ToolDispatcher,
    extractor: StructuredCallExtractor,
}

impl WorkerLoop {
    pub fn new(oracle: SharedOracle, dispatcher: ToolDispatcher) -> Self {
        Self {
            oracle,
            dispatcher,
            extractor: StructuredCallExtractor::new(),
        }
    }

    /// Run one worker turn over a read-only view of the conversation
    pub async fn run(&self, config: &WorkerConfig, history: &[Message]) -> Result<WorkerOutcome> {
        info!(worker = %config.name, max_iterations = config.max_iterations, "worker started");

        let system = Message::system(config.system_prompt());
        let mut turn = LoopState {
            state: WorkerState::Thinking,
            local: Vec::new(),
            iterations: 0,
            answer: None,
        };

        if config.max_iterations == 0 {
            turn.state = WorkerState::Exhausted;
        }

        while !turn.state.is_terminal() {
            turn.iterations += 1;

            let mut prompt = Vec::with_capacity(1 + history.len() + turn.local.len());
            prompt.push(system.clone());
            prompt.extend_from_slice(history);
            prompt.extend_from_slice(&turn.local);

            let reply = self.oracle.invoke(&prompt).await.map_err(|e| match e {
                AgentError::OracleUnavailable(_) => e,
                other => AgentError::OracleUnavailable(other.to_string()),
            })?;

            debug!(
                worker = %config.name,
                iteration = turn.iterations,
                preview = %preview(&reply.content),
                "oracle replied"
            );

            self.handle_reply(config, &mut turn, reply.content).await?;

            if !turn.state.is_terminal() {
                let event = if turn.iterations >= config.max_iterations {
                    WorkerEvent::BudgetSpent
                } else {
                    WorkerEvent::Resume
                };
                turn.state = turn.state.transition(event)?;
            }
        }

        let exhausted = turn.state == WorkerState::Exhausted;
        let mut answer = match turn.answer {
            Some(answer) => answer,
            None => {
                warn!(worker = %config.name, iterations = turn.iterations, "no final answer");
                EXHAUSTED_ANSWER.to_string()
            }
        };

        if config.name == PLANNER && !answer.contains(PLAN_CREATED) {
            answer.push('\n');
            answer.push_str(PLAN_CREATED);
        }

        info!(
            worker = %config.name,
            iterations = turn.iterations,
            exhausted,
            "worker finished"
        );

        Ok(WorkerOutcome {
            worker: config.name.clone(),
            answer,
            iterations: turn.iterations,
            exhausted,
        })
    }

    async fn handle_reply(&self, config: &WorkerConfig, turn: &mut LoopState, content: String) -> Result<()> {
        let name = config.name.as_str();

        match classify(&content, &self.extractor) {
            ReplyClass::Empty => {
                warn!(worker = %name, "empty reply");
                turn.state = turn.state.transition(WorkerEvent::EmptyReply)?;
                turn.local.push(Message::assistant("").with_name(name));
                turn.local.push(Message::user(EMPTY_REPLY_NUDGE));
            }
            ReplyClass::ToolRequests(requests) => {
                turn.state = turn.state.transition(WorkerEvent::ToolRequests)?;
                let names: Vec<&str> = requests.iter().map(|r| r.name.as_str()).collect();
                info!(worker = %name, tools = ?names, "dispatching tools");

                let report = self.dispatcher.run(&requests, &config.capabilities).await;
                turn.local.push(Message::assistant(content).with_name(name));
                turn.local.push(report.to_observation());
            }
            ReplyClass::Hallucination(kind) => {
                match kind {
                    Hallucination::MentionedTool(tool) => {
                        warn!(worker = %name, tool, "tool mentioned without a valid call")
                    }
                    Hallucination::MisspelledArguments => {
                        warn!(worker = %name, "tool call used 'args' instead of 'arguments'")
                    }
                }
                turn.state = turn.state.transition(WorkerEvent::Hallucination)?;
                turn.local.push(Message::assistant(content).with_name(name));
                turn.local.push(Message::system(MALFORMED_CALL_WARNING));
            }
            ReplyClass::Final => {
                turn.state = turn.state.transition(WorkerEvent::FinalAnswer)?;
                turn.answer = Some(content);
            }
        }

        Ok(())
    }
}

fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}
