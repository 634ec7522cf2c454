//! Orchestrator graph
//!
//! Nodes are the Supervisor, one node per worker and End. Every turn enters at
//! the Supervisor; a worker always hands back to the Supervisor; the
//! Supervisor routes to a worker or to End. Each user message starts a new
//! turn over the same transcript.
//!
//! A turn is bounded by `max_steps` node visits and checks the
//! [`ShutdownSignal`] before every step.

use crate::agent::router::{Route, RoutingDecision, SupervisorRouter};
use crate::agent::worker::{WorkerConfig, WorkerLoop, WorkerOutcome};
use crate::errors::Result;
use crate::llm::SharedOracle;
use crate::prompts::{self, SUPERVISOR};
use crate::tools::executor::ToolDispatcher;
use crate::tools::registry::{coder_capabilities, planner_capabilities, reviewer_capabilities};
use crate::types::{Conversation, Message};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Default node-visit bound per turn
pub const DEFAULT_MAX_GRAPH_STEPS: usize = 25;

/// Graph node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphNode {
    Supervisor,
    Worker(String),
    End,
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphNode::Supervisor => f.write_str(SUPERVISOR),
            GraphNode::Worker(name) => f.write_str(name),
            GraphNode::End => f.write_str("End"),
        }
    }
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The Supervisor routed to End
    Finished,
    /// `max_steps` visits without reaching End
    StepLimit,
    /// Shutdown was requested between steps
    Cancelled,
}

/// Something a node produced, reported as it happens
#[derive(Debug, Clone)]
pub enum NodeEvent {
    Routed(RoutingDecision),
    Answered(WorkerOutcome),
}

/// Summary of one turn
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Nodes in visit order, End included when reached
    pub visited: Vec<GraphNode>,
    pub outcome: TurnOutcome,
}

impl TurnReport {
    pub fn visits(&self, node: &GraphNode) -> usize {
        self.visited.iter().filter(|n| *n == node).count()
    }
}

/// Cooperative cancellation flag
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a handled request so the next turn can run
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Supervisor plus workers over one shared transcript
pub struct ConversationGraph {
    router: SupervisorRouter,
    workers: BTreeMap<String, WorkerConfig>,
    worker_loop: WorkerLoop,
    max_steps: usize,
    shutdown: ShutdownSignal,
}

impl ConversationGraph {
    /// Graph over the given workers; routing options follow their order
    pub fn new(oracle: SharedOracle, dispatcher: ToolDispatcher, workers: Vec<WorkerConfig>) -> Self {
        let members = workers.iter().map(|w| w.name.clone()).collect();
        Self {
            router: SupervisorRouter::new(oracle.clone(), members),
            workers: workers.into_iter().map(|w| (w.name.clone(), w)).collect(),
            worker_loop: WorkerLoop::new(oracle, dispatcher),
            max_steps: DEFAULT_MAX_GRAPH_STEPS,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Planner, Coder and Reviewer with their standard prompts and tools
    pub fn standard(oracle: SharedOracle, dispatcher: ToolDispatcher, max_iterations: usize) -> Self {
        let workers = vec![
            WorkerConfig::new(prompts::PLANNER, prompts::PLANNER_PROMPT, planner_capabilities()),
            WorkerConfig::new(prompts::CODER, prompts::CODER_PROMPT, coder_capabilities()),
            WorkerConfig::new(prompts::REVIEWER, prompts::REVIEWER_PROMPT, reviewer_capabilities()),
        ]
        .into_iter()
        .map(|w| w.with_max_iterations(max_iterations))
        .collect();

        Self::new(oracle, dispatcher, workers)
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn members(&self) -> &[String] {
        self.router.members()
    }

    /// Append a user message and run the graph until End
    pub async fn run_turn(&self, conversation: &mut Conversation, input: &str) -> Result<TurnReport> {
        self.run_turn_with(conversation, input, |_| {}).await
    }

    /// Like [`run_turn`](Self::run_turn), reporting each node's output
    pub async fn run_turn_with<F>(
        &self,
        conversation: &mut Conversation,
        input: &str,
        mut on_event: F,
    ) -> Result<TurnReport>
    where
        F: FnMut(&NodeEvent),
    {
        conversation.transcript.push(Message::user(input));
        info!(conversation = %conversation.id, "turn started");

        let mut visited = Vec::new();
        let mut node = GraphNode::Supervisor;

        let outcome = loop {
            if node == GraphNode::End {
                visited.push(GraphNode::End);
                break TurnOutcome::Finished;
            }
            if self.shutdown.is_requested() {
                warn!("shutdown requested, stopping turn");
                break TurnOutcome::Cancelled;
            }
            if visited.len() >= self.max_steps {
                warn!(max_steps = self.max_steps, "step limit reached");
                break TurnOutcome::StepLimit;
            }

            visited.push(node.clone());

            node = match &node {
                GraphNode::Supervisor => {
                    let decision = self.router.decide(&conversation.transcript).await?;
                    conversation.transcript.push(decision.to_message());
                    let next = match &decision.route {
                        Route::Finish => GraphNode::End,
                        Route::Worker(name) if self.workers.contains_key(name) => {
                            GraphNode::Worker(name.clone())
                        }
                        Route::Worker(name) => {
                            warn!(worker = %name, "unknown worker, finishing");
                            GraphNode::End
                        }
                    };
                    on_event(&NodeEvent::Routed(decision));
                    next
                }
                GraphNode::Worker(name) => {
                    if let Some(config) = self.workers.get(name) {
                        let outcome = self
                            .worker_loop
                            .run(config, conversation.transcript.messages())
                            .await?;
                        conversation.transcript.push(outcome.to_message());
                        on_event(&NodeEvent::Answered(outcome));
                    }
                    GraphNode::Supervisor
                }
                GraphNode::End => GraphNode::End,
            };
        };

        info!(
            conversation = %conversation.id,
            steps = visited.len(),
            outcome = ?outcome,
            "turn finished"
        );

        Ok(TurnReport { visited, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedOracle;
    use crate::tools::executor::Toolbox;
    use crate::tools::types::ToolContext;
    use crate::types::Role;
    use tempfile::TempDir;

    fn graph(replies: &[&str]) -> (TempDir, Arc<ScriptedOracle>, ConversationGraph) {
        let temp = TempDir::new().unwrap();
        let toolbox = Toolbox::for_workspace(ToolContext::new(temp.path().to_path_buf())).unwrap();
        let oracle = Arc::new(ScriptedOracle::new(replies.iter().copied()));
        let graph = ConversationGraph::standard(
            oracle.clone(),
            ToolDispatcher::new(Arc::new(toolbox)),
            5,
        );
        (temp, oracle, graph)
    }

    #[tokio::test]
    async fn test_immediate_finish() {
        let (_temp, oracle, graph) = graph(&["FINISH"]);
        let mut conversation = Conversation::new();

        let report = graph.run_turn(&mut conversation, "hello").await.unwrap();
        assert_eq!(report.outcome, TurnOutcome::Finished);
        assert_eq!(report.visited, vec![GraphNode::Supervisor, GraphNode::End]);
        assert_eq!(oracle.calls(), 1);

        let messages = conversation.transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].name.as_deref(), Some("Supervisor"));
    }

    #[tokio::test]
    async fn test_worker_answer_returns_to_supervisor() {
        let (_temp, _oracle, graph) = graph(&["Reviewer", "Approved", "FINISH"]);
        let mut conversation = Conversation::new();
        let mut events = Vec::new();

        let report = graph
            .run_turn_with(&mut conversation, "check it", |e| events.push(e.clone()))
            .await
            .unwrap();

        assert_eq!(
            report.visited,
            vec![
                GraphNode::Supervisor,
                GraphNode::Worker("Reviewer".to_string()),
                GraphNode::Supervisor,
                GraphNode::End
            ]
        );
        assert_eq!(events.len(), 3);

        let answer = &conversation.transcript.messages()[2];
        assert_eq!(answer.role, Role::Observation);
        assert_eq!(answer.name.as_deref(), Some("Reviewer"));
        assert_eq!(answer.content, "Approved");
    }

    #[tokio::test]
    async fn test_step_limit_stops_runaway() {
        // Supervisor keeps picking the Coder, who keeps answering "Coder"
        let (_temp, _oracle, graph) = graph(&["Coder"]);
        let graph = graph.with_max_steps(6);
        let mut conversation = Conversation::new();

        let report = graph.run_turn(&mut conversation, "loop").await.unwrap();
        assert_eq!(report.outcome, TurnOutcome::StepLimit);
        assert_eq!(report.visited.len(), 6);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_before_next_step() {
        let (_temp, oracle, graph) = graph(&["Planner"]);
        graph.shutdown_signal().request();
        let mut conversation = Conversation::new();

        let report = graph.run_turn(&mut conversation, "x").await.unwrap();
        assert_eq!(report.outcome, TurnOutcome::Cancelled);
        assert!(report.visited.is_empty());
        assert_eq!(oracle.calls(), 0);
        // The user message is still recorded
        assert_eq!(conversation.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_turns_share_transcript() {
        let (_temp, oracle, graph) = graph(&["FINISH"]);
        let mut conversation = Conversation::new();

        graph.run_turn(&mut conversation, "first").await.unwrap();
        graph.run_turn(&mut conversation, "second").await.unwrap();

        assert_eq!(conversation.transcript.len(), 4);
        let second_prompt = &oracle.received().await[1];
        assert!(second_prompt.iter().any(|m| m.content == "first"));
        assert!(second_prompt.iter().any(|m| m.content == "second"));
    }

    #[tokio::test]
    async fn test_oracle_failure_surfaces() {
        let (_temp, _oracle, graph) = graph(&[]);
        let mut conversation = Conversation::new();
        assert!(graph.run_turn(&mut conversation, "x").await.is_err());
    }

    #[test]
    fn test_members_in_order() {
        let (_temp, _oracle, graph) = graph(&["FINISH"]);
        assert_eq!(graph.members(), &["Planner", "Coder", "Reviewer"]);
    }
}
