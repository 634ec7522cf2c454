//! Integration tests for crewloop
//!
//! Drives the whole crew against a scripted oracle, without Ollama running.

use crewloop::agent::{ConversationGraph, GraphNode, NodeEvent, TurnOutcome};
use crewloop::llm::ScriptedOracle;
use crewloop::tools::{ToolContext, ToolDispatcher, Toolbox};
use crewloop::types::{Conversation, Role};
use std::sync::Arc;
use tempfile::TempDir;

fn crew(replies: &[&str]) -> (TempDir, Arc<ScriptedOracle>, ConversationGraph) {
    let temp = TempDir::new().unwrap();
    let context = ToolContext::new(temp.path().to_path_buf()).with_linter_bin("/nonexistent/ruff");
    let toolbox = Toolbox::for_workspace(context).unwrap();
    let oracle = Arc::new(ScriptedOracle::new(replies.iter().copied()));
    let graph = ConversationGraph::standard(oracle.clone(), ToolDispatcher::new(Arc::new(toolbox)), 10);
    (temp, oracle, graph)
}

#[tokio::test]
async fn test_full_workflow_happy_path() {
    let (temp, oracle, graph) = crew(&[
        // Supervisor: new task
        "Planner",
        // Planner
        "I will create a plan.\nPLAN_CREATED",
        // Supervisor: plan exists
        "Coder",
        // Coder
        "Thinking...\n```json\n[{\"name\": \"file_write\", \"arguments\": {\"file_path\": \"hello.py\", \"content\": \"print(1)\"}}]\n```",
        "Code written successfully.",
        // Supervisor: code done
        "Reviewer",
        // Reviewer
        "Thinking...\n```json\n[{\"name\": \"run_linter\", \"arguments\": {}}]\n```",
        "Approved",
        // Supervisor: approved
        "FINISH",
    ]);

    let mut conversation = Conversation::new();
    let mut answers = Vec::new();
    let report = graph
        .run_turn_with(&mut conversation, "Make a hello world script", |event| {
            if let NodeEvent::Answered(outcome) = event {
                answers.push((outcome.worker.clone(), outcome.answer.clone()));
            }
        })
        .await
        .unwrap();

    assert_eq!(report.outcome, TurnOutcome::Finished);
    assert!(report.visits(&GraphNode::Supervisor) >= 4);
    for worker in ["Planner", "Coder", "Reviewer"] {
        assert_eq!(report.visits(&GraphNode::Worker(worker.to_string())), 1);
    }
    assert_eq!(report.visited.last(), Some(&GraphNode::End));
    assert_eq!(oracle.calls(), 9);

    assert_eq!(
        answers,
        vec![
            ("Planner".to_string(), "I will create a plan.\nPLAN_CREATED".to_string()),
            ("Coder".to_string(), "Code written successfully.".to_string()),
            ("Reviewer".to_string(), "Approved".to_string()),
        ]
    );

    // The Coder's tool call really ran inside the workspace
    assert_eq!(std::fs::read_to_string(temp.path().join("hello.py")).unwrap(), "print(1)");

    // The Reviewer saw the linter failure as an observation, not an abort
    let received = oracle.received().await;
    let observation = received[7].last().unwrap();
    assert_eq!(observation.role, Role::Observation);
    assert!(observation.content.starts_with("TOOL OBSERVATION:\nTool 'run_linter' Error:"));
    assert!(observation.content.contains("not installed"));

    // user + 4 routing decisions + 3 worker answers
    let transcript = conversation.transcript.messages();
    assert_eq!(transcript.len(), 8);
    assert_eq!(transcript[0].role, Role::User);
    assert_eq!(transcript[7].name.as_deref(), Some("Supervisor"));
    assert_eq!(transcript[7].content, "FINISH");
}

#[tokio::test]
async fn test_escape_attempt_stays_in_transcript() {
    let (temp, _oracle, graph) = crew(&[
        "Coder",
        "```json\n{\"name\": \"file_write\", \"arguments\": {\"file_path\": \"../../evil.txt\", \"content\": \"x\"}}\n```",
        "Could not write outside the workspace.",
        "FINISH",
    ]);

    let mut conversation = Conversation::new();
    let report = graph.run_turn(&mut conversation, "write ../../evil.txt").await.unwrap();

    assert_eq!(report.outcome, TurnOutcome::Finished);
    let outside = temp.path().parent().unwrap().parent().unwrap().join("evil.txt");
    assert!(!outside.exists());
}

#[tokio::test]
async fn test_blocked_code_reported_to_worker() {
    let (_temp, oracle, graph) = crew(&[
        "Reviewer",
        "```json\n{\"name\": \"run_python\", \"arguments\": {\"code\": \"import os\\nprint(os.getcwd())\"}}\n```",
        "The sandbox refused it.",
        "FINISH",
    ]);

    let mut conversation = Conversation::new();
    graph.run_turn(&mut conversation, "check cwd").await.unwrap();

    let received = oracle.received().await;
    let observation = received[2].last().unwrap();
    assert_eq!(
        observation.content,
        "TOOL OBSERVATION:\nTool 'run_python' Error: Security Violation:\nImport of 'os' is restricted."
    );
}

#[tokio::test]
async fn test_second_turn_reuses_transcript() {
    let (_temp, oracle, graph) = crew(&["FINISH"]);
    let mut conversation = Conversation::new();

    graph.run_turn(&mut conversation, "hello").await.unwrap();
    let report = graph.run_turn(&mut conversation, "and again").await.unwrap();

    assert_eq!(report.visited, vec![GraphNode::Supervisor, GraphNode::End]);
    assert_eq!(conversation.transcript.len(), 4);
    assert_eq!(oracle.calls(), 2);
}
