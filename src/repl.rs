//! Interactive session
//!
//! [`InputHandler`] wraps a rustyline editor with optional persistent
//! history. [`ReplSession`] turns each line into a graph turn over one shared
//! conversation.

use crate::agent::{ConversationGraph, NodeEvent, TurnReport};
use crate::errors::AgentError;
use crate::types::Conversation;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing::warn;

/// Words that end the session
pub const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            history_path: None,
            prompt: "crewloop> ".to_string(),
        })
    }

    /// Input handler that loads and later saves `history_file`
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut handler = Self::new()?;
        if history_file.exists() {
            let _ = handler.editor.load_history(&history_file);
        }
        handler.history_path = Some(history_file);
        Ok(handler)
    }

    /// Read one trimmed line; `None` on Ctrl-D or Ctrl-C at the prompt
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(trimmed);
                }
                Ok(Some(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    pub fn save_history(&mut self) -> Result<()> {
        if let Some(path) = &self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }
}

/// Whether a line asks to leave the session
pub fn is_exit_command(line: &str) -> bool {
    EXIT_COMMANDS.iter().any(|c| line.eq_ignore_ascii_case(c))
}

/// What one input line did
#[derive(Debug)]
pub enum LineOutcome {
    /// Blank line, nothing ran
    Skipped,
    /// An exit word
    Exit,
    /// A turn ran to one of its outcomes
    Turn(TurnReport),
    /// The turn failed; the session stays usable
    Failed(AgentError),
}

/// One conversation driven line by line
pub struct ReplSession {
    graph: ConversationGraph,
    conversation: Conversation,
}

impl ReplSession {
    pub fn new(graph: ConversationGraph) -> Self {
        Self {
            graph,
            conversation: Conversation::new(),
        }
    }

    pub fn graph(&self) -> &ConversationGraph {
        &self.graph
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run `line` as a turn, reporting node output through `on_event`
    pub async fn handle_line<F>(&mut self, line: &str, on_event: F) -> LineOutcome
    where
        F: FnMut(&NodeEvent),
    {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Skipped;
        }
        if is_exit_command(line) {
            return LineOutcome::Exit;
        }

        self.graph.shutdown_signal().reset();
        match self.graph.run_turn_with(&mut self.conversation, line, on_event).await {
            Ok(report) => LineOutcome::Turn(report),
            Err(e) => {
                warn!(error = %e, "turn failed");
                LineOutcome::Failed(e)
            }
        }
    }
}
