//! Scripted oracle
//!
//! Returns canned replies in order and repeats the last one once the script
//! runs out. Every invocation is counted and its input recorded, so tests can
//! assert on exactly what a node sent.

use crate::errors::{AgentError, Result};
use crate::llm::oracle::Oracle;
use crate::types::Message;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Script {
    pending: VecDeque<String>,
    last: Option<String>,
    received: Vec<Vec<Message>>,
}

/// Deterministic oracle driven by a reply list
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    script: Mutex<Script>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(Script {
                pending: replies.into_iter().map(Into::into).collect(),
                ..Script::default()
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of invocations so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Message lists received, one entry per invocation
    pub async fn received(&self) -> Vec<Vec<Message>> {
        self.script.lock().await.received.clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn invoke(&self, messages: &[Message]) -> Result<Message> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().await;
        script.received.push(messages.to_vec());

        let reply = match script.pending.pop_front() {
            Some(reply) => {
                script.last = Some(reply.clone());
                reply
            }
            None => script
                .last
                .clone()
                .ok_or_else(|| AgentError::OracleUnavailable("script is empty".to_string()))?,
        };

        Ok(Message::assistant(reply))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
