//! Supervisor routing
//!
//! The Supervisor asks the oracle who should act next and maps the free-text
//! reply onto a routing option. Matching is whole-word and case-insensitive;
//! when several options are mentioned the last one wins, and a reply naming
//! none of them ends the turn.

use crate::errors::{AgentError, Result};
use crate::llm::SharedOracle;
use crate::prompts::{self, FINISH, SUPERVISOR, SUPERVISOR_CLOSING, SUPERVISOR_PROMPT};
use crate::types::{Message, Transcript};
use regex::{Regex, RegexBuilder};
use tracing::{debug, info};

/// Next node chosen by the Supervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Worker(String),
    Finish,
}

impl Route {
    pub fn as_str(&self) -> &str {
        match self {
            Route::Worker(name) => name,
            Route::Finish => FINISH,
        }
    }
}

/// Raw reply plus the route resolved from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    pub raw: String,
    pub route: Route,
}

impl RoutingDecision {
    /// The decision as recorded in the transcript
    pub fn to_message(&self) -> Message {
        Message::assistant(self.raw.clone()).with_name(SUPERVISOR)
    }
}

/// Map free text onto one of `options`
pub fn resolve_route(text: &str, options: &[String]) -> Route {
    let Some(pattern) = option_pattern(options) else {
        return Route::Finish;
    };

    let last = pattern.find_iter(text).last().and_then(|m| {
        options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(m.as_str()))
    });

    match last {
        Some(option) if option != FINISH => Route::Worker(option.clone()),
        _ => Route::Finish,
    }
}

fn option_pattern(options: &[String]) -> Option<Regex> {
    if options.is_empty() {
        return None;
    }

    let alternatives: Vec<String> = options.iter().map(|o| regex::escape(o)).collect();
    RegexBuilder::new(&format!(r"\b({})\b", alternatives.join("|")))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Chooses the next node from the shared transcript
#[derive(Clone)]
pub struct SupervisorRouter {
    oracle: SharedOracle,
    members: Vec<String>,
    options: Vec<String>,
}

impl SupervisorRouter {
    /// `options` is `FINISH` followed by `members`
    pub fn new(oracle: SharedOracle, members: Vec<String>) -> Self {
        let options = std::iter::once(FINISH.to_string())
            .chain(members.iter().cloned())
            .collect();
        Self {
            oracle,
            members,
            options,
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Prompt sent to the oracle for one decision
    pub fn prompt(&self, transcript: &Transcript) -> Vec<Message> {
        let mut messages = Vec::with_capacity(transcript.len() + 2);
        messages.push(Message::system(prompts::with_options(SUPERVISOR_PROMPT, &self.options)));
        messages.extend_from_slice(transcript.messages());
        messages.push(Message::system(prompts::with_options(SUPERVISOR_CLOSING, &self.options)));
        messages
    }

    /// One oracle call, one decision
    pub async fn decide(&self, transcript: &Transcript) -> Result<RoutingDecision> {
        let reply = self
            .oracle
            .invoke(&self.prompt(transcript))
            .await
            .map_err(|e| match e {
                AgentError::OracleUnavailable(_) => e,
                other => AgentError::OracleUnavailable(other.to_string()),
            })?;

        let route = resolve_route(&reply.content, &self.options);
        debug!(raw = %reply.content.trim(), "supervisor reply");
        info!(route = %route.as_str(), "routing");

        Ok(RoutingDecision {
            raw: reply.content,
            route,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedOracle;
    use crate::prompts::MEMBERS;
    use crate::types::Role;
    use quickcheck_macros::quickcheck;
    use std::sync::Arc;

    fn options() -> Vec<String> {
        ["FINISH", "Planner", "Coder", "Reviewer"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_last_mention_wins() {
        assert_eq!(
            resolve_route("Planner is done, send it to Coder", &options()),
            Route::Worker("Coder".to_string())
        );
    }

    #[test]
    fn test_no_mention_finishes() {
        assert_eq!(resolve_route("nothing relevant", &options()), Route::Finish);
        assert_eq!(resolve_route("", &options()), Route::Finish);
    }

    #[test]
    fn test_case_insensitive_whole_word() {
        assert_eq!(resolve_route("reviewer", &options()), Route::Worker("Reviewer".to_string()));
        assert_eq!(resolve_route("**Coder**", &options()), Route::Worker("Coder".to_string()));
        // Substrings of longer words do not count
        assert_eq!(resolve_route("Coders unite", &options()), Route::Finish);
    }

    #[test]
    fn test_finish_mentioned_last() {
        assert_eq!(
            resolve_route("Reviewer approved, so FINISH", &options()),
            Route::Finish
        );
    }

    #[test]
    fn test_empty_options() {
        assert_eq!(resolve_route("Coder", &[]), Route::Finish);
    }

    #[quickcheck]
    fn prop_route_is_an_option(text: String) -> bool {
        match resolve_route(&text, &options()) {
            Route::Finish => true,
            Route::Worker(name) => options().contains(&name),
        }
    }

    #[tokio::test]
    async fn test_decide_builds_prompt_and_records_raw() {
        let oracle = Arc::new(ScriptedOracle::new(["Next: Planner"]));
        let router = SupervisorRouter::new(
            oracle.clone(),
            MEMBERS.iter().map(|m| m.to_string()).collect(),
        );

        let mut transcript = Transcript::new();
        transcript.push(Message::user("build a calculator"));

        let decision = router.decide(&transcript).await.unwrap();
        assert_eq!(decision.route, Route::Worker("Planner".to_string()));
        assert_eq!(decision.raw, "Next: Planner");

        let message = decision.to_message();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.name.as_deref(), Some("Supervisor"));

        let sent = &oracle.received().await[0];
        assert_eq!(sent.len(), 3);
        assert!(sent[0].content.contains("Options: FINISH, Planner, Coder, Reviewer"));
        assert_eq!(sent[1].content, "build a calculator");
        assert!(sent[2].content.ends_with("Select one of: FINISH, Planner, Coder, Reviewer"));
    }
}
