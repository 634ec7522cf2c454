//! Prompt text and role names
//!
//! The wording here is tuning, not protocol. The protocol parts are the role
//! names, the `PLAN_CREATED` marker and the fenced JSON call format, which the
//! router and the extractor rely on.

/// Supervisor node name
pub const SUPERVISOR: &str = "Supervisor";

pub const PLANNER: &str = "Planner";
pub const CODER: &str = "Coder";
pub const REVIEWER: &str = "Reviewer";

/// Terminal routing sentinel
pub const FINISH: &str = "FINISH";

/// Marker a Planner answer always carries
pub const PLAN_CREATED: &str = "PLAN_CREATED";

/// Worker members, in routing-option order
pub const MEMBERS: [&str; 3] = [PLANNER, CODER, REVIEWER];

/// Shared preamble for every worker loop
pub const BASE_PROMPT: &str = r#"You are a member of a small software crew working inside a sandboxed workspace.

Rules:
1. Use tools to inspect and change files or to run code. Never invent file contents or program output.
2. Every tool call goes in a fenced JSON block:
```json
{"name": "file_write", "arguments": {"file_path": "hello.py", "content": "print('hello')"}}
```
   The key is "arguments", never "args". Several calls may be sent as a JSON array.
3. Start each reply with a short Thought about what to do next.
4. When your part is done, reply without any tool call, following your role instructions."#;

pub const PLANNER_PROMPT: &str = "Role: Technical Planner.\n\
1. Work out what the user is asking for.\n\
2. Write a step-by-step implementation plan in Markdown.\n\
3. End the reply with the exact word PLAN_CREATED.";

pub const CODER_PROMPT: &str = "Role: Senior Python Developer.\n\
- Write complete, working code. No placeholders.\n\
- Read a file before you change it.\n\
- Follow PEP 8.\n\
Implement the plan with file_write. When the code is ready, say: Coding complete, requesting review.";

pub const REVIEWER_PROMPT: &str = "Role: QA and Security Engineer.\n\
1. Check the code with run_linter or by reading it.\n\
2. Look for syntax errors, logic bugs and security problems.\n\
3. If something is wrong, explain it so the Coder can fix it.\n\
4. If everything is fine, reply with: Approved";

/// Supervisor system prompt; `{options}` is replaced with the routing options
pub const SUPERVISOR_PROMPT: &str = "Role: Workflow Supervisor. You steer a crew through plan, code and review.\n\
Pick who acts next:\n\
- New user request: Planner\n\
- A plan was produced (PLAN_CREATED): Coder\n\
- Coding finished: Reviewer\n\
- Reviewer found problems: Coder\n\
- Reviewer said Approved: FINISH\n\
Reply with the name only. Options: {options}";

/// Closing instruction appended after the transcript
pub const SUPERVISOR_CLOSING: &str =
    "Given the conversation above, who should act next? Or should we FINISH? Select one of: {options}";

/// Nudge after a blank reply
pub const EMPTY_REPLY_NUDGE: &str =
    "You sent an empty response. Please provide the next step or final answer.";

/// Warning after a tool was mentioned without a usable call
pub const MALFORMED_CALL_WARNING: &str = "SYSTEM WARNING: You mentioned a tool name but provided NO valid JSON tool call.\n\
1. You MUST wrap your tool calls in a ```json ... ``` block.\n\
2. Ensure the key is 'arguments' (not 'args').\n\
3. Example: {\"name\": \"file_read\", \"arguments\": {\"file_path\": \"...\"}}\n\
Please TRY AGAIN with correct JSON format.";

/// Answer returned when a worker never produced a final reply
pub const EXHAUSTED_ANSWER: &str =
    "Error: Loop finished without valid final answer. (Empty or Max Iterations)";

/// Role prompt for a known member
pub fn role_prompt(member: &str) -> Option<&'static str> {
    match member {
        PLANNER => Some(PLANNER_PROMPT),
        CODER => Some(CODER_PROMPT),
        REVIEWER => Some(REVIEWER_PROMPT),
        _ => None,
    }
}

/// Full system prompt for a worker loop
pub fn worker_system_prompt(catalogue: &str, role_prompt: &str) -> String {
    format!(
        "{BASE_PROMPT}\n\n## TOOLS AVAILABLE TO YOU\n{catalogue}\n\n## ROLE INSTRUCTIONS\n{role_prompt}\n\n\
         ## REMINDER\nTool calls go in ```json ... ``` blocks. When you are done, give your final answer."
    )
}

/// Render a template's `{options}` placeholder
pub fn with_options(template: &str, options: &[String]) -> String {
    template.replace("{options}", &options.join(", "))
}
