//! Static policy check for `run_python`
//!
//! Source is parsed with tree-sitter's Python grammar and walked once.
//! Three node shapes are inspected:
//!
//! - `import a.b as c`: the top-level module `a` is checked against
//!   [`BLOCKED_MODULES`]
//! - `from a.b import c`: same check on `a`
//! - `f(...)` where `f` is a bare identifier in [`BLOCKED_FUNCTIONS`]
//!
//! Every violation found is reported; the walk never stops at the first one.
//!
//! Known gap: calls through attribute access (`os_alias.system(...)`,
//! `builtins.eval(...)`) are not inspected. Without type information there is
//! no sound way to tell a dangerous method from a harmless one, so the policy
//! stays name-based rather than guessing.

use crate::errors::{AgentError, Result};
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

/// Modules that may not be imported, matched on the top-level name
pub const BLOCKED_MODULES: &[&str] = &[
    "os",
    "sys",
    "subprocess",
    "shutil",
    "socket",
    "requests",
    "urllib",
    "pathlib",
];

/// Builtins that may not be called directly
pub const BLOCKED_FUNCTIONS: &[&str] = &[
    "exec", "eval", "__import__", "input", "exit", "quit", "compile", "open",
];

/// Syntax-tree based sandbox policy
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeSandboxAnalyzer;

impl CodeSandboxAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Vet Python source; `Err(SecurityViolation)` lists every reason found
    pub fn check(&self, source: &str) -> Result<()> {
        let reasons = self.violations(source);
        if reasons.is_empty() {
            debug!(bytes = source.len(), "sandbox check passed");
            Ok(())
        } else {
            warn!(count = reasons.len(), "sandbox rejected code");
            Err(AgentError::SecurityViolation { reasons })
        }
    }

    /// Collect violation reasons in source order (empty means safe)
    pub fn violations(&self, source: &str) -> Vec<String> {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
            return vec![format!("Syntax error during security check: {}", e)];
        }

        let Some(tree) = parser.parse(source, None) else {
            return vec!["Syntax error during security check: parser produced no tree".to_string()];
        };

        let root = tree.root_node();
        if root.has_error() {
            return vec![syntax_error_reason(root, source)];
        }
        if let Some(node) = first_legacy_statement(root) {
            return vec![invalid_syntax_at(node, source)];
        }

        let mut reasons = Vec::new();
        visit(root, source.as_bytes(), &mut reasons);
        reasons
    }
}

fn visit(node: Node<'_>, source: &[u8], reasons: &mut Vec<String>) {
    match node.kind() {
        "import_statement" => check_import(node, source, reasons),
        "import_from_statement" => check_import_from(node, source, reasons),
        "call" => check_call(node, source, reasons),
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        visit(child, source, reasons);
    }
}

fn check_import(node: Node<'_>, source: &[u8], reasons: &mut Vec<String>) {
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        // `import a.b as c` wraps the dotted name in an aliased_import
        let dotted = if name.kind() == "aliased_import" {
            match name.child_by_field_name("name") {
                Some(inner) => inner,
                None => continue,
            }
        } else {
            name
        };

        let module = text(dotted, source);
        if is_blocked_module(module) {
            reasons.push(format!("Import of '{}' is restricted.", module));
        }
    }
}

fn check_import_from(node: Node<'_>, source: &[u8], reasons: &mut Vec<String>) {
    let Some(module) = node.child_by_field_name("module_name") else {
        return;
    };

    // Relative imports (`from . import x`) never name a blocked package
    if module.kind() == "relative_import" {
        return;
    }

    let module = text(module, source);
    if is_blocked_module(module) {
        reasons.push(format!("Import from '{}' is restricted.", top_level(module)));
    }
}

fn check_call(node: Node<'_>, source: &[u8], reasons: &mut Vec<String>) {
    let Some(function) = node.child_by_field_name("function") else {
        return;
    };

    if function.kind() != "identifier" {
        return;
    }

    let name = text(function, source);
    if BLOCKED_FUNCTIONS.contains(&name) {
        reasons.push(format!("Function '{}' is blocked.", name));
    }
}

fn is_blocked_module(module: &str) -> bool {
    BLOCKED_MODULES.contains(&top_level(module))
}

fn top_level(module: &str) -> &str {
    module.split('.').next().unwrap_or(module).trim()
}

fn text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn syntax_error_reason(root: Node<'_>, source: &str) -> String {
    match first_error(root) {
        Some(node) => invalid_syntax_at(node, source),
        None => "Syntax error during security check: invalid syntax".to_string(),
    }
}

fn invalid_syntax_at(node: Node<'_>, source: &str) -> String {
    let pos = node.start_position();
    let snippet: String = text(node, source.as_bytes()).chars().take(40).collect();
    format!(
        "Syntax error during security check: invalid syntax at line {}, column {} near '{}'",
        pos.row + 1,
        pos.column + 1,
        snippet
    )
}

/// The grammar still accepts Python 2 `print x` and `exec x` statements
fn first_legacy_statement(node: Node<'_>) -> Option<Node<'_>> {
    if matches!(node.kind(), "print_statement" | "exec_statement") {
        return Some(node);
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    children.into_iter().find_map(first_legacy_statement)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}
