//! Tool implementations module

pub mod filesystem;
pub mod process;
pub mod web;

// Re-export for convenience
pub use filesystem::{file_read, file_write, list_directory};
pub use process::{run_linter, run_python};
pub use web::web_search;
