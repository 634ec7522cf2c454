//! CLI module for crewloop
//!
//! Handles command-line argument parsing.

pub mod args;

pub use args::{Args, Verbosity};
