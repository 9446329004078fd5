//! CLI command handlers.
//!
//! Each handler resolves its settings CLI-first, then from the config
//! file, then from built-in defaults.

pub mod deps;
pub mod fetch;
