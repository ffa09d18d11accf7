//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, config) and shared utilities (open_db, load_config)
//! - `import` - Statement import
//! - `ledger` - Stored transactions and import history

pub mod core;
pub mod import;
pub mod ledger;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use ledger::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
