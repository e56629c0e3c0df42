//! Terminal interface for stylerag
//!
//! Presentation only: everything here renders what the QA engine returns.

mod ui;

#[cfg(test)]
mod tests;

pub use ui::{
    display_banner, format_diagnostics, format_source_line, handle_input_with_history,
    print_answer, print_diagnostics, print_help,
};

// Re-export core types
pub use stylerag_core::{Error, Result};
