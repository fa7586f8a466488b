//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting of flow results, warnings and errors
//! - `prompt` - The [Prompter] implementations flows ask questions through

pub mod formatter;
pub mod prompt;

use crate::error::Result;

pub use formatter::{display_error, display_flow_error, display_flow_result, display_warning};
pub use prompt::{ScriptedPrompter, TerminalPrompter};

/// Synchronous "ask the user, get a string" capability
pub trait Prompter {
    /// Ask for free text. An empty answer selects `default`.
    fn prompt_free_text(&self, message: &str, default: &str) -> Result<String>;

    /// Ask the user to pick one of `options`, returning the picked option
    fn prompt_choice(&self, title: &str, message: &str, options: &[String]) -> Result<String>;
}
