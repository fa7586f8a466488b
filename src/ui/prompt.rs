use std::cell::RefCell;
use std::collections::VecDeque;

use console::{style, Term};

use crate::error::{GitflowError, Result};
use crate::ui::Prompter;

/// Prompts on the terminal through `console`.
///
/// Questions go to stderr so piped stdout stays clean. Without a terminal
/// every question fails; batch runs must not reach a prompt.
pub struct TerminalPrompter {
    term: Term,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::with_term(Term::stderr())
    }

    pub fn with_term(term: Term) -> Self {
        TerminalPrompter { term }
    }

    fn ensure_terminal(&self) -> Result<()> {
        if self.term.is_term() {
            Ok(())
        } else {
            Err(GitflowError::prompt("no terminal attached"))
        }
    }

    fn read_answer(&self) -> Result<String> {
        let input = self.term.read_line().map_err(prompt_error)?;
        Ok(input.trim().to_string())
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn prompt_error(err: std::io::Error) -> GitflowError {
    GitflowError::prompt(err.to_string())
}

impl Prompter for TerminalPrompter {
    fn prompt_free_text(&self, message: &str, default: &str) -> Result<String> {
        self.ensure_terminal()?;
        self.term
            .write_str(&format!("{}[{}]: ", message, style(default).cyan()))
            .map_err(prompt_error)?;

        let answer = self.read_answer()?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    /// Numbered list with the first option as default
    fn prompt_choice(&self, title: &str, message: &str, options: &[String]) -> Result<String> {
        self.ensure_terminal()?;
        if options.is_empty() {
            return Err(GitflowError::prompt(format!("{}: nothing to choose from", title)));
        }

        self.term
            .write_line(&format!("\n{}", style(title).bold()))
            .map_err(prompt_error)?;
        for (i, option) in options.iter().enumerate() {
            self.term
                .write_line(&format!("  {}. {}", i + 1, option))
                .map_err(prompt_error)?;
        }
        self.term
            .write_str(&format!(
                "\n{} (1-{}) [default: 1]: ",
                message,
                options.len()
            ))
            .map_err(prompt_error)?;

        let answer = self.read_answer()?;
        let index = if answer.is_empty() {
            1
        } else {
            answer.parse::<usize>().unwrap_or(0)
        };

        if index > 0 && index <= options.len() {
            Ok(options[index - 1].clone())
        } else {
            Err(GitflowError::prompt(format!("Invalid selection '{}'", answer)))
        }
    }
}

/// Prompter answering from a fixed script, for tests and batch drivers.
///
/// Each question consumes the next answer. An empty free-text answer selects
/// the default; a choice answer must name one of the options. Running out of
/// answers fails the prompt.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Messages of every question asked so far
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn next_answer(&self, message: &str) -> Result<String> {
        self.asked.borrow_mut().push(message.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| GitflowError::prompt(format!("no answer scripted for '{}'", message)))
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt_free_text(&self, message: &str, default: &str) -> Result<String> {
        let answer = self.next_answer(message)?;
        if answer.trim().is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    fn prompt_choice(&self, _title: &str, message: &str, options: &[String]) -> Result<String> {
        let answer = self.next_answer(message)?;
        if options.iter().any(|o| *o == answer) {
            Ok(answer)
        } else {
            Err(GitflowError::prompt(format!(
                "'{}' is not one of {:?}",
                answer, options
            )))
        }
    }
}
