use thiserror::Error;

use crate::domain::FlowStep;

/// Unified error type for git-flow operations
#[derive(Error, Debug)]
pub enum GitflowError {
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid branch name: {0}")]
    InvalidName(String),

    #[error("Invalid release name: {0}")]
    InvalidReleaseName(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Could not find any local Git tags (on {branch}) to create support branch from")]
    NoTags { branch: String },

    #[error("Git command '{command}' failed with exit code {exit_code}: {stderr}")]
    GitCommand {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("{step} failed: {source}")]
    StepFailed {
        step: FlowStep,
        #[source]
        source: Box<GitflowError>,
    },

    #[error("Flow error: {0}")]
    Flow(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-flow
pub type Result<T> = std::result::Result<T, GitflowError>;

impl From<git2::Error> for GitflowError {
    fn from(err: git2::Error) -> Self {
        GitflowError::GitCommand {
            command: format!("libgit2 ({:?})", err.class()),
            exit_code: err.raw_code(),
            stderr: err.message().to_string(),
        }
    }
}

impl GitflowError {
    /// Create an invalid version error with context
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        GitflowError::InvalidVersion(msg.into())
    }

    /// Create an invalid name error with context
    pub fn invalid_name(msg: impl Into<String>) -> Self {
        GitflowError::InvalidName(msg.into())
    }

    /// Create a precondition error with context
    pub fn precondition(msg: impl Into<String>) -> Self {
        GitflowError::Precondition(msg.into())
    }

    /// Create a prompt error with context
    pub fn prompt(msg: impl Into<String>) -> Self {
        GitflowError::Prompt(msg.into())
    }

    /// Create a flow error with context
    pub fn flow(msg: impl Into<String>) -> Self {
        GitflowError::Flow(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitflowError::Config(msg.into())
    }

    /// Create a git command error
    pub fn git_command(command: impl Into<String>, exit_code: i32, stderr: impl Into<String>) -> Self {
        GitflowError::GitCommand {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Tag this error with the flow step that produced it
    pub fn at(self, step: FlowStep) -> Self {
        GitflowError::StepFailed {
            step,
            source: Box::new(self),
        }
    }

    /// The step a failure happened in, if it was raised inside a flow
    pub fn failed_step(&self) -> Option<FlowStep> {
        match self {
            GitflowError::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The underlying error with any step tagging removed
    pub fn root(&self) -> &GitflowError {
        match self {
            GitflowError::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Map a flow failure to the process exit code the CLI terminates with.
///
/// Usage-type failures (bad input, wrong starting state) exit with 2,
/// an aborted prompt with 130 and everything else with 1.
pub fn exit_code(err: &GitflowError) -> i32 {
    match err.root() {
        GitflowError::InvalidVersion(_)
        | GitflowError::InvalidName(_)
        | GitflowError::InvalidReleaseName(_)
        | GitflowError::Precondition(_)
        | GitflowError::NoTags { .. }
        | GitflowError::Config(_) => 2,
        GitflowError::Prompt(_) => 130,
        _ => 1,
    }
}
