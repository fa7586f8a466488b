pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod flow;
pub mod git;
pub mod logging;
pub mod manifest;
pub mod ui;
pub mod warning;

pub use error::{GitflowError, Result};
