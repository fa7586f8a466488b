//! Command-line layer: argument structures and flow orchestration.

pub mod orchestration;

pub use orchestration::{build_request, execute, run_flow, FlowArgs};
