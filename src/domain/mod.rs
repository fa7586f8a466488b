//! Domain logic - pure business rules independent of git operations

pub mod artifact;
pub mod branch;
pub mod calculator;
pub mod flow;
pub mod version;

pub use artifact::{ArtifactCoordinates, ArtifactPattern};
pub use branch::BranchNamer;
pub use calculator::VersionCalculator;
pub use flow::{FlowKind, FlowRequest, FlowResult, FlowSettings, FlowStep, StepRecord};
pub use version::{SemanticVersion, SNAPSHOT_QUALIFIER};
