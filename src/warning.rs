use std::fmt;

/// Non-fatal issues met during a flow run.
/// They are collected into the flow result and reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowWarning {
    /// A dependency matched the include patterns but has no released counterpart
    UnresolvedDependency { artifact: String, reason: String },
    /// The version writer found nothing to change for the requested dependencies
    NoDependenciesUpdated,
}

impl fmt::Display for FlowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowWarning::UnresolvedDependency { artifact, reason } => {
                write!(f, "Could not resolve release version of '{}': {}", artifact, reason)
            }
            FlowWarning::NoDependenciesUpdated => {
                write!(f, "No snapshot dependencies matched the include patterns")
            }
        }
    }
}
