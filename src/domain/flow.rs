use crate::domain::artifact::ArtifactPattern;
use crate::warning::FlowWarning;
use std::fmt;

/// The kind of branch a flow starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Hotfix,
    Release,
    Support,
}

impl FlowKind {
    pub fn name(&self) -> &'static str {
        match self {
            FlowKind::Hotfix => "hotfix",
            FlowKind::Release => "release",
            FlowKind::Support => "support",
        }
    }

    /// Branch the flow cuts its new branch from
    pub fn source_branch<'a>(&self, settings: &'a FlowSettings) -> &'a str {
        match self {
            FlowKind::Hotfix | FlowKind::Support => &settings.master_branch,
            FlowKind::Release => &settings.develop_branch,
        }
    }

    /// Prefix of the branches this flow creates
    pub fn prefix<'a>(&self, settings: &'a FlowSettings) -> &'a str {
        match self {
            FlowKind::Hotfix => &settings.hotfix_prefix,
            FlowKind::Release => &settings.release_prefix,
            FlowKind::Support => &settings.support_prefix,
        }
    }

    /// Whether new branches are pushed when created
    pub fn push_on_create(&self, settings: &FlowSettings) -> bool {
        match self {
            FlowKind::Hotfix => settings.push_hotfixes,
            FlowKind::Release => settings.push_release_branch,
            FlowKind::Support => true,
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One step of a flow run, recorded in the trace and attached to errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    CheckSource,
    ReadVersion,
    ComputeVersions,
    ResolveName,
    ValidateName,
    ListTags,
    SelectStartCommit,
    Checkout,
    CreateBranch,
    VerifyBranch,
    UpdateDependencies,
    BumpDevelopVersion,
    BumpBranchVersion,
    Push,
}

impl FlowStep {
    pub fn description(&self) -> &'static str {
        match self {
            FlowStep::CheckSource => "Check source branch",
            FlowStep::ReadVersion => "Read current version",
            FlowStep::ComputeVersions => "Compute versions",
            FlowStep::ResolveName => "Resolve branch name",
            FlowStep::ValidateName => "Validate branch name",
            FlowStep::ListTags => "List tags",
            FlowStep::SelectStartCommit => "Select start commit",
            FlowStep::Checkout => "Checkout",
            FlowStep::CreateBranch => "Create branch",
            FlowStep::VerifyBranch => "Verify branch",
            FlowStep::UpdateDependencies => "Update dependencies",
            FlowStep::BumpDevelopVersion => "Update develop version",
            FlowStep::BumpBranchVersion => "Update branch version",
            FlowStep::Push => "Push",
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A completed step with a short note on what it did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: FlowStep,
    pub detail: String,
}

/// Read-only repository conventions the flows work with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    pub master_branch: String,
    pub develop_branch: String,
    pub origin: String,
    pub hotfix_prefix: String,
    pub release_prefix: String,
    pub support_prefix: String,
    pub push_hotfixes: bool,
    pub push_release_branch: bool,
    pub version_separator: char,
}

impl Default for FlowSettings {
    fn default() -> Self {
        FlowSettings {
            master_branch: "master".to_string(),
            develop_branch: "develop".to_string(),
            origin: "origin".to_string(),
            hotfix_prefix: "hotfix/".to_string(),
            release_prefix: "release/".to_string(),
            support_prefix: "support/".to_string(),
            push_hotfixes: false,
            push_release_branch: false,
            version_separator: '-',
        }
    }
}

/// Run-time parameters of one `start` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRequest {
    pub kind: FlowKind,
    /// Version detected on the source; read through the version writer when absent
    pub current_version: Option<String>,
    /// Release name, support label or explicit hotfix version
    pub name: Option<String>,
    /// Commit or tag to start from (release and support)
    pub start_commit: Option<String>,
    pub interactive: bool,
    pub push: bool,
    pub update_dependencies: bool,
    pub includes: Vec<ArtifactPattern>,
}

impl FlowRequest {
    /// Request with no overrides, non-interactive, push per `settings`
    pub fn new(kind: FlowKind, settings: &FlowSettings) -> Self {
        FlowRequest {
            kind,
            current_version: None,
            name: None,
            start_commit: None,
            interactive: false,
            push: kind.push_on_create(settings),
            update_dependencies: false,
            includes: Vec::new(),
        }
    }

    /// Explicit name with surrounding whitespace removed, if non-blank
    pub fn explicit_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// Explicit start commit, if non-blank
    pub fn explicit_start_commit(&self) -> Option<&str> {
        non_blank(self.start_commit.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Outcome of a successful `start`
#[derive(Debug, Clone, PartialEq)]
pub struct FlowResult {
    pub kind: FlowKind,
    /// Branch the flow created
    pub branch: String,
    /// Version now on the created branch
    pub branch_version: String,
    /// Branch the new branch was cut from (or the start commit for support)
    pub source: String,
    /// Version now on the source
    pub source_version: String,
    /// Remote the branch is published to
    pub origin: String,
    /// Whether anything was pushed to the remote
    pub pushed: bool,
    pub steps: Vec<StepRecord>,
    pub warnings: Vec<FlowWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_kind_sources() {
        let settings = FlowSettings::default();
        assert_eq!(FlowKind::Hotfix.source_branch(&settings), "master");
        assert_eq!(FlowKind::Support.source_branch(&settings), "master");
        assert_eq!(FlowKind::Release.source_branch(&settings), "develop");
    }

    #[test]
    fn test_flow_kind_prefixes() {
        let settings = FlowSettings::default();
        assert_eq!(FlowKind::Hotfix.prefix(&settings), "hotfix/");
        assert_eq!(FlowKind::Release.prefix(&settings), "release/");
        assert_eq!(FlowKind::Support.prefix(&settings), "support/");
    }

    #[test]
    fn test_support_always_pushes() {
        let settings = FlowSettings::default();
        assert!(FlowKind::Support.push_on_create(&settings));
        assert!(!FlowKind::Hotfix.push_on_create(&settings));
        assert!(!FlowKind::Release.push_on_create(&settings));
    }

    #[test]
    fn test_request_explicit_values() {
        let mut request = FlowRequest::new(FlowKind::Release, &FlowSettings::default());
        assert_eq!(request.explicit_name(), None);
        request.name = Some("   ".to_string());
        assert_eq!(request.explicit_name(), None);
        request.name = Some(" 1.3.0 ".to_string());
        assert_eq!(request.explicit_name(), Some("1.3.0"));
        request.start_commit = Some("v1.2.3".to_string());
        assert_eq!(request.explicit_start_commit(), Some("v1.2.3"));
    }

    #[test]
    fn test_step_display() {
        assert_eq!(FlowStep::CreateBranch.to_string(), "Create branch");
        assert_eq!(FlowStep::BumpDevelopVersion.to_string(), "Update develop version");
    }
}
