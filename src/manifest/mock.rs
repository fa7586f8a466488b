use crate::domain::{ArtifactPattern, SemanticVersion};
use crate::error::{GitflowError, Result};
use crate::manifest::{DependencyUpdate, VersionWriter};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

/// One `apply_version` call seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedVersion {
    pub version: String,
    pub branch: String,
    pub push: bool,
}

#[derive(Debug, Default)]
struct WriterState {
    versions: HashMap<String, String>,
    applied: Vec<AppliedVersion>,
    dependency_updates: Vec<DependencyUpdate>,
    dependency_calls: usize,
    failing_branches: BTreeSet<String>,
}

/// In-memory version store for testing flows
#[derive(Debug, Default)]
pub struct MockVersionWriter {
    state: RefCell<WriterState>,
}

impl MockVersionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `version` at `reference`
    pub fn with_version(self, reference: impl Into<String>, version: impl Into<String>) -> Self {
        self.state
            .borrow_mut()
            .versions
            .insert(reference.into(), version.into());
        self
    }

    /// Outcome returned by `update_dependency_versions`
    pub fn with_dependency_updates(self, updates: Vec<DependencyUpdate>) -> Self {
        self.state.borrow_mut().dependency_updates = updates;
        self
    }

    /// Make `apply_version` fail on `branch`, as a rejected push would
    pub fn failing_on(self, branch: impl Into<String>) -> Self {
        self.state
            .borrow_mut()
            .failing_branches
            .insert(branch.into());
        self
    }

    /// Successful `apply_version` calls, in order
    pub fn applied(&self) -> Vec<AppliedVersion> {
        self.state.borrow().applied.clone()
    }

    /// Version currently recorded at `reference`
    pub fn version_at(&self, reference: &str) -> Option<String> {
        self.state.borrow().versions.get(reference).cloned()
    }

    pub fn dependency_calls(&self) -> usize {
        self.state.borrow().dependency_calls
    }
}

impl VersionWriter for MockVersionWriter {
    fn current_version(&self, reference: &str) -> Result<SemanticVersion> {
        let state = self.state.borrow();
        let version = state.versions.get(reference).ok_or_else(|| {
            GitflowError::invalid_version(format!("no version recorded at '{}'", reference))
        })?;
        SemanticVersion::parse(version)
    }

    fn apply_version(&self, version: &str, branch: &str, push: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.failing_branches.contains(branch) {
            return Err(GitflowError::git_command(
                format!("git push origin {}", branch),
                1,
                "simulated rejection",
            ));
        }

        state.applied.push(AppliedVersion {
            version: version.to_string(),
            branch: branch.to_string(),
            push,
        });
        state
            .versions
            .insert(branch.to_string(), version.to_string());
        Ok(())
    }

    fn update_dependency_versions(
        &self,
        _includes: &[ArtifactPattern],
    ) -> Result<Vec<DependencyUpdate>> {
        let mut state = self.state.borrow_mut();
        state.dependency_calls += 1;
        Ok(state.dependency_updates.clone())
    }
}
