use crate::error::{GitflowError, Result};
use crate::git::GitGateway;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

/// A mutating call made against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Checkout(String),
    CreateBranch { name: String, from: String },
    Push { remote: String, reference: String },
}

#[derive(Debug, Default)]
struct MockState {
    current: String,
    local_branches: BTreeSet<String>,
    remote_branches: BTreeSet<String>,
    tags: HashMap<String, Vec<String>>,
    calls: Vec<GitCall>,
    failing_pushes: BTreeSet<String>,
    fail_create_branch: bool,
    ignore_create_branch: bool,
}

/// Mock gateway for testing flows without a repository.
///
/// Keeps an in-memory view of local branches, remote branches, tags per
/// branch and the checked out ref, and records every mutating call.
#[derive(Debug, Default)]
pub struct MockGateway {
    state: RefCell<MockState>,
}

impl MockGateway {
    /// Create a mock with `current` as the only local branch, checked out
    pub fn new(current: impl Into<String>) -> Self {
        let current = current.into();
        let mut state = MockState::default();
        state.local_branches.insert(current.clone());
        state.current = current;
        MockGateway {
            state: RefCell::new(state),
        }
    }

    /// Add a local branch
    pub fn with_branch(self, name: impl Into<String>) -> Self {
        self.state.borrow_mut().local_branches.insert(name.into());
        self
    }

    /// Add a branch the remote already carries
    pub fn with_remote_branch(self, name: impl Into<String>) -> Self {
        self.state.borrow_mut().remote_branches.insert(name.into());
        self
    }

    /// Set the tags reachable from `branch`, newest first
    pub fn with_tags(self, branch: impl Into<String>, tags: &[&str]) -> Self {
        self.state
            .borrow_mut()
            .tags
            .insert(branch.into(), tags.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Make every push of `reference` fail
    pub fn failing_push(self, reference: impl Into<String>) -> Self {
        self.state
            .borrow_mut()
            .failing_pushes
            .insert(reference.into());
        self
    }

    /// Make branch creation fail
    pub fn failing_create_branch(self) -> Self {
        self.state.borrow_mut().fail_create_branch = true;
        self
    }

    /// Make branch creation report success without doing anything
    pub fn ignoring_create_branch(self) -> Self {
        self.state.borrow_mut().ignore_create_branch = true;
        self
    }

    /// Drop a local branch, as `git branch -D` would; the remote is untouched
    pub fn delete_local_branch(&self, name: &str) {
        self.state.borrow_mut().local_branches.remove(name);
    }

    /// Every mutating call made so far, in order
    pub fn calls(&self) -> Vec<GitCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of branch creations attempted
    pub fn create_branch_calls(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, GitCall::CreateBranch { .. }))
            .count()
    }

    /// References pushed so far, in order
    pub fn pushes(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                GitCall::Push { reference, .. } => Some(reference.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_local_branch(&self, name: &str) -> bool {
        self.state.borrow().local_branches.contains(name)
    }

    pub fn has_remote_branch(&self, name: &str) -> bool {
        self.state.borrow().remote_branches.contains(name)
    }
}

impl GitGateway for MockGateway {
    fn checkout(&self, reference: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(GitCall::Checkout(reference.to_string()));
        let next = if state.local_branches.contains(reference) {
            reference.to_string()
        } else {
            "HEAD".to_string()
        };
        state.current = next;
        Ok(())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.state.borrow().current.clone())
    }

    fn local_tags_on_branch(&self, branch: &str) -> Result<Vec<String>> {
        Ok(self
            .state
            .borrow()
            .tags
            .get(branch)
            .cloned()
            .unwrap_or_default())
    }

    fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state.borrow().remote_branches.contains(name))
    }

    fn create_branch(&self, name: &str, from_ref: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(GitCall::CreateBranch {
            name: name.to_string(),
            from: from_ref.to_string(),
        });

        let command = format!("git checkout -b {} {}", name, from_ref);
        if state.fail_create_branch {
            return Err(GitflowError::git_command(command, 1, "simulated failure"));
        }
        if state.local_branches.contains(name) {
            return Err(GitflowError::git_command(
                command,
                128,
                format!("fatal: a branch named '{}' already exists", name),
            ));
        }
        if state.ignore_create_branch {
            return Ok(());
        }

        state.local_branches.insert(name.to_string());
        state.current = name.to_string();
        Ok(())
    }

    fn push(&self, remote: &str, reference: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(GitCall::Push {
            remote: remote.to_string(),
            reference: reference.to_string(),
        });

        if state.failing_pushes.contains(reference) {
            return Err(GitflowError::git_command(
                format!("git push {} {}", remote, reference),
                1,
                "simulated push failure",
            ));
        }

        state.remote_branches.insert(reference.to_string());
        Ok(())
    }
}
