//! Git operations abstraction layer
//!
//! The flows never talk to git directly. They go through the [GitGateway]
//! trait, which keeps the state machines testable without a repository.
//!
//! # Implementations
//!
//! - [repository::Git2Gateway]: real implementation using the `git2` crate
//! - [mock::MockGateway]: in-memory implementation recording every mutation
//!
//! ```rust
//! # use git_flow::git::GitGateway;
//! # fn example<G: GitGateway>(git: &G) -> git_flow::Result<()> {
//! git.checkout("master")?;
//! let tags = git.local_tags_on_branch("master")?;
//! if let Some(latest) = tags.first() {
//!     git.create_branch("support/1.2.4", latest)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{GitCall, MockGateway};
pub use repository::Git2Gateway;

use crate::error::Result;

/// Git operations the flows need.
///
/// Every method is a blocking call. Failures of the underlying git
/// invocation are reported as [crate::error::GitflowError::GitCommand].
pub trait GitGateway {
    /// Check out a local branch, or detach HEAD at a tag or commit
    fn checkout(&self, reference: &str) -> Result<()>;

    /// Name of the checked out branch, or `HEAD` when detached
    fn current_branch(&self) -> Result<String>;

    /// Tags whose commit is reachable from `branch`, newest first
    fn local_tags_on_branch(&self, branch: &str) -> Result<Vec<String>>;

    /// Whether the configured remote carries a branch called `name`
    fn remote_branch_exists(&self, name: &str) -> Result<bool>;

    /// Create branch `name` at `from_ref` and check it out.
    ///
    /// Fails if a local branch with that name already exists.
    fn create_branch(&self, name: &str, from_ref: &str) -> Result<()>;

    /// Push `reference` to `remote`.
    ///
    /// Pushing a branch the remote already has at the same commit succeeds.
    fn push(&self, remote: &str, reference: &str) -> Result<()>;
}
