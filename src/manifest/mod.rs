//! Reading and writing the project version.
//!
//! The flows only know the [VersionWriter] trait. [ManifestVersionWriter]
//! keeps the version in a TOML manifest (`Cargo.toml` by default) and
//! [MockVersionWriter] keeps it in memory for tests.

pub mod mock;
pub mod toml_manifest;

pub use mock::{AppliedVersion, MockVersionWriter};
pub use toml_manifest::{ManifestOptions, ManifestVersionWriter};

use crate::domain::{ArtifactPattern, SemanticVersion};
use crate::error::Result;

/// How a single snapshot dependency was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Rewritten to this released version
    Resolved(String),
    /// Left untouched, with the reason
    Unresolved(String),
}

/// Outcome for one dependency selected by the include patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyUpdate {
    /// `group:artifact:type:classifier:version` coordinates before the update
    pub artifact: String,
    pub resolution: Resolution,
}

impl DependencyUpdate {
    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved(_))
    }
}

/// Reads and persists the project version
pub trait VersionWriter {
    /// Version recorded at `reference` (branch, tag or commit)
    fn current_version(&self, reference: &str) -> Result<SemanticVersion>;

    /// Write `version` to the working tree of the checked out `branch`,
    /// committing when configured and pushing the branch when `push` is set
    fn apply_version(&self, version: &str, branch: &str, push: bool) -> Result<()>;

    /// Replace snapshot dependency versions selected by `includes` with their
    /// released counterparts. An empty include list selects every dependency.
    fn update_dependency_versions(&self, includes: &[ArtifactPattern])
        -> Result<Vec<DependencyUpdate>>;
}
