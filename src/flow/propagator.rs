use crate::domain::FlowStep;
use crate::error::Result;
use crate::flow::StepContext;
use crate::git::GitGateway;
use crate::manifest::VersionWriter;

/// Applies a computed version to a branch through the version writer.
///
/// Checks the branch out first when it is not the current one. Failures are
/// tagged with the step the caller names.
pub struct VersionPropagator<'a, G, W> {
    git: &'a G,
    writer: &'a W,
}

impl<'a, G: GitGateway, W: VersionWriter> VersionPropagator<'a, G, W> {
    pub fn new(git: &'a G, writer: &'a W) -> Self {
        VersionPropagator { git, writer }
    }

    pub fn propagate(&self, branch: &str, version: &str, push: bool, step: FlowStep) -> Result<()> {
        self.switch_to(branch).at_step(step)?;
        self.writer
            .apply_version(version, branch, push)
            .at_step(step)
    }

    fn switch_to(&self, branch: &str) -> Result<()> {
        if self.git.current_branch()? != branch {
            self.git.checkout(branch)?;
        }
        Ok(())
    }
}
