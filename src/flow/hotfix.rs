use crate::domain::{
    BranchNamer, FlowKind, FlowRequest, FlowResult, FlowStep, SemanticVersion, VersionCalculator,
};
use crate::error::{GitflowError, Result};
use crate::flow::{
    expect_kind, read_current_version, republish_if_tracked, Flow, FlowContext, StepContext, Trace,
};
use crate::git::GitGateway;
use crate::manifest::VersionWriter;
use crate::ui::Prompter;

/// Starts `hotfix/<version>` from the head of master
pub struct HotfixFlow<'a, G, W, P> {
    context: FlowContext<'a, G, W, P>,
    calculator: VersionCalculator,
}

impl<'a, G, W, P> HotfixFlow<'a, G, W, P>
where
    G: GitGateway,
    W: VersionWriter,
    P: Prompter,
{
    pub fn new(context: FlowContext<'a, G, W, P>) -> Self {
        HotfixFlow {
            calculator: VersionCalculator::new(context.settings.version_separator),
            context,
        }
    }

    /// Hotfix version and its snapshot, honouring an explicit override
    fn versions(&self, request: &FlowRequest, current: &str) -> Result<(String, String)> {
        match request.explicit_name() {
            Some(name) => {
                let version = SemanticVersion::parse(name)?;
                if version.is_snapshot() {
                    return Err(GitflowError::invalid_version(format!(
                        "hotfix version '{}' cannot be a snapshot",
                        name
                    )));
                }
                let version = version.to_string();
                let snapshot = self.calculator.snapshot_of(&version);
                Ok((version, snapshot))
            }
            None => Ok((
                self.calculator.hotfix_version(current)?,
                self.calculator.hotfix_snapshot_version(current)?,
            )),
        }
    }
}

impl<G, W, P> Flow for HotfixFlow<'_, G, W, P>
where
    G: GitGateway,
    W: VersionWriter,
    P: Prompter,
{
    fn start(&self, request: &FlowRequest) -> Result<FlowResult> {
        expect_kind(request, FlowKind::Hotfix)?;
        let FlowContext {
            git,
            writer,
            settings,
            ..
        } = self.context;
        let master = FlowKind::Hotfix.source_branch(settings);
        let mut trace = Trace::default();

        let current_branch = git.current_branch().at_step(FlowStep::CheckSource)?;
        if current_branch != master {
            return Err(GitflowError::precondition(format!(
                "hotfix branches start from '{}', but '{}' is checked out",
                master, current_branch
            ))
            .at(FlowStep::CheckSource));
        }
        trace.record(FlowStep::CheckSource, master);

        let current = read_current_version(writer, request, master).at_step(FlowStep::ReadVersion)?;
        trace.record(FlowStep::ReadVersion, current.as_str());

        let (hotfix, snapshot) = self
            .versions(request, &current)
            .at_step(FlowStep::ComputeVersions)?;
        trace.record(FlowStep::ComputeVersions, format!("{} ({})", hotfix, snapshot));

        let branch = BranchNamer::trim_ref_name(&BranchNamer::branch_name(
            FlowKind::Hotfix.prefix(settings),
            "",
            &hotfix,
        ))
        .at_step(FlowStep::ValidateName)?;
        trace.record(FlowStep::ValidateName, branch.as_str());

        git.create_branch(&branch, master)
            .at_step(FlowStep::CreateBranch)?;
        trace.record(FlowStep::CreateBranch, format!("{} from {}", branch, master));

        let mut pushed = false;
        if request.push {
            git.push(&settings.origin, &branch).at_step(FlowStep::Push)?;
            pushed = true;
            trace.record(FlowStep::Push, format!("{} to {}", branch, settings.origin));
        }

        self.context
            .propagator()
            .propagate(&branch, &snapshot, false, FlowStep::BumpBranchVersion)?;
        trace.record(FlowStep::BumpBranchVersion, snapshot.as_str());

        if request.push
            && republish_if_tracked(git, &settings.origin, &branch).at_step(FlowStep::Push)?
        {
            trace.record(FlowStep::Push, format!("{} republished", branch));
        }

        Ok(FlowResult {
            kind: FlowKind::Hotfix,
            branch,
            branch_version: snapshot,
            source: master.to_string(),
            source_version: current,
            origin: settings.origin.clone(),
            pushed,
            steps: trace.into_steps(),
            warnings: Vec::new(),
        })
    }
}
