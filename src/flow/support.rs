use crate::domain::{BranchNamer, FlowKind, FlowRequest, FlowResult, FlowStep, VersionCalculator};
use crate::error::{GitflowError, Result};
use crate::flow::{
    expect_kind, republish_if_tracked, Flow, FlowContext, StepContext, Trace,
};
use crate::git::GitGateway;
use crate::manifest::VersionWriter;
use crate::ui::Prompter;

const TAG_CHOICE_TITLE: &str = "Tags";
const TAG_CHOICE_MESSAGE: &str = "Please select a tag to create Support branch from";

/// Starts a long-lived `support/<version>` branch from a tag on master
pub struct SupportFlow<'a, G, W, P> {
    context: FlowContext<'a, G, W, P>,
    calculator: VersionCalculator,
}

impl<'a, G, W, P> SupportFlow<'a, G, W, P>
where
    G: GitGateway,
    W: VersionWriter,
    P: Prompter,
{
    pub fn new(context: FlowContext<'a, G, W, P>) -> Self {
        SupportFlow {
            calculator: VersionCalculator::new(context.settings.version_separator),
            context,
        }
    }

    fn start_commit(&self, request: &FlowRequest, tags: &[String]) -> Result<String> {
        if let Some(commit) = request.explicit_start_commit() {
            return Ok(commit.to_string());
        }
        if !request.interactive {
            return Err(GitflowError::precondition(
                "a start commit or tag is required when not running interactively",
            ));
        }
        self.context
            .prompter
            .prompt_choice(TAG_CHOICE_TITLE, TAG_CHOICE_MESSAGE, tags)
    }

    fn versions(&self, tagged: &str) -> Result<(String, String)> {
        Ok((
            self.calculator.support_version(tagged)?,
            self.calculator.support_snapshot_version(tagged)?,
        ))
    }

    /// `prefix + label` when a label is given, else `prefix + version`
    fn branch_name(&self, request: &FlowRequest, version: &str) -> Result<String> {
        let label = match request.explicit_name() {
            Some(label) => BranchNamer::trim_ref_name(label)?,
            None => String::new(),
        };
        let prefix = FlowKind::Support.prefix(self.context.settings);
        let name = BranchNamer::branch_name(prefix, &label, version);
        BranchNamer::trim_ref_name(&name)
    }
}

impl<G, W, P> Flow for SupportFlow<'_, G, W, P>
where
    G: GitGateway,
    W: VersionWriter,
    P: Prompter,
{
    fn start(&self, request: &FlowRequest) -> Result<FlowResult> {
        expect_kind(request, FlowKind::Support)?;
        let FlowContext { git, writer, settings, .. } = self.context;
        let master = FlowKind::Support.source_branch(settings);
        let mut trace = Trace::default();

        let tags = git
            .local_tags_on_branch(master)
            .at_step(FlowStep::ListTags)?;
        if tags.is_empty() {
            return Err(GitflowError::NoTags {
                branch: master.to_string(),
            }
            .at(FlowStep::ListTags));
        }
        trace.record(FlowStep::ListTags, format!("{} tags on {}", tags.len(), master));

        let start = self
            .start_commit(request, &tags)
            .at_step(FlowStep::SelectStartCommit)?;
        trace.record(FlowStep::SelectStartCommit, start.as_str());

        git.checkout(&start).at_step(FlowStep::Checkout)?;
        trace.record(FlowStep::Checkout, start.as_str());

        let tagged = writer
            .current_version(&start)
            .map(|version| version.to_string())
            .at_step(FlowStep::ReadVersion)?;
        trace.record(FlowStep::ReadVersion, tagged.as_str());

        let (version, snapshot) = self.versions(&tagged).at_step(FlowStep::ComputeVersions)?;
        trace.record(FlowStep::ComputeVersions, format!("{} ({})", version, snapshot));

        let branch = self
            .branch_name(request, &version)
            .at_step(FlowStep::ResolveName)?;
        trace.record(FlowStep::ResolveName, branch.as_str());

        git.create_branch(&branch, &start)
            .at_step(FlowStep::CreateBranch)?;
        trace.record(FlowStep::CreateBranch, format!("{} from {}", branch, start));

        git.push(&settings.origin, &branch).at_step(FlowStep::Push)?;
        trace.record(FlowStep::Push, format!("{} to {}", branch, settings.origin));

        self.context
            .propagator()
            .propagate(&branch, &snapshot, false, FlowStep::BumpBranchVersion)?;
        trace.record(FlowStep::BumpBranchVersion, snapshot.as_str());

        if republish_if_tracked(git, &settings.origin, &branch).at_step(FlowStep::Push)? {
            trace.record(FlowStep::Push, format!("{} republished", branch));
        }

        Ok(FlowResult {
            kind: FlowKind::Support,
            branch,
            branch_version: snapshot,
            source: start,
            source_version: tagged,
            origin: settings.origin.clone(),
            pushed: true,
            steps: trace.into_steps(),
            warnings: Vec::new(),
        })
    }
}
