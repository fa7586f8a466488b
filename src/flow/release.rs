use crate::domain::{
    BranchNamer, FlowKind, FlowRequest, FlowResult, FlowStep, SemanticVersion, VersionCalculator,
    SNAPSHOT_QUALIFIER,
};
use crate::error::{GitflowError, Result};
use crate::flow::{expect_kind, read_current_version, Flow, FlowContext, StepContext, Trace};
use crate::git::GitGateway;
use crate::manifest::{Resolution, VersionWriter};
use crate::ui::Prompter;
use crate::warning::FlowWarning;

const NEXT_DEVELOP_PROMPT: &str = "What is the next development version? ";

/// Starts `release/<name>` from develop and moves develop to the next
/// development version
pub struct ReleaseFlow<'a, G, W, P> {
    context: FlowContext<'a, G, W, P>,
    calculator: VersionCalculator,
}

impl<'a, G, W, P> ReleaseFlow<'a, G, W, P>
where
    G: GitGateway,
    W: VersionWriter,
    P: Prompter,
{
    pub fn new(context: FlowContext<'a, G, W, P>) -> Self {
        ReleaseFlow {
            calculator: VersionCalculator::new(context.settings.version_separator),
            context,
        }
    }

    fn next_develop_version(&self, request: &FlowRequest, develop_version: &str) -> Result<String> {
        let computed = self.calculator.next_develop_version(develop_version)?;
        if !request.interactive {
            return Ok(computed);
        }

        let answer = self
            .context
            .prompter
            .prompt_free_text(NEXT_DEVELOP_PROMPT, &computed)?;
        Ok(SemanticVersion::parse(answer.trim())?.to_string())
    }

    fn release_name(&self, request: &FlowRequest, develop_version: &str) -> Result<String> {
        let name = match request.explicit_name() {
            Some(name) => name.to_string(),
            None => {
                let default = self.calculator.release_version(develop_version)?;
                if request.interactive {
                    let message = format!(
                        "What is the release branch name? {}",
                        FlowKind::Release.prefix(self.context.settings)
                    );
                    self.context.prompter.prompt_free_text(&message, &default)?
                } else {
                    default
                }
            }
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(GitflowError::invalid_name("release name cannot be blank"));
        }
        Ok(name.to_string())
    }

    /// Unresolved entries become warnings; an update that resolved nothing is
    /// reported once
    fn update_dependencies(&self, request: &FlowRequest) -> Result<(usize, Vec<FlowWarning>)> {
        let updates = self
            .context
            .writer
            .update_dependency_versions(&request.includes)?;

        let mut warnings: Vec<FlowWarning> = updates
            .iter()
            .filter_map(|update| match &update.resolution {
                Resolution::Unresolved(reason) => {
                    Some(FlowWarning::UnresolvedDependency {
                        artifact: update.artifact.clone(),
                        reason: reason.clone(),
                    })
                }
                Resolution::Resolved(_) => None,
            })
            .collect();

        let resolved = updates.iter().filter(|u| u.is_resolved()).count();
        if resolved == 0 {
            warnings.push(FlowWarning::NoDependenciesUpdated);
        }
        Ok((resolved, warnings))
    }
}

impl<G, W, P> Flow for ReleaseFlow<'_, G, W, P>
where
    G: GitGateway,
    W: VersionWriter,
    P: Prompter,
{
    fn start(&self, request: &FlowRequest) -> Result<FlowResult> {
        expect_kind(request, FlowKind::Release)?;
        let FlowContext { git, writer, settings, .. } = self.context;
        let develop = FlowKind::Release.source_branch(settings);
        let prefix = FlowKind::Release.prefix(settings);
        let mut trace = Trace::default();

        git.checkout(develop).at_step(FlowStep::Checkout)?;
        trace.record(FlowStep::Checkout, develop);

        let develop_version =
            read_current_version(writer, request, develop).at_step(FlowStep::ReadVersion)?;
        trace.record(FlowStep::ReadVersion, develop_version.as_str());

        let next_develop = self
            .next_develop_version(request, &develop_version)
            .at_step(FlowStep::ComputeVersions)?;
        trace.record(FlowStep::ComputeVersions, format!("next develop {}", next_develop));

        let name = self
            .release_name(request, &develop_version)
            .at_step(FlowStep::ResolveName)?;
        trace.record(FlowStep::ResolveName, name.as_str());

        let release_version =
            BranchNamer::validate_release_name(&name).at_step(FlowStep::ValidateName)?;
        let branch = BranchNamer::branch_name(prefix, &name, &name);
        trace.record(FlowStep::ValidateName, branch.as_str());

        let from = request.explicit_start_commit().unwrap_or(develop);
        git.create_branch(&branch, from)
            .at_step(FlowStep::CreateBranch)?;
        trace.record(FlowStep::CreateBranch, format!("{} from {}", branch, from));

        if request.push {
            git.push(&settings.origin, &branch).at_step(FlowStep::Push)?;
            trace.record(FlowStep::Push, format!("{} to {}", branch, settings.origin));
        }

        let current = git.current_branch().at_step(FlowStep::VerifyBranch)?;
        if !current.starts_with(prefix) {
            return Err(GitflowError::flow("failed to create release version")
                .at(FlowStep::VerifyBranch));
        }
        trace.record(FlowStep::VerifyBranch, current);

        let mut warnings = Vec::new();
        if request.update_dependencies {
            let (resolved, found) = self
                .update_dependencies(request)
                .at_step(FlowStep::UpdateDependencies)?;
            warnings = found;
            trace.record(
                FlowStep::UpdateDependencies,
                format!("{} dependencies released", resolved),
            );
        }

        let propagator = self.context.propagator();
        propagator.propagate(develop, &next_develop, request.push, FlowStep::BumpDevelopVersion)?;
        trace.record(FlowStep::BumpDevelopVersion, next_develop.as_str());

        let snapshot = release_version
            .with_qualifier(self.calculator.separator(), SNAPSHOT_QUALIFIER)
            .to_string();
        propagator.propagate(&branch, &snapshot, request.push, FlowStep::BumpBranchVersion)?;
        trace.record(FlowStep::BumpBranchVersion, snapshot.as_str());

        Ok(FlowResult {
            kind: FlowKind::Release,
            branch,
            branch_version: snapshot,
            source: develop.to_string(),
            source_version: next_develop,
            origin: settings.origin.clone(),
            pushed: request.push,
            steps: trace.into_steps(),
            warnings,
        })
    }
}
