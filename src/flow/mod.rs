//! Branch-lifecycle state machines.
//!
//! Each flow kind has its own [Flow] implementation driving the
//! collaborators in a [FlowContext] through a fixed sequence of steps.
//! Flows never print or log: they return a [FlowResult] with the step trace
//! and tag every failure with the [FlowStep] it happened in.

pub mod hotfix;
pub mod propagator;
pub mod release;
pub mod support;

pub use hotfix::HotfixFlow;
pub use propagator::VersionPropagator;
pub use release::ReleaseFlow;
pub use support::SupportFlow;

use crate::domain::{FlowKind, FlowRequest, FlowResult, FlowSettings, FlowStep, StepRecord};
use crate::error::{GitflowError, Result};
use crate::git::GitGateway;
use crate::manifest::VersionWriter;
use crate::ui::Prompter;

/// A `start` transition for one flow kind
pub trait Flow {
    fn start(&self, request: &FlowRequest) -> Result<FlowResult>;
}

/// Collaborators and settings borrowed by a flow for one run
pub struct FlowContext<'a, G, W, P> {
    pub git: &'a G,
    pub writer: &'a W,
    pub prompter: &'a P,
    pub settings: &'a FlowSettings,
}

impl<G, W, P> Clone for FlowContext<'_, G, W, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G, W, P> Copy for FlowContext<'_, G, W, P> {}

impl<'a, G, W, P> FlowContext<'a, G, W, P>
where
    G: GitGateway,
    W: VersionWriter,
    P: Prompter,
{
    pub fn new(git: &'a G, writer: &'a W, prompter: &'a P, settings: &'a FlowSettings) -> Self {
        FlowContext {
            git,
            writer,
            prompter,
            settings,
        }
    }

    pub(crate) fn propagator(&self) -> VersionPropagator<'a, G, W> {
        VersionPropagator::new(self.git, self.writer)
    }
}

/// Run the flow matching `request.kind`
pub fn start_flow<G, W, P>(
    context: FlowContext<'_, G, W, P>,
    request: &FlowRequest,
) -> Result<FlowResult>
where
    G: GitGateway,
    W: VersionWriter,
    P: Prompter,
{
    match request.kind {
        FlowKind::Hotfix => HotfixFlow::new(context).start(request),
        FlowKind::Release => ReleaseFlow::new(context).start(request),
        FlowKind::Support => SupportFlow::new(context).start(request),
    }
}

/// Tag a failure with the step that produced it
pub(crate) trait StepContext<T> {
    fn at_step(self, step: FlowStep) -> Result<T>;
}

impl<T> StepContext<T> for Result<T> {
    fn at_step(self, step: FlowStep) -> Result<T> {
        self.map_err(|e| e.at(step))
    }
}

/// Ordered record of completed steps
#[derive(Debug, Default)]
pub(crate) struct Trace {
    steps: Vec<StepRecord>,
}

impl Trace {
    pub(crate) fn record(&mut self, step: FlowStep, detail: impl Into<String>) {
        self.steps.push(StepRecord {
            step,
            detail: detail.into(),
        });
    }

    pub(crate) fn into_steps(self) -> Vec<StepRecord> {
        self.steps
    }
}

/// Version to start from: the request's, else the one recorded at `reference`
pub(crate) fn read_current_version<W: VersionWriter>(
    writer: &W,
    request: &FlowRequest,
    reference: &str,
) -> Result<String> {
    match request.current_version.as_deref().map(str::trim) {
        Some(version) if !version.is_empty() => Ok(version.to_string()),
        _ => Ok(writer.current_version(reference)?.to_string()),
    }
}

/// Publish `branch` a second time when the remote already carries it
pub(crate) fn republish_if_tracked<G: GitGateway>(
    git: &G,
    origin: &str,
    branch: &str,
) -> Result<bool> {
    if git.remote_branch_exists(branch)? {
        git.push(origin, branch)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Fail unless the request is for `kind`
pub(crate) fn expect_kind(request: &FlowRequest, kind: FlowKind) -> Result<()> {
    if request.kind == kind {
        Ok(())
    } else {
        Err(GitflowError::flow(format!(
            "{} flow cannot run a {} request",
            kind, request.kind
        )))
    }
}
