//! Flow orchestration
//!
//! Wires configuration, the git gateway, the version writer and the prompter
//! together and runs one flow. Kept apart from `main.rs` so the workflow can
//! be driven programmatically without depending on clap.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::{self, Config};
use crate::domain::{ArtifactPattern, FlowKind, FlowRequest, FlowResult, FlowSettings};
use crate::flow::{start_flow, FlowContext};
use crate::git::{Git2Gateway, GitGateway};
use crate::manifest::{ManifestVersionWriter, VersionWriter};
use crate::ui::{Prompter, TerminalPrompter};

/// Arguments for one `start` run
///
/// Mirrors the CLI arguments in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowArgs {
    pub kind: FlowKind,

    /// Path to custom config file
    pub config_path: Option<PathBuf>,

    /// Directory inside the repository to work on
    pub repo_path: PathBuf,

    /// Push override; the configured push flag applies when absent
    pub push: Option<bool>,

    /// Release name, support label or hotfix version
    pub name: Option<String>,

    pub start_commit: Option<String>,

    pub update_dependencies: bool,

    /// Comma separated include patterns
    pub includes: Option<String>,

    /// Never prompt
    pub batch: bool,
}

impl FlowArgs {
    pub fn new(kind: FlowKind) -> Self {
        FlowArgs {
            kind,
            config_path: None,
            repo_path: PathBuf::from("."),
            push: None,
            name: None,
            start_commit: None,
            update_dependencies: false,
            includes: None,
            batch: false,
        }
    }
}

/// Build the flow request from the arguments and the configuration
pub fn build_request(
    args: &FlowArgs,
    config: &Config,
    settings: &FlowSettings,
) -> crate::Result<FlowRequest> {
    let mut request = FlowRequest::new(args.kind, settings);
    request.interactive = config.behavior.interactive && !args.batch;
    if let Some(push) = args.push {
        request.push = push;
    }
    request.name = args.name.clone();
    request.start_commit = args.start_commit.clone();
    request.update_dependencies = args.update_dependencies;
    if let Some(includes) = args.includes.as_deref() {
        request.includes = ArtifactPattern::parse_list(includes)?;
    }
    Ok(request)
}

/// Run `request` against the given collaborators.
///
/// Hotfixes start from master, which is checked out first.
pub fn execute<G, W, P>(
    git: &G,
    writer: &W,
    prompter: &P,
    settings: &FlowSettings,
    request: &FlowRequest,
) -> crate::Result<FlowResult>
where
    G: GitGateway,
    W: VersionWriter,
    P: Prompter,
{
    let master = FlowKind::Hotfix.source_branch(settings);
    if request.kind == FlowKind::Hotfix && git.current_branch()? != master {
        info!(branch = %master, "checking out master for hotfix");
        git.checkout(master)?;
    }

    let result = start_flow(FlowContext::new(git, writer, prompter, settings), request)?;
    debug!(
        branch = %result.branch,
        steps = result.steps.len(),
        warnings = result.warnings.len(),
        "flow finished"
    );
    Ok(result)
}

/// Main flow workflow
///
/// 1. Load configuration
/// 2. Open the repository through `git2`
/// 3. Build the request from arguments and configuration
/// 4. Run the flow with a terminal prompter
pub fn run_flow(args: &FlowArgs) -> Result<FlowResult> {
    let config = config::load_config(args.config_path.as_deref())?;
    let settings = config.flow_settings();
    debug!(?settings, "loaded configuration");

    let git = Git2Gateway::open(&args.repo_path, settings.origin.clone())?;
    let writer = ManifestVersionWriter::open(&args.repo_path, config.manifest_options())?;
    let prompter = TerminalPrompter::new();

    let request = build_request(args, &config, &settings)?;
    info!(kind = %request.kind, interactive = request.interactive, push = request.push, "starting flow");

    Ok(execute(&git, &writer, &prompter, &settings, &request)?)
}
