use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use git_flow::cli::{run_flow, FlowArgs};
use git_flow::domain::FlowKind;
use git_flow::error::{exit_code, GitflowError};
use git_flow::{logging, ui};

#[derive(Parser)]
#[command(
    name = "git-flow",
    version,
    about = "Start git-flow hotfix, release and support branches and keep versions in sync"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short = 'C', long, global = true, default_value = ".", help = "Repository directory")]
    repo: PathBuf,

    #[arg(short, long, global = true, help = "Show debug diagnostics")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create hotfix/<version> from master
    HotfixStart(HotfixArgs),
    /// Create release/<name> from develop and bump develop
    ReleaseStart(ReleaseArgs),
    /// Create support/<version> from a tag on master
    SupportStart(SupportArgs),
}

#[derive(Args)]
struct CommonArgs {
    #[arg(long, conflicts_with = "no_push", help = "Push created branches")]
    push: bool,

    #[arg(long, help = "Do not push created branches")]
    no_push: bool,

    #[arg(long, help = "Never prompt; use defaults and explicit values")]
    batch: bool,
}

impl CommonArgs {
    fn push_override(&self) -> Option<bool> {
        if self.push {
            Some(true)
        } else if self.no_push {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Args)]
struct HotfixArgs {
    #[arg(short, long, help = "Explicit hotfix version instead of the computed one")]
    name: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct ReleaseArgs {
    #[arg(short, long, help = "Release name (a non-snapshot version)")]
    name: Option<String>,

    #[arg(long, help = "Commit to create the release branch from")]
    start_commit: Option<String>,

    #[arg(long, help = "Replace snapshot dependencies with released versions")]
    update_dependencies: bool,

    #[arg(
        long,
        help = "Comma separated group:artifact:type:classifier:version patterns"
    )]
    includes: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct SupportArgs {
    #[arg(short, long, help = "Support label used instead of the version (e.g. SP1)")]
    name: Option<String>,

    #[arg(long, help = "Tag or commit to create the support branch from")]
    start_commit: Option<String>,

    // support branches are always pushed, so there is no push override
    #[arg(long, help = "Never prompt; use defaults and explicit values")]
    batch: bool,
}

impl Command {
    fn into_flow_args(self) -> FlowArgs {
        match self {
            Command::HotfixStart(args) => {
                let mut flow = FlowArgs::new(FlowKind::Hotfix);
                flow.name = args.name;
                apply_common(&mut flow, &args.common);
                flow
            }
            Command::ReleaseStart(args) => {
                let mut flow = FlowArgs::new(FlowKind::Release);
                flow.name = args.name;
                flow.start_commit = args.start_commit;
                flow.update_dependencies = args.update_dependencies;
                flow.includes = args.includes;
                apply_common(&mut flow, &args.common);
                flow
            }
            Command::SupportStart(args) => {
                let mut flow = FlowArgs::new(FlowKind::Support);
                flow.name = args.name;
                flow.start_commit = args.start_commit;
                flow.batch = args.batch;
                flow
            }
        }
    }
}

fn apply_common(flow: &mut FlowArgs, common: &CommonArgs) {
    flow.push = common.push_override();
    flow.batch = common.batch;
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut args = cli.command.into_flow_args();
    args.config_path = cli.config;
    args.repo_path = cli.repo;

    match run_flow(&args) {
        Ok(result) => ui::display_flow_result(&result),
        Err(err) => {
            let code = match err.downcast_ref::<GitflowError>() {
                Some(flow_err) => {
                    ui::display_flow_error(args.kind, flow_err);
                    exit_code(flow_err)
                }
                None => {
                    ui::display_error(&format!("{:#}", err));
                    1
                }
            };
            std::process::exit(code);
        }
    }
}
