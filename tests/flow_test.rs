// tests/flow_test.rs
use git_flow::domain::{
    BranchNamer, FlowKind, FlowRequest, FlowSettings, FlowStep, VersionCalculator,
};
use git_flow::flow::{start_flow, FlowContext};
use git_flow::git::{GitCall, GitGateway, MockGateway};
use git_flow::manifest::{AppliedVersion, MockVersionWriter};
use git_flow::ui::ScriptedPrompter;
use git_flow::GitflowError;

#[test]
fn test_version_calculations() {
    let calculator = VersionCalculator::default();
    assert_eq!(calculator.hotfix_version("1.2.3").unwrap(), "1.2.4");
    assert_eq!(
        calculator.hotfix_snapshot_version("1.2.3").unwrap(),
        "1.2.4-SNAPSHOT"
    );
    assert_eq!(
        calculator.next_develop_version("1.2.3-SNAPSHOT").unwrap(),
        "1.3.0-SNAPSHOT"
    );
    assert_eq!(calculator.next_develop_version("2.5.0").unwrap(), "2.6.0");
}

#[test]
fn test_branch_names() {
    assert_eq!(
        BranchNamer::branch_name("support/", "", "1.2.3"),
        "support/1.2.3"
    );
    assert_eq!(
        BranchNamer::branch_name("support/", "SP1", "1.2.3"),
        "support/SP1"
    );
}

#[test]
fn test_release_snapshot_name_creates_nothing() {
    let settings = FlowSettings::default();
    let git = MockGateway::new("develop");
    let writer = MockVersionWriter::new().with_version("develop", "1.2.0-SNAPSHOT");
    let prompter = ScriptedPrompter::default();

    let mut request = FlowRequest::new(FlowKind::Release, &settings);
    request.name = Some("1.2.3-SNAPSHOT".to_string());
    let err = start_flow(
        FlowContext::new(&git, &writer, &prompter, &settings),
        &request,
    )
    .unwrap_err();

    assert!(matches!(err.root(), GitflowError::InvalidReleaseName(_)));
    assert_eq!(git.create_branch_calls(), 0);
    assert!(writer.applied().is_empty());
}

#[test]
fn test_release_develop_push_failure_stops_flow() {
    let settings = FlowSettings::default();
    let git = MockGateway::new("develop");
    let writer = MockVersionWriter::new()
        .with_version("develop", "1.2.0-SNAPSHOT")
        .failing_on("develop");
    let prompter = ScriptedPrompter::default();

    let mut request = FlowRequest::new(FlowKind::Release, &settings);
    request.push = true;
    let err = start_flow(
        FlowContext::new(&git, &writer, &prompter, &settings),
        &request,
    )
    .unwrap_err();

    assert_eq!(err.failed_step(), Some(FlowStep::BumpDevelopVersion));
    assert!(err.to_string().starts_with("Update develop version failed"));
    // the release branch exists but never received its snapshot version
    assert!(git.has_local_branch("release/1.2.0"));
    assert!(writer.applied().is_empty());
}

#[test]
fn test_release_full_run() {
    let settings = FlowSettings {
        push_release_branch: true,
        ..FlowSettings::default()
    };
    let git = MockGateway::new("master").with_branch("develop");
    let writer = MockVersionWriter::new().with_version("develop", "4.1.0-SNAPSHOT");
    let prompter = ScriptedPrompter::default();

    let request = FlowRequest::new(FlowKind::Release, &settings);
    let result = start_flow(
        FlowContext::new(&git, &writer, &prompter, &settings),
        &request,
    )
    .unwrap();

    assert_eq!(result.branch, "release/4.1.0");
    assert!(result.pushed);
    assert_eq!(
        writer.applied(),
        vec![
            AppliedVersion {
                version: "4.2.0-SNAPSHOT".to_string(),
                branch: "develop".to_string(),
                push: true,
            },
            AppliedVersion {
                version: "4.1.0-SNAPSHOT".to_string(),
                branch: "release/4.1.0".to_string(),
                push: true,
            },
        ]
    );
    let steps: Vec<FlowStep> = result.steps.iter().map(|s| s.step).collect();
    assert_eq!(steps.first(), Some(&FlowStep::Checkout));
    assert_eq!(steps.last(), Some(&FlowStep::BumpBranchVersion));
}

#[test]
fn test_support_without_tags_creates_nothing() {
    let settings = FlowSettings::default();
    let git = MockGateway::new("master");
    let writer = MockVersionWriter::new();
    let prompter = ScriptedPrompter::new(["v1.0.0"]);

    let mut request = FlowRequest::new(FlowKind::Support, &settings);
    request.interactive = true;
    let err = start_flow(
        FlowContext::new(&git, &writer, &prompter, &settings),
        &request,
    )
    .unwrap_err();

    assert!(matches!(err.root(), GitflowError::NoTags { .. }));
    assert_eq!(git.create_branch_calls(), 0);
    assert!(prompter.asked().is_empty());
}

#[test]
fn test_support_existing_remote_branch_succeeds() {
    let settings = FlowSettings::default();
    let git = MockGateway::new("master")
        .with_tags("master", &["v2.3.0", "v2.2.0"])
        .with_remote_branch("support/2.2.1");
    let writer = MockVersionWriter::new().with_version("v2.2.0", "2.2.0");
    let prompter = ScriptedPrompter::default();

    let mut request = FlowRequest::new(FlowKind::Support, &settings);
    request.start_commit = Some("v2.2.0".to_string());
    let result = start_flow(
        FlowContext::new(&git, &writer, &prompter, &settings),
        &request,
    )
    .unwrap();

    assert_eq!(result.branch, "support/2.2.1");
    assert_eq!(result.branch_version, "2.2.1-SNAPSHOT");
    let pushes: Vec<GitCall> = git
        .calls()
        .into_iter()
        .filter(|c| matches!(c, GitCall::Push { .. }))
        .collect();
    assert_eq!(pushes.len(), 2);
}

#[test]
fn test_support_started_twice_republishes() {
    let settings = FlowSettings::default();
    let git = MockGateway::new("master").with_tags("master", &["v2.3.0", "v2.2.0"]);
    let writer = MockVersionWriter::new().with_version("v2.2.0", "2.2.0");
    let prompter = ScriptedPrompter::default();

    let mut request = FlowRequest::new(FlowKind::Support, &settings);
    request.start_commit = Some("v2.2.0".to_string());
    let context = FlowContext::new(&git, &writer, &prompter, &settings);

    let first = start_flow(context, &request).unwrap();
    assert!(git.has_remote_branch("support/2.2.1"));
    assert_eq!(git.pushes().len(), 2);

    git.checkout("master").unwrap();
    git.delete_local_branch("support/2.2.1");

    let second = start_flow(context, &request).unwrap();
    assert_eq!(second.branch, first.branch);
    assert_eq!(second.branch_version, "2.2.1-SNAPSHOT");
    assert_eq!(git.pushes(), vec!["support/2.2.1".to_string(); 4]);
}

#[test]
fn test_hotfix_off_master_is_rejected() {
    let settings = FlowSettings::default();
    let git = MockGateway::new("feature/login");
    let writer = MockVersionWriter::new().with_version("master", "1.0.0");
    let prompter = ScriptedPrompter::default();

    let request = FlowRequest::new(FlowKind::Hotfix, &settings);
    let err = start_flow(
        FlowContext::new(&git, &writer, &prompter, &settings),
        &request,
    )
    .unwrap_err();

    assert!(matches!(err.root(), GitflowError::Precondition(_)));
    assert_eq!(git_flow::error::exit_code(&err), 2);
    assert!(git.calls().is_empty());
}

#[test]
fn test_custom_prefixes_and_separator() {
    let settings = FlowSettings {
        hotfix_prefix: "fix-".to_string(),
        version_separator: '.',
        ..FlowSettings::default()
    };
    let git = MockGateway::new("master");
    let writer = MockVersionWriter::new().with_version("master", "3.0.0");
    let prompter = ScriptedPrompter::default();

    let request = FlowRequest::new(FlowKind::Hotfix, &settings);
    let result = start_flow(
        FlowContext::new(&git, &writer, &prompter, &settings),
        &request,
    )
    .unwrap();

    assert_eq!(result.branch, "fix-3.0.1");
    assert_eq!(result.branch_version, "3.0.1.SNAPSHOT");
}

#[test]
fn test_configured_branch_names_drive_every_flow() {
    let settings = FlowSettings {
        master_branch: "main".to_string(),
        develop_branch: "next".to_string(),
        release_prefix: "rel/".to_string(),
        support_prefix: "maint/".to_string(),
        ..FlowSettings::default()
    };
    let prompter = ScriptedPrompter::default();

    let git = MockGateway::new("main").with_branch("next");
    let writer = MockVersionWriter::new().with_version("next", "4.1.0-SNAPSHOT");
    let release = start_flow(
        FlowContext::new(&git, &writer, &prompter, &settings),
        &FlowRequest::new(FlowKind::Release, &settings),
    )
    .unwrap();
    assert_eq!(release.branch, "rel/4.1.0");
    assert_eq!(release.source, "next");
    assert_eq!(git.calls()[0], GitCall::Checkout("next".to_string()));

    let git = MockGateway::new("main").with_tags("main", &["v4.0.0"]);
    let writer = MockVersionWriter::new().with_version("v4.0.0", "4.0.0");
    let mut request = FlowRequest::new(FlowKind::Support, &settings);
    request.start_commit = Some("v4.0.0".to_string());
    let support = start_flow(
        FlowContext::new(&git, &writer, &prompter, &settings),
        &request,
    )
    .unwrap();
    assert_eq!(support.branch, "maint/4.0.1");
}
