//! Integration tests for the update orchestrator
//!
//! The orchestrator is driven against recording mocks so every collaborator
//! call can be asserted in order.

use boxup_cli::error::UpdateError;
use boxup_cli::orchestrators::{RunContext, UpdateFlags, UpdateOrchestrator};
use boxup_core::ProjectOptions;
use boxup_test_utils::{Call, MockProjectSpec, MockWorkspace};
use std::path::{Path, PathBuf};

const WORK: &str = "/work";

fn context() -> RunContext {
    RunContext::new(WORK, ProjectOptions::new("/p"))
}

fn orchestrator(workspace: MockWorkspace) -> UpdateOrchestrator<MockWorkspace> {
    UpdateOrchestrator::new(workspace, context())
}

fn packages(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn project_root(i: usize) -> PathBuf {
    Path::new(WORK).join(format!("project-{i}"))
}

/// Workspace with `count` projects where project `failing` is built by `fail`
fn workspace_failing_at(
    count: usize,
    failing: usize,
    fail: impl Fn(MockProjectSpec) -> MockProjectSpec,
) -> MockWorkspace {
    (0..count).fold(MockWorkspace::new(), |workspace, i| {
        let spec = MockProjectSpec::new(project_root(i));
        let spec = if i == failing { fail(spec) } else { spec };
        workspace.with_project(spec)
    })
}

#[tokio::test]
async fn test_packages_with_sync_makes_no_calls() {
    let workspace = MockWorkspace::new().with_projects(Path::new(WORK), 2);
    let log = workspace.log();
    let orchestrator = orchestrator(workspace);

    let result = orchestrator
        .run(UpdateFlags {
            packages: packages(&["go"]),
            sync: true,
            all_projects: true,
            paths_in_lockfile: true,
        })
        .await;

    assert!(matches!(result, Err(UpdateError::Usage(_))));
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_default_mode_updates_configured_project() {
    let workspace = MockWorkspace::new();
    let log = workspace.log();

    orchestrator(workspace)
        .run(UpdateFlags::default())
        .await
        .unwrap();

    assert_eq!(
        log.calls(),
        vec![
            Call::Open {
                dir: PathBuf::from("/p"),
                environment: "dev".to_string(),
            },
            Call::Update {
                project: PathBuf::from("/p"),
                packages: vec![],
                ignore_missing_packages: false,
            },
        ]
    );
}

#[tokio::test]
async fn test_default_mode_passes_environment() {
    let workspace = MockWorkspace::new();
    let log = workspace.log();
    let context = RunContext::new(WORK, ProjectOptions::new("/p").with_environment("prod"));

    UpdateOrchestrator::new(workspace, context)
        .run(UpdateFlags::default())
        .await
        .unwrap();

    assert_eq!(
        log.calls()[0],
        Call::Open {
            dir: PathBuf::from("/p"),
            environment: "prod".to_string(),
        }
    );
}

#[tokio::test]
async fn test_single_mode_undeclared_package_fails() {
    let workspace =
        MockWorkspace::new().with_open_project(MockProjectSpec::new("/p").declaring(&["go@1.22"]));
    let log = workspace.log();

    let error = orchestrator(workspace)
        .run(UpdateFlags {
            packages: packages(&["python"]),
            ..Default::default()
        })
        .await
        .unwrap_err();

    match error {
        UpdateError::Update {
            project,
            index,
            source,
        } => {
            assert_eq!(project, PathBuf::from("/p"));
            assert_eq!(index, 0);
            assert!(source.to_string().contains("'python' is not declared"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        log.updates(),
        vec![Call::Update {
            project: PathBuf::from("/p"),
            packages: packages(&["python"]),
            ignore_missing_packages: false,
        }]
    );
}

#[tokio::test]
async fn test_single_mode_open_failure() {
    let workspace = MockWorkspace::new().failing_open();
    let log = workspace.log();

    let error = orchestrator(workspace)
        .run(UpdateFlags::default())
        .await
        .unwrap_err();

    assert!(matches!(error, UpdateError::ProjectOpen { ref dir, .. } if dir == Path::new("/p")));
    assert!(log.updates().is_empty());
}

#[tokio::test]
async fn test_all_projects_updates_then_syncs_once() {
    let workspace = MockWorkspace::new().with_projects(Path::new(WORK), 3);
    let log = workspace.log();

    orchestrator(workspace)
        .run(UpdateFlags {
            packages: packages(&["go", "python"]),
            all_projects: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let mut expected = vec![Call::Discover {
        root: PathBuf::from(WORK),
    }];
    expected.extend((0..3).map(|i| Call::Update {
        project: project_root(i),
        packages: packages(&["go", "python"]),
        ignore_missing_packages: true,
    }));
    expected.push(Call::Sync {
        root: PathBuf::from(WORK),
        packages: packages(&["go", "python"]),
    });
    assert_eq!(log.calls(), expected);
}

#[tokio::test]
async fn test_all_projects_without_packages_syncs_everything() {
    let workspace = MockWorkspace::new().with_projects(Path::new(WORK), 2);
    let log = workspace.log();

    orchestrator(workspace)
        .run(UpdateFlags {
            all_projects: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(log.updated(), vec![project_root(0), project_root(1)]);
    assert_eq!(
        log.syncs(),
        vec![Call::Sync {
            root: PathBuf::from(WORK),
            packages: vec![],
        }]
    );
}

#[tokio::test]
async fn test_all_projects_with_no_projects_still_syncs() {
    let workspace = MockWorkspace::new();
    let log = workspace.log();

    orchestrator(workspace)
        .run(UpdateFlags {
            all_projects: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(log.updates().is_empty());
    assert_eq!(log.syncs().len(), 1);
}

#[tokio::test]
async fn test_all_projects_stops_at_first_failure() {
    for failing in 0..4 {
        let workspace = workspace_failing_at(4, failing, |s| s.failing_update("boom"));
        let log = workspace.log();

        let error = orchestrator(workspace)
            .run(UpdateFlags {
                packages: packages(&["go"]),
                all_projects: true,
                ..Default::default()
            })
            .await
            .unwrap_err();

        let expected: Vec<PathBuf> = (0..=failing).map(project_root).collect();
        assert_eq!(log.updated(), expected);
        assert!(log.syncs().is_empty());
        assert_eq!(error.index(), Some(failing));
        assert_eq!(error.project(), Some(project_root(failing).as_path()));
    }
}

#[tokio::test]
async fn test_all_projects_ignores_missing_packages() {
    let workspace = MockWorkspace::new()
        .with_project(MockProjectSpec::new(project_root(0)).declaring(&["go"]))
        .with_project(MockProjectSpec::new(project_root(1)).declaring(&["python"]));
    let log = workspace.log();

    orchestrator(workspace)
        .run(UpdateFlags {
            packages: packages(&["go", "python"]),
            all_projects: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(log.updates().iter().all(|call| matches!(
        call,
        Call::Update {
            ignore_missing_packages: true,
            ..
        }
    )));
    assert_eq!(log.syncs().len(), 1);
}

#[tokio::test]
async fn test_all_projects_discovery_failure() {
    let workspace = MockWorkspace::new().failing_discovery();
    let log = workspace.log();

    let error = orchestrator(workspace)
        .run(UpdateFlags {
            all_projects: true,
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(error, UpdateError::Discovery { ref root, .. } if root == Path::new(WORK)));
    assert!(log.updates().is_empty());
    assert!(log.syncs().is_empty());
}

#[tokio::test]
async fn test_all_projects_sync_failure_is_reported() {
    let workspace = MockWorkspace::new()
        .with_projects(Path::new(WORK), 2)
        .failing_sync("lockfile unreadable");

    let error = orchestrator(workspace)
        .run(UpdateFlags {
            all_projects: true,
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(error, UpdateError::Sync { .. }));
}

#[tokio::test]
async fn test_sync_mode_only_syncs() {
    let workspace = MockWorkspace::new().with_projects(Path::new(WORK), 2);
    let log = workspace.log();

    orchestrator(workspace)
        .run(UpdateFlags {
            sync: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(
        log.calls(),
        vec![Call::Sync {
            root: PathBuf::from(WORK),
            packages: vec![],
        }]
    );
}

#[tokio::test]
async fn test_backfill_saves_every_project() {
    let workspace = MockWorkspace::new().with_projects(Path::new(WORK), 3);
    let log = workspace.log();

    orchestrator(workspace)
        .run(UpdateFlags {
            packages: packages(&["ignored"]),
            paths_in_lockfile: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let mut expected = vec![Call::Discover {
        root: PathBuf::from(WORK),
    }];
    for i in 0..3 {
        expected.push(Call::Backfill {
            project: project_root(i),
        });
        expected.push(Call::Save {
            project: project_root(i),
        });
    }
    assert_eq!(log.calls(), expected);
}

#[tokio::test]
async fn test_backfill_failure_skips_save_and_later_projects() {
    for failing in 0..3 {
        let workspace = workspace_failing_at(3, failing, MockProjectSpec::failing_backfill);
        let log = workspace.log();

        let error = orchestrator(workspace)
            .run(UpdateFlags {
                paths_in_lockfile: true,
                ..Default::default()
            })
            .await
            .unwrap_err();

        let backfilled: Vec<PathBuf> = (0..=failing).map(project_root).collect();
        let saved: Vec<PathBuf> = (0..failing).map(project_root).collect();
        assert_eq!(log.backfilled(), backfilled);
        assert_eq!(log.saved(), saved);
        assert!(matches!(
            error,
            UpdateError::Backfill { ref project, index, .. }
                if *project == project_root(failing) && index == failing
        ));
    }
}

#[tokio::test]
async fn test_save_failure_names_project() {
    for failing in 0..3 {
        let workspace = workspace_failing_at(3, failing, MockProjectSpec::failing_save);
        let log = workspace.log();

        let error = orchestrator(workspace)
            .run(UpdateFlags {
                paths_in_lockfile: true,
                ..Default::default()
            })
            .await
            .unwrap_err();

        let attempted: Vec<PathBuf> = (0..=failing).map(project_root).collect();
        assert_eq!(log.backfilled(), attempted);
        assert_eq!(log.saved(), attempted);
        assert!(matches!(
            error,
            UpdateError::Save { ref project, index, .. }
                if *project == project_root(failing) && index == failing
        ));
    }
}

#[tokio::test]
async fn test_backfill_discovery_failure() {
    let workspace = MockWorkspace::new().failing_discovery();
    let log = workspace.log();

    let error = orchestrator(workspace)
        .run(UpdateFlags {
            paths_in_lockfile: true,
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(error, UpdateError::Discovery { .. }));
    assert!(log.backfilled().is_empty());
}

#[tokio::test]
async fn test_invalid_environment_only_blocks_targeted_update() {
    let staging = || RunContext::new(WORK, ProjectOptions::new("/p").with_environment("staging"));

    let workspace = MockWorkspace::new();
    let log = workspace.log();
    let result = UpdateOrchestrator::new(workspace, staging())
        .run(UpdateFlags::default())
        .await;
    assert!(matches!(result, Err(UpdateError::Usage(ref m)) if m.contains("staging")));
    assert!(log.is_empty());

    let workspace = MockWorkspace::new().with_projects(Path::new(WORK), 2);
    let log = workspace.log();
    UpdateOrchestrator::new(workspace, staging())
        .run(UpdateFlags {
            all_projects: true,
            ..Default::default()
        })
        .await
        .unwrap();
    let synced = log
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::Sync { .. }))
        .count();
    assert_eq!(synced, 1);
}
