mod common;

use common::TestRepo;
use regit_core::error::UpdateError;

#[test]
fn export_produces_merge_free_branch_with_same_tree() {
    let repo = TestRepo::feature_scenario();
    repo.update().unwrap();

    let mut orchestrator = repo.orchestrator(false);
    let feature = orchestrator.graph().lookup("feature").unwrap();
    let report = orchestrator.export(feature, None, true).unwrap();
    drop(orchestrator);

    assert_eq!(report.target, "regit/export/feature");
    assert_eq!(repo.count("main..regit/export/feature"), 4);
    assert!(repo.merge_subjects("main..regit/export/feature").is_empty());
    assert_eq!(
        repo.head("regit/export/feature^{tree}"),
        repo.head("feature^{tree}")
    );

    let first = repo.git_output(&["rev-list", "--reverse", "main..regit/export/feature"]);
    let first = first.lines().next().unwrap();
    assert_eq!(report.pivot, first);
    let manifest = repo.git_output(&["log", "-1", "--format=%B", first]);
    assert!(manifest.starts_with("DEPENDENCY COMMIT"));
    assert!(manifest.contains("      lib\n"));
    assert!(manifest.ends_with("Base branch: main"));
}

#[test]
fn export_without_dependencies_pivots_on_base() {
    let repo = TestRepo::new();
    repo.branch_from("topic", "main");
    repo.init("main", &[]);
    repo.commit_file("topic.txt", "topic\n", "topic work");

    let mut orchestrator = repo.orchestrator(false);
    let topic = orchestrator.graph().lookup("topic").unwrap();
    let report = orchestrator.export(topic, Some("published"), true).unwrap();
    drop(orchestrator);

    assert_eq!(report.pivot, repo.head("main"));
    assert_eq!(repo.subjects("main..published"), vec!["topic work"]);
    assert_eq!(repo.current_branch().as_deref(), Some("published"));
}

#[test]
fn squash_moves_rebase_tip_to_manifest_commit() {
    let repo = TestRepo::feature_scenario();
    repo.update().unwrap();
    let tree = repo.head("feature^{tree}");

    let report = repo.orchestrator(false).squash(true).unwrap();

    assert_eq!(repo.current_branch().as_deref(), Some("feature"));
    assert!(repo.merge_subjects("main..feature").is_empty());
    assert_eq!(repo.head("feature^{tree}"), tree);
    assert_eq!(repo.rebase_tip("feature"), report.pivot);
    assert_eq!(repo.head("feature~3"), report.pivot);
    assert!(!repo.branch_exists("regit/tmp/feature"));
}

#[test]
fn squash_requires_clean_tree() {
    let repo = TestRepo::feature_scenario();
    repo.update().unwrap();
    std::fs::write(repo.path().join("feature1.txt"), "dirty\n").unwrap();

    let err = repo.orchestrator(false).squash(true).unwrap_err();
    assert!(matches!(err, UpdateError::DirtyWorkingTree));
}

#[test]
fn squashed_branch_updates_from_its_manifest() {
    let repo = TestRepo::feature_scenario();
    repo.update().unwrap();
    repo.orchestrator(false).squash(true).unwrap();

    repo.checkout("main");
    repo.commit_file("main3.txt", "main 3\n", "main: three");
    repo.checkout("feature");
    repo.update().unwrap();

    assert_eq!(repo.count("regit/base/feature..feature"), 3);
    assert_eq!(repo.rebase_tip("feature"), repo.head("regit/base/feature"));
}
