// Exercises the libgit2 host against bare repositories created on disk.
use std::fs;
use std::path::{Path, PathBuf};

use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;
use workspace_ci::config::Config;
use workspace_ci::domain::{BranchName, RepositorySpec, WorkspaceMember};
use workspace_ci::git::{Git2Host, RepositoryHost};
use workspace_ci::pipeline::{Pipeline, PipelineOptions, Stage};
use workspace_ci::runner::RecordingRunner;
use workspace_ci::WorkspaceError;

/// Commit a single `marker.txt` with `content` onto `refname`
fn commit_marker(repo: &Repository, refname: &str, content: &str, parent: Option<git2::Oid>) {
    let sig = Signature::now("Test User", "test@example.com").expect("Could not create signature");
    let blob = repo.blob(content.as_bytes()).expect("Could not write blob");
    let mut builder = repo.treebuilder(None).expect("Could not create tree builder");
    builder
        .insert("marker.txt", blob, 0o100644)
        .expect("Could not insert blob");
    let tree = repo
        .find_tree(builder.write().expect("Could not write tree"))
        .expect("Could not find tree");

    let parents: Vec<git2::Commit> = parent
        .map(|oid| repo.find_commit(oid).expect("Could not find parent"))
        .into_iter()
        .collect();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    repo.commit(Some(refname), &sig, &sig, content, &tree, &parent_refs)
        .expect("Could not create commit");
}

/// Create a bare remote on `main` plus the given branches
fn setup_remote(dir: &Path, branches: &[&str]) -> String {
    let mut opts = RepositoryInitOptions::new();
    opts.bare(true).initial_head("main");
    let repo = Repository::init_opts(dir, &opts).expect("Could not init remote");

    commit_marker(&repo, "HEAD", "main", None);
    let main = repo
        .refname_to_id("refs/heads/main")
        .expect("Could not find main");

    for branch in branches {
        commit_marker(&repo, &format!("refs/heads/{}", branch), branch, Some(main));
    }

    dir.to_str().expect("non-UTF-8 temp path").to_string()
}

fn marker(path: &Path) -> String {
    fs::read_to_string(path.join("marker.txt")).expect("Could not read marker")
}

fn head_branch(path: &Path) -> String {
    let repo = Repository::open(path).expect("Could not open checkout");
    let head = repo.head().expect("Could not read HEAD");
    head.shorthand().unwrap_or_default().to_string()
}

fn cloned_member(temp: &TempDir, name: &str, remote: &str) -> WorkspaceMember {
    let spec = RepositorySpec::new(name, remote);
    let dest = temp.path().join("ws").join(name);
    let materialized = Git2Host::new()
        .materialize(&spec, &dest)
        .expect("Could not materialize");
    WorkspaceMember::new(spec, dest, materialized.branch)
}

#[test]
fn test_materialize_clones_default_branch() {
    let temp = TempDir::new().unwrap();
    let remote = setup_remote(&temp.path().join("remotes/conf.git"), &["feature-x"]);
    let spec = RepositorySpec::new("PyAutoConf", remote);
    let dest = temp.path().join("ws/PyAutoConf");

    let materialized = Git2Host::new().materialize(&spec, &dest).unwrap();

    assert_eq!(materialized.branch, "main");
    assert!(!materialized.adopted);
    assert_eq!(marker(&dest), "main");
}

#[test]
fn test_materialize_declared_default_branch() {
    let temp = TempDir::new().unwrap();
    let remote = setup_remote(&temp.path().join("remotes/fit.git"), &["develop"]);
    let spec = RepositorySpec::new("PyAutoFit", remote).with_default_branch("develop");
    let dest = temp.path().join("ws/PyAutoFit");

    let materialized = Git2Host::new().materialize(&spec, &dest).unwrap();

    assert_eq!(materialized.branch, "develop");
    assert_eq!(marker(&dest), "develop");
}

#[test]
fn test_materialize_adopts_existing_checkout() {
    let temp = TempDir::new().unwrap();
    let remote = setup_remote(&temp.path().join("remotes/lens.git"), &[]);
    let spec = RepositorySpec::new("PyAutoLens", remote);
    let dest = temp.path().join("ws/PyAutoLens");
    let host = Git2Host::new();
    host.materialize(&spec, &dest).unwrap();

    let again = host.materialize(&spec, &dest).unwrap();

    assert!(again.adopted);
    assert_eq!(again.branch, "main");
}

#[test]
fn test_materialize_refuses_non_git_directory() {
    let temp = TempDir::new().unwrap();
    let remote = setup_remote(&temp.path().join("remotes/conf.git"), &[]);
    let dest = temp.path().join("ws/PyAutoConf");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("stray.txt"), "x").unwrap();

    let err = Git2Host::new()
        .materialize(&RepositorySpec::new("PyAutoConf", remote), &dest)
        .unwrap_err();

    assert!(err.to_string().contains("not a git checkout"));
}

#[test]
fn test_materialize_unknown_remote_fails() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("remotes/missing.git");
    let spec = RepositorySpec::new("PyAutoConf", missing.to_str().unwrap());

    let result = Git2Host::new().materialize(&spec, &temp.path().join("ws/PyAutoConf"));

    assert!(result.is_err());
}

#[test]
fn test_branch_exists() {
    let temp = TempDir::new().unwrap();
    let remote = setup_remote(
        &temp.path().join("remotes/array.git"),
        &["feature-x", "feature/lensing"],
    );
    let member = cloned_member(&temp, "PyAutoArray", &remote);
    let host = Git2Host::new();

    let exists = |name: &str| {
        host.branch_exists(&member, &BranchName::new(name).unwrap())
            .unwrap()
    };

    assert!(exists("feature-x"));
    assert!(exists("feature/lensing"));
    assert!(exists("main"));
    assert!(!exists("feature-y"));
    // no prefix matching
    assert!(!exists("feature"));
}

#[test]
fn test_checkout_switches_branch() {
    let temp = TempDir::new().unwrap();
    let remote = setup_remote(&temp.path().join("remotes/galaxy.git"), &["feature/lensing"]);
    let member = cloned_member(&temp, "PyAutoGalaxy", &remote);

    Git2Host::new()
        .checkout(&member, &BranchName::new("feature/lensing").unwrap())
        .unwrap();

    assert_eq!(head_branch(&member.path), "feature/lensing");
    assert_eq!(marker(&member.path), "feature/lensing");
}

#[test]
fn test_checkout_missing_branch_fails() {
    let temp = TempDir::new().unwrap();
    let remote = setup_remote(&temp.path().join("remotes/galaxy.git"), &[]);
    let member = cloned_member(&temp, "PyAutoGalaxy", &remote);

    let result = Git2Host::new().checkout(&member, &BranchName::new("nope").unwrap());

    assert!(result.is_err());
    assert_eq!(head_branch(&member.path), "main");
}

#[test]
fn test_vanished_remote_is_an_error_not_absence() {
    let temp = TempDir::new().unwrap();
    let remote_dir = temp.path().join("remotes/conf.git");
    let remote = setup_remote(&remote_dir, &["feature-x"]);
    let member = cloned_member(&temp, "PyAutoConf", &remote);
    fs::remove_dir_all(&remote_dir).unwrap();

    let result = Git2Host::new().branch_exists(&member, &BranchName::new("feature-x").unwrap());

    assert!(result.is_err());
}

#[test]
fn test_pipeline_against_local_remotes() {
    let temp = TempDir::new().unwrap();
    let remotes = temp.path().join("remotes");
    let conf = setup_remote(&remotes.join("conf.git"), &["feature-x"]);
    let fit = setup_remote(&remotes.join("fit.git"), &[]);
    let lens = setup_remote(&remotes.join("lens.git"), &["feature-x"]);

    let mut config = Config::default();
    config.repositories = vec![
        RepositorySpec::new("PyAutoConf", conf),
        RepositorySpec::new("PyAutoFit", fit),
        RepositorySpec::new("PyAutoLens", lens).primary(),
    ];
    let root: PathBuf = temp.path().join("ws");
    fs::create_dir_all(&root).unwrap();
    let host = Git2Host::new();
    let runner = RecordingRunner::new();

    let report = Pipeline::new(&config, &host, &runner, PipelineOptions::new(&root))
        .run(&BranchName::new("feature-x").unwrap())
        .unwrap();

    assert_eq!(report.exit_code(), 0);
    assert_eq!(head_branch(&root.join("PyAutoConf")), "feature-x");
    assert_eq!(marker(&root.join("PyAutoConf")), "feature-x");
    assert_eq!(head_branch(&root.join("PyAutoFit")), "main");
    assert_eq!(report.environment.search_path.len(), 3);

    // the freshly cloned primary is tested on the branch under test too
    let primary = report.workspace.primary().unwrap();
    assert_eq!(primary.effective_branch, "feature-x");
    assert_eq!(head_branch(&root.join("PyAutoLens")), "feature-x");
    assert_eq!(marker(&root.join("PyAutoLens")), "feature-x");
}

#[test]
fn test_pipeline_keeps_adopted_primary_checkout() {
    let temp = TempDir::new().unwrap();
    let remotes = temp.path().join("remotes");
    let conf = setup_remote(&remotes.join("conf.git"), &["feature-x"]);
    let lens = setup_remote(&remotes.join("lens.git"), &["feature-x"]);

    let root = temp.path().join("ws");
    let host = Git2Host::new();
    // CI has already checked out the primary itself
    host.materialize(&RepositorySpec::new("PyAutoLens", lens.as_str()), &root.join("PyAutoLens"))
        .unwrap();

    let mut config = Config::default();
    config.repositories = vec![
        RepositorySpec::new("PyAutoConf", conf),
        RepositorySpec::new("PyAutoLens", lens).primary(),
    ];
    let runner = RecordingRunner::new();

    let report = Pipeline::new(&config, &host, &runner, PipelineOptions::new(&root))
        .run(&BranchName::new("feature-x").unwrap())
        .unwrap();

    assert_eq!(head_branch(&root.join("PyAutoLens")), "main");
    assert_eq!(head_branch(&root.join("PyAutoConf")), "feature-x");
    assert!(report.workspace.primary().unwrap().adopted);
}

#[test]
fn test_pipeline_fails_when_primary_lacks_branch() {
    let temp = TempDir::new().unwrap();
    let remotes = temp.path().join("remotes");
    let conf = setup_remote(&remotes.join("conf.git"), &["feature-x"]);
    let lens = setup_remote(&remotes.join("lens.git"), &[]);

    let mut config = Config::default();
    config.repositories = vec![
        RepositorySpec::new("PyAutoConf", conf),
        RepositorySpec::new("PyAutoLens", lens).primary(),
    ];
    let root = temp.path().join("ws");
    let host = Git2Host::new();
    let runner = RecordingRunner::new();

    let err = Pipeline::new(&config, &host, &runner, PipelineOptions::new(&root))
        .run(&BranchName::new("feature-x").unwrap())
        .unwrap_err();

    assert!(matches!(err, WorkspaceError::CheckoutSwitch { .. }));
    assert_eq!(err.stage(), Some(Stage::Resolve));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_pipeline_fails_when_dependency_remote_vanishes() {
    let temp = TempDir::new().unwrap();
    let remotes = temp.path().join("remotes");
    let conf = setup_remote(&remotes.join("conf.git"), &[]);
    let lens = setup_remote(&remotes.join("lens.git"), &["feature-x"]);

    let root = temp.path().join("ws");
    let host = Git2Host::new();
    // pre-populate the dependency, then take its remote away
    host.materialize(&RepositorySpec::new("PyAutoConf", conf.as_str()), &root.join("PyAutoConf"))
        .unwrap();
    fs::remove_dir_all(remotes.join("conf.git")).unwrap();

    let mut config = Config::default();
    config.repositories = vec![
        RepositorySpec::new("PyAutoConf", conf),
        RepositorySpec::new("PyAutoLens", lens).primary(),
    ];
    let runner = RecordingRunner::new();

    let err = Pipeline::new(&config, &host, &runner, PipelineOptions::new(&root))
        .run(&BranchName::new("feature-x").unwrap())
        .unwrap_err();

    assert!(matches!(err, WorkspaceError::ResolutionAmbiguous { .. }));
    assert_eq!(err.stage(), Some(Stage::Resolve));
    assert!(runner.calls().is_empty());
}
