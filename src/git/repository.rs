use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Direction, FetchOptions, RemoteCallbacks, Repository};
use std::path::Path;
use tracing::debug;

use crate::domain::{BranchName, RepositorySpec, WorkspaceMember};
use crate::error::{Result, WorkspaceError};
use crate::git::Materialized;

/// Remote-tracking namespace used for branches fetched during resolution
const TRACKING_REMOTE: &str = "origin";

/// Repository host backed by libgit2
///
/// Holds no state; every operation opens the checkout it works on.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Host;

impl Git2Host {
    pub fn new() -> Self {
        Git2Host
    }
}

/// Builds callbacks that authenticate via SSH keys from ~/.ssh/, the SSH agent,
/// or the default credential
fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");

            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });
    callbacks
}

fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut options = FetchOptions::new();
    options.remote_callbacks(remote_callbacks());
    options
}

/// Short name of the branch HEAD points at, or `HEAD` when detached
fn current_branch(repo: &Repository) -> Result<String> {
    let head = repo.head()?;
    if head.is_branch() {
        if let Some(name) = head.shorthand() {
            return Ok(name.to_string());
        }
    }
    Ok("HEAD".to_string())
}

impl super::RepositoryHost for Git2Host {
    fn materialize(&self, spec: &RepositorySpec, dest: &Path) -> Result<Materialized> {
        if dest.join(".git").exists() {
            debug!(repository = %spec.name, path = %dest.display(), "adopting existing checkout");
            let repo = Repository::open(dest)?;
            return Ok(Materialized {
                branch: current_branch(&repo)?,
                adopted: true,
            });
        }

        if dest.exists() && dest.read_dir()?.next().is_some() {
            return Err(WorkspaceError::assembly(
                &spec.name,
                format!(
                    "destination '{}' exists and is not a git checkout",
                    dest.display()
                ),
            ));
        }

        debug!(repository = %spec.name, remote = %spec.remote, "cloning");
        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options());
        if let Some(branch) = &spec.default_branch {
            builder.branch(branch);
        }
        let repo = builder.clone(&spec.remote, dest)?;

        Ok(Materialized {
            branch: current_branch(&repo)?,
            adopted: false,
        })
    }

    fn branch_exists(&self, member: &WorkspaceMember, branch: &BranchName) -> Result<bool> {
        let repo = Repository::open(&member.path)?;
        let mut remote = repo.remote_anonymous(&member.spec.remote)?;

        let connection = remote.connect_auth(Direction::Fetch, Some(remote_callbacks()), None)?;
        let wanted = branch.local_ref();
        let found = connection.list()?.iter().any(|head| head.name() == wanted);

        Ok(found)
    }

    fn checkout(&self, member: &WorkspaceMember, branch: &BranchName) -> Result<()> {
        let repo = Repository::open(&member.path)?;
        let mut remote = repo.remote_anonymous(&member.spec.remote)?;

        let tracking_ref = format!("refs/remotes/{}/{}", TRACKING_REMOTE, branch);
        let refspec = format!("+{}:{}", branch.local_ref(), tracking_ref);
        remote.fetch(&[refspec.as_str()], Some(&mut fetch_options()), None)?;

        let commit = repo.find_reference(&tracking_ref)?.peel_to_commit()?;
        let local_ref = branch.local_ref();

        // git refuses to force-move the branch HEAD is on
        let on_branch = repo
            .head()
            .ok()
            .and_then(|head| head.name().map(|name| name == local_ref))
            .unwrap_or(false);
        if on_branch {
            repo.find_reference(&local_ref)?
                .set_target(commit.id(), "workspace-ci: update from remote")?;
        } else {
            repo.branch(branch.as_str(), &commit, true)?;
        }

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        repo.checkout_tree(commit.as_object(), Some(&mut checkout))?;
        repo.set_head(&local_ref)?;

        debug!(
            repository = %member.spec.name,
            branch = %branch,
            commit = %commit.id(),
            "checked out"
        );
        Ok(())
    }
}
