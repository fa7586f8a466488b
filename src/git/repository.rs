use crate::error::{GitflowError, Result};
use git2::build::CheckoutBuilder;
use git2::{BranchType, Commit, Direction, Oid, Repository};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// [super::GitGateway] backed by a `git2` repository
pub struct Git2Gateway {
    repo: Repository,
    origin: String,
}

impl Git2Gateway {
    /// Open or discover a git repository, using `origin` for remote queries
    pub fn open<P: AsRef<Path>>(path: P, origin: impl Into<String>) -> Result<Self> {
        let repo = Repository::discover(path)?;

        Ok(Git2Gateway {
            repo,
            origin: origin.into(),
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Repository, origin: impl Into<String>) -> Self {
        Git2Gateway {
            repo,
            origin: origin.into(),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    fn resolve_commit(&self, reference: &str) -> std::result::Result<Commit<'_>, git2::Error> {
        self.repo.revparse_single(reference)?.peel_to_commit()
    }

    fn tracking_branch_exists(&self, name: &str) -> bool {
        self.repo
            .find_reference(&format!("refs/remotes/{}/{}", self.origin, name))
            .is_ok()
    }
}

/// Map a git2 failure onto the git command it stands in for
fn command_error(command: String) -> impl FnOnce(git2::Error) -> GitflowError {
    move |e| GitflowError::git_command(command, e.raw_code(), e.message())
}

/// Remote callbacks authenticating through SSH keys in ~/.ssh, the SSH agent
/// or the default credential helper.
pub(crate) fn credential_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }

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
        }

        git2::Cred::default()
    });
    callbacks
}

/// Push a local branch (or tag) to `remote_name`
pub(crate) fn push_reference(repo: &Repository, remote_name: &str, reference: &str) -> Result<()> {
    let command = format!("git push {} {}", remote_name, reference);

    let full_ref = if repo
        .find_reference(&format!("refs/heads/{}", reference))
        .is_ok()
    {
        format!("refs/heads/{}", reference)
    } else if repo
        .find_reference(&format!("refs/tags/{}", reference))
        .is_ok()
    {
        format!("refs/tags/{}", reference)
    } else {
        return Err(GitflowError::git_command(
            command,
            1,
            format!("src refspec {} does not match any", reference),
        ));
    };

    let mut remote = repo
        .find_remote(remote_name)
        .map_err(command_error(command.clone()))?;

    let mut callbacks = credential_callbacks();
    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "remote rejected {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    let mut push_options = git2::PushOptions::new();
    push_options.remote_callbacks(callbacks);

    let refspec = format!("{0}:{0}", full_ref);
    debug!(remote = remote_name, refspec = %refspec, "pushing");
    remote
        .push(&[refspec.as_str()], Some(&mut push_options))
        .map_err(command_error(command))?;

    Ok(())
}

impl super::GitGateway for Git2Gateway {
    #[instrument(skip(self))]
    fn checkout(&self, reference: &str) -> Result<()> {
        let command = format!("git checkout {}", reference);

        if let Ok(branch) = self.repo.find_branch(reference, BranchType::Local) {
            let refname = format!("refs/heads/{}", reference);
            let commit = branch
                .get()
                .peel_to_commit()
                .map_err(command_error(command.clone()))?;
            self.repo
                .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))
                .map_err(command_error(command.clone()))?;
            self.repo
                .set_head(&refname)
                .map_err(command_error(command))?;
            debug!(branch = reference, "checked out branch");
            return Ok(());
        }

        let commit = self
            .resolve_commit(reference)
            .map_err(command_error(command.clone()))?;
        self.repo
            .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))
            .map_err(command_error(command.clone()))?;
        self.repo
            .set_head_detached(commit.id())
            .map_err(command_error(command))?;
        debug!(reference, commit = %commit.id(), "detached HEAD");
        Ok(())
    }

    fn current_branch(&self) -> Result<String> {
        let head = self
            .repo
            .head()
            .map_err(command_error("git rev-parse --abbrev-ref HEAD".to_string()))?;

        if head.is_branch() {
            Ok(head.shorthand().unwrap_or("HEAD").to_string())
        } else {
            Ok("HEAD".to_string())
        }
    }

    #[instrument(skip(self))]
    fn local_tags_on_branch(&self, branch: &str) -> Result<Vec<String>> {
        let command = format!("git tag --merged {}", branch);
        let branch_oid = self
            .repo
            .find_branch(branch, BranchType::Local)
            .and_then(|b| b.into_reference().peel_to_commit())
            .map_err(command_error(command.clone()))?
            .id();

        // Both lightweight and annotated tags peel to the commit they mark
        let mut tag_commits: HashMap<Oid, Vec<String>> = HashMap::new();
        let names = self
            .repo
            .tag_names(None)
            .map_err(command_error(command.clone()))?;
        for name in names.iter().flatten() {
            let commit = self
                .repo
                .find_reference(&format!("refs/tags/{}", name))
                .and_then(|r| r.peel_to_commit());
            if let Ok(commit) = commit {
                tag_commits
                    .entry(commit.id())
                    .or_default()
                    .push(name.to_string());
            }
        }

        let mut revwalk = self.repo.revwalk().map_err(command_error(command.clone()))?;
        revwalk
            .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
            .map_err(command_error(command.clone()))?;
        revwalk
            .push(branch_oid)
            .map_err(command_error(command.clone()))?;

        let mut tags = Vec::new();
        for oid in revwalk {
            let oid = oid.map_err(command_error(command.clone()))?;
            if let Some(names) = tag_commits.get_mut(&oid) {
                names.sort();
                tags.append(names);
            }
        }

        debug!(count = tags.len(), "tags reachable from branch");
        Ok(tags)
    }

    #[instrument(skip(self))]
    fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        let mut remote = match self.repo.find_remote(&self.origin) {
            Ok(remote) => remote,
            Err(_) => return Ok(false),
        };

        let wanted = format!("refs/heads/{}", name);
        let listed = remote
            .connect_auth(Direction::Fetch, Some(credential_callbacks()), None)
            .and_then(|connection| {
                Ok(connection
                    .list()?
                    .iter()
                    .any(|head| head.name() == wanted))
            });

        match listed {
            Ok(found) => Ok(found),
            Err(e) => {
                warn!(
                    remote = %self.origin,
                    error = %e,
                    "cannot list remote heads, using remote-tracking refs"
                );
                Ok(self.tracking_branch_exists(name))
            }
        }
    }

    #[instrument(skip(self))]
    fn create_branch(&self, name: &str, from_ref: &str) -> Result<()> {
        let command = format!("git checkout -b {} {}", name, from_ref);

        if self.repo.find_branch(name, BranchType::Local).is_ok() {
            return Err(GitflowError::git_command(
                command,
                128,
                format!("fatal: a branch named '{}' already exists", name),
            ));
        }

        let commit = self
            .resolve_commit(from_ref)
            .map_err(command_error(command.clone()))?;
        self.repo
            .branch(name, &commit, false)
            .map_err(command_error(command.clone()))?;
        self.repo
            .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))
            .map_err(command_error(command.clone()))?;
        self.repo
            .set_head(&format!("refs/heads/{}", name))
            .map_err(command_error(command))?;

        debug!(branch = name, commit = %commit.id(), "created branch");
        Ok(())
    }

    #[instrument(skip(self))]
    fn push(&self, remote: &str, reference: &str) -> Result<()> {
        push_reference(&self.repo, remote, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitGateway;
    use std::fs;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> Oid {
        let workdir = repo.workdir().unwrap().to_path_buf();
        fs::write(workdir.join(name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Test User", "test@example.com").unwrap();

        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn setup_repo() -> (TempDir, Git2Gateway) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        repo.set_head("refs/heads/master").unwrap();

        let first = commit_file(&repo, "README.md", "one\n", "initial");
        repo.tag_lightweight("v1.0.0", &repo.find_object(first, None).unwrap(), false)
            .unwrap();
        let second = commit_file(&repo, "README.md", "two\n", "second");
        repo.tag_lightweight("v1.1.0", &repo.find_object(second, None).unwrap(), false)
            .unwrap();
        commit_file(&repo, "README.md", "three\n", "third");

        let gateway = Git2Gateway::from_git2(repo, "origin");
        (dir, gateway)
    }

    #[test]
    fn test_current_branch() {
        let (_dir, git) = setup_repo();
        assert_eq!(git.current_branch().unwrap(), "master");
    }

    #[test]
    fn test_local_tags_newest_first() {
        let (_dir, git) = setup_repo();
        let tags = git.local_tags_on_branch("master").unwrap();
        assert_eq!(tags, vec!["v1.1.0".to_string(), "v1.0.0".to_string()]);
    }

    #[test]
    fn test_create_branch_checks_it_out() {
        let (_dir, git) = setup_repo();
        git.create_branch("support/1.0.1", "v1.0.0").unwrap();
        assert_eq!(git.current_branch().unwrap(), "support/1.0.1");
    }

    #[test]
    fn test_create_existing_branch_fails() {
        let (_dir, git) = setup_repo();
        let err = git.create_branch("master", "v1.0.0").unwrap_err();
        assert!(matches!(err, GitflowError::GitCommand { exit_code: 128, .. }));
    }

    #[test]
    fn test_checkout_tag_detaches() {
        let (_dir, git) = setup_repo();
        git.checkout("v1.0.0").unwrap();
        assert_eq!(git.current_branch().unwrap(), "HEAD");
        git.checkout("master").unwrap();
        assert_eq!(git.current_branch().unwrap(), "master");
    }

    #[test]
    fn test_remote_branch_without_remote() {
        let (_dir, git) = setup_repo();
        assert!(!git.remote_branch_exists("master").unwrap());
    }

    #[test]
    fn test_push_unknown_remote_fails() {
        let (_dir, git) = setup_repo();
        let err = git.push("nowhere", "master").unwrap_err();
        assert!(matches!(err, GitflowError::GitCommand { .. }));
    }
}
