use std::{
    fs::{create_dir_all, read_dir, read_to_string},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    commit::Commit,
    commit_id::CommitId,
    commit_store::{directory::DirectoryCommitStore, CommitStore},
    error::{Error, Result},
    fsutil,
    worktree::WorkTree,
};

/// Name of the repository directory inside the working tree.
pub const REPO_DIR: &str = ".vcs";

/// The branch `init` creates and points HEAD at.
pub const DEFAULT_BRANCH: &str = "main";

/// A handle on the `.vcs` directory of a working tree, which has a number of
/// utilities defined on it.
///
/// Every repository operation goes through a handle, so several repositories
/// can be open in one process. Obtaining one through [`Repository::init`] or
/// [`Repository::open`] is what guarantees the repository exists.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    work_tree: WorkTree,
    commits: DirectoryCommitStore,
}

/// Whether [`Repository::init`] created the repository or found one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialized {
    Fresh,
    Existing,
}

impl Repository {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn work_tree(&self) -> &WorkTree {
        &self.work_tree
    }

    pub fn commits(&self) -> &DirectoryCommitStore {
        &self.commits
    }

    /// Creates the repository in `work_tree` if it is not there yet.
    ///
    /// Re-running on an existing repository only recreates missing
    /// directories; HEAD and the branches are left untouched.
    pub fn init(work_tree: PathBuf) -> Result<(Self, Initialized)> {
        let root = work_tree.join(REPO_DIR);
        let initialized = if root.try_exists()? {
            Initialized::Existing
        } else {
            Initialized::Fresh
        };

        create_dir_all(root.join("branches"))?;
        let commits = DirectoryCommitStore::new(root.join("commits"))?;
        let repo = Repository {
            root,
            work_tree: WorkTree::new(work_tree),
            commits,
        };

        // HEAD is written last, so its absence means initialization never finished
        if !repo.head_path().try_exists()? {
            log::info!("initializing repository in {:?}", repo.root);
            if !repo.branch_exists(DEFAULT_BRANCH)? {
                repo.write_branch(DEFAULT_BRANCH, None)?;
            }
            repo.write_head(DEFAULT_BRANCH)?;
        } else {
            log::info!("repository already initialized in {:?}", repo.root);
        }
        Ok((repo, initialized))
    }

    pub fn open(work_tree: PathBuf) -> Result<Self> {
        let root = work_tree.join(REPO_DIR);
        if !root.is_dir() {
            return Err(Error::RepositoryNotInitialized);
        }
        let commits = DirectoryCommitStore::new(root.join("commits"))?;
        Ok(Repository {
            root,
            work_tree: WorkTree::new(work_tree),
            commits,
        })
    }

    pub fn read_commit(&self, id: &CommitId) -> Result<Commit> {
        self.commits
            .read(id)?
            .ok_or_else(|| Error::CommitNotFound(id.clone()))
    }

    pub fn write_commit(&mut self, commit: &Commit) -> Result<()> {
        self.commits.insert(commit)
    }

    /// The commit `name` points at, `None` if it has no commits yet.
    pub fn read_branch(&self, name: &str) -> Result<Option<CommitId>> {
        let path = self.branch_path(name)?;
        let content = match read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::BranchNotFound(name.to_owned()))
            }
            Err(err) => return Err(err.into()),
        };
        log::debug!("branch {} points at {:?}", name, content);
        match content.trim() {
            "" => Ok(None),
            id => Ok(Some(id.parse()?)),
        }
    }

    pub fn write_branch(&self, name: &str, commit: Option<&CommitId>) -> Result<()> {
        log::info!("pointing branch {} at {:?}", name, commit);
        let content = commit.map(CommitId::as_str).unwrap_or_default();
        fsutil::replace(&self.branch_path(name)?, content.as_bytes())?;
        Ok(())
    }

    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.branch_path(name)?.try_exists()?)
    }

    /// All branch names in lexicographic order.
    pub fn list_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in read_dir(self.root.join("branches"))? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                // skips in-flight temporary files
                if valid_branch_name(name) && entry.file_type()?.is_file() {
                    names.push(name.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Name of the active branch.
    pub fn read_head(&self) -> Result<String> {
        match read_to_string(self.head_path()) {
            Ok(head) => Ok(head.trim().to_owned()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(Error::RepositoryNotInitialized)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn write_head(&self, name: &str) -> Result<()> {
        log::info!("setting HEAD to {}", name);
        fsutil::replace(&self.head_path(), name.as_bytes())?;
        Ok(())
    }

    pub(crate) fn staging_path(&self) -> PathBuf {
        self.root.join("staging_area.json")
    }

    fn head_path(&self) -> PathBuf {
        self.root.join("HEAD")
    }

    fn branch_path(&self, name: &str) -> Result<PathBuf> {
        if !valid_branch_name(name) {
            return Err(Error::InvalidBranchName(name.to_owned()));
        }
        Ok(self.root.join("branches").join(name))
    }
}

/// Branch names become file names, so they may not be empty, start with a dot,
/// or contain path separators or whitespace.
pub fn valid_branch_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace())
}

#[test]
fn test_init_layout() {
    let tempdir = tempfile::tempdir().unwrap();
    let (repo, initialized) = Repository::init(tempdir.path().into()).unwrap();
    assert_eq!(initialized, Initialized::Fresh);

    let root = tempdir.path().join(REPO_DIR);
    assert!(root.join("commits").is_dir());
    assert!(root.join("branches").is_dir());
    assert_eq!(read_to_string(root.join("HEAD")).unwrap(), "main");
    assert_eq!(read_to_string(root.join("branches/main")).unwrap(), "");
    assert_eq!(repo.read_head().unwrap(), DEFAULT_BRANCH);
    assert_eq!(repo.read_branch(DEFAULT_BRANCH).unwrap(), None);
    assert_eq!(repo.list_branches().unwrap(), vec![String::from("main")]);
}

#[test]
fn test_init_is_idempotent() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    let commit = Commit::new(
        String::from("first"),
        1.5,
        crate::commit::Files::new(),
        None,
    );
    repo.write_commit(&commit).unwrap();
    repo.write_branch(DEFAULT_BRANCH, Some(commit.id())).unwrap();
    repo.write_branch("feature", Some(commit.id())).unwrap();
    repo.write_head("feature").unwrap();

    let (again, initialized) = Repository::init(tempdir.path().into()).unwrap();
    assert_eq!(initialized, Initialized::Existing);
    assert_eq!(again.read_head().unwrap(), "feature");
    assert_eq!(
        again.read_branch(DEFAULT_BRANCH).unwrap().as_ref(),
        Some(commit.id())
    );
    assert_eq!(again.list_branches().unwrap(), vec!["feature", "main"]);
    assert_eq!(again.read_commit(commit.id()).unwrap(), commit);
}

#[test]
fn test_open_requires_init() {
    let tempdir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Repository::open(tempdir.path().into()),
        Err(Error::RepositoryNotInitialized)
    ));
    Repository::init(tempdir.path().into()).unwrap();
    let repo = Repository::open(tempdir.path().into()).unwrap();
    assert_eq!(repo.read_head().unwrap(), DEFAULT_BRANCH);
}

#[test]
fn test_missing_records() {
    let tempdir = tempfile::tempdir().unwrap();
    let (repo, _) = Repository::init(tempdir.path().into()).unwrap();
    let id = CommitId::fingerprint("ghost", 0.0);
    assert!(matches!(
        repo.read_commit(&id),
        Err(Error::CommitNotFound(missing)) if missing == id
    ));
    assert!(matches!(
        repo.read_branch("nope"),
        Err(Error::BranchNotFound(name)) if name == "nope"
    ));
    assert!(!repo.branch_exists("nope").unwrap());
    assert!(matches!(
        repo.read_branch("../HEAD"),
        Err(Error::InvalidBranchName(_))
    ));
}
