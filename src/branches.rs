use crate::{
    commit::Commit,
    commit_id::CommitId,
    error::{Error, Result},
    repository::Repository,
};

impl Repository {
    /// Name of the branch HEAD selects.
    pub fn current_branch(&self) -> Result<String> {
        self.read_head()
    }

    /// Creates `name` pointing wherever the current branch points, which may
    /// be nowhere yet. HEAD does not move.
    pub fn create_branch(&self, name: &str) -> Result<Option<CommitId>> {
        if self.branch_exists(name)? {
            return Err(Error::AlreadyExists(name.to_owned()));
        }
        let current = self.read_head()?;
        let tip = self.read_branch(&current)?;
        log::info!("creating branch {} from {} at {:?}", name, current, tip);
        self.write_branch(name, tip.as_ref())?;
        Ok(tip)
    }

    /// Writes every file of `name`'s tip into the working tree and makes
    /// `name` the current branch.
    ///
    /// Files are overwritten whether or not they hold uncommitted changes,
    /// and files the tip does not know about are left alone.
    pub fn checkout(&self, name: &str) -> Result<Commit> {
        let tip = self
            .read_branch(name)?
            .ok_or_else(|| Error::EmptyBranch(name.to_owned()))?;
        let commit = self.read_commit(&tip)?;
        for (path, content) in &commit.files {
            log::debug!("checking out {}", path);
            self.work_tree().write(path, content)?;
        }
        self.write_head(name)?;
        log::info!("checked out {} at {}", name, tip);
        Ok(commit)
    }

    /// Moves `name` forward to `commit`.
    pub(crate) fn advance(&self, name: &str, commit: &CommitId) -> Result<()> {
        self.write_branch(name, Some(commit))
    }
}

#[test]
fn test_create_branch() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();

    // branching before the first commit gives an empty pointer
    assert_eq!(repo.create_branch("early").unwrap(), None);
    assert_eq!(repo.read_branch("early").unwrap(), None);

    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();
    repo.stage("a.txt").unwrap();
    let first = repo.commit("first").unwrap().commit;

    assert_eq!(repo.create_branch("feature").unwrap().as_ref(), Some(first.id()));
    assert_eq!(repo.read_branch("feature").unwrap().as_ref(), Some(first.id()));
    assert_eq!(repo.current_branch().unwrap(), "main");
    assert_eq!(repo.list_branches().unwrap(), ["early", "feature", "main"]);

    assert!(matches!(
        repo.create_branch("feature"),
        Err(Error::AlreadyExists(name)) if name == "feature"
    ));
    assert!(matches!(
        repo.create_branch("main"),
        Err(Error::AlreadyExists(_))
    ));
}

#[test]
fn test_checkout() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();
    std::fs::create_dir(tempdir.path().join("docs")).unwrap();
    std::fs::write(tempdir.path().join("docs/b.txt"), "notes").unwrap();
    repo.stage("a.txt").unwrap();
    repo.stage("docs/b.txt").unwrap();
    let first = repo.commit("first").unwrap().commit;
    repo.create_branch("feature").unwrap();

    // local edits and deletions are clobbered
    std::fs::write(tempdir.path().join("a.txt"), "scribbles").unwrap();
    std::fs::remove_dir_all(tempdir.path().join("docs")).unwrap();
    std::fs::write(tempdir.path().join("untracked.txt"), "mine").unwrap();

    let checked_out = repo.checkout("feature").unwrap();
    assert_eq!(checked_out.id(), first.id());
    for (path, content) in &first.files {
        assert_eq!(
            &std::fs::read_to_string(tempdir.path().join(path)).unwrap(),
            content
        );
    }
    assert_eq!(
        std::fs::read_to_string(tempdir.path().join("untracked.txt")).unwrap(),
        "mine"
    );
    assert_eq!(repo.current_branch().unwrap(), "feature");
    // no pointer moved
    assert_eq!(repo.read_branch("main").unwrap().as_ref(), Some(first.id()));
}

#[test]
fn test_checkout_failures() {
    let tempdir = tempfile::tempdir().unwrap();
    let (repo, _) = Repository::init(tempdir.path().into()).unwrap();
    repo.create_branch("feature").unwrap();

    assert!(matches!(
        repo.checkout("nope"),
        Err(Error::BranchNotFound(name)) if name == "nope"
    ));
    assert!(matches!(
        repo.checkout("feature"),
        Err(Error::EmptyBranch(name)) if name == "feature"
    ));
    assert_eq!(repo.current_branch().unwrap(), "main");
}
