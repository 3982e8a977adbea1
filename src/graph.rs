use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    commit::{Commit, Files, Parent},
    commit_id::CommitId,
    commit_store::{directory::DirectoryCommitStore, CommitStore},
    error::{Error, Result},
    repository::Repository,
    worktree::WorkTree,
};

/// A freshly created commit along with the staged paths that had vanished
/// from the working tree and so were left out of it.
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub commit: Commit,
    pub skipped: Vec<String>,
}

/// Wall-clock seconds since the epoch.
pub fn now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

/// Snapshots the full content of every staged path into a new commit.
///
/// Staged paths that no longer exist are skipped with a warning. Nothing is
/// persisted and no branch moves.
pub fn create_commit(
    work_tree: &WorkTree,
    message: &str,
    timestamp: f64,
    staged: &[String],
    parent: Option<CommitId>,
) -> Result<CommitReport> {
    if staged.is_empty() {
        return Err(Error::NothingToCommit);
    }
    let mut files = Files::new();
    let mut skipped = Vec::new();
    for path in staged {
        match work_tree.read(path)? {
            Some(content) => {
                files.insert(path.clone(), content);
            }
            None => {
                log::warn!("staged file {} no longer exists, skipping it", path);
                skipped.push(path.clone());
            }
        }
    }
    let commit = Commit::new(
        message.to_owned(),
        timestamp,
        files,
        parent.map(Parent::Single),
    );
    Ok(CommitReport { commit, skipped })
}

/// Walks a commit's ancestry backwards, following only the first parent of
/// merge commits.
///
/// Ends at a root commit, or early at a commit missing from the store.
pub struct History<'a, S> {
    store: &'a S,
    next: Option<CommitId>,
}

impl<'a, S: CommitStore> History<'a, S> {
    pub fn new(store: &'a S, start: Option<CommitId>) -> Self {
        Self { store, next: start }
    }
}

impl<'a, S: CommitStore> Iterator for History<'a, S> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.store.read(&id) {
            Ok(Some(commit)) => {
                self.next = commit.first_parent().cloned();
                Some(Ok(commit))
            }
            Ok(None) => {
                log::warn!("history truncated at missing commit {}", id);
                None
            }
            Err(err) => Some(Err(err)),
        }
    }
}

impl Repository {
    /// Commits the staged files onto the HEAD branch and clears the staging
    /// area.
    pub fn commit(&mut self, message: &str) -> Result<CommitReport> {
        self.commit_at(message, now())
    }

    /// [`Repository::commit`] with an explicit timestamp.
    pub fn commit_at(&mut self, message: &str, timestamp: f64) -> Result<CommitReport> {
        let staging = self.staged()?;
        let branch = self.read_head()?;
        let parent = self.read_branch(&branch)?;
        let report = create_commit(
            self.work_tree(),
            message,
            timestamp,
            staging.paths(),
            parent,
        )?;

        // object first, then the pointer, then the staging area
        self.write_commit(&report.commit)?;
        self.advance(&branch, report.commit.id())?;
        self.clear_staging()?;
        log::info!("committed {} on {}", report.commit.id(), branch);
        Ok(report)
    }

    /// History of the HEAD branch, newest first.
    pub fn history(&self) -> Result<History<'_, DirectoryCommitStore>> {
        let branch = self.read_head()?;
        Ok(self.history_from(self.read_branch(&branch)?))
    }

    pub fn history_from(&self, start: Option<CommitId>) -> History<'_, DirectoryCommitStore> {
        History::new(self.commits(), start)
    }
}

#[cfg(test)]
fn ids(history: impl Iterator<Item = Result<Commit>>) -> Vec<CommitId> {
    history.map(|commit| commit.unwrap().commit_id).collect()
}

#[test]
fn test_history_follows_first_parent() {
    use crate::commit_store::in_memory::InMemoryCommitStore;

    let mut store = InMemoryCommitStore::new();
    let root = Commit::new(String::from("root"), 1.0, Files::new(), None);
    let main = Commit::new(
        String::from("main work"),
        2.0,
        Files::new(),
        Some(Parent::Single(root.id().clone())),
    );
    let side = Commit::new(
        String::from("side work"),
        3.0,
        Files::new(),
        Some(Parent::Single(root.id().clone())),
    );
    let merge = Commit::new(
        String::from("merge"),
        4.0,
        Files::new(),
        Some(Parent::Merge([main.id().clone(), side.id().clone()])),
    );
    for commit in [&root, &main, &side, &merge] {
        store.insert(commit).unwrap();
    }

    let walked = ids(History::new(&store, Some(merge.id().clone())));
    assert_eq!(
        walked,
        vec![
            merge.id().clone(),
            main.id().clone(),
            root.id().clone()
        ]
    );
    // commits are immutable, so walking again gives the same sequence
    assert_eq!(walked, ids(History::new(&store, Some(merge.id().clone()))));
    assert_eq!(History::new(&store, None).count(), 0);
}

#[test]
fn test_history_truncates_at_missing_commit() {
    use crate::commit_store::in_memory::InMemoryCommitStore;

    let mut store = InMemoryCommitStore::new();
    let orphan_parent = CommitId::fingerprint("never stored", 0.5);
    let tip = Commit::new(
        String::from("tip"),
        1.0,
        Files::new(),
        Some(Parent::Single(orphan_parent)),
    );
    store.insert(&tip).unwrap();
    assert_eq!(
        ids(History::new(&store, Some(tip.id().clone()))),
        vec![tip.id().clone()]
    );
}

#[test]
fn test_first_commit_scenario() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();
    repo.stage("a.txt").unwrap();

    let report = repo.commit("first").unwrap();
    assert!(report.skipped.is_empty());

    let tip = repo.read_branch("main").unwrap().unwrap();
    assert_eq!(&tip, report.commit.id());
    let stored = repo.read_commit(&tip).unwrap();
    assert_eq!(
        stored.files,
        Files::from([(String::from("a.txt"), String::from("hi"))])
    );
    assert_eq!(stored.parent, None);
    assert_eq!(stored.message, "first");
    assert!(repo.staged().unwrap().is_empty());
}

#[test]
fn test_commit_chains_and_clears_staging() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        std::fs::write(tempdir.path().join(name), name).unwrap();
        repo.stage(name).unwrap();
    }
    let first = repo.commit("first").unwrap().commit;
    assert_eq!(first.files.len(), 3);
    assert!(repo.staged().unwrap().is_empty());

    std::fs::write(tempdir.path().join("a.txt"), "changed").unwrap();
    repo.stage("a.txt").unwrap();
    let second = repo.commit("second").unwrap().commit;
    assert_eq!(second.parent, Some(Parent::Single(first.id().clone())));
    // snapshots only hold what was staged for them
    assert_eq!(
        second.files,
        Files::from([(String::from("a.txt"), String::from("changed"))])
    );

    let messages: Vec<String> = repo
        .history()
        .unwrap()
        .map(|commit| commit.unwrap().message)
        .collect();
    assert_eq!(messages, ["second", "first"]);

    // re-reading never changes what was written
    let again = repo.read_commit(first.id()).unwrap();
    assert_eq!(again.message, first.message);
    assert_eq!(again.files, first.files);
    assert_eq!(again.parent, first.parent);
}

#[test]
fn test_commit_skips_vanished_files() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();
    std::fs::write(tempdir.path().join("gone.txt"), "bye").unwrap();
    repo.stage("a.txt").unwrap();
    repo.stage("gone.txt").unwrap();
    std::fs::remove_file(tempdir.path().join("gone.txt")).unwrap();

    let report = repo.commit("partial").unwrap();
    assert_eq!(report.skipped, ["gone.txt"]);
    assert_eq!(report.commit.files.keys().collect::<Vec<_>>(), ["a.txt"]);
    assert!(repo.staged().unwrap().is_empty());
}

#[test]
fn test_commit_skips_files_replaced_by_directories() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();
    std::fs::write(tempdir.path().join("b"), "file for now").unwrap();
    repo.stage("a.txt").unwrap();
    repo.stage("b").unwrap();
    std::fs::remove_file(tempdir.path().join("b")).unwrap();
    std::fs::create_dir(tempdir.path().join("b")).unwrap();

    let report = repo.commit("m").unwrap();
    assert_eq!(report.skipped, ["b"]);
    assert_eq!(report.commit.files.keys().collect::<Vec<_>>(), ["a.txt"]);
}

#[test]
fn test_commit_with_nothing_staged() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    assert!(matches!(repo.commit("x"), Err(Error::NothingToCommit)));
    assert_eq!(repo.read_branch("main").unwrap(), None);
    assert_eq!(
        std::fs::read_dir(repo.root().join("commits")).unwrap().count(),
        0
    );
}

#[test]
fn test_commit_id_collision_is_detected() {
    let tempdir = tempfile::tempdir().unwrap();
    let (mut repo, _) = Repository::init(tempdir.path().into()).unwrap();
    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();
    repo.stage("a.txt").unwrap();
    let first = repo.commit_at("same", 100.0).unwrap().commit;

    repo.stage("a.txt").unwrap();
    assert!(matches!(
        repo.commit_at("same", 100.0),
        Err(Error::WriteConflict(id)) if &id == first.id()
    ));
    // the failed commit leaves the branch and the staging area alone
    assert_eq!(repo.read_branch("main").unwrap().as_ref(), Some(first.id()));
    assert_eq!(repo.staged().unwrap().paths(), ["a.txt"]);
}
