use std::{
    fs::{create_dir_all, File},
    io::ErrorKind,
    path::PathBuf,
};

use crate::{commit::Commit, commit_id::CommitId, error::Error, fsutil};

use super::CommitStore;

/// A persistent [`CommitStore`] stored in a directory,
/// with one pretty-printed JSON file named `<id>.json` per commit.
#[derive(Debug, Clone)]
pub struct DirectoryCommitStore {
    root: PathBuf,
}

impl DirectoryCommitStore {
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        if !root.try_exists()? {
            log::info!("creating commit store root: {:?}", root);
            create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    fn path(&self, id: &CommitId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }
}

impl CommitStore for DirectoryCommitStore {
    fn read(&self, id: &CommitId) -> Result<Option<Commit>, Error> {
        log::debug!("reading {} from {:?}", id, self.root);
        match File::options().read(true).open(self.path(id)) {
            Ok(f) => Ok(Some(serde_json::from_reader(f)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn insert(&mut self, commit: &Commit) -> Result<(), Error> {
        let id = commit.id();
        log::info!("inserting {} into {:?}", id, self.root);
        let bytes = serde_json::to_vec_pretty(commit)?;
        match fsutil::create_new(&self.path(id), &bytes) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                log::warn!("{} already exists in {:?}", id, self.root);
                Err(Error::WriteConflict(id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[test]
fn test_directory_commit_store() {
    use crate::commit::Files;

    let tempdir = tempfile::tempdir().unwrap();
    let mut store = DirectoryCommitStore::new(tempdir.path().join("commits")).unwrap();
    let commit = Commit::new(
        String::from("first"),
        1_700_000_000.125,
        Files::from([(String::from("a.txt"), String::from("hi"))]),
        None,
    );
    assert_eq!(store.read(commit.id()).unwrap(), None);

    store.insert(&commit).unwrap();
    assert!(tempdir
        .path()
        .join("commits")
        .join(format!("{}.json", commit.id()))
        .is_file());
    assert_eq!(store.read(commit.id()).unwrap(), Some(commit.clone()));
}

#[test]
fn test_directory_commit_store_conflict() {
    use crate::commit::Files;

    let tempdir = tempfile::tempdir().unwrap();
    let mut store = DirectoryCommitStore::new(tempdir.path().into()).unwrap();
    let original = Commit::new(String::from("same"), 42.0, Files::new(), None);
    store.insert(&original).unwrap();

    let mut clash = original.clone();
    clash
        .files
        .insert(String::from("b.txt"), String::from("other"));
    assert!(matches!(
        store.insert(&clash),
        Err(Error::WriteConflict(id)) if &id == original.id()
    ));
    assert_eq!(store.read(original.id()).unwrap(), Some(original));
}
