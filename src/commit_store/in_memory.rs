use std::collections::BTreeMap;

use crate::{commit::Commit, commit_id::CommitId, error::Error};

use super::CommitStore;

#[derive(Debug, Default)]
pub struct InMemoryCommitStore {
    commits: BTreeMap<CommitId, Commit>,
}

impl InMemoryCommitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommitStore for InMemoryCommitStore {
    fn read(&self, id: &CommitId) -> Result<Option<Commit>, Error> {
        Ok(self.commits.get(id).cloned())
    }

    fn insert(&mut self, commit: &Commit) -> Result<(), Error> {
        if self.commits.contains_key(commit.id()) {
            return Err(Error::WriteConflict(commit.id().clone()));
        }
        self.commits.insert(commit.id().clone(), commit.clone());
        Ok(())
    }
}

#[test]
fn test_in_memory_commit_store() {
    use crate::commit::Files;

    let mut store = InMemoryCommitStore::new();
    let commit = Commit::new(String::from("hello, world"), 7.0, Files::new(), None);
    store.insert(&commit).unwrap();
    assert_eq!(store.read(commit.id()).unwrap(), Some(commit.clone()));
    assert!(matches!(
        store.insert(&commit),
        Err(Error::WriteConflict(_))
    ));
}
