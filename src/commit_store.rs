use crate::{commit::Commit, commit_id::CommitId, error::Error};

pub mod directory;
pub mod in_memory;

/// Append-only storage of [`Commit`]s keyed by their [`CommitId`].
pub trait CommitStore {
    fn read(&self, id: &CommitId) -> Result<Option<Commit>, Error>;

    /// Stores a new commit. Fails with [`Error::WriteConflict`] instead of
    /// overwriting when the id is already taken.
    fn insert(&mut self, commit: &Commit) -> Result<(), Error>;
}
