use std::path::PathBuf;

use derive_more::{Display, From};

use crate::commit_id::CommitId;

/// Everything that can go wrong while operating on a repository.
#[derive(Debug, From, Display)]
pub enum Error {
    #[display(fmt = "repository not initialized, run `init` first")]
    RepositoryNotInitialized,
    #[display(fmt = "branch '{}' not found", _0)]
    BranchNotFound(String),
    #[display(fmt = "commit {} not found", _0)]
    CommitNotFound(CommitId),
    #[display(fmt = "file '{}' not found", "_0.display()")]
    FileNotFound(PathBuf),
    #[display(fmt = "invalid branch name {:?}", _0)]
    InvalidBranchName(String),
    #[display(fmt = "branch '{}' already exists", _0)]
    AlreadyExists(String),
    #[display(fmt = "nothing to commit, stage files with `add` first")]
    NothingToCommit,
    #[display(fmt = "branch '{}' has no commits", _0)]
    EmptyBranch(String),
    #[display(fmt = "commit {} already exists", _0)]
    WriteConflict(CommitId),
    #[display(fmt = "malformed commit id {:?}", _0)]
    MalformedCommitId(String),
    #[from]
    #[display(fmt = "I/O error: {}", _0)]
    IO(std::io::Error),
    #[from]
    #[display(fmt = "JSON error: {}", _0)]
    Serde(serde_json::Error),
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
