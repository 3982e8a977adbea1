//! # Mini VCS
//!
//! A minimal local version control engine. Snapshots of staged files are
//! recorded as commits on named branches inside a `.vcs` directory, and two
//! branches can be merged with a fixed precedence rule.
//!
//! Nothing guards against two processes touching the same repository at
//! once, and a crash between the steps of a commit or merge can leave a
//! stored commit that no branch points at.

mod hex;

/// Branch pointer management and checkout.
pub mod branches;
/// Immutable commit records.
pub mod commit;
/// Short fingerprint identifying a [`commit::Commit`].
pub mod commit_id;
/// Append-only commit storage API.
pub mod commit_store;
pub mod error;
pub mod fsutil;
/// Commit creation and history traversal.
pub mod graph;
/// Combining two branches into a merge commit.
pub mod merge;
/// The on-disk repository handle.
pub mod repository;
/// The set of paths waiting for the next commit.
pub mod staging;
pub mod worktree;

pub use error::{Error, Result};
pub use repository::{Initialized, Repository};
