use std::{fs::read_to_string, io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    fsutil,
    repository::Repository,
};

/// Paths waiting to be captured by the next commit, in the order they
/// were added and without duplicates.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagingArea {
    paths: Vec<String>,
}

impl StagingArea {
    /// Adds `path`, returning `false` if it was already staged.
    pub fn insert(&mut self, path: &str) -> bool {
        if self.contains(path) {
            return false;
        }
        self.paths.push(path.to_owned());
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|staged| staged == path)
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Outcome of [`Repository::stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staged {
    Added,
    AlreadyStaged,
}

impl Repository {
    /// The currently staged paths. A missing or blank staging file means
    /// nothing is staged.
    pub fn staged(&self) -> Result<StagingArea> {
        match read_to_string(self.staging_path()) {
            Ok(content) if content.trim().is_empty() => Ok(StagingArea::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StagingArea::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Stages a working tree file for the next commit.
    pub fn stage(&self, path: &str) -> Result<Staged> {
        if !self.work_tree().contains(path)? {
            return Err(Error::FileNotFound(PathBuf::from(path)));
        }
        let mut staging = self.staged()?;
        if !staging.insert(path) {
            log::debug!("{} is already staged", path);
            return Ok(Staged::AlreadyStaged);
        }
        log::info!("staging {}", path);
        self.write_staging(&staging)?;
        Ok(Staged::Added)
    }

    pub fn clear_staging(&self) -> Result<()> {
        log::info!("clearing staging area");
        self.write_staging(&StagingArea::default())
    }

    fn write_staging(&self, staging: &StagingArea) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(staging)?;
        fsutil::replace(&self.staging_path(), &bytes)?;
        Ok(())
    }
}

#[test]
fn test_stage_dedup() {
    let tempdir = tempfile::tempdir().unwrap();
    let (repo, _) = Repository::init(tempdir.path().into()).unwrap();
    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();

    assert!(repo.staged().unwrap().is_empty());
    assert_eq!(repo.stage("a.txt").unwrap(), Staged::Added);
    assert_eq!(repo.stage("a.txt").unwrap(), Staged::AlreadyStaged);
    let staged = repo.staged().unwrap();
    assert_eq!(staged.len(), 1);
    assert_eq!(staged.paths(), ["a.txt"]);
}

#[test]
fn test_stage_preserves_order_and_persists() {
    let tempdir = tempfile::tempdir().unwrap();
    Repository::init(tempdir.path().into()).unwrap();
    for name in ["b.txt", "a.txt", "c.txt"] {
        std::fs::write(tempdir.path().join(name), name).unwrap();
        Repository::open(tempdir.path().into())
            .unwrap()
            .stage(name)
            .unwrap();
    }
    let repo = Repository::open(tempdir.path().into()).unwrap();
    assert_eq!(repo.staged().unwrap().paths(), ["b.txt", "a.txt", "c.txt"]);

    let on_disk: Vec<String> =
        serde_json::from_str(&read_to_string(repo.staging_path()).unwrap()).unwrap();
    assert_eq!(on_disk, ["b.txt", "a.txt", "c.txt"]);
}

#[test]
fn test_stage_missing_file() {
    let tempdir = tempfile::tempdir().unwrap();
    let (repo, _) = Repository::init(tempdir.path().into()).unwrap();
    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();
    repo.stage("a.txt").unwrap();

    assert!(matches!(
        repo.stage("missing.txt"),
        Err(Error::FileNotFound(path)) if path == PathBuf::from("missing.txt")
    ));
    assert_eq!(repo.staged().unwrap().paths(), ["a.txt"]);
}

#[test]
fn test_clear_staging() {
    let tempdir = tempfile::tempdir().unwrap();
    let (repo, _) = Repository::init(tempdir.path().into()).unwrap();
    std::fs::write(tempdir.path().join("a.txt"), "hi").unwrap();
    repo.stage("a.txt").unwrap();
    repo.clear_staging().unwrap();
    assert!(repo.staged().unwrap().is_empty());
}
