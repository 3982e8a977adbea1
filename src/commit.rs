use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commit_id::CommitId;

/// Full text content of every file captured by a commit, keyed by path.
pub type Files = BTreeMap<String, String>;

/// The parent link of a commit.
///
/// Serialized as a bare id for an ordinary commit and as a two element
/// array for a merge.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parent {
    Single(CommitId),
    /// The branch merged into comes first, the merged branch second.
    Merge([CommitId; 2]),
}

impl Parent {
    /// The parent on the side of the branch the commit was made on.
    pub fn first(&self) -> &CommitId {
        match self {
            Parent::Single(id) => id,
            Parent::Merge([into, _]) => into,
        }
    }
}

/// An immutable snapshot of the staged files.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub commit_id: CommitId,
    /// The message added with the commit.
    pub message: String,
    /// Seconds since the epoch, also fed into the [`CommitId`].
    pub timestamp: f64,
    pub files: Files,
    /// `None` for a root commit.
    pub parent: Option<Parent>,
}

impl Commit {
    /// Builds a commit, deriving its id from `message` and `timestamp`.
    pub fn new(message: String, timestamp: f64, files: Files, parent: Option<Parent>) -> Self {
        Commit {
            commit_id: CommitId::fingerprint(&message, timestamp),
            message,
            timestamp,
            files,
            parent,
        }
    }

    pub fn id(&self) -> &CommitId {
        &self.commit_id
    }

    pub fn first_parent(&self) -> Option<&CommitId> {
        self.parent.as_ref().map(Parent::first)
    }

    pub fn is_merge(&self) -> bool {
        matches!(self.parent, Some(Parent::Merge(_)))
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.floor();
        let nanos = ((self.timestamp - secs) * 1e9) as u32;
        DateTime::<Utc>::from_timestamp(secs as i64, nanos)
    }
}

#[test]
fn test_commit_json_layout() {
    let root = Commit::new(
        String::from("first"),
        1_700_000_000.5,
        Files::from([(String::from("a.txt"), String::from("hi"))]),
        None,
    );
    let json: serde_json::Value = serde_json::to_value(&root).unwrap();
    assert_eq!(json["commit_id"], root.id().as_str());
    assert_eq!(json["message"], "first");
    assert_eq!(json["timestamp"], 1_700_000_000.5);
    assert_eq!(json["files"]["a.txt"], "hi");
    assert!(json["parent"].is_null());

    let child = Commit::new(
        String::from("second"),
        1_700_000_001.0,
        Files::new(),
        Some(Parent::Single(root.id().clone())),
    );
    let json = serde_json::to_value(&child).unwrap();
    assert_eq!(json["parent"], root.id().as_str());

    let merge = Commit::new(
        String::from("merge"),
        1_700_000_002.0,
        Files::new(),
        Some(Parent::Merge([child.id().clone(), root.id().clone()])),
    );
    let json = serde_json::to_value(&merge).unwrap();
    assert_eq!(
        json["parent"],
        serde_json::json!([child.id().as_str(), root.id().as_str()])
    );
    let back: Commit = serde_json::from_value(json).unwrap();
    assert_eq!(back, merge);
    assert!(back.is_merge());
    assert_eq!(back.first_parent(), Some(child.id()));
}

#[test]
fn test_date() {
    let commit = Commit::new(String::from("m"), 86_400.0, Files::new(), None);
    assert_eq!(
        commit.date().unwrap().format("%Y-%m-%d").to_string(),
        "1970-01-02"
    );
}
