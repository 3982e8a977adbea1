use crate::{error::Error, hex::Hex};

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Number of hash bytes kept in a fingerprint, twelve hex characters.
const FINGERPRINT_BYTES: usize = 6;

/// An identifier for a commit.
///
/// Unlike a content address, this is a short [`blake3`] fingerprint of the
/// commit message and the wall-clock time the commit was made at, so two
/// commits with identical content get distinct ids.
///
/// It is displayed in lowercase hexadecimal format.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    pub fn fingerprint(message: &str, timestamp: f64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(message.as_bytes());
        hasher.update(&timestamp.to_bits().to_le_bytes());
        let hash = hasher.finalize();
        let short: &[u8] = &hash.as_bytes()[..FINGERPRINT_BYTES];
        CommitId(Hex::from(short).into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CommitId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if Hex::is_hex(&s) {
            Ok(CommitId(s))
        } else {
            Err(Error::MalformedCommitId(s))
        }
    }
}

impl FromStr for CommitId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommitId::try_from(s.to_owned())
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

#[test]
fn test_fingerprint_depends_on_message_and_time() {
    let a = CommitId::fingerprint("first", 1_700_000_000.25);
    assert_eq!(a, CommitId::fingerprint("first", 1_700_000_000.25));
    assert_ne!(a, CommitId::fingerprint("first", 1_700_000_000.5));
    assert_ne!(a, CommitId::fingerprint("second", 1_700_000_000.25));
    assert_eq!(a.as_str().len(), FINGERPRINT_BYTES * 2);
}

#[test]
fn test_parse() {
    let id = CommitId::fingerprint("msg", 1.0);
    assert_eq!(id.as_str().parse::<CommitId>().unwrap(), id);
    assert!(matches!(
        "not hex!".parse::<CommitId>(),
        Err(Error::MalformedCommitId(_))
    ));
}

#[test]
fn test_deserialize_rejects_malformed() {
    let id: CommitId = serde_json::from_str("\"0a1b2c\"").unwrap();
    assert_eq!(id.as_str(), "0a1b2c");
    assert!(serde_json::from_str::<CommitId>("\"../../etc\"").is_err());
}
