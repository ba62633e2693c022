/// Identity types for group sessions.
///
/// - `Identity`: opaque participant identity (an address or a marshalled
///   public key), compared case-insensitively
/// - `SessionId`: deterministic hex identifier of one group session

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Participant identity as it appears in member lists and as a request sender.
///
/// Stored exactly as supplied; equality for membership purposes ignores case.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(s: impl Into<String>) -> Self {
        Identity(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded form used for membership comparison.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Case-insensitive identity match.
    pub fn matches(&self, other: &Identity) -> bool {
        self.0 == other.0 || self.normalized() == other.normalized()
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity(s.to_string())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Identity(s)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // marshalled keys are long; show a prefix only
        let shown: String = self.0.chars().take(16).collect();
        if shown.len() < self.0.len() {
            write!(f, "Identity({}…)", shown)
        } else {
            write!(f, "Identity({})", shown)
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Session identifier: hex(BLAKE3("CONCLAVE-SESSION" || counter || members)[0..16]).
///
/// Derived only from the store's creation counter and the member list, so every
/// replica replaying the same inputs assigns the same identifiers.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn derive(counter: u64, members: &[Identity]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"CONCLAVE-SESSION");
        hasher.update(&counter.to_le_bytes());
        for m in members {
            let norm = m.normalized();
            hasher.update(&(norm.len() as u64).to_le_bytes());
            hasher.update(norm.as_bytes());
        }
        SessionId(hex::encode(&hasher.finalize().as_bytes()[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        SessionId(s)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
