/// Per-group protocol state: member ring, round slots, group address, and the
/// action log.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoding;
use crate::session::ids::Identity;

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// One member's contribution to a round. Serializes as `null` or the value's
/// canonical base64 string.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Slot {
    #[default]
    Empty,
    Filled(String),
}

impl Slot {
    pub fn is_filled(&self) -> bool {
        matches!(self, Slot::Filled(_))
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Slot::Empty => None,
            Slot::Filled(v) => Some(v),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            Some(v) => Slot::Filled(v),
            None => Slot::Empty,
        })
    }
}

// ---------------------------------------------------------------------------
// Round / Phase
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Round {
    One,
    Two,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::One => f.write_str("round 1"),
            Round::Two => f.write_str("round 2"),
        }
    }
}

/// Protocol progress, derived from slot contents and the group address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SessionPhase {
    Created,
    Round1Open,
    Round1Complete,
    Round2Open,
    Round2Complete,
    Finalized,
}

// ---------------------------------------------------------------------------
// GroupSession
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSession {
    #[serde(rename = "Members")]
    pub members: Vec<Identity>,
    #[serde(rename = "R1")]
    pub r1: Vec<Slot>,
    #[serde(rename = "R2")]
    pub r2: Vec<Slot>,
    #[serde(rename = "GroupAddress", default)]
    pub group_address: Option<String>,
}

impl GroupSession {
    /// Session with one empty slot per member in each round. Membership
    /// validation is the store's job.
    pub fn new(members: Vec<Identity>) -> Self {
        let n = members.len();
        GroupSession {
            members,
            r1: vec![Slot::Empty; n],
            r2: vec![Slot::Empty; n],
            group_address: None,
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Ring index of `identity`, compared case-insensitively.
    pub fn index_of(&self, identity: &Identity) -> Option<usize> {
        self.members.iter().position(|m| m.matches(identity))
    }

    pub fn slots(&self, round: Round) -> &[Slot] {
        match round {
            Round::One => &self.r1,
            Round::Two => &self.r2,
        }
    }

    pub(crate) fn slots_mut(&mut self, round: Round) -> &mut Vec<Slot> {
        match round {
            Round::One => &mut self.r1,
            Round::Two => &mut self.r2,
        }
    }

    /// True iff every slot of `round` is filled.
    pub fn is_complete(&self, round: Round) -> bool {
        self.slots(round).iter().all(Slot::is_filled)
    }

    /// Decoded values of a complete round, in ring order.
    pub fn round_values(&self, round: Round) -> Option<Vec<BigUint>> {
        self.slots(round)
            .iter()
            .map(|s| s.value().and_then(|v| encoding::b64_to_biguint(v).ok()))
            .collect()
    }

    /// Round values as one dot-joined base64 list, the format the offline
    /// tools consume.
    pub fn round_list(&self, round: Round) -> Option<String> {
        self.round_values(round).map(|v| encoding::join_b64(&v))
    }

    pub fn phase(&self) -> SessionPhase {
        let any = |round| self.slots(round).iter().any(Slot::is_filled);
        if self.group_address.is_some() {
            SessionPhase::Finalized
        } else if self.is_complete(Round::Two) {
            SessionPhase::Round2Complete
        } else if any(Round::Two) {
            SessionPhase::Round2Open
        } else if self.is_complete(Round::One) {
            SessionPhase::Round1Complete
        } else if any(Round::One) {
            SessionPhase::Round1Open
        } else {
            SessionPhase::Created
        }
    }
}

// ---------------------------------------------------------------------------
// StateTransition
// ---------------------------------------------------------------------------

/// One entry of a session's append-only action log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Author")]
    pub author: Identity,
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
}
